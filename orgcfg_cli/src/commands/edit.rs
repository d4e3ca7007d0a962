use crate::cli::{Cli, OutputFormat};
use crate::commands::apply::{apply_edit, parse_field, parse_flag, parse_integration, save_with_spinner, Edit};
use crate::commands::show::settings_view;
use crate::commands::{
    confirm_prompt, open_backend, read_secret, strip_line_ending, CommandError, Result,
};
use crate::output::{format_output, OutputData};
use orgcfg_core::{ConfigEditor, EditorError, FieldId, FieldKind, Integration, ToggleOutcome};
use owo_colors::OwoColorize;
use std::io::{self, BufRead, Write};

#[derive(Debug, Clone, PartialEq)]
pub enum SessionCommand {
    Show,
    Set(FieldId, Option<String>),
    Clear(FieldId),
    Toggle(Integration, bool),
    Diff,
    Status,
    Save,
    Reload,
    Help,
    Quit,
}

/// Split off the first whitespace-delimited word, returning it and the
/// untouched remainder.
fn next_word(input: &str) -> Option<(&str, &str)> {
    let input = input.trim_start();
    if input.is_empty() {
        return None;
    }
    Some(match input.find(char::is_whitespace) {
        Some(end) => (&input[..end], &input[end..]),
        None => (input, ""),
    })
}

pub fn parse_line(line: &str) -> Result<Option<SessionCommand>> {
    let line = strip_line_ending(line);
    let Some((verb, tail)) = next_word(line) else {
        return Ok(None);
    };
    let rest: Vec<&str> = tail.split_whitespace().collect();
    let arg = |i: usize| {
        rest.get(i).copied().ok_or_else(|| {
            CommandError::InvalidArgument(format!("'{}' needs more arguments", verb))
        })
    };

    let command = match verb {
        "show" | "ls" => SessionCommand::Show,
        "set" => {
            let (name, value) = next_word(tail).ok_or_else(|| {
                CommandError::InvalidArgument(format!("'{}' needs more arguments", verb))
            })?;
            let field = parse_field(name)?;
            // One separator is dropped; the rest of the line is the value.
            let value = value
                .strip_prefix(|c: char| c.is_whitespace())
                .filter(|v| !v.trim().is_empty())
                .map(str::to_string);
            SessionCommand::Set(field, value)
        }
        "clear" | "unset" => SessionCommand::Clear(parse_field(arg(0)?)?),
        "enable" => SessionCommand::Toggle(parse_integration(arg(0)?)?, true),
        "disable" => SessionCommand::Toggle(parse_integration(arg(0)?)?, false),
        "diff" | "payload" => SessionCommand::Diff,
        "status" => SessionCommand::Status,
        "save" => SessionCommand::Save,
        "reload" => SessionCommand::Reload,
        "help" | "?" => SessionCommand::Help,
        "quit" | "exit" | "q" => SessionCommand::Quit,
        other => {
            return Err(CommandError::InvalidArgument(format!(
                "unknown command '{}' (try 'help')",
                other
            )))
        }
    };
    Ok(Some(command))
}

pub async fn run(cli: &Cli) -> Result<()> {
    let backend = open_backend(cli)?;
    let mut editor = ConfigEditor::new();
    editor.reload(backend.as_ref()).await?;

    println!();
    println!(
        "{} {} {}",
        "Editing".bold().cyan(),
        editor.organisation_id().bold(),
        format!("via {}", backend.describe()).dimmed()
    );
    println!("{}", "Type 'help' for commands.".dimmed());

    let stdin = io::stdin();
    loop {
        let marker = if editor.is_dirty() { "*" } else { "" };
        print!("{}{} ", "orgcfg".cyan(), format!("{}>", marker).bold());
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }

        let command = match parse_line(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                println!("{}: {}", "Error".red().bold(), e);
                continue;
            }
        };

        match command {
            SessionCommand::Quit => {
                if editor.is_dirty() && !confirm_prompt("Discard unsaved changes?") {
                    continue;
                }
                break;
            }
            SessionCommand::Reload => {
                if editor.is_dirty() && !confirm_prompt("Discard unsaved changes and reload?") {
                    continue;
                }
                report(editor.reload(backend.as_ref()).await.map_err(CommandError::from));
            }
            SessionCommand::Save => {
                match save_with_spinner(&mut editor, backend.as_ref()).await {
                    Ok(outcome) => report(format_output(&OutputData::Saved(outcome), &cli.output)),
                    Err(e) => report_save_error(e),
                }
            }
            other => report(handle(cli, &mut editor, other, &backend.describe())),
        }
    }

    Ok(())
}

fn handle(
    cli: &Cli,
    editor: &mut ConfigEditor,
    command: SessionCommand,
    backend: &str,
) -> Result<()> {
    match command {
        SessionCommand::Show => {
            format_output(&settings_view(editor, backend), &OutputFormat::Pretty)?;
        }
        SessionCommand::Set(field, value) => {
            let edit = match (field.kind(), value) {
                (FieldKind::Flag, Some(v)) => Edit::Flag(
                    field,
                    parse_flag(&v).ok_or_else(|| {
                        CommandError::InvalidArgument(format!("{} expects true or false", field))
                    })?,
                ),
                (FieldKind::Flag, None) => {
                    let current = editor.state().config().flag(field).unwrap_or_default();
                    Edit::Flag(field, !current)
                }
                (FieldKind::Text, Some(v)) => Edit::Text(field, Some(v)),
                (FieldKind::Text, None) => {
                    let input = if field.is_secret() {
                        read_secret(field.label())?
                    } else {
                        read_line(field.label())?
                    };
                    Edit::Text(field, Some(input))
                }
            };
            apply_edit(editor, edit)?;
            println!("{} {}", "edited".green(), field.path().cyan());
        }
        SessionCommand::Clear(field) => {
            apply_edit(editor, Edit::Text(field, None))?;
            println!("{} {}", "cleared".yellow(), field.path().cyan());
        }
        SessionCommand::Toggle(integration, enabled) => {
            let outcome = editor.set_enabled(integration, enabled, &mut confirm_prompt);
            let state = if enabled { "enabled" } else { "disabled" };
            match outcome {
                ToggleOutcome::Changed => println!("{} {}", integration.cyan(), state.green()),
                ToggleOutcome::Unchanged => {
                    println!("{} is already {}", integration.cyan(), state.dimmed())
                }
                ToggleOutcome::Declined => println!("{}", "Cancelled.".yellow()),
            }
        }
        SessionCommand::Diff => {
            let data = OutputData::Payload {
                dry_run: true,
                payload: editor.payload().into_value(),
            };
            format_output(&data, &cli.output)?;
            if let Err(errors) = editor.validate() {
                println!("{} {}", "Would not save:".red().bold(), errors);
            }
        }
        SessionCommand::Status => {
            let touched: Vec<String> = editor.state().touched().iter().map(|f| f.path()).collect();
            if touched.is_empty() {
                println!("{}", "No unsaved changes.".dimmed());
            } else {
                println!("{} {}", "Edited:".bold(), touched.join(", ").cyan());
            }
            for integration in Integration::ALL {
                let state = if editor.is_enabled(*integration) {
                    "on".green().to_string()
                } else {
                    "off".dimmed().to_string()
                };
                println!("  {:<6} {}", integration.to_string(), state);
            }
        }
        SessionCommand::Help => print_help(),
        // Handled by the session loop.
        SessionCommand::Save | SessionCommand::Reload | SessionCommand::Quit => {}
    }
    Ok(())
}

fn read_line(prompt: &str) -> Result<String> {
    print!("{}: ", prompt);
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

fn report(result: Result<()>) {
    if let Err(e) = result {
        println!("{}: {}", "Error".red().bold(), e);
    }
}

fn report_save_error(err: CommandError) {
    match err {
        CommandError::Editor(EditorError::Validation(errors)) => {
            println!("{}", "Not saved. Fix these first:".red().bold());
            for issue in errors.issues() {
                println!("  {} {}", "•".red(), issue);
            }
        }
        other => println!("{}: {}", "Save failed".red().bold(), other),
    }
}

fn print_help() {
    println!();
    println!("{}", "Session commands:".bold().cyan());
    println!("  show                          Show all fields");
    println!("  set <field> [value]           Set a field (hidden prompt for secrets)");
    println!("  clear <field>                 Clear a text field");
    println!("  enable|disable <integration>  Toggle email, sms or s3");
    println!("  diff                          Show the pending update payload");
    println!("  status                        Show edited fields and toggles");
    println!("  save                          Validate and save");
    println!("  reload                        Discard edits and reload");
    println!("  quit                          Leave the session");
    println!();
    println!("{} {}", "Fields:".dimmed(), "orgcfg fields".cyan());
    println!();
}
