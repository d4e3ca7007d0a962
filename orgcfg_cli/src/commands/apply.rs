use crate::cli::Cli;
use crate::commands::{confirm_prompt, open_backend, CommandError, Result};
use crate::output::{format_output, OutputData};
use indicatif::{ProgressBar, ProgressStyle};
use orgcfg_core::{ConfigEditor, FieldId, FieldKind, Integration, SettingsBackend, ToggleOutcome};
use owo_colors::OwoColorize;

pub struct ApplyArgs {
    pub set: Vec<String>,
    pub clear: Vec<String>,
    pub enable: Vec<String>,
    pub disable: Vec<String>,
    pub yes: bool,
    pub dry_run: bool,
}

/// One parsed edit from the command line.
#[derive(Debug, Clone, PartialEq)]
pub enum Edit {
    Text(FieldId, Option<String>),
    Flag(FieldId, bool),
}

pub fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

/// Parse a `field=value` assignment.
pub fn parse_assignment(raw: &str) -> Result<Edit> {
    let (name, value) = raw.split_once('=').ok_or_else(|| {
        CommandError::InvalidArgument(format!("expected FIELD=VALUE, got '{}'", raw))
    })?;
    let field = parse_field(name)?;
    match field.kind() {
        FieldKind::Text => Ok(Edit::Text(field, Some(value.to_string()))),
        FieldKind::Flag => parse_flag(value).map(|b| Edit::Flag(field, b)).ok_or_else(|| {
            CommandError::InvalidArgument(format!("{} expects true or false, got '{}'", field, value))
        }),
    }
}

pub fn parse_field(raw: &str) -> Result<FieldId> {
    raw.parse::<FieldId>()
        .map_err(|e| CommandError::InvalidArgument(e.to_string()))
}

pub fn parse_integration(raw: &str) -> Result<Integration> {
    raw.parse::<Integration>()
        .map_err(|e| CommandError::InvalidArgument(e.to_string()))
}

pub fn apply_edit(editor: &mut ConfigEditor, edit: Edit) -> Result<()> {
    match edit {
        Edit::Text(field, value) => editor.set_text(field, value)?,
        Edit::Flag(field, value) => editor.set_flag(field, value)?,
    }
    Ok(())
}

pub async fn run(cli: &Cli, args: ApplyArgs) -> Result<()> {
    // Parse everything before touching the backend.
    let enables = args
        .enable
        .iter()
        .map(|s| parse_integration(s))
        .collect::<Result<Vec<_>>>()?;
    let disables = args
        .disable
        .iter()
        .map(|s| parse_integration(s))
        .collect::<Result<Vec<_>>>()?;
    let mut edits = args
        .set
        .iter()
        .map(|s| parse_assignment(s))
        .collect::<Result<Vec<_>>>()?;
    for name in &args.clear {
        let field = parse_field(name)?;
        edits.push(Edit::Text(field, None));
    }

    let backend = open_backend(cli)?;
    let mut editor = ConfigEditor::new();
    editor.reload(backend.as_ref()).await?;

    let yes = args.yes;
    let mut confirm = |prompt: &str| yes || confirm_prompt(prompt);

    for integration in enables {
        editor.set_enabled(integration, true, &mut confirm);
    }
    for edit in edits {
        apply_edit(&mut editor, edit)?;
    }
    for integration in disables {
        if editor.set_enabled(integration, false, &mut confirm) == ToggleOutcome::Declined {
            println!("{} {} stays enabled.", "Cancelled.".yellow(), integration);
        }
    }

    if args.dry_run {
        editor.validate().map_err(orgcfg_core::EditorError::from)?;
        let data = OutputData::Payload {
            dry_run: true,
            payload: editor.payload().into_value(),
        };
        return format_output(&data, &cli.output);
    }

    let outcome = save_with_spinner(&mut editor, backend.as_ref()).await?;
    format_output(&OutputData::Saved(outcome), &cli.output)
}

/// Save while showing a spinner; the editor is borrowed for the whole
/// request so nothing else can edit or save meanwhile.
pub async fn save_with_spinner(
    editor: &mut ConfigEditor,
    backend: &dyn SettingsBackend,
) -> Result<orgcfg_core::SaveOutcome> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .expect("Invalid progress template"),
    );
    spinner.set_message(format!("Saving to {}...", backend.describe()));
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));

    let result = editor.save(backend).await;
    spinner.finish_and_clear();
    Ok(result?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_assignment() {
        assert_eq!(
            parse_assignment("s3.bucket_name=acme").unwrap(),
            Edit::Text(FieldId::S3BucketName, Some("acme".into()))
        );
        assert_eq!(
            parse_assignment("allow_self_signup=on").unwrap(),
            Edit::Flag(FieldId::AllowSelfSignup, true)
        );
        // Values may contain '='.
        assert_eq!(
            parse_assignment("logo_url=https://x.example/l.png?v=2").unwrap(),
            Edit::Text(FieldId::LogoUrl, Some("https://x.example/l.png?v=2".into()))
        );
        assert!(parse_assignment("primary_color").is_err());
        assert!(parse_assignment("nope=1").is_err());
        assert!(parse_assignment("require_leave_approval=maybe").is_err());
    }

    #[test]
    fn test_parse_integration() {
        assert_eq!(parse_integration("SMS").unwrap(), Integration::Sms);
        assert!(parse_integration("fax").is_err());
    }
}
