use crate::cli::Cli;
use crate::commands::{open_backend, Result};
use crate::output::{format_output, OutputData};
use orgcfg_core::{ConfigEditor, FieldId};

pub async fn run(cli: &Cli) -> Result<()> {
    let backend = open_backend(cli)?;
    let mut editor = ConfigEditor::new();
    editor.reload(backend.as_ref()).await?;

    match cli.output {
        crate::cli::OutputFormat::Json | crate::cli::OutputFormat::Yaml => {
            // Machine formats get the config exactly as the server sent it.
            let data = OutputData::ClientSettings(serde_json::to_value(editor.state().config())?);
            format_output(&data, &cli.output)
        }
        _ => format_output(&settings_view(&editor, &backend.describe()), &cli.output),
    }
}

pub fn settings_view(editor: &ConfigEditor, backend: &str) -> OutputData {
    let organisation = if editor.organisation_name().is_empty() {
        editor.organisation_id().to_string()
    } else {
        format!("{} ({})", editor.organisation_name(), editor.organisation_id())
    };
    OutputData::Settings {
        organisation,
        backend: backend.to_string(),
        toggles: *editor.state().toggles(),
        fields: FieldId::ALL.iter().map(|f| editor.display(*f)).collect(),
    }
}
