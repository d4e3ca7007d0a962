use crate::cli::Cli;
use crate::commands::Result;
use crate::output::{format_output, FieldInfo, OutputData};
use orgcfg_core::FieldId;

pub async fn run(cli: &Cli) -> Result<()> {
    let fields = FieldId::ALL.iter().map(|f| FieldInfo::of(*f)).collect();
    format_output(&OutputData::Fields(fields), &cli.output)
}
