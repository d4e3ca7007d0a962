use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "orgcfg")]
#[command(about = "orgcfg - edit organisation integration settings without leaking secrets")]
#[command(version)]
#[command(after_help = "\x1b[1;36mQuick Start:\x1b[0m
  orgcfg show                                   Show current settings (secrets masked)
  orgcfg fields                                 List editable fields
  orgcfg apply --set primary_color=#1a2b3c      Change one field and save
  orgcfg apply --disable s3 --dry-run           Preview the update payload
  orgcfg edit                                   Interactive editing session

\x1b[1;36mBackend:\x1b[0m
  orgcfg config show                            Show which backend is used
  orgcfg config use-file ./organisation.json    Use a local JSON file
  orgcfg config use-http https://api.example.com/v1 org_123")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Pretty)]
    pub output: OutputFormat,

    /// Path to the client settings file
    #[arg(long, global = true, env = "ORGCFG_CONFIG")]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the organisation's integration settings
    ///
    /// Secrets the server holds are shown as masked placeholders.
    #[command(after_help = "\x1b[1;33mExamples:\x1b[0m
  orgcfg show                   Table of all fields
  orgcfg show --output json     Raw masked config as JSON")]
    Show,

    /// List editable fields and their kinds
    Fields,

    /// Apply edits non-interactively and save
    ///
    /// Only the fields named here are sent. Secrets left masked are never
    /// sent back to the server.
    #[command(after_help = "\x1b[1;33mExamples:\x1b[0m
  orgcfg apply --set sendgrid_api_key=SG.xxxx
  orgcfg apply --set s3.bucket_name=acme-archive --dry-run
  orgcfg apply --enable sms --set twilio_account_sid=AC... --set twilio_auth_token=...
  orgcfg apply --disable s3 --yes")]
    Apply {
        /// Set a field: <field>=<value> (repeatable)
        #[arg(long = "set", value_name = "FIELD=VALUE")]
        set: Vec<String>,
        /// Clear a text field (repeatable)
        #[arg(long = "clear", value_name = "FIELD")]
        clear: Vec<String>,
        /// Enable an integration: email, sms or s3 (repeatable)
        #[arg(long)]
        enable: Vec<String>,
        /// Disable an integration: email, sms or s3 (repeatable)
        #[arg(long)]
        disable: Vec<String>,
        /// Answer yes to confirmation prompts
        #[arg(short, long)]
        yes: bool,
        /// Print the payload without saving
        #[arg(long)]
        dry_run: bool,
    },

    /// Interactive editing session
    ///
    /// Edits accumulate until `save`; `reload` discards them.
    #[command(after_help = "\x1b[1;33mSession commands:\x1b[0m
  show                          Show all fields
  set <field> [value]           Set a field (prompts hidden input for secrets)
  clear <field>                 Clear a text field
  enable|disable <integration>  Toggle email, sms or s3
  diff                          Show the pending update payload
  save                          Validate and save
  reload                        Discard edits and reload
  quit                          Leave the session")]
    Edit,

    /// Manage client settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Clone)]
pub enum ConfigAction {
    /// Show current client settings
    Show,
    /// Use a local JSON file as the backend
    UseFile {
        /// Path to the organisation JSON file
        path: PathBuf,
    },
    /// Use the organisation settings HTTP API
    UseHttp {
        /// API base URL
        base_url: String,
        /// Organisation identifier
        organisation_id: String,
        /// Environment variable holding the bearer token
        #[arg(long, default_value = "ORGCFG_TOKEN")]
        token_env: String,
        /// Request timeout in seconds
        #[arg(long, default_value_t = 30)]
        timeout_secs: u64,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable formatted output
    Pretty,
    /// JSON output
    Json,
    /// YAML output
    Yaml,
    /// Plain text output
    Text,
}
