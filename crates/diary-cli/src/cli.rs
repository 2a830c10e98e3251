use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

use diary_core::VERSION;

/// Diary - personal diary and task keeper with per-entry encryption
#[derive(Parser)]
#[command(name = "diary")]
#[command(author, version = VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the database file
    #[arg(long, global = true, env = "DIARY_DB")]
    pub db: Option<String>,

    /// Path to the config file
    #[arg(long, global = true, env = "DIARY_CONFIG")]
    pub config: Option<String>,

    /// Account to act as
    #[arg(short, long, global = true, env = "DIARY_USER")]
    pub user: Option<String>,

    /// Quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose logging to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a new account
    Register(RegisterArgs),

    /// Diary entries
    #[command(subcommand)]
    Diary(DiaryCommand),

    /// To-do items
    #[command(subcommand)]
    Task(TaskCommand),

    /// Notification channel settings
    #[command(subcommand)]
    Notify(NotifyCommand),

    /// Check database integrity
    Check,

    /// Manage the config file
    #[command(subcommand)]
    Config(ConfigCommand),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the `register` command
#[derive(Args)]
pub struct RegisterArgs {
    /// Contact email address
    #[arg(long)]
    pub email: Option<String>,
}

#[derive(Subcommand)]
pub enum DiaryCommand {
    /// Write a new entry
    Add(DiaryAddArgs),

    /// List entries
    List(DiaryListArgs),

    /// Show a single entry
    Show(DiaryShowArgs),

    /// Change an entry
    Edit(DiaryEditArgs),

    /// Delete an entry
    Delete(IdArgs),

    /// Word counts, check-in rate and ratings
    Stats(JsonArgs),
}

/// Arguments for `diary add`
#[derive(Args)]
pub struct DiaryAddArgs {
    #[arg(long)]
    pub title: Option<String>,

    /// Entry body (read from stdin when omitted)
    #[arg(long)]
    pub body: Option<String>,

    /// Store the body encrypted
    #[arg(long)]
    pub encrypt: bool,

    /// Entry date (ISO-8601 or YYYY-MM-DD)
    #[arg(long)]
    pub date: Option<String>,

    /// Daily rating, e.g. 1-5
    #[arg(long)]
    pub rating: Option<String>,
}

/// Arguments for `diary list`
#[derive(Args)]
pub struct DiaryListArgs {
    /// Earliest entry date (inclusive)
    #[arg(long)]
    pub since: Option<String>,

    /// Latest entry date (inclusive)
    #[arg(long)]
    pub until: Option<String>,

    #[arg(long, default_value_t = 0)]
    pub skip: usize,

    #[arg(long, default_value_t = diary_core::storage::DEFAULT_LIST_LIMIT)]
    pub limit: usize,

    /// Show encrypted bodies in the clear
    #[arg(long)]
    pub decrypt: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for `diary show`
#[derive(Args)]
pub struct DiaryShowArgs {
    /// Entry ID (full UUID)
    #[arg(value_name = "ID")]
    pub id: String,

    /// Show the body in the clear if encrypted
    #[arg(long)]
    pub decrypt: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for `diary edit`
#[derive(Args)]
pub struct DiaryEditArgs {
    /// Entry ID (full UUID)
    #[arg(value_name = "ID")]
    pub id: String,

    #[arg(long)]
    pub title: Option<String>,

    /// New body (plaintext)
    #[arg(long)]
    pub body: Option<String>,

    /// Turn encryption on
    #[arg(long, conflicts_with = "no_encrypt")]
    pub encrypt: bool,

    /// Turn encryption off
    #[arg(long)]
    pub no_encrypt: bool,

    #[arg(long)]
    pub date: Option<String>,

    #[arg(long)]
    pub rating: Option<String>,
}

#[derive(Subcommand)]
pub enum TaskCommand {
    /// Add a task
    Add(TaskAddArgs),

    /// List tasks
    List(TaskListArgs),

    /// Show a single task
    Show(TaskShowArgs),

    /// Change a task
    Edit(TaskEditArgs),

    /// Delete a task
    Delete(IdArgs),
}

/// Arguments for `task add`
#[derive(Args)]
pub struct TaskAddArgs {
    #[arg(value_name = "TITLE")]
    pub title: String,

    #[arg(long)]
    pub description: Option<String>,

    /// low, medium, high or critical
    #[arg(long, default_value = "medium")]
    pub importance: String,

    /// Due date (ISO-8601 or YYYY-MM-DD)
    #[arg(long)]
    pub due: Option<String>,

    /// Reminder time (ISO-8601 or YYYY-MM-DD)
    #[arg(long)]
    pub reminder: Option<String>,
}

/// Arguments for `task list`
#[derive(Args)]
pub struct TaskListArgs {
    /// Only completed tasks
    #[arg(long, conflicts_with = "open")]
    pub done: bool,

    /// Only open tasks
    #[arg(long)]
    pub open: bool,

    #[arg(long)]
    pub importance: Option<String>,

    #[arg(long, default_value_t = 0)]
    pub skip: usize,

    #[arg(long, default_value_t = diary_core::storage::DEFAULT_LIST_LIMIT)]
    pub limit: usize,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for `task show`
#[derive(Args)]
pub struct TaskShowArgs {
    /// Task ID (full UUID)
    #[arg(value_name = "ID")]
    pub id: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for `task edit`
#[derive(Args)]
pub struct TaskEditArgs {
    /// Task ID (full UUID)
    #[arg(value_name = "ID")]
    pub id: String,

    #[arg(long)]
    pub title: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    #[arg(long)]
    pub importance: Option<String>,

    /// Mark completed
    #[arg(long, conflicts_with = "reopen")]
    pub done: bool,

    /// Mark not completed
    #[arg(long)]
    pub reopen: bool,

    #[arg(long)]
    pub due: Option<String>,

    #[arg(long)]
    pub reminder: Option<String>,
}

#[derive(Subcommand)]
pub enum NotifyCommand {
    /// Show current settings
    Show(JsonArgs),

    /// Change settings; omitted options are left as they are
    Set(NotifySetArgs),
}

/// Arguments for `notify set`
#[derive(Args)]
pub struct NotifySetArgs {
    #[arg(long, value_name = "BOOL")]
    pub email_enabled: Option<bool>,

    #[arg(long)]
    pub email_address: Option<String>,

    #[arg(long, value_name = "BOOL")]
    pub wecom_enabled: Option<bool>,

    #[arg(long)]
    pub wecom_webhook_url: Option<String>,

    #[arg(long, value_name = "BOOL")]
    pub dingtalk_enabled: Option<bool>,

    #[arg(long)]
    pub dingtalk_webhook_url: Option<String>,

    #[arg(long, value_name = "BOOL")]
    pub telegram_enabled: Option<bool>,

    #[arg(long)]
    pub telegram_bot_token: Option<String>,

    #[arg(long)]
    pub telegram_chat_id: Option<String>,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Write a default config file
    Init(ConfigInitArgs),

    /// Print the config path in use
    Path,
}

/// Arguments for `config init`
#[derive(Args)]
pub struct ConfigInitArgs {
    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

/// A record ID
#[derive(Args)]
pub struct IdArgs {
    /// Record ID (full UUID)
    #[arg(value_name = "ID")]
    pub id: String,
}

/// Output as JSON
#[derive(Args)]
pub struct JsonArgs {
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `completions` command
#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_name = "SHELL")]
    pub shell: Shell,
}
