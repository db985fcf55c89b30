use clap::Parser;

/// Shell command line arguments
#[derive(Parser, Debug, Clone)]
#[command(name = "pipeshell", version)]
#[command(about = "A small shell with pipelines, redirection and ^N history recall", long_about = None)]
pub struct ShellArgs {
    /// Prompt printed before each line
    #[arg(long, env = "PIPESHELL_PROMPT", default_value = "[cmd]: ")]
    pub prompt: String,

    /// Run a single line and exit instead of starting the prompt
    #[arg(short = 'c', long = "command", value_name = "LINE")]
    pub command: Option<String>,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, env = "PIPESHELL_LOG", default_value = "warn")]
    pub log: String,

    /// Disable colored line editing
    #[arg(long)]
    pub no_color: bool,
}
