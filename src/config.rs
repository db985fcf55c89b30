use crate::cli::ShellArgs;

/// Settings the interactive loop runs with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellConfig {
    pub prompt: String,
    pub color: bool,
    pub log_filter: String,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            prompt: "[cmd]: ".to_string(),
            color: true,
            log_filter: "warn".to_string(),
        }
    }
}

impl From<&ShellArgs> for ShellConfig {
    fn from(args: &ShellArgs) -> Self {
        Self {
            prompt: args.prompt.clone(),
            color: !args.no_color,
            log_filter: args.log.clone(),
        }
    }
}
