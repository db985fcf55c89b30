use crate::completion::ShellCompleter;
use crate::config::ShellConfig;
use crate::errors::{ShellError, ShellResult};
use rustyline::config::Configurer;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::{ColorMode, CompletionType, Config, Editor};

/// Prompt and line editor for one session
pub struct Repl {
    editor: Editor<ShellCompleter, DefaultHistory>,
    prompt: String,
}

impl Repl {
    pub fn new(config: &ShellConfig) -> ShellResult<Self> {
        let color_mode = if config.color {
            ColorMode::Enabled
        } else {
            ColorMode::Disabled
        };
        let rl_config = Config::builder()
            .color_mode(color_mode)
            .auto_add_history(true)
            .build();

        let mut editor: Editor<ShellCompleter, DefaultHistory> =
            Editor::with_config(rl_config).map_err(|e| {
                ShellError::InputError(format!("Failed to create readline editor: {}", e))
            })?;
        editor.set_helper(Some(ShellCompleter::new()));
        editor.set_completion_type(CompletionType::List);

        Ok(Self {
            editor,
            prompt: config.prompt.clone(),
        })
    }

    /// Read the next non-blank line.
    /// Ctrl-C re-prompts; Ctrl-D yields `ShellError::Interrupted`.
    pub fn read_input(&mut self) -> ShellResult<String> {
        loop {
            match self.editor.readline(&self.prompt) {
                Ok(line) => {
                    let trimmed = line.trim();
                    if !trimmed.is_empty() {
                        return Ok(trimmed.to_string());
                    }
                }
                Err(ReadlineError::Interrupted) => continue,
                Err(ReadlineError::Eof) => return Err(ShellError::Interrupted),
                Err(e) => {
                    return Err(ShellError::InputError(format!("Readline error: {}", e)));
                }
            }
        }
    }
}
