use crate::commands::BUILTINS;
use rustyline::completion::{Completer, FilenameCompleter, Pair};
use rustyline::highlight::{CmdKind, Highlighter};
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Helper};
use std::borrow::Cow;
use std::env;
use std::fs;

/// What the word under the cursor names
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionTarget<'a> {
    /// First word of a stage
    Command(&'a str),
    /// A redirect target or an argument
    File(&'a str),
}

fn breaks_word(c: char) -> bool {
    c.is_whitespace() || matches!(c, '|' | '<' | '>')
}

/// Classify the word that ends at `pos`
pub fn completion_target(line: &str, pos: usize) -> CompletionTarget<'_> {
    let input = &line[..pos];
    let word_start = input
        .char_indices()
        .rev()
        .find(|&(_, c)| breaks_word(c))
        .map_or(0, |(i, c)| i + c.len_utf8());
    let word = &input[word_start..];
    let before = input[..word_start].trim_end();

    if before.is_empty() || before.ends_with('|') {
        CompletionTarget::Command(word)
    } else {
        CompletionTarget::File(word)
    }
}

/// Built-in names and executables on PATH starting with `prefix`, sorted
pub fn command_candidates(prefix: &str) -> Vec<String> {
    let mut candidates: Vec<String> = BUILTINS
        .builtin_names()
        .into_iter()
        .filter(|name| name.starts_with(prefix))
        .map(str::to_string)
        .collect();

    if let Ok(path_var) = env::var("PATH") {
        for path_dir in env::split_paths(&path_var) {
            let Ok(entries) = fs::read_dir(path_dir) else {
                continue;
            };
            for entry in entries.flatten() {
                let Ok(file_name) = entry.file_name().into_string() else {
                    continue;
                };
                if file_name.starts_with(prefix) && is_executable(&entry) {
                    candidates.push(file_name);
                }
            }
        }
    }

    candidates.sort();
    candidates.dedup();
    candidates
}

fn is_executable(entry: &fs::DirEntry) -> bool {
    use std::os::unix::fs::PermissionsExt;
    // follow symlinks, most of /usr/bin is links
    fs::metadata(entry.path())
        .map(|metadata| metadata.is_file() && metadata.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

/// Tab completion for program names and file names
#[derive(Default)]
pub struct ShellCompleter {
    files: FilenameCompleter,
}

impl ShellCompleter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Completer for ShellCompleter {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        match completion_target(line, pos) {
            CompletionTarget::Command(prefix) => {
                let mut candidates: Vec<Pair> = command_candidates(prefix)
                    .into_iter()
                    .map(|name| Pair {
                        display: name.clone(),
                        replacement: name,
                    })
                    .collect();

                // If there's exactly one match, add a trailing space
                if let [only] = candidates.as_mut_slice() {
                    only.replacement.push(' ');
                }

                Ok((pos - prefix.len(), candidates))
            }
            CompletionTarget::File(_) => self.files.complete_path(line, pos),
        }
    }
}

impl Hinter for ShellCompleter {
    type Hint = String;

    fn hint(&self, _line: &str, _pos: usize, _ctx: &Context<'_>) -> Option<String> {
        None
    }
}

impl Highlighter for ShellCompleter {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        Cow::Borrowed(line)
    }

    fn highlight_prompt<'b, 's: 'b, 'p: 'b>(
        &'s self,
        prompt: &'p str,
        _default: bool,
    ) -> Cow<'b, str> {
        Cow::Borrowed(prompt)
    }

    fn highlight_hint<'h>(&self, hint: &'h str) -> Cow<'h, str> {
        Cow::Borrowed(hint)
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: CmdKind) -> bool {
        false
    }
}

impl Validator for ShellCompleter {}

impl Helper for ShellCompleter {}
