use crate::errors::ParseError;
use crate::redirection::{extract_redirection, RedirectionKind};

/// One program invocation; `argv[0]` is the program name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stage {
    pub name: String,
    pub argv: Vec<String>,
}

impl Stage {
    fn from_segment(segment: &str, index: usize) -> Result<Self, ParseError> {
        let argv: Vec<String> = segment.split_whitespace().map(str::to_string).collect();
        match argv.first() {
            Some(name) => Ok(Self {
                name: name.clone(),
                argv,
            }),
            None => Err(ParseError::EmptyStage { index }),
        }
    }
}

/// A parsed line: the stages in order plus the honored redirect paths
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLine {
    pub stages: Vec<Stage>,
    pub input: Option<String>,
    pub output: Option<String>,
}

/// Split input into pipeline segments
pub fn split_pipeline(input: &str) -> Vec<&str> {
    input.split('|').map(|s| s.trim()).collect()
}

/// Parse one line into stages and redirections.
///
/// `<` is extracted before `>`; whatever remains is split on `|` and each
/// segment on whitespace.
pub fn parse_line(line: &str) -> Result<ParsedLine, ParseError> {
    let mut rest = line.to_string();
    let input = extract_redirection(&mut rest, RedirectionKind::Input)?;
    let output = extract_redirection(&mut rest, RedirectionKind::Output)?;

    let stages = split_pipeline(&rest)
        .into_iter()
        .enumerate()
        .map(|(index, segment)| Stage::from_segment(segment, index))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ParsedLine {
        stages,
        input,
        output,
    })
}
