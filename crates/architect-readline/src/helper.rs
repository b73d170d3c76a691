use std::borrow::Cow::{self, Borrowed, Owned};

use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Helper};

use crate::command::{COMMANDS, SECTION_NAMES, VIEW_NAMES};

/// Rustyline helper providing slash-command completion, hints and
/// highlighting.
#[derive(Clone, Default)]
pub struct CliHelper;

impl CliHelper {
    /// Candidates for the word under the cursor: commands first, then
    /// section or view names after commands that take one.
    fn candidates(line: &str) -> (usize, Vec<&'static str>) {
        match line.split_once(' ') {
            None if line.starts_with('/') => (
                0,
                COMMANDS.iter().copied().filter(|c| c.starts_with(line)).collect(),
            ),
            Some((command, rest)) if !rest.contains(' ') => {
                let names: &[&'static str] = match command {
                    "/generate" | "/select" | "/edit" | "/approve" => SECTION_NAMES,
                    "/view" => VIEW_NAMES,
                    _ => &[],
                };
                (
                    command.len() + 1,
                    names.iter().copied().filter(|n| n.starts_with(rest)).collect(),
                )
            }
            _ => (0, Vec::new()),
        }
    }
}

impl Helper for CliHelper {}

impl Completer for CliHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let (start, words) = Self::candidates(&line[..pos]);
        let pairs = words
            .into_iter()
            .map(|word| Pair {
                display: word.to_string(),
                replacement: word.to_string(),
            })
            .collect();
        Ok((start, pairs))
    }
}

impl Highlighter for CliHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if line.starts_with('/') {
            Owned(line.bright_cyan().to_string())
        } else {
            Borrowed(line)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for CliHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let line = &line[..pos];
        let (start, words) = Self::candidates(line);
        let typed = &line[start..];
        words
            .into_iter()
            .find(|word| word.len() > typed.len())
            .map(|word| word[typed.len()..].to_string())
    }
}

impl Validator for CliHelper {}
