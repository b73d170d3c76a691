use std::path::PathBuf;
use std::str::FromStr;

use architect_core::section::SectionKind;
use architect_core::session::View;

pub const COMMANDS: &[&str] = &[
    "/generate",
    "/select",
    "/edit",
    "/approve",
    "/finalize",
    "/chat",
    "/fix",
    "/view",
    "/home",
    "/recover",
    "/show",
    "/help",
    "/logout",
];

pub const SECTION_NAMES: &[&str] = &["headline", "about", "experience", "strategy"];
pub const VIEW_NAMES: &[&str] = &["profile-builder", "troubleshooter", "post-writer"];

/// One line of REPL input.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Generate(SectionKind),
    /// Option index is zero-based here; users type it one-based.
    Select(SectionKind, usize),
    Edit(SectionKind, usize, String),
    Approve(SectionKind),
    Finalize,
    Chat,
    Fix { image: PathBuf, query: String },
    View(View),
    Home,
    Recover,
    Show,
    Help,
    Logout,
    Quit,
    /// Anything not starting with `/` is a chat message.
    Message(String),
}

impl FromStr for Command {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        if line == "quit" || line == "exit" {
            return Ok(Command::Quit);
        }
        if !line.starts_with('/') {
            return Ok(Command::Message(line.to_string()));
        }

        let mut words = line.splitn(2, ' ');
        let name = words.next().unwrap_or_default();
        let rest = words.next().unwrap_or_default().trim();

        match name {
            "/generate" => Ok(Command::Generate(section(rest)?)),
            "/select" => {
                let (kind, index) = section_and_index(rest)?;
                Ok(Command::Select(kind, index))
            }
            "/edit" => {
                let (head, text) = split_after(rest, 2);
                let (kind, index) = section_and_index(head)?;
                if text.is_empty() {
                    return Err("Usage: /edit <section> <option> <new text>".to_string());
                }
                Ok(Command::Edit(kind, index, text.to_string()))
            }
            "/approve" => Ok(Command::Approve(section(rest)?)),
            "/finalize" => Ok(Command::Finalize),
            "/chat" => Ok(Command::Chat),
            "/fix" => {
                let (image, query) = split_after(rest, 1);
                if image.is_empty() {
                    return Err("Usage: /fix <image-path> [question]".to_string());
                }
                Ok(Command::Fix {
                    image: PathBuf::from(image),
                    query: query.to_string(),
                })
            }
            // Onboarding is entered by logging out, not by navigation.
            "/view" => View::from_str(rest)
                .ok()
                .filter(|view| *view != View::Onboarding)
                .map(Command::View)
                .ok_or_else(|| format!("Unknown view '{rest}'. Try: {}", VIEW_NAMES.join(", "))),
            "/home" => Ok(Command::Home),
            "/recover" => Ok(Command::Recover),
            "/show" => Ok(Command::Show),
            "/help" => Ok(Command::Help),
            "/logout" => Ok(Command::Logout),
            other => Err(format!("Unknown command '{other}'. Type /help for a list.")),
        }
    }
}

fn section(word: &str) -> Result<SectionKind, String> {
    SectionKind::from_str(word)
        .map_err(|_| format!("Unknown section '{word}'. Try: {}", SECTION_NAMES.join(", ")))
}

fn section_and_index(rest: &str) -> Result<(SectionKind, usize), String> {
    let mut words = rest.split_whitespace();
    let kind = section(words.next().unwrap_or_default())?;
    let index = match words.next().map(str::parse::<usize>) {
        Some(Ok(n)) if n > 0 => n - 1,
        _ => return Err("Option numbers start at 1".to_string()),
    };
    Ok((kind, index))
}

/// Splits off the first `count` whitespace-separated words, returning them
/// and the untouched remainder.
fn split_after(rest: &str, count: usize) -> (&str, &str) {
    let mut end = 0;
    let mut seen = 0;
    let mut in_word = false;
    for (i, c) in rest.char_indices() {
        if c.is_whitespace() {
            if in_word {
                seen += 1;
                in_word = false;
                if seen == count {
                    end = i;
                    break;
                }
            }
        } else {
            in_word = true;
        }
        end = i + c.len_utf8();
    }
    let (head, tail) = rest.split_at(end);
    (head.trim(), tail.trim())
}
