//! rustyline helper: command completion, hints and highlighting.

use std::borrow::Cow::{self, Borrowed, Owned};

use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Helper};

use super::command::COMMAND_WORDS;

#[derive(Clone)]
pub struct ConsoleHelper {
    commands: Vec<&'static str>,
}

impl ConsoleHelper {
    pub fn new() -> Self {
        Self {
            commands: COMMAND_WORDS.to_vec(),
        }
    }

    fn first_word_match<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = &'static str> + 'a {
        self.commands
            .iter()
            .copied()
            .filter(move |cmd| !prefix.is_empty() && cmd.starts_with(prefix))
    }
}

impl Helper for ConsoleHelper {}

impl Completer for ConsoleHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];
        if line.contains(' ') {
            return Ok((0, vec![]));
        }
        let candidates = self
            .first_word_match(line)
            .map(|cmd| Pair {
                display: cmd.to_string(),
                replacement: cmd.to_string(),
            })
            .collect();
        Ok((0, candidates))
    }
}

impl Highlighter for ConsoleHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        let word = line.split_whitespace().next().unwrap_or("");
        if line.starts_with(word) && self.commands.contains(&word) {
            Owned(format!("{}{}", word.bright_cyan(), &line[word.len()..]))
        } else {
            Borrowed(line)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for ConsoleHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let line = &line[..pos];
        if line.contains(' ') {
            return None;
        }
        self.first_word_match(line)
            .find(|cmd| cmd.len() > line.len())
            .map(|cmd| cmd[line.len()..].to_string())
    }
}

impl Validator for ConsoleHelper {}
