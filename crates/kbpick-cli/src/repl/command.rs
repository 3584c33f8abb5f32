//! Console command parsing.

use std::str::FromStr;

use kbpick_core::listing::{SortDirection, SortField};

/// Every word the console understands, for completion and hints.
pub const COMMAND_WORDS: &[&str] = &[
    "conns", "use", "ls", "cd", "up", "root", "crumb", "sel", "find", "sort", "index", "unindex",
    "refresh", "open", "login", "retry", "logout", "help", "quit",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Connections,
    /// 1-based connection number.
    Use(usize),
    List,
    /// 1-based row number.
    Enter(usize),
    Up,
    Root,
    /// 0-based breadcrumb index.
    Crumb(usize),
    /// Toggle the given 1-based rows.
    Select(Vec<usize>),
    Find(String),
    Sort(SortField, SortDirection),
    Index,
    Unindex(Vec<usize>),
    Refresh,
    Open(usize),
    Login,
    Retry,
    Logout,
    Help,
    Quit,
}

fn number(arg: Option<&str>, what: &str) -> Result<usize, String> {
    let arg = arg.ok_or_else(|| format!("missing {what}"))?;
    arg.parse::<usize>()
        .map_err(|_| format!("'{arg}' is not a valid {what}"))
}

fn row_number(arg: Option<&str>) -> Result<usize, String> {
    match number(arg, "row number")? {
        0 => Err("row numbers start at 1".to_string()),
        n => Ok(n),
    }
}

fn row_numbers<'a>(args: impl Iterator<Item = &'a str>) -> Result<Vec<usize>, String> {
    let rows = args
        .map(|a| row_number(Some(a)))
        .collect::<Result<Vec<_>, _>>()?;
    if rows.is_empty() {
        return Err("missing row number".to_string());
    }
    Ok(rows)
}

impl FromStr for ReplCommand {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };
        let mut args = rest.split_whitespace();

        let command = match word {
            "conns" => Self::Connections,
            "use" => Self::Use(row_number(args.next())?),
            "ls" => Self::List,
            "cd" => match args.next() {
                Some("..") => Self::Up,
                other => Self::Enter(row_number(other)?),
            },
            "up" => Self::Up,
            "root" => Self::Root,
            "crumb" => Self::Crumb(number(args.next(), "breadcrumb index")?),
            "sel" => Self::Select(row_numbers(args)?),
            // The rest of the line, verbatim; empty clears the filter.
            "find" => Self::Find(rest.to_string()),
            "sort" => {
                let field = args
                    .next()
                    .map(SortField::from_str)
                    .transpose()
                    .map_err(|_| "sort by 'name' or 'modified'".to_string())?
                    .unwrap_or_default();
                let direction = args
                    .next()
                    .map(SortDirection::from_str)
                    .transpose()
                    .map_err(|_| "direction is 'asc' or 'desc'".to_string())?
                    .unwrap_or_default();
                Self::Sort(field, direction)
            }
            "index" => Self::Index,
            "unindex" => Self::Unindex(row_numbers(args)?),
            "refresh" => Self::Refresh,
            "open" => Self::Open(row_number(args.next())?),
            "login" => Self::Login,
            "retry" => Self::Retry,
            "logout" => Self::Logout,
            "help" | "?" => Self::Help,
            "quit" | "exit" => Self::Quit,
            other => return Err(format!("unknown command '{other}' (try 'help')")),
        };
        Ok(command)
    }
}

pub const HELP: &str = "\
conns               list connections
use <n>             switch to connection n
ls                  list the current folder
cd <n> | cd ..      enter folder n / go up
up, root            go up one level / back to the root
crumb <i>           jump to breadcrumb i (0 = first folder)
sel <n>...          toggle selection of rows
find [text]         filter by name (no text clears)
sort name|modified [asc|desc]
index               index the selected rows
unindex <n>...      remove rows from the knowledge base
refresh             re-fetch the current folder
open <n>            enter a folder or show a file's link
login, retry        log in (retry resets the attempt counter)
logout, help, quit";
