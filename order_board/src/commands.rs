use std::str::FromStr;

use thiserror::Error;

/// A line typed at the dashboard prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardCommand {
    /// Confirm a relay address and connect. With no address, the current one is reused.
    Connect(Option<String>),
    /// Drop the connection and go back to editing the relay address
    Edit,
    Disconnect,
    /// Hide the order in the given slot (1-based) of the current page
    Hide(usize),
    /// Bring back the most recently hidden order
    Undo,
    RestoreAll,
    /// Set the search term. An empty term clears the search.
    Search(String),
    NextPage,
    PreviousPage,
    /// Jump to a page (1-based)
    Page(usize),
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct CommandParseError(String);

fn positive_number(arg: Option<&str>, what: &str) -> Result<usize, CommandParseError> {
    let arg = arg.ok_or_else(|| CommandParseError(format!("Which {what}?")))?;
    match arg.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(CommandParseError(format!("'{arg}' is not a valid {what}. Use a number starting from 1."))),
    }
}

impl FromStr for BoardCommand {
    type Err = CommandParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let line = s.trim();
        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };
        let arg = (!rest.is_empty()).then_some(rest);
        match verb.to_ascii_lowercase().as_str() {
            "connect" | "c" => Ok(Self::Connect(arg.map(String::from))),
            "edit" | "e" => Ok(Self::Edit),
            "disconnect" => Ok(Self::Disconnect),
            "hide" | "h" | "done" => positive_number(arg, "slot").map(Self::Hide),
            "undo" | "u" => Ok(Self::Undo),
            "restore" | "restore-all" => Ok(Self::RestoreAll),
            "search" | "s" | "/" => Ok(Self::Search(rest.to_string())),
            "next" | "n" => Ok(Self::NextPage),
            "prev" | "p" => Ok(Self::PreviousPage),
            "page" => positive_number(arg, "page").map(Self::Page),
            "help" | "?" => Ok(Self::Help),
            "quit" | "q" | "exit" => Ok(Self::Quit),
            "" => Err(CommandParseError("Type 'help' for a list of commands".into())),
            other => Err(CommandParseError(format!("Unknown command '{other}'. Type 'help' for a list of commands."))),
        }
    }
}

pub const HELP: &str = "\
Commands:
  connect [host:port]   Connect to the relay, optionally at a new address
  edit                  Disconnect and edit the relay address
  disconnect            Disconnect from the relay
  hide <slot>           Mark the order in <slot> on this page as done (paid orders only)
  undo                  Bring back the last order that was hidden
  restore               Bring back every hidden order
  search [term]         Filter by ticket number or drink name. No term clears the search
  next | prev           Change page
  page <n>              Go to page <n>
  quit                  Leave the board";
