//! The relay takes its settings from the environment. The command line only asks for help.
use std::fmt::Write;

use crate::config::RelayConfig;

const HELP: &str = include_str!("./cli-help.txt");

/// What the process was asked to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    Serve,
    ShowHelp,
    /// The first argument that is neither empty nor a request for help
    Unrecognized(String),
}

pub fn parse_invocation<I, S>(args: I) -> Invocation
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut wants_help = false;
    for arg in args {
        match arg.as_ref().trim() {
            "" => {},
            "-h" | "--help" | "help" => wants_help = true,
            other => return Invocation::Unrecognized(other.to_string()),
        }
    }
    if wants_help {
        Invocation::ShowHelp
    } else {
        Invocation::Serve
    }
}

/// The help text, followed by the address the relay would listen on with the current environment
pub fn usage(config: &RelayConfig, log_filter: Option<&str>) -> String {
    let mut text = String::with_capacity(HELP.len() + 128);
    text.push_str(HELP.trim_end());
    text.push_str("\n\nWith the current environment the relay would:\n");
    let _ = writeln!(text, "  accept clients on  ws://{}:{}/", config.host, config.port);
    let _ = writeln!(text, "  log with filter    {}", log_filter.unwrap_or("(RUST_LOG not set, errors only)"));
    text
}
