//! Line-oriented navigation session
//!
//! Reads one command per line and drives a `Navigator`:
//!
//! ```text
//! to <id>   zoom into a member
//! back      return to the previous view
//! top       return to the tree owner
//! show      render the current view
//! flat      list the current view
//! where     print the breadcrumb
//! help      list commands
//! quit      end the session
//! ```

use std::io::{BufRead, Write};

use itertools::Itertools;
use tracing::debug;

use crate::cli::commands::flat_line;
use crate::cli::error::CliResult;
use crate::domain::Navigator;
use crate::infrastructure::InfraError;
use crate::tree_traits::render_tree;

const PROMPT: &str = "matrixnet> ";

const HELP: &str = "\
commands:
  to <id>   zoom into a member
  back      return to the previous view
  top       return to the tree owner
  show      render the current view
  flat      list the current view
  where     print the breadcrumb
  help      list commands
  quit      end the session";

/// A parsed session command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowseCommand {
    To(String),
    Back,
    Top,
    Show,
    Flat,
    Where,
    Help,
    Quit,
    Blank,
    Unknown(String),
}

impl BrowseCommand {
    pub fn parse(line: &str) -> Self {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return BrowseCommand::Blank;
        };
        match (verb, words.next()) {
            ("to" | "cd", Some(id)) => BrowseCommand::To(id.to_string()),
            ("back" | "..", None) => BrowseCommand::Back,
            ("top", None) => BrowseCommand::Top,
            ("show" | "tree", None) => BrowseCommand::Show,
            ("flat" | "ls", None) => BrowseCommand::Flat,
            ("where" | "pwd", None) => BrowseCommand::Where,
            ("help" | "?", None) => BrowseCommand::Help,
            ("quit" | "exit" | "q", None) => BrowseCommand::Quit,
            _ => BrowseCommand::Unknown(line.trim().to_string()),
        }
    }
}

/// Breadcrumb rendering: previous roots, then the current one.
pub fn where_line(navigator: &Navigator) -> String {
    navigator
        .breadcrumb()
        .iter()
        .chain(std::iter::once(navigator.current_root_id()))
        .join(" > ")
}

/// Run commands from `input` until `quit` or end of input.
pub fn run_session<R: BufRead, W: Write>(
    navigator: &mut Navigator,
    input: R,
    out: &mut W,
) -> CliResult<()> {
    let arity = navigator.store().max_arity();
    let write_err = |e| InfraError::io("write browse output", e);

    write!(out, "{PROMPT}").map_err(write_err)?;
    out.flush().map_err(write_err)?;

    for line in input.lines() {
        let line = line.map_err(|e| InfraError::io("read browse input", e))?;
        let command = BrowseCommand::parse(&line);
        debug!("browse: {:?}", command);

        match command {
            BrowseCommand::Quit => return Ok(()),
            BrowseCommand::Blank => {}
            BrowseCommand::To(id) => {
                if !navigator.navigate_to(&id) {
                    writeln!(out, "view unchanged").map_err(write_err)?;
                }
                writeln!(out, "{}", where_line(navigator)).map_err(write_err)?;
            }
            BrowseCommand::Back => {
                navigator.navigate_back();
                writeln!(out, "{}", where_line(navigator)).map_err(write_err)?;
            }
            BrowseCommand::Top => {
                navigator.navigate_to_top();
                writeln!(out, "{}", where_line(navigator)).map_err(write_err)?;
            }
            BrowseCommand::Where => {
                writeln!(out, "{}", where_line(navigator)).map_err(write_err)?;
            }
            BrowseCommand::Show => {
                let view = navigator.current_view()?;
                write!(out, "{}", render_tree(&view, arity)).map_err(write_err)?;
            }
            BrowseCommand::Flat => {
                for node in navigator.flatten()? {
                    writeln!(out, "{}", flat_line(&node, arity)).map_err(write_err)?;
                }
            }
            BrowseCommand::Help => {
                writeln!(out, "{HELP}").map_err(write_err)?;
            }
            BrowseCommand::Unknown(text) => {
                writeln!(out, "unknown command: {text} (try 'help')").map_err(write_err)?;
            }
        }

        write!(out, "{PROMPT}").map_err(write_err)?;
        out.flush().map_err(write_err)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("to l1", BrowseCommand::To("l1".to_string()))]
    #[case("  cd   c1  ", BrowseCommand::To("c1".to_string()))]
    #[case("back", BrowseCommand::Back)]
    #[case("top", BrowseCommand::Top)]
    #[case("show", BrowseCommand::Show)]
    #[case("ls", BrowseCommand::Flat)]
    #[case("where", BrowseCommand::Where)]
    #[case("?", BrowseCommand::Help)]
    #[case("exit", BrowseCommand::Quit)]
    #[case("   ", BrowseCommand::Blank)]
    #[case("to", BrowseCommand::Unknown("to".to_string()))]
    #[case("back twice", BrowseCommand::Unknown("back twice".to_string()))]
    fn given_line_when_parsing_then_yields_command(
        #[case] line: &str,
        #[case] expected: BrowseCommand,
    ) {
        assert_eq!(BrowseCommand::parse(line), expected);
    }
}
