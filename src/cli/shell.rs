//! Interactive shell command parsing

use thiserror::Error;

/// Error for a line that is not a valid command
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Unknown command '{0}'. Type 'help' for a list of commands")]
    UnknownCommand(String),

    #[error("'{command}' needs {expected}")]
    MissingArgument {
        command: &'static str,
        expected: &'static str,
    },

    #[error("'{0}' is not a recording number")]
    InvalidIndex(String),
}

/// One line typed into the shell.
/// Indices are 0-based here; the user types 1-based numbers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    /// Start a capture, or stop and keep the running one
    Record,
    /// Stop whatever is running, keeping a capture
    Stop,
    /// Stop the running capture without keeping it
    Discard,
    /// Play a recording, or stop it if it is the one playing
    Play(usize),
    List,
    Rename { index: usize, title: String },
    Delete(usize),
    Status,
    Help,
    Quit,
    /// Blank line
    Empty,
}

impl ShellCommand {
    /// Parse one input line
    pub fn parse(line: &str) -> Result<Self, ParseError> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        match word.to_lowercase().as_str() {
            "" => Ok(Self::Empty),
            "record" | "rec" | "r" => Ok(Self::Record),
            "stop" | "s" => Ok(Self::Stop),
            "discard" => Ok(Self::Discard),
            "play" | "p" => parse_index("play", rest).map(Self::Play),
            "list" | "ls" | "l" => Ok(Self::List),
            "rename" | "mv" => {
                let (number, title) = match rest.split_once(char::is_whitespace) {
                    Some((number, title)) => (number, title.trim()),
                    None => (rest, ""),
                };
                let index = parse_index("rename", number)?;
                if title.is_empty() {
                    return Err(ParseError::MissingArgument {
                        command: "rename",
                        expected: "a recording number and a title",
                    });
                }
                Ok(Self::Rename {
                    index,
                    title: title.to_string(),
                })
            }
            "delete" | "rm" => parse_index("delete", rest).map(Self::Delete),
            "status" => Ok(Self::Status),
            "help" | "?" | "h" => Ok(Self::Help),
            "quit" | "exit" | "q" => Ok(Self::Quit),
            other => Err(ParseError::UnknownCommand(other.to_string())),
        }
    }
}

/// Parse a 1-based recording number into a 0-based index
fn parse_index(command: &'static str, text: &str) -> Result<usize, ParseError> {
    let text = text.split_whitespace().next().unwrap_or("");
    if text.is_empty() {
        return Err(ParseError::MissingArgument {
            command,
            expected: "a recording number",
        });
    }
    match text.parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n - 1),
        _ => Err(ParseError::InvalidIndex(text.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_commands() {
        assert_eq!(ShellCommand::parse("record"), Ok(ShellCommand::Record));
        assert_eq!(ShellCommand::parse("  STOP "), Ok(ShellCommand::Stop));
        assert_eq!(ShellCommand::parse("list"), Ok(ShellCommand::List));
        assert_eq!(ShellCommand::parse("q"), Ok(ShellCommand::Quit));
        assert_eq!(ShellCommand::parse(""), Ok(ShellCommand::Empty));
    }

    #[test]
    fn play_converts_to_zero_based() {
        assert_eq!(ShellCommand::parse("play 1"), Ok(ShellCommand::Play(0)));
        assert_eq!(ShellCommand::parse("p 12"), Ok(ShellCommand::Play(11)));
    }

    #[test]
    fn zero_is_not_a_recording_number() {
        assert_eq!(
            ShellCommand::parse("delete 0"),
            Err(ParseError::InvalidIndex("0".to_string()))
        );
    }

    #[test]
    fn missing_number_is_reported() {
        assert!(matches!(
            ShellCommand::parse("play"),
            Err(ParseError::MissingArgument { command: "play", .. })
        ));
    }

    #[test]
    fn rename_keeps_spaces_in_title() {
        assert_eq!(
            ShellCommand::parse("rename 2   Team   standup "),
            Ok(ShellCommand::Rename {
                index: 1,
                title: "Team   standup".to_string()
            })
        );
    }

    #[test]
    fn rename_needs_a_title() {
        assert!(matches!(
            ShellCommand::parse("rename 2"),
            Err(ParseError::MissingArgument {
                command: "rename",
                ..
            })
        ));
    }

    #[test]
    fn unknown_command_is_rejected() {
        assert_eq!(
            ShellCommand::parse("dance now"),
            Err(ParseError::UnknownCommand("dance".to_string()))
        );
    }
}
