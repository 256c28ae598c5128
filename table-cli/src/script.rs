use std::str::FromStr;

use rpc::Request;
use serde_json::json;
use tinytable::Verb;

use crate::error::ScriptParseError;

/// One line of a session script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    /// Blank line or `#` comment.
    Skip,
    Close,
    Call { verb: Verb, argument: Option<String> },
}

impl FromStr for Line {
    type Err = ScriptParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let line = s.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(Line::Skip);
        }

        let (command, argument) = match line.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, Some(rest.trim().to_owned())),
            None => (line, None),
        };
        if command.eq_ignore_ascii_case("close") {
            return Ok(Line::Close);
        }

        let verb: Verb = command
            .parse()
            .map_err(|_| ScriptParseError::UnknownCommand(command.to_owned()))?;
        match (verb, argument) {
            (Verb::List, Some(_)) => {
                Err(ScriptParseError::UnexpectedArgument(verb.to_string()))
            }
            (Verb::List, None) => Ok(Line::Call {
                verb,
                argument: None,
            }),
            (_, None) => {
                Err(ScriptParseError::MissingArgument(verb.to_string()))
            }
            (verb, argument) => Ok(Line::Call { verb, argument }),
        }
    }
}

impl Line {
    /// The solicit a call line stands for, or `None` for control lines.
    pub fn to_request(&self, solicit_prefix: &str) -> Option<Request> {
        let Line::Call { verb, argument } = self else {
            return None;
        };
        let argument = argument.clone().unwrap_or_default();
        let data = match verb {
            Verb::Insert => json!({ "name": argument }),
            Verb::Delete | Verb::Get => json!({ "id": argument }),
            Verb::List => json!({}),
        };
        Some(Request::new(verb.path(solicit_prefix), data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_calls() {
        assert_eq!(
            "insert Mary Ann".parse::<Line>().unwrap(),
            Line::Call {
                verb: Verb::Insert,
                argument: Some("Mary Ann".to_owned())
            }
        );
        assert_eq!(
            "  LIST ".parse::<Line>().unwrap(),
            Line::Call {
                verb: Verb::List,
                argument: None
            }
        );
        assert_eq!("close".parse::<Line>().unwrap(), Line::Close);
        assert_eq!("# note".parse::<Line>().unwrap(), Line::Skip);
        assert_eq!("".parse::<Line>().unwrap(), Line::Skip);
    }

    #[test]
    fn rejects_malformed_lines() {
        assert!(matches!(
            "rename 1 Bob".parse::<Line>(),
            Err(ScriptParseError::UnknownCommand(_))
        ));
        assert!(matches!(
            "delete".parse::<Line>(),
            Err(ScriptParseError::MissingArgument(_))
        ));
        assert!(matches!(
            "list all".parse::<Line>(),
            Err(ScriptParseError::UnexpectedArgument(_))
        ));
    }

    #[test]
    fn builds_solicits() {
        let line: Line = "delete 2".parse().unwrap();
        let request = line.to_request("API/").unwrap();
        assert_eq!(request.verb, "API/Delete");
        assert_eq!(request.data, json!({"id": "2"}));
        assert!(Line::Close.to_request("API/").is_none());
    }
}
