//! Wire protocol for the control channel
//!
//! The protocol is text based and line delimited. A request is one line:
//! the command token, a single space, and the JSON-encoded options object.
//! A reply is one line: an integer status code, whitespace, and an optional
//! payload. Status `200` is the sole success value; on success the payload
//! is either empty or a JSON-encoded value, on failure it is a free-form
//! diagnostic string.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{ControlError, Result};

/// Sole success status code in the control protocol
pub const STATUS_OK: u16 = 200;

/// Options mapping sent alongside every command.
///
/// Keys are unique and insertion order is irrelevant; an empty mapping still
/// encodes as `{}` because the server always expects a JSON token after the
/// command.
pub type CommandOptions = serde_json::Map<String, Value>;

/// Serialize a command and its options into a single request line.
///
/// The command must be a non-empty token with no embedded whitespace — a
/// space or newline inside it would desynchronize the server's parser, so
/// such input is rejected up front with [`ControlError::InvalidCommand`]
/// rather than escaped.
pub fn encode_request(command: &str, options: CommandOptions) -> Result<String> {
    if command.is_empty() || command.contains(char::is_whitespace) {
        return Err(ControlError::InvalidCommand(command.to_string()));
    }
    Ok(format!("{} {}\n", command, Value::Object(options)))
}

/// A decoded reply line from the control server
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// Status 200 with a JSON payload
    Success(Value),
    /// Status 200 with no payload
    SuccessEmpty,
    /// Any other status, with the raw reply text for diagnostics
    Failure {
        /// Numeric status code (0 when the code token was not numeric)
        code: u16,
        /// Remainder of the reply line (may be empty, need not be JSON)
        reply: String,
    },
}

impl Reply {
    /// Parse one reply line.
    ///
    /// The line is split on the first run of whitespace into a code token
    /// and the payload text. A code token that does not parse as an integer
    /// is treated as numeric zero, i.e. failure. An invalid JSON payload on
    /// the success path is a protocol violation and surfaces as
    /// [`ControlError::Decode`] — it is never silently treated as "no
    /// payload".
    pub fn parse(line: &str) -> Result<Self> {
        let line = line.trim();
        let (code_token, reply) = match line.split_once(char::is_whitespace) {
            Some((code, rest)) => (code, rest.trim_start()),
            None => (line, ""),
        };
        let code = code_token.parse::<u16>().unwrap_or(0);

        if code != STATUS_OK {
            return Ok(Reply::Failure {
                code,
                reply: reply.to_string(),
            });
        }

        if reply.is_empty() {
            Ok(Reply::SuccessEmpty)
        } else {
            serde_json::from_str(reply)
                .map(Reply::Success)
                .map_err(ControlError::Decode)
        }
    }

    /// Fold the reply into the client-facing result, turning a `Failure`
    /// into [`ControlError::Server`].
    pub(crate) fn into_command_result(self) -> Result<CommandResult> {
        match self {
            Reply::Success(value) => Ok(CommandResult::Payload(value)),
            Reply::SuccessEmpty => Ok(CommandResult::Ok),
            Reply::Failure { code, reply } => Err(ControlError::Server { code, reply }),
        }
    }
}

/// Successful outcome of a control command
#[derive(Debug, Clone, PartialEq)]
pub enum CommandResult {
    /// The server returned a JSON payload
    Payload(Value),
    /// The server acknowledged the command without a payload
    Ok,
}

impl CommandResult {
    /// Borrow the payload, if the server sent one
    pub fn payload(&self) -> Option<&Value> {
        match self {
            CommandResult::Payload(value) => Some(value),
            CommandResult::Ok => None,
        }
    }

    /// Deserialize the payload into a typed value.
    ///
    /// A payload-less acknowledgement decodes as JSON `null`, so `T` should
    /// be an `Option` when the command may legitimately return nothing.
    pub fn decode<T: DeserializeOwned>(self) -> Result<T> {
        let value = match self {
            CommandResult::Payload(value) => value,
            CommandResult::Ok => Value::Null,
        };
        serde_json::from_value(value).map_err(ControlError::Decode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn options(entries: &[(&str, Value)]) -> CommandOptions {
        entries
            .iter()
            .map(|(key, value)| (key.to_string(), value.clone()))
            .collect()
    }

    #[test]
    fn test_encode_request_framing() {
        let line = encode_request("start", options(&[("name", json!("web"))])).unwrap();
        assert_eq!(line, "start {\"name\":\"web\"}\n");
    }

    #[test]
    fn test_encode_empty_options() {
        let line = encode_request("status", CommandOptions::new()).unwrap();
        assert_eq!(line, "status {}\n");
    }

    #[test]
    fn test_encode_rejects_whitespace_commands() {
        for command in ["", "two words", "tab\tbed", "new\nline"] {
            let err = encode_request(command, CommandOptions::new()).unwrap_err();
            assert!(
                matches!(err, ControlError::InvalidCommand(ref c) if c.as_str() == command),
                "expected InvalidCommand for {:?}",
                command
            );
        }
    }

    #[test]
    fn test_parse_success_payload() {
        let reply = Reply::parse("200 {\"a\":1}\n").unwrap();
        assert_eq!(reply, Reply::Success(json!({"a": 1})));
    }

    #[test]
    fn test_parse_success_empty_payload() {
        assert_eq!(Reply::parse("200\n").unwrap(), Reply::SuccessEmpty);
        assert_eq!(Reply::parse("200 \n").unwrap(), Reply::SuccessEmpty);
        assert_eq!(Reply::parse("200   ").unwrap(), Reply::SuccessEmpty);
    }

    #[test]
    fn test_parse_crlf_terminator() {
        let reply = Reply::parse("200 {\"a\":1}\r\n").unwrap();
        assert_eq!(reply, Reply::Success(json!({"a": 1})));
    }

    #[test]
    fn test_parse_failure_carries_code_and_text() {
        let reply = Reply::parse("404 not found\n").unwrap();
        assert_eq!(
            reply,
            Reply::Failure {
                code: 404,
                reply: "not found".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_failure_empty_reply() {
        let reply = Reply::parse("500\n").unwrap();
        assert_eq!(
            reply,
            Reply::Failure {
                code: 500,
                reply: String::new(),
            }
        );
    }

    #[test]
    fn test_parse_non_numeric_code_is_failure() {
        let reply = Reply::parse("garbage oops\n").unwrap();
        assert_eq!(
            reply,
            Reply::Failure {
                code: 0,
                reply: "oops".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_invalid_json_payload_is_decode_error() {
        let err = Reply::parse("200 {not valid json}\n").unwrap_err();
        assert!(matches!(err, ControlError::Decode(_)));
    }

    #[test]
    fn test_failure_folds_into_server_error() {
        let err = Reply::Failure {
            code: 404,
            reply: "not found".to_string(),
        }
        .into_command_result()
        .unwrap_err();
        match err {
            ControlError::Server { code, reply } => {
                assert_eq!(code, 404);
                assert_eq!(reply, "not found");
            }
            other => panic!("expected Server error, got {:?}", other),
        }
    }

    #[test]
    fn test_command_result_payload_accessor() {
        let result = CommandResult::Payload(json!({"pid": 42}));
        assert_eq!(result.payload(), Some(&json!({"pid": 42})));
        assert_eq!(CommandResult::Ok.payload(), None);
    }

    #[test]
    fn test_command_result_typed_decode() {
        #[derive(Debug, PartialEq, serde::Deserialize)]
        struct Status {
            running: bool,
        }

        let status: Status = CommandResult::Payload(json!({"running": true}))
            .decode()
            .unwrap();
        assert_eq!(status, Status { running: true });

        let none: Option<Status> = CommandResult::Ok.decode().unwrap();
        assert_eq!(none, None);
    }

    proptest! {
        #[test]
        fn request_framing_round_trips(
            command in "[a-z][a-z0-9_-]{0,15}",
            entries in proptest::collection::btree_map("[a-z]{1,8}", any::<i64>(), 0..6),
        ) {
            let mut opts = CommandOptions::new();
            for (key, value) in &entries {
                opts.insert(key.clone(), Value::from(*value));
            }

            let line = encode_request(&command, opts.clone()).unwrap();
            prop_assert!(line.ends_with('\n'));

            let stripped = line.strip_suffix('\n').unwrap();
            let (token, json) = stripped.split_once(' ').unwrap();
            prop_assert_eq!(token, command.as_str());

            // Decoding the emitted JSON reproduces the original options.
            let decoded: Value = serde_json::from_str(json).unwrap();
            prop_assert_eq!(decoded, Value::Object(opts));
        }
    }
}
