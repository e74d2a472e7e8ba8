// Cloud-to-device command grammar and acknowledgment shapes
//
// Three commands are supported. Parsing is pure so the grammar, the exact
// failure messages and the ack JSON can all be covered on the host.

use serde::{Deserialize, Serialize};

/// Ack status code for a command that was executed.
pub const ACK_SUCCESS_WITH_ACK: u8 = 6;
/// Ack status code for a command that was rejected.
pub const ACK_FAILED: u8 = 4;

/// A successfully parsed device command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    BoardUserLed(bool),
    DemoMode(bool),
    SetReportingInterval(u32),
}

impl Command {
    /// Human-readable message for the success ack.
    pub fn ack_message(&self) -> String {
        match self {
            Command::BoardUserLed(on) | Command::DemoMode(on) => {
                let value = if *on { "on" } else { "off" };
                format!("Value is now \"{value}\"")
            }
            Command::SetReportingInterval(_) => "Reporting interval set".to_string(),
        }
    }
}

/// Why a command line failed to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandError {
    Unparseable,
    Unknown,
    MissingArgument,
    BadArgument,
}

impl CommandError {
    /// Human-readable message for the failure ack.
    pub fn message(&self) -> &'static str {
        match self {
            CommandError::Unparseable => "Parsing error",
            CommandError::Unknown => "Unknown command",
            CommandError::MissingArgument => "Command requires an argument",
            CommandError::BadArgument => "Argument parsing error",
        }
    }
}

fn parse_on_off(arg: &str) -> Result<bool, CommandError> {
    match arg {
        "on" => Ok(true),
        "off" => Ok(false),
        _ => Err(CommandError::BadArgument),
    }
}

/// Parse one command line. Extra trailing tokens are ignored, matching the
/// tokenizer behavior the cloud side has always seen.
pub fn parse_command(line: &str) -> Result<Command, CommandError> {
    let line = line.trim();
    if line.is_empty() {
        return Err(CommandError::Unparseable);
    }
    let mut parts = line.split_whitespace();
    let head = parts.next().ok_or(CommandError::Unparseable)?;
    let arg = parts.next();

    match head {
        "board-user-led" => {
            let arg = arg.ok_or(CommandError::MissingArgument)?;
            Ok(Command::BoardUserLed(parse_on_off(arg)?))
        }
        "demo-mode" => {
            let arg = arg.ok_or(CommandError::MissingArgument)?;
            Ok(Command::DemoMode(parse_on_off(arg)?))
        }
        "set-reporting-interval" => {
            let arg = arg.ok_or(CommandError::MissingArgument)?;
            let ms: u32 = arg.parse().map_err(|_| CommandError::BadArgument)?;
            if ms == 0 {
                return Err(CommandError::BadArgument);
            }
            Ok(Command::SetReportingInterval(ms))
        }
        _ => Err(CommandError::Unknown),
    }
}

/// Downlink envelope as it arrives on the command topic.
#[derive(Debug, Clone, Deserialize)]
pub struct CommandEnvelope {
    #[serde(default)]
    pub ct: i32,
    #[serde(default)]
    pub cmd: String,
    #[serde(default)]
    pub ack: Option<String>,
}

impl CommandEnvelope {
    /// Parse the raw topic payload. Anything that is not JSON with a
    /// non-empty command line maps to the generic parsing failure.
    pub fn from_payload(payload: &[u8]) -> Result<CommandEnvelope, CommandError> {
        let envelope: CommandEnvelope =
            serde_json::from_slice(payload).map_err(|_| CommandError::Unparseable)?;
        if envelope.cmd.trim().is_empty() {
            return Err(CommandError::Unparseable);
        }
        Ok(envelope)
    }
}

/// Uplink acknowledgment for a command that carried an ack id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CommandAck {
    pub ack: String,
    pub st: u8,
    pub msg: String,
}

impl CommandAck {
    pub fn success(ack_id: &str, msg: impl Into<String>) -> Self {
        Self {
            ack: ack_id.to_string(),
            st: ACK_SUCCESS_WITH_ACK,
            msg: msg.into(),
        }
    }

    pub fn failed(ack_id: &str, msg: impl Into<String>) -> Self {
        Self {
            ack: ack_id.to_string(),
            st: ACK_FAILED,
            msg: msg.into(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
