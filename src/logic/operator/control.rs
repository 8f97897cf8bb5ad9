//! Control Port - JSON commands
//!
//! The only recognized command is `{"reloadModel": true}`. Anything else,
//! including malformed JSON, is a no-op.

use serde_json::Value as JsonValue;

pub const RELOAD_MODEL_KEY: &str = "reloadModel";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    ReloadModel,
    Ignore,
}

/// What handling a control message did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlOutcome {
    Ignored,
    Reloaded,
    ReloadFailed,
}

pub fn parse_control(payload: &str) -> ControlCommand {
    let json: JsonValue = match serde_json::from_str(payload) {
        Ok(json) => json,
        Err(e) => {
            log::warn!("Ignoring malformed control message: {}", e);
            return ControlCommand::Ignore;
        }
    };

    let Some(object) = json.as_object() else {
        log::warn!("Ignoring control message that is not a JSON object");
        return ControlCommand::Ignore;
    };

    match object.get(RELOAD_MODEL_KEY) {
        Some(JsonValue::Bool(true)) => ControlCommand::ReloadModel,
        Some(JsonValue::Bool(false)) => ControlCommand::Ignore,
        Some(other) => {
            log::warn!("Ignoring non-boolean {}: {}", RELOAD_MODEL_KEY, other);
            ControlCommand::Ignore
        }
        None => {
            log::debug!("Control message without a recognized key: {}", payload);
            ControlCommand::Ignore
        }
    }
}
