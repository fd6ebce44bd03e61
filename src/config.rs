// src/config.rs

//! Session configuration.
//!
//! Options handed to the engine when a session starts. Everything defaults
//! so that `SessionOptions::default()` gives a full-screen session with
//! silent engine logging; the structs deserialize from a configuration
//! file (JSON here) with missing fields filled from the defaults.

use serde::{Deserialize, Serialize};

/// Verbosity of the engine's own diagnostic output, on the engine's scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EngineLogLevel {
    #[default]
    Silent,
    Panic,
    Fatal,
    Error,
    Warning,
    Info,
    Verbose,
    Debug,
    Trace,
}

impl EngineLogLevel {
    /// The engine's numeric encoding (silent is -1, panic is 0, and so on).
    pub const fn to_raw(self) -> i32 {
        match self {
            EngineLogLevel::Silent => -1,
            EngineLogLevel::Panic => 0,
            EngineLogLevel::Fatal => 1,
            EngineLogLevel::Error => 2,
            EngineLogLevel::Warning => 3,
            EngineLogLevel::Info => 4,
            EngineLogLevel::Verbose => 5,
            EngineLogLevel::Debug => 6,
            EngineLogLevel::Trace => 7,
        }
    }
}

/// Options for starting an engine session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SessionOptions {
    /// Engine diagnostic verbosity.
    pub log_level: EngineLogLevel,
    /// Margins (in cells) left around the rendered area.
    pub margin_top: u32,
    pub margin_right: u32,
    pub margin_bottom: u32,
    pub margin_left: u32,
    /// File descriptor the session renders to; the controlling terminal
    /// when absent.
    pub output_fd: Option<i32>,
}

impl SessionOptions {
    /// Parses options from a JSON document; missing fields default.
    pub fn from_json_str(json: &str) -> serde_json::Result<SessionOptions> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_silent_and_fullscreen() {
        let opts = SessionOptions::default();
        assert_eq!(opts.log_level, EngineLogLevel::Silent);
        assert_eq!(opts.margin_top, 0);
        assert_eq!(opts.output_fd, None);
    }

    #[test]
    fn json_fills_missing_fields_from_defaults() {
        let opts =
            SessionOptions::from_json_str(r#"{"log_level": "debug", "margin_left": 2}"#).unwrap();
        assert_eq!(opts.log_level, EngineLogLevel::Debug);
        assert_eq!(opts.margin_left, 2);
        assert_eq!(opts.margin_right, 0);
    }

    #[test]
    fn log_levels_use_the_engine_scale() {
        assert_eq!(EngineLogLevel::Silent.to_raw(), -1);
        assert_eq!(EngineLogLevel::Debug.to_raw(), 6);
    }
}
