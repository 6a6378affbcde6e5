//! Inbound command envelope sent by observers.
//!
//! Commands are JSON objects tagged by a `type` field:
//!
//! | `type` | Fields | Variant |
//! |---|---|---|
//! | `fps` | `fps` | [`Command::SetRate`] |
//! | `createBodies` | `count`, `range`, `blackHole` | [`Command::CreateBodies`] |
//! | `deleteBody` | `index` | [`Command::DeleteBody`] |
//! | `reset` | -- | [`Command::Reset`] |
//!
//! Integers are decoded signed so that out-of-range values reach the
//! router and are rejected there with a precise error.

use serde::{Deserialize, Serialize};

use crate::scheduler::SchedulerError;

/// Errors produced while decoding or applying a command.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// The text is not a well-formed command.
    #[error("malformed command: {0}")]
    Decode(#[from] serde_json::Error),

    /// The requested frame rate is not a positive integer that fits `u32`.
    #[error("invalid frame rate: {fps}")]
    InvalidRate {
        /// The rejected rate.
        fps: i64,
    },

    /// The requested body count is negative or above the batch limit.
    #[error("invalid body count: {count} (limit {limit})")]
    InvalidCount {
        /// The rejected count.
        count: i64,
        /// The configured batch limit.
        limit: u32,
    },

    /// The scheduler refused the subscription.
    #[error("subscription failed: {0}")]
    Scheduler(#[from] SchedulerError),
}

/// A decoded observer command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Command {
    /// Change (or start) this observer's stream rate.
    #[serde(rename = "fps")]
    SetRate {
        /// Frames per second.
        fps: i64,
    },

    /// Add randomly placed bodies.
    #[serde(rename = "createBodies")]
    CreateBodies {
        /// How many bodies to add.
        count: i64,
        /// Positions are drawn from `[-range, range]` on each axis.
        range: f64,
        /// Create attractors instead of particles.
        #[serde(rename = "blackHole", default)]
        attractor: bool,
    },

    /// Remove the body at a collection index.
    #[serde(rename = "deleteBody")]
    DeleteBody {
        /// Index into the most recent frame's `bodies` list.
        index: i64,
    },

    /// Rebuild the initial layout.
    #[serde(rename = "reset")]
    Reset,
}

impl Command {
    /// Decode one text frame.
    pub fn decode(text: &str) -> Result<Self, CommandError> {
        Ok(serde_json::from_str(text)?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn decodes_rate_change() {
        let cmd = Command::decode(r#"{"fps": 30, "type": "fps"}"#).unwrap();
        assert_eq!(cmd, Command::SetRate { fps: 30 });
    }

    #[test]
    fn decodes_create_bodies() {
        let cmd =
            Command::decode(r#"{"type":"createBodies","count":5,"range":100.0,"blackHole":true}"#)
                .unwrap();
        assert_eq!(
            cmd,
            Command::CreateBodies {
                count: 5,
                range: 100.0,
                attractor: true
            }
        );
    }

    #[test]
    fn create_bodies_flag_defaults_to_particle() {
        let cmd = Command::decode(r#"{"type":"createBodies","count":1,"range":10}"#).unwrap();
        assert!(matches!(cmd, Command::CreateBodies { attractor: false, .. }));
    }

    #[test]
    fn decodes_delete_and_reset() {
        assert_eq!(
            Command::decode(r#"{"type":"deleteBody","index":-1}"#).unwrap(),
            Command::DeleteBody { index: -1 }
        );
        assert_eq!(Command::decode(r#"{"type":"reset"}"#).unwrap(), Command::Reset);
    }

    #[test]
    fn rejects_invalid_json() {
        assert!(matches!(
            Command::decode("invalid json"),
            Err(CommandError::Decode(_))
        ));
    }

    #[test]
    fn rejects_unknown_type_and_missing_fields() {
        assert!(Command::decode(r#"{"type":"warp","factor":9}"#).is_err());
        assert!(Command::decode(r#"{"type":"fps"}"#).is_err());
        assert!(Command::decode(r#"{"fps":30}"#).is_err());
    }

    #[test]
    fn encodes_with_wire_tags() {
        let json = serde_json::to_string(&Command::SetRate { fps: 60 }).unwrap();
        assert_eq!(json, r#"{"type":"fps","fps":60}"#);
    }
}
