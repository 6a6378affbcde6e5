//! Outbound state frame streamed to observers.
//!
//! Every frame is a JSON object with a single `bodies` key holding the
//! collection in order. Each body always carries all eight fields
//! (`x`, `y`, `z`, `vx`, `vy`, `vz`, `mass`, `blackHole`); the display
//! front end depends on these exact names. Non-finite components are
//! written as `null` by `serde_json`.

use nbody_physics::Body;
use serde::{Deserialize, Serialize};

/// Wire form of one body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BodyFrame {
    /// Position X.
    pub x: f64,
    /// Position Y.
    pub y: f64,
    /// Position Z.
    pub z: f64,
    /// Velocity X.
    pub vx: f64,
    /// Velocity Y.
    pub vy: f64,
    /// Velocity Z.
    pub vz: f64,
    /// Mass.
    pub mass: f64,
    /// Attractor flag.
    pub black_hole: bool,
}

impl From<&Body> for BodyFrame {
    fn from(body: &Body) -> Self {
        Self {
            x: body.x(),
            y: body.y(),
            z: body.z(),
            vx: body.vx(),
            vy: body.vy(),
            vz: body.vz(),
            mass: body.mass,
            black_hole: body.is_attractor(),
        }
    }
}

/// One full state frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateFrame {
    /// Every body, in collection order.
    pub bodies: Vec<BodyFrame>,
}

impl StateFrame {
    /// Project a snapshot onto the wire form.
    pub fn from_bodies(bodies: &[Body]) -> Self {
        Self {
            bodies: bodies.iter().map(BodyFrame::from).collect(),
        }
    }

    /// Encode as the JSON text sent to observers.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
