use crate::engine::QuaternionOrder;
use crate::error::ProtocolError;
use crate::projection::{HitResult, Wall};
use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq)]
pub struct Quaternion {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Quaternion {
    pub const IDENTITY: Quaternion = Quaternion {
        x: 0.0,
        y: 0.0,
        z: 0.0,
        w: 1.0,
    };
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Partial configuration pushed by the control page.
///
/// Only the fields present in the message are applied.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ConfigUpdate {
    pub distance: Option<f32>,
    pub smooth: Option<f32>,
    #[serde(rename = "offX")]
    pub off_x: Option<f32>,
    #[serde(rename = "offY")]
    pub off_y: Option<f32>,
    #[serde(rename = "quaternionOrder")]
    pub quaternion_order: Option<QuaternionOrder>,
}

impl ConfigUpdate {
    pub fn validate(&self) -> Result<(), ProtocolError> {
        let fields = [
            ("distance", self.distance),
            ("smooth", self.smooth),
            ("offX", self.off_x),
            ("offY", self.off_y),
        ];
        for &(field, value) in fields.iter() {
            if let Some(value) = value {
                if !value.is_finite() {
                    return Err(ProtocolError::InvalidValue { field, value });
                }
            }
        }
        if let Some(distance) = self.distance {
            if distance <= 0.0 {
                return Err(ProtocolError::InvalidValue {
                    field: "distance",
                    value: distance,
                });
            }
        }
        Ok(())
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundMessage {
    Move {
        q: Quaternion,
        #[serde(default)]
        roll: Option<f32>,
    },
    Calibrate,
    CalibrateTl,
    CalibrateBr,
    SetMode {
        mode: i32,
    },
    Config(ConfigUpdate),
    /// Anything else the relay forwards to us, e.g. viewer chatter.
    #[serde(other)]
    Other,
}

impl InboundMessage {
    pub fn deserialize(data: &[u8]) -> Result<InboundMessage, ProtocolError> {
        Ok(serde_json::from_slice::<InboundMessage>(data)?)
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "type")]
pub enum OutboundMessage {
    #[serde(rename = "3d_move")]
    Move3d { x: f32, y: f32, z: f32, wall: Wall },
}

impl OutboundMessage {
    /// Viewer uses a right handed frame looking down -z, so depth is flipped.
    /// A ray that strikes nothing is reported at the origin tagged `None`.
    pub fn from_hit(hit: Option<&HitResult>) -> Self {
        match hit {
            Some(hit) => OutboundMessage::Move3d {
                x: hit.point.x,
                y: hit.point.y,
                z: -hit.point.z,
                wall: hit.wall,
            },
            None => OutboundMessage::Move3d {
                x: 0.0,
                y: 0.0,
                z: 0.0,
                wall: Wall::None,
            },
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
