//! Orientation engine boundary.
//!
//! The pointing pipeline only ever talks to an [`OrientationEngine`]. The
//! quaternion to screen mapping, smoothing and anchoring math live behind it.

pub mod ffi;
pub mod pointer_core;

#[cfg(test)]
pub(crate) mod testing;

use crate::data::Quaternion;
use crate::error::EngineError;
use nalgebra as na;
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;

pub use pointer_core::PointerCore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalibrationMode {
    /// Single reference orientation plus the physical screen geometry.
    Center,
    /// Two reference orientations bounding the screen (top-left, bottom-right).
    Frustum,
}

impl TryFrom<i32> for CalibrationMode {
    type Error = i32;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(CalibrationMode::Center),
            1 => Ok(CalibrationMode::Frustum),
            other => Err(other),
        }
    }
}

/// Component order of quaternions coming off the sensor.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum QuaternionOrder {
    Wxyz,
    Xyzw,
}

impl Default for QuaternionOrder {
    fn default() -> Self {
        QuaternionOrder::Xyzw
    }
}

/// Physical screen setup, in meters.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    pub screen_width: f32,
    pub screen_height: f32,
    pub distance: f32,
    pub offset_x: f32,
    pub offset_y: f32,
    pub smoothing: f32,
    pub quaternion_order: QuaternionOrder,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            screen_width: 1.2,
            screen_height: 0.9,
            distance: 1.5,
            offset_x: 0.0,
            offset_y: 0.0,
            smoothing: 0.8,
            quaternion_order: QuaternionOrder::Xyzw,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProcessResult {
    /// Screen normalized, v grows upwards.
    pub u: f32,
    pub v: f32,
    pub world: na::Point3<f32>,
    /// Unit aim direction, +z towards the screen.
    pub dir: na::Vector3<f32>,
    pub yaw: f32,
    pub pitch: f32,
    pub is_valid: bool,
}

impl ProcessResult {
    pub fn invalid(dir: na::Vector3<f32>, yaw: f32, pitch: f32) -> Self {
        Self {
            u: 0.0,
            v: 0.0,
            world: na::Point3::origin(),
            dir,
            yaw,
            pitch,
            is_valid: false,
        }
    }
}

/// Field ordered record exchanged across the C boundary.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RawProcessResult {
    pub u: f32,
    pub v: f32,
    pub world_x: f32,
    pub world_y: f32,
    pub world_z: f32,
    pub dir_x: f32,
    pub dir_y: f32,
    pub dir_z: f32,
    pub yaw: f32,
    pub pitch: f32,
    pub is_valid: i32,
}

impl From<RawProcessResult> for ProcessResult {
    fn from(raw: RawProcessResult) -> Self {
        Self {
            u: raw.u,
            v: raw.v,
            world: na::Point3::new(raw.world_x, raw.world_y, raw.world_z),
            dir: na::Vector3::new(raw.dir_x, raw.dir_y, raw.dir_z),
            yaw: raw.yaw,
            pitch: raw.pitch,
            is_valid: raw.is_valid != 0,
        }
    }
}

impl From<ProcessResult> for RawProcessResult {
    fn from(result: ProcessResult) -> Self {
        Self {
            u: result.u,
            v: result.v,
            world_x: result.world.x,
            world_y: result.world.y,
            world_z: result.world.z,
            dir_x: result.dir.x,
            dir_y: result.dir.y,
            dir_z: result.dir.z,
            yaw: result.yaw,
            pitch: result.pitch,
            is_valid: result.is_valid as i32,
        }
    }
}

pub trait OrientationEngine {
    fn version(&self) -> i32;
    fn configure(&mut self, config: &EngineConfig) -> Result<(), EngineError>;
    fn calibrate_center(&mut self, q: &Quaternion) -> Result<(), EngineError>;
    fn calibrate_corners(
        &mut self,
        top_left: &Quaternion,
        bottom_right: &Quaternion,
    ) -> Result<(), EngineError>;
    fn set_mode(&mut self, mode: CalibrationMode) -> Result<(), EngineError>;
    fn process(&mut self, q: &Quaternion) -> Result<ProcessResult, EngineError>;
}
