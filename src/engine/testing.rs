use super::{CalibrationMode, EngineConfig, OrientationEngine, ProcessResult};
use crate::data::Quaternion;
use crate::error::EngineError;
use nalgebra as na;

#[derive(Debug, Clone, PartialEq)]
pub enum EngineCall {
    Configure(EngineConfig),
    CalibrateCenter(Quaternion),
    CalibrateCorners(Quaternion, Quaternion),
    SetMode(CalibrationMode),
    Process(Quaternion),
}

/// Engine double that records every call and replays a fixed result.
pub struct RecordingEngine {
    pub calls: Vec<EngineCall>,
    pub result: ProcessResult,
    pub fail_process: bool,
}

impl Default for RecordingEngine {
    fn default() -> Self {
        Self {
            calls: Vec::new(),
            result: ProcessResult {
                u: 0.5,
                v: 0.5,
                world: na::Point3::new(0.0, 0.0, 1.5),
                dir: na::Vector3::new(0.0, 0.0, 1.0),
                yaw: 0.0,
                pitch: 0.0,
                is_valid: true,
            },
            fail_process: false,
        }
    }
}

impl RecordingEngine {
    /// Calls other than per frame processing.
    pub fn control_calls(&self) -> Vec<EngineCall> {
        self.calls
            .iter()
            .filter(|call| !matches!(call, EngineCall::Process(_)))
            .cloned()
            .collect()
    }
}

impl OrientationEngine for RecordingEngine {
    fn version(&self) -> i32 {
        1
    }

    fn configure(&mut self, config: &EngineConfig) -> Result<(), EngineError> {
        self.calls.push(EngineCall::Configure(*config));
        Ok(())
    }

    fn calibrate_center(&mut self, q: &Quaternion) -> Result<(), EngineError> {
        self.calls.push(EngineCall::CalibrateCenter(*q));
        Ok(())
    }

    fn calibrate_corners(
        &mut self,
        top_left: &Quaternion,
        bottom_right: &Quaternion,
    ) -> Result<(), EngineError> {
        self.calls
            .push(EngineCall::CalibrateCorners(*top_left, *bottom_right));
        Ok(())
    }

    fn set_mode(&mut self, mode: CalibrationMode) -> Result<(), EngineError> {
        self.calls.push(EngineCall::SetMode(mode));
        Ok(())
    }

    fn process(&mut self, q: &Quaternion) -> Result<ProcessResult, EngineError> {
        self.calls.push(EngineCall::Process(*q));
        if self.fail_process {
            return Err(EngineError::Native(String::from("process failed")));
        }
        Ok(self.result)
    }
}
