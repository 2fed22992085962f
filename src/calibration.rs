use crate::data::Quaternion;
use crate::engine::{CalibrationMode, OrientationEngine};
use crate::error::EngineError;
use log::*;

/// Progress of a two corner calibration.
///
/// There is deliberately no timeout: once the top-left corner is stored the
/// controller waits for the bottom-right corner for as long as it takes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CaptureState {
    Idle,
    AwaitingBottomRight { top_left: Quaternion },
}

/// Sequences reference orientations into engine anchoring calls.
#[derive(Debug)]
pub struct CalibrationController {
    capture: CaptureState,
}

impl Default for CalibrationController {
    fn default() -> Self {
        Self {
            capture: CaptureState::Idle,
        }
    }
}

impl CalibrationController {
    pub fn capture_state(&self) -> CaptureState {
        self.capture
    }

    pub fn capture_center(
        &mut self,
        engine: &mut dyn OrientationEngine,
        q: &Quaternion,
    ) -> Result<(), EngineError> {
        info!("Calibrating center");
        engine.calibrate_center(q)
    }

    /// Stores `q` as the top-left corner, replacing any earlier pending one.
    pub fn begin_corner_capture(&mut self, q: &Quaternion) {
        if let CaptureState::AwaitingBottomRight { .. } = self.capture {
            debug!("Replacing pending top-left corner");
        }
        info!("Top-left corner stored, waiting for bottom-right");
        self.capture = CaptureState::AwaitingBottomRight { top_left: *q };
    }

    /// Commits the frustum with `q` as bottom-right corner.
    ///
    /// Returns `Ok(false)` without touching the engine when no top-left corner
    /// is pending. The latch is cleared once the engine has been called, even if
    /// the engine rejected the corners.
    pub fn commit_corner_capture(
        &mut self,
        engine: &mut dyn OrientationEngine,
        q: &Quaternion,
    ) -> Result<bool, EngineError> {
        let top_left = match self.capture {
            CaptureState::AwaitingBottomRight { top_left } => top_left,
            CaptureState::Idle => {
                debug!("Bottom-right corner without top-left, ignoring");
                return Ok(false);
            }
        };
        self.capture = CaptureState::Idle;
        info!("Committing corner calibration");
        engine.calibrate_corners(&top_left, q)?;
        Ok(true)
    }

    pub fn set_mode(
        &mut self,
        engine: &mut dyn OrientationEngine,
        mode: CalibrationMode,
    ) -> Result<(), EngineError> {
        info!("Calibration mode {:?}", mode);
        engine.set_mode(mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::testing::{EngineCall, RecordingEngine};

    fn quaternion(x: f32) -> Quaternion {
        Quaternion {
            x,
            y: 0.0,
            z: 0.0,
            w: 1.0,
        }
    }

    #[test]
    fn commit_without_top_left_is_noop() {
        let mut engine = RecordingEngine::default();
        let mut controller = CalibrationController::default();
        let committed = controller
            .commit_corner_capture(&mut engine, &quaternion(0.3))
            .unwrap();
        assert!(!committed);
        assert!(engine.calls.is_empty());
        assert_eq!(controller.capture_state(), CaptureState::Idle);
    }

    #[test]
    fn corner_sequence_calls_engine_once() {
        let mut engine = RecordingEngine::default();
        let mut controller = CalibrationController::default();
        controller.begin_corner_capture(&quaternion(0.1));
        assert_eq!(
            controller.capture_state(),
            CaptureState::AwaitingBottomRight {
                top_left: quaternion(0.1)
            }
        );
        assert!(controller
            .commit_corner_capture(&mut engine, &quaternion(0.2))
            .unwrap());
        assert_eq!(
            engine.calls,
            vec![EngineCall::CalibrateCorners(quaternion(0.1), quaternion(0.2))]
        );
        assert_eq!(controller.capture_state(), CaptureState::Idle);

        // latch is spent
        assert!(!controller
            .commit_corner_capture(&mut engine, &quaternion(0.2))
            .unwrap());
        assert_eq!(engine.calls.len(), 1);
    }

    #[test]
    fn latest_top_left_wins() {
        let mut engine = RecordingEngine::default();
        let mut controller = CalibrationController::default();
        controller.begin_corner_capture(&quaternion(0.1));
        controller.begin_corner_capture(&quaternion(0.4));
        controller
            .commit_corner_capture(&mut engine, &quaternion(0.2))
            .unwrap();
        assert_eq!(
            engine.calls,
            vec![EngineCall::CalibrateCorners(quaternion(0.4), quaternion(0.2))]
        );
    }

    #[test]
    fn center_capture_is_repeatable() {
        let mut engine = RecordingEngine::default();
        let mut controller = CalibrationController::default();
        controller
            .capture_center(&mut engine, &quaternion(0.5))
            .unwrap();
        controller
            .capture_center(&mut engine, &quaternion(0.5))
            .unwrap();
        assert_eq!(
            engine.calls,
            vec![
                EngineCall::CalibrateCenter(quaternion(0.5)),
                EngineCall::CalibrateCenter(quaternion(0.5))
            ]
        );
    }

    #[test]
    fn mode_change_keeps_pending_corner() {
        let mut engine = RecordingEngine::default();
        let mut controller = CalibrationController::default();
        controller.begin_corner_capture(&quaternion(0.1));
        controller
            .set_mode(&mut engine, CalibrationMode::Center)
            .unwrap();
        assert_eq!(engine.calls, vec![EngineCall::SetMode(CalibrationMode::Center)]);
        assert!(matches!(
            controller.capture_state(),
            CaptureState::AwaitingBottomRight { .. }
        ));
    }
}
