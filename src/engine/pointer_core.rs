use super::{CalibrationMode, EngineConfig, OrientationEngine, ProcessResult, QuaternionOrder};
use crate::data::Quaternion;
use crate::error::EngineError;
use log::*;
use nalgebra as na;

pub const VERSION: i32 = 200;

const FORWARD_EPSILON: f32 = 0.01;
const MAX_SMOOTHING: f32 = 0.99;

pub type Logger = Box<dyn Fn(&str) + Send>;

/// Tangent plane bounds of the screen seen from the frustum center.
#[derive(Debug, Clone, Copy, PartialEq)]
struct FrustumBounds {
    center: na::Quaternion<f32>,
    min_x: f32,
    max_x: f32,
    min_y: f32,
    max_y: f32,
}

/// Native orientation engine.
///
/// Smooths the incoming orientation, re-anchors it against either a center
/// reference or a two corner frustum and maps the resulting +z direction to
/// normalized screen coordinates.
pub struct PointerCore {
    config: EngineConfig,
    mode: CalibrationMode,
    center_offset: na::Quaternion<f32>,
    frustum: Option<FrustumBounds>,
    last_input: Option<na::Quaternion<f32>>,
    logger: Option<Logger>,
}

impl Default for PointerCore {
    fn default() -> Self {
        Self::new(QuaternionOrder::default())
    }
}

impl PointerCore {
    pub fn new(order: QuaternionOrder) -> Self {
        Self {
            config: EngineConfig {
                screen_width: 1.0,
                screen_height: 1.0,
                distance: 1.0,
                offset_x: 0.0,
                offset_y: 0.0,
                smoothing: 0.0,
                quaternion_order: order,
            },
            mode: CalibrationMode::Center,
            center_offset: na::Quaternion::identity(),
            frustum: None,
            last_input: None,
            logger: None,
        }
    }

    /// Routes engine diagnostics to the `log` facade.
    pub fn with_log_facade(order: QuaternionOrder) -> Self {
        let mut core = Self::new(order);
        core.set_logger(Box::new(|message: &str| debug!(target: "pointer_core", "{}", message)));
        core
    }

    pub fn set_logger(&mut self, logger: Logger) {
        self.logger = Some(logger);
        self.log("logger attached, pointer core ready");
    }

    pub fn set_quaternion_order(&mut self, order: QuaternionOrder) {
        self.config.quaternion_order = order;
    }

    pub fn quaternion_order(&self) -> QuaternionOrder {
        self.config.quaternion_order
    }

    pub fn mode(&self) -> CalibrationMode {
        self.mode
    }

    fn log(&self, message: &str) {
        if let Some(ref logger) = self.logger {
            logger(message);
        }
    }

    fn normalize_input(&self, q: &Quaternion) -> na::Quaternion<f32> {
        // wire fields are positional, x carries w when the sensor sends wxyz
        let q = match self.config.quaternion_order {
            QuaternionOrder::Wxyz => na::Quaternion::new(q.x, q.y, q.z, q.w),
            QuaternionOrder::Xyzw => na::Quaternion::new(q.w, q.x, q.y, q.z),
        };
        normalized(q)
    }
}

fn normalized(q: na::Quaternion<f32>) -> na::Quaternion<f32> {
    let norm = q.norm();
    if norm > 0.0 {
        q / norm
    } else {
        q
    }
}

/// Shortest path linear blend, renormalized.
fn blend(a: &na::Quaternion<f32>, b: &na::Quaternion<f32>, t: f32) -> na::Quaternion<f32> {
    let sign = if a.dot(b) < 0.0 { -1.0 } else { 1.0 };
    let coords = a.coords + (b.coords * sign - a.coords) * t;
    normalized(na::Quaternion::new(coords.w, coords.x, coords.y, coords.z))
}

fn forward(q: &na::Quaternion<f32>) -> na::Vector3<f32> {
    na::UnitQuaternion::new_unchecked(*q).transform_vector(&na::Vector3::z())
}

impl OrientationEngine for PointerCore {
    fn version(&self) -> i32 {
        VERSION
    }

    fn configure(&mut self, config: &EngineConfig) -> Result<(), EngineError> {
        if config.screen_width <= 0.0 || config.screen_height <= 0.0 || config.distance <= 0.0 {
            self.log("rejected configuration with non positive dimensions");
            return Err(EngineError::InvalidConfig {
                width: config.screen_width,
                height: config.screen_height,
                distance: config.distance,
            });
        }
        self.config = EngineConfig {
            smoothing: config.smoothing.max(0.0).min(MAX_SMOOTHING),
            ..*config
        };
        // new physical dimensions imply the physical mapping
        self.mode = CalibrationMode::Center;
        self.log(&format!(
            "configured {:.2}x{:.2} dist:{:.2} smooth:{:.2} order:{:?}",
            config.screen_width,
            config.screen_height,
            config.distance,
            config.smoothing,
            config.quaternion_order
        ));
        Ok(())
    }

    fn calibrate_center(&mut self, q: &Quaternion) -> Result<(), EngineError> {
        self.center_offset = self.normalize_input(q).conjugate();
        self.mode = CalibrationMode::Center;
        self.log("calibrated center");
        Ok(())
    }

    fn calibrate_corners(
        &mut self,
        top_left: &Quaternion,
        bottom_right: &Quaternion,
    ) -> Result<(), EngineError> {
        let top_left = self.normalize_input(top_left);
        let bottom_right = self.normalize_input(bottom_right);

        let center = blend(&top_left, &bottom_right, 0.5);
        let inverse_center = center.conjugate();
        let dir_top_left = forward(&(inverse_center * top_left));
        let dir_bottom_right = forward(&(inverse_center * bottom_right));

        if dir_top_left.z < FORWARD_EPSILON || dir_bottom_right.z < FORWARD_EPSILON {
            self.log("rejected corner calibration, corners too far apart");
            return Err(EngineError::DegenerateCorners);
        }

        self.frustum = Some(FrustumBounds {
            center,
            min_x: dir_top_left.x / dir_top_left.z,
            max_x: dir_bottom_right.x / dir_bottom_right.z,
            max_y: dir_top_left.y / dir_top_left.z,
            min_y: dir_bottom_right.y / dir_bottom_right.z,
        });
        self.mode = CalibrationMode::Frustum;
        self.log("calibrated corners");
        Ok(())
    }

    fn set_mode(&mut self, mode: CalibrationMode) -> Result<(), EngineError> {
        if mode == CalibrationMode::Frustum && self.frustum.is_none() {
            self.log("frustum mode selected before any corner calibration");
        }
        self.mode = mode;
        Ok(())
    }

    fn process(&mut self, q: &Quaternion) -> Result<ProcessResult, EngineError> {
        let mut input = self.normalize_input(q);
        if let Some(ref last) = self.last_input {
            if self.config.smoothing > 0.0 {
                input = blend(last, &input, 1.0 - self.config.smoothing);
            }
        }
        self.last_input = Some(input);

        let frustum = match self.mode {
            CalibrationMode::Center => None,
            CalibrationMode::Frustum => self.frustum,
        };
        let corrected = match frustum {
            Some(ref bounds) => bounds.center.conjugate() * input,
            None => self.center_offset * input,
        };
        let dir = forward(&corrected);
        let yaw = dir.x.atan2(dir.z).to_degrees();
        let pitch = dir.y.max(-1.0).min(1.0).asin().to_degrees();

        if dir.z <= FORWARD_EPSILON {
            return Ok(ProcessResult::invalid(dir, yaw, pitch));
        }

        match (self.mode, frustum) {
            (CalibrationMode::Center, _) => {
                let t = self.config.distance / dir.z;
                let hit = dir * t;
                Ok(ProcessResult {
                    u: (hit.x - self.config.offset_x) / self.config.screen_width + 0.5,
                    v: (hit.y - self.config.offset_y) / self.config.screen_height + 0.5,
                    world: na::Point3::new(hit.x, hit.y, hit.z),
                    dir,
                    yaw,
                    pitch,
                    is_valid: true,
                })
            }
            (CalibrationMode::Frustum, Some(bounds)) => {
                let tx = dir.x / dir.z;
                let ty = dir.y / dir.z;
                Ok(ProcessResult {
                    u: (tx - bounds.min_x) / (bounds.max_x - bounds.min_x),
                    v: (ty - bounds.min_y) / (bounds.max_y - bounds.min_y),
                    world: na::Point3::new(tx, ty, 1.0),
                    dir,
                    yaw,
                    pitch,
                    is_valid: true,
                })
            }
            (CalibrationMode::Frustum, None) => Ok(ProcessResult::invalid(dir, yaw, pitch)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn assert_close(actual: f32, expected: f32) {
        assert!(
            (actual - expected).abs() < 1e-4,
            "expected {} got {}",
            expected,
            actual
        );
    }

    /// Rotation of `degrees` about the y axis, xyzw order.
    fn yaw_quaternion(degrees: f32) -> Quaternion {
        let q = na::UnitQuaternion::from_axis_angle(&na::Vector3::y_axis(), degrees.to_radians());
        Quaternion {
            x: q.i,
            y: q.j,
            z: q.k,
            w: q.w,
        }
    }

    fn pitch_quaternion(degrees: f32) -> Quaternion {
        let q = na::UnitQuaternion::from_axis_angle(&na::Vector3::x_axis(), degrees.to_radians());
        Quaternion {
            x: q.i,
            y: q.j,
            z: q.k,
            w: q.w,
        }
    }

    fn configured_core() -> PointerCore {
        let mut core = PointerCore::default();
        core.configure(&EngineConfig {
            smoothing: 0.0,
            ..EngineConfig::default()
        })
        .unwrap();
        core
    }

    #[test]
    fn identity_points_at_screen_center() {
        let mut core = configured_core();
        let result = core.process(&Quaternion::IDENTITY).unwrap();
        assert!(result.is_valid);
        assert_close(result.u, 0.5);
        assert_close(result.v, 0.5);
        assert_close(result.dir.z, 1.0);
        assert_close(result.world.z, 1.5);
        assert_close(result.yaw, 0.0);
        assert_close(result.pitch, 0.0);
    }

    #[test]
    fn center_calibration_reanchors() {
        let mut core = configured_core();
        let reference = yaw_quaternion(20.0);
        core.calibrate_center(&reference).unwrap();
        let result = core.process(&reference).unwrap();
        assert_close(result.u, 0.5);
        assert_close(result.yaw, 0.0);
    }

    #[test]
    fn yaw_moves_u() {
        let mut core = configured_core();
        let result = core.process(&yaw_quaternion(10.0)).unwrap();
        assert_close(result.yaw, 10.0);
        let expected_x = 10_f32.to_radians().tan() * 1.5;
        assert_close(result.world.x, expected_x);
        assert_close(result.u, expected_x / 1.2 + 0.5);
    }

    #[test]
    fn looking_backwards_is_invalid() {
        let mut core = configured_core();
        let result = core.process(&yaw_quaternion(180.0)).unwrap();
        assert!(!result.is_valid);
    }

    #[test]
    fn offset_shifts_screen_center() {
        let mut core = PointerCore::default();
        core.configure(&EngineConfig {
            offset_x: 0.3,
            smoothing: 0.0,
            ..EngineConfig::default()
        })
        .unwrap();
        let result = core.process(&Quaternion::IDENTITY).unwrap();
        assert_close(result.u, -0.3 / 1.2 + 0.5);
    }

    #[test]
    fn invalid_configuration_is_rejected() {
        let mut core = configured_core();
        let error = core
            .configure(&EngineConfig {
                distance: 0.0,
                ..EngineConfig::default()
            })
            .unwrap_err();
        assert!(matches!(error, EngineError::InvalidConfig { .. }));
        let result = core.process(&Quaternion::IDENTITY).unwrap();
        assert_close(result.world.z, 1.5);
    }

    #[test]
    fn corners_map_to_unit_square() {
        let mut core = configured_core();
        let top_left = {
            let q = na::UnitQuaternion::from_euler_angles(
                -10_f32.to_radians(),
                -15_f32.to_radians(),
                0.0,
            );
            Quaternion {
                x: q.i,
                y: q.j,
                z: q.k,
                w: q.w,
            }
        };
        let bottom_right = {
            let q = na::UnitQuaternion::from_euler_angles(
                10_f32.to_radians(),
                15_f32.to_radians(),
                0.0,
            );
            Quaternion {
                x: q.i,
                y: q.j,
                z: q.k,
                w: q.w,
            }
        };
        core.calibrate_corners(&top_left, &bottom_right).unwrap();
        assert_eq!(core.mode(), CalibrationMode::Frustum);

        let result = core.process(&top_left).unwrap();
        assert_close(result.u, 0.0);
        assert_close(result.v, 1.0);
        let result = core.process(&bottom_right).unwrap();
        assert_close(result.u, 1.0);
        assert_close(result.v, 0.0);
        assert_close(result.world.z, 1.0);
    }

    #[test]
    fn opposite_corners_are_rejected() {
        let mut core = configured_core();
        let error = core
            .calibrate_corners(&yaw_quaternion(-90.0), &yaw_quaternion(90.0))
            .unwrap_err();
        assert_eq!(error, EngineError::DegenerateCorners);
        assert_eq!(core.mode(), CalibrationMode::Center);
    }

    #[test]
    fn frustum_without_corners_is_invalid() {
        let mut core = configured_core();
        core.set_mode(CalibrationMode::Frustum).unwrap();
        assert!(!core.process(&Quaternion::IDENTITY).unwrap().is_valid);
    }

    #[test]
    fn configure_returns_to_center_mode() {
        let mut core = configured_core();
        core.set_mode(CalibrationMode::Frustum).unwrap();
        core.configure(&EngineConfig::default()).unwrap();
        assert_eq!(core.mode(), CalibrationMode::Center);
    }

    #[test]
    fn smoothing_lags_behind_input() {
        let mut core = PointerCore::default();
        core.configure(&EngineConfig {
            smoothing: 0.5,
            ..EngineConfig::default()
        })
        .unwrap();
        core.process(&Quaternion::IDENTITY).unwrap();
        let result = core.process(&pitch_quaternion(-20.0)).unwrap();
        assert!(result.pitch > 0.0);
        assert!(result.pitch < 20.0);
    }

    #[test]
    fn wxyz_order_reads_first_component_as_w() {
        let mut core = PointerCore::new(QuaternionOrder::Wxyz);
        core.configure(&EngineConfig {
            smoothing: 0.0,
            quaternion_order: QuaternionOrder::Wxyz,
            ..EngineConfig::default()
        })
        .unwrap();
        let result = core
            .process(&Quaternion {
                x: 1.0,
                y: 0.0,
                z: 0.0,
                w: 0.0,
            })
            .unwrap();
        assert!(result.is_valid);
        assert_close(result.u, 0.5);
    }

    #[test]
    fn configure_switches_quaternion_order() {
        let mut core = PointerCore::new(QuaternionOrder::Xyzw);
        let flipped = Quaternion {
            x: 1.0,
            y: 0.0,
            z: 0.0,
            w: 0.0,
        };
        core.configure(&EngineConfig {
            smoothing: 0.0,
            ..EngineConfig::default()
        })
        .unwrap();
        assert!(!core.process(&flipped).unwrap().is_valid);

        core.configure(&EngineConfig {
            smoothing: 0.0,
            quaternion_order: QuaternionOrder::Wxyz,
            ..EngineConfig::default()
        })
        .unwrap();
        assert_eq!(core.quaternion_order(), QuaternionOrder::Wxyz);
        assert!(core.process(&flipped).unwrap().is_valid);
    }

    #[test]
    fn logger_receives_messages() {
        let messages = Arc::new(Mutex::new(Vec::new()));
        let sink = messages.clone();
        let mut core = PointerCore::default();
        core.set_logger(Box::new(move |message: &str| {
            sink.lock().unwrap().push(message.to_owned())
        }));
        core.calibrate_center(&Quaternion::IDENTITY).unwrap();
        let messages = messages.lock().unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1], "calibrated center");
    }
}
