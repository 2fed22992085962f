use crate::data::{ConfigUpdate, Quaternion};
use crate::engine::EngineConfig;
use palette::{Hsl, Srgb};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Pointer fill color derived from the sensor roll.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerColor {
    /// Normalized hue in `[0, 1)`.
    pub hue: f32,
    pub rgb: [u8; 3],
}

impl PointerColor {
    pub fn from_hue(hue: f32) -> Self {
        let hue = hue.rem_euclid(1.0);
        let hsl: Hsl = Hsl::new(hue * 360.0, 1.0, 0.5);
        let rgb = Srgb::from(hsl);
        let (r, g, b) = rgb.into_format::<u8>().into_components();
        Self { hue, rgb: [r, g, b] }
    }

    /// Roll in degrees, -90 maps to red and +90 wraps back to red through cyan.
    pub fn from_roll(roll: f32) -> Self {
        Self::from_hue((roll + 90.0) / 180.0)
    }

    pub fn as_unit_rgb(&self) -> [f32; 3] {
        [
            f32::from(self.rgb[0]) / 255.0,
            f32::from(self.rgb[1]) / 255.0,
            f32::from(self.rgb[2]) / 255.0,
        ]
    }
}

impl Default for PointerColor {
    fn default() -> Self {
        // cyan
        Self::from_hue(0.5)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct OrientationSample {
    pub quaternion: Quaternion,
    pub color: PointerColor,
    /// Set once the first sensor sample arrived.
    pub live: bool,
}

#[derive(Debug, Clone, Copy)]
struct ConfigSlot {
    config: EngineConfig,
    generation: u64,
}

/// State written by the bridge thread and read by the update loop.
///
/// Every accessor copies out under the lock so a reader never sees a half
/// applied update.
#[derive(Debug)]
pub struct SharedState {
    orientation: Mutex<OrientationSample>,
    config: Mutex<ConfigSlot>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl SharedState {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            orientation: Mutex::new(OrientationSample::default()),
            config: Mutex::new(ConfigSlot {
                config,
                generation: 0,
            }),
        }
    }

    pub fn orientation(&self) -> OrientationSample {
        *lock(&self.orientation)
    }

    pub fn current_quaternion(&self) -> Quaternion {
        lock(&self.orientation).quaternion
    }

    pub fn update_orientation(&self, quaternion: Quaternion, roll: Option<f32>) {
        let mut sample = lock(&self.orientation);
        sample.quaternion = quaternion;
        if let Some(roll) = roll {
            sample.color = PointerColor::from_roll(roll);
        }
        sample.live = true;
    }

    /// Current configuration and its generation, bumped on every change.
    pub fn config(&self) -> (EngineConfig, u64) {
        let slot = lock(&self.config);
        (slot.config, slot.generation)
    }

    /// Applies the fields present in `update` and returns the new
    /// configuration with its generation. Callers validate first.
    pub fn apply_config(&self, update: &ConfigUpdate) -> (EngineConfig, u64) {
        let mut slot = lock(&self.config);
        if let Some(distance) = update.distance {
            slot.config.distance = distance;
        }
        if let Some(smooth) = update.smooth {
            slot.config.smoothing = smooth;
        }
        if let Some(off_x) = update.off_x {
            slot.config.offset_x = off_x;
        }
        if let Some(off_y) = update.off_y {
            slot.config.offset_y = off_y;
        }
        if let Some(order) = update.quaternion_order {
            slot.config.quaternion_order = order;
        }
        slot.generation += 1;
        (slot.config, slot.generation)
    }
}

impl Default for SharedState {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
