use crate::bridge::AimSink;
use crate::calibration::CalibrationController;
use crate::control::ControlCommand;
use crate::data::{OutboundMessage, Quaternion};
use crate::display::{screen_position, PointerDisplay, StatusLine};
use crate::engine::{EngineConfig, OrientationEngine, ProcessResult};
use crate::error::EngineError;
use crate::projection::{HitResult, RoomGeometry, Wall};
use crate::state::SharedState;
use log::*;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tokio::sync::mpsc::UnboundedReceiver;

pub const DEFAULT_TICK: Duration = Duration::from_millis(16);

/// Outcome of one pipeline cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub result: ProcessResult,
    pub hit: Option<HitResult>,
    pub telemetry_sent: bool,
}

/// Drives sample → engine → room projection → display / telemetry at a
/// fixed cadence.
///
/// The loop owns the engine. Configuration and calibration requests reach it
/// through the command queue and are applied in arrival order at the start of
/// the next cycle. A cycle projects with the configuration last pushed to the
/// engine.
pub struct UpdateLoop<E, D, S> {
    engine: E,
    display: D,
    sink: S,
    state: Arc<SharedState>,
    commands: UnboundedReceiver<ControlCommand>,
    calibration: CalibrationController,
    room: RoomGeometry,
    tick: Duration,
    config: EngineConfig,
    failing: bool,
}

impl<E, D, S> UpdateLoop<E, D, S>
where
    E: OrientationEngine,
    D: PointerDisplay,
    S: AimSink,
{
    pub fn new(
        engine: E,
        display: D,
        sink: S,
        state: Arc<SharedState>,
        commands: UnboundedReceiver<ControlCommand>,
    ) -> Self {
        let (config, _) = state.config();
        Self {
            engine,
            display,
            sink,
            state,
            commands,
            calibration: CalibrationController::default(),
            room: RoomGeometry::default(),
            tick: DEFAULT_TICK,
            config,
            failing: false,
        }
    }

    pub fn with_room(mut self, room: RoomGeometry) -> Self {
        self.room = room;
        self
    }

    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn calibration(&self) -> &CalibrationController {
        &self.calibration
    }

    /// Pushes the initial configuration and anchors the center on identity.
    pub fn prepare(&mut self) {
        let version = self.engine.version();
        info!("Orientation engine version {}", version);
        self.display
            .set_status(StatusLine::Version, &format!("Engine version: {}", version));
        self.display
            .set_status(StatusLine::Connection, "Waiting for sensors...");
        let (config, generation) = self.state.config();
        self.push_config(config, generation);
        match self
            .calibration
            .capture_center(&mut self.engine, &Quaternion::IDENTITY)
        {
            Ok(()) => self.display.set_status(StatusLine::Calibration, "Mode: Center"),
            Err(error) => warn!("Initial center calibration failed: {}", error),
        }
    }

    /// Runs until the display goes away.
    pub fn run(mut self) {
        self.prepare();
        loop {
            let started = Instant::now();
            match self.cycle() {
                Ok(_) => {
                    if self.failing {
                        info!("Engine recovered");
                        self.failing = false;
                    }
                }
                Err(error) => {
                    if !self.failing {
                        warn!("Skipping frame, engine failed: {}", error);
                        self.failing = true;
                    }
                }
            }
            if !self.display.present() {
                info!("Display closed, stopping update loop");
                break;
            }
            if let Some(remaining) = self.tick.checked_sub(started.elapsed()) {
                thread::sleep(remaining);
            }
        }
    }

    pub fn cycle(&mut self) -> Result<Frame, EngineError> {
        self.apply_commands();

        let sample = self.state.orientation();
        if sample.live {
            self.display.set_status(StatusLine::Connection, "Live sensors");
        }

        let result = match self.engine.process(&sample.quaternion) {
            Ok(result) => result,
            Err(error) => {
                self.display.hide_pointer();
                return Err(error);
            }
        };
        let hit = self.room.project(&result.dir, self.config.distance);

        if result.is_valid {
            let position = screen_position(result.u, result.v, self.display.viewport());
            self.display.show_pointer(position, &sample.color);
            let wall = hit.map_or(Wall::None, |hit| hit.wall);
            self.display.set_status(
                StatusLine::Telemetry,
                &format!("Wall: {} | U: {:.2} | V: {:.2}", wall, result.u, result.v),
            );
        } else {
            self.display.hide_pointer();
        }

        let telemetry_sent =
            self.sink.is_connected() && self.sink.send(OutboundMessage::from_hit(hit.as_ref()));

        Ok(Frame {
            result,
            hit,
            telemetry_sent,
        })
    }

    /// Reconfiguring puts the engine back in center mode.
    fn push_config(&mut self, config: EngineConfig, generation: u64) {
        match self.engine.configure(&config) {
            Ok(()) => {
                debug!("Pushed configuration {} {:?}", generation, config);
                self.config = config;
                self.display.set_status(StatusLine::Calibration, "Mode: Center");
            }
            Err(error) => warn!("Engine rejected configuration {}: {}", generation, error),
        }
    }

    fn apply_commands(&mut self) {
        while let Ok(command) = self.commands.try_recv() {
            let label = match command {
                ControlCommand::Configure { config, generation } => {
                    self.push_config(config, generation);
                    Ok(None)
                }
                ControlCommand::CaptureCenter(q) => self
                    .calibration
                    .capture_center(&mut self.engine, &q)
                    .map(|()| Some("Mode: Center")),
                ControlCommand::BeginCornerCapture(q) => {
                    self.calibration.begin_corner_capture(&q);
                    Ok(Some("Top-left stored, aim at bottom-right"))
                }
                ControlCommand::CommitCornerCapture(q) => self
                    .calibration
                    .commit_corner_capture(&mut self.engine, &q)
                    .map(|committed| {
                        if committed {
                            Some("Mode: Frustum (corners)")
                        } else {
                            None
                        }
                    }),
                ControlCommand::SetMode(mode) => self
                    .calibration
                    .set_mode(&mut self.engine, mode)
                    .map(|()| None),
            };
            match label {
                Ok(Some(label)) => self.display.set_status(StatusLine::Calibration, label),
                Ok(None) => {}
                Err(error) => warn!("Calibration failed: {}", error),
            }
        }
    }
}
