use crate::data::{InboundMessage, Quaternion};
use crate::engine::{CalibrationMode, EngineConfig};
use crate::error::ProtocolError;
use crate::state::SharedState;
use log::*;
use std::convert::TryFrom;
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// Engine side effects requested by the control page, applied in arrival
/// order.
///
/// Quaternions are captured when the message arrives, not when the command
/// is applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlCommand {
    CaptureCenter(Quaternion),
    BeginCornerCapture(Quaternion),
    CommitCornerCapture(Quaternion),
    SetMode(CalibrationMode),
    Configure {
        config: EngineConfig,
        generation: u64,
    },
}

pub fn command_channel() -> (UnboundedSender<ControlCommand>, UnboundedReceiver<ControlCommand>) {
    mpsc::unbounded_channel()
}

/// Applies inbound messages to the shared state and queues engine commands.
#[derive(Clone)]
pub struct ControlHandler {
    state: Arc<SharedState>,
    commands: UnboundedSender<ControlCommand>,
}

impl ControlHandler {
    pub fn new(state: Arc<SharedState>, commands: UnboundedSender<ControlCommand>) -> Self {
        Self { state, commands }
    }

    pub fn handle_text(&self, text: &str) -> Result<(), ProtocolError> {
        let message = InboundMessage::deserialize(text.as_bytes())?;
        self.dispatch(message)
    }

    /// Single place where inbound messages mutate anything.
    /// Messages are validated in full before any field is applied.
    pub fn dispatch(&self, message: InboundMessage) -> Result<(), ProtocolError> {
        match message {
            InboundMessage::Move { q, roll } => {
                self.state.update_orientation(q, roll);
                Ok(())
            }
            InboundMessage::Calibrate => {
                self.enqueue(ControlCommand::CaptureCenter(self.state.current_quaternion()))
            }
            InboundMessage::CalibrateTl => self.enqueue(ControlCommand::BeginCornerCapture(
                self.state.current_quaternion(),
            )),
            InboundMessage::CalibrateBr => self.enqueue(ControlCommand::CommitCornerCapture(
                self.state.current_quaternion(),
            )),
            InboundMessage::SetMode { mode } => {
                let mode = CalibrationMode::try_from(mode).map_err(ProtocolError::UnknownMode)?;
                self.enqueue(ControlCommand::SetMode(mode))
            }
            InboundMessage::Config(update) => {
                update.validate()?;
                let (config, generation) = self.state.apply_config(&update);
                debug!("Config updated {:?}", config);
                self.enqueue(ControlCommand::Configure { config, generation })
            }
            InboundMessage::Other => {
                trace!("Ignoring message of unknown type");
                Ok(())
            }
        }
    }

    fn enqueue(&self, command: ControlCommand) -> Result<(), ProtocolError> {
        trace!("Queueing {:?}", command);
        self.commands
            .send(command)
            .map_err(|_| ProtocolError::QueueClosed)
    }
}
