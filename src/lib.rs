pub mod args;
pub mod bridge;
pub mod calibration;
pub mod config;
pub mod control;
pub mod data;
pub mod display;
pub mod engine;
pub mod error;
pub mod projection;
pub mod state;
pub mod update_loop;

use anyhow::Result;
use args::Args;
use bridge::BridgeClient;
use config::{AppConfig, WindowConfig};
use control::{command_channel, ControlHandler};
use display::PointerDisplay;
use engine::PointerCore;
use log::*;
use simplelog::{Config, TermLogger, TerminalMode};
use state::SharedState;
use std::sync::Arc;
use update_loop::UpdateLoop;

/// Wires the relay bridge, the engine and the given display together and
/// runs the update loop until the display closes.
pub fn launch<D, F>(args: Args, make_display: F) -> Result<()>
where
    D: PointerDisplay,
    F: FnOnce(&WindowConfig) -> D,
{
    TermLogger::init(args.log_level, Config::default(), TerminalMode::Mixed)?;

    let mut config = AppConfig::load(&args.config)?;
    if let Some(url) = args.bridge_url {
        config.bridge.url = url;
    }

    let state = Arc::new(SharedState::new(config.engine));
    let (commands, command_receiver) = command_channel();
    let bridge = BridgeClient::connect(
        config.bridge.url.clone(),
        ControlHandler::new(state.clone(), commands),
    );
    info!("Relay bridge started for {}", config.bridge.url);

    let engine = PointerCore::with_log_facade(config.engine.quaternion_order);
    let display = make_display(&config.window);
    UpdateLoop::new(engine, display, bridge, state, command_receiver)
        .with_room(config.room)
        .with_tick(config.tick())
        .run();
    Ok(())
}
