use crate::control::ControlHandler;
use crate::data::OutboundMessage;
use crate::error::BridgeError;
use futures_util::{SinkExt, StreamExt};
use log::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use tokio::runtime::Runtime;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::mpsc::{Receiver, Sender};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

const OUTBOUND_CAPACITY: usize = 10;

/// Destination of the per frame aim point.
pub trait AimSink {
    fn is_connected(&self) -> bool;
    /// Hands the message over without blocking. Returns false if it was dropped.
    fn send(&self, message: OutboundMessage) -> bool;
}

/// Websocket link to the relay that fans messages out between the sensor
/// page, the viewer and this process.
///
/// The connection lives on its own thread with its own runtime. The thread is
/// never joined and does not reconnect once the relay goes away.
pub struct BridgeClient {
    sender: Sender<OutboundMessage>,
    connected: Arc<AtomicBool>,
}

impl BridgeClient {
    pub fn connect(url: String, handler: ControlHandler) -> Self {
        let (tx, rx) = mpsc::channel(OUTBOUND_CAPACITY);
        let connected = Arc::new(AtomicBool::new(false));
        let flag = connected.clone();
        thread::spawn(move || {
            if let Err(error) = run_bridge(&url, rx, handler, flag.clone()) {
                error!("Bridge to {} stopped: {}", url, error);
            }
            flag.store(false, Ordering::SeqCst);
        });
        BridgeClient {
            sender: tx,
            connected,
        }
    }
}

impl AimSink for BridgeClient {
    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn send(&self, message: OutboundMessage) -> bool {
        match self.sender.try_send(message) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                trace!("Telemetry queue full, dropping frame");
                false
            }
            Err(TrySendError::Closed(_)) => false,
        }
    }
}

fn run_bridge(
    url: &str,
    outbound: Receiver<OutboundMessage>,
    handler: ControlHandler,
    connected: Arc<AtomicBool>,
) -> Result<(), BridgeError> {
    let rt = Runtime::new()?;
    rt.block_on(bridge_session(url, outbound, handler, connected))
}

async fn bridge_session(
    url: &str,
    mut outbound: Receiver<OutboundMessage>,
    handler: ControlHandler,
    connected: Arc<AtomicBool>,
) -> Result<(), BridgeError> {
    let (socket, _) = connect_async(url).await?;
    info!("Connected to relay at {}", url);
    connected.store(true, Ordering::SeqCst);
    let (mut sink, mut stream) = socket.split();

    loop {
        tokio::select! {
            message = outbound.recv() => match message {
                Some(message) => sink.send(Message::Text(message.to_json()?)).await?,
                None => {
                    info!("Telemetry sender dropped, closing relay connection");
                    sink.close().await?;
                    break;
                }
            },
            incoming = stream.next() => match incoming {
                Some(Ok(Message::Text(text))) => handle_incoming(&handler, &text),
                Some(Ok(Message::Binary(data))) => match std::str::from_utf8(&data) {
                    Ok(text) => handle_incoming(&handler, text),
                    Err(_) => warn!("Ignoring non utf-8 binary frame"),
                },
                Some(Ok(Message::Close(_))) | None => {
                    warn!("Relay closed the connection");
                    break;
                }
                Some(Ok(_)) => {}
                Some(Err(error)) => {
                    connected.store(false, Ordering::SeqCst);
                    return Err(error.into());
                }
            },
        }
    }
    connected.store(false, Ordering::SeqCst);
    Ok(())
}

fn handle_incoming(handler: &ControlHandler, text: &str) {
    if let Err(error) = handler.handle_text(text) {
        warn!("Rejected message: {}", error);
    }
}
