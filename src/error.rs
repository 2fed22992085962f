use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("malformed message: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("unknown calibration mode {0}")]
    UnknownMode(i32),
    #[error("invalid value for {field}: {value}")]
    InvalidValue { field: &'static str, value: f32 },
    #[error("command queue closed")]
    QueueClosed,
}

#[derive(Error, Debug, PartialEq)]
pub enum EngineError {
    #[error("invalid configuration {width}x{height} at distance {distance}")]
    InvalidConfig {
        width: f32,
        height: f32,
        distance: f32,
    },
    #[error("corner calibration rejected, corner direction too oblique")]
    DegenerateCorners,
    #[error("native engine failure: {0}")]
    Native(String),
}

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),
    #[error("failed to encode telemetry: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
