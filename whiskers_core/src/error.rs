use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum WhiskersError {
    #[error("hardware error: {0}")]
    Hardware(String),
    #[error("hardware fault: {0}")]
    HardwareFault(String),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("timeout waiting for sensor")]
    Timeout,
    #[error("invalid state: {0}")]
    State(String),
    #[error("io error: {0}")]
    Io(String),
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum BuildError {
    #[error("missing scale")]
    MissingScale,
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}

/// Operator-correctable calibration failures. The session stays open for
/// `InvalidTarget` and `DegenerateReading`.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CalibrationError {
    #[error("calibration target must be > 0 g, got {0} g")]
    InvalidTarget(i32),
    #[error("averaged reading gives no usable scale factor")]
    DegenerateReading,
    #[error("input device closed during calibration")]
    InputClosed,
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
