//! Domain error types.

use crate::domain::line_plan::LineKind;

/// Top-level error type for autolot.
#[derive(Debug, thiserror::Error)]
pub enum AutolotError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("trade history error: {reason}")]
    History { reason: String },

    #[error("invalid command {message:?}: {reason}")]
    InvalidCommand { message: String, reason: String },

    #[error("risk percentage must be positive, got {value}")]
    InvalidRisk { value: f64 },

    #[error("volume {volume} is below the executable minimum {minimum}")]
    ZeroOrSubMinimumVolume { volume: f64, minimum: f64 },

    #[error("price level {level} is missing")]
    MissingPriceLevel { level: LineKind },

    #[error("protection could not be attached to {id}: {reason}")]
    ProtectionAttachmentFailure { id: String, reason: String },

    #[error("gateway rejected the request: {reason}")]
    GatewayRejection { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl AutolotError {
    /// Message shown to the trader when an action is refused.
    pub fn user_message(&self) -> String {
        match self {
            AutolotError::ZeroOrSubMinimumVolume { .. } => {
                "lot size is zero or below the minimum tradable volume".to_string()
            }
            AutolotError::GatewayRejection { reason } => format!("order failed: {reason}"),
            AutolotError::ProtectionAttachmentFailure { id, .. } => {
                format!("SL/TP could not be attached to {id}, position is unprotected")
            }
            other => other.to_string(),
        }
    }
}

impl From<&AutolotError> for std::process::ExitCode {
    fn from(err: &AutolotError) -> Self {
        let code: u8 = match err {
            AutolotError::Io(_) => 1,
            AutolotError::ConfigParse { .. }
            | AutolotError::ConfigMissing { .. }
            | AutolotError::ConfigInvalid { .. } => 2,
            AutolotError::History { .. } => 3,
            AutolotError::InvalidCommand { .. } | AutolotError::InvalidRisk { .. } => 4,
            AutolotError::ZeroOrSubMinimumVolume { .. }
            | AutolotError::MissingPriceLevel { .. } => 5,
            AutolotError::ProtectionAttachmentFailure { .. }
            | AutolotError::GatewayRejection { .. } => 6,
        };
        std::process::ExitCode::from(code)
    }
}
