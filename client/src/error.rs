use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// The server refused with 402. `reason` is the machine readable code.
    #[error("{message}")]
    PaymentRequired {
        reason: String,
        message: String,
        upgrade_url: String,
    },

    #[error("Server responded with {status}: {message}")]
    Status { status: u16, message: String },
}

impl ClientError {
    pub fn is_payment_required(&self) -> bool {
        matches!(self, ClientError::PaymentRequired { .. })
    }
}
