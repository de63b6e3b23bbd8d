/// Everything that can go wrong inside a single marketplace operation.
///
/// Every failure is scoped to one request against one crop aggregate; no
/// variant is fatal to the process and none requires a multi-document
/// rollback.
#[derive(thiserror::Error, Debug)]
pub enum MarketError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("{0} not found")]
    NotFound(String),
    #[error("{buyer} already expressed interest in crop {crop_id}")]
    Conflict { crop_id: String, buyer: String },
    #[error("interest {0} has already been accepted")]
    AlreadyProcessed(String),
    #[error("insufficient stock: requested {requested}, available {available}")]
    InsufficientStock { requested: u64, available: u64 },
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

// Store faults are transient from the caller's point of view; the operation
// may be retried once the store recovers.
impl From<sled::Error> for MarketError {
    fn from(err: sled::Error) -> Self {
        MarketError::Unavailable(err.to_string())
    }
}

impl From<minicbor::decode::Error> for MarketError {
    fn from(err: minicbor::decode::Error) -> Self {
        MarketError::Unavailable(format!("stored document is unreadable: {err}"))
    }
}

impl From<minicbor::encode::Error<std::convert::Infallible>> for MarketError {
    fn from(err: minicbor::encode::Error<std::convert::Infallible>) -> Self {
        MarketError::Unavailable(format!("document failed to encode: {err}"))
    }
}
