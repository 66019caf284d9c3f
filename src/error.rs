/// Result alias that carries the crate [`Error`] type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the I/O collaborators around the simulation.
///
/// The simulation itself is total and never produces one of these.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// Config file exists but could not be parsed or written.
    #[error("config: {0}")]
    Config(#[from] serde_json::Error),
    /// A record row that could not be parsed.
    #[error("malformed record at line {line}: {reason}")]
    MalformedRecord { line: usize, reason: String },
    #[error("unknown level: {0}")]
    UnknownLevel(String),
    /// Player names double as file stems.
    #[error("invalid player name: {0:?}")]
    InvalidPlayerName(String),
}

impl Error {
    pub fn malformed<T: Into<String>>(line: usize, reason: T) -> Self {
        Self::MalformedRecord {
            line,
            reason: reason.into(),
        }
    }
}
