#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    #[error("Platform rejected the credentials: {0}")]
    Unauthorized(String),
    #[error("Platform request timed out")]
    Timeout,
    #[error("Platform returned HTTP {status}: {body}")]
    Http { status: u16, body: String },
    #[error("Platform request failed: {0}")]
    Transport(String),
    #[error("Platform response could not be decoded: {0}")]
    Decode(String),
    #[error("Not supported: {0}")]
    Unsupported(String),
    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),
}

impl PlatformError {
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Unauthorized(_) | Self::InvalidCredentials(_))
    }
}

impl From<reqwest::Error> for PlatformError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}
