use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Could not reach the server: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with an error body. `message` is shown to the
    /// user as-is.
    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("Invalid response from server: {0}")]
    Decode(String),
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Http(e) => e.status().map(|s| s.as_u16()),
            ClientError::Decode(_) => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
