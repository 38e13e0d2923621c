#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("question bank answered HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("could not reach the question bank: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected response from the question bank: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Coarse classification used to pick a message for the user.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Forbidden,
    Server,
    Other,
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Transport(e) => e.status().map(|s| s.as_u16()),
            ApiError::Decode(_) => None,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self.status() {
            Some(404) => ErrorKind::NotFound,
            Some(403) => ErrorKind::Forbidden,
            Some(500..=599) => ErrorKind::Server,
            _ => ErrorKind::Other,
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self.kind() {
            ErrorKind::NotFound => "The requested unit, module or session could not be found.",
            ErrorKind::Forbidden => "You don't have permission to do this.",
            ErrorKind::Server => "The server ran into an error. Please try again later.",
            ErrorKind::Other => "Something went wrong while talking to the question bank.",
        }
    }
}
