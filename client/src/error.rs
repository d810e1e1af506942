use reqwest::StatusCode;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Request to the forum API failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid forum API URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error(
        "Unauthorized, please check if you're logged in. This could be due to \
         an expired session or the token has become invalid."
    )]
    Unauthorized,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Forum API responded with {status}: {message}")]
    Status { status: StatusCode, message: String },

    #[error("You need to be logged in to do that.")]
    NotAuthenticated,

    #[error("{0}")]
    Invalid(&'static str),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    /// Maps a non-success response onto the error taxonomy. `message` is the
    /// response body, which the backend fills with a plain-text reason.
    pub fn from_status(status: StatusCode, message: String) -> Self {
        let message = message.trim().to_string();
        match status {
            StatusCode::UNAUTHORIZED => Error::Unauthorized,
            StatusCode::NOT_FOUND => Error::NotFound(if message.is_empty() {
                "resource does not exist".into()
            } else {
                message
            }),
            _ => Error::Status { status, message },
        }
    }
}

impl From<&'static str> for Error {
    fn from(e: &'static str) -> Self {
        Error::Invalid(e)
    }
}
