use std::fmt::Display;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("separator must not be empty")]
    EmptySeparator,
    #[error("serializing value: {0}")]
    Serialize(String),
    #[error("converting to json value")]
    Json(#[from] serde_json::Error),
}

impl serde::ser::Error for Error {
    fn custom<T: Display>(msg: T) -> Self {
        Self::Serialize(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, self::Error>;
