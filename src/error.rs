use std::io;

use log::error;
use rocket::{
    Request,
    http::Status,
    response::{self, Responder},
    serde::{Serialize, json::Json},
};
use thiserror::Error;
use tokio::task::JoinError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(&'static str),
    #[error("forbidden")]
    Forbidden,
    #[error("file not found")]
    NotFound,
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub const MISSING_PATH: Self = Self::BadRequest("path required");
    pub const NOT_MARKDOWN: Self = Self::BadRequest("not a markdown file");

    /// Maps a failed lookup of a requested file: a missing target is a 404,
    /// anything else is an internal failure.
    pub fn lookup(error: io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::NotFound => Self::NotFound,
            _ => Self::from(error),
        }
    }

    pub fn status(&self) -> Status {
        match self {
            Self::BadRequest(_) => Status::BadRequest,
            Self::Forbidden => Status::Forbidden,
            Self::NotFound => Status::NotFound,
            Self::Internal(_) => Status::InternalServerError,
        }
    }
}

impl From<io::Error> for ApiError {
    fn from(error: io::Error) -> Self {
        Self::Internal(error.to_string())
    }
}

impl From<JoinError> for ApiError {
    fn from(error: JoinError) -> Self {
        Self::Internal(error.to_string())
    }
}

#[derive(Debug, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

impl<'r> Responder<'r, 'static> for ApiError {
    fn respond_to(self, request: &'r Request<'_>) -> response::Result<'static> {
        let status = self.status();
        if status == Status::InternalServerError {
            error!("{} failed: {self}", request.uri());
        }

        (status, Json(ErrorBody::new(self.to_string()))).respond_to(request)
    }
}
