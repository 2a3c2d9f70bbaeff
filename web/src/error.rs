use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::{error, warn};

#[derive(thiserror::Error, Debug)]
pub(crate) enum Error {
    #[error(transparent)]
    Libfood(#[from] libfood::Error),
    #[error("Resource Not Found: {0}")]
    NotFound(String),
    #[error("The request body was rejected: {0}")]
    BadRequestBody(#[from] JsonRejection),
    #[error("The provided query string was rejected: {0}")]
    UnprocessableEntityQueryRejection(#[source] QueryRejection),
}

/// The JSON body sent to the client for every error response
#[derive(Serialize, Debug, PartialEq)]
pub(crate) struct ErrorBody {
    pub(crate) message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) field: Option<String>,
}

impl ErrorBody {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            field: None,
        }
    }

    fn with_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            field: Some(field.into()),
        }
    }
}

impl Error {
    pub(crate) fn to_client_status(&self) -> (StatusCode, ErrorBody) {
        match self {
            Error::Libfood(libfood::Error::Validation { field, message }) => (
                StatusCode::BAD_REQUEST,
                ErrorBody::with_field(message.clone(), field.clone()),
            ),
            Error::Libfood(e @ libfood::Error::NotFound(_)) => {
                (StatusCode::NOT_FOUND, ErrorBody::new(e.to_string()))
            }
            Error::Libfood(libfood::Error::DatabaseError(_)) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorBody::new("Database error"),
            ),
            Error::Libfood(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorBody::new("Internal error"),
            ),
            Error::NotFound(message) => (StatusCode::NOT_FOUND, ErrorBody::new(message.clone())),
            Error::BadRequestBody(rejection) => (
                StatusCode::BAD_REQUEST,
                ErrorBody::with_field(rejection.body_text(), ""),
            ),
            Error::UnprocessableEntityQueryRejection(_) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorBody::new(
                    "The query string was not in the expected format. The request could not be processed.",
                ),
            ),
        }
    }
}

// Tell axum how to convert `Error` into a response.
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, body) = self.to_client_status();
        if status.is_server_error() {
            error!("Internal error while handling request: {self:?}");
        } else {
            warn!("Got error for response: {self}");
        }
        (status, Json(body)).into_response()
    }
}
