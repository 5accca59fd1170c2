use actix_web::http::{header, StatusCode};
use actix_web::{HttpResponse, ResponseError};
use log::error;
use serde_json::json;
use thiserror::Error as ThisError;

use crate::handlers::LOGIN_URL;

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("dotenv error: {0}")]
    DotEnvError(#[from] dotenv::Error),

    #[error("jwt error: {0}")]
    JWTError(#[from] jsonwebtoken::errors::Error),

    #[error("json error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("http error: {0}")]
    HttpError(#[from] actix_web::error::HttpError),

    #[error("hex error: {0}")]
    HexError(#[from] hex::FromHexError),

    #[error("not found")]
    NotFound,

    #[error("login required")]
    Unauthenticated { next: String },

    #[error("server error: {0}")]
    ServerError(String),
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::NotFound | Error::DatabaseError(sqlx::Error::RowNotFound) => StatusCode::NOT_FOUND,
            Error::Unauthenticated { .. } => StatusCode::FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        match self {
            Error::Unauthenticated { next } => HttpResponse::build(status)
                .insert_header((header::LOCATION, format!("{}?next={}", LOGIN_URL, next)))
                .finish(),
            _ if status.is_server_error() => {
                error!("{}", self);
                HttpResponse::build(status).json(json!({ "error": "internal server error" }))
            }
            _ => HttpResponse::build(status).json(json!({ "error": self.to_string() })),
        }
    }
}
