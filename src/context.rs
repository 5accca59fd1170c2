use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};

use crate::error::Error;

/// The logged-in user, attached to the request by the session middleware.
#[derive(Debug, Clone)]
pub struct UserInfo {
    pub id: i32,
    pub username: String,
    /// Last choice this session voted for.
    pub choice: Option<i32>,
    /// Expiry of the session token, kept when the token is reissued.
    pub exp: i64,
}

impl FromRequest for UserInfo {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        if let Some(user) = req.extensions().get::<Self>() {
            ready(Ok(user.clone()))
        } else {
            ready(Err(Error::Unauthenticated { next: req.path().to_owned() }))
        }
    }
}
