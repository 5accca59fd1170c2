//! One-shot messages shown on the next rendered page, carried across
//! redirects in the `MESSAGES` cookie.

use actix_web::cookie::Cookie;
use actix_web::dev::Payload;
use actix_web::http::{header, StatusCode};
use actix_web::{FromRequest, HttpRequest, HttpResponse};
use log::debug;
use serde::{Deserialize, Serialize};
use std::future::{ready, Ready};

use crate::context::UserInfo;
use crate::error::Error;
use crate::response::Page;

pub static MESSAGES: &str = "MESSAGES";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub level: Level,
    pub text: String,
}

impl Message {
    pub fn new(level: Level, text: impl Into<String>) -> Self {
        Self { level, text: text.into() }
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self::new(Level::Success, text)
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self::new(Level::Warning, text)
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::new(Level::Error, text)
    }
}

pub fn encode(messages: &[Message]) -> Result<String, Error> {
    Ok(hex::encode(serde_json::to_vec(messages)?))
}

pub fn decode(value: &str) -> Result<Vec<Message>, Error> {
    Ok(serde_json::from_slice(&hex::decode(value)?)?)
}

fn cookie(value: String) -> Cookie<'static> {
    Cookie::build(MESSAGES, value).path("/").http_only(true).finish()
}

/// Messages pending for the current request.
#[derive(Debug, Default)]
pub struct Flash {
    messages: Vec<Message>,
    from_cookie: bool,
}

impl Flash {
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Renders a page showing every pending message and clears the cookie.
    pub fn into_page<T>(self, user: Option<&UserInfo>, body: T) -> Result<HttpResponse, Error>
    where
        T: Serialize,
    {
        let page = Page::new(user.map(|u| u.username.clone()), self.messages, body);
        let mut resp = HttpResponse::build(StatusCode::OK).json(page);
        if self.from_cookie {
            resp.add_removal_cookie(&cookie(String::new()))?;
        }
        Ok(resp)
    }

    /// Redirects, keeping every pending message for the next page.
    pub fn redirect(self, location: &str) -> Result<HttpResponse, Error> {
        let mut resp = HttpResponse::build(StatusCode::FOUND).insert_header((header::LOCATION, location)).finish();
        if !self.messages.is_empty() {
            resp.add_cookie(&cookie(encode(&self.messages)?))?;
        } else if self.from_cookie {
            resp.add_removal_cookie(&cookie(String::new()))?;
        }
        Ok(resp)
    }
}

impl FromRequest for Flash {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let flash = match req.cookie(MESSAGES) {
            None => Flash::default(),
            Some(c) => Flash {
                messages: decode(c.value()).unwrap_or_else(|e| {
                    debug!("dropping malformed messages cookie: {}", e);
                    Vec::new()
                }),
                from_cookie: true,
            },
        };
        ready(Ok(flash))
    }
}
