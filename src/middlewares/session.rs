use chrono::{Duration, Utc};
use log::debug;
use serde::{Deserialize, Serialize};

use actix_web::{
    dev::{Service, ServiceRequest, Transform},
    Error, HttpMessage,
};
use crate::context::UserInfo;
use crate::core::ports::tokener::{Payload, Tokener};
use crate::impls::tokener::jwt::JWT;
use std::future::Future;
use std::pin::Pin;

pub static SESSION_TOKEN: &str = "SESSION_TOKEN";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Claim {
    pub user: String,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choice: Option<i32>,
    pub exp: i64,
}

impl Claim {
    /// Claim for the user behind `me`, keeping its expiry.
    pub fn renew(me: &UserInfo, choice: Option<i32>) -> Self {
        Self {
            user: me.id.to_string(),
            username: me.username.clone(),
            choice,
            exp: me.exp,
        }
    }

    pub fn new(id: i32, username: &str, choice: Option<i32>, days: i64) -> Self {
        Self {
            user: id.to_string(),
            username: username.to_owned(),
            choice,
            exp: (Utc::now() + Duration::days(days)).timestamp(),
        }
    }
}

impl Payload for Claim {
    fn user(&self) -> &str {
        &self.user
    }
}

/// Attaches a [`UserInfo`] to requests carrying a valid session cookie.
/// Requests without one pass through anonymously.
pub struct Session {
    secret: Vec<u8>,
}

impl Session {
    pub fn new(secret: Vec<u8>) -> Self {
        Self { secret }
    }
}

impl<S> Transform<S, ServiceRequest> for Session
where
    S: Service<ServiceRequest> + 'static,
    S::Future: 'static,
    S::Error: Into<Error>,
{
    type Error = Error;
    type Response = S::Response;
    type Transform = SessionService<S>;
    type InitError = ();
    type Future = Pin<Box<dyn Future<Output = Result<Self::Transform, Self::InitError>>>>;

    fn new_transform(&self, service: S) -> Self::Future {
        let secret = self.secret.clone();
        Box::pin(async move {
            Ok(SessionService {
                tokener: JWT::new(secret),
                next_service: service,
            })
        })
    }
}

pub struct SessionService<S> {
    tokener: JWT,
    next_service: S,
}

impl<S> Service<ServiceRequest> for SessionService<S>
where
    S: Service<ServiceRequest>,
    S::Future: 'static,
    S::Error: Into<Error>,
{
    type Response = S::Response;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    fn poll_ready(&self, ctx: &mut std::task::Context<'_>) -> std::task::Poll<Result<(), Self::Error>> {
        self.next_service.poll_ready(ctx).map_err(|e| e.into())
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        if let Some(cookie) = req.cookie(SESSION_TOKEN) {
            match <JWT as Tokener<Claim>>::verify_token(&self.tokener, cookie.value()) {
                Err(e) => debug!("ignoring session token: {}", e),
                Ok(claim) => {
                    let id = claim.user().parse::<i32>();
                    match id {
                        Err(e) => debug!("ignoring session token: {}", e),
                        Ok(id) => {
                            req.extensions_mut().insert(UserInfo {
                                id,
                                username: claim.username,
                                choice: claim.choice,
                                exp: claim.exp,
                            });
                        }
                    }
                }
            }
        }

        let res_fut = self.next_service.call(req);
        Box::pin(async move {
            let resp = res_fut.await.map_err(|e| e.into())?;
            Ok(resp)
        })
    }
}
