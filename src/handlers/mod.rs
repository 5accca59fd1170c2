#[cfg(test)]
macro_rules! test_app {
    ($manager:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .wrap(crate::middlewares::session::Session::new(crate::handlers::test_support::SECRET.to_vec()))
                .app_data(actix_web::web::Data::new($manager.clone()))
                .app_data(actix_web::web::Data::new(crate::impls::tokener::jwt::JWT::new(crate::handlers::test_support::SECRET.to_vec())))
                .app_data(actix_web::web::Data::new(crate::handlers::test_support::config()))
                .configure(crate::handlers::routes::<crate::database::memory::MemoryManager>),
        )
        .await
    };
}

pub mod question;
pub mod vote;

use actix_web::cookie::Cookie;
use actix_web::http::header::HeaderValue;
use actix_web::http::Uri;
use actix_web::web::{get, post, resource, scope, Data, Form, Query, ServiceConfig};
use actix_web::{HttpRequest, HttpResponse};
use log::{info, warn};
use serde::Serialize;

use crate::config::Config;
use crate::context::UserInfo;
use crate::core::models::user::{Login, Signup};
use crate::core::ports::repository::Manager;
use crate::core::ports::tokener::Tokener;
use crate::core::services::user::{authenticate, signup as register, Registration};
use crate::error::Error;
use crate::impls::tokener::jwt::JWT;
use crate::messages::{Flash, Message};
use crate::middlewares::session::{Claim, SESSION_TOKEN};
use crate::request::{client_ip, NextParam};

pub static INDEX_URL: &str = "/polls/";
pub static LOGIN_URL: &str = "/login/";

pub fn routes<M>(cfg: &mut ServiceConfig)
where
    M: Manager + 'static,
{
    cfg.service(
        scope("/polls")
            .route("/", get().to(question::index::<M>))
            .route("/{question_id}/", get().to(question::detail::<M>))
            .route("/{question_id}/results/", get().to(question::results::<M>))
            .route("/{question_id}/vote/", post().to(vote::vote::<M>)),
    )
    .service(resource("/signup/").route(get().to(signup_form)).route(post().to(signup::<M>)))
    .service(resource("/login/").route(get().to(login_form)).route(post().to(login::<M>)))
    .service(resource("/logout/").route(post().to(logout)));
}

pub(crate) fn session_cookie(tokener: &JWT, claim: &Claim) -> Result<Cookie<'static>, Error> {
    let token = tokener.gen_token(claim)?;
    Ok(Cookie::build(SESSION_TOKEN, token).path("/").http_only(true).finish())
}

/// Only local paths are followed after login. Anything a browser could read
/// as another host, or that is not a valid `Location` value, falls back to the index.
fn redirect_target(next: Option<&str>) -> &str {
    match next {
        Some(n) if is_local_path(n) => n,
        _ => INDEX_URL,
    }
}

fn is_local_path(path: &str) -> bool {
    let mut chars = path.chars();
    if chars.next() != Some('/') || matches!(chars.next(), Some('/') | Some('\\')) {
        return false;
    }
    if HeaderValue::from_str(path).is_err() {
        return false;
    }
    match path.parse::<Uri>() {
        Ok(uri) => uri.scheme().is_none() && uri.authority().is_none(),
        Err(_) => false,
    }
}

#[derive(Debug, Serialize)]
struct LoginPage {
    username: String,
    next: Option<String>,
}

#[derive(Debug, Serialize)]
struct SignupPage {
    username: String,
    errors: Vec<String>,
}

pub async fn login_form(me: Option<UserInfo>, flash: Flash, Query(NextParam { next }): Query<NextParam>) -> Result<HttpResponse, Error> {
    flash.into_page(
        me.as_ref(),
        LoginPage {
            username: String::new(),
            next,
        },
    )
}

pub async fn login<M>(
    req: HttpRequest,
    mut flash: Flash,
    Form(Login { username, password, next }): Form<Login>,
    db: Data<M>,
    tokener: Data<JWT>,
    config: Data<Config>,
) -> Result<HttpResponse, Error>
where
    M: Manager + 'static,
{
    let mut storer = db.db().await?;
    let ip = client_ip(&req);
    match authenticate(&mut storer, &username, &password).await? {
        Some(user) => {
            info!(target: "polls::auth", "login user: {} via ip: {}", user.username, ip);
            let mut resp = flash.redirect(redirect_target(next.as_deref()))?;
            resp.add_cookie(&session_cookie(&tokener, &Claim::new(user.id, &user.username, None, config.session_days))?)?;
            Ok(resp)
        }
        None => {
            warn!(target: "polls::auth", "login failed for: {} via ip: {}", username, ip);
            flash.push(Message::error("Please enter a correct username and password."));
            flash.into_page(None, LoginPage { username, next })
        }
    }
}

pub async fn logout(req: HttpRequest, me: Option<UserInfo>, flash: Flash) -> Result<HttpResponse, Error> {
    if let Some(user) = me {
        info!(target: "polls::auth", "logout user: {} via ip: {}", user.username, client_ip(&req));
    }
    let mut resp = flash.redirect(INDEX_URL)?;
    resp.add_removal_cookie(&Cookie::build(SESSION_TOKEN, "").path("/").finish())?;
    Ok(resp)
}

pub async fn signup_form(me: Option<UserInfo>, flash: Flash) -> Result<HttpResponse, Error> {
    flash.into_page(
        me.as_ref(),
        SignupPage {
            username: String::new(),
            errors: Vec::new(),
        },
    )
}

pub async fn signup<M>(req: HttpRequest, flash: Flash, Form(form): Form<Signup>, db: Data<M>, tokener: Data<JWT>, config: Data<Config>) -> Result<HttpResponse, Error>
where
    M: Manager + 'static,
{
    let username = form.username.clone();
    let tx = db.tx().await?;
    match register(tx, form).await? {
        Registration::Created(user) => {
            info!(target: "polls::auth", "login user: {} via ip: {}", user.username, client_ip(&req));
            let mut resp = flash.redirect(INDEX_URL)?;
            resp.add_cookie(&session_cookie(&tokener, &Claim::new(user.id, &user.username, None, config.session_days))?)?;
            Ok(resp)
        }
        Registration::Rejected(errors) => flash.into_page(None, SignupPage { username, errors }),
    }
}
