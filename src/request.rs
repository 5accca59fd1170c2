use actix_web::HttpRequest;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct VoteForm {
    pub choice: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct NextParam {
    pub next: Option<String>,
}

/// Client address from `Forwarded`, then `X-Forwarded-For`, then the peer.
pub fn client_ip(req: &HttpRequest) -> String {
    req.connection_info().realip_remote_addr().map(str::to_owned).unwrap_or_else(|| "unknown".to_owned())
}
