use serde::Deserialize;
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub password: String,
    pub salt: String,
}

#[derive(Debug, Clone)]
pub struct Insert {
    pub username: String,
    pub password: String,
    pub salt: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Signup {
    pub username: String,
    pub password1: String,
    pub password2: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Login {
    pub username: String,
    pub password: String,
    pub next: Option<String>,
}
