use hex::ToHex;
use rand::{thread_rng, Rng};
use sha2::{Digest, Sha256};

use crate::core::models::user::{Insert as UserInsert, Signup, User};
use crate::core::ports::repository::{Store, TxStore, UserCommon};
use crate::error::Error;

const USERNAME_MAX_LEN: usize = 150;
const SALT_CHARS: &[u8] = b"1234567890abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

pub fn hash_password(pass: &str, slt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(pass);
    hasher.update(slt);
    hasher.finalize().encode_hex()
}

pub fn random_salt() -> String {
    let mut rng = thread_rng();
    (0..32).map(|_| SALT_CHARS[rng.gen_range(0..SALT_CHARS.len())] as char).collect()
}

#[derive(Debug)]
pub enum Registration {
    Created(User),
    Rejected(Vec<String>),
}

pub fn validate_signup(form: &Signup) -> Vec<String> {
    let mut errors = Vec::new();
    if form.username.is_empty() {
        errors.push("Username is required.".to_owned());
    } else if form.username.chars().count() > USERNAME_MAX_LEN {
        errors.push(format!("Username must be at most {} characters.", USERNAME_MAX_LEN));
    } else if !form.username.chars().all(|c| c.is_alphanumeric() || "@.+-_".contains(c)) {
        errors.push("Username may contain only letters, numbers, and @/./+/-/_ characters.".to_owned());
    }
    if form.password1.is_empty() {
        errors.push("Password is required.".to_owned());
    }
    if form.password1 != form.password2 {
        errors.push("The two password fields didn't match.".to_owned());
    }
    errors
}

pub async fn signup<T>(mut storer: T, form: Signup) -> Result<Registration, Error>
where
    T: TxStore,
{
    let mut errors = validate_signup(&form);
    if errors.is_empty() && UserCommon::exists(&mut storer, &form.username).await? {
        errors.push("A user with that username already exists.".to_owned());
    }
    if !errors.is_empty() {
        storer.rollback().await?;
        return Ok(Registration::Rejected(errors));
    }
    let salt = random_salt();
    let user = UserCommon::insert(
        &mut storer,
        UserInsert {
            password: hash_password(&form.password1, &salt),
            username: form.username,
            salt,
        },
    )
    .await?;
    storer.commit().await?;
    Ok(Registration::Created(user))
}

pub async fn authenticate<S>(storer: &mut S, username: &str, password: &str) -> Result<Option<User>, Error>
where
    S: Store,
{
    match UserCommon::get_by_username(storer, username).await? {
        Some(user) if hash_password(password, &user.salt) == user.password => Ok(Some(user)),
        _ => Ok(None),
    }
}
