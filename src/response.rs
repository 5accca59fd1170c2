use serde::Serialize;

use crate::messages::Message;

#[derive(Debug, Serialize)]
pub struct Page<T> {
    user: Option<String>,
    messages: Vec<Message>,
    #[serde(flatten)]
    body: T,
}

impl<T> Page<T> {
    pub fn new(user: Option<String>, messages: Vec<Message>, body: T) -> Self {
        Page { user, messages, body }
    }
}
