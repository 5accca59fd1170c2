use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Choice {
    pub id: i32,
    pub question_id: i32,
    pub choice_text: String,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ChoiceWithVotes {
    pub id: i32,
    pub question_id: i32,
    pub choice_text: String,
    pub votes: i64,
}
