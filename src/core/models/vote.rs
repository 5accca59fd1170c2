use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Vote {
    pub id: i32,
    pub user_id: i32,
    pub question_id: i32,
    pub choice_id: i32,
}

#[derive(Debug, Clone)]
pub struct Insert {
    pub user_id: i32,
    pub question_id: i32,
    pub choice_id: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Created,
    Updated,
}

/// Result of a vote submission that did not fail outright.
#[derive(Debug)]
pub enum Ballot {
    Recorded { choice_id: i32, outcome: Outcome },
    NoChoice(super::question::Detail),
    Closed,
}
