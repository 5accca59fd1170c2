use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use sqlx::FromRow;

use crate::core::models::choice::{Choice, ChoiceWithVotes};

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Question {
    pub id: i32,
    pub question_text: String,
    pub pub_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

impl Question {
    pub fn is_published_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.pub_date
    }

    pub fn is_published(&self) -> bool {
        self.is_published_at(Utc::now())
    }

    /// Voting window is inclusive at both ends.
    pub fn can_vote_at(&self, now: DateTime<Utc>) -> bool {
        self.pub_date <= now && now <= self.end_date
    }

    pub fn can_vote(&self) -> bool {
        self.can_vote_at(Utc::now())
    }

    pub fn was_published_recently_at(&self, now: DateTime<Utc>) -> bool {
        now - Duration::days(1) <= self.pub_date && self.pub_date <= now
    }

    pub fn was_published_recently(&self) -> bool {
        self.was_published_recently_at(Utc::now())
    }
}

/// Row of the index page.
#[derive(Debug, Serialize)]
pub struct Summary {
    pub id: i32,
    pub question_text: String,
    pub pub_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub was_published_recently: bool,
    pub can_vote: bool,
}

impl Summary {
    pub fn new(question: Question, now: DateTime<Utc>) -> Self {
        Self {
            was_published_recently: question.was_published_recently_at(now),
            can_vote: question.can_vote_at(now),
            id: question.id,
            question_text: question.question_text,
            pub_date: question.pub_date,
            end_date: question.end_date,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Detail {
    pub question: Question,
    pub can_vote: bool,
    pub choices: Vec<Choice>,
}

#[derive(Debug, Serialize)]
pub struct Results {
    pub question: Question,
    pub choices: Vec<ChoiceWithVotes>,
    pub total_votes: i64,
}
