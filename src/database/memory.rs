//! In-memory implementation of the repository ports, used by the test suite.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};

use crate::core::models::{
    choice::{Choice, ChoiceWithVotes},
    question::Question,
    user::{Insert as UserInsert, User},
    vote::{Insert as VoteInsert, Vote},
};
use crate::core::ports::repository::{ChoiceCommon, Common, Manager, QuestionCommon, Store, TxStore, UserCommon, VoteCommon};
use crate::core::services::user::{hash_password, random_salt};
use crate::error::Error;

#[derive(Debug, Clone, Default)]
struct State {
    next_id: i32,
    questions: Vec<Question>,
    choices: Vec<Choice>,
    votes: Vec<Vote>,
    users: Vec<User>,
}

impl State {
    fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryManager {
    shared: Arc<Mutex<State>>,
}

impl MemoryManager {
    fn with<R>(&self, f: impl FnOnce(&mut State) -> R) -> R {
        f(&mut self.shared.lock().unwrap())
    }

    pub fn add_question(&self, text: &str, pub_date: DateTime<Utc>, end_date: DateTime<Utc>) -> i32 {
        self.with(|s| {
            let id = s.next_id();
            s.questions.push(Question {
                id,
                question_text: text.into(),
                pub_date,
                end_date,
            });
            id
        })
    }

    pub fn add_choice(&self, question_id: i32, text: &str) -> i32 {
        self.with(|s| {
            let id = s.next_id();
            s.choices.push(Choice {
                id,
                question_id,
                choice_text: text.into(),
            });
            id
        })
    }

    pub fn add_user(&self, username: &str, password: &str) -> i32 {
        let salt = random_salt();
        self.with(|s| {
            let id = s.next_id();
            s.users.push(User {
                id,
                username: username.into(),
                password: hash_password(password, &salt),
                salt,
            });
            id
        })
    }

    pub fn add_vote(&self, user_id: i32, question_id: i32, choice_id: i32) -> i32 {
        self.with(|s| {
            let id = s.next_id();
            s.votes.push(Vote {
                id,
                user_id,
                question_id,
                choice_id,
            });
            id
        })
    }

    /// `(user_id, choice_id)` of every vote on a question.
    pub fn votes_of(&self, question_id: i32) -> Vec<(i32, i32)> {
        self.with(|s| s.votes.iter().filter(|v| v.question_id == question_id).map(|v| (v.user_id, v.choice_id)).collect())
    }
}

/// Works on the shared state directly, or on a private copy that replaces it
/// on commit when opened as a transaction.
pub struct MemoryStore {
    shared: Arc<Mutex<State>>,
    working: Option<State>,
}

impl MemoryStore {
    fn with<R>(&mut self, f: impl FnOnce(&mut State) -> R) -> R {
        match &mut self.working {
            Some(state) => f(state),
            None => f(&mut self.shared.lock().unwrap()),
        }
    }
}

impl QuestionCommon for MemoryStore {
    async fn query_published(&mut self, now: DateTime<Utc>) -> Result<Vec<Question>, Error> {
        Ok(self.with(|s| {
            let mut list: Vec<Question> = s.questions.iter().filter(|q| q.pub_date <= now).cloned().collect();
            list.sort_by(|a, b| b.pub_date.cmp(&a.pub_date).then(b.id.cmp(&a.id)));
            list
        }))
    }

    async fn get(&mut self, id: i32) -> Result<Option<Question>, Error> {
        Ok(self.with(|s| s.questions.iter().find(|q| q.id == id).cloned()))
    }
}

impl ChoiceCommon for MemoryStore {
    async fn query(&mut self, question_id: i32) -> Result<Vec<Choice>, Error> {
        Ok(self.with(|s| s.choices.iter().filter(|c| c.question_id == question_id).cloned().collect()))
    }

    async fn query_with_votes(&mut self, question_id: i32) -> Result<Vec<ChoiceWithVotes>, Error> {
        Ok(self.with(|s| {
            s.choices
                .iter()
                .filter(|c| c.question_id == question_id)
                .map(|c| ChoiceWithVotes {
                    id: c.id,
                    question_id: c.question_id,
                    choice_text: c.choice_text.clone(),
                    votes: s.votes.iter().filter(|v| v.choice_id == c.id).count() as i64,
                })
                .collect()
        }))
    }

    async fn get(&mut self, question_id: i32, id: i32) -> Result<Option<Choice>, Error> {
        Ok(self.with(|s| s.choices.iter().find(|c| c.question_id == question_id && c.id == id).cloned()))
    }
}

impl VoteCommon for MemoryStore {
    async fn get(&mut self, user_id: i32, question_id: i32) -> Result<Option<Vote>, Error> {
        Ok(self.with(|s| s.votes.iter().find(|v| v.user_id == user_id && v.question_id == question_id).cloned()))
    }

    async fn insert(&mut self, vote: VoteInsert) -> Result<i32, Error> {
        Ok(self.with(|s| {
            let id = s.next_id();
            s.votes.push(Vote {
                id,
                user_id: vote.user_id,
                question_id: vote.question_id,
                choice_id: vote.choice_id,
            });
            id
        }))
    }

    async fn update_choice(&mut self, id: i32, choice_id: i32) -> Result<(), Error> {
        self.with(|s| match s.votes.iter_mut().find(|v| v.id == id) {
            Some(vote) => {
                vote.choice_id = choice_id;
                Ok(())
            }
            None => Err(Error::NotFound),
        })
    }
}

impl UserCommon for MemoryStore {
    async fn get_by_username(&mut self, username: &str) -> Result<Option<User>, Error> {
        Ok(self.with(|s| s.users.iter().find(|u| u.username == username).cloned()))
    }

    async fn exists(&mut self, username: &str) -> Result<bool, Error> {
        Ok(self.with(|s| s.users.iter().any(|u| u.username == username)))
    }

    async fn insert(&mut self, user: UserInsert) -> Result<User, Error> {
        Ok(self.with(|s| {
            let user = User {
                id: s.next_id(),
                username: user.username,
                password: user.password,
                salt: user.salt,
            };
            s.users.push(user.clone());
            user
        }))
    }
}

impl Common for MemoryStore {}
impl Store for MemoryStore {}

impl TxStore for MemoryStore {
    async fn commit(self) -> Result<(), Error> {
        if let Some(state) = self.working {
            *self.shared.lock().unwrap() = state;
        }
        Ok(())
    }

    async fn rollback(self) -> Result<(), Error> {
        Ok(())
    }
}

impl Manager for MemoryManager {
    type Store = MemoryStore;
    type TxStore = MemoryStore;

    async fn db(&self) -> Result<Self::Store, Error> {
        Ok(MemoryStore {
            shared: self.shared.clone(),
            working: None,
        })
    }

    async fn tx(&self) -> Result<Self::TxStore, Error> {
        let working = self.shared.lock().unwrap().clone();
        Ok(MemoryStore {
            shared: self.shared.clone(),
            working: Some(working),
        })
    }
}
