use chrono::{DateTime, Utc};

use crate::core::models::{
    choice::{Choice, ChoiceWithVotes},
    question::Question,
    user::{Insert as UserInsert, User},
    vote::{Insert as VoteInsert, Vote},
};
use crate::error::Error;

pub trait QuestionCommon {
    /// Questions with `pub_date <= now`, newest first.
    async fn query_published(&mut self, now: DateTime<Utc>) -> Result<Vec<Question>, Error>;
    async fn get(&mut self, id: i32) -> Result<Option<Question>, Error>;
}

pub trait ChoiceCommon {
    async fn query(&mut self, question_id: i32) -> Result<Vec<Choice>, Error>;
    async fn query_with_votes(&mut self, question_id: i32) -> Result<Vec<ChoiceWithVotes>, Error>;
    async fn get(&mut self, question_id: i32, id: i32) -> Result<Option<Choice>, Error>;
}

pub trait VoteCommon {
    async fn get(&mut self, user_id: i32, question_id: i32) -> Result<Option<Vote>, Error>;
    async fn insert(&mut self, vote: VoteInsert) -> Result<i32, Error>;
    async fn update_choice(&mut self, id: i32, choice_id: i32) -> Result<(), Error>;
}

pub trait UserCommon {
    async fn get_by_username(&mut self, username: &str) -> Result<Option<User>, Error>;
    async fn exists(&mut self, username: &str) -> Result<bool, Error>;
    async fn insert(&mut self, user: UserInsert) -> Result<User, Error>;
}

pub trait Common: QuestionCommon + ChoiceCommon + VoteCommon + UserCommon {}

pub trait Store: Common {}

pub trait TxStore: Store {
    async fn commit(self) -> Result<(), Error>;
    async fn rollback(self) -> Result<(), Error>;
}

pub trait Manager {
    type Store: Store;
    type TxStore: TxStore;

    async fn db(&self) -> Result<Self::Store, Error>;
    async fn tx(&self) -> Result<Self::TxStore, Error>;
}
