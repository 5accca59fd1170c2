use crate::config::Config;
use crate::core::models::{
    choice::{Choice, ChoiceWithVotes},
    question::Question,
    user::{Insert as UserInsert, User},
    vote::{Insert as VoteInsert, Vote},
};
use crate::core::ports::repository::{ChoiceCommon, Common, Manager, QuestionCommon, Store, TxStore, UserCommon, VoteCommon};
use crate::error::Error;
use chrono::{DateTime, Utc};
use log::info;
use sqlx::migrate::Migrator;
use sqlx::pool::PoolConnection;
use sqlx::postgres::PgPoolOptions;
use sqlx::{query, query_as, query_scalar, Executor, PgPool, Postgres, Transaction};

pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

pub struct PgSqlx<E>
where
    for<'e> &'e mut E: Executor<'e>,
{
    executor: E,
}

impl<E> PgSqlx<E>
where
    for<'e> &'e mut E: Executor<'e>,
{
    pub fn new(executor: E) -> Self {
        Self { executor }
    }
}

impl<E> QuestionCommon for PgSqlx<E>
where
    for<'e> &'e mut E: Executor<'e, Database = Postgres>,
{
    async fn query_published(&mut self, now: DateTime<Utc>) -> Result<Vec<Question>, Error> {
        let questions = query_as("SELECT * FROM questions WHERE pub_date <= $1 ORDER BY pub_date DESC, id DESC")
            .bind(now)
            .fetch_all(&mut self.executor)
            .await?;
        Ok(questions)
    }

    async fn get(&mut self, id: i32) -> Result<Option<Question>, Error> {
        let question = query_as("SELECT * FROM questions WHERE id = $1").bind(id).fetch_optional(&mut self.executor).await?;
        Ok(question)
    }
}

impl<E> ChoiceCommon for PgSqlx<E>
where
    for<'e> &'e mut E: Executor<'e, Database = Postgres>,
{
    async fn query(&mut self, question_id: i32) -> Result<Vec<Choice>, Error> {
        let choices = query_as("SELECT * FROM choices WHERE question_id = $1 ORDER BY id")
            .bind(question_id)
            .fetch_all(&mut self.executor)
            .await?;
        Ok(choices)
    }

    async fn query_with_votes(&mut self, question_id: i32) -> Result<Vec<ChoiceWithVotes>, Error> {
        let choices = query_as(
            "
        SELECT
            c.id AS id,
            c.question_id AS question_id,
            c.choice_text AS choice_text,
            COUNT(v.id) AS votes
        FROM choices AS c
        LEFT JOIN votes AS v ON c.id = v.choice_id
        WHERE c.question_id = $1
        GROUP BY c.id, c.question_id, c.choice_text
        ORDER BY c.id",
        )
        .bind(question_id)
        .fetch_all(&mut self.executor)
        .await?;
        Ok(choices)
    }

    async fn get(&mut self, question_id: i32, id: i32) -> Result<Option<Choice>, Error> {
        let choice = query_as("SELECT * FROM choices WHERE question_id = $1 AND id = $2")
            .bind(question_id)
            .bind(id)
            .fetch_optional(&mut self.executor)
            .await?;
        Ok(choice)
    }
}

impl<E> VoteCommon for PgSqlx<E>
where
    for<'e> &'e mut E: Executor<'e, Database = Postgres>,
{
    async fn get(&mut self, user_id: i32, question_id: i32) -> Result<Option<Vote>, Error> {
        let vote = query_as("SELECT * FROM votes WHERE user_id = $1 AND question_id = $2 FOR UPDATE")
            .bind(user_id)
            .bind(question_id)
            .fetch_optional(&mut self.executor)
            .await?;
        Ok(vote)
    }

    // A concurrent first vote by the same user lands on the unique key; last write wins.
    async fn insert(&mut self, vote: VoteInsert) -> Result<i32, Error> {
        let id = query_scalar(
            "
        INSERT INTO votes (user_id, question_id, choice_id) VALUES ($1, $2, $3)
        ON CONFLICT (user_id, question_id) DO UPDATE SET choice_id = EXCLUDED.choice_id
        RETURNING id",
        )
        .bind(vote.user_id)
        .bind(vote.question_id)
        .bind(vote.choice_id)
        .fetch_one(&mut self.executor)
        .await?;
        Ok(id)
    }

    async fn update_choice(&mut self, id: i32, choice_id: i32) -> Result<(), Error> {
        query("UPDATE votes SET choice_id = $1 WHERE id = $2")
            .bind(choice_id)
            .bind(id)
            .execute(&mut self.executor)
            .await?;
        Ok(())
    }
}

impl<E> UserCommon for PgSqlx<E>
where
    for<'e> &'e mut E: Executor<'e, Database = Postgres>,
{
    async fn get_by_username(&mut self, username: &str) -> Result<Option<User>, Error> {
        let user = query_as("SELECT id, username, password, salt FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&mut self.executor)
            .await?;
        Ok(user)
    }

    async fn exists(&mut self, username: &str) -> Result<bool, Error> {
        let exists = query_scalar("SELECT EXISTS(SELECT * FROM users WHERE username = $1)")
            .bind(username)
            .fetch_one(&mut self.executor)
            .await?;
        Ok(exists)
    }

    async fn insert(&mut self, user: UserInsert) -> Result<User, Error> {
        let user = query_as("INSERT INTO users (username, password, salt) VALUES ($1, $2, $3) RETURNING id, username, password, salt")
            .bind(user.username)
            .bind(user.password)
            .bind(user.salt)
            .fetch_one(&mut self.executor)
            .await?;
        Ok(user)
    }
}

impl<E> Common for PgSqlx<E> where for<'e> &'e mut E: Executor<'e, Database = Postgres> {}
impl<E> Store for PgSqlx<E> where for<'e> &'e mut E: Executor<'e, Database = Postgres> {}

impl TxStore for PgSqlx<Transaction<'static, Postgres>> {
    async fn commit(self) -> Result<(), Error> {
        self.executor.commit().await?;
        Ok(())
    }

    async fn rollback(self) -> Result<(), Error> {
        self.executor.rollback().await?;
        Ok(())
    }
}

#[derive(Clone)]
pub struct PgSqlxManager {
    pool: PgPool,
}

impl PgSqlxManager {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(config: &Config) -> Result<Self, Error> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.database_url)
            .await?;
        MIGRATOR.run(&pool).await?;
        info!("database migrated");
        Ok(Self::new(pool))
    }
}

impl Manager for PgSqlxManager {
    type Store = PgSqlx<PoolConnection<Postgres>>;
    type TxStore = PgSqlx<Transaction<'static, Postgres>>;

    async fn db(&self) -> Result<Self::Store, Error> {
        let conn = self.pool.acquire().await?;
        Ok(PgSqlx::new(conn))
    }

    async fn tx(&self) -> Result<Self::TxStore, Error> {
        let tx = self.pool.begin().await?;
        Ok(PgSqlx::new(tx))
    }
}
