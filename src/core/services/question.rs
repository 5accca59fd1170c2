use chrono::{DateTime, Utc};

use crate::core::models::question::{Detail, Question, Results, Summary};
use crate::core::ports::repository::{ChoiceCommon, QuestionCommon, Store};
use crate::error::Error;

pub async fn published_questions<S>(storer: &mut S, now: DateTime<Utc>) -> Result<Vec<Summary>, Error>
where
    S: Store,
{
    let questions = QuestionCommon::query_published(storer, now).await?;
    Ok(questions.into_iter().map(|q| Summary::new(q, now)).collect())
}

async fn published_question<S>(storer: &mut S, id: i32, now: DateTime<Utc>) -> Result<Question, Error>
where
    S: Store,
{
    match QuestionCommon::get(storer, id).await? {
        Some(q) if q.is_published_at(now) => Ok(q),
        _ => Err(Error::NotFound),
    }
}

pub(crate) async fn detail_of<S>(storer: &mut S, question: Question, now: DateTime<Utc>) -> Result<Detail, Error>
where
    S: Store,
{
    let choices = ChoiceCommon::query(storer, question.id).await?;
    Ok(Detail {
        can_vote: question.can_vote_at(now),
        question,
        choices,
    })
}

pub async fn question_detail<S>(storer: &mut S, id: i32, now: DateTime<Utc>) -> Result<Detail, Error>
where
    S: Store,
{
    let question = published_question(storer, id, now).await?;
    detail_of(storer, question, now).await
}

pub async fn question_results<S>(storer: &mut S, id: i32, now: DateTime<Utc>) -> Result<Results, Error>
where
    S: Store,
{
    let question = published_question(storer, id, now).await?;
    let choices = ChoiceCommon::query_with_votes(storer, question.id).await?;
    let total_votes = choices.iter().map(|c| c.votes).sum();
    Ok(Results {
        question,
        choices,
        total_votes,
    })
}
