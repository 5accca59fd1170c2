use actix_web::web::{Data, Path};
use actix_web::HttpResponse;
use chrono::Utc;
use serde::Serialize;

use crate::context::UserInfo;
use crate::core::models::question::{Detail, Summary};
use crate::core::ports::repository::Manager;
use crate::core::services::question::{published_questions, question_detail, question_results};
use crate::error::Error;
use crate::messages::Flash;

#[derive(Debug, Serialize)]
struct IndexPage {
    greeting: Option<String>,
    latest_question_list: Vec<Summary>,
}

#[derive(Debug, Serialize)]
pub(crate) struct DetailPage {
    #[serde(flatten)]
    detail: Detail,
    selected_choice: Option<i32>,
}

impl DetailPage {
    /// Reports the session's remembered choice only when it belongs to this question.
    pub(crate) fn new(detail: Detail, me: Option<&UserInfo>) -> Self {
        let selected_choice = me
            .and_then(|u| u.choice)
            .filter(|id| detail.choices.iter().any(|c| c.id == *id));
        Self { detail, selected_choice }
    }
}

pub async fn index<M>(me: Option<UserInfo>, flash: Flash, db: Data<M>) -> Result<HttpResponse, Error>
where
    M: Manager + 'static,
{
    let mut storer = db.db().await?;
    let questions = published_questions(&mut storer, Utc::now()).await?;
    flash.into_page(
        me.as_ref(),
        IndexPage {
            greeting: me.as_ref().map(|u| format!("Welcome back, {}", u.username)),
            latest_question_list: questions,
        },
    )
}

pub async fn detail<M>(me: Option<UserInfo>, flash: Flash, question_id: Path<i32>, db: Data<M>) -> Result<HttpResponse, Error>
where
    M: Manager + 'static,
{
    let mut storer = db.db().await?;
    let detail = question_detail(&mut storer, question_id.into_inner(), Utc::now()).await?;
    flash.into_page(me.as_ref(), DetailPage::new(detail, me.as_ref()))
}

pub async fn results<M>(me: Option<UserInfo>, flash: Flash, question_id: Path<i32>, db: Data<M>) -> Result<HttpResponse, Error>
where
    M: Manager + 'static,
{
    let mut storer = db.db().await?;
    let results = question_results(&mut storer, question_id.into_inner(), Utc::now()).await?;
    flash.into_page(me.as_ref(), results)
}
