use actix_web::web::{Data, Form, Path};
use actix_web::HttpResponse;
use chrono::Utc;
use log::debug;

use crate::context::UserInfo;
use crate::core::models::vote::Ballot;
use crate::core::ports::repository::Manager;
use crate::core::services::vote::submit_vote;
use crate::error::Error;
use crate::handlers::question::DetailPage;
use crate::handlers::{session_cookie, INDEX_URL};
use crate::impls::tokener::jwt::JWT;
use crate::messages::{Flash, Message};
use crate::middlewares::session::Claim;
use crate::request::VoteForm;

pub async fn vote<M>(
    me: UserInfo,
    mut flash: Flash,
    question_id: Path<i32>,
    Form(VoteForm { choice }): Form<VoteForm>,
    db: Data<M>,
    tokener: Data<JWT>,
) -> Result<HttpResponse, Error>
where
    M: Manager + 'static,
{
    let question_id = question_id.into_inner();
    let choice_id = choice.and_then(|c| c.trim().parse::<i32>().ok());
    let tx = db.tx().await?;
    match submit_vote(tx, me.id, question_id, choice_id, Utc::now()).await? {
        Ballot::NoChoice(detail) => {
            flash.push(Message::error("You didn't make a choice."));
            flash.into_page(Some(&me), DetailPage::new(detail, Some(&me)))
        }
        Ballot::Closed => {
            flash.push(Message::warning("This poll is not open for voting."));
            flash.redirect(INDEX_URL)
        }
        Ballot::Recorded { choice_id, outcome } => {
            debug!("vote {:?}: user {} question {} choice {}", outcome, me.id, question_id, choice_id);
            flash.push(Message::success("Your choice successfully recorded."));
            let mut resp = flash.redirect(&format!("/polls/{}/results/", question_id))?;
            let claim = Claim::renew(&me, Some(choice_id));
            resp.add_cookie(&session_cookie(&tokener, &claim)?)?;
            Ok(resp)
        }
    }
}
