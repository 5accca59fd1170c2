use chrono::{DateTime, Utc};

use crate::core::models::vote::{Ballot, Insert as VoteInsert, Outcome};
use crate::core::ports::repository::{ChoiceCommon, QuestionCommon, TxStore, VoteCommon};
use crate::core::services::question::detail_of;
use crate::error::Error;

/// Records `user_id`'s choice for a question, replacing any earlier vote of
/// the same user on that question.
pub async fn submit_vote<T>(mut storer: T, user_id: i32, question_id: i32, choice_id: Option<i32>, now: DateTime<Utc>) -> Result<Ballot, Error>
where
    T: TxStore,
{
    let question = QuestionCommon::get(&mut storer, question_id).await?.ok_or(Error::NotFound)?;
    let choice = match choice_id {
        Some(id) => ChoiceCommon::get(&mut storer, question_id, id).await?,
        None => None,
    };
    let choice = match choice {
        Some(c) => c,
        None => {
            let detail = detail_of(&mut storer, question, now).await?;
            storer.rollback().await?;
            return Ok(Ballot::NoChoice(detail));
        }
    };
    if !question.can_vote_at(now) {
        storer.rollback().await?;
        return Ok(Ballot::Closed);
    }
    let outcome = match VoteCommon::get(&mut storer, user_id, question_id).await? {
        Some(vote) => {
            VoteCommon::update_choice(&mut storer, vote.id, choice.id).await?;
            Outcome::Updated
        }
        None => {
            VoteCommon::insert(
                &mut storer,
                VoteInsert {
                    user_id,
                    question_id,
                    choice_id: choice.id,
                },
            )
            .await?;
            Outcome::Created
        }
    };
    storer.commit().await?;
    Ok(Ballot::Recorded { choice_id: choice.id, outcome })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::core::ports::repository::Manager;
    use crate::database::memory::MemoryManager;
    use chrono::Duration;

    struct Fixture {
        manager: MemoryManager,
        user: i32,
        question: i32,
        choices: (i32, i32),
    }

    fn fixture(pub_offset: Duration, end_offset: Duration) -> Fixture {
        let now = Utc::now();
        let manager = MemoryManager::default();
        let question = manager.add_question("test", now + pub_offset, now + end_offset);
        let choices = (manager.add_choice(question, "test1"), manager.add_choice(question, "test2"));
        let user = manager.add_user("test", "password");
        Fixture {
            manager,
            user,
            question,
            choices,
        }
    }

    #[actix_web::test]
    async fn test_first_vote_creates_row() {
        let f = fixture(-Duration::days(1), Duration::days(1));
        let tx = f.manager.tx().await.unwrap();
        let ballot = submit_vote(tx, f.user, f.question, Some(f.choices.0), Utc::now()).await.unwrap();
        assert!(matches!(ballot, Ballot::Recorded { outcome: Outcome::Created, .. }));
        assert_eq!(f.manager.votes_of(f.question), vec![(f.user, f.choices.0)]);
    }

    #[actix_web::test]
    async fn test_revote_replaces_choice() {
        let f = fixture(-Duration::days(1), Duration::days(1));
        let tx = f.manager.tx().await.unwrap();
        submit_vote(tx, f.user, f.question, Some(f.choices.0), Utc::now()).await.unwrap();
        let tx = f.manager.tx().await.unwrap();
        let ballot = submit_vote(tx, f.user, f.question, Some(f.choices.1), Utc::now()).await.unwrap();
        assert!(matches!(ballot, Ballot::Recorded { outcome: Outcome::Updated, choice_id } if choice_id == f.choices.1));
        assert_eq!(f.manager.votes_of(f.question), vec![(f.user, f.choices.1)]);
    }

    #[actix_web::test]
    async fn test_missing_choice_leaves_votes_untouched() {
        let f = fixture(-Duration::days(1), Duration::days(1));
        let tx = f.manager.tx().await.unwrap();
        let ballot = submit_vote(tx, f.user, f.question, None, Utc::now()).await.unwrap();
        match ballot {
            Ballot::NoChoice(detail) => assert_eq!(detail.choices.len(), 2),
            other => panic!("unexpected ballot {:?}", other),
        }
        assert!(f.manager.votes_of(f.question).is_empty());
    }

    #[actix_web::test]
    async fn test_choice_of_other_question_is_rejected() {
        let f = fixture(-Duration::days(1), Duration::days(1));
        let now = Utc::now();
        let other = f.manager.add_question("other", now - Duration::days(1), now + Duration::days(1));
        let foreign = f.manager.add_choice(other, "foreign");
        let tx = f.manager.tx().await.unwrap();
        let ballot = submit_vote(tx, f.user, f.question, Some(foreign), now).await.unwrap();
        assert!(matches!(ballot, Ballot::NoChoice(_)));
        assert!(f.manager.votes_of(f.question).is_empty());
    }

    #[actix_web::test]
    async fn test_future_question_is_closed() {
        let f = fixture(Duration::days(30), Duration::days(31));
        let tx = f.manager.tx().await.unwrap();
        let ballot = submit_vote(tx, f.user, f.question, Some(f.choices.0), Utc::now()).await.unwrap();
        assert!(matches!(ballot, Ballot::Closed));
        assert!(f.manager.votes_of(f.question).is_empty());
    }

    #[actix_web::test]
    async fn test_ended_question_is_closed() {
        let f = fixture(-Duration::days(2), -Duration::days(1));
        let tx = f.manager.tx().await.unwrap();
        let ballot = submit_vote(tx, f.user, f.question, Some(f.choices.0), Utc::now()).await.unwrap();
        assert!(matches!(ballot, Ballot::Closed));
    }

    #[actix_web::test]
    async fn test_missing_question_is_not_found() {
        let f = fixture(-Duration::days(1), Duration::days(1));
        let tx = f.manager.tx().await.unwrap();
        let res = submit_vote(tx, f.user, 999, Some(f.choices.0), Utc::now()).await;
        assert!(matches!(res, Err(Error::NotFound)));
    }
}
