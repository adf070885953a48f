use chrono::{DateTime, Utc};

use crate::model::ids::{AnswerId, QuestionId};

/// A scored submission for a question.
///
/// A question may collect several answers over time; the latest is the one with
/// the greatest `time_answered`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    pub id: AnswerId,
    pub question_id: QuestionId,
    pub value: String,
    pub points: i32,
    pub time_asked: DateTime<Utc>,
    pub time_answered: DateTime<Utc>,
}

/// Picks the most recently answered entry.
#[must_use]
pub fn latest_answer<'a>(answers: impl IntoIterator<Item = &'a Answer>) -> Option<&'a Answer> {
    answers.into_iter().max_by_key(|a| a.time_answered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;
    use chrono::Duration;

    fn answer(minutes: i64) -> Answer {
        Answer {
            id: AnswerId::generate(),
            question_id: QuestionId::generate(),
            value: "5".into(),
            points: 1,
            time_asked: fixed_now(),
            time_answered: fixed_now() + Duration::minutes(minutes),
        }
    }

    #[test]
    fn latest_answer_uses_time_answered() {
        let answers = vec![answer(3), answer(9), answer(1)];
        let latest = latest_answer(&answers).unwrap();
        assert_eq!(latest.id, answers[1].id);
    }

    #[test]
    fn latest_answer_of_nothing_is_none() {
        assert!(latest_answer(&Vec::<Answer>::new()).is_none());
    }
}
