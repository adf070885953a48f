use std::collections::BTreeMap;
use std::fmt::Display;
use std::str::FromStr;

use quiz_core::model::{
    Answer, FormattedText, Question, QuizDesign, QuizDesignSubject, Quiz, SubjectId, User,
};
use serde::{Deserialize, Serialize};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use crate::repository::StorageError;

fn ser<E: Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

/// Maps driver errors, singling out constraint violations.
pub(crate) fn db_err(e: sqlx::Error) -> StorageError {
    if let sqlx::Error::Database(db) = &e {
        if db.is_unique_violation() {
            return StorageError::Conflict;
        }
        if db.is_foreign_key_violation() {
            return StorageError::NotFound;
        }
    }
    StorageError::Connection(e.to_string())
}

fn parse_id<T>(field: &'static str, raw: &str) -> Result<T, StorageError>
where
    T: FromStr,
    T::Err: Display,
{
    raw.parse::<T>()
        .map_err(|e| StorageError::Serialization(format!("{field}: {e}")))
}

fn id_column<T>(row: &SqliteRow, column: &'static str) -> Result<T, StorageError>
where
    T: FromStr,
    T::Err: Display,
{
    let raw: String = row.try_get(column).map_err(ser)?;
    parse_id(column, &raw)
}

fn u32_column(row: &SqliteRow, column: &'static str) -> Result<u32, StorageError> {
    let v: i64 = row.try_get(column).map_err(ser)?;
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {column}: {v}")))
}

fn i32_column(row: &SqliteRow, column: &'static str) -> Result<i32, StorageError> {
    let v: i64 = row.try_get(column).map_err(ser)?;
    i32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {column}: {v}")))
}

//
// ─── JSON COLUMNS ──────────────────────────────────────────────────────────────
//

#[derive(Serialize, Deserialize)]
struct SubjectEntry {
    subject: String,
    min_questions: u32,
    max_questions: u32,
}

pub(crate) fn subjects_to_json(subjects: &[QuizDesignSubject]) -> Result<String, StorageError> {
    let entries: Vec<SubjectEntry> = subjects
        .iter()
        .map(|s| SubjectEntry {
            subject: s.subject().to_string(),
            min_questions: s.min_questions(),
            max_questions: s.max_questions(),
        })
        .collect();
    serde_json::to_string(&entries).map_err(ser)
}

fn subjects_from_json(raw: &str) -> Result<Vec<QuizDesignSubject>, StorageError> {
    let entries: Vec<SubjectEntry> = serde_json::from_str(raw).map_err(ser)?;
    entries
        .into_iter()
        .map(|e| {
            let subject = SubjectId::new(e.subject).map_err(ser)?;
            QuizDesignSubject::new(subject, e.min_questions, e.max_questions).map_err(ser)
        })
        .collect()
}

/// JSON has no NaN or infinity; serde_json would write them as `null`.
pub(crate) fn dimensions_to_json(dimensions: &BTreeMap<String, f32>) -> Result<String, StorageError> {
    if let Some((name, weight)) = dimensions.iter().find(|(_, w)| !w.is_finite()) {
        return Err(StorageError::Serialization(format!(
            "dimension {name} has non-finite weight {weight}"
        )));
    }
    serde_json::to_string(dimensions).map_err(ser)
}

fn dimensions_from_json(raw: &str) -> Result<BTreeMap<String, f32>, StorageError> {
    if raw.trim().is_empty() {
        return Ok(BTreeMap::new());
    }
    serde_json::from_str(raw).map_err(ser)
}

//
// ─── ROWS ──────────────────────────────────────────────────────────────────────
//

pub(crate) fn map_user_row(row: &SqliteRow) -> Result<User, StorageError> {
    User::new(
        id_column(row, "id")?,
        row.try_get::<String, _>("name").map_err(ser)?,
        row.try_get("created_at").map_err(ser)?,
    )
    .map_err(ser)
}

pub(crate) fn map_design_row(row: &SqliteRow) -> Result<QuizDesign, StorageError> {
    let subjects_raw: String = row.try_get("subjects").map_err(ser)?;
    QuizDesign::new(
        id_column(row, "id")?,
        id_column(row, "owner_id")?,
        row.try_get::<String, _>("title").map_err(ser)?,
        subjects_from_json(&subjects_raw)?,
        u32_column(row, "min_questions")?,
        u32_column(row, "max_questions")?,
        row.try_get("created_at").map_err(ser)?,
    )
    .map_err(ser)
}

/// Quiz header without questions.
pub(crate) fn map_quiz_row(row: &SqliteRow) -> Result<Quiz, StorageError> {
    Ok(Quiz::new(
        id_column(row, "id")?,
        id_column(row, "owner_id")?,
        row.try_get("created_at").map_err(ser)?,
    ))
}

pub(crate) fn map_question_row(row: &SqliteRow) -> Result<Question, StorageError> {
    let dimensions_raw: String = row.try_get("dimensions").map_err(ser)?;
    Ok(Question::from_persisted(
        id_column(row, "id")?,
        id_column(row, "quiz_id")?,
        id_column(row, "subject")?,
        FormattedText::new(
            row.try_get::<String, _>("prompt").map_err(ser)?,
            row.try_get::<String, _>("prompt_format").map_err(ser)?,
        ),
        FormattedText::new(
            row.try_get::<String, _>("answer").map_err(ser)?,
            row.try_get::<String, _>("answer_format").map_err(ser)?,
        ),
        row.try_get("answer_value").map_err(ser)?,
        dimensions_from_json(&dimensions_raw)?,
        i32_column(row, "points")?,
        row.try_get("created_at").map_err(ser)?,
    ))
}

pub(crate) fn map_answer_row(row: &SqliteRow) -> Result<Answer, StorageError> {
    Ok(Answer {
        id: id_column(row, "id")?,
        question_id: id_column(row, "question_id")?,
        value: row.try_get("value").map_err(ser)?,
        points: i32_column(row, "points")?,
        time_asked: row.try_get("time_asked").map_err(ser)?,
        time_answered: row.try_get("time_answered").map_err(ser)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subjects_json_round_trip() {
        let subjects = vec![
            QuizDesignSubject::new(SubjectId::new("x").unwrap(), 1, 3).unwrap(),
            QuizDesignSubject::new(SubjectId::new("y").unwrap(), 2, 2).unwrap(),
        ];
        let json = subjects_to_json(&subjects).unwrap();
        assert_eq!(subjects_from_json(&json).unwrap(), subjects);
    }

    #[test]
    fn subjects_json_rejects_inverted_ranges() {
        let raw = r#"[{"subject":"x","min_questions":4,"max_questions":1}]"#;
        assert!(matches!(
            subjects_from_json(raw),
            Err(StorageError::Serialization(_))
        ));
    }

    #[test]
    fn blank_dimensions_decode_as_empty() {
        assert!(dimensions_from_json("  ").unwrap().is_empty());
        let parsed = dimensions_from_json(r#"{"carry":0.5}"#).unwrap();
        assert_eq!(parsed.get("carry"), Some(&0.5));
    }

    #[test]
    fn non_finite_dimensions_are_refused() {
        for weight in [f32::NAN, f32::INFINITY, f32::NEG_INFINITY] {
            let dimensions = BTreeMap::from([("w".to_string(), weight)]);
            assert!(matches!(
                dimensions_to_json(&dimensions),
                Err(StorageError::Serialization(_))
            ));
        }
        let finite = BTreeMap::from([("w".to_string(), 1.5_f32)]);
        assert_eq!(dimensions_to_json(&finite).unwrap(), r#"{"w":1.5}"#);
    }
}
