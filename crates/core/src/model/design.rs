use chrono::{DateTime, Utc};
use std::collections::HashSet;
use thiserror::Error;

use crate::model::ids::{DesignId, SubjectId, UserId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Structural problems with a quiz design.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DesignError {
    #[error("design title cannot be empty")]
    EmptyTitle,

    #[error("design has no subjects")]
    NoSubjects,

    #[error("subject {0} appears more than once")]
    DuplicateSubject(SubjectId),

    #[error("subject {subject} has min {min} > max {max}")]
    InvertedSubjectRange { subject: SubjectId, min: u32, max: u32 },

    #[error("design minimum question count must be > 0")]
    NonPositiveMinimum,

    #[error("design has min {min} > max {max}")]
    InvertedRange { min: u32, max: u32 },

    #[error("subject minimums add up to {required}, above the design maximum {max}")]
    MinimumsExceedMaximum { required: u64, max: u32 },
}

//
// ─── SUBJECT ENTRY ─────────────────────────────────────────────────────────────
//

/// A subject together with the number of questions it may contribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizDesignSubject {
    subject: SubjectId,
    min_questions: u32,
    max_questions: u32,
}

impl QuizDesignSubject {
    /// Creates a subject entry.
    ///
    /// # Errors
    ///
    /// Returns `DesignError::InvertedSubjectRange` if `min_questions > max_questions`.
    pub fn new(
        subject: SubjectId,
        min_questions: u32,
        max_questions: u32,
    ) -> Result<Self, DesignError> {
        if min_questions > max_questions {
            return Err(DesignError::InvertedSubjectRange {
                subject,
                min: min_questions,
                max: max_questions,
            });
        }
        Ok(Self {
            subject,
            min_questions,
            max_questions,
        })
    }

    #[must_use]
    pub fn subject(&self) -> &SubjectId {
        &self.subject
    }

    #[must_use]
    pub fn min_questions(&self) -> u32 {
        self.min_questions
    }

    #[must_use]
    pub fn max_questions(&self) -> u32 {
        self.max_questions
    }

    /// Number of optional questions above the minimum.
    #[must_use]
    pub fn optional_slots(&self) -> u32 {
        self.max_questions - self.min_questions
    }
}

//
// ─── DESIGN ────────────────────────────────────────────────────────────────────
//

/// Reusable template that quizzes are generated from.
///
/// Construction guarantees unique subjects with well-formed ranges. The
/// question-count bounds and the non-empty subject set are checked by
/// [`QuizDesign::validate`], which both the design service and the allocation
/// engine run, so designs loaded from older storage are still rejected before
/// a quiz is built from them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizDesign {
    id: DesignId,
    owner_id: UserId,
    title: String,
    subjects: Vec<QuizDesignSubject>,
    min_questions: u32,
    max_questions: u32,
    created_at: DateTime<Utc>,
}

impl QuizDesign {
    /// Creates a design.
    ///
    /// # Errors
    ///
    /// Returns `DesignError::EmptyTitle` for a blank title and
    /// `DesignError::DuplicateSubject` if a subject appears twice.
    pub fn new(
        id: DesignId,
        owner_id: UserId,
        title: impl Into<String>,
        subjects: Vec<QuizDesignSubject>,
        min_questions: u32,
        max_questions: u32,
        created_at: DateTime<Utc>,
    ) -> Result<Self, DesignError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(DesignError::EmptyTitle);
        }

        let mut seen = HashSet::with_capacity(subjects.len());
        for entry in &subjects {
            if !seen.insert(entry.subject()) {
                return Err(DesignError::DuplicateSubject(entry.subject().clone()));
            }
        }

        Ok(Self {
            id,
            owner_id,
            title,
            subjects,
            min_questions,
            max_questions,
            created_at,
        })
    }

    /// Checks the preconditions for generating a quiz from this design.
    ///
    /// # Errors
    ///
    /// - `NonPositiveMinimum` when `min_questions == 0`
    /// - `InvertedRange` when `min_questions > max_questions`
    /// - `NoSubjects` when the subject set is empty
    /// - `MinimumsExceedMaximum` when a multi-subject design can never fit its
    ///   subject minimums under the design maximum
    pub fn validate(&self) -> Result<(), DesignError> {
        if self.min_questions == 0 {
            return Err(DesignError::NonPositiveMinimum);
        }
        if self.min_questions > self.max_questions {
            return Err(DesignError::InvertedRange {
                min: self.min_questions,
                max: self.max_questions,
            });
        }
        if self.subjects.is_empty() {
            return Err(DesignError::NoSubjects);
        }
        if self.subjects.len() > 1 {
            let required = self.subject_minimum_total();
            if required > u64::from(self.max_questions) {
                return Err(DesignError::MinimumsExceedMaximum {
                    required,
                    max: self.max_questions,
                });
            }
        }
        Ok(())
    }

    /// Sum of every subject's minimum question count.
    #[must_use]
    pub fn subject_minimum_total(&self) -> u64 {
        self.subjects
            .iter()
            .map(|s| u64::from(s.min_questions()))
            .sum()
    }

    #[must_use]
    pub fn id(&self) -> DesignId {
        self.id
    }

    #[must_use]
    pub fn owner_id(&self) -> UserId {
        self.owner_id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn subjects(&self) -> &[QuizDesignSubject] {
        &self.subjects
    }

    #[must_use]
    pub fn min_questions(&self) -> u32 {
        self.min_questions
    }

    #[must_use]
    pub fn max_questions(&self) -> u32 {
        self.max_questions
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
