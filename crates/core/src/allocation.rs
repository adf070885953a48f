use std::sync::Arc;

use crate::model::{DesignError, QuizDesign, SubjectId};
use crate::random::RandomSource;

//
// ─── RESULT ────────────────────────────────────────────────────────────────────
//

/// Number of questions assigned to one subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectAllocation {
    pub subject: SubjectId,
    pub count: u32,
}

/// Outcome of one allocation run.
///
/// `subjects` follows the design's subject order. The allocated counts add up
/// to at most `total`; they fall short only when every subject is already at
/// its maximum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allocation {
    total: u32,
    subjects: Vec<SubjectAllocation>,
}

impl Allocation {
    /// The question count drawn for this run.
    #[must_use]
    pub fn total(&self) -> u32 {
        self.total
    }

    #[must_use]
    pub fn subjects(&self) -> &[SubjectAllocation] {
        &self.subjects
    }

    /// Sum of all per-subject counts.
    #[must_use]
    pub fn allocated(&self) -> u32 {
        self.subjects.iter().map(|s| s.count).sum()
    }

    /// How far the allocated counts fall below `total`.
    #[must_use]
    pub fn shortfall(&self) -> u32 {
        self.total.saturating_sub(self.allocated())
    }

    #[must_use]
    pub fn count_for(&self, subject: &SubjectId) -> Option<u32> {
        self.subjects
            .iter()
            .find(|s| &s.subject == subject)
            .map(|s| s.count)
    }
}

//
// ─── ENGINE ────────────────────────────────────────────────────────────────────
//

/// Picks a quiz length and splits it across a design's subjects.
///
/// Every subject starts at its minimum. The remaining questions are handed out
/// one at a time by drawing, without replacement, from the pool of optional
/// slots (`max - min` per subject), so each free slot is equally likely to be
/// filled next. A design with a single subject takes the whole total and its
/// own bounds are not applied.
///
/// For multi-subject designs the total is drawn from
/// `[max(design.min, sum of subject minimums), design.max]`. When the subject
/// minimums add up to more than `design.min`, totals below that sum are never
/// produced, so the draw is not uniform over `[design.min, design.max]`.
#[derive(Clone)]
pub struct AllocationEngine {
    random: Arc<dyn RandomSource>,
}

impl AllocationEngine {
    #[must_use]
    pub fn new(random: Arc<dyn RandomSource>) -> Self {
        Self { random }
    }

    /// Computes the question total and per-subject counts for `design`.
    ///
    /// # Errors
    ///
    /// Returns the `DesignError` from [`QuizDesign::validate`] if the design
    /// cannot produce a quiz.
    pub fn allocate(&self, design: &QuizDesign) -> Result<Allocation, DesignError> {
        design.validate()?;

        let subjects = design.subjects();
        if let [only] = subjects {
            let total = self.draw_total(design.min_questions(), design.max_questions());
            return Ok(Allocation {
                total,
                subjects: vec![SubjectAllocation {
                    subject: only.subject().clone(),
                    count: total,
                }],
            });
        }

        // validate() guarantees the minimums fit under the design maximum.
        let required = u32::try_from(design.subject_minimum_total()).unwrap_or(u32::MAX);
        let total = self.draw_total(
            design.min_questions().max(required),
            design.max_questions(),
        );

        let mut counts: Vec<u32> = subjects.iter().map(|s| s.min_questions()).collect();
        let mut free_slots: Vec<u64> = subjects
            .iter()
            .map(|s| u64::from(s.optional_slots()))
            .collect();
        let mut pool: u64 = free_slots.iter().sum();
        let mut tally = u64::from(required);

        while pool > 0 && tally < u64::from(total) {
            let mut pick = self.random.uniform_int(0, pool - 1);
            for (count, slots) in counts.iter_mut().zip(free_slots.iter_mut()) {
                if pick < *slots {
                    *slots -= 1;
                    *count += 1;
                    break;
                }
                pick -= *slots;
            }
            pool -= 1;
            tally += 1;
        }

        let allocation = Allocation {
            total,
            subjects: subjects
                .iter()
                .zip(counts)
                .map(|(s, count)| SubjectAllocation {
                    subject: s.subject().clone(),
                    count,
                })
                .collect(),
        };

        tracing::debug!(
            design = %design.id(),
            total = allocation.total(),
            allocated = allocation.allocated(),
            "allocated questions across subjects"
        );

        Ok(allocation)
    }

    fn draw_total(&self, low: u32, high: u32) -> u32 {
        if low == high {
            return low;
        }
        let drawn = self.random.uniform_int(u64::from(low), u64::from(high));
        u32::try_from(drawn).unwrap_or(high)
    }
}
