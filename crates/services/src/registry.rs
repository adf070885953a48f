use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::{Arc, PoisonError, RwLock};

use quiz_core::model::SubjectId;

use crate::error::RegistryError;
use crate::generator::QuestionGenerator;

/// Maps subjects to their generators.
///
/// Lookups and (de)registration may run concurrently from any thread. Holders
/// of a looked-up generator keep it alive after it is unregistered.
#[derive(Default)]
pub struct GeneratorRegistry {
    generators: RwLock<HashMap<SubjectId, Arc<dyn QuestionGenerator>>>,
}

impl GeneratorRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `generator` under its own subject.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::DuplicateSubject` if the subject already has a
    /// generator; the existing registration is left in place.
    pub fn register(&self, generator: Arc<dyn QuestionGenerator>) -> Result<(), RegistryError> {
        let subject = generator.subject().clone();
        let mut generators = self
            .generators
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        match generators.entry(subject) {
            Entry::Occupied(entry) => {
                tracing::warn!(subject = %entry.key(), "generator already registered");
                Err(RegistryError::DuplicateSubject(entry.key().clone()))
            }
            Entry::Vacant(entry) => {
                tracing::info!(subject = %entry.key(), "registered generator");
                entry.insert(generator);
                Ok(())
            }
        }
    }

    /// Remove and return the generator for `subject`, if any.
    pub fn unregister(&self, subject: &SubjectId) -> Option<Arc<dyn QuestionGenerator>> {
        let removed = self
            .generators
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(subject);
        if removed.is_some() {
            tracing::info!(subject = %subject, "unregistered generator");
        }
        removed
    }

    #[must_use]
    pub fn lookup(&self, subject: &SubjectId) -> Option<Arc<dyn QuestionGenerator>> {
        self.generators
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(subject)
            .cloned()
    }

    /// Registered subjects in sorted order.
    #[must_use]
    pub fn subjects(&self) -> Vec<SubjectId> {
        let mut subjects: Vec<SubjectId> = self
            .generators
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        subjects.sort();
        subjects
    }
}
