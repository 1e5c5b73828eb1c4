//! In-memory `SurveyResponseRepository`.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::ports::{SurveyResponseRepository, SurveyResponseRepositoryError};
use crate::domain::{OrbPointId, SurveyResponse, SurveyResponseId};

/// Append-only response log kept in process memory.
#[derive(Debug, Default)]
pub struct MemorySurveyResponseRepository {
    responses: Mutex<Vec<SurveyResponse>>,
}

impl MemorySurveyResponseRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<SurveyResponse>>, SurveyResponseRepositoryError> {
        self.responses
            .lock()
            .map_err(|_| SurveyResponseRepositoryError::query("survey response lock poisoned"))
    }
}

#[async_trait]
impl SurveyResponseRepository for MemorySurveyResponseRepository {
    async fn insert(&self, response: &SurveyResponse) -> Result<(), SurveyResponseRepositoryError> {
        let mut responses = self.lock()?;
        if responses.iter().any(|existing| existing.id == response.id) {
            return Err(SurveyResponseRepositoryError::query(format!(
                "survey response {} already recorded",
                response.id
            )));
        }
        responses.push(response.clone());
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: SurveyResponseId,
    ) -> Result<Option<SurveyResponse>, SurveyResponseRepositoryError> {
        Ok(self.lock()?.iter().find(|response| response.id == id).cloned())
    }

    async fn list_for_orb_point(
        &self,
        orb_point_id: OrbPointId,
    ) -> Result<Vec<SurveyResponse>, SurveyResponseRepositoryError> {
        let mut matching: Vec<SurveyResponse> = self
            .lock()?
            .iter()
            .filter(|response| response.orb_point_id == orb_point_id)
            .cloned()
            .collect();
        matching.sort_by_key(|response| response.timestamp);
        Ok(matching)
    }
}
