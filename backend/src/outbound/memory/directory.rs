//! In-memory `DirectoryRepository` with all-or-nothing batches.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::ports::{DirectoryRepository, DirectoryRepositoryError};
use crate::domain::{
    DirectoryBatch, DirectoryWrite, Operator, OperatorId, OrbPoint, OrbPointId, Role, User, UserId,
};

#[derive(Debug, Clone, Default)]
struct DirectoryState {
    users: HashMap<UserId, User>,
    operators: HashMap<OperatorId, Operator>,
    orb_points: HashMap<OrbPointId, OrbPoint>,
}

impl DirectoryState {
    fn apply(&mut self, write: &DirectoryWrite) -> Result<(), String> {
        match write {
            DirectoryWrite::InsertUser(user) => {
                let email_taken = self
                    .users
                    .values()
                    .any(|existing| existing.profile.email == user.profile.email);
                if email_taken || self.users.contains_key(&user.id) {
                    return Err(format!("user {} already exists", user.id));
                }
                self.users.insert(user.id.clone(), user.clone());
            }
            DirectoryWrite::InsertOperator(operator) => {
                let user_taken = self
                    .operators
                    .values()
                    .any(|existing| existing.user_data_id == operator.user_data_id);
                if user_taken || self.operators.contains_key(&operator.id) {
                    return Err(format!("operator {} already exists", operator.id));
                }
                self.operators.insert(operator.id, operator.clone());
            }
            DirectoryWrite::InsertOrbPoint(point) => {
                if self.orb_points.contains_key(&point.id) {
                    return Err(format!("OrbPoint {} already exists", point.id));
                }
                self.orb_points.insert(point.id, point.clone());
            }
            DirectoryWrite::DeleteUser(id) => {
                self.users
                    .remove(id)
                    .ok_or_else(|| format!("user {id} no longer exists"))?;
            }
            DirectoryWrite::DeleteOperator(id) => {
                self.operators
                    .remove(id)
                    .ok_or_else(|| format!("operator {id} no longer exists"))?;
            }
            DirectoryWrite::DeleteOrbPoint(id) => {
                self.orb_points
                    .remove(id)
                    .ok_or_else(|| format!("OrbPoint {id} no longer exists"))?;
            }
            DirectoryWrite::SetOperatorLink {
                operator_id,
                expected,
                value,
            } => {
                let operator = self
                    .operators
                    .get_mut(operator_id)
                    .filter(|operator| operator.orb_point_id == *expected)
                    .ok_or_else(|| format!("operator {operator_id} link changed concurrently"))?;
                operator.orb_point_id = *value;
            }
            DirectoryWrite::SetOrbPointLink {
                orb_point_id,
                expected,
                value,
            } => {
                if let Some(target) = value {
                    let taken = self
                        .orb_points
                        .values()
                        .any(|other| other.id != *orb_point_id && other.operator_id == Some(*target));
                    if taken {
                        return Err(format!("operator {target} is linked to another OrbPoint"));
                    }
                }
                let point = self
                    .orb_points
                    .get_mut(orb_point_id)
                    .filter(|point| point.operator_id == *expected)
                    .ok_or_else(|| format!("OrbPoint {orb_point_id} link changed concurrently"))?;
                point.operator_id = *value;
            }
        }
        Ok(())
    }
}

/// Directory held in process memory; used when no database is configured
/// and by black-box tests.
#[derive(Debug, Default)]
pub struct MemoryDirectoryRepository {
    state: Mutex<DirectoryState>,
}

impl MemoryDirectoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, DirectoryState>, DirectoryRepositoryError> {
        self.state
            .lock()
            .map_err(|_| DirectoryRepositoryError::query("directory state lock poisoned"))
    }
}

#[async_trait]
impl DirectoryRepository for MemoryDirectoryRepository {
    async fn find_user(&self, id: &UserId) -> Result<Option<User>, DirectoryRepositoryError> {
        Ok(self.lock()?.users.get(id).cloned())
    }

    async fn list_users(&self, role: Option<Role>) -> Result<Vec<User>, DirectoryRepositoryError> {
        let mut users: Vec<User> = self
            .lock()?
            .users
            .values()
            .filter(|user| role.is_none_or(|role| user.role == role))
            .cloned()
            .collect();
        users.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(users)
    }

    async fn find_operator(
        &self,
        id: OperatorId,
    ) -> Result<Option<Operator>, DirectoryRepositoryError> {
        Ok(self.lock()?.operators.get(&id).cloned())
    }

    async fn find_operator_by_user(
        &self,
        user_id: &UserId,
    ) -> Result<Option<Operator>, DirectoryRepositoryError> {
        Ok(self
            .lock()?
            .operators
            .values()
            .find(|operator| &operator.user_data_id == user_id)
            .cloned())
    }

    async fn list_operators(&self) -> Result<Vec<Operator>, DirectoryRepositoryError> {
        let mut operators: Vec<Operator> = self.lock()?.operators.values().cloned().collect();
        operators.sort_by_key(|operator| operator.id);
        Ok(operators)
    }

    async fn find_orb_point(
        &self,
        id: OrbPointId,
    ) -> Result<Option<OrbPoint>, DirectoryRepositoryError> {
        Ok(self.lock()?.orb_points.get(&id).cloned())
    }

    async fn list_orb_points(&self) -> Result<Vec<OrbPoint>, DirectoryRepositoryError> {
        let mut points: Vec<OrbPoint> = self.lock()?.orb_points.values().cloned().collect();
        points.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(points)
    }

    async fn find_orb_point_by_operator(
        &self,
        operator_id: OperatorId,
    ) -> Result<Option<OrbPoint>, DirectoryRepositoryError> {
        Ok(self
            .lock()?
            .orb_points
            .values()
            .find(|point| point.operator_id == Some(operator_id))
            .cloned())
    }

    async fn commit(&self, batch: &DirectoryBatch) -> Result<(), DirectoryRepositoryError> {
        let mut state = self.lock()?;
        let mut staged = state.clone();
        for write in batch.writes() {
            staged.apply(write).map_err(DirectoryRepositoryError::conflict)?;
        }
        *state = staged;
        Ok(())
    }
}
