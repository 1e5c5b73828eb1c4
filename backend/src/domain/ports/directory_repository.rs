//! Port for the user/operator/OrbPoint directory store.
//!
//! Reads are single-record or full-collection lookups. All mutations go
//! through [`DirectoryRepository::commit`], which applies a
//! [`DirectoryBatch`] atomically and checks each link precondition against
//! the stored value at commit time.

use async_trait::async_trait;

use crate::domain::{
    DirectoryBatch, Operator, OperatorId, OrbPoint, OrbPointId, Role, User, UserId,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by directory store adapters.
    pub enum DirectoryRepositoryError {
        /// Store connection could not be established.
        Connection { message: String } =>
            "directory store connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "directory store query failed: {message}",
        /// A batch precondition did not hold; nothing was written.
        Conflict { message: String } =>
            "directory batch rejected: {message}",
        /// A stored user carries a role outside the known set.
        InvalidRole { value: String } =>
            "stored role is not recognised: {value}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DirectoryRepository: Send + Sync {
    async fn find_user(&self, id: &UserId) -> Result<Option<User>, DirectoryRepositoryError>;

    /// Users holding `role`, or every user when `role` is `None`.
    async fn list_users(&self, role: Option<Role>) -> Result<Vec<User>, DirectoryRepositoryError>;

    async fn find_operator(
        &self,
        id: OperatorId,
    ) -> Result<Option<Operator>, DirectoryRepositoryError>;

    /// Operator record whose `user_data_id` is `user_id`.
    async fn find_operator_by_user(
        &self,
        user_id: &UserId,
    ) -> Result<Option<Operator>, DirectoryRepositoryError>;

    async fn list_operators(&self) -> Result<Vec<Operator>, DirectoryRepositoryError>;

    async fn find_orb_point(
        &self,
        id: OrbPointId,
    ) -> Result<Option<OrbPoint>, DirectoryRepositoryError>;

    /// Every OrbPoint, ordered by creation time.
    async fn list_orb_points(&self) -> Result<Vec<OrbPoint>, DirectoryRepositoryError>;

    /// OrbPoint whose supervisor slot names `operator_id`, whatever the
    /// operator's own link says.
    async fn find_orb_point_by_operator(
        &self,
        operator_id: OperatorId,
    ) -> Result<Option<OrbPoint>, DirectoryRepositoryError>;

    /// Apply every write in `batch`, or none of them.
    ///
    /// Returns [`DirectoryRepositoryError::Conflict`] when a link's stored
    /// value differs from its `expected` value or a deleted record is absent.
    async fn commit(&self, batch: &DirectoryBatch) -> Result<(), DirectoryRepositoryError>;
}
