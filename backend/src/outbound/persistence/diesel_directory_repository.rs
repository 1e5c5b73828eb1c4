//! PostgreSQL-backed `DirectoryRepository` implementation using Diesel ORM.
//!
//! Batches run inside one transaction. Link writes become
//! `UPDATE ... WHERE link IS NOT DISTINCT FROM expected`; an update or delete
//! that touches no row aborts the transaction as a conflict.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncConnection as _, AsyncPgConnection, RunQueryDsl};

use crate::domain::ports::{DirectoryRepository, DirectoryRepositoryError};
use crate::domain::{
    DirectoryBatch, DirectoryWrite, Operator, OperatorId, OrbPoint, OrbPointId, Role, Sector,
    User, UserId, UserProfile,
};

use super::error_mapping::{DieselFailure, classify_diesel_error, pool_message};
use super::models::{OperatorRow, OrbPointRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::{operators, orb_points, users};

/// Diesel-backed implementation of the `DirectoryRepository` port.
#[derive(Clone)]
pub struct DieselDirectoryRepository {
    pool: DbPool,
}

impl DieselDirectoryRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> DirectoryRepositoryError {
    DirectoryRepositoryError::connection(pool_message(error))
}

fn map_diesel_error(error: DieselError) -> DirectoryRepositoryError {
    match classify_diesel_error(&error) {
        DieselFailure::Connection => {
            DirectoryRepositoryError::connection("database connection error")
        }
        DieselFailure::UniqueViolation => {
            DirectoryRepositoryError::conflict("a unique directory constraint was violated")
        }
        DieselFailure::Query(message) => DirectoryRepositoryError::query(message),
    }
}

/// Failure raised inside a batch transaction.
#[derive(Debug)]
enum BatchFailure {
    Diesel(DieselError),
    Precondition(String),
    Encode(String),
}

impl From<DieselError> for BatchFailure {
    fn from(error: DieselError) -> Self {
        Self::Diesel(error)
    }
}

fn map_batch_failure(failure: BatchFailure) -> DirectoryRepositoryError {
    match failure {
        BatchFailure::Diesel(error) => map_diesel_error(error),
        BatchFailure::Precondition(message) => DirectoryRepositoryError::conflict(message),
        BatchFailure::Encode(message) => DirectoryRepositoryError::query(message),
    }
}

fn row_to_user(row: UserRow) -> Result<User, DirectoryRepositoryError> {
    let role: Role = row
        .role
        .parse()
        .map_err(|_| DirectoryRepositoryError::invalid_role(row.role.clone()))?;
    let id = UserId::new(row.id)
        .map_err(|err| DirectoryRepositoryError::query(format!("stored user id: {err}")))?;
    Ok(User::new(
        id,
        UserProfile {
            n_doc: row.n_doc,
            firstname: row.firstname,
            lastname: row.lastname,
            email: row.email,
        },
        role,
        row.created_at,
    ))
}

fn user_to_row(user: &User) -> UserRow {
    UserRow {
        id: user.id.as_ref().to_owned(),
        n_doc: user.profile.n_doc.clone(),
        firstname: user.profile.firstname.clone(),
        lastname: user.profile.lastname.clone(),
        email: user.profile.email.clone(),
        role: user.role.as_str().to_owned(),
        created_at: user.created_at,
    }
}

fn row_to_operator(row: OperatorRow) -> Result<Operator, DirectoryRepositoryError> {
    let user_data_id = UserId::new(row.user_data_id)
        .map_err(|err| DirectoryRepositoryError::query(format!("stored user id: {err}")))?;
    Ok(Operator {
        id: OperatorId::from_uuid(row.id),
        orb_point_id: row.orb_point_id.map(OrbPointId::from_uuid),
        user_data_id,
    })
}

fn operator_to_row(operator: &Operator) -> OperatorRow {
    OperatorRow {
        id: *operator.id.as_uuid(),
        orb_point_id: operator.orb_point_id.map(|id| *id.as_uuid()),
        user_data_id: operator.user_data_id.as_ref().to_owned(),
    }
}

fn row_to_orb_point(row: OrbPointRow) -> Result<OrbPoint, DirectoryRepositoryError> {
    let sectors: Vec<Sector> = serde_json::from_value(row.sectors).map_err(|err| {
        DirectoryRepositoryError::query(format!("stored sectors for {}: {err}", row.id))
    })?;
    Ok(OrbPoint {
        id: OrbPointId::from_uuid(row.id),
        name: row.name,
        area_type: row.area_type,
        direction: row.direction,
        region: row.region,
        sectors,
        operator_id: row.operator_id.map(OperatorId::from_uuid),
        created_at: row.created_at,
    })
}

fn orb_point_to_row(point: &OrbPoint) -> Result<OrbPointRow, BatchFailure> {
    let sectors = serde_json::to_value(&point.sectors)
        .map_err(|err| BatchFailure::Encode(format!("encode sectors: {err}")))?;
    Ok(OrbPointRow {
        id: *point.id.as_uuid(),
        name: point.name.clone(),
        area_type: point.area_type.clone(),
        direction: point.direction.clone(),
        region: point.region.clone(),
        sectors,
        operator_id: point.operator_id.map(|id| *id.as_uuid()),
        created_at: point.created_at,
    })
}

fn require_one(affected: usize, what: impl FnOnce() -> String) -> Result<(), BatchFailure> {
    if affected == 1 {
        Ok(())
    } else {
        Err(BatchFailure::Precondition(what()))
    }
}

async fn apply_write(
    conn: &mut AsyncPgConnection,
    write: &DirectoryWrite,
) -> Result<(), BatchFailure> {
    match write {
        DirectoryWrite::InsertUser(user) => {
            diesel::insert_into(users::table)
                .values(&user_to_row(user))
                .execute(conn)
                .await?;
        }
        DirectoryWrite::InsertOperator(operator) => {
            diesel::insert_into(operators::table)
                .values(&operator_to_row(operator))
                .execute(conn)
                .await?;
        }
        DirectoryWrite::InsertOrbPoint(point) => {
            diesel::insert_into(orb_points::table)
                .values(&orb_point_to_row(point)?)
                .execute(conn)
                .await?;
        }
        DirectoryWrite::DeleteUser(id) => {
            let affected = diesel::delete(users::table.filter(users::id.eq(id.as_ref())))
                .execute(conn)
                .await?;
            require_one(affected, || format!("user {id} no longer exists"))?;
        }
        DirectoryWrite::DeleteOperator(id) => {
            let affected = diesel::delete(operators::table.filter(operators::id.eq(id.as_uuid())))
                .execute(conn)
                .await?;
            require_one(affected, || format!("operator {id} no longer exists"))?;
        }
        DirectoryWrite::DeleteOrbPoint(id) => {
            let affected =
                diesel::delete(orb_points::table.filter(orb_points::id.eq(id.as_uuid())))
                    .execute(conn)
                    .await?;
            require_one(affected, || format!("OrbPoint {id} no longer exists"))?;
        }
        DirectoryWrite::SetOperatorLink {
            operator_id,
            expected,
            value,
        } => {
            let expected = expected.map(|id| *id.as_uuid());
            let affected = diesel::update(
                operators::table
                    .filter(operators::id.eq(operator_id.as_uuid()))
                    .filter(operators::orb_point_id.is_not_distinct_from(expected)),
            )
            .set(operators::orb_point_id.eq(value.map(|id| *id.as_uuid())))
            .execute(conn)
            .await?;
            require_one(affected, || {
                format!("operator {operator_id} link changed concurrently")
            })?;
        }
        DirectoryWrite::SetOrbPointLink {
            orb_point_id,
            expected,
            value,
        } => {
            let expected = expected.map(|id| *id.as_uuid());
            let affected = diesel::update(
                orb_points::table
                    .filter(orb_points::id.eq(orb_point_id.as_uuid()))
                    .filter(orb_points::operator_id.is_not_distinct_from(expected)),
            )
            .set(orb_points::operator_id.eq(value.map(|id| *id.as_uuid())))
            .execute(conn)
            .await?;
            require_one(affected, || {
                format!("OrbPoint {orb_point_id} link changed concurrently")
            })?;
        }
    }
    Ok(())
}

#[async_trait]
impl DirectoryRepository for DieselDirectoryRepository {
    async fn find_user(&self, id: &UserId) -> Result<Option<User>, DirectoryRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<UserRow> = users::table
            .filter(users::id.eq(id.as_ref()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_user).transpose()
    }

    async fn list_users(&self, role: Option<Role>) -> Result<Vec<User>, DirectoryRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut query = users::table
            .select(UserRow::as_select())
            .order(users::created_at.asc())
            .into_boxed();
        if let Some(role) = role {
            query = query.filter(users::role.eq(role.as_str()));
        }
        let rows: Vec<UserRow> = query.load(&mut conn).await.map_err(map_diesel_error)?;
        rows.into_iter().map(row_to_user).collect()
    }

    async fn find_operator(
        &self,
        id: OperatorId,
    ) -> Result<Option<Operator>, DirectoryRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<OperatorRow> = operators::table
            .filter(operators::id.eq(id.as_uuid()))
            .select(OperatorRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_operator).transpose()
    }

    async fn find_operator_by_user(
        &self,
        user_id: &UserId,
    ) -> Result<Option<Operator>, DirectoryRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<OperatorRow> = operators::table
            .filter(operators::user_data_id.eq(user_id.as_ref()))
            .select(OperatorRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_operator).transpose()
    }

    async fn list_operators(&self) -> Result<Vec<Operator>, DirectoryRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<OperatorRow> = operators::table
            .select(OperatorRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(row_to_operator).collect()
    }

    async fn find_orb_point(
        &self,
        id: OrbPointId,
    ) -> Result<Option<OrbPoint>, DirectoryRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<OrbPointRow> = orb_points::table
            .filter(orb_points::id.eq(id.as_uuid()))
            .select(OrbPointRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_orb_point).transpose()
    }

    async fn list_orb_points(&self) -> Result<Vec<OrbPoint>, DirectoryRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<OrbPointRow> = orb_points::table
            .select(OrbPointRow::as_select())
            .order(orb_points::created_at.asc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(row_to_orb_point).collect()
    }

    async fn find_orb_point_by_operator(
        &self,
        operator_id: OperatorId,
    ) -> Result<Option<OrbPoint>, DirectoryRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<OrbPointRow> = orb_points::table
            .filter(orb_points::operator_id.eq(operator_id.as_uuid()))
            .select(OrbPointRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_orb_point).transpose()
    }

    async fn commit(&self, batch: &DirectoryBatch) -> Result<(), DirectoryRepositoryError> {
        if batch.is_empty() {
            return Ok(());
        }
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let outcome: Result<(), BatchFailure> = conn
            .transaction(|conn| {
                async move {
                    for write in batch.writes() {
                        apply_write(conn, write).await?;
                    }
                    Ok::<(), BatchFailure>(())
                }
                .scope_boxed()
            })
            .await;
        outcome.map_err(map_batch_failure)
    }
}
