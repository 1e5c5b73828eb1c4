//! Integration tests for `DieselDirectoryRepository` against embedded PostgreSQL.
//!
//! Covers what the in-memory adapter cannot: batches running inside one
//! Diesel transaction, `IS NOT DISTINCT FROM` link preconditions and unique
//! index violations surfacing as `Conflict`.
//!
//! Tests are synchronous and drive the async repository through a Tokio
//! runtime owned by the test context.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use orbsurvey::domain::ports::{AssignmentCommand, DirectoryRepository, DirectoryRepositoryError};
use orbsurvey::domain::{
    AssignmentService, AssignmentSettings, DirectoryBatch, DirectoryWrite, Operator, OperatorId,
    OrbPoint, OrbPointDraft, OrbPointId, Role, Sector, User, UserId, UserProfile,
};
use orbsurvey::outbound::memory::MemoryIdentityProvider;
use orbsurvey::outbound::persistence::{DbPool, DieselDirectoryRepository, PoolConfig};
use pg_embedded_setup_unpriv::TemporaryDatabase;
use rstest::{fixture, rstest};
use tokio::runtime::Runtime;

#[path = "support/embedded_postgres.rs"]
mod embedded_postgres;

use embedded_postgres::{handle_cluster_setup_failure, provision_template_database, shared_cluster};

struct TestContext {
    runtime: Runtime,
    repository: Arc<DieselDirectoryRepository>,
    _database: TemporaryDatabase,
}

impl TestContext {
    fn commit(&self, batch: &DirectoryBatch) -> Result<(), DirectoryRepositoryError> {
        self.runtime.block_on(self.repository.commit(batch))
    }

    fn operator(&self, id: OperatorId) -> Operator {
        self.runtime
            .block_on(self.repository.find_operator(id))
            .expect("operator lookup")
            .expect("operator stored")
    }

    fn orb_point(&self, id: OrbPointId) -> OrbPoint {
        self.runtime
            .block_on(self.repository.find_orb_point(id))
            .expect("OrbPoint lookup")
            .expect("OrbPoint stored")
    }

    /// Store a user with an unbound operator record.
    fn staff(&self, name: &str, role: Role) -> Operator {
        let user = user(name, role);
        let operator = Operator::unbound(user.id.clone());
        let batch: DirectoryBatch = [
            DirectoryWrite::InsertUser(user),
            DirectoryWrite::InsertOperator(operator.clone()),
        ]
        .into_iter()
        .collect();
        self.commit(&batch).expect("insert staff");
        operator
    }

    fn new_orb_point(&self, name: &str) -> OrbPointId {
        let point = orb_point(name);
        let mut batch = DirectoryBatch::default();
        batch.push(DirectoryWrite::InsertOrbPoint(point.clone()));
        self.commit(&batch).expect("insert OrbPoint");
        point.id
    }

    fn assignments(
        &self,
        settings: AssignmentSettings,
    ) -> AssignmentService<DieselDirectoryRepository, MemoryIdentityProvider> {
        AssignmentService::new(
            self.repository.clone(),
            Arc::new(MemoryIdentityProvider::new()),
            settings,
        )
    }
}

fn user(name: &str, role: Role) -> User {
    let profile = UserProfile::try_from_parts("1234", name, "Ruiz", &format!("{name}@orb.test"))
        .expect("valid profile");
    let created_at = Utc
        .with_ymd_and_hms(2024, 5, 1, 9, 0, 0)
        .single()
        .expect("valid instant");
    User::new(UserId::new(name).expect("valid id"), profile, role, created_at)
}

fn orb_point(name: &str) -> OrbPoint {
    OrbPointDraft::try_new(
        name,
        "mall",
        "Av. Larco 123",
        "Lima",
        vec![Sector {
            sector_name: "Food court".to_owned(),
            sector_type: "zone".to_owned(),
        }],
    )
    .expect("valid draft")
    .into_orb_point(OrbPointId::random(), Utc::now())
}

fn setup_test_context() -> Result<TestContext, String> {
    let runtime = Runtime::new().map_err(|err| err.to_string())?;
    let cluster = shared_cluster()?;
    let database = provision_template_database(cluster)?;
    let config = PoolConfig::new(database.url().to_string())
        .with_max_size(2)
        .with_min_idle(Some(1));
    let pool = runtime
        .block_on(DbPool::new(config))
        .map_err(|err| err.to_string())?;
    Ok(TestContext {
        runtime,
        repository: Arc::new(DieselDirectoryRepository::new(pool)),
        _database: database,
    })
}

#[fixture]
fn directory_db() -> Option<TestContext> {
    match setup_test_context() {
        Ok(context) => Some(context),
        Err(reason) => handle_cluster_setup_failure(reason),
    }
}

#[rstest]
fn stale_link_rolls_back_the_whole_batch(directory_db: Option<TestContext>) {
    let Some(db) = directory_db else {
        return;
    };
    let operator = db.staff("ana", Role::Operator);
    let point = db.new_orb_point("Plaza");
    let extra = orb_point("Annex");

    let mut batch = DirectoryBatch::default();
    batch.push(DirectoryWrite::InsertOrbPoint(extra.clone()));
    batch.link_operator(operator.id, None, Some(point));
    batch.link_orb_point(point, Some(OperatorId::random()), Some(operator.id));
    let error = db.commit(&batch).expect_err("stale expectation");

    assert!(matches!(error, DirectoryRepositoryError::Conflict { .. }));
    assert_eq!(db.operator(operator.id).orb_point_id, None);
    let annex = db
        .runtime
        .block_on(db.repository.find_orb_point(extra.id))
        .expect("lookup");
    assert!(annex.is_none(), "insert from the failed batch was kept");
}

#[rstest]
fn null_expectation_matches_an_empty_link(directory_db: Option<TestContext>) {
    let Some(db) = directory_db else {
        return;
    };
    let operator = db.staff("ana", Role::Operator);
    let point = db.new_orb_point("Plaza");

    let mut batch = DirectoryBatch::default();
    batch.link_operator(operator.id, None, Some(point));
    batch.link_orb_point(point, None, Some(operator.id));
    db.commit(&batch).expect("links written");

    assert_eq!(db.operator(operator.id).orb_point_id, Some(point));
    assert_eq!(db.orb_point(point).operator_id, Some(operator.id));
}

#[rstest]
fn second_supervisor_slot_is_a_conflict(directory_db: Option<TestContext>) {
    let Some(db) = directory_db else {
        return;
    };
    let operator = db.staff("ana", Role::Operator);
    let first = db.new_orb_point("First");
    let second = db.new_orb_point("Second");
    let mut bind = DirectoryBatch::default();
    bind.link_orb_point(first, None, Some(operator.id));
    db.commit(&bind).expect("first slot");

    let mut steal = DirectoryBatch::default();
    steal.link_orb_point(second, None, Some(operator.id));
    let error = db.commit(&steal).expect_err("unique slot");

    assert!(matches!(error, DirectoryRepositoryError::Conflict { .. }));
    assert_eq!(db.orb_point(second).operator_id, None);
}

#[rstest]
fn duplicate_email_is_a_conflict(directory_db: Option<TestContext>) {
    let Some(db) = directory_db else {
        return;
    };
    db.staff("ana", Role::Operator);
    let mut twin = user("ana-2", Role::Promoter);
    twin.profile = user("ana", Role::Promoter).profile;

    let mut batch = DirectoryBatch::default();
    batch.push(DirectoryWrite::InsertUser(twin));
    let error = db.commit(&batch).expect_err("email taken");

    assert!(matches!(error, DirectoryRepositoryError::Conflict { .. }));
}

#[rstest]
fn one_sided_unassign_then_reassign_and_delete(directory_db: Option<TestContext>) {
    let Some(db) = directory_db else {
        return;
    };
    let operator = db.staff("ana", Role::Operator);
    let first = db.new_orb_point("First");
    let second = db.new_orb_point("Second");
    let service = db.assignments(AssignmentSettings {
        clear_reverse_link: false,
        ..AssignmentSettings::default()
    });

    db.runtime
        .block_on(service.assign(operator.id, first))
        .expect("assign");
    db.runtime
        .block_on(service.unassign(operator.id))
        .expect("unassign");
    assert_eq!(db.orb_point(first).operator_id, Some(operator.id));

    let outcome = db
        .runtime
        .block_on(service.assign(operator.id, second))
        .expect("assign elsewhere");
    assert_eq!(outcome.released_orb_point, Some(first));
    assert_eq!(db.orb_point(first).operator_id, None);

    db.runtime
        .block_on(service.unassign(operator.id))
        .expect("unassign again");
    db.runtime
        .block_on(service.delete_operator(operator.id))
        .expect("delete");
    assert_eq!(db.orb_point(second).operator_id, None);
    let gone = db
        .runtime
        .block_on(db.repository.find_operator(operator.id))
        .expect("lookup");
    assert!(gone.is_none());
}

#[rstest]
fn promoter_team_shares_an_orb_point(directory_db: Option<TestContext>) {
    let Some(db) = directory_db else {
        return;
    };
    let supervisor = db.staff("ana", Role::Operator);
    let pia = db.staff("pia", Role::Promoter);
    let leo = db.staff("leo", Role::Promoter);
    let point = db.new_orb_point("Plaza");
    let service = db.assignments(AssignmentSettings::default());

    db.runtime
        .block_on(service.assign(supervisor.id, point))
        .expect("supervisor");
    let outcomes = db
        .runtime
        .block_on(service.assign_promoters(point, vec![pia.id, leo.id]))
        .expect("team");

    assert_eq!(outcomes.len(), 2);
    assert_eq!(db.orb_point(point).operator_id, Some(supervisor.id));
    for id in [supervisor.id, pia.id, leo.id] {
        assert_eq!(db.operator(id).orb_point_id, Some(point));
    }
    let held = db
        .runtime
        .block_on(db.repository.find_orb_point_by_operator(pia.id))
        .expect("lookup");
    assert!(held.is_none());
}
