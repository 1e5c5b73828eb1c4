//! Tests for the assignment service.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::*;
use crate::domain::ports::{MockDirectoryRepository, MockIdentityProvider};
use crate::domain::{ErrorCode, User, UserId, fixtures};
use rstest::rstest;

/// Records visible to the mocked repository.
#[derive(Default, Clone)]
struct Snapshot {
    users: Vec<User>,
    operators: HashMap<OperatorId, Operator>,
    orb_points: HashMap<OrbPointId, OrbPoint>,
}

impl Snapshot {
    fn with_operator(mut self, operator: Operator) -> Self {
        self.operators.insert(operator.id, operator);
        self
    }

    fn with_orb_point(mut self, point: OrbPoint) -> Self {
        self.orb_points.insert(point.id, point);
        self
    }

    fn with_user(mut self, user: User) -> Self {
        self.users.push(user);
        self
    }
}

/// Mock backed by `snapshot` whose commits are captured in `committed`.
fn repository(
    snapshot: Snapshot,
    committed: Arc<Mutex<Vec<DirectoryBatch>>>,
    mut outcomes: Vec<Result<(), DirectoryRepositoryError>>,
) -> MockDirectoryRepository {
    let mut repo = MockDirectoryRepository::new();
    let operators = snapshot.operators.clone();
    repo.expect_find_operator()
        .returning(move |id| Ok(operators.get(&id).cloned()));
    let points = snapshot.orb_points.clone();
    repo.expect_find_orb_point()
        .returning(move |id| Ok(points.get(&id).cloned()));
    let points: Vec<OrbPoint> = snapshot.orb_points.values().cloned().collect();
    repo.expect_find_orb_point_by_operator().returning(move |id| {
        Ok(points
            .iter()
            .find(|point| point.operator_id == Some(id))
            .cloned())
    });
    let users = snapshot.users.clone();
    repo.expect_find_user()
        .returning(move |id| Ok(users.iter().find(|user| &user.id == id).cloned()));
    let users = snapshot.users.clone();
    repo.expect_list_users().returning(move |role| {
        Ok(users
            .iter()
            .filter(|user| role.is_none_or(|role| user.role == role))
            .cloned()
            .collect())
    });
    let operators: Vec<Operator> = snapshot.operators.values().cloned().collect();
    repo.expect_list_operators()
        .returning(move || Ok(operators.clone()));
    outcomes.reverse();
    repo.expect_commit().returning(move |batch| {
        committed.lock().expect("commit log").push(batch.clone());
        outcomes.pop().unwrap_or(Ok(()))
    });
    repo
}

fn service(
    repo: MockDirectoryRepository,
    identity: MockIdentityProvider,
    settings: AssignmentSettings,
) -> AssignmentService<MockDirectoryRepository, MockIdentityProvider> {
    AssignmentService::new(Arc::new(repo), Arc::new(identity), settings)
}

fn log() -> Arc<Mutex<Vec<DirectoryBatch>>> {
    Arc::new(Mutex::new(Vec::new()))
}

fn only_batch(log: &Arc<Mutex<Vec<DirectoryBatch>>>) -> DirectoryBatch {
    let batches = log.lock().expect("commit log");
    assert_eq!(batches.len(), 1, "expected exactly one commit");
    batches.first().cloned().expect("one batch")
}

#[tokio::test]
async fn assign_binds_both_sides_of_a_free_pair() {
    let ana = fixtures::user("ana", Role::Operator);
    let operator = fixtures::operator(&ana, None);
    let point = fixtures::orb_point("Plaza", None);
    let commits = log();
    let repo = repository(
        Snapshot::default()
            .with_user(ana.clone())
            .with_operator(operator.clone())
            .with_orb_point(point.clone()),
        commits.clone(),
        vec![],
    );

    let outcome = service(repo, MockIdentityProvider::new(), AssignmentSettings::default())
        .assign(operator.id, point.id)
        .await
        .expect("assign succeeds");

    assert_eq!(outcome.displaced_operator, None);
    assert_eq!(outcome.released_orb_point, None);
    let mut expected = DirectoryBatch::default();
    expected.link_operator(operator.id, None, Some(point.id));
    expected.link_orb_point(point.id, None, Some(operator.id));
    assert_eq!(only_batch(&commits), expected);
}

#[tokio::test]
async fn assign_displaces_previous_operator_and_releases_previous_point() {
    let ana = fixtures::user("ana", Role::Operator);
    let bea = fixtures::user("bea", Role::Operator);
    let mut a = fixtures::operator(&ana, None);
    let mut b = fixtures::operator(&bea, None);
    let target = fixtures::orb_point("Target", Some(b.id));
    let old = fixtures::orb_point("Old", Some(a.id));
    a.orb_point_id = Some(old.id);
    b.orb_point_id = Some(target.id);
    let commits = log();
    let repo = repository(
        Snapshot::default()
            .with_user(ana.clone())
            .with_operator(a.clone())
            .with_operator(b.clone())
            .with_orb_point(target.clone())
            .with_orb_point(old.clone()),
        commits.clone(),
        vec![],
    );

    let outcome = service(repo, MockIdentityProvider::new(), AssignmentSettings::default())
        .assign(a.id, target.id)
        .await
        .expect("assign succeeds");

    assert_eq!(outcome.displaced_operator, Some(b.id));
    assert_eq!(outcome.released_orb_point, Some(old.id));
    let mut expected = DirectoryBatch::default();
    expected.link_operator(b.id, Some(target.id), None);
    expected.link_orb_point(old.id, Some(a.id), None);
    expected.link_operator(a.id, Some(old.id), Some(target.id));
    expected.link_orb_point(target.id, Some(b.id), Some(a.id));
    assert_eq!(only_batch(&commits), expected);
}

#[tokio::test]
async fn assign_twice_is_rejected_without_writes() {
    let ana = fixtures::user("ana", Role::Operator);
    let mut operator = fixtures::operator(&ana, None);
    let point = fixtures::orb_point("Plaza", Some(operator.id));
    operator.orb_point_id = Some(point.id);
    let commits = log();
    let repo = repository(
        Snapshot::default()
            .with_user(ana.clone())
            .with_operator(operator.clone())
            .with_orb_point(point.clone()),
        commits.clone(),
        vec![],
    );

    let error = service(repo, MockIdentityProvider::new(), AssignmentSettings::default())
        .assign(operator.id, point.id)
        .await
        .expect_err("already assigned");

    assert_eq!(error.code(), ErrorCode::AlreadyAssigned);
    assert!(commits.lock().expect("commit log").is_empty());
}

#[rstest]
#[case::missing_operator(false, true)]
#[case::missing_orb_point(true, false)]
#[tokio::test]
async fn assign_requires_both_records(#[case] has_operator: bool, #[case] has_point: bool) {
    let ana = fixtures::user("ana", Role::Operator);
    let operator = fixtures::operator(&ana, None);
    let point = fixtures::orb_point("Plaza", None);
    let mut snapshot = Snapshot::default();
    if has_operator {
        snapshot = snapshot.with_operator(operator.clone());
    }
    if has_point {
        snapshot = snapshot.with_orb_point(point.clone());
    }
    let repo = repository(snapshot, log(), vec![]);

    let error = service(repo, MockIdentityProvider::new(), AssignmentSettings::default())
        .assign(operator.id, point.id)
        .await
        .expect_err("not found");

    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn assign_retries_conflicts_then_gives_up() {
    let ana = fixtures::user("ana", Role::Operator);
    let operator = fixtures::operator(&ana, None);
    let point = fixtures::orb_point("Plaza", None);
    let commits = log();
    let repo = repository(
        Snapshot::default()
            .with_user(ana.clone())
            .with_operator(operator.clone())
            .with_orb_point(point.clone()),
        commits.clone(),
        vec![
            Err(DirectoryRepositoryError::conflict("stale")),
            Err(DirectoryRepositoryError::conflict("stale")),
        ],
    );
    let settings = AssignmentSettings {
        max_attempts: 2,
        ..AssignmentSettings::default()
    };

    let error = service(repo, MockIdentityProvider::new(), settings)
        .assign(operator.id, point.id)
        .await
        .expect_err("conflict");

    assert_eq!(error.code(), ErrorCode::Conflict);
    assert_eq!(commits.lock().expect("commit log").len(), 2);
}

#[tokio::test]
async fn assign_succeeds_after_a_transient_conflict() {
    let ana = fixtures::user("ana", Role::Operator);
    let operator = fixtures::operator(&ana, None);
    let point = fixtures::orb_point("Plaza", None);
    let commits = log();
    let repo = repository(
        Snapshot::default()
            .with_user(ana.clone())
            .with_operator(operator.clone())
            .with_orb_point(point.clone()),
        commits.clone(),
        vec![Err(DirectoryRepositoryError::conflict("stale")), Ok(())],
    );

    service(repo, MockIdentityProvider::new(), AssignmentSettings::default())
        .assign(operator.id, point.id)
        .await
        .expect("second attempt commits");

    assert_eq!(commits.lock().expect("commit log").len(), 2);
}

#[rstest]
#[case::clears_both_sides(true, 2)]
#[case::operator_side_only(false, 1)]
#[tokio::test]
async fn unassign_honours_reverse_link_setting(
    #[case] clear_reverse_link: bool,
    #[case] expected_writes: usize,
) {
    let ana = fixtures::user("ana", Role::Operator);
    let mut operator = fixtures::operator(&ana, None);
    let point = fixtures::orb_point("Plaza", Some(operator.id));
    operator.orb_point_id = Some(point.id);
    let commits = log();
    let repo = repository(
        Snapshot::default()
            .with_operator(operator.clone())
            .with_orb_point(point.clone()),
        commits.clone(),
        vec![],
    );
    let settings = AssignmentSettings {
        clear_reverse_link,
        ..AssignmentSettings::default()
    };

    service(repo, MockIdentityProvider::new(), settings)
        .unassign(operator.id)
        .await
        .expect("unassign succeeds");

    let batch = only_batch(&commits);
    assert_eq!(batch.len(), expected_writes);
    assert_eq!(
        batch.writes().first(),
        Some(&DirectoryWrite::SetOperatorLink {
            operator_id: operator.id,
            expected: Some(point.id),
            value: None,
        })
    );
}

#[tokio::test]
async fn unassign_of_unbound_operator_writes_nothing() {
    let ana = fixtures::user("ana", Role::Operator);
    let operator = fixtures::operator(&ana, None);
    let commits = log();
    let repo = repository(
        Snapshot::default().with_operator(operator.clone()),
        commits.clone(),
        vec![],
    );

    service(repo, MockIdentityProvider::new(), AssignmentSettings::default())
        .unassign(operator.id)
        .await
        .expect("no-op");

    assert!(commits.lock().expect("commit log").is_empty());
}

#[tokio::test]
async fn delete_releases_point_removes_records_then_login() {
    let ana = fixtures::user("ana", Role::Operator);
    let mut operator = fixtures::operator(&ana, None);
    let point = fixtures::orb_point("Plaza", Some(operator.id));
    operator.orb_point_id = Some(point.id);
    let commits = log();
    let repo = repository(
        Snapshot::default()
            .with_user(ana.clone())
            .with_operator(operator.clone())
            .with_orb_point(point.clone()),
        commits.clone(),
        vec![],
    );
    let mut identity = MockIdentityProvider::new();
    let expected_user = ana.id.clone();
    identity
        .expect_delete_account()
        .withf(move |id| id == &expected_user)
        .times(1)
        .return_once(|_| Ok(()));

    service(repo, identity, AssignmentSettings::default())
        .delete_operator(operator.id)
        .await
        .expect("delete succeeds");

    let mut expected = DirectoryBatch::default();
    expected.link_orb_point(point.id, Some(operator.id), None);
    expected.push(DirectoryWrite::DeleteOperator(operator.id));
    expected.push(DirectoryWrite::DeleteUser(ana.id.clone()));
    assert_eq!(only_batch(&commits), expected);
}

#[tokio::test]
async fn delete_tolerates_missing_login() {
    let ana = fixtures::user("ana", Role::Promoter);
    let operator = fixtures::operator(&ana, None);
    let repo = repository(
        Snapshot::default()
            .with_user(ana)
            .with_operator(operator.clone()),
        log(),
        vec![],
    );
    let mut identity = MockIdentityProvider::new();
    identity
        .expect_delete_account()
        .return_once(|id: &UserId| Err(IdentityProviderError::account_not_found(id.as_ref())));

    service(repo, identity, AssignmentSettings::default())
        .delete_operator(operator.id)
        .await
        .expect("missing login is not fatal");
}

#[tokio::test]
async fn lists_only_unbound_promoters() {
    let free = fixtures::user("free", Role::Promoter);
    let busy = fixtures::user("busy", Role::Promoter);
    let staff = fixtures::user("staff", Role::Operator);
    let free_op = fixtures::operator(&free, None);
    let busy_op = fixtures::operator(&busy, Some(OrbPointId::random()));
    let staff_op = fixtures::operator(&staff, None);
    let repo = repository(
        Snapshot::default()
            .with_user(free)
            .with_user(busy)
            .with_user(staff)
            .with_operator(free_op.clone())
            .with_operator(busy_op)
            .with_operator(staff_op),
        log(),
        vec![],
    );

    let promoters = service(repo, MockIdentityProvider::new(), AssignmentSettings::default())
        .list_promoters_without_orb_point()
        .await
        .expect("list succeeds");

    let ids: Vec<_> = promoters.iter().map(|p| p.operator.id).collect();
    assert_eq!(ids, vec![free_op.id]);
}

#[tokio::test]
async fn assign_clears_a_slot_left_behind_by_one_sided_unassign() {
    let ana = fixtures::user("ana", Role::Operator);
    let operator = fixtures::operator(&ana, None);
    let stale = fixtures::orb_point("Old", Some(operator.id));
    let target = fixtures::orb_point("New", None);
    let commits = log();
    let repo = repository(
        Snapshot::default()
            .with_user(ana.clone())
            .with_operator(operator.clone())
            .with_orb_point(stale.clone())
            .with_orb_point(target.clone()),
        commits.clone(),
        vec![],
    );

    let outcome = service(repo, MockIdentityProvider::new(), AssignmentSettings::default())
        .assign(operator.id, target.id)
        .await
        .expect("assign succeeds");

    assert_eq!(outcome.released_orb_point, Some(stale.id));
    let mut expected = DirectoryBatch::default();
    expected.link_orb_point(stale.id, Some(operator.id), None);
    expected.link_operator(operator.id, None, Some(target.id));
    expected.link_orb_point(target.id, None, Some(operator.id));
    assert_eq!(only_batch(&commits), expected);
}

#[tokio::test]
async fn delete_releases_a_slot_the_operator_no_longer_links() {
    let ana = fixtures::user("ana", Role::Operator);
    let operator = fixtures::operator(&ana, None);
    let stale = fixtures::orb_point("Old", Some(operator.id));
    let commits = log();
    let repo = repository(
        Snapshot::default()
            .with_user(ana.clone())
            .with_operator(operator.clone())
            .with_orb_point(stale.clone()),
        commits.clone(),
        vec![],
    );
    let mut identity = MockIdentityProvider::new();
    identity.expect_delete_account().return_once(|_| Ok(()));

    service(repo, identity, AssignmentSettings::default())
        .delete_operator(operator.id)
        .await
        .expect("delete succeeds");

    let mut expected = DirectoryBatch::default();
    expected.link_orb_point(stale.id, Some(operator.id), None);
    expected.push(DirectoryWrite::DeleteOperator(operator.id));
    expected.push(DirectoryWrite::DeleteUser(ana.id.clone()));
    assert_eq!(only_batch(&commits), expected);
}

#[tokio::test]
async fn promoter_joins_team_without_touching_the_slot() {
    let pia = fixtures::user("pia", Role::Promoter);
    let ana = fixtures::user("ana", Role::Operator);
    let supervisor = fixtures::operator(&ana, None);
    let promoter = fixtures::operator(&pia, None);
    let point = fixtures::orb_point("Plaza", Some(supervisor.id));
    let commits = log();
    let repo = repository(
        Snapshot::default()
            .with_user(pia)
            .with_operator(supervisor)
            .with_operator(promoter.clone())
            .with_orb_point(point.clone()),
        commits.clone(),
        vec![],
    );

    let outcome = service(repo, MockIdentityProvider::new(), AssignmentSettings::default())
        .assign(promoter.id, point.id)
        .await
        .expect("assign succeeds");

    assert_eq!(outcome.displaced_operator, None);
    let mut expected = DirectoryBatch::default();
    expected.link_operator(promoter.id, None, Some(point.id));
    assert_eq!(only_batch(&commits), expected);
}

#[tokio::test]
async fn assign_promoters_moves_a_team_in_one_batch() {
    let pia = fixtures::user("pia", Role::Promoter);
    let leo = fixtures::user("leo", Role::Promoter);
    let point = fixtures::orb_point("Plaza", None);
    let previous = OrbPointId::random();
    let first = fixtures::operator(&pia, None);
    let second = fixtures::operator(&leo, Some(previous));
    let commits = log();
    let repo = repository(
        Snapshot::default()
            .with_user(pia)
            .with_user(leo)
            .with_operator(first.clone())
            .with_operator(second.clone())
            .with_orb_point(point.clone()),
        commits.clone(),
        vec![],
    );

    let outcomes = service(repo, MockIdentityProvider::new(), AssignmentSettings::default())
        .assign_promoters(point.id, vec![first.id, second.id, first.id])
        .await
        .expect("team assigned");

    let released: Vec<_> = outcomes.iter().map(|o| o.released_orb_point).collect();
    assert_eq!(released, vec![None, Some(previous)]);
    let mut expected = DirectoryBatch::default();
    expected.link_operator(first.id, None, Some(point.id));
    expected.link_operator(second.id, Some(previous), Some(point.id));
    assert_eq!(only_batch(&commits), expected);
}

#[rstest]
#[case::supervisor(Role::Operator, false, ErrorCode::InvalidRequest)]
#[case::already_on_team(Role::Promoter, true, ErrorCode::AlreadyAssigned)]
#[tokio::test]
async fn assign_promoters_rejects_without_writes(
    #[case] role: Role,
    #[case] on_team: bool,
    #[case] code: ErrorCode,
) {
    let pia = fixtures::user("pia", Role::Promoter);
    let other = fixtures::user("other", role);
    let point = fixtures::orb_point("Plaza", None);
    let fine = fixtures::operator(&pia, None);
    let rejected = fixtures::operator(&other, on_team.then_some(point.id));
    let commits = log();
    let repo = repository(
        Snapshot::default()
            .with_user(pia)
            .with_user(other)
            .with_operator(fine.clone())
            .with_operator(rejected.clone())
            .with_orb_point(point.clone()),
        commits.clone(),
        vec![],
    );

    let error = service(repo, MockIdentityProvider::new(), AssignmentSettings::default())
        .assign_promoters(point.id, vec![fine.id, rejected.id])
        .await
        .expect_err("rejected");

    assert_eq!(error.code(), code);
    assert!(commits.lock().expect("commit log").is_empty());
}

#[tokio::test]
async fn assign_promoters_needs_at_least_one_id() {
    let repo = repository(Snapshot::default(), log(), vec![]);

    let error = service(repo, MockIdentityProvider::new(), AssignmentSettings::default())
        .assign_promoters(OrbPointId::random(), Vec::new())
        .await
        .expect_err("empty");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
}

mod stored {
    //! Multi-step flows over the in-memory directory.

    use super::*;
    use crate::outbound::memory::MemoryDirectoryRepository;

    async fn seeded(users: Vec<User>) -> (Arc<MemoryDirectoryRepository>, Vec<Operator>) {
        let repo = Arc::new(MemoryDirectoryRepository::new());
        let mut batch = DirectoryBatch::default();
        let mut operators = Vec::new();
        for user in users {
            let operator = Operator::unbound(user.id.clone());
            batch.push(DirectoryWrite::InsertUser(user));
            batch.push(DirectoryWrite::InsertOperator(operator.clone()));
            operators.push(operator);
        }
        repo.commit(&batch).await.expect("seed");
        (repo, operators)
    }

    async fn add_orb_point(repo: &MemoryDirectoryRepository, name: &str) -> OrbPointId {
        let point = fixtures::orb_point(name, None);
        let mut batch = DirectoryBatch::default();
        batch.push(DirectoryWrite::InsertOrbPoint(point.clone()));
        repo.commit(&batch).await.expect("insert OrbPoint");
        point.id
    }

    fn one_sided() -> AssignmentSettings {
        AssignmentSettings {
            clear_reverse_link: false,
            ..AssignmentSettings::default()
        }
    }

    #[tokio::test]
    async fn reassign_after_one_sided_unassign_succeeds() {
        let (repo, operators) = seeded(vec![fixtures::user("ana", Role::Operator)]).await;
        let operator = operators.first().cloned().expect("operator");
        let first = add_orb_point(&repo, "First").await;
        let second = add_orb_point(&repo, "Second").await;
        let service =
            AssignmentService::new(repo.clone(), Arc::new(MockIdentityProvider::new()), one_sided());

        service.assign(operator.id, first).await.expect("first assign");
        service.unassign(operator.id).await.expect("unassign");
        let outcome = service
            .assign(operator.id, second)
            .await
            .expect("assign elsewhere");

        assert_eq!(outcome.released_orb_point, Some(first));
        let old = repo.find_orb_point(first).await.expect("lookup").expect("present");
        assert_eq!(old.operator_id, None);
        let new = repo.find_orb_point(second).await.expect("lookup").expect("present");
        assert_eq!(new.operator_id, Some(operator.id));
    }

    #[tokio::test]
    async fn delete_after_one_sided_unassign_frees_the_slot() {
        let (repo, operators) = seeded(vec![fixtures::user("ana", Role::Operator)]).await;
        let operator = operators.first().cloned().expect("operator");
        let point = add_orb_point(&repo, "Plaza").await;
        let mut identity = MockIdentityProvider::new();
        identity.expect_delete_account().return_once(|_| Ok(()));
        let service = AssignmentService::new(repo.clone(), Arc::new(identity), one_sided());

        service.assign(operator.id, point).await.expect("assign");
        service.unassign(operator.id).await.expect("unassign");
        service.delete_operator(operator.id).await.expect("delete");

        let stored = repo.find_orb_point(point).await.expect("lookup").expect("present");
        assert_eq!(stored.operator_id, None);
    }

    #[tokio::test]
    async fn promoters_share_an_orb_point_with_its_supervisor() {
        let (repo, operators) = seeded(vec![
            fixtures::user("ana", Role::Operator),
            fixtures::user("pia", Role::Promoter),
            fixtures::user("leo", Role::Promoter),
        ])
        .await;
        let point = add_orb_point(&repo, "Plaza").await;
        let service = AssignmentService::new(
            repo.clone(),
            Arc::new(MockIdentityProvider::new()),
            AssignmentSettings::default(),
        );
        let ids: Vec<OperatorId> = operators.iter().map(|operator| operator.id).collect();
        let [supervisor, pia, leo] = ids.as_slice() else {
            panic!("three operators seeded");
        };

        service.assign(*supervisor, point).await.expect("supervisor");
        service.assign(*pia, point).await.expect("first promoter");
        service
            .assign_promoters(point, vec![*leo])
            .await
            .expect("second promoter");

        let stored = repo.find_orb_point(point).await.expect("lookup").expect("present");
        assert_eq!(stored.operator_id, Some(*supervisor));
        for id in [supervisor, pia, leo] {
            let operator = repo.find_operator(*id).await.expect("lookup").expect("present");
            assert_eq!(operator.orb_point_id, Some(point));
        }
    }
}
