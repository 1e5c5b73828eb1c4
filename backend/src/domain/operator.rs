//! Operator records and their joined profile view.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::{OperatorId, OrbPointId, Role, User, UserId};

/// Staff record linking a non-admin user to at most one OrbPoint.
///
/// ## Invariants
/// - When `orb_point_id` is `Some(p)`, OrbPoint `p` carries
///   `operator_id == Some(self.id)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operator {
    pub id: OperatorId,
    pub orb_point_id: Option<OrbPointId>,
    pub user_data_id: UserId,
}

impl Operator {
    /// A fresh, unbound operator for `user_data_id`.
    #[must_use]
    pub fn unbound(user_data_id: UserId) -> Self {
        Self {
            id: OperatorId::random(),
            orb_point_id: None,
            user_data_id,
        }
    }

    /// Whether this operator is bound to `orb_point_id`.
    #[must_use]
    pub fn is_bound_to(&self, orb_point_id: OrbPointId) -> bool {
        self.orb_point_id == Some(orb_point_id)
    }
}

/// Operator joined with its user profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperatorProfile {
    #[serde(flatten)]
    pub operator: Operator,
    pub user_data: User,
}

impl OperatorProfile {
    /// Role of the joined user.
    #[must_use]
    pub fn role(&self) -> Role {
        self.user_data.role
    }
}

/// Pair each operator with its user by `user_data_id`.
///
/// Operators whose user is not in `users` are returned separately as
/// orphans, in input order.
#[must_use]
pub fn join_profiles(
    operators: Vec<Operator>,
    users: Vec<User>,
) -> (Vec<OperatorProfile>, Vec<Operator>) {
    let mut by_id: HashMap<UserId, User> = users
        .into_iter()
        .map(|user| (user.id.clone(), user))
        .collect();
    let mut profiles = Vec::with_capacity(operators.len());
    let mut orphans = Vec::new();
    for operator in operators {
        match by_id.remove(&operator.user_data_id) {
            Some(user_data) => profiles.push(OperatorProfile {
                operator,
                user_data,
            }),
            None => orphans.push(operator),
        }
    }
    (profiles, orphans)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::fixtures;

    #[test]
    fn join_pairs_by_user_and_reports_orphans() {
        let ana = fixtures::user("ana", Role::Operator);
        let luis = fixtures::user("luis", Role::Promoter);
        let with_user = fixtures::operator(&ana, None);
        let orphan = Operator::unbound(UserId::new("ghost").expect("valid id"));
        let promoter = fixtures::operator(&luis, None);

        let (profiles, orphans) = join_profiles(
            vec![with_user.clone(), orphan.clone(), promoter.clone()],
            vec![luis, ana],
        );

        let joined: Vec<_> = profiles.iter().map(|p| (p.operator.id, p.role())).collect();
        assert_eq!(
            joined,
            vec![(with_user.id, Role::Operator), (promoter.id, Role::Promoter)]
        );
        assert_eq!(orphans, vec![orphan]);
    }

    #[test]
    fn profile_serialises_flat_operator_fields() {
        let ana = fixtures::user("ana", Role::Operator);
        let profile = OperatorProfile {
            operator: fixtures::operator(&ana, None),
            user_data: ana,
        };
        let value = serde_json::to_value(&profile).expect("serialise");
        assert!(value.get("userDataId").is_some());
        assert_eq!(value["orbPointId"], serde_json::Value::Null);
        assert_eq!(value["userData"]["role"], "operator");
    }
}
