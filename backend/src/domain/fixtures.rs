//! Record builders shared by domain unit tests.

use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;

use super::{
    Operator, OperatorId, OrbPoint, OrbPointDraft, OrbPointId, Role, Sector, User, UserId,
    UserProfile,
};

pub(crate) fn user(id: &str, role: Role) -> User {
    let profile = UserProfile::try_from_parts("1234", "Ana", "Ruiz", &format!("{id}@orb.test"))
        .expect("fixture profile");
    let created_at = Utc
        .with_ymd_and_hms(2024, 1, 1, 9, 0, 0)
        .single()
        .expect("fixture instant");
    User::new(UserId::new(id).expect("fixture id"), profile, role, created_at)
}

pub(crate) fn operator(user: &User, orb_point_id: Option<OrbPointId>) -> Operator {
    Operator {
        id: OperatorId::random(),
        orb_point_id,
        user_data_id: user.id.clone(),
    }
}

pub(crate) fn orb_point(name: &str, operator_id: Option<OperatorId>) -> OrbPoint {
    let draft = OrbPointDraft::try_new(
        name,
        "mall",
        "Av. Larco 123",
        "Lima",
        vec![
            Sector {
                sector_name: "Food court".to_owned(),
                sector_type: "zone".to_owned(),
            },
            Sector {
                sector_name: "Entrance".to_owned(),
                sector_type: "zone".to_owned(),
            },
        ],
    )
    .expect("fixture draft");
    let mut point = draft.into_orb_point(OrbPointId::random(), Utc::now());
    point.operator_id = operator_id;
    point
}

/// Clock pinned to one instant.
pub(crate) struct FixtureClock {
    pub(crate) utc_now: DateTime<Utc>,
}

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc_now.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.utc_now
    }
}

pub(crate) fn fixture_instant() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 10, 15, 30, 0)
        .single()
        .expect("fixture instant")
}

pub(crate) fn fixture_clock() -> Arc<dyn Clock> {
    Arc::new(FixtureClock {
        utc_now: fixture_instant(),
    })
}
