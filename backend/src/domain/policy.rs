//! Role-based access policy.
//!
//! [`authorize`] is the only place that branches on [`Role`]; adapters ask it
//! before invoking a use-case and never inspect roles themselves.

use super::{Error, Role};

/// Protected capabilities exposed by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Load the survey form for the caller's OrbPoint.
    ViewSurveyForm,
    /// Submit a survey response.
    SubmitSurvey,
    /// Open the admin dashboard.
    ViewDashboard,
    /// Create, list or delete OrbPoints.
    ManageOrbPoints,
    /// Create staff accounts, assign or delete operators.
    ManageOperators,
    /// Read aggregated survey statistics.
    ViewStatistics,
}

/// Outcome of a policy check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny,
}

impl Decision {
    /// Convert a denial into a forbidden [`Error`].
    pub fn into_result(self, action: Action) -> Result<(), Error> {
        match self {
            Self::Allow => Ok(()),
            Self::Deny => Err(Error::forbidden(format!("not permitted to {action:?}"))),
        }
    }
}

/// Decide whether `role` may perform `action`.
///
/// # Examples
/// ```
/// use orbsurvey::domain::{Action, Decision, Role, authorize};
///
/// assert_eq!(authorize(Role::Admin, Action::ManageOperators), Decision::Allow);
/// assert_eq!(authorize(Role::Promoter, Action::ViewStatistics), Decision::Deny);
/// ```
#[must_use]
pub const fn authorize(role: Role, action: Action) -> Decision {
    let allowed = match role {
        Role::Admin => !matches!(action, Action::ViewSurveyForm | Action::SubmitSurvey),
        Role::Operator | Role::Promoter => {
            matches!(action, Action::ViewSurveyForm | Action::SubmitSurvey)
        }
    };
    if allowed { Decision::Allow } else { Decision::Deny }
}

/// Page a user lands on after logging in.
#[must_use]
pub const fn landing_path(role: Role) -> &'static str {
    match role {
        Role::Admin => "/admin/dashboard",
        Role::Operator | Role::Promoter => "/",
    }
}
