//! Caller resolution and role checks shared by the handlers.

use tracing::warn;

use crate::domain::{Action, Error, User, authorize};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Load the signed-in user and check `action` against their role.
///
/// A session whose user profile no longer exists is treated as logged out.
pub(crate) async fn authorize_caller(
    state: &HttpState,
    session: &SessionContext,
    action: Action,
) -> Result<User, Error> {
    let user_id = session.require_user_id()?;
    let Some(user) = state.directory.get_user(&user_id).await? else {
        warn!(%user_id, "session refers to a user without a profile");
        session.clear();
        return Err(Error::unauthorized("login required"));
    };
    authorize(user.role, action).into_result(action)?;
    Ok(user)
}
