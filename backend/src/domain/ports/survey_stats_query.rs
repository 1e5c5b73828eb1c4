//! Driving port for per-OrbPoint survey statistics.

use async_trait::async_trait;

use crate::domain::stats::{OrbPointStats, RangeSelection};
use crate::domain::{Error, OrbPointId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SurveyStatsQuery: Send + Sync {
    /// Timeline and breakdowns for `orb_point_id` over `selection`.
    ///
    /// `NotFound` when the OrbPoint does not exist.
    async fn orb_point_stats(
        &self,
        orb_point_id: OrbPointId,
        selection: RangeSelection,
    ) -> Result<OrbPointStats, Error>;
}
