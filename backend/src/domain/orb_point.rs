//! OrbPoint locations and their sectors.

use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{OperatorId, OrbPointId};

/// Named area within an OrbPoint that visitors report coming from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sector {
    pub sector_name: String,
    pub sector_type: String,
}

/// Physical survey location.
///
/// ## Invariants
/// - When `operator_id` is `Some(o)`, Operator `o` carries
///   `orb_point_id == Some(self.id)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrbPoint {
    pub id: OrbPointId,
    pub name: String,
    pub area_type: String,
    pub direction: String,
    pub region: String,
    pub sectors: Vec<Sector>,
    pub operator_id: Option<OperatorId>,
    pub created_at: DateTime<Utc>,
}

impl OrbPoint {
    /// Whether `name` matches one of this OrbPoint's sectors.
    #[must_use]
    pub fn has_sector(&self, name: &str) -> bool {
        self.sectors.iter().any(|sector| sector.sector_name == name)
    }
}

/// Validation errors raised by [`OrbPointDraft::try_new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrbPointValidationError {
    EmptyName,
    EmptySectorName { index: usize },
    DuplicateSector { name: String },
}

impl fmt::Display for OrbPointValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "OrbPoint name must not be empty"),
            Self::EmptySectorName { index } => {
                write!(f, "sector {index} must have a name")
            }
            Self::DuplicateSector { name } => write!(f, "sector {name} is listed twice"),
        }
    }
}

impl std::error::Error for OrbPointValidationError {}

/// Validated input for creating an OrbPoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrbPointDraft {
    name: String,
    area_type: String,
    direction: String,
    region: String,
    sectors: Vec<Sector>,
}

impl OrbPointDraft {
    /// Validate raw form input. Text fields are trimmed.
    ///
    /// # Examples
    /// ```
    /// use orbsurvey::domain::{OrbPointDraft, Sector};
    ///
    /// let draft = OrbPointDraft::try_new(
    ///     " Plaza Norte ",
    ///     "mall",
    ///     "Av. 1",
    ///     "Lima",
    ///     vec![Sector { sector_name: "Food court".into(), sector_type: "food".into() }],
    /// )
    /// .expect("valid draft");
    /// assert_eq!(draft.name(), "Plaza Norte");
    /// ```
    pub fn try_new(
        name: &str,
        area_type: &str,
        direction: &str,
        region: &str,
        sectors: Vec<Sector>,
    ) -> Result<Self, OrbPointValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(OrbPointValidationError::EmptyName);
        }
        let mut seen = HashSet::new();
        let mut cleaned = Vec::with_capacity(sectors.len());
        for (index, sector) in sectors.into_iter().enumerate() {
            let sector_name = sector.sector_name.trim().to_owned();
            if sector_name.is_empty() {
                return Err(OrbPointValidationError::EmptySectorName { index });
            }
            if !seen.insert(sector_name.clone()) {
                return Err(OrbPointValidationError::DuplicateSector { name: sector_name });
            }
            cleaned.push(Sector {
                sector_name,
                sector_type: sector.sector_type.trim().to_owned(),
            });
        }
        Ok(Self {
            name: name.to_owned(),
            area_type: area_type.trim().to_owned(),
            direction: direction.trim().to_owned(),
            region: region.trim().to_owned(),
            sectors: cleaned,
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Materialise an unbound OrbPoint.
    #[must_use]
    pub fn into_orb_point(self, id: OrbPointId, created_at: DateTime<Utc>) -> OrbPoint {
        OrbPoint {
            id,
            name: self.name,
            area_type: self.area_type,
            direction: self.direction,
            region: self.region,
            sectors: self.sectors,
            operator_id: None,
            created_at,
        }
    }
}
