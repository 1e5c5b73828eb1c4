//! Atomic multi-document writes against the directory store.
//!
//! Every multi-step directory mutation is expressed as a [`DirectoryBatch`]
//! and handed to the repository in one call. Adapters apply a batch all or
//! nothing. Link writes carry the value the caller observed; if the stored
//! value differs at commit time the whole batch is rejected as a conflict.

use super::{Operator, OperatorId, OrbPoint, OrbPointId, User, UserId};

/// Single write inside a [`DirectoryBatch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectoryWrite {
    InsertUser(User),
    InsertOperator(Operator),
    InsertOrbPoint(OrbPoint),
    /// Delete a user profile; fails the batch if it does not exist.
    DeleteUser(UserId),
    /// Delete an operator; fails the batch if it does not exist.
    DeleteOperator(OperatorId),
    /// Delete an OrbPoint; fails the batch if it does not exist.
    DeleteOrbPoint(OrbPointId),
    /// Compare-and-set `Operator.orb_point_id`.
    SetOperatorLink {
        operator_id: OperatorId,
        expected: Option<OrbPointId>,
        value: Option<OrbPointId>,
    },
    /// Compare-and-set `OrbPoint.operator_id`.
    SetOrbPointLink {
        orb_point_id: OrbPointId,
        expected: Option<OperatorId>,
        value: Option<OperatorId>,
    },
}

/// Ordered list of writes committed atomically.
///
/// # Examples
/// ```
/// use orbsurvey::domain::{DirectoryBatch, OperatorId, OrbPointId};
///
/// let operator = OperatorId::random();
/// let point = OrbPointId::random();
/// let mut batch = DirectoryBatch::default();
/// batch.link_operator(operator, None, Some(point));
/// batch.link_orb_point(point, None, Some(operator));
/// assert_eq!(batch.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryBatch {
    writes: Vec<DirectoryWrite>,
}

impl DirectoryBatch {
    /// Append an arbitrary write.
    pub fn push(&mut self, write: DirectoryWrite) {
        self.writes.push(write);
    }

    /// Append a compare-and-set on an operator's OrbPoint link.
    pub fn link_operator(
        &mut self,
        operator_id: OperatorId,
        expected: Option<OrbPointId>,
        value: Option<OrbPointId>,
    ) {
        self.push(DirectoryWrite::SetOperatorLink {
            operator_id,
            expected,
            value,
        });
    }

    /// Append a compare-and-set on an OrbPoint's operator link.
    pub fn link_orb_point(
        &mut self,
        orb_point_id: OrbPointId,
        expected: Option<OperatorId>,
        value: Option<OperatorId>,
    ) {
        self.push(DirectoryWrite::SetOrbPointLink {
            orb_point_id,
            expected,
            value,
        });
    }

    #[must_use]
    pub fn writes(&self) -> &[DirectoryWrite] {
        self.writes.as_slice()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.writes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }
}

impl FromIterator<DirectoryWrite> for DirectoryBatch {
    fn from_iter<I: IntoIterator<Item = DirectoryWrite>>(iter: I) -> Self {
        Self {
            writes: iter.into_iter().collect(),
        }
    }
}
