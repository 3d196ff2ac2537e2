//! Prerequisite oracle.

use crate::state::{EntityId, PrerequisiteId};

/// Evaluates boolean prerequisite rules against a unit.
///
/// The rule language itself is outside this crate.
pub trait PrerequisiteOracle: Send + Sync {
    fn meets(&self, actor: EntityId, prerequisite: PrerequisiteId) -> bool;
}
