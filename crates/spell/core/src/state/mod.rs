//! Identifiers and small value types shared by every module.
//!
//! Nothing in here knows about casts; these are the nouns the collaborators
//! (world, cooldown store, catalog) and the state machine agree on.
mod common;
mod ids;

pub use common::{
    CastingId, EffectInstanceId, EntityId, PrerequisiteId, SpellId, Vector3,
};
pub use ids::SpellIds;
