//! Cast result codes.

/// Closed set of outcomes returned by the prerequisite/cost check and used as
/// cancellation reasons.
///
/// These are values, not errors: the caller decides whether to notify the
/// caster or swallow the code (proxy casts fail silently).
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::FromRepr,
    strum::IntoStaticStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u16)]
pub enum CastResult {
    Ok = 0,

    // ===== caster state =====
    CasterNotFound = 1,
    CasterCannotBeDead = 2,

    // ===== prerequisites =====
    PrerequisiteCasterCast = 10,
    PrerequisiteTargetCast = 11,
    PrerequisiteCasterPersistence = 12,
    PrerequisiteTargetPersistence = 13,
    CasterCrowdControlled = 14,

    // ===== casting / cooldowns / costs =====
    SpellAlreadyCasting = 20,
    SpellCooldown = 21,
    SpellGroupCooldown = 22,
    SpellGlobalCooldown = 23,
    SpellNoCharges = 24,
    InsufficientResources = 25,

    // ===== cancellation reasons =====
    SpellCancelled = 40,
    SpellInterrupted = 41,
    CasterMovement = 42,
}

impl CastResult {
    #[inline]
    pub const fn is_ok(self) -> bool {
        matches!(self, Self::Ok)
    }
}
