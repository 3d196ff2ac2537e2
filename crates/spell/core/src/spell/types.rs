//! Enumerations and flag sets describing casts and effects.

use bitflags::bitflags;

// ============================================================================
// Spell Status
// ============================================================================

/// Lifecycle status of one cast.
///
/// ```text
/// Initiating ─► Casting ─► Executing ─┬─► Waiting ⇄ Executing
///     │            │          │       └─► Finishing ─► Finished
///     └─► Failed   └──────────┴─────────────┘
/// ```
///
/// `Finished` and `Failed` are terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SpellStatus {
    Initiating,
    Casting,
    Executing,
    Waiting,
    Finishing,
    Finished,
    Failed,
}

impl SpellStatus {
    /// Returns true for `Finished` and `Failed`.
    #[inline]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Finished | Self::Failed)
    }

    /// Returns true if the lifecycle graph has an edge from `self` to `next`.
    ///
    /// `Executing → Executing` is allowed: channel pulses and multiphase phases
    /// execute repeatedly without leaving the status.
    pub const fn can_transition_to(self, next: Self) -> bool {
        use SpellStatus::*;
        matches!(
            (self, next),
            (Initiating, Casting)
                | (Initiating, Failed)
                | (Casting, Executing)
                | (Casting, Finishing)
                | (Executing, Executing)
                | (Executing, Waiting)
                | (Executing, Finishing)
                | (Executing, Finished)
                | (Waiting, Executing)
                | (Waiting, Finishing)
                | (Waiting, Finished)
                | (Finishing, Finished)
        )
    }
}

// ============================================================================
// Cast Method
// ============================================================================

/// Timing and interaction model of a cast.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::FromRepr,
    strum::EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u32)]
pub enum CastMethod {
    #[default]
    Normal = 0,
    Channeled = 1,
    PressHold = 2,
    ChanneledField = 3,
    ClientSideInteraction = 5,
    RapidTap = 6,
    ChargeRelease = 7,
    Multiphase = 8,
    Aura = 9,
}

impl CastMethod {
    /// Converts a raw data value, falling back to `Normal` for unknown values.
    pub fn from_raw(raw: u32) -> Self {
        Self::from_repr(raw).unwrap_or_else(|| {
            tracing::warn!(
                target: "spell::cast",
                raw,
                "unknown cast method, falling back to Normal"
            );
            Self::Normal
        })
    }

    /// Returns true for the methods that drive a threshold chain.
    #[inline]
    pub const fn is_threshold(self) -> bool {
        matches!(self, Self::RapidTap | Self::ChargeRelease)
    }
}

// ============================================================================
// Effect Types
// ============================================================================

/// Effect type key used to look up a handler in the
/// [`EffectHandlerRegistry`](crate::spell::EffectHandlerRegistry).
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::FromRepr,
    strum::EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u32)]
pub enum SpellEffectType {
    Damage = 0,
    Heal = 1,
    Proxy = 2,
    ApplyBuff = 3,
    Dispel = 4,
    Teleport = 5,
    Knockback = 6,
    SummonMount = 7,
    UnitPropertyModifier = 8,
    Disguise = 9,
    Fluff = 10,
}

// ============================================================================
// Flags
// ============================================================================

bitflags! {
    /// Roles a resolved target holds for the current execute pass.
    ///
    /// A unit may appear once per distinct role; effects select targets whose
    /// roles intersect their declared mask.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct SpellTargetFlags: u8 {
        const CASTER    = 1 << 0;
        const TARGET    = 1 << 1;
        const TELEGRAPH = 1 << 2;
        const AREA      = 1 << 3;
    }
}

bitflags! {
    /// Ability-wide flags.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct SpellFlags: u32 {
        /// A unit is selected at most once across all telegraphs of a pass.
        const UNIQUE_TARGET = 1 << 0;
    }
}

bitflags! {
    /// Per-effect flags.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct SpellEffectFlags: u32 {
        /// A zero-duration effect carrying this flag keeps the cast alive until
        /// it is cancelled or finished explicitly.
        const CANCEL_ONLY = 1 << 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_statuses() {
        assert!(SpellStatus::Finished.is_terminal());
        assert!(SpellStatus::Failed.is_terminal());
        assert!(!SpellStatus::Waiting.is_terminal());
    }

    #[test]
    fn failed_only_reachable_from_initiating() {
        use SpellStatus::*;
        for status in [Casting, Executing, Waiting, Finishing, Finished] {
            assert!(!status.can_transition_to(Failed), "{status} -> Failed");
        }
        assert!(Initiating.can_transition_to(Failed));
    }

    #[test]
    fn no_reverse_transitions() {
        use SpellStatus::*;
        assert!(!Casting.can_transition_to(Initiating));
        assert!(!Finished.can_transition_to(Finishing));
        assert!(!Executing.can_transition_to(Casting));
    }

    #[test]
    fn unknown_cast_method_falls_back_to_normal() {
        assert_eq!(CastMethod::from_raw(4), CastMethod::Normal);
        assert_eq!(CastMethod::from_raw(99), CastMethod::Normal);
        assert_eq!(CastMethod::from_raw(6), CastMethod::RapidTap);
    }
}
