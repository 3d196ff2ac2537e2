//! Notifications produced by casts.
//!
//! These are the abstract events the owning entity forwards to clients; wire
//! encoding lives elsewhere. Each one is published exactly once, on the
//! transition that produces it.

use crate::state::{CastingId, EffectInstanceId, EntityId, SpellId, Vector3};

use super::result::CastResult;
use super::types::SpellTargetFlags;

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SpellNotification {
    CastStart(CastStart),
    CastGo(CastGo),
    CastFinish {
        cast_id: CastingId,
    },
    CastResult {
        spell_id: SpellId,
        result: CastResult,
    },
    ThresholdStart {
        spell_id: SpellId,
        root_spell_id: SpellId,
        parent_spell_id: SpellId,
        cast_id: CastingId,
    },
    ThresholdUpdate {
        spell_id: SpellId,
        value: u8,
    },
    ThresholdClear {
        spell_id: SpellId,
    },
    CancelNotice {
        cast_id: CastingId,
        result: CastResult,
        cancelled: bool,
    },
    BuffRemove {
        cast_id: CastingId,
        caster: EntityId,
    },
    BuffRemoveMulti {
        cast_id: CastingId,
        targets: Vec<EntityId>,
    },
}

impl SpellNotification {
    /// Short name of the variant, for logs and test assertions.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::CastStart(_) => "CastStart",
            Self::CastGo(_) => "CastGo",
            Self::CastFinish { .. } => "CastFinish",
            Self::CastResult { .. } => "CastResult",
            Self::ThresholdStart { .. } => "ThresholdStart",
            Self::ThresholdUpdate { .. } => "ThresholdUpdate",
            Self::ThresholdClear { .. } => "ThresholdClear",
            Self::CancelNotice { .. } => "CancelNotice",
            Self::BuffRemove { .. } => "BuffRemove",
            Self::BuffRemoveMulti { .. } => "BuffRemoveMulti",
        }
    }
}

/// Published when a cast passes its checks.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CastStart {
    pub cast_id: CastingId,
    pub caster: EntityId,
    pub primary_target: Option<EntityId>,
    pub spell_id: SpellId,
    pub root_spell_id: SpellId,
    pub parent_spell_id: SpellId,
    pub caster_position: Vector3,
    pub caster_yaw: f32,
    pub user_initiated: bool,
    pub initial_positions: Vec<InitialPosition>,
    pub telegraph_positions: Vec<TelegraphPosition>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InitialPosition {
    pub unit: EntityId,
    pub position: Vector3,
    pub yaw: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TelegraphPosition {
    pub telegraph_id: u32,
    pub position: Vector3,
    pub yaw: f32,
}

/// Published at the end of every execute pass.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CastGo {
    pub cast_id: CastingId,
    pub primary_position: Vector3,
    pub phase: u8,
    pub targets: Vec<TargetReport>,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TargetReport {
    pub target: EntityId,
    pub flags: SpellTargetFlags,
    pub effects: Vec<EffectReport>,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EffectReport {
    pub effect_id: u32,
    pub instance_id: EffectInstanceId,
    pub delay: f64,
    pub remaining_duration: f64,
    pub damage: Option<DamageDescription>,
}

/// Damage detail filled in by damage-dealing handlers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DamageDescription {
    pub raw_damage: u32,
    pub adjusted_damage: u32,
    pub absorbed: u32,
    pub overkill: u32,
    pub killed_target: bool,
}
