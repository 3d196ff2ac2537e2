//! Ability definitions.
//!
//! Definitions are immutable data owned by the [`SpellCatalog`]. Casts borrow
//! them for their whole lifetime, which is how a threshold child keeps a plain
//! reference to its root and parent abilities.
//!
//! [`SpellCatalog`]: crate::env::SpellCatalog

use arrayvec::ArrayVec;

use crate::config::SpellConfig;
use crate::state::{PrerequisiteId, SpellId, Vector3};

use super::types::{CastMethod, SpellEffectFlags, SpellEffectType, SpellFlags, SpellTargetFlags};

// ============================================================================
// Spell Definition
// ============================================================================

/// Complete description of one ability.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpellDefinition {
    pub id: SpellId,
    pub cast_method: CastMethod,

    /// Wind-up (or channel length) in seconds.
    pub cast_time: f64,

    /// Seconds between channel pulses; zero uses [`SpellConfig::channel_pulse_interval`].
    pub channel_interval: f64,

    /// Per-ability cooldown in seconds, also applied to every cooldown group.
    pub cooldown: f64,
    pub cooldown_groups: Vec<u32>,
    pub global_cooldown: Option<GlobalCooldown>,

    /// Whether the ability spends charges from the caster's ability record.
    pub uses_charges: bool,
    pub costs: Vec<SpellCost>,

    pub caster_cast_prerequisite: Option<PrerequisiteId>,
    pub caster_persistence_prerequisite: Option<PrerequisiteId>,
    /// Meeting any of these skips the caster-cast prerequisite and the cost check.
    pub runner_prerequisites: Vec<PrerequisiteId>,

    pub flags: SpellFlags,

    /// Radius of the area-of-effect query around the caster.
    pub aoe_radius: Option<f32>,
    /// Cap on telegraph-selected targets per execute pass.
    pub aoe_target_cap: Option<u32>,

    pub telegraphs: Vec<TelegraphDefinition>,
    pub phases: ArrayVec<SpellPhase, { SpellConfig::MAX_PHASES }>,
    pub thresholds: ArrayVec<ThresholdEntry, { SpellConfig::MAX_THRESHOLDS }>,

    /// Effects in execution order.
    pub effects: Vec<SpellEffect>,
}

impl SpellDefinition {
    /// Creates an instant `Normal` ability with no effects.
    pub fn new(id: SpellId) -> Self {
        Self {
            id,
            cast_method: CastMethod::Normal,
            cast_time: 0.0,
            channel_interval: 0.0,
            cooldown: 0.0,
            cooldown_groups: Vec::new(),
            global_cooldown: None,
            uses_charges: false,
            costs: Vec::new(),
            caster_cast_prerequisite: None,
            caster_persistence_prerequisite: None,
            runner_prerequisites: Vec::new(),
            flags: SpellFlags::empty(),
            aoe_radius: None,
            aoe_target_cap: None,
            telegraphs: Vec::new(),
            phases: ArrayVec::new(),
            thresholds: ArrayVec::new(),
            effects: Vec::new(),
        }
    }

    pub fn with_cast_method(mut self, cast_method: CastMethod) -> Self {
        self.cast_method = cast_method;
        self
    }

    pub fn with_cast_time(mut self, seconds: f64) -> Self {
        self.cast_time = seconds;
        self
    }

    pub fn with_cooldown(mut self, seconds: f64) -> Self {
        self.cooldown = seconds;
        self
    }

    pub fn with_global_cooldown(mut self, bucket: u32, duration: f64) -> Self {
        self.global_cooldown = Some(GlobalCooldown { bucket, duration });
        self
    }

    pub fn with_flags(mut self, flags: SpellFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_effect(mut self, effect: SpellEffect) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn with_telegraph(mut self, telegraph: TelegraphDefinition) -> Self {
        self.telegraphs.push(telegraph);
        self
    }

    /// Appends a threshold step.
    ///
    /// # Panics
    ///
    /// Panics if more than [`SpellConfig::MAX_THRESHOLDS`] steps are added.
    pub fn with_threshold(mut self, entry: ThresholdEntry) -> Self {
        self.thresholds.push(entry);
        self
    }

    /// Appends a multiphase phase.
    ///
    /// # Panics
    ///
    /// Panics if more than [`SpellConfig::MAX_PHASES`] phases are added.
    pub fn with_phase(mut self, phase: SpellPhase) -> Self {
        self.phases.push(phase);
        self
    }

    /// Number of threshold steps configured on this ability.
    #[inline]
    pub fn threshold_count(&self) -> u8 {
        self.thresholds.len() as u8
    }

    /// Total hold time before a charge-and-release cast fires on its own.
    pub fn max_hold_duration(&self) -> f64 {
        self.thresholds.iter().map(|t| t.duration).sum()
    }

    /// Index of the threshold tier reached after holding for `held` seconds.
    ///
    /// Tier `n` is reached once the cumulative duration of tiers `0..n` has
    /// elapsed; the result is clamped to the last entry.
    pub fn hold_tier(&self, held: f64) -> usize {
        let mut elapsed = 0.0;
        let mut tier = 0;
        for (index, entry) in self.thresholds.iter().enumerate() {
            elapsed += entry.duration;
            if held >= elapsed {
                tier = index + 1;
            } else {
                break;
            }
        }
        tier.min(self.thresholds.len().saturating_sub(1))
    }
}

// ============================================================================
// Supporting Types
// ============================================================================

/// Shared cooldown bucket applied when the ability is cast.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GlobalCooldown {
    pub bucket: u32,
    pub duration: f64,
}

/// Resource cost consumed on a successful cast.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpellCost {
    pub resource: u32,
    pub amount: f32,
}

/// One step of a threshold chain.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ThresholdEntry {
    /// Ability cast by the child spawned for this step.
    pub spell: SpellId,
    /// Hold time of this tier (charge-and-release only).
    pub duration: f64,
}

impl ThresholdEntry {
    pub fn new(spell: SpellId, duration: f64) -> Self {
        Self { spell, duration }
    }
}

/// One phase of a multiphase ability.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpellPhase {
    /// Seconds after the cast time at which this phase executes.
    pub delay: f64,
}

/// Area shape of a telegraph. Containment tests belong to the world.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TelegraphShape {
    Circle { radius: f32 },
    Ring { inner: f32, outer: f32 },
    Cone { radius: f32, angle: f32 },
    Rectangle { width: f32, length: f32 },
}

/// Telegraph attached to an ability, positioned relative to the caster.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TelegraphDefinition {
    pub id: u32,
    pub shape: TelegraphShape,
    /// Offset from the caster in the caster's local frame.
    pub offset: Vector3,
    /// Yaw added to the caster's facing.
    pub yaw_offset: f32,
    /// Phases in which this telegraph selects targets (multiphase only).
    pub phase_mask: u32,
}

impl TelegraphDefinition {
    pub fn new(id: u32, shape: TelegraphShape) -> Self {
        Self {
            id,
            shape,
            offset: Vector3::ZERO,
            yaw_offset: 0.0,
            phase_mask: 0,
        }
    }
}

// ============================================================================
// Effects
// ============================================================================

/// One effect of an ability.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpellEffect {
    pub id: u32,
    pub effect_type: SpellEffectType,
    /// Roles a resolved target must hold (any of) to receive this effect.
    pub target_flags: SpellTargetFlags,
    /// Seconds the effect lasts; zero for instant effects.
    pub duration: f64,
    /// Client-side delay in seconds reported in the cast-go notification.
    pub delay: f64,
    pub phase_mask: u32,
    pub flags: SpellEffectFlags,
    pub caster_apply_prerequisite: Option<PrerequisiteId>,
    /// Checked when the target is the caster.
    pub caster_prerequisite: Option<PrerequisiteId>,
    /// Checked for every other target.
    pub target_prerequisite: Option<PrerequisiteId>,
    /// Handler-specific parameters.
    pub parameters: [u32; 4],
}

impl SpellEffect {
    pub fn new(id: u32, effect_type: SpellEffectType, target_flags: SpellTargetFlags) -> Self {
        Self {
            id,
            effect_type,
            target_flags,
            duration: 0.0,
            delay: 0.0,
            phase_mask: 0,
            flags: SpellEffectFlags::empty(),
            caster_apply_prerequisite: None,
            caster_prerequisite: None,
            target_prerequisite: None,
            parameters: [0; 4],
        }
    }

    pub fn with_duration(mut self, seconds: f64) -> Self {
        self.duration = seconds;
        self
    }

    pub fn with_flags(mut self, flags: SpellEffectFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_phase_mask(mut self, mask: u32) -> Self {
        self.phase_mask = mask;
        self
    }

    pub fn with_parameters(mut self, parameters: [u32; 4]) -> Self {
        self.parameters = parameters;
        self
    }
}

/// Returns true if `mask` admits `phase`.
///
/// Outside multiphase casts every mask passes. A mask of zero or all-ones does
/// not restrict, and neither does [`SpellConfig::NO_PHASE`].
pub fn phase_allows(mask: u32, phase: u8, multiphase: bool) -> bool {
    if !multiphase || mask == 0 || mask == u32::MAX || phase == SpellConfig::NO_PHASE {
        return true;
    }
    phase < 32 && mask & (1 << phase) != 0
}
