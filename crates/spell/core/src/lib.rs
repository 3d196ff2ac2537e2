//! Server-authoritative ability casting.
//!
//! `spell-core` runs the lifecycle of one ability cast: validation, cast-time
//! scheduling, target resolution, the effect pipeline, threshold chains
//! (rapid-tap and charge-and-release), effect-spawned proxy casts and
//! cancellation. Everything outside the cast itself (units, cooldowns,
//! resources, spell data, clients) is reached through the traits in [`env`],
//! bundled into a [`SpellEnv`] that each cast borrows.
//!
//! A cast is driven by its owner: [`Spell::cast`] starts it, [`Spell::update`]
//! advances it, [`Spell::cancel_cast`] interrupts it. [`SpellCaster`] does
//! this bookkeeping for one entity.
pub mod caster;
pub mod config;
pub mod env;
pub mod error;
pub mod spell;
pub mod state;

pub use caster::SpellCaster;
pub use config::SpellConfig;
pub use env::{
    CooldownGateway, CostGateway, NotificationSink, PrerequisiteOracle, SpellCatalog, SpellEnv,
    UnitKind, UnitSnapshot, WorldGateway,
};
pub use error::{CastOperation, CoreError, EffectError, ErrorSeverity, SpellError};
pub use spell::{
    CastConfig, CastMethod, CastResult, EffectContext, EffectHandler, EffectHandlerRegistry,
    Proxy, ProxyCastRequest, Spell, SpellDefinition, SpellEffect, SpellEffectFlags,
    SpellEffectType, SpellFlags, SpellNotification, SpellStatus, SpellTargetFlags,
    TelegraphDefinition, TelegraphShape, ThresholdEntry,
};
pub use state::{CastingId, EffectInstanceId, EntityId, PrerequisiteId, SpellId, SpellIds, Vector3};
