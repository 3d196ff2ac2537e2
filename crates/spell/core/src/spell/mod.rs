//! Spell domain - cast lifecycle, targeting and effects.
//!
//! # Module Structure
//!
//! - `types`: Status, cast method, effect type and flag sets
//! - `result`: Cast result codes
//! - `definition`: Immutable ability data (effects, telegraphs, thresholds, phases)
//! - `parameters`: Per-cast configuration
//! - `cast`: The [`Spell`] state machine, cast-method handlers and threshold chains
//! - `event`: Per-cast delayed event queue
//! - `target`: Target resolver
//! - `telegraph`: Anchored telegraph instances
//! - `effect`: Effect handler registry and pipeline
//! - `proxy`: Effect-spawned secondary casts
//! - `notification`: Notifications published to the owning entity

mod cast;
pub mod definition;
pub mod effect;
pub mod event;
pub mod notification;
pub mod parameters;
pub mod proxy;
pub mod result;
pub mod target;
pub mod telegraph;
pub mod types;

pub use cast::Spell;
pub use definition::{
    GlobalCooldown, SpellCost, SpellDefinition, SpellEffect, SpellPhase, TelegraphDefinition,
    TelegraphShape, ThresholdEntry, phase_allows,
};
pub use effect::{EffectContext, EffectHandler, EffectHandlerRegistry};
pub use event::{ProxyCastRequest, SpellEvent, SpellEventAction, SpellEventManager};
pub use notification::{
    CastGo, CastStart, DamageDescription, EffectReport, InitialPosition, SpellNotification,
    TargetReport, TelegraphPosition,
};
pub use parameters::CastConfig;
pub use proxy::{Proxy, ProxyHandler};
pub use result::CastResult;
pub use target::{SpellTargetEffectInfo, SpellTargetInfo, TargetResolver};
pub use telegraph::{Telegraph, anchor_all};
pub use types::{
    CastMethod, SpellEffectFlags, SpellEffectType, SpellFlags, SpellStatus, SpellTargetFlags,
};
