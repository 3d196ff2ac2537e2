//! Shared harness for the integration suites.
#![allow(dead_code)]

use std::sync::{Arc, Mutex, Once};

use spell_core::env::memory::{
    MemoryCatalog, MemoryCooldowns, MemoryCosts, MemoryPrerequisites, MemoryWorld, RecordingSink,
};
use spell_core::{
    CastMethod, EffectContext, EffectError, EffectHandler, EffectHandlerRegistry, EntityId,
    SpellCatalog, SpellConfig, SpellDefinition, SpellEffect, SpellEffectFlags, SpellEffectType,
    SpellEnv, SpellId, SpellIds, SpellTargetFlags, ThresholdEntry, UnitKind, Vector3,
};

pub const PLAYER: EntityId = EntityId(1);
pub const NPC: EntityId = EntityId(2);
pub const ENEMY: EntityId = EntityId(3);
pub const BYSTANDER: EntityId = EntityId(4);

pub fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

// ============================================================================
// Test Handlers
// ============================================================================

/// (effect id, target) of every successful application.
pub type Applications = Arc<Mutex<Vec<(u32, EntityId)>>>;

/// Records every application and succeeds.
#[derive(Clone, Default)]
pub struct RecordingHandler {
    pub applied: Applications,
}

impl EffectHandler for RecordingHandler {
    fn apply(&self, ctx: &mut EffectContext<'_>) -> Result<(), EffectError> {
        self.applied
            .lock()
            .expect("applications lock")
            .push((ctx.effect.id, ctx.target));
        Ok(())
    }
}

/// Always fails.
pub struct FailingHandler;

impl EffectHandler for FailingHandler {
    fn apply(&self, ctx: &mut EffectContext<'_>) -> Result<(), EffectError> {
        Err(EffectError::Failed(format!("effect {} refused", ctx.effect.id)))
    }
}

// ============================================================================
// Harness
// ============================================================================

/// In-memory world with a player, an NPC, an enemy and a bystander.
///
/// Effect handlers: `Damage` and `ApplyBuff` record into [`Harness::applied`],
/// `Fluff` always fails, `Proxy` is the built-in handler. Every other effect
/// type has no handler.
pub struct Harness {
    pub config: SpellConfig,
    pub ids: SpellIds,
    pub prerequisites: MemoryPrerequisites,
    pub cooldowns: MemoryCooldowns,
    pub costs: MemoryCosts,
    pub world: MemoryWorld,
    pub catalog: MemoryCatalog,
    pub handlers: EffectHandlerRegistry,
    pub sink: RecordingSink,
    pub applied: Applications,
}

impl Harness {
    pub fn new(catalog: MemoryCatalog) -> Self {
        init_tracing();

        let recorder = RecordingHandler::default();
        let applied = Arc::clone(&recorder.applied);
        let handlers = EffectHandlerRegistry::with_defaults()
            .with(SpellEffectType::Damage, recorder.clone())
            .with(SpellEffectType::ApplyBuff, recorder)
            .with(SpellEffectType::Fluff, FailingHandler);

        let world = MemoryWorld::new();
        world.spawn_at(PLAYER, UnitKind::Player, Vector3::ZERO);
        world.spawn_at(NPC, UnitKind::Npc, Vector3::new(0.0, 0.0, 20.0));
        world.spawn_at(ENEMY, UnitKind::Npc, Vector3::new(3.0, 0.0, 0.0));
        world.spawn_at(BYSTANDER, UnitKind::Npc, Vector3::new(50.0, 0.0, 0.0));

        Self {
            config: SpellConfig::default(),
            ids: SpellIds::new(),
            prerequisites: MemoryPrerequisites::new(),
            cooldowns: MemoryCooldowns::new(),
            costs: MemoryCosts::new(),
            world,
            catalog,
            handlers,
            sink: RecordingSink::new(),
            applied,
        }
    }

    pub fn env(&self) -> SpellEnv<'_> {
        SpellEnv::new(
            &self.config,
            &self.ids,
            &self.prerequisites,
            &self.cooldowns,
            &self.costs,
            &self.world,
            &self.catalog,
            &self.handlers,
            &self.sink,
        )
    }

    pub fn spell(&self, id: u32) -> &SpellDefinition {
        self.catalog.spell(SpellId(id)).expect("spell in catalog")
    }

    pub fn applied(&self) -> Vec<(u32, EntityId)> {
        self.applied.lock().expect("applications lock").clone()
    }
}

// ============================================================================
// Data Builders
// ============================================================================

pub fn damage(id: u32, targets: SpellTargetFlags) -> SpellEffect {
    SpellEffect::new(id, SpellEffectType::Damage, targets)
}

pub fn buff(id: u32, targets: SpellTargetFlags, seconds: f64) -> SpellEffect {
    SpellEffect::new(id, SpellEffectType::ApplyBuff, targets).with_duration(seconds)
}

pub fn cancel_only(id: u32) -> SpellEffect {
    SpellEffect::new(id, SpellEffectType::ApplyBuff, SpellTargetFlags::CASTER)
        .with_flags(SpellEffectFlags::CANCEL_ONLY)
}

/// Instant single-target strike.
pub fn strike(id: u32) -> SpellDefinition {
    SpellDefinition::new(SpellId(id)).with_effect(damage(1, SpellTargetFlags::TARGET))
}

/// Threshold root with one tier per child spell.
pub fn chain(id: u32, method: CastMethod, children: &[(u32, f64)]) -> SpellDefinition {
    children.iter().fold(
        SpellDefinition::new(SpellId(id)).with_cast_method(method),
        |spell, &(child, duration)| spell.with_threshold(ThresholdEntry::new(SpellId(child), duration)),
    )
}
