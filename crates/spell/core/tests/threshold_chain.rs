mod common;

use common::*;
use proptest::prelude::*;
use spell_core::env::memory::MemoryCatalog;
use spell_core::spell::SpellCost;
use spell_core::{
    CastConfig, CastMethod, CastResult, CooldownGateway, PrerequisiteId, Spell, SpellError,
    SpellId, SpellNotification, SpellStatus, SpellTargetFlags,
};

fn threshold_updates(h: &Harness) -> Vec<(SpellId, u8)> {
    h.sink
        .published()
        .into_iter()
        .filter_map(|n| match n {
            SpellNotification::ThresholdUpdate { spell_id, value } => Some((spell_id, value)),
            _ => None,
        })
        .collect()
}

fn rapid_tap_harness() -> Harness {
    Harness::new(
        MemoryCatalog::new()
            .with(chain(10, CastMethod::RapidTap, &[(11, 0.0), (12, 0.0)]).with_cooldown(4.0))
            .with(strike(11))
            .with(strike(12)),
    )
}

// ============================================================================
// Rapid tap
// ============================================================================

#[test]
fn rapid_tap_spawns_one_child_per_tap_and_saturates() {
    let h = rapid_tap_harness();
    let mut root = Spell::new(h.env(), PLAYER, CastConfig::new(h.spell(10)).with_primary_target(ENEMY));

    assert_eq!(root.cast(), Ok(CastResult::Ok));
    assert_eq!(root.threshold_max(), 2);
    root.update(0.1);
    assert_eq!(root.status(), SpellStatus::Waiting);
    assert_eq!(root.threshold_value(), 0);

    assert_eq!(root.cast(), Ok(CastResult::Ok));
    assert_eq!(root.threshold_value(), 1);
    assert_eq!(root.children().len(), 1);
    assert_eq!(root.children()[0].spell_id(), SpellId(11));
    assert_eq!(root.children()[0].config().threshold_order, 1);
    assert_eq!(root.status(), SpellStatus::Waiting);

    assert_eq!(root.cast(), Ok(CastResult::Ok));
    assert_eq!(root.threshold_value(), 2);
    assert_eq!(root.threshold_value(), root.threshold_max());
    assert_eq!(root.children().len(), 2);
    assert_eq!(root.children()[1].spell_id(), SpellId(12));
    assert_eq!(root.children()[1].config().threshold_order, 2);
    assert_eq!(root.cast(), Ok(CastResult::SpellAlreadyCasting));

    root.update(0.1);
    assert!(root.is_finished());
    assert_eq!(h.sink.count("ThresholdStart"), 2);
    assert_eq!(threshold_updates(&h), vec![(SpellId(10), 1), (SpellId(10), 2)]);
    assert_eq!(h.sink.count("ThresholdClear"), 1);
    assert_eq!(h.cooldowns.spell_cooldown(PLAYER, SpellId(10)), 4.0);
}

#[test]
fn threshold_child_reports_its_chain() {
    let h = rapid_tap_harness();
    let mut root = Spell::new(h.env(), PLAYER, CastConfig::new(h.spell(10)));
    root.cast().unwrap();
    root.update(0.1);
    root.cast().unwrap();

    let child = &root.children()[0];
    assert!(h.sink.published().contains(&SpellNotification::ThresholdStart {
        spell_id: SpellId(11),
        root_spell_id: SpellId(10),
        parent_spell_id: SpellId(10),
        cast_id: child.cast_id(),
    }));
    assert_eq!(child.threshold_max(), 0);
    assert!(!child.config().is_proxy);
}

#[test]
fn root_cooldown_waits_for_chain_to_finish() {
    let h = rapid_tap_harness();
    let mut root = Spell::new(h.env(), PLAYER, CastConfig::new(h.spell(10)));
    root.cast().unwrap();
    assert_eq!(h.cooldowns.spell_cooldown(PLAYER, SpellId(10)), 0.0);

    root.update(0.1);
    root.finish();
    root.update(0.1);
    assert!(root.is_finished());
    assert_eq!(h.cooldowns.spell_cooldown(PLAYER, SpellId(10)), 4.0);
}

#[test]
fn tap_while_child_casting_is_refused() {
    let h = Harness::new(
        MemoryCatalog::new()
            .with(chain(30, CastMethod::RapidTap, &[(31, 0.0), (32, 0.0)]))
            .with(strike(31).with_cast_time(2.0))
            .with(strike(32)),
    );
    let mut root = Spell::new(h.env(), PLAYER, CastConfig::new(h.spell(30)));
    root.cast().unwrap();
    root.update(0.1);
    root.cast().unwrap();
    root.update(0.1);
    assert_eq!(root.status(), SpellStatus::Waiting);
    assert!(root.children()[0].is_casting());

    assert_eq!(root.cast(), Ok(CastResult::SpellAlreadyCasting));
    assert_eq!(root.children().len(), 1);
    assert_eq!(root.threshold_value(), 1);
}

#[test]
fn cancel_reaches_casting_child_first() {
    let h = Harness::new(
        MemoryCatalog::new()
            .with(chain(30, CastMethod::RapidTap, &[(31, 0.0), (32, 0.0)]))
            .with(strike(31).with_cast_time(2.0))
            .with(strike(32)),
    );
    let mut root = Spell::new(h.env(), PLAYER, CastConfig::new(h.spell(30)));
    root.cast().unwrap();
    root.update(0.1);
    root.cast().unwrap();
    let child_id = root.children()[0].cast_id();

    root.cancel_cast(CastResult::SpellCancelled);
    assert_eq!(root.children()[0].status(), SpellStatus::Finishing);
    assert!(!root.status().is_terminal());
    assert_eq!(
        h.sink.published().last(),
        Some(&SpellNotification::CancelNotice {
            cast_id: child_id,
            result: CastResult::SpellCancelled,
            cancelled: true,
        })
    );

    root.update(0.1);
    assert!(root.children().is_empty());
    assert_eq!(root.status(), SpellStatus::Waiting);

    root.cancel_cast(CastResult::SpellCancelled);
    assert_eq!(root.status(), SpellStatus::Finishing);
    root.update(0.1);
    assert!(root.is_finished());
    assert_eq!(h.sink.count("CancelNotice"), 2);
}

#[test]
fn failed_tap_check_ends_rapid_tap_chain() {
    let mut root = chain(10, CastMethod::RapidTap, &[(11, 0.0), (12, 0.0)]);
    root.costs = vec![SpellCost {
        resource: 1,
        amount: 10.0,
    }];
    let h = Harness::new(MemoryCatalog::new().with(root).with(strike(11)).with(strike(12)));
    h.costs.set_resource(PLAYER, 1, 15.0);

    let mut root = Spell::new(h.env(), PLAYER, CastConfig::new(h.spell(10)));
    root.cast().unwrap();
    root.update(0.1);

    assert_eq!(root.cast(), Ok(CastResult::InsufficientResources));
    assert!(root.children().is_empty());
    assert_eq!(root.threshold_value(), root.threshold_max());
    assert!(h.sink.published().contains(&SpellNotification::CastResult {
        spell_id: SpellId(10),
        result: CastResult::InsufficientResources,
    }));

    root.update(0.1);
    assert!(root.is_finished());
}

#[test]
fn caster_cast_prerequisite_failure_does_not_end_chain() {
    let mut root = chain(10, CastMethod::RapidTap, &[(11, 0.0), (12, 0.0)]);
    root.caster_cast_prerequisite = Some(PrerequisiteId(5));
    let h = Harness::new(MemoryCatalog::new().with(root).with(strike(11)).with(strike(12)));
    h.prerequisites.grant(PLAYER, PrerequisiteId(5));

    let mut root = Spell::new(h.env(), PLAYER, CastConfig::new(h.spell(10)));
    root.cast().unwrap();
    root.update(0.1);
    h.prerequisites.revoke(PLAYER, PrerequisiteId(5));

    assert_eq!(root.cast(), Ok(CastResult::Ok));
    assert_eq!(root.threshold_value(), 1);
    assert_eq!(root.children().len(), 1);
}

#[test]
fn missing_threshold_spell_aborts_chain() {
    let h = Harness::new(MemoryCatalog::new().with(chain(40, CastMethod::RapidTap, &[(99, 0.0)])));
    let mut root = Spell::new(h.env(), PLAYER, CastConfig::new(h.spell(40)));
    root.cast().unwrap();
    root.update(0.1);

    assert_eq!(root.cast(), Err(SpellError::UnknownSpell(SpellId(99))));
    assert_eq!(root.status(), SpellStatus::Finishing);
    root.update(0.1);
    assert!(root.is_finished());
}

#[test]
fn npc_chain_does_not_clear_threshold_ui() {
    let h = rapid_tap_harness();
    let mut root = Spell::new(h.env(), NPC, CastConfig::new(h.spell(10)));
    root.cast().unwrap();
    root.update(0.1);
    root.finish();
    root.update(0.1);

    assert!(root.is_finished());
    assert_eq!(h.sink.count("ThresholdClear"), 0);
}

// ============================================================================
// Charge and release
// ============================================================================

fn charge_harness() -> Harness {
    Harness::new(
        MemoryCatalog::new()
            .with(chain(20, CastMethod::ChargeRelease, &[(21, 0.5), (22, 0.5)]).with_cooldown(6.0))
            .with(strike(21))
            .with(strike(22)),
    )
}

#[test]
fn charge_release_auto_fires_once_at_max_hold() {
    let h = charge_harness();
    let mut root = Spell::new(h.env(), PLAYER, CastConfig::new(h.spell(20)).with_primary_target(ENEMY));
    root.cast().unwrap();
    assert!(root.is_casting());

    root.update(0.25);
    assert_eq!(root.status(), SpellStatus::Waiting);
    assert!(root.is_casting());
    root.update(0.25);
    assert_eq!(threshold_updates(&h), vec![(SpellId(20), 1)]);

    root.update(0.5);
    assert_eq!(h.sink.count("ThresholdStart"), 1);
    assert_eq!(root.threshold_value(), root.threshold_max());
    assert!(h.applied().contains(&(1, ENEMY)));
    assert_eq!(threshold_updates(&h), vec![(SpellId(20), 1), (SpellId(20), 2)]);

    for _ in 0..4 {
        root.update(0.5);
    }
    assert!(root.is_finished());
    assert_eq!(h.sink.count("ThresholdStart"), 1);
    assert_eq!(h.cooldowns.spell_cooldown(PLAYER, SpellId(20)), 6.0);
}

#[test]
fn charge_release_casts_tier_reached_on_release() {
    let h = charge_harness();
    let mut root = Spell::new(h.env(), PLAYER, CastConfig::new(h.spell(20)));
    root.cast().unwrap();
    root.update(0.1);
    root.update(0.5);
    assert!((root.hold_duration() - 0.6).abs() < 1e-9);

    assert_eq!(root.cast(), Ok(CastResult::Ok));
    let child = &root.children()[0];
    assert_eq!(child.spell_id(), SpellId(22));
    assert_eq!(child.config().threshold_order, 2);
    assert!(child.config().is_proxy);
    assert_eq!(root.threshold_value(), root.threshold_max());
    assert_eq!(h.cooldowns.spell_cooldown(PLAYER, SpellId(20)), 6.0);
}

#[test]
fn early_release_casts_first_tier() {
    let h = charge_harness();
    let mut root = Spell::new(h.env(), PLAYER, CastConfig::new(h.spell(20)));
    root.cast().unwrap();
    root.update(0.1);

    root.cast().unwrap();
    assert_eq!(root.children()[0].spell_id(), SpellId(21));
}

#[test]
fn cancel_while_holding_ends_charge() {
    let h = charge_harness();
    let mut root = Spell::new(h.env(), PLAYER, CastConfig::new(h.spell(20)));
    root.cast().unwrap();
    root.update(0.1);

    root.cancel_cast(CastResult::SpellCancelled);
    assert_eq!(root.status(), SpellStatus::Finishing);
    root.update(0.1);
    assert!(root.is_finished());
    assert_eq!(h.sink.count("ThresholdStart"), 0);
}

// ============================================================================
// Properties
// ============================================================================

#[derive(Clone, Debug)]
enum Op {
    Cast,
    Update(f64),
    Cancel,
    Finish,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => Just(Op::Cast),
        4 => (0.0f64..1.0).prop_map(Op::Update),
        1 => Just(Op::Cancel),
        1 => Just(Op::Finish),
    ]
}

fn drive(spell: &mut Spell<'_>, op: &Op) {
    match *op {
        Op::Cast => {
            let _ = spell.cast();
        }
        Op::Update(dt) => spell.update(dt),
        Op::Cancel => spell.cancel_cast(CastResult::SpellCancelled),
        Op::Finish => spell.finish(),
    }
}

proptest! {
    #[test]
    fn threshold_value_is_monotonic_and_bounded(
        method in prop_oneof![Just(CastMethod::RapidTap), Just(CastMethod::ChargeRelease)],
        ops in prop::collection::vec(op(), 1..40),
    ) {
        let h = Harness::new(
            MemoryCatalog::new()
                .with(chain(10, method, &[(11, 0.3), (12, 0.3), (13, 0.3)]))
                .with(strike(11))
                .with(strike(12).with_cast_time(0.5))
                .with(strike(13)),
        );
        let mut root = Spell::new(h.env(), PLAYER, CastConfig::new(h.spell(10)).with_primary_target(ENEMY));

        let mut previous = root.threshold_value();
        for op in &ops {
            drive(&mut root, op);
            let value = root.threshold_value();
            prop_assert!(value >= previous);
            prop_assert!(value <= root.threshold_max());
            prop_assert!(root.children().iter().filter(|c| c.is_casting()).count() <= 1);
            previous = value;
        }
    }

    #[test]
    fn casts_without_thresholds_never_wait(
        cast_time in 0.0f64..2.0,
        buff_seconds in 0.0f64..3.0,
        ops in prop::collection::vec(op(), 1..30),
    ) {
        let h = Harness::new(
            MemoryCatalog::new().with(
                strike(10)
                    .with_cast_time(cast_time)
                    .with_effect(buff(2, SpellTargetFlags::CASTER, buff_seconds)),
            ),
        );
        let mut spell = Spell::new(h.env(), PLAYER, CastConfig::new(h.spell(10)).with_primary_target(ENEMY));

        for op in &ops {
            drive(&mut spell, op);
            prop_assert!(!spell.has_threshold_to_cast());
            prop_assert_ne!(spell.status(), SpellStatus::Waiting);
        }
    }
}
