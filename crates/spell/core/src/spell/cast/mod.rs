//! The cast state machine.
//!
//! A [`Spell`] is one in-flight cast of an ability by one caster. The owning
//! entity creates it, calls [`Spell::cast`] once to start it (and again to
//! continue a waiting threshold chain), ticks it with [`Spell::update`], and
//! drops it once [`Spell::is_finished`] or [`Spell::is_failed`] report a
//! terminal status.
//!
//! Everything time-based is driven by the cast's own event queue; nothing
//! here reads a clock.

mod check;
mod method;
mod threshold;

use std::collections::HashMap;

use crate::config::SpellConfig;
use crate::env::{SpellEnv, UnitSnapshot};
use crate::error::{CastOperation, SpellError};
use crate::state::{CastingId, EntityId, SpellId, Vector3};

use super::effect::EffectPass;
use super::event::{ProxyCastRequest, SpellEventAction, SpellEventManager};
use super::notification::{CastGo, CastStart, InitialPosition, SpellNotification};
use super::parameters::CastConfig;
use super::proxy::{self, Proxy};
use super::result::CastResult;
use super::target::{SpellTargetInfo, TargetResolver};
use super::telegraph::{Telegraph, anchor_all};
use super::types::{CastMethod, SpellStatus, SpellTargetFlags};

use check::CheckMode;

/// One cast of one ability.
pub struct Spell<'a> {
    env: SpellEnv<'a>,
    caster: EntityId,
    config: CastConfig<'a>,
    cast_id: CastingId,
    status: SpellStatus,

    current_phase: u8,
    hold_duration: f64,
    threshold_value: u8,
    threshold_max: u8,
    duration: f64,

    targets: Vec<SpellTargetInfo>,
    telegraphs: Vec<Telegraph<'a>>,
    proxies: Vec<Proxy>,
    children: Vec<Spell<'a>>,
    trigger_counts: HashMap<u32, u32>,
    events: SpellEventManager<SpellEventAction>,
    proxy_requests: Vec<ProxyCastRequest>,
}

impl<'a> Spell<'a> {
    /// Creates a cast in `Initiating`. Nothing is checked or published yet.
    pub fn new(env: SpellEnv<'a>, caster: EntityId, config: CastConfig<'a>) -> Self {
        Self {
            env,
            caster,
            cast_id: env.ids.next_casting_id(),
            status: SpellStatus::Initiating,
            current_phase: SpellConfig::NO_PHASE,
            hold_duration: 0.0,
            threshold_value: 0,
            threshold_max: config.threshold_max(),
            duration: 0.0,
            targets: Vec::new(),
            telegraphs: Vec::new(),
            proxies: Vec::new(),
            children: Vec::new(),
            trigger_counts: HashMap::new(),
            events: SpellEventManager::new(),
            proxy_requests: Vec::new(),
            config,
        }
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn cast_id(&self) -> CastingId {
        self.cast_id
    }

    pub fn caster(&self) -> EntityId {
        self.caster
    }

    pub fn spell_id(&self) -> SpellId {
        self.config.spell.id
    }

    pub fn cast_method(&self) -> CastMethod {
        self.config.spell.cast_method
    }

    pub fn config(&self) -> &CastConfig<'a> {
        &self.config
    }

    pub fn status(&self) -> SpellStatus {
        self.status
    }

    pub fn is_finished(&self) -> bool {
        self.status == SpellStatus::Finished
    }

    pub fn is_failed(&self) -> bool {
        self.status == SpellStatus::Failed
    }

    pub fn is_waiting(&self) -> bool {
        self.status == SpellStatus::Waiting
    }

    /// Whether the cast is actively casting for its method.
    ///
    /// Proxies never report casting. Non-player casters report casting from
    /// the moment the cast exists, so they cannot be double-booked before
    /// their first `cast()`.
    pub fn is_casting(&self) -> bool {
        use SpellStatus::*;

        if self.config.is_proxy {
            return false;
        }
        if self.status == Initiating {
            return self
                .env
                .world
                .unit(self.caster)
                .is_some_and(|unit| !unit.is_player());
        }
        match self.cast_method() {
            CastMethod::ChargeRelease => matches!(self.status, Casting | Executing | Waiting),
            CastMethod::Channeled | CastMethod::ChanneledField | CastMethod::Multiphase => {
                matches!(self.status, Casting | Executing)
            }
            _ => self.status == Casting,
        }
    }

    /// Whether the chain can still spawn a step or a child is still alive.
    pub fn has_threshold_to_cast(&self) -> bool {
        self.threshold_value < self.threshold_max
            || self.children.iter().any(|child| !child.status.is_terminal())
    }

    pub fn threshold_value(&self) -> u8 {
        self.threshold_value
    }

    pub fn threshold_max(&self) -> u8 {
        self.threshold_max
    }

    /// Seconds a charge-and-release cast has been held while waiting.
    pub fn hold_duration(&self) -> f64 {
        self.hold_duration
    }

    /// Longest effect duration scheduled by the last execute pass.
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Phase of the last execute pass, [`SpellConfig::NO_PHASE`] outside multiphase casts.
    pub fn current_phase(&self) -> u8 {
        self.current_phase
    }

    pub fn targets(&self) -> &[SpellTargetInfo] {
        &self.targets
    }

    pub fn telegraphs(&self) -> &[Telegraph<'a>] {
        &self.telegraphs
    }

    pub fn children(&self) -> &[Spell<'a>] {
        &self.children
    }

    /// Successful applications of `effect_id` over the cast's lifetime.
    pub fn effect_trigger_count(&self, effect_id: u32) -> u32 {
        self.trigger_counts.get(&effect_id).copied().unwrap_or(0)
    }

    pub fn has_pending_event(&self) -> bool {
        self.events.has_pending_event()
    }

    // ========================================================================
    // Driving Surface
    // ========================================================================

    /// Starts the cast, or continues a waiting threshold chain.
    ///
    /// Domain failures come back as a [`CastResult`] code; only contract and
    /// data-integrity failures are errors.
    pub fn cast(&mut self) -> Result<CastResult, SpellError> {
        match self.status {
            SpellStatus::Initiating => Ok(self.initiate()),
            SpellStatus::Waiting => self.handle_threshold_cast(),
            status => Err(SpellError::InvalidState {
                operation: CastOperation::Cast,
                status,
            }),
        }
    }

    /// Advances the cast by `dt` seconds.
    pub fn update(&mut self, dt: f64) {
        if self.status == SpellStatus::Initiating || self.status.is_terminal() {
            return;
        }

        self.check_persistence();

        for action in self.events.update(dt) {
            self.handle_event(action);
        }

        if self.status == SpellStatus::Executing && self.has_threshold_to_cast() {
            self.set_status(SpellStatus::Waiting);
        }

        if self.status == SpellStatus::Waiting && self.cast_method() == CastMethod::ChargeRelease {
            self.hold(dt);
        }

        for child in &mut self.children {
            child.update(dt);
            self.proxy_requests.append(&mut child.proxy_requests);
        }
        self.children.retain(|child| !child.status.is_terminal());

        if self.can_complete() {
            self.complete();
        }
    }

    /// Cancels the cast, or the actively casting threshold child.
    pub fn cancel_cast(&mut self, reason: CastResult) {
        if !self.is_casting() && !self.has_threshold_to_cast() {
            return;
        }
        if matches!(self.status, SpellStatus::Initiating | SpellStatus::Finishing)
            || self.status.is_terminal()
        {
            return;
        }

        if let Some(child) = self.children.iter_mut().find(|child| child.is_casting()) {
            tracing::debug!(
                target: "spell::threshold",
                cast_id = %self.cast_id,
                child = %child.cast_id,
                %reason,
                "cancel delegated to threshold child"
            );
            child.cancel_cast(reason);
            return;
        }

        tracing::debug!(
            target: "spell::cast",
            cast_id = %self.cast_id,
            spell = %self.spell_id(),
            %reason,
            "cast cancelled"
        );
        self.publish(SpellNotification::CancelNotice {
            cast_id: self.cast_id,
            result: reason,
            cancelled: true,
        });

        if reason == CastResult::CasterMovement
            && let Some(global) = self.config.spell.global_cooldown
        {
            self.env
                .cooldowns
                .set_global_cooldown(self.caster, global.bucket, 0.0);
        }

        for action in self.events.cancel_events() {
            if let SpellEventAction::EffectExpired { targets, .. } = action {
                self.send_buff_removal(&targets);
            }
        }

        self.set_status(SpellStatus::Finishing);
    }

    /// Ends the cast at the next update, closing any open threshold steps.
    pub fn finish(&mut self) {
        if matches!(self.status, SpellStatus::Initiating | SpellStatus::Finishing)
            || self.status.is_terminal()
        {
            return;
        }
        self.threshold_value = self.threshold_max;
        self.set_status(SpellStatus::Finishing);
    }

    /// Takes the proxy casts this cast (and its children) want started.
    pub fn drain_proxy_casts(&mut self) -> Vec<ProxyCastRequest> {
        let mut requests = std::mem::take(&mut self.proxy_requests);
        for child in &mut self.children {
            requests.append(&mut child.drain_proxy_casts());
        }
        requests
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    fn initiate(&mut self) -> CastResult {
        let caster = match self.validate(CheckMode::Initial) {
            Ok(caster) => caster,
            Err(result) => {
                tracing::debug!(
                    target: "spell::cast",
                    cast_id = %self.cast_id,
                    spell = %self.spell_id(),
                    %result,
                    "cast rejected"
                );
                if !self.config.is_proxy {
                    self.publish(SpellNotification::CastResult {
                        spell_id: self.spell_id(),
                        result,
                    });
                }
                self.set_status(SpellStatus::Failed);
                return result;
            }
        };

        if !self.config.is_proxy {
            self.pay_costs();
        }

        if !caster.is_player() {
            let spell = self.config.spell;
            self.telegraphs = anchor_all(&spell.telegraphs, caster.position, caster.yaw);
        }

        self.send_cast_start(&caster);
        if self.config.threshold_order > 0 {
            self.publish(SpellNotification::ThresholdStart {
                spell_id: self.spell_id(),
                root_spell_id: self.config.root_spell.id,
                parent_spell_id: self.config.parent_spell.id,
                cast_id: self.cast_id,
            });
        }

        tracing::debug!(
            target: "spell::cast",
            cast_id = %self.cast_id,
            spell = %self.spell_id(),
            caster = %self.caster,
            method = ?self.cast_method(),
            "cast started"
        );
        self.set_status(SpellStatus::Casting);
        self.start_cast_method();
        CastResult::Ok
    }

    fn pay_costs(&self) {
        let spell = self.config.spell;
        if spell.uses_charges {
            self.env.costs.consume_charge(self.caster, spell.id);
        }
        if !self.runner_override() {
            self.env.costs.consume(self.caster, &spell.costs);
        }
        if self.config.user_initiated
            && let Some(global) = spell.global_cooldown
        {
            self.env
                .cooldowns
                .set_global_cooldown(self.caster, global.bucket, global.duration);
        }
        if self.threshold_max == 0 {
            self.apply_cooldown();
        }
    }

    /// Sets the ability cooldown and every group cooldown it belongs to.
    fn apply_cooldown(&self) {
        let seconds = self.config.cooldown();
        if seconds <= 0.0 {
            return;
        }
        let cooldowns = self.env.cooldowns;
        cooldowns.set_spell_cooldown(self.caster, self.spell_id(), seconds);
        for &group in &self.config.spell.cooldown_groups {
            cooldowns.set_group_cooldown(self.caster, group, seconds);
        }
    }

    /// Runs one execute pass: targets, effects, proxies, then `CastGo`.
    fn execute(&mut self) {
        if !matches!(
            self.status,
            SpellStatus::Casting | SpellStatus::Executing | SpellStatus::Waiting
        ) {
            return;
        }
        self.set_status(SpellStatus::Executing);

        let resolver = TargetResolver {
            env: self.env,
            caster: self.caster,
            spell: self.config.spell,
            primary_target: self.config.primary_target,
            phase: self.current_phase,
        };
        self.targets = resolver.resolve(&mut self.telegraphs);

        let outcome = EffectPass {
            env: self.env,
            cast_id: self.cast_id,
            caster: self.caster,
            spell: self.config.spell,
            phase: self.current_phase,
            targets: &mut self.targets,
            proxies: &mut self.proxies,
            trigger_counts: &mut self.trigger_counts,
            events: &mut self.events,
        }
        .run();
        self.duration = outcome.duration;
        if outcome.force_cancel_only {
            self.config.force_cancel_only = true;
        }

        proxy::handle_proxies(
            &mut self.proxies,
            &self.env,
            self.caster,
            &mut self.events,
            &mut self.proxy_requests,
        );

        self.send_cast_go();
    }

    fn handle_event(&mut self, action: SpellEventAction) {
        match action {
            SpellEventAction::Execute => self.execute(),
            SpellEventAction::ExecutePhase(phase) => {
                if !matches!(self.status, SpellStatus::Finishing) && !self.status.is_terminal() {
                    self.current_phase = phase;
                    self.execute();
                }
            }
            SpellEventAction::Finish => self.finish(),
            SpellEventAction::EffectExpired { targets, .. } => self.send_buff_removal(&targets),
            SpellEventAction::CastProxy(request) => self.proxy_requests.push(request),
        }
    }

    /// Cancels a player's cast whose caster stopped meeting the persistence
    /// prerequisite mid-cast.
    fn check_persistence(&mut self) {
        if self.status != SpellStatus::Casting {
            return;
        }
        let Some(prerequisite) = self.config.spell.caster_persistence_prerequisite else {
            return;
        };
        let is_player = self
            .env
            .world
            .unit(self.caster)
            .is_some_and(|unit| unit.is_player());
        if is_player && !self.env.prerequisites.meets(self.caster, prerequisite) {
            self.cancel_cast(CastResult::PrerequisiteCasterPersistence);
        }
    }

    fn can_complete(&self) -> bool {
        match self.status {
            SpellStatus::Executing => {
                !self.events.has_pending_event()
                    && !self.config.force_cancel_only
                    && self.children.is_empty()
            }
            SpellStatus::Waiting => !self.has_threshold_to_cast(),
            SpellStatus::Finishing => self.children.is_empty(),
            _ => false,
        }
    }

    fn complete(&mut self) {
        for action in self.events.cancel_events() {
            if let SpellEventAction::EffectExpired { targets, .. } = action {
                self.send_buff_removal(&targets);
            }
        }
        self.set_status(SpellStatus::Finished);
        self.publish(SpellNotification::CastFinish {
            cast_id: self.cast_id,
        });

        let is_player = self
            .env
            .world
            .unit(self.caster)
            .is_some_and(|unit| unit.is_player());
        if self.threshold_max > 0 && is_player {
            self.publish(SpellNotification::ThresholdClear {
                spell_id: self.spell_id(),
            });
            if self.cast_method() != CastMethod::ChargeRelease && !self.config.is_proxy {
                self.apply_cooldown();
            }
        }

        tracing::debug!(
            target: "spell::cast",
            cast_id = %self.cast_id,
            spell = %self.spell_id(),
            "cast finished"
        );
    }

    fn set_status(&mut self, next: SpellStatus) {
        let valid = self.status.can_transition_to(next);
        if !valid {
            tracing::error!(
                target: "spell::cast",
                cast_id = %self.cast_id,
                from = %self.status,
                to = %next,
                "invalid status transition"
            );
        }
        debug_assert!(valid, "invalid status transition {} -> {}", self.status, next);
        tracing::trace!(
            target: "spell::cast",
            cast_id = %self.cast_id,
            from = %self.status,
            to = %next,
            "status"
        );
        self.status = next;
    }

    // ========================================================================
    // Notifications
    // ========================================================================

    fn publish(&self, notification: SpellNotification) {
        self.env.notifications.publish(notification);
    }

    fn send_cast_start(&self, caster: &UnitSnapshot) {
        let mut initial_positions = vec![InitialPosition {
            unit: caster.id,
            position: caster.position,
            yaw: caster.yaw,
        }];
        if let Some(target) = self.config.primary_target
            && target != caster.id
            && let Some(unit) = self.env.world.unit(target)
        {
            initial_positions.push(InitialPosition {
                unit: unit.id,
                position: unit.position,
                yaw: unit.yaw,
            });
        }

        let telegraph_positions = if self.telegraphs.is_empty() {
            anchor_all(&self.config.spell.telegraphs, caster.position, caster.yaw)
                .iter()
                .map(Telegraph::report)
                .collect()
        } else {
            self.telegraphs.iter().map(Telegraph::report).collect()
        };

        self.publish(SpellNotification::CastStart(CastStart {
            cast_id: self.cast_id,
            caster: self.caster,
            primary_target: self.config.primary_target,
            spell_id: self.spell_id(),
            root_spell_id: self.config.root_spell.id,
            parent_spell_id: self.config.parent_spell.id,
            caster_position: caster.position,
            caster_yaw: caster.yaw,
            user_initiated: self.config.user_initiated,
            initial_positions,
            telegraph_positions,
        }));
    }

    fn send_cast_go(&self) {
        let world = self.env.world;
        let primary_position = self
            .targets
            .iter()
            .find(|target| target.flags.contains(SpellTargetFlags::TARGET))
            .and_then(|target| world.unit(target.entity))
            .or_else(|| world.unit(self.caster))
            .map_or(Vector3::ZERO, |unit| unit.position);

        self.publish(SpellNotification::CastGo(CastGo {
            cast_id: self.cast_id,
            primary_position,
            phase: self.current_phase,
            targets: self.targets.iter().map(SpellTargetInfo::report).collect(),
        }));
    }

    /// Buff removal for one expired (or cancelled) effect.
    fn send_buff_removal(&self, targets: &[EntityId]) {
        match targets {
            [] => {}
            [only] if *only == self.caster => self.publish(SpellNotification::BuffRemove {
                cast_id: self.cast_id,
                caster: self.caster,
            }),
            _ => self.publish(SpellNotification::BuffRemoveMulti {
                cast_id: self.cast_id,
                targets: targets.to_vec(),
            }),
        }
    }
}

impl core::fmt::Debug for Spell<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Spell")
            .field("cast_id", &self.cast_id)
            .field("spell", &self.spell_id())
            .field("caster", &self.caster)
            .field("status", &self.status)
            .field("threshold_value", &self.threshold_value)
            .field("threshold_max", &self.threshold_max)
            .field("children", &self.children.len())
            .finish_non_exhaustive()
    }
}
