//! Per-cast configuration.

use crate::state::EntityId;

use super::definition::SpellDefinition;

/// Immutable configuration of one cast.
///
/// `root_spell` and `parent_spell` default to `spell` and only differ for
/// threshold children, where they point at the chain's root ability and at the
/// ability that spawned the child. They are plain borrows of catalog data; a
/// child never reaches its parent cast through them.
#[derive(Clone, Copy, Debug)]
pub struct CastConfig<'a> {
    pub spell: &'a SpellDefinition,
    pub root_spell: &'a SpellDefinition,
    pub parent_spell: &'a SpellDefinition,
    pub primary_target: Option<EntityId>,
    pub user_initiated: bool,
    pub is_proxy: bool,
    /// Position of this cast in its threshold chain; zero for a chain root or
    /// any non-threshold cast.
    pub threshold_order: u8,
    /// Replaces the definition's cooldown when set.
    pub cooldown_override: Option<f64>,
    /// Set by the effect pipeline; the cast never completes on its own.
    pub force_cancel_only: bool,
}

impl<'a> CastConfig<'a> {
    /// Creates a user-initiated, non-proxy configuration for `spell`.
    pub fn new(spell: &'a SpellDefinition) -> Self {
        Self {
            spell,
            root_spell: spell,
            parent_spell: spell,
            primary_target: None,
            user_initiated: true,
            is_proxy: false,
            threshold_order: 0,
            cooldown_override: None,
            force_cancel_only: false,
        }
    }

    /// Configuration for a proxy cast spawned by an effect.
    pub fn proxy(spell: &'a SpellDefinition, primary_target: Option<EntityId>) -> Self {
        Self {
            primary_target,
            user_initiated: false,
            is_proxy: true,
            ..Self::new(spell)
        }
    }

    pub fn with_primary_target(mut self, target: EntityId) -> Self {
        self.primary_target = Some(target);
        self
    }

    pub fn with_user_initiated(mut self, user_initiated: bool) -> Self {
        self.user_initiated = user_initiated;
        self
    }

    pub fn with_cooldown_override(mut self, seconds: f64) -> Self {
        self.cooldown_override = Some(seconds);
        self
    }

    /// Cooldown applied for this cast's ability.
    pub fn cooldown(&self) -> f64 {
        self.cooldown_override.unwrap_or(self.spell.cooldown)
    }

    /// Number of threshold steps this cast may consume.
    ///
    /// Threshold children never chain further.
    pub fn threshold_max(&self) -> u8 {
        if self.threshold_order > 0 {
            0
        } else {
            self.spell.threshold_count()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spell::ThresholdEntry;
    use crate::state::SpellId;

    #[test]
    fn root_and_parent_default_to_spell() {
        let spell = SpellDefinition::new(SpellId(3));
        let config = CastConfig::new(&spell);
        assert!(std::ptr::eq(config.root_spell, &spell));
        assert!(std::ptr::eq(config.parent_spell, &spell));
    }

    #[test]
    fn cooldown_override_wins() {
        let spell = SpellDefinition::new(SpellId(3)).with_cooldown(8.0);
        assert_eq!(CastConfig::new(&spell).cooldown(), 8.0);
        assert_eq!(CastConfig::new(&spell).with_cooldown_override(2.0).cooldown(), 2.0);
    }

    #[test]
    fn threshold_children_have_no_capacity() {
        let spell = SpellDefinition::new(SpellId(3))
            .with_threshold(ThresholdEntry::new(SpellId(4), 0.0));
        let mut config = CastConfig::new(&spell);
        assert_eq!(config.threshold_max(), 1);
        config.threshold_order = 1;
        assert_eq!(config.threshold_max(), 0);
    }

    #[test]
    fn proxy_is_not_user_initiated() {
        let spell = SpellDefinition::new(SpellId(3));
        let config = CastConfig::proxy(&spell, None);
        assert!(config.is_proxy);
        assert!(!config.user_initiated);
    }
}
