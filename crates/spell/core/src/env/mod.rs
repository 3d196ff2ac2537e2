//! Collaborators consumed by the spell core.
//!
//! Everything a cast needs from the outside world goes through the narrow
//! traits in this module. [`SpellEnv`] bundles them, together with the id
//! generators and configuration, into one explicit context object that is
//! handed to each cast at construction.
//!
//! All traits take `&self` and are `Send + Sync`: stores that mutate
//! (cooldowns, charges) serialise per owning entity on their own side.
mod catalog;
mod cooldowns;
mod costs;
pub mod memory;
mod notify;
mod prerequisites;
mod world;

pub use catalog::SpellCatalog;
pub use cooldowns::CooldownGateway;
pub use costs::CostGateway;
pub use notify::NotificationSink;
pub use prerequisites::PrerequisiteOracle;
pub use world::{UnitKind, UnitSnapshot, WorldGateway};

use crate::config::SpellConfig;
use crate::spell::EffectHandlerRegistry;
use crate::state::SpellIds;

/// Context passed to every cast.
#[derive(Clone, Copy)]
pub struct SpellEnv<'a> {
    pub config: &'a SpellConfig,
    pub ids: &'a SpellIds,
    pub prerequisites: &'a dyn PrerequisiteOracle,
    pub cooldowns: &'a dyn CooldownGateway,
    pub costs: &'a dyn CostGateway,
    pub world: &'a dyn WorldGateway,
    pub catalog: &'a dyn SpellCatalog,
    pub handlers: &'a EffectHandlerRegistry,
    pub notifications: &'a dyn NotificationSink,
}

impl<'a> SpellEnv<'a> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: &'a SpellConfig,
        ids: &'a SpellIds,
        prerequisites: &'a dyn PrerequisiteOracle,
        cooldowns: &'a dyn CooldownGateway,
        costs: &'a dyn CostGateway,
        world: &'a dyn WorldGateway,
        catalog: &'a dyn SpellCatalog,
        handlers: &'a EffectHandlerRegistry,
        notifications: &'a dyn NotificationSink,
    ) -> Self {
        Self {
            config,
            ids,
            prerequisites,
            cooldowns,
            costs,
            world,
            catalog,
            handlers,
            notifications,
        }
    }
}

impl core::fmt::Debug for SpellEnv<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SpellEnv")
            .field("config", self.config)
            .field("ids", self.ids)
            .finish_non_exhaustive()
    }
}
