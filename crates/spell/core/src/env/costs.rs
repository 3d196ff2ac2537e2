//! Charge and resource gateway.

use crate::spell::SpellCost;
use crate::state::{EntityId, SpellId};

/// Access to the caster's ability record (charges) and resource pools.
pub trait CostGateway: Send + Sync {
    /// Charges left for `spell`, or `None` if the caster tracks none.
    fn remaining_charges(&self, caster: EntityId, spell: SpellId) -> Option<u32>;
    fn consume_charge(&self, caster: EntityId, spell: SpellId);

    fn can_afford(&self, caster: EntityId, costs: &[SpellCost]) -> bool;
    fn consume(&self, caster: EntityId, costs: &[SpellCost]);
}
