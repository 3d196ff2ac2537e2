//! Ability definition lookup.

use crate::spell::SpellDefinition;
use crate::state::SpellId;

/// Read-only access to loaded ability definitions.
///
/// Definitions are borrowed for as long as the catalog lives, so casts built
/// from them can hold plain references to their root and parent abilities.
pub trait SpellCatalog: Send + Sync {
    fn spell(&self, id: SpellId) -> Option<&SpellDefinition>;
}
