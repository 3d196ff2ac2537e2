//! World and visibility gateway.

use crate::spell::Telegraph;
use crate::state::{EntityId, Vector3};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum UnitKind {
    Player,
    Npc,
}

/// Point-in-time view of a unit.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UnitSnapshot {
    pub id: EntityId,
    pub kind: UnitKind,
    pub position: Vector3,
    pub yaw: f32,
    pub alive: bool,
}

impl UnitSnapshot {
    #[inline]
    pub fn is_player(&self) -> bool {
        self.kind == UnitKind::Player
    }
}

/// Entity resolution and spatial queries.
pub trait WorldGateway: Send + Sync {
    fn unit(&self, id: EntityId) -> Option<UnitSnapshot>;

    /// Whether `viewer` currently sees `target`.
    fn is_visible(&self, viewer: EntityId, target: EntityId) -> bool;

    /// Whether `id` is already casting something.
    fn is_casting(&self, id: EntityId) -> bool;

    /// Units within `radius` of `center`, in the world's enumeration order.
    fn units_in_radius(&self, center: Vector3, radius: f32) -> Vec<EntityId>;

    /// Units inside the anchored telegraph shape.
    fn units_in_telegraph(&self, telegraph: &Telegraph<'_>) -> Vec<EntityId>;
}
