//! Telegraph anchoring.
//!
//! A [`Telegraph`] is a [`TelegraphDefinition`] placed in the world relative to
//! a caster. Which units are inside it is the world's business
//! ([`WorldGateway::units_in_telegraph`](crate::env::WorldGateway::units_in_telegraph)).

use crate::state::Vector3;

use super::definition::{TelegraphDefinition, TelegraphShape};
use super::notification::TelegraphPosition;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Telegraph<'a> {
    pub definition: &'a TelegraphDefinition,
    pub position: Vector3,
    pub yaw: f32,
}

impl<'a> Telegraph<'a> {
    /// Anchors `definition` to a caster standing at `position` facing `yaw`.
    pub fn anchored(definition: &'a TelegraphDefinition, position: Vector3, yaw: f32) -> Self {
        Self {
            definition,
            position: position + definition.offset.rotate_yaw(yaw),
            yaw: yaw + definition.yaw_offset,
        }
    }

    #[inline]
    pub fn id(&self) -> u32 {
        self.definition.id
    }

    #[inline]
    pub fn shape(&self) -> TelegraphShape {
        self.definition.shape
    }

    #[inline]
    pub fn phase_mask(&self) -> u32 {
        self.definition.phase_mask
    }

    pub fn report(&self) -> TelegraphPosition {
        TelegraphPosition {
            telegraph_id: self.id(),
            position: self.position,
            yaw: self.yaw,
        }
    }
}

/// Anchors every telegraph of an ability to the caster's current transform.
pub fn anchor_all<'a>(
    definitions: &'a [TelegraphDefinition],
    position: Vector3,
    yaw: f32,
) -> Vec<Telegraph<'a>> {
    definitions
        .iter()
        .map(|definition| Telegraph::anchored(definition, position, yaw))
        .collect()
}
