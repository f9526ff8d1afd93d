use serde::{Deserialize, Serialize};

use catdash_core::entity::{EntityKind, Projectile, Rect};
use catdash_core::events::RunPhase;

/// What a renderer needs to draw the player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerView {
    pub rect: Rect,
    pub facing_right: bool,
    pub lives: i32,
    pub coin: u32,
    pub invincible: bool,
    pub flying: bool,
    pub appearance: String,
}

/// A drawable level entity, already in screen space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityView {
    pub kind: EntityKind,
    pub rect: Rect,
    pub appearance: String,
}

/// Read-only post-tick view handed to the render sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderSnapshot {
    pub tick: u64,
    pub phase: RunPhase,
    pub scroll_offset: f32,
    pub player: PlayerView,
    /// Platforms, monsters, unconsumed collectibles, and the finish line.
    pub entities: Vec<EntityView>,
    pub projectiles: Vec<Projectile>,
}

impl RenderSnapshot {
    /// MessagePack encoding for an out-of-process renderer.
    pub fn encode(&self) -> Result<Vec<u8>, rmp_serde::encode::Error> {
        rmp_serde::to_vec(self)
    }

    pub fn decode(data: &[u8]) -> Result<Self, rmp_serde::decode::Error> {
        rmp_serde::from_slice(data)
    }

    pub fn count(&self, kind: EntityKind) -> usize {
        self.entities.iter().filter(|e| e.kind == kind).count()
    }
}
