use serde::{Deserialize, Serialize};

use crate::config::PlayerConfig;

/// Appearance key used when a definition does not name one.
pub const DEFAULT_APPEARANCE: &str = "default";

/// Axis-aligned rectangle. `y` grows downward.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }

    /// The same rectangle shifted from world space into screen space.
    pub fn to_screen(&self, scroll_offset: f32) -> Rect {
        Rect {
            x: self.x - scroll_offset,
            ..*self
        }
    }

    /// Strict AABB overlap. Touching edges do not count.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.right() > other.x
            && self.x < other.right()
            && self.bottom() > other.y
            && self.y < other.bottom()
    }

    /// Strict point containment. Points on an edge are outside.
    pub fn contains_point(&self, x: f32, y: f32) -> bool {
        x > self.x && x < self.right() && y > self.y && y < self.bottom()
    }
}

/// Category tag for level entities. Rendering and collision dispatch on this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Platform,
    Monster,
    Coin,
    Meat,
    Wing,
    FinishLine,
}

impl EntityKind {
    pub fn is_collectible(self) -> bool {
        matches!(self, EntityKind::Coin | EntityKind::Meat | EntityKind::Wing)
    }
}

/// Back-and-forth horizontal movement for a monster.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Patrol {
    /// Left edge of the patrol span in world space.
    pub origin_x: f32,
    pub range: f32,
    /// Signed step per tick; the sign flips at either edge.
    pub speed: f32,
}

/// A level entity: geometry plus a category tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub kind: EntityKind,
    pub rect: Rect,
    pub appearance: String,
    /// Only meaningful for collectibles.
    pub consumed: bool,
    pub patrol: Option<Patrol>,
}

impl Entity {
    pub fn new(kind: EntityKind, rect: Rect) -> Self {
        Self {
            kind,
            rect,
            appearance: DEFAULT_APPEARANCE.to_string(),
            consumed: false,
            patrol: None,
        }
    }

    pub fn with_appearance(mut self, appearance: impl Into<String>) -> Self {
        self.appearance = appearance.into();
        self
    }

    pub fn with_patrol(mut self, patrol: Patrol) -> Self {
        self.patrol = Some(patrol);
        self
    }

    /// Mark a collectible as consumed. Returns `true` only on the first call.
    pub fn consume(&mut self) -> bool {
        if self.consumed {
            return false;
        }
        self.consumed = true;
        true
    }

    /// Shift horizontally by `dx` world units.
    pub fn move_by(&mut self, dx: f32) {
        self.rect.x += dx;
    }

    /// Advance one patrol step, reversing at the edges of the span.
    pub fn step_patrol(&mut self) {
        let Some(mut patrol) = self.patrol else {
            return;
        };
        if patrol.speed == 0.0 || patrol.range <= 0.0 {
            return;
        }
        self.move_by(patrol.speed);
        let max_x = patrol.origin_x + patrol.range;
        if self.rect.x >= max_x {
            self.rect.x = max_x;
            patrol.speed = -patrol.speed.abs();
        } else if self.rect.x <= patrol.origin_x {
            self.rect.x = patrol.origin_x;
            patrol.speed = patrol.speed.abs();
        }
        self.patrol = Some(patrol);
    }
}

/// The player record. `x` is screen space, `y` is world space (there is no
/// vertical scrolling, so the two coincide vertically).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub dy: f32,
    pub on_ground: bool,
    pub facing_right: bool,
    pub lives: i32,
    pub coin: u32,
    pub is_invincible: bool,
    pub has_wings: bool,
    /// Damage-invincibility window in milliseconds.
    pub invincible_time_ms: u64,
    pub appearance: String,
}

impl Player {
    /// Fresh player built from configuration. Called on every (re)start.
    pub fn spawn(config: &PlayerConfig, invincible_time_ms: u64) -> Self {
        Self {
            x: config.spawn_x,
            y: config.spawn_y,
            width: config.width,
            height: config.height,
            dy: 0.0,
            on_ground: false,
            facing_right: config.facing_right,
            lives: config.lives,
            coin: 0,
            is_invincible: false,
            has_wings: false,
            invincible_time_ms,
            appearance: config.appearance.clone(),
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn is_alive(&self) -> bool {
        self.lives > 0
    }
}

/// A fired projectile in screen space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    pub x: f32,
    pub y: f32,
    /// `true` travels right, `false` travels left.
    pub forward: bool,
}
