use serde::{Deserialize, Serialize};

use catdash_core::config::{MovementConfig, Viewport};
use catdash_core::entity::Player;

use crate::input::InputSnapshot;

/// Horizontal scroll state. World x maps to screen x by subtracting `scroll_offset`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub scroll_offset: f32,
}

impl Camera {
    pub fn to_screen_x(&self, world_x: f32) -> f32 {
        world_x - self.scroll_offset
    }

    pub fn to_world_x(&self, screen_x: f32) -> f32 {
        screen_x + self.scroll_offset
    }

    /// Step the player right. Once past the middle of the viewport the excess
    /// goes into the scroll offset and the player stays on the center line.
    pub fn move_right(&mut self, player: &mut Player, step: f32, viewport: &Viewport) {
        if player.x + player.width >= viewport.width {
            return;
        }
        player.x += step;
        player.facing_right = true;

        let center = viewport.width / 2.0;
        if player.x > center {
            self.scroll_offset += player.x - center;
            player.x = center;
        }
    }

    /// Step the player left. Never scrolls back; stops at the left screen edge.
    pub fn move_left(&self, player: &mut Player, step: f32) {
        if player.x <= 0.0 {
            return;
        }
        player.x = (player.x - step).max(0.0);
        player.facing_right = false;
    }

    pub fn reset(&mut self) {
        self.scroll_offset = 0.0;
    }
}

/// Direct vertical movement while flying, kept inside the viewport.
pub fn fly(player: &mut Player, input: &InputSnapshot, step: f32, viewport: &Viewport) {
    if !player.has_wings {
        return;
    }
    if input.up && player.y > 0.0 {
        player.y = (player.y - step).max(0.0);
    }
    if input.down && player.y + player.height < viewport.height {
        player.y = (player.y + step).min(viewport.height - player.height);
    }
}

/// Apply held direction keys for one tick: horizontal walk plus flight.
pub fn apply_movement(
    camera: &mut Camera,
    player: &mut Player,
    input: &InputSnapshot,
    movement: &MovementConfig,
    viewport: &Viewport,
) {
    if input.right {
        camera.move_right(player, movement.horizontal_step, viewport);
    }
    if input.left {
        camera.move_left(player, movement.horizontal_step);
    }
    fly(player, input, movement.flight_step, viewport);
}
