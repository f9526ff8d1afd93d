use catdash_core::config::PhysicsConfig;
use catdash_core::entity::Player;

/// Integrate one tick of gravity. Grounded or flying players are left alone.
pub fn apply_gravity(player: &mut Player, physics: &PhysicsConfig) {
    if player.on_ground || player.has_wings {
        return;
    }
    player.dy += physics.gravity;
    if physics.clamp_fall_speed && player.dy > physics.max_fall_speed {
        player.dy = physics.max_fall_speed;
    }
    player.y += player.dy;
}

/// Start a jump if the player is grounded and not flying. Returns whether it jumped.
pub fn try_jump(player: &mut Player, physics: &PhysicsConfig) -> bool {
    if !player.on_ground || player.has_wings {
        return false;
    }
    player.dy = physics.jump_strength;
    player.on_ground = false;
    true
}
