use serde::{Deserialize, Serialize};

/// Downward acceleration applied per tick while airborne.
pub const GRAVITY: f32 = 0.4;
/// Vertical velocity set by a jump (negative is up).
pub const JUMP_STRENGTH: f32 = -11.0;
/// Fall speed ceiling, only enforced when `clamp_fall_speed` is on.
pub const MAX_FALL_SPEED: f32 = 10.0;
/// Horizontal distance covered per tick while a direction key is held.
pub const HORIZONTAL_STEP: f32 = 5.0;
/// Vertical distance covered per tick in flight mode.
pub const FLIGHT_STEP: f32 = 5.0;
/// Damage-invincibility window after losing a life.
pub const DAMAGE_INVINCIBILITY_MS: u64 = 1500;
/// Flight (and its invincibility) window after picking up a wing.
pub const FLIGHT_DURATION_MS: u64 = 5000;
/// Projectile travel per tick.
pub const PROJECTILE_STEP: f32 = 10.0;
/// Projectiles further than this from the player are dropped.
pub const PROJECTILE_RANGE: f32 = 500.0;
/// Minimum real time between two projectile spawns.
pub const ATTACK_COOLDOWN_MS: u64 = 100;

/// Errors raised by [`SimConfig::validate`].
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
    Parse(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Invalid { field, reason } => write!(f, "invalid config `{field}`: {reason}"),
            Self::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    pub gravity: f32,
    pub jump_strength: f32,
    pub max_fall_speed: f32,
    /// Off by default: the fall speed ceiling exists but was never applied.
    pub clamp_fall_speed: bool,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: GRAVITY,
            jump_strength: JUMP_STRENGTH,
            max_fall_speed: MAX_FALL_SPEED,
            clamp_fall_speed: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    pub horizontal_step: f32,
    pub flight_step: f32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            horizontal_step: HORIZONTAL_STEP,
            flight_step: FLIGHT_STEP,
        }
    }
}

/// Initial player record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub spawn_x: f32,
    pub spawn_y: f32,
    pub width: f32,
    pub height: f32,
    pub lives: i32,
    pub facing_right: bool,
    pub appearance: String,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            spawn_x: 50.0,
            spawn_y: 200.0,
            width: 30.0,
            height: 30.0,
            lives: 3,
            facing_right: true,
            appearance: crate::entity::DEFAULT_APPEARANCE.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub damage_invincibility_ms: u64,
    pub flight_duration_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            damage_invincibility_ms: DAMAGE_INVINCIBILITY_MS,
            flight_duration_ms: FLIGHT_DURATION_MS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectileConfig {
    pub step: f32,
    pub range: f32,
    pub cooldown_ms: u64,
}

impl Default for ProjectileConfig {
    fn default() -> Self {
        Self {
            step: PROJECTILE_STEP,
            range: PROJECTILE_RANGE,
            cooldown_ms: ATTACK_COOLDOWN_MS,
        }
    }
}

/// Size of the drawing surface the camera scrolls over.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 400.0,
        }
    }
}

/// Key codes mapped to simulation actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    pub left: String,
    pub right: String,
    pub up: String,
    pub down: String,
    pub jump: String,
    pub attack: String,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            left: "ArrowLeft".to_string(),
            right: "ArrowRight".to_string(),
            up: "ArrowUp".to_string(),
            down: "ArrowDown".to_string(),
            jump: "c".to_string(),
            attack: "x".to_string(),
        }
    }
}

/// Top-level simulation configuration, loadable from TOML.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub physics: PhysicsConfig,
    pub movement: MovementConfig,
    pub player: PlayerConfig,
    pub timing: TimingConfig,
    pub projectile: ProjectileConfig,
    pub viewport: Viewport,
    pub keys: KeyBindings,
}

impl SimConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str::<SimConfig>(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Reject values that would make the simulation degenerate. NaN fails every check.
    #[allow(clippy::neg_cmp_op_on_partial_ord)]
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn invalid(field: &'static str, reason: &'static str) -> Result<(), ConfigError> {
            Err(ConfigError::Invalid { field, reason })
        }

        if !(self.viewport.width > 0.0) {
            return invalid("viewport.width", "must be > 0");
        }
        if !(self.viewport.height > 0.0) {
            return invalid("viewport.height", "must be > 0");
        }
        if !(self.physics.gravity > 0.0) {
            return invalid("physics.gravity", "must be > 0");
        }
        if !(self.physics.jump_strength < 0.0) {
            return invalid("physics.jump_strength", "must be negative (upward)");
        }
        if self.physics.clamp_fall_speed && !(self.physics.max_fall_speed > 0.0) {
            return invalid("physics.max_fall_speed", "must be > 0 when clamping");
        }
        if !(self.movement.horizontal_step > 0.0) {
            return invalid("movement.horizontal_step", "must be > 0");
        }
        if !(self.movement.flight_step > 0.0) {
            return invalid("movement.flight_step", "must be > 0");
        }
        if !(self.player.width > 0.0 && self.player.height > 0.0) {
            return invalid("player", "width and height must be > 0");
        }
        if self.player.lives <= 0 {
            return invalid("player.lives", "must be > 0");
        }
        if self.timing.damage_invincibility_ms == 0 {
            return invalid("timing.damage_invincibility_ms", "must be > 0");
        }
        if self.timing.flight_duration_ms == 0 {
            return invalid("timing.flight_duration_ms", "must be > 0");
        }
        if !(self.projectile.step > 0.0) {
            return invalid("projectile.step", "must be > 0");
        }
        if !(self.projectile.range > 0.0) {
            return invalid("projectile.range", "must be > 0");
        }
        Ok(())
    }
}
