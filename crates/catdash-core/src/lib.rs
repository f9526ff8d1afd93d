pub mod config;
pub mod entity;
pub mod events;
pub mod level;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers {
    use crate::config::SimConfig;
    use crate::level::{LevelDef, MonsterDef, RectDef};

    /// Ground platform top edge used by [`flat_level`].
    pub const FLOOR_Y: f32 = 300.0;

    /// One long floor at `FLOOR_Y` and a finish line far out of reach.
    pub fn flat_level() -> LevelDef {
        LevelDef {
            name: "flat".to_string(),
            platforms: vec![RectDef::new(0.0, FLOOR_Y, 5000.0, 20.0)],
            monsters: Vec::new(),
            coins: Vec::new(),
            meats: Vec::new(),
            wings: Vec::new(),
            finish_line: RectDef::new(4900.0, FLOOR_Y - 100.0, 40.0, 100.0),
        }
    }

    /// `flat_level` with a stationary monster at world `x`, resting on the floor.
    pub fn level_with_monster(x: f32) -> LevelDef {
        let mut level = flat_level();
        level
            .monsters
            .push(MonsterDef::stationary(x, FLOOR_Y - 30.0, 30.0, 30.0));
        level
    }

    /// Default config with a viewport of the given size.
    pub fn config_with_viewport(width: f32, height: f32) -> SimConfig {
        let mut cfg = SimConfig::default();
        cfg.viewport.width = width;
        cfg.viewport.height = height;
        cfg
    }

    /// Default config with short timer windows so real-time tests stay fast.
    pub fn fast_timer_config(damage_ms: u64, flight_ms: u64) -> SimConfig {
        let mut cfg = SimConfig::default();
        cfg.timing.damage_invincibility_ms = damage_ms;
        cfg.timing.flight_duration_ms = flight_ms;
        cfg
    }
}
