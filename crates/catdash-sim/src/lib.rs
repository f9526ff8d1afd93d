pub mod camera;
pub mod collision;
pub mod input;
pub mod physics;
pub mod projectile;
pub mod snapshot;
pub mod timers;

use std::time::Duration;

use catdash_core::config::SimConfig;
use catdash_core::entity::{Entity, EntityKind, Player, Projectile};
use catdash_core::events::{DestroyCause, RunOutcome, RunPhase, SimEvent};
use catdash_core::level::{LevelDef, World};

use camera::{Camera, apply_movement};
use collision::Resolver;
use input::InputState;
use projectile::Launcher;
use snapshot::{EntityView, PlayerView, RenderSnapshot};
use timers::{Damage, Expiry, StatusTimers};

/// One run of the platformer: player, world, camera, projectiles, and timers.
///
/// Time is always passed in by the caller as a [`Duration`] since run start, so
/// the simulation itself never reads a clock.
pub struct Simulation {
    config: SimConfig,
    level: LevelDef,
    player: Player,
    world: World,
    camera: Camera,
    projectiles: Vec<Projectile>,
    launcher: Launcher,
    timers: StatusTimers,
    input: InputState,
    phase: RunPhase,
    outcome: Option<RunOutcome>,
    tick: u64,
}

impl Simulation {
    pub fn new(config: SimConfig, level: LevelDef) -> Self {
        let player = spawn_player(&config);
        let world = level.instantiate();
        let input = InputState::new(config.keys.clone());
        Self {
            config,
            level,
            player,
            world,
            camera: Camera::default(),
            projectiles: Vec::new(),
            launcher: Launcher::default(),
            timers: StatusTimers::new(),
            input,
            phase: RunPhase::Running,
            outcome: None,
            tick: 0,
        }
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn projectiles(&self) -> &[Projectile] {
        &self.projectiles
    }

    pub fn scroll_offset(&self) -> f32 {
        self.camera.scroll_offset
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    pub fn outcome(&self) -> Option<RunOutcome> {
        self.outcome
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    pub fn epoch(&self) -> u64 {
        self.timers.epoch()
    }

    pub fn pending_expiry(&self) -> Option<Expiry> {
        self.timers.pending()
    }

    /// Deadline of the pending status expiry, as time since run start.
    pub fn next_timer_due(&self) -> Option<Duration> {
        self.timers.next_due()
    }

    pub fn key_down(&mut self, code: &str) {
        if self.phase.is_terminal() {
            tracing::debug!(code, "Ignoring key after run ended");
            return;
        }
        self.input.on_key_down(code);
    }

    pub fn key_up(&mut self, code: &str) {
        if self.phase.is_terminal() {
            return;
        }
        self.input.on_key_up(code);
    }

    /// Advance one frame. A no-op once the run has ended.
    pub fn tick(&mut self, now: Duration) -> Vec<SimEvent> {
        if self.phase.is_terminal() {
            return Vec::new();
        }
        self.tick += 1;
        let mut events = Vec::new();
        let input = self.input.snapshot();

        for monster in &mut self.world.monsters {
            monster.step_patrol();
        }

        apply_movement(
            &mut self.camera,
            &mut self.player,
            &input,
            &self.config.movement,
            &self.config.viewport,
        );
        if input.jump && physics::try_jump(&mut self.player, &self.config.physics) {
            events.push(SimEvent::Jumped);
        }
        physics::apply_gravity(&mut self.player, &self.config.physics);

        let outcome = Resolver {
            player: &mut self.player,
            world: &mut self.world,
            timers: &mut self.timers,
            config: &self.config,
            scroll_offset: self.camera.scroll_offset,
            now,
        }
        .run(&mut events);
        if let Some(outcome) = outcome {
            self.end_run(outcome, &mut events);
            return events;
        }

        events.extend(self.timers.fire_due(&mut self.player, now));
        self.step_projectiles(input.attack, now, &mut events);
        events
    }

    fn step_projectiles(&mut self, attack: bool, now: Duration, events: &mut Vec<SimEvent>) {
        if attack
            && self.launcher.try_fire(
                &self.player,
                now,
                &self.config.projectile,
                &mut self.projectiles,
            )
        {
            events.push(SimEvent::ProjectileFired);
        }
        projectile::advance(
            &mut self.projectiles,
            self.player.x,
            &self.config.projectile,
        );
        let destroyed = projectile::resolve_hits(
            &mut self.projectiles,
            &mut self.world.monsters,
            self.camera.scroll_offset,
        );
        for _ in 0..destroyed {
            events.push(SimEvent::MonsterDestroyed {
                cause: DestroyCause::Projectile,
            });
        }
    }

    fn end_run(&mut self, outcome: RunOutcome, events: &mut Vec<SimEvent>) {
        if self.outcome.is_some() {
            return;
        }
        self.phase = match outcome {
            RunOutcome::Success => RunPhase::Cleared,
            RunOutcome::Failure => RunPhase::GameOver,
        };
        self.outcome = Some(outcome);
        self.input.clear();
        tracing::info!(
            ?outcome,
            tick = self.tick,
            lives = self.player.lives,
            coin = self.player.coin,
            "Run ended"
        );
        events.push(SimEvent::RunEnded(outcome));
    }

    /// Deliver whatever expiry is due at `now`. Used by a scheduler that wakes
    /// up between frames.
    pub fn fire_due_timers(&mut self, now: Duration) -> Vec<SimEvent> {
        if self.phase.is_terminal() {
            return Vec::new();
        }
        self.timers.fire_due(&mut self.player, now)
    }

    /// Deliver a specific scheduled expiry. Stale or superseded expiries are no-ops.
    pub fn fire_timer(&mut self, expiry: Expiry) -> Vec<SimEvent> {
        if self.phase.is_terminal() {
            return Vec::new();
        }
        self.timers.fire(&mut self.player, expiry)
    }

    /// Apply one point of damage outside the collision pass.
    pub fn decrease_lives(&mut self, now: Duration) -> Vec<SimEvent> {
        let mut events = Vec::new();
        if self.phase.is_terminal() {
            return events;
        }
        match self.timers.decrease_lives(&mut self.player, now) {
            Damage::Ignored => {},
            Damage::LifeLost { lives } => events.push(SimEvent::LifeLost { lives }),
            Damage::GameOver => {
                events.push(SimEvent::LifeLost {
                    lives: self.player.lives,
                });
                self.end_run(RunOutcome::Failure, &mut events);
            },
        }
        events
    }

    pub fn trigger_invincibility(
        &mut self,
        now: Duration,
        duration: Duration,
        from_flight: bool,
    ) -> Option<Expiry> {
        if self.phase.is_terminal() {
            return None;
        }
        Some(
            self.timers
                .trigger_invincibility(&mut self.player, now, duration, from_flight),
        )
    }

    /// Reset to a fresh run. Callable at any time; pending expiries from the
    /// previous run become inert.
    pub fn restart(&mut self) {
        self.timers.cancel_all();
        self.player = spawn_player(&self.config);
        self.world = self.level.instantiate();
        self.camera.reset();
        self.projectiles.clear();
        self.launcher.reset();
        self.input.clear();
        self.phase = RunPhase::Running;
        self.outcome = None;
        self.tick = 0;
        tracing::info!(
            level = %self.level.name,
            epoch = self.timers.epoch(),
            "Run restarted"
        );
    }

    pub fn snapshot(&self) -> RenderSnapshot {
        let scroll = self.camera.scroll_offset;
        let view = |e: &Entity| EntityView {
            kind: e.kind,
            rect: e.rect.to_screen(scroll),
            appearance: e.appearance.clone(),
        };
        let entities = self
            .world
            .platforms
            .iter()
            .chain(&self.world.monsters)
            .chain(self.world.collectibles.iter().filter(|c| !c.consumed))
            .chain(std::iter::once(&self.world.finish_line))
            .map(view)
            .collect();

        RenderSnapshot {
            tick: self.tick,
            phase: self.phase,
            scroll_offset: scroll,
            player: PlayerView {
                rect: self.player.rect(),
                facing_right: self.player.facing_right,
                lives: self.player.lives,
                coin: self.player.coin,
                invincible: self.player.is_invincible,
                flying: self.player.has_wings,
                appearance: self.player.appearance.clone(),
            },
            entities,
            projectiles: self.projectiles.clone(),
        }
    }

    pub fn serialize_snapshot(&self) -> Result<Vec<u8>, rmp_serde::encode::Error> {
        self.snapshot().encode()
    }

    pub fn remaining(&self, kind: EntityKind) -> usize {
        self.world.remaining(kind)
    }
}

fn spawn_player(config: &SimConfig) -> Player {
    Player::spawn(&config.player, config.timing.damage_invincibility_ms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use catdash_core::level::{LevelDef, RectDef};
    use catdash_core::test_helpers::{FLOOR_Y, config_with_viewport, flat_level, level_with_monster};

    const FRAME: Duration = Duration::from_millis(16);

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn run_ticks(sim: &mut Simulation, start: u64, count: u64) -> Vec<SimEvent> {
        (start..start + count)
            .flat_map(|i| sim.tick(FRAME * i as u32))
            .collect()
    }

    fn landed(level: LevelDef) -> Simulation {
        let mut sim = Simulation::new(SimConfig::default(), level);
        run_ticks(&mut sim, 0, 30);
        assert!(sim.player().on_ground);
        sim
    }

    #[test]
    fn new_run_starts_clean() {
        let sim = Simulation::new(SimConfig::default(), LevelDef::stage_one());
        assert_eq!(sim.phase(), RunPhase::Running);
        assert_eq!(sim.player().lives, 3);
        assert_eq!(sim.player().x, 50.0);
        assert_eq!(sim.scroll_offset(), 0.0);
        assert_eq!(sim.tick_count(), 0);
        assert_eq!(sim.remaining(EntityKind::Coin), 3);
    }

    #[test]
    fn player_falls_onto_floor() {
        let sim = landed(flat_level());
        assert_eq!(sim.player().y, FLOOR_Y - sim.player().height);
        assert_eq!(sim.player().dy, 0.0);
    }

    #[test]
    fn holding_right_scrolls_past_center() {
        let mut sim = Simulation::new(SimConfig::default(), flat_level());
        sim.key_down("ArrowRight");

        run_ticks(&mut sim, 0, 70);
        assert_eq!(sim.player().x, 400.0);
        assert_eq!(sim.scroll_offset(), 0.0);

        run_ticks(&mut sim, 70, 1);
        assert_eq!(sim.player().x, 400.0);
        assert_eq!(sim.scroll_offset(), 5.0);
    }

    #[test]
    fn key_repeat_does_not_multiply_movement() {
        let mut sim = Simulation::new(SimConfig::default(), flat_level());
        for _ in 0..10 {
            sim.key_down("ArrowRight");
        }
        sim.tick(ms(0));
        assert_eq!(sim.player().x, 55.0);
    }

    #[test]
    fn jump_only_from_ground() {
        let mut sim = landed(flat_level());
        sim.key_down("c");
        let events = sim.tick(ms(1000));
        assert!(events.contains(&SimEvent::Jumped));
        assert!(sim.player().dy < 0.0);

        let events = sim.tick(ms(1016));
        assert!(!events.contains(&SimEvent::Jumped), "No double jump mid-air");
    }

    #[test]
    fn last_life_monster_contact_is_game_over() {
        let mut config = SimConfig::default();
        config.player.lives = 1;
        let mut sim = Simulation::new(config, level_with_monster(50.0));

        let events = run_ticks(&mut sim, 0, 30);

        assert_eq!(sim.player().lives, 0);
        assert_eq!(sim.phase(), RunPhase::GameOver);
        assert_eq!(sim.outcome(), Some(RunOutcome::Failure));
        let ended: Vec<_> = events
            .iter()
            .filter(|e| matches!(e, SimEvent::RunEnded(_)))
            .collect();
        assert_eq!(ended, vec![&SimEvent::RunEnded(RunOutcome::Failure)]);
    }

    #[test]
    fn terminal_run_ignores_everything() {
        let mut config = SimConfig::default();
        config.player.lives = 1;
        let mut sim = Simulation::new(config, level_with_monster(50.0));
        run_ticks(&mut sim, 0, 30);
        assert!(sim.phase().is_terminal());

        let before = sim.snapshot();
        sim.key_down("ArrowRight");
        assert!(sim.tick(ms(5000)).is_empty());
        assert!(sim.decrease_lives(ms(5000)).is_empty());
        assert!(sim.fire_due_timers(ms(60_000)).is_empty());
        assert!(sim.trigger_invincibility(ms(5000), ms(100), true).is_none());
        assert_eq!(sim.snapshot(), before);
    }

    #[test]
    fn wing_outlasts_later_damage_window() {
        let mut level = flat_level();
        level.wings.push(RectDef::new(50.0, 200.0, 30.0, 30.0));
        let mut sim = Simulation::new(SimConfig::default(), level);

        let events = sim.tick(ms(0));
        assert!(events.contains(&SimEvent::WingCollected));
        assert!(sim.player().has_wings && sim.player().is_invincible);

        // A shorter, plain window arrives mid-flight.
        sim.trigger_invincibility(ms(100), ms(1500), false);
        assert!(sim.fire_due_timers(ms(1600)).is_empty());
        assert!(sim.player().has_wings && sim.player().is_invincible);

        assert!(sim.fire_due_timers(ms(4999)).is_empty());
        let events = sim.fire_due_timers(ms(5000));
        assert_eq!(
            events,
            vec![SimEvent::InvincibilityEnded, SimEvent::FlightEnded]
        );
        assert!(!sim.player().has_wings && !sim.player().is_invincible);
    }

    #[test]
    fn flight_suspends_gravity_and_jump() {
        let mut level = flat_level();
        level.wings.push(RectDef::new(50.0, 200.0, 30.0, 30.0));
        let mut sim = Simulation::new(SimConfig::default(), level);
        sim.tick(ms(0));
        let y = sim.player().y;

        sim.key_down("c");
        let events = run_ticks(&mut sim, 1, 10);
        assert!(!events.contains(&SimEvent::Jumped));
        assert_eq!(sim.player().y, y);

        sim.key_up("c");
        sim.key_down("ArrowUp");
        run_ticks(&mut sim, 11, 2);
        assert_eq!(sim.player().y, y - 10.0);
    }

    #[test]
    fn tick_fires_due_expiry() {
        let mut sim = landed(level_with_monster(200.0));
        sim.decrease_lives(ms(1000));
        assert!(sim.player().is_invincible);
        assert_eq!(sim.next_timer_due(), Some(ms(2500)));

        assert!(!sim.tick(ms(2499)).contains(&SimEvent::InvincibilityEnded));
        assert!(sim.tick(ms(2500)).contains(&SimEvent::InvincibilityEnded));
        assert!(!sim.player().is_invincible);
    }

    #[test]
    fn falling_out_costs_life_and_relocates() {
        let mut sim = Simulation::new(SimConfig::default(), LevelDef::stage_one());
        sim.player.y = 450.0;
        sim.player.dy = 0.0;

        let events = sim.tick(ms(0));

        assert_eq!(sim.player().lives, 2);
        // |50 - 200| + |450.4 - 300| beats the second platform's 450 + 250.4.
        assert_eq!(sim.player().x, 200.0 - 15.0);
        assert_eq!(sim.player().y, 300.0 - 30.0);
        assert!(events.contains(&SimEvent::LifeLost { lives: 2 }));
        assert_eq!(sim.phase(), RunPhase::Running);
    }

    #[test]
    fn fall_threshold_follows_viewport_height() {
        // The floor at 300 lies below a 250-high viewport, so the player drops out first.
        let mut sim = Simulation::new(config_with_viewport(800.0, 250.0), flat_level());
        assert_eq!(sim.config().viewport.height, 250.0);

        let events = run_ticks(&mut sim, 0, 20);

        assert_eq!(sim.player().lives, 2);
        assert!(events.contains(&SimEvent::LifeLost { lives: 2 }));
        assert!(sim.player().on_ground);
    }

    #[test]
    fn finish_reported_once() {
        let mut level = flat_level();
        level.finish_line = RectDef::new(60.0, 200.0, 40.0, 100.0);
        let mut sim = Simulation::new(SimConfig::default(), level);

        let events = sim.tick(ms(0));
        assert_eq!(events, vec![SimEvent::RunEnded(RunOutcome::Success)]);
        assert_eq!(sim.phase(), RunPhase::Cleared);

        let later = run_ticks(&mut sim, 1, 20);
        assert!(later.is_empty());
        assert_eq!(sim.tick_count(), 1);
    }

    #[test]
    fn attack_destroys_monster_ahead() {
        let mut sim = landed(level_with_monster(300.0));
        sim.key_down("x");

        let events = run_ticks(&mut sim, 30, 60);

        assert!(events.contains(&SimEvent::ProjectileFired));
        assert!(events.contains(&SimEvent::MonsterDestroyed {
            cause: DestroyCause::Projectile
        }));
        assert!(sim.world().monsters.is_empty());
        assert_eq!(sim.player().lives, 3);
    }

    #[test]
    fn attack_respects_cooldown() {
        let mut sim = landed(flat_level());
        sim.key_down("x");
        // 10 frames of 16ms span 144ms: fires at 480 and 592 (480 + 112).
        let fired = run_ticks(&mut sim, 30, 10)
            .into_iter()
            .filter(|e| *e == SimEvent::ProjectileFired)
            .count();
        assert_eq!(fired, 2);
    }

    #[test]
    fn restart_restores_initial_state() {
        let mut level = flat_level();
        level.coins.push(RectDef::new(60.0, 200.0, 30.0, 30.0));
        let mut sim = Simulation::new(SimConfig::default(), level.clone());
        sim.key_down("ArrowRight");
        sim.key_down("x");
        run_ticks(&mut sim, 0, 120);
        sim.decrease_lives(ms(3000));
        assert_eq!(sim.player().coin, 1);
        assert!(sim.scroll_offset() > 0.0);

        sim.restart();

        let fresh = Simulation::new(SimConfig::default(), level);
        assert_eq!(sim.player(), fresh.player());
        assert_eq!(sim.world(), fresh.world());
        assert_eq!(sim.scroll_offset(), 0.0);
        assert!(sim.projectiles().is_empty());
        assert_eq!(sim.pending_expiry(), None);
        assert_eq!(sim.epoch(), 1);
        assert_eq!(sim.phase(), RunPhase::Running);

        // Keys held before the restart are released.
        sim.tick(ms(0));
        assert_eq!(sim.player().x, 50.0);
    }

    #[test]
    fn restart_recovers_from_game_over() {
        let mut config = SimConfig::default();
        config.player.lives = 1;
        let mut sim = Simulation::new(config, level_with_monster(50.0));
        run_ticks(&mut sim, 0, 30);
        assert_eq!(sim.phase(), RunPhase::GameOver);

        sim.restart();
        assert_eq!(sim.phase(), RunPhase::Running);
        assert_eq!(sim.outcome(), None);
        assert_eq!(sim.player().lives, 1);
        sim.tick(ms(0));
        assert_eq!(sim.tick_count(), 1);
    }

    #[test]
    fn expiry_from_previous_run_is_inert() {
        let mut level = flat_level();
        level.wings.push(RectDef::new(50.0, 200.0, 30.0, 30.0));
        let mut sim = Simulation::new(SimConfig::default(), level);
        sim.tick(ms(0));
        let stale = sim.pending_expiry().unwrap();

        sim.restart();
        sim.tick(ms(0));
        // The wing sits at spawn, so the new run is flying again under a new epoch.
        assert!(sim.player().has_wings);

        assert!(sim.fire_timer(stale).is_empty());
        assert!(sim.player().has_wings && sim.player().is_invincible);
    }

    #[test]
    fn snapshot_is_screen_space_and_hides_consumed() {
        let mut level = flat_level();
        level.coins.push(RectDef::new(50.0, 200.0, 30.0, 30.0));
        level.coins.push(RectDef::new(900.0, 200.0, 30.0, 30.0));
        let mut sim = Simulation::new(SimConfig::default(), level);
        sim.tick(ms(0));
        sim.camera.scroll_offset = 100.0;

        let snap = sim.snapshot();
        assert_eq!(snap.count(EntityKind::Coin), 1);
        let coin = snap
            .entities
            .iter()
            .find(|e| e.kind == EntityKind::Coin)
            .unwrap();
        assert_eq!(coin.rect.x, 800.0);
        assert_eq!(snap.player.coin, 1);
        assert_eq!(snap.count(EntityKind::FinishLine), 1);

        let bytes = sim.serialize_snapshot().unwrap();
        assert_eq!(RenderSnapshot::decode(&bytes).unwrap(), snap);
    }

    #[test]
    fn patrolling_monster_moves_each_tick() {
        let mut level = flat_level();
        let mut monster = catdash_core::level::MonsterDef::stationary(600.0, 270.0, 30.0, 30.0);
        monster.patrol_speed = 2.0;
        monster.patrol_range = 100.0;
        level.monsters.push(monster);
        let mut sim = Simulation::new(SimConfig::default(), level);

        run_ticks(&mut sim, 0, 10);
        assert_eq!(sim.world().monsters[0].rect.x, 620.0);
        run_ticks(&mut sim, 10, 60);
        // 50 ticks to reach 700, then 20 back.
        assert_eq!(sim.world().monsters[0].rect.x, 660.0);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn key() -> impl Strategy<Value = &'static str> {
            prop_oneof![
                Just("ArrowLeft"),
                Just("ArrowRight"),
                Just("ArrowUp"),
                Just("c"),
                Just("x"),
            ]
        }

        proptest! {
            #[test]
            fn lives_and_scroll_behave_under_random_play(
                script in proptest::collection::vec((key(), any::<bool>(), 1u64..20), 1..60),
            ) {
                let mut sim = Simulation::new(SimConfig::default(), LevelDef::stage_one());
                let mut frame = 0u64;
                let mut last_scroll = 0.0;
                let mut ended = 0;
                for (code, down, hold) in script {
                    if down { sim.key_down(code) } else { sim.key_up(code) }
                    for _ in 0..hold {
                        let events = sim.tick(ms(frame * 16));
                        frame += 1;
                        ended += events.iter().filter(|e| matches!(e, SimEvent::RunEnded(_))).count();
                        prop_assert!(sim.scroll_offset() >= last_scroll);
                        last_scroll = sim.scroll_offset();
                        prop_assert!(sim.player().x >= 0.0);
                        if sim.phase() == RunPhase::GameOver {
                            prop_assert!(sim.player().lives <= 0);
                        }
                    }
                }
                prop_assert!(ended <= 1);
            }
        }
    }
}
