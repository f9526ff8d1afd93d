use std::time::Duration;

use catdash_core::config::ProjectileConfig;
use catdash_core::entity::{Entity, Player, Projectile};

/// Spawns projectiles, rate-limited by real time since the last spawn.
#[derive(Debug, Default)]
pub struct Launcher {
    last_spawn: Option<Duration>,
}

impl Launcher {
    /// Fire from the player's leading edge if the cooldown has elapsed.
    pub fn try_fire(
        &mut self,
        player: &Player,
        now: Duration,
        config: &ProjectileConfig,
        projectiles: &mut Vec<Projectile>,
    ) -> bool {
        let cooldown = Duration::from_millis(config.cooldown_ms);
        if let Some(last) = self.last_spawn
            && now.saturating_sub(last) < cooldown
        {
            return false;
        }

        let lead = if player.facing_right { player.width } else { 0.0 };
        projectiles.push(Projectile {
            x: player.x + lead,
            y: player.y + player.height / 2.0,
            forward: player.facing_right,
        });
        self.last_spawn = Some(now);
        true
    }

    pub fn reset(&mut self) {
        self.last_spawn = None;
    }
}

/// Move every projectile one step and drop those out of range of the player's
/// current position.
pub fn advance(projectiles: &mut Vec<Projectile>, player_x: f32, config: &ProjectileConfig) {
    projectiles.retain_mut(|p| {
        p.x += if p.forward { config.step } else { -config.step };
        (p.x - player_x).abs() <= config.range
    });
}

/// Remove every projectile that sits inside a monster, along with that monster.
/// Returns how many monsters were destroyed.
pub fn resolve_hits(
    projectiles: &mut Vec<Projectile>,
    monsters: &mut Vec<Entity>,
    scroll_offset: f32,
) -> usize {
    let mut destroyed = 0;
    projectiles.retain(|p| {
        let hit = monsters
            .iter()
            .position(|m| m.rect.to_screen(scroll_offset).contains_point(p.x, p.y));
        match hit {
            Some(i) => {
                monsters.remove(i);
                destroyed += 1;
                false
            },
            None => true,
        }
    });
    destroyed
}

#[cfg(test)]
mod tests {
    use super::*;
    use catdash_core::config::PlayerConfig;
    use catdash_core::entity::{EntityKind, Rect};

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn player() -> Player {
        Player::spawn(&PlayerConfig::default(), 1500)
    }

    fn monster(x: f32, y: f32) -> Entity {
        Entity::new(EntityKind::Monster, Rect::new(x, y, 30.0, 30.0))
    }

    #[test]
    fn spawns_at_leading_edge() {
        let config = ProjectileConfig::default();
        let mut launcher = Launcher::default();
        let mut shots = Vec::new();
        let mut p = player();

        assert!(launcher.try_fire(&p, ms(0), &config, &mut shots));
        assert_eq!(shots[0].x, p.x + p.width);
        assert_eq!(shots[0].y, p.y + p.height / 2.0);
        assert!(shots[0].forward);

        p.facing_right = false;
        assert!(launcher.try_fire(&p, ms(200), &config, &mut shots));
        assert_eq!(shots[1].x, p.x);
        assert!(!shots[1].forward);
    }

    #[test]
    fn cooldown_limits_rate() {
        let config = ProjectileConfig::default();
        let mut launcher = Launcher::default();
        let mut shots = Vec::new();
        let p = player();

        assert!(launcher.try_fire(&p, ms(1000), &config, &mut shots));
        assert!(!launcher.try_fire(&p, ms(1050), &config, &mut shots));
        assert!(!launcher.try_fire(&p, ms(1099), &config, &mut shots));
        assert!(launcher.try_fire(&p, ms(1100), &config, &mut shots));
        assert_eq!(shots.len(), 2);
    }

    #[test]
    fn reset_clears_cooldown() {
        let config = ProjectileConfig::default();
        let mut launcher = Launcher::default();
        let mut shots = Vec::new();
        let p = player();
        launcher.try_fire(&p, ms(500), &config, &mut shots);
        launcher.reset();
        assert!(launcher.try_fire(&p, ms(0), &config, &mut shots));
    }

    #[test]
    fn removed_past_range() {
        let config = ProjectileConfig::default();
        let mut shots = vec![Projectile {
            x: 100.0,
            y: 0.0,
            forward: true,
        }];
        // 100 + 10n - 100 > 500 first at n = 51.
        for _ in 0..50 {
            advance(&mut shots, 100.0, &config);
        }
        assert_eq!(shots.len(), 1);
        assert_eq!(shots[0].x, 600.0);
        advance(&mut shots, 100.0, &config);
        assert!(shots.is_empty());
    }

    #[test]
    fn range_tracks_current_player_position() {
        let config = ProjectileConfig::default();
        let mut shots = vec![Projectile {
            x: 0.0,
            y: 0.0,
            forward: false,
        }];
        advance(&mut shots, 400.0, &config);
        assert_eq!(shots.len(), 1);
        advance(&mut shots, 600.0, &config);
        assert!(shots.is_empty(), "Player moved away; projectile out of range");
    }

    #[test]
    fn hit_removes_both() {
        let mut shots = vec![
            Projectile {
                x: 215.0,
                y: 115.0,
                forward: true,
            },
            Projectile {
                x: 50.0,
                y: 115.0,
                forward: true,
            },
        ];
        // World x 700 at scroll 500 is screen x 200.
        let mut monsters = vec![monster(700.0, 100.0), monster(1000.0, 100.0)];

        let destroyed = resolve_hits(&mut shots, &mut monsters, 500.0);

        assert_eq!(destroyed, 1);
        assert_eq!(shots.len(), 1);
        assert_eq!(shots[0].x, 50.0);
        assert_eq!(monsters.len(), 1);
        assert_eq!(monsters[0].rect.x, 1000.0);
    }

    #[test]
    fn one_projectile_one_monster() {
        let mut shots = vec![Projectile {
            x: 15.0,
            y: 15.0,
            forward: true,
        }];
        let mut monsters = vec![monster(0.0, 0.0), monster(0.0, 0.0)];
        assert_eq!(resolve_hits(&mut shots, &mut monsters, 0.0), 1);
        assert_eq!(monsters.len(), 1, "Stacked monster survives a single shot");
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn lifetime_is_finite(
                start in -500.0f32..500.0,
                player_x in 0.0f32..400.0,
                forward in any::<bool>(),
            ) {
                let config = ProjectileConfig::default();
                let mut shots = vec![Projectile { x: start, y: 0.0, forward }];
                let max_ticks = ((config.range * 2.0 + 1000.0) / config.step) as usize + 2;
                let mut ticks = 0;
                while !shots.is_empty() {
                    advance(&mut shots, player_x, &config);
                    ticks += 1;
                    prop_assert!(ticks <= max_ticks);
                    for p in &shots {
                        prop_assert!((p.x - player_x).abs() <= config.range);
                    }
                }
            }
        }
    }
}
