use std::time::Duration;

use catdash_core::config::SimConfig;
use catdash_core::entity::{Entity, EntityKind, Player};
use catdash_core::events::{DestroyCause, RunOutcome, SimEvent};
use catdash_core::level::World;

use crate::timers::{Damage, StatusTimers};

/// Snap the player onto any platform whose top band contains the player's feet.
/// Clears `on_ground` first; with several candidates the last one wins.
pub fn resolve_platforms(player: &mut Player, platforms: &[Entity], scroll_offset: f32) -> bool {
    player.on_ground = false;
    for platform in platforms {
        let rect = platform.rect.to_screen(scroll_offset);
        let feet = player.bottom();
        if feet >= rect.y
            && feet <= rect.bottom()
            && player.x + player.width > rect.x
            && player.x < rect.right()
        {
            player.on_ground = true;
            player.dy = 0.0;
            player.y = rect.y - player.height;
        }
    }
    player.on_ground
}

/// Platform closest to the player by `|dx to screen center| + |dy to top edge|`.
pub fn nearest_platform<'a>(
    player: &Player,
    platforms: &'a [Entity],
    scroll_offset: f32,
) -> Option<&'a Entity> {
    platforms
        .iter()
        .map(|p| {
            let dx = player.x - (p.rect.center_x() - scroll_offset);
            let dy = player.y - p.rect.y;
            (dx.abs() + dy.abs(), p)
        })
        .fold(None, |best: Option<(f32, &Entity)>, (d, p)| match best {
            Some((best_d, _)) if best_d <= d => best,
            _ => Some((d, p)),
        })
        .map(|(_, p)| p)
}

/// Stand the player centered on top of `platform`.
pub fn place_on(player: &mut Player, platform: &Entity, scroll_offset: f32) {
    player.x = platform.rect.center_x() - player.width / 2.0 - scroll_offset;
    player.y = platform.rect.y - player.height;
    player.dy = 0.0;
    player.on_ground = true;
}

/// Player-vs-world collision pass for one tick.
pub struct Resolver<'a> {
    pub player: &'a mut Player,
    pub world: &'a mut World,
    pub timers: &'a mut StatusTimers,
    pub config: &'a SimConfig,
    pub scroll_offset: f32,
    pub now: Duration,
}

impl Resolver<'_> {
    /// Run every check in order. Returns the outcome if the run ended; later
    /// checks are skipped once it has.
    pub fn run(&mut self, events: &mut Vec<SimEvent>) -> Option<RunOutcome> {
        resolve_platforms(self.player, &self.world.platforms, self.scroll_offset);

        if self.reached_finish() {
            return Some(RunOutcome::Success);
        }
        if let Some(outcome) = self.resolve_monsters(events) {
            return Some(outcome);
        }
        self.resolve_collectibles(events);
        self.resolve_fall(events)
    }

    fn reached_finish(&self) -> bool {
        self.world
            .finish_line
            .rect
            .to_screen(self.scroll_offset)
            .overlaps(&self.player.rect())
    }

    fn damage(&mut self, events: &mut Vec<SimEvent>) -> Option<RunOutcome> {
        match self.timers.decrease_lives(self.player, self.now) {
            Damage::Ignored => None,
            Damage::LifeLost { lives } => {
                tracing::debug!(lives, "Life lost");
                events.push(SimEvent::LifeLost { lives });
                None
            },
            Damage::GameOver => {
                events.push(SimEvent::LifeLost {
                    lives: self.player.lives,
                });
                Some(RunOutcome::Failure)
            },
        }
    }

    fn resolve_monsters(&mut self, events: &mut Vec<SimEvent>) -> Option<RunOutcome> {
        let player_rect = self.player.rect();
        let scroll = self.scroll_offset;
        let touching = |m: &Entity| m.rect.to_screen(scroll).overlaps(&player_rect);

        if self.player.has_wings {
            let before = self.world.monsters.len();
            self.world.monsters.retain(|m| !touching(m));
            for _ in self.world.monsters.len()..before {
                events.push(SimEvent::MonsterDestroyed {
                    cause: DestroyCause::Flight,
                });
            }
            return None;
        }

        if !self.player.is_invincible && self.world.monsters.iter().any(touching) {
            return self.damage(events);
        }
        None
    }

    fn resolve_collectibles(&mut self, events: &mut Vec<SimEvent>) {
        let player_rect = self.player.rect();
        for item in &mut self.world.collectibles {
            if item.consumed || !item.rect.to_screen(self.scroll_offset).overlaps(&player_rect) {
                continue;
            }
            if !item.consume() {
                continue;
            }
            match item.kind {
                EntityKind::Meat => {
                    self.player.lives += 1;
                    events.push(SimEvent::MeatEaten {
                        lives: self.player.lives,
                    });
                },
                EntityKind::Wing => {
                    let window = Duration::from_millis(self.config.timing.flight_duration_ms);
                    self.timers
                        .trigger_invincibility(self.player, self.now, window, true);
                    events.push(SimEvent::WingCollected);
                },
                EntityKind::Coin => {
                    self.player.coin += 1;
                    events.push(SimEvent::CoinCollected {
                        total: self.player.coin,
                    });
                },
                _ => {},
            }
        }
    }

    fn resolve_fall(&mut self, events: &mut Vec<SimEvent>) -> Option<RunOutcome> {
        if self.player.y <= self.config.viewport.height {
            return None;
        }
        if let Some(outcome) = self.damage(events) {
            return Some(outcome);
        }
        if let Some(platform) =
            nearest_platform(self.player, &self.world.platforms, self.scroll_offset)
        {
            place_on(self.player, platform, self.scroll_offset);
            events.push(SimEvent::Respawned {
                x: self.player.x,
                y: self.player.y,
            });
        }
        None
    }
}
