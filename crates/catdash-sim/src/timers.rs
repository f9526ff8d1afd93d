//! Invincibility and flight windows.
//!
//! Expiries run on real time, not on ticks. Each scheduled expiry is stamped
//! with the epoch it was created in; [`StatusTimers::cancel_all`] (called on
//! restart) bumps the epoch so an expiry that outlives its run is ignored.

use std::time::Duration;

use catdash_core::entity::Player;
use catdash_core::events::SimEvent;

/// A scheduled end of an invincibility window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Expiry {
    /// Time since run start at which the window closes.
    pub due: Duration,
    /// Whether closing the window also ends flight mode.
    pub clears_flight: bool,
    pub epoch: u64,
}

/// Result of [`StatusTimers::decrease_lives`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Damage {
    /// The player was invincible; nothing changed.
    Ignored,
    LifeLost { lives: i32 },
    GameOver,
}

/// Owns the single pending expiry for the player.
#[derive(Debug, Default)]
pub struct StatusTimers {
    epoch: u64,
    pending: Option<Expiry>,
}

impl StatusTimers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn pending(&self) -> Option<Expiry> {
        self.pending
    }

    pub fn next_due(&self) -> Option<Duration> {
        self.pending.map(|e| e.due)
    }

    /// Start (or restart) an invincibility window.
    ///
    /// The previous expiry is replaced, except that a plain window started
    /// while a flight window is pending leaves the flight expiry in place.
    /// Flight always ends at its own deadline, neither earlier nor later.
    pub fn trigger_invincibility(
        &mut self,
        player: &mut Player,
        now: Duration,
        duration: Duration,
        from_flight: bool,
    ) -> Expiry {
        player.is_invincible = true;
        if from_flight {
            player.has_wings = true;
            player.on_ground = false;
            player.dy = 0.0;
        }

        if let Some(prev) = self.pending
            && prev.clears_flight
            && !from_flight
        {
            return prev;
        }

        let expiry = Expiry {
            due: now + duration,
            clears_flight: from_flight,
            epoch: self.epoch,
        };
        self.pending = Some(expiry);
        expiry
    }

    /// Take one life unless invincible, then open a damage window.
    pub fn decrease_lives(&mut self, player: &mut Player, now: Duration) -> Damage {
        if player.is_invincible {
            return Damage::Ignored;
        }
        player.lives -= 1;
        let window = Duration::from_millis(player.invincible_time_ms);
        self.trigger_invincibility(player, now, window, false);
        if player.is_alive() {
            Damage::LifeLost {
                lives: player.lives,
            }
        } else {
            Damage::GameOver
        }
    }

    /// Deliver a scheduled expiry. Stale (previous epoch) or superseded expiries
    /// are ignored.
    pub fn fire(&mut self, player: &mut Player, expiry: Expiry) -> Vec<SimEvent> {
        if expiry.epoch != self.epoch {
            tracing::debug!(
                expiry_epoch = expiry.epoch,
                epoch = self.epoch,
                "Ignoring expiry from a previous run"
            );
            return Vec::new();
        }
        if self.pending != Some(expiry) {
            tracing::trace!("Ignoring superseded expiry");
            return Vec::new();
        }
        self.pending = None;

        let mut events = Vec::with_capacity(2);
        player.is_invincible = false;
        events.push(SimEvent::InvincibilityEnded);
        if expiry.clears_flight {
            player.has_wings = false;
            events.push(SimEvent::FlightEnded);
        }
        events
    }

    /// Deliver the pending expiry if its deadline has passed.
    pub fn fire_due(&mut self, player: &mut Player, now: Duration) -> Vec<SimEvent> {
        match self.pending {
            Some(expiry) if expiry.due <= now => self.fire(player, expiry),
            _ => Vec::new(),
        }
    }

    /// Drop the pending expiry and invalidate any copies still held elsewhere.
    pub fn cancel_all(&mut self) {
        self.pending = None;
        self.epoch += 1;
    }
}
