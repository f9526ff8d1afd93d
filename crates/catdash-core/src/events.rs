use serde::{Deserialize, Serialize};

/// How a run ended. Reported exactly once per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunOutcome {
    /// The finish line was reached.
    Success,
    /// All lives were lost.
    Failure,
}

/// Lifecycle phase of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunPhase {
    #[default]
    Running,
    GameOver,
    Cleared,
}

impl RunPhase {
    pub fn is_terminal(self) -> bool {
        !matches!(self, RunPhase::Running)
    }
}

/// What destroyed a monster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DestroyCause {
    Projectile,
    Flight,
}

/// Notable state changes produced by a tick or a timer expiry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SimEvent {
    Jumped,
    LifeLost { lives: i32 },
    Respawned { x: f32, y: f32 },
    CoinCollected { total: u32 },
    MeatEaten { lives: i32 },
    WingCollected,
    InvincibilityEnded,
    FlightEnded,
    MonsterDestroyed { cause: DestroyCause },
    ProjectileFired,
    RunEnded(RunOutcome),
}
