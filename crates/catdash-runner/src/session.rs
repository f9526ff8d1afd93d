use std::time::Duration;

use bytes::Bytes;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, Interval, MissedTickBehavior};
use uuid::Uuid;

use catdash_core::events::{RunOutcome, SimEvent};
use catdash_core::level::LevelDef;
use catdash_sim::Simulation;

use crate::config::RunnerConfig;
use crate::error::RunnerError;

/// Commands sent from the input source to the run loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunCommand {
    KeyDown(String),
    KeyUp(String),
    Restart,
    Stop,
}

/// Broadcasts sent from the run loop to the render and outcome sinks.
#[derive(Debug, Clone)]
pub enum RunBroadcast {
    /// MessagePack-encoded `RenderSnapshot` after a tick.
    Frame { tick: u64, snapshot: Bytes },
    /// The run ended. Sent once per run; a restart starts a new run.
    Outcome(RunOutcome),
    /// The loop has exited.
    Ended,
}

/// The drawing surface a run is attached to. Its size becomes the viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Surface {
    pub width: f32,
    pub height: f32,
}

impl Surface {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    fn is_usable(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }
}

pub type SessionHandles = (
    mpsc::UnboundedSender<RunCommand>,
    mpsc::UnboundedReceiver<RunBroadcast>,
    JoinHandle<()>,
);

/// Spawn a run loop as a tokio task.
/// Returns the command sender, broadcast receiver, and task handle.
///
/// Declines to start, without touching any state, when no usable surface is
/// attached.
pub fn spawn_run_session(
    mut config: RunnerConfig,
    level: LevelDef,
    surface: Option<Surface>,
) -> Result<SessionHandles, RunnerError> {
    let Some(surface) = surface.filter(Surface::is_usable) else {
        tracing::warn!("No render surface attached, not starting run");
        return Err(RunnerError::SurfaceUnavailable);
    };
    config.sim.viewport.width = surface.width;
    config.sim.viewport.height = surface.height;
    config.validate()?;
    level.validate()?;

    let run_id = Uuid::new_v4();
    let frame = config.frame_interval();
    let sim = Simulation::new(config.sim, level);

    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
    let (broadcast_tx, broadcast_rx) = mpsc::unbounded_channel();

    let handle = tokio::spawn(async move {
        run_loop(sim, run_id, frame, cmd_rx, broadcast_tx).await;
    });

    Ok((cmd_tx, broadcast_rx, handle))
}

fn frame_interval(frame: Duration) -> Interval {
    let mut interval = tokio::time::interval(frame);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    interval
}

/// One frame per interval tick; status expiries wake the loop between frames.
async fn run_loop(
    mut sim: Simulation,
    run_id: Uuid,
    frame: Duration,
    mut cmd_rx: mpsc::UnboundedReceiver<RunCommand>,
    broadcast_tx: mpsc::UnboundedSender<RunBroadcast>,
) {
    tracing::info!(%run_id, frame_ms = frame.as_millis() as u64, "Run session started");

    let mut start = Instant::now();
    let mut interval = frame_interval(frame);

    loop {
        let running = !sim.phase().is_terminal();
        let expiry = sim.pending_expiry().filter(|_| running);
        let deadline = expiry.map_or(start, |e| start + e.due);

        tokio::select! {
            _ = interval.tick(), if running => {
                let events = sim.tick(start.elapsed());
                match sim.serialize_snapshot() {
                    Ok(data) => {
                        let _ = broadcast_tx.send(RunBroadcast::Frame {
                            tick: sim.tick_count(),
                            snapshot: Bytes::from(data),
                        });
                    },
                    Err(e) => tracing::error!(
                        %run_id, tick = sim.tick_count(), error = %e, "Failed to encode snapshot"
                    ),
                }
                for event in &events {
                    if let SimEvent::RunEnded(outcome) = event {
                        tracing::info!(%run_id, ?outcome, "Reporting run outcome");
                        let _ = broadcast_tx.send(RunBroadcast::Outcome(*outcome));
                    }
                }
            }
            _ = tokio::time::sleep_until(deadline), if expiry.is_some() => {
                if let Some(expiry) = expiry {
                    let events = sim.fire_timer(expiry);
                    tracing::debug!(%run_id, ?events, "Status expiry fired between frames");
                }
            }
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(RunCommand::KeyDown(code)) => sim.key_down(&code),
                    Some(RunCommand::KeyUp(code)) => sim.key_up(&code),
                    Some(RunCommand::Restart) => {
                        sim.restart();
                        start = Instant::now();
                        interval = frame_interval(frame);
                        tracing::info!(%run_id, epoch = sim.epoch(), "Run restarted by command");
                    },
                    Some(RunCommand::Stop) | None => {
                        break;
                    },
                }
            }
        }
    }

    tracing::info!(%run_id, ticks = sim.tick_count(), "Run session stopped");
    let _ = broadcast_tx.send(RunBroadcast::Ended);
}
