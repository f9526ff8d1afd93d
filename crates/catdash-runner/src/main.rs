use std::time::Duration;

use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use catdash_core::config::KeyBindings;
use catdash_runner::{RunBroadcast, RunCommand, RunnerConfig, Surface, spawn_run_session};
use catdash_sim::snapshot::RenderSnapshot;

/// Hold right and attack, tapping jump at a steady rhythm.
async fn scripted_input(keys: KeyBindings, cmd_tx: mpsc::UnboundedSender<RunCommand>) {
    let _ = cmd_tx.send(RunCommand::KeyDown(keys.right.clone()));
    let _ = cmd_tx.send(RunCommand::KeyDown(keys.attack.clone()));
    loop {
        tokio::time::sleep(Duration::from_millis(600)).await;
        if cmd_tx.send(RunCommand::KeyDown(keys.jump.clone())).is_err() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(80)).await;
        if cmd_tx.send(RunCommand::KeyUp(keys.jump.clone())).is_err() {
            return;
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = RunnerConfig::load();
    let level = match config.level_provider().load() {
        Ok(level) => level,
        Err(e) => {
            tracing::error!(error = %e, "Failed to load level");
            std::process::exit(1);
        },
    };

    let surface = Surface::new(config.sim.viewport.width, config.sim.viewport.height);
    let keys = config.sim.keys.clone();
    let demo = Duration::from_secs(config.demo_secs);

    let (cmd_tx, mut broadcast_rx, handle) = match spawn_run_session(config, level, Some(surface))
    {
        Ok(handles) => handles,
        Err(e) => {
            tracing::error!(error = %e, "Failed to start run");
            std::process::exit(1);
        },
    };

    let script = tokio::spawn(scripted_input(keys, cmd_tx.clone()));
    let deadline = tokio::time::sleep(demo);
    tokio::pin!(deadline);

    let mut last_frame: Option<RenderSnapshot> = None;
    let mut stopping = false;
    loop {
        tokio::select! {
            msg = broadcast_rx.recv() => match msg {
                Some(RunBroadcast::Frame { snapshot, .. }) => {
                    match RenderSnapshot::decode(&snapshot) {
                        Ok(frame) => last_frame = Some(frame),
                        Err(e) => tracing::warn!(error = %e, "Undecodable frame"),
                    }
                },
                Some(RunBroadcast::Outcome(outcome)) => {
                    tracing::info!(?outcome, "Demo run finished");
                    stopping = true;
                    let _ = cmd_tx.send(RunCommand::Stop);
                },
                Some(RunBroadcast::Ended) | None => break,
            },
            _ = &mut deadline, if !stopping => {
                tracing::info!(secs = demo.as_secs(), "Demo time limit reached");
                stopping = true;
                let _ = cmd_tx.send(RunCommand::Stop);
            }
        }
    }

    script.abort();
    let _ = handle.await;

    if let Some(frame) = last_frame {
        tracing::info!(
            tick = frame.tick,
            phase = ?frame.phase,
            scroll = frame.scroll_offset,
            lives = frame.player.lives,
            coin = frame.player.coin,
            "Final frame"
        );
    }
}
