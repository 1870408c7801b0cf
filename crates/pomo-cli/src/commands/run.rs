use clap::Args;
use pomo_core::{
    get_interval, Event, IntervalConfig, IntervalError, IntervalHandle, IntervalState, Repository,
};
use std::io::BufRead;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

#[derive(Args)]
pub struct RunArgs {
    /// Number of intervals to run back to back
    #[arg(long, short = 'n', default_value_t = 1)]
    count: usize,
}

fn emit(event: &Event) {
    match serde_json::to_string(event) {
        Ok(line) => println!("{line}"),
        Err(e) => warn!(error = %e, "failed to encode event"),
    }
}

/// Forward stdin lines for the whole session.
///
/// Reads on a plain thread so a pending read never holds up runtime shutdown.
fn spawn_input() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

async fn toggle(handle: IntervalHandle, repo: Arc<dyn Repository>) {
    match handle.toggle().await {
        Ok(state) => {
            // The live interval is always the most recent record.
            let current = match repo.last() {
                Ok(current) => current,
                Err(e) if e.is_recoverable() => return,
                Err(e) => {
                    warn!(error = %e, "could not read interval after toggle");
                    return;
                }
            };
            match state {
                IntervalState::Paused => emit(&Event::paused(&current)),
                _ => emit(&Event::resumed(&current)),
            }
        }
        Err(e) => debug!(error = %e, "toggle ignored"),
    }
}

pub async fn run(args: RunArgs, config: &IntervalConfig) -> Result<(), Box<dyn std::error::Error>> {
    let token = CancellationToken::new();
    let ctrl_c = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c.cancel();
        }
    });
    let mut input = spawn_input();

    for _ in 0..args.count {
        let mut interval = get_interval(config)?;
        let handle = interval.handle();

        let result = {
            let run = interval.start(
                &token,
                config,
                |i| emit(&Event::started(i)),
                |i| emit(&Event::tick(i)),
                |i| emit(&Event::completed(i)),
            );
            tokio::pin!(run);
            loop {
                tokio::select! {
                    result = &mut run => break result,
                    Some(line) = input.recv() => {
                        if line.trim() == "p" {
                            tokio::spawn(toggle(handle.clone(), config.repository_handle()));
                        }
                    }
                }
            }
        };

        match result {
            Ok(()) => {}
            Err(IntervalError::Cancelled) => {
                emit(&Event::cancelled(&interval));
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}
