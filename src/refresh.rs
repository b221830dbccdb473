//! Background refresh worker
//!
//! Refreshes once at startup, then on every interval tick or manual request.

use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError};

use crate::context::{AppContext, RefreshSignal};
use crate::runner::CodexBarCommand;

/// What the worker should do after a wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NextStep {
    Refresh,
    Stop,
}

/// Block until the next refresh is due
fn wait_for_next(signals: &Receiver<RefreshSignal>, interval: Duration) -> NextStep {
    match signals.recv_timeout(interval) {
        Ok(RefreshSignal::RefreshNow) => {
            // Collapse a burst of clicks into one refresh
            while let Ok(signal) = signals.try_recv() {
                if signal == RefreshSignal::Shutdown {
                    return NextStep::Stop;
                }
            }
            NextStep::Refresh
        }
        Ok(RefreshSignal::Shutdown) | Err(RecvTimeoutError::Disconnected) => NextStep::Stop,
        Err(RecvTimeoutError::Timeout) => NextStep::Refresh,
    }
}

/// Spawn the worker thread
pub fn spawn(
    command: CodexBarCommand,
    interval: Duration,
    ctx: AppContext,
    signals: Receiver<RefreshSignal>,
) -> anyhow::Result<JoinHandle<()>> {
    let handle = std::thread::Builder::new()
        .name("refresh".to_string())
        .spawn(move || {
            let rt = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
                Ok(rt) => rt,
                Err(e) => {
                    tracing::error!("Failed to create refresh runtime: {}", e);
                    return;
                }
            };

            loop {
                ctx.set_refreshing(true);
                let snapshot = rt.block_on(command.fetch_snapshot());
                tracing::info!(
                    "Refreshed: panel_ok={}, providers={}",
                    snapshot.panel_ok,
                    snapshot.payloads.len()
                );
                ctx.publish(snapshot);
                ctx.set_refreshing(false);

                if wait_for_next(&signals, interval) == NextStep::Stop {
                    tracing::debug!("Refresh worker stopping");
                    break;
                }
            }
        })?;
    Ok(handle)
}
