//! Subcommands

pub mod cache;
pub mod refresh;
pub mod show;

use std::future::Future;

use anyhow::Result;
use comfy_table::{Cell, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL};

use scholarview_client::{AcquisitionController, ControllerState, Transport};
use scholarview_core::{ProgressContext, apply_snapshot};

/// Drive `work` while mirroring the controller's state and progress onto a terminal line.
pub async fn with_progress<T, F, R>(
    ctl: &AcquisitionController<T>,
    progress: &ProgressContext,
    work: F,
) -> R
where
    T: Transport,
    F: Future<Output = R>,
{
    let line = progress.stage_line("server");
    line.set_message("Waiting for server...");

    let mut states = ctl.subscribe_state();
    let mut snapshots = ctl.subscribe_progress();
    tokio::pin!(work);

    let result = loop {
        tokio::select! {
            result = &mut work => break result,
            Ok(()) = states.changed() => {
                let state = states.borrow_and_update().clone();
                match state {
                    ControllerState::CheckingServer => {
                        line.set_prefix("server");
                        line.set_message("Waiting for server...");
                    }
                    ControllerState::Acquiring => {
                        line.set_prefix("fetch");
                        line.set_message("Loading publications...");
                    }
                    ControllerState::Ready(_) | ControllerState::Failed(_) => {}
                }
            }
            Ok(()) = snapshots.changed() => {
                let snapshot = snapshots.borrow_and_update().clone();
                apply_snapshot(&line, &snapshot);
            }
        }
    };

    line.finish_and_clear();
    result
}

/// Table with the house style: full UTF-8 borders, cyan headers.
pub fn styled_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(
            headers
                .iter()
                .map(|h| Cell::new(h).fg(Color::Cyan))
                .collect::<Vec<_>>(),
        );
    table
}

/// Fail fast when a subcommand was cancelled by a signal.
pub fn interrupted<T>(result: Result<T, scholarview_client::ClientError>) -> Result<T> {
    match result {
        Err(scholarview_client::ClientError::Cancelled) => anyhow::bail!("Interrupted"),
        other => Ok(other?),
    }
}
