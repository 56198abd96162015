//! Terminal progress for acquisition cycles.
//!
//! TTY mode: one indicatif bar fed from [`ProgressSnapshot`]s.
//! Non-TTY mode: hidden bars; the log is the only progress indicator.

use std::io::IsTerminal;
use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

use crate::model::ProgressSnapshot;
use crate::present::progress_message;

/// Counted bar, shown once the backend reports a total
fn bar_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("{prefix:<12.dim} {bar:30.green/dim} {pos:>4}/{len:4} {wide_msg:.dim}")
        .expect("invalid template")
        .progress_chars("━━")
}

/// Spinner shown while waiting for the server or a total
fn pending_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.green} {prefix:<12.cyan.bold} {wide_msg}")
        .expect("invalid template")
}

/// Push a snapshot into a bar, switching to the counted style when a total appears.
pub fn apply_snapshot(pb: &ProgressBar, snapshot: &ProgressSnapshot) {
    if snapshot.total > 0 {
        if pb.length() != Some(snapshot.total) {
            pb.set_length(snapshot.total);
            pb.set_style(bar_style());
        }
        pb.set_position(snapshot.current);
        pb.set_message(snapshot.latest_item.clone());
    } else {
        pb.set_message(progress_message(snapshot));
    }
}

/// Central progress context.
pub struct ProgressContext {
    multi: MultiProgress,
    is_tty: bool,
}

impl ProgressContext {
    /// Create new context, detecting TTY automatically.
    pub fn new() -> Self {
        let is_tty = std::io::stderr().is_terminal();
        Self {
            multi: MultiProgress::new(),
            is_tty,
        }
    }

    /// Spinner line for a named phase (e.g. "server", "fetch").
    ///
    /// Hidden when not attached to a terminal.
    pub fn stage_line(&self, name: &str) -> ProgressBar {
        if !self.is_tty {
            return ProgressBar::hidden();
        }
        let pb = self.multi.add(ProgressBar::new_spinner());
        pb.set_style(pending_style());
        pb.set_prefix(name.to_string());
        pb.enable_steady_tick(Duration::from_millis(80));
        pb
    }

    /// Print a line above managed progress bars.
    pub fn println(&self, msg: impl AsRef<str>) {
        if self.is_tty {
            let _ = self.multi.println(msg);
        } else {
            eprintln!("{}", msg.as_ref());
        }
    }

    pub fn is_tty(&self) -> bool {
        self.is_tty
    }

    /// Get reference to `MultiProgress` for the log bridge.
    pub fn multi(&self) -> &MultiProgress {
        &self.multi
    }
}

impl Default for ProgressContext {
    fn default() -> Self {
        Self::new()
    }
}
