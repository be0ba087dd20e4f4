//! Progress reporting utilities using indicatif.
//!
//! This module provides the [`ProgressCallback`] trait the pipeline reports
//! through, and [`Progress`], which renders it as terminal progress bars.
//!
//! # Plain Mode
//!
//! When plain mode is enabled (`--no-color` / `NO_COLOR`), progress
//! reporting uses uncolored ASCII bars and no spinner animation.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

/// Progress callback for duplicate finding phases.
///
/// Phases are reported by name: `"walking"`, `"partial"` and `"sampled"`.
pub trait ProgressCallback: Send + Sync {
    /// Called when a phase starts with the number of items it will process
    /// (0 when unknown).
    fn on_phase_start(&self, phase: &str, total: usize);

    /// Called for each item processed.
    ///
    /// # Arguments
    ///
    /// * `current` - Current item number (1-based)
    /// * `path` - Path being processed
    fn on_progress(&self, current: usize, path: &str);

    /// Called when an item has been processed, providing its size.
    fn on_item_completed(&self, _bytes: u64) {}

    /// Called when a phase completes.
    fn on_phase_end(&self, phase: &str);

    /// Called to update the progress message.
    fn on_message(&self, _message: &str) {}
}

/// Progress reporter using indicatif.
///
/// Holds one bar per pipeline phase; only the most recently started phase
/// receives position updates.
pub struct Progress {
    multi: MultiProgress,
    walking: Mutex<Option<ProgressBar>>,
    partial: Mutex<Option<ProgressBar>>,
    sampled: Mutex<Option<ProgressBar>>,
    prefix: Mutex<String>,
    quiet: bool,
    plain: bool,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Progress {
    /// Create a new progress reporter.
    ///
    /// # Examples
    ///
    /// ```
    /// use skimdupe::progress::Progress;
    ///
    /// let progress = Progress::new(false);
    /// ```
    #[must_use]
    pub fn new(quiet: bool) -> Self {
        Self::with_plain(quiet, false)
    }

    /// Create a new progress reporter, optionally in plain mode.
    ///
    /// # Examples
    ///
    /// ```
    /// use skimdupe::progress::Progress;
    ///
    /// let progress = Progress::with_plain(false, true);
    /// assert!(progress.is_plain());
    /// ```
    #[must_use]
    pub fn with_plain(quiet: bool, plain: bool) -> Self {
        Self {
            multi: MultiProgress::new(),
            walking: Mutex::new(None),
            partial: Mutex::new(None),
            sampled: Mutex::new(None),
            prefix: Mutex::new(String::new()),
            quiet,
            plain,
        }
    }

    /// Check if plain mode is enabled.
    #[must_use]
    pub fn is_plain(&self) -> bool {
        self.plain
    }

    fn walking_style(&self) -> ProgressStyle {
        if self.plain {
            ProgressStyle::with_template("{msg} [{elapsed_precise}] {pos} files")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
        } else {
            ProgressStyle::with_template("{spinner:.green} {msg} [{elapsed_precise}] {pos} files")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
        }
    }

    fn bar_style(&self, color: &str) -> ProgressStyle {
        if self.plain {
            ProgressStyle::with_template(
                "[{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg} (ETA: {eta})",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-")
        } else {
            let template = format!(
                "[{{elapsed_precise}}] [{{bar:40.{color}/blue}}] {{pos}}/{{len}} ({{percent}}%) {{msg}} (ETA: {{eta}})"
            );
            ProgressStyle::with_template(&template)
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("█>-")
        }
    }

    fn slot(&self, phase: &str) -> Option<&Mutex<Option<ProgressBar>>> {
        match phase {
            "walking" => Some(&self.walking),
            "partial" => Some(&self.partial),
            "sampled" => Some(&self.sampled),
            _ => None,
        }
    }

    /// The bar of the latest active phase.
    fn with_active_bar(&self, f: impl FnOnce(&ProgressBar)) {
        for slot in [&self.sampled, &self.partial, &self.walking] {
            if let Some(ref pb) = *lock(slot) {
                f(pb);
                return;
            }
        }
    }
}

impl ProgressCallback for Progress {
    fn on_phase_start(&self, phase: &str, total: usize) {
        if self.quiet {
            return;
        }

        let pb = match phase {
            "walking" => {
                let pb = self.multi.add(ProgressBar::new_spinner());
                pb.set_style(self.walking_style());
                pb.set_message("Walking directory");
                let tick_rate = if self.plain { 500 } else { 100 };
                pb.enable_steady_tick(Duration::from_millis(tick_rate));
                pb
            }
            "partial" => {
                let pb = self.multi.add(ProgressBar::new(total as u64));
                pb.set_style(self.bar_style("cyan"));
                pb.set_message("Partial fingerprints");
                pb
            }
            "sampled" => {
                let pb = self.multi.add(ProgressBar::new(total as u64));
                pb.set_style(self.bar_style("green"));
                pb.set_message("Sampled fingerprints");
                pb
            }
            _ => return,
        };

        if let Some(slot) = self.slot(phase) {
            *lock(slot) = Some(pb);
        }
    }

    fn on_progress(&self, current: usize, path: &str) {
        if self.quiet {
            return;
        }

        let display_msg = {
            let prefix = lock(&self.prefix);
            if prefix.is_empty() {
                truncate_path(path, 30)
            } else {
                format!("{}: {}", *prefix, truncate_path(path, 30))
            }
        };

        self.with_active_bar(|pb| {
            pb.set_position(current as u64);
            pb.set_message(display_msg);
        });
    }

    fn on_phase_end(&self, phase: &str) {
        if self.quiet {
            return;
        }

        let message = match phase {
            "walking" => "Walking complete",
            "partial" => "Partial fingerprints complete",
            "sampled" => "Sampled fingerprints complete",
            _ => return,
        };
        if let Some(pb) = self.slot(phase).and_then(|slot| lock(slot).take()) {
            pb.finish_with_message(message);
        }
        lock(&self.prefix).clear();
    }

    fn on_message(&self, message: &str) {
        if self.quiet {
            return;
        }

        *lock(&self.prefix) = message.to_string();
        self.with_active_bar(|pb| pb.set_message(message.to_string()));
    }
}

/// Truncate a path for display in the progress bar.
fn truncate_path(path: &str, max_len: usize) -> String {
    if path.chars().count() <= max_len {
        return path.to_string();
    }

    let file_name = std::path::Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    let name_len = file_name.chars().count();
    if name_len >= max_len {
        let tail: String = file_name.chars().skip(name_len + 3 - max_len).collect();
        return format!("...{tail}");
    }

    format!(".../{file_name}")
}
