// AI
//! 📊 progress.rs -- "Are we there yet?" -- every migration, every time, forever.
//!
//! 🚀 One bar while the tickets go by, one comfy table at the end that says
//! how many were created, updated, written, skipped, or lost to the network.
//!
//! ⚠️  Warning: Watching this progress bar will not make it go faster.
//! Neither will refreshing it. We've tried. Science says no.
//!
//! 🦆 The duck has nothing to do with this module. It's just vibing.

use std::time::{Duration, Instant};

use comfy_table::{Cell, CellAlignment, ContentArrangement, Table, presets::NOTHING};
use indicatif::{ProgressBar, ProgressStyle};

use crate::common::IngestOutcome;

/// 🔢 Formats a number with commas. "1000000" → "1,000,000" -- you're welcome, eyes.
fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    for (i, c) in s.chars().enumerate() {
        if i > 0 && (s.len() - i) % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result
}

/// ⏱️ Formats a Duration into MM:SS or HH:MM:SS.
/// If it shows HH:MM:SS, you should probably call your mom. It's been a while.
fn format_duration(duration: Duration) -> String {
    let total_secs = duration.as_secs();
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    if hours > 0 {
        format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{:02}:{:02}", minutes, seconds)
    }
}

/// 🏷️ What happened to one ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Tally {
    /// 🆕 API mode, new document
    Created,
    /// 🔄 API mode, existing document replaced
    Updated,
    /// 📁 file mode, record on disk
    Written,
    /// 🗑️ the mapper said no
    Skipped,
    /// 💀 the sink said no
    Failed,
}

impl From<IngestOutcome> for Tally {
    fn from(outcome: IngestOutcome) -> Self {
        match outcome {
            IngestOutcome::Created => Tally::Created,
            IngestOutcome::Updated => Tally::Updated,
        }
    }
}

/// 📋 The counters, by themselves. Easy to assert on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Counts {
    pub(crate) processed: u64,
    pub(crate) created: u64,
    pub(crate) updated: u64,
    pub(crate) written: u64,
    pub(crate) skipped: u64,
    pub(crate) failed: u64,
}

/// 📊 Per-run counters plus the terminal bar.
///
/// # Ancient Proverb
/// "He who runs a migration without a progress bar, migrates alone and in darkness."
pub(crate) struct ProgressMetrics {
    /// 🏷️ what are we even migrating? a name to display in the UI
    label: String,
    total: u64,
    counts: Counts,
    progress_bar: ProgressBar,
    start_time: Instant,
}

impl std::fmt::Debug for ProgressMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // -- 🎭 ProgressBar is a diva and doesn't derive Debug
        f.debug_struct("ProgressMetrics")
            .field("label", &self.label)
            .field("total", &self.total)
            .field("counts", &self.counts)
            .finish()
    }
}

impl ProgressMetrics {
    /// 🚀 `total` is how many tickets we're about to chew through.
    pub(crate) fn new(label: impl Into<String>, total: u64) -> Self {
        let progress_bar = ProgressBar::new(total);
        // -- 🎨 cyan because it's classy, blue because it's calm
        let the_style = ProgressStyle::default_bar()
            .template("{msg}\n| [{bar:40.cyan/blue}] {pos}/{len}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-");
        progress_bar.set_style(the_style);

        Self {
            label: label.into(),
            total,
            counts: Counts::default(),
            progress_bar,
            start_time: Instant::now(),
        }
    }

    /// 🔄 One ticket done, one way or another.
    pub(crate) fn tick(&mut self, tally: Tally) {
        self.counts.processed += 1;
        match tally {
            Tally::Created => self.counts.created += 1,
            Tally::Updated => self.counts.updated += 1,
            Tally::Written => self.counts.written += 1,
            Tally::Skipped => self.counts.skipped += 1,
            Tally::Failed => self.counts.failed += 1,
        }
        self.render();
        self.progress_bar.set_position(self.counts.processed);
    }

    pub(crate) fn counts(&self) -> Counts {
        self.counts
    }

    pub(crate) fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// ✅ Mark the bar done and hand back the summary table for the log.
    pub(crate) fn finish(&self) -> Table {
        self.progress_bar.finish_and_clear();
        self.summary_table()
    }

    /// 🍽️ Two columns, right-aligned, no borders. Minimalism, and also the borders looked bad.
    pub(crate) fn summary_table(&self) -> Table {
        let mut table = Table::new();
        table.load_preset(NOTHING);
        table.set_content_arrangement(ContentArrangement::Dynamic);

        let the_rows = [
            ("source", self.label.clone()),
            ("tickets", format_number(self.total)),
            ("processed", format_number(self.counts.processed)),
            ("created", format_number(self.counts.created)),
            ("updated", format_number(self.counts.updated)),
            ("written", format_number(self.counts.written)),
            ("skipped", format_number(self.counts.skipped)),
            ("failed", format_number(self.counts.failed)),
            ("elapsed", format_duration(self.elapsed())),
        ];
        for (the_name, the_value) in the_rows {
            table.add_row(vec![
                Cell::new(the_name).set_alignment(CellAlignment::Right),
                Cell::new(the_value).set_alignment(CellAlignment::Right),
            ]);
        }
        table
    }

    /// 🎨 Live message above the bar: rate, counts, elapsed, and a linear guess at the rest.
    fn render(&self) {
        let elapsed = self.elapsed();
        let the_rate = if elapsed.as_secs_f64() > 0.0 {
            self.counts.processed as f64 / elapsed.as_secs_f64()
        } else {
            0.0
        };
        let remaining = if self.counts.processed > 0 && self.total > self.counts.processed {
            // 🔮 linear extrapolation. assumes the future looks like the past.
            let the_left = (self.total - self.counts.processed) as f64;
            format_duration(Duration::from_secs_f64(
                elapsed.as_secs_f64() / self.counts.processed as f64 * the_left,
            ))
        } else {
            "--:--".to_string()
        };

        let mut table = Table::new();
        table.load_preset(NOTHING);
        table.set_content_arrangement(ContentArrangement::Dynamic);
        table.add_row(vec![
            Cell::new(format!("{:.1} Tickets/s", the_rate)).set_alignment(CellAlignment::Right),
            Cell::new(format!(
                "{} ok / {} skipped / {} failed",
                format_number(self.counts.created + self.counts.updated + self.counts.written),
                format_number(self.counts.skipped),
                format_number(self.counts.failed)
            ))
            .set_alignment(CellAlignment::Right),
        ]);
        table.add_row(vec![
            Cell::new(format!("{} elapsed", format_duration(elapsed)))
                .set_alignment(CellAlignment::Right),
            Cell::new(format!("{} remaining", remaining)).set_alignment(CellAlignment::Right),
        ]);

        self.progress_bar
            .set_message(format!("source: {}\n{}", self.label, table));
    }
}
