//! Progress tracking for the migration run
//!
//! One tracker per cohort, fed by the single consumer draining the mover's
//! output stream. Renders an overwrite-in-place line
//!
//! ```text
//! cohort: <subCnt>/<subTotal>, all: <cnt>/<tot>
//! ```
//!
//! where the counters are padded to the digit width of their totals so the
//! line never grows mid-cohort. Run totals are threaded through cohorts by
//! value; the tracker's own counters are not shared across threads.

use crate::cohort::{CohortSpec, SizeRange};
use crate::executor::CompletionRecord;
use console::style;
use humansize::{format_size, BINARY};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::Duration;

/// Accumulated run totals, passed by value between cohort invocations
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunState {
    /// Items in the whole run
    pub total_items: u64,

    /// Items moved successfully so far
    pub moved: u64,

    /// Items the mover reported an error for
    pub failed: u64,
}

impl RunState {
    /// Create the run state for a fresh inventory
    pub fn new(total_items: u64) -> Self {
        Self {
            total_items,
            moved: 0,
            failed: 0,
        }
    }

    /// Items with a completion signal so far (moved or failed)
    pub fn completed(&self) -> u64 {
        self.moved + self.failed
    }
}

/// Number of digits needed to print `n`
fn digit_width(n: u64) -> usize {
    n.to_string().len()
}

/// Render the progress line with constant-width counters
pub fn render_line(sub_cnt: u64, sub_total: u64, cnt: u64, total: u64) -> String {
    format!(
        "cohort: {:>sw$}/{}, all: {:>w$}/{}",
        sub_cnt,
        sub_total,
        cnt,
        total,
        sw = digit_width(sub_total),
        w = digit_width(total),
    )
}

/// Per-cohort progress tracker
///
/// Strictly a sequential consumer: records are applied in arrival order by
/// the one thread draining the stream.
pub struct CohortTracker {
    /// Items in this cohort
    sub_total: u64,

    /// Cohort-local moved count
    sub_moved: u64,

    /// Cohort-local failed count
    sub_failed: u64,

    /// Run totals carried in from earlier cohorts
    run: RunState,

    /// In-place display line
    bar: ProgressBar,
}

impl CohortTracker {
    /// Create a tracker for one cohort, carrying in the run totals
    pub fn new(sub_total: u64, run: RunState, quiet: bool) -> Self {
        let bar = if quiet {
            ProgressBar::with_draw_target(Some(sub_total), ProgressDrawTarget::hidden())
        } else {
            ProgressBar::new(sub_total)
        };
        bar.set_style(ProgressStyle::with_template("{msg}").expect("Invalid progress template"));

        let tracker = Self {
            sub_total,
            sub_moved: 0,
            sub_failed: 0,
            run,
            bar,
        };
        tracker.bar.set_message(tracker.render());
        tracker
    }

    /// Apply one completion record
    pub fn record(&mut self, record: &CompletionRecord) {
        if record.outcome.is_moved() {
            self.sub_moved += 1;
            self.run.moved += 1;
        } else {
            self.sub_failed += 1;
            self.run.failed += 1;
        }
        self.bar.set_message(self.render());
        self.bar.inc(1);
    }

    /// Cohort-local completed count
    pub fn sub_completed(&self) -> u64 {
        self.sub_moved + self.sub_failed
    }

    /// Render the current progress line
    fn render(&self) -> String {
        render_line(
            self.sub_completed(),
            self.sub_total,
            self.run.completed(),
            self.run.total_items,
        )
    }

    /// Leave the final newline-terminated summary line and yield the totals
    pub fn finish(self) -> RunState {
        self.bar.finish_with_message(self.render());
        self.run
    }
}

/// Human label for a cohort's byte range
pub fn format_range(range: &SizeRange) -> String {
    match range.upper {
        Some(1) if range.lower == 0 => "empty files".to_string(),
        Some(upper) => format!(
            "{} to {}",
            format_size(range.lower, BINARY),
            format_size(upper, BINARY)
        ),
        None => format!("{} and up", format_size(range.lower, BINARY)),
    }
}

/// Print a header at the start of the run
pub fn print_header(src_resc: &str, dest_resc: &str, log_path: &str, bytes: u64) {
    println!();
    println!(
        "{} {}",
        style("resc-rebalance").cyan().bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!("{}", style("─".repeat(50)).dim());
    println!("  {} {}", style("Source:").bold(), src_resc);
    println!("  {} {}", style("Destination:").bold(), dest_resc);
    println!("  {} {}", style("Volume:").bold(), format_size(bytes, BINARY));
    println!("  {} {}", style("Log:").bold(), log_path);
    println!();
}

/// Print a banner line before a cohort starts
pub fn print_cohort(spec: &CohortSpec, count: usize, processes: u32) {
    println!(
        "{} {} ({}): {} objects, {} processes",
        style(format!("cohort {}/8", spec.index)).bold(),
        style("▶").dim(),
        format_range(&spec.range),
        count,
        processes
    );
}

/// Print a summary of the run results
pub fn print_summary(run: &RunState, duration: Duration, completed: bool) {
    let duration_secs = duration.as_secs_f64();
    let rate = if duration_secs > 0.0 {
        run.completed() as f64 / duration_secs
    } else {
        0.0
    };

    println!();
    if completed {
        println!("{}", style("Migration Complete").green().bold());
    } else {
        println!("{}", style("Migration Interrupted").yellow().bold());
    }
    println!("{}", style("─".repeat(50)).dim());
    println!("  {} {}", style("Moved:").bold(), run.moved);
    if run.failed > 0 {
        println!("  {} {}", style("Failed:").yellow().bold(), run.failed);
    }
    println!(
        "  {} {:.1}s ({:.0} objects/sec)",
        style("Duration:").bold(),
        duration_secs,
        rate
    );
    println!(
        "  {} {} data objects processed",
        style("Total:").bold(),
        run.completed()
    );
    println!();
}
