//! Progress indicators for graphsync CLI.

use colored::Colorize;
use graphkit::{Error, MemberAction, SyncProgress};
use indicatif::{ProgressBar, ProgressStyle};

/// Progress bar over collection operations
pub struct BarProgress {
    bar: ProgressBar,
    quiet: bool,
}

impl BarProgress {
    pub fn new(quiet: bool) -> Self {
        let bar = if quiet {
            ProgressBar::hidden()
        } else {
            ProgressBar::new(0)
        };
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );
        Self { bar, quiet }
    }
}

impl SyncProgress for BarProgress {
    fn on_start(&mut self, total: usize) {
        self.bar.set_length(total as u64);
    }

    fn on_member_start(&mut self, member: &str, action: MemberAction) {
        self.bar.set_message(format!("{action} {member}"));
    }

    fn on_member_complete(&mut self, member: &str, action: MemberAction, error: Option<&Error>) {
        if let Some(error) = error
            && !self.quiet
        {
            self.bar.println(format!(
                "{} {action} {member}: {error}",
                "✗".red()
            ));
        }
        self.bar.inc(1);
    }

    fn on_complete(&mut self) {
        self.bar.finish_and_clear();
    }
}
