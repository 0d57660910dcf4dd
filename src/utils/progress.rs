use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Terminal progress reporting for the CLI.
pub struct ProgressReporter {
    bar: ProgressBar,
}

impl ProgressReporter {
    /// A counted bar over a known number of work items.
    pub fn bar(total: u64, message: &str) -> Self {
        let pb = ProgressBar::new(total);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{msg}\n[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len}")
                .unwrap()
                .progress_chars("#>-"),
        );
        pb.set_message(message.to_string());

        Self { bar: pb }
    }

    /// A spinner for work without a known item count.
    pub fn spinner(message: &str) -> Self {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap(),
        );
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));

        Self { bar: pb }
    }

    pub fn inc(&self, delta: u64) {
        self.bar.inc(delta);
    }

    pub fn finish_with_message(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }
}

impl Drop for ProgressReporter {
    fn drop(&mut self) {
        self.bar.finish();
    }
}
