use indicatif::{ProgressBar, ProgressStyle};
use std::sync::{Arc, Mutex};
use tracing::debug;

use offline_tiles::Progress;

/// Draws a progress bar for the running job, one bar per source.
#[derive(Clone, Default)]
pub struct ProgressReporter {
    bar: Arc<Mutex<Option<ProgressBar>>>,
}

impl ProgressReporter {
    pub fn report(&self, progress: &Progress) {
        debug!(
            source = %progress.source,
            completed = progress.completed,
            total = progress.total,
            summary = %progress.summary,
            "progress"
        );

        let mut bar = match self.bar.lock() {
            Ok(bar) => bar,
            Err(poisoned) => poisoned.into_inner(),
        };

        let pb = bar.get_or_insert_with(|| new_bar(progress.total as u64));
        pb.set_position(progress.completed as u64);
        pb.set_message(format!("{} ({})", progress.source, progress.summary));

        if progress.completed >= progress.total {
            pb.finish_and_clear();
            *bar = None;
        }
    }
}

fn new_bar(len: u64) -> ProgressBar {
    let pb = ProgressBar::new(len);
    let style = ProgressStyle::default_bar()
        .template("[{elapsed_precise}] {bar:60.cyan/blue} {pos:>7}/{len:7} ETA: {eta} {msg}")
        .map(|style| style.progress_chars("##-"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    pb.set_style(style);

    pb
}
