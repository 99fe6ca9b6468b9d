//! Build orchestration: drives a metainfo build to a single outcome while
//! reporting progress.
//!
//! ```text
//! Idle --begin--> Reporting --ok completion--> Succeeded (end)
//!                     |
//!                     +------err completion--> Failed (no end)
//! ```
//!
//! The engine hashes on its own worker pool. This module only waits on two
//! signals: the progress watch, relayed to the [`Reporter`], and the
//! completion, which is the only way out of the loop. There are no retries;
//! a failed build has to be started again from scratch.

mod error;

use std::io::Write;
use std::time::Duration;

use tokio::time::sleep;
use tracing::debug;

use crate::metainfo::{Batch, Completion, Progress, TorrentBuilder};
use crate::progress::{Reporter, Style};

pub use error::MakeError;

/// Pause after each progress update so rendering never outpaces useful
/// change.
pub const THROTTLE: Duration = Duration::from_millis(250);

/// Builds a metainfo file with progress on stdout.
///
/// `open_sink` is called after the configuration has been accepted and
/// before reporting begins; it receives the submitted batch so the caller can
/// derive an output name from it.
///
/// # Examples
///
/// ```no_run
/// use torkit::make::{self, MakeError};
/// use torkit::metainfo::TorrentBuilder;
/// use torkit::progress::Style;
///
/// # async fn example() -> Result<(), MakeError> {
/// let builder = TorrentBuilder::new()
///     .add_announce_group(vec!["http://tracker.example.com/announce".into()])
///     .add_file("video.mkv");
///
/// make::run(
///     builder,
///     |batch| {
///         let path = format!("{}.torrent", batch.default_name());
///         std::fs::File::create(&path).map_err(|source| MakeError::Output {
///             path: path.into(),
///             source,
///         })
///     },
///     4,
///     Style::plain(),
/// )
/// .await
/// # }
/// ```
pub async fn run<F, W>(
    builder: TorrentBuilder,
    open_sink: F,
    workers: usize,
    style: Style,
) -> Result<(), MakeError>
where
    F: FnOnce(&Batch) -> Result<W, MakeError>,
    W: Write + Send + 'static,
{
    let mut reporter = Reporter::stdout(style);
    debug!(rich = reporter.is_rich(), "selected progress reporter");
    run_with_reporter(builder, open_sink, workers, &mut reporter).await
}

/// [`run`] with a reporter chosen by the caller.
pub async fn run_with_reporter<F, W, R>(
    builder: TorrentBuilder,
    open_sink: F,
    workers: usize,
    reporter: &mut Reporter<R>,
) -> Result<(), MakeError>
where
    F: FnOnce(&Batch) -> Result<W, MakeError>,
    W: Write + Send + 'static,
    R: Write,
{
    let batch = builder.submit().map_err(MakeError::Submit)?;
    let total = batch.total_size();
    let sink = open_sink(&batch)?;

    debug!(
        name = batch.default_name(),
        total,
        pieces = batch.piece_count(),
        workers,
        "starting build"
    );

    reporter.begin();
    let (completion, progress) = batch.start(sink, workers);
    drive(reporter, total, completion, progress, THROTTLE).await
}

/// Relays progress to `reporter` until the completion signal fires.
///
/// Pending progress is rendered before a completion that arrives at the same
/// time. A closed progress source is ignored; a completion source that closes
/// without a value is [`MakeError::Aborted`].
pub async fn drive<R: Write>(
    reporter: &mut Reporter<R>,
    total: u64,
    mut completion: Completion,
    mut progress: Progress,
    throttle: Duration,
) -> Result<(), MakeError> {
    let mut progress_open = true;

    loop {
        tokio::select! {
            biased;
            changed = progress.changed(), if progress_open => {
                match changed {
                    Ok(()) => {
                        let done = *progress.borrow_and_update();
                        reporter.report(done, total);
                        sleep(throttle).await;
                    }
                    Err(_) => progress_open = false,
                }
            }
            result = &mut completion => {
                return match result {
                    Ok(Ok(())) => {
                        reporter.end();
                        debug!(total, "build finished");
                        Ok(())
                    }
                    Ok(Err(e)) => Err(MakeError::Build(e)),
                    Err(_) => Err(MakeError::Aborted),
                };
            }
        }
    }
}

#[cfg(test)]
mod tests;
