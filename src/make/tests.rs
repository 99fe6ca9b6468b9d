use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};

use tempfile::TempDir;
use tokio::sync::{oneshot, watch};

use super::*;
use crate::metainfo::MetainfoError;
use crate::progress::Width;

const TOTAL: u64 = 100_000_000;

#[derive(Clone, Default)]
struct SharedSink(Arc<Mutex<Vec<u8>>>);

impl SharedSink {
    fn contents(&self) -> Vec<u8> {
        self.0.lock().unwrap().clone()
    }
}

impl Write for SharedSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn rich() -> Reporter<Vec<u8>> {
    Reporter::rich(Vec::new(), Style::plain(), Width::Fixed(80))
}

fn minimal() -> Reporter<Vec<u8>> {
    Reporter::minimal(Vec::new(), Style::plain())
}

fn output(reporter: Reporter<Vec<u8>>) -> String {
    String::from_utf8(reporter.into_inner()).unwrap()
}

/// Percentages shown by each carriage-return terminated rich line.
fn reported_percents(out: &str) -> Vec<u64> {
    let mut segments: Vec<&str> = out.split('\r').collect();
    segments.pop();
    segments
        .iter()
        .map(|line| line.rsplit(' ').next().unwrap().trim_end_matches('%'))
        .map(|p| p.parse().unwrap())
        .collect()
}

/// Feeds `steps` to a progress watch with room for the throttle between
/// them, then resolves the completion with `outcome`.
fn script(
    steps: Vec<u64>,
    outcome: Option<Result<(), MetainfoError>>,
) -> (Completion, Progress) {
    let (progress_tx, progress_rx) = watch::channel(0u64);
    let (done_tx, done_rx) = oneshot::channel();

    tokio::spawn(async move {
        for done in steps {
            progress_tx.send_replace(done);
            sleep(THROTTLE * 2).await;
        }
        if let Some(outcome) = outcome {
            let _ = done_tx.send(outcome);
        }
    });

    (done_rx, progress_rx)
}

fn write_file(path: &Path, data: &[u8]) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, data).unwrap();
}

fn builder() -> TorrentBuilder {
    TorrentBuilder::new()
        .add_announce_group(vec!["http://t/a".to_string()])
        .created_by("test")
        .creation_date(1_700_000_000)
}

#[tokio::test(start_paused = true)]
async fn test_reports_every_step_then_ends_once() {
    let steps = (1..=10).map(|i| i * TOTAL / 10).collect();
    let (completion, progress) = script(steps, Some(Ok(())));

    let mut reporter = rich();
    reporter.begin();
    drive(&mut reporter, TOTAL, completion, progress, THROTTLE)
        .await
        .unwrap();

    let out = output(reporter);
    assert_eq!(
        reported_percents(&out),
        vec![10, 20, 30, 40, 50, 60, 70, 80, 90, 100]
    );
    assert_eq!(out.matches('\n').count(), 1);
    assert!(out.ends_with(&format!("[{}] 100%\n", "=".repeat(45))));
}

#[tokio::test(start_paused = true)]
async fn test_failure_skips_end() {
    let steps = vec![TOTAL / 10, TOTAL / 5, TOTAL / 4];
    let outcome = Err(MetainfoError::Worker("disk on fire".into()));
    let (completion, progress) = script(steps, Some(outcome));

    let mut reporter = rich();
    reporter.begin();
    let err = drive(&mut reporter, TOTAL, completion, progress, THROTTLE)
        .await
        .unwrap_err();

    assert!(matches!(err, MakeError::Build(MetainfoError::Worker(_))));
    assert!(err.during_build());
    assert!(err.to_string().contains("disk on fire"));

    let out = output(reporter);
    assert_eq!(reported_percents(&out), vec![10, 20, 25]);
    assert!(!out.contains('\n'));
    assert!(!out.contains('='));
}

#[tokio::test(start_paused = true)]
async fn test_dropped_completion_is_aborted() {
    let (completion, progress) = script(vec![TOTAL / 2], None);

    let mut reporter = minimal();
    reporter.begin();
    let err = drive(&mut reporter, TOTAL, completion, progress, THROTTLE)
        .await
        .unwrap_err();

    assert!(matches!(err, MakeError::Aborted));
    assert!(!output(reporter).contains("Done."));
}

#[tokio::test(start_paused = true)]
async fn test_completion_without_progress() {
    let (completion, progress) = script(Vec::new(), Some(Ok(())));

    let mut reporter = minimal();
    reporter.begin();
    drive(&mut reporter, TOTAL, completion, progress, THROTTLE)
        .await
        .unwrap();

    assert_eq!(
        output(reporter),
        "Hashing contents:   0%\rHashing contents: 100%\rHashing contents: Done.\n"
    );
}

#[tokio::test(start_paused = true)]
async fn test_pending_progress_rendered_before_completion() {
    let (progress_tx, progress_rx) = watch::channel(0u64);
    let (done_tx, done_rx) = oneshot::channel();
    progress_tx.send_replace(TOTAL / 2);
    done_tx.send(Ok(())).unwrap();
    drop(progress_tx);

    let mut reporter = rich();
    reporter.begin();
    drive(&mut reporter, TOTAL, done_rx, progress_rx, THROTTLE)
        .await
        .unwrap();

    let out = output(reporter);
    assert_eq!(reported_percents(&out), vec![50]);
    assert!(out.ends_with("] 100%\n"));
}

#[tokio::test(start_paused = true)]
async fn test_zero_total() {
    let (completion, progress) = script(vec![0], Some(Ok(())));

    let mut reporter = minimal();
    reporter.begin();
    drive(&mut reporter, 0, completion, progress, THROTTLE)
        .await
        .unwrap();

    assert!(output(reporter).ends_with("Hashing contents: Done.\n"));
}

#[tokio::test]
async fn test_run_builds_metainfo() {
    let temp = TempDir::new().unwrap();
    write_file(&temp.path().join("album/a.bin"), &vec![1u8; 40_000]);
    write_file(&temp.path().join("album/b.bin"), &vec![2u8; 30_000]);

    let sink = SharedSink::default();
    let opened = sink.clone();
    let mut reporter = minimal();

    run_with_reporter(
        builder()
            .add_file(temp.path().join("album/a.bin"))
            .add_file(temp.path().join("album/b.bin"))
            .piece_length(16384),
        move |batch| {
            assert_eq!(batch.default_name(), "album");
            assert_eq!(batch.total_size(), 70_000);
            Ok(opened)
        },
        4,
        &mut reporter,
    )
    .await
    .unwrap();

    let out = output(reporter);
    assert!(out.starts_with("Hashing contents:   0%"));
    assert!(out.ends_with("Hashing contents: Done.\n"));

    let metainfo = sink.contents();
    assert!(metainfo.starts_with(b"d8:announce10:http://t/a"));
    assert!(metainfo.ends_with(b"ee"));
}

#[tokio::test]
async fn test_run_rejected_config_renders_nothing() {
    let mut reporter = minimal();
    let err = run_with_reporter(
        TorrentBuilder::new().add_file("/nonexistent"),
        |_| -> Result<SharedSink, MakeError> { panic!("sink opened for a rejected batch") },
        1,
        &mut reporter,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, MakeError::Submit(MetainfoError::MissingField(_))));
    assert!(!err.during_build());
    assert!(output(reporter).is_empty());
}

#[tokio::test]
async fn test_run_sink_failure_renders_nothing() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("data.bin");
    write_file(&path, b"hello");

    let mut reporter = minimal();
    let err = run_with_reporter(
        builder().add_file(&path),
        |_| -> Result<SharedSink, MakeError> {
            Err(MakeError::Output {
                path: "out.torrent".into(),
                source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
            })
        },
        1,
        &mut reporter,
    )
    .await
    .unwrap_err();

    assert_eq!(err.to_string(), "error creating \"out.torrent\": denied");
    assert!(output(reporter).is_empty());
}

#[tokio::test]
async fn test_run_missing_input_fails_build() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("data.bin");
    write_file(&path, &vec![7u8; 10_000]);

    let batch_path = path.clone();
    let mut reporter = minimal();
    let err = run_with_reporter(
        builder().add_file(&path),
        move |_| {
            std::fs::remove_file(&batch_path).unwrap();
            Ok(SharedSink::default())
        },
        2,
        &mut reporter,
    )
    .await
    .unwrap_err();

    assert!(err.during_build());
    assert!(!output(reporter).contains("Done."));
}
