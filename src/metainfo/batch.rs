//! The hashing side of the build engine.
//!
//! A [`Batch`] is a validated build job. [`Batch::start`] spawns the job on
//! the current tokio runtime and returns two signal sources:
//!
//! - a [`Completion`] that fires exactly once, with the outcome of the whole
//!   job, after the metainfo has been written to the sink;
//! - a [`Progress`] watch channel carrying the cumulative number of bytes
//!   hashed so far.
//!
//! Pieces are read one at a time from the concatenation of all input files
//! and hashed on the blocking pool. A semaphore bounds the number of pieces
//! in flight to the worker count.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, ErrorKind, Read, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use bytes::Bytes;
use sha1::{Digest, Sha1};
use tokio::sync::{oneshot, watch, Semaphore};
use tokio::task::JoinError;
use tracing::debug;

use super::error::MetainfoError;
use crate::bencode::{encode_to, Value};

/// Fires once with the outcome of a started batch.
pub type Completion = oneshot::Receiver<Result<(), MetainfoError>>;

/// Cumulative bytes hashed so far. Only ever increases.
pub type Progress = watch::Receiver<u64>;

/// Length of a SHA1 piece digest.
const DIGEST_LEN: usize = 20;

/// An input file resolved by [`TorrentBuilder::submit`](super::TorrentBuilder::submit).
#[derive(Debug, Clone)]
pub(crate) struct BatchFile {
    /// Absolute path on disk.
    pub(crate) path: PathBuf,
    /// Path components inside the torrent.
    pub(crate) torrent_path: Vec<String>,
    /// Length at submit time.
    pub(crate) length: u64,
}

/// A submitted build job.
#[derive(Debug)]
pub struct Batch {
    pub(crate) name: String,
    pub(crate) files: Vec<BatchFile>,
    pub(crate) total_size: u64,
    pub(crate) piece_length: u64,
    pub(crate) single_file: bool,
    pub(crate) announce_groups: Vec<Vec<String>>,
    pub(crate) comment: Option<String>,
    pub(crate) private: bool,
    pub(crate) web_seeds: Vec<String>,
    pub(crate) created_by: Option<String>,
    pub(crate) creation_date: Option<i64>,
}

impl Batch {
    /// The torrent name: the override if one was given, otherwise derived
    /// from the inputs.
    pub fn default_name(&self) -> &str {
        &self.name
    }

    /// Sum of all input file lengths.
    pub fn total_size(&self) -> u64 {
        self.total_size
    }

    pub fn piece_length(&self) -> u64 {
        self.piece_length
    }

    pub fn piece_count(&self) -> usize {
        self.total_size.div_ceil(self.piece_length) as usize
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// Starts hashing with `workers` parallel hashers (at least one) and
    /// writes the finished metainfo to `sink`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start<W>(self, sink: W, workers: usize) -> (Completion, Progress)
    where
        W: Write + Send + 'static,
    {
        let (completion_tx, completion_rx) = oneshot::channel();
        let (progress_tx, progress_rx) = watch::channel(0u64);

        tokio::spawn(async move {
            let result = self.run(sink, workers.max(1), progress_tx).await;
            if let Err(ref e) = result {
                debug!("hash job failed: {}", e);
            }
            let _ = completion_tx.send(result);
        });

        (completion_rx, progress_rx)
    }

    async fn run<W>(
        self,
        sink: W,
        workers: usize,
        progress: watch::Sender<u64>,
    ) -> Result<(), MetainfoError>
    where
        W: Write + Send + 'static,
    {
        debug!(
            name = %self.name,
            pieces = self.piece_count(),
            workers,
            total_size = self.total_size,
            "starting hash job"
        );

        let progress = Arc::new(progress);
        let hashed = Arc::new(AtomicU64::new(0));
        let permits = Arc::new(Semaphore::new(workers));
        let mut reader = PieceReader::new(self.files.clone(), self.piece_length as usize);
        let mut hashers = Vec::with_capacity(self.piece_count());

        loop {
            let permit = permits
                .clone()
                .acquire_owned()
                .await
                .map_err(|e| MetainfoError::Worker(e.to_string()))?;

            let (returned, piece) = tokio::task::spawn_blocking(move || {
                let piece = reader.next_piece();
                (reader, piece)
            })
            .await
            .map_err(worker_error)?;
            reader = returned;

            let Some(piece) = piece? else {
                break;
            };

            let hashed = hashed.clone();
            let progress = progress.clone();
            hashers.push(tokio::task::spawn_blocking(move || {
                let digest: [u8; DIGEST_LEN] = Sha1::digest(&piece).into();
                let len = piece.len() as u64;
                let done = hashed.fetch_add(len, Ordering::AcqRel) + len;
                progress.send_if_modified(|current| {
                    if done > *current {
                        *current = done;
                        true
                    } else {
                        false
                    }
                });
                drop(permit);
                digest
            }));
        }

        let mut pieces = Vec::with_capacity(hashers.len() * DIGEST_LEN);
        for hasher in hashers {
            pieces.extend_from_slice(&hasher.await.map_err(worker_error)?);
        }

        let metainfo = self.to_value(pieces);
        tokio::task::spawn_blocking(move || -> Result<(), MetainfoError> {
            let mut sink = BufWriter::new(sink);
            encode_to(&metainfo, &mut sink)?;
            sink.flush()?;
            Ok(())
        })
        .await
        .map_err(worker_error)??;

        debug!(name = %self.name, "hash job finished");
        Ok(())
    }

    /// Assembles the metainfo dictionary around the computed piece digests.
    fn to_value(&self, pieces: Vec<u8>) -> Value {
        let mut info = BTreeMap::new();
        info.insert(Bytes::from_static(b"name"), Value::string(&self.name));
        info.insert(
            Bytes::from_static(b"piece length"),
            Value::Integer(self.piece_length as i64),
        );
        info.insert(Bytes::from_static(b"pieces"), Value::from(pieces));
        if self.private {
            info.insert(Bytes::from_static(b"private"), Value::Integer(1));
        }

        if self.single_file {
            info.insert(
                Bytes::from_static(b"length"),
                Value::Integer(self.total_size as i64),
            );
        } else {
            let files = self
                .files
                .iter()
                .map(|file| {
                    let mut entry = BTreeMap::new();
                    entry.insert(
                        Bytes::from_static(b"length"),
                        Value::Integer(file.length as i64),
                    );
                    entry.insert(
                        Bytes::from_static(b"path"),
                        Value::string_list(&file.torrent_path),
                    );
                    Value::Dict(entry)
                })
                .collect();
            info.insert(Bytes::from_static(b"files"), Value::List(files));
        }

        let mut root = BTreeMap::new();
        root.insert(Bytes::from_static(b"info"), Value::Dict(info));

        if let Some(announce) = self.announce_groups.first().and_then(|g| g.first()) {
            root.insert(Bytes::from_static(b"announce"), Value::string(announce));
        }

        // announce-list (BEP-12) only carries information beyond `announce`
        // when there is more than one URL.
        let url_count: usize = self.announce_groups.iter().map(Vec::len).sum();
        if url_count > 1 {
            let tiers = self
                .announce_groups
                .iter()
                .map(Value::string_list)
                .collect();
            root.insert(Bytes::from_static(b"announce-list"), Value::List(tiers));
        }

        if let Some(ref comment) = self.comment {
            root.insert(Bytes::from_static(b"comment"), Value::string(comment));
        }

        if let Some(ref created_by) = self.created_by {
            root.insert(Bytes::from_static(b"created by"), Value::string(created_by));
        }

        let timestamp = self.creation_date.unwrap_or_else(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs() as i64)
                .unwrap_or(0)
        });
        root.insert(
            Bytes::from_static(b"creation date"),
            Value::Integer(timestamp),
        );

        match self.web_seeds.as_slice() {
            [] => {}
            [url] => {
                root.insert(Bytes::from_static(b"url-list"), Value::string(url));
            }
            urls => {
                root.insert(Bytes::from_static(b"url-list"), Value::string_list(urls));
            }
        }

        Value::Dict(root)
    }
}

fn worker_error(e: JoinError) -> MetainfoError {
    MetainfoError::Worker(e.to_string())
}

struct OpenFile {
    handle: File,
    index: usize,
    remaining: u64,
}

/// Reads the concatenation of all files in fixed-size pieces.
struct PieceReader {
    files: Vec<BatchFile>,
    piece_length: usize,
    next_file: usize,
    current: Option<OpenFile>,
}

impl PieceReader {
    fn new(files: Vec<BatchFile>, piece_length: usize) -> Self {
        Self {
            files,
            piece_length,
            next_file: 0,
            current: None,
        }
    }

    /// Returns the next piece, shorter than the piece length only at the end
    /// of the stream, or `None` once everything has been read.
    fn next_piece(&mut self) -> Result<Option<Vec<u8>>, MetainfoError> {
        let mut piece = Vec::with_capacity(self.piece_length);

        while piece.len() < self.piece_length {
            if self.current.is_none() {
                let Some(file) = self.files.get(self.next_file) else {
                    break;
                };
                let handle = File::open(&file.path).map_err(|source| MetainfoError::ReadFile {
                    path: file.path.clone(),
                    source,
                })?;
                self.current = Some(OpenFile {
                    handle,
                    index: self.next_file,
                    remaining: file.length,
                });
                self.next_file += 1;
            }
            let Some(open) = self.current.as_mut() else {
                break;
            };

            if open.remaining == 0 {
                self.current = None;
                continue;
            }

            let wanted = ((self.piece_length - piece.len()) as u64).min(open.remaining) as usize;
            let start = piece.len();
            piece.resize(start + wanted, 0);

            if let Err(source) = open.handle.read_exact(&mut piece[start..]) {
                let path = self.files[open.index].path.clone();
                return Err(match source.kind() {
                    ErrorKind::UnexpectedEof => MetainfoError::FileChanged(path),
                    _ => MetainfoError::ReadFile { path, source },
                });
            }
            open.remaining -= wanted as u64;
        }

        Ok((!piece.is_empty()).then_some(piece))
    }
}
