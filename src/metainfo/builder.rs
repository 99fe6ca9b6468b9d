//! Configuration side of the build engine.
//!
//! [`TorrentBuilder`] collects everything a `.torrent` needs except the piece
//! hashes. [`TorrentBuilder::submit`] validates it, inspects the input files
//! and hands back a [`Batch`] ready to be hashed.
//!
//! # Examples
//!
//! ```no_run
//! use torkit::metainfo::TorrentBuilder;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let batch = TorrentBuilder::new()
//!     .add_announce_group(vec!["http://tracker.example.com/announce".into()])
//!     .add_file("path/to/file.iso")
//!     .piece_length(262144)
//!     .comment("Created with torkit")
//!     .submit()?;
//!
//! println!("{} ({} bytes)", batch.default_name(), batch.total_size());
//! # Ok(())
//! # }
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::trace;

use super::batch::{Batch, BatchFile};
use super::error::MetainfoError;

/// Default piece length (256 KiB).
pub const DEFAULT_PIECE_LENGTH: u64 = 262144;

/// Builder for a metainfo build job.
#[derive(Debug, Clone)]
pub struct TorrentBuilder {
    /// Tracker tiers, in fallback order.
    announce_groups: Vec<Vec<String>>,
    /// Optional comment.
    comment: Option<String>,
    /// Piece length in bytes.
    piece_length: u64,
    /// Name override; derived from the inputs when unset.
    name: Option<String>,
    /// Whether this is a private torrent.
    private: bool,
    /// Web seed URLs (BEP-19).
    web_seeds: Vec<String>,
    /// Input files, in the order they were added.
    files: Vec<PathBuf>,
    /// Creator string.
    created_by: Option<String>,
    /// Creation timestamp (defaults to the time of encoding).
    creation_date: Option<i64>,
}

impl Default for TorrentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TorrentBuilder {
    pub fn new() -> Self {
        Self {
            announce_groups: Vec::new(),
            comment: None,
            piece_length: DEFAULT_PIECE_LENGTH,
            name: None,
            private: false,
            web_seeds: Vec::new(),
            files: Vec::new(),
            created_by: Some(format!("torkit/{}", env!("CARGO_PKG_VERSION"))),
            creation_date: None,
        }
    }

    /// Adds a tracker tier. Each additional group is a backup for the
    /// previous ones. Empty URLs are dropped on submit.
    pub fn add_announce_group(mut self, urls: Vec<String>) -> Self {
        self.announce_groups.push(urls);
        self
    }

    /// Sets the torrent comment. An empty comment is not written.
    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Sets the piece length in bytes.
    pub fn piece_length(mut self, length: u64) -> Self {
        self.piece_length = length;
        self
    }

    /// Overrides the torrent name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets whether this is a private torrent.
    pub fn private(mut self, private: bool) -> Self {
        self.private = private;
        self
    }

    /// Adds a web seed URL (BEP-19).
    pub fn add_web_seed(mut self, url: impl Into<String>) -> Self {
        self.web_seeds.push(url.into());
        self
    }

    /// Queues a file from disk. Directories must be expanded by the caller.
    pub fn add_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.files.push(path.into());
        self
    }

    /// Sets the creator string.
    pub fn created_by(mut self, created_by: impl Into<String>) -> Self {
        self.created_by = Some(created_by.into());
        self
    }

    /// Sets the creation date (Unix timestamp).
    pub fn creation_date(mut self, timestamp: i64) -> Self {
        self.creation_date = Some(timestamp);
        self
    }

    /// Validates the configuration and inspects the input files.
    ///
    /// No file content is read here; that happens in [`Batch::start`].
    pub fn submit(self) -> Result<Batch, MetainfoError> {
        let announce_groups: Vec<Vec<String>> = self
            .announce_groups
            .into_iter()
            .map(|group| group.into_iter().filter(|url| !url.is_empty()).collect())
            .filter(|group: &Vec<String>| !group.is_empty())
            .collect();

        if announce_groups.is_empty() {
            return Err(MetainfoError::MissingField("announce group"));
        }
        if self.files.is_empty() {
            return Err(MetainfoError::MissingField("files"));
        }
        if self.piece_length == 0 {
            return Err(MetainfoError::InvalidField("piece length must be positive"));
        }
        if usize::try_from(self.piece_length).is_err() {
            return Err(MetainfoError::InvalidField("piece length too large"));
        }

        let inputs = inspect_files(&self.files)?;
        let root = common_root(inputs.iter().map(|(path, _)| path.as_path()));
        let single_file = inputs.len() == 1;

        let files: Vec<BatchFile> = inputs
            .into_iter()
            .map(|(path, length)| {
                let torrent_path = if single_file {
                    file_name(&path).into_iter().collect()
                } else {
                    path.strip_prefix(&root)
                        .unwrap_or(&path)
                        .components()
                        .map(|c| c.as_os_str().to_string_lossy().into_owned())
                        .collect()
                };
                BatchFile {
                    path,
                    torrent_path,
                    length,
                }
            })
            .collect();

        let name = match self.name.filter(|n| !n.is_empty()) {
            Some(name) => name,
            None if single_file => files[0]
                .torrent_path
                .first()
                .cloned()
                .ok_or(MetainfoError::MissingField("name"))?,
            None => directory_name(&root)?,
        };

        let total_size = files.iter().map(|f| f.length).sum();
        trace!(%name, files = files.len(), total_size, "submitted batch");

        Ok(Batch {
            name,
            files,
            total_size,
            piece_length: self.piece_length,
            single_file,
            announce_groups,
            comment: self.comment.filter(|c| !c.is_empty()),
            private: self.private,
            web_seeds: self
                .web_seeds
                .into_iter()
                .filter(|url| !url.is_empty())
                .collect(),
            created_by: self.created_by,
            creation_date: self.creation_date,
        })
    }
}

/// Resolves every input to an absolute path and its length, dropping
/// duplicates.
fn inspect_files(files: &[PathBuf]) -> Result<Vec<(PathBuf, u64)>, MetainfoError> {
    let mut seen = HashSet::new();
    let mut inputs = Vec::with_capacity(files.len());

    for path in files {
        let read_error = |source| MetainfoError::ReadFile {
            path: path.clone(),
            source,
        };
        let absolute = std::fs::canonicalize(path).map_err(read_error)?;
        let metadata = std::fs::metadata(&absolute).map_err(read_error)?;
        if !metadata.is_file() {
            return Err(MetainfoError::InvalidField("input is not a regular file"));
        }
        if seen.insert(absolute.clone()) {
            inputs.push((absolute, metadata.len()));
        }
    }

    Ok(inputs)
}

/// Deepest directory containing every path.
fn common_root<'a>(mut paths: impl Iterator<Item = &'a Path>) -> PathBuf {
    let mut root = paths
        .next()
        .and_then(Path::parent)
        .map(Path::to_path_buf)
        .unwrap_or_default();

    for path in paths {
        while !path.starts_with(&root) {
            if !root.pop() {
                break;
            }
        }
    }

    root
}

/// Name of the common input directory. The filesystem root has none.
fn directory_name(root: &Path) -> Result<String, MetainfoError> {
    file_name(root).ok_or(MetainfoError::InvalidField(
        "inputs share no common directory; set a name",
    ))
}

fn file_name(path: &Path) -> Option<String> {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_root_single_path() {
        let root = common_root([Path::new("/data/a/file.bin")].into_iter());
        assert_eq!(root, PathBuf::from("/data/a"));
    }

    #[test]
    fn test_common_root_nested() {
        let paths = [
            Path::new("/data/album/cd1/01.flac"),
            Path::new("/data/album/cd2/01.flac"),
            Path::new("/data/album/cover.jpg"),
        ];
        assert_eq!(common_root(paths.into_iter()), PathBuf::from("/data/album"));
    }

    #[test]
    fn test_common_root_disjoint() {
        let paths = [Path::new("/a/x"), Path::new("/b/y")];
        assert_eq!(common_root(paths.into_iter()), PathBuf::from("/"));
    }

    #[test]
    fn test_directory_name() {
        assert_eq!(directory_name(Path::new("/data/album")).unwrap(), "album");
        assert!(matches!(
            directory_name(Path::new("/")),
            Err(MetainfoError::InvalidField(msg)) if msg.contains("no common directory")
        ));
    }

    #[test]
    fn test_submit_requires_announce_group() {
        let result = TorrentBuilder::new().add_file("whatever").submit();
        assert!(matches!(
            result,
            Err(MetainfoError::MissingField("announce group"))
        ));
    }

    #[test]
    fn test_submit_drops_empty_announce_urls() {
        let result = TorrentBuilder::new()
            .add_announce_group(vec![String::new(), String::new()])
            .add_file("whatever")
            .submit();
        assert!(matches!(
            result,
            Err(MetainfoError::MissingField("announce group"))
        ));
    }

    #[test]
    fn test_submit_requires_files() {
        let result = TorrentBuilder::new()
            .add_announce_group(vec!["http://t/announce".into()])
            .submit();
        assert!(matches!(result, Err(MetainfoError::MissingField("files"))));
    }

    #[test]
    fn test_submit_rejects_zero_piece_length() {
        let result = TorrentBuilder::new()
            .add_announce_group(vec!["http://t/announce".into()])
            .add_file("whatever")
            .piece_length(0)
            .submit();
        assert!(matches!(result, Err(MetainfoError::InvalidField(_))));
    }

    #[test]
    fn test_submit_reports_missing_file() {
        let result = TorrentBuilder::new()
            .add_announce_group(vec!["http://t/announce".into()])
            .add_file("/definitely/not/here.bin")
            .submit();
        assert!(matches!(result, Err(MetainfoError::ReadFile { .. })));
    }
}
