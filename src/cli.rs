use std::io::Write;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::thread;

use clap::{Args, Parser, Subcommand};
use tracing::debug;
use walkdir::WalkDir;

use torkit::make::MakeError;
use torkit::metainfo::{TorrentBuilder, DEFAULT_PIECE_LENGTH};
use torkit::progress::Style;

#[derive(Parser, Debug)]
#[command(author, version, about = "BitTorrent metainfo tools", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a .torrent file from files and directories
    Make(MakeArgs),
}

#[derive(Args, Debug)]
pub struct MakeArgs {
    /// Announce URL group (comma separated), additional -a adds backup trackers
    #[arg(short = 'a', value_name = "URLS")]
    pub announce: Vec<String>,

    /// Add commentary to the metainfo
    #[arg(short = 'c', default_value = "")]
    pub comment: String,

    /// Piece length in bytes
    #[arg(short = 'l', default_value_t = DEFAULT_PIECE_LENGTH)]
    pub piece_length: u64,

    /// Name of the torrent (default is automatically determined)
    #[arg(short = 'n', default_value = "")]
    pub name: String,

    /// Filename of the created .torrent file (default is <name>.torrent)
    #[arg(short = 'o')]
    pub output: Option<PathBuf>,

    /// Set the private flag
    #[arg(short = 'p')]
    pub private: bool,

    /// Use N workers for SHA1 hashing (default is the number of CPUs)
    #[arg(short = 'j', default_value_t = 0, allow_negative_numbers = true)]
    pub workers: i64,

    /// Be verbose
    #[arg(short = 'v')]
    pub verbose: bool,

    /// Add web seed URLs (comma separated), additional -w adds more URLs
    #[arg(short = 'w', value_name = "URLS")]
    pub web_seeds: Vec<String>,

    /// Disable colored output
    #[arg(long)]
    pub no_colors: bool,

    /// Files and directories to include
    #[arg(value_name = "FILE OR DIR")]
    pub inputs: Vec<PathBuf>,
}

impl MakeArgs {
    /// One group per non-empty `-a`, split on commas. Empty URLs are left for
    /// the builder to drop.
    pub fn announce_groups(&self) -> Vec<Vec<String>> {
        self.announce
            .iter()
            .filter(|value| !value.is_empty())
            .map(|value| value.split(',').map(str::to_string).collect())
            .collect()
    }

    pub fn web_seed_urls(&self) -> Vec<String> {
        self.web_seeds
            .iter()
            .filter(|value| !value.is_empty())
            .flat_map(|value| value.split(','))
            .map(str::to_string)
            .collect()
    }

    /// `-j`, or the available parallelism when not positive.
    pub fn worker_count(&self) -> usize {
        match usize::try_from(self.workers) {
            Ok(n) if n > 0 => n,
            _ => thread::available_parallelism()
                .map(NonZeroUsize::get)
                .unwrap_or(1),
        }
    }

    /// Expands the inputs into files, walking directories in lexical order.
    /// Symbolic links to directories are not followed. Unreadable paths are
    /// reported on stderr and skipped.
    pub fn collect_files(&self) -> Vec<PathBuf> {
        let mut files = Vec::new();
        for input in &self.inputs {
            for entry in WalkDir::new(input).sort_by_file_name() {
                match entry {
                    Ok(entry) if entry.file_type().is_dir() => {}
                    Ok(entry) if entry.path_is_symlink() && entry.path().is_dir() => {}
                    Ok(entry) => files.push(entry.into_path()),
                    Err(e) => report_unreadable(e.path().unwrap_or(input.as_path()), &e),
                }
            }
        }
        debug!(count = files.len(), "collected input files");
        files
    }

    pub fn builder(&self, files: Vec<PathBuf>) -> TorrentBuilder {
        let mut builder = TorrentBuilder::new()
            .comment(self.comment.as_str())
            .piece_length(self.piece_length)
            .name(self.name.as_str())
            .private(self.private);

        for group in self.announce_groups() {
            builder = builder.add_announce_group(group);
        }
        for url in self.web_seed_urls() {
            builder = builder.add_web_seed(url);
        }
        for file in files {
            builder = builder.add_file(file);
        }
        builder
    }

    /// `-o`, or `<name>.torrent` with the given default name.
    pub fn output_path(&self, default_name: &str) -> PathBuf {
        match &self.output {
            Some(path) => path.clone(),
            None if !self.name.is_empty() => PathBuf::from(format!("{}.torrent", self.name)),
            None => PathBuf::from(format!("{}.torrent", default_name)),
        }
    }
}

fn report_unreadable(path: &Path, err: &walkdir::Error) {
    match err.io_error() {
        Some(io) => eprintln!("error reading \"{}\": {}", path.display(), io),
        None => eprintln!("error reading \"{}\": {}", path.display(), err),
    }
}

/// Prints the outcome of a build to `out` and maps it to the exit status.
///
/// Failures after progress began get a leading newline to step off the
/// progress line, and an `error:` prefix. Failures before that are printed
/// as they are.
pub fn report_outcome<W: Write>(
    result: Result<(), MakeError>,
    style: &Style,
    out: &mut W,
) -> ExitCode {
    let err = match result {
        Ok(()) => return ExitCode::SUCCESS,
        Err(e) => e,
    };

    let _ = if err.during_build() {
        writeln!(out, "\n{} {}", style.error("error:"), err)
    } else {
        writeln!(out, "{}", err)
    };
    ExitCode::FAILURE
}
