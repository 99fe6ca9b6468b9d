//! The metainfo build engine ([BEP-3], [BEP-12], [BEP-19], [BEP-27]).
//!
//! This is the collaborator that the [`make`](crate::make) orchestrator
//! drives. It owns everything about the `.torrent` format: walking the
//! concatenated input stream in pieces, SHA1-hashing them on a worker pool
//! and encoding the finished dictionary.
//!
//! The flow is two-step:
//!
//! 1. [`TorrentBuilder`] collects trackers, comment, piece length, name,
//!    private flag, web seeds and input files. [`TorrentBuilder::submit`]
//!    validates them and returns a [`Batch`].
//! 2. [`Batch::start`] spawns the hashing job and returns a [`Completion`]
//!    (fires once) and a [`Progress`] watch of bytes hashed so far.
//!
//! # Examples
//!
//! ```no_run
//! use torkit::metainfo::TorrentBuilder;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let batch = TorrentBuilder::new()
//!     .add_announce_group(vec!["http://tracker.example.com/announce".into()])
//!     .add_file("video.mkv")
//!     .submit()?;
//!
//! let output = std::fs::File::create("video.mkv.torrent")?;
//! let (completion, progress) = batch.start(output, 4);
//!
//! completion.await??;
//! println!("hashed {} bytes", *progress.borrow());
//! # Ok(())
//! # }
//! ```
//!
//! [BEP-3]: http://bittorrent.org/beps/bep_0003.html
//! [BEP-12]: http://bittorrent.org/beps/bep_0012.html
//! [BEP-19]: http://bittorrent.org/beps/bep_0019.html
//! [BEP-27]: http://bittorrent.org/beps/bep_0027.html

mod batch;
mod builder;
mod error;

pub use batch::{Batch, Completion, Progress};
pub use builder::{TorrentBuilder, DEFAULT_PIECE_LENGTH};
pub use error::MetainfoError;
