//! torkit - BitTorrent metainfo creation
//!
//! Builds `.torrent` files from local content while reporting hashing
//! progress on the terminal.
//!
//! # Modules
//!
//! - [`bencode`] - BEP-3 Bencode encoding
//! - [`metainfo`] - Metainfo builder and the background hash job
//! - [`progress`] - Rate sampling and terminal progress reporters
//! - [`make`] - Drives a hash job to completion while reporting progress

pub mod bencode;
pub mod make;
pub mod metainfo;
pub mod progress;

pub use bencode::{encode, BencodeError, Value};
pub use make::MakeError;
pub use metainfo::{Batch, MetainfoError, TorrentBuilder};
pub use progress::{Reporter, Sampler, Style};
