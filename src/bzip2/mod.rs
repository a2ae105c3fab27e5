//! BZIP2: Burrows-Wheeler + Move-To-Front + Huffman + RLE block decoder,
//! with a resumable pull interface and concatenated-stream support
//! (spec.md §4.5).
//!
//! See [`decoder::Bzip2Decoder`] for the entry point.

pub mod crc;
pub mod decoder;
pub mod error;
pub mod huffman;
pub mod tables;

pub use decoder::{Bzip2Decoder, Bzip2ReadOptions};
pub use error::{Bzip2Error, Bzip2Result};
