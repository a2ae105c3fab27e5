//! Crate-wide constants and configuration-type re-exports.
//!
//! The per-format decoders each carry their own `*ReadOptions` builder
//! (`GzipReadOptions`, `Bzip2ReadOptions`, `LhaReadOptions`, `TarReadOptions`)
//! next to the decoder they configure; they are re-exported here purely for
//! discoverability, so a caller can `use arcodec::config::*` to see every
//! knob this crate exposes in one place.

pub use crate::block::compress::{LZ4_ACCELERATION_DEFAULT, LZ4_ACCELERATION_MAX, LZ4_MAX_INPUT_SIZE};
pub use crate::bzip2::Bzip2ReadOptions;
pub use crate::gzip::GzipReadOptions;
pub use crate::lha::LhaReadOptions;
pub use crate::tar::{TarReadOptions, TarWriteOptions};
