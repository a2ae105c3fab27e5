//! TAR archive reader/writer (spec.md §4.7, C7): 512-byte block framing,
//! USTAR/POSIX/GNU header fields, PAX extended headers, GNU longname/longlink,
//! and sparse-file reconstruction.
//!
//! See [`reader::TarReader`] and [`writer::TarWriter`] for the entry points.

pub mod error;
pub mod header;
pub mod pax;
pub mod reader;
pub mod writer;

pub use error::{TarError, TarResult};
pub use header::{TarEntry, TypeFlag, BLOCK_SIZE};
pub use reader::{TarReader, TarReadOptions};
pub use writer::{BigNumberMode, LongFileMode, TarWriter, TarWriteOptions};
