//! Raw simulation output and derived-data files.
//!
//! Raw samples come either from a directory holding one sub-directory per saved
//! time, or from a gzip-compressed tar archive of the same tree. Derived data
//! is cached as plain-text column tables.

pub mod forces;
pub mod source;
pub mod table;
pub mod time;

pub use forces::{ForceHistory, read_forces};
pub use source::{ArchiveSource, ColumnSpec, Coverage, DirectorySource, Member, RawSample, SampleSource};
pub use table::{read_delimited, read_table, write_table};
pub use time::{saved_times, time_to_str};
