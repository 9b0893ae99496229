//! # rtmap-store
//!
//! Persistence for pipeline output.
//!
//! - `write_snapshot` / `read_snapshot`: the full [`PipelineOutput`] as
//!   pretty JSON, replaced atomically on write
//! - `write_table_csv`: the flattened table for spreadsheet and plotting
//!   consumers
//! - `snapshot_digest`: content hash of the joined records, stable across
//!   runs over an unchanged corpus
//!
//! [`PipelineOutput`]: rtmap_corpus::PipelineOutput

pub mod error;
pub mod snapshot;
pub mod table_csv;

pub use error::StoreError;
pub use snapshot::{SNAPSHOT_DIGEST_PREFIX, read_snapshot, snapshot_digest, write_snapshot};
pub use table_csv::{write_table, write_table_csv};
