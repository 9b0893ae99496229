//! Fatal errors for corpus extraction.

/// Errors that stop a stage outright. Everything recoverable is a
/// [`crate::Finding`] instead.
#[derive(Debug, thiserror::Error)]
pub enum CorpusError {
    #[error("cannot list directory {path}: {source}")]
    DirectoryUnreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot open reference table {path}: {source}")]
    ReferenceTableUnreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid reference table {path}: {message}")]
    ReferenceTableParse { path: String, message: String },
}
