//! Constants used throughout the binderkit library.

/// Grid size used when a binder is created without one.
pub const DEFAULT_GRID_SIZE: &str = "3x3";

/// Number of history entries a binder retains before dropping the oldest.
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// Separator between owner id and binder id in document keys.
pub const DOCUMENT_KEY_SEPARATOR: char = '_';

/// Prefix for documents written to the local storage port.
pub const LOCAL_RECORD_PREFIX: &str = "local";

/// Writer id used when a workspace is not given one.
pub const ANONYMOUS_WRITER: &str = "anonymous";
