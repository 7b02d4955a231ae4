//! Error types for sheetcast operations

use thiserror::Error;

/// Main error type for sheetcast operations
#[derive(Error, Debug)]
pub enum SheetcastError {
    /// The top-level collection argument cannot be tabulated
    #[error("Invalid input collection: {message}")]
    InputShape {
        /// Error message
        message: String,
        /// Collection (sheet) name if available
        collection: Option<String>,
    },

    /// Reference to a sheet number outside the created range
    #[error("Specified sheet not found: index {index} out of {count} sheets")]
    SheetNotFound {
        /// Requested sheet index
        index: usize,
        /// Number of sheets that exist
        count: usize,
    },

    /// Malformed per-field annotation directive
    #[error("Failed to parse column annotation directive '{directive}': {message}")]
    Parse {
        /// The offending directive, e.g. `width:12o3`
        directive: String,
        /// Error message
        message: String,
    },

    /// Dynamic-field key sets diverge across records of one collection
    #[error("All records must have consistent keys for map field '{field}'")]
    InconsistentMapKeys {
        /// The dynamic field whose key sets diverged
        field: String,
    },

    /// A record's runtime shape disagrees with the plan derived from the
    /// first record
    #[error("Record shape diverges from column plan at '{path}': {message}")]
    SchemaMismatch {
        /// Path of the field that failed to resolve
        path: String,
        /// Error message
        message: String,
    },

    /// The workbook backend rejected an operation
    #[error("Workbook backend error: {message}")]
    Backend {
        /// Error message
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

/// Result type alias for sheetcast operations
pub type Result<T> = std::result::Result<T, SheetcastError>;

impl SheetcastError {
    /// Create a new input-shape error
    #[must_use]
    pub fn input_shape(message: impl Into<String>) -> Self {
        Self::InputShape {
            message: message.into(),
            collection: None,
        }
    }

    /// Create a new input-shape error naming the failing collection
    #[must_use]
    pub fn input_shape_for(message: impl Into<String>, collection: impl Into<String>) -> Self {
        Self::InputShape {
            message: message.into(),
            collection: Some(collection.into()),
        }
    }

    /// Create a new sheet-not-found error
    #[must_use]
    pub fn sheet_not_found(index: usize, count: usize) -> Self {
        Self::SheetNotFound { index, count }
    }

    /// Create a new annotation parse error
    #[must_use]
    pub fn parse(directive: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            directive: directive.into(),
            message: message.into(),
        }
    }

    /// Create a new inconsistent-map-keys error
    #[must_use]
    pub fn inconsistent_map_keys(field: impl Into<String>) -> Self {
        Self::InconsistentMapKeys {
            field: field.into(),
        }
    }

    /// Create a new schema-mismatch error
    #[must_use]
    pub fn schema_mismatch(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SchemaMismatch {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a new backend error
    #[must_use]
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
            source: None,
        }
    }

    /// Create a backend error wrapping a source error
    #[must_use]
    pub fn backend_with_source<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Backend {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}
