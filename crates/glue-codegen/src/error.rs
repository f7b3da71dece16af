//! Error type shared by every stage of the generator.

use std::io;
use std::path::PathBuf;

/// Errors that abort a generation run.
#[derive(Debug, thiserror::Error)]
pub enum GlueError {
    /// A type reference could not be resolved in any of the registries
    #[error("{context}: type '{name}' was not found")]
    TypeNotFound { name: String, context: String },

    /// The reflection data describes something the bindings cannot model
    #[error("{0}")]
    InvalidData(String),

    /// A default argument value cannot be expressed in C#
    #[error("cannot determine default value for argument '{arg}' of method '{method}': {reason}")]
    DefaultValue {
        method: String,
        arg: String,
        reason: String,
    },

    /// A generic type was used with the wrong number of type arguments
    #[error("generic type parameter count mismatch for '{0}'")]
    GenericArity(String),

    /// A type referenced code from a partition it cannot see
    #[error("{context}: '{target}' from API '{target_api}' is not visible to API '{source_api}'")]
    ApiVisibility {
        target: String,
        target_api: String,
        source_api: String,
        context: String,
    },

    /// Walking a base-type chain never reached the root
    #[error("inheritance chain of '{0}' does not terminate")]
    InheritanceCycle(String),

    /// A marshalling template is malformed or used with the wrong slots
    #[error("template '{template}': {reason}")]
    Template { template: String, reason: String },

    /// A generated file could not be written
    #[error("cannot write '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The reflection snapshot could not be read
    #[error("cannot load reflection snapshot '{}': {source}", path.display())]
    Snapshot {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl GlueError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        GlueError::InvalidData(msg.into())
    }

    pub(crate) fn type_not_found(name: impl Into<String>, context: impl Into<String>) -> Self {
        GlueError::TypeNotFound {
            name: name.into(),
            context: context.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, GlueError>;
