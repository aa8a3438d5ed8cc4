//! Error types for typed environment configuration

use std::fmt;

/// Errors that can occur while declaring or resolving a configuration type.
///
/// Every variant is raised synchronously while a configuration type is
/// resolved. A failed resolution never yields a partially populated instance.
#[derive(Debug, thiserror::Error)]
pub enum EnvError {
    /// A required field has no environment value and no default.
    #[error("Missing environment variable: {name}")]
    Missing {
        /// Name of the missing environment variable
        name: String,
    },

    /// The field's effective type has neither a registered nor an inline converter.
    ///
    /// Unions of two or more non-none types always end up here unless a
    /// converter targets that exact union.
    #[error("Unsupported type for '{name}': {type_name}")]
    UnsupportedType {
        /// Name of the field being resolved
        name: String,
        /// Rendered type expression
        type_name: String,
    },

    /// A converter could not turn the environment text into the target type.
    #[error("Failed to convert environment variable '{name}' to {type_name}: {message}")]
    Conversion {
        /// Name of the environment variable being converted
        name: String,
        /// Rendered target type expression
        type_name: String,
        /// Message reported by the converter
        message: String,
    },

    /// A none value reached a field that is not nullable.
    #[error("Cannot set {name} to None")]
    Nullability {
        /// Name of the non-nullable field
        name: String,
    },

    /// Attempted to reassign an environment-backed field on a frozen instance.
    #[error("Cannot assign to field '{name}': {type_name} is frozen")]
    Frozen {
        /// Name of the frozen field
        name: String,
        /// Configuration type owning the field
        type_name: String,
    },

    /// The converter registry has no entry for the requested type.
    #[error("No converter registered for {type_name}")]
    NoConverter {
        /// Rendered type expression that was looked up
        type_name: String,
    },

    /// A stored value does not fit the Rust type it was read as.
    #[error("Field '{name}' cannot be read as {rust_type}")]
    Extract {
        /// Name of the field
        name: String,
        /// Rust type requested by the caller
        rust_type: &'static str,
    },

    /// A raw value matched none of the shapes the engine expects.
    ///
    /// This signals a broken declaration (e.g. an integer default on a text
    /// field), never bad environment input.
    #[error("Invariant violated while resolving '{name}': {message}")]
    Invariant {
        /// Name of the field being resolved
        name: String,
        /// Description of the unexpected shape
        message: String,
    },
}

impl EnvError {
    /// Create a missing environment variable error
    pub fn missing(name: impl Into<String>) -> Self {
        Self::Missing { name: name.into() }
    }

    /// Create an unsupported type error
    pub fn unsupported(name: impl Into<String>, type_name: impl fmt::Display) -> Self {
        Self::UnsupportedType {
            name: name.into(),
            type_name: type_name.to_string(),
        }
    }

    /// Wrap a converter failure with the field it happened on
    pub fn conversion(
        name: impl Into<String>,
        type_name: impl fmt::Display,
        source: ConversionError,
    ) -> Self {
        Self::Conversion {
            name: name.into(),
            type_name: type_name.to_string(),
            message: source.message,
        }
    }

    /// Create a typed-read error (used by macro-generated code)
    #[doc(hidden)]
    pub fn extract<T>(name: impl Into<String>) -> Self {
        Self::Extract {
            name: name.into(),
            rust_type: std::any::type_name::<T>(),
        }
    }
}

/// Failure reported by a converter function.
///
/// Any error type implementing `Display` returned from a converter closure is
/// turned into one of these.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ConversionError {
    /// Human readable reason
    pub message: String,
}

impl ConversionError {
    pub fn new(message: impl fmt::Display) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}
