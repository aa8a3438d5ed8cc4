//! Typed configuration objects loaded from environment variables
//!
//! `typedenv` reads environment variables into statically declared, typed
//! configuration types. Each declared field names an environment variable;
//! its string value is converted to the declared type, with defaults and
//! nullability applied.
//!
//! # Features
//!
//! - **Declarative**: `#[derive(EnvLoader)]` on a struct, or a runtime [`Declaration`]
//! - **Strict conversion**: text, integers, floats and booleans out of the box
//! - **Custom converters**: per type (`#[env(converter = ...)]` on the struct) or
//!   inline on a single field, where the inline one always wins
//! - **Nullable fields**: `Option<T>` defaults to `None` when the variable is unset
//! - **Singleton**: each type resolves once per process; later loads return the
//!   cached instance
//! - **Frozen by default**: environment-backed fields reject reassignment
//!
//! # Value Parsing
//!
//! - Text: `DATABASE_URL=postgres://localhost/db`
//! - Integers: `NUM_WORKERS=4`
//! - Floats: `RATIO=0.5`
//! - Booleans: `DEBUG=true` (`true`/`1`/`false`/`0`, any case)
//!
//! # Example
//!
//! ```rust
//! use typedenv::EnvLoader;
//!
//! #[derive(Debug, EnvLoader)]
//! struct Config {
//!     pub num_workers: u16,
//!
//!     #[env(default = "INFO".to_string())]
//!     pub log_level: String,
//!
//!     pub api_key: Option<String>,
//! }
//!
//! # fn main() -> Result<(), typedenv::EnvError> {
//! #     std::env::set_var("NUM_WORKERS", "4");
//! let config = Config::from_env()?;
//! assert_eq!(config.num_workers, 4);
//! assert_eq!(config.log_level, "INFO");
//! assert_eq!(config.api_key, None);
//! #     Ok(())
//! # }
//! ```
//!
//! # Attributes
//!
//! ## `#[env(default = value)]`
//!
//! Used when the environment variable is not set. An environment value always
//! wins over the default, and a default of the declared type is stored as-is.
//!
//! ## `#[env(converter = function)]`
//!
//! On a field: an inline converter used instead of the built-in one for that
//! field only. On the struct: an extra converter registered for this type,
//! keyed by the function's return type.
//!
//! ```rust
//! use typedenv::EnvLoader;
//!
//! fn int_list(value: &str) -> Result<Vec<i64>, std::num::ParseIntError> {
//!     value.split(',').map(|x| x.trim().parse()).collect()
//! }
//!
//! fn shout(value: &str) -> Result<String, std::convert::Infallible> {
//!     Ok(value.to_uppercase())
//! }
//!
//! #[derive(EnvLoader)]
//! #[env(converter = int_list)]
//! struct Config {
//!     pub int_vals: Vec<i64>,
//!
//!     #[env(converter = shout)]
//!     pub greeting: String,
//! }
//! # fn main() -> Result<(), typedenv::EnvError> {
//! #     std::env::set_var("INT_VALS", "9, 3, 6");
//! #     std::env::set_var("GREETING", "hi");
//! #     let config = Config::from_env()?;
//! #     assert_eq!(config.int_vals, vec![9, 3, 6]);
//! #     assert_eq!(config.greeting, "HI");
//! #     Ok(())
//! # }
//! ```
//!
//! ## `#[env(frozen = false)]` and `#[env(extends = Parent)]`
//!
//! Struct-level options. `frozen = false` allows reassigning resolved fields
//! through [`ConfigInstance::set`]. `extends` starts from the parent type's
//! declaration; fields redeclared here replace the parent's.
//!
//! ## `#[env(name = "CUSTOM_NAME")]` and `#[env(skip)]`
//!
//! The variable name defaults to the upper-cased field name. Skipped fields
//! are not declared and are filled with `Default::default()`.

pub mod annotations;
pub mod converters;
mod declaration;
mod env;
mod error;
mod instance;
mod loader;
mod value;

pub use annotations::{Metadata, TypeExpr, TypeKind, UnionArms};
pub use converters::{cast_to_bool, Converter, ConverterRegistry};
pub use declaration::{is_env_key, CheckFn, Declaration, FieldSpec};
pub use env::{Environment, ProcessEnv};
pub use error::{ConversionError, EnvError};
pub use instance::ConfigInstance;
pub use loader::{resolve, EnvLoader};
pub use typedenv_derive::EnvLoader;
pub use value::{EnvType, Value};
