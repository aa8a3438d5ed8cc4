//! Converters from environment text to typed values, and the registry that
//! maps a target type to its converter.

use std::collections::HashMap;
use std::convert::Infallible;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::annotations::TypeExpr;
use crate::error::{ConversionError, EnvError};
use crate::value::{EnvType, Value};

type ConvertFn = dyn Fn(&str) -> Result<Value, ConversionError> + Send + Sync;

/// A function turning environment text into a value of a known target type.
#[derive(Clone)]
pub struct Converter {
    target: TypeExpr,
    func: Arc<ConvertFn>,
}

impl Converter {
    /// Wrap a typed conversion function. The target type is taken from the
    /// function's return type.
    ///
    /// ```rust
    /// use typedenv::{Converter, TypeExpr};
    ///
    /// fn int_list(value: &str) -> Result<Vec<i64>, std::num::ParseIntError> {
    ///     value.split(',').map(|x| x.trim().parse()).collect()
    /// }
    ///
    /// let converter = Converter::new(int_list);
    /// assert_eq!(converter.target(), &TypeExpr::list(TypeExpr::Integer));
    /// ```
    pub fn new<T, E, F>(func: F) -> Self
    where
        T: EnvType + 'static,
        E: fmt::Display + 'static,
        F: Fn(&str) -> Result<T, E> + Send + Sync + 'static,
    {
        Self {
            target: T::type_expr(),
            func: Arc::new(move |raw: &str| {
                func(raw)
                    .map(T::into_value)
                    .map_err(ConversionError::new)
            }),
        }
    }

    /// Wrap a conversion function that cannot fail.
    pub fn infallible<T, F>(func: F) -> Self
    where
        T: EnvType + 'static,
        F: Fn(&str) -> T + Send + Sync + 'static,
    {
        Self::new(move |raw: &str| Ok::<T, Infallible>(func(raw)))
    }

    /// Wrap an untyped function producing values of `target`.
    ///
    /// Useful for targets with no Rust counterpart, such as a converter that
    /// discriminates `text | integer`.
    pub fn with_target<E, F>(target: TypeExpr, func: F) -> Self
    where
        E: fmt::Display + 'static,
        F: Fn(&str) -> Result<Value, E> + Send + Sync + 'static,
    {
        Self {
            target,
            func: Arc::new(move |raw: &str| func(raw).map_err(ConversionError::new)),
        }
    }

    /// Decode the environment text as JSON into `T`.
    pub fn json<T>() -> Self
    where
        T: EnvType + DeserializeOwned + 'static,
    {
        Self::new(|raw: &str| serde_json::from_str::<T>(raw))
    }

    pub fn target(&self) -> &TypeExpr {
        &self.target
    }

    pub fn convert(&self, raw: &str) -> Result<Value, ConversionError> {
        (self.func)(raw)
    }
}

impl fmt::Debug for Converter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Converter")
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}

impl PartialEq for Converter {
    fn eq(&self, other: &Self) -> bool {
        self.target == other.target && Arc::ptr_eq(&self.func, &other.func)
    }
}

impl Eq for Converter {}

impl Hash for Converter {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.target.hash(state);
    }
}

/// Parse a boolean from `true`/`1` or `false`/`0`, ignoring case.
pub fn cast_to_bool(value: &str) -> Result<bool, ConversionError> {
    match value.to_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(ConversionError::new(format!(
            "Unsupported boolean value: {value}"
        ))),
    }
}

fn cast_to_integer(value: &str) -> Result<i64, ConversionError> {
    value
        .trim()
        .parse::<i64>()
        .map_err(|e| ConversionError::new(format!("invalid integer {value:?}: {e}")))
}

fn cast_to_float(value: &str) -> Result<f64, ConversionError> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|e| ConversionError::new(format!("invalid float {value:?}: {e}")))
}

/// Map from target type to converter. At most one converter per type; a later
/// registration replaces the earlier one.
#[derive(Debug, Clone, Default)]
pub struct ConverterRegistry {
    converters: HashMap<TypeExpr, Converter>,
}

impl ConverterRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry seeded with the text, integer, float and boolean converters.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.seed_builtins();
        registry
    }

    pub fn seed_builtins(&mut self) {
        self.set_converter(Converter::infallible(|value: &str| value.to_string()));
        self.set_converter(Converter::new(cast_to_integer));
        self.set_converter(Converter::new(cast_to_float));
        self.set_converter(Converter::new(cast_to_bool));
    }

    /// Register `converter` for its target type, replacing any previous one.
    pub fn set_converter(&mut self, converter: Converter) {
        self.converters.insert(converter.target().clone(), converter);
    }

    pub fn get_converter(&self, target: &TypeExpr) -> Result<&Converter, EnvError> {
        self.converters
            .get(target)
            .ok_or_else(|| EnvError::NoConverter {
                type_name: target.to_string(),
            })
    }

    pub fn can_convert(&self, target: &TypeExpr) -> bool {
        self.converters.contains_key(target)
    }

    pub fn clear_converters(&mut self) {
        self.converters.clear();
    }

    pub fn len(&self) -> usize {
        self.converters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.converters.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cast_to_bool_true() {
        for input in ["true", "1", "TRUE", "True"] {
            assert_eq!(cast_to_bool(input), Ok(true), "{input}");
        }
    }

    #[test]
    fn test_cast_to_bool_false() {
        for input in ["false", "0", "FALSE", "False"] {
            assert_eq!(cast_to_bool(input), Ok(false), "{input}");
        }
    }

    #[test]
    fn test_cast_to_bool_rejects_other_tokens() {
        for input in ["yes", "no", "", " true", "2"] {
            assert!(cast_to_bool(input).is_err(), "{input:?}");
        }
    }

    #[test]
    fn test_builtins() {
        let registry = ConverterRegistry::with_builtins();
        assert_eq!(registry.len(), 4);

        let int = registry.get_converter(&TypeExpr::Integer).unwrap();
        assert_eq!(int.convert("4"), Ok(Value::Integer(4)));
        assert!(int.convert("four").is_err());

        let float = registry.get_converter(&TypeExpr::Float).unwrap();
        assert_eq!(float.convert("1.5"), Ok(Value::Float(1.5)));
        assert!(float.convert("string that cannot be cast").is_err());

        let text = registry.get_converter(&TypeExpr::Text).unwrap();
        assert_eq!(text.convert("sqlite://"), Ok(Value::from("sqlite://")));

        let boolean = registry.get_converter(&TypeExpr::Boolean).unwrap();
        assert_eq!(boolean.convert("0"), Ok(Value::Boolean(false)));
    }

    #[test]
    fn test_lookup_of_unregistered_type_fails() {
        let registry = ConverterRegistry::with_builtins();
        let target = TypeExpr::list(TypeExpr::Text);
        assert!(!registry.can_convert(&target));
        assert!(matches!(
            registry.get_converter(&target),
            Err(EnvError::NoConverter { .. })
        ));
    }

    #[test]
    fn test_set_converter_overwrites() {
        let mut registry = ConverterRegistry::with_builtins();
        registry.set_converter(Converter::infallible(|v: &str| v.to_lowercase()));

        let text = registry.get_converter(&TypeExpr::Text).unwrap();
        assert_eq!(text.convert("LOWER"), Ok(Value::from("lower")));
        assert_eq!(registry.len(), 4);
    }

    #[test]
    fn test_clear_converters() {
        let mut registry = ConverterRegistry::with_builtins();
        registry.clear_converters();
        assert!(registry.is_empty());
        assert!(!registry.can_convert(&TypeExpr::Text));

        registry.seed_builtins();
        assert!(registry.can_convert(&TypeExpr::Text));
    }

    #[test]
    fn test_json_converter() {
        let converter = Converter::json::<HashMap<String, String>>();
        assert_eq!(
            converter.target(),
            &TypeExpr::dict(TypeExpr::Text, TypeExpr::Text)
        );

        let value = converter.convert(r#"{"config1": "value1"}"#).unwrap();
        assert_eq!(
            HashMap::<String, String>::from_value(&value).unwrap()["config1"],
            "value1"
        );
        assert!(converter.convert("not json").is_err());
    }

    #[test]
    fn test_with_target_union() {
        let target = TypeExpr::union([TypeExpr::Text, TypeExpr::Integer]);
        let converter = Converter::with_target(target.clone(), |raw: &str| {
            Ok::<_, Infallible>(match raw.parse::<i64>() {
                Ok(n) => Value::Integer(n),
                Err(_) => Value::from(raw),
            })
        });
        assert_eq!(converter.target(), &target);
        assert_eq!(converter.convert("7"), Ok(Value::Integer(7)));
        assert_eq!(converter.convert("seven"), Ok(Value::from("seven")));
    }

    #[test]
    fn test_converter_equality_is_identity() {
        let a = Converter::infallible(|v: &str| v.to_string());
        let b = Converter::infallible(|v: &str| v.to_string());
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
    }
}
