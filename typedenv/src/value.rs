//! Resolved values and the mapping from Rust types onto type expressions

use std::any::type_name;
use std::collections::{BTreeMap, HashMap};

use crate::annotations::TypeExpr;
use crate::error::ConversionError;

/// A resolved configuration value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    None,
    Text(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
}

impl Value {
    /// Whether this value is already an instance of `expr`.
    ///
    /// Containers are checked element-wise; a union matches if any arm does.
    pub fn matches(&self, expr: &TypeExpr) -> bool {
        match (self, expr) {
            (_, TypeExpr::Union(arms)) => arms.iter().any(|arm| self.matches(arm)),
            (_, TypeExpr::Annotated(base, _)) => self.matches(base),
            (Value::None, TypeExpr::None)
            | (Value::Text(_), TypeExpr::Text)
            | (Value::Integer(_), TypeExpr::Integer)
            | (Value::Float(_), TypeExpr::Float)
            | (Value::Boolean(_), TypeExpr::Boolean) => true,
            (Value::List(items), TypeExpr::Generic { origin, args }) if origin == "list" => {
                match args.as_slice() {
                    [item] => items.iter().all(|v| v.matches(item)),
                    _ => false,
                }
            }
            (Value::Map(entries), TypeExpr::Generic { origin, args }) if origin == "dict" => {
                match args.as_slice() {
                    [TypeExpr::Text, value] => entries.values().all(|v| v.matches(value)),
                    _ => false,
                }
            }
            _ => false,
        }
    }

    /// Short name of the value's shape, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::None => "none",
            Value::Text(_) => "text",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::Boolean(_) => "boolean",
            Value::List(_) => "list",
            Value::Map(_) => "dict",
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Integer(value.into())
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::None, Into::into)
    }
}

/// A Rust type that can be declared as a configuration field.
///
/// Integer types are limited to those that fit losslessly in an `i64`.
pub trait EnvType: Sized {
    fn type_expr() -> TypeExpr;
    fn into_value(self) -> Value;
    fn from_value(value: &Value) -> Option<Self>;

    /// Reject a converted value this type cannot hold, such as `70000` for a
    /// `u16`. Runs during resolution, before the value is stored.
    fn check(value: &Value) -> Result<(), ConversionError> {
        match Self::from_value(value) {
            Some(_) => Ok(()),
            None => Err(ConversionError::new(format!(
                "{value:?} does not fit {}",
                type_name::<Self>()
            ))),
        }
    }
}

impl EnvType for String {
    fn type_expr() -> TypeExpr {
        TypeExpr::Text
    }

    fn into_value(self) -> Value {
        Value::Text(self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_str().map(str::to_string)
    }
}

macro_rules! impl_env_type_integer {
    ($($ty:ty),*) => {
        $(
            impl EnvType for $ty {
                fn type_expr() -> TypeExpr {
                    TypeExpr::Integer
                }

                fn into_value(self) -> Value {
                    Value::Integer(i64::from(self))
                }

                fn from_value(value: &Value) -> Option<Self> {
                    match value {
                        Value::Integer(n) => <$ty>::try_from(*n).ok(),
                        _ => None,
                    }
                }
            }
        )*
    };
}

impl_env_type_integer!(i8, i16, i32, i64, u8, u16, u32);

impl EnvType for f64 {
    fn type_expr() -> TypeExpr {
        TypeExpr::Float
    }

    fn into_value(self) -> Value {
        Value::Float(self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }
}

impl EnvType for f32 {
    fn type_expr() -> TypeExpr {
        TypeExpr::Float
    }

    fn into_value(self) -> Value {
        Value::Float(f64::from(self))
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Float(f) if f.is_finite() && f.abs() > f64::from(f32::MAX) => None,
            Value::Float(f) => Some(*f as f32),
            _ => None,
        }
    }
}

impl EnvType for bool {
    fn type_expr() -> TypeExpr {
        TypeExpr::Boolean
    }

    fn into_value(self) -> Value {
        Value::Boolean(self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }
}

impl<T: EnvType> EnvType for Option<T> {
    fn type_expr() -> TypeExpr {
        TypeExpr::optional(T::type_expr())
    }

    fn into_value(self) -> Value {
        self.map_or(Value::None, T::into_value)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::None => Some(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl<T: EnvType> EnvType for Vec<T> {
    fn type_expr() -> TypeExpr {
        TypeExpr::list(T::type_expr())
    }

    fn into_value(self) -> Value {
        Value::List(self.into_iter().map(T::into_value).collect())
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::List(items) => items.iter().map(T::from_value).collect(),
            _ => None,
        }
    }
}

impl<V: EnvType> EnvType for BTreeMap<String, V> {
    fn type_expr() -> TypeExpr {
        TypeExpr::dict(TypeExpr::Text, V::type_expr())
    }

    fn into_value(self) -> Value {
        Value::Map(self.into_iter().map(|(k, v)| (k, v.into_value())).collect())
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Map(entries) => entries
                .iter()
                .map(|(k, v)| V::from_value(v).map(|v| (k.clone(), v)))
                .collect(),
            _ => None,
        }
    }
}

impl<V: EnvType> EnvType for HashMap<String, V> {
    fn type_expr() -> TypeExpr {
        TypeExpr::dict(TypeExpr::Text, V::type_expr())
    }

    fn into_value(self) -> Value {
        Value::Map(self.into_iter().map(|(k, v)| (k, v.into_value())).collect())
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Map(entries) => entries
                .iter()
                .map(|(k, v)| V::from_value(v).map(|v| (k.clone(), v)))
                .collect(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_matches() {
        assert!(Value::from("x").matches(&TypeExpr::Text));
        assert!(Value::from(1).matches(&TypeExpr::Integer));
        assert!(Value::from(1.0).matches(&TypeExpr::Float));
        assert!(Value::from(false).matches(&TypeExpr::Boolean));

        assert!(!Value::from(12).matches(&TypeExpr::Text));
        assert!(!Value::from(1).matches(&TypeExpr::Float));
        assert!(!Value::from("x").matches(&TypeExpr::named("Path")));
    }

    #[test]
    fn test_union_and_annotated_matches() {
        let optional = TypeExpr::optional(TypeExpr::Integer);
        assert!(Value::from(1).matches(&optional));
        assert!(Value::None.matches(&optional));
        assert!(!Value::from("1").matches(&optional));

        let annotated = TypeExpr::annotated(TypeExpr::Integer, []);
        assert!(Value::from(3).matches(&annotated));
    }

    #[test]
    fn test_container_matches() {
        let ints = vec![9i64, 3, 6].into_value();
        assert!(ints.matches(&TypeExpr::list(TypeExpr::Integer)));
        assert!(!ints.matches(&TypeExpr::list(TypeExpr::Text)));

        let mut map = BTreeMap::new();
        map.insert("config1".to_string(), "value1".to_string());
        let value = map.into_value();
        assert!(value.matches(&TypeExpr::dict(TypeExpr::Text, TypeExpr::Text)));
        assert!(!value.matches(&TypeExpr::dict(TypeExpr::Integer, TypeExpr::Text)));
    }

    #[test]
    fn test_env_type_round_trip_through_value() {
        let value = Some(8080u16).into_value();
        assert_eq!(value, Value::Integer(8080));
        assert_eq!(Option::<u16>::from_value(&value), Some(Some(8080)));
        assert_eq!(Option::<u16>::from_value(&Value::None), Some(None));
        assert_eq!(u16::from_value(&Value::Integer(70_000)), None);
        assert_eq!(String::from_value(&Value::Integer(1)), None);
    }

    #[test]
    fn test_check_rejects_out_of_range() {
        assert!(u16::check(&Value::Integer(8080)).is_ok());
        assert!(u16::check(&Value::Integer(70_000)).is_err());
        assert!(u32::check(&Value::Integer(-1)).is_err());
        assert!(Option::<u8>::check(&Value::None).is_ok());
        assert!(Vec::<i8>::check(&vec![1i64, 300].into_value()).is_err());
    }

    #[test]
    fn test_f32_out_of_range_is_rejected() {
        assert_eq!(f32::from_value(&Value::Float(1.5)), Some(1.5));
        assert_eq!(f32::from_value(&Value::Float(1e300)), None);
        assert_eq!(f32::from_value(&Value::Float(-1e300)), None);
        assert_eq!(f32::from_value(&Value::Float(f64::INFINITY)), Some(f32::INFINITY));
    }

    #[test]
    fn test_env_type_exprs() {
        assert_eq!(<Vec<i64>>::type_expr(), TypeExpr::list(TypeExpr::Integer));
        assert_eq!(
            <HashMap<String, String>>::type_expr(),
            TypeExpr::dict(TypeExpr::Text, TypeExpr::Text)
        );
        assert_eq!(
            <Option<bool>>::type_expr(),
            TypeExpr::union([TypeExpr::None, TypeExpr::Boolean])
        );
    }
}
