//! Type expressions and the introspection helpers used to classify them.
//!
//! A [`TypeExpr`] describes the declared type of a configuration field. The
//! set of shapes is closed: the four primitives, an opaque named type, the
//! none marker, unions, annotated types carrying metadata, and generic
//! containers whose arguments are only inspected, never instantiated.

use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::mem;
use std::ops::Deref;

use crate::converters::Converter;

/// Declared type of a configuration field.
#[derive(Debug, Clone)]
pub enum TypeExpr {
    /// The absent-value marker
    None,
    Text,
    Integer,
    Float,
    Boolean,
    /// An opaque plain type with no built-in converter
    Named(String),
    /// One of two or more distinct types. Only [`TypeExpr::union`] builds
    /// one, so nested unions are always flattened.
    Union(UnionArms),
    /// A base type paired with metadata items, in declaration order
    Annotated(Box<TypeExpr>, Vec<Metadata>),
    /// A generic container such as `list[integer]`
    Generic { origin: String, args: Vec<TypeExpr> },
}

/// The distinct arms of a union, in declaration order.
#[derive(Debug, Clone)]
pub struct UnionArms(Vec<TypeExpr>);

impl UnionArms {
    pub fn as_slice(&self) -> &[TypeExpr] {
        &self.0
    }
}

impl Deref for UnionArms {
    type Target = [TypeExpr];

    fn deref(&self) -> &[TypeExpr] {
        &self.0
    }
}

// Arms are distinct, so set equality and a sum of arm hashes agree.
impl PartialEq for UnionArms {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self.iter().all(|arm| other.contains(arm))
            && other.iter().all(|arm| self.contains(arm))
    }
}

impl Eq for UnionArms {}

impl Hash for UnionArms {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let combined = self.iter().fold(0u64, |acc, arm| {
            let mut hasher = DefaultHasher::new();
            arm.hash(&mut hasher);
            acc.wrapping_add(hasher.finish())
        });
        self.len().hash(state);
        combined.hash(state);
    }
}

/// Metadata item attached to an annotated type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Metadata {
    /// Inline converter, preferred over the registry for this field
    Converter(Converter),
    /// Arbitrary marker, carried along and otherwise ignored
    Tag(String),
}

impl Metadata {
    pub fn as_converter(&self) -> Option<&Converter> {
        match self {
            Metadata::Converter(converter) => Some(converter),
            Metadata::Tag(_) => None,
        }
    }
}

impl From<Converter> for Metadata {
    fn from(converter: Converter) -> Self {
        Metadata::Converter(converter)
    }
}

/// Classification of a [`TypeExpr`]. Every expression falls in exactly one kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind<'a> {
    Plain,
    /// A union of the none marker and exactly one other type
    NullableUnion(&'a TypeExpr),
    /// Any other union; not convertible without an exact-match converter
    Union,
    Annotated,
    Generic,
}

impl TypeExpr {
    /// Build a union, flattening nested unions and dropping repeated arms.
    ///
    /// A single remaining arm is returned as is, so `text | text` is `text`
    /// and `none | none` is `none`. An empty union is `none`.
    pub fn union(arms: impl IntoIterator<Item = TypeExpr>) -> Self {
        let mut flat: Vec<TypeExpr> = Vec::new();
        for arm in arms {
            let nested = match arm {
                TypeExpr::Union(inner) => inner.0,
                other => vec![other],
            };
            for item in nested {
                if !flat.contains(&item) {
                    flat.push(item);
                }
            }
        }
        if flat.len() > 1 {
            TypeExpr::Union(UnionArms(flat))
        } else {
            flat.pop().unwrap_or(TypeExpr::None)
        }
    }

    /// `inner | none`
    pub fn optional(inner: TypeExpr) -> Self {
        Self::union([inner, TypeExpr::None])
    }

    pub fn annotated(base: TypeExpr, metadata: impl IntoIterator<Item = Metadata>) -> Self {
        TypeExpr::Annotated(Box::new(base), metadata.into_iter().collect())
    }

    pub fn generic(origin: impl Into<String>, args: impl IntoIterator<Item = TypeExpr>) -> Self {
        TypeExpr::Generic {
            origin: origin.into(),
            args: args.into_iter().collect(),
        }
    }

    pub fn list(item: TypeExpr) -> Self {
        Self::generic("list", [item])
    }

    pub fn dict(key: TypeExpr, value: TypeExpr) -> Self {
        Self::generic("dict", [key, value])
    }

    pub fn named(name: impl Into<String>) -> Self {
        TypeExpr::Named(name.into())
    }

    pub fn classify(&self) -> TypeKind<'_> {
        match self {
            TypeExpr::Union(_) => match get_unioned_with_none(self) {
                Some(inner) => TypeKind::NullableUnion(inner),
                None => TypeKind::Union,
            },
            TypeExpr::Annotated(..) => TypeKind::Annotated,
            TypeExpr::Generic { .. } => TypeKind::Generic,
            _ => TypeKind::Plain,
        }
    }
}

/// True iff the expression is a union.
///
/// Annotated types are never unions, even when their base type is one.
pub fn is_union_type(expr: &TypeExpr) -> bool {
    matches!(expr, TypeExpr::Union(_))
}

/// Type arguments of `expr` without the none marker, in declaration order.
///
/// Empty for expressions that take no arguments. For an annotated type this is
/// the base alone: metadata items are not types and never count as arguments.
pub fn get_usable_type_args(expr: &TypeExpr) -> Vec<&TypeExpr> {
    let args: &[TypeExpr] = match expr {
        TypeExpr::Union(arms) => arms.as_slice(),
        TypeExpr::Generic { args, .. } => args,
        TypeExpr::Annotated(base, _) => std::slice::from_ref(base.as_ref()),
        _ => &[],
    };
    args.iter()
        .filter(|arg| !matches!(arg, TypeExpr::None))
        .collect()
}

/// True iff `expr` is the none marker or a union with a none arm.
pub fn allows_none_type(expr: &TypeExpr) -> bool {
    match expr {
        TypeExpr::None => true,
        TypeExpr::Union(arms) => arms.iter().any(|arm| matches!(arm, TypeExpr::None)),
        _ => false,
    }
}

/// The single type wrapped by a nullable union, if there is exactly one.
pub fn get_unioned_with_none(expr: &TypeExpr) -> Option<&TypeExpr> {
    if !is_union_type(expr) || !allows_none_type(expr) {
        return None;
    }

    let mut distinct: Vec<&TypeExpr> = Vec::new();
    for arg in get_usable_type_args(expr) {
        if !distinct.contains(&arg) {
            distinct.push(arg);
        }
    }
    match distinct.as_slice() {
        [only] => Some(*only),
        _ => None,
    }
}

/// Base type and metadata of an annotated type.
pub fn get_annotated_args(expr: &TypeExpr) -> Option<(&TypeExpr, &[Metadata])> {
    match expr {
        TypeExpr::Annotated(base, metadata) => Some((base.as_ref(), metadata.as_slice())),
        _ => None,
    }
}

impl PartialEq for TypeExpr {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (TypeExpr::None, TypeExpr::None)
            | (TypeExpr::Text, TypeExpr::Text)
            | (TypeExpr::Integer, TypeExpr::Integer)
            | (TypeExpr::Float, TypeExpr::Float)
            | (TypeExpr::Boolean, TypeExpr::Boolean) => true,
            (TypeExpr::Named(a), TypeExpr::Named(b)) => a == b,
            // arm order does not matter
            (TypeExpr::Union(a), TypeExpr::Union(b)) => a == b,
            (TypeExpr::Annotated(a, a_meta), TypeExpr::Annotated(b, b_meta)) => {
                a == b && a_meta == b_meta
            }
            (
                TypeExpr::Generic { origin: a, args: a_args },
                TypeExpr::Generic { origin: b, args: b_args },
            ) => a == b && a_args == b_args,
            _ => false,
        }
    }
}

impl Eq for TypeExpr {}

impl Hash for TypeExpr {
    fn hash<H: Hasher>(&self, state: &mut H) {
        mem::discriminant(self).hash(state);
        match self {
            TypeExpr::Named(name) => name.hash(state),
            TypeExpr::Union(arms) => arms.hash(state),
            TypeExpr::Annotated(base, metadata) => {
                base.hash(state);
                metadata.hash(state);
            }
            TypeExpr::Generic { origin, args } => {
                origin.hash(state);
                args.hash(state);
            }
            _ => {}
        }
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeExpr::None => f.write_str("none"),
            TypeExpr::Text => f.write_str("text"),
            TypeExpr::Integer => f.write_str("integer"),
            TypeExpr::Float => f.write_str("float"),
            TypeExpr::Boolean => f.write_str("boolean"),
            TypeExpr::Named(name) => f.write_str(name),
            TypeExpr::Union(arms) => {
                for (i, arm) in arms.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" | ")?;
                    }
                    write!(f, "{arm}")?;
                }
                Ok(())
            }
            TypeExpr::Annotated(base, metadata) => {
                write!(f, "Annotated[{base}")?;
                for item in metadata {
                    match item {
                        Metadata::Converter(c) => write!(f, ", Converter[{}]", c.target())?,
                        Metadata::Tag(tag) => write!(f, ", {tag:?}")?,
                    }
                }
                f.write_str("]")
            }
            TypeExpr::Generic { origin, args } => {
                write!(f, "{origin}[")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                f.write_str("]")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(name: &str) -> Metadata {
        Metadata::Tag(name.to_string())
    }

    #[test]
    fn test_allows_none_true_cases() {
        let cases = [
            TypeExpr::optional(TypeExpr::Integer),
            TypeExpr::union([
                TypeExpr::Integer,
                TypeExpr::list(TypeExpr::Text),
                TypeExpr::None,
            ]),
            TypeExpr::union([TypeExpr::None, TypeExpr::Integer]),
            TypeExpr::None,
        ];
        for case in &cases {
            assert!(allows_none_type(case), "{case} should allow none");
        }
    }

    #[test]
    fn test_allows_none_false_cases() {
        let cases = [
            TypeExpr::Text,
            TypeExpr::generic("callable", [TypeExpr::Integer, TypeExpr::None]),
            TypeExpr::annotated(TypeExpr::None, [tag("int")]),
            TypeExpr::union([TypeExpr::Text, TypeExpr::Integer]),
            TypeExpr::named("DummyClass"),
        ];
        for case in &cases {
            assert!(!allows_none_type(case), "{case} should not allow none");
        }
    }

    #[test]
    fn test_union_flattens_nested_and_dedups() {
        let nested = TypeExpr::union([
            TypeExpr::Text,
            TypeExpr::union([TypeExpr::Integer, TypeExpr::Text]),
            TypeExpr::None,
        ]);
        match &nested {
            TypeExpr::Union(arms) => {
                assert_eq!(
                    arms.as_slice(),
                    &[TypeExpr::Text, TypeExpr::Integer, TypeExpr::None]
                );
            }
            other => panic!("expected union, got {other}"),
        }
    }

    #[test]
    fn test_union_equality_ignores_order() {
        let a = TypeExpr::union([TypeExpr::Text, TypeExpr::Integer]);
        let b = TypeExpr::union([TypeExpr::Integer, TypeExpr::Text]);
        assert_eq!(a, b);

        let mut ha = DefaultHasher::new();
        let mut hb = DefaultHasher::new();
        a.hash(&mut ha);
        b.hash(&mut hb);
        assert_eq!(ha.finish(), hb.finish());
    }

    #[test]
    fn test_usable_type_args() {
        let expr = TypeExpr::union([TypeExpr::None, TypeExpr::Float, TypeExpr::Text]);
        assert_eq!(
            get_usable_type_args(&expr),
            vec![&TypeExpr::Float, &TypeExpr::Text]
        );
        assert!(get_usable_type_args(&TypeExpr::Integer).is_empty());
        let only_none = TypeExpr::union([TypeExpr::None, TypeExpr::None]);
        assert!(get_usable_type_args(&only_none).is_empty());

        let dict = TypeExpr::dict(TypeExpr::Text, TypeExpr::Integer);
        assert_eq!(
            get_usable_type_args(&dict),
            vec![&TypeExpr::Text, &TypeExpr::Integer]
        );
    }

    #[test]
    fn test_unioned_with_none() {
        let optional = TypeExpr::optional(TypeExpr::Text);
        assert_eq!(get_unioned_with_none(&optional), Some(&TypeExpr::Text));

        let multi = TypeExpr::union([TypeExpr::Text, TypeExpr::Integer, TypeExpr::None]);
        assert_eq!(get_unioned_with_none(&multi), None);

        let only_none = TypeExpr::union([TypeExpr::None, TypeExpr::None]);
        assert_eq!(get_unioned_with_none(&only_none), None);

        assert_eq!(get_unioned_with_none(&TypeExpr::Text), None);
        assert_eq!(
            get_unioned_with_none(&TypeExpr::union([TypeExpr::Text, TypeExpr::Integer])),
            None
        );
    }

    #[test]
    fn test_single_arm_union_collapses() {
        assert_eq!(TypeExpr::union([TypeExpr::Text, TypeExpr::Text]), TypeExpr::Text);
        assert_eq!(
            TypeExpr::union([TypeExpr::Text, TypeExpr::union([TypeExpr::Text, TypeExpr::Text])]),
            TypeExpr::Text
        );
        assert_eq!(TypeExpr::union([TypeExpr::None, TypeExpr::None]), TypeExpr::None);
        assert_eq!(TypeExpr::union(std::iter::empty()), TypeExpr::None);
        assert_eq!(TypeExpr::union([TypeExpr::Text, TypeExpr::Text]).classify(), TypeKind::Plain);
    }

    #[test]
    fn test_union_equality_is_symmetric() {
        let nullable = TypeExpr::union([TypeExpr::Text, TypeExpr::None]);
        let pair = TypeExpr::union([TypeExpr::Text, TypeExpr::Integer]);
        assert_ne!(nullable, pair);
        assert_ne!(pair, nullable);

        let nested = TypeExpr::union([TypeExpr::optional(TypeExpr::Text), TypeExpr::None]);
        assert_eq!(nested, nullable);
        assert_eq!(get_unioned_with_none(&nested), Some(&TypeExpr::Text));
    }

    #[test]
    fn test_union_hash_agrees_with_eq() {
        use std::collections::HashMap;

        let mut map = HashMap::new();
        map.insert(TypeExpr::union([TypeExpr::Float, TypeExpr::Text, TypeExpr::None]), 1);
        let key = TypeExpr::union([
            TypeExpr::None,
            TypeExpr::union([TypeExpr::Text, TypeExpr::Float]),
        ]);
        assert_eq!(map.get(&key), Some(&1));
    }

    #[test]
    fn test_annotated_usable_args_is_base_only() {
        let expr = TypeExpr::annotated(TypeExpr::None, [tag("x")]);
        assert!(get_usable_type_args(&expr).is_empty());

        let expr = TypeExpr::annotated(TypeExpr::Integer, [tag("x")]);
        assert_eq!(get_usable_type_args(&expr), vec![&TypeExpr::Integer]);
    }

    #[test]
    fn test_annotated_args() {
        let expr = TypeExpr::annotated(TypeExpr::Integer, [tag("a"), tag("b")]);
        let (base, metadata) = get_annotated_args(&expr).unwrap();
        assert_eq!(base, &TypeExpr::Integer);
        assert_eq!(metadata, &[tag("a"), tag("b")]);

        assert!(get_annotated_args(&TypeExpr::Integer).is_none());
    }

    #[test]
    fn test_annotated_union_is_not_a_union() {
        let expr = TypeExpr::annotated(TypeExpr::optional(TypeExpr::Text), [tag("x")]);
        assert!(!is_union_type(&expr));
        assert!(!allows_none_type(&expr));
        assert_eq!(expr.classify(), TypeKind::Annotated);
    }

    #[test]
    fn test_classify() {
        assert_eq!(TypeExpr::Boolean.classify(), TypeKind::Plain);
        assert_eq!(TypeExpr::named("Path").classify(), TypeKind::Plain);
        assert_eq!(
            TypeExpr::optional(TypeExpr::Float).classify(),
            TypeKind::NullableUnion(&TypeExpr::Float)
        );
        assert_eq!(
            TypeExpr::union([TypeExpr::Float, TypeExpr::Integer]).classify(),
            TypeKind::Union
        );
        assert_eq!(TypeExpr::list(TypeExpr::Integer).classify(), TypeKind::Generic);
    }

    #[test]
    fn test_display() {
        let expr = TypeExpr::optional(TypeExpr::dict(
            TypeExpr::Text,
            TypeExpr::list(TypeExpr::Integer),
        ));
        assert_eq!(expr.to_string(), "dict[text, list[integer]] | none");
    }
}
