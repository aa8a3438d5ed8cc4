//! Structural declaration of a configuration type: its fields, defaults and
//! class-level options.

use crate::annotations::TypeExpr;
use crate::converters::{Converter, ConverterRegistry};
use crate::error::ConversionError;
use crate::value::Value;

/// Validation run on a resolved value before it is stored.
pub type CheckFn = fn(&Value) -> Result<(), ConversionError>;

/// True when `name` follows the environment key convention: at least one
/// uppercase letter and no lowercase ones.
///
/// Declared names that are not environment keys are plain attributes.
pub fn is_env_key(name: &str) -> bool {
    name.chars().any(char::is_uppercase) && !name.chars().any(char::is_lowercase)
}

/// A single declared field.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    name: String,
    type_expr: TypeExpr,
    default: Option<Value>,
    check: Option<CheckFn>,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, type_expr: TypeExpr) -> Self {
        Self {
            name: name.into(),
            type_expr,
            default: None,
            check: None,
        }
    }

    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn with_check(mut self, check: CheckFn) -> Self {
        self.check = Some(check);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_expr(&self) -> &TypeExpr {
        &self.type_expr
    }

    pub fn default(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub fn check(&self) -> Option<CheckFn> {
        self.check
    }

    pub fn is_env_key(&self) -> bool {
        is_env_key(&self.name)
    }
}

/// Ordered field declarations plus class-level options.
///
/// Built once per configuration type. Resolution reads it but never changes it.
///
/// ```rust
/// use typedenv::{Declaration, TypeExpr};
///
/// let declaration = Declaration::new()
///     .field("NUM_WORKERS", TypeExpr::Integer)
///     .field_with_default("LOG_LEVEL", TypeExpr::Text, "INFO")
///     .field("API_KEY", TypeExpr::optional(TypeExpr::Text));
///
/// assert_eq!(declaration.fields().len(), 3);
/// assert!(declaration.is_frozen());
/// ```
#[derive(Debug, Clone)]
pub struct Declaration {
    fields: Vec<FieldSpec>,
    attributes: Vec<(String, Value)>,
    converters: Vec<Converter>,
    frozen: bool,
}

impl Default for Declaration {
    fn default() -> Self {
        Self {
            fields: Vec::new(),
            attributes: Vec::new(),
            converters: Vec::new(),
            frozen: true,
        }
    }
}

impl Declaration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a parent declaration.
    ///
    /// Fields, plain attributes and extra converters carry over. The frozen
    /// policy does not: it is reset to the default and must be set per type.
    pub fn extending(parent: Declaration) -> Self {
        Self {
            frozen: true,
            ..parent
        }
    }

    pub fn frozen(mut self, frozen: bool) -> Self {
        self.frozen = frozen;
        self
    }

    /// Register an extra converter for this type only.
    pub fn converter(mut self, converter: Converter) -> Self {
        self.converters.push(converter);
        self
    }

    /// Declare a field. Redeclaring an existing name replaces it in place.
    pub fn field(self, name: impl Into<String>, type_expr: TypeExpr) -> Self {
        self.push_field(FieldSpec::new(name, type_expr))
    }

    pub fn field_with_default(
        self,
        name: impl Into<String>,
        type_expr: TypeExpr,
        default: impl Into<Value>,
    ) -> Self {
        self.push_field(FieldSpec::new(name, type_expr).with_default(default))
    }

    /// Override only the default of an already declared field.
    ///
    /// An undeclared name becomes a plain attribute holding `default`.
    pub fn default_for(mut self, name: &str, default: impl Into<Value>) -> Self {
        match self.fields.iter_mut().find(|f| f.name == name) {
            Some(field) => field.default = Some(default.into()),
            None => self.attributes.push((name.to_string(), default.into())),
        }
        self
    }

    /// Validate resolved values of an already declared field.
    ///
    /// Usually `<T as EnvType>::check`, so a `u16` field rejects `70000` as a
    /// conversion failure. Undeclared names are ignored.
    pub fn check(mut self, name: &str, check: CheckFn) -> Self {
        if let Some(field) = self.fields.iter_mut().find(|f| f.name == name) {
            field.check = Some(check);
        }
        self
    }

    /// Set a plain attribute that is never read from the environment.
    pub fn attribute(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((name, value)),
        }
        self
    }

    fn push_field(mut self, spec: FieldSpec) -> Self {
        match self.fields.iter_mut().find(|f| f.name == spec.name) {
            Some(existing) => *existing = spec,
            None => self.fields.push(spec),
        }
        self
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn field_spec(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn attributes(&self) -> &[(String, Value)] {
        &self.attributes
    }

    pub fn converters(&self) -> &[Converter] {
        &self.converters
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// A fresh registry for this type: the built-ins, then the extra
    /// converters in registration order.
    pub fn registry(&self) -> ConverterRegistry {
        let mut registry = ConverterRegistry::with_builtins();
        for converter in &self.converters {
            registry.set_converter(converter.clone());
        }
        registry
    }
}
