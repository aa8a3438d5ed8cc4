//! Resolution of declared fields against the environment, and the per-type
//! singleton cache.

use std::any::{type_name, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, LazyLock, Mutex, PoisonError};

use crate::annotations::{
    allows_none_type, get_annotated_args, get_usable_type_args, Metadata, TypeExpr,
};
use crate::converters::{Converter, ConverterRegistry};
use crate::declaration::{Declaration, FieldSpec};
use crate::env::{Environment, ProcessEnv};
use crate::error::EnvError;
use crate::instance::ConfigInstance;
use crate::value::Value;

/// Cache slot of one configuration type
type Slot = Arc<Mutex<Option<Arc<ConfigInstance>>>>;

static SINGLETONS: LazyLock<Mutex<HashMap<TypeId, Slot>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

/// A configuration type backed by environment variables.
///
/// Usually implemented with `#[derive(EnvLoader)]`; implement
/// [`declaration`](EnvLoader::declaration) by hand to declare types at runtime.
pub trait EnvLoader: 'static {
    /// The fields and options of this type.
    fn declaration() -> Declaration;

    /// The process-wide instance of this type.
    ///
    /// The first call resolves every field from the process environment and
    /// caches the result. Later calls return the cached instance without
    /// reading the environment again. Failures are not cached.
    ///
    /// Concurrent first calls resolve once; the others wait and share the
    /// result. A converter may load other configuration types, but not the
    /// type it is resolving.
    fn load() -> Result<Arc<ConfigInstance>, EnvError> {
        let slot = {
            let mut slots = SINGLETONS.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(slots.entry(TypeId::of::<Self>()).or_default())
        };

        let mut cached = slot.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(instance) = cached.as_ref() {
            tracing::trace!(config = type_name::<Self>(), "Returning cached configuration");
            return Ok(Arc::clone(instance));
        }

        let instance = Arc::new(Self::resolve_from(&ProcessEnv)?);
        *cached = Some(Arc::clone(&instance));
        Ok(instance)
    }

    /// Resolve a fresh, uncached instance from `env`.
    fn resolve_from<E: Environment + ?Sized>(env: &E) -> Result<ConfigInstance, EnvError> {
        resolve(type_name::<Self>(), &Self::declaration(), env)
    }
}

/// Resolve every field of `declaration` against `env`.
///
/// Fields are processed in declaration order. The first failure aborts the
/// whole resolution.
pub fn resolve<E: Environment + ?Sized>(
    type_name: &str,
    declaration: &Declaration,
    env: &E,
) -> Result<ConfigInstance, EnvError> {
    let registry = declaration.registry();
    let mut instance = ConfigInstance::new(type_name, declaration.is_frozen());

    for (name, value) in declaration.attributes() {
        instance.store(name, value.clone(), false);
    }

    for field in declaration.fields() {
        if !field.is_env_key() {
            if let Some(default) = field.default() {
                instance.store(field.name(), default.clone(), false);
            }
            continue;
        }

        let value = resolve_field(field, &registry, env)?;
        instance.store(field.name(), value, true);
    }

    tracing::debug!(
        config = type_name,
        fields = declaration.fields().len(),
        "Resolved configuration"
    );
    Ok(instance)
}

/// Where a field's raw value came from
enum Raw {
    Missing,
    Default(Value),
    Env(String),
}

/// The nullability, effective type and converter of a field
struct FieldPlan {
    nullable: bool,
    effective: TypeExpr,
    converter: Converter,
}

fn plan_field(field: &FieldSpec, registry: &ConverterRegistry) -> Result<FieldPlan, EnvError> {
    let name = field.name();

    let (declared, inline) = match get_annotated_args(field.type_expr()) {
        Some((base, metadata)) => (base, metadata.iter().find_map(Metadata::as_converter)),
        None => (field.type_expr(), None),
    };

    let nullable = allows_none_type(declared);
    let effective = if nullable {
        match get_usable_type_args(declared).as_slice() {
            [] => return Err(EnvError::unsupported(name, declared)),
            [only] => (*only).clone(),
            many => TypeExpr::union(many.iter().map(|arm| (*arm).clone())),
        }
    } else {
        declared.clone()
    };

    let converter = match inline {
        Some(converter) if converter.target() == &effective || converter.target() == declared => {
            converter.clone()
        }
        Some(converter) => {
            return Err(EnvError::unsupported(
                name,
                format!("{effective} (inline converter produces {})", converter.target()),
            ));
        }
        None => registry
            .get_converter(&effective)
            .or_else(|_| registry.get_converter(declared))
            .map_err(|_| EnvError::unsupported(name, &effective))?
            .clone(),
    };

    Ok(FieldPlan {
        nullable,
        effective,
        converter,
    })
}

fn resolve_field<E: Environment + ?Sized>(
    field: &FieldSpec,
    registry: &ConverterRegistry,
    env: &E,
) -> Result<Value, EnvError> {
    let name = field.name();
    let plan = plan_field(field, registry)?;

    let default = match field.default() {
        Some(value) => Raw::Default(value.clone()),
        None if plan.nullable => Raw::Default(Value::None),
        None => Raw::Missing,
    };

    let raw = match env.get(name) {
        Some(text) => Raw::Env(text),
        None => default,
    };

    let value = match raw {
        Raw::Missing => return Err(EnvError::missing(name)),
        Raw::Default(Value::None) if !plan.nullable => {
            return Err(EnvError::Nullability {
                name: name.to_string(),
            });
        }
        Raw::Default(value) if value.is_none() => {
            tracing::debug!(field = name, source = "none", "Resolved field");
            value
        }
        Raw::Default(value) if value.matches(&plan.effective) => {
            tracing::debug!(field = name, source = "default", "Resolved field");
            value
        }
        Raw::Default(Value::Text(text)) | Raw::Env(text) => {
            tracing::debug!(field = name, source = "environment", "Resolved field");
            plan.converter
                .convert(&text)
                .map_err(|e| EnvError::conversion(name, &plan.effective, e))?
        }
        Raw::Default(other) => {
            return Err(EnvError::Invariant {
                name: name.to_string(),
                message: format!(
                    "{} default does not match declared type {}",
                    other.kind(),
                    plan.effective
                ),
            });
        }
    };

    if let Some(check) = field.check() {
        check(&value).map_err(|e| EnvError::conversion(name, &plan.effective, e))?;
    }
    Ok(value)
}
