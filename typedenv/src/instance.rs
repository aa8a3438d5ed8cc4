//! Resolved configuration record

use std::collections::{HashMap, HashSet};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::EnvError;
use crate::value::{EnvType, Value};

#[derive(Debug, Default)]
struct Slots {
    order: Vec<String>,
    values: HashMap<String, Value>,
}

impl Slots {
    fn insert(&mut self, name: &str, value: Value) {
        if self.values.insert(name.to_string(), value).is_none() {
            self.order.push(name.to_string());
        }
    }
}

/// One resolved value per declared field, plus any plain attributes.
///
/// Writes go through [`ConfigInstance::set`], which rejects reassignment of
/// environment-backed fields when the owning type is frozen. Plain attributes
/// are always writable.
#[derive(Debug)]
pub struct ConfigInstance {
    type_name: String,
    frozen: bool,
    env_backed: HashSet<String>,
    slots: RwLock<Slots>,
}

impl ConfigInstance {
    pub(crate) fn new(type_name: impl Into<String>, frozen: bool) -> Self {
        Self {
            type_name: type_name.into(),
            frozen,
            env_backed: HashSet::new(),
            slots: RwLock::new(Slots::default()),
        }
    }

    /// Store a value during resolution, bypassing the frozen check.
    pub(crate) fn store(&mut self, name: &str, value: Value, env_backed: bool) {
        if env_backed {
            self.env_backed.insert(name.to_string());
        }
        self.slots
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name, value);
    }

    fn read(&self) -> RwLockReadGuard<'_, Slots> {
        self.slots.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Slots> {
        self.slots.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Name of the configuration type this instance was resolved for.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub fn is_env_backed(&self, name: &str) -> bool {
        self.env_backed.contains(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.read().values.contains_key(name)
    }

    pub fn value(&self, name: &str) -> Option<Value> {
        self.read().values.get(name).cloned()
    }

    /// Read a value as `T`. `None` when unset or of another shape.
    pub fn get<T: EnvType>(&self, name: &str) -> Option<T> {
        self.read().values.get(name).and_then(T::from_value)
    }

    /// Like [`get`](Self::get), with an error naming the field and Rust type.
    pub fn extract<T: EnvType>(&self, name: &str) -> Result<T, EnvError> {
        self.get(name).ok_or_else(|| EnvError::extract::<T>(name))
    }

    /// Assign a value.
    ///
    /// # Errors
    ///
    /// [`EnvError::Frozen`] when `name` is environment-backed and the type is frozen.
    pub fn set(&self, name: &str, value: impl Into<Value>) -> Result<(), EnvError> {
        if self.frozen && self.is_env_backed(name) {
            return Err(EnvError::Frozen {
                name: name.to_string(),
                type_name: self.type_name.clone(),
            });
        }
        self.write().insert(name, value.into());
        Ok(())
    }

    /// All names and values, in declaration order followed by later additions.
    pub fn values(&self) -> Vec<(String, Value)> {
        let slots = self.read();
        slots
            .order
            .iter()
            .filter_map(|name| slots.values.get(name).map(|v| (name.clone(), v.clone())))
            .collect()
    }
}
