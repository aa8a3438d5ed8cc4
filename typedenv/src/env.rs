//! Environment variable lookup

use std::collections::{BTreeMap, HashMap};
use std::env;
use std::hash::BuildHasher;

/// Read-only key-value lookup the resolver pulls raw values from.
///
/// The resolver never mutates the environment.
pub trait Environment {
    fn get(&self, key: &str) -> Option<String>;
}

/// The process environment.
///
/// Variables whose value is not valid unicode are treated as unset.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl Environment for ProcessEnv {
    fn get(&self, key: &str) -> Option<String> {
        env::var(key).ok()
    }
}

impl<S: BuildHasher> Environment for HashMap<String, String, S> {
    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).cloned()
    }
}

impl Environment for BTreeMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        BTreeMap::get(self, key).cloned()
    }
}

impl<E: Environment + ?Sized> Environment for &E {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }
}
