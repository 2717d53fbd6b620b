//! Variable lookup for template expansion.

use std::borrow::Borrow;
use std::collections::{BTreeMap, HashMap};
use std::hash::{BuildHasher, Hash};

/// A source of template variable values.
///
/// A missing variable and an empty value are treated the same way by
/// expansion: both contribute nothing.
pub trait Variables {
    fn lookup(&self, name: &str) -> Option<&str>;
}

impl<K, V, S> Variables for HashMap<K, V, S>
where
    K: Borrow<str> + Hash + Eq,
    V: AsRef<str>,
    S: BuildHasher,
{
    fn lookup(&self, name: &str) -> Option<&str> {
        self.get(name).map(AsRef::as_ref)
    }
}

impl<K, V> Variables for BTreeMap<K, V>
where
    K: Borrow<str> + Ord,
    V: AsRef<str>,
{
    fn lookup(&self, name: &str) -> Option<&str> {
        self.get(name).map(AsRef::as_ref)
    }
}

impl<K, V> Variables for [(K, V)]
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    fn lookup(&self, name: &str) -> Option<&str> {
        self.iter()
            .find(|(key, _)| key.as_ref() == name)
            .map(|(_, value)| value.as_ref())
    }
}

impl<K, V, const N: usize> Variables for [(K, V); N]
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    fn lookup(&self, name: &str) -> Option<&str> {
        self.as_slice().lookup(name)
    }
}

impl<T: Variables + ?Sized> Variables for &T {
    fn lookup(&self, name: &str) -> Option<&str> {
        (**self).lookup(name)
    }
}
