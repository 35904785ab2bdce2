//! Per-run substitution state.

use std::collections::{BTreeMap, HashMap};
use std::sync::{PoisonError, RwLock};

use uuid::Uuid;

use super::facts::NamingFacts;

/// Caller-supplied option values (option identifier -> chosen value).
pub type OptionValues = BTreeMap<String, String>;

/// `UUID:<id>` -> generated value, stable for one generation run.
///
/// Reads of cached identifiers are concurrent; inserts take the write lock
/// and re-check, so two threads racing on the same identifier agree on one
/// value.
pub struct UuidCache {
    entries: RwLock<HashMap<String, String>>,
    generator: fn() -> String,
}

impl UuidCache {
    pub fn new() -> Self {
        Self::with_generator(random_uuid)
    }

    /// Cache backed by a custom generator (deterministic output in tests).
    pub fn with_generator(generator: fn() -> String) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            generator,
        }
    }

    /// Cached value for `identifier`, generating and storing one if needed.
    pub fn get_or_generate(&self, identifier: &str) -> String {
        if let Some(value) = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(identifier)
        {
            return value.clone();
        }

        let mut entries = self
            .entries
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        entries
            .entry(identifier.to_string())
            .or_insert_with(|| (self.generator)())
            .clone()
    }

    pub fn get(&self, identifier: &str) -> Option<String> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(identifier)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot sorted by identifier.
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

impl Default for UuidCache {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for UuidCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UuidCache").field("len", &self.len()).finish()
    }
}

/// Uppercase hyphenated v4 UUID.
fn random_uuid() -> String {
    Uuid::new_v4().hyphenated().to_string().to_uppercase()
}

/// Everything a substitution needs besides the template itself.
///
/// Create one per generation run and pass it by reference to every
/// substitution in that run. Never share one across runs.
#[derive(Debug, Default)]
pub struct SubstitutionContext {
    values: OptionValues,
    facts: NamingFacts,
    uuids: UuidCache,
}

impl SubstitutionContext {
    pub fn new(facts: NamingFacts) -> Self {
        Self {
            values: OptionValues::new(),
            facts,
            uuids: UuidCache::new(),
        }
    }

    pub fn with_values(mut self, values: OptionValues) -> Self {
        self.values = values;
        self
    }

    pub fn with_value(mut self, option: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(option.into(), value.into());
        self
    }

    pub fn with_uuid_cache(mut self, uuids: UuidCache) -> Self {
        self.uuids = uuids;
        self
    }

    pub fn values(&self) -> &OptionValues {
        &self.values
    }

    pub fn value(&self, option: &str) -> Option<&str> {
        self.values.get(option).map(String::as_str)
    }

    pub fn facts(&self) -> &NamingFacts {
        &self.facts
    }

    pub fn uuids(&self) -> &UuidCache {
        &self.uuids
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    static COUNTER: AtomicUsize = AtomicUsize::new(0);

    fn counting() -> String {
        format!("ID-{}", COUNTER.fetch_add(1, Ordering::SeqCst))
    }

    #[test]
    fn same_identifier_reuses_value() {
        let cache = UuidCache::new();
        let a = cache.get_or_generate("svc");
        let b = cache.get_or_generate("svc");
        let c = cache.get_or_generate("other");

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn generated_values_are_uppercase_uuids() {
        let value = UuidCache::new().get_or_generate("x");
        assert_eq!(value.len(), 36);
        assert_eq!(value, value.to_uppercase());
        assert!(Uuid::parse_str(&value).is_ok());
    }

    #[test]
    fn separate_caches_do_not_share_entries() {
        let first = UuidCache::new();
        let second = UuidCache::new();
        assert_ne!(first.get_or_generate("svc"), second.get_or_generate("svc"));
    }

    #[test]
    fn concurrent_inserts_agree() {
        let cache = Arc::new(UuidCache::with_generator(counting));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || cache.get_or_generate("shared"))
            })
            .collect();

        let values: Vec<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(values.windows(2).all(|w| w[0] == w[1]));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn context_builder_collects_values() {
        let ctx = SubstitutionContext::new(NamingFacts::new())
            .with_value("name", "widget")
            .with_value("lang", "Swift");
        assert_eq!(ctx.value("name"), Some("widget"));
        assert_eq!(ctx.values().len(), 2);
        assert!(ctx.uuids().is_empty());
    }
}
