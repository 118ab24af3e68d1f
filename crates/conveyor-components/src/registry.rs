//! Start-up registry mapping implementation ids and aliases to constructors.

use crate::component::Capability;
use crate::error::LookupError;
use log::debug;
use parking_lot::RwLock;
use std::any::{Any, TypeId};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Constructor for a capability trait object.
pub type Constructor<C> = Arc<dyn Fn() -> Box<C> + Send + Sync>;

/// One constructor, type-erased so entries of every capability share a table.
struct Entry {
    capability: &'static str,
    constructor: Box<dyn Any + Send + Sync>,
}

/// Registered implementation as listed by [`ComponentRegistry::implementations`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredComponent {
    pub id: String,
    pub capabilities: Vec<&'static str>,
}

/// Registered alias as listed by [`ComponentRegistry::aliases`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredAlias {
    pub capability: &'static str,
    pub alias: String,
    pub id: String,
}

#[derive(Default)]
struct Tables {
    /// Implementation id to constructors keyed by capability.
    implementations: HashMap<String, HashMap<TypeId, Entry>>,
    /// (capability, alias) to implementation id.
    aliases: HashMap<(TypeId, String), (&'static str, String)>,
}

/// In-memory registry of pluggable component implementations.
///
/// Modules register once at process start; clones share the same tables.
#[derive(Default, Clone)]
pub struct ComponentRegistry {
    tables: Arc<RwLock<Tables>>,
}

impl std::fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tables = self.tables.read();
        f.debug_struct("ComponentRegistry")
            .field("implementations", &tables.implementations.len())
            .field("aliases", &tables.aliases.len())
            .finish()
    }
}

impl ComponentRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a constructor for capability `C` under a fully-qualified id.
    pub fn register<C, F>(&self, id: impl Into<String>, constructor: F)
    where
        C: Capability + ?Sized,
        F: Fn() -> Box<C> + Send + Sync + 'static,
    {
        let id = id.into();
        debug!("registering component (id={}, capability={})", id, C::NAME);
        let constructor: Constructor<C> = Arc::new(constructor);
        self.tables
            .write()
            .implementations
            .entry(id)
            .or_default()
            .insert(
                TypeId::of::<C>(),
                Entry {
                    capability: C::NAME,
                    constructor: Box::new(constructor),
                },
            );
    }

    /// Register a short name for an implementation id of capability `C`.
    pub fn register_alias<C>(&self, alias: impl Into<String>, id: impl Into<String>)
    where
        C: Capability + ?Sized,
    {
        let alias = alias.into();
        let id = id.into();
        debug!(
            "registering alias (alias={}, id={}, capability={})",
            alias, id, C::NAME
        );
        self.tables
            .write()
            .aliases
            .insert((TypeId::of::<C>(), alias), (C::NAME, id));
    }

    /// Map a symbol to an implementation id: the aliased id, or the symbol itself.
    pub fn resolve_id<C>(&self, symbol: &str) -> String
    where
        C: Capability + ?Sized,
    {
        self.tables
            .read()
            .aliases
            .get(&(TypeId::of::<C>(), symbol.to_string()))
            .map(|(_, id)| id.clone())
            .unwrap_or_else(|| symbol.to_string())
    }

    /// Whether `symbol` is a registered alias for capability `C`.
    pub fn is_alias<C>(&self, symbol: &str) -> bool
    where
        C: Capability + ?Sized,
    {
        self.tables
            .read()
            .aliases
            .contains_key(&(TypeId::of::<C>(), symbol.to_string()))
    }

    /// Fetch the constructor registered for `id` and capability `C`.
    pub fn lookup<C>(&self, id: &str) -> Result<Constructor<C>, LookupError>
    where
        C: Capability + ?Sized,
    {
        let tables = self.tables.read();
        let entries = tables
            .implementations
            .get(id)
            .ok_or_else(|| LookupError::NotRegistered { id: id.to_string() })?;
        let wrong_capability = || {
            let mut provides: Vec<&str> = entries.values().map(|e| e.capability).collect();
            provides.sort_unstable();
            LookupError::WrongCapability {
                id: id.to_string(),
                capability: C::NAME,
                provides: provides.join(", "),
            }
        };
        entries
            .get(&TypeId::of::<C>())
            .and_then(|entry| entry.constructor.downcast_ref::<Constructor<C>>())
            .cloned()
            .ok_or_else(wrong_capability)
    }

    /// All registered implementations, sorted by id.
    pub fn implementations(&self) -> Vec<RegisteredComponent> {
        let tables = self.tables.read();
        let sorted: BTreeMap<&String, &HashMap<TypeId, Entry>> =
            tables.implementations.iter().collect();
        sorted
            .into_iter()
            .map(|(id, entries)| {
                let mut capabilities: Vec<&'static str> =
                    entries.values().map(|e| e.capability).collect();
                capabilities.sort_unstable();
                RegisteredComponent {
                    id: id.clone(),
                    capabilities,
                }
            })
            .collect()
    }

    /// All registered aliases, sorted by capability then alias.
    pub fn aliases(&self) -> Vec<RegisteredAlias> {
        let mut aliases: Vec<RegisteredAlias> = self
            .tables
            .read()
            .aliases
            .iter()
            .map(|((_, alias), (capability, id))| RegisteredAlias {
                capability: *capability,
                alias: alias.clone(),
                id: id.clone(),
            })
            .collect();
        aliases.sort_by(|a, b| (a.capability, &a.alias).cmp(&(b.capability, &b.alias)));
        aliases
    }
}

#[cfg(test)]
mod tests {
    use super::ComponentRegistry;
    use crate::error::{ComponentError, LookupError};
    use crate::{Component, Input, Output, WriteMode};
    use conveyor_config::ConfigTree;
    use pretty_assertions::assert_eq;

    #[derive(Debug, Default)]
    struct DummyInput;

    impl Component for DummyInput {
        fn configure(&mut self, _config: &ConfigTree) -> Result<(), ComponentError> {
            Ok(())
        }
    }

    impl Input for DummyInput {}

    #[derive(Debug, Default)]
    struct DummyOutput;

    impl Component for DummyOutput {
        fn configure(&mut self, _config: &ConfigTree) -> Result<(), ComponentError> {
            Ok(())
        }
    }

    impl Output for DummyOutput {
        fn write_modes(&self) -> &'static [WriteMode] {
            &[WriteMode::Append]
        }
    }

    fn registry() -> ComponentRegistry {
        let registry = ComponentRegistry::new();
        registry.register::<dyn Input, _>("test.DummyInput", || Box::new(DummyInput));
        registry.register::<dyn Output, _>("test.DummyOutput", || Box::new(DummyOutput));
        registry.register_alias::<dyn Input>("dummy", "test.DummyInput");
        registry
    }

    #[test]
    fn resolves_aliases_per_capability() {
        let registry = registry();
        assert_eq!(registry.resolve_id::<dyn Input>("dummy"), "test.DummyInput");
        assert_eq!(registry.resolve_id::<dyn Output>("dummy"), "dummy");
        assert!(registry.is_alias::<dyn Input>("dummy"));
    }

    #[test]
    fn lookup_constructs_fresh_instances() {
        let registry = registry();
        let constructor = registry.lookup::<dyn Input>("test.DummyInput").expect("lookup");
        let first = constructor();
        let second = constructor();
        assert!(!first.is_streaming());
        assert!(!second.is_streaming());
    }

    #[test]
    fn lookup_reports_missing_and_wrong_capability() {
        let registry = registry();
        let missing = registry.lookup::<dyn Input>("test.Nope").err().expect("missing");
        assert!(matches!(missing, LookupError::NotRegistered { .. }));

        let wrong = registry
            .lookup::<dyn Input>("test.DummyOutput")
            .err()
            .expect("wrong capability");
        assert_eq!(
            wrong.to_string(),
            "test.DummyOutput does not implement input (provides: output)"
        );
    }

    #[test]
    fn lists_implementations_and_aliases() {
        let registry = registry();
        let ids: Vec<String> = registry.implementations().into_iter().map(|c| c.id).collect();
        assert_eq!(ids, vec!["test.DummyInput", "test.DummyOutput"]);
        let aliases = registry.aliases();
        assert_eq!(aliases.len(), 1);
        assert_eq!(aliases[0].capability, "input");
        assert_eq!(aliases[0].id, "test.DummyInput");
    }
}
