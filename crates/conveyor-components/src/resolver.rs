//! Resolution of `type` selectors into configured component instances.
//!
//! Resolution walks `Unresolved -> TypeKeyChecked -> {AliasMatched | SymbolLookup}
//! -> Instantiated -> Configured`. Every failure is fatal; nothing is cached,
//! so each call produces a fresh instance.

use crate::component::Capability;
use crate::error::ResolutionError;
use crate::registry::ComponentRegistry;
use conveyor_config::{ConfigTree, ValueType};
use log::debug;

/// Config key naming the implementation of a component.
pub const TYPE_CONFIG_NAME: &str = "type";

/// Resolves component sub-trees against a registry.
#[derive(Debug, Clone, Default)]
pub struct ComponentResolver {
    registry: ComponentRegistry,
}

impl ComponentResolver {
    pub fn new(registry: ComponentRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    /// Instantiate the implementation of capability `C` named by `config.type`.
    ///
    /// With `configure`, the instance's configuration entry point runs once
    /// with the same sub-tree.
    pub fn create<C>(&self, config: &ConfigTree, configure: bool) -> Result<Box<C>, ResolutionError>
    where
        C: Capability + ?Sized,
    {
        let symbol = match config.get(TYPE_CONFIG_NAME) {
            None => {
                return Err(ResolutionError::MissingType {
                    capability: C::NAME,
                });
            }
            Some(value) => value.as_str().ok_or(ResolutionError::InvalidType {
                capability: C::NAME,
                found: ValueType::of(value),
            })?,
        };

        let id = if self.registry.is_alias::<C>(symbol) {
            let id = self.registry.resolve_id::<C>(symbol);
            debug!(
                "matched {} alias (alias={}, id={})",
                C::NAME,
                symbol,
                id
            );
            id
        } else {
            debug!("looking up {} implementation (id={})", C::NAME, symbol);
            symbol.to_string()
        };

        let constructor =
            self.registry
                .lookup::<C>(&id)
                .map_err(|source| ResolutionError::Unresolved {
                    capability: C::NAME,
                    symbol: symbol.to_string(),
                    source,
                })?;
        let mut instance = constructor();
        debug!("instantiated {} (id={})", C::NAME, id);

        if configure {
            self.configure(instance.as_mut(), config)?;
        }

        Ok(instance)
    }

    /// Run the configuration entry point of an instance made by [`Self::create`].
    ///
    /// Failures are fatal and name the `type` symbol of `config`.
    pub fn configure<C>(&self, instance: &mut C, config: &ConfigTree) -> Result<(), ResolutionError>
    where
        C: Capability + ?Sized,
    {
        instance
            .configure(config)
            .map_err(|source| ResolutionError::Configure {
                capability: C::NAME,
                symbol: config.get_str(TYPE_CONFIG_NAME).unwrap_or_default().to_string(),
                source,
            })?;
        debug!("configured {}", C::NAME);
        Ok(())
    }
}
