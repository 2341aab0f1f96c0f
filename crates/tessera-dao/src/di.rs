//! Dependency injection wiring for the data layer.

use crate::controller::{DbController, DbControllerParameters};
use std::sync::Arc;
use tessera_config::DatabaseConfig;
use tessera_core::module;

module! {
    pub DataModule {
        components = [DbController],
        providers = [],
    }
}

/// Builds the data module around a controller for `config`.
///
/// The pool is not created until the controller is first used.
#[must_use]
pub fn build_data_module(config: DatabaseConfig) -> Arc<DataModule> {
    let module = DataModule::builder()
        .with_component_parameters::<DbController>(DbControllerParameters {
            config,
            pool: tokio::sync::OnceCell::new(),
        })
        .build();
    Arc::new(module)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DatabaseController;
    use tessera_core::HasComponent;

    #[test]
    fn test_module_resolves_controller() {
        let module = build_data_module(DatabaseConfig::default());
        let controller: Arc<dyn DatabaseController> = module.resolve();
        assert!(!controller.is_setup());
    }

    #[test]
    fn test_module_returns_shared_controller() {
        let module = build_data_module(DatabaseConfig::default());
        let first: Arc<dyn DatabaseController> = module.resolve();
        let second: Arc<dyn DatabaseController> = module.resolve();
        assert!(Arc::ptr_eq(&first, &second));
    }
}
