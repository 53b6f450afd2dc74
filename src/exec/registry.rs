use std::collections::HashMap;
use std::sync::Arc;

use crate::config::types::SandboxConfig;
use crate::error::{Result, ScriptboxError};
use crate::exec::strategies::{CppSimulator, PreviewStrategy, PythonSimulator};
use crate::exec::traits::ExecutionStrategy;

#[cfg(feature = "javascript")]
use crate::exec::strategies::JavaScriptSandbox;

/// Registry mapping file extensions to execution strategies.
///
/// An explicit table: adding a language means one `register` call, and
/// "storable" and "executable" stay independent — an allow-listed extension
/// with no entry here is storable but reports unsupported-type on execute.
pub struct StrategyRegistry {
    strategies: HashMap<String, Arc<dyn ExecutionStrategy>>,
}

impl StrategyRegistry {
    /// An empty registry. Useful in tests; production callers want
    /// [`StrategyRegistry::with_defaults`].
    pub fn new() -> Self {
        Self {
            strategies: HashMap::new(),
        }
    }

    /// The standard strategy table: the sandboxed JavaScript interpreter
    /// (when compiled in), the Python and C++ pattern simulators, and
    /// preview passthrough for the remaining storable types.
    pub fn with_defaults(sandbox: &SandboxConfig) -> Self {
        let mut registry = Self::new();

        #[cfg(feature = "javascript")]
        {
            let js: Arc<dyn ExecutionStrategy> = Arc::new(JavaScriptSandbox::new(sandbox.clone()));
            registry.register("js", js.clone());
            registry.register("jsx", js);
        }
        #[cfg(not(feature = "javascript"))]
        let _ = sandbox;

        registry.register("py", Arc::new(PythonSimulator::new()));
        registry.register("cpp", Arc::new(CppSimulator::new()));

        let preview: Arc<dyn ExecutionStrategy> = Arc::new(PreviewStrategy::new());
        for ext in ["txt", "css", "html"] {
            registry.register(ext, preview.clone());
        }

        registry
    }

    pub fn register(&mut self, extension: &str, strategy: Arc<dyn ExecutionStrategy>) {
        self.strategies.insert(extension.to_string(), strategy);
    }

    /// Select the strategy for an extension.
    pub fn dispatch(&self, extension: &str) -> Result<Arc<dyn ExecutionStrategy>> {
        self.strategies
            .get(extension)
            .cloned()
            .ok_or_else(|| ScriptboxError::UnsupportedType {
                extension: extension.to_string(),
            })
    }
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_cover_simulated_and_preview_types() {
        let registry = StrategyRegistry::with_defaults(&SandboxConfig::default());
        assert_eq!(registry.dispatch("py").unwrap().name(), "python-sim");
        assert_eq!(registry.dispatch("cpp").unwrap().name(), "cpp-sim");
        assert_eq!(registry.dispatch("txt").unwrap().name(), "preview");
        assert_eq!(registry.dispatch("css").unwrap().name(), "preview");
        assert_eq!(registry.dispatch("html").unwrap().name(), "preview");
    }

    #[cfg(feature = "javascript")]
    #[test]
    fn test_defaults_cover_javascript() {
        let registry = StrategyRegistry::with_defaults(&SandboxConfig::default());
        assert_eq!(registry.dispatch("js").unwrap().name(), "javascript");
        assert_eq!(registry.dispatch("jsx").unwrap().name(), "javascript");
    }

    #[test]
    fn test_unknown_extension_is_unsupported() {
        let registry = StrategyRegistry::with_defaults(&SandboxConfig::default());
        let err = registry.dispatch("rb").err().unwrap();
        assert_eq!(err.kind(), "unsupported-type");
    }
}
