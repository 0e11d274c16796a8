use std::any::Any;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::config::Configuration;
use crate::lifecycle::context::ComponentContext;
use crate::lifecycle::resources::{ComponentLogger, Parameters, ResolvedDependencies};

/// Error type returned by component code.
pub type ComponentError = Box<dyn std::error::Error + Send + Sync>;

/// Result of a single lifecycle callback.
pub type ComponentResult = Result<(), ComponentError>;

/// Type-erasure helper so handles can be downcast to their concrete type.
pub trait AsAny: Any + Send + Sync {
    fn as_any(&self) -> &dyn Any;
    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

impl<T: Any + Send + Sync> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

/// A managed component.
///
/// Every callback has a no-op default. Which callbacks actually run is decided
/// by the capabilities declared on the component's descriptor, not by which
/// methods an implementation overrides.
#[async_trait]
pub trait Component: AsAny + fmt::Debug {
    async fn enable_logging(&self, _logger: ComponentLogger) -> ComponentResult {
        Ok(())
    }

    async fn contextualize(&self, _context: &ComponentContext) -> ComponentResult {
        Ok(())
    }

    /// Keyed dependencies, for `SERVICEABLE` components.
    async fn service(&self, _dependencies: &ResolvedDependencies) -> ComponentResult {
        Ok(())
    }

    /// Flat dependency list, for `COMPOSABLE` components.
    async fn compose(&self, _components: &[ComponentHandle]) -> ComponentResult {
        Ok(())
    }

    async fn configure(&self, _configuration: &Configuration) -> ComponentResult {
        Ok(())
    }

    async fn parameterize(&self, _parameters: &Parameters) -> ComponentResult {
        Ok(())
    }

    async fn initialize(&self) -> ComponentResult {
        Ok(())
    }

    async fn start(&self) -> ComponentResult {
        Ok(())
    }

    async fn stop(&self) -> ComponentResult {
        Ok(())
    }

    async fn dispose(&self) -> ComponentResult {
        Ok(())
    }
}

/// What consumers and the kernel see of a running component.
#[derive(Clone)]
pub struct ComponentHandle {
    name: String,
    services: Vec<String>,
    instance: Arc<dyn Component>,
}

impl ComponentHandle {
    pub fn new(name: &str, services: Vec<String>, instance: Arc<dyn Component>) -> Self {
        Self {
            name: name.to_string(),
            services,
            instance,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Service types this component is exposed as.
    pub fn services(&self) -> &[String] {
        &self.services
    }

    pub fn instance(&self) -> &Arc<dyn Component> {
        &self.instance
    }

    /// The concrete component, if it is a `T`.
    pub fn downcast<T: Component>(&self) -> Option<Arc<T>> {
        self.instance.clone().into_any().downcast::<T>().ok()
    }

    /// Borrow the concrete component, if it is a `T`.
    pub fn downcast_ref<T: Component>(&self) -> Option<&T> {
        self.instance.as_ref().as_any().downcast_ref::<T>()
    }
}

impl fmt::Debug for ComponentHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentHandle")
            .field("name", &self.name)
            .field("services", &self.services)
            .finish()
    }
}
