//! Component types available to every unit deployed by the `tessera` binary.
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use tessera_core::assembly::ComponentCatalog;
use tessera_core::config::Configuration;
use tessera_core::descriptor::{CapabilitySet, ComponentDescriptor, DependencyDescriptor, ServiceDescriptor, ServiceType};
use tessera_core::kernel::Result;
use tessera_core::lifecycle::{ComponentLogger, ComponentResult, ResolvedDependencies};
use tessera_core::{Component, ComponentError, ComponentHandle, UnitEvent, UnitListener};

pub const CLOCK_SERVICE: &str = "demo.Clock";
pub const CLOCK: &str = "demo.SystemClock";
pub const GREETER: &str = "demo.Greeter";
pub const LOG_LISTENER: &str = "demo.LogListener";

/// Hands out wall-clock readings and counts them.
#[derive(Debug, Default)]
pub struct SystemClock {
    logger: OnceLock<ComponentLogger>,
    readings: AtomicU64,
}

impl SystemClock {
    pub fn now_millis(&self) -> u128 {
        self.readings.fetch_add(1, Ordering::Relaxed);
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default()
    }

    pub fn readings(&self) -> u64 {
        self.readings.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl Component for SystemClock {
    async fn enable_logging(&self, logger: ComponentLogger) -> ComponentResult {
        let _ = self.logger.set(logger);
        Ok(())
    }

    async fn start(&self) -> ComponentResult {
        if let Some(logger) = self.logger.get() {
            logger.info("clock started");
        }
        Ok(())
    }

    async fn dispose(&self) -> ComponentResult {
        if let Some(logger) = self.logger.get() {
            logger.debug(&format!("clock disposed after {} reading(s)", self.readings()));
        }
        Ok(())
    }
}

/// Logs a configurable greeting, stamped by the clock it depends on.
#[derive(Debug, Default)]
pub struct Greeter {
    logger: OnceLock<ComponentLogger>,
    clock: OnceLock<ComponentHandle>,
    greeting: OnceLock<String>,
}

#[async_trait]
impl Component for Greeter {
    async fn enable_logging(&self, logger: ComponentLogger) -> ComponentResult {
        let _ = self.logger.set(logger);
        Ok(())
    }

    async fn service(&self, dependencies: &ResolvedDependencies) -> ComponentResult {
        let clock = dependencies.single("clock").ok_or("no clock available")?;
        if clock.downcast_ref::<SystemClock>().is_none() {
            return Err(format!("'{}' is not a system clock", clock.name()).into());
        }
        let _ = self.clock.set(clock.clone());
        Ok(())
    }

    async fn configure(&self, configuration: &Configuration) -> ComponentResult {
        let greeting = configuration.get_or("greeting", "hello".to_string());
        if greeting.trim().is_empty() {
            return Err("greeting must not be empty".into());
        }
        let _ = self.greeting.set(greeting);
        Ok(())
    }

    async fn start(&self) -> ComponentResult {
        let stamp = self
            .clock
            .get()
            .and_then(|handle| handle.downcast_ref::<SystemClock>())
            .map(SystemClock::now_millis)
            .unwrap_or_default();
        let greeting = self.greeting.get().map(String::as_str).unwrap_or("hello");
        if let Some(logger) = self.logger.get() {
            logger.info(&format!("{} (at {})", greeting, stamp));
        }
        Ok(())
    }

    async fn stop(&self) -> ComponentResult {
        if let Some(logger) = self.logger.get() {
            logger.info("goodbye");
        }
        Ok(())
    }
}

/// Writes unit events to the log.
#[derive(Debug)]
pub struct LogListener {
    name: String,
}

#[async_trait]
impl UnitListener for LogListener {
    async fn on_event(&self, event: &UnitEvent) -> std::result::Result<(), ComponentError> {
        log::info!(target: "tessera::events", "[{}] {}", self.name, event);
        Ok(())
    }
}

/// Catalog with the built-in component and listener types.
pub fn catalog() -> Result<ComponentCatalog> {
    let mut catalog = ComponentCatalog::new();
    catalog.register_service(ServiceType::interface(CLOCK_SERVICE))?;

    catalog.register(
        ComponentDescriptor::new(CLOCK)
            .provides(ServiceDescriptor::new(CLOCK_SERVICE))
            .with_capabilities(CapabilitySet::LOG_ENABLED | CapabilitySet::STARTABLE | CapabilitySet::DISPOSABLE),
        &[CLOCK_SERVICE],
        |_| Ok(Arc::new(SystemClock::default()) as Arc<dyn Component>),
    )?;

    catalog.register(
        ComponentDescriptor::new(GREETER)
            .requires(DependencyDescriptor::single("clock", CLOCK_SERVICE))
            .with_capabilities(
                CapabilitySet::LOG_ENABLED
                    | CapabilitySet::SERVICEABLE
                    | CapabilitySet::CONFIGURABLE
                    | CapabilitySet::STARTABLE,
            ),
        &[],
        |_| Ok(Arc::new(Greeter::default()) as Arc<dyn Component>),
    )?;

    catalog.register_listener(LOG_LISTENER, |metadata| {
        Ok(Arc::new(LogListener {
            name: metadata.name.clone(),
        }) as Arc<dyn UnitListener>)
    })?;

    Ok(catalog)
}
