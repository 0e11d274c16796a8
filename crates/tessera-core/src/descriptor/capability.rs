use std::fmt;

bitflags::bitflags! {
    /// The lifecycle capabilities a component type declares.
    ///
    /// Computed once when the type is registered and consulted by the
    /// lifecycle executor to decide which stages to run.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct CapabilitySet: u16 {
        /// Receives a logger before anything else.
        const LOG_ENABLED = 1 << 0;
        /// Receives the component context.
        const CONTEXTUALIZABLE = 1 << 1;
        /// Receives resolved dependencies as a keyed map.
        const SERVICEABLE = 1 << 2;
        /// Receives resolved dependencies as a flat collection.
        const COMPOSABLE = 1 << 3;
        /// Receives its configuration tree.
        const CONFIGURABLE = 1 << 4;
        /// Receives flat string parameters.
        const PARAMETERIZABLE = 1 << 5;
        /// Has an initialization step.
        const INITIALIZABLE = 1 << 6;
        /// Has start and stop steps.
        const STARTABLE = 1 << 7;
        /// Has a dispose step.
        const DISPOSABLE = 1 << 8;
    }
}

/// Capability pairs that must never be declared together.
pub const EXCLUSIVE_CAPABILITIES: &[(CapabilitySet, CapabilitySet)] =
    &[(CapabilitySet::SERVICEABLE, CapabilitySet::COMPOSABLE)];

/// Service type names reserved for lifecycle capabilities.
///
/// These are pre-registered in every service catalog so that a provided
/// service extending one of them can be rejected.
pub const LIFECYCLE_TYPES: &[(CapabilitySet, &str)] = &[
    (CapabilitySet::LOG_ENABLED, "tessera.lifecycle.LogEnabled"),
    (CapabilitySet::CONTEXTUALIZABLE, "tessera.lifecycle.Contextualizable"),
    (CapabilitySet::SERVICEABLE, "tessera.lifecycle.Serviceable"),
    (CapabilitySet::COMPOSABLE, "tessera.lifecycle.Composable"),
    (CapabilitySet::CONFIGURABLE, "tessera.lifecycle.Configurable"),
    (CapabilitySet::PARAMETERIZABLE, "tessera.lifecycle.Parameterizable"),
    (CapabilitySet::INITIALIZABLE, "tessera.lifecycle.Initializable"),
    (CapabilitySet::STARTABLE, "tessera.lifecycle.Startable"),
    (CapabilitySet::DISPOSABLE, "tessera.lifecycle.Disposable"),
];

impl CapabilitySet {
    /// Every exclusive pair fully contained in this set.
    pub fn exclusive_conflicts(self) -> Vec<(CapabilitySet, CapabilitySet)> {
        EXCLUSIVE_CAPABILITIES
            .iter()
            .copied()
            .filter(|(a, b)| self.contains(*a) && self.contains(*b))
            .collect()
    }

    /// Whether the component receives its dependencies in either form.
    pub fn resolves_dependencies(self) -> bool {
        self.intersects(CapabilitySet::SERVICEABLE | CapabilitySet::COMPOSABLE)
    }

    /// Capability names in declaration order, e.g. `["STARTABLE", "DISPOSABLE"]`.
    pub fn names(self) -> Vec<&'static str> {
        self.iter_names().map(|(name, _)| name).collect()
    }
}

impl fmt::Display for CapabilitySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("NONE");
        }
        f.write_str(&self.names().join(" | "))
    }
}

/// Returns true when `type_name` is one of the reserved lifecycle type names.
pub fn is_lifecycle_type(type_name: &str) -> bool {
    LIFECYCLE_TYPES.iter().any(|(_, name)| *name == type_name)
}
