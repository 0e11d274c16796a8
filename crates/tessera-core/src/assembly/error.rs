use thiserror::Error;

/// Structural problems found in an assembly before anything is instantiated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerificationError {
    #[error("Invalid {kind} name '{name}' in unit '{unit}': names may only contain letters, digits, '.' and '-'")]
    InvalidName {
        unit: String,
        kind: &'static str,
        name: String,
    },

    #[error("Duplicate {kind} name '{name}' in unit '{unit}'")]
    DuplicateName {
        unit: String,
        kind: &'static str,
        name: String,
    },

    #[error("Unknown implementation '{implementation}' for '{name}' in unit '{unit}'")]
    UnknownImplementation {
        unit: String,
        name: String,
        implementation: String,
    },

    #[error("Component '{component}' in unit '{unit}' has no dependency with key '{key}'")]
    UnknownDependencyKey {
        unit: String,
        component: String,
        key: String,
    },

    #[error("Provider '{provider}' for dependency '{key}' of component '{component}' does not exist in unit '{unit}'")]
    MissingProvider {
        unit: String,
        component: String,
        key: String,
        provider: String,
    },

    #[error("Provider '{provider}' does not provide a service assignable to '{required}' for dependency '{key}' of component '{component}' in unit '{unit}'")]
    UnassignableProvider {
        unit: String,
        component: String,
        key: String,
        provider: String,
        required: String,
    },

    #[error("Provider '{provider}' for dependency '{key}' of component '{component}' in unit '{unit}' sits in a partition that is not started before it")]
    UnorderedProvider {
        unit: String,
        component: String,
        key: String,
        provider: String,
    },

    #[error("Required dependency '{key}' of component '{component}' in unit '{unit}' has no provider")]
    MissingRequiredDependency {
        unit: String,
        component: String,
        key: String,
    },

    #[error("Dependency '{key}' of component '{component}' in unit '{unit}' accepts one provider but {count} were given")]
    TooManyProviders {
        unit: String,
        component: String,
        key: String,
        count: usize,
    },

    #[error("Alias '{alias}' is used twice for map dependency '{key}' of component '{component}' in unit '{unit}'")]
    DuplicateAlias {
        unit: String,
        component: String,
        key: String,
        alias: String,
    },

    #[error("Component '{component}' in unit '{unit}' declares mutually exclusive capabilities {first} and {second}")]
    ExclusiveCapabilities {
        unit: String,
        component: String,
        first: String,
        second: String,
    },

    #[error("Service type '{service}' provided by component '{component}' in unit '{unit}' is unknown")]
    UnknownServiceType {
        unit: String,
        component: String,
        service: String,
    },

    #[error("Service type '{service}' provided by component '{component}' in unit '{unit}' is not an interface")]
    NotAnInterface {
        unit: String,
        component: String,
        service: String,
    },

    #[error("Service type '{service}' provided by component '{component}' in unit '{unit}' is not public")]
    NotPublic {
        unit: String,
        component: String,
        service: String,
    },

    #[error("Service type '{service}' provided by component '{component}' in unit '{unit}' extends lifecycle type '{lifecycle}'")]
    ExtendsLifecycle {
        unit: String,
        component: String,
        service: String,
        lifecycle: String,
    },

    #[error("Implementation '{implementation}' of component '{component}' in unit '{unit}' does not implement service '{service}'")]
    UnimplementedService {
        unit: String,
        component: String,
        implementation: String,
        service: String,
    },

    #[error("Partition '{partition}' in unit '{unit}' depends on unknown sibling '{dependency}'")]
    UnknownPartitionDependency {
        unit: String,
        partition: String,
        dependency: String,
    },
}

impl VerificationError {
    /// Name of the unit the error was found in.
    pub fn unit(&self) -> &str {
        match self {
            VerificationError::InvalidName { unit, .. }
            | VerificationError::DuplicateName { unit, .. }
            | VerificationError::UnknownImplementation { unit, .. }
            | VerificationError::UnknownDependencyKey { unit, .. }
            | VerificationError::MissingProvider { unit, .. }
            | VerificationError::UnassignableProvider { unit, .. }
            | VerificationError::UnorderedProvider { unit, .. }
            | VerificationError::MissingRequiredDependency { unit, .. }
            | VerificationError::TooManyProviders { unit, .. }
            | VerificationError::DuplicateAlias { unit, .. }
            | VerificationError::ExclusiveCapabilities { unit, .. }
            | VerificationError::UnknownServiceType { unit, .. }
            | VerificationError::NotAnInterface { unit, .. }
            | VerificationError::NotPublic { unit, .. }
            | VerificationError::ExtendsLifecycle { unit, .. }
            | VerificationError::UnimplementedService { unit, .. }
            | VerificationError::UnknownPartitionDependency { unit, .. } => unit,
        }
    }
}
