use std::collections::{HashMap, HashSet};

use log::debug;

use crate::assembly::catalog::ComponentCatalog;
use crate::assembly::error::VerificationError;
use crate::assembly::profile::{AssemblyProfile, ComponentProfile, PartitionProfile};
use crate::descriptor::Cardinality;
use crate::descriptor::capability::is_lifecycle_type;
use crate::dependency;
use crate::kernel::error::{Error, Result};

/// Returns true for names made of ASCII letters, digits, `.` and `-`.
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
}

/// Structural checks run on an assembly before anything is instantiated.
///
/// All problems are collected; a single one is returned as is, several as
/// [`Error::Multiple`].
pub struct AssemblyVerifier<'a> {
    catalog: &'a ComponentCatalog,
}

impl<'a> AssemblyVerifier<'a> {
    pub fn new(catalog: &'a ComponentCatalog) -> Self {
        Self { catalog }
    }

    pub fn verify(&self, assembly: &AssemblyProfile) -> Result<()> {
        let unit = assembly.name.as_str();
        let mut errors: Vec<Error> = Vec::new();

        self.verify_names(assembly, &mut errors);

        let components = assembly.components();
        let by_name: HashMap<&str, &ComponentProfile> = components.iter().map(|c| (c.name(), *c)).collect();

        for component in &components {
            self.verify_directives(unit, component, &by_name, &mut errors);
            self.verify_capabilities(unit, component, &mut errors);
            self.verify_services(unit, component, &mut errors);
        }

        for partition in assembly.partitions() {
            self.verify_ordering(unit, partition, &mut errors);
        }
        self.verify_wiring_order(unit, assembly, &mut errors);

        debug!("Verified unit '{}': {} problem(s)", unit, errors.len());
        Error::collect(format!("Verification of unit '{}'", unit), errors)
    }

    fn verify_names(&self, assembly: &AssemblyProfile, errors: &mut Vec<Error>) {
        let unit = assembly.name.as_str();
        let check = |kind: &'static str, name: &str, errors: &mut Vec<Error>| {
            if !is_valid_name(name) {
                errors.push(
                    VerificationError::InvalidName {
                        unit: unit.to_string(),
                        kind,
                        name: name.to_string(),
                    }
                    .into(),
                );
            }
        };

        check("unit", unit, errors);
        for partition in assembly.partitions().into_iter().skip(1) {
            check("partition", partition.name(), errors);
        }

        let mut seen = HashSet::new();
        for component in assembly.components() {
            check("component", component.name(), errors);
            if !seen.insert(component.name().to_string()) {
                errors.push(duplicate(unit, "component", component.name()));
            }
        }
        for listener in &assembly.listeners {
            check("listener", &listener.name, errors);
            if !seen.insert(listener.name.clone()) {
                errors.push(duplicate(unit, "listener", &listener.name));
            }
        }

        for partition in assembly.partitions() {
            let mut siblings = HashSet::new();
            for child in &partition.partitions {
                if !siblings.insert(child.name()) {
                    errors.push(duplicate(unit, "partition", child.name()));
                }
            }
        }
    }

    fn verify_directives(
        &self,
        unit: &str,
        component: &ComponentProfile,
        by_name: &HashMap<&str, &ComponentProfile>,
        errors: &mut Vec<Error>,
    ) {
        let name = component.name();
        let descriptor = &component.descriptor;

        for directive in &component.metadata.directives {
            let Some(dependency) = descriptor.dependency(&directive.consumer_key) else {
                errors.push(
                    VerificationError::UnknownDependencyKey {
                        unit: unit.to_string(),
                        component: name.to_string(),
                        key: directive.consumer_key.clone(),
                    }
                    .into(),
                );
                continue;
            };

            let Some(provider) = by_name.get(directive.provider_name.as_str()) else {
                errors.push(
                    VerificationError::MissingProvider {
                        unit: unit.to_string(),
                        component: name.to_string(),
                        key: directive.consumer_key.clone(),
                        provider: directive.provider_name.clone(),
                    }
                    .into(),
                );
                continue;
            };

            let services = self.catalog.services();
            let assignable = provider
                .descriptor
                .services()
                .iter()
                .any(|s| services.is_assignable(&s.service_type, &dependency.service_type));
            if !assignable {
                errors.push(
                    VerificationError::UnassignableProvider {
                        unit: unit.to_string(),
                        component: name.to_string(),
                        key: directive.consumer_key.clone(),
                        provider: directive.provider_name.clone(),
                        required: dependency.service_type.clone(),
                    }
                    .into(),
                );
            }
        }

        for dependency in descriptor.dependencies() {
            let directives = component.metadata.directives_for(&dependency.key);

            if directives.is_empty() && !dependency.optional {
                errors.push(
                    VerificationError::MissingRequiredDependency {
                        unit: unit.to_string(),
                        component: name.to_string(),
                        key: dependency.key.clone(),
                    }
                    .into(),
                );
            }

            match dependency.cardinality {
                Cardinality::Single if directives.len() > 1 => {
                    errors.push(
                        VerificationError::TooManyProviders {
                            unit: unit.to_string(),
                            component: name.to_string(),
                            key: dependency.key.clone(),
                            count: directives.len(),
                        }
                        .into(),
                    );
                }
                Cardinality::Map => {
                    let mut aliases = HashSet::new();
                    for directive in directives {
                        if !aliases.insert(directive.map_key()) {
                            errors.push(
                                VerificationError::DuplicateAlias {
                                    unit: unit.to_string(),
                                    component: name.to_string(),
                                    key: dependency.key.clone(),
                                    alias: directive.map_key().to_string(),
                                }
                                .into(),
                            );
                        }
                    }
                }
                _ => {}
            }
        }
    }

    fn verify_capabilities(&self, unit: &str, component: &ComponentProfile, errors: &mut Vec<Error>) {
        for (first, second) in component.descriptor.capabilities().exclusive_conflicts() {
            errors.push(
                VerificationError::ExclusiveCapabilities {
                    unit: unit.to_string(),
                    component: component.name().to_string(),
                    first: first.to_string(),
                    second: second.to_string(),
                }
                .into(),
            );
        }
    }

    fn verify_services(&self, unit: &str, component: &ComponentProfile, errors: &mut Vec<Error>) {
        let services = self.catalog.services();
        let name = component.name();

        for provided in component.descriptor.services() {
            let service = provided.service_type.as_str();
            let error = match services.get(service) {
                None => Some(VerificationError::UnknownServiceType {
                    unit: unit.to_string(),
                    component: name.to_string(),
                    service: service.to_string(),
                }),
                Some(service_type) if !service_type.is_interface() => Some(VerificationError::NotAnInterface {
                    unit: unit.to_string(),
                    component: name.to_string(),
                    service: service.to_string(),
                }),
                Some(service_type) if !service_type.is_public() => Some(VerificationError::NotPublic {
                    unit: unit.to_string(),
                    component: name.to_string(),
                    service: service.to_string(),
                }),
                Some(_) => {
                    let lifecycle = if is_lifecycle_type(service) {
                        Some(service.to_string())
                    } else {
                        services.lifecycle_ancestor(service)
                    };
                    lifecycle.map(|lifecycle| VerificationError::ExtendsLifecycle {
                        unit: unit.to_string(),
                        component: name.to_string(),
                        service: service.to_string(),
                        lifecycle,
                    })
                }
            };
            if let Some(error) = error {
                errors.push(error.into());
            }

            if !self.catalog.implements(component.implementation_key(), service) {
                errors.push(
                    VerificationError::UnimplementedService {
                        unit: unit.to_string(),
                        component: name.to_string(),
                        implementation: component.implementation_key().to_string(),
                        service: service.to_string(),
                    }
                    .into(),
                );
            }
        }
    }

    /// Providers wired across partitions must sit in a partition that is
    /// started first: below the consumer's partition, or in a sibling branch
    /// the consumer's branch depends on.
    fn verify_wiring_order(&self, unit: &str, assembly: &AssemblyProfile, errors: &mut Vec<Error>) {
        let mut locations = HashMap::new();
        locate(&assembly.root, &mut Vec::new(), &mut locations);

        for component in assembly.components() {
            let Some(consumer) = locations.get(component.name()) else {
                continue;
            };
            for directive in &component.metadata.directives {
                let Some(provider) = locations.get(directive.provider_name.as_str()) else {
                    continue;
                };
                if !starts_before(provider, consumer) {
                    errors.push(
                        VerificationError::UnorderedProvider {
                            unit: unit.to_string(),
                            component: component.name().to_string(),
                            key: directive.consumer_key.clone(),
                            provider: directive.provider_name.clone(),
                        }
                        .into(),
                    );
                }
            }
        }
    }

    fn verify_ordering(&self, unit: &str, partition: &PartitionProfile, errors: &mut Vec<Error>) {
        let siblings: HashSet<&str> = partition.partitions.iter().map(|p| p.name()).collect();
        for child in &partition.partitions {
            for dependency in &child.depends {
                if !siblings.contains(dependency.as_str()) {
                    errors.push(
                        VerificationError::UnknownPartitionDependency {
                            unit: unit.to_string(),
                            partition: child.name().to_string(),
                            dependency: dependency.clone(),
                        }
                        .into(),
                    );
                }
            }
        }

        if let Err(e) = dependency::order_partitions(partition.name(), &partition.partitions, true) {
            errors.push(e.into());
        }
        if let Err(e) = dependency::order_in(partition.name(), &partition.components, true) {
            errors.push(e.into());
        }
    }
}

/// Partition chain from the root down to the partition holding each component.
fn locate<'p>(
    partition: &'p PartitionProfile,
    path: &mut Vec<&'p PartitionProfile>,
    out: &mut HashMap<&'p str, Vec<&'p PartitionProfile>>,
) {
    path.push(partition);
    for component in &partition.components {
        out.entry(component.name()).or_insert_with(|| path.clone());
    }
    for child in &partition.partitions {
        locate(child, path, out);
    }
    path.pop();
}

/// True when the partition layout alone makes `provider`'s partition start
/// before the component located at `consumer`.
fn starts_before(provider: &[&PartitionProfile], consumer: &[&PartitionProfile]) -> bool {
    let common = provider
        .iter()
        .zip(consumer)
        .take_while(|(p, c)| std::ptr::eq(**p, **c))
        .count();
    match (provider.get(common), consumer.get(common)) {
        // Same partition, or child partitions start before their parent's components.
        (None, None) | (Some(_), None) => true,
        // A partition's own components start after everything below it.
        (None, Some(_)) => false,
        (Some(provider_branch), Some(consumer_branch)) => match common.checked_sub(1) {
            Some(parent) => depends_transitively(consumer[parent], consumer_branch.name(), provider_branch.name()),
            None => false,
        },
    }
}

/// Whether sibling `from` reaches sibling `to` through `depends` edges of `parent`'s children.
fn depends_transitively<'a>(parent: &'a PartitionProfile, from: &'a str, to: &str) -> bool {
    let mut pending = vec![from];
    let mut seen = HashSet::new();
    while let Some(name) = pending.pop() {
        if !seen.insert(name) {
            continue;
        }
        for sibling in parent.partitions.iter().filter(|p| p.name() == name) {
            for dependency in &sibling.depends {
                if dependency == to {
                    return true;
                }
                pending.push(dependency.as_str());
            }
        }
    }
    false
}

fn duplicate(unit: &str, kind: &'static str, name: &str) -> Error {
    VerificationError::DuplicateName {
        unit: unit.to_string(),
        kind,
        name: name.to_string(),
    }
    .into()
}
