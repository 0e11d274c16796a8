//! Console output for the `tessera` commands.
use tessera_core::application::startup_order;
use tessera_core::assembly::PartitionProfile;
use tessera_core::{AssemblyProfile, ComponentCatalog, KernelRegistry};

/// Print every registered component type with the services it provides.
pub fn print_types(catalog: &ComponentCatalog) {
    println!("Component types:");
    for key in catalog.type_keys() {
        let services = catalog
            .descriptor(&key)
            .map(|d| d.service_types())
            .unwrap_or_default();
        if services.is_empty() {
            println!("  - {}", key);
        } else {
            println!("  - {} (provides {})", key, services.join(", "));
        }
    }

    println!("Listener types:");
    for key in catalog.listener_keys() {
        println!("  - {}", key);
    }
}

/// Print the partition tree of a verified assembly and its startup order.
pub fn print_assembly(assembly: &AssemblyProfile) {
    println!("Unit '{}' verified.", assembly.name);
    print_partition(&assembly.root, 1);

    if !assembly.listeners.is_empty() {
        println!("  Listeners:");
        for listener in &assembly.listeners {
            println!("    - {} ({})", listener.name, listener.implementation_key);
        }
    }

    match startup_order(assembly) {
        Ok(order) => println!("Startup order: {}", order.join(" -> ")),
        Err(e) => eprintln!("Could not order components: {}", e),
    }
}

fn print_partition(partition: &PartitionProfile, depth: usize) {
    let indent = "  ".repeat(depth);
    if partition.depends.is_empty() {
        println!("{}Partition '{}'", indent, partition.name());
    } else {
        println!("{}Partition '{}' (after {})", indent, partition.name(), partition.depends.join(", "));
    }

    for component in &partition.components {
        let providers: Vec<&str> = component
            .metadata
            .directives
            .iter()
            .map(|d| d.provider_name.as_str())
            .collect();
        if providers.is_empty() {
            println!("{}  - {} [{}]", indent, component.name(), component.implementation_key());
        } else {
            println!(
                "{}  - {} [{}] uses {}",
                indent,
                component.name(),
                component.implementation_key(),
                providers.join(", ")
            );
        }
    }

    for child in &partition.partitions {
        print_partition(child, depth + 1);
    }
}

/// Print every unit the kernel knows about with its running components.
pub async fn print_units(kernel: &KernelRegistry) {
    let names = kernel.list_unit_names();
    if names.is_empty() {
        println!("No units deployed.");
        return;
    }

    println!("Deployed units:");
    for name in names {
        let Some(app) = kernel.unit(&name) else {
            continue;
        };
        let running: Vec<String> = app
            .running_components()
            .await
            .iter()
            .map(|handle| handle.name().to_string())
            .collect();
        println!("  - {} ({}): {}", name, app.state(), running.join(", "));

        let failed = app.failed_components().await;
        if !failed.is_empty() {
            println!("    skipped: {}", failed.join(", "));
        }
    }
}
