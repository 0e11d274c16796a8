/// Application name
pub const APP_NAME: &str = "Tessera";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Folder inside a deployment archive holding the unit documents
pub const UNIT_INF_DIR: &str = "UNIT-INF";

/// Archive metadata folder, ignored by the installer
pub const META_INF_DIR: &str = "META-INF";

/// Component and partition wiring document
pub const ASSEMBLY_DOCUMENT: &str = "assembly.toml";

/// Per-component configuration document
pub const CONFIG_DOCUMENT: &str = "config.toml";

/// Isolation and logging environment document
pub const ENVIRONMENT_DOCUMENT: &str = "environment.toml";

/// Library folder below `UNIT-INF`, copied one level deep into the work area
pub const LIB_DIR: &str = "lib";

/// Class tree below `UNIT-INF`, copied once into the work area
pub const CLASSES_DIR: &str = "classes";

/// Default directory that receives unit home locations
pub const DEFAULT_DEPLOY_DIR: &str = "apps";

/// Default directory that receives unit work areas
pub const DEFAULT_WORK_DIR: &str = "work";

/// Context key holding the unit name
pub const CONTEXT_UNIT_NAME: &str = "unit.name";

/// Context key holding the unit home location
pub const CONTEXT_UNIT_HOME: &str = "unit.home";

/// Context key holding the unit work location
pub const CONTEXT_UNIT_WORK: &str = "unit.work";

/// Context key holding the component name
pub const CONTEXT_COMPONENT_NAME: &str = "component.name";
