use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use log::{debug, info, warn};

use crate::config::ConfigFormat;
use crate::deployer::collaborators::{InstallationRecord, Installer};
use crate::deployer::error::InstallationError;
use crate::kernel::constants::{
    ASSEMBLY_DOCUMENT, CLASSES_DIR, CONFIG_DOCUMENT, ENVIRONMENT_DOCUMENT, LIB_DIR, META_INF_DIR, UNIT_INF_DIR,
};
use crate::kernel::error::{Error, Result};
use crate::utils::fs::{copy_dir_shallow, copy_tree, remove_files};

/// Alternative extensions tried when a document is not found under its default name.
const DOCUMENT_EXTENSIONS: &[&str] = &["toml", "json", "yaml", "yml"];

/// Find `UNIT-INF/<stem>.<ext>`, preferring the default file name.
pub fn locate_document(unit_inf: &Path, default_name: &str) -> Option<PathBuf> {
    let default_path = unit_inf.join(default_name);
    if default_path.is_file() {
        return Some(default_path);
    }

    let stem = Path::new(default_name).file_stem()?;
    DOCUMENT_EXTENSIONS
        .iter()
        .map(|ext| unit_inf.join(stem).with_extension(ext))
        .find(|p| p.is_file() && ConfigFormat::from_path(p).is_some())
}

/// Installs unpacked unit directories.
///
/// Regular content goes into `<deploy_dir>/<name>`; existing files there are
/// never overwritten. `UNIT-INF/lib` (one level) and `UNIT-INF/classes` go
/// into a fresh work area below `work_dir`. `META-INF` is ignored.
#[derive(Debug, Clone)]
pub struct DirectoryInstaller {
    deploy_dir: PathBuf,
    work_dir: PathBuf,
}

impl DirectoryInstaller {
    pub fn new(deploy_dir: &Path, work_dir: &Path) -> Self {
        Self {
            deploy_dir: deploy_dir.to_path_buf(),
            work_dir: work_dir.to_path_buf(),
        }
    }

    pub fn deploy_dir(&self) -> &Path {
        &self.deploy_dir
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    fn documents(&self, source: &Path) -> std::result::Result<(PathBuf, PathBuf, PathBuf), InstallationError> {
        let unit_inf = source.join(UNIT_INF_DIR);
        if !unit_inf.is_dir() {
            return Err(InstallationError::InvalidLayout {
                path: source.to_path_buf(),
                message: format!("missing '{}' folder", UNIT_INF_DIR),
            });
        }

        let find = |name: &str| {
            locate_document(&unit_inf, name).ok_or_else(|| InstallationError::InvalidLayout {
                path: source.to_path_buf(),
                message: format!("missing required document '{}/{}'", UNIT_INF_DIR, name),
            })
        };
        Ok((find(ASSEMBLY_DOCUMENT)?, find(CONFIG_DOCUMENT)?, find(ENVIRONMENT_DOCUMENT)?))
    }

    fn create_work_area(&self, name: &str) -> std::result::Result<PathBuf, InstallationError> {
        fs::create_dir_all(&self.work_dir)
            .map_err(|e| InstallationError::io(&self.work_dir, "create work directory", e))?;

        tempfile::Builder::new()
            .prefix(&format!("{}-", name))
            .tempdir_in(&self.work_dir)
            .map(|dir| dir.keep())
            .map_err(|e| InstallationError::io(&self.work_dir, "create work area", e))
    }

    fn populate(&self, source: &Path, record: &mut InstallationRecord) -> std::result::Result<(), InstallationError> {
        let skip_reserved = |relative: &Path| relative == Path::new(META_INF_DIR) || relative == Path::new(UNIT_INF_DIR);
        let home_copy = copy_tree(source, &record.home, false, &skip_reserved)
            .map_err(|e| InstallationError::io(&record.home, "copy unit content", e))?;
        for skipped in &home_copy.skipped {
            warn!("Unit '{}': '{}' already exists and was not overwritten", record.name, skipped.display());
        }
        record.installed_files.extend(home_copy.copied);

        let unit_inf = source.join(UNIT_INF_DIR);
        let lib_dst = record.work.join(LIB_DIR);
        copy_dir_shallow(&unit_inf.join(LIB_DIR), &lib_dst, false)
            .map_err(|e| InstallationError::io(&lib_dst, "copy libraries", e))?;

        let classes_dst = record.work.join(CLASSES_DIR);
        if !classes_dst.exists() {
            copy_tree(&unit_inf.join(CLASSES_DIR), &classes_dst, false, &|_: &Path| false)
                .map_err(|e| InstallationError::io(&classes_dst, "copy classes", e))?;
        }
        Ok(())
    }

    fn remove(&self, record: &InstallationRecord) -> std::result::Result<(), InstallationError> {
        let failures = remove_files(&record.installed_files, &record.home);

        if record.created_home {
            // Only succeeds when empty, so foreign files are kept.
            let _ = fs::remove_dir(&record.home);
        }

        if let Err(e) = fs::remove_dir_all(&record.work) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!("Could not delete work area '{}': {}", record.work.display(), e);
            }
        }

        match failures.into_iter().next() {
            None => Ok(()),
            Some((path, e)) => Err(InstallationError::io(&path, "remove installed file", e)),
        }
    }
}

#[async_trait]
impl Installer for DirectoryInstaller {
    async fn install(&self, name: &str, source: &Path) -> Result<InstallationRecord> {
        if !source.exists() {
            return Err(InstallationError::SourceNotFound(source.to_path_buf()).into());
        }
        if !source.is_dir() {
            return Err(InstallationError::InvalidLayout {
                path: source.to_path_buf(),
                message: "only unpacked unit directories are supported".to_string(),
            }
            .into());
        }

        let (assembly, configuration, environment) = self.documents(source)?;

        let home = self.deploy_dir.join(name);
        let created_home = !home.exists();
        fs::create_dir_all(&home).map_err(|e| InstallationError::io(&home, "create home", e))?;

        let work = match self.create_work_area(name) {
            Ok(work) => work,
            Err(e) => {
                if created_home {
                    let _ = fs::remove_dir(&home);
                }
                return Err(e.into());
            }
        };

        let mut record = InstallationRecord {
            name: name.to_string(),
            source: source.to_path_buf(),
            home,
            work,
            assembly,
            configuration,
            environment,
            installed_files: Vec::new(),
            created_home,
        };

        if let Err(e) = self.populate(source, &mut record) {
            if let Err(cleanup) = self.remove(&record) {
                warn!("Cleanup after failed install of '{}' failed: {}", name, cleanup);
            }
            return Err(e.into());
        }

        info!(
            "Installed unit '{}' into '{}' ({} file(s))",
            name,
            record.home.display(),
            record.installed_files.len()
        );
        debug!("Work area for '{}': {}", name, record.work.display());
        Ok(record)
    }

    async fn uninstall(&self, record: &InstallationRecord) -> Result<()> {
        self.remove(record).map_err(|e| Error::Uninstallation {
            unit: record.name.clone(),
            source: Box::new(e.into()),
        })?;
        info!("Uninstalled unit '{}'", record.name);
        Ok(())
    }
}
