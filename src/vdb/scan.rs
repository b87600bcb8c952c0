//! One pass over the installed-package database.
//!
//! Directory structure: `<root>/<category>/<PF>/{repository,SLOT}`

use anyhow::{Context, Result, anyhow};
use log::{error, warn};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::metrics::MetricRegistry;
use crate::package::{PackageName, PackageSample};
use crate::runtime::Runtime;

/// Sidecar file holding the repository an instance was installed from.
pub const REPOSITORY_FILE: &str = "repository";
/// Sidecar file holding the instance's slot.
pub const SLOT_FILE: &str = "SLOT";

/// Result of one complete scan.
#[derive(Debug, Clone, Default)]
pub struct ScanOutcome {
    pub samples: Vec<PackageSample>,
    /// Instance directories left out because of unreadable or malformed data.
    pub skipped: usize,
    pub elapsed: Duration,
}

/// Scan `root` and collect one sample per installed package instance.
///
/// Only a failure to list `root` itself is an error. Unreadable categories and
/// incomplete instances are logged and left out of the outcome.
#[tracing::instrument(skip(runtime))]
pub fn collect_installed<R: Runtime + ?Sized>(runtime: &R, root: &Path) -> Result<ScanOutcome> {
    let started = Instant::now();
    let mut outcome = ScanOutcome::default();

    let categories = runtime
        .read_dir(root)
        .with_context(|| format!("Failed to list package database {:?}", root))?;

    for category_path in categories {
        if !runtime.is_dir(&category_path) {
            continue;
        }

        let category = match dir_name(&category_path) {
            Ok(name) => name,
            Err(e) => {
                warn!("Skipping category {:?}: {}", category_path, e);
                continue;
            }
        };

        let instances = match runtime.read_dir(&category_path) {
            Ok(instances) => instances,
            Err(e) => {
                warn!("Failed to read category {:?}: {:#}", category_path, e);
                continue;
            }
        };

        for instance_path in instances {
            if !runtime.is_dir(&instance_path) {
                continue;
            }

            match read_instance(runtime, category, &instance_path) {
                Ok(sample) => outcome.samples.push(sample),
                Err(e) => {
                    warn!("Skipping package {:?}: {:#}", instance_path, e);
                    outcome.skipped += 1;
                }
            }
        }
    }

    outcome.elapsed = started.elapsed();
    Ok(outcome)
}

/// Run one scan and publish it, logging instead of failing.
///
/// Returns the published outcome, or `None` when the root could not be listed
/// and the previous set was left in place.
pub fn run_cycle<R: Runtime + ?Sized>(
    runtime: &R,
    root: &Path,
    registry: &MetricRegistry,
) -> Option<ScanOutcome> {
    let outcome = match collect_installed(runtime, root) {
        Ok(outcome) => outcome,
        Err(e) => {
            error!("Scan aborted: {:#}", e);
            return None;
        }
    };

    if let Err(e) = registry.publish(&outcome) {
        error!("Failed to publish scan of {:?}: {:#}", root, e);
        return None;
    }

    Some(outcome)
}

fn read_instance<R: Runtime + ?Sized>(
    runtime: &R,
    category: &str,
    instance_path: &Path,
) -> Result<PackageSample> {
    let repository = read_sidecar(runtime, instance_path, REPOSITORY_FILE)?;
    let slot = read_sidecar(runtime, instance_path, SLOT_FILE)?;
    let package = PackageName::parse(dir_name(instance_path)?)?;

    Ok(PackageSample {
        category: category.to_string(),
        package,
        repository,
        slot,
    })
}

fn read_sidecar<R: Runtime + ?Sized>(runtime: &R, dir: &Path, file: &str) -> Result<String> {
    let path: PathBuf = dir.join(file);
    let content = runtime
        .read_to_string(&path)
        .with_context(|| format!("Failed to read {} file", file))?;
    Ok(content.trim().to_string())
}

fn dir_name(path: &Path) -> Result<&str> {
    path.file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| anyhow!("directory name is not valid UTF-8"))
}
