//! Metric registry exposed on the scrape endpoint.
//!
//! `portage_package` is a custom collector that owns a complete `GaugeVec` per
//! scan. Publishing builds the next family off to the side and swaps it in
//! under a write lock, so a scrape sees either the previous scan or the new
//! one and never a partially filled family.

use anyhow::{Context, Result};
use log::error;
use prometheus::core::{Collector, Desc};
use prometheus::proto::MetricFamily;
use prometheus::{Encoder, Gauge, GaugeVec, Opts, Registry, TextEncoder};
use std::sync::{Arc, PoisonError, RwLock};

use crate::package::{PACKAGE_LABELS, PackageSample};
use crate::vdb::ScanOutcome;

pub const PACKAGE_METRIC: &str = "portage_package";
pub const DURATION_METRIC: &str = "portage_installed_duration";

/// Registry shared between the scheduler (sole writer) and the HTTP endpoint.
pub struct MetricRegistry {
    registry: Registry,
    installed: InstalledPackages,
    duration: Gauge,
}

impl MetricRegistry {
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let installed = InstalledPackages::new()?;
        registry
            .register(Box::new(installed.clone()))
            .with_context(|| format!("Failed to register {}", PACKAGE_METRIC))?;

        let duration = Gauge::with_opts(Opts::new(
            DURATION_METRIC,
            "Duration of the last collection of installed packages.",
        ))?;
        registry
            .register(Box::new(duration.clone()))
            .with_context(|| format!("Failed to register {}", DURATION_METRIC))?;

        Ok(Self {
            registry,
            installed,
            duration,
        })
    }

    /// Replace the published package set with `outcome` and record its duration.
    pub fn publish(&self, outcome: &ScanOutcome) -> Result<()> {
        self.installed.replace(&outcome.samples)?;
        self.duration.set(outcome.elapsed.as_secs_f64());
        Ok(())
    }

    /// Number of package samples currently published.
    pub fn installed_len(&self) -> usize {
        self.installed
            .collect()
            .iter()
            .map(|family| family.get_metric().len())
            .sum()
    }

    /// Seconds taken by the last published scan, 0 before the first one.
    pub fn last_duration(&self) -> f64 {
        self.duration.get()
    }

    pub fn gather(&self) -> Vec<MetricFamily> {
        self.registry.gather()
    }

    /// Render all metrics in the text exposition format.
    pub fn encode_text(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder
            .encode(&self.gather(), &mut buffer)
            .context("Failed to encode metrics")?;
        String::from_utf8(buffer).context("Encoded metrics are not valid UTF-8")
    }
}

/// Collector for `portage_package` backed by a swappable gauge family.
#[derive(Clone)]
struct InstalledPackages {
    inner: Arc<InstalledInner>,
}

struct InstalledInner {
    descs: Vec<Desc>,
    current: RwLock<GaugeVec>,
}

impl InstalledPackages {
    fn new() -> Result<Self> {
        let family = Self::empty_family()?;
        let descs = family.desc().into_iter().cloned().collect();
        Ok(Self {
            inner: Arc::new(InstalledInner {
                descs,
                current: RwLock::new(family),
            }),
        })
    }

    fn empty_family() -> Result<GaugeVec> {
        let opts = Opts::new(PACKAGE_METRIC, "Installed packages");
        GaugeVec::new(opts, &PACKAGE_LABELS)
            .with_context(|| format!("Failed to create {}", PACKAGE_METRIC))
    }

    fn replace(&self, samples: &[PackageSample]) -> Result<()> {
        let family = Self::empty_family()?;
        for sample in samples {
            let values = sample.label_values();
            let values: Vec<&str> = values.iter().map(String::as_str).collect();
            match family.get_metric_with_label_values(&values) {
                Ok(gauge) => gauge.set(1.0),
                Err(e) => {
                    debug_assert!(false, "label schema mismatch for {:?}: {}", sample, e);
                    error!(
                        "Dropping sample {}/{}: label schema mismatch: {}",
                        sample.category, sample.package, e
                    );
                }
            }
        }

        // The guarded family is always complete, so a poisoned lock is still usable.
        *self
            .inner
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner) = family;
        Ok(())
    }
}

impl Collector for InstalledPackages {
    fn desc(&self) -> Vec<&Desc> {
        self.inner.descs.iter().collect()
    }

    fn collect(&self) -> Vec<MetricFamily> {
        self.inner
            .current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .collect()
    }
}
