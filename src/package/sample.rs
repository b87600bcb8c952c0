//! Metric samples describing installed package instances.

use super::PackageName;

/// Label names of the `portage_package` gauge.
///
/// Names in capital letters are the package-manager specification's variable
/// names; `repository` and `SLOT` are the sidecar files they are read from.
pub const PACKAGE_LABELS: [&str; 9] = [
    "CATEGORY",
    "P",
    "PF",
    "PN",
    "PR",
    "PV",
    "PVR",
    "repository",
    "SLOT",
];

/// One installed package instance, published as `portage_package{...} 1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageSample {
    pub category: String,
    pub package: PackageName,
    pub repository: String,
    pub slot: String,
}

impl PackageSample {
    /// Label values in [`PACKAGE_LABELS`] order.
    pub fn label_values(&self) -> [String; PACKAGE_LABELS.len()] {
        [
            self.category.clone(),
            self.package.name_version(),
            self.package.full_name(),
            self.package.name().to_string(),
            self.package.revision().to_string(),
            self.package.version().to_string(),
            self.package.version_revision(),
            self.repository.clone(),
            self.slot.clone(),
        ]
    }
}
