//! Installed package identity and metric samples.

mod name;
mod sample;

pub use name::{DEFAULT_REVISION, NameParseError, PackageName};
pub use sample::{PACKAGE_LABELS, PackageSample};
