//! Package directory name decomposition.
//!
//! An instance directory is named `<PN>-<PV>[-<PR>]`, e.g. `foo-bar-1.2.3-r4`.
//! Splitting is right-anchored: the revision is the trailing `-r<digits>`
//! segment if present, the version is the last remaining segment and must
//! start with a digit, and everything before it is the package name.

use std::fmt;
use std::str::FromStr;

/// Revision reported when the directory name carries none.
pub const DEFAULT_REVISION: &str = "r0";

/// Error returned when a directory name is not `<name>-<version>[-r<N>]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameParseError {
    pub input: String,
    pub message: &'static str,
}

impl fmt::Display for NameParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid package name '{}': {}", self.input, self.message)
    }
}

impl std::error::Error for NameParseError {}

/// Identity of an installed package instance, derived from its directory name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageName {
    name: String,
    version: String,
    revision: Option<String>,
}

impl PackageName {
    pub fn parse(input: &str) -> Result<Self, NameParseError> {
        let error = |message| NameParseError {
            input: input.to_string(),
            message,
        };

        let (rest, revision) = match input.rsplit_once('-') {
            Some((rest, last)) if is_revision(last) => (rest, Some(last)),
            _ => (input, None),
        };

        let (name, version) = rest
            .rsplit_once('-')
            .ok_or_else(|| error("missing version component"))?;

        if name.is_empty() {
            return Err(error("empty package name"));
        }
        if !version.starts_with(|c: char| c.is_ascii_digit()) {
            return Err(error("version must start with a digit"));
        }

        Ok(Self {
            name: name.to_string(),
            version: version.to_string(),
            revision: revision.map(str::to_string),
        })
    }

    /// Package name without version (PN).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Version without revision (PV).
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Revision (PR), `r0` when the directory name has none.
    pub fn revision(&self) -> &str {
        self.revision.as_deref().unwrap_or(DEFAULT_REVISION)
    }

    /// Whether the directory name carried an explicit `-r<N>` suffix.
    pub fn has_revision(&self) -> bool {
        self.revision.is_some()
    }

    /// Name and version (P).
    pub fn name_version(&self) -> String {
        format!("{}-{}", self.name, self.version)
    }

    /// Version and revision (PVR); just the version when no revision is present.
    pub fn version_revision(&self) -> String {
        match &self.revision {
            Some(revision) => format!("{}-{}", self.version, revision),
            None => self.version.clone(),
        }
    }

    /// Full directory name (PF).
    pub fn full_name(&self) -> String {
        format!("{}-{}", self.name, self.version_revision())
    }
}

impl FromStr for PackageName {
    type Err = NameParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for PackageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_name())
    }
}

/// `r` followed by one or more ASCII digits.
fn is_revision(segment: &str) -> bool {
    segment
        .strip_prefix('r')
        .is_some_and(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> PackageName {
        PackageName::parse(input).unwrap()
    }

    #[test]
    fn test_parse_with_revision() {
        let pkg = parse("foo-1.2.3-r4");
        assert_eq!(pkg.name(), "foo");
        assert_eq!(pkg.version(), "1.2.3");
        assert_eq!(pkg.revision(), "r4");
        assert_eq!(pkg.name_version(), "foo-1.2.3");
        assert_eq!(pkg.version_revision(), "1.2.3-r4");
        assert!(pkg.has_revision());
    }

    #[test]
    fn test_parse_without_revision_defaults_to_r0() {
        let pkg = parse("foo-1.2.3");
        assert_eq!(pkg.revision(), "r0");
        assert_eq!(pkg.version_revision(), "1.2.3");
        assert!(!pkg.has_revision());
    }

    #[test]
    fn test_parse_hyphenated_name() {
        let pkg = parse("foo-bar-1.2.3-r4");
        assert_eq!(pkg.name(), "foo-bar");
        assert_eq!(pkg.version(), "1.2.3");
        assert_eq!(pkg.revision(), "r4");

        // Name segments that start with a digit still belong to the name
        // when a later segment is the version.
        let pkg = parse("font-adobe-100dpi-1.0.4");
        assert_eq!(pkg.name(), "font-adobe-100dpi");
        assert_eq!(pkg.version(), "1.0.4");
    }

    #[test]
    fn test_parse_version_suffixes() {
        let pkg = parse("python-3.12.1_p1");
        assert_eq!(pkg.name(), "python");
        assert_eq!(pkg.version(), "3.12.1_p1");

        let pkg = parse("gcc-14.2.1_p20241221-r1");
        assert_eq!(pkg.version(), "14.2.1_p20241221");
        assert_eq!(pkg.revision(), "r1");

        let pkg = parse("openssl-3.0.15a");
        assert_eq!(pkg.version(), "3.0.15a");
    }

    #[test]
    fn test_parse_multi_digit_revision() {
        let pkg = parse("glibc-2.40-r105");
        assert_eq!(pkg.revision(), "r105");
        assert_eq!(pkg.version_revision(), "2.40-r105");
    }

    #[test]
    fn test_parse_explicit_r0_is_kept() {
        let pkg = parse("foo-1.0-r0");
        assert_eq!(pkg.revision(), "r0");
        assert!(pkg.has_revision());
        assert_eq!(pkg.version_revision(), "1.0-r0");
        assert_eq!(pkg.full_name(), "foo-1.0-r0");
    }

    #[test]
    fn test_parse_malformed_revision_is_not_a_revision() {
        // "r4x" is not a revision and cannot be a version either
        assert!(PackageName::parse("foo-1.0-r4x").is_err());
        // bare "r" is not a revision
        assert!(PackageName::parse("foo-1.0-r").is_err());
    }

    #[test]
    fn test_parse_rejects_unmatched_names() {
        for input in ["foo", "foo-bar", "-1.0", "foo-", "foo-r1", "foo-1.0--r1", ""] {
            let err = PackageName::parse(input).unwrap_err();
            assert_eq!(err.input, input);
        }
    }

    #[test]
    fn test_parse_error_display() {
        let err = PackageName::parse("foo-bar").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid package name 'foo-bar': version must start with a digit"
        );
    }

    #[test]
    fn test_round_trip_reconstructs_directory_name() {
        for input in [
            "foo-1.2.3",
            "foo-1.2.3-r4",
            "foo-bar-baz-0.1_alpha",
            "qtbase-6.8.1-r10",
            "x-9",
        ] {
            let pkg = parse(input);
            let mut rebuilt = pkg.name_version();
            if pkg.has_revision() {
                rebuilt.push('-');
                rebuilt.push_str(pkg.revision());
            }
            assert_eq!(rebuilt, input);
            assert_eq!(pkg.to_string(), input);
        }
    }

    #[test]
    fn test_from_str() {
        let pkg: PackageName = "bash-5.2_p37".parse().unwrap();
        assert_eq!(pkg.name(), "bash");
        assert!("bash".parse::<PackageName>().is_err());
    }
}
