//! Guest OS classification for destination template selection.
//!
//! Source inventories record a free-form guest OS identifier. The destination
//! selects a starting template by OS class label, so every identifier has to
//! resolve to *some* class:
//!
//! 1. exact match against the table of known source identifiers,
//! 2. a substring hint for the OS family (Linux or Windows),
//! 3. `unknown`.
//!
//! ```rust
//! use v2v_builder::guest_os::{OsClass, template_labels};
//!
//! assert_eq!(OsClass::resolve("rhel_7x64").as_str(), "rhel7.7");
//! let labels = template_labels(&OsClass::resolve("xyz123"));
//! assert_eq!(labels.get("os.template.kubevirt.io/unknown").map(String::as_str), Some("true"));
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Default class for unmatched Linux identifiers.
pub const DEFAULT_LINUX: &str = "rhel8.1";
/// Default class for unmatched Windows identifiers.
pub const DEFAULT_WINDOWS: &str = "win10";
/// Class for everything else.
pub const UNKNOWN: &str = "unknown";

/// Template label prefix for the OS class. The full key is
/// `os.template.kubevirt.io/<class>`, the form destination templates select on.
pub const TEMPLATE_OS_LABEL_PREFIX: &str = "os.template.kubevirt.io/";
/// Constant workload label.
pub const TEMPLATE_WORKLOAD_LABEL: &str = "workload.template.kubevirt.io/server";
/// Constant flavor label.
pub const TEMPLATE_FLAVOR_LABEL: &str = "flavor.template.kubevirt.io/medium";

/// Known source guest OS identifiers and their destination class.
const OS_MAP: &[(&str, &str)] = &[
    ("rhel_6_10_plus_ppc64", "rhel6.10"),
    ("rhel_6_ppc64", "rhel6.10"),
    ("rhel_6", "rhel6.10"),
    ("rhel_6x64", "rhel6.10"),
    ("rhel_6_9_plus_ppc64", "rhel6.9"),
    ("rhel_7_ppc64", "rhel7.7"),
    ("rhel_7_s390x", "rhel7.7"),
    ("rhel_7x64", "rhel7.7"),
    ("rhel_8x64", "rhel8.1"),
    ("sles_11_ppc64", "opensuse15.0"),
    ("sles_11", "opensuse15.0"),
    ("sles_12_s390x", "opensuse15.0"),
    ("ubuntu_12_04", "ubuntu18.04"),
    ("ubuntu_12_10", "ubuntu18.04"),
    ("ubuntu_13_04", "ubuntu18.04"),
    ("ubuntu_13_10", "ubuntu18.04"),
    ("ubuntu_14_04_ppc64", "ubuntu18.04"),
    ("ubuntu_14_04", "ubuntu18.04"),
    ("ubuntu_16_04_s390x", "ubuntu18.04"),
    ("windows_10", "win10"),
    ("windows_10x64", "win10"),
    ("windows_2003", "win10"),
    ("windows_2003x64", "win10"),
    ("windows_2008R2x64", "win2k8"),
    ("windows_2008", "win2k8"),
    ("windows_2008x64", "win2k8"),
    ("windows_2012R2x64", "win2k12r2"),
    ("windows_2012x64", "win2k12r2"),
    ("windows_2016x64", "win2k16"),
    ("windows_2019x64", "win2k19"),
    ("windows_7", "win10"),
    ("windows_7x64", "win10"),
    ("windows_8", "win10"),
    ("windows_8x64", "win10"),
    ("windows_xp", "win10"),
];

/// How an OS class was arrived at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OsMatch {
    /// Found in the table of known identifiers
    Exact,
    /// Linux family hint in the identifier
    DefaultLinux,
    /// Windows family hint in the identifier
    DefaultWindows,
    Unknown,
}

/// Destination OS class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OsClass {
    pub name: String,
    pub matched: OsMatch,
}

impl OsClass {
    /// Classify a source guest OS identifier. Never fails.
    ///
    /// Substring hints are case-sensitive, as source identifiers are
    /// lowercase by convention.
    pub fn resolve(os_type: &str) -> Self {
        if let Some((_, class)) = OS_MAP.iter().find(|(id, _)| *id == os_type) {
            return Self {
                name: class.to_string(),
                matched: OsMatch::Exact,
            };
        }

        let (name, matched) = if os_type.contains("linux") || os_type.contains("rhel") {
            (DEFAULT_LINUX, OsMatch::DefaultLinux)
        } else if os_type.contains("win") {
            (DEFAULT_WINDOWS, OsMatch::DefaultWindows)
        } else {
            (UNKNOWN, OsMatch::Unknown)
        };

        Self {
            name: name.to_string(),
            matched,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for OsClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Template selection labels for an OS class.
pub fn template_labels(class: &OsClass) -> BTreeMap<String, String> {
    BTreeMap::from([
        (
            format!("{}{}", TEMPLATE_OS_LABEL_PREFIX, class.name),
            "true".to_string(),
        ),
        (TEMPLATE_WORKLOAD_LABEL.to_string(), "true".to_string()),
        (TEMPLATE_FLAVOR_LABEL.to_string(), "true".to_string()),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_matches() {
        let class = OsClass::resolve("rhel_7x64");
        assert_eq!(class.as_str(), "rhel7.7");
        assert_eq!(class.matched, OsMatch::Exact);
        assert_eq!(OsClass::resolve("windows_2019x64").as_str(), "win2k19");
        assert_eq!(OsClass::resolve("sles_11").as_str(), "opensuse15.0");
        assert_eq!(OsClass::resolve("ubuntu_14_04").as_str(), "ubuntu18.04");
    }

    #[test]
    fn test_family_fallbacks() {
        let linux = OsClass::resolve("some_custom_linux_build");
        assert_eq!(linux.as_str(), DEFAULT_LINUX);
        assert_eq!(linux.matched, OsMatch::DefaultLinux);

        assert_eq!(OsClass::resolve("rhel_9x64").as_str(), DEFAULT_LINUX);
        assert_eq!(OsClass::resolve("windows_2022").as_str(), DEFAULT_WINDOWS);
        assert_eq!(OsClass::resolve("win11").matched, OsMatch::DefaultWindows);
    }

    #[test]
    fn test_unknown_is_total() {
        for os_type in ["xyz123", "", "Linux_Upper", "WINDOWS", "freebsd"] {
            let class = OsClass::resolve(os_type);
            assert_eq!(class.as_str(), UNKNOWN, "{os_type}");
            assert_eq!(class.matched, OsMatch::Unknown);
        }
    }

    #[test]
    fn test_template_labels() {
        let labels = template_labels(&OsClass::resolve("rhel_7x64"));
        assert_eq!(labels.len(), 3);
        assert_eq!(labels["os.template.kubevirt.io/rhel7.7"], "true");
        assert_eq!(labels[TEMPLATE_WORKLOAD_LABEL], "true");
        assert_eq!(labels[TEMPLATE_FLAVOR_LABEL], "true");
    }
}
