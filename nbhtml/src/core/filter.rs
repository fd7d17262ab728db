//! Extension filter deciding which walked files get converted.

use std::ffi::OsStr;
use std::path::Path;

/// Strip a single leading `.` so `".ipynb"` and `"ipynb"` configure the same filter.
pub fn normalize_extension(extension: &str) -> &str {
    extension.strip_prefix('.').unwrap_or(extension)
}

/// Extension filter over file names.
///
/// Matching is exact and case-sensitive. A name that is only a dot-prefixed
/// stem (e.g. `.ipynb`) has no extension and never matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionFilter {
    extension: String,
}

impl ExtensionFilter {
    pub fn new(extension: &str) -> Self {
        Self {
            extension: normalize_extension(extension).to_string(),
        }
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn matches(&self, file_name: &OsStr) -> bool {
        Path::new(file_name)
            .extension()
            .is_some_and(|ext| ext == OsStr::new(&self.extension))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matches(filter: &ExtensionFilter, name: &str) -> bool {
        filter.matches(OsStr::new(name))
    }

    #[test]
    fn leading_dot_is_optional() {
        assert_eq!(ExtensionFilter::new(".ipynb"), ExtensionFilter::new("ipynb"));
        assert_eq!(ExtensionFilter::new(".ipynb").extension(), "ipynb");
    }

    #[test]
    fn matches_only_final_extension() {
        let filter = ExtensionFilter::new("ipynb");
        assert!(matches(&filter, "a.ipynb"));
        assert!(matches(&filter, "archive.tar.ipynb"));
        assert!(!matches(&filter, "a.ipynb.bak"));
        assert!(!matches(&filter, "c.txt"));
        assert!(!matches(&filter, "ipynb"));
    }

    #[test]
    fn comparison_is_case_sensitive() {
        let filter = ExtensionFilter::new("ipynb");
        assert!(!matches(&filter, "A.IPYNB"));
        assert!(!matches(&filter, "a.Ipynb"));
    }

    #[test]
    fn dot_only_name_has_no_extension() {
        let filter = ExtensionFilter::new("ipynb");
        assert!(!matches(&filter, ".ipynb"));
        assert!(matches(&filter, ".hidden.ipynb"));
    }
}
