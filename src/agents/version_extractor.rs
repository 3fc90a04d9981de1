use crate::error::{Result, SyncError};
use crate::manifest::{DependencyDescriptor, Manifest};
use crate::utils::is_verbose;
use colored::Colorize;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Version found (or not) for one dependency key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionResult {
    pub key: String,
    pub version: Option<String>,
}

/// Reads role defaults files and pulls out the fallback version of a key,
/// e.g. `cni_version: '{{ cni_version_override or "v1.5.0" }}'` yields `v1.5.0`.
pub struct VersionExtractor<'a> {
    manifest: &'a Manifest,
}

impl<'a> VersionExtractor<'a> {
    pub fn new(manifest: &'a Manifest) -> Self {
        Self { manifest }
    }

    /// Extracts every declared key in order. The first unreadable file aborts
    /// the whole run.
    pub fn extract_all(&self) -> Result<Vec<ExtractionResult>> {
        self.manifest
            .dependencies
            .iter()
            .map(|descriptor| self.extract(descriptor))
            .collect()
    }

    pub fn extract(&self, descriptor: &DependencyDescriptor) -> Result<ExtractionResult> {
        let path = self.manifest.source_path(descriptor);
        let version = read_version(&path, &descriptor.key)?;

        if is_verbose() {
            match &version {
                Some(v) => println!(
                    "   {} {} = {} ({})",
                    "→".dimmed(),
                    descriptor.key,
                    v,
                    path.display()
                ),
                None => println!(
                    "   {} {} not declared in {}",
                    "→".dimmed(),
                    descriptor.key,
                    path.display()
                ),
            }
        }

        Ok(ExtractionResult {
            key: descriptor.key.clone(),
            version,
        })
    }
}

/// Reads `path` and looks up `key` in it.
pub fn read_version(path: &Path, key: &str) -> Result<Option<String>> {
    let content = fs::read_to_string(path).map_err(|e| SyncError::read(path, e))?;
    find_version(&content, key)
}

/// Returns the quoted fallback of the first `key: '{{ ... or "VERSION" }}'`
/// assignment in `content`. The key must open its line, optionally as a YAML
/// list item.
pub fn find_version(content: &str, key: &str) -> Result<Option<String>> {
    let pattern = format!(
        r#"(?m)^[ \t]*(?:-[ \t]+)?{}:\s*'\{{\{{.*?or\s*"([^"]+)"\s*\}}\}}'"#,
        regex::escape(key)
    );
    let regex = Regex::new(&pattern).map_err(|e| {
        SyncError::Pattern(format!("Failed to build matcher for key '{}': {}", key, e))
    })?;

    Ok(regex
        .captures(content)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn extracts_fallback_version() {
        let content = r#"---
cni_version: '{{ cni_version_override or "v1.5.0" }}'
cni_arch: amd64
"#;
        assert_eq!(
            find_version(content, "cni_version").unwrap(),
            Some("v1.5.0".to_string())
        );
    }

    #[test]
    fn tolerates_compact_spacing() {
        let content = r#"runc_version:'{{runc_override|default(None) or"v1.1.12"}}'"#;
        assert_eq!(
            find_version(content, "runc_version").unwrap(),
            Some("v1.1.12".to_string())
        );
    }

    #[test]
    fn missing_key_is_not_an_error() {
        let content = "k8s_service_release_version: '{{ override or \"v0.16.2\" }}'\n";
        assert_eq!(find_version(content, "k8s_release_version").unwrap(), None);
    }

    #[test]
    fn key_without_fallback_is_not_found() {
        let content = "kubectl_version: \"v1.30.0\"\n";
        assert_eq!(find_version(content, "kubectl_version").unwrap(), None);
    }

    #[test]
    fn key_must_match_exactly() {
        let content = "my_cni_version: '{{ x or \"v9.9.9\" }}'\n";
        assert_eq!(find_version(content, "cni_version").unwrap(), None);

        let content = "cni_versions: '{{ x or \"v9.9.9\" }}'\n";
        assert_eq!(find_version(content, "cni_version").unwrap(), None);
    }

    #[test]
    fn hyphen_prefixed_key_is_not_matched() {
        let content = r#"my-cni_version: '{{ x or "v9.9.9" }}'
cni_version: '{{ x or "v1.5.0" }}'
"#;
        assert_eq!(
            find_version(content, "cni_version").unwrap(),
            Some("v1.5.0".to_string())
        );

        let content = "legacy.cni_version: '{{ x or \"v0.1.0\" }}'\n";
        assert_eq!(find_version(content, "cni_version").unwrap(), None);
    }

    #[test]
    fn indented_and_list_item_keys_match() {
        let content = "defaults:\n  - cni_version: '{{ x or \"v1.5.0\" }}'\n";
        assert_eq!(
            find_version(content, "cni_version").unwrap(),
            Some("v1.5.0".to_string())
        );
    }

    #[test]
    fn first_assignment_wins() {
        let content = r#"
crictl_version: '{{ crictl_override or "v1.30.0" }}'
crictl_version: '{{ crictl_override or "v1.29.0" }}'
"#;
        assert_eq!(
            find_version(content, "crictl_version").unwrap(),
            Some("v1.30.0".to_string())
        );
    }

    #[test]
    fn non_greedy_stops_at_first_or() {
        let content = r#"containerd_version: '{{ a or b or "1.7.18" }}'"#;
        // `.*?or\s*"` cannot stop at `a or b` because `b` is not a quote
        assert_eq!(
            find_version(content, "containerd_version").unwrap(),
            Some("1.7.18".to_string())
        );
    }

    #[test]
    fn match_does_not_span_lines() {
        let content = "cni_version: '{{ cni_override\n or \"v1.5.0\" }}'\n";
        assert_eq!(find_version(content, "cni_version").unwrap(), None);
    }

    #[test]
    fn regex_metacharacters_in_key_are_literal() {
        let content = "a.b: '{{ x or \"1.0\" }}'\naxb: '{{ x or \"2.0\" }}'\n";
        assert_eq!(find_version(content, "a.b").unwrap(), Some("1.0".to_string()));
    }

    #[test]
    fn unreadable_file_is_a_file_access_error() {
        let dir = tempdir().unwrap();
        let err = read_version(&dir.path().join("missing.yml"), "cni_version").unwrap_err();
        assert!(matches!(err, SyncError::FileAccess { action: "read", .. }));
    }

    #[test]
    fn extract_all_fails_fast_on_missing_file() {
        let dir = tempdir().unwrap();
        let roles = dir.path().join("roles");
        fs::create_dir_all(roles.join("install-cni/defaults")).unwrap();
        fs::write(
            roles.join("install-cni/defaults/main.yml"),
            "cni_version: '{{ o or \"v1.5.0\" }}'\n",
        )
        .unwrap();

        let manifest = Manifest {
            roles_dir: roles,
            readme: dir.path().join("README.md"),
            dependencies: vec![
                DependencyDescriptor::new("cni_version", "install-cni/defaults/main.yml"),
                DependencyDescriptor::new("runc_version", "install-runc/defaults/main.yml"),
            ],
        };

        let extractor = VersionExtractor::new(&manifest);
        assert_eq!(
            extractor.extract(&manifest.dependencies[0]).unwrap().version,
            Some("v1.5.0".to_string())
        );
        assert!(extractor.extract_all().is_err());
    }
}
