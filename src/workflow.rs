use crate::agents::{
    ExtractionResult, KeyOutcome, PatchReport, ProjectInfo, ProjectScannerAgent, ReadmePatcher,
    ReadmeWriter, VersionExtractor,
};
use crate::error::{Result, SyncError};
use crate::manifest::Manifest;
use crate::utils::is_verbose;
use colored::Colorize;
use std::fs;
use std::path::Path;

/// Patched README text and what changed, ready to be written.
struct SyncPlan {
    project_info: ProjectInfo,
    patched: String,
    report: PatchReport,
}

/// Runs the read-only part of the pipeline: validate, extract, patch in memory.
fn plan_sync(project_path: &Path, manifest: Manifest) -> Result<SyncPlan> {
    println!("\n{}", "1. Validating project structure...".yellow());
    let scanner = ProjectScannerAgent::new(project_path);
    let project_info = scanner.validate(manifest)?;
    println!("{}", "✓ Project structure is valid".green());
    if is_verbose() {
        println!("   Project root: {}", project_info.project_path.display());
    }

    println!("\n{}", "2. Reading role defaults...".yellow());
    let results = extract_versions(&project_info.manifest)?;
    let found = results.iter().filter(|r| r.version.is_some()).count();
    println!(
        "{}",
        format!("✓ Found {} of {} versions", found, results.len()).green()
    );

    println!("\n{}", "3. Patching README tables...".yellow());
    let readme_path = &project_info.manifest.readme;
    let original =
        fs::read_to_string(readme_path).map_err(|e| SyncError::read(readme_path, e))?;
    let (patched, report) = ReadmePatcher::new(original).patch_all(&results)?;
    println!("{}", "✓ README patched in memory".green());

    Ok(SyncPlan {
        project_info,
        patched,
        report,
    })
}

fn extract_versions(manifest: &Manifest) -> Result<Vec<ExtractionResult>> {
    VersionExtractor::new(manifest).extract_all()
}

/// Execute the update workflow: extract, patch and write the README
pub fn execute_update<P: AsRef<Path>>(project_path: P, manifest: Manifest) -> Result<PatchReport> {
    println!("{}", "Syncing README versions...".cyan().bold());

    let plan = plan_sync(project_path.as_ref(), manifest)?;

    println!("\n{}", "4. Writing README...".yellow());
    let readme_path = &plan.project_info.manifest.readme;
    ReadmeWriter::new(readme_path).write(&plan.patched)?;
    println!(
        "{}",
        format!("✓ Wrote {}", readme_path.display()).green()
    );

    print_report(&plan.report);

    println!(
        "\n{}",
        "✨ README updated with latest versions.".green().bold()
    );
    Ok(plan.report)
}

/// Execute the check workflow (dry-run). `update_hint` is the command line
/// suggested for applying the reported changes.
pub fn execute_check<P: AsRef<Path>>(
    project_path: P,
    manifest: Manifest,
    update_hint: &str,
) -> Result<()> {
    println!("{}", "Checking README versions...".cyan().bold());

    let plan = plan_sync(project_path.as_ref(), manifest)?;
    print_report(&plan.report);

    if plan.report.is_empty() {
        println!("\n{}", "✨ README is up to date!".green().bold());
        return Ok(());
    }

    println!("\n{}", "To apply these updates, run:".dimmed());
    println!("  {}", update_hint.cyan());
    Err(SyncError::OutOfDate(plan.report.total_updates()))
}

/// Execute the list workflow - display every key with its role default
pub fn execute_list<P: AsRef<Path>>(project_path: P, manifest: Manifest) -> Result<()> {
    println!("{}", "Listing role default versions...".cyan().bold());

    println!("\n{}", "1. Validating project structure...".yellow());
    let scanner = ProjectScannerAgent::new(project_path.as_ref());
    let project_info = scanner.validate(manifest)?;
    println!("{}", "✓ Project structure is valid".green());

    println!("\n{}", "2. Reading role defaults...".yellow());
    let manifest = &project_info.manifest;
    let results = extract_versions(manifest)?;

    println!("\n{}", "📦 Versions:".cyan().bold());
    for (descriptor, result) in manifest.dependencies.iter().zip(&results) {
        match &result.version {
            Some(version) => println!(
                "  {} {} {}",
                result.key.white().bold(),
                version.green(),
                descriptor.file.display().to_string().dimmed()
            ),
            None => println!(
                "  {} {} {}",
                result.key.white().bold(),
                "(not found)".yellow(),
                descriptor.file.display().to_string().dimmed()
            ),
        }
    }

    Ok(())
}

fn print_report(report: &PatchReport) {
    if report.is_empty() {
        println!("\n{}", "No README cells needed updating".yellow());
    } else {
        println!("\n{}", "Update Summary:".cyan().bold());
        println!(
            "{}",
            format!(
                "Total updates: {} key(s), {} cell(s)",
                report.total_updates(),
                report.total_cells()
            )
            .green()
        );
        for (key, outcome) in report.updated() {
            if let KeyOutcome::Updated {
                previous, version, ..
            } = outcome
            {
                println!(
                    "  • {} {} → {}",
                    key.white().bold(),
                    previous.join(", ").red(),
                    version.green()
                );
            }
        }
    }

    let missing: Vec<&str> = report
        .entries
        .iter()
        .filter(|(_, outcome)| matches!(outcome, KeyOutcome::NotInReadme { .. }))
        .map(|(key, _)| key.as_str())
        .collect();
    if !missing.is_empty() {
        println!(
            "{}",
            format!("   (no README row for: {})", missing.join(", ")).dimmed()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::DependencyDescriptor;
    use std::path::PathBuf;
    use tempfile::{TempDir, tempdir};

    const README: &str = "# Ansible roles

## Versions

| Variable | Default | Role |
|----------|---------|------|
| `cni_version` | `v1.4.0` | install-cni |
| `crictl_version` | `v1.2.0` | install-crictl |
| `k8s_release_version` | `v0.16.1` | install-kubeadm-kubelet |

## install-crictl

| `crictl_version` | `v1.2.0` | duplicate row |
";

    fn write_role(root: &Path, role: &str, body: &str) {
        let dir = root.join("ansible/roles").join(role).join("defaults");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("main.yml"), body).unwrap();
    }

    fn fixture() -> TempDir {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("ansible/roles")).unwrap();
        fs::write(root.join("ansible/README.md"), README).unwrap();

        write_role(
            root,
            "install-cni",
            "---\ncni_version: '{{ cni_version_override or \"v1.5.0\" }}'\n",
        );
        write_role(
            root,
            "install-crictl",
            "crictl_version: '{{ crictl_version_override or \"v1.30.0\" }}'\n",
        );
        // No k8s_release_version line on purpose.
        write_role(
            root,
            "install-kubeadm-kubelet",
            "k8s_service_release_version: '{{ svc_override or \"v0.16.2\" }}'\n",
        );
        dir
    }

    fn manifest() -> Manifest {
        Manifest {
            dependencies: vec![
                DependencyDescriptor::new("cni_version", "install-cni/defaults/main.yml"),
                DependencyDescriptor::new("crictl_version", "install-crictl/defaults/main.yml"),
                DependencyDescriptor::new(
                    "k8s_release_version",
                    "install-kubeadm-kubelet/defaults/main.yml",
                ),
                DependencyDescriptor::new(
                    "k8s_service_release_version",
                    "install-kubeadm-kubelet/defaults/main.yml",
                ),
            ],
            ..Manifest::default()
        }
    }

    fn readme(dir: &TempDir) -> String {
        fs::read_to_string(dir.path().join("ansible/README.md")).unwrap()
    }

    #[test]
    fn update_rewrites_matching_cells_only() {
        let dir = fixture();
        let report = execute_update(dir.path(), manifest()).unwrap();

        let expected = README
            .replace("`v1.4.0`", "`v1.5.0`")
            .replace("`v1.2.0`", "`v1.30.0`");
        assert_eq!(readme(&dir), expected);
        assert!(readme(&dir).contains("| `k8s_release_version` | `v0.16.1` |"));
        assert_eq!(report.total_updates(), 2);
        assert_eq!(report.total_cells(), 3);
    }

    #[test]
    fn update_is_idempotent() {
        let dir = fixture();
        execute_update(dir.path(), manifest()).unwrap();
        let first = readme(&dir);

        let report = execute_update(dir.path(), manifest()).unwrap();
        assert_eq!(readme(&dir), first);
        assert!(report.is_empty());
    }

    #[test]
    fn unreadable_role_file_aborts_before_writing() {
        let dir = fixture();
        let mut manifest = manifest();
        manifest.dependencies.push(DependencyDescriptor::new(
            "runc_version",
            "install-runc/defaults/main.yml",
        ));

        let err = execute_update(dir.path(), manifest).unwrap_err();
        assert!(matches!(err, SyncError::FileAccess { action: "read", .. }));
        assert_eq!(readme(&dir), README);
    }

    #[test]
    fn check_reports_stale_readme_without_writing() {
        let dir = fixture();
        let err = execute_check(dir.path(), manifest(), "readme-sync update").unwrap_err();
        assert!(matches!(err, SyncError::OutOfDate(2)));
        assert_eq!(readme(&dir), README);

        execute_update(dir.path(), manifest()).unwrap();
        assert!(execute_check(dir.path(), manifest(), "readme-sync update").is_ok());
    }

    #[test]
    fn list_does_not_touch_readme() {
        let dir = fixture();
        execute_list(dir.path(), manifest()).unwrap();
        assert_eq!(readme(&dir), README);
    }

    #[test]
    fn custom_readme_location_is_honoured() {
        let dir = fixture();
        fs::create_dir_all(dir.path().join("docs")).unwrap();
        fs::write(
            dir.path().join("docs/versions.md"),
            "| cni_version | `v1.0.0` |\n",
        )
        .unwrap();

        let manifest = Manifest {
            readme: PathBuf::from("docs/versions.md"),
            ..manifest()
        };
        execute_update(dir.path(), manifest).unwrap();

        assert_eq!(
            fs::read_to_string(dir.path().join("docs/versions.md")).unwrap(),
            "| cni_version | `v1.5.0` |\n"
        );
        assert_eq!(readme(&dir), README);
    }
}
