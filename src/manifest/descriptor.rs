use std::path::{Path, PathBuf};

pub const DEFAULT_ROLES_DIR: &str = "ansible/roles";
pub const DEFAULT_README: &str = "ansible/README.md";

/// Built-in key → role defaults file mapping.
const DEFAULT_DEPENDENCIES: &[(&str, &str)] = &[
    ("cni_version", "install-cni/defaults/main.yml"),
    ("containerd_version", "install-containerd/defaults/main.yml"),
    ("crictl_version", "install-crictl/defaults/main.yml"),
    ("runc_version", "install-runc/defaults/main.yml"),
    (
        "k8s_release_version",
        "install-kubeadm-kubelet/defaults/main.yml",
    ),
    (
        "k8s_service_release_version",
        "install-kubeadm-kubelet/defaults/main.yml",
    ),
    ("kubectl_version", "install-kubectl/defaults/main.yml"),
];

/// A version key and the role file expected to declare its default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyDescriptor {
    pub key: String,
    /// Path relative to the roles directory
    pub file: PathBuf,
}

impl DependencyDescriptor {
    pub fn new(key: impl Into<String>, file: impl Into<PathBuf>) -> Self {
        Self {
            key: key.into(),
            file: file.into(),
        }
    }
}

/// Everything a sync run needs to know, fixed before the pipeline starts.
///
/// `roles_dir` and `readme` are relative to the project root until
/// [`Manifest::resolve`] anchors them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    pub roles_dir: PathBuf,
    pub readme: PathBuf,
    pub dependencies: Vec<DependencyDescriptor>,
}

impl Default for Manifest {
    fn default() -> Self {
        Self {
            roles_dir: PathBuf::from(DEFAULT_ROLES_DIR),
            readme: PathBuf::from(DEFAULT_README),
            dependencies: DEFAULT_DEPENDENCIES
                .iter()
                .map(|(key, file)| DependencyDescriptor::new(*key, *file))
                .collect(),
        }
    }
}

impl Manifest {
    /// Anchors the relative roles directory and README path at `project_root`.
    pub fn resolve(mut self, project_root: &Path) -> Self {
        self.roles_dir = project_root.join(&self.roles_dir);
        self.readme = project_root.join(&self.readme);
        self
    }

    /// Full path of the role file backing `descriptor`.
    pub fn source_path(&self, descriptor: &DependencyDescriptor) -> PathBuf {
        self.roles_dir.join(&descriptor.file)
    }
}
