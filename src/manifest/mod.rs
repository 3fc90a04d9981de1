pub mod descriptor;
pub mod loader;

pub use descriptor::{DependencyDescriptor, Manifest};
pub use loader::ManifestLoader;
