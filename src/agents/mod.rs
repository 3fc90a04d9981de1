pub mod project_scanner;
pub mod readme_patcher;
pub mod readme_writer;
pub mod version_extractor;

pub use project_scanner::{ProjectInfo, ProjectScannerAgent};
pub use readme_patcher::{KeyOutcome, PatchReport, ReadmePatcher};
pub use readme_writer::ReadmeWriter;
pub use version_extractor::{ExtractionResult, VersionExtractor};
