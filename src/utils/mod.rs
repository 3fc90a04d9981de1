pub mod path_validator;

pub use path_validator::PathValidator;

/// Environment variable set by `--verbose`.
pub const VERBOSE_ENV: &str = "README_SYNC_VERBOSE";

pub fn is_verbose() -> bool {
    std::env::var(VERBOSE_ENV).is_ok()
}
