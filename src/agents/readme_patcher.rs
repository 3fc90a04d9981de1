use crate::agents::version_extractor::ExtractionResult;
use crate::error::{Result, SyncError};
use crate::utils::is_verbose;
use colored::Colorize;
use regex::{Captures, Regex};

/// Outcome of patching one key into the README.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyOutcome {
    /// At least one cell held a different version and was rewritten.
    Updated {
        previous: Vec<String>,
        version: String,
        cells: usize,
    },
    /// Every cell already shows the extracted version.
    Current { version: String, cells: usize },
    /// The README has no table cell for the key.
    NotInReadme { version: String },
    /// The role file declares no fallback version for the key.
    Skipped,
}

#[derive(Debug, Clone, Default)]
pub struct PatchReport {
    pub entries: Vec<(String, KeyOutcome)>,
}

impl PatchReport {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&mut self, key: &str, outcome: KeyOutcome) {
        self.entries.push((key.to_string(), outcome));
    }

    pub fn updated(&self) -> impl Iterator<Item = (&str, &KeyOutcome)> {
        self.entries
            .iter()
            .filter(|(_, outcome)| matches!(outcome, KeyOutcome::Updated { .. }))
            .map(|(key, outcome)| (key.as_str(), outcome))
    }

    /// True when no README cell changed.
    pub fn is_empty(&self) -> bool {
        self.updated().next().is_none()
    }

    /// Number of keys whose cells were rewritten.
    pub fn total_updates(&self) -> usize {
        self.updated().count()
    }

    pub fn total_cells(&self) -> usize {
        self.updated()
            .map(|(_, outcome)| match outcome {
                KeyOutcome::Updated { cells, .. } => *cells,
                _ => 0,
            })
            .sum()
    }
}

/// Rewrites the version cell next to each key in the README tables, e.g.
/// ``| `cni_version` | `v1.4.0` |`` becomes ``| `cni_version` | `v1.5.0` |``.
///
/// Everything outside the matched code spans is left byte for byte.
pub struct ReadmePatcher {
    content: String,
}

impl ReadmePatcher {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }

    /// Applies all extracted versions and returns the patched text with a report.
    pub fn patch_all(mut self, results: &[ExtractionResult]) -> Result<(String, PatchReport)> {
        let mut report = PatchReport::new();

        for result in results {
            let outcome = match &result.version {
                Some(version) => self.apply(&result.key, version)?,
                None => KeyOutcome::Skipped,
            };

            if is_verbose() {
                print_outcome(&result.key, &outcome);
            }
            report.record(&result.key, outcome);
        }

        Ok((self.content, report))
    }

    /// Replaces every version cell of `key` with `version`.
    pub fn apply(&mut self, key: &str, version: &str) -> Result<KeyOutcome> {
        let regex = cell_matcher(key)?;

        let mut cells = 0;
        let mut previous: Vec<String> = Vec::new();
        for caps in regex.captures_iter(&self.content) {
            cells += 1;
            let old = caps[2].trim_matches('`').to_string();
            if old != version && !previous.contains(&old) {
                previous.push(old);
            }
        }

        if cells == 0 {
            return Ok(KeyOutcome::NotInReadme {
                version: version.to_string(),
            });
        }

        if previous.is_empty() {
            return Ok(KeyOutcome::Current {
                version: version.to_string(),
                cells,
            });
        }

        let replaced = regex.replace_all(&self.content, |caps: &Captures| {
            format!("{}`{}`", &caps[1], version)
        });
        self.content = replaced.into_owned();

        Ok(KeyOutcome::Updated {
            previous,
            version: version.to_string(),
            cells,
        })
    }
}

/// Line start, pipe or whitespace, then optional backtick, key, optional
/// backtick, `|` and the version code span. The leading byte stays in group 1.
fn cell_matcher(key: &str) -> Result<Regex> {
    let pattern = format!(r"(?m)((?:^|[|\s])`?{}`?\s*\|\s*)(`[^`]+`)", regex::escape(key));
    Regex::new(&pattern).map_err(|e| {
        SyncError::Pattern(format!("Failed to build README matcher for '{}': {}", key, e))
    })
}

fn print_outcome(key: &str, outcome: &KeyOutcome) {
    match outcome {
        KeyOutcome::Updated { version, cells, .. } => {
            println!("   {} {} → {} ({} cell(s))", "→".dimmed(), key, version, cells)
        }
        KeyOutcome::Current { version, cells } => println!(
            "   {} {} already {} ({} cell(s))",
            "→".dimmed(),
            key,
            version,
            cells
        ),
        KeyOutcome::NotInReadme { version } => println!(
            "   {} {} {} has no row in README",
            "→".dimmed(),
            key,
            version
        ),
        KeyOutcome::Skipped => println!("   {} {} skipped", "→".dimmed(), key),
    }
}
