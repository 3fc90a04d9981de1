use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "readme-sync",
    about = "Sync the version tables of an Ansible README with the role defaults",
    version,
    author
)]
pub struct Cli {
    /// Path to the project directory (defaults to current directory)
    #[arg(short, long, default_value = ".", global = true)]
    pub path: String,

    /// Manifest file listing keys and role files (defaults to readme-sync.toml if present)
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// README to patch, relative to the project directory
    #[arg(long, value_name = "FILE", global = true)]
    pub readme: Option<PathBuf>,

    /// Directory holding the roles, relative to the project directory
    #[arg(long, value_name = "DIR", global = true)]
    pub roles_dir: Option<PathBuf>,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Defaults to `update` when omitted
    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// The subcommand to run; a bare invocation updates the README.
    pub fn resolved_command(&self) -> Commands {
        self.command.unwrap_or(Commands::Update)
    }

    /// Command line that applies what `check` reported, keeping the project
    /// and manifest options of this invocation.
    pub fn update_invocation(&self) -> String {
        let mut args = vec!["readme-sync".to_string()];
        if self.path != "." {
            args.push("-p".to_string());
            args.push(shell_quote(&self.path));
        }

        let options = [
            ("--config", &self.config),
            ("--readme", &self.readme),
            ("--roles-dir", &self.roles_dir),
        ];
        for (flag, value) in options {
            if let Some(value) = value {
                args.push(flag.to_string());
                args.push(shell_quote(&value.to_string_lossy()));
            }
        }

        args.push("update".to_string());
        args.join(" ")
    }
}

fn shell_quote(arg: &str) -> String {
    let plain = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '/' | '.' | '_' | '-' | ':' | '='));
    if plain {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', r"'\''"))
    }
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    /// Rewrite the README version cells from the role defaults
    Update,

    /// Report README cells that differ from the role defaults without writing
    Check,

    /// List every key with the version its role file declares
    List,
}
