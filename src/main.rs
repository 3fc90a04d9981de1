mod agents;
mod cli;
mod error;
mod manifest;
mod utils;
mod workflow;

use clap::Parser;
use cli::{Cli, Commands};
use colored::Colorize;
use manifest::ManifestLoader;
use std::process;

fn main() {
    let cli = Cli::parse();

    if cli.verbose {
        unsafe {
            std::env::set_var(utils::VERBOSE_ENV, "1");
        }
    }

    let command = cli.resolved_command();
    let update_hint = cli.update_invocation();

    let loader = ManifestLoader::new(&cli.path)
        .with_config(cli.config)
        .with_readme(cli.readme)
        .with_roles_dir(cli.roles_dir);

    let result = loader.load().and_then(|manifest| {
        match command {
            Commands::Update => workflow::execute_update(&cli.path, manifest).map(|_| ()),
            Commands::Check => workflow::execute_check(&cli.path, manifest, &update_hint),
            Commands::List => workflow::execute_list(&cli.path, manifest),
        }
    });

    if let Err(e) = result {
        eprintln!("{} {}", "Error:".red().bold(), e);
        process::exit(1);
    }
}
