// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::config::Overrides;

/// Command-line arguments for `catalog-gen`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "catalog-gen",
    version,
    about = "Generate Next.js catalog pages from *.catalog.{js,jsx,ts,tsx} files.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `catalog-gen.toml` in the project root, if it exists.
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `CATALOG_GEN_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL", global = true)]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Regenerate the catalog, optionally staying resident with `--watch`.
    Build(BuildArgs),

    /// Delete the output directory.
    Clean(RootArgs),

    /// Print the catalog path and the pages a build would generate.
    List(RootArgs),
}

/// Location flags shared by every subcommand.
#[derive(Debug, Clone, Default, Args)]
pub struct RootArgs {
    /// Project root. Default: the current working directory.
    #[arg(long, value_name = "PATH")]
    pub project_root: Option<PathBuf>,

    /// Directory searched for catalog files, relative to the project root.
    #[arg(long, value_name = "PATH", alias = "watchRoot")]
    pub watch_root: Option<String>,

    /// Output directory inside the App Router tree, relative to the project
    /// root.
    #[arg(long, value_name = "PATH", alias = "outputPath")]
    pub output_path: Option<String>,
}

#[derive(Debug, Clone, Args)]
pub struct BuildArgs {
    #[command(flatten)]
    pub roots: RootArgs,

    /// Component used for the index page (`./file.tsx` or a package import).
    #[arg(long, value_name = "PATH", alias = "indexComponentPath")]
    pub index_component_path: Option<String>,

    /// Only log warnings and errors.
    #[arg(long)]
    pub quiet: bool,

    /// Keep running and update the catalog on every change.
    #[arg(long)]
    pub watch: bool,
}

impl Command {
    pub fn roots(&self) -> &RootArgs {
        match self {
            Command::Build(args) => &args.roots,
            Command::Clean(roots) | Command::List(roots) => roots,
        }
    }

    pub fn quiet(&self) -> bool {
        matches!(self, Command::Build(args) if args.quiet)
    }

    pub fn overrides(&self) -> Overrides {
        let roots = self.roots();
        let index_component_path = match self {
            Command::Build(args) => args.index_component_path.clone(),
            _ => None,
        };
        Overrides {
            project_root: roots.project_root.clone(),
            watch_root: roots.watch_root.clone(),
            output_path: roots.output_path.clone(),
            index_component_path,
            quiet: self.quiet(),
        }
    }
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_accepts_camel_case_aliases() {
        let args = CliArgs::try_parse_from([
            "catalog-gen",
            "build",
            "--watchRoot",
            "lib",
            "--outputPath",
            "app/catalog",
            "--indexComponentPath",
            "./Index.tsx",
            "--watch",
        ])
        .unwrap();

        let ov = args.command.overrides();
        assert_eq!(ov.watch_root.as_deref(), Some("lib"));
        assert_eq!(ov.output_path.as_deref(), Some("app/catalog"));
        assert_eq!(ov.index_component_path.as_deref(), Some("./Index.tsx"));
        assert!(matches!(args.command, Command::Build(BuildArgs { watch: true, .. })));
    }

    #[test]
    fn global_flags_follow_the_subcommand() {
        let args =
            CliArgs::try_parse_from(["catalog-gen", "clean", "--log-level", "debug"]).unwrap();
        assert!(matches!(args.log_level, Some(LogLevel::Debug)));
        assert!(!args.command.quiet());
    }

    #[test]
    fn subcommand_is_required() {
        assert!(CliArgs::try_parse_from(["catalog-gen"]).is_err());
    }
}
