use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Parser)]
#[command(name = "snapkeep")]
#[command(about = "Point-in-time snapshots of individual files")]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Workspace root (defaults to the current directory)
    #[arg(long, short = 'w', global = true)]
    pub workspace: Option<PathBuf>,

    /// Storage directory, relative to the workspace (default .snapkeep)
    #[arg(long, global = true)]
    pub storage_dir: Option<PathBuf>,

    /// Show debug logging on stderr
    #[arg(long, short = 'v', global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Capture the current content of a file
    Take(TakeArgs),

    /// List snapshots for one file, or for the whole workspace
    List(ListArgs),

    /// Print the content of a snapshot
    Show(ShowArgs),

    /// Compare a snapshot with the current file
    Diff(DiffArgs),

    /// Put a snapshot's content back into its original file
    Restore(RestoreArgs),

    /// Write a snapshot's content to a new file
    Export(ExportArgs),

    /// Delete a snapshot
    Delete(DeleteArgs),
}

#[derive(Parser)]
pub struct TakeArgs {
    /// File to capture
    pub file: PathBuf,

    /// Label for the snapshot
    #[arg(long, short = 'n')]
    pub name: String,
}

impl TakeArgs {
    /// The snapshot name with surrounding whitespace removed.
    pub fn snapshot_name(&self) -> Result<&str, EmptyName> {
        validate_snapshot_name(&self.name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("snapshot name cannot be empty")]
pub struct EmptyName;

/// Trim a user-supplied snapshot name; blank names are rejected.
pub fn validate_snapshot_name(name: &str) -> Result<&str, EmptyName> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        Err(EmptyName)
    } else {
        Ok(trimmed)
    }
}

#[derive(Parser)]
pub struct ListArgs {
    /// Only list snapshots of this file
    pub file: Option<PathBuf>,

    /// Only list snapshots taken within this window ("7d", "24h", "2w")
    #[arg(long, value_parser = humantime::parse_duration)]
    pub since: Option<std::time::Duration>,

    /// Output as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Parser)]
pub struct ShowArgs {
    /// Snapshot ID
    pub id: String,
}

#[derive(Parser)]
pub struct DiffArgs {
    /// Snapshot ID
    pub id: String,

    /// Print the snapshot content when the original file no longer exists
    #[arg(long, default_value_t = false)]
    pub show_missing: bool,

    /// Lines of context around each change (overrides config)
    #[arg(long)]
    pub context: Option<usize>,
}

#[derive(Parser)]
pub struct RestoreArgs {
    /// Snapshot ID
    pub id: String,

    /// Skip confirmation
    #[arg(long, short = 'y', default_value_t = false)]
    pub yes: bool,

    /// Restore even if the automatic backup snapshot fails
    #[arg(long, default_value_t = false)]
    pub force: bool,

    /// Do not take a backup snapshot of the current file first
    #[arg(long, default_value_t = false)]
    pub no_backup: bool,
}

#[derive(Parser)]
pub struct ExportArgs {
    /// Snapshot ID
    pub id: String,

    /// Destination file (defaults to <file>_<snapshot name>.<ext> in the current directory)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

#[derive(Parser)]
pub struct DeleteArgs {
    /// Snapshot ID
    pub id: String,

    /// Skip confirmation
    #[arg(long, short = 'y', default_value_t = false)]
    pub yes: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_take_with_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["snapkeep", "take", "a.txt", "--name", "v1", "-w", "/work"]);
        assert_eq!(cli.global.workspace, Some(PathBuf::from("/work")));
        match cli.command {
            Command::Take(args) => {
                assert_eq!(args.file, PathBuf::from("a.txt"));
                assert_eq!(args.name, "v1");
            }
            _ => panic!("expected take"),
        }
    }

    #[test]
    fn blank_snapshot_names_are_rejected() {
        assert_eq!(validate_snapshot_name(""), Err(EmptyName));
        assert_eq!(validate_snapshot_name("   "), Err(EmptyName));
        assert_eq!(validate_snapshot_name("\t\n"), Err(EmptyName));
    }

    #[test]
    fn snapshot_names_are_trimmed() {
        assert_eq!(validate_snapshot_name("  v1 "), Ok("v1"));
        assert_eq!(validate_snapshot_name("before refactor"), Ok("before refactor"));
    }

    #[test]
    fn take_args_expose_trimmed_name() {
        let cli = Cli::parse_from(["snapkeep", "take", "a.txt", "--name", "  v2  "]);
        match cli.command {
            Command::Take(args) => assert_eq!(args.snapshot_name(), Ok("v2")),
            _ => panic!("expected take"),
        }

        let cli = Cli::parse_from(["snapkeep", "take", "a.txt", "--name", "  "]);
        match cli.command {
            Command::Take(args) => assert!(args.snapshot_name().is_err()),
            _ => panic!("expected take"),
        }
    }

    #[test]
    fn parses_since_duration() {
        let cli = Cli::parse_from(["snapkeep", "list", "--since", "2d"]);
        match cli.command {
            Command::List(args) => {
                assert_eq!(args.since, Some(std::time::Duration::from_secs(2 * 86_400)));
                assert!(args.file.is_none());
            }
            _ => panic!("expected list"),
        }
    }

    #[test]
    fn rejects_bad_duration() {
        assert!(Cli::try_parse_from(["snapkeep", "list", "--since", "soon"]).is_err());
    }
}
