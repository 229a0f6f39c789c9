use std::io::Write;
use std::path::Path;

use anyhow::{bail, Context};
use clap::Parser;
use snapkeep::actions::{self, ActionError, RestoreOptions};
use snapkeep::cli::{
    Cli, Command, DeleteArgs, DiffArgs, ExportArgs, ListArgs, RestoreArgs, TakeArgs,
};
use snapkeep::config::Config;
use snapkeep::store::{BlobCleanup, SnapshotId, SnapshotStore};
use snapkeep::{logging, platform, report, util, workspace};

fn take(store: &SnapshotStore, args: &TakeArgs) -> anyhow::Result<()> {
    let name = args.snapshot_name()?;

    let path = platform::absolute_file_path(&args.file)
        .with_context(|| format!("could not resolve {}", args.file.display()))?;
    let id = store
        .create(&path, name)
        .with_context(|| format!("failed to create snapshot of {}", path.display()))?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    println!("Snapshot \"{name}\" created for {file_name} ({id})");
    Ok(())
}

fn list(store: &SnapshotStore, args: &ListArgs) -> anyhow::Result<()> {
    let mut snapshots = match &args.file {
        Some(file) => {
            let path = platform::absolute_file_path(file)
                .with_context(|| format!("could not resolve {}", file.display()))?;
            store.list_by_file(&path)?
        }
        None => store.list_all()?,
    };

    if let Some(window) = args.since {
        snapshots = report::within(snapshots, window, chrono::Utc::now().timestamp_millis());
    }

    report::print(&snapshots, args.json).context("failed to render snapshot list")?;
    Ok(())
}

fn show(store: &SnapshotStore, id: &SnapshotId) -> anyhow::Result<()> {
    let content = store.read_content(id)?;
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(&content)?;
    stdout.flush()?;
    Ok(())
}

fn diff(store: &SnapshotStore, config: &Config, args: &DiffArgs) -> anyhow::Result<()> {
    let id = SnapshotId::from(args.id.as_str());
    let context = args.context.unwrap_or(config.diff_context);

    match actions::diff_with_current(store, &id, context) {
        Ok(comparison) => {
            if comparison.diff.is_unchanged() {
                println!(
                    "No differences between snapshot \"{}\" and {}.",
                    comparison.snapshot.name,
                    comparison.snapshot.file_name()
                );
            } else {
                print!("{}", comparison.diff.unified);
                println!(
                    "\n{} line(s) added, {} line(s) removed since \"{}\"",
                    comparison.diff.added, comparison.diff.removed, comparison.snapshot.name
                );
            }
            Ok(())
        }
        Err(ActionError::OriginalMissing { path }) if args.show_missing => {
            eprintln!("{} no longer exists, showing snapshot content", path.display());
            show(store, &id)
        }
        Err(ActionError::OriginalMissing { path }) => {
            bail!(
                "original file {} no longer exists (use --show-missing to print the snapshot)",
                path.display()
            )
        }
        Err(e) => Err(e.into()),
    }
}

fn restore(store: &SnapshotStore, config: &Config, args: &RestoreArgs) -> anyhow::Result<()> {
    let id = SnapshotId::from(args.id.as_str());
    let snapshot = store.get(&id)?;
    let file_name = snapshot.file_name();

    if !args.yes {
        let prompt = if Path::new(&snapshot.original_file_path).exists() {
            format!(
                "Restore \"{file_name}\" to snapshot \"{}\"? This replaces the current content.",
                snapshot.name
            )
        } else {
            format!(
                "Original file \"{file_name}\" no longer exists. Create it from snapshot \"{}\"?",
                snapshot.name
            )
        };
        if !util::confirm(&prompt)? {
            println!("Restore cancelled.");
            return Ok(());
        }
    }

    let options = RestoreOptions {
        backup: config.backup_before_restore && !args.no_backup,
        force: args.force,
    };
    let outcome = actions::restore(store, &id, options)?;

    if outcome.recreated {
        println!("File \"{file_name}\" created from snapshot \"{}\"", snapshot.name);
    } else {
        println!("Restored \"{file_name}\" to snapshot \"{}\"", snapshot.name);
        if let Some(backup) = outcome.backup {
            println!("Backup snapshot: {backup}");
        }
    }
    Ok(())
}

fn export(store: &SnapshotStore, args: &ExportArgs) -> anyhow::Result<()> {
    let id = SnapshotId::from(args.id.as_str());
    let written = actions::export(store, &id, args.output.as_deref())?;
    println!("Snapshot {id} exported to {}", written.display());
    Ok(())
}

fn delete(store: &SnapshotStore, args: &DeleteArgs) -> anyhow::Result<()> {
    let id = SnapshotId::from(args.id.as_str());
    let snapshot = store.get(&id)?;

    if !args.yes {
        let prompt = format!(
            "Delete snapshot \"{}\" of \"{}\"? This cannot be undone.",
            snapshot.name,
            snapshot.file_name()
        );
        if !util::confirm(&prompt)? {
            println!("Delete cancelled.");
            return Ok(());
        }
    }

    match store.delete(&id)? {
        BlobCleanup::Removed | BlobCleanup::AlreadyMissing => {}
        BlobCleanup::Failed(reason) => {
            eprintln!(
                "warning: content file {} could not be removed: {reason}",
                snapshot.content_storage_path.display()
            );
        }
    }

    println!("Snapshot \"{}\" deleted.", snapshot.name);
    Ok(())
}

fn dispatch(store: &SnapshotStore, config: &Config, command: &Command) -> anyhow::Result<()> {
    match command {
        Command::Take(args) => take(store, args),
        Command::List(args) => list(store, args),
        Command::Show(args) => show(store, &SnapshotId::from(args.id.as_str())),
        Command::Diff(args) => diff(store, config, args),
        Command::Restore(args) => restore(store, config, args),
        Command::Export(args) => export(store, args),
        Command::Delete(args) => delete(store, args),
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = Config::from_args(&cli.global).context("failed to load configuration")?;
    let mut store = workspace::open_store(&config).context("failed to open snapshot storage")?;

    let result = dispatch(&store, &config, &cli.command);
    store.teardown();
    result
}

fn main() {
    let cli = Cli::parse();
    logging::init_logging(cli.global.verbose);

    if let Err(e) = run(&cli) {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
