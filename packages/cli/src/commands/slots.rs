use crate::project::Project;
use anyhow::Result;
use chrono::{DateTime, Local};
use clap::Args;
use colored::Colorize;
use pagesmith_compiler::Snapshot;
use pagesmith_workspace::Namespace;

#[derive(Debug, Args)]
pub struct SlotsArgs {
    /// Namespace to list (pages, elements)
    #[arg(short, long, default_value = "pages")]
    pub namespace: Namespace,
}

pub fn list_slots(args: SlotsArgs, project: &Project) -> Result<()> {
    let store = project.store();
    let slots = store.list_slots(args.namespace)?;

    if slots.is_empty() {
        println!("{}", format!("No {} yet", args.namespace.dir_name()).yellow());
        return Ok(());
    }

    for name in slots {
        let slot = store.slot(&name)?;
        let marker = if store.slot_path(&slot).exists() {
            "✓".green()
        } else {
            "•".dimmed()
        };
        println!("  {} {}", marker, name);
    }
    Ok(())
}

/// Print a slot's stored block tree as JSON
pub fn show(slot: &str, project: &Project) -> Result<()> {
    let store = project.store();
    let slot = store.slot(slot)?;
    let doc = store.load(&slot)?;
    println!("{}", serde_json::to_string_pretty(&Snapshot::from_document(&doc))?);
    Ok(())
}

pub fn delete(slot: &str, project: &Project) -> Result<()> {
    let store = project.store();
    let slot = store.slot(slot)?;
    store.delete(&slot)?;
    println!("{} Deleted {} (backups kept)", "✓".green(), slot);
    Ok(())
}

pub fn backups(slot: &str, project: &Project) -> Result<()> {
    let store = project.store();
    let slot = store.slot(slot)?;
    let backups = store.backups(&slot)?;

    if backups.is_empty() {
        println!("{}", format!("No backups of {}", slot).yellow());
        return Ok(());
    }

    for backup in backups {
        let modified: DateTime<Local> = backup.modified.into();
        println!(
            "  {} {}",
            modified.format("%Y-%m-%d %H:%M:%S").to_string().dimmed(),
            backup.name
        );
    }
    Ok(())
}
