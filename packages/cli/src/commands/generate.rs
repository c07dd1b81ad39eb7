use crate::project::Project;
use anyhow::Result;
use clap::Args;
use colored::Colorize;

#[derive(Debug, Args)]
pub struct SlotArgs {
    /// Slot name (header, footer, or a page)
    pub slot: String,
}

#[derive(Debug, Args)]
pub struct GenerateArgs {
    /// Slot name (header, footer, or a page)
    pub slot: String,

    /// Print the executable source instead of the structural dump
    #[arg(long)]
    pub persisted: bool,
}

/// Regenerate a slot's source from its stored blocks and print it
pub fn generate(args: GenerateArgs, project: &Project) -> Result<()> {
    let store = project.store();
    let slot = store.slot(&args.slot)?;
    let doc = store.load(&slot)?;

    let code = if args.persisted {
        store.generate_persisted(&slot, &doc)?
    } else {
        store.generate_preview(&doc)?
    };
    print!("{}", code);
    Ok(())
}

pub fn reset(args: SlotArgs, project: &Project) -> Result<()> {
    let store = project.store();
    let slot = store.slot(&args.slot)?;
    let (_, receipt) = store.reset(&slot)?;

    println!(
        "{} Reset {} ({} bytes{})",
        "✓".green(),
        slot,
        receipt.bytes_written,
        if receipt.backup_created {
            ", previous version backed up"
        } else {
            ""
        }
    );
    Ok(())
}
