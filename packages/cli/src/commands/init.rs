use crate::project::Project;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use pagesmith_workspace::DEFAULT_CONFIG_NAME;

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Site title used by the default header and footer
    #[arg(short, long)]
    pub title: Option<String>,

    /// Force overwrite existing config
    #[arg(short, long)]
    pub force: bool,
}

pub fn init(args: InitArgs, mut project: Project) -> Result<()> {
    let config_path = project.dir.join(DEFAULT_CONFIG_NAME);

    if config_path.exists() && !args.force {
        println!(
            "{} {} already exists",
            "⚠️".yellow(),
            DEFAULT_CONFIG_NAME.bright_white()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    println!("{}", "📝 Initializing Pagesmith project...".bright_blue().bold());

    if let Some(title) = args.title {
        project.config.site_title = title;
    }
    project.config.save(&project.dir)?;
    println!("  {} Created {}", "✓".green(), DEFAULT_CONFIG_NAME);

    let store = project.store();
    store.init()?;
    println!("  {} Created {}/", "✓".green(), project.config.storage_dir);

    // Seed the fixed elements and a home page, leaving existing slots alone
    for name in ["header", "footer", "home"] {
        let slot = store.slot(name)?;
        if store.slot_path(&slot).exists() {
            println!("  {} Kept existing {}", "•".dimmed(), name);
            continue;
        }
        store.reset(&slot)?;
        println!("  {} Created {}", "✓".green(), slot.file_name());
    }

    println!();
    println!("{}", "✅ Project initialized!".green().bold());
    println!();
    println!("Next steps:");
    println!("  1. Run: pagesmith serve");
    println!("  2. Open the builder and edit the home page");
    println!("  3. Check output in {}/pages/", project.config.storage_dir);

    Ok(())
}
