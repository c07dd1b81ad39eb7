use crate::project::Project;
use anyhow::Result;
use clap::Args;
use colored::Colorize;

#[derive(Debug, Args)]
pub struct ServeArgs {
    /// HTTP port (overrides config)
    #[arg(short, long)]
    pub port: Option<u16>,
}

pub fn serve(args: ServeArgs, mut project: Project) -> Result<()> {
    if let Some(port) = args.port {
        project.config.http_port = port;
    }

    println!("{}", "🎨 Starting Pagesmith builder API...".bright_blue().bold());
    println!("   Storage: {}", project.storage_path().display());
    println!(
        "   Listening on {}",
        format!("http://{}", project.config.socket_addr()).cyan()
    );

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(pagesmith_workspace::serve(&project.config, &project.dir))
}
