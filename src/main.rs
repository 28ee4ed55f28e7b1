//! CLI entry point for quill

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "quill")]
#[command(version)]
#[command(about = "A static blog generator for front-matter Markdown posts", long_about = None)]
struct Cli {
    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the site
    #[command(alias = "b")]
    Build {
        /// Source directory
        #[arg(short, long, default_value = ".")]
        source: PathBuf,

        /// Output directory
        #[arg(short, long, default_value = "public")]
        output: PathBuf,

        /// Documents per listing page (overrides _config.yml)
        #[arg(long)]
        page_size: Option<usize>,
    },

    /// List site content
    List {
        /// Source directory
        #[arg(short, long, default_value = ".")]
        source: PathBuf,

        /// Type of content to list (post, tag)
        #[arg(default_value = "post")]
        r#type: String,
    },

    /// Remove the output directory
    Clean {
        /// Output directory
        #[arg(short, long, default_value = "public")]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.debug {
        "quill=debug,info"
    } else {
        "quill=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Commands::Build {
            source,
            output,
            page_size,
        } => {
            let site = quill::Site::new(&source, &output, page_size)?;
            let summary = site.build()?;
            println!(
                "Built {} document(s), wrote {} page(s)",
                summary.documents, summary.pages_written
            );
            if !summary.report.is_empty() {
                println!("{} issue(s) reported, see log above", summary.report.len());
            }
        }

        Commands::List { source, r#type } => {
            let site = quill::Site::new(&source, PathBuf::from("public"), None)?;
            quill::commands::list::run(&site, &r#type)?;
        }

        Commands::Clean { output } => {
            let site = quill::Site::new(".", &output, None)?;
            site.clean()?;
            println!("Cleaned {:?}", site.output_dir);
        }
    }

    Ok(())
}
