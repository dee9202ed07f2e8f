//! fontshelf - manage installed fonts from the command line.
//!
//! Wraps the fontshelf library: installs, removes, and embeds fonts, and
//! runs the same synchronization pass the desktop application runs, against
//! a logging rendering environment.

mod terminal;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use fontshelf::{FontLoader, FontRepository, NewFont, RemoveOutcome, SyncReport, VariantKind};
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;
use terminal::{LogBusy, LoggingEnvironment, TerminalPrompt};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "fontshelf")]
#[command(about = "Install and embed fonts")]
struct Args {
    /// User font repository (defaults to the platform data directory)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Font repository of the open document
    #[arg(long)]
    document_dir: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Do not ask for confirmation
    #[arg(short, long)]
    yes: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List installed fonts
    List {
        #[arg(long)]
        json: bool,
    },
    /// Install a font from its variant files
    Install {
        #[arg(long)]
        name: String,
        #[arg(long)]
        regular: Option<PathBuf>,
        #[arg(long)]
        bold: Option<PathBuf>,
        #[arg(long)]
        italic: Option<PathBuf>,
        #[arg(long)]
        bold_italic: Option<PathBuf>,
    },
    /// Uninstall a font
    Remove { name: String },
    /// Copy user fonts into the document repository
    Embed {
        #[arg(required = true)]
        names: Vec<String>,
    },
    /// Register every installed face and report the result
    Sync,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Set up logging
    let log_level = if args.debug { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .init();

    let environment = Arc::new(LoggingEnvironment::default());
    let mut builder = FontLoader::builder(environment.clone())
        .prompt(Arc::new(TerminalPrompt {
            assume_yes: args.yes,
        }))
        .busy_indicator(Arc::new(LogBusy));
    if let Some(dir) = &args.data_dir {
        builder = builder.user_repo_dir(dir);
    }
    if let Some(dir) = &args.document_dir {
        builder = builder.document_repo_dir(dir);
    }
    let mut loader = builder.build()?;

    info!("User fonts: {}", loader.user_repo().dir_path().display());

    match args.command {
        Command::List { json } => {
            loader.load_repositories();
            if json {
                println!("{}", serde_json::to_string_pretty(&list_json(&loader))?);
            } else {
                print_repo(loader.user_repo());
                if let Some(document) = loader.document_repo() {
                    print_repo(document);
                }
            }
        }
        Command::Install {
            name,
            regular,
            bold,
            italic,
            bold_italic,
        } => {
            if loader.is_font_existing(&name) {
                bail!("Font '{}' is already installed", name);
            }
            let mut data = NewFont::new(&name);
            for (kind, path) in [
                (VariantKind::Regular, regular),
                (VariantKind::Bold, bold),
                (VariantKind::Italic, italic),
                (VariantKind::BoldItalic, bold_italic),
            ] {
                if let Some(path) = path {
                    data = data.with_variant(kind, path);
                }
            }
            let report = loader.install_new_font(&data).await;
            if !loader.is_font_existing(&name) {
                bail!("Font '{}' could not be installed", name);
            }
            print_report(&report);
        }
        Command::Remove { name } => match loader.remove_font(&name).await {
            RemoveOutcome::Cancelled => println!("Cancelled"),
            RemoveOutcome::Removed(report) => print_report(&report),
        },
        Command::Embed { names } => {
            if args.document_dir.is_none() {
                bail!("embed requires --document-dir");
            }
            let embedded = loader.embed_to_document_repo(names.as_slice()).await;
            println!("Embedded {} font(s)", embedded);
        }
        Command::Sync => {
            let report = loader.load_fonts().await;
            print_report(&report);
            for face in environment.faces() {
                println!("  {} ({} {})", face.family, face.weight, face.style);
            }
        }
    }

    Ok(())
}

fn print_repo(repo: &FontRepository) {
    println!("{} fonts ({}):", repo.repo_type(), repo.dir_path().display());
    for font in repo.fonts() {
        let styles: Vec<String> = font
            .variants
            .iter()
            .map(|v| format!("{}/{}", v.weight, v.style))
            .collect();
        println!("  {} [{}]", font.name, styles.join(", "));
    }
}

fn print_report(report: &SyncReport) {
    println!(
        "{} face(s) registered, {} failed, {} replaced",
        report.registered, report.failed, report.removed
    );
}

fn list_json(loader: &FontLoader) -> Value {
    json!({
        "user": loader.user_repo().fonts(),
        "document": loader.document_repo().map(|repo| repo.fonts()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_install() {
        let args = Args::parse_from([
            "fontshelf",
            "--data-dir",
            "/tmp/fonts",
            "install",
            "--name",
            "Acme Sans",
            "--regular",
            "a.ttf",
            "--bold-italic",
            "bi.ttf",
        ]);
        assert_eq!(args.data_dir, Some(PathBuf::from("/tmp/fonts")));
        match args.command {
            Command::Install {
                name,
                regular,
                bold,
                bold_italic,
                ..
            } => {
                assert_eq!(name, "Acme Sans");
                assert_eq!(regular, Some(PathBuf::from("a.ttf")));
                assert_eq!(bold, None);
                assert_eq!(bold_italic, Some(PathBuf::from("bi.ttf")));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_embed_requires_names() {
        assert!(Args::try_parse_from(["fontshelf", "embed"]).is_err());
    }

    #[tokio::test]
    async fn test_list_json_shape() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut loader = FontLoader::builder(Arc::new(LoggingEnvironment::default()))
            .user_repo_dir(dir.path())
            .build()
            .unwrap();
        loader.install_new_font(&NewFont::new("Empty")).await;
        loader.load_repositories();

        let value = list_json(&loader);
        assert_eq!(value["user"][0]["name"], "Empty");
        assert_eq!(value["user"][0]["location"], "Empty");
        assert!(value["document"].is_null());
    }
}
