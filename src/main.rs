use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use schema_studio::client::{ConsoleApi, HttpConsoleApi};
use schema_studio::config::{Config, ENV_API_URL};
use schema_studio::draft::TableDraft;
use schema_studio::graph::SchemaGraph;
use schema_studio::outline::OutlineRenderer;
use schema_studio::surface::{SchemaView, TableAuthoring, TableDeletion};
use schema_studio::theme::{EditorTheme, ThemeSignal};

/// Author tables and inspect table relationships of a console project.
#[derive(Parser)]
#[clap(name = "schema-studio", version)]
struct Cli {
    /// Project the command operates on
    #[clap(short, long, global = true)]
    project: Option<String>,

    /// Base URL of the console API
    #[clap(long, global = true, env = ENV_API_URL)]
    api_url: Option<String>,

    /// TOML config file
    #[clap(short, long, global = true)]
    config: Option<PathBuf>,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create a table from a JSON draft
    CreateTable {
        draft: PathBuf,
        /// Print the request body instead of sending it
        #[clap(long)]
        dry_run: bool,
    },
    /// Show the project's relationship graph
    Graph {
        /// Read a schema description from a file instead of the API
        #[clap(short, long)]
        file: Option<PathBuf>,
        /// Print the graph as JSON
        #[clap(long)]
        json: bool,
    },
    /// Delete a table; --confirm must repeat the exact table name
    DropTable {
        table: String,
        #[clap(long)]
        confirm: String,
    },
    /// List the project's tables
    Tables,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_tracing();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(url) = cli.api_url {
        config.api_url = url;
    }
    if let Some(project) = cli.project {
        config.project = Some(project);
    }
    let theme = ThemeSignal::from(&config);
    tracing::debug!(
        mode = ?theme.current(),
        editor = EditorTheme::for_mode(theme.current()).name(),
        "presentation mode"
    );
    let api = Arc::new(HttpConsoleApi::new(&config));

    match cli.command {
        Command::CreateTable { draft, dry_run } => {
            let input = fs::read_to_string(&draft)
                .with_context(|| format!("Failed to read {}", draft.display()))?;
            let draft: TableDraft = serde_json::from_str(&input)
                .with_context(|| format!("Invalid draft {}", draft.display()))?;

            if dry_run {
                let request = draft.build_create_table_request()?;
                println!("{}", serde_json::to_string_pretty(&request)?);
                return Ok(());
            }

            let mut surface = TableAuthoring::new(api, project(&config)?);
            *surface.draft_mut() = draft;
            let message = surface.submit().await?;
            println!("{message}");
            for table in surface.tables() {
                println!("  {table}");
            }
        }
        Command::Graph { file, json } => {
            let graph = match file {
                Some(path) => {
                    let input = fs::read_to_string(&path)
                        .with_context(|| format!("Failed to read {}", path.display()))?;
                    SchemaGraph::from_json_str(&input)?
                }
                None => {
                    let mut view = SchemaView::new(api, project(&config)?);
                    let graph = view.load().await?.clone();
                    graph
                }
            };

            for dangling in graph.dangling_edges() {
                tracing::warn!(edge = %dangling.edge_id, end = ?dangling.end, "unresolved edge");
            }

            if json {
                println!("{}", serde_json::to_string_pretty(&graph)?);
            } else {
                print!("{}", OutlineRenderer::default().render(&graph));
            }
        }
        Command::DropTable { table, confirm } => {
            let mut dialog = TableDeletion::new(api, project(&config)?, table);
            dialog.type_name(confirm);
            println!("{}", dialog.delete().await?);
        }
        Command::Tables => {
            for table in api.list_tables(&project(&config)?).await? {
                println!("{table}");
            }
        }
    }

    Ok(())
}

fn project(config: &Config) -> Result<String> {
    config
        .project
        .clone()
        .context("No project ID found. Pass --project or set it in the config file.")
}

fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into()))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_api_url_reads_environment() {
        let cli = Cli::command();
        let arg = cli
            .get_arguments()
            .find(|a| a.get_id() == "api_url")
            .unwrap();
        assert_eq!(arg.get_env(), Some(std::ffi::OsStr::new(ENV_API_URL)));
    }

    #[test]
    fn test_api_url_flag() {
        let cli = Cli::try_parse_from([
            "schema-studio",
            "tables",
            "--api-url",
            "http://staging:5000",
        ])
        .unwrap();
        assert_eq!(cli.api_url.as_deref(), Some("http://staging:5000"));
    }
}
