//! CLI binary for lexfuse.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use lexfuse::{AppConfig, Fuzziness, SearchRequest};
use lexfuse_core::FieldMode;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// lexfuse: hybrid lexical + vector search with short LLM answers.
#[derive(Parser)]
#[command(name = "lexfuse", version, about)]
struct Cli {
    /// Path to TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Subcommand to run.
    #[command(subcommand)]
    command: Command,
}

/// Available commands.
#[derive(Subcommand)]
enum Command {
    /// Print the normalized form of a text.
    Normalize {
        text: String,
        /// Collapse whitespace only.
        #[arg(long)]
        light: bool,
    },

    /// Normalize, embed and store documents from a JSON Lines file.
    Index {
        file: PathBuf,
        /// Index at most this many documents.
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Answer a query and list matching documents.
    Search {
        query: String,
        /// Comma-separated fields for lexical matching.
        #[arg(long, value_delimiter = ',')]
        fields: Option<Vec<String>>,
        /// Comma-separated indices to query.
        #[arg(long, value_delimiter = ',')]
        indices: Option<Vec<String>>,
        /// `AUTO` or a maximum edit distance.
        #[arg(long)]
        fuzziness: Option<Fuzziness>,
        /// Number of documents to return.
        #[arg(short = 'n', long)]
        num: Option<usize>,
    },

    /// Write the default configuration file.
    InitConfig {
        /// Destination (defaults to the user config directory).
        path: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("lexfuse=info,lexfuse_core=info")),
        )
        .init();

    let cli = Cli::parse();

    if let Command::InitConfig { path } = &cli.command {
        let path = path.clone().unwrap_or_else(AppConfig::default_config_path);
        AppConfig::default().save_to_file(&path)?;
        println!("Wrote {}", path.display());
        return Ok(());
    }

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Normalize { text, light } => {
            let normalizer = lexfuse::build_normalizer(&config)?;
            let mode = if light { FieldMode::Light } else { FieldMode::Full };
            println!("{}", normalizer.normalize_field(Some(&text), mode));
        }
        Command::Index { file, limit } => {
            let documents = lexfuse::load_documents(&file, limit)?;
            let indexer = lexfuse::build_indexer(&config)?;
            let report = indexer.index_documents(&documents).await?;
            println!(
                "Indexed {} documents ({} dropped, {} writes)",
                report.indexed, report.dropped, report.writes
            );
        }
        Command::Search {
            query,
            fields,
            indices,
            fuzziness,
            num,
        } => {
            let mut request = SearchRequest::new(query, &config.search);
            if let Some(fields) = fields {
                request.fields = fields;
            }
            if let Some(indices) = indices {
                request.indices = indices;
            }
            if let Some(fuzziness) = fuzziness {
                request.fuzziness = fuzziness;
            }
            if let Some(num) = num {
                request.num_of_responses = num;
            }

            let searcher = lexfuse::build_searcher(&config)?;
            let outcome = searcher.search_for_display(&request).await?;
            if outcome.has_answer() {
                println!("Answer: {}", outcome.short_answer);
            } else {
                println!("Answer: no answer found");
            }
            for (rank, document) in outcome.documents.iter().enumerate() {
                println!("{:>2}. {}", rank + 1, document.url);
                if !document.display_text.is_empty() {
                    println!("    {}", document.display_text);
                }
            }
        }
        Command::InitConfig { .. } => {}
    }
    Ok(())
}

/// Load the config from `path`, else from the default location if it exists,
/// else fall back to defaults.
fn load_config(path: Option<&std::path::Path>) -> anyhow::Result<AppConfig> {
    if let Some(path) = path {
        return Ok(AppConfig::from_file(path)?);
    }
    let default_path = AppConfig::default_config_path();
    if default_path.exists() {
        info!(path = %default_path.display(), "using default config file");
        Ok(AppConfig::from_file(&default_path)?)
    } else {
        Ok(AppConfig::default())
    }
}
