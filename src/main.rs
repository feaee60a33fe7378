use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use tracing::info;

use lexsim::config::Config;
use lexsim::dataset::{self, FailurePolicy};
use lexsim::neighbors::build_source;
use lexsim::output::terminal;
use lexsim::results::ResultTable;
use lexsim::similarity::pipeline::{PairKind, SimilarityPipeline};

/// lexsim: word and sentence similarity from lexical neighborhoods.
///
/// Scores pairs by the overlap of their related-word sets and correlates
/// those scores with human similarity judgments.
#[derive(Parser)]
#[command(name = "lexsim", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Similarity of two words (overlap of their neighbor sets)
    Words {
        first: String,
        second: String,

        /// Neighbors fetched per word (default: LEXSIM_WORD_LIMIT or 100)
        #[arg(long)]
        limit: Option<u32>,
    },

    /// Similarity of two sentences (overlap of their bags of words)
    Sentences {
        first: String,
        second: String,

        /// Neighbors fetched per token (default: LEXSIM_SENTENCE_LIMIT or 200)
        #[arg(long)]
        limit: Option<u32>,

        /// Also print bag sizes and the shared words
        #[arg(long)]
        show_bags: bool,
    },

    /// Score a labeled dataset and correlate against its reference scores
    Dataset {
        /// CSV (or .tsv) file: first, second, score columns with a header row
        path: PathBuf,

        /// Name to store the result under
        #[arg(long)]
        name: String,

        /// Whether the pairs are words or sentences
        #[arg(long, value_enum, default_value = "words")]
        kind: KindArg,

        /// Neighbor limit for this run (overrides the configured one for the chosen kind)
        #[arg(long)]
        limit: Option<u32>,

        /// Pairs scored in parallel (default: LEXSIM_CONCURRENCY or 4)
        #[arg(long)]
        concurrency: Option<usize>,

        /// Skip pairs whose lookups fail instead of aborting the run
        #[arg(long)]
        skip_failures: bool,

        /// Record the result in the result table
        #[arg(long)]
        save: bool,
    },

    /// Show the stored per-dataset correlation results
    Results {
        /// Result table to show (default: LEXSIM_RESULTS_PATH or data/results.json)
        #[arg(long)]
        path: Option<PathBuf>,
    },

    /// Print the neighbor set of a single term
    Neighbors {
        term: String,

        /// Neighbors to fetch (default: LEXSIM_WORD_LIMIT or 100)
        #[arg(long)]
        limit: Option<u32>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
    Words,
    Sentences,
}

impl From<KindArg> for PairKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Words => PairKind::Words,
            KindArg::Sentences => PairKind::Sentences,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("lexsim=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli.command).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("{} {:#}", "error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

/// Run one command. `Ok(false)` means a scoring failure was already shown.
async fn run(command: Commands) -> Result<bool> {
    let mut config = Config::load()?;

    match command {
        Commands::Words {
            first,
            second,
            limit,
        } => {
            if let Some(limit) = limit {
                config.word_limit = limit;
            }
            config.validate()?;
            let pipeline = SimilarityPipeline::new(build_source(&config)?, config.limits());

            match pipeline.word_similarity(&first, &second).await {
                Ok(score) => {
                    terminal::display_similarity(PairKind::Words, &first, &second, score);
                    Ok(true)
                }
                Err(e) => {
                    terminal::display_error("word similarity", &e);
                    Ok(false)
                }
            }
        }

        Commands::Sentences {
            first,
            second,
            limit,
            show_bags,
        } => {
            if let Some(limit) = limit {
                config.sentence_limit = limit;
            }
            config.validate()?;
            let pipeline = SimilarityPipeline::new(build_source(&config)?, config.limits());

            info!(first = first.as_str(), second = second.as_str(), "Scoring sentences");

            match pipeline.sentence_bags(&first, &second).await {
                Ok((bag_a, bag_b)) => {
                    let score = lexsim::similarity::jaccard::jaccard_similarity(&bag_a, &bag_b);
                    terminal::display_similarity(PairKind::Sentences, &first, &second, score);
                    if show_bags {
                        terminal::display_bags(&bag_a, &bag_b);
                    }
                    Ok(true)
                }
                Err(e) => {
                    terminal::display_error("sentence similarity", &e);
                    Ok(false)
                }
            }
        }

        Commands::Dataset {
            path,
            name,
            kind,
            limit,
            concurrency,
            skip_failures,
            save,
        } => {
            let kind = PairKind::from(kind);
            if let Some(limit) = limit {
                match kind {
                    PairKind::Words => config.word_limit = limit,
                    PairKind::Sentences => config.sentence_limit = limit,
                }
            }
            if let Some(concurrency) = concurrency {
                config.concurrency = concurrency;
            }
            config.validate()?;

            let pairs = dataset::load_pairs(&path)?;
            println!("Loaded {} pairs from {}", pairs.len(), path.display());

            let pipeline = SimilarityPipeline::new(build_source(&config)?, config.limits());
            let policy = if skip_failures {
                FailurePolicy::Skip
            } else {
                FailurePolicy::Abort
            };

            let batch = match dataset::score_dataset(
                &pipeline,
                &pairs,
                kind,
                policy,
                config.concurrency,
            )
            .await
            {
                Ok(batch) => batch,
                Err(e) => {
                    terminal::display_error("dataset run aborted", &e);
                    return Ok(false);
                }
            };

            let result = match batch.correlate() {
                Ok(result) => result,
                Err(e) => {
                    terminal::display_error("correlation", &e);
                    return Ok(false);
                }
            };

            terminal::display_batch_summary(&name, &batch, &result);

            if save {
                let mut table = if config.results_path.exists() {
                    ResultTable::load(&config.results_path)?
                } else {
                    ResultTable::new()
                };
                table.insert(&name, result);
                table.save(&config.results_path)?;
                println!(
                    "{}",
                    format!("Saved to {}", config.results_path.display()).dimmed()
                );
            }

            Ok(true)
        }

        Commands::Results { path } => {
            let path = path.unwrap_or(config.results_path);
            let table = ResultTable::load(&path)?;
            terminal::display_result_table(&table);
            Ok(true)
        }

        Commands::Neighbors { term, limit } => {
            if let Some(limit) = limit {
                config.word_limit = limit;
            }
            config.validate()?;
            let pipeline = SimilarityPipeline::new(build_source(&config)?, config.limits());

            match pipeline.neighbors(&term).await {
                Ok(neighbors) => {
                    terminal::display_neighbors(&term, &neighbors);
                    Ok(true)
                }
                Err(e) => {
                    terminal::display_error("neighbor lookup", &e);
                    Ok(false)
                }
            }
        }
    }
}
