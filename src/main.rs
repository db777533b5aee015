use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::*;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use agri_cli::{
    AppConfig, display_banner, read_batch_file, render_answer, render_assessment, render_batch_table,
    render_status, sample_from_args,
};
use agri_core::{CapabilityRegistry, DocumentCache, EmbeddingSearch, LLMProvider, LearningStore};
use agri_fertility::{assess_batch, assess_fertility, recommendation, render_report, summarize};
use agri_ollama::OllamaClient;
use agri_rag::{JsonLearningStore, KnowledgeCascade, LocalDocumentCache, LocalEmbeddingSearch, reindex_learned};

#[derive(Parser)]
#[command(name = "agrisage")]
#[command(about = "Soil fertility scoring and agricultural question answering", long_about = None)]
struct Cli {
    /// Debug logging and cascade traces
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score one soil sample
    Assess(AssessArgs),
    /// Score every field in a JSON batch file
    Batch {
        file: PathBuf,
        /// Print summary rows as JSON
        #[arg(long)]
        json: bool,
        /// Print the full report for each field
        #[arg(long)]
        report: bool,
    },
    /// Answer a farming question
    Ask {
        #[arg(required = true)]
        question: Vec<String>,
        /// Never call the language model
        #[arg(long)]
        no_llm: bool,
        /// Print the answer as JSON
        #[arg(long)]
        json: bool,
        /// Seconds to wait for document indexing before answering
        #[arg(long, default_value_t = 10)]
        index_wait: u64,
    },
    /// Index the knowledge directory and report what was cached
    Index {
        /// Directory to scan instead of AGRI_KNOWLEDGE_DIR
        dir: Option<PathBuf>,
    },
    /// Show which capabilities are configured
    Status,
}

#[derive(Args)]
struct AssessArgs {
    /// Nitrogen, kg/ha
    #[arg(short = 'n', long = "nitrogen")]
    nitrogen: f64,
    /// Phosphorus, kg/ha
    #[arg(short = 'p', long = "phosphorus")]
    phosphorus: f64,
    /// Potassium, kg/ha
    #[arg(short = 'k', long = "potassium")]
    potassium: f64,
    #[arg(long)]
    ph: f64,
    /// Electrical conductivity, dS/m
    #[arg(long)]
    ec: f64,
    /// Organic carbon, percent
    #[arg(long = "oc")]
    organic_carbon: f64,
    #[arg(long, default_value = "Field")]
    field: String,
    #[arg(long)]
    json: bool,
    #[arg(long)]
    report: bool,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Wire every local capability, plus Ollama when generation is enabled
async fn build_registry(config: &AppConfig) -> Result<(CapabilityRegistry, Arc<LocalDocumentCache>)> {
    let embeddings = Arc::new(LocalEmbeddingSearch::new()?);
    let learning = Arc::new(
        JsonLearningStore::open(&config.learned_store)
            .with_context(|| format!("opening {}", config.learned_store.display()))?,
    );
    let reindexed = reindex_learned(learning.as_ref(), embeddings.as_ref()).await?;
    info!(records = reindexed, "Learned answers indexed");

    let documents = Arc::new(LocalDocumentCache::new(&config.knowledge_dir));

    let mut registry = CapabilityRegistry::new()
        .with_embeddings(embeddings)
        .with_learning(learning)
        .with_documents(documents.clone());

    if config.use_llm {
        match OllamaClient::new(config.ollama.clone()) {
            Ok(mut client) => match client.connect().await {
                Ok(()) => registry = registry.with_generator(Arc::new(client)),
                Err(e) => warn!(error = %e, "Ollama unavailable, continuing without generation"),
            },
            Err(e) => warn!(error = %e, "Invalid Ollama configuration"),
        }
    }

    Ok((registry, documents))
}

fn assess(args: AssessArgs) -> Result<()> {
    let sample = sample_from_args(
        args.nitrogen,
        args.phosphorus,
        args.potassium,
        args.ph,
        args.ec,
        args.organic_carbon,
    )?;
    let assessment = assess_fertility(&sample);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&assessment)?);
    } else if args.report {
        println!("{}", render_report(&assessment, &args.field));
    } else {
        println!("{}", render_assessment(&assessment, &args.field));
        println!();
        println!("{}", recommendation::generate(&sample, &assessment));
    }
    Ok(())
}

fn batch(file: PathBuf, json: bool, report: bool) -> Result<()> {
    let fields = read_batch_file(&file)?;
    let outcomes = assess_batch(fields);

    if json {
        println!("{}", serde_json::to_string_pretty(&summarize(&outcomes))?);
        return Ok(());
    }

    if report {
        for outcome in &outcomes {
            match &outcome.result {
                Ok(assessment) => println!("{}\n", render_report(assessment, &outcome.name)),
                Err(e) => eprintln!("{} {}: {}", "❌".red(), outcome.name, e),
            }
        }
    } else {
        println!("{}", render_batch_table(&outcomes));
    }
    Ok(())
}

async fn ask(
    config: AppConfig,
    question: String,
    json: bool,
    index_wait: u64,
    verbose: bool,
) -> Result<()> {
    let (registry, documents) = build_registry(&config).await?;
    let indexing = documents.spawn_indexing();
    match tokio::time::timeout(Duration::from_secs(index_wait), indexing).await {
        Ok(Ok(Ok(result))) => info!(indexed = result.documents_indexed, "Documents ready"),
        Ok(Ok(Err(e))) => warn!(error = %e, "Document indexing failed, answering from a partial cache"),
        Ok(Err(e)) => warn!(error = %e, "Document indexing task aborted, answering from a partial cache"),
        Err(_) => warn!(seconds = index_wait, "Document indexing still running, answering from a partial cache"),
    }

    let cascade = KnowledgeCascade::new(
        Arc::new(agri_rag::KnowledgeData::builtin()?),
        registry,
        config.cascade.clone(),
    );
    let outcome = cascade.resolve(&question).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    println!("{}", render_answer(&outcome.answer));
    if verbose {
        let trace: Vec<&str> = outcome.attempted.iter().map(|s| s.as_str()).collect();
        eprintln!("{} {}", "stages:".dimmed(), trace.join(" → "));
    }
    Ok(())
}

async fn index(config: AppConfig, dir: Option<PathBuf>) -> Result<()> {
    let root = dir.unwrap_or(config.knowledge_dir);
    let cache = LocalDocumentCache::new(&root);
    let result = cache.index_directory().await?;

    println!(
        "{} Indexed {} document(s) from {} ({} skipped)",
        "✅".green(),
        result.documents_indexed,
        root.display(),
        result.documents_skipped
    );
    for error in &result.errors {
        println!("  {} {}", "⚠️".yellow(), error);
    }
    Ok(())
}

async fn status(config: AppConfig) -> Result<()> {
    let (registry, documents) = build_registry(&config).await?;
    documents.index_directory().await?;

    display_banner();
    println!("{}", render_status(&registry.status()));
    println!();

    if let Some(learning) = &registry.learning {
        println!("  learned answers:  {}", learning.all().await?.len());
    }
    if let Some(embeddings) = &registry.embeddings {
        println!("  indexed entries:  {}", embeddings.count().await?);
    }
    println!("  cached documents: {}", documents.document_count().await?);
    println!("  knowledge dir:    {}", config.knowledge_dir.display());
    println!("  learned store:    {}", config.learned_store.display());
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Assess(args) => assess(args),
        Commands::Batch { file, json, report } => batch(file, json, report),
        Commands::Ask { question, no_llm, json, index_wait } => {
            let mut config = AppConfig::from_env()?;
            if no_llm {
                config = config.without_llm();
            }
            ask(config, question.join(" "), json, index_wait, cli.verbose).await
        }
        Commands::Index { dir } => index(AppConfig::from_env()?, dir).await,
        Commands::Status => status(AppConfig::from_env()?).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_assess_arguments() {
        let cli = Cli::try_parse_from([
            "agrisage", "assess", "-n", "400", "-p", "20", "-k", "200", "--ph", "6.8", "--ec", "1.2", "--oc",
            "0.9",
        ])
        .unwrap();
        match cli.command {
            Commands::Assess(args) => {
                assert_eq!(args.nitrogen, 400.0);
                assert_eq!(args.organic_carbon, 0.9);
                assert_eq!(args.field, "Field");
            }
            _ => panic!("expected assess"),
        }
    }

    #[test]
    fn test_ask_joins_words() {
        let cli = Cli::try_parse_from(["agrisage", "ask", "--no-llm", "when", "to", "sow", "wheat"]).unwrap();
        match cli.command {
            Commands::Ask { question, no_llm, .. } => {
                assert_eq!(question.join(" "), "when to sow wheat");
                assert!(no_llm);
            }
            _ => panic!("expected ask"),
        }
    }
}
