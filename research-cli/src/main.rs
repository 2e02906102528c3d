//! Deep Research CLI
//!
//! Asks for a topic, optionally clarifies it with a few follow-up questions,
//! runs a recursive research pass and writes the final report as markdown.

mod config;
mod prompt;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use research_core::{SearchProvider, StructuredGenerator};
use research_engine::{
    combine_query, generate_feedback, worst_case_searches, ReportAssembler, ResearchEvent,
    ResearchScheduler,
};
use research_llm::OpenAIClient;
use research_search::FirecrawlClient;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::AppConfig;

const DEFAULT_BREADTH: usize = 4;
const DEFAULT_DEPTH: usize = 2;
const FEEDBACK_QUESTIONS: usize = 3;

/// Recursive deep research from the terminal
#[derive(Parser, Debug)]
#[command(name = "deep-research", version, about, long_about = None)]
struct Cli {
    /// What to research (asked interactively if omitted)
    #[arg(short, long)]
    query: Option<String>,

    /// Search queries per level (asked interactively if omitted)
    #[arg(short, long)]
    breadth: Option<usize>,

    /// Levels of follow-up research (asked interactively if omitted)
    #[arg(short, long)]
    depth: Option<usize>,

    /// Where to write the final report
    #[arg(short, long, default_value = "output.md")]
    output: PathBuf,

    /// Skip the clarifying questions
    #[arg(long)]
    skip_feedback: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env.local file
    if let Err(e) = dotenvy::from_filename(".env.local") {
        // Not an error if the file doesn't exist
        if !matches!(e, dotenvy::Error::Io(_)) {
            eprintln!("Warning: Failed to load .env.local: {}", e);
        }
    }

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,research_engine=debug")),
        )
        .init();

    let cli = Cli::parse();
    let config = AppConfig::from_env();
    info!("Using model {}", config.model);

    let generator = Arc::new(OpenAIClient::from_env()?);
    let search = Arc::new(FirecrawlClient::from_env()?);
    if !search.is_configured() {
        warn!("FIRECRAWL_API_KEY not set - research will return no results");
    }
    debug!("Search endpoint mode: {:?}", search.mode());

    let query = match cli.query {
        Some(query) => query,
        None => prompt::ask("What would you like to research?")?,
    };
    if query.trim().is_empty() {
        anyhow::bail!("A research query is required");
    }

    let breadth = match cli.breadth {
        Some(breadth) => breadth,
        None => prompt::ask_number(
            &format!("Enter research breadth (recommended 2-10, default {}):", DEFAULT_BREADTH),
            DEFAULT_BREADTH,
        )?,
    };
    let depth = match cli.depth {
        Some(depth) => depth,
        None => prompt::ask_number(
            &format!("Enter research depth (recommended 1-5, default {}):", DEFAULT_DEPTH),
            DEFAULT_DEPTH,
        )?,
    };

    let combined_query = if cli.skip_feedback {
        query.clone()
    } else {
        clarify(generator.as_ref(), &config.model, &query).await?
    };

    info!(
        "Starting research, breadth: {}, depth: {}, at most {} searches",
        breadth,
        depth,
        worst_case_searches(breadth, depth)
    );

    let scheduler = ResearchScheduler::new(generator.clone(), search, config.scheduler_config());
    let report_char_limit = scheduler.config().report_learnings_char_limit;

    let mut events = scheduler.subscribe();
    let progress = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => log_event(&event),
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Progress log skipped {} events", skipped)
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    let result = scheduler
        .research(&combined_query, breadth, depth)
        .await
        .context("Research run rejected its parameters")?;
    // Closes the event channel so the progress task finishes
    drop(scheduler);
    if let Err(e) = progress.await {
        warn!("Progress log task failed: {}", e);
    }

    if result.is_empty() {
        warn!("Research gathered no learnings or sources");
    }

    let learnings = result.learnings_vec();
    let visited_urls = result.visited_urls_vec();

    println!("\n\nLearnings:\n\n{}", learnings.join("\n"));
    println!(
        "\n\nVisited URLs ({}):\n\n{}",
        visited_urls.len(),
        visited_urls.join("\n")
    );

    info!("Writing final report...");
    let assembler = ReportAssembler::new(generator, &config.model, report_char_limit);
    let report = assembler
        .write_final_report(&combined_query, &learnings, &visited_urls)
        .await;

    tokio::fs::write(&cli.output, &report)
        .await
        .with_context(|| format!("Failed to write report to {}", cli.output.display()))?;

    println!("\n\nFinal Report:\n\n{}", report);
    println!("\nReport has been saved to {}", cli.output.display());

    Ok(())
}

/// Ask clarifying questions and fold the answers into the research query.
///
/// A failed question round is not fatal; research starts from the bare query.
async fn clarify(
    generator: &dyn StructuredGenerator,
    model: &str,
    query: &str,
) -> anyhow::Result<String> {
    let questions = match generate_feedback(generator, model, query, FEEDBACK_QUESTIONS).await {
        Ok(questions) => questions,
        Err(e) => {
            warn!("Could not generate follow-up questions: {}", e);
            Vec::new()
        }
    };

    if !questions.is_empty() {
        println!("\nTo better understand your research needs, please answer these follow-up questions:");
    }

    let mut answered = Vec::with_capacity(questions.len());
    for question in questions {
        let answer = prompt::ask(&format!("\n{}\nYour answer:", question))?;
        answered.push((question, answer));
    }

    Ok(combine_query(query, &answered))
}

fn log_event(event: &ResearchEvent) {
    match event {
        ResearchEvent::QueriesPlanned {
            depth,
            breadth,
            queries,
        } => info!(depth, breadth, "Planned queries: {}", queries.join(" | ")),
        ResearchEvent::BranchCompleted {
            depth,
            query,
            learnings,
            visited_urls,
        } => debug!(
            depth,
            "Finished '{}' ({} learnings, {} URLs)", query, learnings, visited_urls
        ),
        ResearchEvent::BranchFailed {
            depth,
            query,
            error,
        } => warn!(depth, "Branch '{}' failed: {}", query, error),
    }
}
