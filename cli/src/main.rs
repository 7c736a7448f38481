use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use faqmatch_core::config::{DEFAULT_MAX_FEATURES, DEFAULT_THRESHOLD};
use faqmatch_core::corpus::load_corpus;
use faqmatch_core::{Engine, EngineConfig, MatchResult, NgramRange, Stopwords, Threshold};
use serde::Serialize;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "faqmatch")]
#[command(about = "Answer questions from a FAQ corpus by TF-IDF similarity", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct EngineArgs {
    /// Corpus path (.json, .jsonl, or a directory of them)
    #[arg(long, env = "FAQ_CORPUS")]
    corpus: PathBuf,
    /// Maximum vocabulary size
    #[arg(long, default_value_t = DEFAULT_MAX_FEATURES)]
    max_features: usize,
    /// Smallest n-gram length
    #[arg(long, default_value_t = 1)]
    min_n: usize,
    /// Largest n-gram length
    #[arg(long, default_value_t = 2)]
    max_n: usize,
    /// Minimum score (exclusive) for an answer to be accepted
    #[arg(long, default_value_t = DEFAULT_THRESHOLD)]
    threshold: f32,
    /// File with one stopword per line, replacing the English list
    #[arg(long)]
    stopwords: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Answer a single question
    Ask {
        #[command(flatten)]
        engine: EngineArgs,
        /// Print the raw match result as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
        question: String,
    },
    /// Print dataset statistics and sample questions
    Stats {
        #[command(flatten)]
        engine: EngineArgs,
        /// Number of sample questions to list
        #[arg(long, default_value_t = 7)]
        samples: usize,
    },
    /// Read questions from stdin, one per line
    Repl {
        #[command(flatten)]
        engine: EngineArgs,
    },
}

#[derive(Serialize)]
struct JsonAnswer<'a> {
    question: &'a str,
    #[serde(flatten)]
    result: &'a MatchResult,
    confidence: String,
    /// Vocabulary terms the question shares with the matched document.
    shared_terms: Vec<&'a str>,
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).with_writer(io::stderr).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Ask { engine, json, question } => {
            let engine = build_engine(&engine)?;
            let query = engine.query(&question);
            let result = engine.resolve(&query, engine.config().threshold);
            if json {
                let shared_terms = result
                    .matched_document_id
                    .map(|id| engine.shared_terms(&query, id))
                    .unwrap_or_default();
                let out = JsonAnswer {
                    question: &query.raw_text,
                    result: &result,
                    confidence: result.confidence().to_string(),
                    shared_terms,
                };
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                print_result(&mut io::stdout().lock(), &question, &result)?;
            }
            Ok(())
        }
        Commands::Stats { engine, samples } => {
            let engine = build_engine(&engine)?;
            print_stats(&engine, samples)
        }
        Commands::Repl { engine } => {
            let engine = build_engine(&engine)?;
            repl(&engine)
        }
    }
}

fn build_engine(args: &EngineArgs) -> Result<Engine> {
    let stopwords = match &args.stopwords {
        Some(path) => {
            let text = std::fs::read_to_string(path).with_context(|| format!("reading stopwords from {}", path.display()))?;
            text.lines().collect::<Stopwords>()
        }
        None => Stopwords::english(),
    };
    let config = EngineConfig {
        max_features: args.max_features,
        ngram_range: NgramRange::new(args.min_n, args.max_n),
        stopwords,
        threshold: Threshold::new(args.threshold)?,
    };
    let entries = load_corpus(&args.corpus)?;
    let pairs = entries.into_iter().map(|e| (e.question, e.answer));
    let engine = Engine::initialize(pairs, config).context("building matching engine")?;
    tracing::info!(documents = engine.len(), terms = engine.vocabulary().len(), "engine ready");
    Ok(engine)
}

fn print_result<W: Write>(out: &mut W, question: &str, result: &MatchResult) -> Result<()> {
    let pct = result.score * 100.0;
    match &result.answer {
        Some(answer) => {
            writeln!(out, "Q: {question}")?;
            writeln!(out, "A: {answer}")?;
            writeln!(out, "Confidence: {pct:.1}% ({})", result.confidence())?;
        }
        None => {
            writeln!(out, "Sorry, I couldn't find a good match for your question (closest score {pct:.1}%).")?;
            writeln!(out, "Try rephrasing it or using simpler keywords.")?;
        }
    }
    Ok(())
}

fn print_stats(engine: &Engine, samples: usize) -> Result<()> {
    let stats = engine.stats();
    let mut out = io::stdout().lock();
    writeln!(out, "Total FAQs: {}", stats.total_documents)?;
    writeln!(out, "Vocabulary size: {}", engine.vocabulary().len())?;
    writeln!(out, "Average question length: {:.1} words", stats.avg_question_words)?;
    writeln!(out, "Average answer length: {:.1} words", stats.avg_answer_words)?;
    if !stats.categories.is_empty() {
        writeln!(out, "Question categories:")?;
        for c in &stats.categories {
            writeln!(out, "- {}: {} questions", c.name, c.count)?;
        }
    }
    writeln!(out, "Sample questions:")?;
    for (i, q) in engine.sample_questions(samples).enumerate() {
        writeln!(out, "{}. {q}", i + 1)?;
    }
    if engine.len() > samples {
        writeln!(out, "... and {} more", engine.len() - samples)?;
    }
    Ok(())
}

fn repl(engine: &Engine) -> Result<()> {
    let stdin = io::stdin();
    let mut out = io::stdout().lock();
    for line in stdin.lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            writeln!(out, "Please type a question.")?;
            continue;
        }
        let result = engine.answer(&line);
        print_result(&mut out, line.trim(), &result)?;
        writeln!(out)?;
    }
    Ok(())
}
