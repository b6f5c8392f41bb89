//! `lyricscan` - classify and explain song lyrics from the command line.

use std::io::{self, IsTerminal};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use lyricscan::config::Config;
use lyricscan::services::{LyricsAnalyzer, ModelStatus, ReloadOutcome};
use lyricscan::types::{BatchItem, BatchOutcome, Classification, Explanation, SongInfo};

#[derive(Parser, Debug)]
#[command(name = "lyricscan", version, about = "Detect explicit content in song lyrics.")]
struct Cli {
    /// Print JSON instead of human-readable output
    #[arg(long, global = true)]
    json: bool,

    /// Model artifact to use instead of LYRICSCAN_MODEL_PATH
    #[arg(long, global = true)]
    model: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Classify a lyrics document as explicit or clean
    Classify(LyricsArgs),
    /// Classify a lyrics document and score each word
    Explain {
        #[command(flatten)]
        lyrics: LyricsArgs,
        /// Print the lyrics with flagged words wrapped in [ ]
        #[arg(long)]
        highlight: bool,
    },
    /// Classify many documents: a JSON array of strings, or blank-line separated paragraphs
    Batch {
        /// Input file; stdin when omitted
        file: Option<PathBuf>,
    },
    /// Show model state
    Status,
    /// Reload the model artifact from disk
    Reload,
}

#[derive(Args, Debug)]
struct LyricsArgs {
    /// Lyrics text; read from FILE or stdin when omitted
    #[arg(long, short)]
    text: Option<String>,
    /// File containing the lyrics
    file: Option<PathBuf>,
    /// Song title, carried into the output
    #[arg(long)]
    title: Option<String>,
    /// Artist, carried into the output
    #[arg(long)]
    artist: Option<String>,
}

impl LyricsArgs {
    fn read(&self) -> Result<String> {
        if let Some(text) = &self.text {
            return Ok(text.clone());
        }
        read_input(self.file.as_ref())
    }

    fn song(&self) -> SongInfo {
        SongInfo::new(self.title.as_deref(), self.artist.as_deref())
    }
}

fn read_input(file: Option<&PathBuf>) -> Result<String> {
    match file {
        Some(path) => Ok(fs_err::read_to_string(path)?),
        None => {
            if io::stdin().is_terminal() {
                bail!("no lyrics given: pass --text, a file path, or pipe lyrics on stdin");
            }
            io::read_to_string(io::stdin()).context("reading lyrics from stdin")
        }
    }
}

/// Batch input: a JSON array of strings, or paragraphs separated by blank lines.
fn parse_batch(content: &str) -> Result<Vec<String>> {
    if content.trim_start().starts_with('[') {
        return serde_json::from_str(content).context("batch input is not a JSON array of strings");
    }

    let mut documents = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for line in content.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                documents.push(current.join("\n"));
                current.clear();
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        documents.push(current.join("\n"));
    }
    Ok(documents)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_classification(result: &Classification) {
    let song = &result.metadata.song;
    if let Some(title) = &song.title {
        match &song.artist {
            Some(artist) => println!("{title} - {artist}"),
            None => println!("{title}"),
        }
    }
    let verdict = &result.verdict;
    println!(
        "{} ({:.1}% confidence, {})",
        if verdict.is_explicit { "EXPLICIT" } else { "CLEAN" },
        verdict.confidence * 100.0,
        result.confidence_level.description().to_lowercase()
    );
    println!(
        "  P(explicit) = {:.3}   P(not explicit) = {:.3}",
        result.probabilities.explicit, result.probabilities.not_explicit
    );
    println!(
        "  {} characters, {} words",
        result.metadata.lyrics_length, result.metadata.word_count
    );
}

fn print_explanation(explanation: &Explanation, lyrics: &str, highlight: bool) {
    print_classification(&explanation.overall);
    let counts = &explanation.counts;
    println!(
        "\n{} of {} analyzed words flagged ({:.1}%), {} words total",
        counts.explicit_words, counts.analyzed_words, counts.explicit_percentage, counts.total_words
    );

    let flagged = explanation.explicit_words();
    if !flagged.is_empty() {
        println!("Explicit words: {}", flagged.join(", "));
    }
    for word in explanation.words.iter().filter(|w| w.is_explicit) {
        println!(
            "  {:<16} {:.3}  {:?}  {:?}",
            word.word_cleaned, word.explicit_score, word.contribution_tier, word.source
        );
    }

    if highlight {
        println!("\n{}", explanation.highlight(lyrics, "[", "]"));
    }
}

fn print_batch(items: &[BatchItem]) {
    for item in items {
        match &item.outcome {
            BatchOutcome::Classified { verdict, .. } => println!(
                "{:>4}  {:<12} {:.3}",
                item.index,
                verdict.class_label.label(),
                verdict.confidence
            ),
            BatchOutcome::Rejected { reason } => println!("{:>4}  rejected     {reason}", item.index),
        }
    }
}

fn print_status(status: &ModelStatus) {
    println!("Model: {}", status.model_path.display());
    println!("  state: {:?}", status.state);
    match status.artifact_size {
        Some(size) => println!("  artifact: {size} bytes"),
        None => println!("  artifact: missing"),
    }
    if let Some(vocabulary) = status.vocabulary_size {
        println!("  vocabulary: {vocabulary} terms");
    }
    if let Some(trained_at) = status.trained_at {
        println!("  trained: {}", trained_at.format("%Y-%m-%d %H:%M:%S UTC"));
    }
}

fn print_reload(outcome: &ReloadOutcome) {
    println!("{}", outcome.message);
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("lyricscan=info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = Config::load()?;
    if let Some(model) = cli.model {
        config.model_path = model;
    }
    let analyzer = LyricsAnalyzer::from_config(&config)?;

    match cli.command {
        Command::Classify(args) => {
            let lyrics = args.read()?;
            let result = analyzer.classify(&lyrics, &args.song())?;
            if cli.json {
                print_json(&result)?;
            } else {
                print_classification(&result);
            }
        }
        Command::Explain { lyrics: args, highlight } => {
            let lyrics = args.read()?;
            let explanation = analyzer.explain(&lyrics, &args.song())?;
            if cli.json {
                print_json(&explanation)?;
            } else {
                print_explanation(&explanation, &lyrics, highlight);
            }
        }
        Command::Batch { file } => {
            let documents = parse_batch(&read_input(file.as_ref())?)?;
            let items = analyzer.predict_batch(&documents)?;
            if cli.json {
                print_json(&items)?;
            } else {
                print_batch(&items);
            }
        }
        Command::Status => {
            let status = analyzer.status();
            if cli.json {
                print_json(&status)?;
            } else {
                print_status(&status);
            }
        }
        Command::Reload => {
            let outcome = analyzer.reload();
            if cli.json {
                print_json(&outcome)?;
            } else {
                print_reload(&outcome);
            }
            if !outcome.success {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
