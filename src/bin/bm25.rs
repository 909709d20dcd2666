//! `bm25`: fit, inspect and run the BM25 sparse encoder from the command line.

use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};
use serde_json::json;

use bm25_sparse::{Bm25Encoder, Bm25Error, Bm25Result, EncoderConfig, EncoderParams, Language};

#[derive(Parser)]
#[command(name = "bm25", version, about = "BM25 sparse-vector text encoder")]
struct Cli {
    /// TOML encoder configuration
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Start from a bundled preset (zh or en)
    #[arg(long, global = true)]
    language: Option<String>,

    /// Parameter file written by a previous `fit`
    #[arg(long, global = true)]
    params: Option<PathBuf>,

    /// User dictionary, one `word [freq] [tag]` per line
    #[arg(long, global = true)]
    dict: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print tokens and term ids for a text
    Tokenize { text: String },

    /// Fit on a corpus file (one document per line) and save the parameters
    Fit {
        #[arg(long)]
        corpus: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Encode documents (or queries with --query) as sparse vectors
    Encode {
        /// Use query-side (idf) weighting
        #[arg(long)]
        query: bool,
        #[arg(required = true)]
        texts: Vec<String>,
    },

    /// Summarize the loaded parameters
    Inspect,
}

fn build_encoder(cli: &Cli) -> Bm25Result<Bm25Encoder> {
    let mut config = match &cli.config {
        Some(path) => EncoderConfig::from_toml_file(path)?,
        None => EncoderConfig::default(),
    };
    if let Some(language) = &cli.language {
        config.language = Some(language.parse::<Language>()?);
    }
    if let Some(params) = &cli.params {
        config.params_file = Some(params.clone());
    }
    if let Some(dict) = &cli.dict {
        config.tokenizer.dict_file = Some(Some(dict.clone()));
    }
    Bm25Encoder::from_config(&config)
}

fn read_corpus(path: &Path) -> Bm25Result<Vec<String>> {
    let file = std::fs::File::open(path).map_err(|e| Bm25Error::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let mut documents = Vec::new();
    for line in BufReader::new(file).lines() {
        let line = line.map_err(|e| Bm25Error::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        if !line.trim().is_empty() {
            documents.push(line);
        }
    }
    Ok(documents)
}

fn print_json(value: &serde_json::Value) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{}", s),
        Err(e) => eprintln!("error: {}", e),
    }
}

fn run(cli: Cli) -> Bm25Result<()> {
    let mut encoder = build_encoder(&cli)?;

    match cli.command {
        Command::Tokenize { text } => {
            let tokenizer = encoder.tokenizer();
            let tokens: Vec<_> = tokenizer
                .tokenize(&text)
                .into_iter()
                .map(|t| json!({ "token": tokenizer.hash(&t), "text": t }))
                .collect();
            print_json(&json!({ "mode": format!("{:?}", tokenizer.mode()), "tokens": tokens }));
        }
        Command::Fit { corpus, output } => {
            let documents = read_corpus(&corpus)?;
            let summary = encoder.fit_corpus(&documents)?;
            encoder.download_params(&output)?;
            print_json(&json!({
                "fitted": summary.documents,
                "skipped": summary.skipped,
                "doc_count": encoder.stats().doc_count(),
                "average_doc_length": encoder.stats().average_doc_length(),
                "output": output,
            }));
        }
        Command::Encode { query, texts } => {
            let vectors = if query {
                encoder.encode_queries(&texts)?
            } else {
                encoder.encode_texts(&texts)?
            };
            print_json(&json!(vectors));
        }
        Command::Inspect => {
            let EncoderParams {
                b,
                k1,
                tokenizer_params,
                bm25_learned_params: stats,
            } = encoder.params();
            print_json(&json!({
                "b": b,
                "k1": k1,
                "tokenizer_params": tokenizer_params,
                "doc_count": stats.doc_count(),
                "average_doc_length": stats.average_doc_length(),
                "vocabulary": stats.term_count(),
            }));
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
