use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{anyhow, Context, Result};
use bytepair::bytes::render_token;
use bytepair::config::{IngestConfig, Segmentation, TrainerConfig};
use bytepair::corpus::load_text_corpus;
use bytepair::serialization;
use bytepair::{TokenId, Tokenizer, BASE_VOCAB_SIZE};
use clap::{ArgAction, Args, Parser, Subcommand};
use env_logger::Env;
use log::info;
use serde_json::json;

const DEFAULT_OUTPUT: &str = "tokenizer";

#[derive(Parser, Debug)]
#[command(author, version, about = "Byte pair encoding toolkit", long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short = 'v', long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Decrease verbosity (-q, -qq)
    #[arg(short = 'q', long, global = true, action = ArgAction::Count)]
    quiet: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Train a new tokenizer from text files
    Train(TrainArgs),
    /// Encode text files with a trained tokenizer
    Encode(EncodeArgs),
    /// Decode token ids back into text
    Decode(DecodeArgs),
    /// Inspect a saved model
    Info(InfoArgs),
}

#[derive(Args, Debug)]
struct TrainArgs {
    /// Files or directories to ingest
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Output path prefix; the suffix is replaced by .model
    #[arg(short, long, value_name = "PATH", default_value = DEFAULT_OUTPUT)]
    output: PathBuf,

    /// Target vocabulary size (at least 256)
    #[arg(long, value_name = "SIZE", default_value_t = 512)]
    vocab_size: usize,

    /// Pre-segmentation applied before counting pairs
    #[arg(long, value_enum, default_value_t = Segmentation::Gpt4)]
    segmentation: Segmentation,

    /// Disable per-merge logging
    #[arg(long)]
    no_progress: bool,

    /// Also write a human-readable .vocab listing
    #[arg(long)]
    vocab: bool,

    /// Write training metrics as JSON to this path
    #[arg(long, value_name = "PATH")]
    metrics: Option<PathBuf>,

    /// Only load files with this extension from directories (repeat flag)
    #[arg(long = "extension", value_name = "EXT")]
    extensions: Vec<String>,

    /// Disable recursive directory traversal
    #[arg(long)]
    no_recursive: bool,

    /// Follow symlinks during traversal
    #[arg(long)]
    follow_symlinks: bool,
}

#[derive(Args, Debug)]
struct EncodeArgs {
    /// Model file to load
    #[arg(short = 'm', long, value_name = "PATH")]
    model: PathBuf,

    /// Pre-segmentation the model was trained with
    #[arg(long, value_enum, default_value_t = Segmentation::Gpt4)]
    segmentation: Segmentation,

    /// Text inputs to encode
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Emit JSON lines instead of human-readable output
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct DecodeArgs {
    /// Model file to load
    #[arg(short = 'm', long, value_name = "PATH")]
    model: PathBuf,

    /// Path to whitespace separated token ids
    #[arg(long, value_name = "PATH")]
    input: Option<PathBuf>,

    /// Token ids to decode when --input is omitted
    #[arg(value_name = "ID", required_unless_present = "input")]
    tokens: Vec<TokenId>,

    /// Fail on ids outside the vocabulary instead of emitting U+FFFD
    #[arg(long)]
    strict: bool,

    /// Output file for decoded text (defaults to stdout)
    #[arg(long, value_name = "PATH")]
    output: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct InfoArgs {
    /// Model file to inspect
    #[arg(short = 'm', long, value_name = "PATH")]
    model: PathBuf,

    /// Emit machine-readable JSON summary
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Train(args) => run_train(args),
        Commands::Encode(args) => run_encode(args),
        Commands::Decode(args) => run_decode(args),
        Commands::Info(args) => run_info(args),
    }
}

fn init_logging(verbose: u8, quiet: u8) {
    use log::LevelFilter;

    let level = if quiet > 0 {
        match quiet {
            1 => LevelFilter::Warn,
            _ => LevelFilter::Error,
        }
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or("info"));
    builder.format_timestamp_millis();
    builder.filter_level(level);
    let _ = builder.try_init();
}

fn run_train(args: TrainArgs) -> Result<()> {
    let trainer_cfg = TrainerConfig::builder()
        .vocab_size(args.vocab_size)
        .show_progress(!args.no_progress)
        .build()?;

    let ingest_cfg = IngestConfig::builder()
        .recursive(!args.no_recursive)
        .follow_symlinks(args.follow_symlinks)
        .extensions(args.extensions.iter().cloned())
        .build();

    let text = load_text_corpus(&args.inputs, &ingest_cfg)
        .with_context(|| "failed to load text corpus")?;
    info!(
        "loaded {} bytes of text; segmentation {}",
        text.len(),
        args.segmentation
    );

    let mut tokenizer = Tokenizer::new(args.segmentation);
    let start = Instant::now();
    let metrics = tokenizer
        .train_with_config(&text, &trainer_cfg)
        .with_context(|| format!("training to vocab size {} failed", args.vocab_size))?;
    let elapsed = start.elapsed();

    let model_path = tokenizer
        .save(&args.output)
        .with_context(|| format!("failed to save model to {}", args.output.display()))?;
    if args.vocab {
        let vocab_path = tokenizer
            .export_vocab(&args.output)
            .with_context(|| format!("failed to export vocab for {}", args.output.display()))?;
        println!("wrote vocab listing to {}", vocab_path.display());
    }
    if let Some(path) = &args.metrics {
        let json = serde_json::to_string_pretty(&metrics)?;
        fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
    }

    info!(
        "training complete: merges={} vocab={} duration={elapsed:.2?}",
        tokenizer.merges().len(),
        tokenizer.vocab_size()
    );
    println!(
        "wrote model with vocab {} ({} merges) to {}",
        tokenizer.vocab_size(),
        tokenizer.merges().len(),
        model_path.display()
    );
    println!(
        "   tokens {} -> {} | compression {:.2}X | duration {:.2?}",
        metrics.initial_tokens,
        metrics.final_tokens,
        metrics.compression_ratio(),
        elapsed
    );

    Ok(())
}

fn run_encode(args: EncodeArgs) -> Result<()> {
    let tokenizer = Tokenizer::from_file(&args.model, args.segmentation)
        .with_context(|| format!("failed to load model from {}", args.model.display()))?;

    for path in &args.inputs {
        let mut text = String::new();
        File::open(path)
            .with_context(|| format!("failed to open input {}", path.display()))?
            .read_to_string(&mut text)
            .with_context(|| format!("failed to read {}", path.display()))?;

        let tokens = tokenizer.encode(&text);
        if args.json {
            let record = json!({
                "path": path.display().to_string(),
                "tokens": tokens
            });
            println!("{}", serde_json::to_string(&record)?);
        } else {
            print!("{}:\t", path.display());
            write_token_sequence(&mut io::stdout(), &tokens)?;
        }
    }

    Ok(())
}

fn run_decode(args: DecodeArgs) -> Result<()> {
    let tokenizer = Tokenizer::from_file(&args.model, Segmentation::Disabled)
        .with_context(|| format!("failed to load model from {}", args.model.display()))?;

    let tokens = if let Some(input_path) = &args.input {
        let contents = fs::read_to_string(input_path)
            .with_context(|| format!("failed to read {}", input_path.display()))?;
        parse_token_list(&contents)?
    } else {
        args.tokens
    };

    let text = if args.strict {
        let bytes = tokenizer.decode_bytes(&tokens)?;
        String::from_utf8_lossy(&bytes).into_owned()
    } else {
        tokenizer.decode(&tokens)
    };

    if let Some(path) = &args.output {
        fs::write(path, &text).with_context(|| format!("failed to write {}", path.display()))?;
        println!("wrote {} bytes to {}", text.len(), path.display());
    } else {
        io::stdout().write_all(text.as_bytes())?;
    }

    Ok(())
}

fn run_info(args: InfoArgs) -> Result<()> {
    let tokenizer = Tokenizer::from_file(&args.model, Segmentation::Disabled)
        .with_context(|| format!("failed to load model from {}", args.model.display()))?;
    let model = tokenizer.model();

    let longest = model
        .token_bytes()
        .iter()
        .enumerate()
        .skip(BASE_VOCAB_SIZE)
        .max_by_key(|(id, bytes)| (bytes.len(), std::cmp::Reverse(*id)));
    let path = serialization::model_path(&args.model);

    if args.json {
        let summary = json!({
            "path": path.display().to_string(),
            "vocab_size": tokenizer.vocab_size(),
            "merges": tokenizer.merges().len(),
            "longest_token": longest.map(|(id, bytes)| json!({
                "id": id,
                "bytes": bytes.len(),
                "text": render_token(bytes),
            })),
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("Model        : {}", path.display());
        println!("Vocab size   : {}", tokenizer.vocab_size());
        println!("Merges       : {}", tokenizer.merges().len());
        match longest {
            Some((id, bytes)) => println!(
                "Longest token: {id} [{}] ({} bytes)",
                render_token(bytes),
                bytes.len()
            ),
            None => println!("Longest token: (untrained)"),
        }
    }

    Ok(())
}

fn write_token_sequence<W: Write>(writer: &mut W, tokens: &[TokenId]) -> Result<()> {
    for (idx, token) in tokens.iter().enumerate() {
        if idx > 0 {
            writer.write_all(b" ")?;
        }
        write!(writer, "{token}")?;
    }
    writer.write_all(b"\n")?;
    Ok(())
}

fn parse_token_list(text: &str) -> Result<Vec<TokenId>> {
    text.split_whitespace()
        .map(|part| {
            part.parse::<TokenId>()
                .map_err(|err| anyhow!("invalid token id `{part}`: {err}"))
        })
        .collect()
}
