use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use dialact::io::format_distribution;
use dialact::{
    copy_split, list_transcript_files, load_corpus_from_dir, normalize_tag, partition,
    run_experiment, write_report, ExperimentConfig, HumanReport, ParseConfig, SplitConfig, TagMap,
    DEFAULT_TAG,
};

#[derive(Parser)]
#[command(name = "dialact")]
#[command(author, version, about = "Dialogue-act prediction with n-gram tag models", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Randomly partition a corpus directory into training and testing directories
    Split {
        /// Corpus directory (searched recursively)
        #[arg(short, long)]
        corpus: PathBuf,

        /// Destination for training transcripts
        #[arg(long, default_value = "train")]
        train: PathBuf,

        /// Destination for testing transcripts
        #[arg(long, default_value = "test")]
        test: PathBuf,

        /// Random seed
        #[arg(long, default_value = "72019")]
        seed: u64,

        /// Number of buckets each file draws from
        #[arg(long, default_value = "10")]
        buckets: u32,

        /// Buckets that send a file to the test set
        #[arg(long, default_value = "1")]
        test_buckets: u32,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Train the n-gram models and report accuracy on held-out conversations
    Evaluate {
        /// Tag map (JSON object of raw tag -> canonical tag)
        #[arg(long, default_value = "acts.json")]
        tags: PathBuf,

        /// Training transcripts directory
        #[arg(long, default_value = "train")]
        train: PathBuf,

        /// Testing transcripts directory
        #[arg(long, default_value = "test")]
        test: PathBuf,

        /// Output file for the machine-readable report (JSON)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output file for the human-readable report (text)
        #[arg(long)]
        human_readable: Option<PathBuf>,

        /// Tag predicted when no model has an answer
        #[arg(long, default_value = DEFAULT_TAG)]
        default_tag: String,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Show how often each canonical tag occurs in a corpus
    Stats {
        /// Tag map (JSON object of raw tag -> canonical tag)
        #[arg(long, default_value = "acts.json")]
        tags: PathBuf,

        /// Corpus directory (searched recursively)
        #[arg(short, long)]
        corpus: PathBuf,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Print the canonical tag for raw corpus tags
    Normalize {
        /// Tag map (JSON object of raw tag -> canonical tag)
        #[arg(long, default_value = "acts.json")]
        tags: PathBuf,

        /// Canonical tag of the preceding utterance
        #[arg(long)]
        previous: Option<String>,

        /// Raw tags to normalize
        #[arg(required = true)]
        raw_tags: Vec<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Split {
            corpus,
            train,
            test,
            seed,
            buckets,
            test_buckets,
            verbose,
        } => {
            setup_logging(verbose);
            let config = SplitConfig {
                seed,
                buckets,
                test_buckets,
            };
            split_corpus(&corpus, &train, &test, &config)
        }
        Commands::Evaluate {
            tags,
            train,
            test,
            output,
            human_readable,
            default_tag,
            verbose,
        } => {
            setup_logging(verbose);
            evaluate_models(
                &tags,
                &train,
                &test,
                output.as_deref(),
                human_readable.as_deref(),
                default_tag,
            )
        }
        Commands::Stats {
            tags,
            corpus,
            verbose,
        } => {
            setup_logging(verbose);
            show_stats(&tags, &corpus)
        }
        Commands::Normalize {
            tags,
            previous,
            raw_tags,
        } => {
            setup_logging(false);
            normalize_tags(&tags, previous.as_deref(), &raw_tags)
        }
    }
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber).ok();
}

fn load_tag_map(path: &Path) -> Result<TagMap> {
    let tag_map = TagMap::from_file(path).context("Failed to load tag map")?;
    info!(
        "Loaded {} raw tags mapping onto {} canonical tags",
        tag_map.len(),
        tag_map.tag_set().len()
    );
    Ok(tag_map)
}

fn split_corpus(corpus: &Path, train: &Path, test: &Path, config: &SplitConfig) -> Result<()> {
    let files = list_transcript_files(corpus)?;
    let mut rng = StdRng::seed_from_u64(config.seed);
    let split = partition(&files, config, &mut rng)?;

    if copy_split(&split, train, test)? {
        info!(
            "Copied {} training and {} testing transcripts",
            split.train.len(),
            split.test.len()
        );
    }
    Ok(())
}

fn evaluate_models(
    tags: &Path,
    train: &Path,
    test: &Path,
    output: Option<&Path>,
    human_readable: Option<&Path>,
    default_tag: String,
) -> Result<()> {
    let tag_map = load_tag_map(tags)?;
    let parse_config = ParseConfig::default();

    info!("Loading training conversations from {:?}", train);
    let train_corpus = load_corpus_from_dir(train, &tag_map, &parse_config)
        .context("Failed to load training corpus")?;
    info!("Loading testing conversations from {:?}", test);
    let test_corpus = load_corpus_from_dir(test, &tag_map, &parse_config)
        .context("Failed to load testing corpus")?;

    let config = ExperimentConfig {
        default_tag,
        ..Default::default()
    };
    let report = run_experiment(&train_corpus, &test_corpus, tag_map.tag_set(), &config);

    print!("{}", HumanReport::new(&report).format());

    let paths = write_report(&report, output, human_readable)?;
    if let Some(path) = paths.json_path {
        info!("JSON report written to {:?}", path);
    }
    if let Some(path) = paths.human_path {
        info!("Text report written to {:?}", path);
    }

    Ok(())
}

fn show_stats(tags: &Path, corpus: &Path) -> Result<()> {
    let tag_map = load_tag_map(tags)?;
    let corpus = load_corpus_from_dir(corpus, &tag_map, &ParseConfig::default())?;

    let unrecognized = corpus
        .iter()
        .flat_map(|c| c.iter())
        .filter(|u| u.dialogue_act.is_none())
        .count();

    println!("Tag Distribution");
    println!("================");
    println!("Conversations: {}", corpus.conversations.len());
    println!("Utterances: {}", corpus.utterance_count());
    println!("Unrecognized tags: {}", unrecognized);
    println!();

    let shares: Vec<_> = corpus
        .tag_distribution(tag_map.tag_set())
        .into_iter()
        .map(|(tag, share)| dialact::io::TagShare { tag, share })
        .collect();
    print!("{}", format_distribution(&shares));

    Ok(())
}

fn normalize_tags(tags: &Path, previous: Option<&str>, raw_tags: &[String]) -> Result<()> {
    let tag_map = load_tag_map(tags)?;

    for raw in raw_tags {
        match normalize_tag(raw, &tag_map, previous) {
            Some(canonical) => println!("{}\t{}", raw, canonical),
            None => println!("{}\t<unrecognized>", raw),
        }
    }

    Ok(())
}
