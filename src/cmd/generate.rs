use crate::reports;
use clap::{ArgMatches, Args};
use nameforge::config::{Config, ScoringWeights};
use nameforge::error::NfResult;
use nameforge::generator::{GenerationRequest, Generator};
use nameforge::model::{Dataset, DirectoryRepository, EmbeddedRepository, ModelRepository};
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    /// Word or phrase whose letters are rearranged
    pub phrase: String,

    #[command(flatten)]
    pub config: Config,

    /// First-name corpus the models are trained on
    #[arg(short = 'd', long, value_enum, default_value_t = Dataset::Both)]
    pub dataset: Dataset,

    /// Show scores, templates and verification in a table
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Use only this template (see `nameforge templates`)
    #[arg(long)]
    pub template: Option<String>,

    /// Keep this first name as is
    #[arg(long)]
    pub first: Option<String>,

    /// Keep this surname as is: Jones, -Jones, Smith-Jones
    #[arg(long, allow_hyphen_values = true)]
    pub last: Option<String>,

    /// Train from name lists in this directory instead of the built-in ones
    #[arg(long)]
    pub corpus_dir: Option<PathBuf>,

    /// Where trained models are cached (with --corpus-dir)
    #[arg(long)]
    pub cache_dir: Option<PathBuf>,

    /// Retrain even when a cached model is current
    #[arg(long, default_value_t = false)]
    pub no_cache: bool,

    /// JSON file of scoring weights; explicit weight flags still win
    #[arg(long)]
    pub weights: Option<PathBuf>,
}

fn repository(args: &GenerateArgs) -> Box<dyn ModelRepository> {
    match &args.corpus_dir {
        Some(dir) => {
            let mut repo = DirectoryRepository::new(dir).no_cache(args.no_cache);
            if let Some(cache) = &args.cache_dir {
                repo = repo.with_cache_dir(cache);
            }
            Box::new(repo)
        }
        None => {
            if args.cache_dir.is_some() || args.no_cache {
                warn!("--cache-dir and --no-cache only apply with --corpus-dir");
            }
            Box::new(EmbeddedRepository::new())
        }
    }
}

pub fn run(args: &GenerateArgs, matches: Option<&ArgMatches>) -> NfResult<()> {
    let mut config = args.config.clone();

    if let Some(path) = &args.weights {
        info!("Loading weights from {}", path.display());
        let mut file_weights = ScoringWeights::load_from_file(path)?;
        if let Some(m) = matches {
            file_weights.merge_from_cli(&args.config.weights, m);
        }
        config.weights = file_weights;
    }
    config.validate()?;

    if !args.phrase.is_ascii() {
        warn!("Non-ASCII characters in '{}' are ignored", args.phrase);
    }

    let models = repository(args).resolve(args.dataset)?;
    let generator = Generator::new(models, config);

    let request = GenerationRequest::builder()
        .phrase(args.phrase.clone())
        .template(args.template.clone())
        .first(args.first.clone())
        .last(args.last.clone())
        .build();
    let candidates = generator.generate(&request)?;

    if args.verbose {
        reports::print_input_summary(&args.phrase);
        reports::print_candidate_table(&args.phrase, &candidates);
    } else {
        reports::print_candidates(&candidates);
    }
    Ok(())
}
