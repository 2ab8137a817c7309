use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use yelp_recsys_core::{
    init_logging, load_dotenv, ConfigLoader, DataConfig, EngineConfig, LogConfig, LogFormat,
    ModelType,
};
use yelp_recsys_recommender::DEFAULT_TOP_CATEGORIES;

mod commands;

#[derive(Parser)]
#[command(name = "recsys")]
#[command(about = "Collaborative-filtering recommendations over a review dataset", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(
        long,
        global = true,
        env = "RECSYS_DATA_DIR",
        help = "Directory holding users.json, businesses.json and reviews.json"
    )]
    data_dir: Option<PathBuf>,

    #[arg(long, global = true, help = "Model strategy (svd or knn)")]
    model: Option<ModelType>,

    #[arg(long, global = true, help = "Emit logs as JSON")]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Recommend businesses for one or more users")]
    Recommend {
        #[arg(short, long = "user", required = true, help = "User id (repeatable)")]
        users: Vec<String>,

        #[arg(short, help = "Number of recommendations per user")]
        n: Option<usize>,

        #[arg(long, help = "Use a model saved by `fit` instead of fitting")]
        model_file: Option<PathBuf>,
    },

    #[command(about = "Fit the configured model and save it")]
    Fit {
        #[arg(short, long, help = "Output model file")]
        output: PathBuf,
    },

    #[command(about = "Category precision of both strategies on a user sample")]
    Evaluate {
        #[arg(long, default_value = "100", help = "Number of users to sample")]
        sample: usize,

        #[arg(long, default_value = "42", help = "Sampling seed")]
        seed: u64,

        #[arg(
            long,
            default_value_t = DEFAULT_TOP_CATEGORIES,
            help = "Preferred categories per user"
        )]
        top_k: usize,

        #[arg(short, help = "Number of recommendations per user")]
        n: Option<usize>,
    },

    #[command(about = "Overlap between the two strategies' recommendations")]
    Compare {
        #[arg(long, default_value = "100", help = "Number of users to sample")]
        sample: usize,

        #[arg(long, default_value = "42", help = "Sampling seed")]
        seed: u64,

        #[arg(short, default_value = "20", help = "Number of recommendations per user")]
        n: usize,
    },

    #[command(about = "Descriptive statistics of the dataset")]
    Stats {
        #[arg(long, default_value = "20", help = "Histogram bins")]
        bins: usize,
    },
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{} {:#}", "Error:".red().bold(), err);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    load_dotenv();

    let cli = Cli::parse();

    let mut data_config = DataConfig::from_env().context("Invalid data configuration")?;
    if let Some(data_dir) = cli.data_dir {
        data_config = data_config.with_data_dir(data_dir);
    }
    data_config.validate()?;

    let format = if cli.json {
        LogFormat::Json
    } else {
        LogFormat::Pretty
    };
    init_logging(&LogConfig {
        level: data_config.log_level.clone(),
        format,
    })
    .context("Failed to initialize logging")?;

    // A saved model is only checked against an explicitly chosen strategy
    let model_requested = cli.model.is_some() || std::env::var_os("RECSYS_MODEL_TYPE").is_some();

    let mut engine_config = EngineConfig::from_env().context("Invalid engine configuration")?;
    if let Some(model_type) = cli.model {
        engine_config = engine_config.with_model_type(model_type);
    }
    engine_config.validate()?;

    match cli.command {
        Commands::Recommend {
            users,
            n,
            model_file,
        } => {
            let n = n.unwrap_or(engine_config.recommendation_count);
            let requested_model = model_requested.then_some(engine_config.model_type);
            commands::recommend(
                &data_config,
                engine_config,
                &users,
                n,
                model_file.as_deref(),
                requested_model,
            )?;
        }
        Commands::Fit { output } => {
            commands::fit(&data_config, engine_config, &output)?;
        }
        Commands::Evaluate {
            sample,
            seed,
            top_k,
            n,
        } => {
            let n = n.unwrap_or(engine_config.recommendation_count);
            commands::evaluate(&data_config, engine_config, sample, seed, n, top_k)?;
        }
        Commands::Compare { sample, seed, n } => {
            commands::compare(&data_config, engine_config, sample, seed, n)?;
        }
        Commands::Stats { bins } => {
            commands::stats(&data_config, bins)?;
        }
    }

    Ok(())
}
