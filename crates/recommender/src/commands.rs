use anyhow::{bail, Context, Result};
use colored::Colorize;
use std::path::Path;
use yelp_recsys_core::{DataConfig, DatasetStats, EngineConfig, InteractionStore, ModelType};
use yelp_recsys_recommender::{
    compare_models, compare_strategies, sample_users, RecommendationEngine, RelevanceEvaluator,
};

fn load_store(data_config: &DataConfig) -> Result<InteractionStore> {
    InteractionStore::load(data_config).with_context(|| {
        format!(
            "Failed to load dataset from {}",
            data_config.data_dir.display()
        )
    })
}

fn fitted_engine(store: &InteractionStore, config: EngineConfig) -> Result<RecommendationEngine> {
    let mut engine =
        RecommendationEngine::build(store, config).context("Failed to build rating matrix")?;
    engine
        .fit()
        .with_context(|| format!("Failed to fit {} model", engine.model_type()))?;
    Ok(engine)
}

pub fn recommend(
    data_config: &DataConfig,
    engine_config: EngineConfig,
    users: &[String],
    n: usize,
    model_file: Option<&Path>,
    requested_model: Option<ModelType>,
) -> Result<()> {
    let store = load_store(data_config)?;
    let engine = match model_file {
        Some(path) => {
            let engine = RecommendationEngine::load_model(path)
                .with_context(|| format!("Failed to load model from {}", path.display()))?;
            if let Some(model_type) = requested_model {
                engine
                    .ensure_model_type(model_type)
                    .with_context(|| format!("Saved model {} does not match", path.display()))?;
            }
            engine
        }
        None => fitted_engine(&store, engine_config)?,
    };

    println!(
        "{} {} model, top {}\n",
        "Recommending with".cyan().bold(),
        engine.model_type(),
        n
    );

    let results = engine.recommend_batch(users, n);
    let mut failed = 0;

    for batch in &results {
        match &batch.result {
            Ok(items) => {
                println!("{} {}", "User".cyan(), batch.user_id.white().bold());
                for (rank, business_id) in items.iter().enumerate() {
                    match store.business(business_id) {
                        Ok(business) => println!(
                            "  {:>3}. {} {} [{}]",
                            rank + 1,
                            business.name,
                            format!("({})", business_id).dimmed(),
                            business.categories.join(", ")
                        ),
                        Err(_) => println!("  {:>3}. {}", rank + 1, business_id),
                    }
                }
                println!();
            }
            Err(e) => {
                failed += 1;
                println!(
                    "{} {}: {}\n",
                    "User".cyan(),
                    batch.user_id.white().bold(),
                    e.to_string().red()
                );
            }
        }
    }

    if failed == results.len() {
        bail!("No recommendations produced for any of {} user(s)", failed);
    }
    Ok(())
}

pub fn fit(data_config: &DataConfig, engine_config: EngineConfig, output: &Path) -> Result<()> {
    let store = load_store(data_config)?;
    let engine = fitted_engine(&store, engine_config)?;

    engine
        .save_model(output)
        .with_context(|| format!("Failed to save model to {}", output.display()))?;

    let (users, items) = engine.matrix().shape();
    println!(
        "{} {} model on {} users x {} items -> {}",
        "Saved".green().bold(),
        engine.model_type(),
        users,
        items,
        output.display()
    );
    Ok(())
}

pub fn evaluate(
    data_config: &DataConfig,
    engine_config: EngineConfig,
    sample: usize,
    seed: u64,
    n: usize,
    top_k: usize,
) -> Result<()> {
    let store = load_store(data_config)?;
    let evaluator = RelevanceEvaluator::new(&store)
        .with_positive_threshold(engine_config.positive_rating_threshold);
    let users = sample_users(&store, sample, seed);

    let engine =
        RecommendationEngine::build(&store, engine_config).context("Failed to build rating matrix")?;
    let evaluations = compare_strategies(&engine, &evaluator, &users, n, top_k)
        .context("Strategy evaluation failed")?;

    println!(
        "{} precision@{} over {} sampled user(s)\n",
        "Category".cyan().bold(),
        n,
        users.len()
    );
    for evaluation in &evaluations {
        let precision = match evaluation.mean_precision {
            Some(p) => format!("{:.4}", p).green(),
            None => "n/a".yellow(),
        };
        println!(
            "  {:<18} {}  {}",
            evaluation.model_type.to_string().white().bold(),
            precision,
            format!(
                "({} evaluated, {} skipped)",
                evaluation.users_evaluated, evaluation.users_skipped
            )
            .dimmed()
        );
    }
    Ok(())
}

pub fn compare(
    data_config: &DataConfig,
    engine_config: EngineConfig,
    sample: usize,
    seed: u64,
    n: usize,
) -> Result<()> {
    let store = load_store(data_config)?;
    let users = sample_users(&store, sample, seed);

    let engine =
        RecommendationEngine::build(&store, engine_config).context("Failed to build rating matrix")?;
    let agreement = compare_models(&engine, &users, n).context("Model comparison failed")?;

    let overlap = match agreement.mean_jaccard {
        Some(j) => format!("{:.4}", j).green(),
        None => "n/a".yellow(),
    };
    println!(
        "{} top-{} Jaccard overlap: {} {}",
        "Mean".cyan().bold(),
        n,
        overlap,
        format!("({} user(s) compared)", agreement.users_compared).dimmed()
    );
    Ok(())
}

pub fn stats(data_config: &DataConfig, bins: usize) -> Result<()> {
    let store = load_store(data_config)?;
    let stats = DatasetStats::compute(&store, bins).context("Failed to compute statistics")?;
    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}
