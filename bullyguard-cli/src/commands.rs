//! CLI subcommand handlers.

use crate::Commands;
use crate::ConfigAction;
use bullyguard_core::{AppConfig, AppState, ConfigOverrides};
use bullyguard_ml::{ComparisonOrchestrator, ComparisonResult, DatasetId, ModelKey};
use std::path::Path;
use std::sync::Arc;

/// Handle a CLI subcommand.
pub async fn handle_command(
    command: Commands,
    workspace: &Path,
    config_file: Option<&Path>,
) -> anyhow::Result<()> {
    let overrides = match &command {
        Commands::Serve { host, port } => ConfigOverrides {
            host: host.clone(),
            port: *port,
        },
        _ => ConfigOverrides::default(),
    };
    let config = bullyguard_core::load_config(Some(workspace), config_file, Some(&overrides))
        .map_err(|e| anyhow::anyhow!("Configuration error: {}", e))?;
    if config_file.is_none() && !bullyguard_core::config_exists(Some(workspace)) {
        tracing::debug!("No configuration file found, using defaults and environment");
    }

    match command {
        Commands::Serve { .. } => handle_serve(config).await,
        Commands::Datasets => handle_datasets(&config).await,
        Commands::Models => handle_models(&config).await,
        Commands::Train { model_key, dataset } => handle_train(&config, &model_key, &dataset).await,
        Commands::TrainAll { dataset } => handle_train_all(&config, &dataset).await,
        Commands::Predict {
            text,
            model,
            dataset,
        } => handle_predict(&config, &text, &model, &dataset).await,
        Commands::Config { action } => handle_config(action, &config, workspace),
    }
}

fn orchestrator(config: &AppConfig) -> anyhow::Result<ComparisonOrchestrator> {
    ComparisonOrchestrator::from_config(&config.ml)
        .map_err(|e| anyhow::anyhow!("Configuration error: {}", e))
}

fn parse_dataset(raw: &str) -> anyhow::Result<DatasetId> {
    Ok(raw.parse::<DatasetId>()?)
}

async fn handle_serve(config: AppConfig) -> anyhow::Result<()> {
    let orchestrator = orchestrator(&config)?;
    tracing::info!(
        data_dir = %config.ml.data.data_dir.display(),
        "Starting BullyGuard gateway"
    );
    let state = AppState::new(Arc::new(orchestrator));
    bullyguard_core::run_gateway(state, &config.gateway).await?;
    Ok(())
}

async fn handle_datasets(config: &AppConfig) -> anyhow::Result<()> {
    let stats = orchestrator(config)?.dataset_stats().await?;
    println!(
        "{:<10} {:<40} {:>8} {:>9} {:>8} {:>9}",
        "DATASET", "NAME", "SAMPLES", "BULLYING", "RATIO", "AVG WORDS"
    );
    for s in stats {
        println!(
            "{:<10} {:<40} {:>8} {:>9} {:>7.1}% {:>9.1}",
            s.dataset_id,
            s.name,
            s.total_samples,
            s.bullying_count,
            s.bullying_ratio * 100.0,
            s.avg_word_count
        );
    }
    Ok(())
}

async fn handle_models(config: &AppConfig) -> anyhow::Result<()> {
    let models = orchestrator(config)?.available_models().await;
    for model in models {
        println!("{:<12} {}", model.config.key, model.config.name);
        if !model.config.description.is_empty() {
            println!("{:<12} {}", "", model.config.description);
        }
    }
    Ok(())
}

fn print_result_header() {
    println!(
        "{:<4} {:<12} {:<32} {:>8} {:>9} {:>7} {:>7} {:>8}",
        "", "KEY", "MODEL", "ACCURACY", "PRECISION", "RECALL", "F1", "TIME(s)"
    );
}

fn print_result(result: &ComparisonResult) {
    let m = &result.metrics;
    println!(
        "{:<4} {:<12} {:<32} {:>8.4} {:>9.4} {:>7.4} {:>7.4} {:>8.2}",
        if result.is_best { "*" } else { "" },
        result.model_key,
        result.model_name,
        m.accuracy,
        m.precision,
        m.recall,
        m.f1_score,
        m.training_time_secs
    );
}

async fn handle_train(config: &AppConfig, model_key: &str, dataset: &str) -> anyhow::Result<()> {
    let dataset_id = parse_dataset(dataset)?;
    let result = orchestrator(config)?
        .train_one(&ModelKey::from(model_key), dataset_id)
        .await?;

    print_result_header();
    print_result(&result);
    let [[tn, fp], [fn_, tp]] = result.metrics.confusion_matrix;
    println!();
    println!("Confusion matrix (rows = actual, cols = predicted):");
    println!("  not bullying  {tn:>6} {fp:>6}");
    println!("  bullying      {fn_:>6} {tp:>6}");
    Ok(())
}

async fn handle_train_all(config: &AppConfig, dataset: &str) -> anyhow::Result<()> {
    let dataset_id = parse_dataset(dataset)?;
    let leaderboard = orchestrator(config)?.train_all(dataset_id).await?;

    print_result_header();
    for result in &leaderboard.results {
        print_result(result);
    }
    if let Some(best) = &leaderboard.best_model {
        println!();
        println!(
            "Best model on dataset {}: {} (F1 {:.4})",
            dataset_id, best.model_name, best.metrics.f1_score
        );
    }
    Ok(())
}

async fn handle_predict(
    config: &AppConfig,
    text: &str,
    model: &str,
    dataset: &str,
) -> anyhow::Result<()> {
    let dataset_id = parse_dataset(dataset)?;
    let key = ModelKey::from(model);
    let orchestrator = orchestrator(config)?;

    // Trained models only live as long as the process.
    orchestrator.train_one(&key, dataset_id).await?;
    let prediction = orchestrator.predict(text, &key).await?;
    let verdict = &prediction.verdict;

    println!("Text:       {}", prediction.original_text);
    println!("Cleaned:    {}", verdict.text);
    println!("Model:      {}", verdict.model_name);
    println!("Prediction: {}", verdict.label);
    if let Some(confidence) = verdict.confidence {
        println!("Confidence: {:.1}%", confidence * 100.0);
    }
    Ok(())
}

fn handle_config(action: ConfigAction, config: &AppConfig, workspace: &Path) -> anyhow::Result<()> {
    match action {
        ConfigAction::Init => {
            let config_dir = workspace.join(".bullyguard");
            std::fs::create_dir_all(&config_dir)?;

            let config_path = config_dir.join("config.toml");
            if config_path.exists() {
                println!(
                    "Configuration file already exists at: {}",
                    config_path.display()
                );
                return Ok(());
            }

            let toml_str = toml::to_string_pretty(&AppConfig::default())?;
            std::fs::write(&config_path, &toml_str)?;
            println!(
                "Created default configuration at: {}",
                config_path.display()
            );
            Ok(())
        }
        ConfigAction::Show => {
            print!("{}", toml::to_string_pretty(config)?);
            Ok(())
        }
    }
}
