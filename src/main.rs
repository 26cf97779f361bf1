use anyhow::Context;
use polars::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::env;

use symstack::config::ConfigManager;
use symstack::data::FeatureMatrix;
use symstack::engines::archive::{Archive, ArchiveEntry};
use symstack::engines::evaluation::ModelEvaluator;
use symstack::engines::rendering;
use symstack::functions::Op;
use symstack::types::{Output, OutputMode, Program};

/// Demo runner standing in for the external collaborators: it loads (or
/// synthesizes) a feature table, plays the search engine's role of scoring a
/// few hand-built candidate models, and prints the archive report.
fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let config = ConfigManager::new();
    if let Some(config_path) = args.get(2) {
        config
            .load_from_file(config_path)
            .with_context(|| format!("loading config from {}", config_path))?;
    }

    let features = match args.get(1) {
        Some(path) => {
            let df = CsvReadOptions::default()
                .with_has_header(true)
                .try_into_reader_with_file_path(Some(path.into()))
                .with_context(|| format!("opening {}", path))?
                .finish()
                .with_context(|| format!("reading {}", path))?;
            println!("Loaded {} rows from {}", df.height(), path);
            FeatureMatrix::from_dataframe(&df)?
        }
        None => synthetic_features(256, 42),
    };

    // Target the candidates are scored against: sin(x_0) + x_1^2
    let target: Vec<f64> = features
        .column(0)?
        .iter()
        .zip(features.column(1)?)
        .map(|(a, b)| a.sin() + b * b)
        .collect();
    let split = features.n_rows() * 3 / 4;

    let candidates = vec![
        Program::new(vec![Op::Var(0), Op::Sin, Op::Var(1), Op::Square, Op::Add]),
        Program::new(vec![Op::Var(0), Op::Var(1), Op::Add]),
        Program::new(vec![Op::Var(1), Op::Square]),
        Program::new(vec![Op::Var(0), Op::Const(0.5), Op::Mul]),
    ];

    let evaluator = ModelEvaluator::with_lags(config.get().lags);
    let mut entries = Vec::new();
    for program in candidates {
        let output = evaluator.evaluate(&program, &features)?;
        let predictions = match output {
            Output::Column(column) => column,
            Output::Matrix(_) => anyhow::bail!("demo candidates are single-output"),
        };
        let train = mse(&predictions[..split], &target[..split]);
        let validation = mse(&predictions[split..], &target[split..]);
        entries.push(ArchiveEntry::new(program, train, validation));
    }

    let archive = Archive::from_entries(entries);
    println!("\n{}", archive.report()?);

    let best = archive.best()?;
    println!(
        "best model: {} (validation {:.6})",
        rendering::render_for_report(&best.program)?,
        best.validation_fitness
    );

    // The same engine also runs recurrent models: y[i] = 0.9*y[i-1] + x_0[i]
    let ar = Program::with_mode(
        vec![
            Op::Recur(1),
            Op::Const(0.9),
            Op::Mul,
            Op::Var(0),
            Op::Add,
        ],
        OutputMode::Autoregressive,
    );
    let ar_output = evaluator.evaluate(&ar, &features)?;
    if let Output::Column(y) = ar_output {
        println!(
            "\nautoregressive demo {} -> first outputs {:?}",
            rendering::render(&ar)?,
            &y[..y.len().min(5)]
        );
    }

    Ok(())
}

fn synthetic_features(rows: usize, seed: u64) -> FeatureMatrix {
    let mut rng = StdRng::seed_from_u64(seed);
    let x0: Vec<f64> = (0..rows).map(|i| i as f64 * 0.05).collect();
    let x1: Vec<f64> = (0..rows).map(|_| rng.gen_range(-1.0..1.0)).collect();
    FeatureMatrix::from_columns(vec!["x_0".to_string(), "x_1".to_string()], vec![x0, x1])
        .expect("columns share a length")
}

fn mse(predictions: &[f64], target: &[f64]) -> f64 {
    if predictions.is_empty() {
        return f64::MAX;
    }
    predictions
        .iter()
        .zip(target)
        .map(|(p, t)| (p - t) * (p - t))
        .sum::<f64>()
        / predictions.len() as f64
}
