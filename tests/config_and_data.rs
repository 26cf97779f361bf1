use polars::prelude::*;
use symstack::config::{ConfigManager, ConfigSection, LagConfig};
use symstack::data::FeatureMatrix;

#[test]
fn test_lag_config_validation() {
    assert!(LagConfig::default().validate().is_ok());
    let bad = LagConfig {
        output_lag: 0,
        ..LagConfig::default()
    };
    assert!(bad.validate().is_err());
}

#[test]
fn test_config_round_trips_through_toml() {
    let manager = ConfigManager::new();
    manager
        .update(|config| {
            config.lags.input_lag = 3;
            config.lags.input_delay = 1;
        })
        .unwrap();

    let path = std::env::temp_dir().join(format!("symstack_config_{}.toml", std::process::id()));
    manager.save_to_file(&path).unwrap();

    let loaded = ConfigManager::new();
    loaded.load_from_file(&path).unwrap();
    assert_eq!(loaded.get().lags, manager.get().lags);

    let _ = std::fs::remove_file(&path);
}

#[test]
fn test_load_rejects_invalid_file() {
    let path = std::env::temp_dir().join(format!("symstack_bad_{}.toml", std::process::id()));
    std::fs::write(&path, "[lags]\ninput_lag = 1\ninput_delay = 0\noutput_lag = 0\noutput_delay = 0\n")
        .unwrap();
    let manager = ConfigManager::new();
    assert!(manager.load_from_file(&path).is_err());
    let _ = std::fs::remove_file(&path);
}

#[test]
fn test_matrix_from_dataframe() {
    let df = df! {
        "open" => [1.0f64, 2.0, 3.0],
        "volume" => [10i64, 20, 30],
    }
    .unwrap();
    let matrix = FeatureMatrix::from_dataframe(&df).unwrap();
    assert_eq!(matrix.n_rows(), 3);
    assert_eq!(matrix.n_columns(), 2);
    assert_eq!(matrix.names(), &["open".to_string(), "volume".to_string()]);
    assert_eq!(matrix.column(1).unwrap(), &[10.0, 20.0, 30.0]);
}

#[test]
fn test_matrix_nulls_become_nan() {
    let df = df! {
        "v" => [Some(1.0f64), None, Some(3.0)],
    }
    .unwrap();
    let matrix = FeatureMatrix::from_dataframe(&df).unwrap();
    assert_eq!(matrix.value(0, 0).unwrap(), 1.0);
    assert!(matrix.value(1, 0).unwrap().is_nan());
}

#[test]
fn test_matrix_shape_errors() {
    assert!(FeatureMatrix::from_rows(vec![vec![1.0], vec![2.0, 3.0]]).is_err());
    assert!(FeatureMatrix::from_columns(vec!["only".to_string()], vec![]).is_err());
}
