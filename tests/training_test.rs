//! End-to-end training runs against a temporary SQLite database.

use std::path::{Path, PathBuf};

use relief::config::TrainingConfig;
use relief::error::ReliefError;
use relief::ml::cross_validation::KFold;
use relief::ml::grid_search::{GridAxis, ParamGrid};
use relief::ml::TrainedModel;
use relief::training::{SilentReporter, Trainer};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tempfile::TempDir;

const CATEGORIES: [&str; 4] = ["related", "water", "medical_help", "child_alone"];

fn message(i: usize) -> (String, [i64; 4]) {
    let water = i % 2 == 0;
    let medical = i % 20 == 0;
    let mut text = if water {
        format!("Please, we need drinking water in camp {}!", i % 9)
    } else {
        format!("The main road to town {} is blocked.", i % 9)
    };
    if medical {
        text.push_str(" Several people are injured and need a doctor.");
    }
    let related = if i % 10 == 3 { 2 } else { 1 };
    (text, [related, water as i64, medical as i64, 0])
}

async fn create_database(path: &Path, rows: usize) {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .unwrap();

    let columns = CATEGORIES
        .iter()
        .map(|c| format!("{c} INTEGER"))
        .collect::<Vec<_>>()
        .join(", ");
    sqlx::query(&format!(
        "CREATE TABLE disaster_data_cleaned (id INTEGER, message TEXT, original TEXT, genre TEXT, {columns})"
    ))
    .execute(&pool)
    .await
    .unwrap();

    for i in 0..rows {
        let (text, labels) = message(i);
        sqlx::query("INSERT INTO disaster_data_cleaned VALUES (?, ?, NULL, 'direct', ?, ?, ?, ?)")
            .bind(i as i64)
            .bind(text)
            .bind(labels[0])
            .bind(labels[1])
            .bind(labels[2])
            .bind(labels[3])
            .execute(&pool)
            .await
            .unwrap();
    }
    pool.close().await;
}

fn database(dir: &TempDir, rows: usize) -> PathBuf {
    let path = dir.path().join("DisasterResponse.db");
    tokio::runtime::Runtime::new()
        .unwrap()
        .block_on(create_database(&path, rows));
    path
}

fn config() -> TrainingConfig {
    TrainingConfig {
        grid: ParamGrid::new()
            .with_axis(GridAxis::MaxDepth(vec![Some(5), Some(10)]))
            .with_axis(GridAxis::NEstimators(vec![5])),
        cv: KFold::new(3),
        ..TrainingConfig::default()
    }
}

#[test]
fn test_train_evaluate_and_save() {
    let dir = TempDir::new().unwrap();
    let db = database(&dir, 100);
    let model_path = dir.path().join("classifier.rlf");

    let outcome = Trainer::new(config())
        .with_reporter(SilentReporter)
        .run(&db, &model_path)
        .unwrap();

    assert!(model_path.is_file());
    assert_eq!(outcome.model.category_names(), &CATEGORIES);
    assert_eq!(outcome.report.categories.len(), CATEGORIES.len());
    assert_eq!(outcome.model.metadata().n_test, 20);
    assert_eq!(outcome.model.metadata().cv_results.len(), 2);

    let child_alone = outcome.report.category("child_alone").unwrap();
    assert_eq!(child_alone.support(), 0);
    assert_eq!(child_alone.accuracy, 1.0);

    let related = outcome.report.category("related").unwrap();
    assert_eq!(related.support(), 20);
}

#[test]
fn test_saved_model_predicts_identically() {
    let dir = TempDir::new().unwrap();
    let db = database(&dir, 60);
    let model_path = dir.path().join("classifier.rlf");

    let outcome = Trainer::new(config())
        .with_reporter(SilentReporter)
        .run(&db, &model_path)
        .unwrap();
    let loaded = TrainedModel::load(&model_path).unwrap();

    let texts: Vec<String> = (0..60).map(|i| message(i).0).collect();
    assert_eq!(
        loaded.predict(&texts).unwrap(),
        outcome.model.predict(&texts).unwrap()
    );
    assert_eq!(loaded.metadata(), outcome.model.metadata());
    assert_eq!(loaded.best_params(), outcome.model.best_params());
    assert!(loaded
        .classify("we need drinking water")
        .unwrap()
        .contains(&"related".to_string()));
}

#[test]
fn test_same_seed_same_model() {
    let dir = TempDir::new().unwrap();
    let db = database(&dir, 60);

    let first = Trainer::new(config())
        .with_reporter(SilentReporter)
        .run(&db, dir.path().join("a.rlf"))
        .unwrap();
    let second = Trainer::new(TrainingConfig {
        parallel: true,
        ..config()
    })
    .with_reporter(SilentReporter)
    .run(&db, dir.path().join("b.rlf"))
    .unwrap();

    assert_eq!(first.report, second.report);
    assert_eq!(
        first.model.pipeline().vectorizer().vocabulary(),
        second.model.pipeline().vectorizer().vocabulary()
    );
    assert_eq!(
        first.model.pipeline().tfidf().idf(),
        second.model.pipeline().tfidf().idf()
    );
}

#[test]
fn test_wrong_table_aborts_without_artifact() {
    let dir = TempDir::new().unwrap();
    let db = database(&dir, 10);
    let model_path = dir.path().join("classifier.rlf");

    let mut config = config();
    config.loader.table = "messages".to_string();
    let result = Trainer::new(config)
        .with_reporter(SilentReporter)
        .run(&db, &model_path);

    assert!(matches!(result, Err(ReliefError::DataSource(_))));
    assert!(!model_path.exists());
}
