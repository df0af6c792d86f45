//! Model artifact round trips through the filesystem.

use std::fs;

use relief::config::TrainingConfig;
use relief::dataset::{Dataset, Example};
use relief::error::{ReliefError, Result};
use relief::ml::cross_validation::KFold;
use relief::ml::grid_search::{GridAxis, ParamGrid};
use relief::ml::persistence::{FORMAT_VERSION, MAGIC};
use relief::ml::TrainedModel;
use relief::training::{SilentReporter, Trainer};
use tempfile::TempDir;

fn texts() -> Vec<String> {
    (0..40)
        .map(|i| match i % 4 {
            0 => format!("Earthquake destroyed houses in district {i}"),
            1 => format!("We need tents and blankets {i}"),
            2 => format!("Houses collapsed, families need tents {i}"),
            _ => format!("Thank you for the update {i}"),
        })
        .collect()
}

fn trained_model() -> Result<TrainedModel> {
    let examples = texts()
        .into_iter()
        .enumerate()
        .map(|(i, text)| Example::new(text, vec![i % 4 == 0 || i % 4 == 2, i % 4 == 1 || i % 4 == 2]))
        .collect();
    let dataset = Dataset::new(vec!["earthquake".into(), "shelter".into()], examples)?;

    let config = TrainingConfig {
        grid: ParamGrid::new().with_axis(GridAxis::NEstimators(vec![4])),
        cv: KFold::new(2),
        ..TrainingConfig::default()
    };
    let (model, _) = Trainer::new(config)
        .with_reporter(SilentReporter)
        .train(&dataset)?;
    Ok(model)
}

#[test]
fn test_round_trip_preserves_predictions() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("model.rlf");
    let model = trained_model()?;

    model.save(&path)?;
    let loaded = TrainedModel::load(&path)?;

    assert_eq!(loaded.predict(&texts())?, model.predict(&texts())?);
    assert_eq!(loaded.category_names(), model.category_names());
    assert_eq!(
        loaded.pipeline().vectorizer().vocabulary(),
        model.pipeline().vectorizer().vocabulary()
    );
    assert_eq!(loaded.pipeline().tfidf().idf(), model.pipeline().tfidf().idf());
    assert_eq!(loaded.pipeline().stage_names(), model.pipeline().stage_names());

    Ok(())
}

#[test]
fn test_artifact_header() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("model.rlf");
    trained_model()?.save(&path)?;

    let bytes = fs::read(&path)?;
    assert_eq!(bytes[..4], MAGIC);
    assert_eq!(u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]), FORMAT_VERSION);

    Ok(())
}

#[test]
fn test_corrupted_artifact_is_rejected() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("model.rlf");
    trained_model()?.save(&path)?;

    let mut bytes = fs::read(&path)?;
    let middle = bytes.len() / 2;
    bytes[middle] ^= 0x5a;
    fs::write(&path, &bytes)?;

    match TrainedModel::load(&path) {
        Err(ReliefError::Persistence(msg)) => assert!(msg.contains("checksum")),
        other => panic!("expected persistence error, got {other:?}"),
    }

    fs::write(&path, b"not a model")?;
    assert!(matches!(
        TrainedModel::load(&path),
        Err(ReliefError::Persistence(_))
    ));

    Ok(())
}

#[test]
fn test_overwrite_existing_artifact() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("model.rlf");
    fs::write(&path, b"stale")?;

    let model = trained_model()?;
    model.save(&path)?;
    assert_eq!(TrainedModel::load(&path)?.metadata().id, model.metadata().id);

    Ok(())
}
