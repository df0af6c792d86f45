//! SQLite data loader.
//!
//! Reads the cleaned message table produced by the ETL step. The table has
//! a text column (`message`) and, starting at a fixed column position, one
//! numeric column per category. Everything before that position (ids,
//! original text, genre) is ignored.

use std::path::Path;

use log::{debug, info, warn};
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, TypeInfo, ValueRef};

use crate::dataset::{Dataset, Example};
use crate::error::{ReliefError, Result};

/// Where the messages and categories live in the database.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Table holding one row per message.
    pub table: String,
    /// Column holding the message text.
    pub text_column: String,
    /// Position of the first category column.
    pub category_start: usize,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        LoaderConfig {
            table: "disaster_data_cleaned".to_string(),
            text_column: "message".to_string(),
            category_start: 4,
        }
    }
}

impl LoaderConfig {
    /// Check that the table name is a plain SQL identifier.
    pub fn validate(&self) -> Result<()> {
        let identifier = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$")
            .map_err(|e| ReliefError::config(e.to_string()))?;
        if !identifier.is_match(&self.table) {
            return Err(ReliefError::config(format!(
                "invalid table name `{}`",
                self.table
            )));
        }
        if self.text_column.is_empty() {
            return Err(ReliefError::config("text column name is empty"));
        }
        Ok(())
    }
}

/// A label value decoded from a category cell.
#[derive(Clone, Copy, Debug, PartialEq)]
enum LabelValue {
    Integer(i64),
    Real(f64),
}

impl LabelValue {
    fn is_positive(self) -> bool {
        match self {
            LabelValue::Integer(v) => v != 0,
            LabelValue::Real(v) => v != 0.0,
        }
    }

    fn is_binary(self) -> bool {
        match self {
            LabelValue::Integer(v) => v == 0 || v == 1,
            LabelValue::Real(v) => v == 0.0 || v == 1.0,
        }
    }
}

/// Loads a [`Dataset`] from a SQLite database file.
#[derive(Clone, Debug, Default)]
pub struct SqliteLoader {
    config: LoaderConfig,
}

impl SqliteLoader {
    pub fn new(config: LoaderConfig) -> Self {
        SqliteLoader { config }
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Load every row of the configured table.
    pub async fn load<P: AsRef<Path>>(&self, path: P) -> Result<Dataset> {
        self.config.validate()?;
        let path = path.as_ref();
        if !path.is_file() {
            return Err(ReliefError::data_source(format!(
                "database file not found: {}",
                path.display()
            )));
        }

        let pool = open_pool(path).await?;
        let result = self.read_table(&pool).await;
        pool.close().await;
        result
    }

    /// Blocking variant of [`load`](Self::load) that drives its own runtime.
    ///
    /// Must not be called from within an async context.
    pub fn load_blocking<P: AsRef<Path>>(&self, path: P) -> Result<Dataset> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        runtime.block_on(self.load(path))
    }

    async fn read_table(&self, pool: &SqlitePool) -> Result<Dataset> {
        let table = &self.config.table;
        let columns = table_columns(pool, table).await?;
        if columns.is_empty() {
            return Err(ReliefError::data_source(format!("table `{table}` not found")));
        }

        let text_index = columns
            .iter()
            .position(|c| c == &self.config.text_column)
            .ok_or_else(|| {
                ReliefError::data_source(format!(
                    "table `{table}` has no column `{}`",
                    self.config.text_column
                ))
            })?;
        if text_index >= self.config.category_start {
            return Err(ReliefError::data_source(format!(
                "text column `{}` is at position {text_index}, inside the category columns",
                self.config.text_column
            )));
        }
        if columns.len() <= self.config.category_start {
            return Err(ReliefError::data_source(format!(
                "table `{table}` has {} columns, no category columns from position {}",
                columns.len(),
                self.config.category_start
            )));
        }

        let category_names = columns[self.config.category_start..].to_vec();
        debug!(
            "Reading table `{table}`: text column `{}`, {} categories",
            self.config.text_column,
            category_names.len()
        );

        let rows = sqlx::query(&format!("SELECT * FROM \"{table}\""))
            .fetch_all(pool)
            .await?;
        if rows.is_empty() {
            return Err(ReliefError::data_source(format!("table `{table}` is empty")));
        }

        let mut non_binary = 0usize;
        let mut examples = Vec::with_capacity(rows.len());
        for (row_index, row) in rows.iter().enumerate() {
            let text = read_text(row, text_index, row_index, &self.config.text_column)?;

            let mut labels = Vec::with_capacity(category_names.len());
            for (offset, name) in category_names.iter().enumerate() {
                let value = read_label(row, self.config.category_start + offset, row_index, name)?;
                if !value.is_binary() {
                    non_binary += 1;
                }
                labels.push(value.is_positive());
            }

            examples.push(Example::new(text, labels));
        }

        if non_binary > 0 {
            warn!("{non_binary} label value(s) were neither 0 nor 1 and were treated as positive");
        }
        info!(
            "Loaded {} messages with {} categories",
            examples.len(),
            category_names.len()
        );

        Dataset::new(category_names, examples)
    }
}

async fn open_pool(path: &Path) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .read_only(true)
        .create_if_missing(false);

    SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .map_err(|e| ReliefError::data_source(format!("failed to open {}: {e}", path.display())))
}

/// Column names of `table` in declaration order; empty if the table does not exist.
async fn table_columns(pool: &SqlitePool, table: &str) -> Result<Vec<String>> {
    let rows = sqlx::query(&format!("PRAGMA table_info(\"{table}\")"))
        .fetch_all(pool)
        .await?;

    rows.iter()
        .map(|row| row.try_get::<String, _>("name").map_err(ReliefError::from))
        .collect()
}

fn read_text(row: &SqliteRow, index: usize, row_index: usize, column: &str) -> Result<String> {
    let raw = row.try_get_raw(index)?;
    if raw.is_null() {
        return Err(ReliefError::invalid_input(format!(
            "row {row_index}: `{column}` is null"
        )));
    }
    let type_name = raw.type_info().name().to_ascii_uppercase();
    if type_name != "TEXT" {
        return Err(ReliefError::invalid_input(format!(
            "row {row_index}: `{column}` is {type_name}, expected text"
        )));
    }
    Ok(row.try_get_unchecked::<String, _>(index)?)
}

fn read_label(row: &SqliteRow, index: usize, row_index: usize, column: &str) -> Result<LabelValue> {
    let raw = row.try_get_raw(index)?;
    if raw.is_null() {
        return Err(ReliefError::invalid_input(format!(
            "row {row_index}: label `{column}` is null"
        )));
    }

    let type_name = raw.type_info().name().to_ascii_uppercase();
    match type_name.as_str() {
        "INTEGER" | "INT" | "BIGINT" | "BOOLEAN" => {
            Ok(LabelValue::Integer(row.try_get_unchecked::<i64, _>(index)?))
        }
        "REAL" | "NUMERIC" => Ok(LabelValue::Real(row.try_get_unchecked::<f64, _>(index)?)),
        "TEXT" => {
            let text = row.try_get_unchecked::<String, _>(index)?;
            text.trim()
                .parse::<f64>()
                .map(LabelValue::Real)
                .map_err(|_| {
                    ReliefError::data_source(format!(
                        "row {row_index}: label `{column}` has non-numeric value {text:?}"
                    ))
                })
        }
        other => Err(ReliefError::data_source(format!(
            "row {row_index}: label `{column}` has unsupported type {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn create_db(dir: &TempDir, statements: &[&str]) -> std::path::PathBuf {
        let path = dir.path().join("messages.db");
        let options = SqliteConnectOptions::new()
            .filename(&path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .unwrap();
        for statement in statements {
            sqlx::query(statement).execute(&pool).await.unwrap();
        }
        pool.close().await;
        path
    }

    const CREATE: &str = "CREATE TABLE disaster_data_cleaned \
        (id INTEGER, message TEXT, original TEXT, genre TEXT, related INTEGER, water INTEGER)";

    #[tokio::test]
    async fn test_load_rows() {
        let dir = TempDir::new().unwrap();
        let path = create_db(
            &dir,
            &[
                CREATE,
                "INSERT INTO disaster_data_cleaned VALUES (1, 'We need water', NULL, 'direct', 1, 1)",
                "INSERT INTO disaster_data_cleaned VALUES (2, 'Storm is over', NULL, 'news', 2, 0)",
                "INSERT INTO disaster_data_cleaned VALUES (3, 'hello', NULL, 'social', 0, 0)",
            ],
        )
        .await;

        let dataset = SqliteLoader::default().load(&path).await.unwrap();

        assert_eq!(dataset.category_names(), &["related", "water"]);
        assert_eq!(dataset.len(), 3);
        assert_eq!(dataset.examples()[0].text, "We need water");
        assert_eq!(dataset.examples()[0].labels, vec![true, true]);
        // Non-binary values count as positive.
        assert_eq!(dataset.examples()[1].labels, vec![true, false]);
        assert_eq!(dataset.examples()[2].labels, vec![false, false]);
    }

    #[tokio::test]
    async fn test_null_message_is_invalid_input() {
        let dir = TempDir::new().unwrap();
        let path = create_db(
            &dir,
            &[
                CREATE,
                "INSERT INTO disaster_data_cleaned VALUES (1, NULL, NULL, 'direct', 1, 1)",
            ],
        )
        .await;

        let result = SqliteLoader::default().load(&path).await;
        assert!(matches!(result, Err(ReliefError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_null_label_is_invalid_input() {
        let dir = TempDir::new().unwrap();
        let path = create_db(
            &dir,
            &[
                CREATE,
                "INSERT INTO disaster_data_cleaned VALUES (1, 'help', NULL, 'direct', NULL, 1)",
            ],
        )
        .await;

        let result = SqliteLoader::default().load(&path).await;
        assert!(matches!(result, Err(ReliefError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_missing_table_and_columns() {
        let dir = TempDir::new().unwrap();
        let path = create_db(&dir, &["CREATE TABLE other (message TEXT)"]).await;

        let result = SqliteLoader::default().load(&path).await;
        assert!(matches!(result, Err(ReliefError::DataSource(_))));

        let config = LoaderConfig {
            table: "other".to_string(),
            ..LoaderConfig::default()
        };
        let result = SqliteLoader::new(config).load(&path).await;
        match result {
            Err(ReliefError::DataSource(msg)) => assert!(msg.contains("no category columns")),
            other => panic!("expected data source error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_non_numeric_label_is_data_source_error() {
        let dir = TempDir::new().unwrap();
        let path = create_db(
            &dir,
            &[
                CREATE,
                "INSERT INTO disaster_data_cleaned VALUES (1, 'help', NULL, 'direct', 'yes', 1)",
            ],
        )
        .await;

        let result = SqliteLoader::default().load(&path).await;
        assert!(matches!(result, Err(ReliefError::DataSource(_))));
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let result = SqliteLoader::default().load_blocking(dir.path().join("absent.db"));
        assert!(matches!(result, Err(ReliefError::DataSource(_))));
    }

    #[test]
    fn test_table_name_validation() {
        let config = LoaderConfig {
            table: "messages; DROP TABLE x".to_string(),
            ..LoaderConfig::default()
        };
        assert!(matches!(config.validate(), Err(ReliefError::Config(_))));
        assert!(LoaderConfig::default().validate().is_ok());
    }
}
