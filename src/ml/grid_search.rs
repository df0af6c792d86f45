//! Exhaustive hyperparameter search with k-fold cross-validation.
//!
//! Every candidate of a [`ParamGrid`] is scored by fitting a fresh pipeline
//! on each fold's training rows (so the vocabulary and IDF weights are
//! refit per fold) and scoring the fold's held-out rows. The candidate with
//! the highest mean score wins, the earliest one on ties, and is refit once
//! on all rows.

use log::{debug, info};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{ReliefError, Result};
use crate::ml::cross_validation::{Fold, KFold};
use crate::ml::forest::{ForestParams, MaxFeatures};
use crate::ml::metrics::Scoring;
use crate::ml::multi_output::LabelMatrix;
use crate::ml::pipeline::{FittedPipeline, PipelineSpec, TextClassificationPipeline};

/// One searched hyperparameter and its values.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GridAxis {
    MaxDepth(Vec<Option<usize>>),
    MaxFeatures(Vec<MaxFeatures>),
    NEstimators(Vec<usize>),
    MinSamplesSplit(Vec<usize>),
    MinSamplesLeaf(Vec<usize>),
}

impl GridAxis {
    pub fn name(&self) -> &'static str {
        match self {
            GridAxis::MaxDepth(_) => "max_depth",
            GridAxis::MaxFeatures(_) => "max_features",
            GridAxis::NEstimators(_) => "n_estimators",
            GridAxis::MinSamplesSplit(_) => "min_samples_split",
            GridAxis::MinSamplesLeaf(_) => "min_samples_leaf",
        }
    }

    pub fn len(&self) -> usize {
        match self {
            GridAxis::MaxDepth(values) => values.len(),
            GridAxis::MaxFeatures(values) => values.len(),
            GridAxis::NEstimators(values) => values.len(),
            GridAxis::MinSamplesSplit(values) => values.len(),
            GridAxis::MinSamplesLeaf(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Set this axis' `index`-th value on `params`.
    fn apply(&self, params: &mut ForestParams, index: usize) {
        match self {
            GridAxis::MaxDepth(values) => params.max_depth = values[index],
            GridAxis::MaxFeatures(values) => params.max_features = values[index],
            GridAxis::NEstimators(values) => params.n_estimators = values[index],
            GridAxis::MinSamplesSplit(values) => params.min_samples_split = values[index],
            GridAxis::MinSamplesLeaf(values) => params.min_samples_leaf = values[index],
        }
    }
}

/// Ordered list of axes; candidates are their Cartesian product.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParamGrid {
    axes: Vec<GridAxis>,
}

impl Default for ParamGrid {
    fn default() -> Self {
        ParamGrid::new()
            .with_axis(GridAxis::MaxDepth(vec![Some(5), Some(10)]))
            .with_axis(GridAxis::MaxFeatures(vec![
                MaxFeatures::Fixed(5),
                MaxFeatures::Fixed(10),
            ]))
    }
}

impl ParamGrid {
    /// A grid with no axes; its only candidate is the base parameters.
    pub fn new() -> Self {
        ParamGrid { axes: Vec::new() }
    }

    pub fn with_axis(mut self, axis: GridAxis) -> Self {
        self.axes.push(axis);
        self
    }

    pub fn axes(&self) -> &[GridAxis] {
        &self.axes
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(axis) = self.axes.iter().find(|axis| axis.is_empty()) {
            return Err(ReliefError::config(format!(
                "grid axis `{}` has no values",
                axis.name()
            )));
        }
        Ok(())
    }

    /// All parameter combinations over `base`, the last axis varying fastest.
    pub fn candidates(&self, base: &ForestParams) -> Result<Vec<ForestParams>> {
        self.validate()?;
        let mut candidates = vec![*base];
        for axis in &self.axes {
            let mut expanded = Vec::with_capacity(candidates.len() * axis.len());
            for candidate in &candidates {
                for index in 0..axis.len() {
                    let mut params = *candidate;
                    axis.apply(&mut params, index);
                    expanded.push(params);
                }
            }
            candidates = expanded;
        }
        for params in &candidates {
            params.validate()?;
        }
        Ok(candidates)
    }
}

/// Cross-validation outcome of one candidate.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CandidateResult {
    pub params: ForestParams,
    pub fold_scores: Vec<f64>,
    pub mean_score: f64,
    pub std_score: f64,
}

impl CandidateResult {
    fn new(params: ForestParams, fold_scores: Vec<f64>) -> Self {
        let n = fold_scores.len() as f64;
        let mean_score = fold_scores.iter().sum::<f64>() / n;
        let variance = fold_scores
            .iter()
            .map(|s| (s - mean_score).powi(2))
            .sum::<f64>()
            / n;
        CandidateResult {
            params,
            fold_scores,
            mean_score,
            std_score: variance.sqrt(),
        }
    }
}

/// Result of [`GridSearch::fit`].
#[derive(Clone, Debug)]
pub struct SearchResults {
    pub best_params: ForestParams,
    pub best_index: usize,
    pub best_score: f64,
    pub candidates: Vec<CandidateResult>,
    /// Pipeline refit on every row with `best_params`.
    pub best_pipeline: FittedPipeline,
}

/// Cross-validated grid search over forest parameters.
#[derive(Clone, Debug)]
pub struct GridSearch {
    spec: PipelineSpec,
    grid: ParamGrid,
    cv: KFold,
    scoring: Scoring,
    parallel: bool,
    category_names: Vec<String>,
}

impl GridSearch {
    pub fn new(spec: PipelineSpec, grid: ParamGrid) -> Self {
        GridSearch {
            spec,
            grid,
            cv: KFold::default(),
            scoring: Scoring::default(),
            parallel: false,
            category_names: Vec::new(),
        }
    }

    pub fn with_cv(mut self, cv: KFold) -> Self {
        self.cv = cv;
        self
    }

    pub fn with_scoring(mut self, scoring: Scoring) -> Self {
        self.scoring = scoring;
        self
    }

    /// Evaluate candidate folds on the rayon pool.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_category_names(mut self, names: Vec<String>) -> Self {
        self.category_names = names;
        self
    }

    pub fn fit(&self, texts: &[String], labels: &LabelMatrix) -> Result<SearchResults> {
        if texts.len() != labels.n_rows() {
            return Err(ReliefError::fit(format!(
                "{} messages but {} label rows",
                texts.len(),
                labels.n_rows()
            )));
        }
        let candidates = self.grid.candidates(&self.spec.forest)?;
        let folds = self.cv.split(texts.len())?;
        info!(
            "Fitting {} folds for each of {} candidates, totalling {} fits",
            folds.len(),
            candidates.len(),
            folds.len() * candidates.len()
        );

        let trials: Vec<(usize, usize)> = (0..candidates.len())
            .flat_map(|c| (0..folds.len()).map(move |f| (c, f)))
            .collect();
        let run = |&(c, f): &(usize, usize)| {
            self.score_fold(&candidates[c], &folds[f], texts, labels)
                .inspect(|score| {
                    debug!(
                        "[CV {}/{}] fold {}/{}: {}={score:.4}",
                        c + 1,
                        candidates.len(),
                        f + 1,
                        folds.len(),
                        self.scoring
                    )
                })
        };
        let scores = if self.parallel {
            trials.par_iter().map(run).collect::<Result<Vec<f64>>>()?
        } else {
            trials.iter().map(run).collect::<Result<Vec<f64>>>()?
        };

        let results: Vec<CandidateResult> = candidates
            .iter()
            .zip(scores.chunks(folds.len()))
            .map(|(params, fold_scores)| CandidateResult::new(*params, fold_scores.to_vec()))
            .collect();
        for (c, result) in results.iter().enumerate() {
            info!(
                "[CV {}/{}] {}; {}={:.4} (+/- {:.4})",
                c + 1,
                results.len(),
                result.params,
                self.scoring,
                result.mean_score,
                result.std_score
            );
        }

        let mut best_index = 0;
        for (c, result) in results.iter().enumerate().skip(1) {
            if result.mean_score > results[best_index].mean_score {
                best_index = c;
            }
        }
        let best_params = results[best_index].params;
        let best_score = results[best_index].mean_score;
        info!("Best parameters: {best_params} ({}={best_score:.4})", self.scoring);

        let best_pipeline = TextClassificationPipeline::new(self.spec.with_forest(best_params))?
            .with_category_names(self.category_names.clone())
            .with_parallel(self.parallel)
            .fit(texts, labels)?;

        Ok(SearchResults {
            best_params,
            best_index,
            best_score,
            candidates: results,
            best_pipeline,
        })
    }

    fn score_fold(
        &self,
        params: &ForestParams,
        fold: &Fold,
        texts: &[String],
        labels: &LabelMatrix,
    ) -> Result<f64> {
        let train_texts: Vec<String> = fold.train.iter().map(|&i| texts[i].clone()).collect();
        let test_texts: Vec<String> = fold.test.iter().map(|&i| texts[i].clone()).collect();
        let train_labels = labels.select_rows(&fold.train);
        let test_labels = labels.select_rows(&fold.test);

        let fitted = TextClassificationPipeline::new(self.spec.with_forest(*params))?
            .with_quiet(true)
            .fit(&train_texts, &train_labels)?;
        let predicted = fitted.predict(&test_texts)?;
        self.scoring.score(&test_labels, &predicted)
    }
}
