use std::collections::{BTreeMap, BTreeSet};

use log::{debug, info, trace};
use rayon::{prelude::*, ThreadPoolBuilder};

use crate::error::{Error, Result};

use super::CompactPredictionTree;

/// Scales the influence of the distance between the context and a scored symbol.
const DISTANCE_WEIGHT: f64 = 0.001;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PredictionParameters {
    /// The amount of trailing symbols of a query used to find similar sequences (`k`).
    pub context_length: usize,
    /// The maximum amount of predicted symbols per query (`n`).
    pub prediction_count: usize,
    pub parallelism: Parallelism,
}

/// Parallelism strategy for batch prediction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Parallelism {
    /// Predict all queries on the calling thread.
    #[default]
    Sequential,
    /// Predict queries on a thread pool with up to `n` threads.
    ///
    /// If `n <= 1`, this is equivalent to `Sequential`.
    Parallel(usize),
}

/// Receives a notification whenever a query of a batch prediction has been predicted.
///
/// With [`Parallelism::Parallel`], notifications arrive from multiple threads in no particular order.
pub trait ProgressObserver: Sync {
    fn query_predicted(&self);
}

/// A [`ProgressObserver`] that ignores all notifications.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {
    fn query_predicted(&self) {}
}

impl<Function: Fn() + Sync> ProgressObserver for Function {
    fn query_predicted(&self) {
        self()
    }
}

impl PredictionParameters {
    pub fn new(context_length: usize, prediction_count: usize) -> Self {
        Self {
            context_length,
            prediction_count,
            parallelism: Parallelism::default(),
        }
    }

    pub fn with_parallelism(mut self, parallelism: Parallelism) -> Self {
        self.parallelism = parallelism;
        self
    }

    fn validate(&self) -> Result<()> {
        if self.context_length == 0 {
            return Err(Error::ContextLengthZero);
        }
        if self.prediction_count == 0 {
            return Err(Error::PredictionCountZero);
        }

        Ok(())
    }
}

impl Parallelism {
    /// Choose the parallelism for the given amount of threads.
    /// Zero threads means one thread per core, as chosen by rayon, and one thread means sequential prediction.
    pub fn from_threads(n_threads: usize) -> Self {
        match n_threads {
            0 => Self::Parallel(rayon::current_num_threads()),
            1 => Self::Sequential,
            n => Self::Parallel(n),
        }
    }

    pub fn allows_parallel(self) -> bool {
        matches!(self, Self::Parallel(n) if n > 1)
    }

    pub fn n_threads(self) -> usize {
        match self {
            Self::Sequential => 1,
            Self::Parallel(n) => n.max(1),
        }
    }
}

impl<Symbol: Ord + Clone + Send + Sync> CompactPredictionTree<Symbol> {
    /// Predict up to `n` next symbols for each query, most likely first.
    ///
    /// The output contains one prediction per query, in the order of the queries.
    pub fn predict<QueryType: AsRef<[Symbol]> + Sync>(
        &self,
        queries: &[QueryType],
        parameters: &PredictionParameters,
    ) -> Result<Vec<Vec<Symbol>>> {
        self.predict_with_progress(queries, parameters, &NoProgress)
    }

    /// Like [`predict`](Self::predict), but notifies `progress` after each query.
    pub fn predict_with_progress<QueryType: AsRef<[Symbol]> + Sync>(
        &self,
        queries: &[QueryType],
        parameters: &PredictionParameters,
        progress: &impl ProgressObserver,
    ) -> Result<Vec<Vec<Symbol>>> {
        parameters.validate()?;
        info!(
            "Predicting {} queries with k = {} and n = {} against {} training sequences",
            queries.len(),
            parameters.context_length,
            parameters.prediction_count,
            self.sequence_count(),
        );

        let predict_query = |query: &QueryType| {
            let prediction = self.predict_context(
                context(query.as_ref(), parameters.context_length),
                parameters.prediction_count,
            );
            progress.query_predicted();
            prediction
        };

        let predictions: Vec<Vec<Symbol>> = if parameters.parallelism.allows_parallel() {
            let pool = ThreadPoolBuilder::new()
                .num_threads(parameters.parallelism.n_threads())
                .build()?;
            pool.install(|| {
                queries
                    .par_iter()
                    .map(predict_query)
                    .collect::<Result<_>>()
            })?
        } else {
            queries
                .iter()
                .map(predict_query)
                .collect::<Result<_>>()?
        };

        debug!(
            "Predicted {} symbols in total",
            predictions.iter().map(Vec::len).sum::<usize>()
        );
        Ok(predictions)
    }

    /// Predict up to `n` next symbols for a single query, most likely first.
    pub fn predict_sequence(
        &self,
        query: &[Symbol],
        parameters: &PredictionParameters,
    ) -> Result<Vec<Symbol>> {
        parameters.validate()?;
        self.predict_context(
            context(query, parameters.context_length),
            parameters.prediction_count,
        )
    }

    fn predict_context(&self, context: &[Symbol], prediction_count: usize) -> Result<Vec<Symbol>> {
        let score_table = self.score_context(context)?;
        trace!(
            "Scored {} symbols for a context of length {}",
            score_table.len(),
            context.len()
        );
        Ok(score_table.into_ranking(prediction_count))
    }

    /// Score all symbols that follow the last occurrence of the last context symbol in the similar sequences.
    fn score_context(&self, context: &[Symbol]) -> Result<ScoreTable<Symbol>> {
        let mut score_table = ScoreTable::default();
        let Some(last_symbol) = context.last() else {
            return Ok(score_table);
        };

        let similar_sequences = self.similar_sequences(context)?;
        let similar_sequence_count = similar_sequences.len();

        for sequence in &similar_sequences {
            let Some(offset) = sequence.iter().rposition(|symbol| symbol == last_symbol) else {
                continue;
            };

            for (distance, symbol) in (1..).zip(&sequence[offset + 1..]) {
                if context.contains(symbol) {
                    continue;
                }

                score_table.score(symbol, score_increment(similar_sequence_count, distance));
            }
        }

        Ok(score_table)
    }

    /// Reconstruct all training sequences that contain every known symbol of the context, ordered by sequence id.
    ///
    /// Symbols that never occurred during training do not restrict the result.
    fn similar_sequences(&self, context: &[Symbol]) -> Result<Vec<Vec<Symbol>>> {
        let mut candidates: Option<BTreeSet<usize>> = None;

        for symbol in context {
            if let Some(sequence_ids) = self.index_lookup(symbol) {
                candidates = Some(match candidates {
                    Some(candidates) => candidates.intersection(sequence_ids).copied().collect(),
                    None => sequence_ids.clone(),
                });
            }
        }

        let candidates = candidates.unwrap_or_else(|| (0..self.sequence_count()).collect());
        candidates
            .into_iter()
            .map(|sequence_id| self.reconstruct_sequence(sequence_id))
            .collect()
    }
}

/// The last `context_length` symbols of `query`.
fn context<Symbol>(query: &[Symbol], context_length: usize) -> &[Symbol] {
    &query[query.len().saturating_sub(context_length)..]
}

fn score_increment(similar_sequence_count: usize, distance: usize) -> f64 {
    1.0 + 1.0 / similar_sequence_count as f64 + (1.0 / distance as f64) * DISTANCE_WEIGHT
}

/// Multiplicatively accumulated scores, kept in the order in which symbols were first scored.
#[derive(Debug)]
struct ScoreTable<Symbol> {
    scores: Vec<(Symbol, f64)>,
    positions: BTreeMap<Symbol, usize>,
}

impl<Symbol: Ord + Clone> ScoreTable<Symbol> {
    fn score(&mut self, symbol: &Symbol, increment: f64) {
        if let Some(&position) = self.positions.get(symbol) {
            self.scores[position].1 *= increment;
        } else {
            self.positions.insert(symbol.clone(), self.scores.len());
            self.scores.push((symbol.clone(), increment));
        }
    }

    #[cfg(test)]
    fn get(&self, symbol: &Symbol) -> Option<f64> {
        self.positions
            .get(symbol)
            .map(|&position| self.scores[position].1)
    }

    fn len(&self) -> usize {
        self.scores.len()
    }

    /// The `n` highest scored symbols, highest first.
    /// Equal scores keep the order in which their symbols were first scored.
    fn into_ranking(mut self, n: usize) -> Vec<Symbol> {
        self.scores.sort_by(|(_, a), (_, b)| b.total_cmp(a));
        self.scores
            .into_iter()
            .take(n)
            .map(|(symbol, _)| symbol)
            .collect()
    }
}

impl<Symbol> Default for ScoreTable<Symbol> {
    fn default() -> Self {
        Self {
            scores: Default::default(),
            positions: Default::default(),
        }
    }
}
