//! Next-item prediction for sequences of discrete symbols with a compact prediction tree.
//!
//! A [`CompactPredictionTree`] is trained once on a corpus of sequences.
//! It then predicts the most likely next symbols for query sequences by
//! looking at training sequences that contain the query's context.

pub mod error;
pub mod model;
pub mod prediction_tree;
pub mod sequence_io;

pub use error::{Error, Result};
pub use model::{
    CompactPredictionTree, NoProgress, Parallelism, PredictionParameters, ProgressObserver,
};
