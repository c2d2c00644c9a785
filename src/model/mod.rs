use std::collections::{BTreeMap, BTreeSet};

use log::{debug, info};

use crate::{
    error::{Error, Result},
    prediction_tree::{NodeId, PredictionTree},
};

mod predict;

pub use predict::{NoProgress, Parallelism, PredictionParameters, ProgressObserver};

/// A compact prediction tree model.
///
/// Holds the prediction tree over all training sequences together with the alphabet,
/// the inverted index from symbols to the sequences containing them,
/// and the lookup table from sequence ids to the tree node where each sequence ends.
#[derive(Debug, Clone)]
pub struct CompactPredictionTree<Symbol> {
    alphabet: BTreeSet<Symbol>,
    prediction_tree: PredictionTree<Symbol>,
    inverted_index: BTreeMap<Symbol, BTreeSet<usize>>,
    lookup_table: Vec<NodeId>,
    trained: bool,
}

impl<Symbol: Ord + Clone> CompactPredictionTree<Symbol> {
    /// Create an untrained model.
    pub fn new() -> Self {
        Self {
            alphabet: Default::default(),
            prediction_tree: PredictionTree::new(),
            inverted_index: Default::default(),
            lookup_table: Default::default(),
            trained: false,
        }
    }

    pub fn from_sequences<SequenceType: AsRef<[Symbol]>>(
        sequences: impl IntoIterator<Item = SequenceType>,
    ) -> Self {
        let mut result = Self::new();
        result.insert_sequences(sequences);
        result
    }

    /// Train the model on the given sequences.
    ///
    /// The id of each sequence is its position in `sequences`.
    /// A model can be trained only once.
    pub fn train<SequenceType: AsRef<[Symbol]>>(
        &mut self,
        sequences: impl IntoIterator<Item = SequenceType>,
    ) -> Result<()> {
        if self.trained {
            return Err(Error::AlreadyTrained);
        }

        self.insert_sequences(sequences);
        Ok(())
    }

    fn insert_sequences<SequenceType: AsRef<[Symbol]>>(
        &mut self,
        sequences: impl IntoIterator<Item = SequenceType>,
    ) {
        debug_assert!(!self.trained);
        self.trained = true;

        for (sequence_id, sequence) in sequences.into_iter().enumerate() {
            let mut cursor = self.prediction_tree.root();

            for symbol in sequence.as_ref() {
                cursor = self.prediction_tree.add_child(cursor, symbol.clone());

                if let Some(sequence_ids) = self.inverted_index.get_mut(symbol) {
                    sequence_ids.insert(sequence_id);
                } else {
                    self.inverted_index
                        .insert(symbol.clone(), BTreeSet::from([sequence_id]));
                }

                if !self.alphabet.contains(symbol) {
                    self.alphabet.insert(symbol.clone());
                }
            }

            debug_assert_eq!(self.lookup_table.len(), sequence_id);
            self.lookup_table.push(cursor);
        }

        info!(
            "Trained on {} sequences with an alphabet of {} symbols",
            self.lookup_table.len(),
            self.alphabet.len()
        );
        debug!("The prediction tree has {} nodes", self.prediction_tree.len());
    }

    pub fn is_trained(&self) -> bool {
        self.trained
    }

    /// The amount of sequences the model was trained on.
    pub fn sequence_count(&self) -> usize {
        self.lookup_table.len()
    }

    pub fn alphabet(&self) -> &BTreeSet<Symbol> {
        &self.alphabet
    }

    pub fn prediction_tree(&self) -> &PredictionTree<Symbol> {
        &self.prediction_tree
    }

    /// The ids of all training sequences that contain `symbol`, or `None` if `symbol` was never seen.
    pub fn index_lookup(&self, symbol: &Symbol) -> Option<&BTreeSet<usize>> {
        self.inverted_index.get(symbol)
    }

    /// The tree node at which the training sequence with the given id ends.
    pub fn table_lookup(&self, sequence_id: usize) -> Option<NodeId> {
        self.lookup_table.get(sequence_id).copied()
    }

    /// Reconstruct the training sequence with the given id from the prediction tree.
    pub fn reconstruct_sequence(&self, sequence_id: usize) -> Result<Vec<Symbol>> {
        let node = self
            .table_lookup(sequence_id)
            .ok_or(Error::UnknownSequenceId(sequence_id))?;
        Ok(self.prediction_tree.sequence_to(node))
    }
}

impl<Symbol: Ord + Clone> Default for CompactPredictionTree<Symbol> {
    fn default() -> Self {
        Self::new()
    }
}
