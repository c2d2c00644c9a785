use std::collections::BTreeMap;

/// A handle to a node of a [`PredictionTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

/// A shared-prefix tree over sequences of symbols.
///
/// Nodes live in an arena and refer to each other by [`NodeId`].
/// Children are owned by their parent, while the parent handle of a node is only used to walk back to the root.
#[derive(Debug, Clone)]
pub struct PredictionTree<Symbol> {
    nodes: Vec<PredictionTreeNode<Symbol>>,
}

#[derive(Debug, Clone)]
struct PredictionTreeNode<Symbol> {
    /// `None` only for the root.
    symbol: Option<Symbol>,
    parent: Option<NodeId>,
    children: BTreeMap<Symbol, NodeId>,
}

impl<Symbol: Ord + Clone> PredictionTree<Symbol> {
    pub fn new() -> Self {
        Self {
            nodes: vec![PredictionTreeNode {
                symbol: None,
                parent: None,
                children: Default::default(),
            }],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// The amount of nodes in the tree, including the root.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the tree contains only the root.
    /// The root is counted by [`len`](Self::len), so an empty tree has a length of one.
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    pub fn symbol(&self, node: NodeId) -> Option<&Symbol> {
        self.nodes[node.0].symbol.as_ref()
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.0].parent
    }

    pub fn has_child(&self, node: NodeId, symbol: &Symbol) -> bool {
        self.nodes[node.0].children.contains_key(symbol)
    }

    pub fn child(&self, node: NodeId, symbol: &Symbol) -> Option<NodeId> {
        self.nodes[node.0].children.get(symbol).copied()
    }

    pub fn children(&self, node: NodeId) -> impl Iterator<Item = (&Symbol, NodeId)> {
        self.nodes[node.0]
            .children
            .iter()
            .map(|(symbol, child)| (symbol, *child))
    }

    /// Attach a new child for `symbol` to `node` and return it.
    ///
    /// If `node` already has a child for `symbol`, that child is returned instead, such that each node has at most one child per symbol.
    pub fn add_child(&mut self, node: NodeId, symbol: Symbol) -> NodeId {
        if let Some(child) = self.child(node, &symbol) {
            return child;
        }

        let child = NodeId(self.nodes.len());
        self.nodes.push(PredictionTreeNode {
            symbol: Some(symbol.clone()),
            parent: Some(node),
            children: Default::default(),
        });
        self.nodes[node.0].children.insert(symbol, child);
        child
    }

    /// Reconstruct the sequence of symbols on the path from the root to `node`.
    pub fn sequence_to(&self, node: NodeId) -> Vec<Symbol> {
        let mut sequence = Vec::new();
        let mut current = node;

        while let Some(symbol) = self.symbol(current) {
            sequence.push(symbol.clone());
            current = self
                .parent(current)
                .unwrap_or_else(|| unreachable!("only the root has no parent"));
        }

        sequence.reverse();
        sequence
    }
}

impl<Symbol: Ord + Clone> Default for PredictionTree<Symbol> {
    fn default() -> Self {
        Self::new()
    }
}
