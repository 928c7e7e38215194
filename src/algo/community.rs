//! Connectivity over a view
//!
//! Weakly connected components of the induced subgraph, ignoring edge
//! direction.

use crate::graph::{NodeId, View};
use rustc_hash::FxHashMap;

/// Result of the WCC pass
#[derive(Debug, Clone, Default)]
pub struct WccResult {
    /// Members of each component, components ordered by their first member
    pub components: Vec<Vec<NodeId>>,
    /// Component index of every view node
    pub node_component: FxHashMap<NodeId, usize>,
}

impl WccResult {
    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    pub fn same_component(&self, a: &NodeId, b: &NodeId) -> bool {
        match (self.node_component.get(a), self.node_component.get(b)) {
            (Some(x), Some(y)) => x == y,
            _ => false,
        }
    }
}

/// Union-Find with path compression and union by rank
struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<usize>,
}

impl UnionFind {
    fn new(size: usize) -> Self {
        UnionFind {
            parent: (0..size).collect(),
            rank: vec![0; size],
        }
    }

    fn find(&mut self, i: usize) -> usize {
        let mut root = i;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        // Path compression
        let mut cur = i;
        while self.parent[cur] != root {
            let next = self.parent[cur];
            self.parent[cur] = root;
            cur = next;
        }
        root
    }

    fn union(&mut self, i: usize, j: usize) {
        let root_i = self.find(i);
        let root_j = self.find(j);

        if root_i != root_j {
            if self.rank[root_i] < self.rank[root_j] {
                self.parent[root_i] = root_j;
            } else if self.rank[root_i] > self.rank[root_j] {
                self.parent[root_j] = root_i;
            } else {
                self.parent[root_j] = root_i;
                self.rank[root_i] += 1;
            }
        }
    }
}

/// Weakly Connected Components (WCC)
///
/// Only the view's own edges take part, so a filtered view can split
/// components that are joined in the base graph.
pub fn weakly_connected_components(view: &View) -> WccResult {
    let idx_to_node = view.node_ids();
    let node_to_idx: FxHashMap<&NodeId, usize> = idx_to_node
        .iter()
        .enumerate()
        .map(|(i, id)| (id, i))
        .collect();

    let mut uf = UnionFind::new(idx_to_node.len());
    for edge in view.edges() {
        if let (Some(&u), Some(&v)) = (node_to_idx.get(&edge.source), node_to_idx.get(&edge.target)) {
            uf.union(u, v);
        }
    }

    let mut result = WccResult::default();
    let mut root_to_component: FxHashMap<usize, usize> = FxHashMap::default();

    for (i, node_id) in idx_to_node.iter().enumerate() {
        let root = uf.find(i);
        let component = *root_to_component.entry(root).or_insert_with(|| {
            result.components.push(Vec::new());
            result.components.len() - 1
        });
        result.components[component].push(node_id.clone());
        result.node_component.insert(node_id.clone(), component);
    }

    result
}
