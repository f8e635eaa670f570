//! Dependency graph of a finished resolution.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;

/// A node in the resolved graph: the synthetic root that owns the root
/// requirements, or one pinned identifier.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphNode<I, C> {
    Root,
    Resolved { identifier: I, candidate: C },
}

impl<I, C> GraphNode<I, C> {
    pub fn identifier(&self) -> Option<&I> {
        match self {
            Self::Root => None,
            Self::Resolved { identifier, .. } => Some(identifier),
        }
    }

    pub fn candidate(&self) -> Option<&C> {
        match self {
            Self::Root => None,
            Self::Resolved { candidate, .. } => Some(candidate),
        }
    }
}

impl<I, C: fmt::Display> fmt::Display for GraphNode<I, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Root => f.write_str("(root)"),
            Self::Resolved { candidate, .. } => write!(f, "{candidate}"),
        }
    }
}

/// A resolved dependency graph backed by petgraph.
pub struct DependencyGraph<I, C> {
    graph: DiGraph<GraphNode<I, C>, ()>,
    index: BTreeMap<I, NodeIndex>,
    root: NodeIndex,
}

impl<I: Ord + Clone, C> DependencyGraph<I, C> {
    pub fn new() -> Self {
        let mut graph = DiGraph::new();
        let root = graph.add_node(GraphNode::Root);
        Self {
            graph,
            index: BTreeMap::new(),
            root,
        }
    }

    pub fn root(&self) -> NodeIndex {
        self.root
    }

    /// Add or retrieve the node for `identifier`. An existing node keeps its
    /// candidate.
    pub fn add_node(&mut self, identifier: I, candidate: C) -> NodeIndex {
        if let Some(&idx) = self.index.get(&identifier) {
            return idx;
        }
        let idx = self.graph.add_node(GraphNode::Resolved {
            identifier: identifier.clone(),
            candidate,
        });
        self.index.insert(identifier, idx);
        idx
    }

    /// Add a dependency edge from `from` to `to`.
    pub fn add_edge(&mut self, from: NodeIndex, to: NodeIndex) {
        if !self.graph.edges(from).any(|e| e.target() == to) {
            self.graph.add_edge(from, to, ());
        }
    }

    pub fn find(&self, identifier: &I) -> Option<NodeIndex> {
        self.index.get(identifier).copied()
    }

    pub fn node(&self, idx: NodeIndex) -> &GraphNode<I, C> {
        &self.graph[idx]
    }

    /// Direct dependencies of a node, ordered by identifier.
    pub fn dependencies_of(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        self.neighbors(idx, Direction::Outgoing)
    }

    /// Reverse dependencies (who depends on this node), ordered by
    /// identifier with the root first.
    pub fn dependents_of(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        self.neighbors(idx, Direction::Incoming)
    }

    fn neighbors(&self, idx: NodeIndex, direction: Direction) -> Vec<NodeIndex> {
        let mut out: Vec<NodeIndex> = self.graph.neighbors_directed(idx, direction).collect();
        out.sort_by(|a, b| self.graph[*a].identifier().cmp(&self.graph[*b].identifier()));
        out.dedup();
        out
    }

    /// Path of candidates from a root requirement down to `identifier`.
    pub fn find_path(&self, identifier: &I) -> Option<Vec<&C>> {
        let target = self.find(identifier)?;
        let mut path = Vec::new();
        let mut visited = HashSet::new();
        if self.dfs_path(self.root, target, &mut path, &mut visited) {
            Some(
                path.iter()
                    .filter_map(|&idx| self.graph[idx].candidate())
                    .collect(),
            )
        } else {
            None
        }
    }

    fn dfs_path(
        &self,
        current: NodeIndex,
        target: NodeIndex,
        path: &mut Vec<NodeIndex>,
        visited: &mut HashSet<NodeIndex>,
    ) -> bool {
        path.push(current);
        if current == target {
            return true;
        }
        if !visited.insert(current) {
            path.pop();
            return false;
        }
        for child in self.dependencies_of(current) {
            if self.dfs_path(child, target, path, visited) {
                return true;
            }
        }
        path.pop();
        false
    }

    /// Number of resolved nodes (excluding root).
    pub fn len(&self) -> usize {
        self.graph.node_count().saturating_sub(1)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<I: Ord + Clone, C: fmt::Display> DependencyGraph<I, C> {
    /// Render the tree under the root. Nodes already shown on the current
    /// branch are printed but not expanded again.
    pub fn print_tree(&self, root_label: &str, max_depth: Option<usize>) -> String {
        let mut output = format!("{root_label}\n");
        let mut visited = HashSet::new();
        visited.insert(self.root);

        let deps = self.dependencies_of(self.root);
        let count = deps.len();
        for (i, idx) in deps.into_iter().enumerate() {
            self.print_subtree(&mut output, idx, "", i == count - 1, 1, max_depth, &mut visited);
        }
        output
    }

    #[allow(clippy::too_many_arguments)]
    fn print_subtree(
        &self,
        output: &mut String,
        idx: NodeIndex,
        prefix: &str,
        is_last: bool,
        depth: usize,
        max_depth: Option<usize>,
        visited: &mut HashSet<NodeIndex>,
    ) {
        let connector = if is_last { "└── " } else { "├── " };
        let node = &self.graph[idx];
        output.push_str(&format!("{prefix}{connector}{node}\n"));

        if max_depth.is_some_and(|max| depth >= max) {
            return;
        }
        if !visited.insert(idx) {
            return;
        }

        let child_prefix = format!("{prefix}{}", if is_last { "    " } else { "│   " });
        let deps = self.dependencies_of(idx);
        let count = deps.len();
        for (i, child) in deps.into_iter().enumerate() {
            self.print_subtree(
                output,
                child,
                &child_prefix,
                i == count - 1,
                depth + 1,
                max_depth,
                visited,
            );
        }

        visited.remove(&idx);
    }

    /// Render everything that depends on `identifier`, up to the root.
    pub fn print_inverted_tree(&self, identifier: &I) -> String {
        let mut output = String::new();
        let Some(idx) = self.find(identifier) else {
            return output;
        };
        output.push_str(&format!("{}\n", self.graph[idx]));

        let mut visited = HashSet::new();
        visited.insert(idx);
        let dependents = self.dependents_of(idx);
        let count = dependents.len();
        for (i, dep) in dependents.into_iter().enumerate() {
            self.print_inverted_subtree(&mut output, dep, "", i == count - 1, &mut visited);
        }
        output
    }

    fn print_inverted_subtree(
        &self,
        output: &mut String,
        idx: NodeIndex,
        prefix: &str,
        is_last: bool,
        visited: &mut HashSet<NodeIndex>,
    ) {
        let connector = if is_last { "└── " } else { "├── " };
        output.push_str(&format!("{prefix}{connector}{}\n", self.graph[idx]));

        if !visited.insert(idx) {
            return;
        }

        let child_prefix = format!("{prefix}{}", if is_last { "    " } else { "│   " });
        let dependents = self.dependents_of(idx);
        let count = dependents.len();
        for (i, dep) in dependents.into_iter().enumerate() {
            self.print_inverted_subtree(output, dep, &child_prefix, i == count - 1, visited);
        }

        visited.remove(&idx);
    }
}

impl<I: Ord + Clone, C> Default for DependencyGraph<I, C> {
    fn default() -> Self {
        Self::new()
    }
}
