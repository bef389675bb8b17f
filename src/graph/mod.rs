// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 flowline contributors

//! Dependency graph over flow steps
//!
//! Edges are inferred from shared dataset references (see [`resolver`]) and
//! always point from an earlier step to a later one, so the graph is acyclic
//! by construction. The [`Validator`](validate::Validator) re-checks this
//! defensively before any document is produced.

mod resolver;
mod validate;

pub use resolver::resolve;
pub use validate::Validator;

use petgraph::graph::{DiGraph, NodeIndex};
use std::cmp::Reverse;
use std::collections::{BTreeSet, BinaryHeap, HashMap};

use crate::flow::StepId;

/// Directed graph over step ids
///
/// Construction sorts and deduplicates the edge list so two graphs built
/// from the same capture compare and serialize identically.
pub struct DependencyGraph {
    graph: DiGraph<StepId, ()>,
    node_of: HashMap<StepId, NodeIndex>,
    edges: Vec<(StepId, StepId)>,
}

impl DependencyGraph {
    /// Build a graph from explicit nodes and edges.
    ///
    /// Edges whose endpoints are not in `nodes` are dropped.
    pub fn new(
        nodes: impl IntoIterator<Item = StepId>,
        edges: impl IntoIterator<Item = (StepId, StepId)>,
    ) -> Self {
        let mut graph = DiGraph::new();
        let mut node_of = HashMap::new();

        for id in nodes {
            let index = graph.add_node(id);
            node_of.insert(id, index);
        }

        let edge_set: BTreeSet<(StepId, StepId)> = edges
            .into_iter()
            .filter(|(from, to)| node_of.contains_key(from) && node_of.contains_key(to))
            .collect();

        for &(from, to) in &edge_set {
            graph.add_edge(node_of[&from], node_of[&to], ());
        }

        Self {
            graph,
            node_of,
            edges: edge_set.into_iter().collect(),
        }
    }

    /// Producer→consumer pairs, sorted and deduplicated.
    pub fn edges(&self) -> &[(StepId, StepId)] {
        &self.edges
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Steps that must run before `id`, in id order.
    pub fn dependencies_of(&self, id: StepId) -> Vec<StepId> {
        self.neighbors(id, petgraph::Direction::Incoming)
    }

    /// Steps that consume `id`'s outputs, in id order.
    pub fn dependents_of(&self, id: StepId) -> Vec<StepId> {
        self.neighbors(id, petgraph::Direction::Outgoing)
    }

    fn neighbors(&self, id: StepId, direction: petgraph::Direction) -> Vec<StepId> {
        let Some(node) = self.node_of.get(&id) else {
            return Vec::new();
        };
        let mut ids: Vec<StepId> = self
            .graph
            .neighbors_directed(*node, direction)
            .map(|n| self.graph[n])
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Topological order via Kahn's algorithm.
    ///
    /// Among nodes with no remaining unresolved dependency, the lowest step
    /// id (the original execution order) goes first, so the order is
    /// deterministic even when the graph admits several valid orders.
    ///
    /// `Err` carries the ids that could not be ordered (cycle members).
    pub fn topo_order(&self) -> Result<Vec<StepId>, Vec<StepId>> {
        let mut in_degree: HashMap<StepId, usize> =
            self.node_of.keys().map(|&id| (id, 0)).collect();
        for &(_, to) in &self.edges {
            *in_degree.get_mut(&to).expect("edge endpoints are nodes") += 1;
        }

        let mut ready: BinaryHeap<Reverse<StepId>> = BinaryHeap::new();
        for (&id, &degree) in &in_degree {
            if degree == 0 {
                ready.push(Reverse(id));
            }
        }

        let mut order = Vec::with_capacity(self.node_of.len());
        while let Some(Reverse(id)) = ready.pop() {
            order.push(id);
            for dependent in self.dependents_of(id) {
                let degree = in_degree.get_mut(&dependent).expect("node exists");
                *degree -= 1;
                if *degree == 0 {
                    ready.push(Reverse(dependent));
                }
            }
        }

        if order.len() == self.node_of.len() {
            Ok(order)
        } else {
            let mut stuck: Vec<StepId> = self
                .node_of
                .keys()
                .copied()
                .filter(|id| !order.contains(id))
                .collect();
            stuck.sort_unstable();
            Err(stuck)
        }
    }
}
