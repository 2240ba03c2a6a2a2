//! The composition graph: which splitters hold tickets of which.
//!
//! An edge `source → holder` means splitter `holder` owns at least one ticket
//! of splitter `source`, so claims move funds from `source` into `holder`.
//! Edges are counted per ticket. The graph must stay acyclic; a splitter
//! holding (directly or through others) a ticket of itself would feed its
//! own ledger.

use std::collections::{HashMap, HashSet};

use fundsplit_types::Address;

use crate::SplitterError;

#[derive(Clone, Debug, Default)]
pub struct CompositionGraph {
    /// source → holder → number of tickets of `source` held by `holder`.
    edges: HashMap<Address, HashMap<Address, u32>>,
}

impl CompositionGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Would adding `source → holder` close a cycle?
    pub fn would_cycle(&self, source: &Address, holder: &Address) -> bool {
        source == holder || self.reaches(holder, source)
    }

    /// Record one more ticket of `source` held by `holder`.
    pub fn add_edge(&mut self, source: Address, holder: Address) -> Result<(), SplitterError> {
        if self.would_cycle(&source, &holder) {
            return Err(SplitterError::CompositionCycle { origin: source, holder });
        }
        *self.edges.entry(source).or_default().entry(holder).or_insert(0) += 1;
        Ok(())
    }

    /// Forget one ticket of `source` held by `holder`. Unknown edges are ignored.
    pub fn remove_edge(&mut self, source: &Address, holder: &Address) {
        let Some(holders) = self.edges.get_mut(source) else {
            return;
        };
        if let Some(count) = holders.get_mut(holder) {
            *count -= 1;
            if *count == 0 {
                holders.remove(holder);
            }
        }
        if holders.is_empty() {
            self.edges.remove(source);
        }
    }

    /// Is `to` reachable from `from` along funding edges?
    pub fn reaches(&self, from: &Address, to: &Address) -> bool {
        let mut visited = HashSet::new();
        let mut stack = vec![*from];
        while let Some(node) = stack.pop() {
            if node == *to {
                return true;
            }
            if !visited.insert(node) {
                continue;
            }
            if let Some(holders) = self.edges.get(&node) {
                stack.extend(holders.keys().copied());
            }
        }
        false
    }

    /// Splitters holding tickets of `source`, sorted.
    pub fn holders_of(&self, source: &Address) -> Vec<Address> {
        let mut holders: Vec<Address> = self
            .edges
            .get(source)
            .map(|h| h.keys().copied().collect())
            .unwrap_or_default();
        holders.sort();
        holders
    }

    /// Number of tickets of `source` held by `holder`.
    pub fn multiplicity(&self, source: &Address, holder: &Address) -> u32 {
        self.edges
            .get(source)
            .and_then(|h| h.get(holder))
            .copied()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: Address = Address::new(0xa);
    const B: Address = Address::new(0xb);
    const C: Address = Address::new(0xc);

    #[test]
    fn chains_are_reachable() {
        let mut graph = CompositionGraph::new();
        graph.add_edge(A, B).unwrap();
        graph.add_edge(B, C).unwrap();
        assert!(graph.reaches(&A, &C));
        assert!(!graph.reaches(&C, &A));
        assert_eq!(graph.holders_of(&A), vec![B]);
    }

    #[test]
    fn closing_a_cycle_is_rejected() {
        let mut graph = CompositionGraph::new();
        graph.add_edge(A, B).unwrap();
        graph.add_edge(B, C).unwrap();
        assert!(matches!(
            graph.add_edge(C, A),
            Err(SplitterError::CompositionCycle { origin, holder }) if origin == C && holder == A
        ));
        assert!(!graph.reaches(&C, &A));
    }

    #[test]
    fn self_ownership_is_a_cycle() {
        let mut graph = CompositionGraph::new();
        assert!(graph.would_cycle(&A, &A));
        assert!(graph.add_edge(A, A).is_err());
    }

    #[test]
    fn edges_count_tickets() {
        let mut graph = CompositionGraph::new();
        graph.add_edge(A, B).unwrap();
        graph.add_edge(A, B).unwrap();
        assert_eq!(graph.multiplicity(&A, &B), 2);

        graph.remove_edge(&A, &B);
        assert!(graph.reaches(&A, &B));
        graph.remove_edge(&A, &B);
        assert!(!graph.reaches(&A, &B));
        assert!(graph.holders_of(&A).is_empty());

        // Removing a missing edge is harmless.
        graph.remove_edge(&A, &B);
        graph.remove_edge(&C, &A);
    }

    #[test]
    fn removing_an_edge_reopens_the_reverse_direction() {
        let mut graph = CompositionGraph::new();
        graph.add_edge(A, B).unwrap();
        assert!(graph.add_edge(B, A).is_err());
        graph.remove_edge(&A, &B);
        graph.add_edge(B, A).unwrap();
    }
}
