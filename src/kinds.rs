//! Artifact-kind graph
//!
//! Small typed graph describing which logical artifact kind is
//! produced from which, and by which transform. Descriptive and
//! observability-only: nothing here gates execution.

use crate::error::{SpecforgeError, SpecforgeResult};
use std::collections::BTreeMap;
use std::sync::Mutex;

/// A named artifact kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KindNode {
    pub name: String,
    pub category: String,
}

/// A directed labeled edge between two defined kinds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KindEdge {
    pub from: String,
    pub to: String,
    pub relation: String,
    pub transform: Option<String>,
}

/// Full graph snapshot
#[derive(Debug, Clone, Default)]
pub struct KindGraphSnapshot {
    pub kinds: Vec<KindNode>,
    pub edges: Vec<KindEdge>,
}

#[derive(Debug, Default)]
struct GraphState {
    kinds: BTreeMap<String, KindNode>,
    edges: Vec<KindEdge>,
}

/// Kind graph store
#[derive(Debug, Default)]
pub struct KindGraph {
    state: Mutex<GraphState>,
}

impl KindGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Idempotent node registration. Re-defining an existing kind
    /// keeps the original category.
    pub fn define(&self, name: &str, category: &str) {
        let mut state = self.state.lock().expect("kind graph poisoned");
        state
            .kinds
            .entry(name.to_string())
            .or_insert_with(|| KindNode {
                name: name.to_string(),
                category: category.to_string(),
            });
    }

    /// Register a directed edge. Both endpoints must be defined.
    pub fn connect(
        &self,
        from: &str,
        to: &str,
        relation: &str,
        transform: Option<&str>,
    ) -> SpecforgeResult<()> {
        let mut state = self.state.lock().expect("kind graph poisoned");

        if !state.kinds.contains_key(from) {
            return Err(SpecforgeError::UnknownKind(from.to_string()));
        }
        if !state.kinds.contains_key(to) {
            return Err(SpecforgeError::UnknownKind(to.to_string()));
        }

        let edge = KindEdge {
            from: from.to_string(),
            to: to.to_string(),
            relation: relation.to_string(),
            transform: transform.map(str::to_string),
        };
        if !state.edges.contains(&edge) {
            state.edges.push(edge);
        }
        Ok(())
    }

    /// Kinds directly downstream of `kind`
    pub fn dependents(&self, kind: &str) -> Vec<String> {
        let state = self.state.lock().expect("kind graph poisoned");
        state
            .edges
            .iter()
            .filter(|e| e.from == kind)
            .map(|e| e.to.clone())
            .collect()
    }

    /// Edges that produce `kind`
    pub fn producers(&self, kind: &str) -> Vec<KindEdge> {
        let state = self.state.lock().expect("kind graph poisoned");
        state
            .edges
            .iter()
            .filter(|e| e.to == kind)
            .cloned()
            .collect()
    }

    /// Full snapshot for display
    pub fn graph(&self) -> KindGraphSnapshot {
        let state = self.state.lock().expect("kind graph poisoned");
        KindGraphSnapshot {
            kinds: state.kinds.values().cloned().collect(),
            edges: state.edges.clone(),
        }
    }
}
