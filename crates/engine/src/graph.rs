//! Resource-allocation graph.
//!
//! Nodes and edges only; layout is left to whoever draws it.

use deadsim_core::{ProcState, Session};
use deadsim_types::{ProcessId, ResourceKind};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessNode {
    pub id: ProcessId,
    pub label: String,
    pub state: ProcState,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceNode {
    /// `R_<CODE>`, e.g. `R_CPU`.
    pub id: String,
    pub kind: ResourceKind,
    pub label: &'static str,
    pub available: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    /// Resource to process: a unit is held.
    Assign,
    /// Process to resource: the next request.
    Request,
    /// Process to resource: the next request, which the process is stuck on.
    Waiting,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Edge {
    pub from: String,
    pub to: String,
    pub kind: EdgeKind,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResourceGraph {
    pub processes: Vec<ProcessNode>,
    pub resources: Vec<ResourceNode>,
    pub edges: Vec<Edge>,
}

impl ResourceGraph {
    /// Edges of one kind.
    pub fn edges_of(&self, kind: EdgeKind) -> impl Iterator<Item = &Edge> {
        self.edges.iter().filter(move |e| e.kind == kind)
    }
}

fn resource_node_id(kind: ResourceKind) -> String {
    format!("R_{}", kind.code())
}

/// Build the resource-allocation graph of `session`.
///
/// Resource nodes exist for every configured kind. Each held kind yields one
/// `Assign` edge regardless of the unit count; each unfinished process yields
/// one edge to its next request.
pub fn build_graph(session: &Session) -> ResourceGraph {
    let resources = session
        .available
        .iter()
        .map(|(&kind, &available)| ResourceNode {
            id: resource_node_id(kind),
            kind,
            label: kind.label(),
            available,
        })
        .collect();

    let processes = session
        .procs
        .iter()
        .map(|p| ProcessNode {
            id: p.id.clone(),
            label: p.name.clone(),
            state: p.state,
        })
        .collect();

    // Every assign edge first, then every request edge
    let mut edges: Vec<Edge> = session
        .procs
        .iter()
        .flat_map(|p| {
            p.held_kinds().into_iter().map(move |kind| Edge {
                from: resource_node_id(kind),
                to: p.id.to_string(),
                kind: EdgeKind::Assign,
            })
        })
        .collect();

    for p in session.procs.iter().filter(|p| !p.is_done()) {
        if let Some(need) = p.next_need() {
            edges.push(Edge {
                from: p.id.to_string(),
                to: resource_node_id(need),
                kind: if p.state == ProcState::Waiting {
                    EdgeKind::Waiting
                } else {
                    EdgeKind::Request
                },
            });
        }
    }

    ResourceGraph {
        processes,
        resources,
        edges,
    }
}
