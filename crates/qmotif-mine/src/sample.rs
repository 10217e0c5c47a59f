//! Random subgraph samplers.
//!
//! Both samplers may return fewer sets than requested: a walk that cannot
//! grow is discarded, not retried. Returned sets may repeat.

use std::collections::BTreeSet;

use qmotif_graph::{EdgeRole, MultiDiGraph, NodeId};
use rand::Rng;
use rand::seq::IteratorRandom;

/// Expansion attempts per interaction-edge target unit.
pub const EXPANSION_ATTEMPTS_PER_EDGE: usize = 10;

/// Sample connected node sets of exactly `k` nodes by random growth.
pub fn sample_by_nodes<N, E, R: Rng>(
    graph: &MultiDiGraph<N, E>,
    k: usize,
    samples: usize,
    rng: &mut R,
) -> Vec<BTreeSet<NodeId>> {
    if k == 0 || graph.node_count() < k {
        return Vec::new();
    }

    let nodes: Vec<NodeId> = graph.node_ids().collect();
    let mut out = Vec::with_capacity(samples);

    'sample: for _ in 0..samples {
        let start = nodes[rng.gen_range(0..nodes.len())];
        let mut set = BTreeSet::from([start]);

        for _ in 1..k {
            let Some(next) = graph.open_neighborhood(&set).into_iter().choose(rng) else {
                continue 'sample;
            };
            set.insert(next);
        }
        out.push(set);
    }

    out
}

/// Sample node sets whose induced subgraph holds exactly `k` interaction
/// edges.
///
/// Each sample seeds from one random interaction edge `(u, v)`. While the
/// count is below `k`, a random neighbor joins the set together with its
/// interaction unit (everything reachable from it over interaction edges).
/// Overshooting `k`, an empty neighborhood or running out of attempts
/// discards the sample.
pub fn sample_by_interactions<N, E: EdgeRole, R: Rng>(
    graph: &MultiDiGraph<N, E>,
    k: usize,
    samples: usize,
    rng: &mut R,
) -> Vec<BTreeSet<NodeId>> {
    if k == 0 || graph.node_count() < k {
        return Vec::new();
    }

    let seeds: Vec<(NodeId, NodeId)> = graph
        .edges()
        .filter(|(_, _, e)| e.is_interaction())
        .map(|(u, v, _)| (u, v))
        .collect();
    if seeds.is_empty() {
        return Vec::new();
    }

    let mut out = Vec::with_capacity(samples);
    for _ in 0..samples {
        let (u, v) = seeds[rng.gen_range(0..seeds.len())];
        let mut set = BTreeSet::from([u, v]);
        if grow_to_interaction_count(graph, &mut set, k, rng) {
            out.push(set);
        }
    }
    out
}

fn grow_to_interaction_count<N, E: EdgeRole, R: Rng>(
    graph: &MultiDiGraph<N, E>,
    set: &mut BTreeSet<NodeId>,
    k: usize,
    rng: &mut R,
) -> bool {
    let mut count = interaction_count(graph, set);
    if count == k {
        return true;
    }
    if count > k {
        return false;
    }

    for _ in 0..k * EXPANSION_ATTEMPTS_PER_EDGE {
        let Some(neighbor) = graph.open_neighborhood(set).into_iter().choose(rng) else {
            return false;
        };
        set.extend(interaction_unit(graph, neighbor));
        count = interaction_count(graph, set);
        if count == k {
            return true;
        }
        if count > k {
            return false;
        }
    }
    false
}

/// Interaction edge records inside the subgraph induced by `set`.
pub fn interaction_count<N, E: EdgeRole>(
    graph: &MultiDiGraph<N, E>,
    set: &BTreeSet<NodeId>,
) -> usize {
    set.iter()
        .flat_map(|&u| {
            graph
                .successors(u)
                .filter(|v| set.contains(v))
                .map(move |v| (u, v))
        })
        .map(|(u, v)| {
            graph
                .edges_between(u, v)
                .iter()
                .filter(|e| e.is_interaction())
                .count()
        })
        .sum()
}

/// Nodes reachable from `start` over interaction edges in either direction.
pub fn interaction_unit<N, E: EdgeRole>(
    graph: &MultiDiGraph<N, E>,
    start: NodeId,
) -> BTreeSet<NodeId> {
    let mut unit = BTreeSet::from([start]);
    let mut stack = vec![start];
    while let Some(id) = stack.pop() {
        let linked = graph
            .successors(id)
            .filter(|&s| graph.edges_between(id, s).iter().any(EdgeRole::is_interaction))
            .chain(
                graph
                    .predecessors(id)
                    .filter(|&p| graph.edges_between(p, id).iter().any(EdgeRole::is_interaction)),
            )
            .collect::<Vec<_>>();
        for other in linked {
            if unit.insert(other) {
                stack.push(other);
            }
        }
    }
    unit
}
