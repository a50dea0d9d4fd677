use hopscope_core::{Fragment, HopResult, QueryOutcome};

use crate::{CallGraph, DistanceMatrix, GraphAlgoError, IdentifierPattern};

/// Compiles both fragments and resolves them with [`resolve_patterns`].
pub fn resolve_shortest_path(
    graph: &CallGraph,
    matrix: &DistanceMatrix,
    source: &Fragment,
    destination: &Fragment,
) -> Result<HopResult, GraphAlgoError> {
    let source_pattern = IdentifierPattern::compile(source)?;
    let destination_pattern = IdentifierPattern::compile(destination)?;
    Ok(resolve_patterns(
        graph,
        matrix,
        &source_pattern,
        &destination_pattern,
    ))
}

/// Resolves each pattern to its match set and keeps the pair with the
/// smallest distance over the full cross product. Ties keep the first pair
/// in index order.
pub(crate) fn resolve_patterns(
    graph: &CallGraph,
    matrix: &DistanceMatrix,
    source: &IdentifierPattern,
    destination: &IdentifierPattern,
) -> HopResult {
    let source_nodes = graph.matches(source);
    let destination_nodes = graph.matches(destination);

    if source_nodes.is_empty() || destination_nodes.is_empty() {
        tracing::debug!(
            source = source.fragment(),
            destination = destination.fragment(),
            source_matches = source_nodes.len(),
            destination_matches = destination_nodes.len(),
            "identifier did not resolve to any node"
        );
        return HopResult::no_match(source.fragment(), destination.fragment());
    }

    let mut best: Option<(usize, usize, f64)> = None;
    for &from in &source_nodes {
        for &to in &destination_nodes {
            let distance = matrix.distance(from, to);
            let improves = match best {
                Some((_, _, best_distance)) => distance < best_distance,
                None => distance.is_finite(),
            };
            if improves {
                best = Some((from, to, distance));
            }
        }
    }

    let Some((from, to, distance)) = best else {
        return HopResult::unreachable(source.fragment(), destination.fragment());
    };

    let path = matrix
        .path(from, to)
        .into_iter()
        .filter_map(|index| graph.label(index).map(str::to_owned))
        .collect();

    HopResult {
        distance,
        path,
        matched_source: graph.label(from).unwrap_or_default().to_owned(),
        matched_destination: graph.label(to).unwrap_or_default().to_owned(),
        outcome: QueryOutcome::Connected,
    }
}
