//! Greedy best-first search over a [`Graph`], decoupled from any concrete
//! distance or dataset type: callers supply a `distance_to` closure, so
//! this crate never depends on `vsearch-distance` or `vsearch-dataset`.

use std::collections::HashSet;

use crate::buffer::SearchBuffer;
use crate::error::GraphError;
use crate::graph::Graph;
use crate::neighbor::Neighbor;
use crate::params::VamanaSearchParameters;

/// Runs greedy best-first search from `entry_point`, expanding the lowest
/// -distance unvisited candidate in the buffer's window until every
/// candidate in the window has been visited. `distance_to(id)` is called
/// at most once per candidate id that enters the buffer.
///
/// When `params.search_buffer_visited_set` is set, a hash set of expanded
/// ids skips recomputing distance for a node reached by more than one
/// path; this trades memory for avoiding redundant distance calls, which
/// matters most at high recall / high out-degree.
pub fn greedy_search(
    graph: &Graph,
    entry_point: u32,
    params: &VamanaSearchParameters,
    mut distance_to: impl FnMut(u32) -> f32,
) -> Result<Vec<Neighbor>, GraphError> {
    if entry_point as usize >= graph.num_nodes() {
        return Err(GraphError::NodeOutOfRange(entry_point, graph.num_nodes()));
    }

    let mut buffer = SearchBuffer::new(params.buffer_config);
    let mut visited_set: Option<HashSet<u32>> = if params.search_buffer_visited_set {
        Some(HashSet::new())
    } else {
        None
    };

    let entry_distance = distance_to(entry_point);
    buffer.insert(Neighbor::new(entry_point, entry_distance));
    if let Some(set) = visited_set.as_mut() {
        set.insert(entry_point);
    }

    while let Some(candidate) = buffer.next_unvisited() {
        buffer.mark_visited(candidate.id);
        for &neighbor_id in graph.neighbors(candidate.id)? {
            if let Some(set) = visited_set.as_ref() {
                if set.contains(&neighbor_id) {
                    continue;
                }
            }
            let d = distance_to(neighbor_id);
            buffer.insert(Neighbor::new(neighbor_id, d));
            if let Some(set) = visited_set.as_mut() {
                set.insert(neighbor_id);
            }
        }
        if buffer.is_done() {
            break;
        }
    }

    Ok(buffer.top_k(params.buffer_config.window_size))
}
