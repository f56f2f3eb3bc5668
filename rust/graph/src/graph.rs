use crate::error::GraphError;

/// A directed adjacency-list graph bounded by a fixed out-degree `k_max`
/// (Vamana's `R`). Nodes are dense `u32` indices `0..num_nodes()`; there is
/// no separate id-remapping here, that lives above in the index layer.
#[derive(Clone, Debug)]
pub struct Graph {
    k_max: usize,
    adjacency: Vec<Vec<u32>>,
}

impl Graph {
    pub fn new(num_nodes: usize, k_max: usize) -> Self {
        Graph {
            k_max,
            adjacency: vec![Vec::new(); num_nodes],
        }
    }

    pub fn num_nodes(&self) -> usize {
        self.adjacency.len()
    }

    pub fn k_max(&self) -> usize {
        self.k_max
    }

    pub fn neighbors(&self, id: u32) -> Result<&[u32], GraphError> {
        self.adjacency
            .get(id as usize)
            .map(|v| v.as_slice())
            .ok_or(GraphError::NodeOutOfRange(id, self.num_nodes()))
    }

    pub fn set_neighbors(&mut self, id: u32, neighbors: Vec<u32>) -> Result<(), GraphError> {
        if id as usize >= self.adjacency.len() {
            return Err(GraphError::NodeOutOfRange(id, self.num_nodes()));
        }
        debug_assert!(
            neighbors.len() <= self.k_max,
            "node {id} given {} neighbors, k_max is {}",
            neighbors.len(),
            self.k_max
        );
        self.adjacency[id as usize] = neighbors;
        Ok(())
    }

    /// Grows the graph to accommodate `num_nodes` total nodes, leaving
    /// existing adjacency untouched and new nodes with empty out-edges.
    pub fn resize(&mut self, num_nodes: usize) {
        if num_nodes > self.adjacency.len() {
            self.adjacency.resize(num_nodes, Vec::new());
        }
    }

    /// Reorders nodes per `permutation` (`permutation[new_i] = old_i`),
    /// remapping both slot positions and the ids referenced inside each
    /// adjacency list.
    pub fn compact_in_place(&mut self, permutation: &[u32]) -> Result<(), GraphError> {
        let n = self.adjacency.len();
        let mut old_to_new = vec![None; n];
        for (new_i, &old_i) in permutation.iter().enumerate() {
            if old_i as usize >= n {
                return Err(GraphError::NodeOutOfRange(old_i, n));
            }
            old_to_new[old_i as usize] = Some(new_i as u32);
        }

        let mut new_adjacency = Vec::with_capacity(permutation.len());
        for &old_i in permutation {
            let remapped: Vec<u32> = self.adjacency[old_i as usize]
                .iter()
                .filter_map(|&old_neighbor| old_to_new.get(old_neighbor as usize).copied().flatten())
                .collect();
            new_adjacency.push(remapped);
        }
        self.adjacency = new_adjacency;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_and_get_neighbors() {
        let mut g = Graph::new(3, 2);
        g.set_neighbors(0, vec![1, 2]).unwrap();
        assert_eq!(g.neighbors(0).unwrap(), &[1, 2]);
        assert_eq!(g.neighbors(1).unwrap(), &[] as &[u32]);
    }

    #[test]
    fn out_of_range_is_err() {
        let g = Graph::new(2, 2);
        assert!(g.neighbors(5).is_err());
    }

    #[test]
    fn compact_remaps_ids_and_drops_removed() {
        let mut g = Graph::new(3, 3);
        g.set_neighbors(0, vec![1, 2]).unwrap();
        g.set_neighbors(1, vec![0]).unwrap();
        g.set_neighbors(2, vec![0, 1]).unwrap();
        // drop node 1
        g.compact_in_place(&[0, 2]).unwrap();
        assert_eq!(g.num_nodes(), 2);
        assert_eq!(g.neighbors(0).unwrap(), &[1]);
        assert_eq!(g.neighbors(1).unwrap(), &[0]);
    }
}
