//! Balanced KD-tree over 3-D points.
//!
//! ## Design notes
//!
//! * **Median splitting**: each node partitions its points around the median
//!   along the current axis with `select_nth_unstable_by`, cycling x, y, z.
//! * **Flat storage**: nodes live in one `Vec`, children are indices into it.
//! * **Bounded search**: k-nearest queries keep a max-heap of the best `k`
//!   candidates and skip subtrees that cannot improve on the worst of them.
//!
//! The tree is static; it is rebuilt rather than updated.

use std::collections::BinaryHeap;

use nalgebra::Point3;
use ordered_float::OrderedFloat;

use crate::spatial::index::{NearestNeighborIndex, Neighbor};

const DIMENSIONS: usize = 3;

#[derive(Debug, Clone)]
struct KdNode {
    /// position of the node's point in `KdTree::points`
    point: usize,
    axis: usize,
    left: Option<usize>,
    right: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct KdTree {
    points: Vec<Point3<f64>>,
    nodes: Vec<KdNode>,
    root: Option<usize>,
}

impl KdTree {
    /// Depth of the deepest leaf, 0 for an empty tree.
    pub fn depth(&self) -> usize {
        fn walk(nodes: &[KdNode], node: Option<usize>) -> usize {
            match node {
                Some(i) => 1 + walk(nodes, nodes[i].left).max(walk(nodes, nodes[i].right)),
                None => 0,
            }
        }
        walk(&self.nodes, self.root)
    }

    fn build_recursive(
        points: &[Point3<f64>],
        indices: &mut [usize],
        depth: usize,
        nodes: &mut Vec<KdNode>,
    ) -> Option<usize> {
        if indices.is_empty() {
            return None;
        }

        let axis = depth % DIMENSIONS;
        let mid = indices.len() / 2;

        indices.select_nth_unstable_by(mid, |&a, &b| points[a][axis].total_cmp(&points[b][axis]));

        let node_index = nodes.len();
        nodes.push(KdNode { point: indices[mid], axis, left: None, right: None });

        let (left_indices, right_with_mid) = indices.split_at_mut(mid);
        let right_indices = &mut right_with_mid[1..];

        let left = Self::build_recursive(points, left_indices, depth + 1, nodes);
        let right = Self::build_recursive(points, right_indices, depth + 1, nodes);

        nodes[node_index].left = left;
        nodes[node_index].right = right;

        Some(node_index)
    }

    fn search(
        &self,
        node: Option<usize>,
        query: &Point3<f64>,
        k: usize,
        heap: &mut BinaryHeap<(OrderedFloat<f64>, usize)>,
    ) {
        let Some(node_index) = node else {
            return;
        };
        let node = &self.nodes[node_index];
        let point = &self.points[node.point];

        let dist_sq = (point - query).norm_squared();
        if heap.len() < k {
            heap.push((OrderedFloat(dist_sq), node.point));
        } else if let Some(&(worst, _)) = heap.peek() {
            if dist_sq < worst.0 {
                heap.pop();
                heap.push((OrderedFloat(dist_sq), node.point));
            }
        }

        let diff = query[node.axis] - point[node.axis];
        let (near, far) = if diff <= 0.0 {
            (node.left, node.right)
        } else {
            (node.right, node.left)
        };

        self.search(near, query, k, heap);

        // the far side can only help if the splitting plane is closer than the worst hit
        let worth_visiting = match heap.peek() {
            Some(&(worst, _)) => heap.len() < k || diff * diff <= worst.0,
            None => true,
        };
        if worth_visiting {
            self.search(far, query, k, heap);
        }
    }
}

impl NearestNeighborIndex for KdTree {
    fn build(points: Vec<Point3<f64>>) -> Self {
        let mut indices: Vec<usize> = (0..points.len()).collect();
        let mut nodes = Vec::with_capacity(points.len());
        let root = Self::build_recursive(&points, &mut indices, 0, &mut nodes);
        KdTree { points, nodes, root }
    }

    fn len(&self) -> usize {
        self.points.len()
    }

    fn point(&self, index: usize) -> &Point3<f64> {
        &self.points[index]
    }

    fn k_nearest(&self, query: &Point3<f64>, k: usize) -> Vec<Neighbor> {
        if k == 0 {
            return Vec::new();
        }

        let mut heap = BinaryHeap::with_capacity(k + 1);
        self.search(self.root, query, k, &mut heap);

        let mut hits: Vec<Neighbor> = heap
            .into_iter()
            .map(|(dist_sq, index)| Neighbor { index, distance: dist_sq.0.sqrt() })
            .collect();
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance).then(a.index.cmp(&b.index)));
        hits
    }
}
