//! Path-dependent Tree SHAP
//!
//! Exact Shapley values for a single tree in polynomial time, using node
//! covers as the background distribution (Lundberg et al., "Consistent
//! Individualized Feature Attribution for Tree Ensembles", algorithm 2).

use super::ensemble::{Node, Tree};
use ndarray::ArrayView1;

#[derive(Debug, Clone, Copy)]
struct PathElement {
    /// Feature split on, `None` for the root sentinel
    feature: Option<usize>,
    zero_fraction: f64,
    one_fraction: f64,
    weight: f64,
}

/// Add the attribution of `tree` for `row` into `phi`
pub fn tree_shap(tree: &Tree, row: ArrayView1<'_, f64>, phi: &mut [f64]) {
    let path = Vec::with_capacity(tree.nodes.len() + 1);
    recurse(tree, row, phi, 0, path, 1.0, 1.0, None);
}

#[allow(clippy::too_many_arguments)]
fn recurse(
    tree: &Tree,
    row: ArrayView1<'_, f64>,
    phi: &mut [f64],
    node: usize,
    mut path: Vec<PathElement>,
    zero_fraction: f64,
    one_fraction: f64,
    feature: Option<usize>,
) {
    extend(&mut path, zero_fraction, one_fraction, feature);

    match &tree.nodes[node] {
        Node::Leaf { value, .. } => {
            for i in 1..path.len() {
                let w = unwound_sum(&path, i);
                let el = path[i];
                if let Some(f) = el.feature {
                    phi[f] += w * (el.one_fraction - el.zero_fraction) * value;
                }
            }
        }
        Node::Split {
            feature: split,
            threshold,
            left,
            right,
            cover,
        } => {
            let (hot, cold) = if row[*split] <= *threshold {
                (*left, *right)
            } else {
                (*right, *left)
            };
            let hot_zero = tree.nodes[hot].cover() / cover;
            let cold_zero = tree.nodes[cold].cover() / cover;

            let mut incoming_zero = 1.0;
            let mut incoming_one = 1.0;
            // A feature seen earlier on the path is folded into this split
            if let Some(k) = path.iter().position(|el| el.feature == Some(*split)) {
                incoming_zero = path[k].zero_fraction;
                incoming_one = path[k].one_fraction;
                unwind(&mut path, k);
            }

            // A branch with both fractions zero carries no weight and would divide by zero
            if hot_zero * incoming_zero > 0.0 || incoming_one > 0.0 {
                recurse(
                    tree,
                    row,
                    phi,
                    hot,
                    path.clone(),
                    hot_zero * incoming_zero,
                    incoming_one,
                    Some(*split),
                );
            }
            if cold_zero * incoming_zero > 0.0 {
                recurse(
                    tree,
                    row,
                    phi,
                    cold,
                    path,
                    cold_zero * incoming_zero,
                    0.0,
                    Some(*split),
                );
            }
        }
    }
}

fn extend(path: &mut Vec<PathElement>, zero_fraction: f64, one_fraction: f64, feature: Option<usize>) {
    let depth = path.len();
    path.push(PathElement {
        feature,
        zero_fraction,
        one_fraction,
        weight: if depth == 0 { 1.0 } else { 0.0 },
    });
    let d = depth as f64;
    for i in (0..depth).rev() {
        let fi = i as f64;
        path[i + 1].weight += one_fraction * path[i].weight * (fi + 1.0) / (d + 1.0);
        path[i].weight = zero_fraction * path[i].weight * (d - fi) / (d + 1.0);
    }
}

fn unwind(path: &mut Vec<PathElement>, index: usize) {
    let depth = path.len() - 1;
    let d = depth as f64;
    let one = path[index].one_fraction;
    let zero = path[index].zero_fraction;
    let mut next_one = path[depth].weight;

    for i in (0..depth).rev() {
        let fi = i as f64;
        if one != 0.0 {
            let tmp = path[i].weight;
            path[i].weight = next_one * (d + 1.0) / ((fi + 1.0) * one);
            next_one = tmp - path[i].weight * zero * (d - fi) / (d + 1.0);
        } else {
            path[i].weight = path[i].weight * (d + 1.0) / (zero * (d - fi));
        }
    }

    for i in index..depth {
        path[i].feature = path[i + 1].feature;
        path[i].zero_fraction = path[i + 1].zero_fraction;
        path[i].one_fraction = path[i + 1].one_fraction;
    }
    path.pop();
}

fn unwound_sum(path: &[PathElement], index: usize) -> f64 {
    let depth = path.len() - 1;
    let d = depth as f64;
    let one = path[index].one_fraction;
    let zero = path[index].zero_fraction;
    let mut next_one = path[depth].weight;
    let mut total = 0.0;

    for i in (0..depth).rev() {
        let fi = i as f64;
        if one != 0.0 {
            let tmp = next_one * (d + 1.0) / ((fi + 1.0) * one);
            total += tmp;
            next_one = path[i].weight - tmp * zero * (d - fi) / (d + 1.0);
        } else {
            total += path[i].weight / zero / ((d - fi) / (d + 1.0));
        }
    }
    total
}
