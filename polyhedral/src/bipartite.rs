//! Maximum bipartite matching on a boolean adjacency matrix.

use intlin::Matrix;

fn try_match(
    g: &Matrix<bool>,
    u: usize,
    seen: &mut [bool],
    match_row: &mut [Option<usize>],
) -> bool {
    for v in 0..g.num_rows() {
        if g[(v, u)] && !seen[v] {
            seen[v] = true;
            let prev = match_row[v];
            if prev.is_none() || try_match(g, prev.unwrap(), seen, match_row) {
                match_row[v] = Some(u);
                return true;
            }
        }
    }
    false
}

/// Augmenting-path matching over `g`, rows against columns.
///
/// Returns the match count and, per row, the column matched to it.
pub fn max_bipartite_match(g: &Matrix<bool>) -> (usize, Vec<Option<usize>>) {
    let (n, m) = (g.num_rows(), g.num_cols());
    let mut match_row = vec![None; n];
    let mut result = 0;
    if m > 0 {
        let mut seen = vec![false; n];
        for u in 0..m {
            for s in seen.iter_mut() {
                *s = false;
            }
            if try_match(g, u, &mut seen, &mut match_row) {
                result += 1;
            }
        }
    }
    (result, match_row)
}
