//! Minimum-cost detection-to-track assignment.
//!
//! Solves the rectangular linear sum assignment problem with the Hungarian
//! (Kuhn-Munkres) algorithm, then rejects assignments whose cost exceeds a
//! threshold.

use nalgebra::DMatrix;

/// Result of solving an assignment problem.
///
/// Rows index detections, columns index tracks. Every row and column appears
/// exactly once, either in `matches` or in the corresponding unmatched list.
#[derive(Debug, Clone)]
pub struct Assignment {
    /// Accepted `(row, col)` pairs with cost within the threshold.
    pub matches: Vec<(usize, usize)>,
    /// Rows (detections) left without an accepted match.
    pub unmatched_rows: Vec<usize>,
    /// Columns (tracks) left without an accepted match.
    pub unmatched_cols: Vec<usize>,
}

/// Solve the rectangular minimum-cost assignment over `cost`, rejecting pairs
/// with cost above `max_cost`.
///
/// All costs must be finite. A rejected pair contributes its row and column
/// to the unmatched lists. Empty inputs short-circuit without running the
/// solver: with no columns every row is unmatched, and vice versa.
///
/// The solution is deterministic. When several assignments share the optimal
/// total cost, rows are resolved in ascending order and among equal-cost
/// alternatives the lowest column index is explored first; this tie-break is
/// a stable contract of this solver.
pub fn solve(cost: &DMatrix<f64>, max_cost: f64) -> Assignment {
    let rows = cost.nrows();
    let cols = cost.ncols();

    if rows == 0 || cols == 0 {
        return Assignment {
            matches: Vec::new(),
            unmatched_rows: (0..rows).collect(),
            unmatched_cols: (0..cols).collect(),
        };
    }

    let row_to_col = hungarian(cost);

    let mut matches = Vec::new();
    let mut row_matched = vec![false; rows];
    let mut col_matched = vec![false; cols];

    for (row, assigned) in row_to_col.iter().enumerate() {
        if let Some(col) = *assigned {
            if cost[(row, col)] <= max_cost {
                matches.push((row, col));
                row_matched[row] = true;
                col_matched[col] = true;
            }
        }
    }

    let unmatched_rows = (0..rows).filter(|&i| !row_matched[i]).collect();
    let unmatched_cols = (0..cols).filter(|&j| !col_matched[j]).collect();

    Assignment {
        matches,
        unmatched_rows,
        unmatched_cols,
    }
}

/// Hungarian algorithm over a rectangular cost matrix.
///
/// Uses the dual-potential shortest-augmenting-path formulation in O(n^3).
/// The matrix is implicitly padded to a square with zero-cost dummy entries;
/// padding with a constant leaves the optimal assignment of the real rows
/// and columns unchanged. Returns, for each row, the assigned column.
fn hungarian(cost: &DMatrix<f64>) -> Vec<Option<usize>> {
    let rows = cost.nrows();
    let cols = cost.ncols();
    let n = rows.max(cols);

    let at = |i: usize, j: usize| {
        if i < rows && j < cols {
            cost[(i, j)]
        } else {
            0.0
        }
    };

    // 1-based arrays with a sentinel column 0, per the classic formulation.
    // u/v are the dual potentials, assigned[j] the row matched to column j.
    let mut u = vec![0.0_f64; n + 1];
    let mut v = vec![0.0_f64; n + 1];
    let mut assigned = vec![0_usize; n + 1];
    let mut way = vec![0_usize; n + 1];

    for i in 1..=n {
        assigned[0] = i;
        let mut j0 = 0_usize;
        let mut minv = vec![f64::INFINITY; n + 1];
        let mut used = vec![false; n + 1];

        // Grow an alternating tree from row i until a free column is reached.
        loop {
            used[j0] = true;
            let i0 = assigned[j0];
            let mut delta = f64::INFINITY;
            let mut j1 = 0_usize;

            for j in 1..=n {
                if used[j] {
                    continue;
                }
                let reduced = at(i0 - 1, j - 1) - u[i0] - v[j];
                if reduced < minv[j] {
                    minv[j] = reduced;
                    way[j] = j0;
                }
                if minv[j] < delta {
                    delta = minv[j];
                    j1 = j;
                }
            }

            for j in 0..=n {
                if used[j] {
                    u[assigned[j]] += delta;
                    v[j] -= delta;
                } else {
                    minv[j] -= delta;
                }
            }

            j0 = j1;
            if assigned[j0] == 0 {
                break;
            }
        }

        // Augment along the found path.
        loop {
            let j1 = way[j0];
            assigned[j0] = assigned[j1];
            j0 = j1;
            if j0 == 0 {
                break;
            }
        }
    }

    let mut row_to_col = vec![None; rows];
    for j in 1..=n {
        let i = assigned[j];
        if i >= 1 && i <= rows && j <= cols {
            row_to_col[i - 1] = Some(j - 1);
        }
    }
    row_to_col
}
