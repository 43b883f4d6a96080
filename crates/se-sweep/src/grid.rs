//! Cartesian expansion of parameter grids into job assignments.

use se_types::{JobAssignment, JobList, ParameterGrid};
use tracing::debug;

/// Expand every grid and concatenate the results in input order.
///
/// No deduplication happens: identical assignments produced by two grids
/// are both kept.
pub fn expand(grids: &[ParameterGrid]) -> JobList {
    let expected = grids
        .iter()
        .try_fold(0usize, |total, grid| total.checked_add(grid.combination_count()?));
    let mut jobs = JobList::with_capacity(expected.unwrap_or(0));
    for (index, grid) in grids.iter().enumerate() {
        let expanded = expand_grid(grid);
        debug!(
            grid = index,
            dimensions = grid.len(),
            assignments = expanded.len(),
            "Expanded parameter grid"
        );
        jobs.extend(expanded);
    }
    jobs
}

/// Cartesian product of one grid, last dimension varying fastest.
///
/// Product-of-zero-dimensions semantics apply: an empty grid yields exactly
/// one assignment with no parameters, and a dimension without values yields
/// no assignments at all.
pub fn expand_grid(grid: &ParameterGrid) -> JobList {
    let mut result: JobList = vec![JobAssignment::new()];

    for (name, values) in grid.dimensions() {
        let mut next = Vec::with_capacity(result.len() * values.len());
        for existing in &result {
            for value in values {
                let mut combo = existing.clone();
                combo.insert(name, value.clone());
                next.push(combo);
            }
        }
        result = next;
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use se_types::ParameterValue;

    fn sample_grid() -> ParameterGrid {
        ParameterGrid::new()
            .add("seed", [0, 1, 2, 3])
            .add("epochs", [300])
            .add("model", ["transformer", "lstm"])
            .add("dataset", ["cifar", "mnist"])
    }

    #[test]
    fn produces_product_of_dimension_sizes() {
        let jobs = expand_grid(&sample_grid());
        assert_eq!(jobs.len(), 4 * 2 * 2);

        for (i, a) in jobs.iter().enumerate() {
            for b in &jobs[i + 1..] {
                assert_ne!(a, b, "duplicate combination");
            }
        }
    }

    #[test]
    fn last_dimension_varies_fastest() {
        let grid = ParameterGrid::new().add("a", [1, 2]).add("b", ["x", "y"]);
        let jobs = expand_grid(&grid);

        let rendered: Vec<(i64, String)> = jobs
            .iter()
            .map(|job| {
                let a = match job.get("a") {
                    Some(ParameterValue::Int(v)) => *v,
                    other => panic!("unexpected a: {other:?}"),
                };
                (a, job.get("b").unwrap().to_string())
            })
            .collect();

        assert_eq!(
            rendered,
            vec![
                (1, "x".to_string()),
                (1, "y".to_string()),
                (2, "x".to_string()),
                (2, "y".to_string()),
            ]
        );
    }

    #[test]
    fn assignment_keys_follow_declared_order() {
        let jobs = expand_grid(&sample_grid());
        let keys: Vec<&str> = jobs[0].iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["seed", "epochs", "model", "dataset"]);
    }

    #[test]
    fn grids_concatenate_in_input_order() {
        let first = ParameterGrid::new().add("lr", [0.1, 0.01, 0.001]);
        let second = ParameterGrid::new().add("model", ["lstm", "gru"]);
        let jobs = expand(&[first, second]);

        assert_eq!(jobs.len(), 3 + 2);
        assert!(jobs[..3].iter().all(|j| j.get("lr").is_some()));
        assert!(jobs[3..].iter().all(|j| j.get("model").is_some()));
    }

    #[test]
    fn empty_grid_is_one_parameterless_assignment() {
        let jobs = expand(&[ParameterGrid::new()]);
        assert_eq!(jobs.len(), 1);
        assert!(jobs[0].is_empty());
    }

    #[test]
    fn empty_dimension_drops_the_grid() {
        let broken = ParameterGrid::new()
            .add("seed", [0, 1])
            .add("model", Vec::<&str>::new());
        let fine = ParameterGrid::new().add("seed", [7]);
        let jobs = expand(&[broken, fine]);
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].get("seed"), Some(&ParameterValue::Int(7)));
    }

    #[test]
    fn expanded_length_matches_combination_count() {
        let grids = [
            sample_grid(),
            ParameterGrid::new(),
            ParameterGrid::new().add("seed", [0, 1]).add("model", Vec::<&str>::new()),
            ParameterGrid::new().add("lr", [0.1, 0.01, 0.001]),
        ];
        for grid in &grids {
            assert_eq!(Some(expand_grid(grid).len()), grid.combination_count());
        }

        let jobs = expand(&grids);
        assert_eq!(jobs.len(), 16 + 1 + 0 + 3);
        assert!(jobs.capacity() >= jobs.len());
    }

    #[test]
    fn no_deduplication_across_grids() {
        let grid = ParameterGrid::new().add("seed", [0]);
        let jobs = expand(&[grid.clone(), grid]);
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0], jobs[1]);
    }
}
