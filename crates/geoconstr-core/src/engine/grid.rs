/// A target value for one coordinate; `None` holds the coordinate at its current value.
pub type Target = Option<f64>;

/// The steps of one declaration: each step has one target per coordinate the
/// declaration created.
pub type ValueGroup = Vec<Vec<Target>>;

/// Combines value groups into every combination of their steps, concatenating the
/// chosen steps into one row.
///
/// The first group varies slowest and the last fastest, matching the usual nested
/// loop (and `itertools.product`) order. With no groups the result is a single empty
/// row; any group without steps makes the result empty.
pub fn cartesian_product(groups: &[ValueGroup]) -> Vec<Vec<Target>> {
    let mut rows: Vec<Vec<Target>> = vec![Vec::new()];
    for group in groups {
        let mut next = Vec::with_capacity(rows.len() * group.len());
        for row in &rows {
            for step in group {
                let mut combined = Vec::with_capacity(row.len() + step.len());
                combined.extend_from_slice(row);
                combined.extend_from_slice(step);
                next.push(combined);
            }
        }
        rows = next;
    }
    rows
}

/// Number of rows [`cartesian_product`] would produce.
pub fn product_size(groups: &[ValueGroup]) -> usize {
    groups.iter().map(Vec::len).product()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan_group(values: &[f64]) -> ValueGroup {
        values.iter().map(|&v| vec![Some(v)]).collect()
    }

    #[test]
    fn no_groups_gives_one_empty_row() {
        assert_eq!(cartesian_product(&[]), vec![Vec::<Target>::new()]);
        assert_eq!(product_size(&[]), 1);
    }

    #[test]
    fn single_group_is_unchanged() {
        let group = scan_group(&[1.0, 2.0, 3.0]);
        assert_eq!(cartesian_product(std::slice::from_ref(&group)), group);
    }

    #[test]
    fn two_scans_multiply_with_first_slowest() {
        let a = scan_group(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let b = scan_group(&[10.0, 20.0, 30.0, 40.0, 50.0]);
        let rows = cartesian_product(&[a, b]);
        assert_eq!(rows.len(), 25);
        assert_eq!(rows[0], vec![Some(1.0), Some(10.0)]);
        assert_eq!(rows[1], vec![Some(1.0), Some(20.0)]);
        assert_eq!(rows[5], vec![Some(2.0), Some(10.0)]);
        assert_eq!(rows[24], vec![Some(5.0), Some(50.0)]);
        for (i, row) in rows.iter().enumerate() {
            assert_eq!(row[0], Some((i / 5 + 1) as f64));
            assert_eq!(row[1], Some(((i % 5 + 1) * 10) as f64));
        }
    }

    #[test]
    fn frozen_groups_contribute_a_single_step() {
        let frozen: ValueGroup = vec![vec![None, None]];
        let scan = scan_group(&[0.5, 1.5]);
        let rows = cartesian_product(&[frozen, scan]);
        assert_eq!(
            rows,
            vec![
                vec![None, None, Some(0.5)],
                vec![None, None, Some(1.5)]
            ]
        );
    }

    #[test]
    fn empty_group_empties_the_product() {
        let rows = cartesian_product(&[scan_group(&[1.0]), Vec::new()]);
        assert!(rows.is_empty());
        assert_eq!(product_size(&[scan_group(&[1.0, 2.0]), scan_group(&[3.0, 4.0, 5.0])]), 6);
    }
}
