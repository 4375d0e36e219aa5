use super::error::LineErrorKind;
use crate::core::models::element::is_element_symbol;
use crate::core::models::structure::Structure;

/// Parses a whole-number token, optionally signed, the way atom numbers are written.
fn parse_integer(token: &str) -> Option<i64> {
    let digits = token.strip_prefix(['+', '-']).unwrap_or(token);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    token.parse().ok()
}

/// Converts a one-based atom number to a zero-based index. Only numbers that have no
/// zero-based counterpart in `i64` fail here; range checks come later.
fn to_zero_based(number: i64, token: &str) -> Result<i64, LineErrorKind> {
    number
        .checked_sub(1)
        .ok_or_else(|| LineErrorKind::InvalidAtomIndex(token.to_string()))
}

fn check_range_bound(number: i64, atom_count: usize, token: &str) -> Result<(), LineErrorKind> {
    if number < 1 {
        return Err(LineErrorKind::InvalidAtomIndex(token.to_string()));
    }
    if number as u64 > atom_count as u64 {
        return Err(LineErrorKind::AtomIndexOutOfRange {
            index: number,
            atom_count,
        });
    }
    Ok(())
}

/// Expands a comma-separated list of one-based numbers and inclusive `a-b` ranges into
/// zero-based indices, e.g. `1-3,5` gives `[0, 1, 2, 4]`.
///
/// Range endpoints are checked against `atom_count` before the range is expanded, so a
/// range never grows past the structure. Single numbers are returned as written and
/// may be negative; [`validate_indices`] checks them.
pub fn parse_ranges(spec: &str, atom_count: usize) -> Result<Vec<i64>, LineErrorKind> {
    let invalid = || LineErrorKind::InvalidAtomSpec(spec.to_string());
    let mut indices = Vec::new();
    for part in spec.split(',') {
        match part.split_once('-') {
            Some((start, end)) if !start.is_empty() => {
                let start = parse_integer(start).ok_or_else(invalid)?;
                let end = parse_integer(end).ok_or_else(invalid)?;
                if start > end {
                    continue;
                }
                check_range_bound(start, atom_count, spec)?;
                check_range_bound(end, atom_count, spec)?;
                indices.extend((start..=end).map(|i| i - 1));
            }
            _ => indices.push(to_zero_based(parse_integer(part).ok_or_else(invalid)?, spec)?),
        }
    }
    Ok(indices)
}

/// Checks that every zero-based index lies within the structure.
pub fn validate_indices(
    indices: &[i64],
    atom_count: usize,
    token: &str,
) -> Result<Vec<usize>, LineErrorKind> {
    if indices.iter().any(|&i| i < 0) {
        return Err(LineErrorKind::InvalidAtomIndex(token.to_string()));
    }
    if let Some(&index) = indices.iter().find(|&&i| i as u64 >= atom_count as u64) {
        return Err(LineErrorKind::AtomIndexOutOfRange {
            index: index + 1,
            atom_count,
        });
    }
    Ok(indices.iter().map(|&i| i as usize).collect())
}

/// Parses a single one-based atom number into a zero-based index without range checks.
pub fn parse_atom_number(token: &str) -> Result<i64, LineErrorKind> {
    let number =
        parse_integer(token).ok_or_else(|| LineErrorKind::InvalidAtomSpec(token.to_string()))?;
    to_zero_based(number, token)
}

/// Resolves an atom-spec token against a structure.
///
/// - A bare integer is a one-based atom number.
/// - An element symbol (any case) selects every atom of that element.
/// - Anything else is parsed as a comma/dash range list.
///
/// The result keeps the order in which atoms were written.
///
/// # Errors
///
/// Returns [`LineErrorKind::InvalidAtomIndex`] for numbers below 1,
/// [`LineErrorKind::AtomIndexOutOfRange`] for numbers past the last atom,
/// [`LineErrorKind::InvalidAtomSpec`] for malformed tokens and
/// [`LineErrorKind::EmptySelection`] if nothing is selected.
pub fn select_atoms(token: &str, structure: &Structure) -> Result<Vec<usize>, LineErrorKind> {
    let raw = if let Some(i) = parse_integer(token) {
        vec![to_zero_based(i, token)?]
    } else if is_element_symbol(token) {
        structure
            .indices_of_element(token)
            .into_iter()
            .map(|i| i as i64)
            .collect()
    } else {
        parse_ranges(token, structure.atom_count())?
    };
    let atoms = validate_indices(&raw, structure.atom_count(), token)?;
    if atoms.is_empty() {
        return Err(LineErrorKind::EmptySelection(token.to_string()));
    }
    Ok(atoms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    fn structure(elements: &[&str]) -> Structure {
        let positions = (0..elements.len())
            .map(|i| Point3::new(i as f64, 0.0, 0.0))
            .collect();
        Structure::new(elements.iter().map(|e| e.to_string()).collect(), positions).unwrap()
    }

    fn ten_atoms() -> Structure {
        structure(&["C", "H", "H", "H", "O", "H", "C", "N", "H", "H"])
    }

    #[test]
    fn single_number_is_one_based() {
        assert_eq!(select_atoms("3", &ten_atoms()), Ok(vec![2]));
    }

    #[test]
    fn dash_range_is_inclusive() {
        assert_eq!(select_atoms("1-3", &ten_atoms()), Ok(vec![0, 1, 2]));
    }

    #[test]
    fn comma_list_keeps_order() {
        assert_eq!(select_atoms("1,3,5", &ten_atoms()), Ok(vec![0, 2, 4]));
        assert_eq!(select_atoms("5,1-2,9", &ten_atoms()), Ok(vec![4, 0, 1, 8]));
    }

    #[test]
    fn element_symbol_selects_matching_atoms() {
        let s = structure(&["C", "O", "H", "O", "N"]);
        assert_eq!(select_atoms("o", &s), Ok(vec![1, 3]));
        assert_eq!(select_atoms("O", &s), Ok(vec![1, 3]));
    }

    #[test]
    fn element_absent_from_structure_is_an_empty_selection() {
        let s = structure(&["C", "O", "H"]);
        assert_eq!(
            select_atoms("fe", &s),
            Err(LineErrorKind::EmptySelection("fe".into()))
        );
    }

    #[test]
    fn zero_and_negative_numbers_are_rejected() {
        let s = ten_atoms();
        assert_eq!(
            select_atoms("0", &s),
            Err(LineErrorKind::InvalidAtomIndex("0".into()))
        );
        assert_eq!(
            select_atoms("-2", &s),
            Err(LineErrorKind::InvalidAtomIndex("-2".into()))
        );
        assert_eq!(
            select_atoms("0-2", &s),
            Err(LineErrorKind::InvalidAtomIndex("0-2".into()))
        );
    }

    #[test]
    fn index_past_last_atom_is_out_of_range() {
        assert_eq!(
            select_atoms("99", &ten_atoms()),
            Err(LineErrorKind::AtomIndexOutOfRange {
                index: 99,
                atom_count: 10
            })
        );
        assert_eq!(
            select_atoms("8-11", &ten_atoms()),
            Err(LineErrorKind::AtomIndexOutOfRange {
                index: 11,
                atom_count: 10
            })
        );
    }

    #[test]
    fn malformed_specs_are_rejected() {
        for token in ["a-b", "1-", "1,,2", "1.5", "abc", "1-2-3"] {
            assert_eq!(
                select_atoms(token, &ten_atoms()),
                Err(LineErrorKind::InvalidAtomSpec(token.into())),
                "{token}"
            );
        }
    }

    #[test]
    fn reversed_range_is_empty() {
        assert_eq!(parse_ranges("3-1", 10), Ok(vec![]));
        assert_eq!(
            select_atoms("3-1", &ten_atoms()),
            Err(LineErrorKind::EmptySelection("3-1".into()))
        );
    }

    #[test]
    fn parse_atom_number_does_not_check_range() {
        assert_eq!(parse_atom_number("12"), Ok(11));
        assert_eq!(parse_atom_number("0"), Ok(-1));
        assert!(parse_atom_number("c").is_err());
    }

    #[test]
    fn parse_integer_accepts_signs_only_at_front() {
        assert_eq!(parse_integer("+4"), Some(4));
        assert_eq!(parse_integer("-4"), Some(-4));
        assert_eq!(parse_integer("4-"), None);
        assert_eq!(parse_integer(""), None);
        assert_eq!(parse_integer("-"), None);
    }

    #[test]
    fn most_negative_number_is_an_invalid_index() {
        let token = i64::MIN.to_string();
        assert_eq!(
            select_atoms(&token, &ten_atoms()),
            Err(LineErrorKind::InvalidAtomIndex(token.clone()))
        );
        assert_eq!(
            parse_atom_number(&token),
            Err(LineErrorKind::InvalidAtomIndex(token.clone()))
        );
        let list = format!("1,{token}");
        assert_eq!(
            select_atoms(&list, &ten_atoms()),
            Err(LineErrorKind::InvalidAtomIndex(list.clone()))
        );
    }

    #[test]
    fn huge_range_is_rejected_before_expansion() {
        assert_eq!(
            parse_ranges("1-10000000000", 10),
            Err(LineErrorKind::AtomIndexOutOfRange {
                index: 10_000_000_000,
                atom_count: 10
            })
        );
        assert_eq!(
            select_atoms("2-9223372036854775807", &ten_atoms()),
            Err(LineErrorKind::AtomIndexOutOfRange {
                index: i64::MAX,
                atom_count: 10
            })
        );
        assert_eq!(
            parse_ranges("0-9223372036854775807", 10),
            Err(LineErrorKind::InvalidAtomIndex("0-9223372036854775807".into()))
        );
    }
}
