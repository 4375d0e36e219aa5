use crate::core::coords::Axis;
use phf::{Map, Set, phf_map, phf_set};

/// The kind of coordinate object a keyword expands into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CoordinateClass {
    Distance,
    Angle,
    Dihedral,
    CartesianX,
    CartesianY,
    CartesianZ,
    TranslationX,
    TranslationY,
    TranslationZ,
    RotationA,
    RotationB,
    RotationC,
}

impl CoordinateClass {
    /// The Cartesian axis (or rotation-vector component) this class acts on, if any.
    pub fn axis(self) -> Option<Axis> {
        match self {
            CoordinateClass::CartesianX
            | CoordinateClass::TranslationX
            | CoordinateClass::RotationA => Some(Axis::X),
            CoordinateClass::CartesianY
            | CoordinateClass::TranslationY
            | CoordinateClass::RotationB => Some(Axis::Y),
            CoordinateClass::CartesianZ
            | CoordinateClass::TranslationZ
            | CoordinateClass::RotationC => Some(Axis::Z),
            CoordinateClass::Distance | CoordinateClass::Angle | CoordinateClass::Dihedral => None,
        }
    }
}

/// Groups keywords that share token layout and coordinate construction rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    /// `x`, `xy`, `xyz`...: per-atom Cartesian components.
    Cartesian,
    /// `trans-x`, `trans-xyz`...: centroid components of an atom group.
    Translation,
    /// `distance`, `angle`, `dihedral`: one coordinate over explicitly listed atoms.
    Internal,
    /// `rotation`: the three rigid-body rotation components of an atom group.
    Rotation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogEntry {
    pub classes: &'static [CoordinateClass],
    /// Number of atom tokens following the keyword.
    pub atom_count: usize,
    pub family: Family,
}

impl CatalogEntry {
    /// Number of value tokens a `set` line carries after the atom tokens.
    pub fn set_value_count(&self) -> usize {
        match self.family {
            Family::Rotation => 4,
            _ => self.classes.len(),
        }
    }

    /// Number of tokens (after the atom tokens) a `scan` line carries, including the step count.
    pub fn scan_value_count(&self) -> usize {
        match self.family {
            Family::Rotation => 6,
            _ => 2 * self.classes.len() + 1,
        }
    }
}

use CoordinateClass::*;

static CATALOG: Map<&'static str, CatalogEntry> = phf_map! {
    "distance" => CatalogEntry { classes: &[Distance], atom_count: 2, family: Family::Internal },
    "angle" => CatalogEntry { classes: &[Angle], atom_count: 3, family: Family::Internal },
    "dihedral" => CatalogEntry { classes: &[Dihedral], atom_count: 4, family: Family::Internal },
    "x" => CatalogEntry { classes: &[CartesianX], atom_count: 1, family: Family::Cartesian },
    "y" => CatalogEntry { classes: &[CartesianY], atom_count: 1, family: Family::Cartesian },
    "z" => CatalogEntry { classes: &[CartesianZ], atom_count: 1, family: Family::Cartesian },
    "xy" => CatalogEntry { classes: &[CartesianX, CartesianY], atom_count: 1, family: Family::Cartesian },
    "xz" => CatalogEntry { classes: &[CartesianX, CartesianZ], atom_count: 1, family: Family::Cartesian },
    "yz" => CatalogEntry { classes: &[CartesianY, CartesianZ], atom_count: 1, family: Family::Cartesian },
    "xyz" => CatalogEntry { classes: &[CartesianX, CartesianY, CartesianZ], atom_count: 1, family: Family::Cartesian },
    "trans-x" => CatalogEntry { classes: &[TranslationX], atom_count: 1, family: Family::Translation },
    "trans-y" => CatalogEntry { classes: &[TranslationY], atom_count: 1, family: Family::Translation },
    "trans-z" => CatalogEntry { classes: &[TranslationZ], atom_count: 1, family: Family::Translation },
    "trans-xy" => CatalogEntry { classes: &[TranslationX, TranslationY], atom_count: 1, family: Family::Translation },
    "trans-xz" => CatalogEntry { classes: &[TranslationX, TranslationZ], atom_count: 1, family: Family::Translation },
    "trans-yz" => CatalogEntry { classes: &[TranslationY, TranslationZ], atom_count: 1, family: Family::Translation },
    "trans-xyz" => CatalogEntry { classes: &[TranslationX, TranslationY, TranslationZ], atom_count: 1, family: Family::Translation },
    "rotation" => CatalogEntry { classes: &[RotationA, RotationB, RotationC], atom_count: 1, family: Family::Rotation },
};

static AXIS_KEYS: Set<&'static str> = phf_set! { "x", "y", "z", "xy", "xz", "yz", "xyz" };

const TRANSLATION_PREFIX: &str = "trans-";

fn sorted_letters(s: &str) -> String {
    let mut chars: Vec<char> = s.chars().collect();
    chars.sort_unstable();
    chars.into_iter().collect()
}

/// Canonical spelling of a keyword: axis combinations have their letters sorted
/// (`yx` becomes `xy`, `trans-zx` becomes `trans-xz`); other keywords are unchanged.
pub fn normalize_keyword(keyword: &str) -> String {
    let sorted = sorted_letters(keyword);
    if AXIS_KEYS.contains(sorted.as_str()) {
        return sorted;
    }
    if let Some(rest) = keyword.strip_prefix(TRANSLATION_PREFIX) {
        let sorted = sorted_letters(rest);
        if AXIS_KEYS.contains(sorted.as_str()) {
            return format!("{TRANSLATION_PREFIX}{sorted}");
        }
    }
    keyword.to_string()
}

/// Looks up an already normalized keyword.
pub fn lookup(normalized: &str) -> Option<&'static CatalogEntry> {
    CATALOG.get(normalized)
}

/// Normalizes `keyword` and looks it up, returning the canonical spelling with the entry.
pub fn resolve(keyword: &str) -> Option<(String, &'static CatalogEntry)> {
    let normalized = normalize_keyword(keyword);
    let entry = lookup(&normalized)?;
    Some((normalized, entry))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn axis_keys_are_order_independent() {
        assert_eq!(normalize_keyword("yx"), "xy");
        assert_eq!(normalize_keyword("zyx"), "xyz");
        assert_eq!(normalize_keyword("zx"), "xz");
        assert_eq!(normalize_keyword("x"), "x");
    }

    #[test]
    fn translation_prefix_is_preserved() {
        assert_eq!(normalize_keyword("trans-zx"), "trans-xz");
        assert_eq!(normalize_keyword("trans-yxz"), "trans-xyz");
        assert_eq!(normalize_keyword("trans-y"), "trans-y");
    }

    #[test]
    fn other_keywords_pass_through() {
        assert_eq!(normalize_keyword("distance"), "distance");
        assert_eq!(normalize_keyword("rotation"), "rotation");
        assert_eq!(normalize_keyword("xx"), "xx");
        assert_eq!(normalize_keyword("trans-w"), "trans-w");
    }

    #[test]
    fn every_axis_key_has_cartesian_and_translation_entries() {
        for key in AXIS_KEYS.iter() {
            let cart = lookup(key).unwrap();
            assert_eq!(cart.family, Family::Cartesian);
            assert_eq!(cart.classes.len(), key.len());
            let trans = lookup(&format!("trans-{key}")).unwrap();
            assert_eq!(trans.family, Family::Translation);
            assert_eq!(trans.classes.len(), key.len());
        }
    }

    #[test]
    fn internal_keywords_require_expected_atom_counts() {
        assert_eq!(lookup("distance").unwrap().atom_count, 2);
        assert_eq!(lookup("angle").unwrap().atom_count, 3);
        assert_eq!(lookup("dihedral").unwrap().atom_count, 4);
        assert_eq!(lookup("rotation").unwrap().atom_count, 1);
    }

    #[test]
    fn resolve_rejects_unknown_keywords() {
        assert!(resolve("bond").is_none());
        assert!(resolve("xx").is_none());
        let (name, entry) = resolve("zy").unwrap();
        assert_eq!(name, "yz");
        assert_eq!(entry.classes, &[CartesianY, CartesianZ]);
    }

    #[test]
    fn value_counts_follow_family() {
        let xyz = lookup("xyz").unwrap();
        assert_eq!(xyz.set_value_count(), 3);
        assert_eq!(xyz.scan_value_count(), 7);
        let rot = lookup("rotation").unwrap();
        assert_eq!(rot.set_value_count(), 4);
        assert_eq!(rot.scan_value_count(), 6);
        let dist = lookup("distance").unwrap();
        assert_eq!(dist.set_value_count(), 1);
        assert_eq!(dist.scan_value_count(), 3);
    }

    #[test]
    fn class_axes() {
        assert_eq!(CartesianY.axis(), Some(Axis::Y));
        assert_eq!(RotationC.axis(), Some(Axis::Z));
        assert_eq!(Dihedral.axis(), None);
    }

    #[test]
    fn families_agree_with_their_classes() {
        for (keyword, entry) in CATALOG.entries() {
            match entry.family {
                Family::Internal => {
                    assert_eq!(entry.classes.len(), 1, "{keyword}");
                    assert!(entry.classes[0].axis().is_none(), "{keyword}");
                    let arity = match entry.classes[0] {
                        Distance => 2,
                        Angle => 3,
                        Dihedral => 4,
                        other => panic!("{keyword} maps to {other:?}"),
                    };
                    assert_eq!(entry.atom_count, arity, "{keyword}");
                }
                Family::Cartesian | Family::Translation | Family::Rotation => {
                    assert!(!entry.classes.is_empty(), "{keyword}");
                    assert!(
                        entry.classes.iter().all(|c| c.axis().is_some()),
                        "{keyword}"
                    );
                    assert_eq!(entry.atom_count, 1, "{keyword}");
                }
            }
        }
    }
}
