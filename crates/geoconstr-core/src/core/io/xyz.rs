use crate::core::io::traits::StructureFile;
use crate::core::models::structure::{Structure, StructureError};
use nalgebra::Point3;
use std::io::{self, BufRead, Write};
use thiserror::Error;

const PREALLOCATION_LIMIT: usize = 4096;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct XyzMetadata {
    /// The free-form second line of the frame.
    pub comment: String,
}

#[derive(Debug, Error)]
pub enum XyzError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse { line: usize, kind: XyzParseErrorKind },
    #[error("Invalid structure: {0}")]
    Structure(#[from] StructureError),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum XyzParseErrorKind {
    #[error("File is empty")]
    Empty,
    #[error("Invalid atom count '{0}'")]
    InvalidAtomCount(String),
    #[error("Expected {expected} atom lines but the file ended after {found}")]
    Truncated { expected: usize, found: usize },
    #[error("Atom line needs an element and three coordinates")]
    TooFewFields,
    #[error("Invalid coordinate value '{0}'")]
    InvalidFloat(String),
}

/// The XYZ format: an atom count, a comment line, then one `element x y z` line per atom.
///
/// Only the first frame of a multi-frame file is read. Element labels that are atomic
/// numbers are kept as written.
pub struct XyzFile;

impl StructureFile for XyzFile {
    type Metadata = XyzMetadata;
    type Error = XyzError;

    fn read_from(reader: &mut impl BufRead) -> Result<(Structure, Self::Metadata), Self::Error> {
        let mut lines = reader.lines().enumerate();

        let (count_line_num, count_line) = loop {
            match lines.next() {
                Some((i, line)) => {
                    let line = line?;
                    if !line.trim().is_empty() {
                        break (i + 1, line);
                    }
                }
                None => {
                    return Err(XyzError::Parse {
                        line: 1,
                        kind: XyzParseErrorKind::Empty,
                    });
                }
            }
        };
        let count_str = count_line.trim();
        let atom_count: usize = count_str.parse().map_err(|_| XyzError::Parse {
            line: count_line_num,
            kind: XyzParseErrorKind::InvalidAtomCount(count_str.to_string()),
        })?;

        let comment = match lines.next() {
            Some((_, line)) => line?.trim().to_string(),
            None => String::new(),
        };

        // The count comes from the header; a short file ends in `Truncated` instead.
        let capacity = atom_count.min(PREALLOCATION_LIMIT);
        let mut elements = Vec::with_capacity(capacity);
        let mut positions = Vec::with_capacity(capacity);
        while elements.len() < atom_count {
            let Some((i, line)) = lines.next() else {
                return Err(XyzError::Parse {
                    line: count_line_num + 2 + elements.len(),
                    kind: XyzParseErrorKind::Truncated {
                        expected: atom_count,
                        found: elements.len(),
                    },
                });
            };
            let line = line?;
            let line_num = i + 1;
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() < 4 {
                return Err(XyzError::Parse {
                    line: line_num,
                    kind: XyzParseErrorKind::TooFewFields,
                });
            }
            let mut xyz = [0.0; 3];
            for (slot, field) in xyz.iter_mut().zip(&fields[1..4]) {
                *slot = field.parse().map_err(|_| XyzError::Parse {
                    line: line_num,
                    kind: XyzParseErrorKind::InvalidFloat(field.to_string()),
                })?;
            }
            elements.push(fields[0].to_string());
            positions.push(Point3::new(xyz[0], xyz[1], xyz[2]));
        }

        let structure = Structure::new(elements, positions)?;
        Ok((structure, XyzMetadata { comment }))
    }

    fn write_to(
        structure: &Structure,
        metadata: &Self::Metadata,
        writer: &mut impl Write,
    ) -> Result<(), Self::Error> {
        writeln!(writer, "{}", structure.atom_count())?;
        writeln!(writer, "{}", metadata.comment)?;
        for (element, pos) in structure.elements().iter().zip(structure.positions()) {
            writeln!(
                writer,
                "{:<3} {:>15.10} {:>15.10} {:>15.10}",
                element, pos.x, pos.y, pos.z
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tempfile::tempdir;

    const WATER: &str = "3\nwater molecule\nO 0.000 0.000 0.117\nH 0.000 0.757 -0.467\nH 0.000 -0.757 -0.467\n";

    #[test]
    fn reads_first_frame() {
        let (structure, metadata) = XyzFile::read_from(&mut Cursor::new(WATER)).unwrap();
        assert_eq!(structure.atom_count(), 3);
        assert_eq!(structure.elements(), &["O", "H", "H"]);
        assert_eq!(structure.positions()[1], Point3::new(0.0, 0.757, -0.467));
        assert_eq!(metadata.comment, "water molecule");
    }

    #[test]
    fn ignores_trailing_frames_and_extra_columns() {
        let text = "1\n\nC 1.0 2.0 3.0 0.5\n1\nsecond\nN 0 0 0\n";
        let (structure, _) = XyzFile::read_from(&mut Cursor::new(text)).unwrap();
        assert_eq!(structure.elements(), &["C"]);
        assert_eq!(structure.positions()[0], Point3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn empty_input_is_an_error() {
        let err = XyzFile::read_from(&mut Cursor::new("\n\n")).unwrap_err();
        assert!(matches!(
            err,
            XyzError::Parse {
                kind: XyzParseErrorKind::Empty,
                ..
            }
        ));
    }

    #[test]
    fn invalid_atom_count_reports_line() {
        let err = XyzFile::read_from(&mut Cursor::new("three\n\n")).unwrap_err();
        match err {
            XyzError::Parse { line, kind } => {
                assert_eq!(line, 1);
                assert_eq!(kind, XyzParseErrorKind::InvalidAtomCount("three".into()));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn truncated_file_is_an_error() {
        let err = XyzFile::read_from(&mut Cursor::new("3\n\nO 0 0 0\n")).unwrap_err();
        assert!(matches!(
            err,
            XyzError::Parse {
                kind: XyzParseErrorKind::Truncated {
                    expected: 3,
                    found: 1
                },
                ..
            }
        ));
    }

    #[test]
    fn oversized_atom_count_is_reported_as_truncation() {
        let err =
            XyzFile::read_from(&mut Cursor::new("18446744073709551615
c
H 0 0 0
")).unwrap_err();
        assert!(matches!(
            err,
            XyzError::Parse {
                kind: XyzParseErrorKind::Truncated {
                    expected: usize::MAX,
                    found: 1
                },
                ..
            }
        ));
    }

    #[test]
    fn bad_coordinate_is_an_error() {
        let err = XyzFile::read_from(&mut Cursor::new("1\n\nO 0 zero 0\n")).unwrap_err();
        match err {
            XyzError::Parse { line, kind } => {
                assert_eq!(line, 3);
                assert_eq!(kind, XyzParseErrorKind::InvalidFloat("zero".into()));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn short_atom_line_is_an_error() {
        let err = XyzFile::read_from(&mut Cursor::new("1\n\nO 0 0\n")).unwrap_err();
        assert!(matches!(
            err,
            XyzError::Parse {
                kind: XyzParseErrorKind::TooFewFields,
                ..
            }
        ));
    }

    #[test]
    fn zero_atoms_is_rejected_by_structure() {
        let err = XyzFile::read_from(&mut Cursor::new("0\nnothing\n")).unwrap_err();
        assert!(matches!(err, XyzError::Structure(StructureError::Empty)));
    }

    #[test]
    fn write_then_read_through_file_preserves_structure() {
        let (structure, metadata) = XyzFile::read_from(&mut Cursor::new(WATER)).unwrap();
        let dir = tempdir().unwrap();
        let path = dir.path().join("water.xyz");
        XyzFile::write_to_path(&structure, &metadata, &path).unwrap();

        let (reread, remeta) = XyzFile::read_from_path(&path).unwrap();
        assert_eq!(remeta.comment, "water molecule");
        assert_eq!(reread.elements(), structure.elements());
        for (a, b) in reread.positions().iter().zip(structure.positions()) {
            assert!((a - b).norm() < 1e-9);
        }
    }
}
