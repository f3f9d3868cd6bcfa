//! Reader and writer for the `.sym` constraint format.

use std::fmt::Write as _;

use tracing::debug;

use super::set::{Orientation, SymmetryConstraintSet, SymmetryGroup, SymmetryPair};
use crate::error::{Result, SymmetryError};

pub const KW_AXIS: &str = "SYMMETRY_AXIS";
pub const KW_PAIR: &str = "SYMMETRY_PAIR";
pub const KW_GROUP: &str = "SYMMETRY_GROUP";
pub const KW_SELF: &str = "SELF_SYMMETRY";

/// One parsed `.sym` statement.
#[derive(Debug, Clone, PartialEq)]
enum Statement {
    Axis(f64),
    Pair(SymmetryPair),
    Group(SymmetryGroup),
    SelfSymmetric(Vec<String>),
}

/// Parse `.sym` text into a constraint set.
///
/// Parsing stops at the first malformed statement. Devices named in more
/// than one statement are collected over the whole file and reported
/// together as [`SymmetryError::DuplicateRole`] once every line has been read.
pub fn parse(text: &str) -> Result<SymmetryConstraintSet> {
    let mut set = SymmetryConstraintSet::new();
    let mut axis_line: Option<usize> = None;
    let mut statements = 0usize;

    for (idx, raw) in text.lines().enumerate() {
        let line = idx + 1;
        let content = match raw.find('#') {
            Some(pos) => &raw[..pos],
            None => raw,
        };
        let tokens: Vec<&str> = content.split_whitespace().collect();
        if tokens.is_empty() {
            continue;
        }

        statements += 1;
        match parse_statement(line, &tokens)? {
            Statement::Axis(value) => {
                if let Some(first) = axis_line {
                    return Err(SymmetryError::parse(
                        line,
                        tokens[0],
                        format!("axis already defined at line {}", first),
                    ));
                }
                axis_line = Some(line);
                set.axis = Some(value);
            }
            Statement::Pair(pair) => set.pairs.push(pair),
            Statement::Group(group) => set.groups.push(group),
            Statement::SelfSymmetric(devices) => set.self_symmetric.extend(devices),
        }
    }

    set.check_roles()?;

    debug!(
        statements,
        pairs = set.pairs.len(),
        groups = set.groups.len(),
        self_symmetric = set.self_symmetric.len(),
        "parsed symmetry constraints"
    );
    Ok(set)
}

fn parse_statement(line: usize, tokens: &[&str]) -> Result<Statement> {
    let keyword = tokens[0];
    let args = &tokens[1..];

    match keyword {
        KW_AXIS => {
            let [value] = args else {
                return Err(SymmetryError::parse(
                    line,
                    keyword,
                    format!("expected 1 value, got {}", args.len()),
                ));
            };
            let position = value.parse::<f64>().map_err(|_| {
                SymmetryError::parse(line, *value, "axis position is not a number")
            })?;
            Ok(Statement::Axis(position))
        }
        KW_PAIR => {
            let orientation = match args {
                [_, _] => Orientation::Vertical,
                [_, _, orient] => parse_orientation(line, orient)?,
                _ => {
                    return Err(SymmetryError::parse(
                        line,
                        keyword,
                        format!(
                            "expected 2 devices and an optional orientation, got {} tokens",
                            args.len()
                        ),
                    ))
                }
            };
            Ok(Statement::Pair(SymmetryPair::new(args[0], args[1], orientation)))
        }
        KW_GROUP => {
            let (members, orientation) = match args.split_last() {
                Some((last, rest)) if last.parse::<Orientation>().is_ok() => {
                    (rest, parse_orientation(line, last)?)
                }
                _ => (args, Orientation::Vertical),
            };
            if members.len() < 2 {
                return Err(SymmetryError::parse(
                    line,
                    keyword,
                    format!("a group needs at least 2 devices, got {}", members.len()),
                ));
            }
            Ok(Statement::Group(SymmetryGroup::new(
                members.iter().copied(),
                orientation,
            )))
        }
        KW_SELF => {
            if args.is_empty() {
                return Err(SymmetryError::parse(line, keyword, "expected at least 1 device"));
            }
            Ok(Statement::SelfSymmetric(
                args.iter().map(|d| d.to_string()).collect(),
            ))
        }
        other => Err(SymmetryError::parse(line, other, "unknown statement")),
    }
}

fn parse_orientation(line: usize, token: &str) -> Result<Orientation> {
    token.parse().map_err(|_| {
        SymmetryError::parse(line, token, "orientation must be VERTICAL or HORIZONTAL")
    })
}

/// Render a constraint set as `.sym` text.
///
/// Orientation is written only when it is not the VERTICAL default, and all
/// self-symmetric devices share one statement.
pub fn serialize(set: &SymmetryConstraintSet) -> String {
    let mut out = String::from("# Symmetry constraints\n");

    if let Some(axis) = set.axis {
        let _ = writeln!(out, "{} {}", KW_AXIS, axis);
    }

    for pair in &set.pairs {
        let _ = write!(out, "{} {} {}", KW_PAIR, pair.first, pair.second);
        if pair.orientation != Orientation::Vertical {
            let _ = write!(out, " {}", pair.orientation);
        }
        out.push('\n');
    }

    for group in &set.groups {
        let _ = write!(out, "{} {}", KW_GROUP, group.members.join(" "));
        if group.orientation != Orientation::Vertical {
            let _ = write!(out, " {}", group.orientation);
        }
        out.push('\n');
    }

    if !set.self_symmetric.is_empty() {
        let _ = writeln!(out, "{} {}", KW_SELF, set.self_symmetric.join(" "));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const SAMPLE: &str = "\
# differential input stage
SYMMETRY_AXIS 100.0

SYMMETRY_PAIR M1 M2          # input pair
SYMMETRY_PAIR M3 M4 HORIZONTAL
SYMMETRY_GROUP M5 M6 M7
SELF_SYMMETRY M8 M9
";

    #[test]
    fn test_parse_sample() {
        let set = parse(SAMPLE).unwrap();
        assert_relative_eq!(set.axis.unwrap(), 100.0);
        assert_eq!(set.pairs.len(), 2);
        assert_eq!(set.pairs[0], SymmetryPair::new("M1", "M2", Orientation::Vertical));
        assert_eq!(set.pairs[1].orientation, Orientation::Horizontal);
        assert_eq!(set.groups[0].members, vec!["M5", "M6", "M7"]);
        assert_eq!(set.groups[0].orientation, Orientation::Vertical);
        assert_eq!(set.self_symmetric, vec!["M8", "M9"]);
    }

    #[test]
    fn test_round_trip() {
        let mut set = parse(SAMPLE).unwrap();
        set.groups[0].orientation = Orientation::Horizontal;
        let text = serialize(&set);
        let reparsed = parse(&text).unwrap();
        assert!(set.same_constraints(&reparsed));
    }

    #[test]
    fn test_unknown_keyword_names_line_and_token() {
        let err = parse("SYMMETRY_AXIS 1\nsymmetry_pair M1 M2\n").unwrap_err();
        match err {
            SymmetryError::Parse { line, token, .. } => {
                assert_eq!(line, 2);
                assert_eq!(token, "symmetry_pair");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_pair_token_count() {
        assert!(parse("SYMMETRY_PAIR M1").is_err());
        assert!(parse("SYMMETRY_PAIR M1 M2 VERTICAL extra").is_err());
    }

    #[test]
    fn test_bad_orientation() {
        let err = parse("SYMMETRY_PAIR M1 M2 DIAGONAL").unwrap_err();
        match err {
            SymmetryError::Parse { token, .. } => assert_eq!(token, "DIAGONAL"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_group_needs_two_devices() {
        assert!(parse("SYMMETRY_GROUP M1").is_err());
        assert!(parse("SYMMETRY_GROUP M1 HORIZONTAL").is_err());
        assert!(parse("SELF_SYMMETRY").is_err());
    }

    #[test]
    fn test_duplicate_roles_batched() {
        let text = "\
SYMMETRY_PAIR M1 M2
SYMMETRY_PAIR M2 M3
SELF_SYMMETRY M3 M1
SELF_SYMMETRY M9
";
        match parse(text).unwrap_err() {
            SymmetryError::DuplicateRole { devices } => {
                assert_eq!(devices, vec!["M1", "M2", "M3"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_structural_error_wins_over_duplicates() {
        let text = "SYMMETRY_PAIR M1 M2\nSYMMETRY_PAIR M1 M3\nBOGUS\n";
        assert!(matches!(
            parse(text).unwrap_err(),
            SymmetryError::Parse { line: 3, .. }
        ));
    }

    #[test]
    fn test_second_axis_rejected() {
        assert!(parse("SYMMETRY_AXIS 1\nSYMMETRY_AXIS 2\n").is_err());
        assert!(parse("SYMMETRY_AXIS left").is_err());
    }

    #[test]
    fn test_non_finite_axis_parses() {
        let set = parse("SYMMETRY_AXIS inf").unwrap();
        assert!(set.axis.unwrap().is_infinite());
    }

    #[test]
    fn test_serialize_empty() {
        let text = serialize(&SymmetryConstraintSet::new());
        assert!(parse(&text).unwrap().is_empty());
    }
}
