//! Point file reader.
//!
//! One hit per line: `x y z [layer]`, whitespace separated, in millimeters.
//! Blank lines and lines starting with `#` are skipped.

use crate::error::{Error, Result};
use log::debug;
use std::fs;
use std::path::Path;
use trackhough_core::Point;

/// Reads every hit from a point file.
///
/// # Errors
/// Returns `Error::Io` if the file cannot be read and `Error::InvalidFormat`
/// for the first malformed line.
pub fn read_points<P: AsRef<Path>>(path: P) -> Result<Vec<Point>> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;
    let points = parse_points(&text)?;
    debug!("read {} points from {}", points.len(), path.display());
    Ok(points)
}

/// Parses hits from the text of a point file.
///
/// # Errors
/// Returns `Error::InvalidFormat` for the first malformed line.
pub fn parse_points(text: &str) -> Result<Vec<Point>> {
    let mut points = Vec::new();
    for (idx, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        points.push(parse_line(line, idx + 1)?);
    }
    Ok(points)
}

fn parse_line(line: &str, number: usize) -> Result<Point> {
    let invalid = |message: String| Error::InvalidFormat {
        line: number,
        message,
    };
    let fields: Vec<&str> = line.split_whitespace().collect();
    if !(3..=4).contains(&fields.len()) {
        return Err(invalid(format!(
            "expected `x y z [layer]`, got {} fields",
            fields.len()
        )));
    }

    let mut coords = [0.0; 3];
    for (coord, field) in coords.iter_mut().zip(&fields) {
        let value: f64 = field
            .parse()
            .map_err(|_| invalid(format!("`{field}` is not a number")))?;
        if !value.is_finite() {
            return Err(invalid(format!("`{field}` is not finite")));
        }
        *coord = value;
    }

    let layer = match fields.get(3) {
        Some(field) => field
            .parse::<u8>()
            .map_err(|_| invalid(format!("`{field}` is not a layer index")))?,
        None => 0,
    };
    Ok(Point::new(coords[0], coords[1], coords[2]).with_layer(layer))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_points_with_comments_and_layers() {
        let text = "# x y z layer\n\n1.5 -2 0\n  3 4 5 7  \n# trailing\n";
        let points = parse_points(text).unwrap();
        assert_eq!(
            points,
            vec![
                Point::new(1.5, -2.0, 0.0),
                Point::new(3.0, 4.0, 5.0).with_layer(7)
            ]
        );
    }

    #[test]
    fn test_parse_points_reports_line_numbers() {
        let err = parse_points("1 2 3\n# ok\n1 two 3\n").unwrap_err();
        assert!(matches!(err, Error::InvalidFormat { line: 3, .. }));

        let err = parse_points("1 2\n").unwrap_err();
        assert!(matches!(err, Error::InvalidFormat { line: 1, .. }));

        let err = parse_points("1 2 3 4 5\n").unwrap_err();
        assert!(matches!(err, Error::InvalidFormat { line: 1, .. }));
    }

    #[test]
    fn test_parse_points_rejects_non_finite() {
        let err = parse_points("0 0 0\nnan 1 2\n").unwrap_err();
        assert!(matches!(err, Error::InvalidFormat { line: 2, .. }));
        let err = parse_points("1 inf 2\n").unwrap_err();
        assert!(matches!(err, Error::InvalidFormat { line: 1, .. }));
    }

    #[test]
    fn test_parse_points_rejects_bad_layer() {
        let err = parse_points("1 2 3 300\n").unwrap_err();
        assert!(matches!(err, Error::InvalidFormat { line: 1, .. }));
        let err = parse_points("1 2 3 -1\n").unwrap_err();
        assert!(matches!(err, Error::InvalidFormat { line: 1, .. }));
    }

    #[test]
    fn test_empty_input() {
        assert!(parse_points("").unwrap().is_empty());
        assert!(parse_points("# only a comment\n\n").unwrap().is_empty());
    }
}
