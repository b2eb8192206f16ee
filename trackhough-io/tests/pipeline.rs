use approx::assert_relative_eq;
use std::f64::consts::FRAC_PI_2;
use std::fmt::Write as _;
use std::io::Write;
use tempfile::NamedTempFile;
use trackhough_algorithms::{find_tracks, RefinementController};
use trackhough_core::PolarPoint;
use trackhough_io::{load_config, read_points, Error, TrackFileWriter};

const CONFIG: &str = r#"{
    "R": 600.0,
    "B": 2.0,
    "threshold": 2,
    "main_accumulator_config": {
        "x_begin": -0.5, "x_end": 0.5, "x_dpi": 11,
        "y_begin": -1.0, "y_end": 1.0, "y_dpi": 201
    },
    "cell_accumulator_config": {
        "x_begin": 0.0, "x_end": 0.0, "x_dpi": 11,
        "y_begin": 0.0, "y_end": 0.0, "y_dpi": 11
    }
}"#;

fn points_file() -> NamedTempFile {
    let mut text = String::from("# three hits of a 5 m circle\n");
    for d in [50.0_f64, 200.0, 500.0] {
        let angle = 0.3 + (d / 10_000.0).asin();
        writeln!(text, "{} {} 0.0", d * angle.cos(), d * angle.sin()).unwrap();
    }
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(text.as_bytes()).unwrap();
    file
}

fn config_file() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(CONFIG.as_bytes()).unwrap();
    file
}

#[test]
fn test_files_to_candidates() {
    let points = read_points(points_file().path()).unwrap();
    assert_eq!(points.len(), 3);
    let config = load_config(config_file().path()).unwrap();

    let tracks = find_tracks(&points, &config).unwrap();
    let output = NamedTempFile::new().unwrap();
    let mut writer = TrackFileWriter::create(output.path()).unwrap();
    writer.write_candidates(&tracks).unwrap();
    drop(writer);

    let content = std::fs::read_to_string(output.path()).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 1);
    let fields: Vec<f64> = lines[0]
        .split(' ')
        .map(|f| f.parse().unwrap())
        .collect();
    assert_eq!(fields.len(), 2);
    assert_relative_eq!(fields[0], 5000.0, max_relative = 1e-6);
    assert_relative_eq!(fields[1], 0.3 + FRAC_PI_2, max_relative = 1e-6);
}

#[test]
fn test_accumulator_dump_shape() {
    let points = read_points(points_file().path()).unwrap();
    let config = load_config(config_file().path()).unwrap();
    let controller = RefinementController::new(config).unwrap();
    let grid = controller
        .coarse_grid(&PolarPoint::from_points(&points))
        .unwrap();

    let output = NamedTempFile::new().unwrap();
    let mut writer = TrackFileWriter::create(output.path()).unwrap();
    writer.write_accumulator_dump(&grid).unwrap();
    drop(writer);

    let content = std::fs::read_to_string(output.path()).unwrap();
    let rows: Vec<Vec<u32>> = content
        .lines()
        .map(|line| line.split(' ').map(|v| v.parse().unwrap()).collect())
        .collect();
    assert_eq!(rows.len(), 201);
    assert!(rows.iter().all(|row| row.len() == 11));
    assert_eq!(rows[130][6], 3);
    let total: u64 = rows.iter().flatten().map(|&v| u64::from(v)).sum();
    assert_eq!(total, grid.total_votes());
}

#[test]
fn test_malformed_points_file() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(b"1 2 3\n4 5\n").unwrap();
    assert!(matches!(
        read_points(file.path()),
        Err(Error::InvalidFormat { line: 2, .. })
    ));
}
