use std::fs;
use std::path::{Path, PathBuf};
use svg2laser::error::{ConversionError, DocumentError};
use svg2laser::{ConversionConfig, Unit, convert_svg_file, convert_svg_str};
use tempfile::TempDir;

fn artifacts_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/artifacts")
}

fn read_artifact(name: &str) -> String {
    fs::read_to_string(artifacts_dir().join(name))
        .unwrap_or_else(|e| panic!("Failed to read artifact {}: {}", name, e))
}

/// Convert `<name>.svg` to a temporary file and compare it with `<expected>`.
fn run_conversion_test(name: &str, expected: &str, config: &ConversionConfig) {
    let svg_path = artifacts_dir().join(format!("{}.svg", name));
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let output_path = temp_dir.path().join(format!("{}.gcode", name));

    convert_svg_file(&svg_path, &output_path, config)
        .unwrap_or_else(|e| panic!("Failed to convert {}: {}", name, e));

    let actual = fs::read_to_string(&output_path).expect("Failed to read output");
    let expected = read_artifact(expected);
    assert_eq!(
        actual, expected,
        "G-code mismatch for {}\n--- actual ---\n{}\n--- expected ---\n{}",
        name, actual, expected
    );
}

fn document_size() -> ConversionConfig {
    ConversionConfig {
        use_document_size: true,
        ..Default::default()
    }
}

#[test]
fn test_rect() {
    run_conversion_test("rect", "rect.gcode", &document_size());
}

#[test]
fn test_layer_b() {
    let config = ConversionConfig {
        layer_name: Some("B".to_string()),
        ..document_size()
    };
    run_conversion_test("layers", "layers_B.gcode", &config);
}

#[test]
fn test_unknown_layer_draws_nothing() {
    let config = ConversionConfig {
        layer_name: Some("C".to_string()),
        ..document_size()
    };
    let lines = convert_svg_str(&read_artifact("layers.svg"), &config).unwrap();
    assert!(lines.iter().all(|l| !l.starts_with("G0") && !l.starts_with("G1")));
}

#[test]
fn test_all_layers_without_filter() {
    let lines = convert_svg_str(&read_artifact("layers.svg"), &document_size()).unwrap();
    let travels: Vec<_> = lines.iter().filter(|l| l.starts_with("G0")).collect();
    // defs content is never drawn
    assert_eq!(travels, vec!["G0 X10.00 Y90.00;", "G0 X50.00 Y50.00;"]);
}

#[test]
fn test_shapes() {
    let lines = convert_svg_str(&read_artifact("shapes.svg"), &document_size()).unwrap();

    let travels: Vec<_> = lines.iter().filter(|l| l.starts_with("G0")).collect();
    assert_eq!(
        travels,
        vec![
            "G0 X30.00 Y150.00;",
            "G0 X120.00 Y150.00;",
            "G0 X15.00 Y90.00;",
            "G0 X100.00 Y90.00;",
            "G0 X100.00 Y10.00;",
            "G0 X150.00 Y90.00;",
        ]
    );

    // Every cut of the circle stays on its radius.
    let circle: Vec<(f64, f64)> = lines
        .iter()
        .skip_while(|l| !l.starts_with("G0 X30.00"))
        .skip(1)
        .take_while(|l| !l.starts_with("M5"))
        .filter(|l| l.starts_with("G1"))
        .map(|l| parse_xy(l))
        .collect();
    assert!(circle.len() > 16);
    for (x, y) in &circle {
        let r = (x - 50.0).hypot(y - 150.0);
        assert!((r - 20.0).abs() < 0.02, "({}, {}) is off the circle", x, y);
    }
    assert_eq!(circle.last(), Some(&(30.0, 150.0)));
}

fn parse_xy(line: &str) -> (f64, f64) {
    let value = |axis: char| {
        line.split_whitespace()
            .find_map(|word| word.strip_prefix(axis))
            .map(|v| v.trim_end_matches(';').parse::<f64>().unwrap())
            .unwrap()
    };
    (value('X'), value('Y'))
}

#[test]
fn test_transforms_and_hidden_elements() {
    let config = ConversionConfig {
        invert_y_axis: true,
        ..Default::default()
    };
    let lines = convert_svg_str(&read_artifact("transforms.svg"), &config).unwrap();
    let moves: Vec<_> = lines
        .iter()
        .filter(|l| l.starts_with("G0") || l.starts_with("G1"))
        .map(String::as_str)
        .collect();
    assert_eq!(
        moves,
        vec![
            "G0 X10.00 Y10.00;",
            "G1 F750 X20.00 Y10.00;",
            "G1 X20.00 Y20.00;",
            "G0 X10.00 Y10.00;",
            "G1 X10.00 Y20.00;",
        ]
    );
}

#[test]
fn test_multipass_file_output() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("rect.gcode");
    let config = ConversionConfig {
        passes: 3,
        ..document_size()
    };

    convert_svg_file(&artifacts_dir().join("rect.svg"), &output, &config).unwrap();
    let content = fs::read_to_string(&output).unwrap();

    assert!(content.ends_with("M5;\n"));
    assert_eq!(content.matches("G0 X10.00 Y90.00;").count(), 3);
    assert_eq!(content.matches("G1 F750 X30.00 Y90.00;").count(), 3);
    assert_eq!(content.matches("G91;\nG1 Z-1.00;\nG90;").count(), 2);
}

#[test]
fn test_equal_speeds_still_set_cutting_feed() {
    let svg = r#"<svg xmlns="http://www.w3.org/2000/svg"><path d="M10,10 L20,10"/></svg>"#;
    let config = ConversionConfig {
        travel_speed: 1000.0,
        cutting_speed: 1000.0,
        ..Default::default()
    };
    let lines = convert_svg_str(svg, &config).unwrap();

    assert!(lines.contains(&"G0 X10.00 Y190.00;".to_string()));
    assert!(lines.contains(&"G1 F1000 X20.00 Y190.00;".to_string()));
}

#[test]
fn test_pass_depth_steps_sum_to_total() {
    let config = ConversionConfig {
        passes: 5,
        pass_depth: 0.125,
        ..document_size()
    };
    let lines = convert_svg_str(&read_artifact("rect.svg"), &config).unwrap();

    let total: f64 = lines
        .iter()
        .filter_map(|l| l.strip_prefix("G1 Z"))
        .map(|v| v.trim_end_matches(';').parse::<f64>().unwrap())
        .sum();
    assert!((total + 0.5).abs() < 1e-9, "total depth {}", total);
}

#[test]
fn test_custom_commands_and_units() {
    let config = ConversionConfig {
        unit: Unit::Inches,
        tool_power_command: "M106 S255".to_string(),
        tool_off_command: "M107".to_string(),
        approximation_tolerance: 0.001,
        ..document_size()
    };
    let lines = convert_svg_str(&read_artifact("rect.svg"), &config).unwrap();

    assert_eq!(lines[1], "G20;");
    assert!(lines.contains(&"M106 S255".to_string()));
    assert!(lines.iter().all(|l| !l.starts_with("M3") && !l.starts_with("M5")));
    assert!(lines.contains(&"G0 X10.000 Y90.000;".to_string()));
}

#[test]
fn test_malformed_path_writes_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("broken.gcode");

    let result = convert_svg_file(
        &artifacts_dir().join("broken.svg"),
        &output,
        &ConversionConfig::default(),
    );
    assert!(matches!(
        result,
        Err(ConversionError::Document(DocumentError::Path(_)))
    ));
    assert!(!output.exists());
}

#[test]
fn test_missing_document_size() {
    let svg = r#"<svg xmlns="http://www.w3.org/2000/svg"><path d="M0,0 L1,1"/></svg>"#;
    let result = convert_svg_str(svg, &document_size());
    assert!(matches!(
        result,
        Err(ConversionError::Document(DocumentError::MissingDimensions))
    ));
}

#[test]
fn test_config_file() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("laser.toml");
    fs::write(
        &config_path,
        r#"
use_document_size = true
cutting_speed = 1200
header = ["; my laser"]
footer = ["M2"]
"#,
    )
    .unwrap();

    let config = ConversionConfig::load(&config_path).unwrap();
    let lines = convert_svg_str(&read_artifact("rect.svg"), &config).unwrap();
    assert_eq!(lines.first().map(String::as_str), Some("; my laser"));
    assert_eq!(lines.last().map(String::as_str), Some("M2"));
    assert!(lines.contains(&"G1 F1200 X30.00 Y90.00;".to_string()));
}
