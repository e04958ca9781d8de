use std::{fs, path::PathBuf};

use tempfile::tempdir;

use pinwire_cli::Config;

/// Collects all .yaml files from a directory
fn collect_yaml_files(dir: PathBuf) -> Vec<PathBuf> {
    let mut files = if let Ok(entries) = fs::read_dir(&dir) {
        entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("yaml")
            })
            .collect()
    } else {
        Vec::new()
    };

    // Sort for consistent test output
    files.sort();
    files
}

#[test]
fn e2e_smoke_test_valid_demos() {
    let temp_dir = tempdir().expect("Failed to create temp directory");

    let valid_demos = collect_yaml_files(PathBuf::from("demos"));

    assert!(!valid_demos.is_empty(), "No valid demos found in demos/");

    let mut failed_demos = Vec::new();

    for demo_path in &valid_demos {
        let output_filename =
            format!("{}.svg", demo_path.file_stem().unwrap().to_string_lossy());
        let output_path = temp_dir.path().join(output_filename);

        let cfg = Config {
            file: demo_path.to_string_lossy().to_string(),
            output: output_path.to_string_lossy().to_string(),
            log_level: "off".to_string(),
            config: None,
        };

        match pinwire_cli::run(&cfg) {
            Ok(()) => {
                let svg = fs::read_to_string(&output_path).expect("Output file missing");
                assert!(svg.contains("<svg"), "{} produced no SVG", demo_path.display());
            }
            Err(e) => failed_demos.push((demo_path.clone(), e)),
        }
    }

    if !failed_demos.is_empty() {
        eprintln!("\nValid demos that failed:");
        for (path, err) in &failed_demos {
            eprintln!("  - {}: {}", path.display(), err);
        }
        panic!("{} valid demo(s) failed unexpectedly", failed_demos.len());
    }

    println!("✅ All {} valid demos passed", valid_demos.len());
}

#[test]
fn e2e_smoke_test_error_demos() {
    let temp_dir = tempdir().expect("Failed to create temp directory");

    let error_demos = collect_yaml_files(PathBuf::from("demos/errors"));

    assert!(
        !error_demos.is_empty(),
        "No error demos found in demos/errors/"
    );

    let mut unexpectedly_succeeded = Vec::new();

    for demo_path in &error_demos {
        let output_filename = format!(
            "error_{}.svg",
            demo_path.file_stem().unwrap().to_string_lossy()
        );
        let output_path = temp_dir.path().join(output_filename);

        let cfg = Config {
            file: demo_path.to_string_lossy().to_string(),
            output: output_path.to_string_lossy().to_string(),
            log_level: "off".to_string(),
            config: None,
        };

        if pinwire_cli::run(&cfg).is_ok() {
            unexpectedly_succeeded.push(demo_path.clone());
        }
    }

    if !unexpectedly_succeeded.is_empty() {
        eprintln!("\nError demos that unexpectedly succeeded:");
        for path in &unexpectedly_succeeded {
            eprintln!("  - {}", path.display());
        }
        panic!(
            "{} error demo(s) succeeded unexpectedly",
            unexpectedly_succeeded.len()
        );
    }

    println!(
        "✅ All {} error demos failed as expected",
        error_demos.len()
    );
}

#[test]
fn e2e_layout_config_overrides_apply() {
    let temp_dir = tempdir().expect("Failed to create temp directory");

    let config_path = temp_dir.path().join("pinwire.toml");
    fs::write(
        &config_path,
        "[layout]\nmargin = 40.0\n\n[style]\nbackground_color = \"#101418\"\n",
    )
    .expect("Failed to write config");

    let output_path = temp_dir.path().join("blink.svg");
    let cfg = Config {
        file: "demos/blink.yaml".to_string(),
        output: output_path.to_string_lossy().to_string(),
        log_level: "off".to_string(),
        config: Some(config_path.to_string_lossy().to_string()),
    };

    pinwire_cli::run(&cfg).expect("Run with config failed");

    let svg = fs::read_to_string(&output_path).expect("Output file missing");
    assert!(svg.contains("#101418"), "Background override not applied");
}
