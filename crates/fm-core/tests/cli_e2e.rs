//! End-to-end tests for the fm-test binary.
//!
//! These tests verify result payloads on stdout, error reports on stderr and
//! the documented exit codes.

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;

/// Get a Command for the fm-test binary with a clean environment.
fn fm_test() -> Command {
    let mut cmd = Command::cargo_bin("fm-test").expect("fm-test binary should exist");
    cmd.env_remove("FM_CONFIG")
        .env_remove("FM_LOG")
        .env_remove("FM_LOG_FORMAT")
        .env_remove("RUST_LOG");
    cmd
}

fn stdout_json(cmd: &mut Command) -> serde_json::Value {
    let output = cmd.output().expect("command should run");
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout should be JSON")
}

fn stderr_json(cmd: &mut Command, exit: i32) -> serde_json::Value {
    let output = cmd.output().expect("command should run");
    assert_eq!(output.status.code(), Some(exit), "unexpected exit status");
    assert!(output.stdout.is_empty(), "errors must not write to stdout");
    serde_json::from_slice(&output.stderr).expect("stderr should be JSON")
}

fn approx(value: &serde_json::Value, expected: f64, tol: f64) -> bool {
    value
        .as_f64()
        .map(|v| (v - expected).abs() <= tol)
        .unwrap_or(false)
}

fn settings_file(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(contents.as_bytes()).expect("write settings");
    file
}

// ============================================================================
// counts
// ============================================================================

mod counts {
    use super::*;

    #[test]
    fn noninferiority_reference_json() {
        let json = stdout_json(fm_test().args([
            "counts", "20", "35", "30", "55", "--delta=-0.3", "--alternative", "greater",
        ]));
        assert!(approx(&json["statistic"], 3.154_558_182_822_2, 1e-9));
        assert!(approx(&json["p_value"], 0.000_803_706_6, 1e-9));
        assert_eq!(json["alternative"], "greater");
        assert_eq!(json["variant"], "risk-difference");
        assert!(approx(&json["null_value"], -0.3, 0.0));
    }

    #[test]
    fn negative_delta_as_separate_token() {
        let json = stdout_json(fm_test().args(["counts", "20", "35", "30", "55", "--delta", "-0.3"]));
        assert!(approx(&json["null_value"], -0.3, 0.0));
    }

    #[test]
    fn default_null_is_zero_two_sided() {
        let json = stdout_json(fm_test().args(["counts", "20", "35", "30", "55"]));
        assert!(approx(&json["statistic"], 0.241_746_889_207_614_17, 1e-12));
        assert!(approx(&json["p_value"], 0.808_976_294_576_234, 1e-12));
        assert_eq!(json["alternative"], "two-sided");
    }

    #[test]
    fn identical_groups_have_unit_p_value() {
        let json = stdout_json(fm_test().args(["counts", "5", "10", "5", "10"]));
        assert_eq!(json["statistic"], 0.0);
        assert_eq!(json["p_value"], 1.0);
    }

    #[test]
    fn rho_selects_risk_ratio() {
        let json = stdout_json(fm_test().args(["counts", "20", "35", "30", "55", "--rho", "1.2"]));
        assert_eq!(json["variant"], "risk-ratio");
        assert!(approx(&json["statistic"], -0.720_295_936_371_020_4, 1e-9));
        assert!(approx(&json["p_value"], 0.471_342_806_202_100_56, 1e-9));
    }

    #[test]
    fn poisson_flag_reads_totals_as_person_time() {
        let json = stdout_json(fm_test().args(["counts", "--poisson", "30", "1000", "15", "1200"]));
        assert_eq!(json["variant"], "rate-ratio");
        assert!(approx(&json["statistic"], 2.857_738_033_247_042, 1e-9));
    }

    #[test]
    fn summary_format() {
        fm_test()
            .args(["counts", "20", "35", "30", "55", "--delta=-0.3", "-a", "greater"])
            .args(["--format", "summary"])
            .assert()
            .success()
            .stdout(predicate::str::starts_with("risk-difference (delta = -0.300000, greater)"))
            .stdout(predicate::str::contains("z = 3.15456"))
            .stdout(predicate::str::contains("p = 0.000803707"));
    }

    #[test]
    fn markdown_format() {
        fm_test()
            .args(["-f", "md", "counts", "20", "35", "30", "55"])
            .assert()
            .success()
            .stdout(predicate::str::contains("| Field | Value |"))
            .stdout(predicate::str::contains("| Variant | risk-difference |"));
    }
}

// ============================================================================
// rates
// ============================================================================

mod rates {
    use super::*;

    #[test]
    fn unit_ratio_reference() {
        let json = stdout_json(fm_test().args(["rates", "30", "1000", "15", "1200"]));
        assert_eq!(json["variant"], "rate-ratio");
        assert!(approx(&json["statistic"], 2.857_738_033_247_042, 1e-9));
        assert!(approx(&json["p_value"], 0.004_266_724_822_176_121, 1e-9));
        assert!(approx(&json["null_value"], 1.0, 0.0));
    }

    #[test]
    fn shifted_ratio_reference() {
        let json = stdout_json(fm_test().args([
            "rates", "30", "1000", "15", "1200", "--rho", "2", "-a", "greater",
        ]));
        assert!(approx(&json["statistic"], 0.577_350_269_189_625_7, 1e-9));
        assert!(approx(&json["p_value"], 0.281_851_430_825_386_55, 1e-9));
        assert!(approx(&json["constrained"]["first"], 0.028_125, 1e-15));
    }

    #[test]
    fn zero_person_time_rejected() {
        let err = stderr_json(fm_test().args(["rates", "3", "0", "4", "10"]), 10);
        assert_eq!(err["context"]["field"], "t1");
    }
}

// ============================================================================
// outcomes
// ============================================================================

mod outcomes {
    use super::*;

    #[test]
    fn matches_equivalent_counts() {
        let from_outcomes = stdout_json(fm_test().args([
            "outcomes",
            "--first",
            "1,1,0,1,0,0,1,1",
            "--second",
            "no yes no no no yes no no no",
            "--delta",
            "0.1",
        ]));
        let from_counts =
            stdout_json(fm_test().args(["counts", "5", "8", "2", "9", "--delta", "0.1"]));
        assert_eq!(from_outcomes["statistic"], from_counts["statistic"]);
        assert!(approx(&from_outcomes["statistic"], 1.272_582_819_168_044_4, 1e-9));
    }

    #[test]
    fn unknown_token_names_group() {
        let err = stderr_json(
            fm_test().args(["outcomes", "--first", "1,0,maybe", "--second", "1,0"]),
            10,
        );
        assert_eq!(err["context"]["field"], "first");
    }

    #[test]
    fn empty_group_rejected() {
        let err = stderr_json(
            fm_test().args(["outcomes", "--first", "1,0", "--second", ""]),
            10,
        );
        assert_eq!(err["context"]["field"], "second");
    }
}

// ============================================================================
// Errors and exit codes
// ============================================================================

mod errors {
    use super::*;

    #[test]
    fn all_zero_counts_are_degenerate() {
        let err = stderr_json(fm_test().args(["counts", "0", "10", "0", "10"]), 11);
        assert_eq!(err["code"], 30);
        assert_eq!(err["category"], "numerical");
        assert_eq!(err["recoverable"], false);
    }

    #[test]
    fn events_above_total() {
        let err = stderr_json(fm_test().args(["counts", "12", "10", "3", "10"]), 10);
        assert_eq!(err["code"], 10);
        assert_eq!(err["context"]["field"], "x1");
    }

    #[test]
    fn negative_events() {
        let err = stderr_json(fm_test().args(["counts", "-1", "10", "3", "10"]), 10);
        assert_eq!(err["context"]["field"], "x1");
    }

    #[test]
    fn fractional_total() {
        let err = stderr_json(fm_test().args(["counts", "1", "10", "3", "10.5"]), 10);
        assert_eq!(err["context"]["field"], "n2");
    }

    #[test]
    fn delta_out_of_range() {
        let err = stderr_json(fm_test().args(["counts", "1", "10", "3", "10", "--delta", "1"]), 10);
        assert_eq!(err["context"]["field"], "delta");
    }

    #[test]
    fn unknown_alternative() {
        let err = stderr_json(
            fm_test().args(["counts", "1", "10", "3", "10", "-a", "sideways"]),
            10,
        );
        assert_eq!(err["context"]["field"], "alternative");
    }

    #[test]
    fn delta_with_ratio_variant() {
        let err = stderr_json(
            fm_test().args([
                "counts", "1", "10", "3", "10", "--delta", "0.1", "--variant", "risk-ratio",
            ]),
            10,
        );
        assert_eq!(err["context"]["field"], "delta");
    }

    #[test]
    fn out_of_range_root_tolerance() {
        let err = stderr_json(
            fm_test().args(["counts", "1", "10", "3", "10", "--root-tolerance", "0.5"]),
            10,
        );
        assert_eq!(err["context"]["field"], "root_tolerance");
    }

    #[test]
    fn human_errors_for_text_formats() {
        fm_test()
            .args(["-f", "summary", "counts", "12", "10", "3", "10"])
            .assert()
            .code(10)
            .stderr(predicate::str::contains("Invalid Argument"))
            .stderr(predicate::str::contains("Fix:"));
    }

    #[test]
    fn unknown_command_fails() {
        fm_test()
            .arg("nonexistent-command")
            .assert()
            .failure()
            .stderr(predicate::str::contains("error"));
    }

    #[test]
    fn delta_and_rho_conflict() {
        fm_test()
            .args(["counts", "1", "10", "3", "10", "--delta", "0.1", "--rho", "2"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("cannot be used with"));
    }
}

// ============================================================================
// Settings
// ============================================================================

mod settings {
    use super::*;

    #[test]
    fn config_prints_defaults() {
        fm_test()
            .arg("config")
            .assert()
            .success()
            .stdout(predicate::str::contains("[test]"))
            .stdout(predicate::str::contains("alternative = \"two-sided\""))
            .stdout(predicate::str::contains("root_tolerance"));
    }

    #[test]
    fn settings_file_sets_defaults() {
        let file = settings_file("[test]\nalternative = \"greater\"\n\n[output]\nformat = \"summary\"\nprecision = 3\n");
        fm_test()
            .arg("--config")
            .arg(file.path())
            .args(["counts", "20", "35", "30", "55", "--delta=-0.3"])
            .assert()
            .success()
            .stdout(predicate::str::contains("greater"))
            .stdout(predicate::str::contains("p = 0.000804"));
    }

    #[test]
    fn cli_flags_override_settings_file() {
        let file = settings_file("[output]\nformat = \"summary\"\n");
        let json = stdout_json(
            fm_test()
                .arg("--config")
                .arg(file.path())
                .args(["-f", "json", "counts", "5", "10", "5", "10"]),
        );
        assert_eq!(json["p_value"], 1.0);
    }

    #[test]
    fn env_var_names_settings_file() {
        let file = settings_file("[test]\nalternative = \"less\"\n");
        let json = stdout_json(
            fm_test()
                .env("FM_CONFIG", file.path())
                .args(["counts", "20", "35", "30", "55"]),
        );
        assert_eq!(json["alternative"], "less");
    }

    #[test]
    fn missing_settings_file() {
        let err = stderr_json(
            fm_test().args(["--config", "/nonexistent/fm.toml", "counts", "1", "10", "1", "10"]),
            12,
        );
        assert_eq!(err["code"], 40);
        assert_eq!(err["category"], "config");
    }

    #[test]
    fn invalid_settings_value() {
        let file = settings_file("[test]\nroot_tolerance = 0.5\n");
        let err = stderr_json(
            fm_test()
                .arg("--config")
                .arg(file.path())
                .args(["counts", "1", "10", "1", "10"]),
            12,
        );
        assert!(err["message"].as_str().unwrap().contains("root_tolerance"));
    }
}
