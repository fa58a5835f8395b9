use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const CONFIG: &str = r#"
family:
  total_assets: 200000
  contribution_threshold: 50000
  monthly_expenses: 4000
current_property:
  surface: 50
  monthly_rental_income: 1500
  monthly_charges: 100
  annual_property_tax: 1200
mortgages:
  - bank: Banque A
    amount: 350000
    interest_rate: 0.035
    duration_years: 25
    monthly_cost: 1200
    monthly_insurance: 50
  - bank: Banque B
    amount: 400000
    interest_rate: 0.037
    duration_years: 25
city_stats:
  - zip_code: "75010"
    house_price_per_m2: 6000
    apartment_price_per_m2: 4500
goods:
  - id: paris-10
    price: 400000
    living_space: 80
    carrez_living_space: 80
    property_type: apartment
    zip_code: "75010"
  - id: nowhere
    price: 400000
    living_space: 80
    carrez_living_space: 80
    property_type: apartment
    zip_code: "00000"
"#;

fn jimi_cmd() -> Command {
    let mut cmd = Command::cargo_bin("jimi").unwrap();
    cmd.env_remove("JIMI_CONFIG").env_remove("RUST_LOG");
    cmd
}

fn write_config(dir: &TempDir, content: &str) -> String {
    let path = dir.path().join("config.yaml");
    fs::write(&path, content).unwrap();
    path.display().to_string()
}

#[test]
fn evaluate_prints_every_scenario() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, CONFIG);

    jimi_cmd()
        .args(["immo", "evaluate", "--config", &config])
        .assert()
        .success()
        .stdout(predicate::str::contains("good: paris-10").count(2))
        .stdout(predicate::str::contains("good: nowhere").count(2))
        .stdout(predicate::str::contains("11% above the average"))
        .stdout(predicate::str::contains("Contribution is above threshold (82k > 50k)"))
        .stdout(predicate::str::contains("- City stats not found"))
        .stderr(predicate::str::contains("City stats not found"));
}

#[test]
fn evaluate_reads_config_from_environment() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, CONFIG);

    jimi_cmd()
        .env("JIMI_CONFIG", &config)
        .args(["immo", "evaluate", "--good", "paris-10", "--bank", "banque a"])
        .assert()
        .success()
        .stdout(predicate::str::contains("bank: Banque A"))
        .stdout(predicate::str::contains("bank: Banque B").not());
}

#[test]
fn evaluate_outputs_json() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, CONFIG);

    let output = jimi_cmd()
        .args(["immo", "evaluate", "--config", &config, "--format", "json"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let reports: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(reports.as_array().map(Vec::len), Some(4));
    assert_eq!(
        reports[0]["evaluation"]["purchase_cost"]["contribution"],
        serde_json::json!(82_000.0)
    );
}

#[test]
fn evaluate_rejects_invalid_config() {
    let dir = TempDir::new().unwrap();
    let config = write_config(
        &dir,
        &CONFIG.replacen("carrez_living_space: 80", "carrez_living_space: 0", 1),
    );

    jimi_cmd()
        .args(["immo", "evaluate", "--config", &config])
        .assert()
        .failure()
        .stderr(predicate::str::contains("goods.paris-10.carrez_living_space"));
}

#[test]
fn evaluate_fails_when_filters_match_nothing() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, CONFIG);

    jimi_cmd()
        .args(["immo", "evaluate", "--config", &config, "--good", "unknown"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no scenario matches"));
}

#[test]
fn show_schema_describes_goods() {
    jimi_cmd()
        .args(["immo", "show-schema"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"carrez_living_space\""))
        .stdout(predicate::str::contains("\"apartment\""));
}

#[cfg(unix)]
#[test]
fn analyze_writes_markdown_report() {
    let dir = TempDir::new().unwrap();
    let output_dir = dir.path().join("reports");

    jimi_cmd()
        .args(["immo", "analyze", "seloger-42", "--runner", "echo", "--sections", "1,6"])
        .arg("--output-dir")
        .arg(&output_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Analysis completed"));

    let report = fs::read_to_string(output_dir.join("analysis-seloger-42.md")).unwrap();
    assert!(report.contains("## 1. Renovation"));
    assert!(report.contains("## 6. Risks"));
    assert!(!report.contains("## 2. Location Intelligence"));
}

#[cfg(unix)]
#[test]
fn analyze_stops_on_failing_runner() {
    let dir = TempDir::new().unwrap();

    jimi_cmd()
        .args(["immo", "analyze", "seloger-42", "--runner", "false"])
        .arg("--output-dir")
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("1. Renovation"));
}
