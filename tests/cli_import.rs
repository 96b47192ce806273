use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_dir(prefix: &str) -> PathBuf {
    let p = std::env::temp_dir().join(format!(
        "{}-{}",
        prefix,
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos()
    ));
    std::fs::create_dir_all(&p).expect("create temp dir");
    p
}

fn write_csv(dir: &Path, name: &str, content: &str) {
    std::fs::write(dir.join(name), content).expect("write csv");
}

fn run_import(args: &[&str]) -> std::process::Output {
    let exe = env!("CARGO_BIN_EXE_campus-import");
    Command::new(exe)
        .args(args)
        .output()
        .expect("spawn campus-import")
}

#[test]
fn cli_imports_and_prints_summary() {
    let workspace = temp_dir("campus-import-cli");
    let data = workspace.join("data");
    std::fs::create_dir_all(&data).expect("data dir");
    write_csv(
        &data,
        "departments.csv",
        "department_id,name\nCS,Computer Science\nMATH,Mathematics\n",
    );
    let db_path = workspace.join("campus.sqlite3");

    let output = run_import(&[
        data.to_str().expect("utf8 path"),
        "--database",
        db_path.to_str().expect("utf8 path"),
    ]);
    assert!(output.status.success(), "import should exit zero");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("=== Import Summary ==="), "got: {stdout}");
    assert!(stdout.contains("Departments: 2"), "got: {stdout}");
    assert!(stdout.contains("Total records imported: 2"), "got: {stdout}");
    assert!(db_path.exists(), "database file should be created");

    // Rerun against the same store: no duplicates, zero imports.
    let output = run_import(&[
        data.to_str().expect("utf8 path"),
        "--database",
        db_path.to_str().expect("utf8 path"),
    ]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Departments: 0"), "got: {stdout}");
}

#[test]
fn cli_emits_json_summary_on_request() {
    let workspace = temp_dir("campus-import-cli-json");
    let data = workspace.join("data");
    std::fs::create_dir_all(&data).expect("data dir");
    write_csv(
        &data,
        "departments.csv",
        "department_id,name\nCS,Computer Science\n",
    );
    let db_path = workspace.join("campus.sqlite3");

    let output = run_import(&[
        data.to_str().expect("utf8 path"),
        "--database",
        db_path.to_str().expect("utf8 path"),
        "--summary-json",
    ]);
    assert!(output.status.success());

    let summary: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("summary should be valid json");
    let departments = summary["entities"]
        .as_array()
        .expect("entities array")
        .iter()
        .find(|e| e["entity"] == "Departments")
        .expect("departments entry")
        .clone();
    assert_eq!(departments["imported"], 1);
}

#[test]
fn cli_fails_on_missing_data_dir() {
    let workspace = temp_dir("campus-import-cli-missing");
    let db_path = workspace.join("campus.sqlite3");

    let output = run_import(&[
        workspace.join("no-such-dir").to_str().expect("utf8 path"),
        "--database",
        db_path.to_str().expect("utf8 path"),
    ]);
    assert!(
        !output.status.success(),
        "missing data directory must exit non-zero"
    );
}

#[test]
fn cli_fails_and_rolls_back_on_structural_damage() {
    let workspace = temp_dir("campus-import-cli-fatal");
    let data = workspace.join("data");
    std::fs::create_dir_all(&data).expect("data dir");
    write_csv(
        &data,
        "departments.csv",
        "department_id,name\nCS,Computer Science\n",
    );
    write_csv(&data, "events.csv", "event_id,name\nEV1,Gala,ragged\n");
    let db_path = workspace.join("campus.sqlite3");

    let output = run_import(&[
        data.to_str().expect("utf8 path"),
        "--database",
        db_path.to_str().expect("utf8 path"),
    ]);
    assert!(!output.status.success(), "fatal source must exit non-zero");

    let conn = rusqlite::Connection::open(&db_path).expect("open db");
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM departments", [], |row| row.get(0))
        .expect("count");
    assert_eq!(count, 0, "aborted run must leave no partial rows");
}
