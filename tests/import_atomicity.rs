use campus_import::{db, import};
use rusqlite::Connection;
use std::path::{Path, PathBuf};
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

#[test]
fn failed_run_rolls_back_everything() {
    let data = temp_dir("campus-import-atomicity");
    write_csv(
        &data,
        "departments.csv",
        "department_id,name\nCS,Computer Science\nMATH,Mathematics\n",
    );
    write_csv(
        &data,
        "students.csv",
        "student_id,email,first_name,last_name\nS001,ada@u.edu,Ada,Lovelace\n",
    );
    // Ragged record: four fields under a two-column header. Structural
    // damage is transaction-fatal, unlike a merely malformed value.
    write_csv(
        &data,
        "events.csv",
        "event_id,name\nEV1,Orientation,extra,fields\n",
    );

    let mut conn = Connection::open_in_memory().expect("open db");
    db::init_schema(&conn).expect("schema");

    let result = import::run(&mut conn, &data);
    assert!(result.is_err(), "ragged events.csv must fail the run");

    // Departments and students were imported before events in the run
    // order; the rollback must have discarded them.
    assert_eq!(db::table_count(&conn, "departments").expect("count"), 0);
    assert_eq!(db::table_count(&conn, "accounts").expect("count"), 0);
    assert_eq!(db::table_count(&conn, "student_profiles").expect("count"), 0);
    assert_eq!(db::table_count(&conn, "events").expect("count"), 0);
}

#[test]
fn failed_run_leaves_prior_snapshot_intact() {
    let data = temp_dir("campus-import-atomicity-prior");
    write_csv(
        &data,
        "departments.csv",
        "department_id,name\nCS,Computer Science\n",
    );

    let mut conn = Connection::open_in_memory().expect("open db");
    db::init_schema(&conn).expect("schema");
    import::run(&mut conn, &data).expect("seed run");
    assert_eq!(db::table_count(&conn, "departments").expect("count"), 1);

    write_csv(
        &data,
        "departments.csv",
        "department_id,name\nMATH,Mathematics\nPHYS,Physics,ragged\n",
    );
    assert!(import::run(&mut conn, &data).is_err());

    // Only the pre-run snapshot survives: no MATH row from the aborted run.
    assert_eq!(db::table_count(&conn, "departments").expect("count"), 1);
    let name: String = conn
        .query_row("SELECT name FROM departments", [], |row| row.get(0))
        .expect("query");
    assert_eq!(name, "Computer Science");
}
