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

/// Minimal graph: one department/course/section, one student, one
/// assignment. Enrollment and submission rows vary per test.
fn write_base_fixture(dir: &Path) {
    write_csv(
        dir,
        "departments.csv",
        "department_id,name\nCS,Computer Science\n",
    );
    write_csv(
        dir,
        "students.csv",
        "student_id,email,first_name,last_name,enrollment_date,major,year_level\n\
         S001,ada@u.edu,Ada,Lovelace,2022-09-01,Computer Science,Junior\n",
    );
    write_csv(
        dir,
        "courses.csv",
        "course_id,course_name,department,credits\nCS101,Intro to Programming,Computer Science,4\n",
    );
    write_csv(
        dir,
        "sections.csv",
        "section_id,course_id,section_number,semester,year\nSEC1,CS101,001,Fall 2024,2024\n",
    );
    write_csv(
        dir,
        "assignments.csv",
        "assignment_id,section_id,course_id,title,type,total_points,due_date\n\
         A001,SEC1,CS101,Homework 1,Homework,100,2024-09-15\n",
    );
}

#[test]
fn enrollment_reimport_overwrites_fields() {
    let data = temp_dir("campus-import-reconcile-enrollment");
    write_base_fixture(&data);
    write_csv(
        &data,
        "enrollments.csv",
        "enrollment_id,student_id,section_id,course_id,semester,enrollment_date,status,grade\n\
         E001,S001,SEC1,CS101,Fall 2024,2024-09-01,Enrolled,B+\n",
    );

    let mut conn = Connection::open_in_memory().expect("open db");
    db::init_schema(&conn).expect("schema");
    import::run(&mut conn, &data).expect("first run");

    let (grade, points): (String, f64) = conn
        .query_row(
            "SELECT grade, grade_points FROM enrollments WHERE enrollment_id = 'E001'",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .expect("query");
    assert_eq!(grade, "B+");
    assert_eq!(points, 3.3);

    // Same natural key, corrected grade. One row, second run's values.
    write_csv(
        &data,
        "enrollments.csv",
        "enrollment_id,student_id,section_id,course_id,semester,enrollment_date,status,grade\n\
         E001,S001,SEC1,CS101,Fall 2024,2024-09-01,Completed,A\n",
    );
    import::run(&mut conn, &data).expect("second run");

    assert_eq!(db::table_count(&conn, "enrollments").expect("count"), 1);
    let (grade, points, status): (String, f64, String) = conn
        .query_row(
            "SELECT grade, grade_points, status FROM enrollments WHERE enrollment_id = 'E001'",
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )
        .expect("query");
    assert_eq!(grade, "A");
    assert_eq!(points, 4.0);
    assert_eq!(status, "Completed");
}

#[test]
fn failing_grade_earns_no_credits() {
    let data = temp_dir("campus-import-reconcile-fail-grade");
    write_base_fixture(&data);
    write_csv(
        &data,
        "enrollments.csv",
        "enrollment_id,student_id,section_id,course_id,semester,grade,credits_earned\n\
         E001,S001,SEC1,CS101,Fall 2024,F,4\n",
    );

    let mut conn = Connection::open_in_memory().expect("open db");
    db::init_schema(&conn).expect("schema");
    import::run(&mut conn, &data).expect("run");

    let earned: i64 = conn
        .query_row(
            "SELECT credits_earned FROM enrollments WHERE enrollment_id = 'E001'",
            [],
            |row| row.get(0),
        )
        .expect("query");
    assert_eq!(earned, 0, "F earns nothing, whatever the export claimed");
}

#[test]
fn submission_reconciles_by_natural_key_and_keeps_external_id() {
    let data = temp_dir("campus-import-reconcile-submission");
    write_base_fixture(&data);
    write_csv(
        &data,
        "submissions.csv",
        "submission_id,assignment_id,student_id,points_earned,status\n\
         SUB1,A001,S001,72,Graded\n",
    );

    let mut conn = Connection::open_in_memory().expect("open db");
    db::init_schema(&conn).expect("schema");
    import::run(&mut conn, &data).expect("first run");

    // A later export re-keys the same assignment+student pair. The stored
    // external id is immutable; fields still update.
    write_csv(
        &data,
        "submissions.csv",
        "submission_id,assignment_id,student_id,points_earned,status\n\
         SUB9,A001,S001,88,Graded\n",
    );
    import::run(&mut conn, &data).expect("second run");

    assert_eq!(db::table_count(&conn, "submissions").expect("count"), 1);
    let (submission_id, points): (String, f64) = conn
        .query_row(
            "SELECT submission_id, points_earned FROM submissions",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .expect("query");
    assert_eq!(submission_id, "SUB1");
    assert_eq!(points, 88.0);
}

#[test]
fn attendance_reconciles_on_student_section_date() {
    let data = temp_dir("campus-import-reconcile-attendance");
    write_base_fixture(&data);
    write_csv(
        &data,
        "attendance.csv",
        "record_id,student_id,section_id,course_id,date,status\n\
         AT1,S001,SEC1,CS101,2024-09-03,Absent\n",
    );

    let mut conn = Connection::open_in_memory().expect("open db");
    db::init_schema(&conn).expect("schema");
    import::run(&mut conn, &data).expect("first run");

    write_csv(
        &data,
        "attendance.csv",
        "record_id,student_id,section_id,course_id,date,status\n\
         AT1,S001,SEC1,CS101,2024-09-03,Excused\n",
    );
    import::run(&mut conn, &data).expect("second run");

    assert_eq!(
        db::table_count(&conn, "attendance_records").expect("count"),
        1
    );
    let status: String = conn
        .query_row(
            "SELECT status FROM attendance_records WHERE record_id = 'AT1'",
            [],
            |row| row.get(0),
        )
        .expect("query");
    assert_eq!(status, "Excused");
}

#[test]
fn strict_create_entities_ignore_changed_reimports() {
    let data = temp_dir("campus-import-first-wins");
    write_base_fixture(&data);
    write_csv(
        &data,
        "library_books.csv",
        "book_id,title,author\nBK1,Original Title,Someone\n",
    );

    let mut conn = Connection::open_in_memory().expect("open db");
    db::init_schema(&conn).expect("schema");
    import::run(&mut conn, &data).expect("first run");

    write_csv(
        &data,
        "library_books.csv",
        "book_id,title,author\nBK1,Retitled,Someone Else\n",
    );
    let summary = import::run(&mut conn, &data).expect("second run");

    assert_eq!(summary.imported("Library Books"), 0);
    let title: String = conn
        .query_row(
            "SELECT title FROM books WHERE book_id = 'BK1'",
            [],
            |row| row.get(0),
        )
        .expect("query");
    assert_eq!(title, "Original Title", "first import wins");
}
