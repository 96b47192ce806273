use crate::fields;
use crate::import::upsert::{int, opt_text, real, text, upsert, Outcome, Policy, RowSpec};
use crate::import::{lookup_department_by_name, lookup_id, lookup_room, sources, Summary};
use crate::model;
use anyhow::Result;
use rusqlite::{params, types::Value, Connection};
use std::path::Path;
use tracing::{debug, info};

pub(crate) fn import_departments(conn: &Connection, dir: &Path, summary: &mut Summary) -> Result<()> {
    info!("importing departments");
    summary.touch("Departments");
    let rows = sources::read_rows(dir, "departments.csv", summary)?;
    for row in &rows {
        let Some(department_id) = fields::opt(row, &["department_id"]) else {
            summary.skip("Departments");
            continue;
        };
        let spec = RowSpec {
            table: "departments",
            id_column: "department_id",
            id: &department_id,
            fields: vec![
                ("name", text(fields::resolve(row, &["name"], ""))),
                // Older exports called the department head the dean.
                ("head", text(fields::resolve(row, &["head", "dean"], ""))),
                (
                    "budget",
                    real(fields::parse_decimal(
                        &fields::resolve(row, &["budget"], ""),
                        0.0,
                    )),
                ),
                ("phone", text(fields::resolve(row, &["phone"], ""))),
                ("email", text(fields::resolve(row, &["email"], ""))),
                ("building", text(fields::resolve(row, &["building"], ""))),
                (
                    "description",
                    text(fields::resolve(row, &["description"], "")),
                ),
            ],
        };
        if upsert(conn, spec, Policy::CreateIfAbsent)? != Outcome::Unchanged {
            summary.add("Departments");
        }
    }
    Ok(())
}

pub(crate) fn import_courses(conn: &Connection, dir: &Path, summary: &mut Summary) -> Result<()> {
    info!("importing courses");
    summary.touch("Courses");
    let rows = sources::read_rows(dir, "courses.csv", summary)?;
    for row in &rows {
        let Some(course_id) = fields::opt(row, &["course_id"]) else {
            summary.skip("Courses");
            continue;
        };
        // Courses reference their department by name; a course with no
        // resolvable department is still imported, just unattached.
        let department_pk = match fields::opt(row, &["department", "department_name"]) {
            Some(name) => lookup_department_by_name(conn, &name)?,
            None => None,
        };
        let spec = RowSpec {
            table: "courses",
            id_column: "course_id",
            id: &course_id,
            fields: vec![
                (
                    "course_name",
                    text(fields::resolve(row, &["course_name", "name"], "")),
                ),
                ("department_id", opt_text(department_pk)),
                (
                    "credits",
                    int(fields::parse_int(&fields::resolve(row, &["credits"], ""), 3)),
                ),
                (
                    "description",
                    text(fields::resolve(row, &["description"], "")),
                ),
                (
                    "prerequisites",
                    text(fields::resolve(row, &["prerequisites"], "")),
                ),
                (
                    "level",
                    text(fields::resolve(row, &["level"], "Undergraduate")),
                ),
                ("status", text(fields::resolve(row, &["status"], "Active"))),
            ],
        };
        if upsert(conn, spec, Policy::CreateIfAbsent)? != Outcome::Unchanged {
            summary.add("Courses");
        }
    }
    Ok(())
}

pub(crate) fn import_sections(conn: &Connection, dir: &Path, summary: &mut Summary) -> Result<()> {
    info!("importing sections");
    summary.touch("Sections");
    let rows = sources::read_rows(dir, "sections.csv", summary)?;
    for row in &rows {
        let Some(section_id) = fields::opt(row, &["section_id"]) else {
            summary.skip("Sections");
            continue;
        };
        let course_pk = match fields::opt(row, &["course_id"]) {
            Some(ident) => lookup_id(conn, "courses", "course_id", &ident)?,
            None => None,
        };
        let Some(course_pk) = course_pk else {
            debug!("section {}: course not found, skipping", section_id);
            summary.skip("Sections");
            continue;
        };
        // Instructor and room are optional; the section is kept even when
        // neither resolves.
        let instructor_pk = match fields::opt(row, &["instructor_id", "faculty_id"]) {
            Some(ident) => lookup_id(conn, "faculty_profiles", "faculty_id", &ident)?,
            None => None,
        };
        let room_pk = match fields::opt(row, &["room", "room_id"]) {
            Some(ident) => lookup_room(conn, &ident)?,
            None => None,
        };
        let spec = RowSpec {
            table: "sections",
            id_column: "section_id",
            id: &section_id,
            fields: vec![
                ("course_id", text(course_pk)),
                (
                    "section_number",
                    text(fields::resolve(row, &["section_number"], "")),
                ),
                ("semester", text(fields::resolve(row, &["semester"], ""))),
                (
                    "year",
                    int(fields::parse_int(&fields::resolve(row, &["year"], ""), 0)),
                ),
                ("instructor_id", opt_text(instructor_pk)),
                (
                    "instructor_name",
                    text(fields::resolve(row, &["instructor_name"], "")),
                ),
                (
                    "instructor_rank",
                    text(fields::resolve(row, &["instructor_rank"], "")),
                ),
                (
                    "meeting_days",
                    text(fields::resolve(row, &["meeting_days"], "")),
                ),
                (
                    "meeting_time",
                    text(fields::resolve(row, &["meeting_time"], "")),
                ),
                ("room_id", opt_text(room_pk)),
                (
                    "capacity",
                    int(fields::parse_int(
                        &fields::resolve(row, &["capacity"], ""),
                        30,
                    )),
                ),
                (
                    "enrolled",
                    int(fields::parse_int(&fields::resolve(row, &["enrolled"], ""), 0)),
                ),
                ("status", text(fields::resolve(row, &["status"], "Open"))),
            ],
        };
        if upsert(conn, spec, Policy::CreateIfAbsent)? != Outcome::Unchanged {
            summary.add("Sections");
        }
    }
    Ok(())
}

pub(crate) fn import_enrollments(conn: &Connection, dir: &Path, summary: &mut Summary) -> Result<()> {
    info!("importing enrollments");
    summary.touch("Enrollments");
    let rows = sources::read_rows(dir, "enrollments.csv", summary)?;
    for row in &rows {
        let Some(enrollment_id) = fields::opt(row, &["enrollment_id"]) else {
            summary.skip("Enrollments");
            continue;
        };
        let student_pk = match fields::opt(row, &["student_id"]) {
            Some(ident) => lookup_id(conn, "student_profiles", "student_id", &ident)?,
            None => None,
        };
        let section_pk = match fields::opt(row, &["section_id"]) {
            Some(ident) => lookup_id(conn, "sections", "section_id", &ident)?,
            None => None,
        };
        let course_pk = match fields::opt(row, &["course_id"]) {
            Some(ident) => lookup_id(conn, "courses", "course_id", &ident)?,
            None => None,
        };
        let (Some(student_pk), Some(section_pk), Some(course_pk)) =
            (student_pk, section_pk, course_pk)
        else {
            debug!("enrollment {}: unresolved reference, skipping", enrollment_id);
            summary.skip("Enrollments");
            continue;
        };

        let grade = fields::resolve(row, &["grade"], "");
        let mut grade_points = fields::parse_decimal(
            &fields::resolve(row, &["grade_points"], ""),
            0.0,
        );
        let mut credits_earned =
            fields::parse_int(&fields::resolve(row, &["credits_earned"], ""), 0);
        // Grade-derived values win over whatever the export carried; the
        // same rule runs on every enrollment write, not just imports.
        if let Some(points) = model::grade_points(&grade) {
            grade_points = points;
            let course_credits: i64 = conn.query_row(
                "SELECT credits FROM courses WHERE id = ?1",
                params![course_pk],
                |r| r.get(0),
            )?;
            credits_earned = model::credits_earned(&grade, course_credits);
        }

        let natural_key = [
            ("student_id", Value::Text(student_pk.clone())),
            ("section_id", Value::Text(section_pk.clone())),
        ];
        let spec = RowSpec {
            table: "enrollments",
            id_column: "enrollment_id",
            id: &enrollment_id,
            fields: vec![
                ("student_id", text(student_pk)),
                (
                    "student_name",
                    text(fields::resolve(row, &["student_name"], "")),
                ),
                ("section_id", text(section_pk)),
                ("course_id", text(course_pk)),
                ("semester", text(fields::resolve(row, &["semester"], ""))),
                (
                    "enrollment_date",
                    opt_text(model::date_text(fields::parse_date(&fields::resolve(
                        row,
                        &["enrollment_date"],
                        "",
                    )))),
                ),
                ("status", text(fields::resolve(row, &["status"], "Enrolled"))),
                ("grade", text(grade)),
                ("grade_points", real(grade_points)),
                (
                    "credits_attempted",
                    int(fields::parse_int(
                        &fields::resolve(row, &["credits_attempted"], ""),
                        0,
                    )),
                ),
                ("credits_earned", int(credits_earned)),
            ],
        };
        if upsert(
            conn,
            spec,
            Policy::ReconcileByIdThenKey {
                natural_key: &natural_key,
            },
        )? != Outcome::Unchanged
        {
            summary.add("Enrollments");
        }
    }
    Ok(())
}
