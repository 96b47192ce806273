use crate::fields;
use crate::import::upsert::{int, opt_real, opt_text, text, upsert, Outcome, Policy, RowSpec};
use crate::import::{lookup_id, sources, Summary};
use crate::model;
use anyhow::Result;
use rusqlite::{types::Value, Connection};
use std::path::Path;
use tracing::{debug, info};

pub(crate) fn import_assignments(conn: &Connection, dir: &Path, summary: &mut Summary) -> Result<()> {
    info!("importing assignments");
    summary.touch("Assignments");
    let rows = sources::read_rows(dir, "assignments.csv", summary)?;
    for row in &rows {
        let Some(assignment_id) = fields::opt(row, &["assignment_id"]) else {
            summary.skip("Assignments");
            continue;
        };
        let section_pk = match fields::opt(row, &["section_id"]) {
            Some(ident) => lookup_id(conn, "sections", "section_id", &ident)?,
            None => None,
        };
        let course_pk = match fields::opt(row, &["course_id"]) {
            Some(ident) => lookup_id(conn, "courses", "course_id", &ident)?,
            None => None,
        };
        let (Some(section_pk), Some(course_pk)) = (section_pk, course_pk) else {
            debug!("assignment {}: unresolved reference, skipping", assignment_id);
            summary.skip("Assignments");
            continue;
        };
        let spec = RowSpec {
            table: "assignments",
            id_column: "assignment_id",
            id: &assignment_id,
            fields: vec![
                ("section_id", text(section_pk)),
                ("course_id", text(course_pk)),
                ("title", text(fields::resolve(row, &["title"], ""))),
                ("kind", text(fields::resolve(row, &["type", "kind"], ""))),
                (
                    "description",
                    text(fields::resolve(row, &["description"], "")),
                ),
                (
                    "total_points",
                    int(fields::parse_int(
                        &fields::resolve(row, &["total_points"], ""),
                        100,
                    )),
                ),
                (
                    "due_date",
                    opt_text(model::date_text(fields::parse_date(&fields::resolve(
                        row,
                        &["due_date"],
                        "",
                    )))),
                ),
                ("status", text(fields::resolve(row, &["status"], "Active"))),
            ],
        };
        if upsert(conn, spec, Policy::CreateIfAbsent)? != Outcome::Unchanged {
            summary.add("Assignments");
        }
    }
    Ok(())
}

pub(crate) fn import_submissions(conn: &Connection, dir: &Path, summary: &mut Summary) -> Result<()> {
    info!("importing submissions");
    summary.touch("Submissions");
    let rows = sources::read_rows(dir, "submissions.csv", summary)?;
    for row in &rows {
        let Some(submission_id) = fields::opt(row, &["submission_id"]) else {
            summary.skip("Submissions");
            continue;
        };
        let assignment_pk = match fields::opt(row, &["assignment_id"]) {
            Some(ident) => lookup_id(conn, "assignments", "assignment_id", &ident)?,
            None => None,
        };
        let student_pk = match fields::opt(row, &["student_id"]) {
            Some(ident) => lookup_id(conn, "student_profiles", "student_id", &ident)?,
            None => None,
        };
        let (Some(assignment_pk), Some(student_pk)) = (assignment_pk, student_pk) else {
            debug!("submission {}: unresolved reference, skipping", submission_id);
            summary.skip("Submissions");
            continue;
        };
        let natural_key = [
            ("assignment_id", Value::Text(assignment_pk.clone())),
            ("student_id", Value::Text(student_pk.clone())),
        ];
        let spec = RowSpec {
            table: "submissions",
            id_column: "submission_id",
            id: &submission_id,
            fields: vec![
                ("assignment_id", text(assignment_pk)),
                ("student_id", text(student_pk)),
                (
                    "student_name",
                    text(fields::resolve(row, &["student_name"], "")),
                ),
                (
                    "submission_date",
                    opt_text(model::date_time_text(fields::parse_date_time(
                        &fields::resolve(row, &["submission_date"], ""),
                    ))),
                ),
                ("content", text(fields::resolve(row, &["content"], ""))),
                (
                    "points_earned",
                    opt_real(fields::parse_decimal_opt(&fields::resolve(
                        row,
                        &["points_earned"],
                        "",
                    ))),
                ),
                ("feedback", text(fields::resolve(row, &["feedback"], ""))),
                (
                    "graded_date",
                    opt_text(model::date_time_text(fields::parse_date_time(
                        &fields::resolve(row, &["graded_date"], ""),
                    ))),
                ),
                (
                    "status",
                    text(fields::resolve(row, &["status"], "Submitted")),
                ),
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
            summary.add("Submissions");
        }
    }
    Ok(())
}
