use crate::fields;
use crate::import::upsert::{opt_text, text, upsert, Outcome, Policy, RowSpec};
use crate::import::{lookup_id, sources, Summary};
use crate::model;
use anyhow::Result;
use rusqlite::{types::Value, Connection};
use std::path::Path;
use tracing::{debug, info};

pub(crate) fn import_attendance(conn: &Connection, dir: &Path, summary: &mut Summary) -> Result<()> {
    info!("importing attendance records");
    summary.touch("Attendance Records");
    let rows = sources::read_rows(dir, "attendance.csv", summary)?;
    for row in &rows {
        let Some(record_id) = fields::opt(row, &["record_id"]) else {
            summary.skip("Attendance Records");
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
        let (Some(student_pk), Some(section_pk)) = (student_pk, section_pk) else {
            debug!("attendance {}: unresolved reference, skipping", record_id);
            summary.skip("Attendance Records");
            continue;
        };
        let date = model::date_text(fields::parse_date(&fields::resolve(row, &["date"], "")));
        let natural_key = [
            ("student_id", Value::Text(student_pk.clone())),
            ("section_id", Value::Text(section_pk.clone())),
            (
                "date",
                match &date {
                    Some(d) => Value::Text(d.clone()),
                    None => Value::Null,
                },
            ),
        ];
        let spec = RowSpec {
            table: "attendance_records",
            id_column: "record_id",
            id: &record_id,
            fields: vec![
                ("student_id", text(student_pk)),
                (
                    "student_name",
                    text(fields::resolve(row, &["student_name"], "")),
                ),
                ("section_id", text(section_pk)),
                ("course_id", text(fields::resolve(row, &["course_id"], ""))),
                ("date", opt_text(date)),
                ("status", text(fields::resolve(row, &["status"], "Present"))),
                ("notes", text(fields::resolve(row, &["notes"], ""))),
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
            summary.add("Attendance Records");
        }
    }
    Ok(())
}
