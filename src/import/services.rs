use crate::fields;
use crate::import::upsert::{int, opt_int, opt_text, real, text, upsert, Outcome, Policy, RowSpec};
use crate::import::{lookup_id, sources, Summary};
use crate::model;
use anyhow::Result;
use rusqlite::Connection;
use std::path::Path;
use tracing::{debug, info};

pub(crate) fn import_financial_aid(conn: &Connection, dir: &Path, summary: &mut Summary) -> Result<()> {
    info!("importing financial aid");
    summary.touch("Financial Aid");
    let rows = sources::read_rows(dir, "financial_aid.csv", summary)?;
    for row in &rows {
        let Some(aid_id) = fields::opt(row, &["aid_id"]) else {
            summary.skip("Financial Aid");
            continue;
        };
        let student_pk = match fields::opt(row, &["student_id"]) {
            Some(ident) => lookup_id(conn, "student_profiles", "student_id", &ident)?,
            None => None,
        };
        let Some(student_pk) = student_pk else {
            debug!("financial aid {}: student not found, skipping", aid_id);
            summary.skip("Financial Aid");
            continue;
        };
        let spec = RowSpec {
            table: "financial_aid",
            id_column: "aid_id",
            id: &aid_id,
            fields: vec![
                ("student_id", text(student_pk)),
                (
                    "student_name",
                    text(fields::resolve(row, &["student_name"], "")),
                ),
                ("kind", text(fields::resolve(row, &["type", "kind"], ""))),
                ("name", text(fields::resolve(row, &["name"], ""))),
                (
                    "amount",
                    real(fields::parse_decimal(
                        &fields::resolve(row, &["amount"], ""),
                        0.0,
                    )),
                ),
                (
                    "academic_year",
                    text(fields::resolve(row, &["academic_year"], "")),
                ),
                ("semester", text(fields::resolve(row, &["semester"], ""))),
                ("status", text(fields::resolve(row, &["status"], "Pending"))),
                (
                    "disbursement_date",
                    opt_text(model::date_text(fields::parse_date(&fields::resolve(
                        row,
                        &["disbursement_date"],
                        "",
                    )))),
                ),
                (
                    "description",
                    text(fields::resolve(row, &["description"], "")),
                ),
            ],
        };
        if upsert(conn, spec, Policy::CreateIfAbsent)? != Outcome::Unchanged {
            summary.add("Financial Aid");
        }
    }
    Ok(())
}

pub(crate) fn import_parking(conn: &Connection, dir: &Path, summary: &mut Summary) -> Result<()> {
    info!("importing parking permits");
    summary.touch("Parking Permits");
    let rows = sources::read_rows(dir, "parking.csv", summary)?;
    for row in &rows {
        let Some(permit_id) = fields::opt(row, &["permit_id"]) else {
            summary.skip("Parking Permits");
            continue;
        };
        let student_pk = match fields::opt(row, &["student_id"]) {
            Some(ident) => lookup_id(conn, "student_profiles", "student_id", &ident)?,
            None => None,
        };
        let Some(student_pk) = student_pk else {
            debug!("parking permit {}: student not found, skipping", permit_id);
            summary.skip("Parking Permits");
            continue;
        };
        let spec = RowSpec {
            table: "parking_permits",
            id_column: "permit_id",
            id: &permit_id,
            fields: vec![
                ("student_id", text(student_pk)),
                (
                    "student_name",
                    text(fields::resolve(row, &["student_name"], "")),
                ),
                (
                    "permit_type",
                    text(fields::resolve(row, &["permit_type"], "Student")),
                ),
                (
                    "lot_number",
                    text(fields::resolve(row, &["lot_number"], "")),
                ),
                (
                    "vehicle_make",
                    text(fields::resolve(row, &["vehicle_make"], "")),
                ),
                (
                    "vehicle_model",
                    text(fields::resolve(row, &["vehicle_model"], "")),
                ),
                (
                    "vehicle_year",
                    opt_int(fields::parse_int_opt(&fields::resolve(
                        row,
                        &["vehicle_year"],
                        "",
                    ))),
                ),
                (
                    "license_plate",
                    text(fields::resolve(row, &["license_plate"], "")),
                ),
                (
                    "issue_date",
                    opt_text(model::date_text(fields::parse_date(&fields::resolve(
                        row,
                        &["issue_date"],
                        "",
                    )))),
                ),
                (
                    "expiration_date",
                    opt_text(model::date_text(fields::parse_date(&fields::resolve(
                        row,
                        &["expiration_date"],
                        "",
                    )))),
                ),
                ("status", text(fields::resolve(row, &["status"], "Active"))),
            ],
        };
        if upsert(conn, spec, Policy::CreateIfAbsent)? != Outcome::Unchanged {
            summary.add("Parking Permits");
        }
    }
    Ok(())
}

pub(crate) fn import_events(conn: &Connection, dir: &Path, summary: &mut Summary) -> Result<()> {
    info!("importing events");
    summary.touch("Events");
    let rows = sources::read_rows(dir, "events.csv", summary)?;
    for row in &rows {
        let Some(event_id) = fields::opt(row, &["event_id"]) else {
            summary.skip("Events");
            continue;
        };
        let start_time = fields::parse_time(&fields::resolve(row, &["start_time"], ""));
        let end_time = fields::parse_time(&fields::resolve(row, &["end_time"], ""));
        let spec = RowSpec {
            table: "events",
            id_column: "event_id",
            id: &event_id,
            fields: vec![
                ("name", text(fields::resolve(row, &["name"], ""))),
                ("kind", text(fields::resolve(row, &["type", "kind"], ""))),
                (
                    "description",
                    text(fields::resolve(row, &["description"], "")),
                ),
                (
                    "date",
                    opt_text(model::date_text(fields::parse_date(&fields::resolve(
                        row,
                        &["date"],
                        "",
                    )))),
                ),
                (
                    "start_time",
                    opt_text(start_time.map(|t| t.format("%H:%M:%S").to_string())),
                ),
                (
                    "end_time",
                    opt_text(end_time.map(|t| t.format("%H:%M:%S").to_string())),
                ),
                ("location", text(fields::resolve(row, &["location"], ""))),
                ("organizer", text(fields::resolve(row, &["organizer"], ""))),
                (
                    "capacity",
                    int(fields::parse_int(&fields::resolve(row, &["capacity"], ""), 0)),
                ),
                (
                    "registered",
                    int(fields::parse_int(
                        &fields::resolve(row, &["registered"], ""),
                        0,
                    )),
                ),
                (
                    "status",
                    text(fields::resolve(row, &["status"], "Scheduled")),
                ),
            ],
        };
        if upsert(conn, spec, Policy::CreateIfAbsent)? != Outcome::Unchanged {
            summary.add("Events");
        }
    }
    Ok(())
}
