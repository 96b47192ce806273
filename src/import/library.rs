use crate::fields;
use crate::import::upsert::{int, opt_int, opt_text, real, text, upsert, Outcome, Policy, RowSpec};
use crate::import::{lookup_id, sources, Summary};
use crate::model;
use anyhow::Result;
use rusqlite::Connection;
use std::path::Path;
use tracing::{debug, info};

pub(crate) fn import_books(conn: &Connection, dir: &Path, summary: &mut Summary) -> Result<()> {
    info!("importing library books");
    summary.touch("Library Books");
    let rows = sources::read_rows(dir, "library_books.csv", summary)?;
    for row in &rows {
        let Some(book_id) = fields::opt(row, &["book_id"]) else {
            summary.skip("Library Books");
            continue;
        };
        let spec = RowSpec {
            table: "books",
            id_column: "book_id",
            id: &book_id,
            fields: vec![
                ("isbn", text(fields::resolve(row, &["isbn"], ""))),
                ("title", text(fields::resolve(row, &["title"], ""))),
                ("author", text(fields::resolve(row, &["author"], ""))),
                ("publisher", text(fields::resolve(row, &["publisher"], ""))),
                (
                    "publication_year",
                    opt_int(fields::parse_int_opt(&fields::resolve(
                        row,
                        &["publication_year"],
                        "",
                    ))),
                ),
                ("category", text(fields::resolve(row, &["category"], ""))),
                ("location", text(fields::resolve(row, &["location"], ""))),
                (
                    "copies_total",
                    int(fields::parse_int(
                        &fields::resolve(row, &["copies_total"], ""),
                        1,
                    )),
                ),
                (
                    "copies_available",
                    int(fields::parse_int(
                        &fields::resolve(row, &["copies_available"], ""),
                        1,
                    )),
                ),
                (
                    "status",
                    text(fields::resolve(row, &["status"], "Available")),
                ),
                (
                    "description",
                    text(fields::resolve(row, &["description"], "")),
                ),
            ],
        };
        if upsert(conn, spec, Policy::CreateIfAbsent)? != Outcome::Unchanged {
            summary.add("Library Books");
        }
    }
    Ok(())
}

pub(crate) fn import_checkouts(conn: &Connection, dir: &Path, summary: &mut Summary) -> Result<()> {
    info!("importing library checkouts");
    summary.touch("Library Checkouts");
    let rows = sources::read_rows(dir, "library_checkouts.csv", summary)?;
    for row in &rows {
        let Some(checkout_id) = fields::opt(row, &["checkout_id"]) else {
            summary.skip("Library Checkouts");
            continue;
        };
        let book_pk = match fields::opt(row, &["book_id"]) {
            Some(ident) => lookup_id(conn, "books", "book_id", &ident)?,
            None => None,
        };
        let student_pk = match fields::opt(row, &["student_id"]) {
            Some(ident) => lookup_id(conn, "student_profiles", "student_id", &ident)?,
            None => None,
        };
        let (Some(book_pk), Some(student_pk)) = (book_pk, student_pk) else {
            debug!("checkout {}: unresolved reference, skipping", checkout_id);
            summary.skip("Library Checkouts");
            continue;
        };
        let spec = RowSpec {
            table: "checkouts",
            id_column: "checkout_id",
            id: &checkout_id,
            fields: vec![
                ("book_id", text(book_pk)),
                ("student_id", text(student_pk)),
                (
                    "student_name",
                    text(fields::resolve(row, &["student_name"], "")),
                ),
                (
                    "checkout_date",
                    opt_text(model::date_text(fields::parse_date(&fields::resolve(
                        row,
                        &["checkout_date"],
                        "",
                    )))),
                ),
                (
                    "due_date",
                    opt_text(model::date_text(fields::parse_date(&fields::resolve(
                        row,
                        &["due_date"],
                        "",
                    )))),
                ),
                (
                    "return_date",
                    opt_text(model::date_text(fields::parse_date(&fields::resolve(
                        row,
                        &["return_date"],
                        "",
                    )))),
                ),
                ("status", text(fields::resolve(row, &["status"], "Active"))),
                (
                    "fine_amount",
                    real(fields::parse_decimal(
                        &fields::resolve(row, &["fine_amount"], ""),
                        0.0,
                    )),
                ),
            ],
        };
        if upsert(conn, spec, Policy::CreateIfAbsent)? != Outcome::Unchanged {
            summary.add("Library Checkouts");
        }
    }
    Ok(())
}
