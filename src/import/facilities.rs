use crate::fields;
use crate::import::upsert::{int, opt_int, text, upsert, Outcome, Policy, RowSpec};
use crate::import::{lookup_id, sources, Summary};
use anyhow::Result;
use rusqlite::Connection;
use std::path::Path;
use tracing::{debug, info};

pub(crate) fn import_buildings(conn: &Connection, dir: &Path, summary: &mut Summary) -> Result<()> {
    info!("importing buildings");
    summary.touch("Buildings");
    let rows = sources::read_rows(dir, "buildings.csv", summary)?;
    for row in &rows {
        let Some(building_id) = fields::opt(row, &["building_id"]) else {
            summary.skip("Buildings");
            continue;
        };
        let spec = RowSpec {
            table: "buildings",
            id_column: "building_id",
            id: &building_id,
            fields: vec![
                ("name", text(fields::resolve(row, &["name"], ""))),
                ("address", text(fields::resolve(row, &["address"], ""))),
                (
                    "capacity",
                    int(fields::parse_int(&fields::resolve(row, &["capacity"], ""), 0)),
                ),
                (
                    "floors",
                    int(fields::parse_int(&fields::resolve(row, &["floors"], ""), 1)),
                ),
                (
                    "year_built",
                    opt_int(fields::parse_int_opt(&fields::resolve(
                        row,
                        &["year_built"],
                        "",
                    ))),
                ),
                ("facilities", text(fields::resolve(row, &["facilities"], ""))),
                (
                    "description",
                    text(fields::resolve(row, &["description"], "")),
                ),
            ],
        };
        if upsert(conn, spec, Policy::CreateIfAbsent)? != Outcome::Unchanged {
            summary.add("Buildings");
        }
    }
    Ok(())
}

pub(crate) fn import_rooms(conn: &Connection, dir: &Path, summary: &mut Summary) -> Result<()> {
    info!("importing rooms");
    summary.touch("Rooms");
    let rows = sources::read_rows(dir, "rooms.csv", summary)?;
    for row in &rows {
        let Some(room_id) = fields::opt(row, &["room_id"]) else {
            summary.skip("Rooms");
            continue;
        };
        let building = fields::opt(row, &["building_id", "building"])
            .map(|ident| lookup_id(conn, "buildings", "building_id", &ident))
            .transpose()?
            .flatten();
        let Some(building_pk) = building else {
            debug!("room {}: building not found, skipping", room_id);
            summary.skip("Rooms");
            continue;
        };
        let spec = RowSpec {
            table: "rooms",
            id_column: "room_id",
            id: &room_id,
            fields: vec![
                ("building_id", text(building_pk)),
                (
                    "room_number",
                    text(fields::resolve(row, &["room_number", "number"], "")),
                ),
                (
                    "room_type",
                    text(fields::resolve(row, &["room_type"], "Classroom")),
                ),
                (
                    "capacity",
                    int(fields::parse_int(
                        &fields::resolve(row, &["capacity"], ""),
                        30,
                    )),
                ),
                ("equipment", text(fields::resolve(row, &["equipment"], ""))),
                (
                    "description",
                    text(fields::resolve(row, &["description"], "")),
                ),
            ],
        };
        if upsert(conn, spec, Policy::CreateIfAbsent)? != Outcome::Unchanged {
            summary.add("Rooms");
        }
    }
    Ok(())
}
