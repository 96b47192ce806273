mod academics;
mod assessments;
mod attendance;
mod facilities;
mod library;
mod people;
mod services;
mod sources;
mod upsert;

use anyhow::Result;
use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;
use std::fmt;
use std::path::Path;
use tracing::info;

/// Per-entity-type outcome of one run. `imported` counts rows actually
/// persisted (created or reconciled); rows dropped over an unresolvable
/// reference land in `skipped`.
#[derive(Debug, Clone, Serialize)]
pub struct EntityCount {
    pub entity: String,
    pub imported: i64,
    pub skipped: i64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Summary {
    pub entities: Vec<EntityCount>,
    pub warnings: Vec<String>,
}

impl Summary {
    fn entry(&mut self, entity: &str) -> &mut EntityCount {
        if let Some(idx) = self.entities.iter().position(|e| e.entity == entity) {
            return &mut self.entities[idx];
        }
        self.entities.push(EntityCount {
            entity: entity.to_string(),
            imported: 0,
            skipped: 0,
        });
        self.entities.last_mut().expect("just pushed")
    }

    /// Ensure the entity type shows up in the summary even with zero rows.
    fn touch(&mut self, entity: &str) {
        self.entry(entity);
    }

    fn add(&mut self, entity: &str) {
        self.entry(entity).imported += 1;
    }

    fn skip(&mut self, entity: &str) {
        self.entry(entity).skipped += 1;
    }

    fn push_warning(&mut self, warning: String) {
        self.warnings.push(warning);
    }

    pub fn imported(&self, entity: &str) -> i64 {
        self.entities
            .iter()
            .find(|e| e.entity == entity)
            .map(|e| e.imported)
            .unwrap_or(0)
    }

    pub fn total(&self) -> i64 {
        self.entities.iter().map(|e| e.imported).sum()
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Import Summary ===")?;
        for entry in &self.entities {
            if entry.skipped > 0 {
                writeln!(
                    f,
                    "{}: {} ({} skipped)",
                    entry.entity, entry.imported, entry.skipped
                )?;
            } else {
                writeln!(f, "{}: {}", entry.entity, entry.imported)?;
            }
        }
        writeln!(f)?;
        write!(f, "Total records imported: {}", self.total())
    }
}

/// Import every source from `data_dir` in dependency order, inside a single
/// transaction. Any error rolls the store back to its pre-run state.
pub fn run(conn: &mut Connection, data_dir: &Path) -> Result<Summary> {
    let mut summary = Summary::default();
    let tx = conn.transaction()?;

    academics::import_departments(&tx, data_dir, &mut summary)?;
    facilities::import_buildings(&tx, data_dir, &mut summary)?;
    facilities::import_rooms(&tx, data_dir, &mut summary)?;
    people::import_students(&tx, data_dir, &mut summary)?;
    people::import_faculty(&tx, data_dir, &mut summary)?;
    people::import_staff(&tx, data_dir, &mut summary)?;
    academics::import_courses(&tx, data_dir, &mut summary)?;
    academics::import_sections(&tx, data_dir, &mut summary)?;
    academics::import_enrollments(&tx, data_dir, &mut summary)?;
    assessments::import_assignments(&tx, data_dir, &mut summary)?;
    assessments::import_submissions(&tx, data_dir, &mut summary)?;
    attendance::import_attendance(&tx, data_dir, &mut summary)?;
    library::import_books(&tx, data_dir, &mut summary)?;
    library::import_checkouts(&tx, data_dir, &mut summary)?;
    services::import_financial_aid(&tx, data_dir, &mut summary)?;
    services::import_parking(&tx, data_dir, &mut summary)?;
    services::import_events(&tx, data_dir, &mut summary)?;

    tx.commit()?;
    info!("import committed: {} records", summary.total());
    Ok(summary)
}

/// Surrogate key of the row whose `column` equals `value`, if any.
pub(crate) fn lookup_id(
    conn: &Connection,
    table: &str,
    column: &str,
    value: &str,
) -> Result<Option<String>> {
    let sql = format!("SELECT id FROM {} WHERE {} = ?1", table, column);
    let mut stmt = conn.prepare(&sql)?;
    let id = stmt
        .query_row(params![value], |row| row.get::<_, String>(0))
        .optional()?;
    Ok(id)
}

/// Departments are referenced from course rows by name, matched
/// case-insensitively on containment (historic exports wrote "Computer
/// Science" where the department row says "Dept. of Computer Science", and
/// vice versa).
pub(crate) fn lookup_department_by_name(conn: &Connection, name: &str) -> Result<Option<String>> {
    let mut stmt = conn.prepare(
        "SELECT id FROM departments WHERE name LIKE '%' || ?1 || '%' ORDER BY name LIMIT 1",
    )?;
    let id = stmt
        .query_row(params![name], |row| row.get::<_, String>(0))
        .optional()?;
    Ok(id)
}

/// Room references try the external room id first. Failing that, an
/// identifier shaped like "<BuildingName> <RoomNumber>" is split on its last
/// space and resolved building-by-name (case-insensitive), then
/// room-by-number within that building.
pub(crate) fn lookup_room(conn: &Connection, ident: &str) -> Result<Option<String>> {
    if let Some(id) = lookup_id(conn, "rooms", "room_id", ident)? {
        return Ok(Some(id));
    }
    let Some((building_name, room_number)) = ident.rsplit_once(' ') else {
        return Ok(None);
    };
    let mut stmt = conn.prepare(
        "SELECT r.id FROM rooms r
         JOIN buildings b ON b.id = r.building_id
         WHERE b.name = ?1 COLLATE NOCASE AND r.room_number = ?2",
    )?;
    let id = stmt
        .query_row(params![building_name.trim(), room_number], |row| {
            row.get::<_, String>(0)
        })
        .optional()?;
    Ok(id)
}
