use crate::fields::{self, Row};
use crate::import::{sources, Summary};
use crate::model::{Account, FacultyProfile, Role, StaffProfile, StudentProfile};
use anyhow::Result;
use chrono::Local;
use std::path::Path;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};
use uuid::Uuid;

/// Account fields common to all three person sources.
fn account_from_row(row: &Row, email: String) -> Account {
    let username = email.split('@').next().unwrap_or(&email).to_string();
    Account {
        username,
        first_name: fields::resolve(row, &["first_name"], ""),
        last_name: fields::resolve(row, &["last_name"], ""),
        phone: fields::resolve(row, &["phone"], ""),
        date_of_birth: fields::parse_date(&fields::resolve(row, &["date_of_birth", "dob"], "")),
        address: fields::resolve(row, &["address"], ""),
        city: fields::resolve(row, &["city"], ""),
        state: fields::resolve(row, &["state"], ""),
        zip_code: fields::resolve(row, &["zip_code", "zip"], ""),
        email,
    }
}

pub(crate) fn import_students(conn: &Connection, dir: &Path, summary: &mut Summary) -> Result<()> {
    info!("importing students");
    summary.touch("Students");
    let rows = sources::read_rows(dir, "students.csv", summary)?;
    for row in &rows {
        let (Some(email), Some(student_id)) = (
            fields::opt(row, &["email"]),
            fields::opt(row, &["student_id"]),
        ) else {
            summary.skip("Students");
            continue;
        };
        let account = account_from_row(row, email);
        let role = Role::Student(StudentProfile {
            student_id,
            enrollment_date: fields::parse_date(&fields::resolve(
                row,
                &["enrollment_date"],
                "",
            )),
            major: fields::resolve(row, &["major"], ""),
            year_level: fields::resolve(row, &["year_level", "year"], ""),
            gpa: fields::parse_decimal(&fields::resolve(row, &["gpa"], ""), 0.0),
            status: fields::resolve(row, &["status"], "Active"),
            emergency_contact: fields::resolve(row, &["emergency_contact"], ""),
            emergency_phone: fields::resolve(row, &["emergency_phone"], ""),
        });
        if persist_person(conn, &account, &role)? {
            summary.add("Students");
        }
    }
    Ok(())
}

pub(crate) fn import_faculty(conn: &Connection, dir: &Path, summary: &mut Summary) -> Result<()> {
    info!("importing faculty");
    summary.touch("Faculty");
    let rows = sources::read_rows(dir, "faculty_professors.csv", summary)?;
    for row in &rows {
        let (Some(email), Some(faculty_id)) = (
            fields::opt(row, &["email"]),
            fields::opt(row, &["faculty_id"]),
        ) else {
            summary.skip("Faculty");
            continue;
        };
        let account = account_from_row(row, email);
        let role = Role::Faculty(FacultyProfile {
            faculty_id,
            department: fields::resolve(row, &["department"], ""),
            rank: fields::resolve(row, &["rank"], ""),
            hire_date: fields::parse_date(&fields::resolve(row, &["hire_date"], "")),
            salary: fields::parse_decimal(&fields::resolve(row, &["salary"], ""), 0.0),
            office_building: fields::resolve(row, &["office_building"], ""),
            office_number: fields::resolve(row, &["office_number"], ""),
            specialization: fields::resolve(row, &["specialization"], ""),
            status: fields::resolve(row, &["status"], "Active"),
            education: fields::resolve(row, &["education"], "PhD"),
            years_experience: fields::parse_int(
                &fields::resolve(row, &["years_experience"], ""),
                0,
            ),
            research_areas: fields::resolve(row, &["research_areas"], ""),
            publications: fields::parse_int(&fields::resolve(row, &["publications"], ""), 0),
            is_professor: fields::parse_bool(&fields::resolve(row, &["is_professor"], ""), false),
        });
        if persist_person(conn, &account, &role)? {
            summary.add("Faculty");
        }
    }
    Ok(())
}

pub(crate) fn import_staff(conn: &Connection, dir: &Path, summary: &mut Summary) -> Result<()> {
    info!("importing staff");
    summary.touch("Staff");
    let rows = sources::read_rows(dir, "staff.csv", summary)?;
    for row in &rows {
        let (Some(email), Some(staff_id)) = (
            fields::opt(row, &["email"]),
            fields::opt(row, &["staff_id"]),
        ) else {
            summary.skip("Staff");
            continue;
        };
        let account = account_from_row(row, email);
        let role = Role::Staff(StaffProfile {
            staff_id,
            department: fields::resolve(row, &["department"], ""),
            position: fields::resolve(row, &["position"], ""),
            hire_date: fields::parse_date(&fields::resolve(row, &["hire_date"], "")),
            salary: fields::parse_decimal(&fields::resolve(row, &["salary"], ""), 0.0),
            office_building: fields::resolve(row, &["office_building"], ""),
            office_number: fields::resolve(row, &["office_number"], ""),
            status: fields::resolve(row, &["status"], "Active"),
        });
        if persist_person(conn, &account, &role)? {
            summary.add("Staff");
        }
    }
    Ok(())
}

/// Get-or-create the account by email, then create the role profile when it
/// does not exist yet. An existing account row is never overwritten, but a
/// missing profile is created even for a pre-existing account so reruns can
/// heal a half-imported person. Returns true when a profile was written.
fn persist_person(conn: &Connection, account: &Account, role: &Role) -> Result<bool> {
    let account_pk = match conn
        .query_row(
            "SELECT id FROM accounts WHERE email = ?1",
            params![account.email],
            |row| row.get::<_, String>(0),
        )
        .optional()?
    {
        Some(pk) => {
            debug!("account exists: {}", account.email);
            pk
        }
        None => {
            let pk = Uuid::new_v4().to_string();
            conn.execute(
                "INSERT INTO accounts(id, email, username, first_name, last_name, phone, role,
                                      date_of_birth, address, city, state, zip_code, created_at)
                 VALUES(?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                params![
                    pk,
                    account.email,
                    account.username,
                    account.first_name,
                    account.last_name,
                    account.phone,
                    role.tag(),
                    crate::model::date_text(account.date_of_birth),
                    account.address,
                    account.city,
                    account.state,
                    account.zip_code,
                    Local::now().to_rfc3339(),
                ],
            )?;
            pk
        }
    };

    match role {
        Role::Student(p) => {
            if profile_exists(conn, "student_profiles", "student_id", &account_pk, &p.student_id)? {
                return Ok(false);
            }
            conn.execute(
                "INSERT INTO student_profiles(id, account_id, student_id, enrollment_date, major,
                                              year_level, gpa, status, emergency_contact, emergency_phone)
                 VALUES(?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                params![
                    Uuid::new_v4().to_string(),
                    account_pk,
                    p.student_id,
                    crate::model::date_text(p.enrollment_date),
                    p.major,
                    p.year_level,
                    p.gpa,
                    p.status,
                    p.emergency_contact,
                    p.emergency_phone,
                ],
            )?;
            Ok(true)
        }
        Role::Faculty(p) => {
            if profile_exists(conn, "faculty_profiles", "faculty_id", &account_pk, &p.faculty_id)? {
                return Ok(false);
            }
            conn.execute(
                "INSERT INTO faculty_profiles(id, account_id, faculty_id, department, rank, hire_date,
                                              salary, office_building, office_number, specialization,
                                              status, education, years_experience, research_areas,
                                              publications, is_professor)
                 VALUES(?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                params![
                    Uuid::new_v4().to_string(),
                    account_pk,
                    p.faculty_id,
                    p.department,
                    p.rank,
                    crate::model::date_text(p.hire_date),
                    p.salary,
                    p.office_building,
                    p.office_number,
                    p.specialization,
                    p.status,
                    p.education,
                    p.years_experience,
                    p.research_areas,
                    p.publications,
                    p.is_professor as i64,
                ],
            )?;
            Ok(true)
        }
        Role::Staff(p) => {
            if profile_exists(conn, "staff_profiles", "staff_id", &account_pk, &p.staff_id)? {
                return Ok(false);
            }
            conn.execute(
                "INSERT INTO staff_profiles(id, account_id, staff_id, department, position,
                                            hire_date, salary, office_building, office_number, status)
                 VALUES(?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                params![
                    Uuid::new_v4().to_string(),
                    account_pk,
                    p.staff_id,
                    p.department,
                    p.position,
                    crate::model::date_text(p.hire_date),
                    p.salary,
                    p.office_building,
                    p.office_number,
                    p.status,
                ],
            )?;
            Ok(true)
        }
        // Admins are provisioned by the account system, never imported.
        Role::Admin => Ok(false),
    }
}

fn profile_exists(
    conn: &Connection,
    table: &str,
    id_column: &str,
    account_pk: &str,
    external_id: &str,
) -> Result<bool> {
    let sql = format!(
        "SELECT 1 FROM {} WHERE account_id = ?1 OR {} = ?2 LIMIT 1",
        table, id_column
    );
    let mut stmt = conn.prepare(&sql)?;
    let hit = stmt
        .query_row(params![account_pk, external_id], |row| row.get::<_, i64>(0))
        .optional()?;
    Ok(hit.is_some())
}
