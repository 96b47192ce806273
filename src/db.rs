use rusqlite::Connection;
use std::path::Path;

pub fn open_db(db_path: &Path) -> anyhow::Result<Connection> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let conn = Connection::open(db_path)?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> anyhow::Result<()> {
    conn.execute("PRAGMA foreign_keys = ON", [])?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS accounts(
            id TEXT PRIMARY KEY,
            email TEXT NOT NULL UNIQUE,
            username TEXT NOT NULL,
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL,
            phone TEXT,
            role TEXT NOT NULL,
            date_of_birth TEXT,
            address TEXT,
            city TEXT,
            state TEXT,
            zip_code TEXT,
            created_at TEXT NOT NULL
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_accounts_role ON accounts(role)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS student_profiles(
            id TEXT PRIMARY KEY,
            account_id TEXT NOT NULL UNIQUE,
            student_id TEXT NOT NULL UNIQUE,
            enrollment_date TEXT,
            major TEXT,
            year_level TEXT,
            gpa REAL NOT NULL DEFAULT 0,
            status TEXT NOT NULL,
            emergency_contact TEXT,
            emergency_phone TEXT,
            FOREIGN KEY(account_id) REFERENCES accounts(id)
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS faculty_profiles(
            id TEXT PRIMARY KEY,
            account_id TEXT NOT NULL UNIQUE,
            faculty_id TEXT NOT NULL UNIQUE,
            department TEXT,
            rank TEXT,
            hire_date TEXT,
            salary REAL NOT NULL DEFAULT 0,
            office_building TEXT,
            office_number TEXT,
            specialization TEXT,
            status TEXT NOT NULL,
            education TEXT,
            years_experience INTEGER NOT NULL DEFAULT 0,
            research_areas TEXT,
            publications INTEGER NOT NULL DEFAULT 0,
            is_professor INTEGER NOT NULL DEFAULT 0,
            FOREIGN KEY(account_id) REFERENCES accounts(id)
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS staff_profiles(
            id TEXT PRIMARY KEY,
            account_id TEXT NOT NULL UNIQUE,
            staff_id TEXT NOT NULL UNIQUE,
            department TEXT,
            position TEXT,
            hire_date TEXT,
            salary REAL NOT NULL DEFAULT 0,
            office_building TEXT,
            office_number TEXT,
            status TEXT NOT NULL,
            FOREIGN KEY(account_id) REFERENCES accounts(id)
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS departments(
            id TEXT PRIMARY KEY,
            department_id TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL,
            head TEXT,
            budget REAL NOT NULL DEFAULT 0,
            phone TEXT,
            email TEXT,
            building TEXT,
            description TEXT
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_departments_name ON departments(name)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS buildings(
            id TEXT PRIMARY KEY,
            building_id TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL,
            address TEXT,
            capacity INTEGER NOT NULL DEFAULT 0,
            floors INTEGER NOT NULL DEFAULT 1,
            year_built INTEGER,
            facilities TEXT,
            description TEXT
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_buildings_name ON buildings(name)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS rooms(
            id TEXT PRIMARY KEY,
            room_id TEXT NOT NULL UNIQUE,
            building_id TEXT NOT NULL,
            room_number TEXT NOT NULL,
            room_type TEXT NOT NULL,
            capacity INTEGER NOT NULL DEFAULT 30,
            equipment TEXT,
            description TEXT,
            FOREIGN KEY(building_id) REFERENCES buildings(id)
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_rooms_building ON rooms(building_id)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_rooms_building_number ON rooms(building_id, room_number)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS courses(
            id TEXT PRIMARY KEY,
            course_id TEXT NOT NULL UNIQUE,
            course_name TEXT NOT NULL,
            department_id TEXT,
            credits INTEGER NOT NULL DEFAULT 3,
            description TEXT,
            prerequisites TEXT,
            level TEXT NOT NULL,
            status TEXT NOT NULL,
            FOREIGN KEY(department_id) REFERENCES departments(id)
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_courses_department ON courses(department_id)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS sections(
            id TEXT PRIMARY KEY,
            section_id TEXT NOT NULL UNIQUE,
            course_id TEXT NOT NULL,
            section_number TEXT NOT NULL,
            semester TEXT NOT NULL,
            year INTEGER NOT NULL DEFAULT 0,
            instructor_id TEXT,
            instructor_name TEXT,
            instructor_rank TEXT,
            meeting_days TEXT,
            meeting_time TEXT,
            room_id TEXT,
            capacity INTEGER NOT NULL DEFAULT 30,
            enrolled INTEGER NOT NULL DEFAULT 0,
            status TEXT NOT NULL,
            FOREIGN KEY(course_id) REFERENCES courses(id),
            FOREIGN KEY(instructor_id) REFERENCES faculty_profiles(id),
            FOREIGN KEY(room_id) REFERENCES rooms(id)
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_sections_course ON sections(course_id)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_sections_instructor ON sections(instructor_id)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS enrollments(
            id TEXT PRIMARY KEY,
            enrollment_id TEXT NOT NULL UNIQUE,
            student_id TEXT NOT NULL,
            student_name TEXT,
            section_id TEXT NOT NULL,
            course_id TEXT NOT NULL,
            semester TEXT,
            enrollment_date TEXT,
            status TEXT NOT NULL,
            grade TEXT,
            grade_points REAL NOT NULL DEFAULT 0,
            credits_attempted INTEGER NOT NULL DEFAULT 0,
            credits_earned INTEGER NOT NULL DEFAULT 0,
            UNIQUE(student_id, section_id),
            FOREIGN KEY(student_id) REFERENCES student_profiles(id),
            FOREIGN KEY(section_id) REFERENCES sections(id),
            FOREIGN KEY(course_id) REFERENCES courses(id)
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_enrollments_student ON enrollments(student_id)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_enrollments_section ON enrollments(section_id)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS assignments(
            id TEXT PRIMARY KEY,
            assignment_id TEXT NOT NULL UNIQUE,
            section_id TEXT NOT NULL,
            course_id TEXT NOT NULL,
            title TEXT NOT NULL,
            kind TEXT,
            description TEXT,
            total_points INTEGER NOT NULL DEFAULT 100,
            due_date TEXT,
            status TEXT NOT NULL,
            FOREIGN KEY(section_id) REFERENCES sections(id),
            FOREIGN KEY(course_id) REFERENCES courses(id)
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_assignments_section ON assignments(section_id)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS submissions(
            id TEXT PRIMARY KEY,
            submission_id TEXT NOT NULL UNIQUE,
            assignment_id TEXT NOT NULL,
            student_id TEXT NOT NULL,
            student_name TEXT,
            submission_date TEXT,
            content TEXT,
            points_earned REAL,
            feedback TEXT,
            graded_date TEXT,
            status TEXT NOT NULL,
            UNIQUE(assignment_id, student_id),
            FOREIGN KEY(assignment_id) REFERENCES assignments(id),
            FOREIGN KEY(student_id) REFERENCES student_profiles(id)
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_submissions_assignment ON submissions(assignment_id)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_submissions_student ON submissions(student_id)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS attendance_records(
            id TEXT PRIMARY KEY,
            record_id TEXT NOT NULL UNIQUE,
            student_id TEXT NOT NULL,
            student_name TEXT,
            section_id TEXT NOT NULL,
            course_id TEXT,
            date TEXT,
            status TEXT NOT NULL,
            notes TEXT,
            UNIQUE(student_id, section_id, date),
            FOREIGN KEY(student_id) REFERENCES student_profiles(id),
            FOREIGN KEY(section_id) REFERENCES sections(id)
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_attendance_student ON attendance_records(student_id)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_attendance_section ON attendance_records(section_id)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS books(
            id TEXT PRIMARY KEY,
            book_id TEXT NOT NULL UNIQUE,
            isbn TEXT,
            title TEXT NOT NULL,
            author TEXT,
            publisher TEXT,
            publication_year INTEGER,
            category TEXT,
            location TEXT,
            copies_total INTEGER NOT NULL DEFAULT 1,
            copies_available INTEGER NOT NULL DEFAULT 1,
            status TEXT NOT NULL,
            description TEXT
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS checkouts(
            id TEXT PRIMARY KEY,
            checkout_id TEXT NOT NULL UNIQUE,
            book_id TEXT NOT NULL,
            student_id TEXT NOT NULL,
            student_name TEXT,
            checkout_date TEXT,
            due_date TEXT,
            return_date TEXT,
            status TEXT NOT NULL,
            fine_amount REAL NOT NULL DEFAULT 0,
            FOREIGN KEY(book_id) REFERENCES books(id),
            FOREIGN KEY(student_id) REFERENCES student_profiles(id)
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_checkouts_book ON checkouts(book_id)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_checkouts_student ON checkouts(student_id)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS financial_aid(
            id TEXT PRIMARY KEY,
            aid_id TEXT NOT NULL UNIQUE,
            student_id TEXT NOT NULL,
            student_name TEXT,
            kind TEXT,
            name TEXT NOT NULL,
            amount REAL NOT NULL DEFAULT 0,
            academic_year TEXT,
            semester TEXT,
            status TEXT NOT NULL,
            disbursement_date TEXT,
            description TEXT,
            FOREIGN KEY(student_id) REFERENCES student_profiles(id)
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_financial_aid_student ON financial_aid(student_id)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS parking_permits(
            id TEXT PRIMARY KEY,
            permit_id TEXT NOT NULL UNIQUE,
            student_id TEXT NOT NULL,
            student_name TEXT,
            permit_type TEXT NOT NULL,
            lot_number TEXT,
            vehicle_make TEXT,
            vehicle_model TEXT,
            vehicle_year INTEGER,
            license_plate TEXT,
            issue_date TEXT,
            expiration_date TEXT,
            status TEXT NOT NULL,
            FOREIGN KEY(student_id) REFERENCES student_profiles(id)
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_parking_permits_student ON parking_permits(student_id)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS events(
            id TEXT PRIMARY KEY,
            event_id TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL,
            kind TEXT,
            description TEXT,
            date TEXT,
            start_time TEXT,
            end_time TEXT,
            location TEXT,
            organizer TEXT,
            capacity INTEGER NOT NULL DEFAULT 0,
            registered INTEGER NOT NULL DEFAULT 0,
            status TEXT NOT NULL
        )",
        [],
    )?;

    Ok(())
}

pub fn table_count(conn: &Connection, table: &str) -> anyhow::Result<i64> {
    let sql = format!("SELECT COUNT(*) FROM {}", table);
    let count: i64 = conn.query_row(&sql, [], |row| row.get(0))?;
    Ok(count)
}
