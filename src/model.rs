use chrono::{DateTime, Local, NaiveDate};

/// Account fields shared by every person regardless of role.
#[derive(Debug, Clone)]
pub struct Account {
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub date_of_birth: Option<NaiveDate>,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
}

#[derive(Debug, Clone)]
pub struct StudentProfile {
    pub student_id: String,
    pub enrollment_date: Option<NaiveDate>,
    pub major: String,
    pub year_level: String,
    pub gpa: f64,
    pub status: String,
    pub emergency_contact: String,
    pub emergency_phone: String,
}

#[derive(Debug, Clone)]
pub struct FacultyProfile {
    pub faculty_id: String,
    pub department: String,
    pub rank: String,
    pub hire_date: Option<NaiveDate>,
    pub salary: f64,
    pub office_building: String,
    pub office_number: String,
    pub specialization: String,
    pub status: String,
    pub education: String,
    pub years_experience: i64,
    pub research_areas: String,
    pub publications: i64,
    pub is_professor: bool,
}

#[derive(Debug, Clone)]
pub struct StaffProfile {
    pub staff_id: String,
    pub department: String,
    pub position: String,
    pub hire_date: Option<NaiveDate>,
    pub salary: f64,
    pub office_building: String,
    pub office_number: String,
    pub status: String,
}

/// Closed role model. The store keeps a flat role string on the account row
/// for querying, but in code a person's role always carries its profile so
/// consumers match exhaustively instead of comparing strings.
#[derive(Debug, Clone)]
pub enum Role {
    Student(StudentProfile),
    Faculty(FacultyProfile),
    Staff(StaffProfile),
    Admin,
}

impl Role {
    pub fn tag(&self) -> &'static str {
        match self {
            Role::Student(_) => "student",
            Role::Faculty(_) => "faculty",
            Role::Staff(_) => "staff",
            Role::Admin => "admin",
        }
    }

    /// External identifier of the role profile, if the role carries one.
    pub fn profile_id(&self) -> Option<&str> {
        match self {
            Role::Student(p) => Some(&p.student_id),
            Role::Faculty(p) => Some(&p.faculty_id),
            Role::Staff(p) => Some(&p.staff_id),
            Role::Admin => None,
        }
    }
}

/// Grade-point value for a letter grade. Unknown grades (including blank)
/// carry no derivation.
pub fn grade_points(grade: &str) -> Option<f64> {
    let points = match grade {
        "A" => 4.0,
        "A-" => 3.7,
        "B+" => 3.3,
        "B" => 3.0,
        "B-" => 2.7,
        "C+" => 2.3,
        "C" => 2.0,
        "C-" => 1.7,
        "D+" => 1.3,
        "D" => 1.0,
        "D-" => 0.7,
        "F" | "W" | "I" | "P" => 0.0,
        _ => return None,
    };
    Some(points)
}

/// Credits earned for a recognized grade: the course's credit value, except
/// F, W and I earn nothing.
pub fn credits_earned(grade: &str, course_credits: i64) -> i64 {
    match grade {
        "F" | "W" | "I" => 0,
        _ => course_credits,
    }
}

/// points_earned / total_points as a percentage; undefined when the score
/// is absent or the assignment has no points.
pub fn percentage_score(points_earned: Option<f64>, total_points: i64) -> Option<f64> {
    let earned = points_earned?;
    if total_points == 0 {
        return None;
    }
    Some(earned / total_points as f64 * 100.0)
}

/// Letter grade over a percentage score.
pub fn letter_grade(score: f64) -> &'static str {
    const LADDER: &[(f64, &str)] = &[
        (93.0, "A"),
        (90.0, "A-"),
        (87.0, "B+"),
        (83.0, "B"),
        (80.0, "B-"),
        (77.0, "C+"),
        (73.0, "C"),
        (70.0, "C-"),
        (67.0, "D+"),
        (63.0, "D"),
        (60.0, "D-"),
    ];
    for (cutoff, letter) in LADDER {
        if score >= *cutoff {
            return letter;
        }
    }
    "F"
}

pub fn section_is_full(enrolled: i64, capacity: i64) -> bool {
    enrolled >= capacity
}

/// May go negative when a section is over-enrolled; not clamped.
pub fn available_seats(capacity: i64, enrolled: i64) -> i64 {
    capacity - enrolled
}

pub fn checkout_is_overdue(status: &str, due_date: NaiveDate, today: NaiveDate) -> bool {
    status == "Active" && due_date < today
}

pub fn days_overdue(status: &str, due_date: NaiveDate, today: NaiveDate) -> i64 {
    if checkout_is_overdue(status, due_date, today) {
        (today - due_date).num_days()
    } else {
        0
    }
}

pub fn assignment_is_overdue(status: &str, due_date: NaiveDate, today: NaiveDate) -> bool {
    status == "Active" && due_date < today
}

pub fn permit_is_expired(expiration_date: NaiveDate, today: NaiveDate) -> bool {
    today > expiration_date
}

/// Remaining event capacity; `None` when the event is uncapped
/// (capacity 0).
pub fn event_available_spots(capacity: i64, registered: i64) -> Option<i64> {
    if capacity > 0 {
        Some((capacity - registered).max(0))
    } else {
        None
    }
}

pub fn event_is_full(capacity: i64, registered: i64) -> bool {
    capacity > 0 && registered >= capacity
}

/// Storage form for dates: `YYYY-MM-DD` text, NULL when absent.
pub fn date_text(date: Option<NaiveDate>) -> Option<String> {
    date.map(|d| d.format("%Y-%m-%d").to_string())
}

/// Storage form for timestamps: RFC 3339 with the local offset.
pub fn date_time_text(dt: Option<DateTime<Local>>) -> Option<String> {
    dt.map(|v| v.to_rfc3339())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grade_points_table() {
        assert_eq!(grade_points("B+"), Some(3.3));
        assert_eq!(grade_points("A"), Some(4.0));
        assert_eq!(grade_points("P"), Some(0.0));
        assert_eq!(grade_points(""), None);
        assert_eq!(grade_points("E"), None);
    }

    #[test]
    fn credits_zeroed_for_failing_and_incomplete() {
        assert_eq!(credits_earned("A", 4), 4);
        assert_eq!(credits_earned("P", 3), 3);
        assert_eq!(credits_earned("F", 4), 0);
        assert_eq!(credits_earned("W", 3), 0);
        assert_eq!(credits_earned("I", 3), 0);
    }

    #[test]
    fn percentage_undefined_without_both_sides() {
        assert_eq!(percentage_score(None, 100), None);
        assert_eq!(percentage_score(Some(50.0), 0), None);
        assert_eq!(percentage_score(Some(88.0), 100), Some(88.0));
    }

    #[test]
    fn letter_grade_breakpoints() {
        assert_eq!(letter_grade(93.0), "A");
        assert_eq!(letter_grade(92.9), "A-");
        assert_eq!(letter_grade(87.0), "B+");
        assert_eq!(letter_grade(60.0), "D-");
        assert_eq!(letter_grade(59.9), "F");
    }

    #[test]
    fn seats_not_clamped() {
        assert!(section_is_full(30, 30));
        assert!(!section_is_full(29, 30));
        assert_eq!(available_seats(30, 32), -2);
    }

    #[test]
    fn overdue_only_while_active() {
        let due = NaiveDate::from_ymd_opt(2024, 9, 1).unwrap();
        let today = NaiveDate::from_ymd_opt(2024, 9, 11).unwrap();
        assert!(checkout_is_overdue("Active", due, today));
        assert!(!checkout_is_overdue("Returned", due, today));
        assert_eq!(days_overdue("Active", due, today), 10);
        assert_eq!(days_overdue("Returned", due, today), 0);
    }

    #[test]
    fn uncapped_event_has_no_spot_count() {
        assert_eq!(event_available_spots(0, 25), None);
        assert_eq!(event_available_spots(100, 25), Some(75));
        assert_eq!(event_available_spots(20, 25), Some(0));
        assert!(event_is_full(20, 25));
        assert!(!event_is_full(0, 25));
    }

    #[test]
    fn role_tags_match_store_strings() {
        let staff = Role::Staff(StaffProfile {
            staff_id: "STF001".into(),
            department: "Registrar".into(),
            position: "Clerk".into(),
            hire_date: None,
            salary: 0.0,
            office_building: String::new(),
            office_number: String::new(),
            status: "Active".into(),
        });
        assert_eq!(staff.tag(), "staff");
        assert_eq!(staff.profile_id(), Some("STF001"));
        assert_eq!(Role::Admin.tag(), "admin");
        assert_eq!(Role::Admin.profile_id(), None);
    }
}
