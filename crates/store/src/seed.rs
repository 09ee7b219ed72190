//! Demo organization for `init-db --demo` and integration tests.

use rusqlite::{params, Connection};
use time::{Date, Duration};

use skillgap_intelligence::iso_date;

use crate::schema::init_schema;

const DEPARTMENTS: &[(&str, &str)] = &[
    ("eng", "Engineering"),
    ("data", "Data & Analytics"),
    ("design", "Product Design"),
];

/// (id, name, category)
const SKILLS: &[(i64, &str, &str)] = &[
    (1, "Rust", "Backend"),
    (2, "Java", "Backend"),
    (3, "Kubernetes", "Cloud"),
    (4, "AWS", "Cloud"),
    (5, "SQL", "Data"),
    (6, "Python", "Data"),
    (7, "Spark", "Data"),
    (8, "React", "Frontend"),
    (9, "Figma", "Design"),
    (10, "Flash", "Frontend"),
];

/// (id, name, role, department)
const RESOURCES: &[(i64, &str, &str, &str)] = &[
    (1, "Ada Lovelace", "Backend Engineer", "eng"),
    (2, "Alan Turing", "Backend Engineer", "eng"),
    (3, "Grace Hopper", "Platform Engineer", "eng"),
    (4, "Edgar Codd", "Data Engineer", "data"),
    (5, "Hedy Lamarr", "Data Engineer", "data"),
    (6, "Susan Kare", "Product Designer", "design"),
    (7, "Bret Victor", "Product Designer", "design"),
];

/// (resource, skill, proficiency)
const RESOURCE_SKILLS: &[(i64, i64, i64)] = &[
    (1, 1, 4),
    (1, 2, 5),
    (1, 5, 3),
    (2, 2, 4),
    (2, 10, 3),
    (3, 4, 2),
    (3, 2, 3),
    (4, 5, 5),
    (4, 6, 4),
    (5, 5, 4),
    (5, 6, 2),
    (6, 9, 5),
    (6, 10, 4),
    (7, 9, 4),
    (7, 8, 2),
];

/// (id, name, department, start offset days, end offset days)
const PROJECTS: &[(i64, &str, &str, i64, Option<i64>)] = &[
    (1, "Ledger Rewrite", "eng", -30, Some(120)),
    (2, "Platform Migration", "eng", 10, Some(200)),
    (3, "Lakehouse", "data", -60, None),
    (4, "Design System", "design", -10, Some(60)),
    (5, "Legacy Sunset", "eng", -400, Some(-100)),
];

/// (project, skill, importance)
const PROJECT_SKILLS: &[(i64, i64, i64)] = &[
    (1, 1, 5),
    (1, 5, 3),
    (2, 3, 5),
    (2, 4, 4),
    (3, 7, 4),
    (3, 6, 4),
    (3, 5, 3),
    (4, 8, 4),
    (4, 9, 3),
    (5, 10, 5),
];

/// (skill, category, score, growth, age in days)
const TRENDS: &[(&str, &str, f64, i64, i64)] = &[
    ("Kubernetes", "Cloud", 9.1, 24, 5),
    ("Rust", "Backend", 8.7, 31, 5),
    ("Machine Learning", "Data", 9.4, 38, 5),
    ("Spark", "Data", 8.2, 12, 5),
    ("React", "Frontend", 7.8, 6, 5),
    ("Flash", "Frontend", 1.2, -45, 400),
];

/// (role, skill, min proficiency, importance)
const ROLE_SKILLS: &[(&str, i64, i64, i64)] = &[
    ("Backend Engineer", 1, 3, 5),
    ("Backend Engineer", 5, 3, 3),
    ("Platform Engineer", 3, 3, 5),
    ("Platform Engineer", 4, 3, 4),
    ("Data Engineer", 5, 4, 5),
    ("Data Engineer", 7, 3, 4),
    ("Product Designer", 9, 3, 5),
];

/// (resource, project)
const ALLOCATIONS: &[(i64, i64)] = &[(1, 1), (2, 1), (3, 2), (4, 3), (5, 3), (6, 4), (7, 4)];

fn offset(today: Date, days: i64) -> String {
    iso_date(today.checked_add(Duration::days(days)).unwrap_or(today))
}

/// Create the schema and insert the demo organization, replacing any rows
/// with the same keys. Dates are relative to `today`.
pub fn seed_demo_data(conn: &Connection, today: Date) -> rusqlite::Result<()> {
    init_schema(conn)?;
    let tx = conn.unchecked_transaction()?;

    for (id, name) in DEPARTMENTS {
        tx.execute(
            "INSERT OR REPLACE INTO departments (id, name) VALUES (?1, ?2)",
            params![id, name],
        )?;
    }
    for (id, name, category) in SKILLS {
        tx.execute(
            "INSERT OR REPLACE INTO skills (id, name, category) VALUES (?1, ?2, ?3)",
            params![id, name, category],
        )?;
    }
    for (id, name, role, department) in RESOURCES {
        tx.execute(
            "INSERT OR REPLACE INTO resources (id, name, role, department_id)
             VALUES (?1, ?2, ?3, ?4)",
            params![id, name, role, department],
        )?;
    }
    for (resource, skill, level) in RESOURCE_SKILLS {
        tx.execute(
            "INSERT OR REPLACE INTO resource_skills (resource_id, skill_id, proficiency_level)
             VALUES (?1, ?2, ?3)",
            params![resource, skill, level],
        )?;
    }
    for (id, name, department, start, end) in PROJECTS {
        tx.execute(
            "INSERT OR REPLACE INTO projects (id, name, department_id, start_date, end_date)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                id,
                name,
                department,
                offset(today, *start),
                end.map(|e| offset(today, e))
            ],
        )?;
    }
    for (project, skill, importance) in PROJECT_SKILLS {
        tx.execute(
            "INSERT OR REPLACE INTO project_skills (project_id, skill_id, importance_level)
             VALUES (?1, ?2, ?3)",
            params![project, skill, importance],
        )?;
    }
    tx.execute("DELETE FROM market_trends", [])?;
    for (skill, category, score, growth, age) in TRENDS {
        tx.execute(
            "INSERT INTO market_trends (skill_name, category, demand_score, growth_rate, trend_date)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![skill, category, score, growth, offset(today, -age)],
        )?;
    }
    for (role, skill, min, importance) in ROLE_SKILLS {
        tx.execute(
            "INSERT OR REPLACE INTO role_skills (role, skill_id, min_proficiency, importance)
             VALUES (?1, ?2, ?3, ?4)",
            params![role, skill, min, importance],
        )?;
    }
    tx.execute("DELETE FROM resource_allocations", [])?;
    for (resource, project) in ALLOCATIONS {
        let (_, _, _, start, end) = PROJECTS
            .iter()
            .find(|p| p.0 == *project)
            .copied()
            .unwrap_or((0, "", "", 0, None));
        tx.execute(
            "INSERT INTO resource_allocations (resource_id, project_id, start_date, end_date)
             VALUES (?1, ?2, ?3, ?4)",
            params![resource, project, offset(today, start), end.map(|e| offset(today, e))],
        )?;
    }

    tx.commit()
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Month;

    #[test]
    fn seeding_twice_is_stable() {
        let conn = Connection::open_in_memory().unwrap();
        let today = Date::from_calendar_date(2026, Month::March, 1).unwrap();
        seed_demo_data(&conn, today).unwrap();
        seed_demo_data(&conn, today).unwrap();
        let skills: i64 = conn
            .query_row("SELECT COUNT(*) FROM skills", [], |r| r.get(0))
            .unwrap();
        let trends: i64 = conn
            .query_row("SELECT COUNT(*) FROM market_trends", [], |r| r.get(0))
            .unwrap();
        assert_eq!(skills, SKILLS.len() as i64);
        assert_eq!(trends, TRENDS.len() as i64);
    }
}
