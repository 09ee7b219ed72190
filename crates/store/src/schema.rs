//! Table definitions and schema probing.

use rusqlite::{params, Connection, OptionalExtension};

use skillgap_intelligence::SchemaStatus;

/// Tables and columns the core analysis reads.
pub const REQUIRED_COLUMNS: &[(&str, &[&str])] = &[
    ("skills", &["id", "name", "category"]),
    ("resources", &["id", "department_id"]),
    ("resource_skills", &["resource_id", "skill_id", "proficiency_level"]),
    ("projects", &["id", "department_id", "start_date", "end_date"]),
    ("project_skills", &["project_id", "skill_id", "importance_level"]),
    (
        "market_trends",
        &["skill_name", "category", "demand_score", "growth_rate", "trend_date"],
    ),
];

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS departments (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS skills (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    category TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS resources (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    role TEXT NULL,
    department_id TEXT NULL REFERENCES departments(id) ON DELETE SET NULL
);
CREATE INDEX IF NOT EXISTS idx_resources_department ON resources(department_id);

CREATE TABLE IF NOT EXISTS resource_skills (
    resource_id INTEGER NOT NULL REFERENCES resources(id) ON DELETE CASCADE,
    skill_id INTEGER NOT NULL REFERENCES skills(id) ON DELETE CASCADE,
    proficiency_level INTEGER NOT NULL CHECK (proficiency_level BETWEEN 0 AND 5),
    PRIMARY KEY (resource_id, skill_id)
);

CREATE TABLE IF NOT EXISTS projects (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    department_id TEXT NULL REFERENCES departments(id) ON DELETE SET NULL,
    start_date TEXT NOT NULL,
    end_date TEXT NULL,
    status TEXT NOT NULL DEFAULT 'active'
);
CREATE INDEX IF NOT EXISTS idx_projects_dates ON projects(start_date, end_date);

CREATE TABLE IF NOT EXISTS project_skills (
    project_id INTEGER NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
    skill_id INTEGER NOT NULL REFERENCES skills(id) ON DELETE CASCADE,
    importance_level INTEGER NOT NULL CHECK (importance_level BETWEEN 0 AND 5),
    PRIMARY KEY (project_id, skill_id)
);

CREATE TABLE IF NOT EXISTS market_trends (
    id INTEGER PRIMARY KEY,
    skill_name TEXT NOT NULL,
    category TEXT NOT NULL,
    demand_score REAL NOT NULL,
    growth_rate INTEGER NOT NULL DEFAULT 0,
    trend_date TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_market_trends_date ON market_trends(trend_date);

CREATE TABLE IF NOT EXISTS role_skills (
    role TEXT NOT NULL,
    skill_id INTEGER NOT NULL REFERENCES skills(id) ON DELETE CASCADE,
    min_proficiency INTEGER NULL,
    importance INTEGER NOT NULL DEFAULT 3,
    PRIMARY KEY (role, skill_id)
);

CREATE TABLE IF NOT EXISTS resource_allocations (
    resource_id INTEGER NOT NULL REFERENCES resources(id) ON DELETE CASCADE,
    project_id INTEGER NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
    start_date TEXT NOT NULL,
    end_date TEXT NULL
);
CREATE INDEX IF NOT EXISTS idx_allocations_resource ON resource_allocations(resource_id);
"#;

/// Create every table the engine reads. Idempotent.
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA)
}

/// Report missing tables and columns, and how many skills exist.
pub(crate) fn probe(conn: &Connection) -> rusqlite::Result<SchemaStatus> {
    let mut status = SchemaStatus::default();

    for (table, columns) in REQUIRED_COLUMNS {
        let exists = conn
            .query_row(
                "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1",
                params![table],
                |_| Ok(()),
            )
            .optional()?
            .is_some();
        if !exists {
            status.missing_tables.push((*table).to_string());
            continue;
        }

        // Table names come from the constant list above.
        let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", table))?;
        let present: Vec<String> = stmt
            .query_map([], |row| row.get::<_, String>(1))?
            .collect::<rusqlite::Result<_>>()?;
        for column in *columns {
            if !present.iter().any(|p| p.eq_ignore_ascii_case(column)) {
                status.missing_columns.push(format!("{}.{}", table, column));
            }
        }
    }

    let skills_usable = !status.missing_tables.iter().any(|t| t == "skills")
        && !status.missing_columns.iter().any(|c| c.starts_with("skills."));
    if skills_usable {
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM skills", [], |row| row.get(0))?;
        status.skill_count = u64::try_from(count).unwrap_or(0);
    }
    Ok(status)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_database_reports_every_table_missing() {
        let conn = Connection::open_in_memory().unwrap();
        let status = probe(&conn).unwrap();
        assert_eq!(status.missing_tables.len(), REQUIRED_COLUMNS.len());
        assert_eq!(status.skill_count, 0);
        assert!(!status.is_ready());
    }

    #[test]
    fn initialized_schema_needs_skills_to_be_ready() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        init_schema(&conn).unwrap();
        let status = probe(&conn).unwrap();
        assert!(status.missing_tables.is_empty());
        assert!(status.missing_columns.is_empty());
        assert_eq!(status.describe(), "no skills recorded");

        conn.execute(
            "INSERT INTO skills (id, name, category) VALUES (1, 'Rust', 'Technical')",
            [],
        )
        .unwrap();
        assert!(probe(&conn).unwrap().is_ready());
    }

    #[test]
    fn missing_column_is_reported_by_table() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        conn.execute_batch(
            "DROP TABLE market_trends;
             CREATE TABLE market_trends (skill_name TEXT, category TEXT, demand_score REAL);",
        )
        .unwrap();
        let status = probe(&conn).unwrap();
        assert_eq!(
            status.missing_columns,
            vec!["market_trends.growth_rate", "market_trends.trend_date"]
        );
    }
}
