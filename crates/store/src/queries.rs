//! Blocking SQL for each repository read.
//!
//! Every value is bound; category lists expand to generated placeholders.

use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

use skillgap_intelligence::{
    Department, MarketTrend, ResourceProfile, ResourceSkill, SkillCoverage, SkillDemand,
    SkillRequirement,
};

/// Proficiency level that counts as certified.
pub const CERTIFIED_LEVEL: i64 = 5;

/// Market trends returned per call.
pub const TREND_LIMIT: i64 = 50;

fn count(value: i64) -> u32 {
    u32::try_from(value.max(0)).unwrap_or(u32::MAX)
}

fn optional_text(value: Option<&str>) -> Value {
    value.map_or(Value::Null, |v| Value::Text(v.to_string()))
}

/// `?start, ?start+1, …` for `n` values.
fn placeholders(start: usize, n: usize) -> String {
    (start..start + n)
        .map(|i| format!("?{}", i))
        .collect::<Vec<_>>()
        .join(", ")
}

pub(crate) fn coverage(
    conn: &Connection,
    department_id: Option<&str>,
    categories: &[String],
) -> rusqlite::Result<Vec<SkillCoverage>> {
    let total: i64 = conn.query_row(
        "SELECT COUNT(*) FROM resources WHERE (?1 IS NULL OR department_id = ?1)",
        params![department_id],
        |row| row.get(0),
    )?;
    let total = count(total);

    let category_filter = if categories.is_empty() {
        String::new()
    } else {
        format!("AND s.category IN ({})", placeholders(3, categories.len()))
    };
    // Inner joins: only skills held by someone in scope are returned, so a
    // demanded skill nobody holds reads as missing rather than 0% coverage.
    let sql = format!(
        "SELECT s.id, s.name, s.category,
                COUNT(DISTINCT rs.resource_id) AS holders,
                AVG(rs.proficiency_level),
                COUNT(DISTINCT CASE WHEN rs.proficiency_level >= ?2 THEN rs.resource_id END)
         FROM skills s
         JOIN resource_skills rs ON rs.skill_id = s.id
         JOIN resources r ON r.id = rs.resource_id
         WHERE (?1 IS NULL OR r.department_id = ?1) {}
         GROUP BY s.id, s.name, s.category
         ORDER BY holders DESC, s.name",
        category_filter
    );

    let mut values = vec![optional_text(department_id), Value::Integer(CERTIFIED_LEVEL)];
    values.extend(categories.iter().map(|c| Value::Text(c.clone())));

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(values), |row| {
        Ok(SkillCoverage::from_counts(
            row.get(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            count(row.get(3)?),
            total,
            row.get(4)?,
            count(row.get(5)?),
        ))
    })?;
    rows.collect()
}

pub(crate) fn demand(
    conn: &Connection,
    start: &str,
    end: &str,
    department_id: Option<&str>,
) -> rusqlite::Result<Vec<SkillDemand>> {
    const IN_WINDOW: &str = "p.start_date <= ?2
        AND (p.end_date IS NULL OR p.end_date >= ?1)
        AND (?3 IS NULL OR p.department_id = ?3)";

    let total: i64 = conn.query_row(
        &format!("SELECT COUNT(*) FROM projects p WHERE {}", IN_WINDOW),
        params![start, end, department_id],
        |row| row.get(0),
    )?;
    let total = count(total);

    let mut stmt = conn.prepare(&format!(
        "SELECT s.id, s.name, s.category,
                COUNT(DISTINCT p.id) AS projects,
                AVG(ps.importance_level)
         FROM project_skills ps
         JOIN projects p ON p.id = ps.project_id
         JOIN skills s ON s.id = ps.skill_id
         WHERE {}
         GROUP BY s.id, s.name, s.category
         ORDER BY projects DESC, s.name",
        IN_WINDOW
    ))?;
    let rows = stmt.query_map(params![start, end, department_id], |row| {
        Ok(SkillDemand::from_counts(
            row.get(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            count(row.get(3)?),
            total,
            row.get(4)?,
        ))
    })?;
    rows.collect()
}

pub(crate) fn market_trends(conn: &Connection) -> rusqlite::Result<Vec<MarketTrend>> {
    let mut stmt = conn.prepare(
        "SELECT skill_name, category, demand_score, growth_rate
         FROM market_trends
         ORDER BY trend_date DESC, demand_score DESC
         LIMIT ?1",
    )?;
    let rows = stmt.query_map(params![TREND_LIMIT], |row| {
        Ok(MarketTrend {
            skill_name: row.get(0)?,
            category: row.get(1)?,
            demand_score: row.get(2)?,
            growth_rate: row.get::<_, Option<i32>>(3)?.unwrap_or(0),
        })
    })?;
    rows.collect()
}

fn department_row(row: &Row<'_>) -> rusqlite::Result<Department> {
    Ok(Department {
        id: row.get(0)?,
        name: row.get(1)?,
    })
}

pub(crate) fn departments(conn: &Connection) -> rusqlite::Result<Vec<Department>> {
    let mut stmt = conn.prepare("SELECT id, name FROM departments ORDER BY name, id")?;
    let rows = stmt.query_map([], department_row)?;
    rows.collect()
}

pub(crate) fn department(conn: &Connection, id: &str) -> rusqlite::Result<Option<Department>> {
    conn.query_row(
        "SELECT id, name FROM departments WHERE id = ?1",
        params![id],
        department_row,
    )
    .optional()
}

pub(crate) fn resource(conn: &Connection, id: i64) -> rusqlite::Result<Option<ResourceProfile>> {
    conn.query_row(
        "SELECT id, name, role, department_id FROM resources WHERE id = ?1",
        params![id],
        |row| {
            Ok(ResourceProfile {
                id: row.get::<_, i64>(0)?.to_string(),
                name: row.get(1)?,
                role: row.get(2)?,
                department_id: row.get(3)?,
            })
        },
    )
    .optional()
}

pub(crate) fn resource_skills(conn: &Connection, id: i64) -> rusqlite::Result<Vec<ResourceSkill>> {
    let mut stmt = conn.prepare(
        "SELECT s.id, s.name, s.category, rs.proficiency_level
         FROM resource_skills rs
         JOIN skills s ON s.id = rs.skill_id
         WHERE rs.resource_id = ?1
         ORDER BY s.name",
    )?;
    let rows = stmt.query_map(params![id], |row| {
        Ok(ResourceSkill {
            skill_id: row.get(0)?,
            skill_name: row.get(1)?,
            category: row.get(2)?,
            proficiency: row.get(3)?,
        })
    })?;
    rows.collect()
}

pub(crate) fn role_requirements(
    conn: &Connection,
    role: &str,
) -> rusqlite::Result<Vec<SkillRequirement>> {
    let mut stmt = conn.prepare(
        "SELECT s.id, s.name, s.category, rk.importance, rk.min_proficiency
         FROM role_skills rk
         JOIN skills s ON s.id = rk.skill_id
         WHERE rk.role = ?1
         ORDER BY rk.importance DESC, s.name",
    )?;
    let rows = stmt.query_map(params![role], |row| {
        Ok(SkillRequirement {
            skill_id: row.get(0)?,
            skill_name: row.get(1)?,
            category: row.get(2)?,
            importance: row.get(3)?,
            min_proficiency: row.get(4)?,
            source: role.to_string(),
        })
    })?;
    rows.collect()
}

pub(crate) fn assignment_requirements(
    conn: &Connection,
    resource_id: i64,
    on: &str,
) -> rusqlite::Result<Vec<SkillRequirement>> {
    let mut stmt = conn.prepare(
        "SELECT s.id, s.name, s.category, ps.importance_level, p.name
         FROM resource_allocations a
         JOIN projects p ON p.id = a.project_id
         JOIN project_skills ps ON ps.project_id = p.id
         JOIN skills s ON s.id = ps.skill_id
         WHERE a.resource_id = ?1
           AND a.start_date <= ?2
           AND (a.end_date IS NULL OR a.end_date >= ?2)
         ORDER BY p.name, s.name",
    )?;
    let rows = stmt.query_map(params![resource_id, on], |row| {
        Ok(SkillRequirement {
            skill_id: row.get(0)?,
            skill_name: row.get(1)?,
            category: row.get(2)?,
            importance: row.get(3)?,
            min_proficiency: None,
            source: row.get(4)?,
        })
    })?;
    rows.collect()
}
