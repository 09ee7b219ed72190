//! Storage seam for the analysis engine.
//!
//! Implementations return aggregate rows; they hold no analysis logic.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use time::{Date, Duration, OffsetDateTime};

use crate::error::RepositoryError;
use crate::types::{MarketTrend, SkillCoverage, SkillDemand};

/// Forward-looking horizon for project demand.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeRange {
    #[serde(rename = "1month")]
    OneMonth,
    #[serde(rename = "3months")]
    ThreeMonths,
    #[default]
    #[serde(rename = "6months")]
    SixMonths,
    #[serde(rename = "1year")]
    OneYear,
}

impl TimeRange {
    /// Length of the horizon in days.
    pub fn days(&self) -> i64 {
        match self {
            Self::OneMonth => 30,
            Self::ThreeMonths => 90,
            Self::SixMonths => 180,
            Self::OneYear => 365,
        }
    }

    /// Parse a token, mapping anything unrecognized to the default.
    pub fn parse_lenient(token: &str) -> Self {
        token.parse().unwrap_or_default()
    }

    /// Window starting at `today`.
    pub fn window_from(&self, today: Date) -> TimeWindow {
        let end = today
            .checked_add(Duration::days(self.days()))
            .unwrap_or(Date::MAX);
        TimeWindow { start: today, end }
    }

    /// Window starting at the current UTC date.
    pub fn window(&self) -> TimeWindow {
        self.window_from(OffsetDateTime::now_utc().date())
    }
}

impl std::fmt::Display for TimeRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OneMonth => write!(f, "1month"),
            Self::ThreeMonths => write!(f, "3months"),
            Self::SixMonths => write!(f, "6months"),
            Self::OneYear => write!(f, "1year"),
        }
    }
}

impl std::str::FromStr for TimeRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "1month" => Ok(Self::OneMonth),
            "3months" => Ok(Self::ThreeMonths),
            "6months" => Ok(Self::SixMonths),
            "1year" => Ok(Self::OneYear),
            _ => Err(format!("Unknown time range: {}", s)),
        }
    }
}

/// Inclusive date range used to scope project demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: Date,
    pub end: Date,
}

impl TimeWindow {
    /// `YYYY-MM-DD` rendering of the start date.
    pub fn start_iso(&self) -> String {
        iso_date(self.start)
    }

    /// `YYYY-MM-DD` rendering of the end date.
    pub fn end_iso(&self) -> String {
        iso_date(self.end)
    }
}

/// Render a date as `YYYY-MM-DD`.
pub fn iso_date(date: Date) -> String {
    format!(
        "{:04}-{:02}-{:02}",
        date.year(),
        u8::from(date.month()),
        date.day()
    )
}

/// Result of probing the store for the tables the engine needs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaStatus {
    pub missing_tables: Vec<String>,
    /// Entries are `table.column`.
    pub missing_columns: Vec<String>,
    pub skill_count: u64,
}

impl SchemaStatus {
    /// A fully populated schema.
    pub fn ready(skill_count: u64) -> Self {
        Self {
            skill_count,
            ..Self::default()
        }
    }

    /// Whether the engine can run against this store.
    pub fn is_ready(&self) -> bool {
        self.missing_tables.is_empty() && self.missing_columns.is_empty() && self.skill_count > 0
    }

    /// Human-readable reason the schema is not ready.
    pub fn describe(&self) -> String {
        if !self.missing_tables.is_empty() {
            format!("missing tables: {}", self.missing_tables.join(", "))
        } else if !self.missing_columns.is_empty() {
            format!("missing columns: {}", self.missing_columns.join(", "))
        } else if self.skill_count == 0 {
            "no skills recorded".to_string()
        } else {
            "ready".to_string()
        }
    }
}

/// Organizational unit that scopes resources and projects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    pub id: String,
    pub name: String,
}

/// A person whose skills are analyzed individually.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceProfile {
    pub id: String,
    pub name: String,
    pub role: Option<String>,
    pub department_id: Option<String>,
}

/// One skill held by a resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceSkill {
    pub skill_id: i64,
    pub skill_name: String,
    pub category: String,
    /// Proficiency level (0-5).
    pub proficiency: f64,
}

/// A skill expected of a resource by a role or an assigned project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillRequirement {
    pub skill_id: i64,
    pub skill_name: String,
    pub category: String,
    /// Importance (0-5).
    pub importance: f64,
    /// Minimum proficiency expected, if the source states one.
    pub min_proficiency: Option<f64>,
    /// Role name or project name that states the requirement.
    pub source: String,
}

/// Read-only access to skills, demand, and market data.
#[async_trait]
pub trait SkillsRepository: Send + Sync {
    /// Check that required tables and columns exist and hold skills.
    async fn probe_schema(&self) -> Result<SchemaStatus, RepositoryError>;

    /// Per-skill coverage across in-scope resources.
    async fn fetch_coverage(
        &self,
        department_id: Option<&str>,
        categories: &[String],
    ) -> Result<Vec<SkillCoverage>, RepositoryError>;

    /// Per-skill demand across projects overlapping `window`.
    async fn fetch_demand(
        &self,
        window: &TimeWindow,
        department_id: Option<&str>,
    ) -> Result<Vec<SkillDemand>, RepositoryError>;

    /// Most recent market trends, strongest first, at most 50.
    async fn fetch_market_trends(&self) -> Result<Vec<MarketTrend>, RepositoryError>;

    async fn list_departments(&self) -> Result<Vec<Department>, RepositoryError>;

    async fn find_department(&self, id: &str) -> Result<Option<Department>, RepositoryError>;

    async fn find_resource(&self, id: &str) -> Result<Option<ResourceProfile>, RepositoryError>;

    async fn fetch_resource_skills(
        &self,
        resource_id: &str,
    ) -> Result<Vec<ResourceSkill>, RepositoryError>;

    /// Skills expected of everyone holding `role`.
    async fn fetch_role_requirements(
        &self,
        role: &str,
    ) -> Result<Vec<SkillRequirement>, RepositoryError>;

    /// Skills required by projects the resource is allocated to on `on`.
    async fn fetch_assignment_requirements(
        &self,
        resource_id: &str,
        on: Date,
    ) -> Result<Vec<SkillRequirement>, RepositoryError>;
}
