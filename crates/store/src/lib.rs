//! SQLite implementation of [`SkillsRepository`].
//!
//! One connection is shared behind a mutex; every query runs on the
//! blocking thread pool so async callers are never stalled by disk I/O.

mod queries;
pub mod schema;
pub mod seed;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use rusqlite::{Connection, ErrorCode, OpenFlags};
use time::Date;
use tracing::debug;

use skillgap_intelligence::{
    iso_date, Department, MarketTrend, RepositoryError, ResourceProfile, ResourceSkill,
    SchemaStatus, SkillCoverage, SkillDemand, SkillRequirement, SkillsRepository, TimeWindow,
};

pub use schema::init_schema;
pub use seed::seed_demo_data;

/// Map a SQLite failure onto the repository error taxonomy.
pub fn classify(err: rusqlite::Error) -> RepositoryError {
    if let rusqlite::Error::SqliteFailure(failure, _) = &err {
        if matches!(failure.code, ErrorCode::CannotOpen | ErrorCode::NotADatabase) {
            return RepositoryError::Unreachable(err.to_string());
        }
    }
    let message = err.to_string();
    if message.contains("no such table") || message.contains("no such column") {
        RepositoryError::DataUnavailable(message)
    } else {
        RepositoryError::Storage(message)
    }
}

/// Skills repository over a SQLite database file.
#[derive(Clone)]
pub struct SqliteSkillsRepository {
    conn: Arc<Mutex<Connection>>,
    path: Option<PathBuf>,
}

impl std::fmt::Debug for SqliteSkillsRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteSkillsRepository")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl SqliteSkillsRepository {
    /// Open (or create) the database at `path`. The schema is not touched.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, RepositoryError> {
        let path = path.as_ref();
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| RepositoryError::Unreachable(format!("{}: {}", path.display(), e)))?;
        conn.pragma_update(None, "foreign_keys", "ON")
            .map_err(classify)?;
        debug!(path = %path.display(), "Opened skills database");
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            path: Some(path.to_path_buf()),
        })
    }

    /// Private in-memory database, mostly for tests.
    pub fn open_in_memory() -> Result<Self, RepositoryError> {
        let conn = Connection::open_in_memory().map_err(classify)?;
        Ok(Self::from_connection(conn))
    }

    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
            path: None,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Create the tables the engine reads.
    pub async fn init_schema(&self) -> Result<(), RepositoryError> {
        self.call(|conn| schema::init_schema(conn)).await
    }

    /// Populate a small demo organization.
    pub async fn seed_demo_data(&self, today: Date) -> Result<(), RepositoryError> {
        self.call(move |conn| seed::seed_demo_data(conn, today)).await
    }

    /// Run `f` against the connection on the blocking pool.
    async fn call<T, F>(&self, f: F) -> Result<T, RepositoryError>
    where
        F: FnOnce(&Connection) -> rusqlite::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let guard = conn.lock();
            f(&guard)
        })
        .await
        .map_err(|e| RepositoryError::Storage(format!("query task failed: {}", e)))?
        .map_err(classify)
    }
}

/// Non-numeric resource ids cannot match the integer key.
fn parse_resource_id(id: &str) -> Option<i64> {
    id.trim().parse().ok()
}

#[async_trait]
impl SkillsRepository for SqliteSkillsRepository {
    async fn probe_schema(&self) -> Result<SchemaStatus, RepositoryError> {
        self.call(schema::probe).await
    }

    async fn fetch_coverage(
        &self,
        department_id: Option<&str>,
        categories: &[String],
    ) -> Result<Vec<SkillCoverage>, RepositoryError> {
        let department_id = department_id.map(str::to_string);
        let categories = categories.to_vec();
        self.call(move |conn| queries::coverage(conn, department_id.as_deref(), &categories))
            .await
    }

    async fn fetch_demand(
        &self,
        window: &TimeWindow,
        department_id: Option<&str>,
    ) -> Result<Vec<SkillDemand>, RepositoryError> {
        let (start, end) = (window.start_iso(), window.end_iso());
        let department_id = department_id.map(str::to_string);
        self.call(move |conn| queries::demand(conn, &start, &end, department_id.as_deref()))
            .await
    }

    async fn fetch_market_trends(&self) -> Result<Vec<MarketTrend>, RepositoryError> {
        self.call(queries::market_trends).await
    }

    async fn list_departments(&self) -> Result<Vec<Department>, RepositoryError> {
        self.call(queries::departments).await
    }

    async fn find_department(&self, id: &str) -> Result<Option<Department>, RepositoryError> {
        let id = id.to_string();
        self.call(move |conn| queries::department(conn, &id)).await
    }

    async fn find_resource(&self, id: &str) -> Result<Option<ResourceProfile>, RepositoryError> {
        let Some(id) = parse_resource_id(id) else {
            return Ok(None);
        };
        self.call(move |conn| queries::resource(conn, id)).await
    }

    async fn fetch_resource_skills(
        &self,
        resource_id: &str,
    ) -> Result<Vec<ResourceSkill>, RepositoryError> {
        let Some(id) = parse_resource_id(resource_id) else {
            return Ok(Vec::new());
        };
        self.call(move |conn| queries::resource_skills(conn, id)).await
    }

    async fn fetch_role_requirements(
        &self,
        role: &str,
    ) -> Result<Vec<SkillRequirement>, RepositoryError> {
        let role = role.to_string();
        self.call(move |conn| queries::role_requirements(conn, &role))
            .await
    }

    async fn fetch_assignment_requirements(
        &self,
        resource_id: &str,
        on: Date,
    ) -> Result<Vec<SkillRequirement>, RepositoryError> {
        let Some(id) = parse_resource_id(resource_id) else {
            return Ok(Vec::new());
        };
        let on = iso_date(on);
        self.call(move |conn| queries::assignment_requirements(conn, id, &on))
            .await
    }
}
