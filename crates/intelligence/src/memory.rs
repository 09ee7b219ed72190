//! In-memory repository for tests and demos.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use time::Date;

use crate::error::RepositoryError;
use crate::repository::{
    Department, ResourceProfile, ResourceSkill, SchemaStatus, SkillRequirement, SkillsRepository,
    TimeWindow,
};
use crate::types::{MarketTrend, SkillCoverage, SkillDemand};

#[derive(Debug, Clone, Default)]
struct Dataset {
    coverage: Vec<SkillCoverage>,
    demand: Vec<SkillDemand>,
}

/// Repository backed by fixed vectors, with optional injected failures.
///
/// An empty repository reports a schema that is not ready.
#[derive(Debug, Default)]
pub struct MemSkillsRepository {
    schema: SchemaStatus,
    probe_error: Option<RepositoryError>,
    fetch_error: Option<RepositoryError>,
    departments_error: Option<RepositoryError>,
    organization: Dataset,
    trends: Vec<MarketTrend>,
    departments: Vec<Department>,
    department_data: HashMap<String, Dataset>,
    failing_departments: HashMap<String, RepositoryError>,
    resources: HashMap<String, ResourceProfile>,
    resource_skills: HashMap<String, Vec<ResourceSkill>>,
    role_requirements: HashMap<String, Vec<SkillRequirement>>,
    assignment_requirements: HashMap<String, Vec<SkillRequirement>>,
    queries: AtomicUsize,
}

impl MemSkillsRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Organization-wide datasets; marks the schema ready.
    pub fn with_dataset(
        mut self,
        coverage: Vec<SkillCoverage>,
        demand: Vec<SkillDemand>,
        trends: Vec<MarketTrend>,
    ) -> Self {
        let skills = (coverage.len() + demand.len()).max(1) as u64;
        self.schema = SchemaStatus::ready(skills);
        self.organization = Dataset { coverage, demand };
        self.trends = trends;
        self
    }

    pub fn with_schema(mut self, schema: SchemaStatus) -> Self {
        self.schema = schema;
        self
    }

    pub fn with_probe_error(mut self, err: RepositoryError) -> Self {
        self.probe_error = Some(err);
        self
    }

    /// Fail every coverage, demand, and trend read.
    pub fn with_fetch_error(mut self, err: RepositoryError) -> Self {
        self.fetch_error = Some(err);
        self
    }

    pub fn with_departments_error(mut self, err: RepositoryError) -> Self {
        self.departments_error = Some(err);
        self
    }

    /// A department scoped to its own coverage and demand.
    pub fn with_department(
        mut self,
        department: Department,
        coverage: Vec<SkillCoverage>,
        demand: Vec<SkillDemand>,
    ) -> Self {
        self.department_data
            .insert(department.id.clone(), Dataset { coverage, demand });
        self.departments.push(department);
        self
    }

    /// A department whose scoped reads fail with `err`.
    pub fn with_failing_department(mut self, department: Department, err: RepositoryError) -> Self {
        self.failing_departments.insert(department.id.clone(), err);
        self.departments.push(department);
        self
    }

    pub fn with_resource(mut self, profile: ResourceProfile, skills: Vec<ResourceSkill>) -> Self {
        self.resource_skills.insert(profile.id.clone(), skills);
        self.resources.insert(profile.id.clone(), profile);
        self
    }

    pub fn with_role_requirements(
        mut self,
        role: impl Into<String>,
        requirements: Vec<SkillRequirement>,
    ) -> Self {
        self.role_requirements.insert(role.into(), requirements);
        self
    }

    pub fn with_assignment_requirements(
        mut self,
        resource_id: impl Into<String>,
        requirements: Vec<SkillRequirement>,
    ) -> Self {
        self.assignment_requirements
            .insert(resource_id.into(), requirements);
        self
    }

    /// Number of dataset reads served or failed so far.
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    fn dataset(&self, department_id: Option<&str>) -> Result<&Dataset, RepositoryError> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = &self.fetch_error {
            return Err(err.clone());
        }
        match department_id {
            None => Ok(&self.organization),
            Some(id) => {
                if let Some(err) = self.failing_departments.get(id) {
                    return Err(err.clone());
                }
                Ok(self.department_data.get(id).unwrap_or(&EMPTY))
            }
        }
    }
}

static EMPTY: Dataset = Dataset {
    coverage: Vec::new(),
    demand: Vec::new(),
};

#[async_trait]
impl SkillsRepository for MemSkillsRepository {
    async fn probe_schema(&self) -> Result<SchemaStatus, RepositoryError> {
        match &self.probe_error {
            Some(err) => Err(err.clone()),
            None => Ok(self.schema.clone()),
        }
    }

    async fn fetch_coverage(
        &self,
        department_id: Option<&str>,
        categories: &[String],
    ) -> Result<Vec<SkillCoverage>, RepositoryError> {
        let data = self.dataset(department_id)?;
        Ok(data
            .coverage
            .iter()
            .filter(|c| categories.is_empty() || categories.contains(&c.category))
            .cloned()
            .collect())
    }

    async fn fetch_demand(
        &self,
        _window: &TimeWindow,
        department_id: Option<&str>,
    ) -> Result<Vec<SkillDemand>, RepositoryError> {
        Ok(self.dataset(department_id)?.demand.clone())
    }

    async fn fetch_market_trends(&self) -> Result<Vec<MarketTrend>, RepositoryError> {
        self.dataset(None)?;
        Ok(self.trends.clone())
    }

    async fn list_departments(&self) -> Result<Vec<Department>, RepositoryError> {
        match &self.departments_error {
            Some(err) => Err(err.clone()),
            None => Ok(self.departments.clone()),
        }
    }

    async fn find_department(&self, id: &str) -> Result<Option<Department>, RepositoryError> {
        if let Some(err) = &self.departments_error {
            return Err(err.clone());
        }
        Ok(self.departments.iter().find(|d| d.id == id).cloned())
    }

    async fn find_resource(&self, id: &str) -> Result<Option<ResourceProfile>, RepositoryError> {
        Ok(self.resources.get(id).cloned())
    }

    async fn fetch_resource_skills(
        &self,
        resource_id: &str,
    ) -> Result<Vec<ResourceSkill>, RepositoryError> {
        Ok(self
            .resource_skills
            .get(resource_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn fetch_role_requirements(
        &self,
        role: &str,
    ) -> Result<Vec<SkillRequirement>, RepositoryError> {
        Ok(self.role_requirements.get(role).cloned().unwrap_or_default())
    }

    async fn fetch_assignment_requirements(
        &self,
        resource_id: &str,
        _on: Date,
    ) -> Result<Vec<SkillRequirement>, RepositoryError> {
        Ok(self
            .assignment_requirements
            .get(resource_id)
            .cloned()
            .unwrap_or_default())
    }
}
