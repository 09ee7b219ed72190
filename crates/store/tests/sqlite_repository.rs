use std::sync::Arc;

use skillgap_intelligence::{
    AnalysisError, AnalysisOptions, GapSeverity, GapType, RepositoryError, SkillsGapAnalyzer,
    SkillsRepository, TimeRange,
};
use skillgap_store::SqliteSkillsRepository;
use skillgap_test_utils::TestFixture;
use time::{Date, Month, OffsetDateTime};

fn today() -> Date {
    OffsetDateTime::now_utc().date()
}

async fn seeded(fixture: &TestFixture) -> SqliteSkillsRepository {
    let repo = SqliteSkillsRepository::open(fixture.db_path()).unwrap();
    repo.seed_demo_data(today()).await.unwrap();
    repo
}

#[tokio::test]
async fn given_new_file_when_probing_then_tables_are_missing() {
    let fixture = TestFixture::new().unwrap();
    let repo = SqliteSkillsRepository::open(fixture.db_path()).unwrap();
    let status = repo.probe_schema().await.unwrap();
    assert!(!status.is_ready());
    assert!(status.missing_tables.contains(&"skills".to_string()));
}

#[tokio::test]
async fn given_missing_tables_when_fetching_then_data_unavailable() {
    let repo = SqliteSkillsRepository::open_in_memory().unwrap();
    let err = repo.fetch_coverage(None, &[]).await.unwrap_err();
    assert!(matches!(err, RepositoryError::DataUnavailable(_)));
}

#[tokio::test]
async fn given_empty_database_when_analyzing_then_fallback_envelope() {
    let fixture = TestFixture::new().unwrap();
    let repo = SqliteSkillsRepository::open(fixture.db_path()).unwrap();
    let analyzer = SkillsGapAnalyzer::new(Arc::new(repo));
    let envelope = analyzer.analyze(&AnalysisOptions::default()).await.unwrap();
    assert!(envelope.using_fallback_data);
    assert!(!envelope.gap_analysis.immediate_gaps.is_empty());
}

#[tokio::test]
async fn given_unopenable_path_when_opening_then_unreachable() {
    let fixture = TestFixture::new().unwrap();
    let path = fixture.home_path().join("missing-dir").join("skillgap.db");
    let err = SqliteSkillsRepository::open(path).unwrap_err();
    assert!(matches!(err, RepositoryError::Unreachable(_)));
}

#[tokio::test]
async fn given_seed_when_fetching_coverage_then_counts_are_per_resource() {
    let fixture = TestFixture::new().unwrap();
    let repo = seeded(&fixture).await;

    let coverage = repo.fetch_coverage(None, &[]).await.unwrap();
    let sql = coverage.iter().find(|c| c.name == "SQL").unwrap();
    assert_eq!(sql.resource_count, 3);
    assert!((sql.coverage_percentage - 3.0 / 7.0 * 100.0).abs() < 1e-9);
    assert_eq!(sql.certified_count, 1);
    assert!((sql.avg_proficiency - 4.0).abs() < 1e-9);
    assert!(coverage.iter().all(|c| c.resource_count > 0));
    assert!(coverage.iter().all(|c| c.name != "Kubernetes"));

    let scoped = repo
        .fetch_coverage(Some("eng"), &["Backend".to_string(), "Cloud".to_string()])
        .await
        .unwrap();
    let names: Vec<&str> = scoped.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Java", "AWS", "Rust"]);
    let java = &scoped[0];
    assert!((java.coverage_percentage - 100.0).abs() < 1e-9);
}

#[tokio::test]
async fn given_category_value_with_quotes_when_filtering_then_it_is_bound() {
    let fixture = TestFixture::new().unwrap();
    let repo = seeded(&fixture).await;
    let rows = repo
        .fetch_coverage(None, &["Data' OR '1'='1".to_string()])
        .await
        .unwrap();
    assert!(rows.is_empty());
}

#[tokio::test]
async fn given_seed_when_fetching_demand_then_window_excludes_finished_projects() {
    let fixture = TestFixture::new().unwrap();
    let repo = seeded(&fixture).await;

    let window = TimeRange::SixMonths.window_from(today());
    let demand = repo.fetch_demand(&window, None).await.unwrap();
    assert!(demand.iter().all(|d| d.skill_name != "Flash"));
    let sql = demand.iter().find(|d| d.skill_name == "SQL").unwrap();
    assert_eq!(sql.project_count, 2);
    assert!((sql.demand_percentage - 50.0).abs() < 1e-9);

    let short = TimeRange::OneMonth.window_from(today());
    let near_term = repo.fetch_demand(&short, Some("eng")).await.unwrap();
    assert!(near_term.iter().any(|d| d.skill_name == "Kubernetes"));
    let distant = Date::from_calendar_date(2001, Month::January, 1).unwrap();
    let past = repo
        .fetch_demand(&TimeRange::OneMonth.window_from(distant), None)
        .await
        .unwrap();
    assert!(past.is_empty());
}

#[tokio::test]
async fn given_seed_when_fetching_trends_then_latest_first() {
    let fixture = TestFixture::new().unwrap();
    let repo = seeded(&fixture).await;
    let trends = repo.fetch_market_trends().await.unwrap();
    assert_eq!(trends.len(), 6);
    assert_eq!(trends[0].skill_name, "Machine Learning");
    assert_eq!(trends.last().unwrap().skill_name, "Flash");
}

#[tokio::test]
async fn given_seed_when_analyzing_then_real_gaps_are_found() {
    let fixture = TestFixture::new().unwrap();
    let repo = seeded(&fixture).await;
    let analyzer = SkillsGapAnalyzer::new(Arc::new(repo));
    let envelope = analyzer.analyze(&AnalysisOptions::default()).await.unwrap();

    assert!(!envelope.using_fallback_data);
    let kubernetes = envelope
        .gap_analysis
        .immediate_gaps
        .iter()
        .find(|g| g.skill_name == "Kubernetes")
        .unwrap();
    assert_eq!(kubernetes.gap_severity, GapSeverity::Critical);
    assert_eq!(kubernetes.gap_type, GapType::Missing);
    assert!(envelope
        .gap_analysis
        .emerging_gaps
        .iter()
        .any(|g| g.skill_name == "Machine Learning"));
}

#[tokio::test]
async fn given_seed_when_ranking_departments_then_every_department_is_listed() {
    let fixture = TestFixture::new().unwrap();
    let repo = seeded(&fixture).await;
    let analyzer = SkillsGapAnalyzer::new(Arc::new(repo));
    let summaries = analyzer.list_departments_with_gap_summary().await.unwrap();
    assert_eq!(summaries.len(), 3);
    assert!(summaries.iter().all(|s| s.error.is_none()));
    let scores: Vec<f64> = summaries.iter().filter_map(|s| s.overall_gap_score).collect();
    assert!(scores.windows(2).all(|w| w[0] >= w[1]));
}

#[tokio::test]
async fn given_seed_when_analyzing_resource_then_role_and_assignment_gaps() {
    let fixture = TestFixture::new().unwrap();
    let repo = seeded(&fixture).await;
    let analyzer = SkillsGapAnalyzer::new(Arc::new(repo));

    let envelope = analyzer
        .analyze_resource("4", &AnalysisOptions::default())
        .await
        .unwrap();
    assert!(!envelope.using_fallback_data);
    assert_eq!(envelope.resource.name, "Edgar Codd");
    let role_gaps: Vec<&str> = envelope
        .analysis
        .role_gaps
        .iter()
        .map(|g| g.skill_name.as_str())
        .collect();
    assert_eq!(role_gaps, vec!["Spark"]);
    assert!(envelope
        .analysis
        .project_gaps
        .iter()
        .any(|g| g.skill_name == "Spark" && g.sources == vec!["Lakehouse"]));

    let err = analyzer
        .analyze_resource("not-a-number", &AnalysisOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, AnalysisError::InvalidArgument(_)));
}
