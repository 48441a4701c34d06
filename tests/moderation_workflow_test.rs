//! Moderation workflow against a real PostgreSQL database.
//! Run with: DATABASE__URL=postgres://... cargo test -- --ignored

use uuid::Uuid;

use scamwatch_api::config::Config;
use scamwatch_api::db::Database;
use scamwatch_api::error::AppError;
use scamwatch_api::middleware::CurrentUser;
use scamwatch_api::models::{
    AuditAction, CreateAuditLog, DangerLevel, ModerationStatus, NewReport, NewVolunteer,
    ReportPriority, ReportStatus, ReporterInfo, ResourceType, ScamType, UserRole,
};
use scamwatch_api::services::{
    AuditService, AuthService, BlacklistService, PostService, ReportService, VolunteerService,
};
use scamwatch_api::utils::url::normalize_url;

async fn setup() -> (Database, Config) {
    let config = Config::load().expect("config");
    let db = Database::connect(&config).await.expect("database");
    db.run_migrations().await.expect("migrations");
    (db, config)
}

fn unique_url() -> String {
    format!("https://scam-{}.example-test.xyz/login", Uuid::new_v4().simple())
}

fn new_report(url: &str) -> NewReport {
    NewReport {
        url: url.to_string(),
        normalized_url: normalize_url(url).unwrap(),
        reason: "Asked for my bank OTP".to_string(),
        scam_type: ScamType::Phishing,
        reporter: ReporterInfo {
            name: Some("Lan".to_string()),
            email: Some("lan@example.com".to_string()),
            phone: None,
            is_anonymous: false,
        },
        reporter_id: None,
    }
}

async fn create_user(db: &Database, config: &Config) -> Uuid {
    let auth = AuthService::new(db.clone(), config.clone());
    let email = format!("{}@example.com", Uuid::new_v4().simple());
    let (user, _) = auth.register("Test User", &email, "secret123").await.unwrap();
    user.id
}

#[tokio::test]
#[ignore = "Requires PostgreSQL database"]
async fn approving_a_report_blacklists_its_url_once() {
    let (db, config) = setup().await;
    let admin_id = create_user(&db, &config).await;
    let reports = ReportService::new(db.clone());
    let url = unique_url();

    let report = reports.create(new_report(&url)).await.unwrap();
    assert_eq!(report.status, ReportStatus::Pending);

    let (approved, entry) = reports.approve(report.id, admin_id, None, Some("confirmed")).await.unwrap();
    assert_eq!(approved.status, ReportStatus::Approved);
    assert_eq!(approved.reviewed_by, Some(admin_id));
    assert_eq!(entry.normalized_url, report.normalized_url);
    assert_eq!(entry.danger_level, DangerLevel::High);
    assert_eq!(entry.source_report_id, Some(report.id));

    let again = reports.approve(report.id, admin_id, None, None).await;
    assert!(matches!(again, Err(AppError::BadRequest(_))));

    let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM blacklist WHERE normalized_url = $1")
        .bind(&report.normalized_url)
        .fetch_one(&db.pg)
        .await
        .unwrap();
    assert_eq!(rows, 1);

    let lookup = BlacklistService::new(db.clone())
        .search_url(&format!("{}/?utm=1#top", url.to_uppercase()))
        .await
        .unwrap();
    assert_eq!(lookup.entry.map(|e| e.id), Some(entry.id));
}

#[tokio::test]
#[ignore = "Requires PostgreSQL database"]
async fn second_open_report_on_same_url_is_flagged_duplicate() {
    let (db, _) = setup().await;
    let reports = ReportService::new(db.clone());
    let url = unique_url();

    let first = reports.create(new_report(&url)).await.unwrap();
    assert!(!first.is_duplicate);
    assert_eq!(first.priority, ReportPriority::Normal);

    let second = reports
        .create(new_report(&url.replace("https://", "http://www.")))
        .await
        .unwrap();
    assert!(second.is_duplicate);
    assert_eq!(second.duplicate_of, Some(first.id));
    assert_eq!(second.priority, ReportPriority::Low);
    assert_eq!(second.status, ReportStatus::Pending);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL database"]
async fn approving_a_second_report_for_a_listed_url_rolls_back() {
    let (db, config) = setup().await;
    let admin_id = create_user(&db, &config).await;
    let reports = ReportService::new(db.clone());
    let url = unique_url();

    let first = reports.create(new_report(&url)).await.unwrap();
    let second = reports.create(new_report(&url)).await.unwrap();
    reports.approve(first.id, admin_id, None, None).await.unwrap();

    let result = reports.approve(second.id, admin_id, None, None).await;
    assert!(matches!(result, Err(AppError::BadRequest(_))));

    let still_pending = reports.get(second.id).await.unwrap();
    assert_eq!(still_pending.status, ReportStatus::Pending);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL database"]
async fn public_post_listing_only_shows_approved_posts() {
    let (db, config) = setup().await;
    let author = create_user(&db, &config).await;
    let admin_id = create_user(&db, &config).await;
    let posts = PostService::new(db.clone());

    let approved = posts.create(author, "Approved warning", "Fake lottery SMS").await.unwrap();
    let rejected = posts.create(author, "Rejected warning", "Off topic").await.unwrap();
    let pending = posts.create(author, "Pending warning", "Awaiting review").await.unwrap();

    posts.approve(approved.id, admin_id, None).await.unwrap();
    posts.reject(rejected.id, admin_id, Some("off topic")).await.unwrap();

    let (listed, _) = posts.list_approved(100, 0).await.unwrap();
    assert!(listed.iter().all(|p| p.status == ModerationStatus::Approved));
    assert!(listed.iter().any(|p| p.id == approved.id));
    assert!(!listed.iter().any(|p| p.id == rejected.id || p.id == pending.id));

    assert!(matches!(posts.get_approved(pending.id).await, Err(AppError::NotFound(_))));

    let author_caller = CurrentUser {
        id: author,
        email: "author@example.com".to_string(),
        role: UserRole::User,
    };
    assert!(posts.delete(approved.id, &author_caller).await.is_err());
    posts.delete(pending.id, &author_caller).await.unwrap();
}

#[tokio::test]
#[ignore = "Requires PostgreSQL database"]
async fn author_delete_does_not_remove_a_post_approved_in_the_meantime() {
    let (db, config) = setup().await;
    let author = create_user(&db, &config).await;
    let admin_id = create_user(&db, &config).await;
    let posts = PostService::new(db.clone());

    let post = posts.create(author, "Fake toll fine", "SMS asks for a toll payment").await.unwrap();
    let author_caller = CurrentUser {
        id: author,
        email: "author@example.com".to_string(),
        role: UserRole::User,
    };

    posts.approve(post.id, admin_id, None).await.unwrap();

    assert!(matches!(
        posts.delete(post.id, &author_caller).await,
        Err(AppError::BadRequest(_))
    ));
    let still_listed = posts.get_approved(post.id).await.unwrap();
    assert_eq!(still_listed.status, ModerationStatus::Approved);

    let admin_caller = CurrentUser {
        id: admin_id,
        email: "admin@example.com".to_string(),
        role: UserRole::Admin,
    };
    posts.delete(post.id, &admin_caller).await.unwrap();
    assert!(matches!(
        posts.delete(post.id, &admin_caller).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
#[ignore = "Requires PostgreSQL database"]
async fn resource_audit_history_pages_with_real_total() {
    let (db, config) = setup().await;
    let admin_id = create_user(&db, &config).await;
    let audit = AuditService::new(db.clone());
    let resource_id = Uuid::new_v4().to_string();

    for _ in 0..3 {
        audit
            .log(CreateAuditLog {
                admin_id,
                action: AuditAction::UpdateBlacklistEntry,
                resource_type: ResourceType::Blacklist,
                resource_id: Some(resource_id.clone()),
                details: None,
            })
            .await
            .unwrap();
    }

    let (first, total) = audit
        .list_by_resource(ResourceType::Blacklist.as_str(), &resource_id, 2, 0)
        .await
        .unwrap();
    assert_eq!(total, 3);
    assert_eq!(first.len(), 2);

    let (second, total) = audit
        .list_by_resource(ResourceType::Blacklist.as_str(), &resource_id, 2, 2)
        .await
        .unwrap();
    assert_eq!(total, 3);
    assert_eq!(second.len(), 1);
    assert!(first.iter().all(|log| log.id != second[0].id));
}

#[tokio::test]
#[ignore = "Requires PostgreSQL database"]
async fn volunteer_email_is_unique_and_review_is_single_shot() {
    let (db, config) = setup().await;
    let admin_id = create_user(&db, &config).await;
    let volunteers = VolunteerService::new(db.clone());
    let email = format!("{}@example.com", Uuid::new_v4().simple());

    let registration = || NewVolunteer {
        full_name: "Hoa Nguyen".to_string(),
        email: email.clone(),
        phone: "0901234567".to_string(),
        specialty: "Community outreach".to_string(),
        motivation: None,
    };

    let volunteer = volunteers.register(registration()).await.unwrap();
    assert!(matches!(
        volunteers.register(registration()).await,
        Err(AppError::BadRequest(_))
    ));

    volunteers.reject(volunteer.id, admin_id, Some("incomplete")).await.unwrap();
    assert!(matches!(
        volunteers.approve(volunteer.id, admin_id, None).await,
        Err(AppError::BadRequest(_))
    ));
}
