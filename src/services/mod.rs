pub mod audit_service;
pub mod auth_service;
pub mod blacklist_service;
pub mod dashboard_service;
pub mod event_service;
pub mod feed_service;
pub mod post_service;
pub mod providers;
pub mod quiz_service;
pub mod report_service;
pub mod url_checker;
pub mod user_service;
pub mod volunteer_service;

pub use audit_service::AuditService;
pub use auth_service::AuthService;
pub use blacklist_service::BlacklistService;
pub use dashboard_service::DashboardService;
pub use event_service::EventService;
pub use feed_service::FeedService;
pub use post_service::PostService;
pub use quiz_service::QuizService;
pub use report_service::ReportService;
pub use url_checker::UrlCheckerService;
pub use user_service::UserService;
pub use volunteer_service::VolunteerService;
