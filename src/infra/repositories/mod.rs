pub mod query;

pub mod sqlite_activity_repo;
pub mod sqlite_attendance_repo;
pub mod sqlite_certificate_repo;
pub mod sqlite_contact_repo;
pub mod sqlite_event_repo;
pub mod sqlite_gallery_repo;
pub mod sqlite_opportunity_repo;
pub mod sqlite_registration_repo;
pub mod sqlite_research_repo;
pub mod sqlite_student_repo;
pub mod sqlite_team_repo;

pub mod postgres_activity_repo;
pub mod postgres_attendance_repo;
pub mod postgres_certificate_repo;
pub mod postgres_contact_repo;
pub mod postgres_event_repo;
pub mod postgres_gallery_repo;
pub mod postgres_opportunity_repo;
pub mod postgres_registration_repo;
pub mod postgres_research_repo;
pub mod postgres_student_repo;
pub mod postgres_team_repo;
