use crate::domain::models::{
    activity::ActivityLog,
    attendance::{Attendance, AttendanceWithEvent, AttendanceWithStudent},
    certificate::{Certificate, CertificateDetails, CertificateWithEvent},
    contact::ContactMessage,
    event::{CalendarEvent, Event, EventFilter},
    gallery::{GalleryFilter, GalleryImage},
    opportunity::{Opportunity, OpportunityFilter},
    registration::{PaymentStatus, Registration, RegistrationWithEvent, RegistrationWithStudent},
    research::{MemberStatus, ProjectListing, ProjectMember, ProjectMemberWithStudent, ResearchFilter, ResearchProject},
    student::{ProfileUpdate, Student},
    team::{TeamFilter, TeamMember},
};
use crate::domain::services::pagination::PageRequest;
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};

#[async_trait]
pub trait StudentRepository: Send + Sync {
    /// Fails with `Conflict` when the PRN or email is already taken.
    async fn create(&self, student: &Student) -> Result<Student, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Student>, AppError>;
    async fn find_by_prn(&self, prn: &str) -> Result<Option<Student>, AppError>;
    /// Matches either the (lowercased) email or the (uppercased) PRN.
    async fn find_by_identifier(&self, identifier: &str) -> Result<Option<Student>, AppError>;
    async fn exists_by_prn_or_email(&self, prn: &str, email: &str) -> Result<bool, AppError>;
    async fn find_by_verification_hash(&self, token_hash: &str) -> Result<Option<Student>, AppError>;
    async fn find_by_reset_hash(&self, token_hash: &str, now: DateTime<Utc>) -> Result<Option<Student>, AppError>;
    async fn mark_verified(&self, id: &str) -> Result<(), AppError>;
    async fn set_verification_token(&self, id: &str, token_hash: &str) -> Result<(), AppError>;
    async fn set_reset_token(&self, id: &str, token_hash: &str, expires_at: DateTime<Utc>) -> Result<(), AppError>;
    /// Stores the new hash and clears any pending reset token.
    async fn update_password(&self, id: &str, password_hash: &str) -> Result<(), AppError>;
    async fn update_profile(&self, id: &str, profile: &ProfileUpdate) -> Result<Student, AppError>;
    async fn update_profile_image(&self, id: &str, path: &str) -> Result<(), AppError>;
    async fn set_role(&self, id: &str, role: &str) -> Result<(), AppError>;
    async fn search(&self, search: Option<&str>, page: &PageRequest) -> Result<(Vec<Student>, i64), AppError>;
    async fn count(&self) -> Result<i64, AppError>;
}

#[async_trait]
pub trait EventRepository: Send + Sync {
    async fn create(&self, event: &Event) -> Result<Event, AppError>;
    async fn update(&self, event: &Event) -> Result<Event, AppError>;
    async fn delete(&self, id: &str) -> Result<(), AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Event>, AppError>;
    async fn search(&self, filter: &EventFilter, now: NaiveDateTime, page: &PageRequest) -> Result<(Vec<Event>, i64), AppError>;
    async fn list_upcoming(&self, now: NaiveDateTime, limit: i64) -> Result<Vec<Event>, AppError>;
    async fn list_all(&self) -> Result<Vec<Event>, AppError>;
    /// Events in `[start, end)`, flagged with the student's registration when one is given.
    async fn list_in_window(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
        category: Option<&str>,
        student_id: Option<&str>,
    ) -> Result<Vec<CalendarEvent>, AppError>;
    async fn list_open_deadlines(&self, now: NaiveDateTime) -> Result<Vec<Event>, AppError>;
    async fn list_upcoming_paid(&self, now: NaiveDateTime) -> Result<Vec<Event>, AppError>;
    async fn list_categories(&self) -> Result<Vec<String>, AppError>;
    async fn count(&self) -> Result<i64, AppError>;
}

#[async_trait]
pub trait RegistrationRepository: Send + Sync {
    /// Inserts the registration and its activity entry atomically, re-checking capacity
    /// inside the transaction.
    async fn register(&self, registration: &Registration, capacity: Option<i32>, activity: &ActivityLog) -> Result<Registration, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Registration>, AppError>;
    async fn find(&self, event_id: &str, student_id: &str) -> Result<Option<Registration>, AppError>;
    async fn count_for_event(&self, event_id: &str) -> Result<i64, AppError>;
    async fn count_for_student(&self, student_id: &str) -> Result<i64, AppError>;
    async fn list_for_student(&self, student_id: &str) -> Result<Vec<RegistrationWithEvent>, AppError>;
    async fn list_upcoming_for_student(&self, student_id: &str, now: NaiveDateTime, limit: i64) -> Result<Vec<RegistrationWithEvent>, AppError>;
    async fn list_for_event(&self, event_id: &str) -> Result<Vec<RegistrationWithStudent>, AppError>;
    async fn set_order(&self, id: &str, order_id: &str) -> Result<(), AppError>;
    async fn complete_payment(&self, id: &str, payment_id: &str, amount: f64, activity: &ActivityLog) -> Result<(), AppError>;
    async fn set_payment_status(&self, id: &str, status: PaymentStatus) -> Result<(), AppError>;
    /// Marks a still-unpaid registration failed. Returns false when it was no longer pending or failed.
    async fn fail_pending_payment(&self, id: &str) -> Result<bool, AppError>;
    async fn count(&self) -> Result<i64, AppError>;
    async fn count_by_payment_status(&self, status: PaymentStatus) -> Result<i64, AppError>;
}

#[async_trait]
pub trait AttendanceRepository: Send + Sync {
    /// Inserts the row, flips the matching registration to present and logs the activity
    /// in one transaction. A second mark for the same (event, student) is a `Conflict`.
    async fn mark(&self, attendance: &Attendance, activity: &ActivityLog) -> Result<Attendance, AppError>;
    async fn exists(&self, event_id: &str, student_id: &str) -> Result<bool, AppError>;
    async fn list_for_event(&self, event_id: &str) -> Result<Vec<AttendanceWithStudent>, AppError>;
    async fn list_for_student(&self, student_id: &str) -> Result<Vec<AttendanceWithEvent>, AppError>;
    async fn count_for_student(&self, student_id: &str) -> Result<i64, AppError>;
}

#[async_trait]
pub trait CertificateRepository: Send + Sync {
    /// Student ids marked present for the event that hold no certificate yet.
    async fn list_missing(&self, event_id: &str) -> Result<Vec<String>, AppError>;
    /// Inserts in one transaction, skipping duplicates. Returns how many rows were written.
    async fn create_batch(&self, certificates: &[Certificate]) -> Result<u64, AppError>;
    async fn list_for_student(&self, student_id: &str) -> Result<Vec<CertificateWithEvent>, AppError>;
    async fn find_details(&self, certificate_id: &str) -> Result<Option<CertificateDetails>, AppError>;
    async fn count_for_student(&self, student_id: &str) -> Result<i64, AppError>;
}

#[async_trait]
pub trait ResearchRepository: Send + Sync {
    async fn create(&self, project: &ResearchProject) -> Result<ResearchProject, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<ResearchProject>, AppError>;
    async fn search(&self, filter: &ResearchFilter, page: &PageRequest) -> Result<(Vec<ProjectListing>, i64), AppError>;
    async fn set_status(&self, id: &str, status: &str) -> Result<(), AppError>;
    async fn count_accepted(&self, project_id: &str) -> Result<i64, AppError>;
    async fn count_accepted_for_student(&self, student_id: &str) -> Result<i64, AppError>;
    async fn find_membership(&self, project_id: &str, student_id: &str) -> Result<Option<ProjectMember>, AppError>;
    /// Fails with `Conflict` when the student already has a membership row.
    async fn request_join(&self, member: &ProjectMember, activity: &ActivityLog) -> Result<ProjectMember, AppError>;
    /// Returns false when there was nothing to remove.
    async fn leave(&self, project_id: &str, student_id: &str) -> Result<bool, AppError>;
    async fn list_members(&self, project_id: &str, status: Option<MemberStatus>) -> Result<Vec<ProjectMemberWithStudent>, AppError>;
    /// Accepting fails with `Conflict` once the project already holds `max_members` accepted members.
    async fn set_member_status(&self, project_id: &str, member_id: &str, status: MemberStatus) -> Result<(), AppError>;
}

#[async_trait]
pub trait OpportunityRepository: Send + Sync {
    async fn create(&self, opportunity: &Opportunity) -> Result<Opportunity, AppError>;
    async fn delete(&self, id: &str) -> Result<(), AppError>;
    async fn search(&self, filter: &OpportunityFilter, page: &PageRequest) -> Result<(Vec<Opportunity>, i64), AppError>;
    async fn list_featured(&self, limit: i64) -> Result<Vec<Opportunity>, AppError>;
}

#[async_trait]
pub trait GalleryRepository: Send + Sync {
    async fn create(&self, image: &GalleryImage) -> Result<GalleryImage, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<GalleryImage>, AppError>;
    async fn delete(&self, id: &str) -> Result<(), AppError>;
    async fn search(&self, filter: &GalleryFilter, page: &PageRequest) -> Result<(Vec<GalleryImage>, i64), AppError>;
    async fn list_categories(&self) -> Result<Vec<String>, AppError>;
}

#[async_trait]
pub trait TeamRepository: Send + Sync {
    async fn create(&self, member: &TeamMember) -> Result<TeamMember, AppError>;
    async fn delete(&self, id: &str) -> Result<(), AppError>;
    async fn search(&self, filter: &TeamFilter, page: &PageRequest) -> Result<(Vec<TeamMember>, i64), AppError>;
}

#[async_trait]
pub trait ContactRepository: Send + Sync {
    async fn create(&self, message: &ContactMessage) -> Result<ContactMessage, AppError>;
    async fn list(&self, page: &PageRequest) -> Result<(Vec<ContactMessage>, i64), AppError>;
    async fn count(&self) -> Result<i64, AppError>;
}

#[async_trait]
pub trait ActivityRepository: Send + Sync {
    async fn record(&self, activity: &ActivityLog) -> Result<(), AppError>;
    async fn list_recent(&self, student_id: &str, limit: i64) -> Result<Vec<ActivityLog>, AppError>;
}

#[async_trait]
pub trait EmailService: Send + Sync {
    async fn send(
        &self,
        recipient: &str,
        subject: &str,
        html_body: &str,
        attachment_name: Option<&str>,
        attachment_data: Option<&[u8]>
    ) -> Result<(), AppError>;
}

#[derive(Debug, Clone)]
pub struct PaymentOrder {
    pub id: String,
    pub amount: i64,
    pub currency: String,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    fn key_id(&self) -> String;
    /// `amount` is in the smallest currency unit (paise).
    async fn create_order(&self, amount: i64, currency: &str, receipt: &str) -> Result<PaymentOrder, AppError>;
    fn verify_signature(&self, order_id: &str, payment_id: &str, signature: &str) -> bool;
}
