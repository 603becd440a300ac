use std::sync::Arc;
use crate::domain::ports::{
    ActivityRepository, AttendanceRepository, CertificateRepository, ContactRepository,
    EmailService, EventRepository, GalleryRepository, OpportunityRepository, PaymentGateway,
    RegistrationRepository, ResearchRepository, StudentRepository, TeamRepository,
};
use crate::domain::services::auth_service::AuthService;
use crate::config::Config;
use tera::Tera;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub student_repo: Arc<dyn StudentRepository>,
    pub event_repo: Arc<dyn EventRepository>,
    pub registration_repo: Arc<dyn RegistrationRepository>,
    pub attendance_repo: Arc<dyn AttendanceRepository>,
    pub certificate_repo: Arc<dyn CertificateRepository>,
    pub research_repo: Arc<dyn ResearchRepository>,
    pub opportunity_repo: Arc<dyn OpportunityRepository>,
    pub gallery_repo: Arc<dyn GalleryRepository>,
    pub team_repo: Arc<dyn TeamRepository>,
    pub contact_repo: Arc<dyn ContactRepository>,
    pub activity_repo: Arc<dyn ActivityRepository>,
    pub auth_service: Arc<AuthService>,
    pub email_service: Arc<dyn EmailService>,
    pub payment_gateway: Arc<dyn PaymentGateway>,
    pub templates: Arc<Tera>,
}
