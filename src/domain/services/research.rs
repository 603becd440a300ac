use crate::domain::models::activity::{ActivityLog, ACTION_PROJECT_JOIN_REQUESTED};
use crate::domain::models::research::{ProjectMember, ResearchProject};
use crate::domain::models::student::Student;
use crate::error::AppError;
use crate::state::AppState;
use tracing::{info, warn};

pub const PROJECT_NOT_FOUND: &str = "Project not found";
pub const NOT_ACCEPTING: &str = "This project is not accepting new members";
pub const PROJECT_FULL: &str = "This project is full";
pub const ALREADY_REQUESTED: &str = "You have already requested to join this project";
pub const JOIN_REQUESTED: &str = "Join request sent successfully";
pub const LEFT_PROJECT: &str = "You have left the project";
pub const NOT_A_MEMBER: &str = "You are not a member of this project";

async fn load_project(state: &AppState, project_id: &str) -> Result<ResearchProject, AppError> {
    state
        .research_repo
        .find_by_id(project_id)
        .await?
        .ok_or_else(|| AppError::NotFound(PROJECT_NOT_FOUND.into()))
}

pub async fn request_join(state: &AppState, student: &Student, project_id: &str, message: Option<String>) -> Result<ProjectMember, AppError> {
    let project = load_project(state, project_id).await?;

    if !project.is_accepting_members() {
        return Err(AppError::Validation(NOT_ACCEPTING.into()));
    }
    if state.research_repo.count_accepted(&project.id).await? >= project.max_members as i64 {
        return Err(AppError::Conflict(PROJECT_FULL.into()));
    }
    if state.research_repo.find_membership(&project.id, &student.id).await?.is_some() {
        warn!(project_id = %project.id, student_id = %student.id, "Duplicate join request");
        return Err(AppError::Conflict(ALREADY_REQUESTED.into()));
    }

    let message = message.map(|m| m.trim().to_string()).filter(|m| !m.is_empty());
    let member = ProjectMember::join_request(&project.id, &student.id, message);
    let activity = ActivityLog::new(&student.id, ACTION_PROJECT_JOIN_REQUESTED, format!("Requested to join {}", project.title));
    let member = state.research_repo.request_join(&member, &activity).await?;

    info!(project_id = %project.id, student_id = %student.id, "Project join requested");
    Ok(member)
}

pub async fn leave(state: &AppState, student: &Student, project_id: &str) -> Result<(), AppError> {
    let project = load_project(state, project_id).await?;
    if !state.research_repo.leave(&project.id, &student.id).await? {
        return Err(AppError::NotFound(NOT_A_MEMBER.into()));
    }
    info!(project_id = %project.id, student_id = %student.id, "Student left project");
    Ok(())
}
