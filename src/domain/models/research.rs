use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectStatus {
    Active,
    Completed,
    OnHold,
}

impl ProjectStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Active => "active",
            ProjectStatus::Completed => "completed",
            ProjectStatus::OnHold => "on_hold",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "active" => Some(ProjectStatus::Active),
            "completed" => Some(ProjectStatus::Completed),
            "on_hold" => Some(ProjectStatus::OnHold),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberStatus {
    Pending,
    Accepted,
    Rejected,
}

impl MemberStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberStatus::Pending => "pending",
            MemberStatus::Accepted => "accepted",
            MemberStatus::Rejected => "rejected",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(MemberStatus::Pending),
            "accepted" => Some(MemberStatus::Accepted),
            "rejected" => Some(MemberStatus::Rejected),
            _ => None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct ResearchProject {
    pub id: String,
    pub title: String,
    pub description: String,
    /// JSON array text, e.g. `["Rust","Axum"]`.
    pub tech_stack: String,
    pub status: String,
    pub coordinator_id: Option<String>,
    pub domain_lead_id: Option<String>,
    pub max_members: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ResearchProject {
    pub fn new(title: String, description: String, tech_stack: String, max_members: i32, coordinator_id: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            title,
            description,
            tech_stack,
            status: ProjectStatus::Active.as_str().to_string(),
            coordinator_id,
            domain_lead_id: None,
            max_members,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_accepting_members(&self) -> bool {
        ProjectStatus::parse(&self.status) == Some(ProjectStatus::Active)
    }
}

/// Listing row: the project plus its accepted member count.
#[derive(Debug, Serialize, FromRow, Clone)]
pub struct ProjectListing {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub project: ResearchProject,
    pub member_count: i64,
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct ProjectMember {
    pub id: String,
    pub project_id: String,
    pub student_id: String,
    pub role: String,
    pub status: String,
    pub message: Option<String>,
    pub joined_at: DateTime<Utc>,
}

impl ProjectMember {
    pub fn join_request(project_id: &str, student_id: &str, message: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            project_id: project_id.to_string(),
            student_id: student_id.to_string(),
            role: "member".to_string(),
            status: MemberStatus::Pending.as_str().to_string(),
            message,
            joined_at: Utc::now(),
        }
    }
}

#[derive(Debug, Serialize, FromRow, Clone)]
pub struct ProjectMemberWithStudent {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub member: ProjectMember,
    pub first_name: String,
    pub last_name: String,
    pub prn: String,
    pub department: String,
}

#[derive(Debug, Clone, Default)]
pub struct ResearchFilter {
    pub search: Option<String>,
    pub status: Option<String>,
}
