use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct TeamMember {
    pub id: String,
    pub name: String,
    pub position: String,
    pub category: String,
    pub bio: Option<String>,
    pub photo: Option<String>,
    pub linkedin: Option<String>,
    pub github: Option<String>,
    pub instagram: Option<String>,
    pub email: Option<String>,
    pub student_id: Option<String>,
    pub display_order: i32,
    pub created_at: DateTime<Utc>,
}

pub struct NewTeamMember {
    pub name: String,
    pub position: String,
    pub category: String,
    pub bio: Option<String>,
    pub linkedin: Option<String>,
    pub github: Option<String>,
    pub instagram: Option<String>,
    pub email: Option<String>,
    pub display_order: i32,
}

impl TeamMember {
    pub fn new(params: NewTeamMember) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: params.name,
            position: params.position,
            category: params.category,
            bio: params.bio,
            photo: None,
            linkedin: params.linkedin,
            github: params.github,
            instagram: params.instagram,
            email: params.email,
            student_id: None,
            display_order: params.display_order,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TeamFilter {
    pub search: Option<String>,
    pub category: Option<String>,
}
