use serde::{Deserialize, Serialize};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;
use uuid::Uuid;

pub const OPPORTUNITY_TYPES: [&str; 5] = ["internship", "hackathon", "event", "research", "job"];

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Opportunity {
    pub id: String,
    pub title: String,
    pub description: String,
    pub opportunity_type: String,
    pub organizer: String,
    pub location: String,
    /// JSON array text.
    pub tech_stack: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub apply_link: Option<String>,
    pub is_featured: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct NewOpportunity {
    pub title: String,
    pub description: String,
    pub opportunity_type: String,
    pub organizer: String,
    pub location: String,
    pub tech_stack: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub apply_link: Option<String>,
    pub is_featured: bool,
}

impl Opportunity {
    pub fn new(params: NewOpportunity) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: params.title,
            description: params.description,
            opportunity_type: params.opportunity_type,
            organizer: params.organizer,
            location: params.location,
            tech_stack: params.tech_stack,
            start_date: params.start_date,
            end_date: params.end_date,
            apply_link: params.apply_link,
            is_featured: params.is_featured,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct OpportunityFilter {
    pub search: Option<String>,
    pub opportunity_type: Option<String>,
}
