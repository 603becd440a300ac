use crate::domain::models::event::EventDraft;
use crate::domain::models::opportunity::{NewOpportunity, OPPORTUNITY_TYPES};
use crate::domain::models::team::NewTeamMember;
use crate::domain::services::auth_service::random_token;
use crate::domain::services::formatting::{sanitize, to_json_list};
use crate::domain::services::validation::{into_result, is_valid_email, normalize_email, require};
use crate::error::AppError;
use chrono::{NaiveDate, NaiveDateTime};

/// Format produced by `<input type="datetime-local">`.
pub const DATETIME_LOCAL_FORMAT: &str = "%Y-%m-%dT%H:%M";
pub const ACCESS_CODE_LEN: usize = 6;
pub const MAX_PROJECT_MEMBERS: i32 = 50;

pub fn generate_access_code() -> String {
    random_token(ACCESS_CODE_LEN).to_uppercase()
}

fn optional(value: &str) -> Option<String> {
    Some(value.trim().to_string()).filter(|v| !v.is_empty())
}

fn parse_datetime_local(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    NaiveDateTime::parse_from_str(value, DATETIME_LOCAL_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S"))
        .ok()
}

#[derive(Debug, Clone, Copy, Default)]
pub struct EventInput<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub event_date: &'a str,
    pub location: &'a str,
    pub fee: &'a str,
    pub category: &'a str,
    pub capacity: &'a str,
    pub manual_access_code: &'a str,
    pub banner_image: &'a str,
    pub registration_deadline: &'a str,
}

pub fn validate_event(input: &EventInput<'_>) -> Result<EventDraft, AppError> {
    let mut errors = Vec::new();

    require(input.title, "Title", &mut errors);
    require(input.description, "Description", &mut errors);
    require(input.location, "Location", &mut errors);
    require(input.category, "Category", &mut errors);

    let event_date = parse_datetime_local(input.event_date);
    if event_date.is_none() {
        errors.push("Event date must be a valid date and time".to_string());
    }

    let fee = match input.fee.trim() {
        "" => 0.0,
        raw => match raw.parse::<f64>() {
            Ok(fee) if fee.is_finite() && fee >= 0.0 => fee,
            _ => {
                errors.push("Fee must be a number of at least 0".to_string());
                0.0
            }
        },
    };

    let capacity = match input.capacity.trim() {
        "" => None,
        raw => match raw.parse::<i32>() {
            Ok(c) if c > 0 => Some(c),
            _ => {
                errors.push("Capacity must be a positive number".to_string());
                None
            }
        },
    };

    let registration_deadline = match input.registration_deadline.trim() {
        "" => None,
        raw => match parse_datetime_local(raw) {
            Some(deadline) => Some(deadline),
            None => {
                errors.push("Registration deadline must be a valid date and time".to_string());
                None
            }
        },
    };
    if let (Some(deadline), Some(date)) = (registration_deadline, event_date)
        && deadline > date
    {
        errors.push("Registration deadline cannot be after the event".to_string());
    }

    into_result(errors)?;
    let event_date = event_date.ok_or_else(|| AppError::Validation("Event date must be a valid date and time".into()))?;

    Ok(EventDraft {
        title: sanitize(input.title),
        description: sanitize(input.description),
        event_date,
        location: sanitize(input.location),
        fee,
        category: sanitize(input.category),
        capacity,
        manual_access_code: optional(input.manual_access_code).unwrap_or_else(generate_access_code),
        banner_image: optional(input.banner_image),
        registration_deadline,
    })
}

#[derive(Debug, Clone, Copy, Default)]
pub struct OpportunityInput<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub opportunity_type: &'a str,
    pub organizer: &'a str,
    pub location: &'a str,
    pub tech_stack: &'a str,
    pub start_date: &'a str,
    pub end_date: &'a str,
    pub apply_link: &'a str,
    pub is_featured: bool,
}

fn parse_optional_date(value: &str, label: &str, errors: &mut Vec<String>) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    match NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        Ok(date) => Some(date),
        Err(_) => {
            errors.push(format!("{} must be a valid date", label));
            None
        }
    }
}

pub fn validate_opportunity(input: &OpportunityInput<'_>) -> Result<NewOpportunity, AppError> {
    let mut errors = Vec::new();

    require(input.title, "Title", &mut errors);
    require(input.description, "Description", &mut errors);
    require(input.organizer, "Organizer", &mut errors);

    let opportunity_type = input.opportunity_type.trim().to_lowercase();
    if !OPPORTUNITY_TYPES.contains(&opportunity_type.as_str()) {
        errors.push("Invalid opportunity type".to_string());
    }

    let start_date = parse_optional_date(input.start_date, "Start date", &mut errors);
    let end_date = parse_optional_date(input.end_date, "End date", &mut errors);
    if let (Some(start), Some(end)) = (start_date, end_date)
        && end < start
    {
        errors.push("End date cannot be before the start date".to_string());
    }

    let apply_link = optional(input.apply_link);
    if let Some(link) = &apply_link
        && !(link.starts_with("http://") || link.starts_with("https://"))
    {
        errors.push("Apply link must start with http:// or https://".to_string());
    }

    into_result(errors)?;

    Ok(NewOpportunity {
        title: sanitize(input.title),
        description: sanitize(input.description),
        opportunity_type,
        organizer: sanitize(input.organizer),
        location: sanitize(input.location),
        tech_stack: to_json_list(input.tech_stack),
        start_date,
        end_date,
        apply_link,
        is_featured: input.is_featured,
    })
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TeamMemberInput<'a> {
    pub name: &'a str,
    pub position: &'a str,
    pub category: &'a str,
    pub bio: &'a str,
    pub linkedin: &'a str,
    pub github: &'a str,
    pub instagram: &'a str,
    pub email: &'a str,
    pub display_order: &'a str,
}

pub fn validate_team_member(input: &TeamMemberInput<'_>) -> Result<NewTeamMember, AppError> {
    let mut errors = Vec::new();

    require(input.name, "Name", &mut errors);
    require(input.position, "Position", &mut errors);
    require(input.category, "Category", &mut errors);

    let email = optional(input.email).map(|e| normalize_email(&e));
    if let Some(email) = &email
        && !is_valid_email(email)
    {
        errors.push("Invalid email address".to_string());
    }

    let display_order = match input.display_order.trim() {
        "" => 0,
        raw => raw.parse::<i32>().unwrap_or_else(|_| {
            errors.push("Display order must be a whole number".to_string());
            0
        }),
    };

    into_result(errors)?;

    Ok(NewTeamMember {
        name: sanitize(input.name),
        position: sanitize(input.position),
        category: sanitize(input.category),
        bio: optional(input.bio),
        linkedin: optional(input.linkedin),
        github: optional(input.github),
        instagram: optional(input.instagram),
        email,
        display_order,
    })
}

#[derive(Debug, Clone)]
pub struct ValidProject {
    pub title: String,
    pub description: String,
    pub tech_stack: String,
    pub max_members: i32,
}

pub fn validate_project(title: &str, description: &str, tech_stack: &str, max_members: &str) -> Result<ValidProject, AppError> {
    let mut errors = Vec::new();

    require(title, "Title", &mut errors);
    require(description, "Description", &mut errors);

    let max_members = match max_members.trim().parse::<i32>() {
        Ok(n) if (1..=MAX_PROJECT_MEMBERS).contains(&n) => n,
        _ => {
            errors.push(format!("Max members must be between 1 and {}", MAX_PROJECT_MEMBERS));
            0
        }
    };

    into_result(errors)?;

    Ok(ValidProject {
        title: sanitize(title),
        description: sanitize(description),
        tech_stack: to_json_list(tech_stack),
        max_members,
    })
}
