use crate::api::dtos::requests::{
    CategoryListQuery, OpportunityForm, PageQuery, ProjectForm, ResearchListQuery, StatusForm, TeamForm,
};
use crate::api::extractors::session::PageContext;
use crate::api::flash::Flash;
use crate::api::handlers::admin::ADMIN_PER_PAGE;
use crate::api::handlers::{insert_pager, read_upload, render};
use crate::domain::models::gallery::{GalleryFilter, GalleryImage};
use crate::domain::models::opportunity::{Opportunity, OpportunityFilter, OPPORTUNITY_TYPES};
use crate::domain::models::research::{MemberStatus, ProjectStatus, ResearchFilter, ResearchProject};
use crate::domain::models::team::{TeamFilter, TeamMember};
use crate::domain::services::content::{
    validate_opportunity, validate_project, validate_team_member, OpportunityInput, TeamMemberInput,
};
use crate::domain::services::formatting::{sanitize, to_json_list};
use crate::domain::services::pagination::{PageRequest, Pager};
use crate::domain::services::uploads::{remove_upload, store_image};
use crate::domain::services::validation::normalize;
use crate::error::AppError;
use crate::state::AppState;
use axum::{
    extract::{Form, Multipart, Path, Query, State},
    response::{Html, Redirect},
};
use std::sync::Arc;
use tracing::info;

const DEFAULT_GALLERY_CATEGORY: &str = "General";

// Research

pub async fn research(
    State(state): State<Arc<AppState>>,
    page: PageContext,
    Query(query): Query<ResearchListQuery>,
) -> Result<Html<String>, AppError> {
    let filter = ResearchFilter {
        search: normalize(query.search),
        status: normalize(query.status),
    };
    let request = PageRequest::new(query.page.as_deref(), ADMIN_PER_PAGE);
    let (projects, total) = state.research_repo.search(&filter, &request).await?;
    let pager = Pager::build(
        &request,
        total,
        "/admin/research",
        &[("search", filter.search.clone()), ("status", filter.status.clone())],
    );

    let mut ctx = page.context();
    ctx.insert("projects", &projects);
    ctx.insert("search", &filter.search);
    ctx.insert("status", &filter.status);
    insert_pager(&mut ctx, &pager);
    render(&state, "admin/research.html", &ctx)
}

pub async fn create_project(
    State(state): State<Arc<AppState>>,
    page: PageContext,
    Form(form): Form<ProjectForm>,
) -> Result<Redirect, AppError> {
    let admin = page.student()?;
    let valid = match validate_project(&form.title, &form.description, &form.tech_stack, &form.max_members) {
        Ok(valid) => valid,
        Err(err) => return Ok(page.redirect("/admin/research", Flash::from_error(&err))),
    };
    let project = ResearchProject::new(valid.title, valid.description, valid.tech_stack, valid.max_members, Some(admin.id.clone()));
    let project = state.research_repo.create(&project).await?;
    info!(project_id = %project.id, "Research project created");
    Ok(page.redirect("/admin/research", Flash::success(format!("Project \"{}\" created", project.title))))
}

pub async fn set_project_status(
    State(state): State<Arc<AppState>>,
    page: PageContext,
    Path(project_id): Path<String>,
    Form(form): Form<StatusForm>,
) -> Result<Redirect, AppError> {
    let Some(status) = ProjectStatus::parse(form.status.trim()) else {
        return Ok(page.redirect("/admin/research", Flash::error("Invalid project status")));
    };
    state.research_repo.set_status(&project_id, status.as_str()).await?;
    info!(project_id = %project_id, status = status.as_str(), "Project status changed");
    Ok(page.redirect("/admin/research", Flash::success("Project status updated")))
}

pub async fn project_members(
    State(state): State<Arc<AppState>>,
    page: PageContext,
    Path(project_id): Path<String>,
) -> Result<Html<String>, AppError> {
    let project = state
        .research_repo
        .find_by_id(&project_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Project not found".into()))?;

    let mut ctx = page.context();
    ctx.insert("members", &state.research_repo.list_members(&project.id, None).await?);
    ctx.insert("project", &project);
    render(&state, "admin/research_members.html", &ctx)
}

pub async fn set_member_status(
    State(state): State<Arc<AppState>>,
    page: PageContext,
    Path((project_id, member_id)): Path<(String, String)>,
    Form(form): Form<StatusForm>,
) -> Result<Redirect, AppError> {
    let back = format!("/admin/research/{}/members", project_id);
    let Some(status) = MemberStatus::parse(form.status.trim()) else {
        return Ok(page.redirect(&back, Flash::error("Invalid member status")));
    };
    let flash = match state.research_repo.set_member_status(&project_id, &member_id, status).await {
        Ok(()) => {
            info!(project_id = %project_id, member_id = %member_id, status = status.as_str(), "Membership reviewed");
            Flash::success(format!("Member {}", status.as_str()))
        }
        Err(err) => Flash::from_error(&err),
    };
    Ok(page.redirect(&back, flash))
}

// Opportunities

pub async fn opportunities(
    State(state): State<Arc<AppState>>,
    page: PageContext,
    Query(query): Query<PageQuery>,
) -> Result<Html<String>, AppError> {
    let request = PageRequest::new(query.page.as_deref(), ADMIN_PER_PAGE);
    let (opportunities, total) = state.opportunity_repo.search(&OpportunityFilter::default(), &request).await?;
    let pager = Pager::build(&request, total, "/admin/opportunities", &[]);

    let mut ctx = page.context();
    ctx.insert("opportunities", &opportunities);
    ctx.insert("types", &OPPORTUNITY_TYPES);
    insert_pager(&mut ctx, &pager);
    render(&state, "admin/opportunities.html", &ctx)
}

pub async fn create_opportunity(
    State(state): State<Arc<AppState>>,
    page: PageContext,
    Form(form): Form<OpportunityForm>,
) -> Result<Redirect, AppError> {
    let input = OpportunityInput {
        title: &form.title,
        description: &form.description,
        opportunity_type: &form.opportunity_type,
        organizer: &form.organizer,
        location: &form.location,
        tech_stack: &form.tech_stack,
        start_date: &form.start_date,
        end_date: &form.end_date,
        apply_link: &form.apply_link,
        is_featured: form.is_featured.is_some(),
    };
    let params = match validate_opportunity(&input) {
        Ok(params) => params,
        Err(err) => return Ok(page.redirect("/admin/opportunities", Flash::from_error(&err))),
    };
    let opportunity = state.opportunity_repo.create(&Opportunity::new(params)).await?;
    info!(opportunity_id = %opportunity.id, "Opportunity created");
    Ok(page.redirect("/admin/opportunities", Flash::success("Opportunity created")))
}

pub async fn delete_opportunity(
    State(state): State<Arc<AppState>>,
    page: PageContext,
    Path(opportunity_id): Path<String>,
) -> Result<Redirect, AppError> {
    let flash = match state.opportunity_repo.delete(&opportunity_id).await {
        Ok(()) => Flash::success("Opportunity deleted"),
        Err(err) => Flash::from_error(&err),
    };
    Ok(page.redirect("/admin/opportunities", flash))
}

// Gallery

pub async fn gallery(
    State(state): State<Arc<AppState>>,
    page: PageContext,
    Query(query): Query<CategoryListQuery>,
) -> Result<Html<String>, AppError> {
    let filter = GalleryFilter {
        search: normalize(query.search),
        category: normalize(query.category),
    };
    let request = PageRequest::new(query.page.as_deref(), ADMIN_PER_PAGE);
    let (images, total) = state.gallery_repo.search(&filter, &request).await?;
    let pager = Pager::build(
        &request,
        total,
        "/admin/gallery",
        &[("search", filter.search.clone()), ("category", filter.category.clone())],
    );

    let mut ctx = page.context();
    ctx.insert("images", &images);
    insert_pager(&mut ctx, &pager);
    render(&state, "admin/gallery.html", &ctx)
}

pub async fn upload_gallery_image(
    State(state): State<Arc<AppState>>,
    page: PageContext,
    multipart: Multipart,
) -> Result<Redirect, AppError> {
    let admin = page.student()?;
    let upload = match read_upload(multipart, "image").await {
        Ok(upload) => upload,
        Err(err) => return Ok(page.redirect("/admin/gallery", Flash::from_error(&err))),
    };

    let title = sanitize(upload.text("title"));
    if title.is_empty() {
        return Ok(page.redirect("/admin/gallery", Flash::error("Title is required")));
    }
    let category = normalize(Some(upload.text("category").to_string()))
        .map(|c| sanitize(&c))
        .unwrap_or_else(|| DEFAULT_GALLERY_CATEGORY.to_string());
    let description = normalize(Some(upload.text("description").to_string())).map(|d| sanitize(&d));

    let image_path = match store_image(&state.config.upload_dir, "gallery", &upload.file).await {
        Ok(path) => path,
        Err(err) => return Ok(page.redirect("/admin/gallery", Flash::from_error(&err))),
    };

    let image = GalleryImage::new(title, description, category, to_json_list(upload.text("tags")), image_path, Some(admin.id.clone()));
    if let Err(err) = state.gallery_repo.create(&image).await {
        remove_upload(&state.config.upload_dir, &image.image_path).await;
        return Err(err);
    }
    info!(image_id = %image.id, "Gallery image uploaded");
    Ok(page.redirect("/admin/gallery", Flash::success("Image uploaded")))
}

pub async fn delete_gallery_image(
    State(state): State<Arc<AppState>>,
    page: PageContext,
    Path(image_id): Path<String>,
) -> Result<Redirect, AppError> {
    let Some(image) = state.gallery_repo.find_by_id(&image_id).await? else {
        return Ok(page.redirect("/admin/gallery", Flash::error("Image not found")));
    };
    state.gallery_repo.delete(&image.id).await?;
    remove_upload(&state.config.upload_dir, &image.image_path).await;
    info!(image_id = %image.id, "Gallery image deleted");
    Ok(page.redirect("/admin/gallery", Flash::success("Image deleted")))
}

// Team

pub async fn team(
    State(state): State<Arc<AppState>>,
    page: PageContext,
    Query(query): Query<PageQuery>,
) -> Result<Html<String>, AppError> {
    let request = PageRequest::new(query.page.as_deref(), ADMIN_PER_PAGE);
    let (members, total) = state.team_repo.search(&TeamFilter::default(), &request).await?;
    let pager = Pager::build(&request, total, "/admin/team", &[]);

    let mut ctx = page.context();
    ctx.insert("members", &members);
    insert_pager(&mut ctx, &pager);
    render(&state, "admin/team.html", &ctx)
}

pub async fn create_team_member(
    State(state): State<Arc<AppState>>,
    page: PageContext,
    Form(form): Form<TeamForm>,
) -> Result<Redirect, AppError> {
    let input = TeamMemberInput {
        name: &form.name,
        position: &form.position,
        category: &form.category,
        bio: &form.bio,
        linkedin: &form.linkedin,
        github: &form.github,
        instagram: &form.instagram,
        email: &form.email,
        display_order: &form.display_order,
    };
    let params = match validate_team_member(&input) {
        Ok(params) => params,
        Err(err) => return Ok(page.redirect("/admin/team", Flash::from_error(&err))),
    };
    let member = state.team_repo.create(&TeamMember::new(params)).await?;
    info!(member_id = %member.id, "Team member added");
    Ok(page.redirect("/admin/team", Flash::success(format!("{} added to the team", member.name))))
}

pub async fn delete_team_member(
    State(state): State<Arc<AppState>>,
    page: PageContext,
    Path(member_id): Path<String>,
) -> Result<Redirect, AppError> {
    let flash = match state.team_repo.delete(&member_id).await {
        Ok(()) => Flash::success("Team member removed"),
        Err(err) => Flash::from_error(&err),
    };
    Ok(page.redirect("/admin/team", flash))
}
