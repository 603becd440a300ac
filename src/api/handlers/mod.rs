pub mod admin;
pub mod admin_content;
pub mod admin_events;
pub mod api;
pub mod auth;
pub mod health;
pub mod public;
pub mod student;

use crate::api::flash::Flash;
use crate::domain::services::pagination::Pager;
use crate::error::AppError;
use crate::state::AppState;
use axum::extract::Multipart;
use axum::response::{Html, IntoResponse, Response};
use std::collections::HashMap;
use tera::Context;
use tracing::warn;

pub(crate) fn render(state: &AppState, template: &str, ctx: &Context) -> Result<Html<String>, AppError> {
    state
        .templates
        .render(template, ctx)
        .map(Html)
        .map_err(|e| AppError::InternalWithMsg(format!("Template {} failed to render: {:?}", template, e)))
}

/// Re-renders a form page in the same request, with the error's messages as the flash.
pub(crate) fn render_form_error(state: &AppState, template: &str, mut ctx: Context, err: AppError) -> Result<Response, AppError> {
    ctx.insert("flash", &Flash::from_error(&err));
    let page = render(state, template, &ctx)?;
    Ok((err.status_code(), page).into_response())
}

pub(crate) fn insert_pager(ctx: &mut Context, pager: &Pager) {
    ctx.insert("pager", pager);
    ctx.insert("show_pager", &pager.is_needed());
}

/// Text fields of a multipart form plus the bytes of one file field.
#[derive(Default)]
pub(crate) struct UploadForm {
    pub fields: HashMap<String, String>,
    pub file: Vec<u8>,
}

impl UploadForm {
    pub fn text(&self, name: &str) -> &str {
        self.fields.get(name).map(String::as_str).unwrap_or("")
    }
}

pub(crate) async fn read_upload(mut multipart: Multipart, file_field: &str) -> Result<UploadForm, AppError> {
    let mut form = UploadForm::default();
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                warn!(error = %e, "Malformed multipart body");
                return Err(AppError::Validation("The upload could not be read. Please try again.".into()));
            }
        };
        let name = field.name().unwrap_or_default().to_string();
        let bytes = field.bytes().await.map_err(|e| {
            warn!(field = %name, error = %e, "Multipart field could not be read");
            AppError::Validation("The upload could not be read. Please try again.".into())
        })?;
        if name == file_field {
            form.file = bytes.to_vec();
        } else {
            form.fields.insert(name, String::from_utf8_lossy(&bytes).into_owned());
        }
    }
    Ok(form)
}
