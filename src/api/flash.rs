use crate::error::AppError;
use axum::response::Redirect;
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use serde::{Deserialize, Serialize};
use tower_cookies::{Cookie, Cookies};
use tower_cookies::cookie::SameSite;
use tracing::debug;

pub const FLASH_COOKIE: &str = "spark_flash";

/// One-shot messages carried across a redirect.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Flash {
    #[serde(default)]
    pub success: Vec<String>,
    #[serde(default)]
    pub errors: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub google_calendar_url: Option<String>,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self { success: vec![message.into()], ..Default::default() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { errors: vec![message.into()], ..Default::default() }
    }

    pub fn from_error(err: &AppError) -> Self {
        err.log();
        Self { errors: err.user_messages(), ..Default::default() }
    }

    pub fn with_calendar_url(mut self, url: Option<String>) -> Self {
        self.google_calendar_url = url;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.success.is_empty() && self.errors.is_empty() && self.google_calendar_url.is_none()
    }

    pub fn encode(&self) -> String {
        URL_SAFE_NO_PAD.encode(serde_json::to_vec(self).unwrap_or_default())
    }

    pub fn decode(raw: &str) -> Option<Self> {
        let bytes = URL_SAFE_NO_PAD.decode(raw).ok()?;
        serde_json::from_slice(&bytes).ok()
    }
}

/// Reads and clears the pending flash.
pub fn take_flash(cookies: &Cookies) -> Flash {
    let Some(cookie) = cookies.get(FLASH_COOKIE) else {
        return Flash::default();
    };
    let flash = Flash::decode(cookie.value()).unwrap_or_else(|| {
        debug!("Discarding unreadable flash cookie");
        Flash::default()
    });
    cookies.remove(Cookie::build((FLASH_COOKIE, "")).path("/").into());
    flash
}

pub fn set_flash(cookies: &Cookies, flash: &Flash) {
    if flash.is_empty() {
        return;
    }
    let mut cookie = Cookie::new(FLASH_COOKIE, flash.encode());
    cookie.set_http_only(true);
    cookie.set_secure(true);
    cookie.set_same_site(SameSite::Strict);
    cookie.set_path("/");
    cookies.add(cookie);
}

/// 303 to `to`, carrying `flash` for the next page.
pub fn redirect_with(cookies: &Cookies, to: &str, flash: Flash) -> Redirect {
    set_flash(cookies, &flash);
    Redirect::to(to)
}
