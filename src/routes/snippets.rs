use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    Extension, Form,
};
use serde::Deserialize;
use tower_sessions::Session;

use crate::error::{AppError, AppResult, OptionExt};
use crate::middleware::auth::RequestIdentity;
use crate::middleware::csrf::CsrfToken;
use crate::session;
use crate::state::AppState;
use crate::templates;
use crate::validator::{self, Validator};

const PERMITTED_EXPIRY_DAYS: [i64; 3] = [1, 7, 365];

/// Submitted values of the snippet-creation form. Kept around so a failed
/// submission re-renders with what the user typed.
#[derive(Debug, Clone, Deserialize)]
pub struct SnippetForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default = "default_expires")]
    pub expires: i64,
}

fn default_expires() -> i64 {
    365
}

impl Default for SnippetForm {
    fn default() -> Self {
        Self { title: String::new(), content: String::new(), expires: default_expires() }
    }
}

pub async fn home(
    State(state): State<AppState>,
    session: Session,
    Extension(csrf): Extension<CsrfToken>,
    Extension(identity): Extension<RequestIdentity>,
) -> AppResult<Html<String>> {
    let snippets = state.snippets.latest().await?;
    let data = templates::template_data(&session, &csrf, identity.is_authenticated()).await?;
    Ok(templates::render_home(&data, &snippets))
}

pub async fn view(
    State(state): State<AppState>,
    session: Session,
    Extension(csrf): Extension<CsrfToken>,
    Extension(identity): Extension<RequestIdentity>,
    Path(id): Path<String>,
) -> AppResult<Html<String>> {
    // Non-numeric or non-positive ids are indistinguishable from missing rows
    let id: i64 = id
        .parse()
        .ok()
        .filter(|id| *id >= 1)
        .ok_or_else(|| AppError::NotFound(format!("snippet {}", id)))?;

    let snippet = state.snippets.get(id).await?.ok_or_not_found("snippet")?;
    let data = templates::template_data(&session, &csrf, identity.is_authenticated()).await?;
    Ok(templates::render_view(&data, &snippet))
}

pub async fn create_form(
    session: Session,
    Extension(csrf): Extension<CsrfToken>,
    Extension(identity): Extension<RequestIdentity>,
) -> AppResult<Html<String>> {
    let data = templates::template_data(&session, &csrf, identity.is_authenticated()).await?;
    Ok(templates::render_create(&data, &SnippetForm::default(), &Validator::default()))
}

pub async fn create_submit(
    State(state): State<AppState>,
    session: Session,
    Extension(csrf): Extension<CsrfToken>,
    Extension(identity): Extension<RequestIdentity>,
    Form(form): Form<SnippetForm>,
) -> AppResult<Response> {
    let mut v = Validator::default();
    v.check_field(validator::not_blank(&form.title), "title", "This field cannot be blank");
    v.check_field(
        validator::max_chars(&form.title, 100),
        "title",
        "This field cannot be more than 100 characters long",
    );
    v.check_field(validator::not_blank(&form.content), "content", "This field cannot be blank");
    v.check_field(
        validator::permitted_value(&form.expires, &PERMITTED_EXPIRY_DAYS),
        "expires",
        "This field must equal 1, 7 or 365",
    );

    if !v.valid() {
        let data = templates::template_data(&session, &csrf, identity.is_authenticated()).await?;
        let page = templates::render_create(&data, &form, &v);
        return Ok((StatusCode::UNPROCESSABLE_ENTITY, page).into_response());
    }

    let id = state.snippets.insert(&form.title, &form.content, form.expires).await?;
    session::put_flash(&session, "Snippet successfully created!").await?;

    Ok(Redirect::to(&format!("/snippet/view/{}", id)).into_response())
}
