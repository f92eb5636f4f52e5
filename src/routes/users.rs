use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    Extension, Form,
};
use serde::Deserialize;
use tower_sessions::Session;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::RequestIdentity;
use crate::middleware::csrf::CsrfToken;
use crate::session;
use crate::state::AppState;
use crate::templates;
use crate::validator::{self, Validator};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SignupForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

pub async fn signup_form(
    session: Session,
    Extension(csrf): Extension<CsrfToken>,
    Extension(identity): Extension<RequestIdentity>,
) -> AppResult<Html<String>> {
    let data = templates::template_data(&session, &csrf, identity.is_authenticated()).await?;
    Ok(templates::render_signup(&data, &SignupForm::default(), &Validator::default()))
}

pub async fn signup_submit(
    State(state): State<AppState>,
    session: Session,
    Extension(csrf): Extension<CsrfToken>,
    Extension(identity): Extension<RequestIdentity>,
    Form(form): Form<SignupForm>,
) -> AppResult<Response> {
    let mut v = Validator::default();
    v.check_field(validator::not_blank(&form.name), "name", "This field cannot be blank");
    v.check_field(validator::not_blank(&form.email), "email", "This field cannot be blank");
    v.check_field(
        validator::is_email(&form.email),
        "email",
        "This field must be a valid email address",
    );
    v.check_field(
        validator::min_chars(&form.password, 8),
        "password",
        "This field must be at least 8 characters long",
    );

    if !v.valid() {
        let data = templates::template_data(&session, &csrf, identity.is_authenticated()).await?;
        let page = templates::render_signup(&data, &form, &v);
        return Ok((StatusCode::UNPROCESSABLE_ENTITY, page).into_response());
    }

    match state.users.insert(&form.name, &form.email, &form.password).await {
        Ok(()) => {
            session::put_flash(&session, "Your signup was successful. Please log in.").await?;
            Ok(Redirect::to("/user/login").into_response())
        }
        Err(AppError::Conflict(_)) => {
            v.add_field_error("email", "Email address is already in use");
            let data = templates::template_data(&session, &csrf, identity.is_authenticated()).await?;
            let page = templates::render_signup(&data, &form, &v);
            Ok((StatusCode::UNPROCESSABLE_ENTITY, page).into_response())
        }
        Err(e) => Err(e),
    }
}

pub async fn login_form(
    session: Session,
    Extension(csrf): Extension<CsrfToken>,
    Extension(identity): Extension<RequestIdentity>,
) -> AppResult<Html<String>> {
    let data = templates::template_data(&session, &csrf, identity.is_authenticated()).await?;
    Ok(templates::render_login(&data, &LoginForm::default(), &Validator::default()))
}

pub async fn login_submit(
    State(state): State<AppState>,
    session: Session,
    Extension(csrf): Extension<CsrfToken>,
    Extension(identity): Extension<RequestIdentity>,
    Form(form): Form<LoginForm>,
) -> AppResult<Response> {
    let mut v = Validator::default();
    v.check_field(validator::not_blank(&form.email), "email", "This field cannot be blank");
    v.check_field(validator::not_blank(&form.password), "password", "This field cannot be blank");

    if !v.valid() {
        let data = templates::template_data(&session, &csrf, identity.is_authenticated()).await?;
        let page = templates::render_login(&data, &form, &v);
        return Ok((StatusCode::UNPROCESSABLE_ENTITY, page).into_response());
    }

    match state.users.authenticate(&form.email, &form.password).await? {
        Some(id) => {
            session::login(&session, id).await?;
            Ok(Redirect::to("/snippet/create").into_response())
        }
        None => {
            v.add_non_field_error("Email or password is incorrect");
            let data = templates::template_data(&session, &csrf, identity.is_authenticated()).await?;
            let page = templates::render_login(&data, &form, &v);
            Ok((StatusCode::UNPROCESSABLE_ENTITY, page).into_response())
        }
    }
}

pub async fn logout(session: Session) -> AppResult<Response> {
    session::logout(&session).await?;
    session::put_flash(&session, "You've been logged out successfully!").await?;
    Ok(Redirect::to("/").into_response())
}
