//! HTML rendering from per-request data bags.
//!
//! Handlers assemble a [`TemplateData`] plus a page payload; the functions
//! here turn them into complete documents. All interpolated values pass
//! through [`escape`]. Rendering is deliberately dumb: no template engine,
//! no knowledge of sessions or storage beyond the bag it is handed.

use axum::response::Html;
use chrono::{DateTime, Datelike, Utc};
use tower_sessions::Session;

use crate::error::AppResult;
use crate::middleware::csrf::CsrfToken;
use crate::models::snippet::Snippet;
use crate::routes::snippets::SnippetForm;
use crate::routes::users::{LoginForm, SignupForm};
use crate::session;
use crate::validator::Validator;

/// Per-request data every page needs.
pub struct TemplateData {
    pub current_year: i32,
    /// One-shot flash message; popping it here consumes it.
    pub flash: Option<String>,
    pub is_authenticated: bool,
    pub csrf_token: String,
}

/// Builds the bag for the current request. Pops the flash message, so call
/// it once per rendered page.
pub async fn template_data(
    session: &Session,
    csrf: &CsrfToken,
    is_authenticated: bool,
) -> AppResult<TemplateData> {
    Ok(TemplateData {
        current_year: Utc::now().year(),
        flash: session::pop_flash(session).await?,
        is_authenticated,
        csrf_token: csrf.0.clone(),
    })
}

/// Replaces HTML metacharacters so user content renders inert.
pub fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Renders a timestamp the way the UI shows it, normalized to UTC.
pub fn human_date(t: &DateTime<Utc>) -> String {
    t.format("%d %b %Y at %H:%M").to_string()
}

fn csrf_input(data: &TemplateData) -> String {
    format!(r#"<input type="hidden" name="csrf_token" value="{}">"#, escape(&data.csrf_token))
}

fn field_error(v: &Validator, key: &str) -> String {
    match v.field_error(key) {
        Some(msg) => format!(r#"<label class="error">{}</label>"#, escape(msg)),
        None => String::new(),
    }
}

fn non_field_errors(v: &Validator) -> String {
    v.non_field_errors
        .iter()
        .map(|msg| format!(r#"<div class="error">{}</div>"#, escape(msg)))
        .collect()
}

fn base(data: &TemplateData, title: &str, main: &str) -> Html<String> {
    let account_nav = if data.is_authenticated {
        format!(
            concat!(
                r#"<a href="/snippet/create">Create snippet</a>"#,
                r#"<form action="/user/logout" method="POST">{}"#,
                r#"<button type="submit">Logout</button></form>"#
            ),
            csrf_input(data)
        )
    } else {
        concat!(
            r#"<a href="/user/signup">Signup</a>"#,
            r#"<a href="/user/login">Login</a>"#
        )
        .to_string()
    };

    let flash = match &data.flash {
        Some(message) => format!(r#"<div class="flash">{}</div>"#, escape(message)),
        None => String::new(),
    };

    Html(format!(
        r#"<!doctype html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>{title} - Schnipsel</title>
    <link rel="stylesheet" href="/static/main.css">
</head>
<body>
    <header><h1><a href="/">Schnipsel</a></h1></header>
    <nav>
        <div><a href="/">Home</a></div>
        <div>{account_nav}</div>
    </nav>
    {flash}
    <main>
{main}
    </main>
    <footer>Powered by Schnipsel in {year}</footer>
</body>
</html>
"#,
        title = escape(title),
        account_nav = account_nav,
        flash = flash,
        main = main,
        year = data.current_year,
    ))
}

pub fn render_home(data: &TemplateData, snippets: &[Snippet]) -> Html<String> {
    let main = if snippets.is_empty() {
        "        <p>There's nothing to see here... yet!</p>".to_string()
    } else {
        let rows: String = snippets
            .iter()
            .map(|s| {
                format!(
                    r#"            <tr><td><a href="/snippet/view/{id}">{title}</a></td><td>{created}</td><td>#{id}</td></tr>
"#,
                    id = s.id,
                    title = escape(&s.title),
                    created = human_date(&s.created),
                )
            })
            .collect();
        format!(
            r#"        <h2>Latest Snippets</h2>
        <table>
            <tr><th>Title</th><th>Created</th><th>ID</th></tr>
{rows}        </table>"#
        )
    };
    base(data, "Home", &main)
}

pub fn render_view(data: &TemplateData, snippet: &Snippet) -> Html<String> {
    let main = format!(
        r#"        <div class="snippet">
            <div class="metadata"><strong>{title}</strong><span>#{id}</span></div>
            <pre><code>{content}</code></pre>
            <div class="metadata"><time>Created: {created}</time><time>Expires: {expires}</time></div>
        </div>"#,
        title = escape(&snippet.title),
        id = snippet.id,
        content = escape(&snippet.content),
        created = human_date(&snippet.created),
        expires = human_date(&snippet.expires),
    );
    base(data, &snippet.title, &main)
}

pub fn render_create(data: &TemplateData, form: &SnippetForm, v: &Validator) -> Html<String> {
    let expires_option = |days: i64, label: &str| {
        let checked = if form.expires == days { " checked" } else { "" };
        format!(
            r#"<label><input type="radio" name="expires" value="{days}"{checked}> {label}</label>"#
        )
    };
    let main = format!(
        r#"        <form action="/snippet/create" method="POST">
            {csrf}
            <div>
                <label>Title:</label>
                {title_error}
                <input type="text" name="title" value="{title}">
            </div>
            <div>
                <label>Content:</label>
                {content_error}
                <textarea name="content">{content}</textarea>
            </div>
            <div>
                <label>Delete in:</label>
                {expires_error}
                {one_year} {one_week} {one_day}
            </div>
            <div>
                <input type="submit" value="Publish snippet">
            </div>
        </form>"#,
        csrf = csrf_input(data),
        title_error = field_error(v, "title"),
        title = escape(&form.title),
        content_error = field_error(v, "content"),
        content = escape(&form.content),
        expires_error = field_error(v, "expires"),
        one_year = expires_option(365, "One Year"),
        one_week = expires_option(7, "One Week"),
        one_day = expires_option(1, "One Day"),
    );
    base(data, "Create a New Snippet", &main)
}

pub fn render_signup(data: &TemplateData, form: &SignupForm, v: &Validator) -> Html<String> {
    let main = format!(
        r#"        <form action="/user/signup" method="POST" novalidate>
            {csrf}
            {non_field}
            <div>
                <label>Name:</label>
                {name_error}
                <input type="text" name="name" value="{name}">
            </div>
            <div>
                <label>Email:</label>
                {email_error}
                <input type="email" name="email" value="{email}">
            </div>
            <div>
                <label>Password:</label>
                {password_error}
                <input type="password" name="password">
            </div>
            <div>
                <input type="submit" value="Signup">
            </div>
        </form>"#,
        csrf = csrf_input(data),
        non_field = non_field_errors(v),
        name_error = field_error(v, "name"),
        name = escape(&form.name),
        email_error = field_error(v, "email"),
        email = escape(&form.email),
        password_error = field_error(v, "password"),
    );
    base(data, "Signup", &main)
}

pub fn render_login(data: &TemplateData, form: &LoginForm, v: &Validator) -> Html<String> {
    let main = format!(
        r#"        <form action="/user/login" method="POST" novalidate>
            {csrf}
            {non_field}
            <div>
                <label>Email:</label>
                {email_error}
                <input type="email" name="email" value="{email}">
            </div>
            <div>
                <label>Password:</label>
                {password_error}
                <input type="password" name="password">
            </div>
            <div>
                <input type="submit" value="Login">
            </div>
        </form>"#,
        csrf = csrf_input(data),
        non_field = non_field_errors(v),
        email_error = field_error(v, "email"),
        email = escape(&form.email),
        password_error = field_error(v, "password"),
    );
    base(data, "Login", &main)
}
