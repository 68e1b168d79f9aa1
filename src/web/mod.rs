//! Server-rendered form interface
//!
//! Pages are plain HTML built with `format!`. Successful form posts redirect
//! with a one-shot notice in the query string; rejected posts re-render the
//! form with the error inline.

pub mod books;
pub mod dashboard;
pub mod loans;
pub mod members;

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Router,
};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::{error::AppError, AppState};

/// Create the router for the browser interface
pub fn create_web_router() -> Router<AppState> {
    Router::new()
        .route("/", get(dashboard::dashboard))
        // Books
        .route("/buku/", get(books::list_books))
        .route("/buku/tambah/", get(books::new_book).post(books::create_book))
        .route("/buku/:id/edit/", get(books::edit_book).post(books::update_book))
        .route("/buku/:id/hapus/", get(books::confirm_delete).post(books::delete_book))
        .route("/buku/:id/pinjam/", get(books::borrow_form).post(books::borrow_book))
        // Members
        .route("/anggota/", get(members::list_members))
        .route("/anggota/tambah/", get(members::new_member).post(members::create_member))
        .route("/anggota/:id/edit/", get(members::edit_member).post(members::update_member))
        .route("/anggota/:id/hapus/", get(members::confirm_delete).post(members::delete_member))
        .route("/anggota/:id/riwayat/", get(members::history))
        // Loans
        .route("/peminjaman/", get(loans::list_loans))
        .route("/peminjaman/tambah/", get(loans::new_loan).post(loans::create_loan))
        .route("/peminjaman/:id/edit/", get(loans::edit_loan).post(loans::update_loan))
        .route("/peminjaman/:id/delete/", get(loans::confirm_delete).post(loans::delete_loan))
        .route("/peminjaman/:id/kembalikan/", post(loans::return_loan))
}

/// One-shot notice carried by a redirect
#[derive(Debug, Default, Deserialize)]
pub struct Notice {
    pub pesan: Option<String>,
    pub galat: Option<String>,
}

impl Notice {
    fn render(&self) -> String {
        let mut html = String::new();
        if let Some(ref message) = self.pesan {
            html.push_str(&format!(r#"<div class="notice success">{}</div>"#, escape(message)));
        }
        if let Some(ref message) = self.galat {
            html.push_str(&format!(r#"<div class="notice error">{}</div>"#, escape(message)));
        }
        html
    }
}

/// Redirect to `path` showing a success notice
pub(crate) fn redirect_with_notice(path: &str, message: &str) -> Redirect {
    Redirect::to(&format!("{}?pesan={}", path, urlencoding::encode(message)))
}

/// Redirect to `path` showing an error notice
pub(crate) fn redirect_with_error(path: &str, message: &str) -> Redirect {
    Redirect::to(&format!("{}?galat={}", path, urlencoding::encode(message)))
}

/// Escape text for inclusion in HTML
pub(crate) fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Wrap page content in the common layout
pub(crate) fn page(title: &str, notice: &Notice, content: &str) -> Html<String> {
    Html(format!(
        r#"<!DOCTYPE html>
<html lang="id">
<head>
<meta charset="utf-8">
<title>{title} | Inventaris Perpustakaan</title>
<style>
body {{ font-family: sans-serif; margin: 2rem; }}
nav a {{ margin-right: 1rem; }}
table {{ border-collapse: collapse; width: 100%; }}
th, td {{ border: 1px solid #ccc; padding: .4rem; text-align: left; }}
.notice {{ padding: .6rem; margin: 1rem 0; }}
.success {{ background: #e6f4ea; }}
.error {{ background: #fdecea; }}
.badge {{ padding: .1rem .4rem; border-radius: .3rem; }}
.available {{ background: #e6f4ea; }}
.borrowed {{ background: #fff4e5; }}
form.inline {{ display: inline; }}
</style>
</head>
<body>
<nav><a href="/">Dashboard</a><a href="/buku/">Buku</a><a href="/anggota/">Anggota</a><a href="/peminjaman/">Peminjaman</a></nav>
<h1>{title}</h1>
{notice}
{content}
</body>
</html>"#,
        title = escape(title),
        notice = notice.render(),
        content = content,
    ))
}

/// Inline error block shown above a re-rendered form
pub(crate) fn form_error(error: Option<&str>) -> String {
    error
        .map(|msg| format!(r#"<div class="notice error">{}</div>"#, escape(msg)))
        .unwrap_or_default()
}

/// `<option>` list for a select input
pub(crate) fn select_options<I>(choices: I, selected: Option<i32>) -> String
where
    I: IntoIterator<Item = (i32, String)>,
{
    let mut html = String::from(r#"<option value="">---------</option>"#);
    for (id, label) in choices {
        let marker = if selected == Some(id) { " selected" } else { "" };
        html.push_str(&format!(r#"<option value="{}"{}>{}</option>"#, id, marker, escape(&label)));
    }
    html
}

/// Parse a required numeric id from a form field
pub(crate) fn parse_id(value: &str, field: &str) -> Result<i32, String> {
    value
        .trim()
        .parse()
        .map_err(|_| format!("{}: Select a valid choice", field))
}

/// Parse a required `YYYY-MM-DD` date from a form field
pub(crate) fn parse_date(value: &str, field: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| format!("{}: Enter a valid date", field))
}

/// Parse an optional `YYYY-MM-DD` date; blank means none
pub(crate) fn parse_optional_date(value: &str, field: &str) -> Result<Option<NaiveDate>, String> {
    if value.trim().is_empty() {
        Ok(None)
    } else {
        parse_date(value, field).map(Some)
    }
}

/// Whether a service error should be shown inline on the submitted form
pub(crate) fn is_form_error(error: &AppError) -> bool {
    error.status_and_code().0 == StatusCode::BAD_REQUEST
}

/// Render `html` as a rejected form submission
pub(crate) fn rejected(html: Html<String>) -> Response {
    (StatusCode::BAD_REQUEST, html).into_response()
}

/// Error page for failures outside a form
pub struct WebError(AppError);

impl From<AppError> for WebError {
    fn from(error: AppError) -> Self {
        WebError(error)
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let (status, _) = self.0.status_and_code();
        let message = self.0.public_message();
        let body = page(
            &format!("Error {}", status.as_u16()),
            &Notice::default(),
            &format!(r#"<p>{}</p><p><a href="/">Kembali ke dashboard</a></p>"#, escape(&message)),
        );
        (status, body).into_response()
    }
}

pub type WebResult<T> = Result<T, WebError>;
