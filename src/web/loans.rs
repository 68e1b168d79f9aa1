//! Loan pages

use axum::{
    extract::{Path, Query, State},
    response::{Html, IntoResponse, Response},
    Form,
};
use chrono::Local;
use serde::Deserialize;

use super::{
    escape, form_error, is_form_error, page, parse_date, parse_id, parse_optional_date,
    redirect_with_error, redirect_with_notice, rejected, select_options, Notice, WebResult,
};
use crate::{
    error::AppError,
    models::{
        book::BookFilter,
        loan::{CreateLoan, Loan, LoanQuery, LoanStatus, UpdateLoan},
    },
    AppState,
};

#[derive(Debug, Default, Deserialize)]
pub struct LoanListQuery {
    pub status: Option<String>,
    pub pesan: Option<String>,
    pub galat: Option<String>,
}

/// Submitted loan form
#[derive(Debug, Default, Deserialize)]
pub struct LoanForm {
    #[serde(default)]
    pub buku: String,
    #[serde(default)]
    pub anggota: String,
    #[serde(default)]
    pub tanggal_pinjam: String,
    #[serde(default)]
    pub tanggal_kembali: String,
    #[serde(default)]
    pub status_peminjaman: String,
}

impl LoanForm {
    fn from_loan(loan: &Loan) -> Self {
        Self {
            buku: loan.book_id.to_string(),
            anggota: loan.member_id.to_string(),
            tanggal_pinjam: loan.borrow_date.format("%Y-%m-%d").to_string(),
            tanggal_kembali: loan
                .return_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            status_peminjaman: loan.status.as_str().to_string(),
        }
    }

    fn create_request(&self) -> Result<CreateLoan, String> {
        Ok(CreateLoan {
            book_id: parse_id(&self.buku, "buku")?,
            member_id: parse_id(&self.anggota, "anggota")?,
            borrow_date: parse_date(&self.tanggal_pinjam, "tanggal_pinjam")?,
            return_date: parse_optional_date(&self.tanggal_kembali, "tanggal_kembali")?,
        })
    }

    fn update_request(&self) -> Result<UpdateLoan, String> {
        let status = match self.status_peminjaman.trim() {
            "" => None,
            value => Some(value.parse::<LoanStatus>().map_err(|e| format!("status_peminjaman: {}", e))?),
        };
        Ok(UpdateLoan {
            book_id: parse_id(&self.buku, "buku")?,
            member_id: parse_id(&self.anggota, "anggota")?,
            borrow_date: parse_date(&self.tanggal_pinjam, "tanggal_pinjam")?,
            return_date: Some(parse_optional_date(&self.tanggal_kembali, "tanggal_kembali")?),
            status,
        })
    }
}

/// Table rows for a list of loans, with edit, delete and return actions
pub(crate) fn loan_rows(loans: &[Loan]) -> String {
    if loans.is_empty() {
        return r#"<tr><td colspan="6">Belum ada peminjaman.</td></tr>"#.to_string();
    }

    let mut rows = String::new();
    for loan in loans {
        let return_action = if loan.is_active() {
            format!(
                r#"<form class="inline" method="post" action="/peminjaman/{}/kembalikan/"><button type="submit">Kembalikan</button></form> | "#,
                loan.id
            )
        } else {
            String::new()
        };
        rows.push_str(&format!(
            r#"<tr><td>{book}</td><td>{member}</td><td>{borrowed}</td><td>{returned}</td><td>{status}</td><td>{return_action}<a href="/peminjaman/{id}/edit/">Edit</a> | <a href="/peminjaman/{id}/delete/">Hapus</a></td></tr>"#,
            id = loan.id,
            book = escape(&loan.book.title),
            member = escape(&loan.member.name),
            borrowed = loan.borrow_date.format("%Y-%m-%d"),
            returned = loan
                .return_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "-".to_string()),
            status = loan.status.label(),
            return_action = return_action,
        ));
    }
    rows
}

pub async fn list_loans(
    State(state): State<AppState>,
    Query(query): Query<LoanListQuery>,
) -> WebResult<Html<String>> {
    let status = query.status.as_deref().and_then(|s| s.parse::<LoanStatus>().ok());
    let filter = LoanQuery { status, ..Default::default() };
    let loans = state.services.loans.list(&filter).await?;

    let content = format!(
        r#"<p><a href="/peminjaman/tambah/">Catat peminjaman</a></p>
<p>Filter: <a href="/peminjaman/">Semua</a> | <a href="/peminjaman/?status=aktif">Aktif</a> | <a href="/peminjaman/?status=selesai">Selesai</a></p>
<table>
<tr><th>Buku</th><th>Anggota</th><th>Tanggal pinjam</th><th>Tanggal kembali</th><th>Status</th><th>Aksi</th></tr>
{rows}
</table>"#,
        rows = loan_rows(&loans),
    );

    let notice = Notice { pesan: query.pesan, galat: query.galat };
    Ok(page("Daftar Peminjaman", &notice, &content))
}

async fn loan_form_page(
    state: &AppState,
    title: &str,
    action: &str,
    form: &LoanForm,
    with_status: bool,
    error: Option<&str>,
) -> WebResult<Html<String>> {
    let books = state.services.books.list(&BookFilter::default()).await?;
    let members = state.services.members.list(None).await?;

    let book_options = select_options(
        books.into_iter().map(|b| {
            let label = if b.is_available { b.title } else { format!("{} (dipinjam)", b.title) };
            (b.id, label)
        }),
        form.buku.trim().parse().ok(),
    );
    let member_options = select_options(
        members.into_iter().map(|m| (m.id, m.name)),
        form.anggota.trim().parse().ok(),
    );

    let status_field = if with_status {
        let mut options = String::new();
        for status in [LoanStatus::Active, LoanStatus::Completed] {
            let marker = if form.status_peminjaman == status.as_str() { " selected" } else { "" };
            options.push_str(&format!(
                r#"<option value="{}"{}>{}</option>"#,
                status.as_str(),
                marker,
                status.label()
            ));
        }
        format!(r#"<p><label>Status<br><select name="status_peminjaman">{}</select></label></p>"#, options)
    } else {
        String::new()
    };

    let content = format!(
        r#"{error}<form method="post" action="{action}">
<p><label>Buku<br><select name="buku">{book_options}</select></label></p>
<p><label>Anggota<br><select name="anggota">{member_options}</select></label></p>
<p><label>Tanggal pinjam<br><input type="date" name="tanggal_pinjam" value="{borrowed}"></label></p>
<p><label>Tanggal kembali<br><input type="date" name="tanggal_kembali" value="{returned}"></label></p>
{status_field}
<p><button type="submit">Simpan</button> <a href="/peminjaman/">Batal</a></p>
</form>"#,
        error = form_error(error),
        action = action,
        book_options = book_options,
        member_options = member_options,
        borrowed = escape(&form.tanggal_pinjam),
        returned = escape(&form.tanggal_kembali),
        status_field = status_field,
    );
    Ok(page(title, &Notice::default(), &content))
}

pub async fn new_loan(State(state): State<AppState>) -> WebResult<Html<String>> {
    let form = LoanForm {
        tanggal_pinjam: Local::now().date_naive().format("%Y-%m-%d").to_string(),
        ..Default::default()
    };
    loan_form_page(&state, "Catat Peminjaman", "/peminjaman/tambah/", &form, false, None).await
}

pub async fn create_loan(
    State(state): State<AppState>,
    Form(form): Form<LoanForm>,
) -> WebResult<Response> {
    let result = match form.create_request() {
        Ok(request) => state.services.loans.create_loan(request).await,
        Err(msg) => Err(AppError::Validation(msg)),
    };

    match result {
        Ok(_) => Ok(redirect_with_notice("/peminjaman/", "Peminjaman berhasil ditambahkan!").into_response()),
        Err(e) if is_form_error(&e) => {
            let html = loan_form_page(
                &state,
                "Catat Peminjaman",
                "/peminjaman/tambah/",
                &form,
                false,
                Some(&e.public_message()),
            )
            .await?;
            Ok(rejected(html))
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn edit_loan(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> WebResult<Html<String>> {
    let loan = state.services.loans.get(id).await?;
    loan_form_page(
        &state,
        "Edit Peminjaman",
        &format!("/peminjaman/{}/edit/", id),
        &LoanForm::from_loan(&loan),
        true,
        None,
    )
    .await
}

pub async fn update_loan(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Form(form): Form<LoanForm>,
) -> WebResult<Response> {
    let result = match form.update_request() {
        Ok(update) => state.services.loans.update_loan(id, update).await,
        Err(msg) => Err(AppError::Validation(msg)),
    };

    match result {
        Ok(_) => Ok(redirect_with_notice("/peminjaman/", "Peminjaman berhasil diperbarui!").into_response()),
        Err(e) if is_form_error(&e) => {
            let html = loan_form_page(
                &state,
                "Edit Peminjaman",
                &format!("/peminjaman/{}/edit/", id),
                &form,
                true,
                Some(&e.public_message()),
            )
            .await?;
            Ok(rejected(html))
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn confirm_delete(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> WebResult<Html<String>> {
    let loan = state.services.loans.get(id).await?;
    let content = format!(
        r#"<p>Hapus catatan peminjaman <strong>{book}</strong> oleh {member} ({date})?</p>
<form method="post" action="/peminjaman/{id}/delete/"><button type="submit">Ya, hapus</button> <a href="/peminjaman/">Batal</a></form>"#,
        id = loan.id,
        book = escape(&loan.book.title),
        member = escape(&loan.member.name),
        date = loan.borrow_date.format("%Y-%m-%d"),
    );
    Ok(page("Hapus Peminjaman", &Notice::default(), &content))
}

pub async fn delete_loan(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> WebResult<Response> {
    state.services.loans.delete_loan(id).await?;
    Ok(redirect_with_notice("/peminjaman/", "Peminjaman berhasil dihapus!").into_response())
}

pub async fn return_loan(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> WebResult<Response> {
    match state.services.loans.return_loan(id).await {
        Ok(loan) => Ok(redirect_with_notice(
            "/peminjaman/",
            &format!("Buku '{}' berhasil dikembalikan!", loan.book.title),
        )
        .into_response()),
        Err(AppError::AlreadyReturned(msg)) => Ok(redirect_with_error("/peminjaman/", &msg).into_response()),
        Err(e) => Err(e.into()),
    }
}
