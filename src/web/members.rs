//! Member pages

use axum::{
    extract::{Path, Query, State},
    response::{Html, IntoResponse, Response},
    Form,
};
use serde::Deserialize;

use super::{
    escape, form_error, is_form_error, loans::loan_rows, page, redirect_with_notice, rejected,
    Notice, WebResult,
};
use crate::{
    models::member::{Member, MemberInput},
    AppState,
};

#[derive(Debug, Default, Deserialize)]
pub struct MemberForm {
    #[serde(default)]
    pub nama: String,
    #[serde(default)]
    pub email: String,
}

impl MemberForm {
    fn from_member(member: &Member) -> Self {
        Self {
            nama: member.name.clone(),
            email: member.email.clone(),
        }
    }

    fn input(&self) -> MemberInput {
        MemberInput {
            name: self.nama.trim().to_string(),
            email: self.email.trim().to_string(),
        }
    }
}

pub async fn list_members(
    State(state): State<AppState>,
    Query(notice): Query<Notice>,
) -> WebResult<Html<String>> {
    let members = state.services.members.list(None).await?;

    let mut rows = String::new();
    for member in &members {
        rows.push_str(&format!(
            r#"<tr><td>{name}</td><td>{email}</td><td>{total}</td><td><a href="/anggota/{id}/riwayat/">Riwayat</a> | <a href="/anggota/{id}/edit/">Edit</a> | <a href="/anggota/{id}/hapus/">Hapus</a></td></tr>"#,
            id = member.id,
            name = escape(&member.name),
            email = escape(&member.email),
            total = member.total_loans,
        ));
    }
    if members.is_empty() {
        rows.push_str(r#"<tr><td colspan="4">Belum ada anggota.</td></tr>"#);
    }

    let content = format!(
        r#"<p><a href="/anggota/tambah/">Tambah anggota</a></p>
<table>
<tr><th>Nama</th><th>Email</th><th>Total peminjaman</th><th>Aksi</th></tr>
{rows}
</table>"#
    );
    Ok(page("Daftar Anggota", &notice, &content))
}

fn member_form_page(title: &str, action: &str, form: &MemberForm, error: Option<&str>) -> Html<String> {
    let content = format!(
        r#"{error}<form method="post" action="{action}">
<p><label>Nama<br><input type="text" name="nama" maxlength="100" value="{nama}" placeholder="Masukkan nama lengkap..."></label></p>
<p><label>Email<br><input type="email" name="email" value="{email}" placeholder="Contoh: anggota@email.com"></label></p>
<p><button type="submit">Simpan</button> <a href="/anggota/">Batal</a></p>
</form>"#,
        error = form_error(error),
        action = action,
        nama = escape(&form.nama),
        email = escape(&form.email),
    );
    page(title, &Notice::default(), &content)
}

pub async fn new_member() -> Html<String> {
    member_form_page("Tambah Anggota", "/anggota/tambah/", &MemberForm::default(), None)
}

pub async fn create_member(
    State(state): State<AppState>,
    Form(form): Form<MemberForm>,
) -> WebResult<Response> {
    match state.services.members.create(form.input()).await {
        Ok(_) => Ok(redirect_with_notice("/anggota/", "Anggota berhasil ditambahkan!").into_response()),
        Err(e) if is_form_error(&e) => Ok(rejected(member_form_page(
            "Tambah Anggota",
            "/anggota/tambah/",
            &form,
            Some(&e.public_message()),
        ))),
        Err(e) => Err(e.into()),
    }
}

pub async fn edit_member(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> WebResult<Html<String>> {
    let member = state.services.members.get(id).await?;
    Ok(member_form_page(
        "Edit Anggota",
        &format!("/anggota/{}/edit/", id),
        &MemberForm::from_member(&member),
        None,
    ))
}

pub async fn update_member(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Form(form): Form<MemberForm>,
) -> WebResult<Response> {
    match state.services.members.update(id, form.input()).await {
        Ok(_) => Ok(redirect_with_notice("/anggota/", "Anggota berhasil diperbarui!").into_response()),
        Err(e) if is_form_error(&e) => Ok(rejected(member_form_page(
            "Edit Anggota",
            &format!("/anggota/{}/edit/", id),
            &form,
            Some(&e.public_message()),
        ))),
        Err(e) => Err(e.into()),
    }
}

pub async fn confirm_delete(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> WebResult<Html<String>> {
    let member = state.services.members.get(id).await?;
    let content = format!(
        r#"<p>Hapus anggota <strong>{name}</strong> ({email})? {total} catatan peminjaman anggota ini juga akan dihapus.</p>
<form method="post" action="/anggota/{id}/hapus/"><button type="submit">Ya, hapus</button> <a href="/anggota/">Batal</a></form>"#,
        id = member.id,
        name = escape(&member.name),
        email = escape(&member.email),
        total = member.total_loans,
    );
    Ok(page("Hapus Anggota", &Notice::default(), &content))
}

pub async fn delete_member(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> WebResult<Response> {
    state.services.members.delete(id).await?;
    Ok(redirect_with_notice("/anggota/", "Anggota berhasil dihapus!").into_response())
}

/// Loan history of one member
pub async fn history(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> WebResult<Html<String>> {
    let member = state.services.members.get(id).await?;
    let loans = state.services.loans.member_history(id).await?;

    let content = format!(
        r#"<p>{name} ({email})</p>
<table>
<tr><th>Buku</th><th>Anggota</th><th>Tanggal pinjam</th><th>Tanggal kembali</th><th>Status</th><th>Aksi</th></tr>
{rows}
</table>
<p><a href="/anggota/">Kembali ke daftar anggota</a></p>"#,
        name = escape(&member.name),
        email = escape(&member.email),
        rows = loan_rows(&loans),
    );
    Ok(page("Riwayat Peminjaman", &Notice::default(), &content))
}
