//! Book pages

use axum::{
    extract::{Path, Query, State},
    response::{Html, IntoResponse, Response},
    Form,
};
use chrono::Local;
use serde::Deserialize;

use super::{
    escape, form_error, is_form_error, page, parse_date, parse_id, redirect_with_notice, rejected,
    select_options, Notice, WebResult,
};
use crate::{
    models::book::{Book, BookFilter, BookInput},
    AppState,
};

#[derive(Debug, Default, Deserialize)]
pub struct BookListQuery {
    pub q: Option<String>,
    pub pesan: Option<String>,
    pub galat: Option<String>,
}

/// Submitted book form; fields stay raw so bad input can be echoed back
#[derive(Debug, Default, Deserialize)]
pub struct BookForm {
    #[serde(default)]
    pub judul: String,
    #[serde(default)]
    pub penulis: String,
    #[serde(default)]
    pub tahun: String,
}

impl BookForm {
    fn from_book(book: &Book) -> Self {
        Self {
            judul: book.title.clone(),
            penulis: book.author.clone(),
            tahun: book.year.to_string(),
        }
    }

    fn parse(&self) -> Result<BookInput, String> {
        let year = self
            .tahun
            .trim()
            .parse()
            .map_err(|_| "tahun: Enter a whole number".to_string())?;
        Ok(BookInput {
            title: self.judul.trim().to_string(),
            author: self.penulis.trim().to_string(),
            year,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct BorrowForm {
    #[serde(default)]
    pub anggota: String,
    #[serde(default)]
    pub tanggal_pinjam: String,
}

pub async fn list_books(
    State(state): State<AppState>,
    Query(query): Query<BookListQuery>,
) -> WebResult<Html<String>> {
    let search = query.q.clone().filter(|q| !q.trim().is_empty());
    let filter = BookFilter {
        search: search.clone(),
        available: None,
        match_year: true,
    };
    let books = state.services.books.list(&filter).await?;

    let mut rows = String::new();
    for book in &books {
        let (badge, action) = if book.is_available {
            (
                r#"<span class="badge available">Tersedia</span>"#,
                format!(r#"<a href="/buku/{}/pinjam/">Pinjam</a> | "#, book.id),
            )
        } else {
            (r#"<span class="badge borrowed">Dipinjam</span>"#, String::new())
        };
        rows.push_str(&format!(
            r#"<tr><td>{title}</td><td>{author}</td><td>{year}</td><td>{badge}</td><td>{action}<a href="/buku/{id}/edit/">Edit</a> | <a href="/buku/{id}/hapus/">Hapus</a></td></tr>"#,
            id = book.id,
            title = escape(&book.title),
            author = escape(&book.author),
            year = book.year,
            badge = badge,
            action = action,
        ));
    }
    if books.is_empty() {
        rows.push_str(r#"<tr><td colspan="5">Belum ada buku.</td></tr>"#);
    }

    let content = format!(
        r#"<form method="get" action="/buku/"><input type="search" name="q" value="{q}" placeholder="Cari judul, penulis, atau tahun"> <button type="submit">Cari</button></form>
<p><a href="/buku/tambah/">Tambah buku</a></p>
<table>
<tr><th>Judul</th><th>Penulis</th><th>Tahun</th><th>Status</th><th>Aksi</th></tr>
{rows}
</table>"#,
        q = escape(search.as_deref().unwrap_or("")),
        rows = rows,
    );

    let notice = Notice { pesan: query.pesan, galat: query.galat };
    Ok(page("Daftar Buku", &notice, &content))
}

fn book_form_page(title: &str, action: &str, form: &BookForm, error: Option<&str>) -> Html<String> {
    let content = format!(
        r#"{error}<form method="post" action="{action}">
<p><label>Judul<br><input type="text" name="judul" maxlength="120" value="{judul}" placeholder="Masukkan judul buku..."></label></p>
<p><label>Penulis<br><input type="text" name="penulis" maxlength="100" value="{penulis}" placeholder="Masukkan nama penulis..."></label></p>
<p><label>Tahun<br><input type="number" name="tahun" value="{tahun}" placeholder="Contoh: 2025"></label></p>
<p><button type="submit">Simpan</button> <a href="/buku/">Batal</a></p>
</form>"#,
        error = form_error(error),
        action = action,
        judul = escape(&form.judul),
        penulis = escape(&form.penulis),
        tahun = escape(&form.tahun),
    );
    page(title, &Notice::default(), &content)
}

pub async fn new_book() -> Html<String> {
    book_form_page("Tambah Buku", "/buku/tambah/", &BookForm::default(), None)
}

pub async fn create_book(
    State(state): State<AppState>,
    Form(form): Form<BookForm>,
) -> WebResult<Response> {
    let render = |msg: &str| rejected(book_form_page("Tambah Buku", "/buku/tambah/", &form, Some(msg)));

    let input = match form.parse() {
        Ok(input) => input,
        Err(msg) => return Ok(render(&msg)),
    };
    match state.services.books.create(input).await {
        Ok(_) => Ok(redirect_with_notice("/buku/", "Buku berhasil ditambahkan!").into_response()),
        Err(e) if is_form_error(&e) => Ok(render(&e.public_message())),
        Err(e) => Err(e.into()),
    }
}

pub async fn edit_book(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> WebResult<Html<String>> {
    let book = state.services.books.get(id).await?;
    Ok(book_form_page(
        "Edit Buku",
        &format!("/buku/{}/edit/", id),
        &BookForm::from_book(&book),
        None,
    ))
}

pub async fn update_book(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Form(form): Form<BookForm>,
) -> WebResult<Response> {
    let action = format!("/buku/{}/edit/", id);
    let render = |msg: &str| rejected(book_form_page("Edit Buku", &action, &form, Some(msg)));

    let input = match form.parse() {
        Ok(input) => input,
        Err(msg) => return Ok(render(&msg)),
    };
    match state.services.books.update(id, input).await {
        Ok(_) => Ok(redirect_with_notice("/buku/", "Buku berhasil diperbarui!").into_response()),
        Err(e) if is_form_error(&e) => Ok(render(&e.public_message())),
        Err(e) => Err(e.into()),
    }
}

pub async fn confirm_delete(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> WebResult<Html<String>> {
    let book = state.services.books.get(id).await?;
    let content = format!(
        r#"<p>Hapus buku <strong>{title}</strong> ({author}, {year})? Semua riwayat peminjaman buku ini juga akan dihapus.</p>
<form method="post" action="/buku/{id}/hapus/"><button type="submit">Ya, hapus</button> <a href="/buku/">Batal</a></form>"#,
        id = book.id,
        title = escape(&book.title),
        author = escape(&book.author),
        year = book.year,
    );
    Ok(page("Hapus Buku", &Notice::default(), &content))
}

pub async fn delete_book(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> WebResult<Response> {
    state.services.books.delete(id).await?;
    Ok(redirect_with_notice("/buku/", "Buku berhasil dihapus!").into_response())
}

async fn borrow_form_page(
    state: &AppState,
    book: &Book,
    form: &BorrowForm,
    error: Option<&str>,
) -> WebResult<Html<String>> {
    let members = state.services.members.list(None).await?;
    let selected = form.anggota.trim().parse().ok();
    let options = select_options(members.into_iter().map(|m| (m.id, m.name)), selected);

    let content = format!(
        r#"<p>Buku: <strong>{title}</strong> ({author}, {year})</p>
{error}<form method="post" action="/buku/{id}/pinjam/">
<p><label>Anggota<br><select name="anggota">{options}</select></label></p>
<p><label>Tanggal pinjam<br><input type="date" name="tanggal_pinjam" value="{date}"></label></p>
<p><button type="submit">Pinjam</button> <a href="/buku/">Batal</a></p>
</form>"#,
        id = book.id,
        title = escape(&book.title),
        author = escape(&book.author),
        year = book.year,
        error = form_error(error),
        options = options,
        date = escape(&form.tanggal_pinjam),
    );
    Ok(page("Pinjam Buku", &Notice::default(), &content))
}

pub async fn borrow_form(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> WebResult<Html<String>> {
    let book = state.services.books.get(id).await?;
    let form = BorrowForm {
        anggota: String::new(),
        tanggal_pinjam: Local::now().date_naive().format("%Y-%m-%d").to_string(),
    };
    borrow_form_page(&state, &book, &form, None).await
}

pub async fn borrow_book(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Form(form): Form<BorrowForm>,
) -> WebResult<Response> {
    let book = state.services.books.get(id).await?;

    let parsed = parse_id(&form.anggota, "anggota")
        .and_then(|member| Ok((member, parse_date(&form.tanggal_pinjam, "tanggal_pinjam")?)));
    let (member_id, borrow_date) = match parsed {
        Ok(values) => values,
        Err(msg) => {
            let html = borrow_form_page(&state, &book, &form, Some(&msg)).await?;
            return Ok(rejected(html));
        }
    };

    match state.services.loans.borrow_book(id, member_id, borrow_date).await {
        Ok(loan) => Ok(redirect_with_notice(
            "/buku/",
            &format!("Peminjaman '{}' berhasil disimpan!", loan.book.title),
        )
        .into_response()),
        Err(e) if is_form_error(&e) => {
            let html = borrow_form_page(&state, &book, &form, Some(&e.public_message())).await?;
            Ok(rejected(html))
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_rejects_non_numeric_year() {
        let form = BookForm { judul: "Dune".into(), penulis: "Frank Herbert".into(), tahun: "abc".into() };
        assert!(form.parse().is_err());
    }

    #[test]
    fn test_form_trims_fields() {
        let form = BookForm { judul: " Dune ".into(), penulis: "Frank Herbert".into(), tahun: " 1965".into() };
        let input = form.parse().unwrap();
        assert_eq!(input.title, "Dune");
        assert_eq!(input.year, 1965);
    }
}
