//! Dashboard page

use axum::{
    extract::{Query, State},
    response::Html,
};

use super::{page, Notice, WebResult};
use crate::AppState;

pub async fn dashboard(
    State(state): State<AppState>,
    Query(notice): Query<Notice>,
) -> WebResult<Html<String>> {
    let stats = state.services.dashboard.stats().await?;

    let content = format!(
        r#"<table>
<tr><th>Total buku</th><td>{}</td></tr>
<tr><th>Total anggota</th><td>{}</td></tr>
<tr><th>Sedang dipinjam</th><td>{}</td></tr>
<tr><th>Sudah dikembalikan</th><td>{}</td></tr>
<tr><th>Buku tersedia</th><td>{}</td></tr>
</table>
<p><a href="/buku/tambah/">Tambah buku</a> | <a href="/anggota/tambah/">Tambah anggota</a> | <a href="/peminjaman/tambah/">Catat peminjaman</a></p>"#,
        stats.total_buku,
        stats.total_anggota,
        stats.total_dipinjam,
        stats.total_selesai,
        stats.buku_tersedia,
    );

    Ok(page("Dashboard", &notice, &content))
}
