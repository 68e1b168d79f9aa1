//! API integration tests against a running server

use reqwest::Client;
use serde_json::{json, Value};

const SERVER_URL: &str = "http://localhost:8080";
const BASE_URL: &str = "http://localhost:8080/api";

/// Register a fresh user and return an access token
async fn get_auth_token(client: &Client) -> String {
    let username = format!("tester-{}", uuid::Uuid::new_v4().simple());

    let response = client
        .post(format!("{}/auth/register/", BASE_URL))
        .json(&json!({ "username": username, "password": "rahasia123" }))
        .send()
        .await
        .expect("Failed to send register request");
    assert_eq!(response.status(), 201);

    let response = client
        .post(format!("{}/auth/login/", BASE_URL))
        .json(&json!({ "username": username, "password": "rahasia123" }))
        .send()
        .await
        .expect("Failed to send login request");

    let body: Value = response.json().await.expect("Failed to parse login response");
    body["access"].as_str().expect("No access token in response").to_string()
}

async fn create(client: &Client, token: &str, path: &str, payload: Value) -> Value {
    let response = client
        .post(format!("{}/{}/", BASE_URL, path))
        .bearer_auth(token)
        .json(&payload)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201, "creating {}", path);
    response.json().await.expect("Failed to parse response")
}

async fn borrow(client: &Client, token: &str, book: &Value, member: &Value) -> reqwest::Response {
    client
        .post(format!("{}/peminjaman/", BASE_URL))
        .bearer_auth(token)
        .json(&json!({
            "buku": book["id"],
            "anggota": member["id"],
            "tanggal_pinjam": "2025-01-15"
        }))
        .send()
        .await
        .expect("Failed to send request")
}

async fn return_loan(client: &Client, token: &str, loan: &Value) -> reqwest::Response {
    client
        .post(format!("{}/peminjaman/{}/kembalikan/", BASE_URL, loan["id"]))
        .bearer_auth(token)
        .send()
        .await
        .expect("Failed to send request")
}

async fn dashboard(client: &Client) -> Value {
    client
        .get(format!("{}/dashboard/", BASE_URL))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response")
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", SERVER_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_login_invalid_credentials() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/login/", BASE_URL))
        .json(&json!({ "username": "nobody", "password": "wrong" }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_refresh_token() {
    let client = Client::new();
    let username = format!("tester-{}", uuid::Uuid::new_v4().simple());
    client
        .post(format!("{}/auth/register/", BASE_URL))
        .json(&json!({ "username": username, "password": "rahasia123" }))
        .send()
        .await
        .expect("Failed to send request");

    let tokens: Value = client
        .post(format!("{}/auth/login/", BASE_URL))
        .json(&json!({ "username": username, "password": "rahasia123" }))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");

    let response = client
        .post(format!("{}/auth/refresh/", BASE_URL))
        .json(&json!({ "refresh": tokens["refresh"] }))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    let profile = client
        .get(format!("{}/auth/profile/", BASE_URL))
        .bearer_auth(body["access"].as_str().expect("No access token"))
        .send()
        .await
        .expect("Failed to send request");
    let profile: Value = profile.json().await.expect("Failed to parse response");
    assert_eq!(profile["username"], username.as_str());
}

#[tokio::test]
#[ignore]
async fn test_create_book_requires_auth() {
    let client = Client::new();

    let response = client
        .post(format!("{}/buku/", BASE_URL))
        .json(&json!({ "judul": "Dune", "penulis": "Frank Herbert", "tahun": 1965 }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_single_active_loan_per_book() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let book = create(&client, &token, "buku", json!({ "judul": "Dune", "penulis": "Frank Herbert", "tahun": 1965 })).await;
    let alice = create(&client, &token, "anggota", json!({ "nama": "Alice", "email": "alice@example.org" })).await;
    let bob = create(&client, &token, "anggota", json!({ "nama": "Bob", "email": "bob@example.org" })).await;

    let response = borrow(&client, &token, &book, &alice).await;
    assert_eq!(response.status(), 201);
    let alice_loan: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(alice_loan["status_peminjaman"], "aktif");
    assert!(alice_loan["tanggal_kembali"].is_null());

    // Bob cannot borrow while Alice holds the book
    let response = borrow(&client, &token, &book, &bob).await;
    assert_eq!(response.status(), 400);

    let response = return_loan(&client, &token, &alice_loan).await;
    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["status_peminjaman"], "selesai");
    assert!(body["data"]["tanggal_kembali"].is_string());

    let response = borrow(&client, &token, &book, &bob).await;
    assert_eq!(response.status(), 201);
}

#[tokio::test]
#[ignore]
async fn test_return_twice_fails() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let book = create(&client, &token, "buku", json!({ "judul": "Emma", "penulis": "Jane Austen", "tahun": 1815 })).await;
    let member = create(&client, &token, "anggota", json!({ "nama": "Carol", "email": "carol@example.org" })).await;
    let loan: Value = borrow(&client, &token, &book, &member)
        .await
        .json()
        .await
        .expect("Failed to parse response");

    assert!(return_loan(&client, &token, &loan).await.status().is_success());

    let response = return_loan(&client, &token, &loan).await;
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"], "AlreadyReturned");
}

#[tokio::test]
#[ignore]
async fn test_borrowed_filter_lists_lent_books() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let book = create(&client, &token, "buku", json!({ "judul": "Solaris", "penulis": "Stanislaw Lem", "tahun": 1961 })).await;
    let member = create(&client, &token, "anggota", json!({ "nama": "Dave", "email": "dave@example.org" })).await;
    assert_eq!(borrow(&client, &token, &book, &member).await.status(), 201);

    let borrowed: Value = client
        .get(format!("{}/buku/?available=false", BASE_URL))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");

    let borrowed = borrowed.as_array().expect("Expected a list");
    assert!(borrowed.iter().all(|b| b["is_available"] == false));
    assert!(borrowed.iter().any(|b| b["id"] == book["id"]));
}

#[tokio::test]
#[ignore]
async fn test_deleting_book_removes_its_loans() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let book = create(&client, &token, "buku", json!({ "judul": "Ubik", "penulis": "Philip K. Dick", "tahun": 1969 })).await;
    let member = create(&client, &token, "anggota", json!({ "nama": "Erin", "email": "erin@example.org" })).await;
    let loan: Value = borrow(&client, &token, &book, &member)
        .await
        .json()
        .await
        .expect("Failed to parse response");

    let response = client
        .delete(format!("{}/buku/{}/", BASE_URL, book["id"]))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 204);

    let response = client
        .get(format!("{}/peminjaman/{}/", BASE_URL, loan["id"]))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 404);

    let stats = dashboard(&client).await;
    assert_eq!(
        stats["buku_tersedia"].as_i64(),
        Some(stats["total_buku"].as_i64().unwrap_or(0) - stats["total_dipinjam"].as_i64().unwrap_or(0))
    );
}
