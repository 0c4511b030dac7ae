//! API integration tests
//!
//! Require a running server with a migrated database.

use reqwest::{Client, StatusCode};
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:3000/api/v1";
const PASSWORD: &str = "mellon";

/// Unique suffix so repeated runs don't collide on emails or names
fn unique(prefix: &str) -> String {
    format!("{}-{}", prefix, chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default())
}

/// Price field as a float, whether serialized as string or number
fn price_of(book: &Value) -> f64 {
    match &book["price"] {
        Value::String(s) => s.parse().expect("Price is not numeric"),
        other => other.as_f64().expect("Price is not numeric"),
    }
}

/// Register a fresh user and return its email
async fn register(client: &Client) -> String {
    let email = format!("{}@shire.me", unique("frodo"));
    let response = client
        .post(format!("{}/users", BASE_URL))
        .json(&json!({
            "userName": "frodo",
            "email": email,
            "password": PASSWORD
        }))
        .send()
        .await
        .expect("Failed to send register request");
    assert_eq!(response.status(), StatusCode::CREATED);
    email
}

/// Helper to get an authenticated token
async fn get_auth_token(client: &Client) -> String {
    let email = register(client).await;
    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "email": email,
            "password": PASSWORD
        }))
        .send()
        .await
        .expect("Failed to send login request");

    let body: Value = response.json().await.expect("Failed to parse login response");
    body["token"].as_str().expect("No token in response").to_string()
}

async fn create(client: &Client, token: &str, path: &str, body: Value) -> Value {
    let response = client
        .post(format!("{}/{}", BASE_URL, path))
        .bearer_auth(token)
        .json(&body)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CREATED);
    response.json().await.expect("Failed to parse response")
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_register_and_login() {
    let client = Client::new();
    let email = register(&client).await;

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({ "email": email, "password": PASSWORD }))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["token"].is_string());
    assert_eq!(body["user"]["email"], email.as_str());
    assert!(body["user"].get("password").is_none());

    let token = body["token"].as_str().expect("No token");
    let me: Value = client
        .get(format!("{}/auth/me", BASE_URL))
        .bearer_auth(token)
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(me["email"], email.as_str());
}

#[tokio::test]
#[ignore]
async fn test_login_invalid_credentials_are_indistinguishable() {
    let client = Client::new();
    let email = register(&client).await;

    let wrong_password = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({ "email": email, "password": "wrong" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    let wrong_password: Value = wrong_password.json().await.expect("Failed to parse response");

    let unknown_email = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({ "email": format!("{}@nowhere.me", unique("nobody")), "password": "wrong" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(unknown_email.status(), StatusCode::UNAUTHORIZED);
    let unknown_email: Value = unknown_email.json().await.expect("Failed to parse response");

    assert_eq!(wrong_password, unknown_email);
}

#[tokio::test]
#[ignore]
async fn test_duplicate_email_is_rejected() {
    let client = Client::new();
    let email = register(&client).await;

    let response = client
        .post(format!("{}/users", BASE_URL))
        .json(&json!({ "email": email.to_uppercase(), "password": PASSWORD }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
#[ignore]
async fn test_mutations_require_token() {
    let client = Client::new();

    let response = client
        .post(format!("{}/authors", BASE_URL))
        .json(&json!({ "name": "Tolkien" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = client
        .get(format!("{}/users", BASE_URL))
        .bearer_auth("not-a-token")
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Catalog reads are public
    let response = client
        .get(format!("{}/books", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
}

#[tokio::test]
#[ignore]
async fn test_book_with_relations() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let author = create(&client, &token, "authors", json!({ "name": "Tolkien" })).await;
    let house = create(&client, &token, "publishingHouses", json!({ "name": "Allen & Unwin" })).await;

    let book = create(
        &client,
        &token,
        "books",
        json!({
            "title": "LOTR",
            "pages": 1200,
            "price": 29.99,
            "authorId": author["id"],
            "publishingHouseId": house["id"]
        }),
    )
    .await;
    assert_eq!(book["discontinued"], false);
    assert_eq!(price_of(&book), 29.99);

    let details: Value = client
        .get(format!("{}/books/{}", BASE_URL, book["isbn"]))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(details["title"], "LOTR");
    assert_eq!(details["author"]["name"], "Tolkien");
    assert_eq!(details["publishingHouse"]["name"], "Allen & Unwin");

    let bare: Value = client
        .get(format!("{}/books/{}?include=false", BASE_URL, book["isbn"]))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert!(bare.get("author").is_none());

    let with_books: Value = client
        .get(format!("{}/authors/{}", BASE_URL, author["id"]))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(with_books["books"][0]["title"], "LOTR");

    // Author still owns a book
    let response = client
        .delete(format!("{}/authors/{}", BASE_URL, author["id"]))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
#[ignore]
async fn test_book_with_unknown_author_is_rejected() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let house = create(&client, &token, "publishingHouses", json!({ "name": "Orphanage" })).await;

    let response = client
        .post(format!("{}/books", BASE_URL))
        .bearer_auth(&token)
        .json(&json!({
            "title": "Orphan",
            "pages": 10,
            "price": 1,
            "authorId": i32::MAX,
            "publishingHouseId": house["id"]
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore]
async fn test_malformed_id_and_missing_search_text() {
    let client = Client::new();

    for path in ["authors/abc", "publishingHouses/1x", "books/ten"] {
        let response = client
            .get(format!("{}/{}", BASE_URL, path))
            .send()
            .await
            .expect("Failed to send request");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", path);
    }

    let response = client
        .get(format!("{}/books/contains", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = client
        .get(format!("{}/books/by-price?min=abc&max=10", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore]
async fn test_price_range_is_inclusive() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let author = create(&client, &token, "authors", json!({ "name": "Price Tester" })).await;
    let house = create(&client, &token, "publishingHouses", json!({ "name": "Price House" })).await;
    let title = unique("priced");

    for price in [10, 20, 30] {
        create(
            &client,
            &token,
            "books",
            json!({
                "title": title,
                "pages": 1,
                "price": price,
                "authorId": author["id"],
                "publishingHouseId": house["id"]
            }),
        )
        .await;
    }

    let books: Vec<Value> = client
        .get(format!("{}/books/by-price?min=10&max=20&include=false", BASE_URL))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    let prices: Vec<f64> = books
        .iter()
        .filter(|b| b["title"] == title.as_str())
        .map(price_of)
        .collect();
    assert_eq!(prices, vec![10.0, 20.0]);

    let inverted: Vec<Value> = client
        .get(format!("{}/books/by-price?min=20&max=10", BASE_URL))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert!(inverted.is_empty());
}

#[tokio::test]
#[ignore]
async fn test_empty_patch_leaves_book_unchanged() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let author = create(&client, &token, "authors", json!({ "name": "Patcher" })).await;
    let house = create(&client, &token, "publishingHouses", json!({ "name": "Patch House" })).await;
    let book = create(
        &client,
        &token,
        "books",
        json!({
            "title": "Unchanged",
            "pages": 42,
            "price": 4.2,
            "discontinued": true,
            "authorId": author["id"],
            "publishingHouseId": house["id"]
        }),
    )
    .await;

    let patched: Value = client
        .patch(format!("{}/books/{}", BASE_URL, book["isbn"]))
        .bearer_auth(&token)
        .json(&json!({}))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(patched, book);

    let patched: Value = client
        .put(format!("{}/books/{}", BASE_URL, book["isbn"]))
        .bearer_auth(&token)
        .json(&json!({ "pages": 43 }))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(patched["pages"], 43);
    assert_eq!(patched["discontinued"], true);
    assert_eq!(patched["title"], "Unchanged");
}

#[tokio::test]
#[ignore]
async fn test_delete_nonexistent_returns_not_found() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    for path in ["authors", "publishingHouses", "books", "users"] {
        let response = client
            .delete(format!("{}/{}/{}", BASE_URL, path, i32::MAX))
            .bearer_auth(&token)
            .send()
            .await
            .expect("Failed to send request");
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{}", path);
    }
}

#[tokio::test]
#[ignore]
async fn test_create_book_with_cover_upload() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let author = create(&client, &token, "authors", json!({ "name": "Illustrator" })).await;
    let house = create(&client, &token, "publishingHouses", json!({ "name": "Cover House" })).await;

    let form = reqwest::multipart::Form::new()
        .text("title", "Covered")
        .text("pages", "12")
        .text("price", "9.50")
        .text("authorId", author["id"].to_string())
        .text("publishingHouseId", house["id"].to_string())
        .part(
            "photoCover",
            reqwest::multipart::Part::bytes(vec![0x89, b'P', b'N', b'G']).file_name("cover.png"),
        );

    let response = client
        .post(format!("{}/books", BASE_URL))
        .bearer_auth(&token)
        .multipart(form)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CREATED);

    let book: Value = response.json().await.expect("Failed to parse response");
    let cover = book["photoCover"].as_str().expect("No cover stored");
    assert!(cover.ends_with("cover.png"));

    let response = client
        .get(format!("http://localhost:3000/uploads/{}", cover))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
}

async fn get_json(client: &Client, path: &str) -> Value {
    let response = client
        .get(format!("{}/{}", BASE_URL, path))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success(), "{}", path);
    response.json().await.expect("Failed to parse response")
}

fn ids(rows: &Value, key: &str) -> Vec<i64> {
    let mut ids: Vec<i64> = rows
        .as_array()
        .expect("Expected a list")
        .iter()
        .map(|row| row[key].as_i64().expect("Missing id"))
        .collect();
    ids.sort_unstable();
    ids
}

#[tokio::test]
#[ignore]
async fn test_get_by_id_matches_requested_id() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let author = create(&client, &token, "authors", json!({ "name": unique("Lookup") })).await;
    let house = create(&client, &token, "publishingHouses", json!({ "name": unique("Lookup") })).await;

    let found = get_json(&client, &format!("authors/{}", author["id"])).await;
    assert_eq!(found["id"], author["id"]);
    assert_eq!(found["name"], author["name"]);

    let found = get_json(&client, &format!("publishingHouses/{}", house["id"])).await;
    assert_eq!(found["id"], house["id"]);
    assert_eq!(found["name"], house["name"]);

    for path in ["authors", "publishingHouses", "books"] {
        let response = client
            .get(format!("{}/{}/{}", BASE_URL, path, i32::MAX))
            .send()
            .await
            .expect("Failed to send request");
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{}", path);
    }
}

#[tokio::test]
#[ignore]
async fn test_sorted_lists_cover_every_row() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    for name in ["Yeats", "Austen", "Melville"] {
        create(&client, &token, "authors", json!({ "name": name })).await;
    }

    let all = get_json(&client, "authors?include=false").await;
    let up = get_json(&client, "authors/sorted?include=false").await;
    let down = get_json(&client, "authors/sorted?up=false&include=false").await;

    assert_eq!(ids(&up, "id"), ids(&all, "id"));
    assert_eq!(ids(&down, "id"), ids(&all, "id"));

    let order = |rows: &Value| -> Vec<String> {
        rows.as_array()
            .expect("Expected a list")
            .iter()
            .map(|row| row["name"].as_str().unwrap_or_default().to_lowercase())
            .collect()
    };
    let (up, down) = (order(&up), order(&down));
    let position = |names: &[String], name: &str| names.iter().position(|n| n == name);
    assert!(position(&up, "austen") < position(&up, "melville"));
    assert!(position(&up, "melville") < position(&up, "yeats"));
    assert!(position(&down, "yeats") < position(&down, "melville"));
    assert!(position(&down, "melville") < position(&down, "austen"));
}

#[tokio::test]
#[ignore]
async fn test_search_is_case_insensitive() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let marker = unique("qz");
    for name in [
        format!("{}-AB", marker),
        format!("{}-Ab", marker),
        format!("{}-ab", marker),
        format!("{}-none", marker),
    ] {
        create(&client, &token, "authors", json!({ "name": name })).await;
    }

    let found = get_json(&client, "authors/contains?text=ab&include=false").await;
    let mut names: Vec<String> = found
        .as_array()
        .expect("Expected a list")
        .iter()
        .filter_map(|row| row["name"].as_str())
        .inspect(|name| assert!(name.to_lowercase().contains("ab"), "{}", name))
        .filter(|name| name.starts_with(&marker))
        .map(str::to_string)
        .collect();
    names.sort_unstable();
    assert_eq!(
        names,
        vec![format!("{}-AB", marker), format!("{}-Ab", marker), format!("{}-ab", marker)]
    );
}

#[tokio::test]
#[ignore]
async fn test_count_projections_match_data() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let author = create(&client, &token, "authors", json!({ "name": unique("Counted") })).await;
    let idle = create(&client, &token, "authors", json!({ "name": unique("Idle") })).await;
    let house = create(&client, &token, "publishingHouses", json!({ "name": unique("Counted") })).await;

    let mut isbns = Vec::new();
    for title in ["One", "Two"] {
        let book = create(
            &client,
            &token,
            "books",
            json!({
                "title": title,
                "pages": 1,
                "price": 1,
                "authorId": author["id"],
                "publishingHouseId": house["id"]
            }),
        )
        .await;
        isbns.push(book["isbn"].clone());
    }

    let total_of = |rows: &Value, id: &Value| -> i64 {
        rows.as_array()
            .expect("Expected a list")
            .iter()
            .find(|row| &row["id"] == id)
            .and_then(|row| row["totalBooks"].as_i64())
            .expect("Missing row")
    };

    let authors = get_json(&client, "authors/withTotalBooks").await;
    assert_eq!(total_of(&authors, &author["id"]), 2);
    assert_eq!(total_of(&authors, &idle["id"]), 0);

    let houses = get_json(&client, "publishingHouses/withTotalBooks").await;
    assert_eq!(total_of(&houses, &house["id"]), 2);

    let books = get_json(&client, "books/withTotalAuthors").await;
    for isbn in &isbns {
        let row = books
            .as_array()
            .expect("Expected a list")
            .iter()
            .find(|row| &row["isbn"] == isbn)
            .expect("Missing book");
        assert_eq!(row["totalAuthors"], 1);
    }
}
