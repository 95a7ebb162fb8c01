//! Mflix API client tests
//!
//! Request shape (query parameters, bearer token, bodies), response parsing
//! and error mapping against a mock backend.

use mockito::{Matcher, Server};
use mflix::api::{ApiError, MflixClient};
use mflix::models::{MovieUpdate, QueryState, SortDirection, SortField};

const TOKEN: &str = "tok-123";

fn movies_body() -> &'static str {
    r#"{
        "movies": [
            {
                "_id": "573a1390f29313caabcd42e8",
                "title": "The Great Train Robbery",
                "year": 1903,
                "imdb": { "rating": 7.4, "votes": 9847 },
                "released": "1903-12-01T00:00:00.000Z"
            },
            {
                "_id": "573a1390f29313caabcd4323",
                "title": "The Birth of a Nation",
                "year": 1915,
                "imdb": { "rating": 6.8, "votes": 15715 }
            }
        ],
        "totalPages": 4
    }"#
}

// =============================================================================
// List
// =============================================================================

#[tokio::test]
async fn test_list_sends_query_and_bearer() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("GET", "/movies")
        .match_header("authorization", "Bearer tok-123")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("page".into(), "2".into()),
            Matcher::UrlEncoded("limit".into(), "10".into()),
            Matcher::UrlEncoded("sortBy".into(), "year".into()),
            Matcher::UrlEncoded("sortOrder".into(), "desc".into()),
            Matcher::UrlEncoded("search".into(), "batman".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(movies_body())
        .create_async()
        .await;

    let client = MflixClient::with_base_url(server.url());
    let mut query = QueryState::with_sort(SortField::Year);
    query.page = 2;
    query.search = "batman".into();
    assert_eq!(query.sort_direction, SortDirection::Descending);

    let page = client.list_movies(&query.to_params(), TOKEN).await.unwrap();

    mock.assert_async().await;
    assert_eq!(page.total_pages, 4);
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.items[0].title, "The Great Train Robbery");
    assert_eq!(page.items[0].rating, Some(7.4));
    assert_eq!(page.items[0].votes, Some(9847));
    assert_eq!(page.items[0].released_display(), "1903-12-01");
    assert_eq!(page.items[1].released_display(), "N/A");
}

#[tokio::test]
async fn test_list_date_added_param_name() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("GET", "/movies")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("sortBy".into(), "dateAdded".into()),
            Matcher::UrlEncoded("sortOrder".into(), "desc".into()),
            Matcher::UrlEncoded("search".into(), "".into()),
        ]))
        .with_status(200)
        .with_body(r#"{"movies": [], "totalPages": 0}"#)
        .create_async()
        .await;

    let client = MflixClient::with_base_url(server.url());
    let params = QueryState::with_sort(SortField::DateAdded).to_params();
    let page = client.list_movies(&params, TOKEN).await.unwrap();

    mock.assert_async().await;
    assert!(page.items.is_empty());
    // total pages never drops below one
    assert_eq!(page.total_pages, 1);
}

#[tokio::test]
async fn test_list_missing_fields_default() {
    let mut server = Server::new_async().await;

    server
        .mock("GET", "/movies")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;

    let client = MflixClient::with_base_url(server.url());
    let page = client
        .list_movies(&QueryState::default().to_params(), TOKEN)
        .await
        .unwrap();

    assert!(page.items.is_empty());
    assert_eq!(page.total_pages, 1);
}

#[tokio::test]
async fn test_list_unauthorized() {
    let mut server = Server::new_async().await;

    server
        .mock("GET", "/movies")
        .match_query(Matcher::Any)
        .with_status(401)
        .with_body(r#"{"error": "Invalid token"}"#)
        .create_async()
        .await;

    let client = MflixClient::with_base_url(server.url());
    let err = client
        .list_movies(&QueryState::default().to_params(), "expired")
        .await
        .unwrap_err();

    assert!(err.is_unauthorized());
    assert_eq!(err.server_message(), Some("Invalid token"));
}

#[tokio::test]
async fn test_list_server_error_without_body() {
    let mut server = Server::new_async().await;

    server
        .mock("GET", "/movies")
        .match_query(Matcher::Any)
        .with_status(500)
        .with_body("Internal Server Error")
        .create_async()
        .await;

    let client = MflixClient::with_base_url(server.url());
    let err = client
        .list_movies(&QueryState::default().to_params(), TOKEN)
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Server { status: 500, message: None }));
    assert_eq!(err.user_message("Failed to load movies"), "Failed to load movies");
}

#[tokio::test]
async fn test_invalid_json_is_reported() {
    let mut server = Server::new_async().await;

    server
        .mock("GET", "/movies")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body("not json")
        .create_async()
        .await;

    let client = MflixClient::with_base_url(server.url());
    let err = client
        .list_movies(&QueryState::default().to_params(), TOKEN)
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::InvalidResponse(_)));
}

#[tokio::test]
async fn test_network_error() {
    // Nothing listens on port 1
    let client = MflixClient::with_base_url("http://127.0.0.1:1/api");
    let err = client
        .list_movies(&QueryState::default().to_params(), TOKEN)
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Network(_)));
}

// =============================================================================
// Detail & Comments
// =============================================================================

#[tokio::test]
async fn test_movie_detail() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("GET", "/movies/m1")
        .match_header("authorization", "Bearer tok-123")
        .with_status(200)
        .with_body(
            r#"{
                "_id": "m1",
                "title": "Metropolis",
                "year": 1927,
                "plot": "In a futuristic city...",
                "runtime": 153,
                "genres": ["Drama", "Sci-Fi"],
                "directors": ["Fritz Lang"],
                "rated": "NOT RATED",
                "imdb": { "rating": 8.3, "votes": 118880 }
            }"#,
        )
        .create_async()
        .await;

    let client = MflixClient::with_base_url(server.url());
    let movie = client.movie_detail("m1", TOKEN).await.unwrap();

    mock.assert_async().await;
    assert_eq!(movie.title, "Metropolis");
    assert_eq!(movie.runtime, Some(153));
    assert_eq!(movie.directors, vec!["Fritz Lang"]);
    assert_eq!(movie.rated.as_deref(), Some("NOT RATED"));
    assert_eq!(movie.rating, Some(8.3));
}

#[tokio::test]
async fn test_movie_detail_not_found() {
    let mut server = Server::new_async().await;

    server
        .mock("GET", "/movies/missing")
        .with_status(404)
        .with_body(r#"{"error": "Movie not found"}"#)
        .create_async()
        .await;

    let client = MflixClient::with_base_url(server.url());
    let err = client.movie_detail("missing", TOKEN).await.unwrap_err();

    assert!(matches!(err, ApiError::NotFound(_)));
    assert_eq!(err.user_message("Failed to load movie"), "Movie not found");
}

#[tokio::test]
async fn test_comments_in_backend_order() {
    let mut server = Server::new_async().await;

    server
        .mock("GET", "/comments/m1")
        .match_header("authorization", "Bearer tok-123")
        .with_status(200)
        .with_body(
            r#"[
                { "name": "Ned Stark", "text": "Winter is coming.", "date": "2012-03-26T23:20:16.000Z" },
                { "text": "no name here" }
            ]"#,
        )
        .create_async()
        .await;

    let client = MflixClient::with_base_url(server.url());
    let comments = client.comments("m1", TOKEN).await.unwrap();

    assert_eq!(comments.len(), 2);
    assert_eq!(comments[0].author, "Ned Stark");
    assert_eq!(comments[0].text, "Winter is coming.");
    assert_eq!(comments[1].author, "Anonymous");
    assert_eq!(comments[1].date, None);
}

#[tokio::test]
async fn test_comments_null_is_empty() {
    let mut server = Server::new_async().await;

    server
        .mock("GET", "/comments/m1")
        .with_status(200)
        .with_body("null")
        .create_async()
        .await;

    let client = MflixClient::with_base_url(server.url());
    assert!(client.comments("m1", TOKEN).await.unwrap().is_empty());
}

// =============================================================================
// Update
// =============================================================================

#[tokio::test]
async fn test_update_sends_nulls_for_empty_fields() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("PUT", "/movies/m1")
        .match_header("authorization", "Bearer tok-123")
        .match_body(Matcher::Json(serde_json::json!({
            "title": "Metropolis",
            "year": 1927,
            "runtime": null,
            "rated": null,
            "plot": null
        })))
        .with_status(200)
        .with_body(r#"{"message": "Movie updated"}"#)
        .create_async()
        .await;

    let client = MflixClient::with_base_url(server.url());
    let update = MovieUpdate {
        title: "Metropolis".into(),
        year: Some(1927),
        runtime: None,
        rated: None,
        plot: None,
    };
    let echoed = client.update_movie("m1", &update, TOKEN).await.unwrap();

    mock.assert_async().await;
    assert_eq!(echoed, None);
}

#[tokio::test]
async fn test_update_returns_echoed_record() {
    let mut server = Server::new_async().await;

    server
        .mock("PUT", "/movies/m1")
        .with_status(200)
        .with_body(r#"{"_id": "m1", "title": "Metropolis (Restored)", "runtime": 148}"#)
        .create_async()
        .await;

    let client = MflixClient::with_base_url(server.url());
    let update = MovieUpdate {
        title: "Metropolis (Restored)".into(),
        year: None,
        runtime: Some(148),
        rated: None,
        plot: None,
    };
    let echoed = client.update_movie("m1", &update, TOKEN).await.unwrap();

    let movie = echoed.expect("record should be echoed");
    assert_eq!(movie.title, "Metropolis (Restored)");
    assert_eq!(movie.runtime, Some(148));
}

#[tokio::test]
async fn test_update_rejected_with_message() {
    let mut server = Server::new_async().await;

    server
        .mock("PUT", "/movies/m1")
        .with_status(400)
        .with_body(r#"{"error": "Year out of range"}"#)
        .create_async()
        .await;

    let client = MflixClient::with_base_url(server.url());
    let update = MovieUpdate {
        title: "X".into(),
        year: Some(1000),
        runtime: None,
        rated: None,
        plot: None,
    };
    let err = client.update_movie("m1", &update, TOKEN).await.unwrap_err();

    assert_eq!(err.user_message("Failed to update movie"), "Year out of range");
}

// =============================================================================
// Accounts
// =============================================================================

#[tokio::test]
async fn test_login_returns_session() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("POST", "/auth/login")
        .match_body(Matcher::Json(serde_json::json!({
            "email": "ned@example.com",
            "password": "winter"
        })))
        .with_status(200)
        .with_body(
            r#"{
                "token": "jwt-abc",
                "user": { "_id": "u1", "name": "Ned Stark", "email": "ned@example.com" }
            }"#,
        )
        .create_async()
        .await;

    let client = MflixClient::with_base_url(server.url());
    let session = client.login("ned@example.com", "winter").await.unwrap();

    mock.assert_async().await;
    assert_eq!(session.token, "jwt-abc");
    assert_eq!(session.user.name, "Ned Stark");
    assert_eq!(session.user.id.as_deref(), Some("u1"));
}

#[tokio::test]
async fn test_login_rejected() {
    let mut server = Server::new_async().await;

    server
        .mock("POST", "/auth/login")
        .with_status(401)
        .with_body(r#"{"error": "Invalid credentials"}"#)
        .create_async()
        .await;

    let client = MflixClient::with_base_url(server.url());
    let err = client.login("ned@example.com", "summer").await.unwrap_err();

    assert_eq!(err.user_message("Login failed"), "Invalid credentials");
}

#[tokio::test]
async fn test_register_posts_account() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("POST", "/auth/register")
        .match_body(Matcher::Json(serde_json::json!({
            "name": "Arya",
            "email": "arya@example.com",
            "password": "needle"
        })))
        .with_status(201)
        .with_body(r#"{"message": "User registered"}"#)
        .create_async()
        .await;

    let client = MflixClient::with_base_url(server.url());
    client
        .register("Arya", "arya@example.com", "needle")
        .await
        .unwrap();

    mock.assert_async().await;
}

#[test]
fn test_base_url_trailing_slash_trimmed() {
    let client = MflixClient::with_base_url("http://localhost:5000/api/");
    assert_eq!(client.base_url(), "http://localhost:5000/api");
}
