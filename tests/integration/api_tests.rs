//! API integration tests
//!
//! These run against a live server with the seeded development database:
//! user 1 is the admin, user 2 a member, books 1-3 exist.

use chrono::{Duration, Utc};
use reqwest::{Client, RequestBuilder};
use serde_json::{json, Value};
use std::time::{SystemTime, UNIX_EPOCH};

const BASE_URL: &str = "http://localhost:8080/api/v1";

const ADMIN_ID: &str = "1";
const MEMBER_ID: &str = "2";

fn as_admin(req: RequestBuilder) -> RequestBuilder {
    req.header("x-user-id", ADMIN_ID).header("x-user-role", "admin")
}

fn as_member(req: RequestBuilder) -> RequestBuilder {
    req.header("x-user-id", MEMBER_ID).header("x-user-role", "member")
}

/// A far-future date window nothing else in the database uses, so tests can
/// rerun against the same instance without colliding with earlier runs.
fn fresh_window(len_days: i64) -> (String, String) {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .subsec_nanos() as i64;
    let offset = 365 + (nanos % 100_000);
    let start = Utc::now().date_naive() + Duration::days(offset);
    let end = start + Duration::days(len_days - 1);
    (start.to_string(), end.to_string())
}

async fn submit_request(client: &Client, book_id: i64, start: &str, end: &str) -> reqwest::Response {
    as_member(client.post(format!("{}/requests", BASE_URL)))
        .json(&json!({
            "book_id": book_id,
            "start_date": start,
            "end_date": end,
        }))
        .send()
        .await
        .expect("Failed to send request")
}

async fn decide(client: &Client, request_id: i64, action: &str) -> reqwest::Response {
    as_admin(client.patch(format!("{}/requests/{}", BASE_URL, request_id)))
        .json(&json!({ "action": action }))
        .send()
        .await
        .expect("Failed to send request")
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
async fn test_unauthenticated_access() {
    let client = Client::new();

    let response = client
        .get(format!("{}/books", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_member_cannot_list_requests() {
    let client = Client::new();

    let response = as_member(client.get(format!("{}/requests", BASE_URL)))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 403);
}

#[tokio::test]
#[ignore]
async fn test_list_books() {
    let client = Client::new();

    let response = as_member(client.get(format!("{}/books", BASE_URL)))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    let books = body.as_array().expect("Expected a book array");
    assert!(!books.is_empty());
    assert!(books[0]["title"].is_string());
}

#[tokio::test]
#[ignore]
async fn test_inverted_range_is_rejected() {
    let client = Client::new();
    let (start, end) = fresh_window(5);

    // end before start
    let response = submit_request(&client, 1, &end, &start).await;

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"], "invalid_range");
}

#[tokio::test]
#[ignore]
async fn test_overlapping_request_is_rejected() {
    let client = Client::new();
    let (start, end) = fresh_window(10);

    let response = submit_request(&client, 1, &start, &end).await;
    assert_eq!(response.status(), 201);

    // A window inside the pending one conflicts
    let inner_start = (start.parse::<chrono::NaiveDate>().unwrap() + Duration::days(3)).to_string();
    let inner_end = (start.parse::<chrono::NaiveDate>().unwrap() + Duration::days(5)).to_string();
    let response = submit_request(&client, 1, &inner_start, &inner_end).await;

    assert_eq!(response.status(), 409);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"], "conflict");

    // A disjoint window right after it is admitted
    let next_start = (end.parse::<chrono::NaiveDate>().unwrap() + Duration::days(1)).to_string();
    let next_end = (end.parse::<chrono::NaiveDate>().unwrap() + Duration::days(3)).to_string();
    let response = submit_request(&client, 1, &next_start, &next_end).await;

    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "pending");
}

#[tokio::test]
#[ignore]
async fn test_denied_request_frees_the_window() {
    let client = Client::new();
    let (start, end) = fresh_window(7);

    let response = submit_request(&client, 2, &start, &end).await;
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    let request_id = body["id"].as_i64().expect("No request ID");

    let response = decide(&client, request_id, "deny").await;
    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "denied");

    // The exact same window is admissible again
    let response = submit_request(&client, 2, &start, &end).await;
    assert_eq!(response.status(), 201);
}

#[tokio::test]
#[ignore]
async fn test_decide_is_legal_exactly_once() {
    let client = Client::new();
    let (start, end) = fresh_window(7);

    let response = submit_request(&client, 3, &start, &end).await;
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    let request_id = body["id"].as_i64().expect("No request ID");

    let response = decide(&client, request_id, "approve").await;
    assert!(response.status().is_success());

    let response = decide(&client, request_id, "deny").await;
    assert_eq!(response.status(), 409);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"], "invalid_transition");
}

#[tokio::test]
#[ignore]
async fn test_unknown_action_is_rejected() {
    let client = Client::new();
    let (start, end) = fresh_window(7);

    let response = submit_request(&client, 3, &start, &end).await;
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    let request_id = body["id"].as_i64().expect("No request ID");

    let response = decide(&client, request_id, "renew").await;
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"], "invalid_action");
}

#[tokio::test]
#[ignore]
async fn test_approve_return_and_double_return() {
    let client = Client::new();
    let (start, end) = fresh_window(7);

    let response = submit_request(&client, 1, &start, &end).await;
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    let request_id = body["id"].as_i64().expect("No request ID");

    let response = decide(&client, request_id, "approve").await;
    assert!(response.status().is_success());

    // Approval opened a ledger entry with the loan's start date
    let response = as_admin(client.get(format!("{}/users/{}/history", BASE_URL, MEMBER_ID)))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let entries: Value = response.json().await.expect("Failed to parse response");
    let open = entries
        .as_array()
        .unwrap()
        .iter()
        .find(|e| e["borrowed_date"] == start.as_str())
        .expect("No ledger entry for the approved loan");
    assert!(open["returned_date"].is_null());

    // Return the book on its last borrowed day
    let response = as_admin(client.post(format!("{}/requests/{}/return", BASE_URL, request_id)))
        .json(&json!({ "returned_date": end }))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["borrowed_date"], start.as_str());
    assert_eq!(body["returned_date"], end.as_str());

    // A second return fails
    let response = as_admin(client.post(format!("{}/requests/{}/return", BASE_URL, request_id)))
        .json(&json!({ "returned_date": end }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 409);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"], "already_returned");
}

#[tokio::test]
#[ignore]
async fn test_get_book() {
    let client = Client::new();

    let response = as_member(client.get(format!("{}/books/1", BASE_URL)))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["id"], 1);
    assert!(body["title"].is_string());

    let response = as_member(client.get(format!("{}/books/999999", BASE_URL)))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 404);
}

#[tokio::test]
#[ignore]
async fn test_return_before_borrowed_date_is_rejected() {
    let client = Client::new();
    let (start, end) = fresh_window(7);

    let response = submit_request(&client, 2, &start, &end).await;
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    let request_id = body["id"].as_i64().expect("No request ID");

    let response = decide(&client, request_id, "approve").await;
    assert!(response.status().is_success());

    // One day before the loan started
    let early = (start.parse::<chrono::NaiveDate>().unwrap() - Duration::days(1)).to_string();
    let response = as_admin(client.post(format!("{}/requests/{}/return", BASE_URL, request_id)))
        .json(&json!({ "returned_date": early }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"], "invalid_range");
}

#[tokio::test]
#[ignore]
async fn test_return_closes_its_own_loan_entry() {
    let client = Client::new();
    let (start_a, end_a) = fresh_window(10);

    // Two approved back-to-back loans of the same book by the same user
    let response = submit_request(&client, 3, &start_a, &end_a).await;
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    let first_id = body["id"].as_i64().expect("No request ID");

    let start_b = (end_a.parse::<chrono::NaiveDate>().unwrap() + Duration::days(1)).to_string();
    let end_b = (end_a.parse::<chrono::NaiveDate>().unwrap() + Duration::days(5)).to_string();
    let response = submit_request(&client, 3, &start_b, &end_b).await;
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    let second_id = body["id"].as_i64().expect("No request ID");

    let response = decide(&client, first_id, "approve").await;
    assert!(response.status().is_success());
    let response = decide(&client, second_id, "approve").await;
    assert!(response.status().is_success());

    // Returning the first loan late, after the second one has started, must
    // still close the first loan's entry and leave the second one open
    let late = (start_b.parse::<chrono::NaiveDate>().unwrap() + Duration::days(1)).to_string();
    let response = as_admin(client.post(format!("{}/requests/{}/return", BASE_URL, first_id)))
        .json(&json!({ "returned_date": late }))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["borrowed_date"], start_a.as_str());
    assert_eq!(body["returned_date"], late.as_str());

    let response = as_admin(client.get(format!("{}/users/{}/history", BASE_URL, MEMBER_ID)))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let entries: Value = response.json().await.expect("Failed to parse response");
    let second_entry = entries
        .as_array()
        .unwrap()
        .iter()
        .find(|e| e["borrowed_date"] == start_b.as_str())
        .expect("No ledger entry for the second loan");
    assert!(second_entry["returned_date"].is_null());

    // And the second loan is still returnable
    let response = as_admin(client.post(format!("{}/requests/{}/return", BASE_URL, second_id)))
        .json(&json!({ "returned_date": end_b }))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["borrowed_date"], start_b.as_str());
}

#[tokio::test]
#[ignore]
async fn test_member_sees_own_history() {
    let client = Client::new();

    let response = as_member(client.get(format!("{}/history", BASE_URL)))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let entries: Value = response.json().await.expect("Failed to parse response");
    let entries = entries.as_array().expect("Expected an entry array");

    // Ordered by borrowed date ascending
    let dates: Vec<&str> = entries
        .iter()
        .map(|e| e["borrowed_date"].as_str().unwrap())
        .collect();
    let mut sorted = dates.clone();
    sorted.sort();
    assert_eq!(dates, sorted);
}
