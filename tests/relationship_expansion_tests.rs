use axum::http::StatusCode;
use serde_json::{Value, json};

mod common;
use common::{get_json, ids, test_app};

fn related_ids(row: &Value, name: &str) -> Vec<i64> {
    row["relationship"][name]
        .as_array()
        .unwrap_or_else(|| panic!("relationship '{name}' missing on {row}"))
        .iter()
        .map(|child| child["id"].as_i64().unwrap())
        .collect()
}

#[tokio::test]
async fn test_accounts_with_posts_sorted_descending() {
    let app = test_app().await;

    let (status, _, body) = get_json(
        &app,
        "/api/v1/account?relationship=blog_post&order_by_columns=id:DESC",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 3);
    assert_eq!(ids(&body), vec![2, 1, 0]);

    let result = body["result"].as_array().unwrap();
    assert_eq!(related_ids(&result[0], "blog_post"), vec![2]);
    assert_eq!(related_ids(&result[1], "blog_post"), vec![3, 4]);
    assert_eq!(related_ids(&result[2], "blog_post"), vec![0, 1]);

    for row in result {
        for post in row["relationship"]["blog_post"].as_array().unwrap() {
            assert_eq!(post["account_id"], row["id"]);
            assert!(post.get("relationship").is_none());
        }
    }
}

#[tokio::test]
async fn test_no_relationship_param_gives_empty_map() {
    let app = test_app().await;

    let (status, _, body) = get_json(&app, "/api/v1/account").await;

    assert_eq!(status, StatusCode::OK);
    for row in body["result"].as_array().unwrap() {
        assert_eq!(row["relationship"], json!({}));
    }
}

#[tokio::test]
async fn test_requested_but_empty_keeps_key() {
    let app = test_app().await;

    let (status, _, body) = get_json(
        &app,
        "/api/v1/blog_post?relationship=comment&order_by_columns=id",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let result = body["result"].as_array().unwrap();
    assert_eq!(related_ids(&result[0], "comment"), vec![0]);
    assert_eq!(result[1]["relationship"], json!({"comment": []}));
    assert_eq!(related_ids(&result[3], "comment"), vec![1, 2]);
}

#[tokio::test]
async fn test_two_relationships_match_each_alone() {
    let app = test_app().await;

    let (_, _, both) = get_json(
        &app,
        "/api/v1/blog_post?relationship=account&relationship=comment",
    )
    .await;
    let (_, _, accounts) = get_json(&app, "/api/v1/blog_post?relationship=account").await;
    let (_, _, comments) = get_json(&app, "/api/v1/blog_post?relationship=comment").await;

    let both = both["result"].as_array().unwrap();
    let accounts = accounts["result"].as_array().unwrap();
    let comments = comments["result"].as_array().unwrap();
    assert_eq!(both.len(), 5);

    for ((row, account_row), comment_row) in both.iter().zip(accounts).zip(comments) {
        assert_eq!(
            row["relationship"]["account"],
            account_row["relationship"]["account"]
        );
        assert_eq!(
            row["relationship"]["comment"],
            comment_row["relationship"]["comment"]
        );
        assert!(account_row["relationship"].get("comment").is_none());
        assert!(comment_row["relationship"].get("account").is_none());
    }
}

#[tokio::test]
async fn test_expansion_ignores_primary_filters_and_pagination() {
    let app = test_app().await;

    let (_, _, body) = get_json(
        &app,
        "/api/v1/account?relationship=blog_post&limit=1&order_by_columns=id",
    )
    .await;
    assert_eq!(ids(&body), vec![0]);
    assert_eq!(related_ids(&body["result"][0], "blog_post"), vec![0, 1]);

    // The `title` filter only applies to blog_post listings, never to expansions
    let (_, _, body) = get_json(
        &app,
        "/api/v1/account?relationship=blog_post&name____str=string2&title____str=nothing",
    )
    .await;
    assert_eq!(ids(&body), vec![2]);
    assert_eq!(related_ids(&body["result"][0], "blog_post"), vec![2]);
}

#[tokio::test]
async fn test_reverse_relationship() {
    let app = test_app().await;

    let (status, _, body) = get_json(
        &app,
        "/api/v1/blog_post?relationship=account&account_id____list=1",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    for row in body["result"].as_array().unwrap() {
        let accounts = row["relationship"]["account"].as_array().unwrap();
        assert_eq!(accounts.len(), 1);
        assert_eq!(accounts[0], json!({"id": 1, "name": "string1"}));
    }
}

#[tokio::test]
async fn test_undeclared_relationship_rejected() {
    let app = test_app().await;

    let (status, _, body) = get_json(&app, "/api/v1/account?relationship=comment").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"],
        "'account' has no relationship named 'comment'"
    );
}
