#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Request, StatusCode},
};
use quickcrud::{
    Column, CrudEngine, LogicalType, MemorySource, Row, SchemaRegistry, TableSchema, crud_router,
};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, DbErr};
use sea_orm_migration::prelude::*;
use serde_json::{Value, json};
use tower::ServiceExt;

pub async fn setup_test_db() -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect("sqlite::memory:").await?;

    // Run migrations
    Migrator::up(&db, None).await?;

    for (table, rows) in fixtures() {
        for row in rows {
            let insert = Query::insert()
                .into_table(Alias::new(table))
                .columns(row.keys().map(Alias::new))
                .values_panic(row.values().map(sql_value))
                .to_owned();
            db.execute(db.get_database_backend().build(&insert)).await?;
        }
    }

    Ok(db)
}

fn sql_value(value: &Value) -> SimpleExpr {
    match value {
        Value::Number(n) => SimpleExpr::Value(n.as_i64().into()),
        Value::String(s) => SimpleExpr::Value(s.as_str().into()),
        _ => SimpleExpr::Value(Option::<i64>::None.into()),
    }
}

pub fn registry() -> SchemaRegistry {
    SchemaRegistry::new()
        .with_table(
            TableSchema::new("account")
                .with_column(Column::new("id", LogicalType::Integer))
                .with_column(Column::new("name", LogicalType::String))
                .with_primary_key(["id"]),
        )
        .with_table(
            TableSchema::new("blog_post")
                .with_column(Column::new("id", LogicalType::Integer))
                .with_column(Column::new("account_id", LogicalType::Integer))
                .with_column(Column::new("title", LogicalType::String))
                .with_primary_key(["id"]),
        )
        .with_table(
            TableSchema::new("comment")
                .with_column(Column::new("id", LogicalType::Integer))
                .with_column(Column::new("blog_post_id", LogicalType::Integer))
                .with_column(Column::new("body", LogicalType::String))
                .with_primary_key(["id"]),
        )
        .link("account", "id", "blog_post", "account_id")
        .link("blog_post", "id", "comment", "blog_post_id")
}

fn rows(values: Value) -> Vec<Row> {
    values
        .as_array()
        .expect("fixture is an array")
        .iter()
        .map(|row| row.as_object().cloned().expect("fixture row is an object"))
        .collect()
}

/// Three accounts, five posts (`account_id` 0,0,2,1,1) and three comments.
pub fn fixtures() -> Vec<(&'static str, Vec<Row>)> {
    vec![
        (
            "account",
            rows(json!([
                {"id": 0, "name": "string1"},
                {"id": 1, "name": "string1"},
                {"id": 2, "name": "string2"},
            ])),
        ),
        (
            "blog_post",
            rows(json!([
                {"id": 0, "account_id": 0, "title": "First steps"},
                {"id": 1, "account_id": 0, "title": "Second Steps"},
                {"id": 2, "account_id": 2, "title": "Hello world"},
                {"id": 3, "account_id": 1, "title": "hello again"},
                {"id": 4, "account_id": 1, "title": "Goodbye"},
            ])),
        ),
        (
            "comment",
            rows(json!([
                {"id": 0, "blog_post_id": 0, "body": "nice"},
                {"id": 1, "blog_post_id": 3, "body": "again?"},
                {"id": 2, "blog_post_id": 3, "body": "yes"},
            ])),
        ),
    ]
}

pub fn memory_source() -> MemorySource {
    fixtures()
        .into_iter()
        .fold(MemorySource::new(), |source, (table, rows)| source.with_rows(table, rows))
}

pub fn setup_test_app(db: DatabaseConnection) -> Router {
    let engine = CrudEngine::new(registry(), db).expect("registry is valid");
    Router::new().nest("/api/v1", crud_router(engine))
}

pub fn setup_memory_app() -> Router {
    let engine = CrudEngine::new(registry(), memory_source()).expect("registry is valid");
    Router::new().nest("/api/v1", crud_router(engine))
}

/// Route engine logs to the test output; safe to call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

pub async fn test_app() -> Router {
    init_tracing();
    let db = setup_test_db()
        .await
        .expect("Failed to setup test database");
    setup_test_app(db)
}

/// GET `uri` and decode the JSON body.
pub async fn get_json(app: &Router, uri: &str) -> (StatusCode, HeaderMap, Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, headers, json)
}

/// `id` of every row in `body["result"]`, in order.
pub fn ids(body: &Value) -> Vec<i64> {
    body["result"]
        .as_array()
        .expect("result is an array")
        .iter()
        .map(|row| row["id"].as_i64().expect("id is an integer"))
        .collect()
}

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(CreateBlogTables)]
    }
}

pub struct CreateBlogTables;

impl MigrationName for CreateBlogTables {
    fn name(&self) -> &'static str {
        "m20240101_000001_create_blog_tables"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for CreateBlogTables {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Account::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Account::Id).integer().not_null().primary_key())
                    .col(ColumnDef::new(Account::Name).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(BlogPost::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(BlogPost::Id).integer().not_null().primary_key())
                    .col(ColumnDef::new(BlogPost::AccountId).integer().not_null())
                    .col(ColumnDef::new(BlogPost::Title).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Comment::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Comment::Id).integer().not_null().primary_key())
                    .col(ColumnDef::new(Comment::BlogPostId).integer().not_null())
                    .col(ColumnDef::new(Comment::Body).string().not_null())
                    .to_owned(),
            )
            .await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Comment::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(BlogPost::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Account::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Account {
    Table,
    Id,
    Name,
}

#[derive(DeriveIden)]
enum BlogPost {
    Table,
    Id,
    AccountId,
    Title,
}

#[derive(DeriveIden)]
enum Comment {
    Table,
    Id,
    BlogPostId,
    Body,
}
