//! 테스트용 인메모리 ACL 저장소

use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

/// ACL 테이블과 `documents` 테이블이 있는 인메모리 SQLite 풀
pub(crate) async fn acl_pool() -> SqlitePool {
    // 인메모리 DB는 연결마다 따로 생기므로 연결 하나만 사용
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();

    let queries = [
        r#"CREATE TABLE acl_classes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            class_type TEXT NOT NULL UNIQUE
        );"#,
        r#"CREATE TABLE acl_security_identities (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            identifier TEXT NOT NULL,
            username BOOLEAN NOT NULL,
            UNIQUE(identifier, username)
        );"#,
        r#"CREATE TABLE acl_object_identities (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            parent_object_identity_id INTEGER,
            class_id INTEGER NOT NULL,
            object_identifier TEXT NOT NULL,
            entries_inheriting BOOLEAN NOT NULL DEFAULT 1,
            UNIQUE(object_identifier, class_id)
        );"#,
        r#"CREATE TABLE acl_entries (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            class_id INTEGER NOT NULL,
            object_identity_id INTEGER,
            field TEXT,
            ace_order INTEGER NOT NULL DEFAULT 0,
            security_identity_id INTEGER NOT NULL,
            mask INTEGER NOT NULL,
            granting BOOLEAN NOT NULL DEFAULT 1
        );"#,
        r#"CREATE TABLE documents (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            status TEXT NOT NULL
        );"#,
    ];

    for q in queries {
        sqlx::query(q).execute(&pool).await.unwrap();
    }

    pool
}

async fn class_id(pool: &SqlitePool, class_type: &str) -> i64 {
    sqlx::query("INSERT OR IGNORE INTO acl_classes (class_type) VALUES (?)")
        .bind(class_type)
        .execute(pool)
        .await
        .unwrap();

    sqlx::query_scalar("SELECT id FROM acl_classes WHERE class_type = ?")
        .bind(class_type)
        .fetch_one(pool)
        .await
        .unwrap()
}

async fn security_identity_id(pool: &SqlitePool, identifier: &str, username: bool) -> i64 {
    sqlx::query("INSERT OR IGNORE INTO acl_security_identities (identifier, username) VALUES (?, ?)")
        .bind(identifier)
        .bind(username)
        .execute(pool)
        .await
        .unwrap();

    sqlx::query_scalar("SELECT id FROM acl_security_identities WHERE identifier = ? AND username = ?")
        .bind(identifier)
        .bind(username)
        .fetch_one(pool)
        .await
        .unwrap()
}

/// 객체 식별 행 등록, id 반환
pub(crate) async fn object_identity(pool: &SqlitePool, class_type: &str, object_identifier: &str) -> i64 {
    let class_id = class_id(pool, class_type).await;

    sqlx::query("INSERT OR IGNORE INTO acl_object_identities (class_id, object_identifier) VALUES (?, ?)")
        .bind(class_id)
        .bind(object_identifier)
        .execute(pool)
        .await
        .unwrap();

    sqlx::query_scalar("SELECT id FROM acl_object_identities WHERE class_id = ? AND object_identifier = ?")
        .bind(class_id)
        .bind(object_identifier)
        .fetch_one(pool)
        .await
        .unwrap()
}

/// ACL 항목 추가 (`object_identity_id`가 `None`이면 클래스 전체 항목)
pub(crate) async fn grant(
    pool: &SqlitePool,
    class_type: &str,
    object_identity_id: Option<i64>,
    identifier: &str,
    username: bool,
    mask: i64,
    field: Option<&str>,
) {
    let class_id = class_id(pool, class_type).await;
    let sid = security_identity_id(pool, identifier, username).await;

    sqlx::query(
        "INSERT INTO acl_entries (class_id, object_identity_id, field, security_identity_id, mask) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(class_id)
    .bind(object_identity_id)
    .bind(field)
    .bind(sid)
    .bind(mask)
    .execute(pool)
    .await
    .unwrap();
}
