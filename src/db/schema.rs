//! SQL DDL for the application relations.

/// Relations that make up a complete schema. Bootstrap treats the store as
/// initialized only when every one of these exists.
pub const TABLES: [&str; 4] = ["categories", "users", "orders", "items"];

/// SQLite schema with:
/// - `id` INTEGER PRIMARY KEY AUTOINCREMENT on every relation
/// - `created_at` / `updated_at` stored as RFC3339 text
/// - `price` REAL, `unavailable` INTEGER 0/1
pub const SQLITE_INIT: &str = r#"
CREATE TABLE items (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    item TEXT,
    description TEXT,
    price REAL,
    category_id INTEGER,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    unavailable INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE categories (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    category TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    username TEXT NOT NULL,
    password TEXT NOT NULL, -- sha256 hex digest
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE orders (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    metadata TEXT,
    status TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
"#;

/// Statements split on `;` since sqlx::query runs one statement at a time.
pub fn statements(ddl: &str) -> impl Iterator<Item = &str> {
    ddl.split(';').map(str::trim).filter(|s| !s.is_empty())
}
