//! Database module for SQLite persistence using SeaORM

pub mod entities;
pub mod repositories;

use sea_orm::{ConnectionTrait, Database, DatabaseConnection, DbErr, Statement};
use std::path::Path;

/// Initialize database connection and create tables
pub async fn init_database(db_path: &Path) -> Result<DatabaseConnection, DbErr> {
    // Ensure parent directory exists
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent).ok();
    }

    let db_url = format!("sqlite:{}?mode=rwc", db_path.display());
    tracing::info!("Connecting to database: {}", db_url);

    let db = Database::connect(&db_url).await?;

    create_tables(&db).await?;

    Ok(db)
}

/// Run a single DDL statement
async fn execute(db: &DatabaseConnection, sql: &str) -> Result<(), DbErr> {
    db.execute(Statement::from_string(db.get_database_backend(), sql.to_string()))
        .await?;
    Ok(())
}

/// Create all tables if they don't exist
async fn create_tables(db: &DatabaseConnection) -> Result<(), DbErr> {
    execute(
        db,
        r#"
        CREATE TABLE IF NOT EXISTS projects (
            id BLOB PRIMARY KEY NOT NULL,
            name TEXT NOT NULL,
            description TEXT
        )
        "#,
    )
    .await?;

    // Categories form a tree through parent_id
    execute(
        db,
        r#"
        CREATE TABLE IF NOT EXISTS categories (
            id BLOB PRIMARY KEY NOT NULL,
            name TEXT NOT NULL UNIQUE,
            parent_id BLOB,
            FOREIGN KEY (parent_id) REFERENCES categories(id)
        )
        "#,
    )
    .await?;
    execute(
        db,
        "CREATE INDEX IF NOT EXISTS idx_categories_parent ON categories(parent_id)",
    )
    .await?;

    // Objects; branches reference their parent object
    execute(
        db,
        r#"
        CREATE TABLE IF NOT EXISTS objects (
            id BLOB PRIMARY KEY NOT NULL,
            x REAL NOT NULL,
            y REAL NOT NULL,
            name TEXT NOT NULL,
            ownership TEXT,
            area REAL NOT NULL,
            object_status INTEGER NOT NULL,
            links TEXT NOT NULL DEFAULT '[]',
            icon TEXT,
            image TEXT,
            file_storage TEXT NOT NULL DEFAULT '[]',
            description TEXT,
            parent_id BLOB,
            project_id BLOB,
            FOREIGN KEY (parent_id) REFERENCES objects(id),
            FOREIGN KEY (project_id) REFERENCES projects(id)
        )
        "#,
    )
    .await?;
    execute(
        db,
        "CREATE INDEX IF NOT EXISTS idx_objects_parent ON objects(parent_id)",
    )
    .await?;
    execute(
        db,
        "CREATE INDEX IF NOT EXISTS idx_objects_project ON objects(project_id)",
    )
    .await?;

    execute(
        db,
        r#"
        CREATE TABLE IF NOT EXISTS products (
            id BLOB PRIMARY KEY NOT NULL,
            name TEXT NOT NULL,
            description TEXT,
            image TEXT,
            country TEXT
        )
        "#,
    )
    .await?;

    execute(
        db,
        r#"
        CREATE TABLE IF NOT EXISTS chains (
            id BLOB PRIMARY KEY NOT NULL,
            source_object_id BLOB NOT NULL,
            target_object_id BLOB NOT NULL,
            product_id BLOB,
            FOREIGN KEY (source_object_id) REFERENCES objects(id),
            FOREIGN KEY (target_object_id) REFERENCES objects(id),
            FOREIGN KEY (product_id) REFERENCES products(id)
        )
        "#,
    )
    .await?;
    execute(
        db,
        "CREATE INDEX IF NOT EXISTS idx_chains_product ON chains(product_id)",
    )
    .await?;

    // Association tables: one row per (entity, category) pair
    for (table, column, target) in [
        ("object_category_association", "object_id", "objects"),
        ("product_category_association", "product_id", "products"),
        ("project_category_association", "project_id", "projects"),
    ] {
        execute(
            db,
            &format!(
                r#"
                CREATE TABLE IF NOT EXISTS {table} (
                    id BLOB PRIMARY KEY NOT NULL,
                    {column} BLOB NOT NULL,
                    category_id BLOB NOT NULL,
                    FOREIGN KEY ({column}) REFERENCES {target}(id),
                    FOREIGN KEY (category_id) REFERENCES categories(id),
                    UNIQUE({column}, category_id)
                )
                "#
            ),
        )
        .await?;
        execute(
            db,
            &format!("CREATE INDEX IF NOT EXISTS idx_{table}_category ON {table}(category_id)"),
        )
        .await?;
    }

    tracing::info!("Database tables initialized");
    Ok(())
}
