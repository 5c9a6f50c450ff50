use sqlx::SqlitePool;

/// Creates the `schedule` table if it does not already exist. Idempotent,
/// called once per open environment.
pub async fn migrate(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
CREATE TABLE IF NOT EXISTS schedule (
    score REAL NOT NULL,
    hash  BLOB NOT NULL,
    freq  REAL NOT NULL,
    PRIMARY KEY (score, hash)
) WITHOUT ROWID;
"#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
