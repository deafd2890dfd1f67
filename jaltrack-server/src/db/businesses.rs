use sqlx::SqlitePool;

#[derive(Debug, sqlx::FromRow)]
pub struct Business {
    pub id: String,
    pub name: String,
    pub email: String,
    pub created_at: i64,
}

pub async fn create(
    pool: &SqlitePool,
    id: &str,
    name: &str,
    email: &str,
    now: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO businesses (id, name, email, created_at) VALUES (?, ?, ?, ?)")
        .bind(id)
        .bind(name)
        .bind(email)
        .bind(now)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn find_by_id(pool: &SqlitePool, id: &str) -> Result<Option<Business>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM businesses WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
}
