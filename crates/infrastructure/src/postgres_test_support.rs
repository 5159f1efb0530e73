use folio_core::{JournalId, UserId};
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Connects to `DATABASE_URL` and migrates it. Tests skip when the variable is unset.
pub(crate) async fn test_pool() -> Option<PgPool> {
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        return None;
    };

    let pool = match PgPoolOptions::new()
        .max_connections(2)
        .connect(database_url.as_str())
        .await
    {
        Ok(pool) => pool,
        Err(error) => panic!("failed to connect to DATABASE_URL in test: {error}"),
    };

    if let Err(error) = MIGRATOR.run(&pool).await {
        panic!("failed to run migrations for postgres tests: {error}");
    }

    Some(pool)
}

pub(crate) async fn insert_user(pool: &PgPool) -> UserId {
    let user_id = UserId::new();
    let insert = sqlx::query(
        r#"
            INSERT INTO users (id, email, display_name, password_hash)
            VALUES ($1, $2, 'Test User', 'not-a-hash')
            "#,
    )
    .bind(user_id.as_uuid())
    .bind(format!("{user_id}@journal.test"))
    .execute(pool)
    .await;
    assert!(insert.is_ok());

    user_id
}

pub(crate) async fn insert_journal(pool: &PgPool) -> JournalId {
    let path = format!("j{}", UserId::new().as_uuid().simple())
        .chars()
        .take(24)
        .collect::<String>();
    let created = sqlx::query_scalar::<_, i64>("SELECT create_journal_with_settings($1, $2, NULL, TRUE)")
        .bind(path)
        .bind("Test Journal")
        .fetch_one(pool)
        .await
        .unwrap_or_else(|error| panic!("failed to create journal in test: {error}"));

    JournalId::new(created).unwrap_or_else(|error| panic!("invalid journal id in test: {error}"))
}
