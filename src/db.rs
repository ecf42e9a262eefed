use sqlx::MySqlPool;
use tracing::info;

use crate::auth::password::hash_password;
use crate::config::Config;
use crate::model::role::Role;

pub async fn init_db(database_url: &str) -> MySqlPool {
    MySqlPool::connect(database_url)
        .await
        .expect("Failed to connect to database")
}

/// Create the default admin on first boot so the registration flow has an
/// initiator. No-op when the account already exists.
pub async fn seed_default_admin(pool: &MySqlPool, config: &Config) -> Result<(), sqlx::Error> {
    let email = config.default_admin_email.to_lowercase();

    let exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM users WHERE email = ? LIMIT 1)",
    )
    .bind(&email)
    .fetch_one(pool)
    .await?;

    if exists {
        return Ok(());
    }

    sqlx::query(
        r#"
        INSERT INTO users
        (email, password, role_id, first_name, last_name, is_active, is_verified)
        VALUES (?, ?, ?, 'Default', 'Admin', TRUE, TRUE)
        "#,
    )
    .bind(&email)
    .bind(hash_password(&config.default_admin_password))
    .bind(Role::Admin.id())
    .execute(pool)
    .await?;

    info!(email = %email, "Default admin created");
    Ok(())
}
