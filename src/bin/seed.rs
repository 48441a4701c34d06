//! Creates (or promotes) the initial admin account.
//! Run with: cargo run --bin seed

use uuid::Uuid;

use scamwatch_api::config::Config;
use scamwatch_api::db::Database;
use scamwatch_api::services::auth_service::hash_password;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load()?;

    let email = std::env::var("ADMIN_EMAIL")
        .unwrap_or_else(|_| "admin@scamwatch.local".to_string())
        .trim()
        .to_lowercase();
    let password = std::env::var("ADMIN_PASSWORD")
        .map_err(|_| anyhow::anyhow!("ADMIN_PASSWORD must be set"))?;
    let name = std::env::var("ADMIN_NAME").unwrap_or_else(|_| "Administrator".to_string());

    if password.len() < 6 {
        anyhow::bail!("ADMIN_PASSWORD must be at least 6 characters");
    }

    println!("Connecting to database...");
    let db = Database::connect(&config).await?;
    db.run_migrations().await?;

    let password_hash = hash_password(&password).map_err(|e| anyhow::anyhow!("{}", e))?;

    // Existing accounts keep their id and are promoted
    let (id, created): (Uuid, bool) = sqlx::query_as(
        r#"
        INSERT INTO users (id, name, email, password_hash, role, created_at, updated_at)
        VALUES ($1, $2, $3, $4, 'admin', NOW(), NOW())
        ON CONFLICT (email) DO UPDATE
            SET password_hash = EXCLUDED.password_hash,
                role = 'admin',
                updated_at = NOW()
        RETURNING id, (xmax = 0) AS created
        "#
    )
    .bind(Uuid::new_v4())
    .bind(name.trim())
    .bind(&email)
    .bind(&password_hash)
    .fetch_one(&db.pg)
    .await?;

    println!("\n========================================");
    println!("Admin account {}", if created { "created" } else { "updated" });
    println!("========================================");
    println!("ID:    {}", id);
    println!("Email: {}", email);
    println!("Role:  admin");
    println!("========================================");

    Ok(())
}
