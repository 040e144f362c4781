// src/utils/db_connect.rs

use anyhow::{Context, Result};
use bb8::Pool;
use bb8_postgres::PostgresConnectionManager;
use log::info;
use std::env;
use std::time::Duration;
use tokio_postgres::{Config, NoTls};

use crate::utils::dedup_config::{is_valid_identifier, DedupConfig};

pub type PgPool = Pool<PostgresConnectionManager<NoTls>>;

const POOL_MAX_SIZE: u32 = 4;

/// Connection settings for a dedup run. `POSTGRES_URL` wins when set;
/// otherwise the discrete `POSTGRES_*` variables are used. The listing
/// schema goes first on the search path and long statements are cut off
/// server-side.
pub fn build_pg_config(dedup_config: &DedupConfig, application_name: &str) -> Result<Config> {
    if !is_valid_identifier(&dedup_config.schema) {
        anyhow::bail!("Invalid schema name '{}'", dedup_config.schema);
    }
    let mut config = match env::var("POSTGRES_URL") {
        Ok(url) if !url.trim().is_empty() => url
            .trim()
            .parse::<Config>()
            .context("POSTGRES_URL is not a valid connection string")?,
        _ => {
            let mut config = Config::new();
            let port = env::var("POSTGRES_PORT")
                .ok()
                .and_then(|p| p.trim().parse::<u16>().ok())
                .unwrap_or(5432);
            config
                .host(&env::var("POSTGRES_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()))
                .port(port)
                .dbname(&env::var("POSTGRES_DB").unwrap_or_else(|_| "springs".to_string()))
                .user(&env::var("POSTGRES_USER").unwrap_or_else(|_| "postgres".to_string()))
                .password(env::var("POSTGRES_PASSWORD").unwrap_or_default());
            config
        }
    };

    let mut options = format!("-c search_path={},public", dedup_config.schema);
    if dedup_config.statement_timeout_secs > 0 {
        options.push_str(&format!(
            " -c statement_timeout={}",
            dedup_config.statement_timeout_secs * 1000
        ));
    }
    config
        .application_name(application_name)
        .options(&options)
        .connect_timeout(Duration::from_secs(10));

    info!(
        "DB Config: Hosts={:?}, DB={:?}, User={:?}, Schema={}",
        config.get_hosts(),
        config.get_dbname(),
        config.get_user(),
        dedup_config.schema
    );
    Ok(config)
}

/// Initializes the database connection pool. Runs are single-process batch
/// jobs, so the pool stays small.
pub async fn connect(dedup_config: &DedupConfig, application_name: &str) -> Result<PgPool> {
    let config = build_pg_config(dedup_config, application_name)?;
    info!("Connecting to PostgreSQL database...");
    let manager = PostgresConnectionManager::new(config, NoTls);

    let pool = Pool::builder()
        .max_size(POOL_MAX_SIZE)
        .min_idle(Some(1))
        .idle_timeout(Some(Duration::from_secs(180)))
        .connection_timeout(Duration::from_secs(15))
        .build(manager)
        .await
        .context("Failed to build database connection pool")?;

    let conn = pool
        .get()
        .await
        .context("Failed to get test connection from pool")?;
    let table_exists: bool = conn
        .query_one(
            "SELECT EXISTS (SELECT 1 FROM information_schema.tables \
             WHERE table_schema = $1 AND table_name = $2)",
            &[&dedup_config.schema, &dedup_config.table],
        )
        .await
        .context("Listing table lookup failed")?
        .get(0);
    if !table_exists {
        anyhow::bail!(
            "Listing table {}.{} does not exist",
            dedup_config.schema,
            dedup_config.table
        );
    }
    drop(conn);
    info!("Database connection pool initialized successfully.");
    Ok(pool)
}

/// (connections, idle connections)
pub fn get_pool_status(pool: &PgPool) -> (u32, u32) {
    let state = pool.state();
    (state.connections, state.idle_connections)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    const VARS: [&str; 6] = [
        "POSTGRES_URL",
        "POSTGRES_HOST",
        "POSTGRES_PORT",
        "POSTGRES_DB",
        "POSTGRES_USER",
        "POSTGRES_PASSWORD",
    ];

    // Env vars are process-wide, so both sources live in one test.
    #[test]
    fn test_build_pg_config_sources() {
        for var in VARS {
            env::remove_var(var);
        }
        let mut dedup_config = DedupConfig::default();
        dedup_config.schema = "listings".to_string();

        env::set_var("POSTGRES_HOST", "db.internal");
        env::set_var("POSTGRES_PORT", "not-a-port");
        let config = build_pg_config(&dedup_config, "dedupe").unwrap();
        assert_eq!(config.get_dbname(), Some("springs"));
        assert_eq!(config.get_ports(), &[5432]);
        assert_eq!(config.get_application_name(), Some("dedupe"));
        assert_eq!(
            config.get_options(),
            Some("-c search_path=listings,public -c statement_timeout=300000")
        );

        env::set_var("POSTGRES_URL", "postgres://scraper@10.0.0.5:6543/holes");
        dedup_config.statement_timeout_secs = 0;
        let config = build_pg_config(&dedup_config, "classify_candidates").unwrap();
        assert_eq!(config.get_dbname(), Some("holes"));
        assert_eq!(config.get_user(), Some("scraper"));
        assert_eq!(config.get_ports(), &[6543]);
        assert_eq!(config.get_options(), Some("-c search_path=listings,public"));

        env::set_var("POSTGRES_URL", "postgres://host:notaport/db");
        assert!(build_pg_config(&dedup_config, "dedupe").is_err());

        env::remove_var("POSTGRES_URL");
        dedup_config.schema = "listings; reset all".to_string();
        assert!(build_pg_config(&dedup_config, "dedupe").is_err());

        // Cleanup
        for var in VARS {
            env::remove_var(var);
        }
    }
}
