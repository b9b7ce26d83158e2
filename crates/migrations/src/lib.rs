//! Schema migrations for the application database.
//!
//! New files are generated with `pgmig new <description>`; every generated
//! migration must also be added to [`register_all`].

use pgmig::{MigrationResult, Registry};

#[path = "20240325173102513_create_mig01.rs"]
mod m20240325173102513_create_mig01;
#[path = "20240325174351002_create_mig02.rs"]
mod m20240325174351002_create_mig02;
#[path = "20240325174354720_create_mig03.rs"]
mod m20240325174354720_create_mig03;

pub use m20240325173102513_create_mig01::CreateMig01;
pub use m20240325174351002_create_mig02::CreateMig02;
pub use m20240325174354720_create_mig03::CreateMig03;

/// Register every migration of this crate into `registry`
pub fn register_all(registry: &mut Registry) -> MigrationResult<()> {
    registry.register(CreateMig01)?;
    registry.register(CreateMig02)?;
    registry.register(CreateMig03)?;
    Ok(())
}

/// A registry holding every migration of this crate
pub fn registry() -> MigrationResult<Registry> {
    let mut registry = Registry::new();
    register_all(&mut registry)?;
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pgmig::Migrator;
    use serial_test::serial;
    use sqlx::PgPool;

    #[test]
    fn test_migrations_are_ordered_by_version() {
        let registry = registry().unwrap();
        let migrations = registry.migrations();

        assert_eq!(migrations.len(), 3);
        assert_eq!(migrations[0].version(), "20240325173102513");
        assert_eq!(migrations[1].version(), "20240325174351002");
        assert_eq!(migrations[2].version(), "20240325174354720");
        assert_eq!(migrations[0].name(), "create_mig01");
    }

    #[test]
    fn test_register_all_twice_fails() {
        let mut registry = registry().unwrap();
        assert!(register_all(&mut registry).is_err());
    }

    async fn table_exists(pool: &PgPool, table: &str) -> bool {
        sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM information_schema.tables WHERE table_name = $1)",
        )
        .bind(table)
        .fetch_one(pool)
        .await
        .unwrap()
    }

    #[tokio::test]
    #[serial]
    async fn test_down_up() {
        let Ok(database_url) =
            std::env::var("TEST_DATABASE_URL").or_else(|_| std::env::var("DATABASE_URL"))
        else {
            eprintln!("skipping: set TEST_DATABASE_URL or DATABASE_URL to run PostgreSQL tests");
            return;
        };
        let pool = PgPool::connect(&database_url).await.unwrap();
        for table in ["_pgMigrationTable", "mig01", "mig02", "mig03"] {
            sqlx::query(&format!("DROP TABLE IF EXISTS {}", table))
                .execute(&pool)
                .await
                .unwrap();
        }

        let migrator = Migrator::new(registry().unwrap()).unwrap();

        migrator.up(&pool).await.unwrap();
        assert_eq!(
            migrator.current_version(&pool).await.unwrap().as_deref(),
            Some("20240325173102513")
        );
        assert!(table_exists(&pool, "mig01").await);

        migrator.up(&pool).await.unwrap();
        assert_eq!(
            migrator.current_version(&pool).await.unwrap().as_deref(),
            Some("20240325174351002")
        );
        assert!(table_exists(&pool, "mig02").await);

        migrator.down(&pool).await.unwrap();
        assert_eq!(
            migrator.current_version(&pool).await.unwrap().as_deref(),
            Some("20240325173102513")
        );
        assert!(!table_exists(&pool, "mig02").await);

        migrator.run(&pool).await.unwrap();
        assert_eq!(
            migrator.current_version(&pool).await.unwrap().as_deref(),
            Some("20240325174354720")
        );

        migrator.down(&pool).await.unwrap();
        migrator.down(&pool).await.unwrap();
        migrator.down(&pool).await.unwrap();
        assert_eq!(migrator.current_version(&pool).await.unwrap(), None);
        for table in ["mig01", "mig02", "mig03"] {
            assert!(!table_exists(&pool, table).await);
        }
    }
}
