use pgmig::{async_trait, BoxError, Migration};
use sqlx::PgConnection;

pub struct CreateMig01;

#[async_trait]
impl Migration for CreateMig01 {
    fn version(&self) -> &str {
        "20240325173102513"
    }

    fn name(&self) -> &str {
        "create_mig01"
    }

    async fn up(&self, conn: &mut PgConnection) -> Result<(), BoxError> {
        sqlx::query("CREATE TABLE mig01()").execute(&mut *conn).await?;
        Ok(())
    }

    async fn down(&self, conn: &mut PgConnection) -> Result<(), BoxError> {
        sqlx::query("DROP TABLE mig01").execute(&mut *conn).await?;
        Ok(())
    }
}
