use pgmig::{async_trait, BoxError, Migration};
use sqlx::PgConnection;

pub struct CreateMig02;

#[async_trait]
impl Migration for CreateMig02 {
    fn version(&self) -> &str {
        "20240325174351002"
    }

    fn name(&self) -> &str {
        "create_mig02"
    }

    async fn up(&self, conn: &mut PgConnection) -> Result<(), BoxError> {
        sqlx::query("CREATE TABLE mig02()").execute(&mut *conn).await?;
        Ok(())
    }

    async fn down(&self, conn: &mut PgConnection) -> Result<(), BoxError> {
        sqlx::query("DROP TABLE mig02").execute(&mut *conn).await?;
        Ok(())
    }
}
