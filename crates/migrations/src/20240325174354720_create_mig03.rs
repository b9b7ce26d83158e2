use pgmig::{async_trait, BoxError, Migration};
use sqlx::PgConnection;

pub struct CreateMig03;

#[async_trait]
impl Migration for CreateMig03 {
    fn version(&self) -> &str {
        "20240325174354720"
    }

    fn name(&self) -> &str {
        "create_mig03"
    }

    async fn up(&self, conn: &mut PgConnection) -> Result<(), BoxError> {
        sqlx::query("CREATE TABLE mig03()").execute(&mut *conn).await?;
        Ok(())
    }

    async fn down(&self, conn: &mut PgConnection) -> Result<(), BoxError> {
        sqlx::query("DROP TABLE mig03").execute(&mut *conn).await?;
        Ok(())
    }
}
