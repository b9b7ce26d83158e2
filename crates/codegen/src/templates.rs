use crate::error::{CodegenError, CodegenResult};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{\s*[A-Za-z_]+\s*\}\}").expect("placeholder pattern is valid"));

pub fn render_template(template: &str, context: &HashMap<&str, String>) -> CodegenResult<String> {
    let mut result = template.to_string();

    for (key, value) in context {
        let placeholder = format!("{{{{{}}}}}", key);
        result = result.replace(&placeholder, value);
    }

    if let Some(placeholder) = PLACEHOLDER.find(&result) {
        return Err(CodegenError::Template(format!(
            "no value for placeholder {}",
            placeholder.as_str()
        )));
    }

    Ok(result)
}

pub static MIGRATION_TEMPLATE: &str = r#"use {{crate}}::{async_trait, BoxError, Migration};
use sqlx::PgConnection;

pub struct {{struct_name}};

#[async_trait]
impl Migration for {{struct_name}} {
    fn version(&self) -> &str {
        "{{version}}"
    }

    fn name(&self) -> &str {
        "{{name}}"
    }

    async fn up(&self, conn: &mut PgConnection) -> Result<(), BoxError> {
        // sqlx::query("CREATE TABLE ...").execute(&mut *conn).await?;
        let _ = conn;
        Ok(())
    }

    async fn down(&self, conn: &mut PgConnection) -> Result<(), BoxError> {
        // sqlx::query("DROP TABLE ...").execute(&mut *conn).await?;
        let _ = conn;
        Ok(())
    }
}
"#;
