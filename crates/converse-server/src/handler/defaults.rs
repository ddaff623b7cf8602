//! Tenant default model handlers.
//!
//! The chat model stored here is the fallback for chats created without one.

use aide::axum::ApiRouter;
use aide::transform::TransformOperation;
use converse_postgres::model::UpdateTenant;
use converse_postgres::query::{TenantModelRepository, TenantRepository};
use converse_postgres::types::ModelType;

use crate::extract::{AuthState, Json, PgPool, ValidateJson};
use crate::handler::request::UpdateDefaults;
use crate::handler::response::{Defaults, Envelope, ErrorResponse};
use crate::handler::{ErrorKind, Result};
use crate::service::ServiceState;

/// Tracing target for default model operations.
const TRACING_TARGET: &str = "converse_server::handler::defaults";

/// Sets the tenant's default embedding and chat models.
#[tracing::instrument(skip_all, fields(tenant_id = %auth_state.tenant_id()))]
async fn update_defaults(
    auth_state: AuthState,
    PgPool(mut conn): PgPool,
    ValidateJson(request): ValidateJson<UpdateDefaults>,
) -> Result<Envelope<Defaults>> {
    tracing::debug!(target: TRACING_TARGET, "Updating default models");

    let tenant_id = auth_state.tenant_id();
    if conn.find_tenant_by_id(tenant_id).await?.is_none() {
        return Err(ErrorKind::NotFound
            .with_message("Tenant not found")
            .with_resource("tenant"));
    }

    let embedding_model = request.embedding_model;
    if !conn
        .tenant_model_exists(tenant_id, &embedding_model, ModelType::Embedding)
        .await?
    {
        return Err(ErrorKind::BadRequest.with_message(format!(
            "Embedding model {embedding_model} not found or not accessible"
        )));
    }

    let chat_model = request.chat_model;
    if !conn
        .tenant_model_exists(tenant_id, &chat_model, ModelType::Chat)
        .await?
    {
        return Err(ErrorKind::BadRequest
            .with_message(format!("Chat model {chat_model} not found or not accessible")));
    }

    let changes = UpdateTenant {
        llm_id: Some(chat_model),
        embd_id: Some(embedding_model),
    };
    let tenant = conn.update_tenant_defaults(tenant_id, changes).await?;

    tracing::info!(
        target: TRACING_TARGET,
        chat_model = %tenant.llm_id,
        embedding_model = %tenant.embd_id,
        "Default models updated"
    );

    Ok(Envelope::new(Defaults::from(tenant)))
}

fn update_defaults_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Set default models")
        .description(
            "Sets the default embedding and chat models. Both must be registered for the \
             tenant with the matching model type.",
        )
        .response::<200, Envelope<Defaults>>()
        .response::<400, Json<ErrorResponse<'static>>>()
        .response::<401, Json<ErrorResponse<'static>>>()
        .response::<404, Json<ErrorResponse<'static>>>()
}

/// Returns the tenant's default models.
#[tracing::instrument(skip_all, fields(tenant_id = %auth_state.tenant_id()))]
async fn read_defaults(
    auth_state: AuthState,
    PgPool(mut conn): PgPool,
) -> Result<Envelope<Defaults>> {
    let tenant = conn
        .find_tenant_by_id(auth_state.tenant_id())
        .await?
        .ok_or_else(|| {
            ErrorKind::NotFound
                .with_message("Tenant not found")
                .with_resource("tenant")
        })?;

    Ok(Envelope::new(Defaults::from(tenant)))
}

fn read_defaults_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Get default models")
        .description("Returns the default embedding and chat models of the caller's tenant.")
        .response::<200, Envelope<Defaults>>()
        .response::<401, Json<ErrorResponse<'static>>>()
        .response::<404, Json<ErrorResponse<'static>>>()
}

/// Returns routes for tenant default models.
pub fn routes() -> ApiRouter<ServiceState> {
    use aide::axum::routing::*;

    ApiRouter::new()
        .api_route(
            "/api/v1/defaults",
            get_with(read_defaults, read_defaults_docs)
                .post_with(update_defaults, update_defaults_docs),
        )
        .with_path_items(|item| item.tag("Defaults"))
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::*;
    use crate::handler::test::create_test_server_with_router;

    #[tokio::test]
    async fn reading_defaults_requires_a_token() -> anyhow::Result<()> {
        let server = create_test_server_with_router(routes())?;

        let response = server.get("/api/v1/defaults").await;
        response.assert_status_unauthorized();
        response.assert_json(&json!({
            "code": 109,
            "message": "Authorization is not valid!",
            "data": null,
        }));

        Ok(())
    }

    #[tokio::test]
    async fn updating_defaults_requires_a_token() -> anyhow::Result<()> {
        let server = create_test_server_with_router(routes())?;

        let response = server
            .post("/api/v1/defaults")
            .json(&json!({"embedding_model": "bge@BAAI", "chat_model": "qwen"}))
            .await;
        response.assert_status_unauthorized();
        assert_eq!(response.json::<Value>()["code"], 109);

        Ok(())
    }

    #[test]
    fn defaults_use_external_names() {
        let now = jiff::Timestamp::now();
        let tenant = converse_postgres::model::Tenant {
            id: uuid::Uuid::now_v7(),
            name: "acme".into(),
            llm_id: "qwen@Tongyi".into(),
            embd_id: "bge@BAAI".into(),
            created_at: now.into(),
            updated_at: now.into(),
        };

        let value = serde_json::to_value(Defaults::from(tenant)).unwrap();
        assert_eq!(value, json!({"embedding_model": "bge@BAAI", "chat_model": "qwen@Tongyi"}));
    }
}
