//! Chat assistant (dialog) management handlers.
//!
//! Every route acts on the tenant resolved from the bearer token. Create and
//! update requests pass through translation, defaults and the consistency
//! checks before anything is written.

use aide::axum::ApiRouter;
use aide::transform::TransformOperation;
use converse_core::dialog::translate::encode;
use converse_core::dialog::{DialogConfig, PromptConfig, prepare_create, prepare_update};
use converse_postgres::model::{Dialog, NewDialog, UpdateDialog};
use converse_postgres::query::{DialogRepository, TenantRepository};
use serde_json::Value;
use uuid::Uuid;
use validator::Validate;

use crate::extract::{AuthState, Json, Path, PgPool, Query, ValidateJson};
use crate::handler::request::{ChatPathParams, CreateChat, DeleteChats, ListChats, UpdateChat};
use crate::handler::response::{Chat, Chats, DeletedChats, Envelope, ErrorResponse};
use crate::handler::{Error, ErrorKind, Result};
use crate::service::{PgDialogCatalog, ServiceState};

/// Tracing target for chat operations.
const TRACING_TARGET: &str = "converse_server::handler::chats";

/// Rebuilds the dialog configuration from a stored row.
pub(super) fn dialog_config(dialog: Dialog) -> Result<DialogConfig> {
    let kb_ids = dialog.kb_ids();
    let llm_setting = match dialog.llm_setting {
        Value::Object(setting) => setting,
        _ => Default::default(),
    };
    let prompt_config: PromptConfig =
        serde_json::from_value(dialog.prompt_config).map_err(|e| {
            ErrorKind::InternalServerError
                .with_resource("chat")
                .with_context(format!("stored prompt config of {} is malformed: {e}", dialog.id))
        })?;

    Ok(DialogConfig {
        id: dialog.id,
        tenant_id: dialog.tenant_id,
        name: dialog.name,
        description: dialog.description,
        icon: dialog.icon,
        llm_id: dialog.llm_id,
        llm_setting,
        prompt_config,
        similarity_threshold: dialog.similarity_threshold,
        vector_similarity_weight: dialog.vector_similarity_weight,
        top_n: dialog.top_n,
        top_k: dialog.top_k,
        rerank_id: dialog.rerank_id,
        kb_ids,
    })
}

fn new_dialog(config: &DialogConfig) -> Result<NewDialog> {
    let prompt_config = serde_json::to_value(&config.prompt_config).map_err(|e| {
        ErrorKind::InternalServerError
            .with_resource("chat")
            .with_context(format!("prompt config is not serializable: {e}"))
    })?;

    Ok(NewDialog {
        id: config.id,
        tenant_id: config.tenant_id,
        name: config.name.clone(),
        description: config.description.clone(),
        icon: config.icon.clone(),
        llm_id: config.llm_id.clone(),
        llm_setting: Value::Object(config.llm_setting.clone()),
        prompt_config,
        similarity_threshold: config.similarity_threshold,
        vector_similarity_weight: config.vector_similarity_weight,
        top_n: config.top_n,
        top_k: config.top_k,
        rerank_id: config.rerank_id.clone(),
        kb_ids: config.kb_ids.iter().copied().map(Some).collect(),
    })
}

fn representation(dialog: Dialog) -> Result<Chat> {
    Ok(encode(&dialog_config(dialog)?))
}

/// Creates a chat assistant.
#[tracing::instrument(skip_all, fields(tenant_id = %auth_state.tenant_id()))]
async fn create_chat(
    auth_state: AuthState,
    PgPool(mut conn): PgPool,
    Json(request): Json<CreateChat>,
) -> Result<Envelope<Chat>> {
    tracing::debug!(target: TRACING_TARGET, "Creating chat");

    let tenant_id = auth_state.tenant_id();
    let tenant = conn
        .find_tenant_by_id(tenant_id)
        .await?
        .ok_or_else(|| ErrorKind::NotFound.with_message("Tenant not found!"))?;

    let mut catalog = PgDialogCatalog::new(&mut conn);
    let dialog =
        prepare_create(&mut catalog, Uuid::now_v7(), tenant_id, request, &tenant.llm_id).await?;

    let created = conn.create_dialog(new_dialog(&dialog)?).await?;

    tracing::info!(
        target: TRACING_TARGET,
        chat_id = %created.id,
        datasets = dialog.kb_ids.len(),
        "Chat created"
    );

    Ok(Envelope::new(representation(created)?))
}

fn create_chat_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Create chat")
        .description(
            "Creates a chat assistant. Omitted prompt fields and retrieval settings take \
             their defaults and the chat model falls back to the tenant default.",
        )
        .response::<200, Envelope<Chat>>()
        .response::<400, Json<ErrorResponse<'static>>>()
        .response::<401, Json<ErrorResponse<'static>>>()
        .response::<403, Json<ErrorResponse<'static>>>()
        .response::<409, Json<ErrorResponse<'static>>>()
}

/// Applies a partial update to a chat assistant.
#[tracing::instrument(
    skip_all,
    fields(
        tenant_id = %auth_state.tenant_id(),
        chat_id = %path_params.chat_id,
    )
)]
async fn update_chat(
    auth_state: AuthState,
    PgPool(mut conn): PgPool,
    Path(path_params): Path<ChatPathParams>,
    Json(request): Json<UpdateChat>,
) -> Result<Envelope<Chat>> {
    tracing::debug!(target: TRACING_TARGET, "Updating chat");

    let chat_id = path_params.chat_id;
    let stored = conn
        .find_tenant_dialog(auth_state.tenant_id(), chat_id)
        .await?
        .ok_or_else(|| ErrorKind::Forbidden.with_message("You do not own the chat"))?;

    let current = dialog_config(stored)?;
    let mut catalog = PgDialogCatalog::new(&mut conn);
    let dialog = prepare_update(&mut catalog, &current, request).await?;

    let changes = UpdateDialog::from(new_dialog(&dialog)?);
    let updated = conn.update_dialog(chat_id, changes).await?;

    tracing::info!(target: TRACING_TARGET, "Chat updated");

    Ok(Envelope::new(representation(updated)?))
}

fn update_chat_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Update chat")
        .description(
            "Merges the supplied fields onto the stored chat, re-applies prompt defaults \
             and runs the full consistency check.",
        )
        .response::<200, Envelope<Chat>>()
        .response::<400, Json<ErrorResponse<'static>>>()
        .response::<401, Json<ErrorResponse<'static>>>()
        .response::<403, Json<ErrorResponse<'static>>>()
}

/// Soft-deletes chat assistants, all or nothing.
#[tracing::instrument(skip_all, fields(tenant_id = %auth_state.tenant_id()))]
async fn delete_chats(
    auth_state: AuthState,
    PgPool(mut conn): PgPool,
    ValidateJson(request): ValidateJson<DeleteChats>,
) -> Result<Envelope<DeletedChats>> {
    tracing::debug!(
        target: TRACING_TARGET,
        count = request.ids.len(),
        "Deleting chats"
    );

    if request.has_duplicates() {
        return Err(ErrorKind::BadRequest.with_message("Duplicate ids in the list"));
    }

    let tenant_id = auth_state.tenant_id();
    for &chat_id in &request.ids {
        if conn.find_tenant_dialog(tenant_id, chat_id).await?.is_none() {
            return Err(ErrorKind::Forbidden
                .with_message(format!("You do not own the chat {chat_id}"))
                .with_resource("chat"));
        }
    }

    let deleted = conn.soft_delete_dialogs(tenant_id, &request.ids).await?;

    tracing::warn!(target: TRACING_TARGET, deleted, "Chats deleted");

    Ok(Envelope::new(DeletedChats {
        delete_ids: request.ids,
    }))
}

fn delete_chats_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Delete chats")
        .description(
            "Soft-deletes the listed chats. Nothing is deleted unless the caller owns each one.",
        )
        .response::<200, Envelope<DeletedChats>>()
        .response::<400, Json<ErrorResponse<'static>>>()
        .response::<401, Json<ErrorResponse<'static>>>()
        .response::<403, Json<ErrorResponse<'static>>>()
}

/// Lists the caller's valid chat assistants.
#[tracing::instrument(skip_all, fields(tenant_id = %auth_state.tenant_id()))]
async fn list_chats(
    auth_state: AuthState,
    PgPool(mut conn): PgPool,
    Query(params): Query<ListChats>,
) -> Result<Envelope<Chats>> {
    params.validate()?;

    let page = conn
        .list_tenant_dialogs(
            auth_state.tenant_id(),
            params.filter(),
            params.sort_by(),
            params.pagination(),
        )
        .await?;

    let total = page.total.unwrap_or_default();
    let chats = page
        .items
        .into_iter()
        .map(representation)
        .collect::<Result<Vec<_>, Error<'static>>>()?;

    tracing::debug!(
        target: TRACING_TARGET,
        count = chats.len(),
        total,
        page = params.page,
        "Chats listed"
    );

    Ok(Envelope::new(Chats { total, chats }))
}

fn list_chats_docs(op: TransformOperation) -> TransformOperation {
    op.summary("List chats")
        .description(
            "Returns one page of the caller's chats, newest first by default, with the total \
             number of matches. `name` filters by case-insensitive substring.",
        )
        .response::<200, Envelope<Chats>>()
        .response::<400, Json<ErrorResponse<'static>>>()
        .response::<401, Json<ErrorResponse<'static>>>()
}

/// Returns one chat assistant.
#[tracing::instrument(
    skip_all,
    fields(
        tenant_id = %auth_state.tenant_id(),
        chat_id = %path_params.chat_id,
    )
)]
async fn read_chat(
    auth_state: AuthState,
    PgPool(mut conn): PgPool,
    Path(path_params): Path<ChatPathParams>,
) -> Result<Envelope<Chat>> {
    let dialog = conn
        .find_tenant_dialog(auth_state.tenant_id(), path_params.chat_id)
        .await?
        .ok_or_else(|| {
            ErrorKind::NotFound
                .with_message("The chat doesn't exist")
                .with_resource("chat")
        })?;

    Ok(Envelope::new(representation(dialog)?))
}

fn read_chat_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Get chat")
        .description("Returns the chat in its external representation.")
        .response::<200, Envelope<Chat>>()
        .response::<401, Json<ErrorResponse<'static>>>()
        .response::<404, Json<ErrorResponse<'static>>>()
}

/// Returns routes for chat assistant management.
pub fn routes() -> ApiRouter<ServiceState> {
    use aide::axum::routing::*;

    ApiRouter::new()
        .api_route(
            "/api/v1/chats",
            post_with(create_chat, create_chat_docs)
                .get_with(list_chats, list_chats_docs)
                .delete_with(delete_chats, delete_chats_docs),
        )
        .api_route(
            "/api/v1/chats/{chat_id}",
            get_with(read_chat, read_chat_docs).put_with(update_chat, update_chat_docs),
        )
        .with_path_items(|item| item.tag("Chats"))
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;
    use axum::http::header::AUTHORIZATION;
    use converse_core::dialog::PromptParameter;
    use serde_json::json;

    use super::*;
    use crate::handler::test::create_test_server_with_router;

    fn stored_dialog() -> Dialog {
        let now = jiff::Timestamp::now();
        Dialog {
            id: Uuid::now_v7(),
            tenant_id: Uuid::now_v7(),
            name: "support".into(),
            description: "A helpful Assistant".into(),
            icon: String::new(),
            llm_id: "qwen-plus@Tongyi-Qianwen".into(),
            llm_setting: json!({"temperature": 0.1}),
            prompt_config: json!({
                "system": "Answer using {knowledge}.",
                "prologue": "Hi!",
                "parameters": [{"key": "knowledge", "optional": false}],
                "empty_response": "",
                "quote": true,
                "tts": false,
                "refine_multiturn": true,
            }),
            similarity_threshold: 0.2,
            vector_similarity_weight: 0.3,
            top_n: 6,
            top_k: 1024,
            rerank_id: String::new(),
            kb_ids: vec![Some(Uuid::now_v7()), None],
            status: Default::default(),
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[test]
    fn stored_row_round_trips_through_config() {
        let row = stored_dialog();
        let config = dialog_config(row.clone()).unwrap();
        assert_eq!(config.kb_ids.len(), 1);
        assert_eq!(
            config.prompt_config.parameters,
            vec![PromptParameter::required("knowledge")]
        );

        let insert = new_dialog(&config).unwrap();
        assert_eq!(insert.prompt_config, row.prompt_config);
        assert_eq!(insert.llm_setting, row.llm_setting);
        assert_eq!(insert.kb_ids, vec![row.kb_ids[0]]);
    }

    #[test]
    fn malformed_prompt_is_a_server_error() {
        let mut row = stored_dialog();
        row.prompt_config = json!("not an object");
        let error = dialog_config(row).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::InternalServerError);
    }

    #[test]
    fn representation_uses_external_names() {
        let chat = representation(stored_dialog()).unwrap();
        assert_eq!(chat.llm["model_name"], "qwen-plus@Tongyi-Qianwen");
        assert_eq!(chat.prompt["prompt"], "Answer using {knowledge}.");
        assert_eq!(chat.prompt["opener"], "Hi!");
    }

    #[tokio::test]
    async fn requests_without_token_are_rejected() -> anyhow::Result<()> {
        let server = create_test_server_with_router(routes())?;

        let response = server.get("/api/v1/chats").await;
        response.assert_status_unauthorized();
        response.assert_json(&json!({
            "code": 109,
            "message": "Authorization is not valid!",
            "data": null,
        }));

        Ok(())
    }

    #[tokio::test]
    async fn non_bearer_token_is_rejected() -> anyhow::Result<()> {
        let server = create_test_server_with_router(routes())?;

        let response = server
            .delete("/api/v1/chats")
            .add_header(AUTHORIZATION, HeaderValue::from_static("Token abc"))
            .json(&json!({"ids": []}))
            .await;
        response.assert_status_unauthorized();
        assert_eq!(response.json::<Value>()["code"], 109);

        Ok(())
    }
}
