//! Request-to-configuration pipeline shared by create and update.
//!
//! Both entry points decode the external request, fill in defaults and run
//! every consistency check. A returned [`DialogConfig`] is ready to persist;
//! an error means nothing may be written.

use uuid::Uuid;

use super::defaults::DefaultTemplate;
use super::model::DialogConfig;
use super::translate::{ChatRequest, decode_chat};
use super::validate::{ConsistencyValidator, DialogCatalog};
use crate::Result;

/// Builds a new dialog from a create request.
///
/// `fallback_llm_id` is the tenant default chat model, used when the request
/// names none.
pub async fn prepare_create<C>(
    catalog: &mut C,
    id: Uuid,
    tenant_id: Uuid,
    request: ChatRequest,
    fallback_llm_id: &str,
) -> Result<DialogConfig>
where
    C: DialogCatalog + Send,
{
    let patch = decode_chat(request)?;
    let dialog = DefaultTemplate::global().assemble(id, tenant_id, patch, fallback_llm_id)?;

    ConsistencyValidator::new(catalog)
        .validate_all(&dialog, None)
        .await?;

    Ok(dialog)
}

/// Merges an update request onto `current`.
pub async fn prepare_update<C>(
    catalog: &mut C,
    current: &DialogConfig,
    request: ChatRequest,
) -> Result<DialogConfig>
where
    C: DialogCatalog + Send,
{
    let patch = decode_chat(request)?;
    let dialog = current.apply(patch, DefaultTemplate::global())?;

    ConsistencyValidator::new(catalog)
        .validate_all(&dialog, Some(current.id))
        .await?;

    Ok(dialog)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::ErrorKind;
    use crate::dialog::ModelKind;
    use crate::dialog::testing::MemoryCatalog;

    fn request(value: serde_json::Value) -> ChatRequest {
        serde_json::from_value(value).unwrap()
    }

    #[tokio::test]
    async fn create_fills_defaults_and_validates() {
        let (catalog, kb) = MemoryCatalog::default().with_kb("bge@BAAI", 4);
        let mut catalog = catalog.with_model("qwen", ModelKind::Chat);

        let dialog = prepare_create(
            &mut catalog,
            Uuid::now_v7(),
            Uuid::now_v7(),
            request(json!({ "name": "support", "dataset_ids": [kb] })),
            "qwen",
        )
        .await
        .unwrap();

        assert_eq!(dialog.llm_id, "qwen");
        assert_eq!(dialog.kb_ids, vec![kb]);
        assert_eq!(dialog.top_n, 6);
    }

    #[tokio::test]
    async fn create_rejects_mixed_embedding_families() {
        let (catalog, a) = MemoryCatalog::default().with_kb("bge@BAAI", 4);
        let (catalog, b) = catalog.with_kb("bce@Youdao", 4);
        let mut catalog = catalog.with_model("qwen", ModelKind::Chat);

        let error = prepare_create(
            &mut catalog,
            Uuid::now_v7(),
            Uuid::now_v7(),
            request(json!({ "name": "support", "dataset_ids": [a, b] })),
            "qwen",
        )
        .await
        .unwrap_err();

        assert_eq!(error.kind(), ErrorKind::Authorization);
        assert!(error.message().starts_with("Datasets use different embedding models"));
        assert!(catalog.dialogs.is_empty());
    }

    #[tokio::test]
    async fn create_rejects_supplied_tenant_before_lookups() {
        let mut catalog = MemoryCatalog::default();
        let error = prepare_create(
            &mut catalog,
            Uuid::now_v7(),
            Uuid::now_v7(),
            request(json!({ "name": "support", "tenant_id": "other" })),
            "qwen",
        )
        .await
        .unwrap_err();

        assert_eq!(error.message(), "`tenant_id` must not be provided.");
        assert_eq!(catalog.lookups, 0);
    }

    #[tokio::test]
    async fn update_keeps_own_name_and_checks_new_datasets() {
        let (catalog, kb) = MemoryCatalog::default().with_kb("bge@BAAI", 4);
        let (catalog, other) = catalog.with_kb("bce@Youdao", 4);
        let mut catalog = catalog.with_model("qwen", ModelKind::Chat);

        let current = prepare_create(
            &mut catalog,
            Uuid::now_v7(),
            Uuid::now_v7(),
            request(json!({ "name": "support", "dataset_ids": [kb] })),
            "qwen",
        )
        .await
        .unwrap();
        catalog.dialogs.push((current.id, current.name.clone()));

        let renamed = prepare_update(
            &mut catalog,
            &current,
            request(json!({ "description": "Billing questions" })),
        )
        .await
        .unwrap();
        assert_eq!(renamed.name, "support");
        assert_eq!(renamed.description, "Billing questions");

        let error = prepare_update(
            &mut catalog,
            &current,
            request(json!({ "dataset_ids": [kb, other] })),
        )
        .await
        .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Authorization);
    }
}
