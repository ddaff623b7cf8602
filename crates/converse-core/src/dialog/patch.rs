//! Allow-listed partial updates.

use uuid::Uuid;

use super::defaults::DefaultTemplate;
use super::model::{DecodedPrompt, DialogConfig, LlmSetting, checked_name};
use crate::Result;

/// The only dialog fields a caller may set or change.
///
/// `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DialogPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub llm_id: Option<String>,
    pub llm_setting: Option<LlmSetting>,
    pub prompt: Option<DecodedPrompt>,
    pub kb_ids: Option<Vec<Uuid>>,
}

impl DialogPatch {
    /// Returns `true` if the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl DialogConfig {
    /// Returns a copy of this dialog with `patch` applied.
    ///
    /// Prompt fields are merged one by one onto the stored prompt and the
    /// result goes through the default template again, so an emptied
    /// `system` is restored to the default.
    pub fn apply(&self, patch: DialogPatch, template: &DefaultTemplate) -> Result<DialogConfig> {
        let mut next = self.clone();

        if let Some(name) = patch.name {
            next.name = checked_name(name)?;
        }
        if let Some(description) = patch.description {
            next.description = description;
        }
        if let Some(icon) = patch.icon {
            next.icon = icon;
        }
        if let Some(llm_id) = patch.llm_id {
            next.llm_id = llm_id;
        }
        if let Some(llm_setting) = patch.llm_setting {
            next.llm_setting = llm_setting;
        }
        if let Some(kb_ids) = patch.kb_ids {
            next.kb_ids = kb_ids;
        }

        if let Some(DecodedPrompt { config, retrieval }) = patch.prompt {
            next.prompt_config = template.assemble_prompt(config.merged_onto(&self.prompt_config));

            if let Some(value) = retrieval.similarity_threshold {
                next.similarity_threshold = value;
            }
            if let Some(value) = retrieval.vector_similarity_weight {
                next.vector_similarity_weight = value;
            }
            if let Some(value) = retrieval.top_n {
                next.top_n = value;
            }
            if let Some(value) = retrieval.top_k {
                next.top_k = value;
            }
            if let Some(value) = retrieval.rerank_id {
                next.rerank_id = value;
            }
        }

        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialog::MAX_NAME_LENGTH;
    use crate::dialog::{PromptDraft, RetrievalDraft};

    fn stored() -> DialogConfig {
        let patch = DialogPatch {
            name: Some("support".into()),
            kb_ids: Some(vec![Uuid::now_v7()]),
            ..Default::default()
        };
        DefaultTemplate::global()
            .assemble(Uuid::now_v7(), Uuid::now_v7(), patch, "chat")
            .unwrap()
    }

    #[test]
    fn empty_patch_changes_nothing() {
        let dialog = stored();
        let patch = DialogPatch::default();
        assert!(patch.is_empty());
        assert_eq!(dialog.apply(patch, DefaultTemplate::global()).unwrap(), dialog);
    }

    #[test]
    fn patch_overwrites_only_supplied_fields() {
        let dialog = stored();
        let patch = DialogPatch {
            description: Some("Billing bot".into()),
            prompt: Some(DecodedPrompt {
                config: PromptDraft {
                    prologue: Some("Welcome".into()),
                    ..Default::default()
                },
                retrieval: RetrievalDraft {
                    top_n: Some(3),
                    ..Default::default()
                },
            }),
            ..Default::default()
        };

        let next = dialog.apply(patch, DefaultTemplate::global()).unwrap();
        assert_eq!(next.id, dialog.id);
        assert_eq!(next.name, dialog.name);
        assert_eq!(next.kb_ids, dialog.kb_ids);
        assert_eq!(next.description, "Billing bot");
        assert_eq!(next.prompt_config.prologue, "Welcome");
        assert_eq!(next.prompt_config.system, dialog.prompt_config.system);
        assert_eq!(next.top_n, 3);
        assert_eq!(next.top_k, dialog.top_k);
    }

    #[test]
    fn emptied_system_is_restored() {
        let dialog = stored();
        let patch = DialogPatch {
            prompt: Some(DecodedPrompt {
                config: PromptDraft {
                    system: Some(String::new()),
                    ..Default::default()
                },
                retrieval: RetrievalDraft::default(),
            }),
            ..Default::default()
        };

        let next = dialog.apply(patch, DefaultTemplate::global()).unwrap();
        assert_eq!(next.prompt_config.system, DefaultTemplate::global().prompt.system);
    }

    #[test]
    fn empty_kb_list_clears_datasets() {
        let dialog = stored();
        let patch = DialogPatch {
            kb_ids: Some(Vec::new()),
            ..Default::default()
        };
        let next = dialog.apply(patch, DefaultTemplate::global()).unwrap();
        assert!(next.kb_ids.is_empty());
    }

    #[test]
    fn blank_name_is_rejected() {
        for name in [String::new(), "   ".to_owned()] {
            let patch = DialogPatch {
                name: Some(name),
                ..Default::default()
            };
            let error = stored().apply(patch, DefaultTemplate::global()).unwrap_err();
            assert_eq!(error.message(), "`name` is required.");
        }
    }

    #[test]
    fn overlong_name_is_rejected() {
        let patch = DialogPatch {
            name: Some("n".repeat(MAX_NAME_LENGTH + 1)),
            ..Default::default()
        };
        assert!(stored().apply(patch, DefaultTemplate::global()).is_err());

        let patch = DialogPatch {
            name: Some("n".repeat(MAX_NAME_LENGTH)),
            ..Default::default()
        };
        assert!(stored().apply(patch, DefaultTemplate::global()).is_ok());
    }
}
