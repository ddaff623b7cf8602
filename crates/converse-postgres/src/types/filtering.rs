//! Filters for list queries.

use uuid::Uuid;

/// Optional filters for listing a tenant's dialogs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DialogFilter {
    /// Exact id match.
    pub id: Option<Uuid>,
    /// Case-insensitive substring of the dialog name.
    pub name: Option<String>,
}

impl DialogFilter {
    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// `ILIKE` pattern for the name keyword, with wildcards in the keyword
    /// matched literally.
    ///
    /// An empty keyword yields no pattern.
    pub fn name_pattern(&self) -> Option<String> {
        let keyword = self.name.as_deref().filter(|name| !name.is_empty())?;

        let mut pattern = String::with_capacity(keyword.len() + 2);
        pattern.push('%');
        for c in keyword.chars() {
            if matches!(c, '%' | '_' | '\\') {
                pattern.push('\\');
            }
            pattern.push(c);
        }
        pattern.push('%');

        Some(pattern)
    }
}
