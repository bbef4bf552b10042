use serde::{Deserialize, Serialize};

use super::{lenient_text, optional_text, required_text, FieldErrors};
use crate::models::Category;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryForm {
    #[serde(deserialize_with = "lenient_text")]
    pub name: String,
    #[serde(deserialize_with = "lenient_text")]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryDraft {
    pub name: String,
    pub description: Option<String>,
}

impl CategoryForm {
    pub fn clean(&self) -> Result<CategoryDraft, FieldErrors> {
        let mut errors = FieldErrors::new();
        let name = required_text(&mut errors, "name", &self.name);
        let description = optional_text(&self.description);

        match name {
            Some(name) if errors.is_empty() => Ok(CategoryDraft { name, description }),
            _ => Err(errors),
        }
    }
}

impl From<&Category> for CategoryForm {
    fn from(category: &Category) -> Self {
        Self {
            name: category.name.clone(),
            description: category.description.clone().unwrap_or_default(),
        }
    }
}
