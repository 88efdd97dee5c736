//! Template catalog and curricular context options
//!
//! The catalog is read-only data consumed by the studio: templates grouped
//! by category, plus the context options used for prompt augmentation. The
//! built-in data ships as `catalog.yaml`; a replacement file with the same
//! shape can be loaded from disk.

use crate::error::{EducadorError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

const BUILTIN_CATALOG: &str = include_str!("catalog.yaml");

/// Template category
///
/// Declaration order is the display order used when grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    /// Lesson and term planning
    #[serde(rename = "Planejamento")]
    Planning,
    /// Content and material production
    #[serde(rename = "Conteúdo")]
    Content,
    /// Assessment
    #[serde(rename = "Avaliação")]
    Assessment,
    /// Innovative practices
    #[serde(rename = "Inovação")]
    Innovation,
    /// Youth and adult education
    #[serde(rename = "EJA")]
    AdultEducation,
    /// Special education
    #[serde(rename = "Educação Especial")]
    SpecialEducation,
}

impl Category {
    /// All categories in display order
    pub const ALL: [Category; 6] = [
        Category::Planning,
        Category::Content,
        Category::Assessment,
        Category::Innovation,
        Category::AdultEducation,
        Category::SpecialEducation,
    ];

    /// Localized label shown to educators
    pub fn label(&self) -> &'static str {
        match self {
            Category::Planning => "Planejamento",
            Category::Content => "Conteúdo",
            Category::Assessment => "Avaliação",
            Category::Innovation => "Inovação",
            Category::AdultEducation => "EJA",
            Category::SpecialEducation => "Educação Especial",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A predefined prompt scaffold
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    /// Unique id
    pub id: u32,
    /// Title, also stored on history entries
    pub title: String,
    /// One-line description
    pub description: String,
    /// Category used for grouping
    pub category: Category,
    /// Prompt seeded into a new session
    pub default_prompt: String,
    /// Opaque display hint (icon name); never interpreted
    #[serde(default)]
    pub icon: String,
}

/// A curricular context selectable for prompt augmentation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextOption {
    /// Unique id, e.g. `default` or `municipal`
    pub id: String,
    /// Label shown in the selector
    pub label: String,
    /// Text appended to the prompt; empty for a no-op
    #[serde(default)]
    pub prompt_suffix: String,
    /// Short explanation of what the context does
    #[serde(default)]
    pub description: String,
    /// Reference documentation for the context
    #[serde(default)]
    pub link: Option<url::Url>,
}

/// Read-only catalog of templates and context options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    templates: Vec<Template>,
    #[serde(default)]
    contexts: Vec<ContextOption>,
}

impl Catalog {
    /// Parse the catalog bundled with the binary
    ///
    /// # Errors
    ///
    /// Returns error if the bundled data is malformed
    pub fn builtin() -> Result<Self> {
        Self::from_yaml(BUILTIN_CATALOG)
    }

    /// Load a catalog file with the same shape as the bundled one
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or is invalid
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            EducadorError::Config(format!(
                "Failed to read catalog {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_yaml(&contents)
    }

    /// Parse a catalog from YAML text
    ///
    /// # Errors
    ///
    /// Returns error on invalid YAML, duplicate template ids or duplicate
    /// context ids
    pub fn from_yaml(contents: &str) -> Result<Self> {
        let catalog: Catalog = serde_yaml::from_str(contents)
            .map_err(|e| EducadorError::Config(format!("Failed to parse catalog: {}", e)))?;
        catalog.check_unique_ids()?;
        Ok(catalog)
    }

    fn check_unique_ids(&self) -> Result<()> {
        let mut seen = std::collections::HashSet::new();
        for template in &self.templates {
            if !seen.insert(template.id) {
                return Err(EducadorError::Config(format!(
                    "Duplicate template id in catalog: {}",
                    template.id
                ))
                .into());
            }
        }

        let mut seen = std::collections::HashSet::new();
        for context in &self.contexts {
            if !seen.insert(context.id.as_str()) {
                return Err(EducadorError::Config(format!(
                    "Duplicate context id in catalog: {}",
                    context.id
                ))
                .into());
            }
        }

        Ok(())
    }

    /// All templates in catalog order
    pub fn templates(&self) -> &[Template] {
        &self.templates
    }

    /// All context options in catalog order
    pub fn contexts(&self) -> &[ContextOption] {
        &self.contexts
    }

    /// Look up a template by id
    pub fn template(&self, id: u32) -> Option<&Template> {
        self.templates.iter().find(|t| t.id == id)
    }

    /// Look up a context option by id
    pub fn context(&self, id: &str) -> Option<&ContextOption> {
        self.contexts.iter().find(|c| c.id == id)
    }

    /// Templates grouped by category, categories in display order
    ///
    /// Categories without templates are omitted.
    pub fn by_category(&self) -> BTreeMap<Category, Vec<&Template>> {
        let mut grouped: BTreeMap<Category, Vec<&Template>> = BTreeMap::new();
        for template in &self.templates {
            grouped.entry(template.category).or_default().push(template);
        }
        grouped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_parses() {
        let catalog = Catalog::builtin().unwrap();
        assert_eq!(catalog.templates().len(), 38);
        assert_eq!(catalog.contexts().len(), 2);
    }

    #[test]
    fn test_builtin_first_template() {
        let catalog = Catalog::builtin().unwrap();
        let template = catalog.template(1).unwrap();
        assert_eq!(template.title, "Planos de Aula Personalizados");
        assert_eq!(template.category, Category::Planning);
        assert!(template.default_prompt.contains("Ciclo da Água"));
        assert_eq!(template.icon, "users");
    }

    #[test]
    fn test_builtin_contexts() {
        let catalog = Catalog::builtin().unwrap();

        let default = catalog.context("default").unwrap();
        assert!(default.prompt_suffix.is_empty());
        assert!(default.link.is_none());

        let municipal = catalog.context("municipal").unwrap();
        assert!(municipal.prompt_suffix.starts_with("\n\n[IMPORTANTE:"));
        assert!(municipal.link.is_some());
    }

    #[test]
    fn test_by_category_covers_every_category() {
        let catalog = Catalog::builtin().unwrap();
        let grouped = catalog.by_category();

        let keys: Vec<Category> = grouped.keys().copied().collect();
        assert_eq!(keys, Category::ALL.to_vec());

        let total: usize = grouped.values().map(|v| v.len()).sum();
        assert_eq!(total, 38);
        assert_eq!(grouped[&Category::SpecialEducation].len(), 7);
    }

    #[test]
    fn test_category_serde_uses_portuguese_labels() {
        let yaml = serde_yaml::to_string(&Category::SpecialEducation).unwrap();
        assert!(yaml.contains("Educação Especial"));

        let parsed: Category = serde_yaml::from_str("\"Conteúdo\"").unwrap();
        assert_eq!(parsed, Category::Content);
        assert_eq!(parsed.to_string(), "Conteúdo");
    }

    #[test]
    fn test_from_yaml_rejects_duplicate_template_ids() {
        let yaml = r#"
templates:
  - id: 1
    title: A
    description: a
    category: EJA
    default_prompt: p
  - id: 1
    title: B
    description: b
    category: EJA
    default_prompt: q
"#;
        assert!(Catalog::from_yaml(yaml).is_err());
    }

    #[test]
    fn test_from_yaml_optional_fields_default() {
        let yaml = r#"
templates:
  - id: 7
    title: Sem ícone
    description: d
    category: Inovação
    default_prompt: p
contexts:
  - id: default
    label: Padrão
"#;
        let catalog = Catalog::from_yaml(yaml).unwrap();
        assert_eq!(catalog.template(7).unwrap().icon, "");
        let context = catalog.context("default").unwrap();
        assert_eq!(context.prompt_suffix, "");
        assert!(context.link.is_none());
    }

    #[test]
    fn test_load_missing_file_is_error() {
        assert!(Catalog::load("/nonexistent/catalog.yaml").is_err());
    }

    #[test]
    fn test_unknown_lookups_return_none() {
        let catalog = Catalog::builtin().unwrap();
        assert!(catalog.template(999).is_none());
        assert!(catalog.context("estadual").is_none());
    }
}
