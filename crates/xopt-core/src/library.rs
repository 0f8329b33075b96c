//! Reusable hooks and post templates, plus the YAML file that seeds the
//! system entries.

use std::collections::HashSet;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::categories::{HookCategory, TemplateCategory};
use crate::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostHook {
    pub id: Uuid,
    pub client_id: Option<Uuid>,
    pub category: HookCategory,
    pub hook_text: String,
    pub description: Option<String>,
    pub example_usage: Option<String>,
    pub usage_count: i32,
    pub is_system: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PostHook {
    /// System and shared hooks are open to everyone; a client's own hooks
    /// only to that client.
    #[must_use]
    pub fn available_to(&self, client_id: Uuid) -> bool {
        self.client_id.is_none_or(|owner| owner == client_id)
    }
}

/// One named block of a template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateStructurePart {
    pub order: i32,
    pub name: String,
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub char_limit: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostTemplate {
    pub id: Uuid,
    pub client_id: Option<Uuid>,
    pub name: String,
    pub description: Option<String>,
    pub category: TemplateCategory,
    pub structure: Vec<TemplateStructurePart>,
    pub has_reply_thread: bool,
    pub reply_structure: Vec<TemplateStructurePart>,
    pub usage_count: i32,
    pub is_system: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PostTemplate {
    /// Same visibility rule as [`PostHook::available_to`].
    #[must_use]
    pub fn available_to(&self, client_id: Uuid) -> bool {
        self.client_id.is_none_or(|owner| owner == client_id)
    }

    /// Main structure sorted by `order`.
    #[must_use]
    pub fn ordered_structure(&self) -> Vec<&TemplateStructurePart> {
        sorted_parts(&self.structure)
    }

    /// Reply-thread structure sorted by `order`; empty unless the template
    /// has a reply thread.
    #[must_use]
    pub fn ordered_reply_structure(&self) -> Vec<&TemplateStructurePart> {
        if self.has_reply_thread {
            sorted_parts(&self.reply_structure)
        } else {
            Vec::new()
        }
    }
}

fn sorted_parts(parts: &[TemplateStructurePart]) -> Vec<&TemplateStructurePart> {
    let mut sorted: Vec<&TemplateStructurePart> = parts.iter().collect();
    sorted.sort_by_key(|p| p.order);
    sorted
}

#[derive(Debug, Clone, Deserialize)]
pub struct HookSeed {
    pub category: HookCategory,
    pub hook_text: String,
    pub description: Option<String>,
    pub example_usage: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TemplateSeed {
    pub name: String,
    pub description: Option<String>,
    pub category: TemplateCategory,
    pub structure: Vec<TemplateStructurePart>,
    #[serde(default)]
    pub has_reply_thread: bool,
    #[serde(default)]
    pub reply_structure: Vec<TemplateStructurePart>,
}

#[derive(Debug, Deserialize)]
pub struct LibraryFile {
    #[serde(default)]
    pub hooks: Vec<HookSeed>,
    #[serde(default)]
    pub templates: Vec<TemplateSeed>,
}

/// Load and validate the system library from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_library(path: &Path) -> Result<LibraryFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::LibraryFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_library(&content)
}

/// Parse and validate library YAML already in memory.
///
/// # Errors
///
/// Returns `ConfigError::LibraryFileParse` or `ConfigError::Validation`.
pub fn parse_library(content: &str) -> Result<LibraryFile, ConfigError> {
    let library: LibraryFile =
        serde_yaml::from_str(content).map_err(ConfigError::LibraryFileParse)?;

    validate_library(&library)?;

    Ok(library)
}

fn validate_library(library: &LibraryFile) -> Result<(), ConfigError> {
    let mut seen_hooks = HashSet::new();
    for hook in &library.hooks {
        if hook.hook_text.trim().is_empty() {
            return Err(ConfigError::Validation(
                "hook_text must be non-empty".to_string(),
            ));
        }
        if !seen_hooks.insert(hook.hook_text.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate hook: '{}'",
                hook.hook_text
            )));
        }
    }

    let mut seen_templates = HashSet::new();
    for template in &library.templates {
        if template.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "template name must be non-empty".to_string(),
            ));
        }
        if !seen_templates.insert(template.name.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate template name: '{}'",
                template.name
            )));
        }
        if template.structure.is_empty() {
            return Err(ConfigError::Validation(format!(
                "template '{}' has an empty structure",
                template.name
            )));
        }
        if template.has_reply_thread && template.reply_structure.is_empty() {
            return Err(ConfigError::Validation(format!(
                "template '{}' declares a reply thread without a reply_structure",
                template.name
            )));
        }
        let mut orders = HashSet::new();
        for part in &template.structure {
            if !orders.insert(part.order) {
                return Err(ConfigError::Validation(format!(
                    "template '{}' repeats structure order {}",
                    template.name, part.order
                )));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r"
hooks:
  - category: urgent
    hook_text: 【警告】
    description: 注意を引く
  - category: number
    hook_text: 3つの理由
templates:
  - name: 問題提起型
    category: attention
    structure:
      - order: 2
        name: 解決策
        prompt: 解決策を示す
      - order: 1
        name: 問題提起
        prompt: 読者の悩みを指摘する
        char_limit: 40
";

    #[test]
    fn parses_valid_library() {
        let library = parse_library(VALID).unwrap();
        assert_eq!(library.hooks.len(), 2);
        assert_eq!(library.hooks[1].category, HookCategory::Number);
        assert_eq!(library.templates[0].structure[1].char_limit, Some(40));
        assert!(!library.templates[0].has_reply_thread);
    }

    #[test]
    fn rejects_duplicate_hook_text() {
        let yaml = "hooks:\n  - {category: urgent, hook_text: 【警告】}\n  - {category: other, hook_text: 【警告】}\n";
        let err = parse_library(yaml).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref m) if m.contains("duplicate hook")));
    }

    #[test]
    fn rejects_unknown_category() {
        let yaml = "hooks:\n  - {category: viral, hook_text: x}\n";
        assert!(matches!(
            parse_library(yaml),
            Err(ConfigError::LibraryFileParse(_))
        ));
    }

    #[test]
    fn rejects_reply_thread_without_structure() {
        let yaml = r"
templates:
  - name: t
    category: story
    has_reply_thread: true
    structure:
      - {order: 1, name: a, prompt: b}
";
        let err = parse_library(yaml).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref m) if m.contains("reply")));
    }

    #[test]
    fn ordered_structure_sorts_by_order() {
        let now = Utc::now();
        let seed = &parse_library(VALID).unwrap().templates[0];
        let template = PostTemplate {
            id: Uuid::new_v4(),
            client_id: None,
            name: seed.name.clone(),
            description: None,
            category: seed.category,
            structure: seed.structure.clone(),
            has_reply_thread: false,
            reply_structure: vec![seed.structure[0].clone()],
            usage_count: 0,
            is_system: true,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        let names: Vec<&str> = template
            .ordered_structure()
            .iter()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(names, ["問題提起", "解決策"]);
        assert!(template.ordered_reply_structure().is_empty());
    }

    #[test]
    fn private_hooks_are_only_available_to_their_client() {
        let now = Utc::now();
        let owner = Uuid::new_v4();
        let mut hook = PostHook {
            id: Uuid::new_v4(),
            client_id: Some(owner),
            category: HookCategory::Question,
            hook_text: "なぜ続かないのか？".to_string(),
            description: None,
            example_usage: None,
            usage_count: 0,
            is_system: false,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        assert!(hook.available_to(owner));
        assert!(!hook.available_to(Uuid::new_v4()));

        hook.client_id = None;
        assert!(hook.available_to(Uuid::new_v4()));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = load_library(Path::new("/nonexistent/library.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::LibraryFileIo { ref path, .. } if path.contains("nonexistent")));
    }
}
