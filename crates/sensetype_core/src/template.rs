use std::collections::HashSet;

use serde_json::Value;

/// Fallback system prompt used when no template is selected or the selected
/// name is unknown.
pub const DEFAULT_PROMPT: &str = "You are a writing assistant. Rewrite the user's text to be \
     clear and natural while preserving its meaning and tone. Reply with only the rewritten \
     text, without explanations.";

/// A named system-prompt override. Immutable after parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    pub name: String,
    pub prompt: String,
}

impl Template {
    fn new(name: &str, prompt: &str) -> Self {
        Self {
            name: name.to_owned(),
            prompt: prompt.to_owned(),
        }
    }
}

/// Outcome of parsing the user-configured templates JSON.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedTemplates {
    pub templates: Vec<Template>,
    pub error: Option<String>,
}

/// Parses a JSON-encoded array of `{name, prompt}` objects.
///
/// Blank input yields an empty set with no error. Invalid JSON or a non-array
/// document yields an empty set plus an error string for the surface to
/// report once. Entries missing a string `name` or `prompt` are skipped
/// silently.
pub fn parse_templates(json: &str) -> ParsedTemplates {
    if json.trim().is_empty() {
        return ParsedTemplates::default();
    }

    let parsed: Value = match serde_json::from_str(json) {
        Ok(value) => value,
        Err(err) => {
            return ParsedTemplates {
                templates: Vec::new(),
                error: Some(format!("Invalid JSON: {err}")),
            };
        }
    };

    let Value::Array(items) = parsed else {
        return ParsedTemplates {
            templates: Vec::new(),
            error: Some("Templates must be a JSON array".to_owned()),
        };
    };

    let templates = items
        .iter()
        .filter_map(|item| {
            let name = item.get("name")?.as_str()?;
            let prompt = item.get("prompt")?.as_str()?;
            Some(Template::new(name, prompt))
        })
        .collect();

    ParsedTemplates {
        templates,
        error: None,
    }
}

/// Merges user templates with the built-in defaults. User entries come
/// first and shadow defaults with the same name.
pub fn merge_templates(user: Vec<Template>, defaults: Vec<Template>) -> Vec<Template> {
    let user_names: HashSet<String> = user.iter().map(|template| template.name.clone()).collect();
    let mut merged = user;
    merged.extend(
        defaults
            .into_iter()
            .filter(|template| !user_names.contains(&template.name)),
    );
    merged
}

/// Built-in template set, mirroring the preset transform commands.
pub fn default_templates() -> Vec<Template> {
    vec![
        Template::new(
            "Improve Writing",
            "Improve the writing of the following text. Fix grammar, spelling and awkward \
             phrasing while preserving the original meaning and tone. Reply with only the \
             improved text.",
        ),
        Template::new(
            "Fix Grammar",
            "Fix grammar and spelling errors in the following text. Change nothing else. \
             Reply with only the corrected text.",
        ),
        Template::new(
            "Type English",
            "Translate the following text into natural, fluent English. Reply with only the \
             translation.",
        ),
        Template::new(
            "Type Chinese",
            "Translate the following text into natural, fluent Chinese. Reply with only the \
             translation.",
        ),
    ]
}
