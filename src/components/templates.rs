use std::collections::HashMap;
use std::fs;
use std::path::Path;

use axum::response::Html;
use log::{debug, info, warn};

use crate::errors::WikiError;
use crate::services::MarkdownService;
use crate::types::{Page, TemplateContext};
use crate::utils::escape_html;

const VIEW_TEMPLATE: &str = "<!doctype html><html lang=\"en\"><head><meta charset=\"utf-8\"><title>{{TITLE}}</title></head><body><h1>{{TITLE}}</h1><p>[<a href=\"/edit/{{TITLE}}\">edit</a>]</p><div>{{CONTENT}}</div></body></html>";

const EDIT_TEMPLATE: &str = "<!doctype html><html lang=\"en\"><head><meta charset=\"utf-8\"><title>Editing {{TITLE}}</title></head><body><h1>Editing {{TITLE}}</h1><form action=\"/save/{{TITLE}}\" method=\"POST\"><div><textarea name=\"body\" rows=\"20\" cols=\"80\">{{BODY}}</textarea></div><div><input type=\"submit\" value=\"Save\"></div></form></body></html>";

/// Named HTML templates, loaded once at startup and read-only afterwards.
///
/// Placeholders: `{{TITLE}}`, `{{BODY}}` (escaped raw body) and `{{CONTENT}}` (body as rendered markdown).
pub struct Templates {
    templates: HashMap<String, String>,
    markdown: MarkdownService,
}

impl Templates {
    /// Load every `*.html` file in `dir`, keyed by file stem.
    ///
    /// Falls back to the built-in set when `dir` does not exist.
    pub fn load(dir: &Path) -> Result<Self, WikiError> {
        if !dir.is_dir() {
            warn!("Template directory {:?} not found, using built-in templates", dir);
            return Ok(Self::builtin());
        }

        let mut templates = HashMap::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            let is_html = path
                .extension()
                .and_then(|s| s.to_str())
                .map(|s| s.eq_ignore_ascii_case("html"))
                .unwrap_or(false);
            if !is_html {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            debug!("Loading template '{}' from {:?}", name, path);
            templates.insert(name.to_string(), fs::read_to_string(&path)?);
        }

        info!("Loaded {} templates from {:?}", templates.len(), dir);
        Ok(Self::from_map(templates))
    }

    /// The `view` and `edit` templates compiled into the binary
    pub fn builtin() -> Self {
        let mut templates = HashMap::new();
        templates.insert("view".to_string(), VIEW_TEMPLATE.to_string());
        templates.insert("edit".to_string(), EDIT_TEMPLATE.to_string());
        Self::from_map(templates)
    }

    pub fn from_map(templates: HashMap<String, String>) -> Self {
        Self { templates, markdown: MarkdownService::new() }
    }

    /// Execute the template `name` against `page`
    pub fn render(&self, name: &str, page: &Page) -> Result<Html<String>, WikiError> {
        let template = self
            .templates
            .get(name)
            .ok_or_else(|| WikiError::Render(format!("no template named '{}'", name)))?;

        let context = self.context_for(template, page);
        let html = fill(template, &context);

        debug!("Rendered template '{}' for page '{}'", name, page.title);
        Ok(Html(html))
    }

    fn context_for(&self, template: &str, page: &Page) -> TemplateContext {
        let text = page.body_text();
        let content = if template.contains("{{CONTENT}}") {
            self.markdown.render(&text)
        } else {
            String::new()
        };
        TemplateContext {
            title: escape_html(&page.title),
            body: escape_html(&text),
            content,
        }
    }
}

/// Substitute placeholders in one pass so page text is never re-scanned
fn fill(template: &str, context: &TemplateContext) -> String {
    let mut out = String::with_capacity(template.len() + context.body.len() + context.content.len());
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let value = after.find("}}").and_then(|end| {
            let value = match &after[..end] {
                "TITLE" => &context.title,
                "BODY" => &context.body,
                "CONTENT" => &context.content,
                _ => return None,
            };
            Some((value, end))
        });
        match value {
            Some((value, end)) => {
                out.push_str(value);
                rest = &after[end + 2..];
            }
            None => {
                out.push_str("{{");
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

impl Default for Templates {
    fn default() -> Self {
        Self::builtin()
    }
}
