use log::debug;
use pulldown_cmark::{html, CowStr, Event, Options, Parser};

/// Service for turning page bodies into HTML
pub struct MarkdownService {
    options: Options,
}

impl MarkdownService {
    /// Create a new markdown service
    pub fn new() -> Self {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_TASKLISTS);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        Self { options }
    }

    /// Render markdown to HTML. Raw HTML in the source is shown as text.
    pub fn render(&self, content: &str) -> String {
        let events = Parser::new_ext(content, self.options).map(|ev| match ev {
            Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(CowStr::from(raw.into_string())),
            other => other,
        });

        let mut out = String::with_capacity(content.len() * 3 / 2);
        html::push_html(&mut out, events);
        debug!("Rendered {} bytes of markdown into {} bytes of HTML", content.len(), out.len());
        out
    }
}

impl Default for MarkdownService {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_basic_markdown() {
        let html = MarkdownService::new().render("# Squirrels\n\nThey are *great*.");
        assert!(html.contains("<h1>Squirrels</h1>"));
        assert!(html.contains("<em>great</em>"));
    }

    #[test]
    fn raw_html_is_escaped() {
        let html = MarkdownService::new().render("<script>alert(1)</script>");
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }
}
