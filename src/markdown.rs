use async_trait::async_trait;
use comrak::{markdown_to_html, Options};

/// Turns story markdown into html.
///
/// `None` means the renderer could not produce html for this input; callers
/// treat it as terminal for the request.
#[async_trait]
pub trait MarkdownRenderer: Send + Sync {
    async fn render(&self, markdown: &str) -> Option<String>;
}

/// GitHub-flavoured rendering without a network round trip.
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalMarkdown;

impl LocalMarkdown {
    pub fn new() -> Self {
        LocalMarkdown
    }
}

#[async_trait]
impl MarkdownRenderer for LocalMarkdown {
    async fn render(&self, markdown: &str) -> Option<String> {
        let mut options = Options::default();
        options.extension.strikethrough = true;
        options.extension.table = true;
        options.extension.autolink = true;
        options.extension.tasklist = true;
        options.extension.tagfilter = true;
        Some(markdown_to_html(markdown, &options))
    }
}
