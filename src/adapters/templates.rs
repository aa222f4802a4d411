use crate::core::hooks::DirectoryFilter;
use crate::domain::ports::{TemplateContext, TemplateRenderer};
use crate::utils::error::{GiftEmailError, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use tera::{Context, Tera};

pub const DEFAULT_TEMPLATE_DIRECTORY: &str = "default";

/// Renders tera templates from `root/<directory>/<template>`.
///
/// Templates are read on every render so host overrides on disk take effect
/// without a restart. Names ending in `.html` are autoescaped; plain-text
/// templates are not. Referencing a variable missing from the context is a
/// render error.
pub struct FileTemplateRenderer {
    root: PathBuf,
    default_directory: String,
    resolver: Option<DirectoryFilter>,
}

impl FileTemplateRenderer {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            default_directory: DEFAULT_TEMPLATE_DIRECTORY.to_string(),
            resolver: None,
        }
    }

    pub fn with_directory_resolver(mut self, resolver: DirectoryFilter) -> Self {
        self.resolver = Some(resolver);
        self
    }

    pub fn template_path(&self, template: &str) -> PathBuf {
        let directory = match &self.resolver {
            Some(resolve) => resolve(self.default_directory.as_str(), template),
            None => self.default_directory.clone(),
        };
        self.root.join(directory).join(template)
    }
}

#[async_trait]
impl TemplateRenderer for FileTemplateRenderer {
    async fn render(&self, template: &str, context: &TemplateContext) -> Result<String> {
        let path = self.template_path(template);
        tracing::debug!("Rendering template {}", path.display());

        let source = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| template_error(template, format!("{}: {}", path.display(), e)))?;

        render_source(template, &source, context)
    }
}

/// Renders `source` registered under `name`; the name's extension decides
/// whether output is HTML-escaped.
pub fn render_source(name: &str, source: &str, context: &TemplateContext) -> Result<String> {
    let mut engine = Tera::default();
    engine
        .add_raw_template(name, source)
        .map_err(|e| template_error(name, describe(&e)))?;

    let mut tera_context = Context::new();
    for (key, value) in context {
        tera_context.insert(key.as_str(), value);
    }

    engine
        .render(name, &tera_context)
        .map_err(|e| template_error(name, describe(&e)))
}

fn template_error(template: &str, message: String) -> GiftEmailError {
    GiftEmailError::TemplateError {
        template: template.to_string(),
        message,
    }
}

// tera keeps the useful part of the message in the source chain.
fn describe(error: &tera::Error) -> String {
    use std::error::Error;

    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::manager::gift_template_directory;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn context() -> TemplateContext {
        let mut context = TemplateContext::new();
        context.insert("email_heading".to_string(), "Gift <Order>".to_string());
        context.insert("order_number".to_string(), "1042".to_string());
        context
    }

    #[test]
    fn test_html_templates_are_escaped() {
        let source = "{{email_heading}} #{{ order_number }}!";
        assert_eq!(
            render_source("emails/gift-order.txt", source, &context()).unwrap(),
            "Gift <Order> #1042!"
        );
        assert_eq!(
            render_source("emails/gift-order.html", source, &context()).unwrap(),
            "Gift &lt;Order&gt; #1042!"
        );
    }

    #[test]
    fn test_unknown_variable_is_template_error() {
        let result = render_source("emails/gift-order.txt", "{{ missing }}", &context());
        match result {
            Err(GiftEmailError::TemplateError { template, .. }) => {
                assert_eq!(template, "emails/gift-order.txt");
            }
            other => panic!("expected template error, got {:?}", other),
        }
    }

    #[test]
    fn test_syntax_error_is_template_error() {
        let result = render_source("emails/gift-order.html", "{% if %}", &context());
        assert!(matches!(result, Err(GiftEmailError::TemplateError { .. })));
    }

    #[tokio::test]
    async fn test_render_uses_resolved_directory() {
        let root = TempDir::new().unwrap();
        let dir = root.path().join("gift-order/emails");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("gift-order.html"), "<h1>{{ email_heading }}</h1>").unwrap();

        let renderer = FileTemplateRenderer::new(root.path())
            .with_directory_resolver(Arc::new(gift_template_directory));

        let html = renderer
            .render("emails/gift-order.html", &context())
            .await
            .unwrap();
        assert_eq!(html, "<h1>Gift &lt;Order&gt;</h1>");
    }

    #[tokio::test]
    async fn test_shipped_templates_render() {
        let renderer = FileTemplateRenderer::new(concat!(env!("CARGO_MANIFEST_DIR"), "/templates"))
            .with_directory_resolver(Arc::new(gift_template_directory));
        let mut context = context();
        context.insert("order_date".to_string(), "January 5, 2024".to_string());
        context.insert("recipient".to_string(), "gift@example.com".to_string());

        let html = renderer
            .render("emails/gift-order.html", &context)
            .await
            .unwrap();
        assert!(html.contains("<h1>Gift &lt;Order&gt;</h1>"));
        assert!(html.contains("Order #1042 was placed on January 5, 2024."));

        let text = renderer
            .render("emails/plain/gift-order.txt", &context)
            .await
            .unwrap();
        assert!(text.starts_with("= Gift <Order> ="));
    }

    #[tokio::test]
    async fn test_missing_template_is_template_error() {
        let root = TempDir::new().unwrap();
        let renderer = FileTemplateRenderer::new(root.path());

        assert_eq!(
            renderer.template_path("emails/gift-order.html"),
            root.path().join("default/emails/gift-order.html")
        );

        let result = renderer.render("emails/gift-order.html", &context()).await;
        assert!(matches!(result, Err(GiftEmailError::TemplateError { .. })));
    }
}
