use std::fs;
use std::path::Path;

use log::{debug, info};

use crate::errors::WikiError;
use crate::types::{Page, Title};
use crate::utils::{escape_attr, escape_html};

const DEFAULT_LIST: &str = include_str!("../../tmpl/list.html");
const DEFAULT_VIEW: &str = include_str!("../../tmpl/view.html");
const DEFAULT_EDIT: &str = include_str!("../../tmpl/edit.html");

/// Component filling the `list`, `view` and `edit` HTML templates.
///
/// Templates contain `{{SLOT}}` placeholders. Filling fails when a template
/// names a slot the page does not provide.
#[derive(Debug, Clone)]
pub struct TemplateComponent {
    list: String,
    view: String,
    edit: String,
}

impl TemplateComponent {
    /// Create a template component from the built-in templates
    pub fn new() -> Self {
        Self {
            list: DEFAULT_LIST.to_string(),
            view: DEFAULT_VIEW.to_string(),
            edit: DEFAULT_EDIT.to_string(),
        }
    }

    /// Load `list.html`, `view.html` and `edit.html` from `dir`,
    /// keeping the built-in version of any file that cannot be read
    pub fn load(dir: &Path) -> Self {
        Self {
            list: load_or_default(dir, "list", DEFAULT_LIST),
            view: load_or_default(dir, "view", DEFAULT_VIEW),
            edit: load_or_default(dir, "edit", DEFAULT_EDIT),
        }
    }

    /// Create a template component from explicit template sources
    pub fn from_sources(list: &str, view: &str, edit: &str) -> Self {
        Self { list: list.to_string(), view: view.to_string(), edit: edit.to_string() }
    }

    /// Render the index of known pages
    pub fn render_list(&self, pages: &[Page]) -> Result<String, WikiError> {
        let mut items = String::new();
        for page in pages {
            items.push_str(&format!(
                "  <li><a href=\"/view/{}\">{}</a></li>\n",
                escape_attr(page.title.as_str()),
                escape_html(page.title.as_str())
            ));
        }
        let count = pages.len().to_string();
        fill("list", &self.list, &[("PAGES", items.as_str()), ("COUNT", count.as_str())])
    }

    /// Render a page view. `content` is trusted markup and is not escaped again.
    pub fn render_view(
        &self,
        title: &Title,
        content: &str,
        meta: &str,
    ) -> Result<String, WikiError> {
        let title = escape_html(title.as_str());
        fill(
            "view",
            &self.view,
            &[("TITLE", title.as_str()), ("CONTENT", content), ("META", meta)],
        )
    }

    /// Render the edit form with the raw body escaped into the text area
    pub fn render_edit(&self, page: &Page) -> Result<String, WikiError> {
        let title = escape_html(page.title.as_str());
        let body = escape_html(&page.body_text());
        fill("edit", &self.edit, &[("TITLE", title.as_str()), ("BODY", body.as_str())])
    }
}

impl Default for TemplateComponent {
    fn default() -> Self {
        Self::new()
    }
}

fn load_or_default(dir: &Path, name: &str, fallback: &str) -> String {
    let path = dir.join(format!("{}.html", name));
    match fs::read_to_string(&path) {
        Ok(source) => {
            info!("Loaded template '{}' from {:?}", name, path);
            source
        }
        Err(e) => {
            debug!("Using built-in '{}' template ({:?}: {})", name, path, e);
            fallback.to_string()
        }
    }
}

/// Replace each `{{SLOT}}` with its value. Values are inserted verbatim and
/// are not scanned for further placeholders.
fn fill(name: &str, template: &str, slots: &[(&str, &str)]) -> Result<String, WikiError> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let end = after.find("}}").ok_or_else(|| {
            WikiError::Render(format!("{}: unterminated placeholder", name))
        })?;
        let key = after[..end].trim();
        let value = slots
            .iter()
            .find(|(slot, _)| *slot == key)
            .map(|(_, value)| *value)
            .ok_or_else(|| WikiError::Render(format!("{}: no slot named {:?}", name, key)))?;
        out.push_str(value);
        rest = &after[end + 2..];
    }
    out.push_str(rest);
    Ok(out)
}
