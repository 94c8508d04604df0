use handlebars::{Handlebars, no_escape};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::LayoutError;

const FOOTER_TEMPLATE: &str = "footer";

fn default_true() -> bool {
    true
}

/// Footer options stamped once the page count is known.
///
/// `text` is a template; `{{page}}` and `{{total}}` are available to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FooterSpec {
    #[serde(default = "default_true")]
    pub page_numbers: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl Default for FooterSpec {
    fn default() -> Self {
        Self {
            page_numbers: true,
            text: None,
        }
    }
}

/// Footer stamped on a produced page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageFooter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Debug, Clone)]
pub(crate) struct FooterStamp {
    page_numbers: bool,
    text: Option<Handlebars<'static>>,
}

impl Default for FooterStamp {
    fn default() -> Self {
        Self {
            page_numbers: true,
            text: None,
        }
    }
}

impl FooterStamp {
    pub(crate) fn compile(spec: &FooterSpec) -> Result<Self, LayoutError> {
        let text = match spec.text.as_deref().map(str::trim) {
            Some(source) if !source.is_empty() => {
                let mut registry = Handlebars::new();
                registry.register_escape_fn(no_escape);
                registry.register_template_string(FOOTER_TEMPLATE, source)?;
                Some(registry)
            }
            _ => None,
        };
        Ok(Self {
            page_numbers: spec.page_numbers,
            text,
        })
    }

    pub(crate) fn stamp(&self, page: usize, total: usize) -> Result<PageFooter, LayoutError> {
        let page_label = self
            .page_numbers
            .then(|| format!("Page {page} of {total}"));
        let text = match &self.text {
            Some(registry) => Some(registry.render(
                FOOTER_TEMPLATE,
                &json!({ "page": page, "total": total }),
            )?),
            None => None,
        };
        Ok(PageFooter { page_label, text })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stamps_label_and_text() {
        let stamp = FooterStamp::compile(&FooterSpec {
            page_numbers: true,
            text: Some("Acme Ltd · {{page}}/{{total}}".into()),
        })
        .expect("compile");
        let footer = stamp.stamp(2, 5).expect("stamp");
        assert_eq!(footer.page_label.as_deref(), Some("Page 2 of 5"));
        assert_eq!(footer.text.as_deref(), Some("Acme Ltd · 2/5"));
    }

    #[test]
    fn blank_text_and_disabled_numbers() {
        let stamp = FooterStamp::compile(&FooterSpec {
            page_numbers: false,
            text: Some("   ".into()),
        })
        .expect("compile");
        assert_eq!(stamp.stamp(1, 1).expect("stamp"), PageFooter::default());
    }

    #[test]
    fn malformed_template_is_rejected() {
        let result = FooterStamp::compile(&FooterSpec {
            page_numbers: true,
            text: Some("{{#if page}}unclosed".into()),
        });
        assert!(matches!(result, Err(LayoutError::FooterTemplate(_))));
    }
}
