use thiserror::Error;

/// Errors surfaced by the pagination entry points.
///
/// Visibility and layout never fail; only a broken page configuration does.
#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("invalid page geometry: {0}")]
    InvalidGeometry(String),
    #[error("invalid footer template: {0}")]
    FooterTemplate(#[from] Box<handlebars::TemplateError>),
    #[error("footer render failed: {0}")]
    FooterRender(#[from] Box<handlebars::RenderError>),
}

impl From<handlebars::TemplateError> for LayoutError {
    fn from(error: handlebars::TemplateError) -> Self {
        LayoutError::FooterTemplate(Box::new(error))
    }
}

impl From<handlebars::RenderError> for LayoutError {
    fn from(error: handlebars::RenderError) -> Self {
        LayoutError::FooterRender(Box::new(error))
    }
}
