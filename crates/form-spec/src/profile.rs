use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::answers::AnswerMap;
use crate::error::LayoutError;
use crate::estimate::{HeightMetrics, MonospaceMeasurer, TypeAwareEstimator};
use crate::layout::build_layout_rows;
use crate::paginate::{
    FooterSpec, Page, PageSetup, PaginationStrategy, Paginator, ReactiveThresholds,
};
use crate::spec::FormDocument;

/// A4 width less 20 mm side margins.
const PDF_CONTENT_WIDTH: f64 = 170.0;
/// A4 width at 96 dpi less 48 px side margins.
const PREVIEW_CONTENT_WIDTH: f64 = 698.0;

/// Which output a pagination run feeds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RenderProfile {
    /// Filled submission export: visible fields only, predictive breaks, millimetres.
    #[default]
    Pdf,
    /// Printable empty template: every field, reactive breaks, millimetres.
    BlankPdf,
    /// On-screen page preview in pixels.
    Preview,
}

impl RenderProfile {
    pub fn as_str(&self) -> &'static str {
        match self {
            RenderProfile::Pdf => "pdf",
            RenderProfile::BlankPdf => "blank-pdf",
            RenderProfile::Preview => "preview",
        }
    }

    fn default_page(&self) -> PageSetup {
        match self {
            RenderProfile::Preview => PageSetup::screen_pixels(),
            _ => PageSetup::a4_millimeters(),
        }
    }

    fn metrics(&self) -> (HeightMetrics, MonospaceMeasurer, f64) {
        match self {
            RenderProfile::Preview => (
                HeightMetrics::screen_pixels(),
                MonospaceMeasurer::pixels(),
                PREVIEW_CONTENT_WIDTH,
            ),
            _ => (
                HeightMetrics::pdf_millimeters(),
                MonospaceMeasurer::millimeters(),
                PDF_CONTENT_WIDTH,
            ),
        }
    }
}

/// Pagination settings accepted from config files and the component facade.
///
/// Unset page metrics and widths fall back to the profile's unit. The first
/// page header height is always derived from the form's PDF settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PaginationConfig {
    pub profile: RenderProfile,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<PageSetup>,
    pub reactive: ReactiveThresholds,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_width: Option<f64>,
}

impl PaginationConfig {
    pub fn for_profile(profile: RenderProfile) -> Self {
        Self {
            profile,
            ..Self::default()
        }
    }
}

/// Lays out and paginates a whole form the way the chosen profile renders it.
pub fn paginate_form(
    form: &FormDocument,
    answers: &AnswerMap,
    config: &PaginationConfig,
) -> Result<Vec<Page>, LayoutError> {
    let profile = config.profile;
    let blank = profile == RenderProfile::BlankPdf;
    let (metrics, measurer, default_width) = profile.metrics();

    let rows = build_layout_rows(&form.fields, Some(&form.rows), answers, !blank);

    let setup = config
        .page
        .unwrap_or_else(|| profile.default_page())
        .with_header_height(metrics.header_height(&form.pdf));
    let mut estimator = TypeAwareEstimator::new(
        metrics,
        measurer,
        config.content_width.unwrap_or(default_width),
    );
    if !blank {
        estimator = estimator.with_answers(answers);
    }
    let geometry = setup.geometry(estimator);

    let strategy = if blank {
        PaginationStrategy::Reactive(config.reactive.above_usable_bottom(setup.footer_reserve))
    } else {
        PaginationStrategy::Predictive
    };
    let footer = FooterSpec {
        page_numbers: form.pdf.show_page_numbers,
        text: form.pdf.footer_text.clone(),
    };

    debug!(form = %form.id, profile = profile.as_str(), rows = rows.len(), "paginating form");
    Paginator::new(&geometry, strategy)?
        .with_footer(&footer)?
        .paginate(&rows)
}
