use serde::{Deserialize, Serialize};

use crate::error::LayoutError;
use crate::spec::{Field, Row};

/// Estimates how much vertical space a row occupies, in the unit of the page heights.
pub trait RowHeightEstimator {
    fn row_height(&self, row: &Row) -> f64;
}

impl<F> RowHeightEstimator for F
where
    F: Fn(&Row) -> f64,
{
    fn row_height(&self, row: &Row) -> f64 {
        self(row)
    }
}

/// Height of a row whose columns render side by side.
///
/// Layout pseudo-fields span every column and stack; the remaining fields are
/// dealt into the row's columns in order. The row advances by the spanning
/// height plus the tallest column, never the sum of the columns.
pub fn column_max_height<H>(row: &Row, mut field_height: H) -> f64
where
    H: FnMut(&Field) -> f64,
{
    let mut spanning = 0.0;
    let width = row.columns.count();
    let mut columns = vec![0.0_f64; width];
    let mut slot = 0;

    for field in &row.fields {
        let height = field_height(field);
        if field.is_layout() {
            spanning += height;
        } else {
            columns[slot % width] += height;
            slot += 1;
        }
    }

    spanning + columns.into_iter().fold(0.0, f64::max)
}

/// Usable content height per page plus the row estimator measuring in the same unit.
#[derive(Debug, Clone)]
pub struct PageGeometry<E> {
    pub usable_height_first_page: f64,
    pub usable_height_other_page: f64,
    pub estimator: E,
}

impl<E: RowHeightEstimator> PageGeometry<E> {
    pub fn new(usable_height_first_page: f64, usable_height_other_page: f64, estimator: E) -> Self {
        Self {
            usable_height_first_page,
            usable_height_other_page,
            estimator,
        }
    }

    pub(crate) fn usable_height(&self, page_number: usize) -> f64 {
        if page_number == 1 {
            self.usable_height_first_page
        } else {
            self.usable_height_other_page
        }
    }

    pub(crate) fn check(&self) -> Result<(), LayoutError> {
        ensure_positive("usable_height_first_page", self.usable_height_first_page)?;
        ensure_positive("usable_height_other_page", self.usable_height_other_page)
    }
}

fn ensure_positive(name: &str, value: f64) -> Result<(), LayoutError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(LayoutError::InvalidGeometry(format!(
            "{name} must be a positive finite number, got {value}"
        )))
    }
}

pub(crate) fn ensure_non_negative(name: &str, value: f64) -> Result<(), LayoutError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(LayoutError::InvalidGeometry(format!(
            "{name} must be a non-negative finite number, got {value}"
        )))
    }
}

/// Physical page metrics from which usable heights are derived.
///
/// Content starts below `margin_top` and stops `footer_reserve` above the page
/// bottom; page one additionally loses `header_height` to the header block.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PageSetup {
    pub page_height: f64,
    pub margin_top: f64,
    pub footer_reserve: f64,
    pub header_height: f64,
}

impl Default for PageSetup {
    fn default() -> Self {
        Self::a4_millimeters()
    }
}

impl PageSetup {
    pub fn a4_millimeters() -> Self {
        Self {
            page_height: 297.0,
            margin_top: 20.0,
            footer_reserve: 25.0,
            header_height: 0.0,
        }
    }

    /// A4 at 96 dpi.
    pub fn screen_pixels() -> Self {
        Self {
            page_height: 1123.0,
            margin_top: 48.0,
            footer_reserve: 64.0,
            header_height: 0.0,
        }
    }

    pub fn with_header_height(mut self, header_height: f64) -> Self {
        self.header_height = header_height;
        self
    }

    pub fn usable_height_other_page(&self) -> f64 {
        self.page_height - self.margin_top - self.footer_reserve
    }

    pub fn usable_height_first_page(&self) -> f64 {
        self.usable_height_other_page() - self.header_height
    }

    pub fn geometry<E: RowHeightEstimator>(&self, estimator: E) -> PageGeometry<E> {
        PageGeometry::new(
            self.usable_height_first_page(),
            self.usable_height_other_page(),
            estimator,
        )
    }
}
