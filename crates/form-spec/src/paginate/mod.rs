//! Packs layout rows into fixed-height pages.
//!
//! Two placement strategies share one entry point. The predictive strategy
//! estimates a row before placing it and breaks the page first when it would
//! not fit; it is used for filled submissions and the screen preview. The
//! reactive strategy only breaks once the cursor is already near the bottom,
//! tolerating a little overflow, and places layout pseudo-fields one at a time;
//! it is used for blank template exports.
//!
//! Footers need the final page count, so they are stamped in a second pass
//! after every row has been placed.

mod footer;
mod geometry;

pub use footer::{FooterSpec, PageFooter};
pub use geometry::{PageGeometry, PageSetup, RowHeightEstimator, column_max_height};

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::error::LayoutError;
use crate::spec::{Field, Row};
use footer::FooterStamp;
use geometry::ensure_non_negative;

/// Break tolerances of the reactive strategy.
///
/// Margins are read as distances up from the end of the content area. Values
/// given against the physical page bottom, as the defaults are, go through
/// [`ReactiveThresholds::above_usable_bottom`] first.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReactiveThresholds {
    /// A field group breaks only once the cursor is within this distance of the bottom
    /// and less than `min_remaining` is left.
    pub overflow_margin: f64,
    pub min_remaining: f64,
    /// Layout pseudo-fields break once the cursor is within this distance of the bottom.
    pub layout_margin: f64,
}

impl Default for ReactiveThresholds {
    fn default() -> Self {
        Self {
            overflow_margin: 50.0,
            min_remaining: 30.0,
            layout_margin: 45.0,
        }
    }
}

impl ReactiveThresholds {
    /// Shifts page-bottom margins up by the footer reserve so they apply to
    /// the content area. Margins never drop below zero.
    pub fn above_usable_bottom(&self, footer_reserve: f64) -> Self {
        let reserve = footer_reserve.max(0.0);
        Self {
            overflow_margin: (self.overflow_margin - reserve).max(0.0),
            min_remaining: self.min_remaining,
            layout_margin: (self.layout_margin - reserve).max(0.0),
        }
    }

    fn check(&self) -> Result<(), LayoutError> {
        ensure_non_negative("overflow_margin", self.overflow_margin)?;
        ensure_non_negative("min_remaining", self.min_remaining)?;
        ensure_non_negative("layout_margin", self.layout_margin)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum PaginationStrategy {
    #[default]
    Predictive,
    Reactive(ReactiveThresholds),
}

/// A produced page. Page numbers start at 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub page_number: usize,
    pub rows: Vec<Row>,
    pub used_height: f64,
    pub footer: PageFooter,
}

/// Paginates rows with the predictive strategy and page-number footers.
pub fn paginate<E: RowHeightEstimator>(
    rows: &[Row],
    geometry: &PageGeometry<E>,
) -> Result<Vec<Page>, LayoutError> {
    Paginator::new(geometry, PaginationStrategy::Predictive)?.paginate(rows)
}

#[derive(Debug, Clone)]
pub struct Paginator<'g, E> {
    geometry: &'g PageGeometry<E>,
    strategy: PaginationStrategy,
    footer: FooterStamp,
}

impl<'g, E: RowHeightEstimator> Paginator<'g, E> {
    /// Rejects geometry that could never hold content.
    pub fn new(
        geometry: &'g PageGeometry<E>,
        strategy: PaginationStrategy,
    ) -> Result<Self, LayoutError> {
        geometry.check()?;
        if let PaginationStrategy::Reactive(thresholds) = &strategy {
            thresholds.check()?;
        }
        Ok(Self {
            geometry,
            strategy,
            footer: FooterStamp::default(),
        })
    }

    pub fn with_footer(mut self, spec: &FooterSpec) -> Result<Self, LayoutError> {
        self.footer = FooterStamp::compile(spec)?;
        Ok(self)
    }

    /// Places every non-empty row, then stamps footers. Always yields at least one page.
    pub fn paginate(&self, rows: &[Row]) -> Result<Vec<Page>, LayoutError> {
        let contents = self.place_rows(rows);
        let total = contents.len();
        debug!(pages = total, rows = rows.len(), strategy = ?self.strategy, "paginated rows");

        contents
            .into_iter()
            .enumerate()
            .map(|(index, content)| {
                let page_number = index + 1;
                Ok(Page {
                    page_number,
                    rows: content.rows,
                    used_height: content.used_height,
                    footer: self.footer.stamp(page_number, total)?,
                })
            })
            .collect()
    }

    fn place_rows(&self, rows: &[Row]) -> Vec<PageContent> {
        let mut run = PageRun::new(self.geometry);
        for (index, row) in rows.iter().enumerate() {
            if row.is_empty() {
                trace!(row = %row.id, "skipping empty row");
                continue;
            }
            match self.strategy {
                PaginationStrategy::Predictive => self.place_predictive(&mut run, index, row),
                PaginationStrategy::Reactive(thresholds) => {
                    self.place_reactive(&mut run, index, row, &thresholds)
                }
            }
        }
        run.finish()
    }

    fn place_predictive(&self, run: &mut PageRun<'_, E>, index: usize, row: &Row) {
        let height = self.estimate(row);
        if run.cursor.y + height > run.cursor.capacity && !run.cursor.is_empty() {
            run.break_page();
        }
        run.cursor.place(index, row.clone(), height);
    }

    fn place_reactive(
        &self,
        run: &mut PageRun<'_, E>,
        index: usize,
        row: &Row,
        thresholds: &ReactiveThresholds,
    ) {
        for (spanning, fields) in segments(row) {
            let piece = Row::new(row.id.clone(), row.columns, fields);
            let cursor = &run.cursor;
            let near_bottom = if spanning {
                cursor.y > cursor.capacity - thresholds.layout_margin
            } else {
                cursor.y > cursor.capacity - thresholds.overflow_margin
                    && cursor.remaining() < thresholds.min_remaining
            };
            if near_bottom && !cursor.is_empty() {
                run.break_page();
            }
            let height = self.estimate(&piece);
            run.cursor.place(index, piece, height);
        }
    }

    fn estimate(&self, row: &Row) -> f64 {
        let height = self.geometry.estimator.row_height(row);
        if height.is_finite() && height >= 0.0 {
            height
        } else {
            warn!(row = %row.id, height, "ignoring invalid row height estimate");
            0.0
        }
    }
}

/// Splits a row into spanning layout fields and runs of column fields, in order.
fn segments(row: &Row) -> Vec<(bool, Vec<Field>)> {
    let mut segments: Vec<(bool, Vec<Field>)> = Vec::new();
    for field in &row.fields {
        if field.is_layout() {
            segments.push((true, vec![field.clone()]));
            continue;
        }
        match segments.last_mut() {
            Some((false, group)) => group.push(field.clone()),
            _ => segments.push((false, vec![field.clone()])),
        }
    }
    segments
}

struct PageContent {
    rows: Vec<Row>,
    used_height: f64,
}

struct PageCursor {
    page_number: usize,
    capacity: f64,
    y: f64,
    rows: Vec<Row>,
    last_source: Option<usize>,
}

impl PageCursor {
    fn open<E: RowHeightEstimator>(page_number: usize, geometry: &PageGeometry<E>) -> Self {
        Self {
            page_number,
            capacity: geometry.usable_height(page_number),
            y: 0.0,
            rows: Vec::new(),
            last_source: None,
        }
    }

    fn remaining(&self) -> f64 {
        self.capacity - self.y
    }

    fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Pieces of the same source row placed back to back merge into one row.
    fn place(&mut self, source: usize, row: Row, height: f64) {
        match self.rows.last_mut() {
            Some(existing) if self.last_source == Some(source) => existing.fields.extend(row.fields),
            _ => self.rows.push(row),
        }
        self.last_source = Some(source);
        self.y += height;
    }

    fn finish(self) -> PageContent {
        PageContent {
            rows: self.rows,
            used_height: self.y,
        }
    }
}

struct PageRun<'a, E> {
    geometry: &'a PageGeometry<E>,
    pages: Vec<PageContent>,
    cursor: PageCursor,
}

impl<'a, E: RowHeightEstimator> PageRun<'a, E> {
    fn new(geometry: &'a PageGeometry<E>) -> Self {
        Self {
            geometry,
            pages: Vec::new(),
            cursor: PageCursor::open(1, geometry),
        }
    }

    fn break_page(&mut self) {
        let next = PageCursor::open(self.cursor.page_number + 1, self.geometry);
        let done = std::mem::replace(&mut self.cursor, next);
        trace!(page = done.page_number, used = done.y, "page break");
        self.pages.push(done.finish());
    }

    fn finish(mut self) -> Vec<PageContent> {
        self.pages.push(self.cursor.finish());
        self.pages
    }
}
