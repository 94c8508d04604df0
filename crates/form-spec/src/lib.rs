#![allow(missing_docs)]

pub mod answers;
pub mod error;
pub mod estimate;
pub mod layout;
pub mod paginate;
pub mod profile;
pub mod render;
pub mod schema;
pub mod spec;
pub mod validate;
pub mod visibility;

pub use answers::{AnswerMap, coerce_to_string, display_value, is_blank, is_truthy};
pub use error::LayoutError;
pub use estimate::{HeightMetrics, MonospaceMeasurer, TextMeasurer, TypeAwareEstimator};
pub use layout::{build_layout_rows, determine_optimal_columns, import_template};
pub use paginate::{
    FooterSpec, Page, PageFooter, PageGeometry, PageSetup, PaginationStrategy, Paginator,
    ReactiveThresholds, RowHeightEstimator, column_max_height, paginate,
};
pub use profile::{PaginationConfig, RenderProfile, paginate_form};
pub use render::{
    RenderPayload, RenderStatus, build_render_payload, render_json_ui, render_text,
};
pub use schema::form_schema;
pub use spec::{
    Columns, Condition, ConditionAction, ConditionLogic, Field, FieldKind, FieldType, FormDocument,
    PdfSettings, Row, Rule, RuleOperator,
};
pub use validate::{ValidationError, ValidationResult, validate};
pub use visibility::{VisibilityMap, evaluate_rule, is_field_visible, resolve_visibility};
