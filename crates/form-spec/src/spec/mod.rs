pub mod condition;
pub mod field;
pub mod form;
pub mod row;

mod serde_helpers;

pub use condition::{Condition, ConditionAction, ConditionLogic, Rule, RuleOperator};
pub use field::{ChoiceField, Field, FieldKind, FieldType, InputField, LayoutContent};
pub use form::{FormDocument, PdfSettings};
pub use row::{Columns, Row};
