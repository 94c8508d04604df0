use serde_json::Value;

use crate::spec::FormDocument;

/// JSON schema of the persisted form document.
pub fn form_schema() -> Value {
    schemars::schema_for!(FormDocument).to_value()
}
