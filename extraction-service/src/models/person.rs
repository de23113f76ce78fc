//! The identity record the vision model is asked to produce.
//!
//! [`PERSON_SCHEMA`] is what goes over the wire as the structured-output
//! constraint. [`Person`] is the typed mirror of the same shape, used only to
//! check whether a model response actually conforms.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocType {
    Passport,
    DriversLicense,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    // Personal info
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub middle_name: Option<String>,
    pub dob: NaiveDate,

    // Document info
    pub doc_type: DocType,
    pub doc_number: String,
    pub expiry: NaiveDate,

    // Address
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    pub country: String,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub state: Option<String>,

    // Passport-specific, but nothing stops a model filling them for a licence.
    #[serde(default)]
    pub place_of_birth: Option<String>,
    #[serde(default)]
    pub issuing_authority: Option<String>,
}

impl Person {
    /// Parse a raw model response. Used for diagnostics only; callers always
    /// receive the raw text.
    pub fn parse(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}

fn required_string(title: &str) -> Value {
    json!({ "title": title, "type": "string" })
}

fn optional_string(title: &str) -> Value {
    json!({
        "anyOf": [{ "type": "string" }, { "type": "null" }],
        "default": null,
        "title": title
    })
}

fn date(title: &str) -> Value {
    json!({ "format": "date", "title": title, "type": "string" })
}

/// JSON schema for [`Person`], built once per process.
pub static PERSON_SCHEMA: Lazy<Value> = Lazy::new(|| {
    json!({
        "title": "Person",
        "type": "object",
        "properties": {
            "first_name": required_string("First Name"),
            "last_name": required_string("Last Name"),
            "middle_name": optional_string("Middle Name"),
            "dob": date("Dob"),
            "doc_type": {
                "enum": ["passport", "drivers_license"],
                "title": "Doc Type",
                "type": "string"
            },
            "doc_number": required_string("Doc Number"),
            "expiry": date("Expiry"),
            "address": optional_string("Address"),
            "city": optional_string("City"),
            "country": required_string("Country"),
            "postal_code": optional_string("Postal Code"),
            "state": optional_string("State"),
            "place_of_birth": optional_string("Place Of Birth"),
            "issuing_authority": optional_string("Issuing Authority")
        },
        "required": [
            "first_name",
            "last_name",
            "dob",
            "doc_type",
            "doc_number",
            "expiry",
            "country"
        ]
    })
});
