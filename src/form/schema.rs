//! Field schema for the property submission form.
//!
//! Browsers send nested fields flattened with dots (`location.city`,
//! `rates.nightly`). Decoding puts every recognized part into a JSON tree
//! at its dotted path and then deserializes the tree, so the nesting lives
//! in one table instead of in per-field lookups.

use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::{BTreeSet, HashSet};
use tracing::{debug, warn};

use crate::form::{Attachment, DecodeError, FormValue, RawForm, UnknownFieldPolicy};
use crate::models::{Location, SellerInfo};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// First value wins; missing means empty string
    Scalar,
    /// Every value is collected
    Repeated,
    /// File parts, kept out of the JSON tree
    Files,
}

#[derive(Debug)]
pub struct FieldSpec {
    pub path: &'static str,
    pub aliases: &'static [&'static str],
    pub kind: FieldKind,
}

const fn scalar(path: &'static str, aliases: &'static [&'static str]) -> FieldSpec {
    FieldSpec {
        path,
        aliases,
        kind: FieldKind::Scalar,
    }
}

pub const PROPERTY_FIELDS: &[FieldSpec] = &[
    scalar("type", &[]),
    scalar("name", &[]),
    scalar("description", &[]),
    scalar("location.street", &[]),
    scalar("location.city", &[]),
    scalar("location.state", &[]),
    scalar("location.zipcode", &[]),
    scalar("beds", &[]),
    scalar("baths", &[]),
    scalar("square_feet", &["squareFeet"]),
    FieldSpec {
        path: "amenities",
        aliases: &[],
        kind: FieldKind::Repeated,
    },
    scalar("rates.nightly", &[]),
    scalar("rates.weekly", &[]),
    scalar("rates.monthly", &[]),
    scalar("seller_info.name", &["sellerInfo.name"]),
    scalar("seller_info.email", &["sellerInfo.email"]),
    scalar("seller_info.phone", &["sellerInfo.phone"]),
    FieldSpec {
        path: "images",
        aliases: &[],
        kind: FieldKind::Files,
    },
];

/// Look up the schema entry for a form key, by canonical path or alias.
pub fn lookup(key: &str) -> Option<&'static FieldSpec> {
    PROPERTY_FIELDS
        .iter()
        .find(|spec| spec.path == key || spec.aliases.contains(&key))
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct CandidateRates {
    pub nightly: String,
    pub weekly: String,
    pub monthly: String,
}

/// Submitted fields, uncoerced. Numbers are still strings here.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct CandidateFields {
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub description: String,
    pub location: Location,
    pub beds: String,
    pub baths: String,
    pub square_feet: String,
    pub amenities: BTreeSet<String>,
    pub rates: CandidateRates,
    pub seller_info: SellerInfo,
    /// Non-empty image attachments, in submission order
    #[serde(skip)]
    pub images: Vec<Attachment>,
}

/// Decode a raw submission into candidate fields.
///
/// Image parts with an empty filename are the browser's "no file selected"
/// placeholder and are dropped.
pub fn decode(form: RawForm, policy: UnknownFieldPolicy) -> Result<CandidateFields, DecodeError> {
    let mut root = Map::new();
    for spec in PROPERTY_FIELDS {
        match spec.kind {
            FieldKind::Scalar => *slot(&mut root, spec.path) = Value::String(String::new()),
            FieldKind::Repeated => *slot(&mut root, spec.path) = Value::Array(Vec::new()),
            FieldKind::Files => {}
        }
    }

    let mut filled = HashSet::new();
    let mut images = Vec::new();

    for (key, value) in form.parts {
        let Some(spec) = lookup(&key) else {
            match policy {
                UnknownFieldPolicy::Reject => return Err(DecodeError::UnknownField(key)),
                UnknownFieldPolicy::Ignore => {
                    debug!(field = %key, "Ignoring unrecognized form field");
                    continue;
                }
            }
        };

        match (spec.kind, value) {
            (FieldKind::Scalar, FormValue::Text(text)) => {
                if filled.insert(spec.path) {
                    *slot(&mut root, spec.path) = Value::String(text);
                }
            }
            (FieldKind::Repeated, FormValue::Text(text)) => {
                if let Value::Array(items) = slot(&mut root, spec.path) {
                    items.push(Value::String(text));
                }
            }
            (FieldKind::Files, FormValue::File(attachment)) => {
                if !attachment.filename.is_empty() {
                    images.push(attachment);
                }
            }
            (kind, _) => {
                warn!(field = %key, ?kind, "Ignoring form part of the wrong kind");
            }
        }
    }

    let mut fields: CandidateFields = serde_json::from_value(Value::Object(root))?;
    fields.images = images;
    Ok(fields)
}

/// Walk `path` through nested objects under `root`, creating them as needed,
/// and return the leaf slot.
fn slot<'a>(root: &'a mut Map<String, Value>, path: &str) -> &'a mut Value {
    let mut segments = path.split('.');
    let first = segments.next().unwrap_or_default();
    let mut current = root.entry(first.to_string()).or_insert(Value::Null);

    for segment in segments {
        if !current.is_object() {
            *current = Value::Object(Map::new());
        }
        if let Value::Object(map) = current {
            current = map.entry(segment.to_string()).or_insert(Value::Null);
        }
    }

    current
}
