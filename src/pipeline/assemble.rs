use std::str::FromStr;

use crate::form::CandidateFields;
use crate::models::{NewProperty, Rates};

/// Why a submission could not become a listing
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RejectedInput {
    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    #[error("field `{field}` is not a valid number: `{value}`")]
    InvalidNumber { field: &'static str, value: String },
}

/// Build a storable listing from decoded fields, uploaded image URLs and the
/// authenticated owner.
///
/// `type`, `name` and `owner` must be non-blank. Numeric fields are parsed
/// here; blank means absent. Nothing is returned on rejection.
pub fn assemble(
    candidate: CandidateFields,
    image_urls: Vec<String>,
    owner: &str,
) -> Result<NewProperty, RejectedInput> {
    let kind = required("type", &candidate.kind)?;
    let name = required("name", &candidate.name)?;
    let owner = required("owner", owner)?;

    let amenities = candidate
        .amenities
        .into_iter()
        .filter(|a| !a.trim().is_empty())
        .collect();

    Ok(NewProperty {
        kind,
        name,
        description: candidate.description,
        location: candidate.location,
        beds: number("beds", &candidate.beds)?,
        baths: measure("baths", &candidate.baths)?,
        square_feet: number("square_feet", &candidate.square_feet)?,
        amenities,
        rates: Rates {
            nightly: number("rates.nightly", &candidate.rates.nightly)?,
            weekly: number("rates.weekly", &candidate.rates.weekly)?,
            monthly: number("rates.monthly", &candidate.rates.monthly)?,
        },
        seller_info: candidate.seller_info,
        images: image_urls,
        owner,
    })
}

fn required(field: &'static str, value: &str) -> Result<String, RejectedInput> {
    let value = value.trim();
    if value.is_empty() {
        return Err(RejectedInput::MissingField(field));
    }
    Ok(value.to_string())
}

fn number<T: FromStr>(field: &'static str, raw: &str) -> Result<Option<T>, RejectedInput> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }

    raw.parse().map(Some).map_err(|_| RejectedInput::InvalidNumber {
        field,
        value: raw.to_string(),
    })
}

/// Like [`number`], for fractional counts: only finite, non-negative values.
fn measure(field: &'static str, raw: &str) -> Result<Option<f32>, RejectedInput> {
    match number::<f32>(field, raw)? {
        Some(value) if !value.is_finite() || value < 0.0 => Err(RejectedInput::InvalidNumber {
            field,
            value: raw.trim().to_string(),
        }),
        parsed => Ok(parsed),
    }
}
