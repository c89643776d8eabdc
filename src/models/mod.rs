use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Street address of a listing. Partial addresses are allowed.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Location {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zipcode: String,
}

/// Asking rates; any of them may be absent
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Rates {
    pub nightly: Option<u32>,
    pub weekly: Option<u32>,
    pub monthly: Option<u32>,
}

/// Contact details of whoever listed the property
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SellerInfo {
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// A listing that has been assembled but not stored yet
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewProperty {
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub description: String,
    pub location: Location,
    pub beds: Option<u32>,
    pub baths: Option<f32>,
    pub square_feet: Option<u32>,
    pub amenities: BTreeSet<String>,
    pub rates: Rates,
    pub seller_info: SellerInfo,
    pub images: Vec<String>,
    pub owner: String,
}

/// Core property data model, as stored and served
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Property {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub description: String,
    pub location: Location,
    pub beds: Option<u32>,
    pub baths: Option<f32>,
    pub square_feet: Option<u32>,
    pub amenities: BTreeSet<String>,
    pub rates: Rates,
    pub seller_info: SellerInfo,
    pub images: Vec<String>,
    pub owner: String,
    pub created_at: DateTime<Utc>,
}

impl Property {
    /// Attach the store-assigned id and creation time to an assembled listing.
    pub fn from_new(id: String, listing: NewProperty, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            kind: listing.kind,
            name: listing.name,
            description: listing.description,
            location: listing.location,
            beds: listing.beds,
            baths: listing.baths,
            square_feet: listing.square_feet,
            amenities: listing.amenities,
            rates: listing.rates,
            seller_info: listing.seller_info,
            images: listing.images,
            owner: listing.owner,
            created_at,
        }
    }
}

/// A signed-in account
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: String,
    pub email: String,
    pub username: String,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a [`User`]
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub username: String,
    pub image: Option<String>,
}
