//! Resource descriptor model.
//!
//! These types mirror the JSON Resource Descriptor (JRD) document served to
//! clients. The same serde attributes drive both directions: YAML produced by
//! files and templates is decoded into them, and JSON is encoded from them.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Property map keyed by URI.
///
/// Values keep whatever JSON type the source document used.
pub type Properties = BTreeMap<String, serde_json::Value>;

/// A resolved resource descriptor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    /// The identifier that was looked up.
    ///
    /// Drivers overwrite this with the requested identifier after decoding.
    #[serde(default, deserialize_with = "scalar_string")]
    pub subject: String,

    /// Alternate identifiers for the same entity.
    #[serde(
        default,
        deserialize_with = "scalar_strings",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub aliases: Vec<String>,

    /// Properties describing the subject.
    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub properties: Properties,

    /// Typed links, in document order.
    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub links: Vec<Link>,
}

/// A typed link from the subject to another resource.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Link {
    /// Link relation type.
    pub rel: String,

    /// Media type of the target.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,

    /// Target URI.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,

    /// Human-readable titles.
    #[serde(
        default,
        deserialize_with = "scalar_strings",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub titles: Vec<String>,

    /// Properties describing the link.
    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub properties: Properties,
}

impl Resource {
    /// Create an empty resource for the given subject.
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            ..Default::default()
        }
    }
}

impl Link {
    /// Create a link with only a relation type.
    pub fn new(rel: impl Into<String>) -> Self {
        Self {
            rel: rel.into(),
            ..Default::default()
        }
    }

    /// Set the target URI.
    pub fn with_href(mut self, href: impl Into<String>) -> Self {
        self.href = Some(href.into());
        self
    }

    /// Set the media type.
    pub fn with_media_type(mut self, media_type: impl Into<String>) -> Self {
        self.media_type = Some(media_type.into());
        self
    }
}

/// Treat an explicit YAML `null` like a missing field.
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A scalar read where text is expected.
#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Unsigned(u64),
    Signed(i64),
    Float(f64),
    Bool(bool),
}

impl From<Scalar> for String {
    fn from(scalar: Scalar) -> Self {
        match scalar {
            Scalar::Text(s) => s,
            Scalar::Unsigned(n) => n.to_string(),
            Scalar::Signed(n) => n.to_string(),
            Scalar::Float(n) => n.to_string(),
            Scalar::Bool(b) => b.to_string(),
        }
    }
}

/// Accept any scalar as text; `null` reads as empty.
fn scalar_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Scalar>::deserialize(deserializer)?
        .map(String::from)
        .unwrap_or_default())
}

/// Accept a list of scalars as text; `null` reads as empty.
fn scalar_strings<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let scalars: Vec<Scalar> = nullable(deserializer)?;
    Ok(scalars.into_iter().map(String::from).collect())
}
