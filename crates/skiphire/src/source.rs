use crate::skip::{ImageUrl, SizeLabel, SkipId, SkipOption, yard_value};
use derive_more::{AsRef, Deref, Display, From, Into};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, Deref, From, Into, AsRef,
)]
#[serde(transparent)]
pub struct Postcode(String);

crate::impl_string_newtype!(Postcode);

#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, Deref, From, Into, AsRef,
)]
#[serde(transparent)]
pub struct Area(String);

crate::impl_string_newtype!(Area);

/// Request key for a skip listing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[display("{postcode}, {area}")]
pub struct Location {
    pub postcode: Postcode,
    pub area: Area,
}

impl Location {
    pub fn new(postcode: impl Into<String>, area: impl Into<String>) -> Self {
        Self {
            postcode: Postcode::new(postcode),
            area: Area::new(area),
        }
    }
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Server returned {status} for {url}")]
    Status { status: u16, url: String },
    #[error("Could not parse skip list: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Malformed skip record #{index}: {reason}")]
    Malformed { index: usize, reason: String },
}

impl FetchError {
    /// Error text without the request URL, for URLs that carry credentials.
    pub fn redacted(&self) -> String {
        match self {
            Self::Network(e) if e.is_timeout() => "request timed out".to_string(),
            Self::Network(e) if e.is_connect() => "connection failed".to_string(),
            Self::Network(_) => "network error".to_string(),
            Self::Status { status, .. } => format!("server returned {status}"),
            Self::Parse(_) | Self::Malformed { .. } => self.to_string(),
        }
    }
}

/// Anything that can list the skips offered at a location.
pub trait SkipSource {
    fn fetch(
        &self,
        location: &Location,
    ) -> impl Future<Output = Result<Vec<SkipOption>, FetchError>> + Send;
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawScalar {
    Text(String),
    Number(serde_json::Number),
}

#[derive(Debug, Deserialize)]
struct RawSkip {
    id: Option<RawScalar>,
    size: Option<RawScalar>,
    price: Option<f64>,
    price_before_vat: Option<f64>,
    vat: Option<f64>,
    #[serde(rename = "imageUrl", alias = "image_url")]
    image_url: Option<String>,
    #[serde(rename = "roadLegal", alias = "allowed_on_road")]
    road_legal: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawBody {
    Wrapped { skips: Vec<RawSkip> },
    Bare(Vec<RawSkip>),
}

impl RawBody {
    fn into_records(self) -> Vec<RawSkip> {
        match self {
            RawBody::Wrapped { skips } => skips,
            RawBody::Bare(skips) => skips,
        }
    }
}

/// Turns upstream skip records into [`SkipOption`]s.
///
/// Accepts both `{"skips": [...]}` and a bare array. Any malformed record
/// rejects the whole body so callers never see a partial list.
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    /// URL pattern for records without an image; `{size}` becomes the yard value.
    pub image_url_template: Option<String>,
}

impl Normalizer {
    pub fn new(image_url_template: Option<String>) -> Self {
        Self { image_url_template }
    }

    pub fn normalize(&self, body: &[u8]) -> Result<Vec<SkipOption>, FetchError> {
        let records = serde_json::from_slice::<RawBody>(body)?.into_records();
        let mut seen = HashSet::with_capacity(records.len());

        records
            .into_iter()
            .enumerate()
            .map(|(index, raw)| {
                let skip = self.normalize_record(raw).map_err(|reason| FetchError::Malformed {
                    index,
                    reason: reason.to_string(),
                })?;
                if !seen.insert(skip.id.clone()) {
                    return Err(FetchError::Malformed {
                        index,
                        reason: format!("duplicate id '{}'", skip.id),
                    });
                }
                Ok(skip)
            })
            .collect()
    }

    fn normalize_record(&self, raw: RawSkip) -> Result<SkipOption, &'static str> {
        let id = match raw.id.ok_or("missing id")? {
            RawScalar::Text(s) => s.trim().to_string(),
            RawScalar::Number(n) => n.to_string(),
        };
        if id.is_empty() {
            return Err("empty id");
        }

        let size = match raw.size {
            Some(RawScalar::Text(s)) => s,
            Some(RawScalar::Number(n)) => format!("{n} Yards"),
            None => String::new(),
        };

        let price = match (raw.price, raw.price_before_vat) {
            (Some(price), _) => price,
            (None, Some(net)) => net * (1.0 + raw.vat.unwrap_or(0.0) / 100.0),
            (None, None) => return Err("missing price"),
        };
        if !price.is_finite() || price < 0.0 {
            return Err("price must be a non-negative number");
        }

        let image_url = raw
            .image_url
            .filter(|url| !url.is_empty())
            .or_else(|| {
                self.image_url_template
                    .as_ref()
                    .map(|t| t.replace("{size}", &yard_value(&size).to_string()))
            })
            .unwrap_or_default();

        Ok(SkipOption {
            id: SkipId::new(id),
            size: SizeLabel::new(size),
            price,
            image_url: ImageUrl::new(image_url),
            road_legal: raw.road_legal.unwrap_or(false),
        })
    }
}

/// [`SkipSource`] backed by the skip-hire HTTP API.
#[derive(Debug, Clone)]
pub struct HttpSkipSource {
    client: reqwest::Client,
    base_url: String,
    normalizer: Normalizer,
}

impl HttpSkipSource {
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        normalizer: Normalizer,
    ) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            normalizer,
        })
    }

    /// Raw GET through the same client, used for skip images and map tiles.
    pub async fn download(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(response.bytes().await?.to_vec())
    }
}

impl SkipSource for HttpSkipSource {
    async fn fetch(&self, location: &Location) -> Result<Vec<SkipOption>, FetchError> {
        log::debug!("Fetching skips for {}", location);
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("postcode", location.postcode.as_str()),
                ("area", location.area.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: response.url().to_string(),
            });
        }

        let body = response.bytes().await?;
        self.normalizer.normalize(&body)
    }
}
