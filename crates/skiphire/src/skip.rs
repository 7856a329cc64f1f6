use derive_more::{AsRef, Deref, Display, From, Into};
use serde::{Deserialize, Serialize};

#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, Deref, From, Into, AsRef,
)]
#[serde(transparent)]
pub struct SkipId(String);

crate::impl_string_newtype!(SkipId);

#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, Deref, From, Into, AsRef,
)]
#[serde(transparent)]
pub struct SizeLabel(String);

crate::impl_string_newtype!(SizeLabel);

impl SizeLabel {
    /// Yard value used for card scaling. See [`yard_value`].
    pub fn yards(&self) -> u32 {
        yard_value(&self.0)
    }
}

#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, Deref, From, Into, AsRef,
)]
#[serde(transparent)]
pub struct ImageUrl(String);

crate::impl_string_newtype!(ImageUrl);

/// One hireable skip as offered for a location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkipOption {
    pub id: SkipId,
    pub size: SizeLabel,
    pub price: f64,
    pub image_url: ImageUrl,
    pub road_legal: bool,
}

impl SkipOption {
    pub fn has_image(&self) -> bool {
        !self.image_url.is_empty()
    }
}

/// Parses the first run of ASCII digits in a size label ("8 Yards" -> 8,
/// "Mini 4yd" -> 4). Labels without digits, or with a run too large for a
/// `u32`, count as 0.
pub fn yard_value(label: &str) -> u32 {
    let digits: String = label
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yard_value() {
        let cases = [
            ("8 Yards", 8),
            ("10yd", 10),
            ("Mini 4 yard skip", 4),
            ("12 Yard (road legal) 2024", 12),
            ("Yards", 0),
            ("", 0),
            ("99999999999999 yards", 0),
        ];

        for (label, expected) in cases {
            assert_eq!(yard_value(label), expected, "label {label:?}");
        }
    }

    #[test]
    fn test_skip_option_serializes_camel_case() {
        let skip = SkipOption {
            id: SkipId::from("17933"),
            size: SizeLabel::from("4 Yards"),
            price: 278.0,
            image_url: ImageUrl::from(""),
            road_legal: true,
        };

        let json = serde_json::to_value(&skip).unwrap();
        assert_eq!(json["id"], "17933");
        assert_eq!(json["imageUrl"], "");
        assert_eq!(json["roadLegal"], true);
        assert!(!skip.has_image());
        assert_eq!(skip.size.yards(), 4);
    }
}
