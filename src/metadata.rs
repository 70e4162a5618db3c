// src/metadata.rs
//! Session metadata: band acquisition parameters and subject attributes
//!
//! Attached once when a session is built and never mutated by the engine.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Scalar or nested metadata value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Map(BTreeMap<String, MetadataValue>),
}

impl From<bool> for MetadataValue {
    fn from(value: bool) -> Self {
        MetadataValue::Bool(value)
    }
}

impl From<i64> for MetadataValue {
    fn from(value: i64) -> Self {
        MetadataValue::Integer(value)
    }
}

impl From<f64> for MetadataValue {
    fn from(value: f64) -> Self {
        MetadataValue::Float(value)
    }
}

impl From<&str> for MetadataValue {
    fn from(value: &str) -> Self {
        MetadataValue::String(value.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(value: String) -> Self {
        MetadataValue::String(value)
    }
}

/// Acquisition parameters reported by the band
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BandMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sampling_rate: Option<u32>,
    /// Bit mask of enabled channels, stored as a hex string such as `"0xFF"`
    #[serde(default, skip_serializing_if = "Option::is_none", with = "hex_mask")]
    pub channel_mask: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channels: Option<usize>,
    /// ADC resolution in bits
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<u8>,
}

/// TOML integers are signed 64-bit, so masks travel as hex text.
/// Plain integers are still accepted when reading.
mod hex_mask {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawMask {
        Integer(u64),
        Text(String),
    }

    pub(super) fn format(mask: u64) -> String {
        format!("{:#X}", mask)
    }

    pub(super) fn parse(text: &str) -> Option<u64> {
        let text = text.trim();
        match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
            Some(hex) => u64::from_str_radix(hex, 16).ok(),
            None => text.parse().ok(),
        }
    }

    pub fn serialize<S: Serializer>(mask: &Option<u64>, serializer: S) -> Result<S::Ok, S::Error> {
        match mask {
            Some(mask) => serializer.serialize_str(&format(*mask)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
        match Option::<RawMask>::deserialize(deserializer)? {
            None => Ok(None),
            Some(RawMask::Integer(mask)) => Ok(Some(mask)),
            Some(RawMask::Text(text)) => parse(&text)
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("invalid channel mask {:?}", text))),
        }
    }
}

/// Attributes of the recorded subject
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubjectMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    /// Centimetres
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    /// Kilograms
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}

/// Metadata of one session or stored dataset
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(default)]
    pub band: BandMetadata,
    #[serde(default)]
    pub subject: SubjectMetadata,
    /// Keys outside the two standard namespaces
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, MetadataValue>,
}

impl Metadata {
    /// Metadata for a band with the given channel count and sampling rate
    pub fn for_band(channels: usize, sampling_rate: u32) -> Self {
        Self {
            band: BandMetadata {
                sampling_rate: Some(sampling_rate),
                channels: Some(channels),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    pub fn with_subject(mut self, subject: SubjectMetadata) -> Self {
        self.subject = subject;
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<MetadataValue>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Generic string-keyed view with `band` and `subject` namespaces
    pub fn to_map(&self) -> BTreeMap<String, MetadataValue> {
        let mut band = BTreeMap::new();
        if let Some(rate) = self.band.sampling_rate {
            band.insert("sampling_rate".to_string(), MetadataValue::Integer(rate.into()));
        }
        if let Some(mask) = self.band.channel_mask {
            band.insert("channel_mask".to_string(), MetadataValue::String(hex_mask::format(mask)));
        }
        if let Some(channels) = self.band.channels {
            band.insert("channels".to_string(), MetadataValue::Integer(channels as i64));
        }
        if let Some(resolution) = self.band.resolution {
            band.insert("resolution".to_string(), MetadataValue::Integer(resolution.into()));
        }

        let mut subject = BTreeMap::new();
        if let Some(age) = self.subject.age {
            subject.insert("age".to_string(), MetadataValue::Integer(age.into()));
        }
        if let Some(gender) = &self.subject.gender {
            subject.insert("gender".to_string(), MetadataValue::String(gender.clone()));
        }
        if let Some(height) = self.subject.height {
            subject.insert("height".to_string(), MetadataValue::Float(height));
        }
        if let Some(weight) = self.subject.weight {
            subject.insert("weight".to_string(), MetadataValue::Float(weight));
        }

        let mut map = self.extra.clone();
        map.insert("band".to_string(), MetadataValue::Map(band));
        map.insert("subject".to_string(), MetadataValue::Map(subject));
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Metadata {
        Metadata {
            band: BandMetadata {
                sampling_rate: Some(500),
                channel_mask: Some(0xFF),
                channels: Some(8),
                resolution: Some(8),
            },
            subject: SubjectMetadata {
                age: Some(31),
                gender: Some("f".to_string()),
                height: Some(168.0),
                weight: Some(61.5),
            },
            extra: BTreeMap::new(),
        }
        .with_extra("session", "calibration")
    }

    #[test]
    fn test_toml_round_trip() {
        let metadata = sample();
        let text = toml::to_string(&metadata).unwrap();
        assert!(text.contains("[band]"));
        assert!(text.contains("[subject]"));
        let parsed: Metadata = toml::from_str(&text).unwrap();
        assert_eq!(parsed, metadata);
    }

    #[test]
    fn test_channel_mask_uses_full_range() {
        let mut metadata = sample();
        metadata.band.channel_mask = Some(u64::MAX);
        let text = toml::to_string(&metadata).unwrap();
        assert!(text.contains("channel_mask = \"0xFFFFFFFFFFFFFFFF\""), "{}", text);
        let parsed: Metadata = toml::from_str(&text).unwrap();
        assert_eq!(parsed.band.channel_mask, Some(u64::MAX));
    }

    #[test]
    fn test_channel_mask_accepts_integers() {
        let parsed: Metadata = toml::from_str("[band]\nchannel_mask = 255\n").unwrap();
        assert_eq!(parsed.band.channel_mask, Some(0xFF));
        let parsed: Metadata = toml::from_str("[band]\nchannel_mask = \"0x0f\"\n").unwrap();
        assert_eq!(parsed.band.channel_mask, Some(0x0F));
        assert!(toml::from_str::<Metadata>("[band]\nchannel_mask = \"band\"\n").is_err());
    }

    #[test]
    fn test_partial_sidecar() {
        let parsed: Metadata = toml::from_str("[subject]\ngender = \"m\"\n").unwrap();
        assert_eq!(parsed.subject.gender.as_deref(), Some("m"));
        assert_eq!(parsed.band, BandMetadata::default());
    }

    #[test]
    fn test_map_view() {
        let map = sample().to_map();
        match &map["band"] {
            MetadataValue::Map(band) => {
                assert_eq!(band["channels"], MetadataValue::Integer(8));
                assert_eq!(band["channel_mask"], MetadataValue::String("0xFF".into()));
            }
            other => panic!("band is not a map: {:?}", other),
        }
        assert_eq!(map["session"], MetadataValue::String("calibration".into()));
    }
}
