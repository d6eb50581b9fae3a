//! RFC 3339 timestamps for serde, used by the JSON views returned to callers.

use serde::{Deserialize, Deserializer, Serializer};
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

pub fn serialize<S>(value: &OffsetDateTime, serializer: S) -> Result<S::Ok, S::Error>
where
	S: Serializer,
{
	serializer.serialize_str(&value.format(&Rfc3339).map_err(serde::ser::Error::custom)?)
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<OffsetDateTime, D::Error>
where
	D: Deserializer<'de>,
{
	parse::<D>(&String::deserialize(deserializer)?)
}

fn parse<'de, D>(raw: &str) -> Result<OffsetDateTime, D::Error>
where
	D: Deserializer<'de>,
{
	OffsetDateTime::parse(raw, &Rfc3339).map_err(serde::de::Error::custom)
}

/// Same format for optional timestamps. `None` serializes as `null`.
pub mod option {
	use serde::{Deserialize, Deserializer, Serializer};
	use time::OffsetDateTime;

	pub fn serialize<S>(value: &Option<OffsetDateTime>, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		match value {
			Some(value) => super::serialize(value, serializer),
			None => serializer.serialize_none(),
		}
	}

	pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<OffsetDateTime>, D::Error>
	where
		D: Deserializer<'de>,
	{
		match Option::<String>::deserialize(deserializer)? {
			Some(raw) => super::parse::<D>(&raw).map(Some),
			None => Ok(None),
		}
	}
}
