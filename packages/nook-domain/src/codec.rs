//! Structured memory metadata carried in tag names.
//!
//! A note is a memory iff it carries the bare [`MEMORY_TAG`]. Category and importance are
//! stored as `memory:<category>` and `importance:<n>` tags. Nothing in the note store keeps
//! these families single-valued, so [`decode`] takes the first match of each and never fails.

pub const MEMORY_TAG: &str = "memory";
pub const CATEGORY_PREFIX: &str = "memory:";
pub const IMPORTANCE_PREFIX: &str = "importance:";

/// Metadata recovered from a note's tags. Absent or malformed fields are zero-valued.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MemoryTags {
	pub is_memory: bool,
	pub category: String,
	pub importance: i32,
}

pub fn encode(category: &str, importance: i32) -> [String; 3] {
	[
		MEMORY_TAG.to_string(),
		format!("{CATEGORY_PREFIX}{category}"),
		format!("{IMPORTANCE_PREFIX}{importance}"),
	]
}

pub fn decode<I, S>(tags: I) -> MemoryTags
where
	I: IntoIterator<Item = S>,
	S: AsRef<str>,
{
	let mut decoded = MemoryTags::default();
	let mut category_seen = false;
	let mut importance_seen = false;

	for tag in tags {
		let name = tag.as_ref();

		if name == MEMORY_TAG {
			decoded.is_memory = true;
		} else if let Some(category) = name.strip_prefix(CATEGORY_PREFIX) {
			if !category_seen {
				decoded.category = category.to_string();
				category_seen = true;
			}
		} else if let Some(raw) = name.strip_prefix(IMPORTANCE_PREFIX)
			&& !importance_seen
		{
			decoded.importance = raw.trim().parse().unwrap_or(0);
			importance_seen = true;
		}
	}

	decoded
}
