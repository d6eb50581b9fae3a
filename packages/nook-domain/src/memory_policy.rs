//! Defaulting rules applied when a memory is written or read back.

pub const KNOWN_CATEGORIES: [&str; 5] = ["user-pref", "project", "decision", "fact", "todo"];
pub const DEFAULT_CATEGORY: &str = "fact";
pub const DEFAULT_IMPORTANCE: i32 = 3;
pub const MIN_IMPORTANCE: i32 = 1;
pub const MAX_IMPORTANCE: i32 = 5;
pub const TITLE_MAX_CHARS: usize = 50;
pub const TITLE_ELLIPSIS: &str = "...";

pub fn is_known_category(category: &str) -> bool {
	KNOWN_CATEGORIES.contains(&category)
}

/// Empty categories fall back to [`DEFAULT_CATEGORY`]. Unknown names are kept as given.
pub fn resolve_category(category: Option<&str>) -> String {
	match category.map(str::trim) {
		Some(category) if !category.is_empty() => category.to_string(),
		_ => DEFAULT_CATEGORY.to_string(),
	}
}

/// Values outside `1..=5`, including zero and unset, become [`DEFAULT_IMPORTANCE`].
pub fn resolve_importance(importance: Option<i32>) -> i32 {
	match importance {
		Some(value) if (MIN_IMPORTANCE..=MAX_IMPORTANCE).contains(&value) => value,
		_ => DEFAULT_IMPORTANCE,
	}
}

pub fn resolve_title(title: Option<&str>, content: &str) -> String {
	match title.map(str::trim) {
		Some(title) if !title.is_empty() => title.to_string(),
		_ => derive_title(content),
	}
}

pub fn derive_title(content: &str) -> String {
	let mut chars = content.chars();
	let head: String = chars.by_ref().take(TITLE_MAX_CHARS).collect();

	if chars.next().is_some() { format!("{head}{TITLE_ELLIPSIS}") } else { head }
}

pub fn embedding_input(title: &str, content: &str) -> String {
	format!("{title}\n\n{content}")
}
