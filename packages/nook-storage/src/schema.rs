pub fn render_schema() -> String {
	expand_includes(include_str!("../../../sql/init.sql"))
}

fn expand_includes(sql: &str) -> String {
	let mut out = String::new();

	for line in sql.lines() {
		let trimmed = line.trim();

		if let Some(path) = trimmed.strip_prefix("\\ir ") {
			match path.trim() {
				"tables/001_notes.sql" =>
					out.push_str(include_str!("../../../sql/tables/001_notes.sql")),
				"tables/002_tags.sql" => out.push_str(include_str!("../../../sql/tables/002_tags.sql")),
				"tables/003_note_tags.sql" =>
					out.push_str(include_str!("../../../sql/tables/003_note_tags.sql")),
				_ => out.push_str(line),
			}
		} else {
			out.push_str(line);
		}

		out.push('\n');
	}

	out
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn rendered_schema_inlines_every_table() {
		let sql = render_schema();

		assert!(!sql.contains("\\ir "), "Unexpanded include left in schema.");

		for table in ["notes", "tags", "note_tags"] {
			assert!(
				sql.contains(&format!("CREATE TABLE IF NOT EXISTS {table} (")),
				"Missing table {table} in rendered schema."
			);
		}
	}
}
