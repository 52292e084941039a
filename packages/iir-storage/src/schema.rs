pub fn render_schema() -> String {
	expand_includes(include_str!("../../../sql/init.sql"))
}

fn expand_includes(sql: &str) -> String {
	let mut out = String::new();

	for line in sql.lines() {
		let trimmed = line.trim();

		if trimmed.starts_with("--") {
			continue;
		}

		if let Some(path) = trimmed.strip_prefix("\\ir ") {
			match path.trim() {
				"tables/001_products.sql" =>
					out.push_str(include_str!("../../../sql/tables/001_products.sql")),
				"tables/002_product_embeddings.sql" =>
					out.push_str(include_str!("../../../sql/tables/002_product_embeddings.sql")),
				"tables/003_invoices.sql" =>
					out.push_str(include_str!("../../../sql/tables/003_invoices.sql")),
				"tables/004_invoice_lines.sql" =>
					out.push_str(include_str!("../../../sql/tables/004_invoice_lines.sql")),
				_ => out.push_str(line),
			}
		} else {
			out.push_str(line);
		}

		out.push('\n');
	}

	out
}
