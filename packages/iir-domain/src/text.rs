use unicode_normalization::UnicodeNormalization;

/// Folds compatibility forms, lowercases, and collapses every whitespace run into one space.
pub fn normalize(input: &str) -> String {
	let folded: String = input.nfkc().flat_map(char::to_lowercase).collect();
	let mut out = String::with_capacity(folded.len());

	for token in folded.split_whitespace() {
		if !out.is_empty() {
			out.push(' ');
		}

		out.push_str(token);
	}

	out
}

pub fn is_blank(input: &str) -> bool {
	input.chars().all(char::is_whitespace)
}
