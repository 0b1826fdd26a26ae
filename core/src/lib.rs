#[cfg(feature = "io_ext")]
pub mod io_ext;

pub mod scene;

/// Replaces the characters that legacy tools allow in node names but which
/// are not valid in interchange identifiers.
pub fn sanitize_identifier(name: &str) -> String {
	name.chars()
		.map(|c| match c {
			'.' | '-' | ' ' => '_',
			c => c,
		})
		.collect()
}
