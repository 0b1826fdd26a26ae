use std::borrow::Cow;

use log::debug;

use crate::ltb::{
	import::LtbImportError,
	MAX_HEADER_SIZE
};

/// Leading 16-bit field of an LTB stream. Uncompressed files keep it at or
/// below [`MAX_HEADER_SIZE`]; anything larger is the start of an LZMA header.
pub fn discriminant(data: &[u8]) -> Result<u16, LtbImportError> {
	match data {
		[lo, hi, ..] => Ok(u16::from_le_bytes([*lo, *hi])),
		_ => Err(LtbImportError::TruncatedStream { offset: 0 }),
	}
}

pub fn is_compressed(data: &[u8]) -> Result<bool, LtbImportError> {
	Ok(discriminant(data)? > MAX_HEADER_SIZE)
}

/// Returns a seekable view of the container, inflating it first if it is
/// LZMA wrapped. Only one level of wrapping is accepted.
pub fn unwrap_container(data: &[u8]) -> Result<Cow<'_, [u8]>, LtbImportError> {
	if !is_compressed(data)? {
		return Ok(Cow::Borrowed(data));
	}

	let mut input = data;
	let mut output = vec![];
	lzma_rs::lzma_decompress(&mut input, &mut output)
		.map_err(|e| LtbImportError::corrupt(0, format!("LZMA stream could not be decoded: {}", e)))?;

	if output.is_empty() {
		return Err(LtbImportError::corrupt(0, "LZMA stream decompressed to an empty payload"));
	}

	let disc = discriminant(&output)?;
	if disc > MAX_HEADER_SIZE {
		return Err(LtbImportError::corrupt(0,
			format!("decompressed payload is not an LTB container (leading value {})", disc)));
	}

	debug!("Inflated LZMA container: {} -> {} bytes", data.len(), output.len());

	Ok(Cow::Owned(output))
}
