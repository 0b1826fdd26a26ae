use bitflags::bitflags;

#[cfg(feature = "import")]
use encoding_rs::Encoding;

#[cfg(feature = "import")]
use crate::reader::LtbReader;

#[cfg(feature = "import")]
use import::LtbImportError;

/// Largest value the leading 16-bit field takes in an uncompressed file
pub const MAX_HEADER_SIZE: u16 = 20;
/// Size of the legacy header region preceding the version field
pub const HEADER_SIZE: u64 = 0x14;
pub const MAX_PIECE_TEXTURES: usize = 4;
/// Bone slots in a matrix palette vertex or a bone combo
pub const MAX_PALETTE_BONES: usize = 4;
pub const UNUSED_BONE: u8 = 0xFF;
/// Fixed point divisor of quantized animation keys
pub const QUANT_SCALE: f32 = 16.0;
pub const VERTEX_STREAMS: usize = 4;

#[derive(Clone, Copy, Debug, PartialEq)]
#[repr(u32)]
pub enum PieceType {
	Rigid = 4,
	Skeletal = 5,
	VertexAnimated = 6,
}

impl PieceType {
	pub fn from_u32(v: u32) -> Option<PieceType> {
		match v {
			4 => Some(PieceType::Rigid),
			5 => Some(PieceType::Skeletal),
			6 => Some(PieceType::VertexAnimated),
			_ => None,
		}
	}
}

bitflags! {
	/// Per-stream vertex layout
	pub struct StreamFlags: u32 {
		const POSITION = 0x0001;
		const NORMAL = 0x0002;
		const COLOR = 0x0004;
		const UV_SET_1 = 0x0010;
		const UV_SET_2 = 0x0020;
		const UV_SET_3 = 0x0040;
		const UV_SET_4 = 0x0080;
		const BASIS_VECTORS = 0x0100;
	}
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[repr(u32)]
pub enum AnimCompression {
	None = 0,
	Relevant,
	Relevant16,
	RelPv16,
}

impl AnimCompression {
	pub fn from_u32(v: u32) -> Option<AnimCompression> {
		match v {
			0 => Some(AnimCompression::None),
			1 => Some(AnimCompression::Relevant),
			2 => Some(AnimCompression::Relevant16),
			3 => Some(AnimCompression::RelPv16),
			_ => None,
		}
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct Header {
	pub discriminant: u16,
	pub version: u32,
	pub num_keyframes: u32,
	pub num_anims: u32,
	pub num_bones: u32,
	pub num_pieces: u32,
	pub num_child_models: u32,
	pub num_tris: u32,
	pub num_verts: u32,
	pub num_vertex_weights: u32,
	pub num_lods: u32,
	pub num_sockets: u32,
	pub num_weight_sets: u32,
	pub num_strings: u32,
	pub string_lengths: u32,
	pub vert_anim_data_size: u32,
	pub anim_data_size: u32,
	pub command: String,
	pub radius: f32,
}

impl Header {
	#[cfg(feature = "import")]
	pub(crate) fn read(buf: &mut LtbReader, encoding: &'static Encoding) -> Result<Header, LtbImportError> {
		buf.seek_to(0)?;
		let discriminant = buf.u16()?;
		buf.seek_to(HEADER_SIZE)?;

		Ok(Header {
			discriminant: discriminant,
			version: buf.u32()?,
			num_keyframes: buf.u32()?,
			num_anims: buf.u32()?,
			num_bones: buf.u32()?,
			num_pieces: buf.u32()?,
			num_child_models: buf.u32()?,
			num_tris: buf.u32()?,
			num_verts: buf.u32()?,
			num_vertex_weights: buf.u32()?,
			num_lods: buf.u32()?,
			num_sockets: buf.u32()?,
			num_weight_sets: buf.u32()?,
			num_strings: buf.u32()?,
			string_lengths: buf.u32()?,
			vert_anim_data_size: buf.u32()?,
			anim_data_size: buf.u32()?,
			command: buf.text(encoding)?,
			radius: buf.f32()?,
		})
	}
}

/// Name of an external model referenced by the file, with its skipped relation table
#[derive(Clone, Debug, PartialEq)]
pub struct ChildModel {
	pub name: String,
	pub num_relations: u32,
}

#[cfg(feature = "import")]
pub mod import {
	use std::{
		io,
		path::{
			Path,
			PathBuf
		}
	};

	use thiserror::Error;

	#[derive(Error, Debug)]
	pub enum LtbImportError {
		#[error("Unexpected end of stream at offset {offset:#x}")]
		TruncatedStream {
			offset: u64,
		},
		#[error("Corrupt container at offset {offset:#x}: {reason}")]
		CorruptContainer {
			offset: u64,
			reason: String,
		},
		#[error("Unsupported feature at offset {offset:#x}: {feature}")]
		UnsupportedFeature {
			offset: u64,
			feature: String,
		},
		#[error("I/O error")]
		IO {
			#[from]
			source: io::Error,
		},
		#[error("{}: {}", .path.display(), .source)]
		File {
			path: PathBuf,
			#[source]
			source: Box<LtbImportError>,
		},
	}

	impl LtbImportError {
		pub fn corrupt<S: Into<String>>(offset: u64, reason: S) -> LtbImportError {
			LtbImportError::CorruptContainer {
				offset: offset,
				reason: reason.into(),
			}
		}

		pub fn unsupported<S: Into<String>>(offset: u64, feature: S) -> LtbImportError {
			LtbImportError::UnsupportedFeature {
				offset: offset,
				feature: feature.into(),
			}
		}

		/// Attaches the path of the file being decoded
		pub fn in_file(self, path: &Path) -> LtbImportError {
			LtbImportError::File {
				path: path.to_path_buf(),
				source: Box::new(self),
			}
		}

		/// Byte offset the failure was detected at, if known
		pub fn offset(&self) -> Option<u64> {
			match self {
				LtbImportError::TruncatedStream { offset } => Some(*offset),
				LtbImportError::CorruptContainer { offset, .. } => Some(*offset),
				LtbImportError::UnsupportedFeature { offset, .. } => Some(*offset),
				LtbImportError::IO { .. } => None,
				LtbImportError::File { source, .. } => source.offset(),
			}
		}

		/// Strips any file context
		pub fn root_cause(&self) -> &LtbImportError {
			match self {
				LtbImportError::File { source, .. } => source.root_cause(),
				e => e,
			}
		}
	}

}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_piece_type() {
		assert_eq!(Some(PieceType::Skeletal), PieceType::from_u32(5));
		assert_eq!(None, PieceType::from_u32(3));
	}

	#[test]
	fn test_stream_flags() {
		let f = StreamFlags::from_bits_truncate(0x0113);
		assert!(f.contains(StreamFlags::POSITION | StreamFlags::NORMAL | StreamFlags::UV_SET_1));
		assert!(f.contains(StreamFlags::BASIS_VECTORS));
		assert!(!f.contains(StreamFlags::COLOR));
	}
}
