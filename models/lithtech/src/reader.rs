use std::io::{
	self,
	Cursor,
	Read
};

use byteorder::{
	LE,
	ReadBytesExt
};

use encoding_rs::Encoding;

use ultraviolet::vec::{
	Vec2,
	Vec3
};

use ltbkit_core::io_ext::{
	RawMat4,
	ReadBinExt
};

use crate::ltb::import::LtbImportError;

/// Bounds checked little endian cursor over a fully materialized LTB buffer.
/// A read that runs past the end reports the offset it started at.
pub struct LtbReader<'a> {
	cur: Cursor<&'a [u8]>,
}

impl<'a> LtbReader<'a> {
	pub fn new(data: &'a [u8]) -> LtbReader<'a> {
		LtbReader {
			cur: Cursor::new(data),
		}
	}

	pub fn position(&self) -> u64 {
		self.cur.position()
	}

	pub fn len(&self) -> u64 {
		self.cur.get_ref().len() as u64
	}

	pub fn remaining(&self) -> u64 {
		self.len().saturating_sub(self.position())
	}

	fn read_with<T, F>(&mut self, f: F) -> Result<T, LtbImportError>
	where
		F: FnOnce(&mut Cursor<&'a [u8]>) -> io::Result<T>,
	{
		let offset = self.position();

		match f(&mut self.cur) {
			Ok(v) => Ok(v),
			Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
				self.cur.set_position(offset);
				Err(LtbImportError::TruncatedStream { offset })
			},
			Err(e) => Err(e.into()),
		}
	}

	pub fn u8(&mut self) -> Result<u8, LtbImportError> {
		self.read_with(|c| c.read_u8())
	}

	pub fn bool(&mut self) -> Result<bool, LtbImportError> {
		Ok(self.u8()? != 0)
	}

	pub fn u16(&mut self) -> Result<u16, LtbImportError> {
		self.read_with(|c| c.read_u16::<LE>())
	}

	pub fn i16(&mut self) -> Result<i16, LtbImportError> {
		self.read_with(|c| c.read_i16::<LE>())
	}

	pub fn u32(&mut self) -> Result<u32, LtbImportError> {
		self.read_with(|c| c.read_u32::<LE>())
	}

	pub fn f32(&mut self) -> Result<f32, LtbImportError> {
		self.read_with(|c| c.read_f32::<LE>())
	}

	pub fn vec2(&mut self) -> Result<Vec2, LtbImportError> {
		self.read_with(|c| c.read_vec2_le())
	}

	pub fn vec3(&mut self) -> Result<Vec3, LtbImportError> {
		self.read_with(|c| c.read_vec3_le())
	}

	pub fn mat4(&mut self) -> Result<RawMat4, LtbImportError> {
		self.read_with(|c| c.read_mat4_le())
	}

	pub fn bytes<const N: usize>(&mut self) -> Result<[u8; N], LtbImportError> {
		self.read_with(|c| {
			let mut b = [0; N];
			c.read_exact(&mut b)?;
			Ok(b)
		})
	}

	/// Raw bytes of a 16-bit length prefixed string
	pub fn lstr16(&mut self) -> Result<Vec<u8>, LtbImportError> {
		self.read_with(|c| c.read_lstr16_le())
	}

	/// A 16-bit length prefixed string decoded from `encoding`
	pub fn text(&mut self, encoding: &'static Encoding) -> Result<String, LtbImportError> {
		let raw = self.lstr16()?;
		let (s, _) = encoding.decode_without_bom_handling(&raw);
		Ok(s.into_owned())
	}

	pub fn skip(&mut self, n: u64) -> Result<(), LtbImportError> {
		if n > self.remaining() {
			return Err(LtbImportError::TruncatedStream { offset: self.position() });
		}

		self.cur.set_position(self.position() + n);
		Ok(())
	}

	pub fn seek_to(&mut self, offset: u64) -> Result<(), LtbImportError> {
		if offset > self.len() {
			return Err(LtbImportError::TruncatedStream { offset: self.position() });
		}

		self.cur.set_position(offset);
		Ok(())
	}

	pub fn corrupt<S: Into<String>>(&self, reason: S) -> LtbImportError {
		LtbImportError::corrupt(self.position(), reason)
	}

	pub fn unsupported<S: Into<String>>(&self, feature: S) -> LtbImportError {
		LtbImportError::unsupported(self.position(), feature)
	}
}
