use std::io::{
	Read,
	Result
};

use ultraviolet::vec::{
	Vec2,
	Vec3,
	Vec4
};

/// Row-major 4x4 matrix as stored on disk
pub type RawMat4 = [[f32; 4]; 4];

pub trait ReadBinExt: Read {
	/// Reads the raw bytes of a string prefixed by a little endian 16-bit length.
	/// Decoding is left to the caller since legacy formats disagree on the code page.
	#[inline]
	fn read_lstr16_le(&mut self) -> Result<Vec<u8>> {
		let mut len = [0; 2];
		self.read_exact(&mut len)?;

		let mut s = vec![0; u16::from_le_bytes(len) as usize];
		self.read_exact(&mut s)?;

		Ok(s)
	}

	/// Reads a single little endian float
	#[inline]
	fn read_f32_le(&mut self) -> Result<f32> {
		let mut b = [0; 4];
		self.read_exact(&mut b)?;
		Ok(f32::from_le_bytes(b))
	}

	#[inline]
	fn read_vec2_le(&mut self) -> Result<Vec2> {
		let x = self.read_f32_le()?;
		Ok(Vec2::new(x, self.read_f32_le()?))
	}

	#[inline]
	fn read_vec3_le(&mut self) -> Result<Vec3> {
		let x = self.read_f32_le()?;
		let y = self.read_f32_le()?;
		Ok(Vec3::new(x, y, self.read_f32_le()?))
	}

	/// Reads four floats in `x, y, z, w` order
	#[inline]
	fn read_vec4_le(&mut self) -> Result<Vec4> {
		let xyz = self.read_vec3_le()?;
		Ok(Vec4::new(xyz.x, xyz.y, xyz.z, self.read_f32_le()?))
	}

	/// Reads sixteen little endian floats, one row at a time
	#[inline]
	fn read_mat4_le(&mut self) -> Result<RawMat4> {
		let mut m = [[0.0; 4]; 4];

		for row in m.iter_mut() {
			for cell in row.iter_mut() {
				*cell = self.read_f32_le()?;
			}
		}

		Ok(m)
	}
}

impl<R> ReadBinExt for R
where
	R: Read + ?Sized,
{
}
