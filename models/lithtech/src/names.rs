use encoding_rs::Encoding;

use ltbkit_core::sanitize_identifier;

/// Turns a raw, legacy encoded name into an ASCII safe identifier
pub trait NameNormalizer {
	fn normalize(&self, raw: &[u8], encoding: &'static Encoding) -> String;
}

const HANGUL_BASE: u32 = 0xAC00;
const HANGUL_LAST: u32 = 0xD7A3;
const MEDIALS_PER_INITIAL: u32 = 21 * 28;
const FINALS: u32 = 28;

static INITIALS: [&str; 19] = [
	"g", "kk", "n", "d", "tt", "r", "m", "b", "pp", "s", "ss", "", "j", "jj", "ch", "k", "t", "p", "h",
];

static MEDIALS: [&str; 21] = [
	"a", "ae", "ya", "yae", "eo", "e", "yeo", "ye", "o", "wa", "wae", "oe", "yo", "u", "wo", "we",
	"wi", "yu", "eu", "ui", "i",
];

static FINAL_SOUNDS: [&str; 28] = [
	"", "k", "k", "k", "n", "n", "n", "t", "l", "k", "m", "p", "l", "l", "p", "l", "m", "p", "p",
	"t", "t", "ng", "t", "t", "k", "t", "p", "t",
];

/// Romanizes precomposed Hangul syllables jamo by jamo. ASCII passes through
/// and any other character becomes `_`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct HangulRomanizer;

impl HangulRomanizer {
	pub fn romanize(&self, text: &str) -> String {
		let mut s = String::with_capacity(text.len());

		for c in text.chars() {
			let cp = c as u32;

			if c.is_ascii() {
				s.push(c);
			} else if (HANGUL_BASE..=HANGUL_LAST).contains(&cp) {
				let idx = cp - HANGUL_BASE;
				s.push_str(INITIALS[(idx / MEDIALS_PER_INITIAL) as usize]);
				s.push_str(MEDIALS[((idx % MEDIALS_PER_INITIAL) / FINALS) as usize]);
				s.push_str(FINAL_SOUNDS[(idx % FINALS) as usize]);
			} else {
				s.push('_');
			}
		}

		s
	}
}

impl NameNormalizer for HangulRomanizer {
	fn normalize(&self, raw: &[u8], encoding: &'static Encoding) -> String {
		let (text, _) = encoding.decode_without_bom_handling(raw);
		self.romanize(&text)
	}
}

/// Identifier used for mesh nodes and the materials derived from them
pub fn mesh_identifier<N: NameNormalizer + ?Sized>(names: &N, raw: &[u8], encoding: &'static Encoding) -> String {
	sanitize_identifier(&names.normalize(raw, encoding)).to_lowercase()
}

pub fn bone_identifier<N: NameNormalizer + ?Sized>(names: &N, raw: &[u8], encoding: &'static Encoding) -> String {
	sanitize_identifier(&names.normalize(raw, encoding))
}
