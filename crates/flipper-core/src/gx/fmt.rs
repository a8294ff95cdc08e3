//! Vertex component and color formats.
//!
//! Display lists store attributes in quantized hardware encodings. A
//! component is one scalar of an attribute (one of x/y/z, one texcoord
//! axis, ...). Integer components carry a fixed-point shift: the stored
//! integer divided by `2^shift` yields the real value. Floats ignore the
//! shift. Colors use their own packed formats and always decode to
//! 0-255 per channel.

/// Scalar component encoding. Discriminants match the hardware format
/// field in the VAT registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum CompFormat {
    U8 = 0,
    S8 = 1,
    U16 = 2,
    #[default]
    S16 = 3,
    F32 = 4,
}

impl CompFormat {
    pub fn from_bits(bits: u32) -> Self {
        match bits & 0x7 {
            0 => Self::U8,
            1 => Self::S8,
            2 => Self::U16,
            3 => Self::S16,
            _ => Self::F32,
        }
    }

    /// Size of one component in bytes.
    pub fn size(self) -> usize {
        match self {
            Self::U8 | Self::S8 => 1,
            Self::U16 | Self::S16 => 2,
            Self::F32 => 4,
        }
    }

    pub fn is_integer(self) -> bool {
        !matches!(self, Self::F32)
    }
}

/// How an attribute appears in the vertex stream. Discriminants match
/// the hardware vertex descriptor field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Presence {
    #[default]
    None = 0,
    Direct = 1,
    Index8 = 2,
    Index16 = 3,
}

impl Presence {
    pub fn from_bits(bits: u32) -> Self {
        match bits & 0x3 {
            1 => Self::Direct,
            2 => Self::Index8,
            3 => Self::Index16,
            _ => Self::None,
        }
    }
}

/// Decode one component from big-endian bytes. `buf` must hold at least
/// `fmt.size()` bytes at `off`; callers bounds-check first.
pub fn read_component(buf: &[u8], off: usize, fmt: CompFormat, shift: u8) -> f32 {
    let raw = match fmt {
        CompFormat::U8 => buf[off] as f32,
        CompFormat::S8 => buf[off] as i8 as f32,
        CompFormat::U16 => u16::from_be_bytes([buf[off], buf[off + 1]]) as f32,
        CompFormat::S16 => i16::from_be_bytes([buf[off], buf[off + 1]]) as f32,
        CompFormat::F32 => f32::from_be_bytes([buf[off], buf[off + 1], buf[off + 2], buf[off + 3]]),
    };
    if fmt.is_integer() {
        raw / (1u32 << shift) as f32
    } else {
        raw
    }
}

/// Decode a normal component. Normals ignore the VAT shift: the divisor
/// is fixed by the format (s8 is 1.6 fixed point, s16 is 1.14). The
/// hardware never stores unsigned normals; an unsigned format here is a
/// caller error and decodes as its signed counterpart.
pub fn read_normal_component(buf: &[u8], off: usize, fmt: CompFormat) -> f32 {
    match fmt {
        CompFormat::U8 | CompFormat::S8 => buf[off] as i8 as f32 / 64.0,
        CompFormat::U16 | CompFormat::S16 => {
            i16::from_be_bytes([buf[off], buf[off + 1]]) as f32 / 16384.0
        }
        CompFormat::F32 => f32::from_be_bytes([buf[off], buf[off + 1], buf[off + 2], buf[off + 3]]),
    }
}

/// Packed vertex color encoding. Discriminants match the hardware
/// format field for color attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum ColorFormat {
    Rgb565 = 0,
    Rgb888 = 1,
    /// 8-bit RGB padded to 4 bytes; the pad byte is ignored.
    Rgbx8888 = 2,
    Rgba4444 = 3,
    Rgba6666 = 4,
    #[default]
    Rgba8888 = 5,
}

impl ColorFormat {
    pub fn from_bits(bits: u32) -> Self {
        match bits & 0x7 {
            0 => Self::Rgb565,
            1 => Self::Rgb888,
            2 => Self::Rgbx8888,
            3 => Self::Rgba4444,
            4 => Self::Rgba6666,
            _ => Self::Rgba8888,
        }
    }

    /// Size of one packed color in bytes.
    pub fn size(self) -> usize {
        match self {
            Self::Rgb565 | Self::Rgba4444 => 2,
            Self::Rgb888 | Self::Rgba6666 => 3,
            Self::Rgbx8888 | Self::Rgba8888 => 4,
        }
    }
}

/// Expand a 4-bit channel to 8 bits (0xF -> 0xFF).
fn expand4(v: u8) -> u8 {
    (v << 4) | v
}

/// Expand a 5-bit channel to 8 bits, replicating top bits into the low end.
fn expand5(v: u8) -> u8 {
    (v << 3) | (v >> 2)
}

/// Expand a 6-bit channel to 8 bits.
fn expand6(v: u8) -> u8 {
    (v << 2) | (v >> 4)
}

/// Decode a packed color to RGBA, 0-255 per channel. Formats without
/// alpha decode to fully opaque. `buf` must hold `fmt.size()` bytes at
/// `off`.
pub fn read_color(buf: &[u8], off: usize, fmt: ColorFormat) -> [u8; 4] {
    match fmt {
        ColorFormat::Rgb565 => {
            let v = u16::from_be_bytes([buf[off], buf[off + 1]]);
            [
                expand5((v >> 11) as u8 & 0x1F),
                expand6((v >> 5) as u8 & 0x3F),
                expand5(v as u8 & 0x1F),
                0xFF,
            ]
        }
        ColorFormat::Rgb888 => [buf[off], buf[off + 1], buf[off + 2], 0xFF],
        ColorFormat::Rgbx8888 => [buf[off], buf[off + 1], buf[off + 2], 0xFF],
        ColorFormat::Rgba4444 => {
            let v = u16::from_be_bytes([buf[off], buf[off + 1]]);
            [
                expand4((v >> 12) as u8 & 0xF),
                expand4((v >> 8) as u8 & 0xF),
                expand4((v >> 4) as u8 & 0xF),
                expand4(v as u8 & 0xF),
            ]
        }
        ColorFormat::Rgba6666 => {
            let v = ((buf[off] as u32) << 16) | ((buf[off + 1] as u32) << 8) | buf[off + 2] as u32;
            [
                expand6((v >> 18) as u8 & 0x3F),
                expand6((v >> 12) as u8 & 0x3F),
                expand6((v >> 6) as u8 & 0x3F),
                expand6(v as u8 & 0x3F),
            ]
        }
        ColorFormat::Rgba8888 => [buf[off], buf[off + 1], buf[off + 2], buf[off + 3]],
    }
}
