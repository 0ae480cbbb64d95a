use crate::foundation::error::{ReelError, ReelResult};

/// Output canvas dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Create a validated canvas.
    ///
    /// Both sides must be non-zero and even: the encoder targets yuv420p, which subsamples
    /// chroma by two in each direction.
    pub fn new(width: u32, height: u32) -> ReelResult<Self> {
        let canvas = Self { width, height };
        canvas.validate()?;
        Ok(canvas)
    }

    pub fn validate(self) -> ReelResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(ReelError::validation("canvas width/height must be non-zero"));
        }
        if !self.width.is_multiple_of(2) || !self.height.is_multiple_of(2) {
            return Err(ReelError::validation(format!(
                "canvas {}x{} must have even width/height (required for yuv420p output)",
                self.width, self.height
            )));
        }
        Ok(())
    }

    /// Byte length of one tightly packed RGB8 frame.
    pub fn rgb8_len(self) -> usize {
        (self.width as usize) * (self.height as usize) * 3
    }
}

impl Default for Canvas {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 1024,
        }
    }
}

/// Integer frames-per-second.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct FrameRate(u32);

impl FrameRate {
    pub fn new(fps: u32) -> ReelResult<Self> {
        if fps == 0 {
            return Err(ReelError::validation("frame rate must be > 0"));
        }
        Ok(Self(fps))
    }

    pub fn get(self) -> u32 {
        self.0
    }

    /// Timeline time of frame `index`, in seconds.
    pub fn frame_time_secs(self, index: u64) -> f64 {
        (index as f64) / f64::from(self.0)
    }

    /// Number of frames needed to cover `secs`, rounded to the nearest frame and never zero.
    pub fn frames_for_secs(self, secs: f64) -> u64 {
        let frames = (secs.max(0.0) * f64::from(self.0)).round() as u64;
        frames.max(1)
    }
}

impl Default for FrameRate {
    fn default() -> Self {
        Self(24)
    }
}

/// Straight RGB8 color.
///
/// Serialized as a `#rrggbb` hex string.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb8 {
    pub const WHITE: Self = Self::new(255, 255, 255);
    pub const BLACK: Self = Self::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn to_array(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    pub fn parse_hex(s: &str) -> ReelResult<Self> {
        let hex = s.trim().strip_prefix('#').unwrap_or(s.trim());
        let expanded: String = match hex.len() {
            _ if !hex.is_ascii() => {
                return Err(ReelError::validation(format!("color '{s}' is not valid hex")));
            }
            3 => hex.chars().flat_map(|c| [c, c]).collect(),
            6 => hex.to_owned(),
            _ => {
                return Err(ReelError::validation(format!(
                    "color '{s}' must be #rgb or #rrggbb"
                )));
            }
        };
        let channel = |i: usize| {
            u8::from_str_radix(&expanded[i..i + 2], 16)
                .map_err(|_| ReelError::validation(format!("color '{s}' is not valid hex")))
        };
        Ok(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl serde::Serialize for Rgb8 {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> serde::Deserialize<'de> for Rgb8 {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse_hex(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
