/// Canonical pixel layout of every emitted frame.
///
/// Decided solely by the channel count of a decoded probe frame. Whatever
/// format the container advertises is ignored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    Grayscale8,
    Rgb8,
    Rgba8,
    Unknown,
}

impl PixelFormat {
    pub fn from_channels(channels: u8) -> Self {
        match channels {
            1 => PixelFormat::Grayscale8,
            3 => PixelFormat::Rgb8,
            4 => PixelFormat::Rgba8,
            _ => PixelFormat::Unknown,
        }
    }

    /// Bytes per pixel, or `None` for `Unknown`.
    pub fn channels(self) -> Option<u8> {
        match self {
            PixelFormat::Grayscale8 => Some(1),
            PixelFormat::Rgb8 => Some(3),
            PixelFormat::Rgba8 => Some(4),
            PixelFormat::Unknown => None,
        }
    }

    pub fn is_known(self) -> bool {
        self != PixelFormat::Unknown
    }

    pub fn name(self) -> &'static str {
        match self {
            PixelFormat::Grayscale8 => "gray8",
            PixelFormat::Rgb8 => "rgb8",
            PixelFormat::Rgba8 => "rgba8",
            PixelFormat::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
