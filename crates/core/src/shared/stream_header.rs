use super::pixel_format::PixelFormat;
use super::video_metadata::ProbedMetadata;

/// Stream-level description emitted once, before the first frame.
#[derive(Clone, Debug, PartialEq)]
pub struct StreamHeader {
    pub pixel_format: PixelFormat,
    pub width: u32,
    pub height: u32,
    pub frame_rate: f64,
    pub duration_sec: f64,
}

impl From<&ProbedMetadata> for StreamHeader {
    fn from(meta: &ProbedMetadata) -> Self {
        Self {
            pixel_format: meta.pixel_format,
            width: meta.width,
            height: meta.height,
            frame_rate: meta.frame_rate,
            duration_sec: meta.duration_sec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_header_from_metadata() {
        let meta = ProbedMetadata {
            width: 320,
            height: 240,
            frame_rate: 30.0,
            frame_count: 90,
            pixel_format: PixelFormat::Rgb8,
            source_path: None,
        };
        let header = StreamHeader::from(&meta);
        assert_eq!(header.pixel_format, PixelFormat::Rgb8);
        assert_eq!(header.width, 320);
        assert_eq!(header.height, 240);
        assert_relative_eq!(header.frame_rate, 30.0);
        assert_relative_eq!(header.duration_sec, 3.0);
    }

    #[test]
    fn test_fractional_frame_rate_duration() {
        let meta = ProbedMetadata {
            width: 2,
            height: 2,
            frame_rate: 30000.0 / 1001.0,
            frame_count: 300,
            pixel_format: PixelFormat::Grayscale8,
            source_path: None,
        };
        let header = StreamHeader::from(&meta);
        assert_relative_eq!(header.duration_sec, 10.01, epsilon = 1e-9);
    }
}
