use ndarray::ArrayView3;

use super::pixel_format::PixelFormat;

/// A decoded video frame in its canonical pixel format: tightly packed
/// bytes in row-major order, stamped with its presentation time.
///
/// The buffer is owned; handing the frame to a consumer moves it.
#[derive(Clone, Debug, PartialEq)]
pub struct DecodedFrame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    format: PixelFormat,
    timestamp_us: i64,
}

impl DecodedFrame {
    pub fn new(
        data: Vec<u8>,
        width: u32,
        height: u32,
        format: PixelFormat,
        timestamp_us: i64,
    ) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * (format.channels().unwrap_or(0) as usize),
            "data length must equal width * height * channels"
        );
        Self {
            data,
            width,
            height,
            format,
            timestamp_us,
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn channels(&self) -> u8 {
        self.format.channels().unwrap_or(0)
    }

    pub fn timestamp_us(&self) -> i64 {
        self.timestamp_us
    }

    pub fn as_ndarray(&self) -> ArrayView3<'_, u8> {
        ArrayView3::from_shape(self.shape(), &self.data)
            .expect("Frame data length must match dimensions")
    }

    fn shape(&self) -> (usize, usize, usize) {
        (
            self.height as usize,
            self.width as usize,
            self.channels() as usize,
        )
    }
}
