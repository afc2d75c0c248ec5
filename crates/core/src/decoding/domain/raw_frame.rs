/// Byte order of colour channels in a decoder's native output.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChannelOrder {
    Rgb,
    Bgr,
}

/// A frame as it comes out of a decode session, before canonicalisation.
#[derive(Clone, Debug, PartialEq)]
pub struct RawFrame {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub channels: u8,
    pub order: ChannelOrder,
}

impl RawFrame {
    pub fn expected_len(&self) -> usize {
        (self.width as usize) * (self.height as usize) * (self.channels as usize)
    }
}
