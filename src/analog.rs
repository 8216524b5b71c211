use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AnalogChannel {
    /// Reference the sense value is held around.
    Target,
    Sense,
}

/// Source of raw analog readings.
///
/// Implementations return values in `0..=full_scale` of the active config
/// and fold converter failures into [`Error::Analog`].
#[allow(async_fn_in_trait)]
pub trait AnalogSampler {
    async fn sample(&mut self, channel: AnalogChannel) -> Result<u16, Error>;
}

/// Rescales a reading from a converter with `from_bits` resolution to `to_bits`.
pub const fn rescale(code: u16, from_bits: u32, to_bits: u32) -> u16 {
    if from_bits >= to_bits {
        code >> (from_bits - to_bits)
    } else {
        code << (to_bits - from_bits)
    }
}
