use core::fmt;

/// Failure kinds reported by the control loop's I/O seams.
///
/// Hardware-specific errors are folded into these kinds where a pin, ADC or
/// serial port is wrapped, so the loop only has to log and carry on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    DigitalInput,
    DigitalOutput,
    Analog,
    StatusStream,
    InvalidConfig(&'static str),
}

impl Error {
    pub const fn message(self) -> &'static str {
        match self {
            Error::DigitalInput => "Digital input read failed",
            Error::DigitalOutput => "Digital output write failed",
            Error::Analog => "Analog sample failed",
            Error::StatusStream => "Status stream write failed",
            Error::InvalidConfig(reason) => reason,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidConfig(reason) => write!(f, "Invalid config: {}", reason),
            other => f.write_str(other.message()),
        }
    }
}
