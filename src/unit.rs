use std::fmt;

/// The unit of measurement attached to a metric.
///
/// Units are descriptive only; the registry never converts values between
/// them.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Unit {
    /// No unit.
    None,
    /// A dimensionless quantity, such as a ratio or a count.
    Dimensionless,
    /// Milliseconds.
    Millisecond,
    /// Seconds.
    Second,
    /// Degrees Celsius.
    Celsius,
    /// Bytes.
    Byte,
    /// Bytes per second.
    BytePerSecond,
}

impl Unit {
    /// Gets the human-readable form of this unit.
    pub fn as_str(&self) -> &'static str {
        match self {
            Unit::None => "",
            Unit::Dimensionless => "dimensionless",
            Unit::Millisecond => "milliseconds",
            Unit::Second => "seconds",
            Unit::Celsius => "celsius",
            Unit::Byte => "bytes",
            Unit::BytePerSecond => "bytes/second",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
