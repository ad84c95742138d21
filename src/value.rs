use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use parking_lot::RwLock;

use crate::distribution::Distribution;
use crate::messages::{RpcDistribution, RpcValue};

/// The category of measurement a [`Value`] reports.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Kind {
    /// A boolean flag.
    Bool,
    /// A signed integer, read as 64 bits.
    Int,
    /// An unsigned integer, read as 64 bits.
    Uint,
    /// A floating-point number, read as 64 bits.
    Float,
    /// A text value.
    String,
    /// A wall-clock timestamp.
    Time,
    /// A bucketed distribution.
    Dist,
}

/// An evaluated scalar, widened to its 64-bit category.
pub(crate) enum ScalarValue {
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float(f64),
    String(String),
    Time(DateTime<Utc>),
}

mod sealed {
    use chrono::{DateTime, Utc};

    use super::{Kind, ScalarValue};

    pub trait Sealed: Clone + Send + Sync + 'static {
        const KIND: Kind;
        fn into_scalar(self) -> ScalarValue;
    }

    macro_rules! impl_widened {
        ($($ty:ty => $kind:ident as $wide:ty),* $(,)?) => {
            $(impl Sealed for $ty {
                const KIND: Kind = Kind::$kind;
                fn into_scalar(self) -> ScalarValue {
                    ScalarValue::$kind(self as $wide)
                }
            })*
        };
    }

    impl_widened! {
        i8 => Int as i64,
        i16 => Int as i64,
        i32 => Int as i64,
        i64 => Int as i64,
        isize => Int as i64,
        u8 => Uint as u64,
        u16 => Uint as u64,
        u32 => Uint as u64,
        u64 => Uint as u64,
        usize => Uint as u64,
        f32 => Float as f64,
        f64 => Float as f64,
    }

    impl Sealed for bool {
        const KIND: Kind = Kind::Bool;
        fn into_scalar(self) -> ScalarValue {
            ScalarValue::Bool(self)
        }
    }

    impl Sealed for String {
        const KIND: Kind = Kind::String;
        fn into_scalar(self) -> ScalarValue {
            ScalarValue::String(self)
        }
    }

    impl Sealed for DateTime<Utc> {
        const KIND: Kind = Kind::Time;
        fn into_scalar(self) -> ScalarValue {
            ScalarValue::Time(self)
        }
    }
}

/// A scalar category the registry knows how to read.
///
/// Implemented for `bool`, every signed and unsigned integer width (read as
/// 64 bits), `f32` and `f64` (read as `f64`), `String`, and
/// [`DateTime<Utc>`]. The trait is sealed; the category set cannot be
/// extended outside this crate.
pub trait Scalar: sealed::Sealed {}

impl<T: sealed::Sealed> Scalar for T {}

enum Reader {
    Scalar(Box<dyn Fn() -> ScalarValue + Send + Sync>),
    Dist(Arc<Distribution>),
}

/// A type-erased read handle over a scalar source or a [`Distribution`].
///
/// A value's [`Kind`] is fixed at construction and never re-derived. Typed
/// reads evaluate the underlying source on every call: a shared container is
/// read through its lock, a producer is invoked, and an absent time handle
/// reads as the zero time.
pub struct Value {
    kind: Kind,
    reader: Reader,
}

impl Value {
    /// Creates a value that reads a shared scalar container.
    ///
    /// The application keeps its own clone of the container and writes
    /// through the lock; every read observes the current contents.
    pub fn from_shared<T: Scalar>(container: &Arc<RwLock<T>>) -> Value {
        let container = Arc::clone(container);
        Value {
            kind: T::KIND,
            reader: Reader::Scalar(Box::new(move || container.read().clone().into_scalar())),
        }
    }

    /// Creates a value that invokes a producer on every read.
    ///
    /// The producer's return category is captured once, here.
    pub fn from_fn<T, F>(producer: F) -> Value
    where
        T: Scalar,
        F: Fn() -> T + Send + Sync + 'static,
    {
        Value {
            kind: T::KIND,
            reader: Reader::Scalar(Box::new(move || producer().into_scalar())),
        }
    }

    /// Creates a time value read through an optional handle.
    ///
    /// An absent handle reads as the zero time.
    pub fn from_optional_time(container: &Arc<RwLock<Option<DateTime<Utc>>>>) -> Value {
        let container = Arc::clone(container);
        Value {
            kind: Kind::Time,
            reader: Reader::Scalar(Box::new(move || {
                ScalarValue::Time((*container.read()).unwrap_or_else(zero_time))
            })),
        }
    }

    /// Creates a value over a distribution.
    pub fn from_distribution(dist: &Arc<Distribution>) -> Value {
        Value { kind: Kind::Dist, reader: Reader::Dist(Arc::clone(dist)) }
    }

    /// The kind captured at construction.
    pub fn kind(&self) -> Kind {
        self.kind
    }

    fn expect_kind(&self, kind: Kind) {
        if self.kind != kind {
            panic!("wrong as_* accessor called on a {:?} value", self.kind);
        }
    }

    fn evaluate(&self) -> ScalarValue {
        match &self.reader {
            Reader::Scalar(read) => read(),
            Reader::Dist(_) => unreachable!("scalar read of a distribution value"),
        }
    }

    /// Reads this value as a boolean.
    ///
    /// # Panics
    ///
    /// Panics if the kind is not [`Kind::Bool`].
    pub fn as_bool(&self) -> bool {
        self.expect_kind(Kind::Bool);
        match self.evaluate() {
            ScalarValue::Bool(v) => v,
            _ => unreachable!("evaluated as bool, not a bool"),
        }
    }

    /// Reads this value as a 64-bit signed integer.
    ///
    /// # Panics
    ///
    /// Panics if the kind is not [`Kind::Int`].
    pub fn as_int(&self) -> i64 {
        self.expect_kind(Kind::Int);
        match self.evaluate() {
            ScalarValue::Int(v) => v,
            _ => unreachable!("evaluated as int, not an int"),
        }
    }

    /// Reads this value as a 64-bit unsigned integer.
    ///
    /// # Panics
    ///
    /// Panics if the kind is not [`Kind::Uint`].
    pub fn as_uint(&self) -> u64 {
        self.expect_kind(Kind::Uint);
        match self.evaluate() {
            ScalarValue::Uint(v) => v,
            _ => unreachable!("evaluated as uint, not a uint"),
        }
    }

    /// Reads this value as a 64-bit float.
    ///
    /// # Panics
    ///
    /// Panics if the kind is not [`Kind::Float`].
    pub fn as_float(&self) -> f64 {
        self.expect_kind(Kind::Float);
        match self.evaluate() {
            ScalarValue::Float(v) => v,
            _ => unreachable!("evaluated as float, not a float"),
        }
    }

    /// Reads this value as a string.
    ///
    /// # Panics
    ///
    /// Panics if the kind is not [`Kind::String`].
    pub fn as_string(&self) -> String {
        self.expect_kind(Kind::String);
        match self.evaluate() {
            ScalarValue::String(v) => v,
            _ => unreachable!("evaluated as string, not a string"),
        }
    }

    /// Reads this value as a UTC timestamp.
    ///
    /// An absent optional handle reads as the zero time.
    ///
    /// # Panics
    ///
    /// Panics if the kind is not [`Kind::Time`].
    pub fn as_time(&self) -> DateTime<Utc> {
        self.expect_kind(Kind::Time);
        match self.evaluate() {
            ScalarValue::Time(v) => v,
            _ => unreachable!("evaluated as time, not a time"),
        }
    }

    /// Borrows the underlying distribution.
    ///
    /// # Panics
    ///
    /// Panics if the kind is not [`Kind::Dist`].
    pub fn as_distribution(&self) -> &Distribution {
        match &self.reader {
            Reader::Dist(dist) => dist,
            Reader::Scalar(_) => {
                panic!("wrong as_* accessor called on a {:?} value", self.kind)
            }
        }
    }

    /// Renders this value as the discriminated record handed to RPC
    /// consumers.
    ///
    /// Time values carry their text form in the string payload.
    pub fn as_rpc_value(&self) -> RpcValue {
        match self.kind {
            Kind::Bool => RpcValue::Bool(self.as_bool()),
            Kind::Int => RpcValue::Int(self.as_int()),
            Kind::Uint => RpcValue::Uint(self.as_uint()),
            Kind::Float => RpcValue::Float(self.as_float()),
            Kind::String => RpcValue::String(self.as_string()),
            Kind::Time => RpcValue::Time(self.as_text_string()),
            Kind::Dist => {
                RpcValue::Dist(RpcDistribution::from_snapshot(&self.as_distribution().snapshot()))
            }
        }
    }

    /// Renders this value as a text-friendly string.
    ///
    /// Booleans render as `true`/`false`, integers in base 10, floats as the
    /// shortest round-tripping decimal, strings wrapped in double quotes,
    /// and times as `<unix-seconds>.<nanoseconds>` with nine nanosecond
    /// digits (`0.000000000` for the zero time).
    ///
    /// # Panics
    ///
    /// Panics if this value is a distribution.
    pub fn as_text_string(&self) -> String {
        match self.kind {
            Kind::Bool => if self.as_bool() { "true" } else { "false" }.to_owned(),
            Kind::Int => self.as_int().to_string(),
            Kind::Uint => self.as_uint().to_string(),
            Kind::Float => self.as_float().to_string(),
            Kind::String => format!("\"{}\"", self.as_string()),
            Kind::Time => format_time_text(self.as_time()),
            Kind::Dist => panic!("as_text_string called on a distribution value"),
        }
    }

    /// Renders this value as an HTML-friendly string.
    ///
    /// Identical to [`as_text_string`](Value::as_text_string) except that
    /// times render as RFC 3339 UTC with nanosecond precision, trailing
    /// zeros trimmed.
    ///
    /// # Panics
    ///
    /// Panics if this value is a distribution.
    pub fn as_html_string(&self) -> String {
        match self.kind {
            Kind::Time => format_time_html(self.as_time()),
            Kind::Dist => panic!("as_html_string called on a distribution value"),
            _ => self.as_text_string(),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Value").field("kind", &self.kind).finish_non_exhaustive()
    }
}

/// The zero time: midnight UTC, January 1 of year 1.
pub(crate) fn zero_time() -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(1, 1, 1)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .expect("year 1 is representable")
        .and_utc()
}

fn format_time_text(time: DateTime<Utc>) -> String {
    if time == zero_time() {
        return "0.000000000".to_owned();
    }
    format!("{}.{:09}", time.timestamp(), time.timestamp_subsec_nanos())
}

fn format_time_html(time: DateTime<Utc>) -> String {
    let mut out = time.format("%Y-%m-%dT%H:%M:%S").to_string();
    let nanos = time.timestamp_subsec_nanos();
    if nanos != 0 {
        let frac = format!("{nanos:09}");
        out.push('.');
        out.push_str(frac.trim_end_matches('0'));
    }
    out.push('Z');
    out
}
