//! Utilities to emit fields using their [`std::fmt::Display`] implementation.
use std::{
    fmt::{
        self,
        Display,
        Formatter,
        Result,
    },
    io,
    str,
};

use serde_with::SerializeDisplay;

/// Format `bytes` as lower-cased hex.
///
/// # Example
/// ```
/// use reserve_telemetry::display;
/// let root = [0xb1u8, 0x23, 0x1d, 0xe3];
/// tracing::info!(root = %display::hex(&root), "computed merkle root");
/// assert_eq!("b1231de3", display::hex(&root).to_string());
/// ```
pub fn hex<T: AsRef<[u8]> + ?Sized>(bytes: &T) -> Hex<'_> {
    Hex(bytes.as_ref())
}

/// A newtype wrapper of a byte slice that implements [`std::fmt::Display`].
///
/// To be used in tracing contexts. See the [`self::hex`] utility.
#[derive(SerializeDisplay)]
pub struct Hex<'a>(&'a [u8]);

impl Display for Hex<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        for byte in self.0 {
            f.write_fmt(format_args!("{byte:02x}"))?;
        }
        Ok(())
    }
}

/// Format `serializable` as single-line JSON.
///
/// # Example
/// ```
/// use reserve_telemetry::display;
/// #[derive(serde::Serialize)]
/// struct Account {
///     id: u64,
///     balance: u64,
/// }
/// let account = Account {
///     id: 3,
///     balance: 3333,
/// };
/// tracing::info!(account = %display::json(&account), "serving proof");
/// assert_eq!(r#"{"id":3,"balance":3333}"#, display::json(&account).to_string());
/// ```
pub fn json<T>(serializable: &T) -> Json<'_, T>
where
    T: serde::Serialize,
{
    Json(serializable)
}

/// A newtype wrapper of a serializable type that implements [`std::fmt::Display`].
///
/// To be used in tracing contexts. See the [`self::json`] utility.
///
/// # Panics
/// The type must not contain non-utf8 fields, nor can any of the type's fields or variants
/// have [`serde::Serialize`] implementations that are fallible. The [`Display`] implementation
/// will return an error otherwise.
pub struct Json<'a, T>(&'a T);

// NOTE: Adapted from serde_json's `Display` implementation for `serde_json::Value`.
impl<T> Display for Json<'_, T>
where
    T: serde::Serialize,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        struct WriterFormatter<'a, 'b: 'a> {
            inner: &'a mut Formatter<'b>,
        }

        impl io::Write for WriterFormatter<'_, '_> {
            fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
                let s = str::from_utf8(buf).map_err(io::Error::other)?;
                self.inner.write_str(s).map_err(io_error)?;
                Ok(buf.len())
            }

            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        fn io_error(_: fmt::Error) -> io::Error {
            // Error value does not matter because Display impl just maps it
            // back to fmt::Error.
            io::Error::other("fmt error")
        }

        let mut wr = WriterFormatter {
            inner: f,
        };
        serde_json::to_writer(&mut wr, self.0).map_err(|_| fmt::Error)
    }
}
