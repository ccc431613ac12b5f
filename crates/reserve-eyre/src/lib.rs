#![doc = include_str!("../README.md")]

use std::{
    error::Error,
    fmt::{
        self,
        Write as _,
    },
};

pub use eyre;
#[doc(hidden)]
pub use eyre::Result;

/// Installs the `reserve-eyre` hook as the global error report hook.
///
/// **NOTE**: It must be called before any `eyre::Report`s are constructed
/// to prevent the default handler from being installed.
///
/// # Errors
///
/// Calling this function after another handler has been installed will cause
/// an error.
pub fn install() -> Result<()> {
    eyre::set_hook(Box::new(|_| Box::new(ErrorHandler)))?;
    Ok(())
}

struct ErrorHandler;

impl eyre::EyreHandler for ErrorHandler {
    fn debug(&self, error: &(dyn Error + 'static), f: &mut fmt::Formatter<'_>) -> fmt::Result {
        display_chain(error, f)
    }

    fn display(&self, error: &(dyn Error + 'static), f: &mut fmt::Formatter<'_>) -> fmt::Result {
        display_chain(error, f)
    }
}

fn display_chain(error: &(dyn Error + 'static), f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_char('{')?;
    let mut depth: u32 = 0;
    let mut current = Some(error);
    while let Some(layer) = current {
        if depth > 0 {
            f.write_str(", ")?;
        }
        write_layer(depth, layer, f)?;
        depth = depth.saturating_add(1);
        current = layer.source();
    }
    f.write_char('}')
}

fn write_layer(depth: u32, error: &dyn Error, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let mut buf = itoa::Buffer::new();
    f.write_char('"')?;
    f.write_str(buf.format(depth))?;
    f.write_str("\": \"")?;
    write_escaped(&error.to_string(), f)?;
    f.write_char('"')
}

/// Escapes quotes and backslashes so that every layer stays a single string.
fn write_escaped(msg: &str, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for c in msg.chars() {
        match c {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            c => f.write_char(c)?,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fmt;

    use super::display_chain;

    #[derive(Debug)]
    struct Layer {
        msg: &'static str,
        source: Option<Box<Layer>>,
    }

    impl fmt::Display for Layer {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.msg)
        }
    }

    impl std::error::Error for Layer {
        fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
            self.source
                .as_deref()
                .map(|source| source as &(dyn std::error::Error + 'static))
        }
    }

    struct Chain<'a>(&'a Layer);

    impl fmt::Display for Chain<'_> {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            display_chain(self.0, f)
        }
    }

    #[test]
    fn single_error_is_rendered_at_depth_zero() {
        let error = Layer {
            msg: "user not found",
            source: None,
        };
        assert_eq!(r#"{"0": "user not found"}"#, Chain(&error).to_string());
    }

    #[test]
    fn sources_are_rendered_in_order_of_depth() {
        let error = Layer {
            msg: "failed to start",
            source: Some(Box::new(Layer {
                msg: "failed to bind",
                source: Some(Box::new(Layer {
                    msg: "address in use",
                    source: None,
                })),
            })),
        };
        assert_eq!(
            r#"{"0": "failed to start", "1": "failed to bind", "2": "address in use"}"#,
            Chain(&error).to_string(),
        );
    }

    #[test]
    fn quotes_in_messages_are_escaped() {
        let error = Layer {
            msg: r#"bad "leaf""#,
            source: None,
        };
        assert_eq!(r#"{"0": "bad \"leaf\""}"#, Chain(&error).to_string());
    }
}
