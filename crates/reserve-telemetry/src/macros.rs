// re-export so that they need not be imported by downstream users.
// hidden because they shouldn't be imported.
#[doc(hidden)]
pub use const_format::{
    concatcp as __concatcp,
    map_ascii_case as __map_ascii_case,
    Case as __Case,
};

/// Declare a `const` string slice, using the declaring crate's name as a
/// prefix and the lower-cased variable name as a suffix.
///
/// ```text
/// PROOFS_SERVED := ${CARGO_CRATE_NAME}_proofs_served;
/// ```
///
/// # Examples
/// ```
/// use reserve_telemetry::metric_name;
/// metric_name!(pub const PROOFS_SERVED);
/// // The prefix is `reserve_telemetry` because this doctest belongs to this
/// // crate. Other crates get their own `CARGO_CRATE_NAME` as prefix.
/// assert_eq!(PROOFS_SERVED, "reserve_telemetry_proofs_served");
/// ```
#[macro_export]
macro_rules! metric_name {
    ($vis:vis const $($tt:tt)*) => {
        $crate::__metric_name_internal!(
            $vis [$($tt)*] [::core::stringify!($($tt)*)]
        );
    }
}

#[doc(hidden)]
#[macro_export]
macro_rules! __metric_name_internal {
    ($vis:vis [$name:ident][$suffix:expr]) => {
        $vis const $name: &str = $crate::macros::__concatcp!(
            ::core::env!("CARGO_CRATE_NAME"),
            "_",
            $crate::macros::__map_ascii_case!($crate::macros::__Case::Lower, $suffix),
        );
    };
}
