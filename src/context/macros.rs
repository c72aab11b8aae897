//! Declarative schema macros.
//!
//! Each macro takes a comma-separated list of step-like values (flags,
//! processors, contexts, or `Step`s) and returns
//! `Result<Context, ConfigError>`.

/// Primitive schema.
///
/// # Example
///
/// ```
/// use carafe::prelude::*;
///
/// let name = prim![optional(), is_str(), maxlength(5)].unwrap();
/// assert_eq!(name.validate("carafe").unwrap(), Data::from("caraf"));
/// assert_eq!(name.validate(Data::Missing).unwrap(), Data::Missing);
/// ```
#[macro_export]
macro_rules! prim {
    ($($step:expr),* $(,)?) => {
        {
            let steps: ::std::vec::Vec<$crate::processors::Step> =
                ::std::vec![$($crate::processors::IntoStep::into_step($step)),*];
            $crate::context::prim(steps)
        }
    };
}

/// Array schema.
#[macro_export]
macro_rules! arr {
    ($($step:expr),* $(,)?) => {
        {
            let steps: ::std::vec::Vec<$crate::processors::Step> =
                ::std::vec![$($crate::processors::IntoStep::into_step($step)),*];
            $crate::context::arr(steps)
        }
    };
}

/// Object schema.
///
/// # Example
///
/// ```
/// use carafe::prelude::*;
/// use serde_json::json;
///
/// # fn main() -> Result<(), ConfigError> {
/// let user = obj![
///     prim![required(), is_str()]?.apply_to("name"),
///     unmatched_properties(UnmatchedPolicy::Remove),
/// ]?;
///
/// let out = user.validate(json!({"name": "ada", "admin": true})).unwrap();
/// assert_eq!(out, Data::from(json!({"name": "ada"})));
/// # Ok(())
/// # }
/// ```
#[macro_export]
macro_rules! obj {
    ($($step:expr),* $(,)?) => {
        {
            let steps: ::std::vec::Vec<$crate::processors::Step> =
                ::std::vec![$($crate::processors::IntoStep::into_step($step)),*];
            $crate::context::obj(steps)
        }
    };
}

/// Array context whose unqualified steps run on every item.
#[macro_export]
macro_rules! items {
    ($($step:expr),* $(,)?) => {
        {
            let steps: ::std::vec::Vec<$crate::processors::Step> =
                ::std::vec![$($crate::processors::IntoStep::into_step($step)),*];
            $crate::context::items(steps)
        }
    };
}

/// Object context whose unqualified steps run on every member value.
#[macro_export]
macro_rules! members {
    ($($step:expr),* $(,)?) => {
        {
            let steps: ::std::vec::Vec<$crate::processors::Step> =
                ::std::vec![$($crate::processors::IntoStep::into_step($step)),*];
            $crate::context::members(steps)
        }
    };
}
