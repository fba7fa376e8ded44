//! Construction macros
//!
//! [`goal!`] builds a compound from mixed scalar arguments the same way the
//! knowledge file syntax does: strings with the `?` sigil become variables,
//! bare strings become atoms, numbers and booleans become their typed terms.

/// Builds a [`Goal`](crate::term::Goal) from a predicate name and arguments.
///
/// ```
/// use siamese::goal;
///
/// let fact = goal!("age", "john", 30);
/// let query = goal!("age", "?Who", "?Age");
/// assert_eq!(fact.name, "age");
/// assert_eq!(query.args.len(), 2);
/// ```
#[macro_export]
macro_rules! goal {
    ($name:expr $(, $arg:expr)* $(,)?) => {{
        let args: ::std::vec::Vec<$crate::term::Term> =
            ::std::vec![$($crate::term::Term::from($arg)),*];
        $crate::term::Compound::new($name, args)
    }};
}
