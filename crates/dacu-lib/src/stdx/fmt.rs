//! Helper types for formatting report output.

use std::fmt::Display;

/// A word which is displayed in singular (1) or plural (anything else), the
/// plural is created by appending an `s`.
///
/// # Examples
/// ```
/// # use dacu_lib::stdx::fmt::Term;
/// assert_eq!(Term::simple("task").with(1).to_string(), "task");
/// assert_eq!(Term::simple("task").with(0).to_string(), "tasks");
/// assert_eq!(Term::simple("data set").with(2).to_string(), "data sets");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Term<'a> {
    singular: &'a str,
}

impl<'a> Term<'a> {
    /// Creates a term from its singular form.
    pub const fn simple(singular: &'a str) -> Self {
        Self { singular }
    }

    /// Formats this term for the given count.
    pub fn with(self, count: usize) -> impl Display + 'a {
        PluralDisplay {
            term: self,
            is_plural: count != 1,
        }
    }
}

struct PluralDisplay<'a> {
    term: Term<'a>,
    is_plural: bool,
}

impl Display for PluralDisplay<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let singular = self.term.singular;
        if self.is_plural {
            write!(f, "{singular}s")
        } else {
            write!(f, "{singular}")
        }
    }
}
