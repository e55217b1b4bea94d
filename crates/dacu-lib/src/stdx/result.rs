//! Extensions for the [`Result`] type.

/// Extensions for the [`Result`] type.
pub trait ResultEx<T, E> {
    /// Ignores the subset of the error for which `check` returns true,
    /// returning `None` instead.
    ///
    /// # Examples
    /// ```no_run
    /// # use std::fs;
    /// # use std::io::ErrorKind;
    /// use dacu_lib::stdx::result::ResultEx;
    /// // a missing config is not an error, it's simply absent
    /// let config = fs::read_to_string(".dacu/config.toml")
    ///     .ignore(|e| e.kind() == ErrorKind::NotFound)?;
    /// # Ok::<_, Box<dyn std::error::Error>>(())
    /// ```
    fn ignore<F>(self, check: F) -> Result<Option<T>, E>
    where
        F: FnOnce(&E) -> bool;

    /// Ignores the subset of the error for which `check` returns true,
    /// returning `Default::default` instead.
    fn ignore_default<F>(self, check: F) -> Result<T, E>
    where
        T: Default,
        F: FnOnce(&E) -> bool;
}

impl<T, E> ResultEx<T, E> for Result<T, E> {
    fn ignore<F>(self, check: F) -> Result<Option<T>, E>
    where
        F: FnOnce(&E) -> bool,
    {
        match self {
            Ok(value) => Ok(Some(value)),
            Err(err) if check(&err) => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn ignore_default<F>(self, check: F) -> Result<T, E>
    where
        T: Default,
        F: FnOnce(&E) -> bool,
    {
        self.ignore(check).map(Option::unwrap_or_default)
    }
}
