use std::{
    fmt,
    fmt::{Debug, Display},
};

/// A wrapper for sensitive values (API secrets, signing keys) that must never end up in log output.
///
/// The wrapped value can only be read via an explicit call to [`Secret::reveal`], and both the `Debug` and `Display`
/// implementations print a redaction marker instead of the value.
#[derive(Clone, Default)]
pub struct Secret<T>
where T: Clone + Default
{
    value: T,
}

impl<T: Clone + Default> Secret<T> {
    pub fn new(value: T) -> Self {
        Self { value }
    }

    /// Deliberately verbose. Call sites that handle the raw secret should be easy to grep for.
    pub fn reveal(&self) -> &T {
        &self.value
    }

    /// Consumes the wrapper and returns the raw secret.
    pub fn into_inner(self) -> T {
        self.value
    }
}

impl<T: Clone + Default> From<T> for Secret<T> {
    fn from(value: T) -> Self {
        Self::new(value)
    }
}

impl<T: Clone + Default> Debug for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("****")
    }
}

impl<T: Clone + Default> Display for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("****")
    }
}

#[cfg(test)]
mod test {
    use super::Secret;

    #[test]
    fn secrets_are_redacted_in_format_output() {
        let secret = Secret::new("s3cr3t".to_string());
        assert_eq!(format!("{secret}"), "****");
        assert_eq!(format!("{secret:?}"), "****");
        assert_eq!(secret.reveal(), "s3cr3t");
    }
}
