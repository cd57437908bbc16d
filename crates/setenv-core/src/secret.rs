//! Redacted, zeroize-on-drop string wrappers.
//!
//! [`Passphrase`] holds the password a secret store is keyed by and
//! [`SecretValue`] holds one decrypted secret. Both print as `[REDACTED]`
//! and wipe their buffer when dropped.

use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

macro_rules! redacted_string {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Default, Zeroize, ZeroizeOnDrop)]
        pub struct $name {
            inner: String,
        }

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self {
                    inner: value.into(),
                }
            }

            /// Expose the plaintext. Use sparingly.
            pub fn expose(&self) -> &str {
                &self.inner
            }

            pub fn is_empty(&self) -> bool {
                self.inner.is_empty()
            }

            pub fn len(&self) -> usize {
                self.inner.len()
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("[REDACTED]")
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("[REDACTED]")
            }
        }

        impl PartialEq for $name {
            fn eq(&self, other: &Self) -> bool {
                constant_time_eq(self.inner.as_bytes(), other.inner.as_bytes())
            }
        }

        impl Eq for $name {}

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self::new(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self::new(s)
            }
        }
    };
}

redacted_string!(
    /// Password used to derive per-secret encryption keys.
    Passphrase
);

redacted_string!(
    /// A decrypted secret value held in memory.
    SecretValue
);

impl PartialEq<&str> for SecretValue {
    fn eq(&self, other: &&str) -> bool {
        constant_time_eq(self.inner.as_bytes(), other.as_bytes())
    }
}

/// Constant-time byte comparison.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
