//! Profile fingerprinting.

use sha2::{Digest, Sha256};

/// Incremental SHA-256 over separated components.
///
/// Each component is terminated by a NUL so `("ab", "c")` and `("a", "bc")`
/// hash differently.
#[derive(Default)]
pub struct Fingerprint {
    hasher: Sha256,
}

impl Fingerprint {
    pub fn new() -> Self {
        Fingerprint {
            hasher: Sha256::new(),
        }
    }

    /// Add a string component.
    pub fn update_str(&mut self, s: &str) -> &mut Self {
        self.hasher.update(s.as_bytes());
        self.hasher.update(b"\0");
        self
    }

    /// Add an optional component; absence is hashed distinctly from `""`.
    pub fn update_opt(&mut self, opt: Option<&str>) -> &mut Self {
        match opt {
            Some(s) => {
                self.hasher.update(b"\x01");
                self.update_str(s)
            }
            None => {
                self.hasher.update(b"\x00");
                self
            }
        }
    }

    /// Finish as a lowercase hex string.
    pub fn finish(self) -> String {
        hex::encode(self.hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn digest(parts: &[Option<&str>]) -> String {
        let mut fp = Fingerprint::new();
        for part in parts {
            fp.update_opt(*part);
        }
        fp.finish()
    }

    #[test]
    fn test_fingerprint_is_stable() {
        let a = digest(&[Some("sleep"), Some("nanosleep")]);
        let b = digest(&[Some("sleep"), Some("nanosleep")]);
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_components_are_separated() {
        let mut ab = Fingerprint::new();
        ab.update_str("ab").update_str("c");
        let mut a = Fingerprint::new();
        a.update_str("a").update_str("bc");
        assert_ne!(ab.finish(), a.finish());
    }

    #[test]
    fn test_absent_differs_from_empty() {
        assert_ne!(digest(&[None]), digest(&[Some("")]));
    }
}
