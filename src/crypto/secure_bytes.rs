//! Secure byte container with automatic zeroing on drop
//!
//! Every buffer that holds key material, a passphrase or a decrypted
//! private key section lives in a `SecureBytes`. The wipe happens in
//! `Drop`, so early returns through `?` never leave secrets behind.

use std::ops::{Deref, DerefMut};
use zeroize::Zeroize;

/// A secure container for sensitive bytes that automatically zeroes on drop
#[derive(Zeroize)]
#[zeroize(drop)]
pub struct SecureBytes(Vec<u8>);

impl SecureBytes {
    /// Create a new SecureBytes from a vector
    /// The original vector is consumed and its memory is now managed securely
    pub fn new(data: Vec<u8>) -> Self {
        let secure = Self(data);
        secure.lock_memory();
        secure
    }

    /// Create a zeroed SecureBytes of specific length
    pub fn zeroed(len: usize) -> Self {
        Self::new(vec![0u8; len])
    }

    /// Lock memory to prevent swapping (best effort, may fail without privileges)
    #[cfg(unix)]
    fn lock_memory(&self) {
        if self.0.is_empty() {
            return;
        }
        unsafe {
            libc::mlock(self.0.as_ptr() as *const libc::c_void, self.0.len());
        }
    }

    #[cfg(not(unix))]
    fn lock_memory(&self) {}

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Deref for SecureBytes {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for SecureBytes {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl From<Vec<u8>> for SecureBytes {
    fn from(data: Vec<u8>) -> Self {
        Self::new(data)
    }
}

impl From<&[u8]> for SecureBytes {
    fn from(data: &[u8]) -> Self {
        Self::new(data.to_vec())
    }
}

// Prevent accidental debug printing of secrets
impl std::fmt::Debug for SecureBytes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecureBytes")
            .field("len", &self.0.len())
            .field("data", &"[REDACTED]")
            .finish()
    }
}
