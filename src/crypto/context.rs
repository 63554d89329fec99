//! Process-scoped crypto context
//!
//! Owns the deterministic random bit generator used for check integers,
//! salts and any other randomness the crate consumes. The hosting
//! application builds one context, calls [`CryptoContext::init`], and
//! passes it by reference into key scheduling, key derivation and export.

use std::sync::{Mutex, MutexGuard, PoisonError};

use rand::rngs::{OsRng, StdRng};
use rand::{RngCore, SeedableRng};
use tracing::debug;

use crate::error::{Result, SshCryptError};

pub struct CryptoContext {
    rng: Mutex<Option<StdRng>>,
}

impl CryptoContext {
    /// An uninitialized context. Call [`init`](Self::init) before use.
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(None),
        }
    }

    /// Convenience constructor returning an initialized context.
    pub fn initialized() -> Result<Self> {
        let ctx = Self::new();
        ctx.init()?;
        Ok(ctx)
    }

    /// Seed the generator from the operating system. Idempotent.
    pub fn init(&self) -> Result<()> {
        let mut rng = self.lock();
        if rng.is_some() {
            return Ok(());
        }
        *rng = Some(seed_from_os()?);
        debug!("crypto context initialized");
        Ok(())
    }

    /// Release the generator. A later [`init`](Self::init) starts fresh.
    pub fn finalize(&self) {
        if self.lock().take().is_some() {
            debug!("crypto context finalized");
        }
    }

    /// Replace the generator state with a fresh seed from the operating system.
    pub fn reseed(&self) -> Result<()> {
        let mut rng = self.lock();
        if rng.is_none() {
            return Err(SshCryptError::NotInitialized);
        }
        *rng = Some(seed_from_os()?);
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.lock().is_some()
    }

    pub fn ensure_initialized(&self) -> Result<()> {
        if self.is_initialized() {
            Ok(())
        } else {
            Err(SshCryptError::NotInitialized)
        }
    }

    pub fn fill_random(&self, buf: &mut [u8]) -> Result<()> {
        let mut guard = self.lock();
        let rng = guard.as_mut().ok_or(SshCryptError::NotInitialized)?;
        rng.try_fill_bytes(buf)
            .map_err(|e| SshCryptError::Primitive(format!("random generation ({e})")))
    }

    pub fn random_u32(&self) -> Result<u32> {
        let mut buf = [0u8; 4];
        self.fill_random(&mut buf)?;
        Ok(u32::from_ne_bytes(buf))
    }

    fn lock(&self) -> MutexGuard<'_, Option<StdRng>> {
        // The generator state stays valid even if a holder panicked.
        self.rng.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for CryptoContext {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CryptoContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CryptoContext")
            .field("initialized", &self.is_initialized())
            .finish()
    }
}

fn seed_from_os() -> Result<StdRng> {
    StdRng::from_rng(OsRng)
        .map_err(|e| SshCryptError::Primitive(format!("seeding random generator ({e})")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        let ctx = CryptoContext::new();
        assert!(!ctx.is_initialized());
        ctx.init().unwrap();
        ctx.init().unwrap();
        assert!(ctx.is_initialized());
    }

    #[test]
    fn test_reinit_after_finalize() {
        let ctx = CryptoContext::initialized().unwrap();
        ctx.finalize();
        assert!(!ctx.is_initialized());
        assert!(matches!(
            ctx.fill_random(&mut [0u8; 4]),
            Err(SshCryptError::NotInitialized)
        ));
        ctx.init().unwrap();
        ctx.fill_random(&mut [0u8; 4]).unwrap();
    }

    #[test]
    fn test_reseed_requires_init() {
        let ctx = CryptoContext::new();
        assert!(matches!(ctx.reseed(), Err(SshCryptError::NotInitialized)));
        ctx.init().unwrap();
        ctx.reseed().unwrap();
    }

    #[test]
    fn test_random_output_differs() {
        let ctx = CryptoContext::initialized().unwrap();
        let mut a = [0u8; 32];
        let mut b = [0u8; 32];
        ctx.fill_random(&mut a).unwrap();
        ctx.fill_random(&mut b).unwrap();
        assert_ne!(a, b);
    }
}
