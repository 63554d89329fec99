//! SSH wire encoding: big-endian `uint32`, length-prefixed `string`.
//!
//! The reader borrows its input and never copies; the writer keeps its
//! buffer in [`Zeroizing`] storage because private sections pass through it.

use zeroize::Zeroizing;

use crate::crypto::SecureBytes;
use crate::error::{Result, SshCryptError};

pub(crate) struct Reader<'a> {
    data: &'a [u8],
    what: &'static str,
}

impl<'a> Reader<'a> {
    /// `what` names the structure being read, for error messages.
    pub(crate) fn new(data: &'a [u8], what: &'static str) -> Self {
        Self { data, what }
    }

    pub(crate) fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        if self.data.len() < len {
            return Err(SshCryptError::format(format!(
                "{} truncated: wanted {} bytes, {} left",
                self.what,
                len,
                self.data.len()
            )));
        }
        let (head, tail) = self.data.split_at(len);
        self.data = tail;
        Ok(head)
    }

    pub(crate) fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_bytes(1)?[0])
    }

    pub(crate) fn read_u32(&mut self) -> Result<u32> {
        let mut be = [0u8; 4];
        be.copy_from_slice(self.read_bytes(4)?);
        Ok(u32::from_be_bytes(be))
    }

    pub(crate) fn read_string(&mut self) -> Result<&'a [u8]> {
        let len = self.read_u32()? as usize;
        self.read_bytes(len)
    }

    /// A `string` that must be valid UTF-8, e.g. an algorithm name.
    pub(crate) fn read_str(&mut self) -> Result<&'a str> {
        let raw = self.read_string()?;
        std::str::from_utf8(raw)
            .map_err(|_| SshCryptError::format(format!("{}: name is not UTF-8", self.what)))
    }

    pub(crate) fn remaining(&self) -> usize {
        self.data.len()
    }

    /// Fail unless every byte has been consumed.
    pub(crate) fn finish(&self) -> Result<()> {
        if self.data.is_empty() {
            Ok(())
        } else {
            Err(SshCryptError::format(format!(
                "{} bytes of trailing data after {}",
                self.data.len(),
                self.what
            )))
        }
    }
}

#[derive(Default)]
pub(crate) struct Writer {
    buf: Zeroizing<Vec<u8>>,
}

impl Writer {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn put_u8(&mut self, value: u8) -> &mut Self {
        self.buf.push(value);
        self
    }

    pub(crate) fn put_u32(&mut self, value: u32) -> &mut Self {
        self.buf.extend_from_slice(&value.to_be_bytes());
        self
    }

    pub(crate) fn put_raw(&mut self, bytes: &[u8]) -> &mut Self {
        self.buf.extend_from_slice(bytes);
        self
    }

    pub(crate) fn put_string(&mut self, bytes: &[u8]) -> &mut Self {
        // Every string we emit is far below 4 GiB.
        self.put_u32(bytes.len() as u32).put_raw(bytes)
    }

    pub(crate) fn len(&self) -> usize {
        self.buf.len()
    }

    pub(crate) fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    /// Public data; the copy does not need wiping.
    pub(crate) fn into_vec(self) -> Vec<u8> {
        self.buf.to_vec()
    }

    pub(crate) fn into_secure(self) -> SecureBytes {
        SecureBytes::from(&self.buf[..])
    }
}
