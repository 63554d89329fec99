use thiserror::Error;

pub type Result<T> = std::result::Result<T, SshCryptError>;

/// Coarse classification of [`SshCryptError`].
///
/// Callers in the transport layer use this to decide whether a failure is
/// a protocol-fatal abort (authentication) or a rejected input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Unknown algorithm, bad key length, missing passphrase, misuse of a context.
    Configuration,
    /// Malformed armor, base64, binary body or padding.
    Format,
    /// MAC/tag mismatch or failed private key check.
    Authentication,
    /// The underlying primitive reported an internal error.
    Primitive,
    /// I/O while obtaining a passphrase.
    Io,
}

#[derive(Debug, Error)]
pub enum SshCryptError {
    #[error("unsupported cipher '{0}'")]
    UnknownCipher(String),

    #[error("unsupported KDF '{0}'")]
    UnsupportedKdf(String),

    #[error("only one key per container is supported ({0} present)")]
    UnsupportedKeyCount(u32),

    #[error("key material too large: {needed} bytes needed, at most {max} supported")]
    KeyMaterialTooLarge { needed: usize, max: usize },

    #[error("invalid {what} length: need at least {expected} bytes, got {got}")]
    InvalidKeyLength {
        what: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("cipher '{cipher}' does not support {operation}")]
    UnsupportedOperation {
        cipher: &'static str,
        operation: &'static str,
    },

    #[error("packet {got} does not match the pending decryption state for packet {expected}")]
    OutOfSequence { expected: u64, got: u64 },

    #[error("no passphrase provided")]
    NoPassphrase,

    #[error("passphrase longer than {0} bytes")]
    PassphraseTooLong(usize),

    #[error("crypto context is not initialized")]
    NotInitialized,

    #[error("operation cancelled by user")]
    Cancelled,

    #[error("malformed data: {0}")]
    Format(String),

    #[error("invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("length {len} is not a multiple of the block size {block_size}")]
    NotBlockAligned { len: usize, block_size: usize },

    #[error("invalid padding in private key section")]
    InvalidPadding,

    #[error("MAC verification failed")]
    MacMismatch,

    #[error("private key check failed: wrong passphrase or corrupt key")]
    WrongPassphrase,

    #[error("{0} failed")]
    Primitive(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SshCryptError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownCipher(_)
            | Self::UnsupportedKdf(_)
            | Self::UnsupportedKeyCount(_)
            | Self::KeyMaterialTooLarge { .. }
            | Self::InvalidKeyLength { .. }
            | Self::UnsupportedOperation { .. }
            | Self::OutOfSequence { .. }
            | Self::NoPassphrase
            | Self::PassphraseTooLong(_)
            | Self::NotInitialized
            | Self::Cancelled => ErrorKind::Configuration,
            Self::Format(_) | Self::Base64(_) | Self::NotBlockAligned { .. } | Self::InvalidPadding => {
                ErrorKind::Format
            }
            Self::MacMismatch | Self::WrongPassphrase => ErrorKind::Authentication,
            Self::Primitive(_) => ErrorKind::Primitive,
            Self::Io(_) => ErrorKind::Io,
        }
    }

    pub(crate) fn format(msg: impl Into<String>) -> Self {
        Self::Format(msg.into())
    }
}
