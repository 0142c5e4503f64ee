//! Binary-versus-text classification of blob content

/// Bytes inspected when looking for a NUL.
pub const FIRST_FEW_BYTES: usize = 8000;

/// Decides whether a buffer is displayed as a hex dump or as text.
///
/// Implementations must be pure functions of the buffer.
pub trait BinaryClassifier {
    fn is_binary(&self, buf: &[u8]) -> bool;
}

/// Treats a buffer as binary when a NUL byte appears in its first 8000 bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct NulScan;

impl BinaryClassifier for NulScan {
    fn is_binary(&self, buf: &[u8]) -> bool {
        let len = buf.len().min(FIRST_FEW_BYTES);
        buf[..len].contains(&0)
    }
}

impl<F> BinaryClassifier for F
where
    F: Fn(&[u8]) -> bool,
{
    fn is_binary(&self, buf: &[u8]) -> bool {
        self(buf)
    }
}
