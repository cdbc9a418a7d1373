//! Writers that mask sensitive values before output.

use crate::masking::SensitiveDataMasker;
use std::io;
use std::sync::Arc;
use tracing_subscriber::fmt::MakeWriter;

/// Wraps a [`MakeWriter`] so every formatted event is masked before it is
/// written.
///
/// `tracing-subscriber` formats one event into a buffer and writes it with a
/// single call, so patterns never straddle two writes.
#[derive(Debug, Clone)]
pub struct MaskingMakeWriter<M> {
    inner: M,
    masker: Arc<SensitiveDataMasker>,
}

impl<M> MaskingMakeWriter<M> {
    /// Wraps `inner`.
    pub fn new(inner: M, masker: Arc<SensitiveDataMasker>) -> Self {
        Self { inner, masker }
    }
}

impl<'a, M> MakeWriter<'a> for MaskingMakeWriter<M>
where
    M: MakeWriter<'a>,
{
    type Writer = MaskingWriter<M::Writer>;

    fn make_writer(&'a self) -> Self::Writer {
        MaskingWriter {
            inner: self.inner.make_writer(),
            masker: Arc::clone(&self.masker),
        }
    }
}

/// Writer produced by [`MaskingMakeWriter`].
#[derive(Debug)]
pub struct MaskingWriter<W> {
    inner: W,
    masker: Arc<SensitiveDataMasker>,
}

impl<W: io::Write> io::Write for MaskingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let text = String::from_utf8_lossy(buf);
        let masked = self.masker.mask_string(&text);
        self.inner.write_all(masked.as_bytes())?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::Mutex;

    #[derive(Clone, Default)]
    struct Buffer(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Buffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_writer_masks_tokens() {
        let buffer = Buffer::default();
        let sink = buffer.clone();
        let make = MaskingMakeWriter::new(
            move || sink.clone(),
            Arc::new(SensitiveDataMasker::new()),
        );

        let mut writer = make.make_writer();
        let line = b"opening ws://localhost:8000/ws?token=abcdefghijklmnop1234\n";
        assert_eq!(writer.write(line).unwrap(), line.len());

        let written = String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap();
        assert_eq!(written, "opening ws://localhost:8000/ws?token=abc***234\n");
    }

    #[test]
    fn test_writer_passes_plain_text() {
        let buffer = Buffer::default();
        let sink = buffer.clone();
        let make = MaskingMakeWriter::new(
            move || sink.clone(),
            Arc::new(SensitiveDataMasker::new()),
        );

        make.make_writer().write_all(b"connection conn-3 opened\n").unwrap();

        let written = String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap();
        assert_eq!(written, "connection conn-3 opened\n");
    }
}
