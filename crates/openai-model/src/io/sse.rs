use std::str;

use super::{Chunks, ChunksError};

#[derive(Debug, PartialEq, Eq)]
pub enum Error {
    Chunks(ChunksError),
    InvalidUtf8,
}

/// Reads the `data` payloads of server-sent events from a chunk stream.
///
/// Only what chat-completion streams use is supported: events are separated
/// by a blank line, `data` lines of one event are joined with `\n`, comment
/// lines and other fields are skipped. A trailing event without its blank
/// line is dropped.
pub struct Sse {
    buf: Vec<u8>,
    chunks: Chunks,
}

impl Sse {
    #[inline]
    pub fn new(chunks: Chunks) -> Self {
        Self {
            buf: Vec::new(),
            chunks,
        }
    }

    pub async fn next_event(&mut self) -> Result<Option<String>, Error> {
        loop {
            if let Some(event) = self.take_event()? {
                return Ok(Some(event));
            }
            match self.chunks.next_chunk().await.map_err(Error::Chunks)? {
                Some(bytes) => self.buf.extend_from_slice(&bytes),
                None => return Ok(None),
            }
        }
    }

    /// Pops the first complete event that carries data, if any.
    ///
    /// Chunks may split a multi-byte character, so UTF-8 is only checked
    /// once a whole event block is buffered.
    fn take_event(&mut self) -> Result<Option<String>, Error> {
        while let Some(end) = find_blank_line(&self.buf) {
            let block: Vec<u8> = self.buf.drain(..end.consumed).collect();
            let block = str::from_utf8(&block[..end.block_len])
                .map_err(|_| Error::InvalidUtf8)?;

            let mut data: Option<String> = None;
            for line in block.lines() {
                let Some(value) = line.strip_prefix("data:") else {
                    // Comments (`:`) and `event`/`id`/`retry` fields.
                    continue;
                };
                let value = value.strip_prefix(' ').unwrap_or(value);
                match &mut data {
                    Some(data) => {
                        data.push('\n');
                        data.push_str(value);
                    }
                    None => data = Some(value.to_owned()),
                }
            }
            if data.is_some() {
                return Ok(data);
            }
        }
        Ok(None)
    }
}

struct BlockEnd {
    block_len: usize,
    consumed: usize,
}

fn find_blank_line(buf: &[u8]) -> Option<BlockEnd> {
    let lf = buf.windows(2).position(|w| w == b"\n\n");
    let crlf = buf.windows(4).position(|w| w == b"\r\n\r\n");
    match (lf, crlf) {
        (Some(lf), Some(crlf)) if crlf < lf => Some(BlockEnd {
            block_len: crlf,
            consumed: crlf + 4,
        }),
        (Some(lf), _) => Some(BlockEnd {
            block_len: lf,
            consumed: lf + 2,
        }),
        (None, Some(crlf)) => Some(BlockEnd {
            block_len: crlf,
            consumed: crlf + 4,
        }),
        (None, None) => None,
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;

    fn sse(chunks: &[&'static [u8]]) -> Sse {
        Sse::new(Chunks::from_fixture(
            chunks.iter().map(|c| Bytes::from_static(c)),
        ))
    }

    #[tokio::test]
    async fn test_normal_events() {
        let mut sse = sse(&[b"data: {\"id\":1}\n\n", b"data: [DONE]\n\n"]);
        assert_eq!(sse.next_event().await.unwrap().unwrap(), "{\"id\":1}");
        assert_eq!(sse.next_event().await.unwrap().unwrap(), "[DONE]");
        assert_eq!(sse.next_event().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_split_across_chunks() {
        let mut sse = sse(&[b"da", b"ta: Ro", b"me\n", b"\n"]);
        assert_eq!(sse.next_event().await.unwrap().unwrap(), "Rome");
        assert_eq!(sse.next_event().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_split_multibyte_character() {
        // "°C" with the degree sign split between chunks.
        let mut sse = sse(&[b"data: 21\xc2", b"\xb0C\r\n\r\n"]);
        assert_eq!(sse.next_event().await.unwrap().unwrap(), "21°C");
    }

    #[tokio::test]
    async fn test_comments_and_fields_are_skipped() {
        let mut sse = sse(&[
            b": keep-alive\n\n",
            b"event: message\nid: 7\ndata:first\ndata: second\n\n",
        ]);
        assert_eq!(sse.next_event().await.unwrap().unwrap(), "first\nsecond");
        assert_eq!(sse.next_event().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_incomplete_or_invalid() {
        let mut incomplete = sse(&[b"data: hello\n"]);
        assert_eq!(incomplete.next_event().await.unwrap(), None);

        let mut invalid = sse(&[b"data: \xff\n\n"]);
        assert_eq!(invalid.next_event().await.unwrap_err(), Error::InvalidUtf8);
    }
}
