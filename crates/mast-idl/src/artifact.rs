//! Precompiled-artifact front end.
//!
//! An IDL parser can ship as a precompiled binary artifact exposing a
//! page-granular working memory and a parse entrypoint that drives a
//! [`DocumentSink`]. [`ArtifactParser`] owns all bookkeeping around one
//! artifact instance:
//! - input is marshalled as UTF-8 into artifact memory before parsing
//! - memory grows monotonically to fit arbitrary input and never
//!   shrinks, amortizing allocation across calls
//! - the input region is zeroed and the artifact result released on
//!   every exit path, success or failure
//! - `&mut self` serializes parse calls per instance; the memory must
//!   not be shared by concurrent parses

use tracing::{debug, trace};

use crate::builder::{DocumentBuilder, DocumentSink};
use crate::document::IdlDocument;
use crate::error::ParseError;

/// Granularity of artifact memory growth, in bytes.
pub const PAGE_SIZE: usize = 0x10000;

/// Result word of an artifact parse: 0 = success, anything else is
/// fatal and `message` carries the artifact's diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactStatus {
    pub code: u32,
    pub message: String,
}

impl ArtifactStatus {
    pub fn ok() -> Self {
        Self {
            code: 0,
            message: String::new(),
        }
    }

    pub fn error(code: u32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// A precompiled parser artifact instance.
///
/// Implementations wrap whatever hosts the artifact; this crate only
/// assumes a linear working memory and the visit protocol.
pub trait ProgramArtifact {
    /// Current size of the working memory in bytes.
    fn memory_len(&self) -> usize;

    /// Grow the working memory by `pages` pages. Memory never shrinks.
    fn grow(&mut self, pages: usize);

    /// Copy `data` into memory at `offset`.
    fn write(&mut self, offset: usize, data: &[u8]);

    /// Zero `len` bytes of memory at `offset`.
    fn zero(&mut self, offset: usize, len: usize);

    /// Parse the UTF-8 text at `offset..offset + len`, driving `sink`
    /// with visit notifications.
    fn parse(&mut self, offset: usize, len: usize, sink: &mut dyn DocumentSink) -> ArtifactStatus;

    /// Release the artifact-side result of the last parse.
    fn free_result(&mut self);
}

/// Owns one artifact instance and its parse-call bookkeeping.
#[derive(Debug)]
pub struct ArtifactParser<A> {
    artifact: A,
}

impl<A: ProgramArtifact> ArtifactParser<A> {
    pub fn new(artifact: A) -> Self {
        Self { artifact }
    }

    /// Parse `text` through the artifact.
    ///
    /// Takes `&mut self`: one parse at a time per instance.
    pub fn parse(&mut self, text: &str) -> Result<IdlDocument, ParseError> {
        let bytes = text.as_bytes();

        let have = self.artifact.memory_len();
        if have < bytes.len() {
            let pages = (bytes.len() - have + PAGE_SIZE - 1) / PAGE_SIZE;
            trace!(have, needed = bytes.len(), pages, "growing artifact memory");
            self.artifact.grow(pages);
        }
        self.artifact.write(0, bytes);

        let mut builder = DocumentBuilder::new();
        let status = self.artifact.parse(0, bytes.len(), &mut builder);

        // Zero the input and release the result before inspecting the
        // status, so failures leave no text behind in artifact memory.
        self.artifact.zero(0, bytes.len());
        self.artifact.free_result();

        if status.code != 0 {
            return Err(ParseError::Artifact {
                code: status.code,
                message: status.message,
            });
        }
        let doc = builder.finish()?;
        debug!(services = doc.services.len(), "artifact parse complete");
        Ok(doc)
    }

    pub fn into_inner(self) -> A {
        self.artifact
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::accept_document;
    use crate::parser;

    /// Test double: parses the marshalled text with the text front end
    /// and replays the result through the sink, while recording every
    /// memory operation.
    struct ScriptedArtifact {
        memory: Vec<u8>,
        grows: Vec<usize>,
        zeroed_regions: Vec<(usize, usize)>,
        freed: usize,
        fail_with: Option<ArtifactStatus>,
    }

    impl ScriptedArtifact {
        fn new() -> Self {
            Self {
                memory: Vec::new(),
                grows: Vec::new(),
                zeroed_regions: Vec::new(),
                freed: 0,
                fail_with: None,
            }
        }
    }

    impl ProgramArtifact for ScriptedArtifact {
        fn memory_len(&self) -> usize {
            self.memory.len()
        }

        fn grow(&mut self, pages: usize) {
            self.grows.push(pages);
            self.memory.resize(self.memory.len() + pages * PAGE_SIZE, 0);
        }

        fn write(&mut self, offset: usize, data: &[u8]) {
            self.memory[offset..offset + data.len()].copy_from_slice(data);
        }

        fn zero(&mut self, offset: usize, len: usize) {
            self.zeroed_regions.push((offset, len));
            self.memory[offset..offset + len].fill(0);
        }

        fn parse(
            &mut self,
            offset: usize,
            len: usize,
            sink: &mut dyn DocumentSink,
        ) -> ArtifactStatus {
            if let Some(status) = self.fail_with.clone() {
                return status;
            }
            let text = std::str::from_utf8(&self.memory[offset..offset + len]).unwrap();
            match parser::parse(text) {
                Ok(doc) => {
                    accept_document(&doc, sink);
                    ArtifactStatus::ok()
                }
                Err(e) => ArtifactStatus::error(1, e.to_string()),
            }
        }

        fn free_result(&mut self) {
            self.freed += 1;
        }
    }

    const IDL: &str = r#"
        type Alias = opt string;
        service Counter {
            Add : (value: u32) -> u32;
        };
    "#;

    #[test]
    fn test_artifact_replay_equals_text_parse() {
        let mut parser = ArtifactParser::new(ScriptedArtifact::new());
        let via_artifact = parser.parse(IDL).unwrap();
        let via_text = crate::parser::parse(IDL).unwrap();
        assert_eq!(via_artifact, via_text);
    }

    #[test]
    fn test_memory_zeroed_and_freed_on_success() {
        let mut parser = ArtifactParser::new(ScriptedArtifact::new());
        parser.parse(IDL).unwrap();
        let artifact = parser.into_inner();
        assert_eq!(artifact.zeroed_regions, vec![(0, IDL.len())]);
        assert_eq!(artifact.freed, 1);
        assert!(artifact.memory.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_memory_zeroed_and_freed_on_failure() {
        let mut artifact = ScriptedArtifact::new();
        artifact.fail_with = Some(ArtifactStatus::error(7, "bad document"));
        let mut parser = ArtifactParser::new(artifact);

        let err = parser.parse(IDL).unwrap_err();
        assert_eq!(
            err,
            ParseError::Artifact {
                code: 7,
                message: "bad document".into()
            }
        );

        let artifact = parser.into_inner();
        assert_eq!(artifact.zeroed_regions, vec![(0, IDL.len())]);
        assert_eq!(artifact.freed, 1);
    }

    #[test]
    fn test_growth_is_monotonic_and_amortized() {
        let mut parser = ArtifactParser::new(ScriptedArtifact::new());

        // First parse grows to one page.
        parser.parse(IDL).unwrap();
        // Second parse of a small input needs no further growth.
        parser.parse("type A = u8;").unwrap();
        // An input larger than one page grows again, never shrinks.
        let big_field = "x".repeat(PAGE_SIZE);
        let big = format!("type Big = struct {{ {}: u8 }};", big_field);
        parser.parse(&big).unwrap();

        let artifact = parser.into_inner();
        assert_eq!(artifact.grows.len(), 2);
        assert_eq!(artifact.grows[0], 1);
        assert!(artifact.memory_len() >= big.len());
    }

    #[test]
    fn test_syntax_error_surfaces_artifact_message() {
        let mut parser = ArtifactParser::new(ScriptedArtifact::new());
        let err = parser.parse("type ;;;").unwrap_err();
        match err {
            ParseError::Artifact { code, message } => {
                assert_eq!(code, 1);
                assert!(message.contains("parse error"));
            }
            other => panic!("expected artifact error, got {:?}", other),
        }
    }
}
