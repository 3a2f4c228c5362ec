//! Streaming evented XML/HTML-ish push parser.
//!
//! ## Description
//!
//! Feed consecutive chunks of text (or UTF-8 bytes) into a [`Parser`] and
//! receive semantic events through a [`Handler`]: tag opens, tag closes,
//! attributes, text runs, comments, CDATA sections, processing
//! instructions, doctype declarations and diagnostics. No document tree is
//! ever built. Memory stays bounded even on pathological input:
//! every internal buffer is watched against [`Config::max_buffer_length`],
//! and oversized text or CDATA regions spill as partial events.
//!
//! Two fidelity modes are supported: strict XML, and a lenient HTML-ish
//! mode that recovers from unencoded `<`, unquoted attribute values,
//! unmatched closing tags and friends. XML-namespace resolution, name case
//! normalization, whitespace handling and in-stream entity expansion are
//! all opt-in through [`Config`].
//!
//! ## Example
//!
//! ```rust
//! use sax::{Config, Handler, Parser, Tag};
//!
//! #[derive(Default)]
//! struct Outline {
//!     depth: usize,
//!     lines: Vec<String>,
//! }
//!
//! impl Handler for Outline {
//!     // every open gets exactly one close, self-closing elements included
//!     fn on_open_tag(&mut self, tag: &Tag) {
//!         self.lines.push(format!("{}{}", "  ".repeat(self.depth), tag.name));
//!         self.depth += 1;
//!     }
//!     fn on_close_tag(&mut self, _name: &str) {
//!         self.depth -= 1;
//!     }
//! }
//!
//! let mut parser = Parser::with_config(Config::strict(), Outline::default());
//! // chunk boundaries are invisible to the event stream
//! parser.write("<library><shelf><bo")?;
//! parser.write("ok title=\"Slaughterhouse-Five\"/></shelf></library>")?;
//! parser.end()?;
//!
//! assert_eq!(parser.handler().lines, ["library", "  shelf", "    book"]);
//! # Ok::<(), sax::Error>(())
//! ```
//!
//! Entities beyond the XML predefined five and the extended HTML named set
//! can be supplied per parser ([`Parser::define_entity`]) or process-wide
//! ([`entity::define`]).
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod chars;
mod config;
mod errors;
mod events;
mod namespace;
mod parser;

pub mod entity;

// reexports
pub use config::{CaseTransform, Config};
pub use errors::{Error, Position, Result, SyntaxError};
pub use events::{Attribute, Handler, NamespaceBinding, ProcessingInstruction, Tag};
pub use parser::Parser;
