//! DOM shorthand helpers
//!
//! Thin, direct wrappers around native document/element operations
//! (lookup, visibility, text/value accessors, class list and attribute
//! manipulation, element creation), bound to an injected host document
//! instead of a global one.
//!
//! ## Core Design
//!
//! ```text
//! DomService<D>  ──one call each──▶  D: HostDocument
//!                                        │
//!                                   Document (in-memory)
//!                                        │
//!                     HTML (scraper) / CDP JSON → DomArena ← selectors
//!                                                   ↓
//!                                              NodeIndex (u32)
//! ```
//!
//! ```
//! use dom_util::{Document, DomService};
//!
//! let doc = Document::parse_html("<body><p id='greeting'>hi</p></body>").unwrap();
//! let mut dom = DomService::new(doc);
//!
//! let p = dom.get_by_id("greeting").unwrap();
//! dom.add_class(p, &["loud"]).unwrap();
//! assert_eq!(dom.set_text(p, 42).unwrap(), "42");
//! assert_eq!(dom.query_selector_all("p.loud", None).unwrap(), vec![p]);
//! ```

pub mod arena;
pub mod cdp;
pub mod document;
pub mod error;
pub mod host;
pub mod parser;
pub mod selector;
pub mod serializer;
pub mod service;
pub mod types;
pub mod utils;

pub use arena::DomArena;
pub use document::Document;
pub use error::{DomError, Result};
pub use host::{AdjacentPosition, Elements, HostDocument};
pub use selector::SelectorList;
pub use service::{DomService, DomServiceConfig};
pub use types::*;
