//! Grove: read-only HTML views of content-addressed trees
//!
//! Resolves a path inside an immutable tree graph rooted at a revision and
//! renders either a directory listing (with collapsed single-directory
//! chains) or the blob: as text, as a hex dump, through a render filter or
//! embedded by mimetype.

pub mod classify;
pub mod cli;
pub mod config;
pub mod error;
pub mod filter;
pub mod html;
pub mod links;
pub mod logging;
pub mod mime;
pub mod store;
pub mod types;
pub mod view;
