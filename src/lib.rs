//! File-handle style client for S3-compatible object storage.
//!
//! ## Quick start
//!
//! ```no_run
//! # fn demo() -> Result<(), bucketfile::Error> {
//! use bucketfile::{Auth, Bucket, Mode};
//!
//! let bucket = Bucket::builder("my-bucket")
//!     .auth(Auth::from_env()?)
//!     .build()?;
//!
//! let mut object = bucket
//!     .open("/notes/todo.txt", Mode::Write)
//!     .content_type("text/plain")
//!     .finish()?;
//! object.write(b"ship it")?;
//! object.close()?;
//!
//! let mut object = bucket.open("/notes/todo.txt", Mode::Read).finish()?;
//! let bytes = object.read()?;
//! println!("{} bytes", bytes.len());
//! # Ok(())
//! # }
//! ```
//!
//! ## Listing
//!
//! The key namespace is flat; `listdir` reconstructs one level of
//! hierarchy from a prefix query:
//!
//! ```no_run
//! # fn demo(bucket: bucketfile::Bucket) -> Result<(), bucketfile::Error> {
//! use bucketfile::Mode;
//!
//! let listing = bucket.open("/static/", Mode::Read).finish()?.listdir()?;
//! for dir in &listing.directories {
//!     println!("{dir}/");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Design
//!
//! Every operation is a single blocking request on a fresh connection:
//! no pooling, no retries, no pagination. Object operations are signed
//! with the legacy per-request scheme; listing uses the scoped
//! derived-key scheme. A handle moves through an explicit lifecycle
//! (`open` → read or buffered writes → `close`) and is finished for good
//! once closed.

mod auth;
mod client;
mod error;
mod handle;
mod listing;
mod sign;
mod types;
mod util;

/// HTTP transport collaborator and its production implementation.
pub mod transport;

pub use auth::{Acl, Auth, Credentials, Region};
pub use client::{Bucket, BucketBuilder};
pub use error::{Error, Result};
pub use handle::{Mode, ObjectHandle, OpenRequest};
pub use types::{Listing, ObjectMetadata};
pub use util::names::valid_object_name;
