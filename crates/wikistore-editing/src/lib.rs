//! # wikistore-editing
//!
//! Creating child pages on behalf of an outer request layer.
//!
//! [`AddChildPolicy`] validates a proposed child name, works out the page
//! type and seeds the new page's attributes. [`add_child_page`] wraps it the
//! way an HTTP responder would: `303` with a `Location` on success, `400` for
//! an invalid name or page type, `404` for a missing parent, `409` when the
//! child already exists and `500` when storage fails.

pub mod policy;
pub mod request;

pub use policy::{AddChildOutcome, AddChildPolicy, ChildPage, PageType, Rejection};
pub use request::{add_child_page, AddChildRequest, Response};
