//! Core of snapshare: events, photos and where they live.
//!
//! - `store` persists events as JSON documents in a `storage` backend
//! - `ingest` turns uploaded files into photos on an event
//! - `poll` re-reads an event on an interval to follow new uploads
//! - `expiry` computes how long an event has left
//!
//! Photo bytes are held in a process-local [`blob::BlobRegistry`] and are
//! never persisted; only the photo metadata survives a restart.

pub mod blob;
pub mod config;
pub mod constants;
pub mod error;
pub mod event;
pub mod expiry;
pub mod id;
pub mod ingest;
pub mod links;
pub mod poll;
pub mod storage;
pub mod store;

pub use error::{SnapError, SnapResult};
pub use event::{Event, EventPatch, NewEvent, Photo, RetentionDays};
pub use expiry::Remaining;
pub use store::EventStore;
