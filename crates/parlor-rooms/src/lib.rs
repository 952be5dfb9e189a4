//! Room lifecycle and membership for Parlor.
//!
//! The [`RoomRegistry`] owns every live room and the index of which
//! participant is in which room (one room per participant, the key
//! invariant). Message posting runs through the moderation blocklist
//! before anything is stored or forwarded.
//!
//! # Key types
//!
//! - [`RoomRegistry`] — creates/destroys rooms, joins/leaves, posts
//! - [`Room`] — one chat room with its bounded message buffer
//! - [`RoomError`] — what can go wrong joining or posting

mod error;
mod registry;
mod room;

pub use error::RoomError;
pub use registry::{JoinSnapshot, LeaveOutcome, RoomRegistry};
pub use room::{MESSAGE_CAP, Room};
