//! Mediator pattern for Conveyor.
//!
//! Members of a [`ChatRoom`] never hold references to each other; every
//! message goes through the room, which fans it out to all other members.
//!
//! # Example
//!
//! ```
//! use conveyor_mediator::ChatRoom;
//!
//! let mut room = ChatRoom::new();
//! room.add_user("Kim").unwrap();
//! room.add_user("Lee").unwrap();
//! room.add_user("Park").unwrap();
//!
//! let delivered = room.send("Kim", "hello").unwrap();
//! assert_eq!(delivered, 2);
//! assert_eq!(room.inbox("Lee").unwrap()[0].from, "Kim");
//! ```

#![forbid(unsafe_code)]

mod error;
mod room;

pub use error::{MediatorError, MediatorResult};
pub use room::{ChatRoom, Message};
