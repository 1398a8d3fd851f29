//! Subscriber registry for record fan-out
//!
//! The registry is the only state shared between the source reader and the
//! connection acceptor. It maps each live subscriber to its compiled pattern
//! and owns the subscriber's connection.
//!
//! # Architecture
//!
//! ```text
//!                       Arc<SubscriberRegistry>
//!                  ┌──────────────────────────────┐
//!                  │ Mutex<HashMap<SubscriberId,  │
//!                  │   Subscriber {               │
//!                  │     conn: UnixStream,        │
//!                  │     pattern: Pattern,        │
//!                  │   }                          │
//!                  │ >>                           │
//!                  └──────────────┬───────────────┘
//!                                 │
//!          ┌──────────────────────┴──────────────────────┐
//!          │                                             │
//!          ▼                                             ▼
//!     [Acceptor]                                   [SourceReader]
//!     register()                                   dispatch(record)
//!                                                        │
//!                               is_match? ──► write_all ─┴─► evict on error
//! ```
//!
//! # Locking
//!
//! One exclusive lock guards the whole map. Dispatch of a record holds the
//! lock while every matching subscriber is written to in turn, so a slow
//! subscriber stalls delivery to all others. Removal of a failed subscriber
//! happens before the lock is released; a subscriber is never observed as
//! registered but closed, or open but unregistered.

pub mod entry;
pub mod error;
pub mod pattern;
pub mod store;

pub use entry::{Subscriber, SubscriberId, SubscriberStats};
pub use error::WriteFailure;
pub use pattern::Pattern;
pub use store::{DispatchReport, SubscriberRegistry};
