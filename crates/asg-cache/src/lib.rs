//! asg-cache: which scaling group owns this instance?
//!
//! The [`ResolutionCache`] keeps a forward index from instance id to owning
//! [`Group`](asg_core::Group), rebuilt from scratch by asking a
//! [`GroupLister`] for the members of every registered group. Instances
//! that turn out to belong to no group are remembered in a negative set so
//! that lookups for control-plane nodes and other strangers stop paying for
//! a full resync.
//!
//! # Lookup
//!
//! ```text
//! find_group(id)
//!   ├── by_instance hit      → Some(group), no I/O
//!   ├── known_absent hit     → None, no I/O
//!   └── miss → resync()      → rebuild by_instance from every lister call
//!         ├── lister error   → Err, cache untouched
//!         ├── hit            → Some(group)
//!         └── still missing  → remember in known_absent, None
//! ```
//!
//! # Concurrency
//!
//! One `tokio::sync::Mutex` guards the registry and both indexes. It is
//! held across the lister calls of a resync, so a slow upstream stalls every
//! lookup until the rebuild finishes. No caller observes a half-built index.
//! A background task ([`ResolutionCache::run_refresh`]) repeats the rebuild
//! on a fixed interval.

pub mod cache;
pub mod error;
pub mod lister;
pub mod registry;

pub use cache::{CacheStats, ResolutionCache, ResyncStats};
pub use error::{ResolveError, ResolveResult};
pub use lister::GroupLister;
pub use registry::GroupRegistry;
