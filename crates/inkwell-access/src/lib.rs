#![forbid(unsafe_code)]
#![deny(
    unused_must_use,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls
)]
#![warn(missing_docs, unreachable_pub)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::multiple_crate_versions)]
#![allow(clippy::future_not_send)]

//! Client-side access layer for the Inkwell blog platform.
//!
//! Layout:
//! - `session.rs`: credential + profile stores with write-through persistence
//! - `storage.rs`: key/value persistence backends
//! - `classify.rs`: public/protected endpoint rules
//! - `pipeline.rs`: outbound credential handling and inbound session recovery
//! - `resolver.rs`: ordered candidate plans with sequential fallback
//! - `guard.rs` + `routes.rs`: navigation authorization
//! - `services/`: typed wrappers for every server endpoint
//!
//! Everything here is DOM-free; transports, navigators and notifiers are
//! injected through the traits in `transport.rs` and `pipeline.rs`.

pub mod classify;
pub mod config;
pub mod defaults;
pub mod envelope;
pub mod error;
pub mod guard;
pub mod model;
pub mod pipeline;
pub mod resolver;
pub mod routes;
pub mod services;
pub mod session;
pub mod storage;
pub mod transport;

pub use classify::{Access, Classifier};
pub use config::AccessConfig;
pub use error::{AccessError, AccessResult, StorageError, TransportError};
pub use guard::{GuardDecision, Layout, Notice, NoticeLevel, ProfileFetcher, RouteGuard};
pub use model::{Credential, Profile, Role};
pub use pipeline::{NavigationRequest, Navigator, Notifier, RequestPipeline};
pub use resolver::{Candidate, CandidatePlan, CandidateParams};
pub use services::Api;
pub use session::{CredentialStore, ProfileStore, Session};
pub use storage::{FileStore, KeyValueStore, MemoryStore};
pub use transport::{ApiRequest, ApiResponse, Method, RequestBody, Transport};
