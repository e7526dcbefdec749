//! EFA (Elektronische Fahrplanauskunft) provider access.
//!
//! The gateway consumes two EFA endpoints:
//! - `XSLT_STOPFINDER_REQUEST` resolves free text to stop candidates
//! - `XSLT_DM_REQUEST` (departure monitor) returns a stop's departure board
//!
//! Both are requested with `outputFormat=JSON`. Responses are returned as
//! raw `serde_json::Value`: the EFA JSON schema varies between deployments
//! (string vs. number fields, single object vs. array), so decoding into
//! typed records happens in the resolver and normalizer.

mod api;
mod client;
mod error;
mod mock;

pub use api::{EfaApi, StopFinderRequest};
pub use client::{EfaClient, EfaConfig};
pub use error::EfaError;
pub use mock::MockEfaClient;
