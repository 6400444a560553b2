//! Common test infrastructure
//!
//! Recording fakes for the broker seams, wiremock management API stubs and
//! a harness that drives the stdio JSON-RPC session end to end.
//! Tests should only import from this module, not from internal submodules.
//!
//! # Example
//!
//! ```no_run
//! mod common;
//! use common::{FakeAdmin, RecordingConnector, TestSession};
//!
//! #[tokio::test]
//! async fn test_enqueue() {
//!     let connector = RecordingConnector::new();
//!     let session = TestSession::new(connector.clone(), FakeAdmin::new());
//!
//!     let response = session
//!         .call_tool("enqueue", serde_json::json!({"queue": "q", "message": "m"}))
//!         .await;
//!     assert!(response["result"].is_object());
//! }
//! ```

mod constants;
mod fakes;
mod management;
mod session;

// Public API - this is what tests import
#[allow(unused_imports)]
pub use constants::*;
#[allow(unused_imports)]
pub use fakes::{BrokerOp, FakeAdmin, RecordingConnector};
#[allow(unused_imports)]
pub use management::{api_base_url, management_api, management_client, unreachable_base_url};
#[allow(unused_imports)]
pub use session::{
    initialize_request, response_for, result_text, test_broker_config, TestSession,
};
