//! # Sberpay
//!
//! **Client for the Sberbank acquiring gateway.**
//!
//! Sberpay registers payment orders over the gateway's REST API and
//! verifies the RSA/SHA-512 checksums the gateway attaches to its payment
//! callbacks.
//!
//! ## Features
//!
//! - **Authenticated requests** - merchant `userName`/`password` injected into every call
//! - **Order registration** - amounts converted to minor units, raw JSON response returned
//! - **Callback verification** - canonical string + RSA PKCS#1 v1.5 / SHA-512 check
//! - **Outcome log** - optional per-client plain-text log of gateway results
//!
//! ## Registering an order
//!
//! ```no_run
//! use sberpay::{Credentials, LogConfig, OrderRegistrar, SberpayConfig};
//!
//! fn main() -> Result<(), sberpay::SberpayError> {
//!     let config = SberpayConfig::new(Credentials::new("shop-api", "shop-password"))
//!         .with_log(LogConfig::new("sberpay.log"));
//!
//!     let registrar = OrderRegistrar::new(config)?;
//!     let response = registrar.register_order(
//!         "10747",
//!         10.5,
//!         "https://shop.example/paid",
//!         "https://shop.example/failed",
//!     )?;
//!
//!     println!("payment page: {}", response["formUrl"]);
//!     Ok(())
//! }
//! ```
//!
//! ## Verifying a callback
//!
//! ```no_run
//! use sberpay::CallbackVerifier;
//!
//! fn handle(query: &str, gateway_key_pem: &str) -> Result<bool, sberpay::SberpayError> {
//!     let verifier = CallbackVerifier::from_pem(gateway_key_pem)?;
//!     verifier.verify_query(query)
//! }
//! ```
//!
//! A checksum that does not match yields `Ok(false)`; a malformed checksum or
//! key yields an error.

#![deny(warnings)]
#![deny(missing_docs)]

// Core modules
pub mod clock;
pub mod config;
pub mod errors;

// Crypto layer
pub mod crypto;

// Protocol layer
pub mod protocol;

// Client layer
pub mod client;

// Logging layer
pub mod logging;

// Registrar (main public API)
pub mod registrar;

// Re-exports for public API
pub use client::http::{AuthenticatedTransport, GatewayResponse, Params};
pub use clock::{Clock, SystemClock};
pub use config::{Credentials, Endpoints, LogConfig, SberpayConfig};
pub use crypto::canonical::canonicalize;
pub use crypto::pipeline::CallbackVerifier;
pub use crypto::verify::verify_rsa_sha512_pem;
pub use errors::SberpayError;
pub use logging::OutcomeLogger;
pub use protocol::models::{CallbackOperation, CallbackPayload, GatewayOutcome, RegisterOrderResponse};
pub use registrar::{Amount, OrderRegistrar, OrderRequest};

#[cfg(any(test, feature = "test-seams"))]
pub use clock::MockClock;
