//! Backend integrations for the VERSA client.
//!
//! Currently a single `reqwest` implementation of
//! [`ApiGateway`](versa_core::api::ApiGateway).

mod error_body;
pub mod http_gateway;

pub use http_gateway::HttpApiGateway;
