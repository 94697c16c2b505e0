//! 远端 API 层：HTTP 客户端、认证工厂、信封与线上模型

pub mod client;
pub mod endpoints;
pub mod envelope;
pub mod factory;
pub mod models;

pub use client::{ApiClient, ApiClientExt, HttpApiClient};
pub use endpoints::{unit_scoped_path, RegisterHebeQuery, REGISTER_HEBE_ENDPOINT};
pub use envelope::{Envelope, EnvelopeStatus};
pub use factory::{AccessToken, ApiClientFactory, CredentialStore, HttpApiClientFactory};
pub use models::{RemoteAccountSnapshot, RemoteJournal, RemoteLogin, RemotePeriod};
