//! Folio API Library
//!
//! HTTP surface of the image service: authentication, upload and retrieval
//! handlers, and application setup.

mod api_doc;
mod handlers;
mod services;
mod telemetry;

pub mod auth;
pub mod error;
pub mod middleware;
pub mod setup;
pub mod state;

pub use error::{ErrorResponse, HttpAppError};
pub use services::{Retrieved, RetrievalService, UploadOutcome, UploadService};
