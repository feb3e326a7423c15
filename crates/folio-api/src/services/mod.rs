pub mod retrieval;
pub mod upload;

pub use retrieval::{Retrieved, RetrievalService};
pub use upload::{UploadOutcome, UploadService};
