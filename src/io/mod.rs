//! I/O layer: credential resolution through the `gcloud` tool and the blocking
//! Vertex AI client that implements `OperationClient`.
pub mod credentials;
pub use credentials::{CredentialProvider, Credentials, GcloudCredentials};

pub mod vertex;
pub use vertex::VertexClient;
