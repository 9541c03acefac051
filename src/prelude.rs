//! Imports for syntax extensions.

pub use crate::IntoEndpointUrl as _;
pub use crate::flow::AuthProvider as _;
pub use crate::signature::SignatureMethod as _;
