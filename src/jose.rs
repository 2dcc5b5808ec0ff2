//! JOSE boundary types
//!
//! This module holds the claim set representation, the fixed table of
//! supported signature algorithms, the trusted claim source contract and the
//! response signing capability.

pub mod types;
pub mod extract;
pub mod validator;
pub mod signer;

pub use types::*;
pub use extract::*;
pub use validator::*;
pub use signer::*;
