//! # Homebase Shared Models
//!
//! Request and response types shared by the Homebase services.
//!
//! ## Key Models
//!
//! - **GeocodeQuery / AutocompleteRequest**: inputs of the location proxies
//! - **InquiryRequest / InquiryEnvelope**: identity-verification inquiry creation
//! - **BlobObject**: object-storage descriptors used by upload, extraction and admin jobs
//! - **ExtractionRequest / ExtractionResult**: document data extraction
//! - **BatchJob / Checkpoint / RunReport**: administrative bulk jobs

pub mod geocoding;
pub mod identity;
pub mod storage;
pub mod document;
pub mod admin;


pub use geocoding::*;
pub use identity::*;
pub use storage::*;
pub use document::*;
pub use admin::*;
