//! Document Parser
//!
//! Recursive-descent reading of WSDL 2.0 documents into the element model.
//! [`WsdlReader`] is the entry point; everything else here is driven by it
//! through one parse session per read.

mod binding;
mod description;
mod interface;
pub mod mep;
mod reader;
mod resolver;
mod service;
mod session;
pub(crate) mod types;

pub use reader::WsdlReader;
