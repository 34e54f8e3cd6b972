//! # wsdl20
//!
//! A reader for [WSDL 2.0](https://www.w3.org/TR/wsdl20/) descriptions.
//!
//! Reading a document produces two views of it:
//!
//! - the **element model** ([`elements`]), one node per WSDL element, with
//!   every imported and included document kept in its own [`Description`];
//! - the **component model** ([`components`]), the flattened set of
//!   interfaces, bindings, services, element declarations and type
//!   definitions in scope of the root document.
//!
//! ## Features
//!
//! - Transitive `<include>` and non-transitive `<import>` resolution, cycle safe
//! - QName resolution against scoped namespace declarations
//! - Message label inference from the in-only, robust-in-only and in-out patterns
//! - Extension registry with the core, RPC, SOAP and HTTP extensions of Part 2
//! - Fragment identifiers for every component
//! - Diagnostics with severities; only fatal problems abort a read
//!
//! ## Example
//!
//! ```rust,ignore
//! use wsdl20::WsdlReader;
//!
//! let wsdl = WsdlReader::new().read_file("path/to/service.wsdl")?;
//! let model = wsdl.to_component();
//! for interface in model.interfaces() {
//!     for operation in model.all_operations(interface) {
//!         println!("{} {}", operation.name, operation.pattern);
//!     }
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// Foundation
pub mod error;
pub mod limits;
pub mod reporter;

// Utilities
pub mod namespaces;
pub mod names;
pub mod locations;
pub mod catalog;

// Resource loading
pub mod loaders;
pub mod documents;

// Models
pub mod elements;
pub mod schema;
pub mod extensions;
pub mod components;

// Reading
pub mod parsing;
pub mod validation;
pub mod wsdl;

// Re-exports for convenience
pub use components::{ComponentModel, ComponentRef, FragmentIdentifier};
pub use elements::{Description, DescriptionId, Descriptions};
pub use error::{Diagnostic, Error, ErrorCode, Result, Severity};
pub use extensions::{ExtensionRegistry, OwnerKind};
pub use limits::Limits;
pub use loaders::{DocumentLoader, Loader, MemoryLoader};
pub use namespaces::QName;
pub use parsing::WsdlReader;
pub use reporter::{DiagnosticCollector, ErrorReporter};
pub use wsdl::Wsdl;

/// Version of the wsdl20 library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
