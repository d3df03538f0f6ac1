//! Application ports (traits) for external dependencies.
//!
//! In hexagonal architecture, ports define interfaces that the application
//! needs from the outside world. Adapters in `modwright-adapters` implement
//! these.
//!
//! ## Port Types
//!
//! - **Driven (Output) Ports**: Called by application, implemented by infrastructure
//!   - `ProjectFilesystem`: target tree I/O
//!   - `TemplateStore`: template storage/retrieval
//!   - `VersionRegistry`: curated artifact versions and image tags
//!
//! - **Driving (Input) Ports**: Called by external world, implemented by application
//!   - (Defined in CLI layer, implemented by services)

pub mod output;

pub use output::{ProjectFilesystem, TemplateStore, TemplateText, VersionRegistry};
