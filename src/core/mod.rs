//! Column-mapping and record-normalization pipeline
//!
//! Registry and sheet store feed the mapping table; the normalizer turns the
//! current sheet into records and the image stage fills image attributes.

pub mod images;
pub mod mapping;
pub mod normalizer;
pub mod registry;
pub mod sheet_store;

pub use images::{attach_images, ImageAttachments, ImageSource};
pub use mapping::MappingTable;
pub use normalizer::{normalize, normalize_unchecked};
pub use registry::AttributeRegistry;
pub use sheet_store::SheetStore;
