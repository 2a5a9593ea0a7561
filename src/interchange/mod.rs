//! Interchange format mappers
//!
//! - OTM (Open Threat Model, JSON): bidirectional. Exported documents embed
//!   the full diagram layout under `extensions["x-threatflow"]` so that
//!   importing them restores the graph exactly; foreign documents without the
//!   extension are reconstructed from their components and dataflows.
//! - Threagile (YAML): export only.

pub mod error;
pub mod otm;
pub mod threagile;

pub use error::{MappingError, MappingResult};
pub use otm::{
    apply_otm, build_otm, parse_otm, Layout, LayoutEdge, LayoutNode, OtmComponent, OtmDataflow, OtmDocument,
    OtmOptions, OtmTrustZone, LAYOUT_EXTENSION,
};
pub use threagile::{
    build_threagile, sanitize_id, to_yaml, AssetType, CommunicationLink, TechnicalAsset, ThreagileDocument,
    ThreagileOptions, ThreagileTrustBoundary,
};
