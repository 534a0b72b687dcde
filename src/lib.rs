pub mod extractor;
pub mod importer;
pub mod parity;
pub mod pseudo_types;
pub mod spec_model;
pub mod spec_parser;
pub mod spec_validator;
pub mod spec_writer;
pub mod text_utils;

pub use extractor::{Extractors, SourceExtractor};
pub use importer::{ExtractedProject, Importer};
pub use parity::ParityReport;
pub use pseudo_types::{map_pseudo_type, TargetLanguage};
pub use spec_model::Spec;
pub use spec_parser::SpecParser;
pub use spec_validator::validate;
pub use text_utils::split_balanced;
