//! The unified config document, its strict parser and the built-in default
//! document.

mod default_config;
mod unified_config;

pub use default_config::{create_default_config_file, default_config_yaml};
pub use unified_config::{
    parse_unified_config,
    NamedEntries,
    RawComponent,
    RawPipeline,
    Section,
    Service,
    UnifiedConfig,
};
