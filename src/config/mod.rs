pub mod builder;
pub mod loader;
pub mod schema;

pub use builder::{new_definitions_from_ops, new_ops_from_definitions, BuildError};
pub use loader::{load_from_json_str, load_from_str, to_json_string, to_toml_string, ConfigError};
pub use schema::{Metadata, OpDefinition, PatchSet};
