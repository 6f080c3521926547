pub mod config;
pub mod errors;
pub mod pipeline;
pub mod rules;

pub use config::CharacterClass;
pub use config::ValidationConfig;
pub use errors::ValidationCode;
pub use errors::ValidationError;
pub use errors::ValidationErrorSet;
pub use pipeline::ValidationPipeline;
pub use rules::ValidationRule;
