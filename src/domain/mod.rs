mod config;
mod page;

pub use config::{
    BuildConfiguration, BuilderRecord, ConfigurationState, NewConfigurationDefaults,
    ProjectViewRecord, ScmKind,
};
pub use page::{FormResult, FormType, PageMode};
