#![deny(rust_2018_idioms)]

pub mod app;
pub mod domain;
pub mod form;
pub mod io;
pub mod matcher;
#[cfg(feature = "tui")]
pub mod presentation;
pub mod service;

pub use app::{FormSubmission, PageController, PageOptions, PageRequest, StatusLine};
pub use io::{DocumentFormat, output::OutputOptions};
pub use service::{
    ConfigurationService, FileConfigurationService, FileServiceOptions, ServiceError,
};

pub mod prelude {
    pub use super::{
        ConfigurationService, FileConfigurationService, FileServiceOptions, FormSubmission,
        PageController, PageOptions, PageRequest, StatusLine,
    };
    pub use crate::domain::{BuildConfiguration, FormType, PageMode};
    pub use crate::form::{FieldRef, FormError, FormState, SelectionKind, ViewField, ViewId};
}
