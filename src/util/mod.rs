//! Utility functions shared by the feed pipeline and the UI.
//!
//! - **Text processing**: terminal-width truncation and control-character stripping
//! - **URL validation**: checks before handing post links to the system opener
//! - **Form validation**: name/email/message checks used by onboarding and talk back

mod text;
mod url_validator;
mod validate;

pub use text::{display_width, strip_control_chars, truncate_to_width};
pub use url_validator::{validate_url_for_open, UrlValidationError};
pub use validate::{is_valid_email, validate_email, ValidationError};
