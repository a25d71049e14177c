//! Account signup: validate, normalize, hash and persist.

mod service;
mod validation;

pub use service::{SignupError, SignupService};
pub use validation::{validate, Credentials, ValidationError, MAX_USERNAME_LEN, MIN_PASSWORD_LEN, MIN_USERNAME_LEN};
