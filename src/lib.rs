#![warn(clippy::pedantic)]
// Noisy doc/signature lints — would require annotating hundreds of pub functions
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
// Style preference — keeping format!("{}", x) over format!("{x}") for readability with complex exprs
#![allow(clippy::uninlined_format_args)]
// Intentional casts in offset/window arithmetic (usize <-> u64 stream positions)
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
// Module structure — detect::engine::DetectionEngine and friends by design
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod config;
pub mod detect;
pub(crate) mod errors;
pub mod secret;
pub(crate) mod utils;
pub mod validate;

pub use detect::{DetectionEngine, Detector, EngineError};
pub use errors::{CredsweepError, CredsweepResult};
pub use secret::{Finding, Secret, SecretFamily};
pub use validate::{Validation, Validator, ValidatorSet};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
