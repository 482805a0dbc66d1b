//! The `utils` module collects the pieces shared by every other module:
//! the crate-wide error type and the tracing setup used by the binary.

pub mod error;
pub mod logging;

pub use error::{Error, Result};

#[cfg(test)]
mod tests {
    use super::logging;

    #[test]
    fn logging_init_accepts_levels() {
        // Should not panic
        logging::init("info");
        logging::init("debug");
        logging::init("not-a-level");
    }
}
