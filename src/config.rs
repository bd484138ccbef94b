//! Compilation options handed in by the driver

use std::collections::HashMap;

use crate::error::{Error, Result};

/// Option key enabling AST constant propagation/folding
pub const OPTIMIZE_KEY: &str = "optimize";
/// Option key carrying the register budget (`-1` = unconstrained)
pub const REGISTER_ALLOCATION_KEY: &str = "registerAllocation";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Run constant propagation and folding before IR generation
    pub optimize: bool,
    /// Maximum number of local slots per method; `None` leaves the
    /// IR variable table untouched, `Some(0)` packs slots without a limit
    pub register_budget: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            optimize: false,
            register_budget: None,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_optimize(mut self, optimize: bool) -> Self {
        self.optimize = optimize;
        self
    }

    pub fn with_register_budget(mut self, budget: Option<usize>) -> Self {
        self.register_budget = budget;
        self
    }

    /// Build a configuration from the string option map drivers pass around.
    ///
    /// Missing keys keep their defaults. `registerAllocation` accepts `-1`
    /// (unconstrained) or a non-negative slot count.
    pub fn from_options(options: &HashMap<String, String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(raw) = options.get(OPTIMIZE_KEY) {
            config.optimize = match raw.trim() {
                "true" => true,
                "false" => false,
                other => {
                    return Err(Error::config(format!(
                        "'{}' expects true or false, found '{}'",
                        OPTIMIZE_KEY, other
                    )))
                }
            };
        }

        if let Some(raw) = options.get(REGISTER_ALLOCATION_KEY) {
            let value: i64 = raw.trim().parse().map_err(|_| {
                Error::config(format!(
                    "'{}' expects an integer, found '{}'",
                    REGISTER_ALLOCATION_KEY, raw
                ))
            })?;
            config.register_budget = match value {
                -1 => None,
                n if n >= 0 => Some(n as usize),
                n => {
                    return Err(Error::config(format!(
                        "'{}' must be -1 or non-negative, found {}",
                        REGISTER_ALLOCATION_KEY, n
                    )))
                }
            };
        }

        log::debug!("config: optimize={} register_budget={:?}", config.optimize, config.register_budget);
        Ok(config)
    }
}
