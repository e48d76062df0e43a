//! Selection handed to a forecasting run.

use crate::core::Variable;
use serde::{Deserialize, Serialize};

/// Which entity and variable to forecast.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ForecastRequest {
    pub entity: String,
    #[serde(default)]
    pub variable: Variable,
}

impl ForecastRequest {
    /// Request a temperature forecast for `entity`.
    pub fn new(entity: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            variable: Variable::default(),
        }
    }

    pub fn with_variable(mut self, variable: Variable) -> Self {
        self.variable = variable;
        self
    }
}
