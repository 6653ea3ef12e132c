//! Calculator Tool
//!
//! Evaluates arithmetic with the restricted parser in [`crate::expr`].

use async_trait::async_trait;
use serde_json::Value;

use chain_core::{tool::ParameterSchema, Arguments, Tool, ToolOutcome, ToolSpec};

use crate::expr;

/// Largest magnitude rendered as an integer (2^53)
const MAX_EXACT_INT: f64 = 9_007_199_254_740_992.0;

/// Tool for evaluating arithmetic expressions
#[derive(Default)]
pub struct CalculatorTool;

impl CalculatorTool {
    pub fn new() -> Self {
        Self
    }

    /// Evaluate to a JSON number; whole results are rendered without a fraction
    pub fn evaluate(expression: &str) -> Result<Value, expr::ExprError> {
        let value = expr::evaluate(expression)?;

        if value.fract() == 0.0 && value.abs() < MAX_EXACT_INT {
            #[allow(clippy::cast_possible_truncation)]
            return Ok(Value::from(value as i64));
        }
        Ok(Value::from(value))
    }
}

#[async_trait]
impl Tool for CalculatorTool {
    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: "calculate".into(),
            description: "Evaluate a mathematical expression. Can handle basic arithmetic operations (+, -, *, /) and parentheses.".into(),
            parameters: vec![
                ParameterSchema {
                    name: "expression".into(),
                    param_type: "string".into(),
                    description: "The mathematical expression to evaluate (e.g., '2 + 2', '189.84 * 7.8')".into(),
                    required: true,
                    default: None,
                    enum_values: None,
                },
            ],
            category: Some("math".into()),
        }
    }

    async fn execute(&self, arguments: &Arguments) -> ToolOutcome {
        let Some(expression) = arguments.get("expression").and_then(|v| v.as_str()) else {
            return ToolOutcome::failure("Error: Invalid expression - missing expression");
        };

        match Self::evaluate(expression) {
            Ok(value) => ToolOutcome::Success(value),
            Err(e) => ToolOutcome::failure(format!("Error: Invalid expression - {}", e)),
        }
    }
}
