//! Bridge between registered filters and the liquid template parser
//!
//! Every [`Filter`] in the registry is exposed to liquid under its own name.
//! Pipe arguments are evaluated by liquid, converted to [`Value`] and handed to
//! [`Filter::apply`]; the result is converted back for the next pipe stage.

use super::filter::{Filter, FilterRegistry};
use crate::model::Value;
use liquid::{Parser, ParserBuilder};
use liquid_core::parser::{FilterArguments, ParameterReflection};
use liquid_core::{
    Error as LiquidError, Expression, Filter as LiquidFilter, FilterReflection, ParseFilter,
    Result as LiquidResult, Runtime, Value as LiquidValue, ValueView,
};
use std::fmt;
use std::sync::Arc;

/// A registered filter as seen by the liquid parser
#[derive(Clone)]
pub struct PipeFilter {
    filter: Arc<dyn Filter>,
}

impl PipeFilter {
    /// Wrap a registered filter
    pub fn new(filter: Arc<dyn Filter>) -> Self {
        Self { filter }
    }
}

impl FilterReflection for PipeFilter {
    fn name(&self) -> &str {
        self.filter.name()
    }

    fn description(&self) -> &str {
        self.filter.documentation()
    }

    fn positional_parameters(&self) -> &'static [ParameterReflection] {
        &[]
    }

    fn keyword_parameters(&self) -> &'static [ParameterReflection] {
        &[]
    }
}

impl ParseFilter for PipeFilter {
    fn parse(&self, mut arguments: FilterArguments<'_>) -> LiquidResult<Box<dyn LiquidFilter>> {
        if let Some((keyword, _)) = arguments.keyword.next() {
            return Err(LiquidError::with_msg(format!(
                "Filter '{}' takes positional arguments only, got '{keyword}'",
                self.filter.name()
            )));
        }

        Ok(Box::new(BoundFilter {
            filter: Arc::clone(&self.filter),
            args: arguments.positional.collect(),
        }))
    }

    fn reflection(&self) -> &dyn FilterReflection {
        self
    }
}

/// A filter call with its parsed argument expressions
struct BoundFilter {
    filter: Arc<dyn Filter>,
    args: Vec<Expression>,
}

impl fmt::Debug for BoundFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundFilter")
            .field("name", &self.filter.name())
            .field("args", &self.args)
            .finish()
    }
}

impl fmt::Display for BoundFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.filter.name())?;
        for (i, arg) in self.args.iter().enumerate() {
            let separator = if i == 0 { ": " } else { ", " };
            write!(f, "{separator}{arg}")?;
        }
        Ok(())
    }
}

impl LiquidFilter for BoundFilter {
    fn evaluate(&self, input: &dyn ValueView, runtime: &dyn Runtime) -> LiquidResult<LiquidValue> {
        let params = self
            .args
            .iter()
            .map(|arg| arg.evaluate(runtime).map(|value| from_liquid(value.as_view())))
            .collect::<LiquidResult<Vec<Value>>>()?;

        let result = self.filter.apply(&from_liquid(input), &params);
        to_liquid(&result)
    }
}

/// Convert a liquid value into a filter value
pub fn from_liquid(value: &dyn ValueView) -> Value {
    match serde_json::to_value(value.to_value()) {
        Ok(json) => Value::from_json(json),
        Err(e) => {
            log::warn!("Cannot pass {} value to a filter: {e}", value.type_name());
            Value::Nil
        }
    }
}

/// Convert a filter value into a liquid value
pub fn to_liquid(value: &Value) -> LiquidResult<LiquidValue> {
    liquid_core::model::to_value(value)
}

impl FilterRegistry {
    /// Build a liquid parser with the standard liquid library and every
    /// registered filter
    pub fn template_parser(&self) -> LiquidResult<Parser> {
        self.template_parser_with(&[])
    }

    /// Like [`FilterRegistry::template_parser`], with `extra` filters registered
    /// last so they replace registry filters of the same name
    pub fn template_parser_with(&self, extra: &[Arc<dyn Filter>]) -> LiquidResult<Parser> {
        let mut builder = ParserBuilder::with_stdlib();
        for filter in self.filters().chain(extra) {
            let pipe: Box<dyn ParseFilter> = Box::new(PipeFilter::new(Arc::clone(filter)));
            builder = builder.filter(pipe);
        }
        builder.build()
    }
}
