use crate::{DynamicValue, EvalError, Functions, RuleContext, Value};

/// Resolve a dynamic value against the current context.
///
/// Returns `Ok(None)` when a referenced field, property or context path does
/// not exist. Function arguments are resolved depth-first, left to right;
/// arguments that resolve to nothing are passed as [`Value::Null`].
///
/// # Errors
///
/// [`EvalError::UnknownFunction`] when a function name is not registered,
/// [`EvalError::FunctionFailed`] when a registered function reports failure.
pub fn resolve(
    value: &DynamicValue,
    ctx: &RuleContext,
    functions: &Functions,
) -> Result<Option<Value>, EvalError> {
    match value {
        DynamicValue::Literal(v) => Ok(Some(v.clone())),
        // Same lookup as a condition's left operand: the exact dotted key
        // first, then a path into the field's value.
        DynamicValue::Field { field, property } => Ok(match property {
            None => ctx.field(field).cloned(),
            Some(path) => ctx
                .form_data
                .get(&format!("{field}.{path}"))
                .or_else(|| ctx.field(field)?.get_path(path))
                .cloned(),
        }),
        DynamicValue::Context { key } => Ok(ctx.lookup(key)),
        DynamicValue::Function { name, args } => {
            let f = functions
                .get_function(name)
                .ok_or_else(|| EvalError::UnknownFunction { name: name.clone() })?;
            let resolved = args
                .iter()
                .map(|arg| resolve(arg, ctx, functions).map(Option::unwrap_or_default))
                .collect::<Result<Vec<Value>, EvalError>>()?;
            f(&resolved)
                .map(Some)
                .map_err(|e| EvalError::FunctionFailed {
                    name: name.clone(),
                    message: e.message().to_owned(),
                })
        }
    }
}
