//! Custom template filters

use minijinja::value::Value;

/// Register all custom filters with a minijinja Environment
pub fn register_filters(env: &mut minijinja::Environment) {
    env.add_filter("selected", filter_selected);
    env.add_filter("checked", filter_checked);
}

/// `selected="selected"` when the value is truthy
fn filter_selected(value: Value) -> Value {
    attribute_if(value.is_true(), r#"selected="selected""#)
}

/// `checked` when the value is truthy
fn filter_checked(value: Value) -> Value {
    attribute_if(value.is_true(), "checked")
}

fn attribute_if(on: bool, attribute: &str) -> Value {
    if on {
        Value::from_safe_string(attribute.to_string())
    } else {
        Value::from("")
    }
}
