use corridor_core::{Result, RouterError};
use serde_json::Value;

pub fn run(arguments: &Value) -> Result<Value> {
    let op = arguments["op"]
        .as_str()
        .ok_or_else(|| arg_err("missing 'op'"))?;
    let a = arguments["a"].as_f64().ok_or_else(|| arg_err("missing 'a'"))?;
    let b = arguments["b"].as_f64().ok_or_else(|| arg_err("missing 'b'"))?;

    let result = match op {
        "add" => a + b,
        "sub" => a - b,
        "mul" => a * b,
        "div" => {
            if b == 0.0 {
                f64::INFINITY
            } else {
                a / b
            }
        }
        other => return Err(arg_err(&format!("unsupported op: {other}"))),
    };

    Ok(Value::from(result))
}

fn arg_err(reason: &str) -> RouterError {
    RouterError::ToolArgInvalid {
        tool: "calc".into(),
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn adds_two_numbers() {
        let out = run(&json!({"op": "add", "a": 12, "b": 34})).unwrap();
        assert_eq!(out, 46.0);
    }

    #[test]
    fn division_by_zero_is_infinity_not_an_error() {
        let out = run(&json!({"op": "div", "a": 1, "b": 0})).unwrap();
        assert!(out.as_f64().unwrap().is_infinite());
    }

    #[test]
    fn unsupported_op_is_rejected() {
        let err = run(&json!({"op": "pow", "a": 1, "b": 2}));
        assert!(matches!(err, Err(RouterError::ToolArgInvalid { .. })));
    }
}
