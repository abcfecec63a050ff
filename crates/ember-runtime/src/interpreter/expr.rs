//! Expression evaluation

use crate::ast::*;
use crate::interpreter::{CallTarget, Evaluator, Locals};
use crate::value::{RuntimeError, Value};

impl<'a> Evaluator<'a> {
    /// Evaluate an expression
    pub(super) fn eval_expr(&mut self, expr: &'a Expr, locals: &mut Locals<'a>) -> Result<Value, RuntimeError> {
        match expr {
            Expr::Literal(lit, _) => Ok(match lit {
                Literal::Int(n) => Value::Int(*n),
                Literal::Float(f) => Value::Float(*f),
                Literal::String(s) => Value::string(s.as_str()),
                Literal::Boolean(b) => Value::Boolean(*b),
                Literal::Null => Value::Null,
            }),
            Expr::Identifier(id) => locals
                .get(&id.name)
                .map(|slot| slot.value.clone())
                .ok_or_else(|| RuntimeError::UndefinedVariable {
                    name: id.name.clone(),
                }),
            Expr::Unary(unary) => self.eval_unary(unary, locals),
            Expr::Binary(binary) => self.eval_binary(binary, locals),
            Expr::Call(call) => self.eval_call(call, locals),
            Expr::Index(index) => self.eval_index(index, locals),
            Expr::ArrayLiteral(arr) => {
                let mut elements = Vec::with_capacity(arr.elements.len());
                for element in &arr.elements {
                    elements.push(self.eval_expr(element, locals)?);
                }
                Ok(Value::array(elements))
            }
            Expr::JsonObject(obj) => {
                let mut map = serde_json::Map::new();
                for (key, value) in &obj.entries {
                    let value = self.eval_expr(value, locals)?;
                    map.insert(key.clone(), value.to_json());
                }
                Ok(Value::json(serde_json::Value::Object(map)))
            }
            Expr::Group(group) => self.eval_expr(&group.expr, locals),
        }
    }

    fn eval_unary(&mut self, unary: &'a UnaryExpr, locals: &mut Locals<'a>) -> Result<Value, RuntimeError> {
        let operand = self.eval_expr(&unary.expr, locals)?;
        match (unary.op, operand) {
            (UnaryOp::Negate, Value::Int(n)) => Ok(Value::Int(n.wrapping_neg())),
            (UnaryOp::Negate, Value::Float(f)) => Ok(Value::Float(-f)),
            (UnaryOp::Not, Value::Boolean(b)) => Ok(Value::Boolean(!b)),
            (op, other) => Err(RuntimeError::type_mismatch(format!(
                "operator '{}' cannot be applied to {}",
                if op == UnaryOp::Negate { "-" } else { "!" },
                other.type_name()
            ))),
        }
    }

    fn eval_binary(&mut self, binary: &'a BinaryExpr, locals: &mut Locals<'a>) -> Result<Value, RuntimeError> {
        // Short-circuit logical operators
        if matches!(binary.op, BinaryOp::And | BinaryOp::Or) {
            let left = self.expect_boolean(binary.op, &binary.left, locals)?;
            let decided = match binary.op {
                BinaryOp::And => !left,
                _ => left,
            };
            if decided {
                return Ok(Value::Boolean(left));
            }
            return self
                .expect_boolean(binary.op, &binary.right, locals)
                .map(Value::Boolean);
        }

        let left = self.eval_expr(&binary.left, locals)?;
        let right = self.eval_expr(&binary.right, locals)?;
        apply_binary(binary.op, left, right)
    }

    fn expect_boolean(&mut self, op: BinaryOp, expr: &'a Expr, locals: &mut Locals<'a>) -> Result<bool, RuntimeError> {
        match self.eval_expr(expr, locals)? {
            Value::Boolean(b) => Ok(b),
            other => Err(RuntimeError::type_mismatch(format!(
                "operator '{}' expects boolean operands, found {}",
                op.symbol(),
                other.type_name()
            ))),
        }
    }

    /// Resolve the callee of a call expression.
    ///
    /// Unqualified names resolve to the unit's own functions first, then to
    /// natives registered under the unit's package. Qualified names go
    /// through the import table.
    fn resolve_call(&self, callee: &'a FunctionName) -> Result<CallTarget<'a>, RuntimeError> {
        let unit = self.unit;
        let package = match &callee.alias {
            Some(alias) => unit.import(&alias.name).ok_or_else(|| RuntimeError::UndefinedAlias {
                alias: alias.name.clone(),
            })?,
            None => unit.package(),
        };

        if package == unit.package() {
            if let Some(func) = unit.function(&callee.name.name) {
                return Ok(CallTarget::Interpreted(func));
            }
        }

        unit.scope()
            .lookup_native(package, &callee.name.name)
            .map(CallTarget::Native)
            .ok_or_else(|| RuntimeError::UndefinedFunction {
                name: callee.to_string(),
            })
    }

    fn eval_call(&mut self, call: &'a CallExpr, locals: &mut Locals<'a>) -> Result<Value, RuntimeError> {
        self.set_line(call.span.line);
        let target = self.resolve_call(&call.callee)?;

        let mut args = Vec::with_capacity(call.args.len());
        for arg in &call.args {
            args.push(self.eval_expr(arg, locals)?);
        }

        // Arguments may span lines; the frame must point at the call itself
        self.set_line(call.span.line);
        self.call(target, args)
    }

    fn eval_index(&mut self, index: &'a IndexExpr, locals: &mut Locals<'a>) -> Result<Value, RuntimeError> {
        self.set_line(index.span.line);
        let target = self.eval_expr(&index.target, locals)?;
        let key = self.eval_expr(&index.index, locals)?;
        self.set_line(index.span.line);

        match (&target, key) {
            (Value::Array(items), Value::Int(i)) => usize::try_from(i)
                .ok()
                .and_then(|idx| items.get(idx))
                .cloned()
                .ok_or(RuntimeError::IndexOutOfRange {
                    index: i,
                    size: items.len(),
                }),
            (Value::Json(json), Value::Int(i)) => index_json_array(json, i),
            (Value::Json(json), Value::String(key)) => Ok(json
                .get(key.as_str())
                .cloned()
                .map(Value::json)
                .unwrap_or(Value::Null)),
            (Value::Array(_), other) => Err(RuntimeError::type_mismatch(format!(
                "array index must be int, found {}",
                other.type_name()
            ))),
            (other, _) => Err(RuntimeError::type_mismatch(format!(
                "cannot index into {}",
                other.type_name()
            ))),
        }
    }

    /// Evaluate an index expression that must produce an int
    pub(super) fn eval_index_value(&mut self, expr: &'a Expr, locals: &mut Locals<'a>) -> Result<i64, RuntimeError> {
        match self.eval_expr(expr, locals)? {
            Value::Int(i) => Ok(i),
            other => Err(RuntimeError::type_mismatch(format!(
                "array index must be int, found {}",
                other.type_name()
            ))),
        }
    }
}

fn index_json_array(json: &serde_json::Value, i: i64) -> Result<Value, RuntimeError> {
    let items = json.as_array().ok_or_else(|| {
        RuntimeError::type_mismatch("cannot index a non-array json value with an int")
    })?;
    usize::try_from(i)
        .ok()
        .and_then(|idx| items.get(idx))
        .cloned()
        .map(Value::json)
        .ok_or(RuntimeError::IndexOutOfRange {
            index: i,
            size: items.len(),
        })
}

/// Apply an arithmetic, comparison or equality operator
fn apply_binary(op: BinaryOp, left: Value, right: Value) -> Result<Value, RuntimeError> {
    use BinaryOp::*;

    match op {
        Eq => return Ok(Value::Boolean(left == right)),
        Ne => return Ok(Value::Boolean(left != right)),
        _ => {}
    }

    match (&left, &right) {
        (Value::Int(a), Value::Int(b)) => {
            let (a, b) = (*a, *b);
            Ok(match op {
                Add => Value::Int(a.wrapping_add(b)),
                Sub => Value::Int(a.wrapping_sub(b)),
                Mul => Value::Int(a.wrapping_mul(b)),
                Div if b == 0 => return Err(RuntimeError::DivideByZero),
                Div => Value::Int(a.wrapping_div(b)),
                Mod if b == 0 => return Err(RuntimeError::DivideByZero),
                Mod => Value::Int(a.wrapping_rem(b)),
                Lt => Value::Boolean(a < b),
                Le => Value::Boolean(a <= b),
                Gt => Value::Boolean(a > b),
                Ge => Value::Boolean(a >= b),
                Eq | Ne | And | Or => return Err(operand_mismatch(op, &left, &right)),
            })
        }
        (Value::Int(_) | Value::Float(_), Value::Int(_) | Value::Float(_)) => {
            let (a, b) = (as_f64(&left), as_f64(&right));
            Ok(match op {
                Add => Value::Float(a + b),
                Sub => Value::Float(a - b),
                Mul => Value::Float(a * b),
                Div => Value::Float(a / b),
                Mod => Value::Float(a % b),
                Lt => Value::Boolean(a < b),
                Le => Value::Boolean(a <= b),
                Gt => Value::Boolean(a > b),
                Ge => Value::Boolean(a >= b),
                Eq | Ne | And | Or => return Err(operand_mismatch(op, &left, &right)),
            })
        }
        (Value::String(a), Value::String(b)) if op != Add => Ok(match op {
            Lt => Value::Boolean(a < b),
            Le => Value::Boolean(a <= b),
            Gt => Value::Boolean(a > b),
            Ge => Value::Boolean(a >= b),
            _ => return Err(operand_mismatch(op, &left, &right)),
        }),
        // String concatenation accepts any right or left operand
        (Value::String(_), _) | (_, Value::String(_)) if op == Add => {
            Ok(Value::string(format!("{}{}", left, right)))
        }
        _ => Err(operand_mismatch(op, &left, &right)),
    }
}

fn as_f64(value: &Value) -> f64 {
    match value {
        Value::Int(n) => *n as f64,
        Value::Float(f) => *f,
        _ => f64::NAN,
    }
}

fn operand_mismatch(op: BinaryOp, left: &Value, right: &Value) -> RuntimeError {
    RuntimeError::type_mismatch(format!(
        "operator '{}' cannot be applied to {} and {}",
        op.symbol(),
        left.type_name(),
        right.type_name()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case::int_add(BinaryOp::Add, Value::Int(2), Value::Int(3), Value::Int(5))]
    #[case::int_div_truncates(BinaryOp::Div, Value::Int(7), Value::Int(2), Value::Int(3))]
    #[case::mixed(BinaryOp::Mul, Value::Int(2), Value::Float(1.5), Value::Float(3.0))]
    #[case::float_div_zero(BinaryOp::Div, Value::Float(1.0), Value::Int(0), Value::Float(f64::INFINITY))]
    #[case::concat(BinaryOp::Add, Value::string("n="), Value::Int(4), Value::string("n=4"))]
    #[case::string_cmp(BinaryOp::Lt, Value::string("a"), Value::string("b"), Value::Boolean(true))]
    #[case::eq_mixed(BinaryOp::Eq, Value::Int(1), Value::Float(1.0), Value::Boolean(true))]
    #[case::ne_types(BinaryOp::Ne, Value::Null, Value::Int(0), Value::Boolean(true))]
    fn test_apply_binary(#[case] op: BinaryOp, #[case] left: Value, #[case] right: Value, #[case] expected: Value) {
        assert_eq!(apply_binary(op, left, right).unwrap(), expected);
    }

    #[rstest]
    #[case::div(BinaryOp::Div)]
    #[case::rem(BinaryOp::Mod)]
    fn test_int_division_by_zero(#[case] op: BinaryOp) {
        let err = apply_binary(op, Value::Int(1), Value::Int(0)).unwrap_err();
        assert_eq!(err.to_string(), "/ by zero");
    }

    #[test]
    fn test_operand_mismatch_message() {
        let err = apply_binary(BinaryOp::Sub, Value::Boolean(true), Value::Int(1)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Incompatible types: operator '-' cannot be applied to boolean and int"
        );
    }

    #[test]
    fn test_json_array_index() {
        let json = serde_json::json!(["a", "b"]);
        assert_eq!(index_json_array(&json, 1).unwrap(), Value::json(serde_json::json!("b")));
        assert_eq!(
            index_json_array(&json, 2).unwrap_err().to_string(),
            "Array index out of range: Index: 2, Size: 2"
        );
    }
}
