//! Declared-type checks for locals, parameters and return values

use crate::ast::{PrimitiveType, TypeRef};
use crate::value::{Value, ValueArray};

/// Value a declared but uninitialized variable starts with
pub(super) fn zero_value(ty: &TypeRef) -> Value {
    match ty {
        TypeRef::Primitive(PrimitiveType::Int, _) => Value::Int(0),
        TypeRef::Primitive(PrimitiveType::Float, _) => Value::Float(0.0),
        TypeRef::Primitive(PrimitiveType::String, _) => Value::string(""),
        TypeRef::Primitive(PrimitiveType::Boolean, _) => Value::Boolean(false),
        TypeRef::Primitive(PrimitiveType::Json, _) => Value::Null,
        TypeRef::Array(_, _) => Value::Array(ValueArray::new()),
    }
}

/// Check `value` against `ty`, applying the implicit conversions
/// (int to float, anything JSON-representable to json).
///
/// `null` is accepted for string, json and array types. On mismatch the
/// error holds the name of the offending value's type.
pub(super) fn coerce(ty: &TypeRef, value: Value) -> Result<Value, &'static str> {
    match (ty, value) {
        (TypeRef::Primitive(PrimitiveType::Int, _), v @ Value::Int(_)) => Ok(v),
        (TypeRef::Primitive(PrimitiveType::Float, _), v @ Value::Float(_)) => Ok(v),
        (TypeRef::Primitive(PrimitiveType::Float, _), Value::Int(n)) => Ok(Value::Float(n as f64)),
        (TypeRef::Primitive(PrimitiveType::Boolean, _), v @ Value::Boolean(_)) => Ok(v),
        (TypeRef::Primitive(PrimitiveType::String, _), v @ (Value::String(_) | Value::Null)) => Ok(v),
        (TypeRef::Primitive(PrimitiveType::Json, _), v @ (Value::Json(_) | Value::Null)) => Ok(v),
        (TypeRef::Primitive(PrimitiveType::Json, _), v) => Ok(Value::json(v.to_json())),
        (TypeRef::Array(_, _), Value::Null) => Ok(Value::Null),
        (TypeRef::Array(inner, _), Value::Array(items)) => {
            let mut converted = Vec::with_capacity(items.len());
            for item in items.iter() {
                converted.push(coerce(inner, item.clone())?);
            }
            Ok(Value::array(converted))
        }
        (_, other) => Err(other.type_name()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::Span;
    use pretty_assertions::assert_eq;

    fn prim(p: PrimitiveType) -> TypeRef {
        TypeRef::Primitive(p, Span::dummy())
    }

    fn array_of(p: PrimitiveType) -> TypeRef {
        TypeRef::Array(Box::new(prim(p)), Span::dummy())
    }

    #[test]
    fn test_zero_values() {
        assert_eq!(zero_value(&prim(PrimitiveType::Int)), Value::Int(0));
        assert_eq!(zero_value(&prim(PrimitiveType::String)), Value::string(""));
        assert_eq!(zero_value(&prim(PrimitiveType::Json)), Value::Null);
        assert_eq!(zero_value(&array_of(PrimitiveType::String)), Value::array(vec![]));
    }

    #[test]
    fn test_widening_and_rejection() {
        assert_eq!(coerce(&prim(PrimitiveType::Float), Value::Int(2)), Ok(Value::Float(2.0)));
        assert_eq!(coerce(&prim(PrimitiveType::Int), Value::Float(2.0)), Err("float"));
        assert_eq!(coerce(&prim(PrimitiveType::Boolean), Value::Null), Err("null"));
    }

    #[test]
    fn test_json_accepts_scalars() {
        assert_eq!(
            coerce(&prim(PrimitiveType::Json), Value::string("x")),
            Ok(Value::json(serde_json::json!("x")))
        );
    }

    #[test]
    fn test_array_elements_checked() {
        let ok = coerce(&array_of(PrimitiveType::Float), Value::array(vec![Value::Int(1)]));
        assert_eq!(ok, Ok(Value::array(vec![Value::Float(1.0)])));

        let bad = coerce(&array_of(PrimitiveType::Int), Value::array(vec![Value::string("a")]));
        assert_eq!(bad, Err("string"));
    }
}
