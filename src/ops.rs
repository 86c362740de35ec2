//! Value operators. `first` is the operand written first in prefix order.

use crate::{
    error::{LangError, LangResult},
    token::Op,
    value::Value,
};

pub fn binary(op: Op, first: Value, second: Value) -> LangResult<Value> {
    match op {
        Op::Add => add(first, second),
        Op::Subtract => arithmetic(op, first, second, i64::checked_sub, |a, b| a - b),
        Op::Multiply => arithmetic(op, first, second, i64::checked_mul, |a, b| a * b),
        Op::IntDivide => int_divide(first, second),
        Op::FloatDivide => {
            let (a, b) = (as_float(op, &first)?, as_float(op, &second)?);
            if b == 0.0 {
                return Err(LangError::runtime("Division by zero"));
            }
            Ok(Value::Float(a / b))
        }
        Op::Modulo => modulo(first, second),
        Op::Greater => greater(first, second),
        Op::Equals => Ok(Value::Boolean(first.loose_eq(&second))),
        Op::Or => Ok(if first.is_truthy() { first } else { second }),
        Op::And => Ok(if first.is_truthy() { second } else { first }),
        Op::Concat => concat(first, second),
        Op::Append => match first {
            Value::List(items) => {
                items.borrow_mut().push(second);
                Ok(Value::List(items))
            }
            other => Err(mismatch(op, &other)),
        },
        Op::IndexGet => index_get(first, second),
        other => Err(LangError::type_error(format!(
            "'{}' is not a binary operator",
            other.name()
        ))),
    }
}

pub fn unary(op: Op, value: Value) -> LangResult<Value> {
    match op {
        Op::Not => Ok(Value::Boolean(!value.is_truthy())),
        Op::ToBool => Ok(Value::Boolean(value.is_truthy())),
        Op::ToInt => to_int(value),
        Op::ToStr => Ok(Value::String(value.to_string())),
        Op::ToFloat => to_float(value),
        Op::RemoveLast => match value {
            Value::List(items) => {
                if items.borrow_mut().pop().is_none() {
                    return Err(LangError::runtime("rm on an empty list"));
                }
                Ok(Value::List(items))
            }
            other => Err(mismatch(op, &other)),
        },
        Op::Split => match value {
            Value::String(s) => Ok(Value::list(
                s.split_whitespace()
                    .map(|part| Value::String(part.to_string()))
                    .collect(),
            )),
            other => Err(mismatch(op, &other)),
        },
        Op::Length => match value {
            Value::String(s) => Ok(Value::Integer(s.chars().count() as i64)),
            Value::List(items) => Ok(Value::Integer(items.borrow().len() as i64)),
            other => Err(mismatch(op, &other)),
        },
        other => Err(LangError::type_error(format!(
            "'{}' is not a unary operator",
            other.name()
        ))),
    }
}

pub fn is_unary(op: Op) -> bool {
    matches!(
        op,
        Op::Not
            | Op::ToBool
            | Op::ToInt
            | Op::ToStr
            | Op::ToFloat
            | Op::RemoveLast
            | Op::Split
            | Op::Length
    )
}

/// `pt list index value`: replaces one element in place.
pub fn put(list: Value, index: Value, value: Value) -> LangResult<()> {
    let items = match list {
        Value::List(items) => items,
        other => return Err(mismatch(Op::IndexPut, &other)),
    };
    let index = match index {
        Value::Integer(n) => n,
        other => {
            return Err(LangError::type_error(format!(
                "pt index must be an int, found {}",
                other.type_name()
            )))
        }
    };
    let mut items = items.borrow_mut();
    let slot = resolve_index(index, items.len())?;
    items[slot] = value;
    Ok(())
}

fn add(first: Value, second: Value) -> LangResult<Value> {
    match (first, second) {
        (Value::String(a), Value::String(b)) => Ok(Value::String(a + &b)),
        (Value::List(a), Value::List(b)) => {
            let mut items = a.borrow().clone();
            items.extend(b.borrow().iter().cloned());
            Ok(Value::list(items))
        }
        (first, second) => arithmetic(Op::Add, first, second, i64::checked_add, |a, b| a + b),
    }
}

fn arithmetic(
    op: Op,
    first: Value,
    second: Value,
    ints: fn(i64, i64) -> Option<i64>,
    floats: fn(f64, f64) -> f64,
) -> LangResult<Value> {
    match (&first, &second) {
        (Value::Integer(a), Value::Integer(b)) => ints(*a, *b)
            .map(Value::Integer)
            .ok_or_else(|| LangError::runtime(format!("Integer overflow in '{}'", op.name()))),
        _ => Ok(Value::Float(floats(as_float(op, &first)?, as_float(op, &second)?))),
    }
}

/// Floors toward negative infinity.
fn int_divide(first: Value, second: Value) -> LangResult<Value> {
    match (&first, &second) {
        (Value::Integer(_), Value::Integer(0)) => Err(LangError::runtime("Division by zero")),
        (Value::Integer(a), Value::Integer(b)) => {
            let quotient = a
                .checked_div(*b)
                .ok_or_else(|| LangError::runtime("Integer overflow in 'big25'"))?;
            let floored = if a % b != 0 && ((*a < 0) != (*b < 0)) {
                quotient - 1
            } else {
                quotient
            };
            Ok(Value::Integer(floored))
        }
        _ => {
            let (a, b) = (
                as_float(Op::IntDivide, &first)?,
                as_float(Op::IntDivide, &second)?,
            );
            if b == 0.0 {
                return Err(LangError::runtime("Division by zero"));
            }
            Ok(Value::Float((a / b).floor()))
        }
    }
}

/// The result takes the sign of the divisor.
fn modulo(first: Value, second: Value) -> LangResult<Value> {
    match (&first, &second) {
        (Value::Integer(_), Value::Integer(0)) => Err(LangError::runtime("Modulo by zero")),
        (Value::Integer(a), Value::Integer(b)) => {
            let rem = a.checked_rem(*b).unwrap_or(0);
            let adjusted = if rem != 0 && ((rem < 0) != (*b < 0)) {
                rem + b
            } else {
                rem
            };
            Ok(Value::Integer(adjusted))
        }
        _ => {
            let (a, b) = (
                as_float(Op::Modulo, &first)?,
                as_float(Op::Modulo, &second)?,
            );
            if b == 0.0 {
                return Err(LangError::runtime("Modulo by zero"));
            }
            Ok(Value::Float(a - b * (a / b).floor()))
        }
    }
}

fn greater(first: Value, second: Value) -> LangResult<Value> {
    let result = match (&first, &second) {
        (Value::Integer(a), Value::Integer(b)) => a > b,
        (Value::String(a), Value::String(b)) => a > b,
        (Value::Boolean(a), Value::Boolean(b)) => a > b,
        _ => as_float(Op::Greater, &first)? > as_float(Op::Greater, &second)?,
    };
    Ok(Value::Boolean(result))
}

fn concat(first: Value, second: Value) -> LangResult<Value> {
    match (first, second) {
        (Value::String(a), Value::String(b)) => Ok(Value::String(a + &b)),
        (Value::List(a), Value::List(b)) => {
            let mut items = a.borrow().clone();
            items.extend(b.borrow().iter().cloned());
            Ok(Value::list(items))
        }
        (a, b) => Err(LangError::type_error(format!(
            "stroke needs two strings or two lists, found {} and {}",
            a.type_name(),
            b.type_name()
        ))),
    }
}

fn index_get(target: Value, index: Value) -> LangResult<Value> {
    let index = match index {
        Value::Integer(n) => n,
        other => {
            return Err(LangError::type_error(format!(
                "gt index must be an int, found {}",
                other.type_name()
            )))
        }
    };
    match target {
        Value::List(items) => {
            let items = items.borrow();
            let slot = resolve_index(index, items.len())?;
            Ok(items[slot].clone())
        }
        Value::String(s) => {
            let chars: Vec<char> = s.chars().collect();
            let slot = resolve_index(index, chars.len())?;
            Ok(Value::String(chars[slot].to_string()))
        }
        other => Err(mismatch(Op::IndexGet, &other)),
    }
}

/// Negative indices count back from the end.
fn resolve_index(index: i64, len: usize) -> LangResult<usize> {
    let resolved = if index < 0 {
        (len as i64).checked_add(index)
    } else {
        Some(index)
    };
    match resolved {
        Some(i) if i >= 0 && (i as usize) < len => Ok(i as usize),
        _ => Err(LangError::runtime(format!(
            "Index {} out of range for length {}",
            index, len
        ))),
    }
}

fn to_int(value: Value) -> LangResult<Value> {
    match value {
        Value::Integer(n) => Ok(Value::Integer(n)),
        Value::Boolean(b) => Ok(Value::Integer(b as i64)),
        Value::Float(x) if x.is_finite() && x.abs() < i64::MAX as f64 => {
            Ok(Value::Integer(x.trunc() as i64))
        }
        Value::String(s) => s.trim().parse::<i64>().map(Value::Integer).map_err(|_| {
            LangError::type_error(format!("Cannot convert '{}' to int", s))
        }),
        other => Err(LangError::type_error(format!(
            "Cannot convert {} to int",
            other
        ))),
    }
}

fn to_float(value: Value) -> LangResult<Value> {
    match value {
        Value::Float(x) => Ok(Value::Float(x)),
        Value::Integer(n) => Ok(Value::Float(n as f64)),
        Value::Boolean(b) => Ok(Value::Float(if b { 1.0 } else { 0.0 })),
        Value::String(s) => s.trim().parse::<f64>().map(Value::Float).map_err(|_| {
            LangError::type_error(format!("Cannot convert '{}' to float", s))
        }),
        other => Err(LangError::type_error(format!(
            "Cannot convert {} to float",
            other
        ))),
    }
}

fn as_float(op: Op, value: &Value) -> LangResult<f64> {
    match value {
        Value::Integer(n) => Ok(*n as f64),
        Value::Float(x) => Ok(*x),
        other => Err(mismatch(op, other)),
    }
}

fn mismatch(op: Op, value: &Value) -> LangError {
    LangError::type_error(format!(
        "'{}' cannot be applied to {} {:?}",
        op.name(),
        value.type_name(),
        value
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(value: LangResult<Value>) -> i64 {
        match value {
            Ok(Value::Integer(n)) => n,
            other => panic!("expected int, got {:?}", other),
        }
    }

    #[test]
    fn operand_order_follows_prefix_notation() {
        assert_eq!(int(binary(Op::Subtract, Value::Integer(5), Value::Integer(2))), 3);
        match binary(Op::Greater, Value::Integer(1), Value::Integer(3)) {
            Ok(Value::Boolean(b)) => assert!(!b),
            other => panic!("expected bool, got {:?}", other),
        }
    }

    #[test]
    fn mixed_arithmetic_promotes_to_float() {
        match binary(Op::Add, Value::Integer(1), Value::Float(0.5)) {
            Ok(Value::Float(x)) => assert_eq!(x, 1.5),
            other => panic!("expected float, got {:?}", other),
        }
        match binary(Op::FloatDivide, Value::Integer(7), Value::Integer(2)) {
            Ok(Value::Float(x)) => assert_eq!(x, 3.5),
            other => panic!("expected float, got {:?}", other),
        }
    }

    #[test]
    fn integer_division_floors() {
        assert_eq!(int(binary(Op::IntDivide, Value::Integer(7), Value::Integer(2))), 3);
        assert_eq!(int(binary(Op::IntDivide, Value::Integer(-7), Value::Integer(2))), -4);
        assert_eq!(int(binary(Op::Modulo, Value::Integer(-7), Value::Integer(3))), 2);
        assert_eq!(int(binary(Op::Modulo, Value::Integer(7), Value::Integer(-3))), -2);
    }

    #[test]
    fn division_by_zero_is_a_runtime_error() {
        for op in [Op::IntDivide, Op::FloatDivide, Op::Modulo] {
            assert!(matches!(
                binary(op, Value::Integer(1), Value::Integer(0)),
                Err(LangError::Runtime(_, None))
            ));
        }
    }

    #[test]
    fn overflow_is_reported() {
        assert!(matches!(
            binary(Op::Add, Value::Integer(i64::MAX), Value::Integer(1)),
            Err(LangError::Runtime(_, None))
        ));
    }

    #[test]
    fn or_and_return_an_operand() {
        assert_eq!(int(binary(Op::Or, Value::Integer(0), Value::Integer(5))), 5);
        assert_eq!(int(binary(Op::Or, Value::Integer(3), Value::Integer(5))), 3);
        assert_eq!(int(binary(Op::And, Value::Integer(3), Value::Integer(5))), 5);
        assert_eq!(int(binary(Op::And, Value::Integer(0), Value::Integer(5))), 0);
    }

    #[test]
    fn strings_add_and_concatenate() {
        for op in [Op::Add, Op::Concat] {
            match binary(op, Value::String("ab".into()), Value::String("cd".into())) {
                Ok(Value::String(s)) => assert_eq!(s, "abcd"),
                other => panic!("expected string, got {:?}", other),
            }
        }
        assert!(matches!(
            binary(Op::Concat, Value::String("a".into()), Value::Integer(1)),
            Err(LangError::Type(_, None))
        ));
    }

    #[test]
    fn append_mutates_the_shared_list() -> LangResult<()> {
        let list = Value::empty_list();
        let result = binary(Op::Append, list.clone(), Value::Integer(4))?;
        match (&list, &result) {
            (Value::List(a), Value::List(b)) => {
                assert!(std::rc::Rc::ptr_eq(a, b));
                assert_eq!(a.borrow().len(), 1);
            }
            _ => panic!("expected lists"),
        }
        Ok(())
    }

    #[test]
    fn indexing_supports_negative_positions() -> LangResult<()> {
        let list = Value::list(vec![Value::Integer(1), Value::Integer(2), Value::Integer(3)]);
        assert_eq!(int(binary(Op::IndexGet, list.clone(), Value::Integer(-1))), 3);
        assert!(matches!(
            binary(Op::IndexGet, list.clone(), Value::Integer(3)),
            Err(LangError::Runtime(_, None))
        ));
        match binary(Op::IndexGet, Value::String("héllo".into()), Value::Integer(1))? {
            Value::String(s) => assert_eq!(s, "é"),
            other => panic!("expected string, got {:?}", other),
        }

        put(list.clone(), Value::Integer(0), Value::Integer(9))?;
        assert_eq!(int(binary(Op::IndexGet, list, Value::Integer(0))), 9);
        Ok(())
    }

    #[test]
    fn conversions() -> LangResult<()> {
        assert_eq!(int(unary(Op::ToInt, Value::String(" 42 ".into()))), 42);
        assert_eq!(int(unary(Op::ToInt, Value::Float(-2.7))), -2);
        assert_eq!(int(unary(Op::ToInt, Value::Boolean(true))), 1);
        assert!(matches!(
            unary(Op::ToInt, Value::String("nope".into())),
            Err(LangError::Type(_, None))
        ));
        match unary(Op::ToStr, Value::Integer(7))? {
            Value::String(s) => assert_eq!(s, "7"),
            other => panic!("expected string, got {:?}", other),
        }
        match unary(Op::ToFloat, Value::String("2.5".into()))? {
            Value::Float(x) => assert_eq!(x, 2.5),
            other => panic!("expected float, got {:?}", other),
        }
        Ok(())
    }

    #[test]
    fn split_length_and_remove() -> LangResult<()> {
        let parts = unary(Op::Split, Value::String("a  b c".into()))?;
        assert_eq!(int(unary(Op::Length, parts.clone())), 3);
        unary(Op::RemoveLast, parts.clone())?;
        assert_eq!(int(unary(Op::Length, parts)), 2);
        assert!(matches!(
            unary(Op::RemoveLast, Value::empty_list()),
            Err(LangError::Runtime(_, None))
        ));
        Ok(())
    }
}
