use std::cmp::Ordering;

use log::debug;
use rust_decimal::{
    Decimal,
    prelude::{FromPrimitive, ToPrimitive},
};
use thiserror::Error;

use crate::{
    ast::{BinOp, Expr, Statement},
    transform::{
        Accessor, Cursor, Path, PathSegment, remove_segment, split_access, step, to_key,
        write_segment,
    },
    tree::{Key, Slot, TreeError, TreeView},
    value::Value,
};

/// Errors that can occur while evaluating a statement.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    /// Tree access or materialization failed
    #[error(transparent)]
    Tree(#[from] TreeError),

    /// Type mismatch or invalid operation for the given type
    #[error("type error: {0}")]
    TypeError(String),

    /// Invalid attribute, field or position on a plain value
    #[error("access error: {0}")]
    AccessError(String),

    /// A name other than `src` or `dst`
    #[error("undefined name '{0}': only src and dst are bound")]
    UndefinedName(String),

    /// Call of a function that is not a builtin
    #[error("unknown function '{0}'")]
    UnknownFunction(String),

    /// Call of a method the receiver does not have
    #[error("unknown method '{method}' on {receiver}")]
    UnknownMethod {
        method: String,
        receiver: &'static str,
    },

    /// Division or modulo by zero
    #[error("division by zero")]
    DivisionByZero,

    /// Integer arithmetic left the 64-bit range
    #[error("integer overflow in '{0}'")]
    Overflow(&'static str),

    /// A `.matches()` pattern that does not compile
    #[error("invalid regex: {0}")]
    InvalidRegex(String),
}

/// Executes statements against a `src`/`dst` pair of tree views.
///
/// `src` is the input document, `dst` the document being built. Both are
/// mutable: reading a missing attribute creates a placeholder in whichever tree
/// it is read from.
///
/// # Examples
///
/// ```
/// use json_transformer::{Evaluator, parser::parse_statement, tree::TreeView};
/// use serde_json::json;
///
/// let src = TreeView::from_json(json!({"name": "Ada"})).unwrap();
/// let mut evaluator = Evaluator::new(src);
///
/// let statement = parse_statement("dst.user.name = src.name.upper()").unwrap();
/// evaluator.exec(&statement).unwrap();
///
/// assert_eq!(
///     evaluator.dst().to_plain().unwrap(),
///     json!({"user": {"name": "ADA"}})
/// );
/// ```
#[derive(Debug, Clone)]
pub struct Evaluator {
    src: TreeView,
    dst: TreeView,
}

impl Evaluator {
    /// Binds `src` and an empty `dst`.
    pub fn new(src: TreeView) -> Self {
        Self::with_bindings(src, TreeView::new())
    }

    pub fn with_bindings(src: TreeView, dst: TreeView) -> Self {
        Evaluator { src, dst }
    }

    pub fn src(&self) -> &TreeView {
        &self.src
    }

    pub fn dst(&self) -> &TreeView {
        &self.dst
    }

    /// Releases the `dst` tree.
    pub fn into_dst(self) -> TreeView {
        self.dst
    }

    /// Executes one statement.
    pub fn exec(&mut self, statement: &Statement) -> Result<(), EvalError> {
        match statement {
            Statement::Assign { target, op, value } => self.assign(target, *op, value),
            Statement::Delete(target) => self.delete(target),
            Statement::Expr(expr) => self.eval_expr(expr).map(|_| ()),
            Statement::Pass => Ok(()),
        }
    }

    /// Evaluates a standalone expression.
    pub fn eval_expression(&mut self, expr: &Expr) -> Result<Value, EvalError> {
        self.eval_expr(expr)
    }

    fn assign(&mut self, target: &Expr, op: Option<BinOp>, value: &Expr) -> Result<(), EvalError> {
        let value = match op {
            Some(op) => {
                let current = self.eval_access(target)?;
                let operand = self.eval_expr(value)?;
                apply_binop(op, &current, &operand)?
            }
            None => self.eval_expr(value)?,
        };
        let slot = value.into_slot()?;

        let (parent, last) = self.resolve_target(target)?;
        match self.walk(target, &parent)? {
            Cursor::Live(view) => write_segment(view, &last, slot),
            Cursor::Detached(Value::View(mut view)) => {
                write_segment(&mut view, &last, slot)?;
                debug!("assignment into a detached view of raw data is not stored back");
                Ok(())
            }
            Cursor::Detached(other) => Err(EvalError::TypeError(format!(
                "cannot assign into {}",
                other.type_name()
            ))),
        }
    }

    fn delete(&mut self, target: &Expr) -> Result<(), EvalError> {
        let (parent, last) = self.resolve_target(target)?;
        match self.walk(target, &parent)? {
            Cursor::Live(view) => remove_segment(view, &last),
            Cursor::Detached(Value::View(mut view)) => {
                remove_segment(&mut view, &last)?;
                debug!("deletion from a detached view of raw data is not stored back");
                Ok(())
            }
            Cursor::Detached(other) => Err(EvalError::TypeError(format!(
                "cannot delete from {}",
                other.type_name()
            ))),
        }
    }

    /// Evaluates the keys of an assignment target, split into the path to the
    /// parent container and the final segment.
    fn resolve_target(&mut self, target: &Expr) -> Result<(Path, PathSegment), EvalError> {
        let (_, accessors) = split_access(target);
        let mut path = self.resolve_path(&accessors)?;
        let last = path.pop().ok_or_else(|| {
            EvalError::TypeError("assignment target must end in an attribute or index".to_string())
        })?;
        Ok((path, last))
    }

    fn resolve_path(&mut self, accessors: &[Accessor<'_>]) -> Result<Path, EvalError> {
        let mut path = Vec::with_capacity(accessors.len());
        for accessor in accessors {
            let segment = match accessor {
                Accessor::Attr(name) => PathSegment::Attr(name.to_string()),
                Accessor::Index([key]) => PathSegment::Index(self.eval_expr(key)?),
                Accessor::Index(keys) => PathSegment::Tuple(
                    keys.iter()
                        .map(|key| self.eval_expr(key))
                        .collect::<Result<_, _>>()?,
                ),
            };
            path.push(segment);
        }
        Ok(path)
    }

    /// Walks `path` from the base of the access chain `expr`.
    fn walk(&mut self, expr: &Expr, path: &[PathSegment]) -> Result<Cursor<'_>, EvalError> {
        let (base, _) = split_access(expr);
        let mut cursor = match base {
            Expr::Name(name) => match name.as_str() {
                "src" => Cursor::Live(&mut self.src),
                "dst" => Cursor::Live(&mut self.dst),
                _ => return Err(EvalError::UndefinedName(name.clone())),
            },
            other => Cursor::Detached(self.eval_expr(other)?),
        };
        for segment in path {
            cursor = step(cursor, segment)?;
        }
        Ok(cursor)
    }

    fn eval_access(&mut self, expr: &Expr) -> Result<Value, EvalError> {
        let (_, accessors) = split_access(expr);
        let path = self.resolve_path(&accessors)?;
        Ok(self.walk(expr, &path)?.into_value())
    }

    fn eval_expr(&mut self, expr: &Expr) -> Result<Value, EvalError> {
        match expr {
            Expr::Float(n) => Ok(Value::Float(*n)),
            Expr::Integer(n) => Ok(Value::Integer(*n)),
            Expr::String(s) => Ok(Value::String(s.clone())),
            Expr::Boolean(b) => Ok(Value::Boolean(*b)),
            Expr::Null => Ok(Value::Null),
            Expr::Name(_) | Expr::Attr { .. } | Expr::Index { .. } => self.eval_access(expr),
            Expr::BinaryOp { op, left, right } => match op {
                BinOp::And => {
                    let left_val = self.eval_expr(left)?;
                    if left_val.is_truthy() {
                        self.eval_expr(right)
                    } else {
                        Ok(left_val)
                    }
                }
                BinOp::Or => {
                    let left_val = self.eval_expr(left)?;
                    if left_val.is_truthy() {
                        Ok(left_val)
                    } else {
                        self.eval_expr(right)
                    }
                }
                _ => {
                    let left_val = self.eval_expr(left)?;
                    let right_val = self.eval_expr(right)?;
                    apply_binop(*op, &left_val, &right_val)
                }
            },
            Expr::Not(operand) => Ok(Value::Boolean(!self.eval_expr(operand)?.is_truthy())),
            Expr::Negate(operand) => match self.eval_expr(operand)? {
                Value::Integer(n) => n
                    .checked_neg()
                    .map(Value::Integer)
                    .ok_or(EvalError::Overflow("-")),
                Value::Float(n) => Ok(Value::Float(-n)),
                other => Err(EvalError::TypeError(format!(
                    "cannot negate {}",
                    other.type_name()
                ))),
            },
            Expr::Object(items) => {
                let mut fields = Vec::with_capacity(items.len());
                for (key, expr) in items {
                    let value = self.eval_expr(expr)?;
                    match fields.iter_mut().find(|(k, _): &&mut (String, Value)| k == key) {
                        Some((_, existing)) => *existing = value,
                        None => fields.push((key.clone(), value)),
                    }
                }
                Ok(Value::Object(fields))
            }
            Expr::Array(exprs) => {
                let mut arr = Vec::with_capacity(exprs.len());
                for expr in exprs {
                    arr.push(self.eval_expr(expr)?);
                }
                Ok(Value::Array(arr))
            }
            Expr::Call { function, args } => {
                let args = self.eval_args(args)?;
                call_builtin(function, &args)
            }
            Expr::MethodCall {
                object,
                method,
                args,
            } => {
                let receiver = self.eval_expr(object)?;
                let args = self.eval_args(args)?;
                call_method(&receiver, method, &args)
            }
        }
    }

    fn eval_args(&mut self, args: &[Expr]) -> Result<Vec<Value>, EvalError> {
        args.iter().map(|arg| self.eval_expr(arg)).collect()
    }
}

// ========================================
// Operators
// ========================================

/// Applies a non-short-circuiting binary operator.
pub fn apply_binop(op: BinOp, left: &Value, right: &Value) -> Result<Value, EvalError> {
    match op {
        BinOp::Add => match (left, right) {
            (Value::String(a), Value::String(b)) => Ok(Value::String(format!("{}{}", a, b))),
            (Value::Array(a), Value::Array(b)) => {
                Ok(Value::Array(a.iter().chain(b.iter()).cloned().collect()))
            }
            _ => arithmetic(op, left, right),
        },
        BinOp::Multiply => match (left, right) {
            (Value::String(s), Value::Integer(n)) | (Value::Integer(n), Value::String(s)) => {
                let count = repeat_count(*n);
                repeated_len(s.len(), count)?;
                Ok(Value::String(s.repeat(count)))
            }
            (Value::Array(arr), Value::Integer(n)) | (Value::Integer(n), Value::Array(arr)) => {
                let len = repeated_len(arr.len(), repeat_count(*n))?;
                Ok(Value::Array(arr.iter().cloned().cycle().take(len).collect()))
            }
            _ => arithmetic(op, left, right),
        },
        BinOp::Subtract | BinOp::Divide | BinOp::FloorDivide | BinOp::Modulo => {
            arithmetic(op, left, right)
        }
        BinOp::Equal => Ok(Value::Boolean(values_equal(left, right))),
        BinOp::NotEqual => Ok(Value::Boolean(!values_equal(left, right))),
        BinOp::LessThan | BinOp::GreaterThan | BinOp::LessEqual | BinOp::GreaterEqual => {
            let ordering = compare_values(left, right).ok_or_else(|| {
                EvalError::TypeError(format!(
                    "'{}' not supported between {} and {}",
                    op.symbol(),
                    left.type_name(),
                    right.type_name()
                ))
            })?;
            let result = match op {
                BinOp::LessThan => ordering == Ordering::Less,
                BinOp::GreaterThan => ordering == Ordering::Greater,
                BinOp::LessEqual => ordering != Ordering::Greater,
                _ => ordering != Ordering::Less,
            };
            Ok(Value::Boolean(result))
        }
        BinOp::In => contains(right, left).map(Value::Boolean),
        BinOp::NotIn => contains(right, left).map(|found| Value::Boolean(!found)),
        BinOp::And => Ok(if left.is_truthy() {
            right.clone()
        } else {
            left.clone()
        }),
        BinOp::Or => Ok(if left.is_truthy() {
            left.clone()
        } else {
            right.clone()
        }),
    }
}

/// Largest string (in bytes) or array (in elements) that `*` may build.
pub const MAX_REPEAT_LEN: usize = 1 << 26;

fn repeat_count(n: i64) -> usize {
    usize::try_from(n).unwrap_or(0)
}

fn repeated_len(len: usize, count: usize) -> Result<usize, EvalError> {
    len.checked_mul(count)
        .filter(|total| *total <= MAX_REPEAT_LEN)
        .ok_or(EvalError::Overflow("*"))
}

/// Converts an integral float to an integer, failing outside the 64-bit range.
fn float_to_int(f: f64, function: &'static str) -> Result<i64, EvalError> {
    // i64::MIN is exactly -2^63; i64::MAX as f64 rounds up to 2^63
    if f.is_finite() && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Ok(f as i64)
    } else {
        Err(EvalError::Overflow(function))
    }
}

fn arithmetic(op: BinOp, left: &Value, right: &Value) -> Result<Value, EvalError> {
    match (left, right) {
        (Value::Integer(a), Value::Integer(b)) => integer_arithmetic(op, *a, *b),
        (Value::Float(_) | Value::Integer(_), Value::Float(_) | Value::Integer(_)) => {
            let is_int = |v: &Value| matches!(v, Value::Integer(_));
            // Mixed operands go through Decimal so 0.1 + 0.2 stays 0.3
            if (is_int(left) || is_int(right))
                && let (Some(a), Some(b)) = (to_decimal(left), to_decimal(right))
                && let Some(result) = decimal_arithmetic(op, a, b)?
            {
                return Ok(Value::Float(result));
            }
            let a = left.as_float().unwrap_or(f64::NAN);
            let b = right.as_float().unwrap_or(f64::NAN);
            float_arithmetic(op, a, b)
        }
        (a, b) => Err(EvalError::TypeError(format!(
            "unsupported operand types for {}: {} and {}",
            op.symbol(),
            a.type_name(),
            b.type_name()
        ))),
    }
}

fn integer_arithmetic(op: BinOp, a: i64, b: i64) -> Result<Value, EvalError> {
    let overflow = || EvalError::Overflow(op.symbol());
    match op {
        BinOp::Add => a.checked_add(b).map(Value::Integer).ok_or_else(overflow),
        BinOp::Subtract => a.checked_sub(b).map(Value::Integer).ok_or_else(overflow),
        BinOp::Multiply => a.checked_mul(b).map(Value::Integer).ok_or_else(overflow),
        BinOp::Divide => {
            if b == 0 {
                return Err(EvalError::DivisionByZero);
            }
            match decimal_arithmetic(op, Decimal::from(a), Decimal::from(b))? {
                Some(result) => Ok(Value::Float(result)),
                None => Ok(Value::Float(a as f64 / b as f64)),
            }
        }
        BinOp::FloorDivide => {
            if b == 0 {
                return Err(EvalError::DivisionByZero);
            }
            let q = a.checked_div(b).ok_or_else(overflow)?;
            if a % b != 0 && ((a < 0) != (b < 0)) {
                Ok(Value::Integer(q - 1))
            } else {
                Ok(Value::Integer(q))
            }
        }
        BinOp::Modulo => {
            if b == 0 {
                return Err(EvalError::DivisionByZero);
            }
            let r = a.checked_rem(b).ok_or_else(overflow)?;
            if r != 0 && ((r < 0) != (b < 0)) {
                Ok(Value::Integer(r + b))
            } else {
                Ok(Value::Integer(r))
            }
        }
        _ => unreachable!("not an arithmetic operator: {:?}", op),
    }
}

fn float_arithmetic(op: BinOp, a: f64, b: f64) -> Result<Value, EvalError> {
    let result = match op {
        BinOp::Add => a + b,
        BinOp::Subtract => a - b,
        BinOp::Multiply => a * b,
        BinOp::Divide | BinOp::FloorDivide | BinOp::Modulo if b == 0.0 => {
            return Err(EvalError::DivisionByZero);
        }
        BinOp::Divide => a / b,
        BinOp::FloorDivide => (a / b).floor(),
        BinOp::Modulo => a - b * (a / b).floor(),
        _ => unreachable!("not an arithmetic operator: {:?}", op),
    };
    Ok(Value::Float(result))
}

fn to_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Integer(n) => Some(Decimal::from(*n)),
        Value::Float(f) => Decimal::from_f64(*f),
        _ => None,
    }
}

/// Decimal arithmetic, `None` when the result does not fit a Decimal.
fn decimal_arithmetic(op: BinOp, a: Decimal, b: Decimal) -> Result<Option<f64>, EvalError> {
    if matches!(op, BinOp::Divide | BinOp::FloorDivide | BinOp::Modulo) && b.is_zero() {
        return Err(EvalError::DivisionByZero);
    }
    let result = match op {
        BinOp::Add => a.checked_add(b),
        BinOp::Subtract => a.checked_sub(b),
        BinOp::Multiply => a.checked_mul(b),
        BinOp::Divide => a.checked_div(b),
        BinOp::FloorDivide => a.checked_div(b).map(|q| q.floor()),
        BinOp::Modulo => a
            .checked_div(b)
            .and_then(|q| b.checked_mul(q.floor()))
            .and_then(|m| a.checked_sub(m)),
        _ => None,
    };
    Ok(result.and_then(|r| r.to_f64()))
}

/// Equality with integers and floats compared numerically.
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Integer(x), Value::Float(y)) | (Value::Float(y), Value::Integer(x)) => {
            *x as f64 == *y
        }
        (Value::View(view), Value::Array(_) | Value::Object(_))
        | (Value::Array(_) | Value::Object(_), Value::View(view)) => {
            let other = if matches!(a, Value::View(_)) { b } else { a };
            match (view.to_plain(), other.to_json()) {
                (Ok(x), Ok(y)) => x == y,
                _ => false,
            }
        }
        _ => a == b,
    }
}

/// Ordering for numbers, strings, booleans and arrays of those.
pub fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Integer(a), Value::Integer(b)) => Some(a.cmp(b)),
        (Value::Float(_) | Value::Integer(_), Value::Float(_) | Value::Integer(_)) => {
            a.as_float()?.partial_cmp(&b.as_float()?)
        }
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Boolean(a), Value::Boolean(b)) => Some(a.cmp(b)),
        (Value::Array(a), Value::Array(b)) => {
            for (x, y) in a.iter().zip(b.iter()) {
                match compare_values(x, y)? {
                    Ordering::Equal => continue,
                    other => return Some(other),
                }
            }
            Some(a.len().cmp(&b.len()))
        }
        _ => None,
    }
}

/// Membership test backing `in`.
fn contains(container: &Value, item: &Value) -> Result<bool, EvalError> {
    match container {
        Value::String(s) => match item {
            Value::String(needle) => Ok(s.contains(needle.as_str())),
            other => Err(EvalError::TypeError(format!(
                "'in <string>' requires string as left operand, not {}",
                other.type_name()
            ))),
        },
        Value::Array(arr) => Ok(arr.iter().any(|v| values_equal(v, item))),
        Value::Object(fields) => match item {
            Value::String(name) => Ok(fields.iter().any(|(k, _)| k == name)),
            _ => Ok(false),
        },
        Value::View(view) => Ok(view.contains_key(&to_key(item)?)),
        other => Err(EvalError::TypeError(format!(
            "argument of type {} is not a container",
            other.type_name()
        ))),
    }
}

// ========================================
// Builtin Functions
// ========================================

fn expect_args(name: &str, args: &[Value], min: usize, max: usize) -> Result<(), EvalError> {
    if args.len() < min || args.len() > max {
        let expected = if min == max {
            min.to_string()
        } else {
            format!("{} to {}", min, max)
        };
        return Err(EvalError::TypeError(format!(
            "{}() takes {} argument(s), got {}",
            name,
            expected,
            args.len()
        )));
    }
    Ok(())
}

fn call_builtin(function: &str, args: &[Value]) -> Result<Value, EvalError> {
    match function {
        "len" => {
            expect_args(function, args, 1, 1)?;
            builtin_len(&args[0])
        }
        "str" => {
            expect_args(function, args, 1, 1)?;
            Ok(Value::String(args[0].as_string()?))
        }
        "int" => {
            expect_args(function, args, 1, 1)?;
            builtin_int(&args[0])
        }
        "float" => {
            expect_args(function, args, 1, 1)?;
            builtin_float(&args[0])
        }
        "bool" => {
            expect_args(function, args, 1, 1)?;
            Ok(Value::Boolean(args[0].is_truthy()))
        }
        "abs" => {
            expect_args(function, args, 1, 1)?;
            match &args[0] {
                Value::Integer(n) => n
                    .checked_abs()
                    .map(Value::Integer)
                    .ok_or(EvalError::Overflow("abs")),
                Value::Float(n) => Ok(Value::Float(n.abs())),
                other => Err(EvalError::TypeError(format!(
                    "abs() requires a number, got {}",
                    other.type_name()
                ))),
            }
        }
        "min" | "max" => builtin_extreme(function, args),
        "round" => {
            expect_args(function, args, 1, 2)?;
            builtin_round(&args[0], args.get(1))
        }
        _ => Err(EvalError::UnknownFunction(function.to_string())),
    }
}

/// len() - character, element or entry count
fn builtin_len(value: &Value) -> Result<Value, EvalError> {
    let len = match value {
        Value::String(s) => s.chars().count(),
        Value::Array(arr) => arr.len(),
        Value::Object(fields) => fields.len(),
        Value::View(view) => view.len(),
        other => {
            return Err(EvalError::TypeError(format!(
                "{} has no len()",
                other.type_name()
            )));
        }
    };
    Ok(Value::Integer(len as i64))
}

/// int() - truncates floats, parses strings
fn builtin_int(value: &Value) -> Result<Value, EvalError> {
    match value {
        Value::Integer(n) => Ok(Value::Integer(*n)),
        Value::Boolean(b) => Ok(Value::Integer(i64::from(*b))),
        Value::Float(f) if f.is_finite() => float_to_int(f.trunc(), "int").map(Value::Integer),
        Value::String(s) => s.trim().parse::<i64>().map(Value::Integer).map_err(|_| {
            EvalError::TypeError(format!("invalid literal for int(): {:?}", s))
        }),
        other => Err(EvalError::TypeError(format!(
            "int() cannot convert {}",
            other.type_name()
        ))),
    }
}

/// float() - widens integers, parses strings
fn builtin_float(value: &Value) -> Result<Value, EvalError> {
    match value {
        Value::String(s) => s.trim().parse::<f64>().map(Value::Float).map_err(|_| {
            EvalError::TypeError(format!("could not convert string to float: {:?}", s))
        }),
        other => other.as_float().map(Value::Float).ok_or_else(|| {
            EvalError::TypeError(format!("float() cannot convert {}", other.type_name()))
        }),
    }
}

/// min()/max() - over the arguments, or over a single array argument
fn builtin_extreme(function: &str, args: &[Value]) -> Result<Value, EvalError> {
    let items: &[Value] = match args {
        [Value::Array(arr)] => arr,
        [_] | [] => {
            return Err(EvalError::TypeError(format!(
                "{}() requires an array or at least two arguments",
                function
            )));
        }
        _ => args,
    };

    let mut best = items.first().ok_or_else(|| {
        EvalError::TypeError(format!("{}() of an empty array", function))
    })?;
    for item in &items[1..] {
        let ordering = compare_values(item, best).ok_or_else(|| {
            EvalError::TypeError(format!(
                "{}() cannot compare {} and {}",
                function,
                item.type_name(),
                best.type_name()
            ))
        })?;
        let better = if function == "min" {
            ordering == Ordering::Less
        } else {
            ordering == Ordering::Greater
        };
        if better {
            best = item;
        }
    }
    Ok(best.clone())
}

/// round() - banker's rounding to an integer, or to `digits` decimal places
fn builtin_round(value: &Value, digits: Option<&Value>) -> Result<Value, EvalError> {
    let number = match value {
        Value::Integer(n) => return Ok(Value::Integer(*n)),
        Value::Float(f) => *f,
        other => {
            return Err(EvalError::TypeError(format!(
                "round() requires a number, got {}",
                other.type_name()
            )));
        }
    };

    match digits {
        None => {
            let rounded = number.round_ties_even();
            if rounded.is_finite() {
                float_to_int(rounded, "round").map(Value::Integer)
            } else {
                Err(EvalError::TypeError("cannot round a non-finite float".to_string()))
            }
        }
        Some(Value::Integer(dp)) => {
            let dp = u32::try_from(*dp).unwrap_or(0);
            Ok(Decimal::from_f64(number)
                .map(|d| d.round_dp(dp))
                .and_then(|d| d.to_f64())
                .map(Value::Float)
                .unwrap_or(Value::Float(number)))
        }
        Some(other) => Err(EvalError::TypeError(format!(
            "round() digits must be an integer, got {}",
            other.type_name()
        ))),
    }
}

// ========================================
// Methods
// ========================================

fn call_method(receiver: &Value, method: &str, args: &[Value]) -> Result<Value, EvalError> {
    match (receiver, method) {
        // String methods
        (Value::String(s), "upper") => {
            expect_args(method, args, 0, 0)?;
            Ok(Value::String(s.to_uppercase()))
        }
        (Value::String(s), "lower") => {
            expect_args(method, args, 0, 0)?;
            Ok(Value::String(s.to_lowercase()))
        }
        (Value::String(s), "strip") => {
            expect_args(method, args, 0, 0)?;
            Ok(Value::String(s.trim().to_string()))
        }
        (Value::String(s), "split") => method_split(s, args),
        (Value::String(s), "replace") => {
            expect_args(method, args, 2, 2)?;
            let from = string_arg(method, &args[0])?;
            let to = string_arg(method, &args[1])?;
            Ok(Value::String(s.replace(from, to)))
        }
        (Value::String(s), "startswith") => {
            expect_args(method, args, 1, 1)?;
            Ok(Value::Boolean(s.starts_with(string_arg(method, &args[0])?)))
        }
        (Value::String(s), "endswith") => {
            expect_args(method, args, 1, 1)?;
            Ok(Value::Boolean(s.ends_with(string_arg(method, &args[0])?)))
        }
        (Value::String(s), "matches") => {
            expect_args(method, args, 1, 1)?;
            let pattern = string_arg(method, &args[0])?;
            let re = regex::Regex::new(pattern)
                .map_err(|e| EvalError::InvalidRegex(e.to_string()))?;
            Ok(Value::Boolean(re.is_match(s)))
        }
        (Value::String(separator), "join") => {
            expect_args(method, args, 1, 1)?;
            method_join(separator, &args[0])
        }

        // Mapping methods
        (Value::View(_) | Value::Object(_), "keys") => {
            expect_args(method, args, 0, 0)?;
            Ok(Value::Array(mapping_entries(receiver).into_iter().map(|(k, _)| k).collect()))
        }
        (Value::View(_) | Value::Object(_), "values") => {
            expect_args(method, args, 0, 0)?;
            Ok(Value::Array(mapping_entries(receiver).into_iter().map(|(_, v)| v).collect()))
        }
        (Value::View(_) | Value::Object(_), "get") => {
            expect_args(method, args, 1, 2)?;
            let wanted = to_key(&args[0])?;
            let found = mapping_entries(receiver).into_iter().find(|(k, _)| {
                k.to_key().is_some_and(|key| key.same_slot(&wanted))
            });
            Ok(match found {
                Some((_, value)) => value,
                None => args.get(1).cloned().unwrap_or(Value::Null),
            })
        }

        // Array methods
        (Value::Array(arr), "index") => {
            expect_args(method, args, 1, 1)?;
            arr.iter()
                .position(|v| values_equal(v, &args[0]))
                .map(|i| Value::Integer(i as i64))
                .ok_or_else(|| EvalError::AccessError("value is not in array".to_string()))
        }
        (Value::Array(arr), "count") => {
            expect_args(method, args, 1, 1)?;
            let count = arr.iter().filter(|v| values_equal(v, &args[0])).count();
            Ok(Value::Integer(count as i64))
        }

        (other, _) => Err(EvalError::UnknownMethod {
            method: method.to_string(),
            receiver: other.type_name(),
        }),
    }
}

fn string_arg<'a>(method: &str, value: &'a Value) -> Result<&'a str, EvalError> {
    match value {
        Value::String(s) => Ok(s),
        other => Err(EvalError::TypeError(format!(
            ".{}() argument must be string, got {}",
            method,
            other.type_name()
        ))),
    }
}

/// .split(separator?) - splits on whitespace when no separator is given
fn method_split(s: &str, args: &[Value]) -> Result<Value, EvalError> {
    expect_args("split", args, 0, 1)?;
    let parts: Vec<Value> = match args.first() {
        None | Some(Value::Null) => s
            .split_whitespace()
            .map(|p| Value::String(p.to_string()))
            .collect(),
        Some(separator) => {
            let separator = string_arg("split", separator)?;
            if separator.is_empty() {
                return Err(EvalError::TypeError("empty separator".to_string()));
            }
            s.split(separator)
                .map(|p| Value::String(p.to_string()))
                .collect()
        }
    };
    Ok(Value::Array(parts))
}

/// separator.join(items) - items may be an array or a list-shaped view
fn method_join(separator: &str, items: &Value) -> Result<Value, EvalError> {
    let items = match items {
        Value::View(view) => Value::from_json(view.to_plain()?),
        other => other.clone(),
    };
    let Value::Array(items) = items else {
        return Err(EvalError::TypeError(format!(
            ".join() requires an array, got {}",
            items.type_name()
        )));
    };
    let parts = items
        .iter()
        .map(|item| match item {
            Value::String(s) => Ok(s.as_str()),
            other => Err(EvalError::TypeError(format!(
                ".join() items must be strings, got {}",
                other.type_name()
            ))),
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Value::String(parts.join(separator)))
}

/// Key/value pairs of a view or object, values as stored (unwrapped).
fn mapping_entries(value: &Value) -> Vec<(Value, Value)> {
    match value {
        Value::View(view) => view
            .iter()
            .map(|(key, slot)| {
                let stored = match slot {
                    Slot::Raw(raw) => Value::from_json(raw.clone()),
                    Slot::View(view) => Value::View(view.clone()),
                };
                (key_to_value(key), stored)
            })
            .collect(),
        Value::Object(fields) => fields
            .iter()
            .map(|(k, v)| (Value::String(k.clone()), v.clone()))
            .collect(),
        _ => Vec::new(),
    }
}

fn key_to_value(key: &Key) -> Value {
    match key {
        Key::Str(s) => Value::String(s.clone()),
        Key::Int(n) => Value::Integer(*n),
        Key::Bool(b) => Value::Boolean(*b),
        Key::Float(f) => Value::Float(*f),
    }
}
