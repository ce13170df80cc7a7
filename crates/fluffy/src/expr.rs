//! Expressions evaluated in a step's environment.
//!
//! Arithmetic on `Int` is checked: overflow and division by zero are errors rather than
//! wrapping or panicking. `Int` and `Float` mix by promoting the `Int`; `Int / Int` truncates.

use std::ops;

use crate::error::EvalError;
use crate::eval::Env;
use crate::progression::Progression;
use crate::value::{Fallible, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }
}

#[derive(Debug, Clone)]
pub enum Expr {
    Lit(Value),
    Var(String),
    Tuple(Vec<Expr>),
    Unary {
        op: UnaryOp,
        expr: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    If {
        cond: Box<Expr>,
        then_branch: Box<Expr>,
        else_branch: Box<Expr>,
    },
    /// Calls a callable, or runs a reader with its single argument.
    Call {
        func: Box<Expr>,
        args: Vec<Expr>,
    },
    Identity(Box<Expr>),
    Just(Box<Expr>),
    Nothing,
    Success(Box<Expr>),
    /// `Error(message)`; the message must evaluate to `Text`.
    Failure(Box<Expr>),
    List(Vec<Expr>),
    Range {
        start: Box<Expr>,
        second: Option<Box<Expr>>,
        end: Box<Expr>,
    },
    /// The reader that returns its environment.
    Ask,
    /// The reader that applies a callable to its environment.
    Asks(Box<Expr>),
}

impl Expr {
    pub fn lit(value: impl Into<Value>) -> Expr {
        Expr::Lit(value.into())
    }

    pub fn var(name: impl Into<String>) -> Expr {
        Expr::Var(name.into())
    }

    pub fn tuple(items: impl IntoIterator<Item = Expr>) -> Expr {
        Expr::Tuple(items.into_iter().collect())
    }

    pub fn call(func: Expr, args: impl IntoIterator<Item = Expr>) -> Expr {
        Expr::Call {
            func: Box::new(func),
            args: args.into_iter().collect(),
        }
    }

    pub fn identity(expr: Expr) -> Expr {
        Expr::Identity(Box::new(expr))
    }

    pub fn just(expr: Expr) -> Expr {
        Expr::Just(Box::new(expr))
    }

    pub fn success(expr: Expr) -> Expr {
        Expr::Success(Box::new(expr))
    }

    pub fn failure(message: Expr) -> Expr {
        Expr::Failure(Box::new(message))
    }

    pub fn list(items: impl IntoIterator<Item = Expr>) -> Expr {
        Expr::List(items.into_iter().collect())
    }

    pub fn range(start: Expr, end: Expr) -> Expr {
        Expr::Range {
            start: Box::new(start),
            second: None,
            end: Box::new(end),
        }
    }

    pub fn progression(start: Expr, second: Expr, end: Expr) -> Expr {
        Expr::Range {
            start: Box::new(start),
            second: Some(Box::new(second)),
            end: Box::new(end),
        }
    }

    pub fn asks(func: Expr) -> Expr {
        Expr::Asks(Box::new(func))
    }

    pub fn if_(cond: Expr, then_branch: Expr, else_branch: Expr) -> Expr {
        Expr::If {
            cond: Box::new(cond),
            then_branch: Box::new(then_branch),
            else_branch: Box::new(else_branch),
        }
    }

    pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Expr {
        Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn equals(self, other: Expr) -> Expr {
        Expr::binary(BinaryOp::Eq, self, other)
    }

    pub fn not_equals(self, other: Expr) -> Expr {
        Expr::binary(BinaryOp::Ne, self, other)
    }

    pub fn lt(self, other: Expr) -> Expr {
        Expr::binary(BinaryOp::Lt, self, other)
    }

    pub fn le(self, other: Expr) -> Expr {
        Expr::binary(BinaryOp::Le, self, other)
    }

    pub fn gt(self, other: Expr) -> Expr {
        Expr::binary(BinaryOp::Gt, self, other)
    }

    pub fn ge(self, other: Expr) -> Expr {
        Expr::binary(BinaryOp::Ge, self, other)
    }

    pub fn and(self, other: Expr) -> Expr {
        Expr::binary(BinaryOp::And, self, other)
    }

    pub fn or(self, other: Expr) -> Expr {
        Expr::binary(BinaryOp::Or, self, other)
    }

    pub fn eval(&self, env: &Env) -> Fallible {
        match self {
            Expr::Lit(value) => Ok(value.clone()),
            Expr::Var(name) => env.lookup(name),
            Expr::Tuple(items) => Ok(Value::Tuple(eval_all(items, env)?)),
            Expr::Unary { op, expr } => eval_unary(*op, expr.eval(env)?),
            Expr::Binary {
                op: BinaryOp::And,
                left,
                right,
            } => {
                if !left.eval(env)?.expect_bool()? {
                    return Ok(Value::Bool(false));
                }
                Ok(Value::Bool(right.eval(env)?.expect_bool()?))
            }
            Expr::Binary {
                op: BinaryOp::Or,
                left,
                right,
            } => {
                if left.eval(env)?.expect_bool()? {
                    return Ok(Value::Bool(true));
                }
                Ok(Value::Bool(right.eval(env)?.expect_bool()?))
            }
            Expr::Binary { op, left, right } => {
                let left = left.eval(env)?;
                let right = right.eval(env)?;
                eval_binary(*op, &left, &right)
            }
            Expr::If {
                cond,
                then_branch,
                else_branch,
            } => {
                if cond.eval(env)?.expect_bool()? {
                    then_branch.eval(env)
                } else {
                    else_branch.eval(env)
                }
            }
            Expr::Call { func, args } => {
                let func = func.eval(env)?;
                let args = eval_all(args, env)?;
                apply(&func, args)
            }
            Expr::Identity(expr) => Ok(Value::identity(expr.eval(env)?)),
            Expr::Just(expr) => Ok(Value::just(expr.eval(env)?)),
            Expr::Nothing => Ok(Value::nothing()),
            Expr::Success(expr) => Ok(Value::success(expr.eval(env)?)),
            Expr::Failure(message) => match message.eval(env)? {
                Value::Text(message) => Ok(Value::error(message)),
                other => Err(EvalError::type_mismatch("Text", other.type_name())),
            },
            Expr::List(items) => Ok(Value::list(eval_all(items, env)?)),
            Expr::Range { start, second, end } => {
                let start = start.eval(env)?.expect_int()?;
                let second = match second {
                    Some(second) => Some(second.eval(env)?.expect_int()?),
                    None => None,
                };
                let end = end.eval(env)?.expect_int()?;
                let progression = Progression::new(start, second, end)?;
                Ok(Value::list(progression.map(Value::Int)))
            }
            Expr::Ask => Ok(Value::reader(Ok)),
            Expr::Asks(func) => match func.eval(env)? {
                Value::Callable(callable) => {
                    Ok(Value::reader(move |env| callable.call(vec![env])))
                }
                other => Err(EvalError::type_mismatch("Callable", other.type_name())),
            },
        }
    }
}

fn eval_all(exprs: &[Expr], env: &Env) -> Result<Vec<Value>, EvalError> {
    exprs.iter().map(|expr| expr.eval(env)).collect()
}

/// Applies a callable value, or runs a reader against its single argument.
pub(crate) fn apply(func: &Value, mut args: Vec<Value>) -> Fallible {
    match func {
        Value::Callable(callable) => callable.call(args),
        Value::Function(reader) => {
            if args.len() != 1 {
                return Err(EvalError::ArityMismatch {
                    name: "<function>".to_string(),
                    expected: 1,
                    found: args.len(),
                });
            }
            let env = args.remove(0);
            reader.run(env)
        }
        other => Err(EvalError::type_mismatch("Callable", other.type_name())),
    }
}

fn eval_unary(op: UnaryOp, value: Value) -> Fallible {
    match (op, value) {
        (UnaryOp::Neg, Value::Int(value)) => value
            .checked_neg()
            .map(Value::Int)
            .ok_or(EvalError::Overflow { op: "-" }),
        (UnaryOp::Neg, Value::Float(value)) => Ok(Value::Float(-value)),
        (UnaryOp::Neg, other) => Err(EvalError::type_mismatch("Int or Float", other.type_name())),
        (UnaryOp::Not, value) => Ok(Value::Bool(!value.expect_bool()?)),
    }
}

fn eval_binary(op: BinaryOp, left: &Value, right: &Value) -> Fallible {
    let invalid = || EvalError::InvalidOperands {
        op: op.symbol(),
        left: left.type_name().to_string(),
        right: right.type_name().to_string(),
    };
    let overflow = || EvalError::Overflow { op: op.symbol() };
    match (op, left, right) {
        (BinaryOp::Eq, a, b) => Ok(Value::Bool(numeric_equal(a, b))),
        (BinaryOp::Ne, a, b) => Ok(Value::Bool(!numeric_equal(a, b))),
        (BinaryOp::Add, Value::Int(a), Value::Int(b)) => {
            a.checked_add(*b).map(Value::Int).ok_or_else(overflow)
        }
        (BinaryOp::Sub, Value::Int(a), Value::Int(b)) => {
            a.checked_sub(*b).map(Value::Int).ok_or_else(overflow)
        }
        (BinaryOp::Mul, Value::Int(a), Value::Int(b)) => {
            a.checked_mul(*b).map(Value::Int).ok_or_else(overflow)
        }
        (BinaryOp::Div | BinaryOp::Rem, Value::Int(_), Value::Int(0)) => {
            Err(EvalError::DivisionByZero)
        }
        (BinaryOp::Div, Value::Int(a), Value::Int(b)) => {
            a.checked_div(*b).map(Value::Int).ok_or_else(overflow)
        }
        (BinaryOp::Rem, Value::Int(a), Value::Int(b)) => {
            a.checked_rem(*b).map(Value::Int).ok_or_else(overflow)
        }
        (BinaryOp::Add, Value::Text(a), Value::Text(b)) => Ok(Value::Text(format!("{a}{b}"))),
        (BinaryOp::Lt, Value::Text(a), Value::Text(b)) => Ok(Value::Bool(a < b)),
        (BinaryOp::Le, Value::Text(a), Value::Text(b)) => Ok(Value::Bool(a <= b)),
        (BinaryOp::Gt, Value::Text(a), Value::Text(b)) => Ok(Value::Bool(a > b)),
        (BinaryOp::Ge, Value::Text(a), Value::Text(b)) => Ok(Value::Bool(a >= b)),
        (BinaryOp::Lt, Value::Int(a), Value::Int(b)) => Ok(Value::Bool(a < b)),
        (BinaryOp::Le, Value::Int(a), Value::Int(b)) => Ok(Value::Bool(a <= b)),
        (BinaryOp::Gt, Value::Int(a), Value::Int(b)) => Ok(Value::Bool(a > b)),
        (BinaryOp::Ge, Value::Int(a), Value::Int(b)) => Ok(Value::Bool(a >= b)),
        _ => {
            let (Some(a), Some(b)) = (float_operand(left), float_operand(right)) else {
                return Err(invalid());
            };
            eval_float(op, a, b).ok_or_else(invalid)?
        }
    }
}

fn float_operand(value: &Value) -> Option<f64> {
    match value {
        Value::Int(_) | Value::Float(_) => value.as_float(),
        _ => None,
    }
}

fn eval_float(op: BinaryOp, a: f64, b: f64) -> Option<Fallible> {
    let value = match op {
        BinaryOp::Add => Value::Float(a + b),
        BinaryOp::Sub => Value::Float(a - b),
        BinaryOp::Mul => Value::Float(a * b),
        BinaryOp::Div | BinaryOp::Rem if b == 0.0 => return Some(Err(EvalError::DivisionByZero)),
        BinaryOp::Div => Value::Float(a / b),
        BinaryOp::Rem => Value::Float(a % b),
        BinaryOp::Lt => Value::Bool(a < b),
        BinaryOp::Le => Value::Bool(a <= b),
        BinaryOp::Gt => Value::Bool(a > b),
        BinaryOp::Ge => Value::Bool(a >= b),
        BinaryOp::Eq | BinaryOp::Ne | BinaryOp::And | BinaryOp::Or => return None,
    };
    Some(Ok(value))
}

/// Structural equality, except that `Int` and `Float` compare by numeric value.
fn numeric_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => (*a as f64) == *b,
        _ => left == right,
    }
}

impl ops::Add for Expr {
    type Output = Expr;

    fn add(self, rhs: Expr) -> Expr {
        Expr::binary(BinaryOp::Add, self, rhs)
    }
}

impl ops::Sub for Expr {
    type Output = Expr;

    fn sub(self, rhs: Expr) -> Expr {
        Expr::binary(BinaryOp::Sub, self, rhs)
    }
}

impl ops::Mul for Expr {
    type Output = Expr;

    fn mul(self, rhs: Expr) -> Expr {
        Expr::binary(BinaryOp::Mul, self, rhs)
    }
}

impl ops::Div for Expr {
    type Output = Expr;

    fn div(self, rhs: Expr) -> Expr {
        Expr::binary(BinaryOp::Div, self, rhs)
    }
}

impl ops::Rem for Expr {
    type Output = Expr;

    fn rem(self, rhs: Expr) -> Expr {
        Expr::binary(BinaryOp::Rem, self, rhs)
    }
}

impl ops::Neg for Expr {
    type Output = Expr;

    fn neg(self) -> Expr {
        Expr::Unary {
            op: UnaryOp::Neg,
            expr: Box::new(self),
        }
    }
}

impl ops::Not for Expr {
    type Output = Expr;

    fn not(self) -> Expr {
        Expr::Unary {
            op: UnaryOp::Not,
            expr: Box::new(self),
        }
    }
}
