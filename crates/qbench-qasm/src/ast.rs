//! Abstract syntax tree for `OpenQASM` 2.0.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{ParseError, ParseResult};

/// A complete QASM 2.0 program.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Program {
    /// QASM version (e.g., "2.0").
    pub version: String,
    /// Statements in the program.
    pub statements: Vec<Statement>,
}

/// A statement in a QASM 2.0 program.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Statement {
    /// `include "file";`
    Include(String),

    /// `qreg name[size];`
    QReg { name: String, size: u32 },

    /// `creg name[size];`
    CReg { name: String, size: u32 },

    /// `gate name(params) qubits { body }`
    GateDef(GateDef),

    /// `opaque name(params) qubits;`
    Opaque { name: String },

    /// Gate application.
    Gate(GateCall),

    /// `measure q -> c;`
    Measure { qubit: Argument, bit: Argument },

    /// `reset q;`
    Reset(Argument),

    /// `barrier q, r;`
    Barrier(Vec<Argument>),

    /// `if (creg == value) op;`
    If {
        register: String,
        value: u64,
        body: Box<Statement>,
    },
}

/// A user gate definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateDef {
    pub name: String,
    pub params: Vec<String>,
    pub qubits: Vec<String>,
    pub body: Vec<GateCall>,
}

/// A gate call.
///
/// Inside a gate body, arguments are formal qubit names without an index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateCall {
    /// Gate name.
    pub name: String,
    /// Parameter expressions.
    pub params: Vec<Expression>,
    /// Qubit arguments.
    pub args: Vec<Argument>,
}

/// A register reference: `q` (whole register) or `q[i]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Argument {
    pub register: String,
    pub index: Option<u32>,
}

impl Argument {
    /// Reference a single register element.
    pub fn indexed(register: impl Into<String>, index: u32) -> Self {
        Self {
            register: register.into(),
            index: Some(index),
        }
    }

    /// Reference a whole register.
    pub fn register(register: impl Into<String>) -> Self {
        Self {
            register: register.into(),
            index: None,
        }
    }
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

/// Parameter expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expression {
    Int(u64),
    Float(f64),
    Pi,
    Identifier(String),
    Neg(Box<Expression>),
    BinOp {
        left: Box<Expression>,
        op: BinOp,
        right: Box<Expression>,
    },
    /// Unary function call: `sin`, `cos`, `tan`, `exp`, `ln`, `sqrt`.
    FnCall {
        name: String,
        arg: Box<Expression>,
    },
}

impl Expression {
    /// Evaluate to radians with gate parameters bound in `env`.
    pub fn evaluate(&self, env: &FxHashMap<String, f64>) -> ParseResult<f64> {
        let value = match self {
            #[allow(clippy::cast_precision_loss)]
            Expression::Int(v) => *v as f64,
            Expression::Float(v) => *v,
            Expression::Pi => std::f64::consts::PI,
            Expression::Identifier(name) => *env
                .get(name)
                .ok_or_else(|| ParseError::UndefinedIdentifier(name.clone()))?,
            Expression::Neg(inner) => -inner.evaluate(env)?,
            Expression::BinOp { left, op, right } => {
                let l = left.evaluate(env)?;
                let r = right.evaluate(env)?;
                match op {
                    BinOp::Add => l + r,
                    BinOp::Sub => l - r,
                    BinOp::Mul => l * r,
                    BinOp::Div => l / r,
                    BinOp::Pow => l.powf(r),
                }
            }
            Expression::FnCall { name, arg } => {
                let x = arg.evaluate(env)?;
                match name.as_str() {
                    "sin" => x.sin(),
                    "cos" => x.cos(),
                    "tan" => x.tan(),
                    "exp" => x.exp(),
                    "ln" => x.ln(),
                    "sqrt" => x.sqrt(),
                    other => return Err(ParseError::UndefinedIdentifier(format!("{other}()"))),
                }
            }
        };
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_evaluate_arithmetic() {
        let expr = Expression::BinOp {
            left: Box::new(Expression::Pi),
            op: BinOp::Div,
            right: Box::new(Expression::Int(4)),
        };
        let v = expr.evaluate(&FxHashMap::default()).unwrap();
        assert!((v - PI / 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_evaluate_bound_identifier() {
        let mut env = FxHashMap::default();
        env.insert("theta".to_string(), 0.25);
        let expr = Expression::Neg(Box::new(Expression::Identifier("theta".into())));
        assert_eq!(expr.evaluate(&env).unwrap(), -0.25);

        let unbound = Expression::Identifier("phi".into());
        assert!(matches!(
            unbound.evaluate(&env),
            Err(ParseError::UndefinedIdentifier(_))
        ));
    }

    #[test]
    fn test_evaluate_function() {
        let expr = Expression::FnCall {
            name: "cos".into(),
            arg: Box::new(Expression::Int(0)),
        };
        assert_eq!(expr.evaluate(&FxHashMap::default()).unwrap(), 1.0);
    }
}
