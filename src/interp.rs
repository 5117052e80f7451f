//! Tagged runtime values and the interpreter.
//!
//! Execution assumes a validated module: the interpreter indexes
//! registers and globals without rechecking, and any value-shape
//! mismatch that validation rules out panics with an internal-error
//! message instead of being handled.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::hlb::{validate, FunDecl, Module, Opcode};
use crate::types::Ty;

pub type NativeFn = Rc<dyn Fn(&[Value]) -> Value>;

/// A runtime value. `Any` keeps the static type the value was boxed
/// from; `Fun` and `NativeFun` compare by identity.
#[derive(Clone)]
pub enum Value {
    Null,
    Int(i32),
    Float(f64),
    Bool(bool),
    Fun(Rc<FunDecl>),
    Any(Box<Value>, Ty),
    NativeFun(NativeFn),
}

impl PartialEq for Value {
    fn eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Fun(a), Value::Fun(b)) => Rc::ptr_eq(a, b),
            (Value::NativeFun(a), Value::NativeFun(b)) => Rc::ptr_eq(a, b),
            (Value::Any(a, ta), Value::Any(b, tb)) => ta == tb && a == b,
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Fun(d) => write!(f, "fun@{}", d.findex.0),
            Value::Any(v, t) => write!(f, "any({v:?} : {t})"),
            Value::NativeFun(_) => f.write_str("native"),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Any(v, _) => write!(f, "{v}"),
            other => write!(f, "{other:?}"),
        }
    }
}

/// The value a register or global of type `t` starts out with.
pub fn default_value(t: &Ty) -> Value {
    match t {
        Ty::Void | Ty::Any | Ty::Fun { .. } => Value::Null,
        Ty::UI8 | Ty::I32 => Value::Int(0),
        Ty::F32 | Ty::F64 => Value::Float(0.0),
        Ty::Bool => Value::Bool(false),
    }
}

/// Resolves host natives by name at module load.
pub trait NativeLoader {
    fn resolve(&self, name: &str) -> Option<NativeFn>;
}

/// Name-keyed handler registry, the plain loader for hosts that
/// register their natives up front.
#[derive(Clone, Default)]
pub struct Natives {
    funcs: BTreeMap<String, NativeFn>,
}

impl Natives {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: &str, f: impl Fn(&[Value]) -> Value + 'static) {
        self.funcs.insert(name.to_string(), Rc::new(f));
    }
}

impl NativeLoader for Natives {
    fn resolve(&self, name: &str) -> Option<NativeFn> {
        self.funcs.get(name).cloned()
    }
}

/// Validate a module, bind its globals and natives, then call the
/// entrypoint with no arguments and return its result.
pub fn interp(m: &Module, loader: &dyn NativeLoader) -> Result<Value> {
    validate::validate_module(m)?;
    match m.global(m.entrypoint) {
        Some(Ty::Fun { args, .. }) if args.is_empty() => {}
        _ => {
            return Err(Error::Internal(format!(
                "entrypoint @{} is not a zero-argument function",
                m.entrypoint.0
            )))
        }
    }
    let mut it = Interp::new(m, loader)?;
    it.run()
}

/// One interpreter instance owns the module's global array.
pub struct Interp {
    globals: Vec<Value>,
    floats: Vec<f64>,
    entrypoint: usize,
}

impl Interp {
    pub fn new(m: &Module, loader: &dyn NativeLoader) -> Result<Self> {
        let mut globals: Vec<Value> = m.globals.iter().map(default_value).collect();
        for f in &m.functions {
            globals[f.findex.0 as usize] = Value::Fun(Rc::new(f.clone()));
        }
        for (name, g) in &m.natives {
            let h = loader
                .resolve(name)
                .ok_or_else(|| Error::UnresolvedNative(name.clone()))?;
            debug!("bound native {name} to @{}", g.0);
            globals[g.0 as usize] = Value::NativeFun(h);
        }
        Ok(Self {
            globals,
            floats: m.floats.clone(),
            entrypoint: m.entrypoint.0 as usize,
        })
    }

    pub fn run(&mut self) -> Result<Value> {
        match self.globals[self.entrypoint].clone() {
            Value::Fun(f) => Ok(self.call(f, Vec::new())),
            other => Err(Error::Internal(format!(
                "entrypoint @{} is not a compiled function: {other:?}",
                self.entrypoint
            ))),
        }
    }

    fn invoke(&mut self, callee: Value, args: Vec<Value>) -> Value {
        match callee {
            Value::Fun(f) => self.call(f, args),
            Value::NativeFun(h) => h(&args),
            other => panic!("internal error: call of non-function value {other:?}"),
        }
    }

    fn call(&mut self, f: Rc<FunDecl>, args: Vec<Value>) -> Value {
        trace!("entering fun@{} with {} args", f.findex.0, args.len());
        let mut regs: Vec<Value> = f.regs.iter().map(default_value).collect();
        regs[..args.len()].clone_from_slice(&args);

        let mut pc = 0usize;
        loop {
            let Some(op) = f.code.get(pc) else {
                panic!("internal error: fun@{} ran past the end of code", f.findex.0)
            };
            pc += 1;
            match op {
                Opcode::Mov { dst, src } => regs[dst.0 as usize] = regs[src.0 as usize].clone(),
                Opcode::Int { dst, value } => regs[dst.0 as usize] = Value::Int(*value),
                Opcode::Float { dst, idx } => {
                    regs[dst.0 as usize] = Value::Float(self.floats[*idx as usize])
                }
                Opcode::Bool { dst, value } => regs[dst.0 as usize] = Value::Bool(*value),
                Opcode::Add { dst, a, b } => {
                    regs[dst.0 as usize] = arith(
                        &f.regs[dst.0 as usize],
                        &regs[a.0 as usize],
                        &regs[b.0 as usize],
                        i32::wrapping_add,
                        |x, y| x + y,
                    )
                }
                Opcode::Sub { dst, a, b } => {
                    regs[dst.0 as usize] = arith(
                        &f.regs[dst.0 as usize],
                        &regs[a.0 as usize],
                        &regs[b.0 as usize],
                        i32::wrapping_sub,
                        |x, y| x - y,
                    )
                }
                Opcode::Incr { dst } => {
                    regs[dst.0 as usize] = step(&f.regs[dst.0 as usize], &regs[dst.0 as usize], 1)
                }
                Opcode::Decr { dst } => {
                    regs[dst.0 as usize] = step(&f.regs[dst.0 as usize], &regs[dst.0 as usize], -1)
                }
                Opcode::Call0 { dst, fun } => {
                    let callee = self.globals[fun.0 as usize].clone();
                    regs[dst.0 as usize] = self.invoke(callee, Vec::new());
                }
                Opcode::Call1 { dst, fun, arg0 } => {
                    let callee = self.globals[fun.0 as usize].clone();
                    let args = vec![regs[arg0.0 as usize].clone()];
                    regs[dst.0 as usize] = self.invoke(callee, args);
                }
                Opcode::Call2 { dst, fun, arg0, arg1 } => {
                    let callee = self.globals[fun.0 as usize].clone();
                    let args = vec![regs[arg0.0 as usize].clone(), regs[arg1.0 as usize].clone()];
                    regs[dst.0 as usize] = self.invoke(callee, args);
                }
                Opcode::Call3 { dst, fun, arg0, arg1, arg2 } => {
                    let callee = self.globals[fun.0 as usize].clone();
                    let args = vec![
                        regs[arg0.0 as usize].clone(),
                        regs[arg1.0 as usize].clone(),
                        regs[arg2.0 as usize].clone(),
                    ];
                    regs[dst.0 as usize] = self.invoke(callee, args);
                }
                Opcode::CallN { dst, fun, args } => {
                    let callee = regs[fun.0 as usize].clone();
                    let args: Vec<Value> = args.iter().map(|a| regs[a.0 as usize].clone()).collect();
                    regs[dst.0 as usize] = self.invoke(callee, args);
                }
                Opcode::GetGlobal { dst, global } => {
                    regs[dst.0 as usize] = self.globals[global.0 as usize].clone()
                }
                Opcode::SetGlobal { global, src } => {
                    self.globals[global.0 as usize] = regs[src.0 as usize].clone()
                }
                Opcode::Eq { dst, a, b } => {
                    regs[dst.0 as usize] =
                        Value::Bool(regs[a.0 as usize] == regs[b.0 as usize])
                }
                Opcode::NotEq { dst, a, b } => {
                    regs[dst.0 as usize] =
                        Value::Bool(regs[a.0 as usize] != regs[b.0 as usize])
                }
                Opcode::Lt { dst, a, b } => {
                    regs[dst.0 as usize] =
                        compare(&regs[a.0 as usize], &regs[b.0 as usize], |o| {
                            matches!(o, Some(Ordering::Less))
                        })
                }
                Opcode::Gte { dst, a, b } => {
                    regs[dst.0 as usize] =
                        compare(&regs[a.0 as usize], &regs[b.0 as usize], |o| {
                            matches!(o, Some(Ordering::Greater | Ordering::Equal))
                        })
                }
                Opcode::Ret { reg } => return regs[reg.0 as usize].clone(),
                Opcode::JTrue { cond, delta } => {
                    if matches!(regs[cond.0 as usize], Value::Bool(true)) {
                        pc = offset(pc, *delta);
                    }
                }
                Opcode::JFalse { cond, delta } => {
                    if matches!(regs[cond.0 as usize], Value::Bool(false)) {
                        pc = offset(pc, *delta);
                    }
                }
                Opcode::JNull { reg, delta } => {
                    if matches!(regs[reg.0 as usize], Value::Null) {
                        pc = offset(pc, *delta);
                    }
                }
                Opcode::JNotNull { reg, delta } => {
                    if !matches!(regs[reg.0 as usize], Value::Null) {
                        pc = offset(pc, *delta);
                    }
                }
                Opcode::JAlways { delta } => pc = offset(pc, *delta),
                Opcode::ToAny { dst, src } => {
                    let v = regs[src.0 as usize].clone();
                    regs[dst.0 as usize] =
                        Value::Any(Box::new(v), f.regs[src.0 as usize].clone());
                }
            }
        }
    }
}

/// Deltas are relative to the already-incremented pc.
fn offset(pc: usize, delta: i32) -> usize {
    (pc as i64 + delta as i64) as usize
}

/// Integer arithmetic wraps; a ui8 destination masks to one byte.
/// Float arithmetic is plain IEEE-754 double.
fn arith(
    t: &Ty,
    a: &Value,
    b: &Value,
    int_op: fn(i32, i32) -> i32,
    float_op: fn(f64, f64) -> f64,
) -> Value {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => {
            let v = int_op(*x, *y);
            Value::Int(if *t == Ty::UI8 { v & 0xFF } else { v })
        }
        (Value::Float(x), Value::Float(y)) => Value::Float(float_op(*x, *y)),
        _ => panic!("internal error: arithmetic on {a:?} and {b:?}"),
    }
}

fn step(t: &Ty, v: &Value, by: i32) -> Value {
    match v {
        Value::Int(x) => {
            let v = x.wrapping_add(by);
            Value::Int(if *t == Ty::UI8 { v & 0xFF } else { v })
        }
        _ => panic!("internal error: incr/decr on {v:?}"),
    }
}

// NaN compares as unordered, so both `lt` and `gte` come out false.
fn compare(a: &Value, b: &Value, pick: fn(Option<Ordering>) -> bool) -> Value {
    let ord = match (a, b) {
        (Value::Int(x), Value::Int(y)) => Some(x.cmp(y)),
        (Value::Float(x), Value::Float(y)) => x.partial_cmp(y),
        _ => panic!("internal error: ordered comparison of {a:?} and {b:?}"),
    };
    Value::Bool(pick(ord))
}
