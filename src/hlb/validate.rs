//! Per-function static validation.
//!
//! Runs once per function before execution or serialization and
//! reports the first violation with function index, instruction offset
//! and the failing rule. After validation the interpreter is entitled
//! to treat any remaining shape mismatch as an internal error.

use crate::error::{Error, Result};
use crate::hlb::{FunDecl, GlobalId, Module, Opcode, RegId};
use crate::types::Ty;

fn err(findex: usize, pc: usize, msg: impl Into<String>) -> Error {
    Error::Validate {
        findex,
        pc,
        msg: msg.into(),
    }
}

fn rt(f: &FunDecl, fi: usize, pc: usize, r: RegId) -> Result<&Ty> {
    f.regs
        .get(r.0 as usize)
        .ok_or_else(|| err(fi, pc, format!("reg {} out of range", r.0)))
}

fn gt(m: &Module, fi: usize, pc: usize, g: GlobalId) -> Result<&Ty> {
    m.global(g)
        .ok_or_else(|| err(fi, pc, format!("global @{} out of range", g.0)))
}

// Deltas land on the instruction after the jump; the position one past
// the last instruction is a legal (if pointless) target.
fn target(f: &FunDecl, fi: usize, pc: usize, d: i32) -> Result<()> {
    let tgt = pc as i64 + 1 + d as i64;
    if tgt < 0 || tgt > f.code.len() as i64 {
        return Err(err(fi, pc, format!("jump target {tgt} out of range")));
    }
    Ok(())
}

fn call_sig<'m>(t: &'m Ty, fi: usize, pc: usize) -> Result<(&'m [Ty], &'m Ty)> {
    t.as_fun()
        .ok_or_else(|| err(fi, pc, format!("callee is {t}, not a function")))
}

pub fn validate_module(m: &Module) -> Result<()> {
    for (fi, f) in m.functions.iter().enumerate() {
        validate_function(m, fi, f)?;
    }
    Ok(())
}

pub fn validate_function(m: &Module, fi: usize, f: &FunDecl) -> Result<()> {
    let sig = m
        .global(f.findex)
        .ok_or_else(|| err(fi, 0, format!("function global @{} out of range", f.findex.0)))?;
    let Some((args, fun_ret)) = sig.as_fun() else {
        return Err(err(
            fi,
            0,
            format!("function global @{} is not a function type", f.findex.0),
        ));
    };
    if f.regs.len() < args.len() {
        return Err(err(
            fi,
            0,
            format!("{} regs for {} arguments", f.regs.len(), args.len()),
        ));
    }
    for (i, a) in args.iter().enumerate() {
        if f.regs[i] != *a {
            return Err(err(
                fi,
                0,
                format!("arg reg {i} is {} but the signature says {a}", f.regs[i]),
            ));
        }
    }

    for (pc, op) in f.code.iter().enumerate() {
        match op {
            Opcode::Mov { dst, src } => {
                if rt(f, fi, pc, *dst)? != rt(f, fi, pc, *src)? {
                    return Err(err(fi, pc, "mov type mismatch"));
                }
            }
            Opcode::Int { dst, value } => match rt(f, fi, pc, *dst)? {
                Ty::UI8 => {
                    if !(0..=0xFF).contains(value) {
                        return Err(err(fi, pc, format!("int {value} out of range for ui8")));
                    }
                }
                Ty::I32 => {}
                t => return Err(err(fi, pc, format!("int dst must be ui8 or i32, got {t}"))),
            },
            Opcode::Float { dst, idx } => {
                if !matches!(rt(f, fi, pc, *dst)?, Ty::F32 | Ty::F64) {
                    return Err(err(fi, pc, "float dst must be f32 or f64"));
                }
                if *idx as usize >= m.floats.len() {
                    return Err(err(fi, pc, format!("float index {idx} out of range")));
                }
            }
            Opcode::Bool { dst, .. } => {
                if *rt(f, fi, pc, *dst)? != Ty::Bool {
                    return Err(err(fi, pc, "bool dst must be bool"));
                }
            }
            Opcode::Add { dst, a, b } | Opcode::Sub { dst, a, b } => {
                let t = rt(f, fi, pc, *dst)?;
                if !t.is_numeric() {
                    return Err(err(fi, pc, format!("arithmetic on non-numeric {t}")));
                }
                if rt(f, fi, pc, *a)? != t || rt(f, fi, pc, *b)? != t {
                    return Err(err(fi, pc, "arithmetic operand type mismatch"));
                }
            }
            Opcode::Incr { dst } | Opcode::Decr { dst } => {
                if !matches!(rt(f, fi, pc, *dst)?, Ty::UI8 | Ty::I32) {
                    return Err(err(fi, pc, "incr/decr reg must be ui8 or i32"));
                }
            }
            Opcode::Call0 { dst, fun } => {
                let (sa, ret) = call_sig(gt(m, fi, pc, *fun)?, fi, pc)?;
                check_call(f, fi, pc, sa, ret, *dst, &[])?;
            }
            Opcode::Call1 { dst, fun, arg0 } => {
                let (sa, ret) = call_sig(gt(m, fi, pc, *fun)?, fi, pc)?;
                check_call(f, fi, pc, sa, ret, *dst, &[*arg0])?;
            }
            Opcode::Call2 { dst, fun, arg0, arg1 } => {
                let (sa, ret) = call_sig(gt(m, fi, pc, *fun)?, fi, pc)?;
                check_call(f, fi, pc, sa, ret, *dst, &[*arg0, *arg1])?;
            }
            Opcode::Call3 { dst, fun, arg0, arg1, arg2 } => {
                let (sa, ret) = call_sig(gt(m, fi, pc, *fun)?, fi, pc)?;
                check_call(f, fi, pc, sa, ret, *dst, &[*arg0, *arg1, *arg2])?;
            }
            Opcode::CallN { dst, fun, args } => {
                let (sa, ret) = call_sig(rt(f, fi, pc, *fun)?, fi, pc)?;
                check_call(f, fi, pc, sa, ret, *dst, args)?;
            }
            Opcode::GetGlobal { dst, global } => {
                if rt(f, fi, pc, *dst)? != gt(m, fi, pc, *global)? {
                    return Err(err(fi, pc, "global type mismatch"));
                }
            }
            Opcode::SetGlobal { global, src } => {
                if rt(f, fi, pc, *src)? != gt(m, fi, pc, *global)? {
                    return Err(err(fi, pc, "global type mismatch"));
                }
            }
            Opcode::Eq { dst, a, b }
            | Opcode::NotEq { dst, a, b }
            | Opcode::Lt { dst, a, b }
            | Opcode::Gte { dst, a, b } => {
                if *rt(f, fi, pc, *dst)? != Ty::Bool {
                    return Err(err(fi, pc, "comparison dst must be bool"));
                }
                if rt(f, fi, pc, *a)? != rt(f, fi, pc, *b)? {
                    return Err(err(fi, pc, "comparison operand type mismatch"));
                }
            }
            Opcode::Ret { reg } => {
                let t = rt(f, fi, pc, *reg)?;
                if t != fun_ret {
                    return Err(err(fi, pc, format!("ret of {t}, function returns {fun_ret}")));
                }
            }
            Opcode::JTrue { cond, delta } | Opcode::JFalse { cond, delta } => {
                if *rt(f, fi, pc, *cond)? != Ty::Bool {
                    return Err(err(fi, pc, "jump condition must be bool"));
                }
                target(f, fi, pc, *delta)?;
            }
            Opcode::JNull { reg, delta } | Opcode::JNotNull { reg, delta } => {
                rt(f, fi, pc, *reg)?;
                target(f, fi, pc, *delta)?;
            }
            Opcode::JAlways { delta } => target(f, fi, pc, *delta)?,
            Opcode::ToAny { dst, src } => {
                rt(f, fi, pc, *src)?;
                if *rt(f, fi, pc, *dst)? != Ty::Any {
                    return Err(err(fi, pc, "toany dst must be any"));
                }
            }
        }
    }
    Ok(())
}

fn check_call(
    f: &FunDecl,
    fi: usize,
    pc: usize,
    sig_args: &[Ty],
    ret: &Ty,
    dst: RegId,
    args: &[RegId],
) -> Result<()> {
    if args.len() != sig_args.len() {
        return Err(err(
            fi,
            pc,
            format!("call with {} args, callee takes {}", args.len(), sig_args.len()),
        ));
    }
    for (i, (r, want)) in args.iter().zip(sig_args).enumerate() {
        let have = rt(f, fi, pc, *r)?;
        if have != want {
            return Err(err(fi, pc, format!("call arg {i} is {have}, callee wants {want}")));
        }
    }
    let have = rt(f, fi, pc, dst)?;
    if have != ret {
        return Err(err(fi, pc, format!("call dst is {have}, callee returns {ret}")));
    }
    Ok(())
}
