//! Textual disassembly of a module.
//!
//! Line-oriented and fixed: a header, the entrypoint, then the global,
//! float, native and function sections in module order. Tests key off
//! this format, so changes here are format changes.

use std::fmt::Write;

use crate::hlb::{Module, Opcode};

pub fn render_module(m: &Module) -> String {
    let mut s = String::new();
    let _ = writeln!(s, "hl v{}", m.version);
    let _ = writeln!(s, "entry @{}", m.entrypoint.0);

    let _ = writeln!(s, "{} globals", m.globals.len());
    for (i, g) in m.globals.iter().enumerate() {
        let _ = writeln!(s, "\t@{i} : {g}");
    }

    let _ = writeln!(s, "{} floats", m.floats.len());
    for (i, x) in m.floats.iter().enumerate() {
        let _ = writeln!(s, "\t@{i} : {x}");
    }

    let _ = writeln!(s, "{} natives", m.natives.len());
    for (name, g) in &m.natives {
        let ty = m.global(*g).map(|t| t.to_string()).unwrap_or_default();
        let _ = writeln!(s, "\tnative {name} @{} : {ty}", g.0);
    }

    let _ = writeln!(s, "{} functions", m.functions.len());
    for f in &m.functions {
        let ty = m.global(f.findex).map(|t| t.to_string()).unwrap_or_default();
        let _ = writeln!(s, "\tfun {} : {ty}", f.findex.0);
        for (i, r) in f.regs.iter().enumerate() {
            let _ = writeln!(s, "\t\tr{i} {r}");
        }
        for (pc, op) in f.code.iter().enumerate() {
            let _ = writeln!(s, "\t\t@{pc} {}", render_opcode(op));
        }
    }

    s
}

fn render_opcode(op: &Opcode) -> String {
    match op {
        Opcode::Mov { dst, src } => format!("mov {},{}", dst.0, src.0),
        Opcode::Int { dst, value } => format!("int {},{}", dst.0, value),
        Opcode::Float { dst, idx } => format!("float {},{}", dst.0, idx),
        Opcode::Bool { dst, value } => {
            format!("{} {}", if *value { "true" } else { "false" }, dst.0)
        }
        Opcode::Add { dst, a, b } => format!("add {},{},{}", dst.0, a.0, b.0),
        Opcode::Sub { dst, a, b } => format!("sub {},{},{}", dst.0, a.0, b.0),
        Opcode::Incr { dst } => format!("incr {}", dst.0),
        Opcode::Decr { dst } => format!("decr {}", dst.0),
        Opcode::Call0 { dst, fun } => format!("call {},@{}", dst.0, fun.0),
        Opcode::Call1 { dst, fun, arg0 } => format!("call {},@{},{}", dst.0, fun.0, arg0.0),
        Opcode::Call2 { dst, fun, arg0, arg1 } => {
            format!("call {},@{},{},{}", dst.0, fun.0, arg0.0, arg1.0)
        }
        Opcode::Call3 { dst, fun, arg0, arg1, arg2 } => {
            format!("call {},@{},{},{},{}", dst.0, fun.0, arg0.0, arg1.0, arg2.0)
        }
        Opcode::CallN { dst, fun, args } => {
            let mut s = format!("call {},{}", dst.0, fun.0);
            for a in args {
                let _ = write!(s, ",{}", a.0);
            }
            s
        }
        Opcode::GetGlobal { dst, global } => format!("global {},@{}", dst.0, global.0),
        Opcode::SetGlobal { global, src } => format!("setglobal @{},{}", global.0, src.0),
        Opcode::Eq { dst, a, b } => format!("eq {},{},{}", dst.0, a.0, b.0),
        Opcode::NotEq { dst, a, b } => format!("noteq {},{},{}", dst.0, a.0, b.0),
        Opcode::Lt { dst, a, b } => format!("lt {},{},{}", dst.0, a.0, b.0),
        Opcode::Gte { dst, a, b } => format!("gte {},{},{}", dst.0, a.0, b.0),
        Opcode::Ret { reg } => format!("ret {}", reg.0),
        Opcode::JTrue { cond, delta } => format!("jtrue {},{}", cond.0, delta),
        Opcode::JFalse { cond, delta } => format!("jfalse {},{}", cond.0, delta),
        Opcode::JNull { reg, delta } => format!("jnull {},{}", reg.0, delta),
        Opcode::JNotNull { reg, delta } => format!("jnotnull {},{}", reg.0, delta),
        Opcode::JAlways { delta } => format!("jalways {}", delta),
        Opcode::ToAny { dst, src } => format!("toany {},{}", dst.0, src.0),
    }
}
