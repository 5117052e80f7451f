/**
 * Copyright 2022 - Jahred Love
 *
 * Redistribution and use in source and binary forms, with or without modification,
 * are permitted provided that the following conditions are met:
 *
 * 1. Redistributions of source code must retain the above copyright notice, this
 * list of conditions and the following disclaimer.
 *
 * 2. Redistributions in binary form must reproduce the above copyright notice, this
 * list of conditions and the following disclaimer in the documentation and/or other
 * materials provided with the distribution.
 *
 * 3. Neither the name of the copyright holder nor the names of its contributors may
 * be used to endorse or promote products derived from this software without specific
 * prior written permission.
 *
 * THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS AND CONTRIBUTORS “AS IS” AND
 * ANY EXPRESS OR IMPLIED WARRANTIES, INCLUDING, BUT NOT LIMITED TO, THE IMPLIED
 * WARRANTIES OF MERCHANTABILITY AND FITNESS FOR A PARTICULAR PURPOSE ARE DISCLAIMED.
 * IN NO EVENT SHALL THE COPYRIGHT HOLDER OR CONTRIBUTORS BE LIABLE FOR ANY DIRECT,
 * INDIRECT, INCIDENTAL, SPECIAL, EXEMPLARY, OR CONSEQUENTIAL DAMAGES (INCLUDING, BUT
 * NOT LIMITED TO, PROCUREMENT OF SUBSTITUTE GOODS OR SERVICES; LOSS OF USE, DATA, OR
 * PROFITS; OR BUSINESS INTERRUPTION) HOWEVER CAUSED AND ON ANY THEORY OF LIABILITY,
 * WHETHER IN CONTRACT, STRICT LIABILITY, OR TORT (INCLUDING NEGLIGENCE OR OTHERWISE)
 * ARISING IN ANY WAY OUT OF THE USE OF THIS SOFTWARE, EVEN IF ADVISED OF THE
 * POSSIBILITY OF SUCH DAMAGE.
 */

// Expression-to-bytecode lowering: walks the typed tree the front-end
// hands over and emits one `FunDecl` per method body. Each source local
// keeps one stable register for the whole function; every intermediate
// result gets a fresh temporary of its own type. Registers are never
// reused.

use std::collections::HashMap;

use tracing::debug;

use crate::ast::{Binop, Constant, Expr, ExprKind, MethodDecl, TypeDecl, Var};
use crate::error::{Error, Result};
use crate::hlb::{FunDecl, GlobalId, Module, Opcode, RegId, VERSION};
use crate::lookup::Lookup;
use crate::types::Ty;

/// Compile a set of type declarations into a module. `entry` names the
/// global slot ("Class:method") interpretation starts with; it must
/// resolve to a zero-argument function.
pub fn build_module(decls: &[TypeDecl], entry: &str) -> Result<Module> {
    let mut cg = Codegen::new();
    for d in decls {
        cg.compile_decl(d)?;
    }
    cg.finish(entry)
}

/// Module-level lowering state: the deduplicating tables every method
/// shares.
pub struct Codegen {
    globals: Lookup<String, Ty>,
    floats: Lookup<u64, f64>,
    natives: Lookup<String, (String, GlobalId)>,
    functions: Vec<FunDecl>,
}

/// Per-method state. The register vector and the variable map are
/// separate on purpose: temporaries grow `regs` without ever entering
/// `vars`.
struct MethodCtx {
    regs: Vec<Ty>,
    code: Vec<Opcode>,
    vars: HashMap<u32, RegId>,
}

/// A forward jump waiting for its target. Holds the opcode index of
/// the jump site; patching writes `target - (site + 1)` into its delta.
struct JumpPatch(usize);

impl MethodCtx {
    fn new() -> Self {
        Self {
            regs: Vec::new(),
            code: Vec::new(),
            vars: HashMap::new(),
        }
    }

    fn alloc_tmp(&mut self, t: Ty) -> RegId {
        let r = RegId(self.regs.len() as u32);
        self.regs.push(t);
        r
    }

    fn bind_arg(&mut self, v: &Var) {
        let r = self.alloc_tmp(v.ty.clone());
        self.vars.insert(v.id, r);
    }

    fn bind_var(&mut self, v: &Var, r: RegId) {
        self.vars.insert(v.id, r);
    }

    /// The variable's stable register, allocated on first sight.
    fn reg_of_var(&mut self, v: &Var) -> RegId {
        if let Some(&r) = self.vars.get(&v.id) {
            return r;
        }
        let r = self.alloc_tmp(v.ty.clone());
        self.vars.insert(v.id, r);
        r
    }

    fn emit(&mut self, op: Opcode) {
        self.code.push(op);
    }

    fn jump(&mut self, op: Opcode) -> JumpPatch {
        self.code.push(op);
        JumpPatch(self.code.len() - 1)
    }

    /// Point the jump at `site` to the current end of the code.
    fn patch_here(&mut self, site: JumpPatch) {
        let delta = (self.code.len() - (site.0 + 1)) as i32;
        match &mut self.code[site.0] {
            Opcode::JTrue { delta: d, .. }
            | Opcode::JFalse { delta: d, .. }
            | Opcode::JNull { delta: d, .. }
            | Opcode::JNotNull { delta: d, .. }
            | Opcode::JAlways { delta: d } => *d = delta,
            op => panic!("internal error: patch site is not a jump: {op:?}"),
        }
    }
}

impl Codegen {
    pub fn new() -> Self {
        Self {
            globals: Lookup::new(),
            floats: Lookup::new(),
            natives: Lookup::new(),
            functions: Vec::new(),
        }
    }

    pub fn compile_decl(&mut self, d: &TypeDecl) -> Result<()> {
        match d {
            TypeDecl::Class(c) if c.is_extern => {
                for m in &c.methods {
                    let Some(marker) = &m.native else { continue };
                    let fun_ty = m.fun_ty();
                    let g = self.global_id(&format!("{}:{}", c.path, m.name), &fun_ty);
                    let name = marker.native_name();
                    self.natives.intern(name.clone(), || (name, g));
                }
                Ok(())
            }
            TypeDecl::Class(c) => {
                for m in &c.methods {
                    if m.body.is_some() {
                        self.compile_method(&c.path, m)?;
                    }
                }
                Ok(())
            }
            TypeDecl::Alias(_) | TypeDecl::Abstract(_) => Ok(()),
            TypeDecl::Enum(name) => Err(Error::Unsupported(format!("enum {name}"))),
            TypeDecl::Interface(name) => Err(Error::Unsupported(format!("interface {name}"))),
        }
    }

    pub fn finish(self, entry: &str) -> Result<Module> {
        let id = self
            .globals
            .get(&entry.to_string())
            .ok_or_else(|| Error::Internal(format!("entrypoint '{entry}' is not defined")))?;
        let entry_ty = &self.globals.items()[id];
        match entry_ty.as_fun() {
            Some((args, _)) if args.is_empty() => {}
            _ => {
                return Err(Error::Internal(format!(
                    "entrypoint '{entry}' must be a zero-argument function, got {entry_ty}"
                )))
            }
        }
        Ok(Module {
            version: VERSION,
            entrypoint: GlobalId(id as u32),
            globals: self.globals.into_items(),
            floats: self.floats.into_items(),
            natives: self.natives.into_items(),
            functions: self.functions,
        })
    }

    fn global_id(&mut self, name: &str, ty: &Ty) -> GlobalId {
        GlobalId(self.globals.intern(name.to_string(), || ty.clone()) as u32)
    }

    fn compile_method(&mut self, class_path: &str, m: &MethodDecl) -> Result<()> {
        let fun_ty = m.fun_ty();
        let g = self.global_id(&format!("{class_path}:{}", m.name), &fun_ty);

        let mut ctx = MethodCtx::new();
        for a in &m.args {
            ctx.bind_arg(&a.var);
        }
        // A null argument picks up its default literal on entry.
        for a in &m.args {
            let Some(c) = &a.default else { continue };
            if matches!(c, Constant::Null) {
                continue;
            }
            let reg = ctx.reg_of_var(&a.var);
            ctx.emit(Opcode::JNotNull { reg, delta: 1 });
            self.emit_const(&mut ctx, reg, c)?;
        }

        let body = m.body.as_ref().ok_or_else(|| {
            Error::Internal(format!("method {class_path}:{} has no body", m.name))
        })?;
        self.compile_expr(&mut ctx, body)?;
        if m.ret == Ty::Void {
            let v = ctx.alloc_tmp(Ty::Void);
            ctx.emit(Opcode::Ret { reg: v });
        }

        debug!(
            "compiled {class_path}:{}: {} regs, {} ops",
            m.name,
            ctx.regs.len(),
            ctx.code.len()
        );
        self.functions.push(FunDecl {
            findex: g,
            regs: ctx.regs,
            code: ctx.code,
        });
        Ok(())
    }

    fn compile_expr(&mut self, ctx: &mut MethodCtx, e: &Expr) -> Result<RegId> {
        match &e.node {
            ExprKind::Const(c) => {
                let dst = match c {
                    Constant::Int(_) => ctx.alloc_tmp(Ty::I32),
                    Constant::Float(_) => ctx.alloc_tmp(Ty::F64),
                    Constant::Bool(_) => ctx.alloc_tmp(Ty::Bool),
                    Constant::Null => return Err(Error::Unsupported("null literal".into())),
                };
                self.emit_const(ctx, dst, c)?;
                Ok(dst)
            }
            ExprKind::Local(v) => Ok(ctx.reg_of_var(v)),
            ExprKind::Decl { var, init } => {
                let r = self.compile_expr(ctx, init)?;
                let r = self.coerce(ctx, r, &var.ty)?;
                ctx.bind_var(var, r);
                Ok(r)
            }
            ExprKind::Return(None) => {
                let v = ctx.alloc_tmp(Ty::Void);
                ctx.emit(Opcode::Ret { reg: v });
                Ok(v)
            }
            ExprKind::Return(Some(x)) => {
                let r = self.compile_expr(ctx, x)?;
                ctx.emit(Opcode::Ret { reg: r });
                Ok(ctx.alloc_tmp(Ty::Void))
            }
            ExprKind::Paren(x) => self.compile_expr(ctx, x),
            ExprKind::Block(xs) => {
                let mut last = None;
                for x in xs {
                    last = Some(self.compile_expr(ctx, x)?);
                }
                Ok(match last {
                    Some(r) => r,
                    None => ctx.alloc_tmp(Ty::Void),
                })
            }
            ExprKind::Static(sref) => {
                let g = self.global_id(&sref.global_name(), &e.ty);
                let dst = ctx.alloc_tmp(e.ty.clone());
                ctx.emit(Opcode::GetGlobal { dst, global: g });
                Ok(dst)
            }
            ExprKind::Call { callee, args } => {
                let f = self.compile_expr(ctx, callee)?;
                let Some((want, ret)) = callee.ty.as_fun() else {
                    return Err(Error::Internal(format!(
                        "call of non-function type {}",
                        callee.ty
                    )));
                };
                if args.len() != want.len() {
                    return Err(Error::Internal(format!(
                        "call arity mismatch: {} args for {}",
                        args.len(),
                        callee.ty
                    )));
                }
                let mut regs = Vec::with_capacity(args.len());
                for (a, want_ty) in args.iter().zip(want) {
                    let r = self.compile_expr(ctx, a)?;
                    regs.push(self.coerce(ctx, r, want_ty)?);
                }
                let dst = ctx.alloc_tmp(ret.clone());
                ctx.emit(Opcode::CallN { dst, fun: f, args: regs });
                Ok(dst)
            }
            ExprKind::If { cond, then, els } => {
                let c = self.compile_expr(ctx, cond)?;
                let jfalse = ctx.jump(Opcode::JFalse { cond: c, delta: 0 });
                let t = self.compile_expr(ctx, then)?;
                let result = ctx.alloc_tmp(e.ty.clone());
                ctx.emit(Opcode::Mov { dst: result, src: t });
                match els {
                    Some(els) => {
                        let jexit = ctx.jump(Opcode::JAlways { delta: 0 });
                        ctx.patch_here(jfalse);
                        let v = self.compile_expr(ctx, els)?;
                        ctx.emit(Opcode::Mov { dst: result, src: v });
                        ctx.patch_here(jexit);
                    }
                    None => ctx.patch_here(jfalse),
                }
                Ok(result)
            }
            ExprKind::Binop { op, lhs, rhs } => {
                let a = self.compile_expr(ctx, lhs)?;
                let b = self.compile_expr(ctx, rhs)?;
                let dst = ctx.alloc_tmp(e.ty.clone());
                // Lte and Gt have no opcode of their own; they are the
                // reversed forms of Gte and Lt.
                let op = match op {
                    Binop::Add => Opcode::Add { dst, a, b },
                    Binop::Sub => Opcode::Sub { dst, a, b },
                    Binop::Eq => Opcode::Eq { dst, a, b },
                    Binop::NotEq => Opcode::NotEq { dst, a, b },
                    Binop::Lt => Opcode::Lt { dst, a, b },
                    Binop::Gte => Opcode::Gte { dst, a, b },
                    Binop::Lte => Opcode::Gte { dst, a: b, b: a },
                    Binop::Gt => Opcode::Lt { dst, a: b, b: a },
                };
                ctx.emit(op);
                Ok(dst)
            }
            ExprKind::ObjectDecl(_) => Err(Error::Unsupported("object literal".into())),
        }
    }

    /// Load a literal into `dst`. The register's type decides how the
    /// value is checked; the validator re-checks after emission.
    fn emit_const(&mut self, ctx: &mut MethodCtx, dst: RegId, c: &Constant) -> Result<()> {
        match c {
            Constant::Int(v) => {
                let value = i32::try_from(*v).map_err(|_| Error::IntRange(*v))?;
                ctx.emit(Opcode::Int { dst, value });
            }
            Constant::Float(x) => {
                let idx = self.floats.intern(x.to_bits(), || *x) as u32;
                ctx.emit(Opcode::Float { dst, idx });
            }
            Constant::Bool(v) => ctx.emit(Opcode::Bool { dst, value: *v }),
            Constant::Null => return Err(Error::Unsupported("null literal".into())),
        }
        Ok(())
    }

    /// Identity if the types already match; boxing if `want` is `Any`.
    /// Nothing else coerces implicitly.
    fn coerce(&mut self, ctx: &mut MethodCtx, src: RegId, want: &Ty) -> Result<RegId> {
        let have = ctx.regs[src.0 as usize].clone();
        if have == *want {
            return Ok(src);
        }
        if *want == Ty::Any {
            let dst = ctx.alloc_tmp(Ty::Any);
            ctx.emit(Opcode::ToAny { dst, src });
            return Ok(dst);
        }
        Err(Error::Coercion {
            from: have,
            to: want.clone(),
        })
    }
}

impl Default for Codegen {
    fn default() -> Self {
        Self::new()
    }
}
