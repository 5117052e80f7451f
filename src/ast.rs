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

// The typed tree handed over by the front-end. Every expression arrives
// with its resolved type, every variable with a unique id; the back-end
// never performs name resolution or type inference.

use crate::types::Ty;

/// A resolved local variable. `id` is unique per method body.
#[derive(Clone, Debug)]
pub struct Var {
    pub id: u32,
    pub name: String,
    pub ty: Ty,
}

#[derive(Clone, Debug)]
pub enum Constant {
    Null,
    Int(i64),
    Float(f64),
    Bool(bool),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Binop {
    Add,
    Sub,
    Eq,
    NotEq,
    Lt,
    Lte,
    Gt,
    Gte,
}

/// A static field reference, resolved to a class path and field name.
#[derive(Clone, Debug)]
pub struct StaticRef {
    pub class_path: String,
    pub field: String,
}

impl StaticRef {
    /// The module-global slot name for this field.
    pub fn global_name(&self) -> String {
        format!("{}:{}", self.class_path, self.field)
    }
}

#[derive(Clone, Debug)]
pub struct Expr {
    pub ty: Ty,
    pub node: ExprKind,
}

#[derive(Clone, Debug)]
pub enum ExprKind {
    Const(Constant),
    Local(Var),
    Decl { var: Var, init: Box<Expr> },
    Return(Option<Box<Expr>>),
    Paren(Box<Expr>),
    Block(Vec<Expr>),
    Call { callee: Box<Expr>, args: Vec<Expr> },
    Static(StaticRef),
    ObjectDecl(Vec<(String, Expr)>),
    If {
        cond: Box<Expr>,
        then: Box<Expr>,
        els: Option<Box<Expr>>,
    },
    Binop {
        op: Binop,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
}

/// Marks an extern method as bound to the host native `lib@name`.
#[derive(Clone, Debug)]
pub struct NativeMarker {
    pub lib: String,
    pub name: String,
}

impl NativeMarker {
    pub fn native_name(&self) -> String {
        format!("{}@{}", self.lib, self.name)
    }
}

#[derive(Clone, Debug)]
pub struct FunArg {
    pub var: Var,
    /// Optional literal default, loaded on entry when the argument is null.
    pub default: Option<Constant>,
}

#[derive(Clone, Debug)]
pub struct MethodDecl {
    pub name: String,
    pub args: Vec<FunArg>,
    pub ret: Ty,
    pub body: Option<Expr>,
    pub native: Option<NativeMarker>,
}

impl MethodDecl {
    pub fn fun_ty(&self) -> Ty {
        Ty::fun(
            self.args.iter().map(|a| a.var.ty.clone()).collect(),
            self.ret.clone(),
        )
    }
}

#[derive(Clone, Debug)]
pub struct ClassDecl {
    pub path: String,
    pub is_extern: bool,
    pub methods: Vec<MethodDecl>,
}

#[derive(Clone, Debug)]
pub enum TypeDecl {
    Class(ClassDecl),
    /// Type aliases carry no implementation; the back-end skips them.
    Alias(String),
    /// Abstracts without implementation likewise compile to nothing.
    Abstract(String),
    Enum(String),
    Interface(String),
}
