mod integration {
    use std::cell::RefCell;
    use std::rc::Rc;

    use crate::ast::{
        Binop, ClassDecl, Constant, Expr, ExprKind, FunArg, MethodDecl, NativeMarker, StaticRef,
        TypeDecl, Var,
    };
    use crate::codegen::build_module;
    use crate::error::Error;
    use crate::hlb::dump::render_module;
    use crate::hlb::validate::validate_module;
    use crate::hlb::{FunDecl, GlobalId, Module, Opcode, RegId, VERSION};
    use crate::interp::{interp, Natives, Value};
    use crate::types::Ty;

    fn e(ty: Ty, node: ExprKind) -> Expr {
        Expr { ty, node }
    }

    fn int(v: i64) -> Expr {
        e(Ty::I32, ExprKind::Const(Constant::Int(v)))
    }

    fn float(v: f64) -> Expr {
        e(Ty::F64, ExprKind::Const(Constant::Float(v)))
    }

    fn boolean(v: bool) -> Expr {
        e(Ty::Bool, ExprKind::Const(Constant::Bool(v)))
    }

    fn ret(x: Expr) -> Expr {
        e(Ty::Void, ExprKind::Return(Some(Box::new(x))))
    }

    fn var(id: u32, name: &str, ty: Ty) -> Var {
        Var {
            id,
            name: name.to_string(),
            ty,
        }
    }

    fn main_class(ret_ty: Ty, body: Expr) -> TypeDecl {
        TypeDecl::Class(ClassDecl {
            path: "Main".to_string(),
            is_extern: false,
            methods: vec![MethodDecl {
                name: "main".to_string(),
                args: vec![],
                ret: ret_ty,
                body: Some(body),
                native: None,
            }],
        })
    }

    fn compile_main(ret_ty: Ty, body: Expr) -> Module {
        build_module(&[main_class(ret_ty, body)], "Main:main").unwrap()
    }

    #[test]
    fn return_constant_emits_int_and_ret() {
        let m = compile_main(Ty::I32, ret(int(42)));
        assert_eq!(
            m.functions[0].code,
            vec![
                Opcode::Int { dst: RegId(0), value: 42 },
                Opcode::Ret { reg: RegId(0) },
            ]
        );
        // The return expression itself yields a fresh void register.
        assert_eq!(m.functions[0].regs, vec![Ty::I32, Ty::Void]);

        let out = interp(&m, &Natives::new()).unwrap();
        assert_eq!(out, Value::Int(42));

        let dump = render_module(&m);
        assert!(dump.contains("int 0,42"), "dump:\n{dump}");
        assert!(dump.contains("ret 0"), "dump:\n{dump}");
    }

    #[test]
    fn addition_evaluates_operands_then_adds() {
        let body = ret(e(
            Ty::I32,
            ExprKind::Binop {
                op: Binop::Add,
                lhs: Box::new(int(2)),
                rhs: Box::new(int(3)),
            },
        ));
        let m = compile_main(Ty::I32, body);
        assert_eq!(
            m.functions[0].code,
            vec![
                Opcode::Int { dst: RegId(0), value: 2 },
                Opcode::Int { dst: RegId(1), value: 3 },
                Opcode::Add { dst: RegId(2), a: RegId(0), b: RegId(1) },
                Opcode::Ret { reg: RegId(2) },
            ]
        );
        assert_eq!(interp(&m, &Natives::new()).unwrap(), Value::Int(5));
    }

    #[test]
    fn if_expression_moves_branch_results_into_one_register() {
        let body = ret(e(
            Ty::I32,
            ExprKind::If {
                cond: Box::new(boolean(true)),
                then: Box::new(int(1)),
                els: Some(Box::new(int(2))),
            },
        ));
        let m = compile_main(Ty::I32, body);
        assert_eq!(
            m.functions[0].code,
            vec![
                Opcode::Bool { dst: RegId(0), value: true },
                Opcode::JFalse { cond: RegId(0), delta: 3 },
                Opcode::Int { dst: RegId(1), value: 1 },
                Opcode::Mov { dst: RegId(2), src: RegId(1) },
                Opcode::JAlways { delta: 2 },
                Opcode::Int { dst: RegId(3), value: 2 },
                Opcode::Mov { dst: RegId(2), src: RegId(3) },
                Opcode::Ret { reg: RegId(2) },
            ]
        );
        assert_eq!(interp(&m, &Natives::new()).unwrap(), Value::Int(1));
    }

    #[test]
    fn any_declaration_boxes_through_toany() {
        let body = e(
            Ty::Void,
            ExprKind::Block(vec![e(
                Ty::Any,
                ExprKind::Decl {
                    var: var(0, "x", Ty::Any),
                    init: Box::new(int(7)),
                },
            )]),
        );
        let m = compile_main(Ty::Void, body);
        let f = &m.functions[0];
        assert_eq!(
            f.code[..2],
            [
                Opcode::Int { dst: RegId(0), value: 7 },
                Opcode::ToAny { dst: RegId(1), src: RegId(0) },
            ]
        );
        assert_eq!(f.regs[..2], [Ty::I32, Ty::Any]);
        validate_module(&m).unwrap();
    }

    fn log_module() -> Module {
        let log_ty = Ty::fun(vec![Ty::Any], Ty::Void);
        let ext = TypeDecl::Class(ClassDecl {
            path: "Log".to_string(),
            is_extern: true,
            methods: vec![MethodDecl {
                name: "log".to_string(),
                args: vec![FunArg {
                    var: var(0, "v", Ty::Any),
                    default: None,
                }],
                ret: Ty::Void,
                body: None,
                native: Some(NativeMarker {
                    lib: "std".to_string(),
                    name: "log".to_string(),
                }),
            }],
        });
        let call = e(
            Ty::Void,
            ExprKind::Call {
                callee: Box::new(e(
                    log_ty,
                    ExprKind::Static(StaticRef {
                        class_path: "Log".to_string(),
                        field: "log".to_string(),
                    }),
                )),
                args: vec![int(7)],
            },
        );
        let body = e(Ty::Void, ExprKind::Block(vec![call]));
        build_module(&[ext, main_class(Ty::Void, body)], "Main:main").unwrap()
    }

    #[test]
    fn native_call_boxes_argument_and_binds_by_name() {
        let m = log_module();
        assert_eq!(m.natives, vec![("std@log".to_string(), GlobalId(0))]);

        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut natives = Natives::new();
        {
            let seen = seen.clone();
            natives.register("std@log", move |args| {
                seen.borrow_mut().extend(args.iter().cloned());
                Value::Null
            });
        }
        let out = interp(&m, &natives).unwrap();
        assert_eq!(out, Value::Null);
        assert_eq!(
            seen.borrow().as_slice(),
            &[Value::Any(Box::new(Value::Int(7)), Ty::I32)]
        );
    }

    #[test]
    fn unresolved_native_fails_at_startup() {
        let m = log_module();
        let err = interp(&m, &Natives::new()).unwrap_err();
        assert!(
            matches!(&err, Error::UnresolvedNative(n) if n == "std@log"),
            "err: {err}"
        );
    }

    #[test]
    fn modules_round_trip_through_the_binary_codec() {
        let cases = vec![
            compile_main(Ty::I32, ret(int(42))),
            compile_main(Ty::F64, ret(float(3.14))),
            compile_main(
                Ty::I32,
                ret(e(
                    Ty::I32,
                    ExprKind::If {
                        cond: Box::new(boolean(false)),
                        then: Box::new(int(1)),
                        els: Some(Box::new(int(2))),
                    },
                )),
            ),
            log_module(),
        ];
        for m in cases {
            let bytes = m.to_bytes().unwrap();
            let back = Module::from_bytes(&bytes).unwrap();
            assert_eq!(back, m);
            assert_eq!(back.to_bytes().unwrap(), bytes);
        }
    }

    #[test]
    fn dump_format_is_fixed() {
        let m = compile_main(Ty::I32, ret(int(42)));
        let expected = "hl v1\n\
                        entry @0\n\
                        1 globals\n\
                        \t@0 : () -> i32\n\
                        0 floats\n\
                        0 natives\n\
                        1 functions\n\
                        \tfun 0 : () -> i32\n\
                        \t\tr0 i32\n\
                        \t\tr1 void\n\
                        \t\t@0 int 0,42\n\
                        \t\t@1 ret 0\n";
        assert_eq!(render_module(&m), expected);
    }

    #[test]
    fn float_literals_share_one_pool_slot() {
        let body = ret(e(
            Ty::F64,
            ExprKind::Binop {
                op: Binop::Add,
                lhs: Box::new(float(3.14)),
                rhs: Box::new(float(3.14)),
            },
        ));
        let m = compile_main(Ty::F64, body);
        assert_eq!(m.floats, vec![3.14]);
        assert_eq!(interp(&m, &Natives::new()).unwrap(), Value::Float(6.28));
    }

    #[test]
    fn default_argument_loads_behind_jnotnull() {
        let decl = TypeDecl::Class(ClassDecl {
            path: "Main".to_string(),
            is_extern: false,
            methods: vec![
                MethodDecl {
                    name: "inc".to_string(),
                    args: vec![
                        FunArg {
                            var: var(0, "x", Ty::I32),
                            default: None,
                        },
                        FunArg {
                            var: var(1, "by", Ty::I32),
                            default: Some(Constant::Int(5)),
                        },
                    ],
                    ret: Ty::I32,
                    body: Some(ret(e(
                        Ty::I32,
                        ExprKind::Binop {
                            op: Binop::Add,
                            lhs: Box::new(e(Ty::I32, ExprKind::Local(var(0, "x", Ty::I32)))),
                            rhs: Box::new(e(Ty::I32, ExprKind::Local(var(1, "by", Ty::I32)))),
                        },
                    ))),
                    native: None,
                },
                MethodDecl {
                    name: "main".to_string(),
                    args: vec![],
                    ret: Ty::I32,
                    body: Some(ret(int(0))),
                    native: None,
                },
            ],
        });
        let m = build_module(&[decl], "Main:main").unwrap();
        let inc = &m.functions[0];
        assert_eq!(
            inc.code[..2],
            [
                Opcode::JNotNull { reg: RegId(1), delta: 1 },
                Opcode::Int { dst: RegId(1), value: 5 },
            ]
        );
        validate_module(&m).unwrap();
    }

    #[test]
    fn null_default_emits_nothing() {
        let decl = TypeDecl::Class(ClassDecl {
            path: "Main".to_string(),
            is_extern: false,
            methods: vec![MethodDecl {
                name: "main".to_string(),
                args: vec![],
                ret: Ty::I32,
                body: Some(ret(int(1))),
                native: None,
            }],
        });
        let with_null = TypeDecl::Class(ClassDecl {
            path: "Util".to_string(),
            is_extern: false,
            methods: vec![MethodDecl {
                name: "id".to_string(),
                args: vec![FunArg {
                    var: var(0, "x", Ty::Any),
                    default: Some(Constant::Null),
                }],
                ret: Ty::Any,
                body: Some(ret(e(Ty::Any, ExprKind::Local(var(0, "x", Ty::Any))))),
                native: None,
            }],
        });
        let m = build_module(&[with_null, decl], "Main:main").unwrap();
        let id = &m.functions[0];
        assert!(matches!(id.code[0], Opcode::Ret { .. }), "code: {:?}", id.code);
    }

    #[test]
    fn comparison_operators_reuse_reversed_opcodes() {
        let cmp = |op| {
            e(
                Ty::Bool,
                ExprKind::Binop {
                    op,
                    lhs: Box::new(int(1)),
                    rhs: Box::new(int(2)),
                },
            )
        };
        let m = compile_main(Ty::Bool, ret(cmp(Binop::Lte)));
        assert_eq!(
            m.functions[0].code[2],
            Opcode::Gte { dst: RegId(2), a: RegId(1), b: RegId(0) }
        );
        assert_eq!(interp(&m, &Natives::new()).unwrap(), Value::Bool(true));

        let m = compile_main(Ty::Bool, ret(cmp(Binop::Gt)));
        assert_eq!(
            m.functions[0].code[2],
            Opcode::Lt { dst: RegId(2), a: RegId(1), b: RegId(0) }
        );
        assert_eq!(interp(&m, &Natives::new()).unwrap(), Value::Bool(false));
    }

    #[test]
    fn recursive_static_calls_resolve_through_globals() {
        // fact(n) = if (n <= 1) 1 else n + fact(n - 1), with + standing
        // in for * since the core has no multiply.
        let fact_ty = Ty::fun(vec![Ty::I32], Ty::I32);
        let n = || e(Ty::I32, ExprKind::Local(var(0, "n", Ty::I32)));
        let fact_ref = || {
            e(
                fact_ty.clone(),
                ExprKind::Static(StaticRef {
                    class_path: "Main".to_string(),
                    field: "fact".to_string(),
                }),
            )
        };
        let recurse = e(
            Ty::I32,
            ExprKind::Call {
                callee: Box::new(fact_ref()),
                args: vec![e(
                    Ty::I32,
                    ExprKind::Binop {
                        op: Binop::Sub,
                        lhs: Box::new(n()),
                        rhs: Box::new(int(1)),
                    },
                )],
            },
        );
        let body = ret(e(
            Ty::I32,
            ExprKind::If {
                cond: Box::new(e(
                    Ty::Bool,
                    ExprKind::Binop {
                        op: Binop::Lte,
                        lhs: Box::new(n()),
                        rhs: Box::new(int(1)),
                    },
                )),
                then: Box::new(int(1)),
                els: Some(Box::new(e(
                    Ty::I32,
                    ExprKind::Binop {
                        op: Binop::Add,
                        lhs: Box::new(n()),
                        rhs: Box::new(recurse),
                    },
                ))),
            },
        ));
        let main_body = ret(e(
            Ty::I32,
            ExprKind::Call {
                callee: Box::new(fact_ref()),
                args: vec![int(4)],
            },
        ));
        let decl = TypeDecl::Class(ClassDecl {
            path: "Main".to_string(),
            is_extern: false,
            methods: vec![
                MethodDecl {
                    name: "fact".to_string(),
                    args: vec![FunArg {
                        var: var(0, "n", Ty::I32),
                        default: None,
                    }],
                    ret: Ty::I32,
                    body: Some(body),
                    native: None,
                },
                MethodDecl {
                    name: "main".to_string(),
                    args: vec![],
                    ret: Ty::I32,
                    body: Some(main_body),
                    native: None,
                },
            ],
        });
        let m = build_module(&[decl], "Main:main").unwrap();
        // 4 + 3 + 2 + 1
        assert_eq!(interp(&m, &Natives::new()).unwrap(), Value::Int(10));
    }

    #[test]
    fn enum_declarations_are_a_clear_diagnostic() {
        let err = build_module(&[TypeDecl::Enum("Color".to_string())], "Main:main").unwrap_err();
        assert!(
            matches!(&err, Error::Unsupported(msg) if msg.contains("Color")),
            "err: {err}"
        );
    }

    #[test]
    fn bad_coercion_is_a_compile_error() {
        let log_ty = Ty::fun(vec![Ty::I32], Ty::Void);
        let call = e(
            Ty::Void,
            ExprKind::Call {
                callee: Box::new(e(
                    log_ty,
                    ExprKind::Static(StaticRef {
                        class_path: "Util".to_string(),
                        field: "take".to_string(),
                    }),
                )),
                args: vec![float(1.5)],
            },
        );
        let err =
            build_module(&[main_class(Ty::Void, call)], "Main:main").unwrap_err();
        assert!(
            matches!(&err, Error::Coercion { from: Ty::F64, to: Ty::I32 }),
            "err: {err}"
        );
    }

    #[test]
    fn out_of_range_int_literal_is_diagnosed() {
        let err = build_module(
            &[main_class(Ty::I32, ret(int(0x1_0000_0000)))],
            "Main:main",
        )
        .unwrap_err();
        assert!(matches!(&err, Error::IntRange(0x1_0000_0000)), "err: {err}");
    }

    // Hand-built modules for rules codegen never violates.

    fn raw_module(ret_ty: Ty, regs: Vec<Ty>, code: Vec<Opcode>) -> Module {
        Module {
            version: VERSION,
            entrypoint: GlobalId(0),
            globals: vec![Ty::fun(vec![], ret_ty)],
            floats: vec![],
            natives: vec![],
            functions: vec![FunDecl {
                findex: GlobalId(0),
                regs,
                code,
            }],
        }
    }

    #[test]
    fn wild_jump_is_rejected() {
        let m = raw_module(
            Ty::I32,
            vec![Ty::I32],
            vec![
                Opcode::Int { dst: RegId(0), value: 1 },
                Opcode::Int { dst: RegId(0), value: 2 },
                Opcode::JAlways { delta: 9999 },
            ],
        );
        let err = validate_module(&m).unwrap_err();
        assert!(
            matches!(&err, Error::Validate { findex: 0, pc: 2, msg } if msg.contains("jump target")),
            "err: {err}"
        );
    }

    #[test]
    fn jump_to_end_of_code_is_accepted() {
        let m = raw_module(
            Ty::I32,
            vec![Ty::I32],
            vec![
                Opcode::Int { dst: RegId(0), value: 1 },
                Opcode::Ret { reg: RegId(0) },
                Opcode::JAlways { delta: 0 },
            ],
        );
        validate_module(&m).unwrap();
    }

    #[test]
    fn ui8_add_with_i32_operands_is_rejected() {
        let m = raw_module(
            Ty::UI8,
            vec![Ty::I32, Ty::I32, Ty::UI8],
            vec![
                Opcode::Int { dst: RegId(0), value: 1 },
                Opcode::Int { dst: RegId(1), value: 2 },
                Opcode::Add { dst: RegId(2), a: RegId(0), b: RegId(1) },
                Opcode::Ret { reg: RegId(2) },
            ],
        );
        let err = validate_module(&m).unwrap_err();
        assert!(
            matches!(&err, Error::Validate { pc: 2, msg, .. } if msg.contains("mismatch")),
            "err: {err}"
        );
    }

    #[test]
    fn ui8_addition_wraps_modulo_256() {
        let m = raw_module(
            Ty::UI8,
            vec![Ty::UI8, Ty::UI8, Ty::UI8],
            vec![
                Opcode::Int { dst: RegId(0), value: 200 },
                Opcode::Int { dst: RegId(1), value: 200 },
                Opcode::Add { dst: RegId(2), a: RegId(0), b: RegId(1) },
                Opcode::Ret { reg: RegId(2) },
            ],
        );
        assert_eq!(interp(&m, &Natives::new()).unwrap(), Value::Int(144));
    }

    #[test]
    fn call_family_round_trips_through_the_codec() {
        // The codec does not validate, so one function can hold every
        // call form at once.
        let m = raw_module(
            Ty::Void,
            vec![Ty::I32, Ty::I32, Ty::I32, Ty::I32, Ty::I32, Ty::I32],
            vec![
                Opcode::Call0 { dst: RegId(0), fun: GlobalId(1) },
                Opcode::Call1 { dst: RegId(1), fun: GlobalId(2), arg0: RegId(0) },
                Opcode::Call2 { dst: RegId(2), fun: GlobalId(1), arg0: RegId(0), arg1: RegId(1) },
                Opcode::Call3 {
                    dst: RegId(3),
                    fun: GlobalId(2),
                    arg0: RegId(0),
                    arg1: RegId(1),
                    arg2: RegId(2),
                },
                Opcode::CallN {
                    dst: RegId(4),
                    fun: RegId(5),
                    args: vec![RegId(0), RegId(1), RegId(2), RegId(3)],
                },
            ],
        );
        let bytes = m.to_bytes().unwrap();
        // Call2 and Call3 keep distinct tags on the wire.
        assert!(
            bytes.windows(5).any(|w| w == [12, 2, 1, 0, 1]),
            "bytes: {bytes:?}"
        );
        assert!(
            bytes.windows(6).any(|w| w == [28, 3, 2, 0, 1, 2]),
            "bytes: {bytes:?}"
        );
        let back = Module::from_bytes(&bytes).unwrap();
        assert_eq!(back, m);
        assert_eq!(back.to_bytes().unwrap(), bytes);
    }

    #[test]
    fn call0_and_call1_dispatch_through_globals() {
        let m = Module {
            version: VERSION,
            entrypoint: GlobalId(0),
            globals: vec![
                Ty::fun(vec![], Ty::I32),
                Ty::fun(vec![], Ty::I32),
                Ty::fun(vec![Ty::I32], Ty::I32),
            ],
            floats: vec![],
            natives: vec![],
            functions: vec![
                FunDecl {
                    findex: GlobalId(0),
                    regs: vec![Ty::I32, Ty::I32],
                    code: vec![
                        Opcode::Call0 { dst: RegId(0), fun: GlobalId(1) },
                        Opcode::Call1 { dst: RegId(1), fun: GlobalId(2), arg0: RegId(0) },
                        Opcode::Ret { reg: RegId(1) },
                    ],
                },
                FunDecl {
                    findex: GlobalId(1),
                    regs: vec![Ty::I32],
                    code: vec![
                        Opcode::Int { dst: RegId(0), value: 5 },
                        Opcode::Ret { reg: RegId(0) },
                    ],
                },
                FunDecl {
                    findex: GlobalId(2),
                    regs: vec![Ty::I32, Ty::I32, Ty::I32],
                    code: vec![
                        Opcode::Int { dst: RegId(1), value: 1 },
                        Opcode::Add { dst: RegId(2), a: RegId(0), b: RegId(1) },
                        Opcode::Ret { reg: RegId(2) },
                    ],
                },
            ],
        };
        assert_eq!(interp(&m, &Natives::new()).unwrap(), Value::Int(6));
    }

    #[test]
    fn call2_and_call3_dispatch_through_globals() {
        let add2 = FunDecl {
            findex: GlobalId(1),
            regs: vec![Ty::I32, Ty::I32, Ty::I32],
            code: vec![
                Opcode::Add { dst: RegId(2), a: RegId(0), b: RegId(1) },
                Opcode::Ret { reg: RegId(2) },
            ],
        };
        let add3 = FunDecl {
            findex: GlobalId(2),
            regs: vec![Ty::I32, Ty::I32, Ty::I32, Ty::I32],
            code: vec![
                Opcode::Add { dst: RegId(3), a: RegId(0), b: RegId(1) },
                Opcode::Add { dst: RegId(3), a: RegId(3), b: RegId(2) },
                Opcode::Ret { reg: RegId(3) },
            ],
        };
        let main = FunDecl {
            findex: GlobalId(0),
            regs: vec![Ty::I32, Ty::I32, Ty::I32, Ty::I32, Ty::I32],
            code: vec![
                Opcode::Int { dst: RegId(0), value: 10 },
                Opcode::Int { dst: RegId(1), value: 20 },
                Opcode::Int { dst: RegId(2), value: 30 },
                Opcode::Call2 { dst: RegId(3), fun: GlobalId(1), arg0: RegId(0), arg1: RegId(1) },
                Opcode::Call3 {
                    dst: RegId(4),
                    fun: GlobalId(2),
                    arg0: RegId(1),
                    arg1: RegId(2),
                    arg2: RegId(3),
                },
                Opcode::Ret { reg: RegId(4) },
            ],
        };
        let m = Module {
            version: VERSION,
            entrypoint: GlobalId(0),
            globals: vec![
                Ty::fun(vec![], Ty::I32),
                Ty::fun(vec![Ty::I32, Ty::I32], Ty::I32),
                Ty::fun(vec![Ty::I32, Ty::I32, Ty::I32], Ty::I32),
            ],
            floats: vec![],
            natives: vec![],
            functions: vec![main, add2, add3],
        };
        // add2(10, 20) = 30, then add3(20, 30, 30) = 80.
        assert_eq!(interp(&m, &Natives::new()).unwrap(), Value::Int(80));

        let bytes = m.to_bytes().unwrap();
        assert_eq!(Module::from_bytes(&bytes).unwrap(), m);
    }

    #[test]
    fn argument_registers_must_match_the_signature() {
        let mut m = raw_module(Ty::I32, vec![Ty::I32], vec![Opcode::Ret { reg: RegId(0) }]);
        m.globals[0] = Ty::fun(vec![Ty::Bool], Ty::I32);
        let err = validate_module(&m).unwrap_err();
        assert!(
            matches!(&err, Error::Validate { msg, .. } if msg.contains("signature")),
            "err: {err}"
        );
    }
}

mod props {
    use proptest::prelude::*;

    use crate::hlb::{FunDecl, GlobalId, Module, Opcode, RegId, VERSION};
    use crate::types::Ty;

    fn jump_module(delta: i32) -> Module {
        Module {
            version: VERSION,
            entrypoint: GlobalId(0),
            globals: vec![Ty::fun(vec![], Ty::Void)],
            floats: vec![],
            natives: vec![],
            functions: vec![FunDecl {
                findex: GlobalId(0),
                regs: vec![],
                code: vec![Opcode::JAlways { delta }],
            }],
        }
    }

    proptest! {
        // The codec never validates, so arbitrary deltas exercise every
        // vint form end to end.
        #[test]
        fn vint_deltas_round_trip(delta in -0x1FFF_FFFFi32..0x2000_0000i32) {
            let m = jump_module(delta);
            let bytes = m.to_bytes().unwrap();
            let back = Module::from_bytes(&bytes).unwrap();
            prop_assert_eq!(back, m);
        }

        #[test]
        fn int_immediates_round_trip(value: i32) {
            let mut m = jump_module(0);
            m.functions[0].regs = vec![Ty::I32];
            m.functions[0].code = vec![Opcode::Int { dst: RegId(0), value }];
            let bytes = m.to_bytes().unwrap();
            let back = Module::from_bytes(&bytes).unwrap();
            prop_assert_eq!(back, m);
        }
    }
}
