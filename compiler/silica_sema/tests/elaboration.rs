#![allow(clippy::unwrap_used, clippy::expect_used)]
//! End-to-end elaboration tests: units are built as syntax trees, added
//! to a compilation, and expressions are bound and evaluated against the
//! resulting scopes.

use pretty_assertions::assert_eq;
use silica_diagnostic::ErrorCode;
use silica_sema::{Compilation, CompilationOptions, Namespace, ScopeId};
use silica_syntax::ast::{
    ArgSyntax, BinaryOpSyntax, ClassDeclSyntax, CompilationUnitSyntax, DataTypeSyntax,
    DataTypeSyntaxKind, DimensionSyntax, EnumMemberSyntax, ExprSyntax, ExprSyntaxKind,
    FormalArgSyntax, GenerateBlockSyntax, Lifetime, MemberSyntax, MemberSyntaxKind,
    MethodModifier, ModuleDeclSyntax, PackageDeclSyntax, ParamDeclSyntax, StmtSyntax,
    StmtSyntaxKind, StructFieldSyntax, SubroutineDeclSyntax, SubroutineKind, TypeKeyword,
    TypedefSyntax, VarDeclSyntax, ArgDirection,
};
use silica_syntax::Span;
use silica_types::ConstantValue;

fn sp() -> Span {
    Span::DUMMY
}

fn int_ty() -> DataTypeSyntax {
    DataTypeSyntax::keyword(TypeKeyword::Int, sp())
}

fn formal(comp: &Compilation, name: &str, default: Option<ExprSyntax>) -> FormalArgSyntax {
    FormalArgSyntax {
        name: comp.name(name),
        direction: ArgDirection::In,
        ty: int_ty(),
        default,
        span: sp(),
    }
}

fn function(
    comp: &Compilation,
    name: &str,
    formals: Vec<FormalArgSyntax>,
    body: Vec<StmtSyntax>,
) -> MemberSyntax {
    MemberSyntax::new(
        MemberSyntaxKind::Subroutine(SubroutineDeclSyntax {
            kind: SubroutineKind::Function,
            name: comp.name(name),
            name_span: sp(),
            lifetime: Some(Lifetime::Automatic),
            modifiers: Vec::new(),
            return_type: Some(int_ty()),
            formals,
            body,
        }),
        sp(),
    )
}

fn var(comp: &Compilation, name: &str, ty: DataTypeSyntax, init: Option<ExprSyntax>) -> MemberSyntax {
    MemberSyntax::new(
        MemberSyntaxKind::Variable(VarDeclSyntax {
            name: comp.name(name),
            name_span: sp(),
            ty,
            dims: Vec::new(),
            lifetime: None,
            is_const: false,
            init,
        }),
        sp(),
    )
}

fn param(comp: &Compilation, name: &str, init: ExprSyntax) -> MemberSyntax {
    MemberSyntax::new(
        MemberSyntaxKind::Parameter(ParamDeclSyntax {
            name: comp.name(name),
            name_span: sp(),
            ty: int_ty(),
            init: Some(init),
            is_local: false,
        }),
        sp(),
    )
}

fn local(comp: &Compilation, name: &str, ty: DataTypeSyntax, dims: Vec<DimensionSyntax>) -> StmtSyntax {
    StmtSyntax::new(
        StmtSyntaxKind::VarDecl(VarDeclSyntax {
            name: comp.name(name),
            name_span: sp(),
            ty,
            dims,
            lifetime: None,
            is_const: false,
            init: None,
        }),
        sp(),
    )
}

fn ident(comp: &Compilation, name: &str) -> ExprSyntax {
    ExprSyntax::ident(comp.name(name), sp())
}

fn assign_stmt(target: ExprSyntax, value: ExprSyntax) -> StmtSyntax {
    StmtSyntax::expr(ExprSyntax::new(
        ExprSyntaxKind::Assignment {
            target: Box::new(target),
            value: Box::new(value),
            nonblocking: false,
        },
        sp(),
    ))
}

fn index(value: ExprSyntax, idx: i32) -> ExprSyntax {
    ExprSyntax::new(
        ExprSyntaxKind::ElementSelect {
            value: Box::new(value),
            index: Box::new(ExprSyntax::int(idx, sp())),
        },
        sp(),
    )
}

fn method_call(receiver: ExprSyntax, method: &str, comp: &Compilation) -> ExprSyntax {
    ExprSyntax::call(
        ExprSyntax::new(
            ExprSyntaxKind::MemberAccess {
                value: Box::new(receiver),
                member: comp.name(method),
                member_span: sp(),
            },
            sp(),
        ),
        Vec::new(),
        sp(),
    )
}

fn call(comp: &Compilation, name: &str, args: Vec<ExprSyntax>) -> ExprSyntax {
    ExprSyntax::call(
        ident(comp, name),
        args.into_iter().map(ArgSyntax::ordered).collect(),
        sp(),
    )
}

/// Build a compilation holding a single module `top` and return its
/// scope.
fn setup(build: impl FnOnce(&Compilation) -> Vec<MemberSyntax>) -> (Compilation, ScopeId) {
    setup_opts(CompilationOptions::default(), build)
}

fn setup_opts(
    options: CompilationOptions,
    build: impl FnOnce(&Compilation) -> Vec<MemberSyntax>,
) -> (Compilation, ScopeId) {
    let comp = Compilation::with_options(options);
    let members = build(&comp);
    let module = MemberSyntax::new(
        MemberSyntaxKind::Module(ModuleDeclSyntax {
            name: comp.name("top"),
            name_span: sp(),
            members,
        }),
        sp(),
    );
    let unit = comp.add_unit(CompilationUnitSyntax {
        members: vec![module],
    });
    let module_sym = comp.find_member(unit, "top").unwrap();
    let scope = comp.symbol(module_sym).owned_scope().unwrap();
    (comp, scope)
}

fn assert_int(value: ConstantValue, expected: i64) {
    match value {
        ConstantValue::Integer(v) => assert_eq!(v.to_i64(), Some(expected)),
        other => panic!("expected integer {expected}, got {other:?}"),
    }
}

/// `function int f(int a, int b = 2); return a + b; endfunction`
fn adder(comp: &Compilation) -> MemberSyntax {
    function(
        comp,
        "f",
        vec![
            formal(comp, "a", None),
            formal(comp, "b", Some(ExprSyntax::int(2, sp()))),
        ],
        vec![StmtSyntax::ret(
            Some(ExprSyntax::binary(
                BinaryOpSyntax::Add,
                ident(comp, "a"),
                ident(comp, "b"),
            )),
            sp(),
        )],
    )
}

#[test]
fn call_with_default_argument() {
    let (comp, scope) = setup(|c| vec![adder(c)]);
    let result = comp.eval_expression(&call(&comp, "f", vec![ExprSyntax::int(3, sp())]), scope);
    assert_int(result, 5);
    assert!(!comp.has_errors());

    let result = comp.eval_expression(
        &call(
            &comp,
            "f",
            vec![ExprSyntax::int(3, sp()), ExprSyntax::int(10, sp())],
        ),
        scope,
    );
    assert_int(result, 13);
}

#[test]
fn named_arguments_resolve_out_of_order() {
    let (comp, scope) = setup(|c| vec![adder(c)]);
    let expr = ExprSyntax::call(
        ident(&comp, "f"),
        vec![
            ArgSyntax::named(comp.name("b"), sp(), Some(ExprSyntax::int(40, sp())), sp()),
            ArgSyntax::named(comp.name("a"), sp(), Some(ExprSyntax::int(2, sp())), sp()),
        ],
        sp(),
    );
    assert_int(comp.eval_expression(&expr, scope), 42);
}

#[test]
fn ordered_argument_after_named_is_rejected() {
    let (comp, scope) = setup(|c| vec![adder(c)]);
    let expr = ExprSyntax::call(
        ident(&comp, "f"),
        vec![
            ArgSyntax::named(comp.name("a"), sp(), Some(ExprSyntax::int(1, sp())), sp()),
            ArgSyntax::ordered(ExprSyntax::int(2, sp())),
        ],
        sp(),
    );
    assert_eq!(comp.eval_expression(&expr, scope), ConstantValue::Invalid);
    assert!(comp.has_diagnostic(ErrorCode::E4207));
}

#[test]
fn missing_argument_without_default() {
    let (comp, scope) = setup(|c| vec![adder(c)]);
    let result = comp.eval_expression(&call(&comp, "f", vec![]), scope);
    assert_eq!(result, ConstantValue::Invalid);
    assert!(comp.has_diagnostic(ErrorCode::E4201));
}

#[test]
fn recursive_factorial() {
    // function int fact(int n);
    //   if (n <= 1) return 1; else return n * fact(n - 1);
    let (comp, scope) = setup(|c| {
        let body = vec![StmtSyntax::new(
            StmtSyntaxKind::If {
                cond: ExprSyntax::binary(
                    BinaryOpSyntax::LessThanEqual,
                    ident(c, "n"),
                    ExprSyntax::int(1, sp()),
                ),
                then_stmt: Box::new(StmtSyntax::ret(Some(ExprSyntax::int(1, sp())), sp())),
                else_stmt: Some(Box::new(StmtSyntax::ret(
                    Some(ExprSyntax::binary(
                        BinaryOpSyntax::Multiply,
                        ident(c, "n"),
                        call(
                            c,
                            "fact",
                            vec![ExprSyntax::binary(
                                BinaryOpSyntax::Subtract,
                                ident(c, "n"),
                                ExprSyntax::int(1, sp()),
                            )],
                        ),
                    )),
                    sp(),
                ))),
            },
            sp(),
        )];
        vec![function(c, "fact", vec![formal(c, "n", None)], body)]
    });
    let result = comp.eval_expression(&call(&comp, "fact", vec![ExprSyntax::int(5, sp())]), scope);
    assert_int(result, 120);
    assert!(!comp.has_errors());
}

#[test]
fn unbounded_recursion_hits_depth_limit() {
    let (comp, scope) = setup_opts(
        CompilationOptions {
            max_call_depth: 16,
            ..CompilationOptions::default()
        },
        |c| {
            // function int r(int n); return r(n);
            vec![function(
                c,
                "r",
                vec![formal(c, "n", None)],
                vec![StmtSyntax::ret(
                    Some(call(c, "r", vec![ident(c, "n")])),
                    sp(),
                )],
            )]
        },
    );
    let result = comp.eval_expression(&call(&comp, "r", vec![ExprSyntax::int(0, sp())]), scope);
    assert_eq!(result, ConstantValue::Invalid);
    assert!(comp.has_diagnostic(ErrorCode::E5901));
}

#[test]
fn infinite_loop_hits_step_budget() {
    let (comp, scope) = setup_opts(
        CompilationOptions {
            max_steps: 1000,
            ..CompilationOptions::default()
        },
        |c| {
            // function int spin(); for (;;) begin end return 1;
            vec![function(
                c,
                "spin",
                vec![],
                vec![
                    StmtSyntax::new(
                        StmtSyntaxKind::For {
                            init: vec![],
                            cond: None,
                            steps: vec![],
                            body: Box::new(StmtSyntax::new(
                                StmtSyntaxKind::Block {
                                    label: None,
                                    body: vec![],
                                },
                                sp(),
                            )),
                        },
                        sp(),
                    ),
                    StmtSyntax::ret(Some(ExprSyntax::int(1, sp())), sp()),
                ],
            )]
        },
    );
    let result = comp.eval_expression(&call(&comp, "spin", vec![]), scope);
    assert_eq!(result, ConstantValue::Invalid);
    assert!(comp.has_diagnostic(ErrorCode::E5902));
}

#[test]
fn parameters_resolve_through_dependencies() {
    let (comp, scope) = setup(|c| {
        vec![
            param(c, "P", ExprSyntax::int(4, sp())),
            param(
                c,
                "Q",
                ExprSyntax::binary(BinaryOpSyntax::Add, ident(c, "P"), ExprSyntax::int(1, sp())),
            ),
        ]
    });
    assert_int(comp.eval_expression(&ident(&comp, "Q"), scope), 5);
    assert!(!comp.has_errors());
}

#[test]
fn cyclic_parameters_are_diagnosed() {
    let (comp, scope) = setup(|c| {
        vec![
            param(c, "P", ident(c, "Q")),
            param(c, "Q", ident(c, "P")),
        ]
    });
    assert_eq!(
        comp.eval_expression(&ident(&comp, "P"), scope),
        ConstantValue::Invalid
    );
    assert!(comp.has_diagnostic(ErrorCode::E4008));
}

#[test]
fn enum_member_values_count_from_initializers() {
    let (comp, scope) = setup(|c| {
        let enum_ty = DataTypeSyntax::new(
            DataTypeSyntaxKind::Enum {
                base: None,
                members: vec![
                    EnumMemberSyntax {
                        name: c.name("A"),
                        span: sp(),
                        init: None,
                    },
                    EnumMemberSyntax {
                        name: c.name("B"),
                        span: sp(),
                        init: Some(ExprSyntax::int(5, sp())),
                    },
                    EnumMemberSyntax {
                        name: c.name("C"),
                        span: sp(),
                        init: None,
                    },
                ],
            },
            sp(),
        );
        vec![MemberSyntax::new(
            MemberSyntaxKind::Typedef(TypedefSyntax {
                name: c.name("e_t"),
                name_span: sp(),
                ty: enum_ty,
            }),
            sp(),
        )]
    });
    assert_int(comp.eval_expression(&ident(&comp, "A"), scope), 0);
    assert_int(comp.eval_expression(&ident(&comp, "B"), scope), 5);
    assert_int(comp.eval_expression(&ident(&comp, "C"), scope), 6);
}

#[test]
fn clog2_of_constants() {
    let (comp, scope) = setup(|_| vec![]);
    assert_int(
        comp.eval_expression(&call(&comp, "$clog2", vec![ExprSyntax::int(9, sp())]), scope),
        4,
    );
    assert_int(
        comp.eval_expression(&call(&comp, "$clog2", vec![ExprSyntax::int(1, sp())]), scope),
        0,
    );
}

#[test]
fn bits_of_a_data_type() {
    let (comp, scope) = setup(|_| vec![]);
    let ty_arg = ExprSyntax::new(
        ExprSyntaxKind::DataType(Box::new(int_ty())),
        sp(),
    );
    assert_int(
        comp.eval_expression(&call(&comp, "$bits", vec![ty_arg]), scope),
        32,
    );

    let packed = DataTypeSyntax::new(
        DataTypeSyntaxKind::Keyword {
            keyword: TypeKeyword::Logic,
            signing: None,
            packed_dims: vec![(ExprSyntax::int(7, sp()), ExprSyntax::int(0, sp()))],
        },
        sp(),
    );
    let ty_arg = ExprSyntax::new(ExprSyntaxKind::DataType(Box::new(packed)), sp());
    assert_int(
        comp.eval_expression(&call(&comp, "$bits", vec![ty_arg]), scope),
        8,
    );
}

#[test]
fn unknown_system_subroutine() {
    let (comp, scope) = setup(|_| vec![]);
    let result = comp.eval_expression(&call(&comp, "$mystery", vec![]), scope);
    assert_eq!(result, ConstantValue::Invalid);
    assert!(comp.has_diagnostic(ErrorCode::E4005));
}

#[test]
fn queue_defaults_to_empty() {
    // function int q(); int qq[$]; return qq.size();
    let (comp, scope) = setup(|c| {
        vec![function(
            c,
            "q",
            vec![],
            vec![
                local(c, "qq", int_ty(), vec![DimensionSyntax::Queue]),
                StmtSyntax::ret(Some(method_call(ident(c, "qq"), "size", c)), sp()),
            ],
        )]
    });
    assert_int(comp.eval_expression(&call(&comp, "q", vec![]), scope), 0);
}

fn fixed_array_body(c: &Compilation, result: ExprSyntax) -> Vec<StmtSyntax> {
    vec![
        local(
            c,
            "arr",
            int_ty(),
            vec![DimensionSyntax::Range(
                ExprSyntax::int(0, sp()),
                ExprSyntax::int(2, sp()),
            )],
        ),
        assign_stmt(index(ident(c, "arr"), 0), ExprSyntax::int(1, sp())),
        assign_stmt(index(ident(c, "arr"), 1), ExprSyntax::int(2, sp())),
        assign_stmt(index(ident(c, "arr"), 2), ExprSyntax::int(3, sp())),
        StmtSyntax::ret(Some(result), sp()),
    ]
}

#[test]
fn array_sum_over_elements() {
    let (comp, scope) = setup(|c| {
        let sum = method_call(ident(c, "arr"), "sum", c);
        vec![function(c, "g", vec![], fixed_array_body(c, sum))]
    });
    assert_int(comp.eval_expression(&call(&comp, "g", vec![]), scope), 6);
    assert!(!comp.has_errors());
}

#[test]
fn array_sum_with_iteration_expression() {
    // arr.sum(x) with (x * 2)
    let (comp, scope) = setup(|c| {
        let sum = ExprSyntax::new(
            ExprSyntaxKind::Call {
                callee: Box::new(ExprSyntax::new(
                    ExprSyntaxKind::MemberAccess {
                        value: Box::new(ident(c, "arr")),
                        member: c.name("sum"),
                        member_span: sp(),
                    },
                    sp(),
                )),
                args: vec![ArgSyntax::ordered(ident(c, "x"))],
                with_clause: Some(Box::new(silica_syntax::ast::WithClauseSyntax {
                    with_span: sp(),
                    expr: ExprSyntax::binary(
                        BinaryOpSyntax::Multiply,
                        ident(c, "x"),
                        ExprSyntax::int(2, sp()),
                    ),
                })),
            },
            sp(),
        );
        vec![function(c, "g", vec![], fixed_array_body(c, sum))]
    });
    assert_int(comp.eval_expression(&call(&comp, "g", vec![]), scope), 12);
    assert!(!comp.has_errors());
}

#[test]
fn find_requires_a_with_clause() {
    let (comp, scope) = setup(|c| {
        let find = method_call(ident(c, "arr"), "find", c);
        vec![function(c, "g", vec![], fixed_array_body(c, find))]
    });
    assert_eq!(
        comp.eval_expression(&call(&comp, "g", vec![]), scope),
        ConstantValue::Invalid
    );
    assert!(comp.has_diagnostic(ErrorCode::E4210));
}

#[test]
fn undeclared_identifier() {
    let (comp, scope) = setup(|_| vec![]);
    assert_eq!(
        comp.eval_expression(&ident(&comp, "nope"), scope),
        ConstantValue::Invalid
    );
    assert!(comp.has_diagnostic(ErrorCode::E4001));
}

#[test]
fn calling_a_non_subroutine() {
    let (comp, scope) = setup(|c| vec![param(c, "P", ExprSyntax::int(1, sp()))]);
    let result = comp.eval_expression(&call(&comp, "P", vec![]), scope);
    assert_eq!(result, ConstantValue::Invalid);
    assert!(comp.has_diagnostic(ErrorCode::E4004));
}

#[test]
fn duplicate_definitions_are_reported() {
    let (comp, scope) = setup(|c| {
        vec![
            param(c, "P", ExprSyntax::int(1, sp())),
            param(c, "P", ExprSyntax::int(2, sp())),
        ]
    });
    // Force materialization of the module scope.
    let _ = comp.eval_expression(&ident(&comp, "P"), scope);
    assert!(comp.has_diagnostic(ErrorCode::E4006));
}

#[test]
fn string_cannot_initialize_int_parameter() {
    let (comp, scope) = setup(|c| {
        vec![param(
            c,
            "P",
            ExprSyntax::new(ExprSyntaxKind::StringLiteral("hi".into()), sp()),
        )]
    });
    assert_eq!(
        comp.eval_expression(&ident(&comp, "P"), scope),
        ConstantValue::Invalid
    );
    assert!(comp.has_diagnostic(ErrorCode::E4101));
}

#[test]
fn hierarchical_name_in_constant_expression() {
    // top.v resolves fine; asking for its constant value is the error.
    let (comp, scope) = setup(|c| {
        vec![var(c, "v", int_ty(), Some(ExprSyntax::int(1, sp())))]
    });
    let expr = ExprSyntax::new(
        ExprSyntaxKind::HierarchicalName(vec![comp.name("top"), comp.name("v")]),
        sp(),
    );
    assert_eq!(comp.eval_expression(&expr, scope), ConstantValue::Invalid);
    assert!(comp.has_diagnostic(ErrorCode::E5002));
    assert!(!comp.has_diagnostic(ErrorCode::E4001));
}

#[test]
fn hierarchical_name_binds_outside_constant_contexts() {
    let (comp, scope) = setup(|c| {
        vec![var(c, "v", int_ty(), Some(ExprSyntax::int(1, sp())))]
    });
    let expr = ExprSyntax::new(
        ExprSyntaxKind::HierarchicalName(vec![comp.name("top"), comp.name("v")]),
        sp(),
    );
    let bound = comp.bind_expression(&expr, scope);
    assert!(!bound.is_invalid());
    assert!(!comp.has_errors());
}

#[test]
fn package_qualified_parameter() {
    let comp = Compilation::new();
    let pkg = MemberSyntax::new(
        MemberSyntaxKind::Package(PackageDeclSyntax {
            name: comp.name("p"),
            name_span: sp(),
            members: vec![param(&comp, "W", ExprSyntax::int(8, sp()))],
        }),
        sp(),
    );
    comp.add_unit(CompilationUnitSyntax { members: vec![pkg] });
    let expr = ExprSyntax::new(
        ExprSyntaxKind::HierarchicalName(vec![comp.name("p"), comp.name("W")]),
        sp(),
    );
    assert_int(comp.eval_expression(&expr, comp.root_scope()), 8);
    assert!(!comp.has_errors());
}

#[test]
fn tasks_cannot_be_constant_evaluated() {
    let (comp, scope) = setup(|c| {
        vec![MemberSyntax::new(
            MemberSyntaxKind::Subroutine(SubroutineDeclSyntax {
                kind: SubroutineKind::Task,
                name: c.name("t"),
                name_span: sp(),
                lifetime: None,
                modifiers: Vec::new(),
                return_type: None,
                formals: vec![],
                body: vec![],
            }),
            sp(),
        )]
    });
    assert_eq!(
        comp.eval_expression(&call(&comp, "t", vec![]), scope),
        ConstantValue::Invalid
    );
    assert!(comp.has_diagnostic(ErrorCode::E5004));
}

#[test]
fn output_arguments_disqualify_constant_functions() {
    let (comp, scope) = setup(|c| {
        let mut out_arg = formal(c, "o", None);
        out_arg.direction = ArgDirection::Out;
        vec![
            function(
                c,
                "f",
                vec![out_arg],
                vec![StmtSyntax::ret(Some(ExprSyntax::int(0, sp())), sp())],
            ),
            // Wrapper supplies a local variable for the output argument.
            function(
                c,
                "g",
                vec![],
                vec![
                    local(c, "x", int_ty(), vec![]),
                    StmtSyntax::ret(Some(call(c, "f", vec![ident(c, "x")])), sp()),
                ],
            ),
        ]
    });
    let result = comp.eval_expression(&call(&comp, "g", vec![]), scope);
    assert_eq!(result, ConstantValue::Invalid);
    assert!(comp.has_diagnostic(ErrorCode::E5009));
}

#[test]
fn nonlocal_variables_are_rejected_in_constant_functions() {
    let (comp, scope) = setup(|c| {
        vec![
            var(c, "v", int_ty(), Some(ExprSyntax::int(3, sp()))),
            function(
                c,
                "f",
                vec![],
                vec![StmtSyntax::ret(Some(ident(c, "v")), sp())],
            ),
        ]
    });
    assert_eq!(
        comp.eval_expression(&call(&comp, "f", vec![]), scope),
        ConstantValue::Invalid
    );
    assert!(comp.has_diagnostic(ErrorCode::E5011));
}

#[test]
fn disable_exits_the_named_block() {
    // f = 1; begin : blk  f = 2; disable blk; f = 3; end  return;
    let (comp, scope) = setup(|c| {
        let body = vec![
            assign_stmt(ident(c, "f"), ExprSyntax::int(1, sp())),
            StmtSyntax::new(
                StmtSyntaxKind::Block {
                    label: Some(c.name("blk")),
                    body: vec![
                        assign_stmt(ident(c, "f"), ExprSyntax::int(2, sp())),
                        StmtSyntax::new(
                            StmtSyntaxKind::Disable {
                                target: c.name("blk"),
                                target_span: sp(),
                            },
                            sp(),
                        ),
                        assign_stmt(ident(c, "f"), ExprSyntax::int(3, sp())),
                    ],
                },
                sp(),
            ),
            StmtSyntax::ret(None, sp()),
        ];
        vec![function(c, "f", vec![], body)]
    });
    assert_int(comp.eval_expression(&call(&comp, "f", vec![]), scope), 2);
    assert!(!comp.has_errors());
}

#[test]
fn disabling_the_function_acts_as_return() {
    let (comp, scope) = setup(|c| {
        let body = vec![
            assign_stmt(ident(c, "f"), ExprSyntax::int(7, sp())),
            StmtSyntax::new(
                StmtSyntaxKind::Disable {
                    target: c.name("f"),
                    target_span: sp(),
                },
                sp(),
            ),
            assign_stmt(ident(c, "f"), ExprSyntax::int(9, sp())),
        ];
        vec![function(c, "f", vec![], body)]
    });
    assert_int(comp.eval_expression(&call(&comp, "f", vec![]), scope), 7);
}

#[test]
fn unknown_condition_takes_the_else_branch() {
    // function int u(); logic l; if (l) return 1; else return 0;
    let (comp, scope) = setup(|c| {
        vec![function(
            c,
            "u",
            vec![],
            vec![
                local(c, "l", DataTypeSyntax::keyword(TypeKeyword::Logic, sp()), vec![]),
                StmtSyntax::new(
                    StmtSyntaxKind::If {
                        cond: ident(c, "l"),
                        then_stmt: Box::new(StmtSyntax::ret(Some(ExprSyntax::int(1, sp())), sp())),
                        else_stmt: Some(Box::new(StmtSyntax::ret(
                            Some(ExprSyntax::int(0, sp())),
                            sp(),
                        ))),
                    },
                    sp(),
                ),
            ],
        )]
    });
    assert_int(comp.eval_expression(&call(&comp, "u", vec![]), scope), 0);
}

#[test]
fn division_by_zero_poisons_the_result() {
    let (comp, scope) = setup(|_| vec![]);
    let expr = ExprSyntax::binary(
        BinaryOpSyntax::Divide,
        ExprSyntax::int(1, sp()),
        ExprSyntax::int(0, sp()),
    );
    match comp.eval_expression(&expr, scope) {
        ConstantValue::Integer(v) => assert!(v.has_unknown()),
        other => panic!("expected poisoned integer, got {other:?}"),
    }
    assert!(comp.has_diagnostic(ErrorCode::E5014));
}

#[test]
fn script_mode_folds_variable_initializers() {
    let (comp, scope) = setup(|c| {
        vec![var(c, "v", int_ty(), Some(ExprSyntax::int(10, sp())))]
    });
    let expr = ExprSyntax::binary(BinaryOpSyntax::Add, ident(&comp, "v"), ExprSyntax::int(1, sp()));
    assert_int(comp.eval_expression(&expr, scope), 11);
}

#[test]
fn use_before_declaration_in_procedural_code() {
    // function int f(); return x; int x;
    let (comp, scope) = setup(|c| {
        vec![function(
            c,
            "f",
            vec![],
            vec![
                StmtSyntax::ret(Some(ident(c, "x")), sp()),
                local(c, "x", int_ty(), vec![]),
            ],
        )]
    });
    assert_eq!(
        comp.eval_expression(&call(&comp, "f", vec![]), scope),
        ConstantValue::Invalid
    );
    assert!(comp.has_diagnostic(ErrorCode::E4001));
}

#[test]
fn struct_fields_assign_and_read_back() {
    // typedef struct { int a; int b; } s_t;
    // function int f(); s_t s; s.a = 3; s.b = 4; return s.a + s.b;
    let (comp, scope) = setup(|c| {
        let struct_ty = DataTypeSyntax::new(
            DataTypeSyntaxKind::Struct {
                fields: vec![
                    StructFieldSyntax {
                        name: c.name("a"),
                        span: sp(),
                        ty: int_ty(),
                    },
                    StructFieldSyntax {
                        name: c.name("b"),
                        span: sp(),
                        ty: int_ty(),
                    },
                ],
            },
            sp(),
        );
        let field = |c: &Compilation, f: &str| {
            ExprSyntax::new(
                ExprSyntaxKind::MemberAccess {
                    value: Box::new(ident(c, "s")),
                    member: c.name(f),
                    member_span: sp(),
                },
                sp(),
            )
        };
        vec![
            MemberSyntax::new(
                MemberSyntaxKind::Typedef(TypedefSyntax {
                    name: c.name("s_t"),
                    name_span: sp(),
                    ty: struct_ty,
                }),
                sp(),
            ),
            function(
                c,
                "f",
                vec![],
                vec![
                    local(c, "s", DataTypeSyntax::named(c.name("s_t"), sp()), vec![]),
                    assign_stmt(field(c, "a"), ExprSyntax::int(3, sp())),
                    assign_stmt(field(c, "b"), ExprSyntax::int(4, sp())),
                    StmtSyntax::ret(
                        Some(ExprSyntax::binary(
                            BinaryOpSyntax::Add,
                            field(c, "a"),
                            field(c, "b"),
                        )),
                        sp(),
                    ),
                ],
            ),
        ]
    });
    assert_int(comp.eval_expression(&call(&comp, "f", vec![]), scope), 7);
    assert!(!comp.has_errors());
}

#[test]
fn cast_rounds_real_to_int() {
    let (comp, scope) = setup(|_| vec![]);
    let expr = ExprSyntax::new(
        ExprSyntaxKind::Cast {
            ty: Box::new(int_ty()),
            operand: Box::new(ExprSyntax::new(ExprSyntaxKind::RealLiteral(3.7), sp())),
        },
        sp(),
    );
    assert_int(comp.eval_expression(&expr, scope), 4);
}

#[test]
fn automatic_lifetime_outside_procedural_code_is_rejected() {
    let (comp, scope) = setup(|c| {
        vec![MemberSyntax::new(
            MemberSyntaxKind::Variable(VarDeclSyntax {
                name: c.name("v"),
                name_span: sp(),
                ty: int_ty(),
                dims: Vec::new(),
                lifetime: Some(Lifetime::Automatic),
                is_const: false,
                init: Some(ExprSyntax::int(1, sp())),
            }),
            sp(),
        )]
    });
    comp.scope_members(scope);
    assert!(comp.has_diagnostic(ErrorCode::E4401));
}

#[test]
fn const_variable_requires_an_initializer() {
    let (comp, scope) = setup(|c| {
        vec![MemberSyntax::new(
            MemberSyntaxKind::Variable(VarDeclSyntax {
                name: c.name("k"),
                name_span: sp(),
                ty: int_ty(),
                dims: Vec::new(),
                lifetime: None,
                is_const: true,
                init: None,
            }),
            sp(),
        )]
    });
    comp.scope_members(scope);
    assert!(comp.has_diagnostic(ErrorCode::E4402));
}

#[test]
fn argument_assigned_both_positionally_and_by_name() {
    // f(3, .a(4)): 'a' already got the positional 3.
    let (comp, scope) = setup(|c| vec![adder(c)]);
    let expr = ExprSyntax::call(
        ident(&comp, "f"),
        vec![
            ArgSyntax::ordered(ExprSyntax::int(3, sp())),
            ArgSyntax::named(comp.name("a"), sp(), Some(ExprSyntax::int(4, sp())), sp()),
        ],
        sp(),
    );
    assert_eq!(comp.eval_expression(&expr, scope), ConstantValue::Invalid);
    assert!(comp.has_diagnostic(ErrorCode::E4203));
    assert!(!comp.has_diagnostic(ErrorCode::E4204));
}

#[test]
fn unconnected_formal_in_a_named_call() {
    // f(.b(1)) leaves 'a' without a value; each gap is reported on its
    // own once names are involved.
    let (comp, scope) = setup(|c| vec![adder(c)]);
    let expr = ExprSyntax::call(
        ident(&comp, "f"),
        vec![ArgSyntax::named(
            comp.name("b"),
            sp(),
            Some(ExprSyntax::int(1, sp())),
            sp(),
        )],
        sp(),
    );
    assert_eq!(comp.eval_expression(&expr, scope), ConstantValue::Invalid);
    assert!(comp.has_diagnostic(ErrorCode::E4205));
    assert!(!comp.has_diagnostic(ErrorCode::E4201));
}

#[test]
fn packed_bit_select_reads_from_the_low_bit() {
    // function int f(); logic [7:0] v; v = 1; return v[0];
    let (comp, scope) = setup(|c| {
        let packed = DataTypeSyntax::new(
            DataTypeSyntaxKind::Keyword {
                keyword: TypeKeyword::Logic,
                signing: None,
                packed_dims: vec![(ExprSyntax::int(7, sp()), ExprSyntax::int(0, sp()))],
            },
            sp(),
        );
        vec![function(
            c,
            "f",
            vec![],
            vec![
                local(c, "v", packed, vec![]),
                assign_stmt(ident(c, "v"), ExprSyntax::int(1, sp())),
                StmtSyntax::ret(Some(index(ident(c, "v"), 0)), sp()),
            ],
        )]
    });
    assert_int(comp.eval_expression(&call(&comp, "f", vec![]), scope), 1);
    assert!(!comp.has_errors());
}

#[test]
fn functions_inside_generate_blocks_are_not_constant() {
    let (comp, scope) = setup(|c| {
        vec![MemberSyntax::new(
            MemberSyntaxKind::GenerateBlock(GenerateBlockSyntax {
                label: Some(c.name("g")),
                members: vec![function(
                    c,
                    "f",
                    vec![],
                    vec![StmtSyntax::ret(Some(ExprSyntax::int(1, sp())), sp())],
                )],
            }),
            sp(),
        )]
    });
    let Some(gen) = comp.scope_find(scope, Namespace::Members, comp.name("g")) else {
        panic!("generate block did not materialize");
    };
    let Some(gen_scope) = comp.symbol(gen).owned_scope() else {
        panic!("generate block has no scope");
    };
    assert_eq!(
        comp.eval_expression(&call(&comp, "f", vec![]), gen_scope),
        ConstantValue::Invalid
    );
    assert!(comp.has_diagnostic(ErrorCode::E5010));
}

#[test]
fn parameter_declared_after_the_point_of_use() {
    // parameter Q = f(); function int f(); return P; parameter P = 5;
    // P is not fixed yet where Q's value is requested.
    let (comp, scope) = setup(|c| {
        vec![
            param(c, "Q", call(c, "f", vec![])),
            function(
                c,
                "f",
                vec![],
                vec![StmtSyntax::ret(Some(ident(c, "P")), sp())],
            ),
            param(c, "P", ExprSyntax::int(5, sp())),
        ]
    });
    assert_eq!(
        comp.eval_expression(&ident(&comp, "Q"), scope),
        ConstantValue::Invalid
    );
    assert!(comp.has_diagnostic(ErrorCode::E5012));
}

#[test]
fn call_site_after_the_parameter_sees_it() {
    // The same body is fine when the call comes after both declarations.
    let (comp, scope) = setup(|c| {
        vec![
            function(
                c,
                "f",
                vec![],
                vec![StmtSyntax::ret(Some(ident(c, "P")), sp())],
            ),
            param(c, "P", ExprSyntax::int(5, sp())),
        ]
    });
    assert_int(comp.eval_expression(&call(&comp, "f", vec![]), scope), 5);
    assert!(!comp.has_errors());
}

#[test]
fn enum_value_declared_after_the_point_of_use() {
    let (comp, scope) = setup(|c| {
        let enum_ty = DataTypeSyntax::new(
            DataTypeSyntaxKind::Enum {
                base: None,
                members: vec![EnumMemberSyntax {
                    name: c.name("A"),
                    span: sp(),
                    init: Some(ExprSyntax::int(3, sp())),
                }],
            },
            sp(),
        );
        vec![
            param(c, "Q", call(c, "f", vec![])),
            function(
                c,
                "f",
                vec![],
                vec![StmtSyntax::ret(Some(ident(c, "A")), sp())],
            ),
            MemberSyntax::new(
                MemberSyntaxKind::Typedef(TypedefSyntax {
                    name: c.name("e_t"),
                    name_span: sp(),
                    ty: enum_ty,
                }),
                sp(),
            ),
        ]
    });
    assert_eq!(
        comp.eval_expression(&ident(&comp, "Q"), scope),
        ConstantValue::Invalid
    );
    assert!(comp.has_diagnostic(ErrorCode::E5012));
}

#[test]
fn empty_argument_to_a_system_function() {
    let (comp, scope) = setup(|_| vec![]);
    let expr = ExprSyntax::call(ident(&comp, "$clog2"), vec![ArgSyntax::empty(sp())], sp());
    assert_eq!(comp.eval_expression(&expr, scope), ConstantValue::Invalid);
    assert!(comp.has_diagnostic(ErrorCode::E4206));
}

fn class_decl(
    comp: &Compilation,
    name: &str,
    base: Option<&str>,
    members: Vec<MemberSyntax>,
) -> MemberSyntax {
    MemberSyntax::new(
        MemberSyntaxKind::Class(ClassDeclSyntax {
            name: comp.name(name),
            name_span: sp(),
            is_interface: false,
            base: base.map(|b| comp.name(b)),
            implements: vec![],
            members,
        }),
        sp(),
    )
}

fn class_scope(comp: &Compilation, module: ScopeId, name: &str) -> ScopeId {
    let Some(sym) = comp.scope_find(module, Namespace::Members, comp.name(name)) else {
        panic!("class '{name}' did not materialize");
    };
    let Some(scope) = comp.symbol(sym).owned_scope() else {
        panic!("class '{name}' has no scope");
    };
    scope
}

#[test]
fn derived_class_reaches_inherited_property() {
    // Referencing B.x from inside D (which extends B) is base-class
    // access, not a reach into an unrelated class.
    let (comp, scope) = setup(|c| {
        vec![
            class_decl(c, "B", None, vec![var(c, "x", int_ty(), None)]),
            class_decl(c, "D", Some("B"), vec![]),
        ]
    });
    let d_scope = class_scope(&comp, scope, "D");
    let expr = ExprSyntax::new(
        ExprSyntaxKind::HierarchicalName(vec![comp.name("B"), comp.name("x")]),
        sp(),
    );
    let bound = comp.bind_expression(&expr, d_scope);
    assert!(!bound.is_invalid());
    assert!(!comp.has_diagnostic(ErrorCode::E4303));
}

#[test]
fn static_method_cannot_read_an_instance_property() {
    // class B { int x; static function int g(); return x; endfunction }
    let (comp, scope) = setup(|c| {
        let g = SubroutineDeclSyntax {
            kind: SubroutineKind::Function,
            name: c.name("g"),
            name_span: sp(),
            lifetime: Some(Lifetime::Automatic),
            modifiers: vec![MethodModifier::Static],
            return_type: Some(int_ty()),
            formals: vec![],
            body: vec![StmtSyntax::ret(Some(ident(c, "x")), sp())],
        };
        vec![class_decl(
            c,
            "B",
            None,
            vec![
                var(c, "x", int_ty(), None),
                MemberSyntax::new(MemberSyntaxKind::Subroutine(g), sp()),
            ],
        )]
    });
    let b_scope = class_scope(&comp, scope, "B");
    assert_eq!(
        comp.eval_expression(&call(&comp, "g", vec![]), b_scope),
        ConstantValue::Invalid
    );
    assert!(comp.has_diagnostic(ErrorCode::E4302));
    assert!(!comp.has_diagnostic(ErrorCode::E4303));
}

#[test]
fn assignment_to_a_parameter_is_rejected() {
    let (comp, scope) = setup(|c| {
        vec![
            param(c, "P", ExprSyntax::int(1, sp())),
            function(
                c,
                "f",
                vec![],
                vec![
                    assign_stmt(ident(c, "P"), ExprSyntax::int(2, sp())),
                    StmtSyntax::ret(Some(ExprSyntax::int(0, sp())), sp()),
                ],
            ),
        ]
    });
    let _ = comp.eval_expression(&call(&comp, "f", vec![]), scope);
    assert!(comp.has_diagnostic(ErrorCode::E4103));
}
