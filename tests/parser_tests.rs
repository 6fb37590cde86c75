use jerase::ast::*;
use jerase::parser::parse_java;

fn parse(source: &str) -> Ast {
    parse_java(source).expect("Failed to parse")
}

fn first_class(ast: &Ast) -> &ClassDecl {
    match ast.type_decls.first() {
        Some(TypeDecl::Class(class)) => class,
        other => panic!("expected a class declaration, got {:?}", other),
    }
}

fn method<'a>(class: &'a ClassDecl, name: &str) -> &'a MethodDecl {
    for member in &class.body {
        if let ClassMember::Method(method) = member {
            if method.name == name {
                return method;
            }
        }
    }
    panic!("no method named {}", name);
}

fn body_statements<'a>(class: &'a ClassDecl, name: &str) -> &'a [Stmt] {
    &method(class, name).body.as_ref().expect("no body").statements
}

#[test]
fn test_parse_control_flow_statements() {
    let source = r#"
        public class Flow {
            void m(int n) {
                if (n > 0) {
                    n--;
                } else {
                    n++;
                }
                while (n < 10) {
                    n++;
                }
                do {
                    n--;
                } while (n > 0);
                for (int i = 0; i < n; i++) {
                    continue;
                }
                switch (n) {
                    case 0:
                        break;
                    case 1:
                    case 2:
                        n = 3;
                        break;
                    default:
                        n = 4;
                }
                outer:
                while (true) {
                    break outer;
                }
            }
        }
    "#;

    let ast = parse(source);
    let statements = body_statements(first_class(&ast), "m");
    assert!(matches!(statements[0], Stmt::If(_)));
    assert!(matches!(statements[1], Stmt::While(_)));
    assert!(matches!(statements[2], Stmt::DoWhile(_)));
    assert!(matches!(statements[3], Stmt::For(_)));
    assert!(matches!(statements[4], Stmt::Switch(_)));
    assert!(matches!(statements[5], Stmt::Labeled(_)));

    if let Stmt::Switch(switch_stmt) = &statements[4] {
        assert_eq!(switch_stmt.cases.len(), 3);
        assert_eq!(switch_stmt.cases[1].labels.len(), 2);
        assert!(switch_stmt.cases[2].labels.is_empty(), "default has no labels");
    }
}

#[test]
fn test_parse_try_statements() {
    let source = r#"
        public class T {
            void m() {
                try {
                    risky();
                } catch (IllegalStateException | IllegalArgumentException e) {
                    recover();
                } finally {
                    cleanup();
                }
                try (Reader r = open(); Writer w = create()) {
                    copy(r, w);
                }
            }
        }
    "#;

    let ast = parse(source);
    let statements = body_statements(first_class(&ast), "m");

    match &statements[0] {
        Stmt::Try(try_stmt) => {
            assert_eq!(try_stmt.catch_clauses.len(), 1);
            assert_eq!(try_stmt.catch_clauses[0].alt_types.len(), 1);
            assert!(try_stmt.finally_block.is_some());
        }
        other => panic!("expected try, got {:?}", other),
    }
    match &statements[1] {
        Stmt::Try(try_stmt) => {
            assert_eq!(try_stmt.resources.len(), 2);
            assert!(try_stmt.catch_clauses.is_empty());
        }
        other => panic!("expected try-with-resources, got {:?}", other),
    }
}

#[test]
fn test_parse_multi_declarator_locals() {
    let source = r#"
        public class D {
            void m() {
                int a = 1, b, c[] = null;
            }
        }
    "#;

    let ast = parse(source);
    match &body_statements(first_class(&ast), "m")[0] {
        Stmt::Declaration(decl) => {
            assert_eq!(decl.type_ref.name, "int");
            assert_eq!(decl.variables.len(), 3);
            assert!(decl.variables[0].initializer.is_some());
            assert!(decl.variables[1].initializer.is_none());
            assert_eq!(decl.variables[2].array_dims, 1);
        }
        other => panic!("expected declaration, got {:?}", other),
    }
}

#[test]
fn test_parse_expression_precedence() {
    let source = r#"
        public class E {
            void m() {
                int x = 1 + 2 * 3;
            }
        }
    "#;

    let ast = parse(source);
    match &body_statements(first_class(&ast), "m")[0] {
        Stmt::Declaration(decl) => match decl.variables[0].initializer.as_ref() {
            Some(Expr::Binary(add)) => {
                assert_eq!(add.operator, BinaryOp::Add);
                match add.right.as_ref() {
                    Expr::Binary(mul) => assert_eq!(mul.operator, BinaryOp::Mul),
                    other => panic!("expected multiplication on the right, got {:?}", other),
                }
            }
            other => panic!("expected binary initializer, got {:?}", other),
        },
        other => panic!("expected declaration, got {:?}", other),
    }
}

#[test]
fn test_parse_cast_vs_parenthesized() {
    let source = r#"
        public class C {
            void m(int a, int b) {
                Object o = (String) name;
                int x = (a) + b;
                int y = (int) -a;
                Object p = ((List<String>) o).size();
            }
        }
    "#;

    let ast = parse(source);
    let statements = body_statements(first_class(&ast), "m");

    match &statements[0] {
        Stmt::Declaration(decl) => {
            assert!(
                matches!(decl.variables[0].initializer, Some(Expr::Cast(_))),
                "(String) name must parse as a cast"
            );
        }
        other => panic!("expected declaration, got {:?}", other),
    }
    match &statements[1] {
        Stmt::Declaration(decl) => match decl.variables[0].initializer.as_ref() {
            Some(Expr::Binary(add)) => {
                assert_eq!(add.operator, BinaryOp::Add);
                assert!(
                    matches!(add.left.as_ref(), Expr::Parenthesized(_, _)),
                    "(a) + b must parse as addition, not a cast"
                );
            }
            other => panic!("expected addition, got {:?}", other),
        },
        other => panic!("expected declaration, got {:?}", other),
    }
    match &statements[2] {
        Stmt::Declaration(decl) => match decl.variables[0].initializer.as_ref() {
            Some(Expr::Cast(cast)) => {
                assert_eq!(cast.target_type.name, "int");
                assert!(matches!(cast.expr.as_ref(), Expr::Unary(_)));
            }
            other => panic!("expected cast of unary minus, got {:?}", other),
        },
        other => panic!("expected declaration, got {:?}", other),
    }
    match &statements[3] {
        Stmt::Declaration(decl) => {
            assert!(
                matches!(decl.variables[0].initializer, Some(Expr::MethodCall(_))),
                "((List<String>) o).size() must parse as a call on a parenthesized cast"
            );
        }
        other => panic!("expected declaration, got {:?}", other),
    }
}

#[test]
fn test_parse_nested_generics() {
    let source = r#"
        import java.util.Map;
        import java.util.List;

        public class G {
            void m() {
                Map<String, List<String>> index = null;
                List<? extends Number> nums = null;
                List<?> anything = null;
            }
        }
    "#;

    let ast = parse(source);
    let statements = body_statements(first_class(&ast), "m");

    match &statements[0] {
        Stmt::Declaration(decl) => {
            assert_eq!(decl.type_ref.name, "Map");
            let args = decl.type_ref.type_args.as_ref().expect("type args");
            assert_eq!(args.len(), 2);
            match &args[1] {
                TypeArg::Type(inner) => {
                    assert_eq!(inner.name, "List");
                    assert!(inner.type_args.is_some());
                }
                other => panic!("expected nested type argument, got {:?}", other),
            }
        }
        other => panic!("expected declaration, got {:?}", other),
    }
    match &statements[1] {
        Stmt::Declaration(decl) => {
            let args = decl.type_ref.type_args.as_ref().expect("type args");
            assert!(matches!(&args[0], TypeArg::Wildcard(w) if w.bound.is_some()));
        }
        other => panic!("expected declaration, got {:?}", other),
    }
    match &statements[2] {
        Stmt::Declaration(decl) => {
            let args = decl.type_ref.type_args.as_ref().expect("type args");
            assert!(matches!(&args[0], TypeArg::Wildcard(w) if w.bound.is_none()));
        }
        other => panic!("expected declaration, got {:?}", other),
    }
}

#[test]
fn test_parse_shift_operators_still_work() {
    let source = r#"
        public class S {
            void m(int a) {
                int x = a >> 2;
                int y = a >>> 3;
                x >>= 1;
            }
        }
    "#;

    let ast = parse(source);
    let statements = body_statements(first_class(&ast), "m");
    match &statements[0] {
        Stmt::Declaration(decl) => match decl.variables[0].initializer.as_ref() {
            Some(Expr::Binary(shift)) => assert_eq!(shift.operator, BinaryOp::RShift),
            other => panic!("expected shift, got {:?}", other),
        },
        other => panic!("expected declaration, got {:?}", other),
    }
    match &statements[1] {
        Stmt::Declaration(decl) => match decl.variables[0].initializer.as_ref() {
            Some(Expr::Binary(shift)) => assert_eq!(shift.operator, BinaryOp::URShift),
            other => panic!("expected shift, got {:?}", other),
        },
        other => panic!("expected declaration, got {:?}", other),
    }
    match &statements[2] {
        Stmt::Expression(expr_stmt) => match &expr_stmt.expr {
            Expr::Assignment(assign) => assert_eq!(assign.operator, AssignmentOp::RShiftAssign),
            other => panic!("expected assignment, got {:?}", other),
        },
        other => panic!("expected expression statement, got {:?}", other),
    }
}

#[test]
fn test_parse_lambdas_and_method_references() {
    let source = r#"
        public class L {
            void m() {
                Runnable r = () -> run();
                Consumer c = x -> use(x);
                BiFunction f = (a, b) -> a;
                Function g = (String s) -> s.length();
                Supplier h = String::new;
                Function v = String::valueOf;
            }
        }
    "#;

    let ast = parse(source);
    let statements = body_statements(first_class(&ast), "m");

    let initializer = |idx: usize| -> &Expr {
        match &statements[idx] {
            Stmt::Declaration(decl) => decl.variables[0].initializer.as_ref().expect("initializer"),
            other => panic!("expected declaration, got {:?}", other),
        }
    };

    match initializer(0) {
        Expr::Lambda(lambda) => assert!(lambda.parameters.is_empty()),
        other => panic!("expected lambda, got {:?}", other),
    }
    match initializer(1) {
        Expr::Lambda(lambda) => {
            assert_eq!(lambda.parameters.len(), 1);
            assert!(lambda.parameters[0].type_ref.is_none());
        }
        other => panic!("expected lambda, got {:?}", other),
    }
    match initializer(2) {
        Expr::Lambda(lambda) => assert_eq!(lambda.parameters.len(), 2),
        other => panic!("expected lambda, got {:?}", other),
    }
    match initializer(3) {
        Expr::Lambda(lambda) => assert!(lambda.parameters[0].type_ref.is_some()),
        other => panic!("expected lambda, got {:?}", other),
    }
    match initializer(4) {
        Expr::MethodReference(method_ref) => assert!(method_ref.is_constructor),
        other => panic!("expected method reference, got {:?}", other),
    }
    match initializer(5) {
        Expr::MethodReference(method_ref) => {
            assert!(!method_ref.is_constructor);
            assert_eq!(method_ref.method_name, "valueOf");
        }
        other => panic!("expected method reference, got {:?}", other),
    }
}

#[test]
fn test_parse_array_creation_and_access() {
    let source = r#"
        public class A {
            void m() {
                int[] a = new int[3];
                int[][] b = new int[2][];
                int[] c = new int[] {1, 2, 3};
                a[0] = a[1];
            }
        }
    "#;

    let ast = parse(source);
    let statements = body_statements(first_class(&ast), "m");

    match &statements[0] {
        Stmt::Declaration(decl) => match decl.variables[0].initializer.as_ref() {
            Some(Expr::NewArray(new_array)) => {
                assert_eq!(new_array.dim_exprs.len(), 1);
                assert_eq!(new_array.extra_dims, 0);
            }
            other => panic!("expected array creation, got {:?}", other),
        },
        other => panic!("expected declaration, got {:?}", other),
    }
    match &statements[1] {
        Stmt::Declaration(decl) => match decl.variables[0].initializer.as_ref() {
            Some(Expr::NewArray(new_array)) => {
                assert_eq!(new_array.dim_exprs.len(), 1);
                assert_eq!(new_array.extra_dims, 1);
            }
            other => panic!("expected array creation, got {:?}", other),
        },
        other => panic!("expected declaration, got {:?}", other),
    }
    match &statements[2] {
        Stmt::Declaration(decl) => match decl.variables[0].initializer.as_ref() {
            Some(Expr::NewArray(new_array)) => {
                assert_eq!(new_array.initializer.as_ref().map(|v| v.len()), Some(3));
            }
            other => panic!("expected array creation, got {:?}", other),
        },
        other => panic!("expected declaration, got {:?}", other),
    }
    match &statements[3] {
        Stmt::Expression(expr_stmt) => match &expr_stmt.expr {
            Expr::Assignment(assign) => {
                assert!(matches!(assign.target.as_ref(), Expr::ArrayAccess(_)));
                assert!(matches!(assign.value.as_ref(), Expr::ArrayAccess(_)));
            }
            other => panic!("expected assignment, got {:?}", other),
        },
        other => panic!("expected expression statement, got {:?}", other),
    }
}

#[test]
fn test_parse_anonymous_class() {
    let source = r#"
        public class A {
            void m() {
                Runnable r = new Runnable() {
                    public void run() {
                        work();
                    }
                };
            }
        }
    "#;

    let ast = parse(source);
    match &body_statements(first_class(&ast), "m")[0] {
        Stmt::Declaration(decl) => match decl.variables[0].initializer.as_ref() {
            Some(Expr::New(new_expr)) => {
                let body = new_expr.anonymous_body.as_ref().expect("anonymous body");
                assert_eq!(body.len(), 1);
                assert!(matches!(body[0], ClassMember::Method(_)));
            }
            other => panic!("expected object creation, got {:?}", other),
        },
        other => panic!("expected declaration, got {:?}", other),
    }
}

#[test]
fn test_parse_type_declarations() {
    let source = r#"
        package com.example;

        public interface Shape {
            double area();

            default String describe() {
                return "shape";
            }
        }
    "#;

    let ast = parse(source);
    match ast.type_decls.first() {
        Some(TypeDecl::Interface(interface)) => {
            assert_eq!(interface.name, "Shape");
            assert_eq!(interface.body.len(), 2);
            match &interface.body[1] {
                InterfaceMember::Method(method) => {
                    assert!(method.modifiers.contains(&Modifier::Default));
                    assert!(method.body.is_some());
                }
                other => panic!("expected default method, got {:?}", other),
            }
        }
        other => panic!("expected interface, got {:?}", other),
    }
}

#[test]
fn test_parse_enum_declaration() {
    let source = r#"
        public enum Direction {
            NORTH, SOUTH("s"), EAST, WEST;

            private String code;

            Direction(String code) {
                this.code = code;
            }

            Direction() {
            }
        }
    "#;

    let ast = parse(source);
    match ast.type_decls.first() {
        Some(TypeDecl::Enum(enum_decl)) => {
            assert_eq!(enum_decl.constants.len(), 4);
            assert_eq!(enum_decl.constants[1].arguments.len(), 1);
            assert_eq!(enum_decl.body.len(), 3);
        }
        other => panic!("expected enum, got {:?}", other),
    }
}

#[test]
fn test_parse_annotations_on_members() {
    let source = r#"
        public class A {
            @Override
            public String toString() {
                return "A";
            }

            @SuppressWarnings("unchecked")
            void m(@Deprecated int x) {
            }
        }
    "#;

    let ast = parse(source);
    let class = first_class(&ast);
    assert_eq!(method(class, "toString").annotations.len(), 1);
    let m = method(class, "m");
    assert_eq!(m.annotations[0].name, "SuppressWarnings");
    assert_eq!(m.parameters[0].annotations.len(), 1);
}

#[test]
fn test_parse_literal_forms() {
    let source = r#"
        public class L {
            void m() {
                int hex = 0xFF;
                long big = 10_000_000L;
                double d = 1.5e3;
                float f = 2.5f;
                char tab = '\t';
                String text = "line\n";
            }
        }
    "#;

    let ast = parse(source);
    let statements = body_statements(first_class(&ast), "m");

    let literal = |idx: usize| -> &Literal {
        match &statements[idx] {
            Stmt::Declaration(decl) => match decl.variables[0].initializer.as_ref() {
                Some(Expr::Literal(literal)) => &literal.value,
                other => panic!("expected literal, got {:?}", other),
            },
            other => panic!("expected declaration, got {:?}", other),
        }
    };

    assert!(matches!(literal(0), Literal::Integer(255)));
    assert!(matches!(literal(1), Literal::Long(10_000_000)));
    assert!(matches!(literal(2), Literal::Double(_)));
    assert!(matches!(literal(3), Literal::Float(_)));
    assert!(matches!(literal(4), Literal::Char(c) if c == "\\t"));
    assert!(matches!(literal(5), Literal::String(s) if s == "line\\n"));
}

#[test]
fn test_parse_error_reports_location() {
    let source = "public class Broken {\n    void m( {\n}\n";
    let err = parse_java(source).expect_err("parse should fail");
    let message = err.to_string();
    assert!(message.contains("Parse error"), "{}", message);
}
