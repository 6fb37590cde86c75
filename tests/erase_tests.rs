use jerase::{transform, Config};

fn erase(source: &str) -> String {
    transform(source, &Config::default()).expect("transform failed")
}

#[test]
fn test_end_to_end_example() {
    let source = r#"
        public class Sample {
            void m() {
                String s = "a";
                s = build();
            }
        }
    "#;

    let output = erase(source);
    assert!(output.contains("Object s = (String) \"a\";"), "{}", output);
    assert!(output.contains("s = (String) build();"), "{}", output);
}

#[test]
fn test_cross_method_independence() {
    let source = r#"
        public class Sample {
            void a() {
                int n = 1;
                n = calc();
            }
            void b() {
                n = calc();
            }
        }
    "#;

    let output = erase(source);
    // a()'s reassignment gets the cast
    assert_eq!(output.matches("(int) calc()").count(), 1, "{}", output);
    // b()'s n was never declared in b's scope, so it stays bare
    assert!(output.contains("n = calc();"), "{}", output);
}

#[test]
fn test_scope_isolation_same_name_different_types() {
    let source = r#"
        public class Sample {
            void f() {
                A x = null;
                x = make();
            }
            void g() {
                B x = null;
                x = make();
            }
        }
    "#;

    let output = erase(source);
    assert_eq!(output.matches("x = (A) make();").count(), 1, "{}", output);
    assert_eq!(output.matches("x = (B) make();").count(), 1, "{}", output);
}

#[test]
fn test_fields_and_parameters_unchanged() {
    let source = r#"
        import java.util.List;
        import java.util.ArrayList;

        public class Sample {
            private List<String> items = new ArrayList<>();
            protected int counter;

            void m(String arg, int[] data) {
            }
        }
    "#;

    let output = erase(source);
    assert!(
        output.contains("private List<String> items = new ArrayList<>();"),
        "{}",
        output
    );
    assert!(output.contains("protected int counter;"), "{}", output);
    assert!(output.contains("void m(String arg, int[] data)"), "{}", output);
}

#[test]
fn test_every_local_declaration_erased() {
    let source = r#"
        public class Sample {
            void m() {
                int a = 1, b = 2;
                String s;
                for (int i = 0; i < 10; i++) {
                }
            }
        }
    "#;

    let output = erase(source);
    assert!(
        output.contains("Object a = (int) 1, b = (int) 2;"),
        "{}",
        output
    );
    assert!(output.contains("Object s;"), "{}", output);
    assert!(output.contains("for (Object i = (int) 0; "), "{}", output);
}

#[test]
fn test_declaration_without_initializer_still_tracked() {
    let source = r#"
        public class Sample {
            void m() {
                String s;
                s = build();
            }
        }
    "#;

    let output = erase(source);
    assert!(output.contains("Object s;"), "{}", output);
    assert!(output.contains("s = (String) build();"), "{}", output);
}

#[test]
fn test_non_target_assignment_shapes_untouched() {
    let source = r#"
        public class Sample {
            int field;

            void m() {
                int x = 0;
                int[] arr = null;
                Sample obj = null;
                obj.field = compute();
                arr[0] = compute();
                x += compute();
            }
        }
    "#;

    let output = erase(source);
    assert!(output.contains("obj.field = compute();"), "{}", output);
    assert!(output.contains("arr[0] = compute();"), "{}", output);
    assert!(output.contains("x += compute();"), "{}", output);
}

#[test]
fn test_only_direct_call_values_rewritten() {
    let source = r#"
        public class Sample {
            void m() {
                int x = 0;
                x = next() + 1;
                x = (next());
            }
        }
    "#;

    let output = erase(source);
    // Neither a call buried in arithmetic nor a parenthesized call is a
    // direct call value
    assert!(output.contains("x = next() + 1;"), "{}", output);
    assert!(output.contains("x = (next());"), "{}", output);
}

#[test]
fn test_initializer_grouping_preserved() {
    let source = r#"
        public class Sample {
            void m(int a, int b) {
                int x = a + b;
            }
        }
    "#;

    let output = erase(source);
    assert!(output.contains("Object x = (int) (a + b);"), "{}", output);
}

#[test]
fn test_generic_type_round_trips_through_cast() {
    let source = r#"
        import java.util.List;

        public class Sample {
            void m() {
                List<String> names = fetch();
                names = fetch();
            }
        }
    "#;

    let output = erase(source);
    assert!(
        output.contains("Object names = (List<String>) fetch();"),
        "{}",
        output
    );
    assert!(
        output.contains("names = (List<String>) fetch();"),
        "{}",
        output
    );
}

#[test]
fn test_redeclaration_last_binding_wins() {
    let source = r#"
        public class Sample {
            void m() {
                String s = "a";
                int s = 1;
                s = calc();
            }
        }
    "#;

    let output = erase(source);
    assert!(output.contains("s = (int) calc();"), "{}", output);
    assert!(!output.contains("s = (String) calc();"), "{}", output);
}

#[test]
fn test_enhanced_for_variable_erased() {
    let source = r#"
        import java.util.List;

        public class Sample {
            void m(List<String> list) {
                for (String s : list) {
                    use(s);
                }
            }
        }
    "#;

    let output = erase(source);
    assert!(output.contains("for (Object s : list)"), "{}", output);
}

#[test]
fn test_nested_blocks_share_method_scope() {
    let source = r#"
        public class Sample {
            void m(boolean flag) {
                String s = "a";
                if (flag) {
                    s = build();
                }
            }
        }
    "#;

    let output = erase(source);
    assert!(output.contains("s = (String) build();"), "{}", output);
}

#[test]
fn test_custom_top_type() {
    let source = r#"
        public class Sample {
            void m() {
                String s = "a";
            }
        }
    "#;

    let config = Config::default().with_top_type("Top");
    let output = transform(source, &config).expect("transform failed");
    assert!(output.contains("Top s = (String) \"a\";"), "{}", output);
}

#[test]
fn test_constructor_declarations_erased() {
    let source = r#"
        public class Sample {
            Sample() {
                String s = "a";
                s = build();
            }
        }
    "#;

    let output = erase(source);
    assert!(output.contains("Object s = (String) \"a\";"), "{}", output);
    assert!(output.contains("s = (String) build();"), "{}", output);
}

#[test]
fn test_parse_error_propagates() {
    let source = "public class Broken {";
    assert!(transform(source, &Config::default()).is_err());
}
