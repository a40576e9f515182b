mod common;

#[cfg(test)]
mod resolver_tests {
    use std::collections::HashMap;

    use rox::ast::{Expr, ExprId, Stmt};
    use rox::interpreter::Interpreter;
    use rox::resolver::Resolver;
    use rox::{Outcome, Session};

    use crate::common::{parse, run, SharedBuffer};

    /// Resolve `source`, returning the reported errors and the binding map.
    fn resolve(source: &str) -> (Vec<String>, HashMap<ExprId, usize>) {
        let (statements, syntax_errors) = parse(source);
        assert!(syntax_errors.is_empty(), "syntax errors: {:?}", syntax_errors);

        let mut interpreter = Interpreter::new();
        let mut errors: Vec<String> = Vec::new();
        let had_error = Resolver::new(&mut interpreter, &mut errors).resolve(&statements);

        assert_eq!(had_error, !errors.is_empty());
        (errors, interpreter.locals().clone())
    }

    fn static_errors(source: &str) -> Vec<String> {
        resolve(source).0
    }

    #[test]
    fn globals_are_left_unrecorded() {
        let (errors, locals) = resolve("var a = 1; print a; a = 2;");

        assert!(errors.is_empty());
        assert!(locals.is_empty());
    }

    #[test]
    fn distance_counts_scopes_between_use_and_declaration() {
        let (statements, _) = parse("{ var a = 1; { { print a; } } }");

        let mut interpreter = Interpreter::new();
        let mut errors: Vec<String> = Vec::new();
        Resolver::new(&mut interpreter, &mut errors).resolve(&statements);

        // Dig out the `a` inside `print a;`.
        let Stmt::Block(outer) = &statements[0] else { panic!("block expected") };
        let Stmt::Block(middle) = &outer[1] else { panic!("block expected") };
        let Stmt::Block(inner) = &middle[0] else { panic!("block expected") };
        let Stmt::Print(expr @ Expr::Variable { .. }) = &inner[0] else {
            panic!("print of a variable expected")
        };

        let id = expr.id().expect("variables carry ids");
        assert_eq!(interpreter.locals().get(&id), Some(&2));
    }

    #[test]
    fn resolving_twice_is_idempotent() {
        let source = "fun outer() { var x = 1; fun inner() { return x; } return inner; }\n\
                      class A { m() { return this; } }\n\
                      class B < A { m() { return super.m(); } }";
        let (statements, _) = parse(source);

        let mut interpreter = Interpreter::new();
        let mut errors: Vec<String> = Vec::new();

        Resolver::new(&mut interpreter, &mut errors).resolve(&statements);
        let first: HashMap<ExprId, usize> = interpreter.locals().clone();

        Resolver::new(&mut interpreter, &mut errors).resolve(&statements);

        assert!(errors.is_empty());
        assert!(!first.is_empty());
        assert_eq!(&first, interpreter.locals());
    }

    #[test]
    fn reading_a_local_in_its_own_initializer_is_rejected() {
        assert_eq!(
            static_errors("{ var a = a; }"),
            vec!["[line 1] Error at 'a': Can't read local variable in its own initializer."]
        );
    }

    #[test]
    fn self_reference_never_reaches_the_interpreter() {
        let result = run("print \"before\"; { var a = a; }");

        assert_eq!(result.outcome, Outcome::StaticError);
        assert_eq!(result.stdout, "");
    }

    #[test]
    fn reading_a_global_in_its_own_initializer_is_rejected() {
        assert_eq!(
            static_errors("var a = a;"),
            vec!["[line 1] Error at 'a': Can't read global variable in its own initializer."]
        );

        let result = run("print \"before\"; var a = a;");

        assert_eq!(result.outcome, Outcome::StaticError);
        assert_eq!(result.stdout, "");
    }

    #[test]
    fn redefining_a_global_from_its_old_value_is_fine() {
        assert!(static_errors("var a = 1; var a = a + 1;").is_empty());
        assert!(static_errors("fun f() {} var f = f;").is_empty());
        assert!(static_errors("var clock = clock;").is_empty());
    }

    #[test]
    fn globals_from_an_earlier_run_count_as_defined() {
        let buffer = SharedBuffer::default();
        let mut session = Session::with_output(Box::new(buffer.clone()));
        let mut errors: Vec<String> = Vec::new();

        assert_eq!(session.run(b"var a = 1;", &mut errors), Outcome::Success);
        assert_eq!(session.run(b"var a = a + 1; print a;", &mut errors), Outcome::Success);

        assert!(errors.is_empty());
        assert_eq!(buffer.contents(), "2\n");
    }

    #[test]
    fn shadowing_an_outer_name_in_an_initializer_is_fine() {
        assert!(static_errors("var a = 1; { var b = a; }").is_empty());
    }

    #[test]
    fn redeclaring_a_local_is_rejected() {
        assert_eq!(
            static_errors("fun f() { var a = 1; var a = 2; }"),
            vec!["[line 1] Error at 'a': Already a variable with this name in this scope."]
        );
        assert!(static_errors("var a = 1; var a = 2;").is_empty());
    }

    #[test]
    fn return_outside_a_function_is_rejected() {
        assert_eq!(
            static_errors("return 1;"),
            vec!["[line 1] Error at 'return': Can't return from top-level code."]
        );
    }

    #[test]
    fn returning_a_value_from_init_is_rejected() {
        assert_eq!(
            static_errors("class A { init() { return 1; } }"),
            vec!["[line 1] Error at 'return': Can't return a value from an initializer."]
        );
        assert!(static_errors("class A { init() { return; } }").is_empty());
    }

    #[test]
    fn this_and_super_need_a_class() {
        assert_eq!(
            static_errors("print this;"),
            vec!["[line 1] Error at 'this': Can't use 'this' outside of a class."]
        );
        assert_eq!(
            static_errors("fun f() { super.m(); }"),
            vec!["[line 1] Error at 'super': Can't use 'super' outside of a class."]
        );
        assert_eq!(
            static_errors("class A { m() { super.m(); } }"),
            vec!["[line 1] Error at 'super': Can't use 'super' in a class with no superclass."]
        );
    }

    #[test]
    fn a_class_cannot_inherit_from_itself() {
        assert_eq!(
            static_errors("class A < A {}"),
            vec!["[line 1] Error at 'A': A class can't inherit from itself."]
        );
    }

    #[test]
    fn every_error_is_reported_in_one_pass() {
        let errors = static_errors("return 1;\nprint this;\n{ var a = a; }");

        assert_eq!(errors.len(), 3);
        assert!(errors[0].starts_with("[line 1]"));
        assert!(errors[1].starts_with("[line 2]"));
        assert!(errors[2].starts_with("[line 3]"));
    }
}
