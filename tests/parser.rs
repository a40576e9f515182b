mod common;

#[cfg(test)]
mod parser_tests {
    use rox::ast::{Expr, LiteralValue, Stmt};
    use rox::ast_printer::AstPrinter;

    use crate::common::parse;

    fn printed(source: &str) -> String {
        let (statements, errors) = parse(source);
        assert!(errors.is_empty(), "unexpected errors: {:?}", errors);
        AstPrinter::print_program(&statements)
    }

    #[test]
    fn precedence_and_associativity() {
        assert_eq!(printed("print 1 + 2 * 3 - 4;"), "(print (- (+ 1.0 (* 2.0 3.0)) 4.0))");
        assert_eq!(printed("print !-x == y < z;"), "(print (== (! (- x)) (< y z)))");
        assert_eq!(printed("a or b and c;"), "(; (or a (and b c)))");
    }

    #[test]
    fn assignment_is_right_associative() {
        assert_eq!(printed("a = b = 1;"), "(; (= a (= b 1.0)))");
        assert_eq!(printed("obj.field = 2;"), "(; (=. obj field 2.0))");
    }

    #[test]
    fn calls_and_property_access_chain() {
        assert_eq!(
            printed("a.b(1, 2).c();"),
            "(; (call (. (call (. a b) 1.0 2.0) c)))"
        );
    }

    #[test]
    fn for_desugars_into_block_and_while() {
        assert_eq!(
            printed("for (var i = 0; i < 3; i = i + 1) print i;"),
            "(block (var i 0.0) (while (< i 3.0) (block (print i) (; (= i (+ i 1.0))))))"
        );
    }

    #[test]
    fn for_without_clauses_loops_on_true() {
        let (statements, errors) = parse("for (;;) print 1;");
        assert!(errors.is_empty());

        match &statements[..] {
            [Stmt::While { condition, .. }] => {
                assert_eq!(condition, &Expr::Literal(LiteralValue::True));
            }
            other => panic!("expected a bare while, got {:?}", other),
        }
    }

    #[test]
    fn class_with_superclass_and_methods() {
        assert_eq!(
            printed("class B < A { init(x) { this.x = x; } get() { return super.get(); } }"),
            "(class B < A (fun init (x) (; (=. this x x))) (fun get () (return (call (super get)))))"
        );
    }

    #[test]
    fn invalid_assignment_target_is_reported_but_parsing_continues() {
        let (statements, errors) = parse("1 + 2 = 3; print 4;");

        assert_eq!(errors, vec!["[line 1] Error at '=': Invalid assignment target."]);
        assert_eq!(statements.len(), 2);
    }

    #[test]
    fn synchronizes_and_reports_several_errors() {
        let (statements, errors) = parse("var = 1;\nprint 2;\nprint (3;\nvar ok = 4;");

        assert_eq!(
            errors,
            vec![
                "[line 1] Error at '=': Expected variable name.",
                "[line 3] Error at ';': Expected ')' after expression.",
            ]
        );
        assert_eq!(
            AstPrinter::print_program(&statements),
            "(print 2.0)\n(var ok 4.0)"
        );
    }

    #[test]
    fn missing_semicolon_at_end_of_input() {
        let (_, errors) = parse("print 1");

        assert_eq!(errors, vec!["[line 1] Error at end: Expected ';' after value."]);
    }

    #[test]
    fn too_many_arguments_is_not_fatal() {
        let args: Vec<String> = (0..256).map(|i| i.to_string()).collect();
        let source = format!("f({});", args.join(", "));

        let (statements, errors) = parse(&source);

        assert_eq!(errors.len(), 1);
        assert!(errors[0].ends_with("Can't have more than 255 arguments."));
        assert_eq!(statements.len(), 1);
    }

    #[test]
    fn too_many_parameters_is_not_fatal() {
        let params: Vec<String> = (0..256).map(|i| format!("p{}", i)).collect();
        let source = format!("fun f({}) {{}}", params.join(", "));

        let (statements, errors) = parse(&source);

        assert_eq!(errors.len(), 1);
        assert!(errors[0].ends_with("Can't have more than 255 parameters."));
        assert_eq!(statements.len(), 1);
    }

    #[test]
    fn every_variable_use_gets_its_own_id() {
        let (statements, _) = parse("a; a;");

        let ids: Vec<_> = statements
            .iter()
            .filter_map(|stmt| match stmt {
                Stmt::Expression(expr) => expr.id(),
                _ => None,
            })
            .collect();

        assert_eq!(ids.len(), 2);
        assert_ne!(ids[0], ids[1]);
    }
}
