use crate::ast::{Expr, FunctionDecl, LiteralValue, Stmt};

/// Converts the AST to a parenthesised prefix form, e.g. `(* (- 123.0) (group 45.67))`.
pub struct AstPrinter;

impl AstPrinter {
    pub fn print_expr(expr: &Expr) -> String {
        match expr {
            // ── literals ────────────────────────────────────────────────
            Expr::Literal(lit) => match lit {
                LiteralValue::True => "true".into(),

                LiteralValue::False => "false".into(),

                LiteralValue::Nil => "nil".into(),

                LiteralValue::Str(s) => s.clone(),

                LiteralValue::Number(n) => {
                    if n.fract() == 0.0 {
                        // 3 → 3.0
                        format!("{:.1}", n)
                    } else {
                        n.to_string()
                    }
                }
            },

            Expr::Grouping(inner) => format!("(group {})", Self::print_expr(inner)),

            Expr::Unary { operator, right } => {
                format!("({} {})", operator.lexeme, Self::print_expr(right))
            }

            Expr::Binary {
                left,
                operator,
                right,
            }
            | Expr::Logical {
                left,
                operator,
                right,
            } => format!(
                "({} {} {})",
                operator.lexeme,
                Self::print_expr(left),
                Self::print_expr(right)
            ),

            Expr::Variable { name, .. } => name.lexeme.clone(),

            Expr::Assign { name, value, .. } => {
                format!("(= {} {})", name.lexeme, Self::print_expr(value))
            }

            Expr::Call {
                callee, arguments, ..
            } => {
                let mut s = format!("(call {}", Self::print_expr(callee));
                for arg in arguments {
                    s.push(' ');
                    s.push_str(&Self::print_expr(arg));
                }
                s.push(')');
                s
            }

            Expr::Get { object, name } => {
                format!("(. {} {})", Self::print_expr(object), name.lexeme)
            }

            Expr::Set {
                object,
                name,
                value,
            } => format!(
                "(=. {} {} {})",
                Self::print_expr(object),
                name.lexeme,
                Self::print_expr(value)
            ),

            Expr::This { .. } => "this".into(),

            Expr::Super { method, .. } => format!("(super {})", method.lexeme),
        }
    }

    pub fn print_stmt(stmt: &Stmt) -> String {
        match stmt {
            Stmt::Expression(expr) => format!("(; {})", Self::print_expr(expr)),

            Stmt::Print(expr) => format!("(print {})", Self::print_expr(expr)),

            Stmt::Var { name, initializer } => match initializer {
                Some(init) => format!("(var {} {})", name.lexeme, Self::print_expr(init)),
                None => format!("(var {})", name.lexeme),
            },

            Stmt::Block(statements) => Self::list("block", statements),

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => match else_branch {
                Some(else_branch) => format!(
                    "(if {} {} {})",
                    Self::print_expr(condition),
                    Self::print_stmt(then_branch),
                    Self::print_stmt(else_branch)
                ),
                None => format!(
                    "(if {} {})",
                    Self::print_expr(condition),
                    Self::print_stmt(then_branch)
                ),
            },

            Stmt::While { condition, body } => format!(
                "(while {} {})",
                Self::print_expr(condition),
                Self::print_stmt(body)
            ),

            Stmt::Function(decl) => Self::function(decl),

            Stmt::Return { value, .. } => match value {
                Some(value) => format!("(return {})", Self::print_expr(value)),
                None => "(return)".into(),
            },

            Stmt::Class {
                name,
                superclass,
                methods,
            } => {
                let mut s = format!("(class {}", name.lexeme);
                if let Some(superclass) = superclass {
                    s.push_str(" < ");
                    s.push_str(&Self::print_expr(superclass));
                }
                for method in methods {
                    s.push(' ');
                    s.push_str(&Self::function(method));
                }
                s.push(')');
                s
            }
        }
    }

    /// One line per top‑level statement.
    pub fn print_program(statements: &[Stmt]) -> String {
        statements
            .iter()
            .map(Self::print_stmt)
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn function(decl: &FunctionDecl) -> String {
        let params: Vec<&str> = decl.params.iter().map(|p| p.lexeme.as_str()).collect();
        let mut s = format!("(fun {} ({})", decl.name.lexeme, params.join(" "));
        for stmt in &decl.body {
            s.push(' ');
            s.push_str(&Self::print_stmt(stmt));
        }
        s.push(')');
        s
    }

    fn list(head: &str, statements: &[Stmt]) -> String {
        let mut s = format!("({}", head);
        for stmt in statements {
            s.push(' ');
            s.push_str(&Self::print_stmt(stmt));
        }
        s.push(')');
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::{Token, TokenType};

    #[test]
    fn prints_nested_prefix_form() {
        let expr = Expr::Binary {
            left: Box::new(Expr::Unary {
                operator: Token::new(TokenType::MINUS, "-", 1),
                right: Box::new(Expr::Literal(LiteralValue::Number(123.0))),
            }),
            operator: Token::new(TokenType::STAR, "*", 1),
            right: Box::new(Expr::Grouping(Box::new(Expr::Literal(
                LiteralValue::Number(45.67),
            )))),
        };

        assert_eq!(AstPrinter::print_expr(&expr), "(* (- 123.0) (group 45.67))");
    }

    #[test]
    fn prints_statements() {
        let stmt = Stmt::Var {
            name: Token::new(TokenType::IDENTIFIER, "a", 1),
            initializer: Some(Expr::Literal(LiteralValue::Nil)),
        };

        assert_eq!(AstPrinter::print_stmt(&stmt), "(var a nil)");
        assert_eq!(
            AstPrinter::print_stmt(&Stmt::Block(vec![stmt.clone(), stmt])),
            "(block (var a nil) (var a nil))"
        );
    }
}
