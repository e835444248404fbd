use super::ast::{
    BinaryOp, ClassDecl, Expr, ExprKind, Member, MethodDecl, Param, Program, Stmt, StmtKind,
    TypeRef, VarDecl,
};
use super::parsercore::Parser;
use super::token::{Pos, Token, TokenKind, TokenKind::*};
use crate::error::Error;
use crate::{check, expect, optional, repeat};

impl<I: Iterator<Item = Token>> Parser<I> {
    /// program = { class-decl } eof
    pub fn parse(mut self) -> Result<Program, Error> {
        let classes = repeat!(self, self.parse_class(), Eof);
        expect!(self, Eof)?;
        Ok(Program { classes })
    }
}

impl<I: Iterator<Item = Token>> Parser<I> {
    fn parse_ident(&mut self) -> Result<(String, Pos), Error> {
        let token = expect!(self, Ident)?;
        Ok((token.text, token.pos))
    }

    /// class-decl = "class" ident [ "extends" ident ] "is" [ this-block ] { member } "end"
    fn parse_class(&mut self) -> Result<ClassDecl, Error> {
        let pos = expect!(self, KwClass)?.pos;
        let (name, _) = self.parse_ident()?;
        let base = optional!(self, KwExtends, self.parse_ident()?.0);
        expect!(self, KwIs)?;

        // this-block = "this" "is" { stmt } "end"
        let init = optional!(self, KwThis, {
            expect!(self, KwIs)?;
            let stmts = repeat!(self, self.parse_stmt(), KwEnd);
            expect!(self, KwEnd)?;
            optional!(self, Semicolon);
            stmts
        })
        .unwrap_or_default();

        let members = repeat!(self, self.parse_member(), KwEnd);
        expect!(self, KwEnd)?;
        optional!(self, Semicolon);

        Ok(ClassDecl {
            name,
            base,
            init,
            members,
            pos,
        })
    }

    /// member = var-decl | method-decl
    fn parse_member(&mut self) -> Result<Member, Error> {
        let member = match self.peek()?.kind {
            KwVar => Member::Var(self.parse_var_decl()?),
            KwMethod => Member::Method(self.parse_method()?),
            _ => return Err(self.unexpected("'var' or 'method'")),
        };
        optional!(self, Semicolon);
        Ok(member)
    }

    /// var-decl = "var" ident ":" expr
    fn parse_var_decl(&mut self) -> Result<VarDecl, Error> {
        let pos = expect!(self, KwVar)?.pos;
        let (name, _) = self.parse_ident()?;
        expect!(self, Colon)?;
        let init = self.parse_expr()?;
        Ok(VarDecl { name, init, pos })
    }

    /// method-decl = "method" ident [ "(" [ param { "," param } ] ")" ] [ ":" type ] "is" { stmt } "end"
    fn parse_method(&mut self) -> Result<MethodDecl, Error> {
        let pos = expect!(self, KwMethod)?.pos;
        let (name, _) = self.parse_ident()?;
        let params = optional!(self, LParen, {
            let params = if check!(self, RParen) {
                Vec::new()
            } else {
                repeat!(self, self.parse_param(), Comma, RParen)
            };
            expect!(self, RParen)?;
            params
        })
        .unwrap_or_default();
        let ret = optional!(self, Colon, self.parse_type()?);
        expect!(self, KwIs)?;
        let body = repeat!(self, self.parse_stmt(), KwEnd);
        expect!(self, KwEnd)?;
        Ok(MethodDecl {
            name,
            params,
            ret,
            body,
            pos,
        })
    }

    /// param = ident ":" type
    fn parse_param(&mut self) -> Result<Param, Error> {
        let (name, pos) = self.parse_ident()?;
        expect!(self, Colon)?;
        let ty = self.parse_type()?;
        Ok(Param { name, ty, pos })
    }

    /// type = ident [ type-args ]
    fn parse_type(&mut self) -> Result<TypeRef, Error> {
        self.nested(|p| {
            let (name, pos) = p.parse_ident()?;
            let args = p.parse_type_args()?;
            Ok(TypeRef { name, args, pos })
        })
    }

    /// type-args = "[" type { "," type } "]"
    fn parse_type_args(&mut self) -> Result<Vec<TypeRef>, Error> {
        let args = optional!(self, LBracket, {
            let args = repeat!(self, self.parse_type(), Comma, RBracket);
            expect!(self, RBracket)?;
            args
        });
        Ok(args.unwrap_or_default())
    }

    /// stmt = ( var-stmt | if-stmt | while-stmt | return-stmt | break-stmt | assign-stmt | expr-stmt ) [ ";" ]
    fn parse_stmt(&mut self) -> Result<Stmt, Error> {
        let stmt = self.nested(|p| p.parse_stmt_body())?;
        optional!(self, Semicolon);
        Ok(stmt)
    }

    fn parse_stmt_body(&mut self) -> Result<Stmt, Error> {
        let pos = self.pos();
        let kind = match self.peek()?.kind {
            // Variable statement: "var" ident ":" expr
            KwVar => {
                let var = self.parse_var_decl()?;
                StmtKind::Var(var.name, var.init)
            }

            // Conditional statement: "if" expr "then" { stmt } [ "else" { stmt } ] "end"
            KwIf => {
                expect!(self, KwIf)?;
                let cond = self.parse_expr()?;
                expect!(self, KwThen)?;
                let then = repeat!(self, self.parse_stmt(), KwElse | KwEnd);
                let other = optional!(self, KwElse, repeat!(self, self.parse_stmt(), KwEnd));
                expect!(self, KwEnd)?;
                StmtKind::If(cond, then, other)
            }

            // Loop statement: "while" expr "loop" { stmt } "end"
            KwWhile => {
                expect!(self, KwWhile)?;
                let cond = self.parse_expr()?;
                expect!(self, KwLoop)?;
                let body = repeat!(self, self.parse_stmt(), KwEnd);
                expect!(self, KwEnd)?;
                StmtKind::While(cond, body)
            }

            // Return statement: "return" expr
            KwReturn => {
                expect!(self, KwReturn)?;
                StmtKind::Return(self.parse_expr()?)
            }

            // Break statement: "break"
            KwBreak => {
                expect!(self, KwBreak)?;
                StmtKind::Break
            }

            _ => {
                let expr = self.parse_expr()?;
                match optional!(self, Assign) {
                    // Assignment statement: expr ":=" expr
                    Some(_) => StmtKind::Assign(expr, self.parse_expr()?),
                    // Expression statement: expr
                    None => StmtKind::Expr(expr),
                }
            }
        };
        Ok(Stmt::new(kind, pos))
    }

    /// expr = binary(1)
    fn parse_expr(&mut self) -> Result<Expr, Error> {
        self.nested(|p| p.parse_binary(1))
    }

    /// binary(p) = postfix-expr { binop(>= p) binary(prec + 1) }
    fn parse_binary(&mut self, min_prec: u8) -> Result<Expr, Error> {
        self.scoped(|p| {
            let mut lhs = p.parse_postfix_expr()?;
            loop {
                let kind = p.peek()?.kind;
                let (Some(op), Some(prec)) = (BinaryOp::from_token(kind), kind.precedence())
                else {
                    break;
                };
                if prec < min_prec {
                    break;
                }
                let token = p.next()?;
                p.check_operand(&token)?;
                // the chain grows left-deep
                p.deepen()?;
                let rhs = p.nested(|p| p.parse_binary(prec + 1))?;
                let pos = lhs.pos;
                lhs = Expr::new(ExprKind::Binary(op, Box::new(lhs), Box::new(rhs)), pos);
            }
            Ok(lhs)
        })
    }

    /// A binary operator needs an operand starting on its own line
    fn check_operand(&mut self, op: &Token) -> Result<(), Error> {
        let next = self.peek()?;
        let starts_operand = matches!(
            next.kind,
            Ident | KwThis | IntLit | RealLit | BoolLit | LParen
        );
        if starts_operand && next.pos.line == op.pos.line {
            Ok(())
        } else {
            Err(Error::IncompleteBinary(op.text.clone(), op.pos))
        }
    }

    /// postfix-expr = prim-expr { "." ident | "(" [ expr { "," expr } ] ")" }
    fn parse_postfix_expr(&mut self) -> Result<Expr, Error> {
        let mut expr = self.parse_prim_expr()?;
        loop {
            let pos = expr.pos;

            // Member access: expr "." ident
            if check!(self, Period) {
                expect!(self, Period)?;
                let (name, _) = self.parse_ident()?;
                expr = Expr::new(ExprKind::Member(Box::new(expr), name), pos);
                continue;
            }

            // Call: expr "(" [ expr { "," expr } ] ")", opened on the same line
            let line = self.last().line;
            if self.check_if(|token| token.kind == LParen && token.pos.line == line) {
                expect!(self, LParen)?;
                let args = if check!(self, RParen) {
                    Vec::new()
                } else {
                    repeat!(self, self.parse_expr(), Comma, RParen)
                };
                expect!(self, RParen)?;
                expr = Expr::new(ExprKind::Call(Box::new(expr), args), pos);
                continue;
            }

            break;
        }
        Ok(expr)
    }

    /// prim-expr = ident [ type-args ] | "this" | int-lit | real-lit | bool-lit | "(" expr ")"
    fn parse_prim_expr(&mut self) -> Result<Expr, Error> {
        let pos = self.pos();
        let kind = match self.peek()?.kind {
            Ident => {
                let (name, _) = self.parse_ident()?;
                let generics = self.parse_type_args()?;
                ExprKind::Ident(name, generics)
            }
            KwThis => {
                expect!(self, KwThis)?;
                ExprKind::This
            }
            IntLit => ExprKind::IntLit(expect!(self, IntLit)?.text),
            RealLit => ExprKind::RealLit(expect!(self, RealLit)?.text),
            BoolLit => ExprKind::BoolLit(expect!(self, BoolLit)?.text == "true"),
            LParen => {
                expect!(self, LParen)?;
                let expr = self.parse_expr()?;
                expect!(self, RParen)?;
                return Ok(expr);
            }
            _ => return Err(self.unexpected("expression")),
        };
        Ok(Expr::new(kind, pos))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammer::lexer::Lexer;
    use crate::grammer::parsercore::MAX_DEPTH;

    fn parse(code: &str) -> Result<Program, Error> {
        Parser::new(Lexer::new(code)).parse()
    }

    #[test]
    fn empty_program() {
        let program = parse("").unwrap();
        assert!(program.classes.is_empty());
    }

    #[test]
    fn precedence() {
        let program = parse("class A is var x : 1 + 2 * 3 end").unwrap();
        let Member::Var(var) = &program.classes[0].members[0] else {
            panic!("expected field");
        };
        let ExprKind::Binary(BinaryOp::Add, _, rhs) = &var.init.kind else {
            panic!("expected addition at the root");
        };
        assert!(matches!(rhs.kind, ExprKind::Binary(BinaryOp::Mul, _, _)));
    }

    #[test]
    fn left_associative() {
        let program = parse("class A is var x : 8 - 4 - 2 end").unwrap();
        let Member::Var(var) = &program.classes[0].members[0] else {
            panic!("expected field");
        };
        let ExprKind::Binary(BinaryOp::Sub, lhs, _) = &var.init.kind else {
            panic!("expected subtraction at the root");
        };
        assert!(matches!(lhs.kind, ExprKind::Binary(BinaryOp::Sub, _, _)));
    }

    #[test]
    fn too_deep() {
        let code = format!(
            "class A is var x : {}1{} end",
            "(".repeat(400),
            ")".repeat(400)
        );
        assert!(matches!(parse(&code), Err(Error::TooDeep(_))));
    }

    #[test]
    fn long_chain_is_too_deep() {
        let code = format!("class A is var x : 1{} end", " + 1".repeat(MAX_DEPTH));
        assert!(matches!(parse(&code), Err(Error::TooDeep(_))));
    }

    #[test]
    fn short_chain_parses() {
        let code = format!("class A is var x : 1{} end", " + 1".repeat(MAX_DEPTH / 2));
        assert!(parse(&code).is_ok());
    }
}
