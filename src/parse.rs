//! Análisis sintáctico.
//!
//! El parser escanea la línea completa antes de comenzar, descartando
//! espacios en blanco y tokens inválidos (estos últimos ya produjeron un
//! diagnóstico en el lexer). Las expresiones se reconocen por precedence
//! climbing sobre la siguiente gramática, de menor a mayor precedencia:
//!
//! ```text
//! expr    := term (('+' | '-') term)*
//! term    := unary (('*' | '/') unary)*
//! unary   := ('+' | '-') unary | primary
//! primary := NUMBER | '(' expr ')'
//! ```
//!
//! # Errores
//! El parser nunca aborta. Ante una entrada mal formada registra un
//! diagnóstico, sintetiza un nodo de reemplazo y continúa, de modo que
//! siempre se obtiene un [`SyntaxTree`] completo.

use thiserror::Error;
use tracing::trace;

use crate::{
    error::Diagnostics,
    lex::{Lexer, Token, TokenKind},
    source::{Located, Span},
    syntax::{SyntaxNode, SyntaxTree},
};

/// Profundidad máxima de anidamiento.
///
/// Cuenta paréntesis, operadores unarios y operandos derechos, es decir,
/// cada nivel de recursión del parser.
pub const MAX_DEPTH: usize = 256;

/// Cantidad máxima de operadores binarios por línea.
///
/// Las cadenas planas como `1 + 2 + 3` no anidan, pero cada operador
/// agrega un nivel a la espina izquierda del árbol.
pub const MAX_OPERATORS: usize = 1024;

#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParserError {
    #[error("expected expression, got {0}")]
    ExpectedExpr(TokenKind),

    #[error("expected ')', got {0}")]
    ExpectedCloseParen(TokenKind),

    #[error("unexpected trailing input")]
    TrailingInput,

    #[error("expression nests deeper than {max} levels", max = MAX_DEPTH)]
    TooDeep,

    #[error("expression has more than {max} operators", max = MAX_OPERATORS)]
    TooLong,
}

/// Construye el árbol sintáctico de una línea.
pub fn parse(text: &str) -> SyntaxTree {
    Parser::new(text).parse()
}

pub struct Parser {
    tokens: Vec<Token>,
    position: usize,
    depth: usize,
    operators: usize,
    diagnostics: Diagnostics,

    /// Se excedió algún límite; el resto de la entrada se ignora.
    bailed: bool,
}

impl Parser {
    /// Escanea la línea y prepara el buffer de tokens.
    pub fn new(text: &str) -> Self {
        let (tokens, diagnostics) = Lexer::tokenize(text);
        let tokens = tokens
            .into_iter()
            .filter(|token| !matches!(token.kind(), TokenKind::Whitespace | TokenKind::Invalid))
            .collect();

        Parser {
            tokens,
            position: 0,
            depth: 0,
            operators: 0,
            diagnostics,
            bailed: false,
        }
    }

    pub fn parse(mut self) -> SyntaxTree {
        let root = self.expression(0);

        if self.current().kind() != TokenKind::EndOfFile {
            // El buffer termina en EOF, por lo cual el penúltimo token es
            // el último token real de la línea
            let last = &self.tokens[self.tokens.len() - 2];
            let span = self.current().span().to(last.span());

            self.report(ParserError::TrailingInput, span);
        }

        SyntaxTree::new(root, self.diagnostics)
    }

    fn expression(&mut self, parent: u8) -> SyntaxNode {
        let base = self.depth;
        if !self.enter() {
            return placeholder(self.current().position());
        }

        let mut left = match unary_precedence(self.current().kind()) {
            Some(precedence) if precedence >= parent => {
                let operator = self.next_token();
                let operand = self.expression(precedence);

                SyntaxNode::Unary {
                    operator,
                    operand: Box::new(operand),
                }
            }

            _ => self.primary(),
        };

        while let Some(precedence) = binary_precedence(self.current().kind()) {
            if precedence <= parent || !self.fold() {
                break;
            }

            let operator = self.next_token();
            let right = self.expression(precedence);

            left = SyntaxNode::Binary {
                left: Box::new(left),
                operator,
                right: Box::new(right),
            };
        }

        self.depth = base;
        left
    }

    fn primary(&mut self) -> SyntaxNode {
        match self.current().kind() {
            TokenKind::Number => SyntaxNode::Number {
                literal: self.next_token(),
            },

            TokenKind::OpenParen => {
                let open = self.next_token();
                let expression = self.expression(0);
                let close = self.match_token(TokenKind::CloseParen);

                SyntaxNode::Parenthesized {
                    open,
                    expression: Box::new(expression),
                    close,
                }
            }

            kind => {
                let (position, span) = (self.current().position(), self.current().span());
                self.report(ParserError::ExpectedExpr(kind), span);

                // Se descarta el token problemático para garantizar avance
                self.next_token();
                placeholder(position)
            }
        }
    }

    /// Consume un token de la clase esperada o sintetiza uno vacío.
    fn match_token(&mut self, kind: TokenKind) -> Token {
        let current = self.current();
        if current.kind() == kind {
            return self.next_token();
        }

        let (found, position, span) = (current.kind(), current.position(), current.span());
        self.report(ParserError::ExpectedCloseParen(found), span);

        Token::missing(kind, position)
    }

    /// Entra a un nivel más de anidamiento.
    fn enter(&mut self) -> bool {
        if self.bailed {
            return false;
        }

        if self.depth >= MAX_DEPTH {
            self.bail(ParserError::TooDeep);
            return false;
        }

        self.depth += 1;
        true
    }

    /// Registra un operador binario más en la línea.
    fn fold(&mut self) -> bool {
        if self.bailed {
            return false;
        }

        if self.operators >= MAX_OPERATORS {
            self.bail(ParserError::TooLong);
            return false;
        }

        self.operators += 1;
        true
    }

    /// Reporta un límite excedido y salta al final de la entrada.
    fn bail(&mut self, error: ParserError) {
        self.report(error, self.current().span());

        self.bailed = true;
        self.position = self.tokens.len() - 1;
    }

    /// Obtiene un token por adelantado. Más allá del final siempre se
    /// obtiene [`TokenKind::EndOfFile`].
    fn peek(&self, offset: usize) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[(self.position + offset).min(last)]
    }

    fn current(&self) -> &Token {
        self.peek(0)
    }

    fn next_token(&mut self) -> Token {
        let token = self.current().clone();
        if token.kind() != TokenKind::EndOfFile {
            self.position += 1;
        }

        token
    }

    fn report(&mut self, error: ParserError, span: Span) {
        if !self.bailed {
            trace!(%error, %span, "syntax diagnostic");
            self.diagnostics.push(Located::at(error, span));
        }
    }
}

fn unary_precedence(kind: TokenKind) -> Option<u8> {
    match kind {
        TokenKind::Plus | TokenKind::Minus => Some(3),
        _ => None,
    }
}

fn binary_precedence(kind: TokenKind) -> Option<u8> {
    match kind {
        TokenKind::Star | TokenKind::Slash => Some(2),
        TokenKind::Plus | TokenKind::Minus => Some(1),
        _ => None,
    }
}

/// Literal cero sin lexema, en lugar de una expresión ausente.
fn placeholder(position: usize) -> SyntaxNode {
    SyntaxNode::Number {
        literal: Token::new(TokenKind::Number, position, "", Some(0)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::NodeKind;

    fn messages(text: &str) -> Vec<String> {
        parse(text)
            .diagnostics()
            .iter()
            .map(|d| d.message().to_owned())
            .collect()
    }

    /// Reconstruye la expresión con paréntesis explícitos.
    fn grouped(node: &SyntaxNode) -> String {
        match node {
            SyntaxNode::Number { literal } => literal.text().to_owned(),
            SyntaxNode::Unary { operator, operand } => {
                format!("({}{})", operator.text(), grouped(operand))
            }
            SyntaxNode::Binary {
                left,
                operator,
                right,
            } => format!("({} {} {})", grouped(left), operator.text(), grouped(right)),
            SyntaxNode::Parenthesized { expression, .. } => format!("[{}]", grouped(expression)),
        }
    }

    fn shape(text: &str) -> String {
        let tree = parse(text);
        assert!(tree.diagnostics().is_empty(), "{}", tree.diagnostics());
        grouped(tree.root())
    }

    #[test]
    fn precedence_and_associativity() {
        assert_eq!(shape("1 + 2 * 3"), "(1 + (2 * 3))");
        assert_eq!(shape("1 - 2 - 3"), "((1 - 2) - 3)");
        assert_eq!(shape("8 / 4 / 2"), "((8 / 4) / 2)");
        assert_eq!(shape("(1 + 2) * 3"), "([(1 + 2)] * 3)");
    }

    #[test]
    fn unary_binds_tighter_than_binary() {
        assert_eq!(shape("-5 + 3"), "((-5) + 3)");
        assert_eq!(shape("--4"), "(-(-4))");
        assert_eq!(shape("-2 * 3"), "((-2) * 3)");
        assert_eq!(shape("2 * -3"), "(2 * (-3))");
        assert_eq!(shape("1 - +2"), "(1 - (+2))");
    }

    #[test]
    fn whitespace_is_ignored() {
        assert_eq!(shape(" \t1+\t2 "), "(1 + 2)");
    }

    #[test]
    fn missing_primary_gets_placeholder() {
        let tree = parse("1 + )");
        assert_eq!(messages("1 + )"), ["expected expression, got CloseParen"]);

        match tree.root() {
            SyntaxNode::Binary { right, .. } => match &**right {
                SyntaxNode::Number { literal } => {
                    assert_eq!(literal.value(), Some(0));
                    assert_eq!(literal.text(), "");
                    assert_eq!(literal.position(), 4);
                }

                other => panic!("expected placeholder, found {:?}", other),
            },

            other => panic!("expected binary expression, found {:?}", other),
        }
    }

    #[test]
    fn empty_input_expects_expression() {
        let tree = parse("");
        assert_eq!(messages(""), ["expected expression, got EndOfFile"]);
        assert_eq!(tree.diagnostics().iter().next().unwrap().span(), Span::empty(0));
    }

    #[test]
    fn missing_close_paren_still_wraps() {
        let tree = parse("(1 + 2");
        assert_eq!(messages("(1 + 2"), ["expected ')', got EndOfFile"]);

        match tree.root() {
            SyntaxNode::Parenthesized { close, expression, .. } => {
                assert_eq!(close.kind(), TokenKind::CloseParen);
                assert_eq!(close.span(), Span::empty(6));
                assert_eq!(expression.kind(), NodeKind::BinaryExpression);
            }

            other => panic!("expected parenthesized expression, found {:?}", other),
        }
    }

    #[test]
    fn trailing_input_keeps_tree() {
        let tree = parse("1 2 3");
        assert_eq!(messages("1 2 3"), ["unexpected trailing input"]);
        assert_eq!(tree.diagnostics().iter().next().unwrap().span(), Span::new(2, 3));
        assert_eq!(tree.root().kind(), NodeKind::NumberExpression);
    }

    #[test]
    fn invalid_tokens_are_skipped_after_lexing() {
        assert_eq!(messages("1 + @2"), ["unexpected character '@' at position 4"]);
        assert_eq!(grouped(parse("1 + @2").root()), "(1 + 2)");
    }

    #[test]
    fn lexer_diagnostics_come_first() {
        assert_eq!(
            messages("$ )"),
            [
                "unexpected character '$' at position 0",
                "expected expression, got CloseParen",
            ]
        );
    }

    #[test]
    fn garbage_terminates() {
        for text in &[")))", "+", "(((", "* / *", "(-)", "1 + (2 * )"] {
            assert!(!parse(text).diagnostics().is_empty(), "{:?}", text);
        }
    }

    #[test]
    fn deep_nesting_is_bounded() {
        let text = format!("{}1{}", "(".repeat(1000), ")".repeat(1000));
        assert_eq!(messages(&text), ["expression nests deeper than 256 levels"]);

        let text = format!("{}1", "-".repeat(1000));
        assert_eq!(messages(&text), ["expression nests deeper than 256 levels"]);

        let text = format!("{}1", "(-".repeat(200));
        assert_eq!(messages(&text), ["expression nests deeper than 256 levels"]);
    }

    #[test]
    fn long_flat_chains_do_not_nest() {
        let text = vec!["1"; 1000].join(" + ");
        assert!(parse(&text).diagnostics().is_empty());

        let text = vec!["2"; 1000].join(" * ");
        assert!(parse(&text).diagnostics().is_empty());
    }

    #[test]
    fn operator_count_is_bounded() {
        let text = vec!["1"; MAX_OPERATORS + 2].join(" - ");
        assert_eq!(messages(&text), ["expression has more than 1024 operators"]);

        let text = vec!["1"; MAX_OPERATORS + 1].join(" - ");
        assert!(parse(&text).diagnostics().is_empty());
    }

    #[test]
    fn moderate_nesting_is_accepted() {
        let text = format!("{}1{}", "(".repeat(100), ")".repeat(100));
        assert!(parse(&text).diagnostics().is_empty());

        let text = vec!["1"; 200].join(" * ");
        assert!(parse(&text).diagnostics().is_empty());
    }
}
