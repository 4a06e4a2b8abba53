//! Árbol sintáctico.
//!
//! El parser produce un [`SyntaxNode`] por línea. Cada variante es dueña de
//! sus hijos, los cuales se construyen por completo antes que el padre. El
//! evaluador y el impresor de árboles hacen `match` exhaustivo sobre las
//! variantes.

use crate::{
    error::Diagnostics,
    lex::Token,
    source::Span,
};
use std::fmt::{self, Display};

/// Clase de un nodo.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    NumberExpression,
    UnaryExpression,
    BinaryExpression,
    ParenthesizedExpression,
}

impl Display for NodeKind {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        use NodeKind::*;

        let string = match self {
            NumberExpression        => "NumberExpression",
            UnaryExpression         => "UnaryExpression",
            BinaryExpression        => "BinaryExpression",
            ParenthesizedExpression => "ParenthesizedExpression",
        };

        fmt.write_str(string)
    }
}

/// Una expresión.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyntaxNode {
    /// Literal entero.
    Number { literal: Token },

    /// `+x` o `-x`.
    Unary {
        operator: Token,
        operand: Box<SyntaxNode>,
    },

    /// `a + b`, `a - b`, `a * b` o `a / b`.
    Binary {
        left: Box<SyntaxNode>,
        operator: Token,
        right: Box<SyntaxNode>,
    },

    /// `(x)`
    Parenthesized {
        open: Token,
        expression: Box<SyntaxNode>,
        close: Token,
    },
}

/// Hijo de un nodo: otro nodo o un token.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Child<'a> {
    Node(&'a SyntaxNode),
    Token(&'a Token),
}

impl Child<'_> {
    fn span(&self) -> Span {
        match self {
            Child::Node(node) => node.span(),
            Child::Token(token) => token.span(),
        }
    }
}

impl SyntaxNode {
    pub fn kind(&self) -> NodeKind {
        match self {
            SyntaxNode::Number { .. } => NodeKind::NumberExpression,
            SyntaxNode::Unary { .. } => NodeKind::UnaryExpression,
            SyntaxNode::Binary { .. } => NodeKind::BinaryExpression,
            SyntaxNode::Parenthesized { .. } => NodeKind::ParenthesizedExpression,
        }
    }

    /// Hijos en el mismo orden en que aparecen en la línea original.
    pub fn children(&self) -> Vec<Child<'_>> {
        match self {
            SyntaxNode::Number { literal } => vec![Child::Token(literal)],

            SyntaxNode::Unary { operator, operand } => {
                vec![Child::Token(operator), Child::Node(operand)]
            }

            SyntaxNode::Binary {
                left,
                operator,
                right,
            } => vec![Child::Node(left), Child::Token(operator), Child::Node(right)],

            SyntaxNode::Parenthesized {
                open,
                expression,
                close,
            } => vec![Child::Token(open), Child::Node(expression), Child::Token(close)],
        }
    }

    /// Rango que cubre desde el primer hasta el último hijo.
    pub fn span(&self) -> Span {
        let children = self.children();
        match (children.first(), children.last()) {
            (Some(first), Some(last)) => first.span().to(last.span()),
            _ => Span::default(),
        }
    }

    /// Representación anidada para depuración.
    pub fn pretty(&self) -> Pretty<'_> {
        Pretty(self)
    }
}

/// Impresor de árboles.
///
/// Cada línea lleva la clase del nodo o token, precedida por marcadores
/// `├──`/`└──`. Los tokens numéricos incluyen su valor.
pub struct Pretty<'a>(&'a SyntaxNode);

impl Display for Pretty<'_> {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        print(fmt, Child::Node(self.0), &mut String::new(), true)
    }
}

fn print(
    fmt: &mut fmt::Formatter<'_>,
    child: Child,
    indent: &mut String,
    is_last: bool,
) -> fmt::Result {
    let marker = if is_last { "└──" } else { "├──" };
    write!(fmt, "{}{}", indent, marker)?;

    let node = match child {
        Child::Node(node) => {
            writeln!(fmt, "{}", node.kind())?;
            node
        }

        Child::Token(token) => {
            match token.value() {
                Some(value) => writeln!(fmt, "{} {}", token.kind(), value)?,
                None => writeln!(fmt, "{}", token.kind())?,
            }

            return Ok(());
        }
    };

    let restore = indent.len();
    indent.push_str(if is_last { "    " } else { "│   " });

    let children = node.children();
    let last = children.len() - 1;
    for (i, child) in children.into_iter().enumerate() {
        print(fmt, child, indent, i == last)?;
    }

    indent.truncate(restore);
    Ok(())
}

/// Resultado del análisis sintáctico de una línea.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxTree {
    root: SyntaxNode,
    diagnostics: Diagnostics,
}

impl SyntaxTree {
    pub(crate) fn new(root: SyntaxNode, diagnostics: Diagnostics) -> Self {
        SyntaxTree { root, diagnostics }
    }

    pub fn root(&self) -> &SyntaxNode {
        &self.root
    }

    /// Diagnósticos de lexer y parser, en orden de aparición.
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn into_parts(self) -> (SyntaxNode, Diagnostics) {
        (self.root, self.diagnostics)
    }
}

impl Display for SyntaxTree {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.root.pretty().fmt(fmt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lex::TokenKind;

    fn number(position: usize, value: i32) -> SyntaxNode {
        let text = value.to_string();
        SyntaxNode::Number {
            literal: Token::new(TokenKind::Number, position, text, Some(value)),
        }
    }

    fn token(kind: TokenKind, position: usize, text: &str) -> Token {
        Token::new(kind, position, text, None)
    }

    #[test]
    fn children_follow_construction_order() {
        // (1 + 2)
        let binary = SyntaxNode::Binary {
            left: Box::new(number(1, 1)),
            operator: token(TokenKind::Plus, 3, "+"),
            right: Box::new(number(5, 2)),
        };

        let group = SyntaxNode::Parenthesized {
            open: token(TokenKind::OpenParen, 0, "("),
            expression: Box::new(binary.clone()),
            close: token(TokenKind::CloseParen, 6, ")"),
        };

        match group.children().as_slice() {
            [Child::Token(open), Child::Node(inner), Child::Token(close)] => {
                assert_eq!(open.kind(), TokenKind::OpenParen);
                assert_eq!(**inner, binary);
                assert_eq!(close.kind(), TokenKind::CloseParen);
            }

            other => panic!("unexpected children: {:?}", other),
        }

        assert_eq!(group.kind(), NodeKind::ParenthesizedExpression);
        assert_eq!(group.span(), Span::new(0, 7));
        assert_eq!(binary.span(), Span::new(1, 5));
    }

    #[test]
    fn pretty_prints_nested_tree() {
        // -1 * 2
        let tree = SyntaxNode::Binary {
            left: Box::new(SyntaxNode::Unary {
                operator: token(TokenKind::Minus, 0, "-"),
                operand: Box::new(number(1, 1)),
            }),
            operator: token(TokenKind::Star, 3, "*"),
            right: Box::new(number(5, 2)),
        };

        let expected = "\
└──BinaryExpression
    ├──UnaryExpression
    │   ├──Minus
    │   └──NumberExpression
    │       └──Number 1
    ├──Star
    └──NumberExpression
        └──Number 2
";

        assert_eq!(tree.pretty().to_string(), expected);
    }
}
