//! Evaluación.
//!
//! Recorre el árbol sintáctico y calcula su valor entero. Paréntesis,
//! unarios y operandos derechos se evalúan de forma recursiva; la espina
//! izquierda de una cadena de operadores binarios se recorre con un ciclo.
//!
//! Solo debe invocarse sobre árboles sin diagnósticos: un árbol construido
//! a partir de nodos de reemplazo tiene un valor bien definido pero carente
//! de significado.

use thiserror::Error;

use crate::{
    lex::{Token, TokenKind},
    source::Located,
    syntax::SyntaxNode,
};

/// Error en tiempo de ejecución.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EvalError {
    #[error("division by zero")]
    DivisionByZero,

    /// El resultado no cabe en un entero de 32 bits.
    #[error("integer overflow")]
    Overflow,

    /// Un nodo construido a mano con un operador que no corresponde.
    #[error("{0} is not a valid operator here")]
    BadOperator(TokenKind),
}

pub type Eval = Result<i32, Located<EvalError>>;

/// Calcula el valor de una expresión.
///
/// El operando izquierdo de una operación binaria siempre se evalúa antes
/// que el derecho. Los errores señalan al operador que falló.
pub fn evaluate(node: &SyntaxNode) -> Eval {
    match node {
        // Un literal fuera de rango ya produjo un diagnóstico
        SyntaxNode::Number { literal } => Ok(literal.value().unwrap_or(0)),

        SyntaxNode::Unary { operator, operand } => {
            let value = evaluate(operand)?;
            match operator.kind() {
                TokenKind::Plus => Ok(value),
                TokenKind::Minus => value
                    .checked_neg()
                    .ok_or_else(|| fail(operator, EvalError::Overflow)),
                kind => Err(fail(operator, EvalError::BadOperator(kind))),
            }
        }

        SyntaxNode::Binary { .. } => chain(node),
        SyntaxNode::Parenthesized { expression, .. } => evaluate(expression),
    }
}

/// Evalúa una cadena `a op b op c ...` asociada a la izquierda.
///
/// Se desciende por los operandos izquierdos hasta el primero que no es
/// binario y luego se pliegan los operandos derechos en orden de aparición.
fn chain(node: &SyntaxNode) -> Eval {
    let mut spine = Vec::new();
    let mut first = node;

    while let SyntaxNode::Binary {
        left,
        operator,
        right,
    } = first
    {
        spine.push((operator, &**right));
        first = &**left;
    }

    let mut value = evaluate(first)?;
    for (operator, right) in spine.into_iter().rev() {
        let right = evaluate(right)?;
        value = binary(operator, value, right)?;
    }

    Ok(value)
}

fn binary(operator: &Token, left: i32, right: i32) -> Eval {
    let result = match operator.kind() {
        TokenKind::Plus => left.checked_add(right),
        TokenKind::Minus => left.checked_sub(right),
        TokenKind::Star => left.checked_mul(right),

        // Truncamiento hacia cero; `i32::MIN / -1` se desborda
        TokenKind::Slash if right == 0 => {
            return Err(fail(operator, EvalError::DivisionByZero));
        }

        TokenKind::Slash => left.checked_div(right),
        kind => return Err(fail(operator, EvalError::BadOperator(kind))),
    };

    result.ok_or_else(|| fail(operator, EvalError::Overflow))
}

fn fail(operator: &Token, error: EvalError) -> Located<EvalError> {
    Located::at(error, operator.span())
}
