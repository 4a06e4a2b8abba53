//! Front end para expresiones aritméticas enteras.
//!
//! # Pipeline
//! Cada línea de entrada se procesa de forma independiente. La línea se
//! somete primero a análisis léxico en [`lex`], de lo cual se obtiene un
//! flujo de tokens. El flujo de tokens se dispone en un árbol sintáctico
//! ([`syntax`]) por medio de análisis sintáctico en [`parse`]. Si ninguna
//! de estas fases registró diagnósticos ([`error`]), el árbol se evalúa en
//! [`eval`] hasta obtener un entero.
//!
//! # Errores
//! Lexer y parser se recuperan de errores y los reportan como diagnósticos.
//! La evaluación, en cambio, falla con un error tipado, ya que sus errores
//! dependen de valores y no de sintaxis. Ninguna de las dos situaciones
//! termina el proceso.

pub mod error;
pub mod eval;
pub mod lex;
pub mod parse;
pub mod source;
pub mod syntax;

use thiserror::Error;
use tracing::debug;

use crate::{error::Diagnostics, eval::EvalError, source::Located, syntax::SyntaxTree};

/// Razón por la cual una línea no produjo un valor.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Failure {
    /// La línea está mal formada; no se intentó evaluar.
    #[error("{}", count_errors(.0))]
    Syntax(Diagnostics),

    /// La línea es válida pero su evaluación falló.
    #[error("{}", .0.val())]
    Runtime(Located<EvalError>),
}

fn count_errors(diagnostics: &Diagnostics) -> String {
    match diagnostics.len() {
        1 => String::from("1 syntax error"),
        n => format!("{} syntax errors", n),
    }
}

/// Analiza y evalúa una línea.
pub fn compute(text: &str) -> Result<i32, Failure> {
    evaluate_tree(parse::parse(text))
}

/// Evalúa un árbol ya construido, a menos que traiga diagnósticos.
pub fn evaluate_tree(tree: SyntaxTree) -> Result<i32, Failure> {
    debug!(diagnostics = tree.diagnostics().len(), "parsed line");

    let (root, diagnostics) = tree.into_parts();
    if !diagnostics.is_empty() {
        return Err(Failure::Syntax(diagnostics));
    }

    let value = eval::evaluate(&root).map_err(Failure::Runtime)?;
    debug!(value, "evaluated line");

    Ok(value)
}
