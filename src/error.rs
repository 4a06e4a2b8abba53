//! Diagnósticos.
//!
//! Tanto el lexer como el parser se recuperan de errores en vez de abortar.
//! Cada problema encontrado se registra como un [`Diagnostic`] en el sumidero
//! ordenado [`Diagnostics`], el cual debe consultarse antes de evaluar.

use crate::source::{Located, Span};
use std::{
    error::Error,
    fmt::{self, Display},
    slice,
};

/// Un problema no fatal con mensaje y ubicación.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    message: String,
    span: Span,
}

impl Diagnostic {
    pub fn new<S: Into<String>>(message: S, span: Span) -> Self {
        Diagnostic {
            message: message.into(),
            span,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn span(&self) -> Span {
        self.span
    }
}

impl Display for Diagnostic {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.write_str(&self.message)
    }
}

impl<E: Error> From<Located<E>> for Diagnostic {
    fn from(error: Located<E>) -> Self {
        let (span, error) = error.split();
        Diagnostic::new(error.to_string(), span)
    }
}

/// Colección ordenada de diagnósticos.
///
/// Los diagnósticos se conservan en orden de inserción y nunca se
/// remueven. Cada línea de entrada construye su propia colección.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
    pub fn push<D: Into<Diagnostic>>(&mut self, diagnostic: D) {
        self.0.push(diagnostic.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> slice::Iter<'_, Diagnostic> {
        self.0.iter()
    }

    /// Prepara la presentación de estos diagnósticos contra la línea original.
    pub fn report<'a>(&'a self, line: &'a str) -> Report<'a> {
        Report::new(line, &self.0)
    }
}

impl Display for Diagnostics {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, diagnostic) in self.0.iter().enumerate() {
            if i > 0 {
                fmt.write_str("; ")?;
            }

            write!(fmt, "{} at {}", diagnostic.message, diagnostic.span)?;
        }

        Ok(())
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl From<Vec<Diagnostic>> for Diagnostics {
    fn from(diagnostics: Vec<Diagnostic>) -> Self {
        Diagnostics(diagnostics)
    }
}

/// Presentación de diagnósticos para la terminal.
///
/// Cada diagnóstico se muestra con la línea original y un subrayado de
/// `^` bajo el rango que señala.
pub struct Report<'a> {
    kind: &'static str,
    line: &'a str,
    diagnostics: &'a [Diagnostic],
}

impl<'a> Report<'a> {
    pub fn new(line: &'a str, diagnostics: &'a [Diagnostic]) -> Self {
        Report {
            kind: "error",
            line,
            diagnostics,
        }
    }

    pub fn kind(self, kind: &'static str) -> Self {
        Report { kind, ..self }
    }
}

impl Display for Report<'_> {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Report {
            kind,
            line,
            diagnostics,
        } = self;

        for diagnostic in diagnostics.iter() {
            writeln!(fmt, "{}: {}", kind, diagnostic.message)?;

            // Las columnas se cuentan en caracteres, no en bytes
            let span = diagnostic.span;
            let skip = line.get(..span.start()).map_or(0, |s| s.chars().count());
            let highlight = line
                .get(span.range())
                .map_or(0, |s| s.chars().count())
                .max(1);

            writeln!(fmt, "  | {}", line)?;
            writeln!(
                fmt,
                "  | {:skip$}{:^<highlight$}",
                "",
                "",
                skip = skip,
                highlight = highlight
            )?;
        }

        Ok(())
    }
}
