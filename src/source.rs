//! Rastreo de ubicaciones originales en código fuente.
//!
//! Cada línea de entrada se procesa de forma independiente, por lo cual
//! una ubicación se reduce a un rango de bytes dentro de esa línea. Los
//! tokens, nodos y errores de todas las fases cargan un [`Span`], lo cual
//! permite señalar el punto exacto donde ocurre un problema.

use std::{
    fmt::{self, Debug, Display, Formatter},
    ops::Range,
};

/// Un objeto cualquiera con una posición original asociada.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Located<T> {
    span: Span,
    value: T,
}

impl<T> Located<T> {
    /// Obtiene el valor.
    pub fn val(&self) -> &T {
        &self.value
    }

    /// Obtiene la ubicación.
    pub fn span(&self) -> Span {
        self.span
    }

    /// Descarta la ubicación y toma ownership del valor.
    pub fn into_inner(self) -> T {
        self.value
    }

    /// Descompone y toma ownership de las dos partes.
    pub fn split(self) -> (Span, T) {
        (self.span, self.value)
    }

    /// Construye a partir de un valor y una ubicación.
    pub fn at(value: T, span: Span) -> Self {
        Located { value, span }
    }
}

/// Un rango de bytes en la línea de entrada: posición de inicio y longitud.
#[derive(Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct Span {
    start: usize,
    len: usize,
}

impl Span {
    /// Construye un rango a partir de su inicio y longitud.
    pub fn new(start: usize, len: usize) -> Self {
        Span { start, len }
    }

    /// Un rango vacío en una posición.
    pub fn empty(at: usize) -> Self {
        Span { start: at, len: 0 }
    }

    /// Unifica dos rangos, desde el inicio del primero hasta el fin del segundo.
    pub fn to(self, end: Span) -> Self {
        let stop = end.end().max(self.end());
        Span {
            start: self.start,
            len: stop - self.start,
        }
    }

    /// Obtiene la posición de inicio.
    pub fn start(&self) -> usize {
        self.start
    }

    /// Obtiene la longitud en bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Obtiene la posición inmediatamente posterior al rango.
    pub fn end(&self) -> usize {
        self.start + self.len
    }

    /// Rango equivalente para indexar la línea original.
    pub fn range(&self) -> Range<usize> {
        self.start..self.end()
    }
}

impl Display for Span {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        if self.len <= 1 {
            // Solo se señala una columna en específico
            write!(formatter, "{}", self.start)
        } else {
            write!(formatter, "[{}-{}]", self.start, self.end() - 1)
        }
    }
}

impl Debug for Span {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        <Self as Display>::fmt(self, formatter)
    }
}
