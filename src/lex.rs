//! Análisis léxico.
//!
//! # Tokenization
//! Esta es la primera fase del front end. Descompone una línea de texto en
//! unidades léxicas denominadas tokens. A diferencia de fases posteriores,
//! el lexer sí emite tokens de espacios en blanco; es el parser quien los
//! descarta. Cada token conserva su lexema exacto y su posición en la línea,
//! lo cual permite rastrear errores tanto en los tokens como en constructos
//! más elevados.
//!
//! # Contenido de un token
//! Todo token incluye su lexema original. Las constantes literales además se
//! resuelven a su valor entero, el cual queda disponible en [`Token::value`].
//!
//! # Errores
//! El lexer nunca se detiene ante un error. Un carácter desconocido produce
//! un token [`TokenKind::Invalid`] de exactamente un carácter y una constante
//! fuera de rango produce un [`TokenKind::Number`] sin valor. En ambos casos
//! se registra un diagnóstico.

use crate::{
    error::Diagnostics,
    source::{Located, Span},
};
use std::fmt::{self, Display};

use thiserror::Error;

/// Literal entero máximo.
const INT_MAX: i32 = i32::MAX;

/// Error de escaneo.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LexerError {
    /// Carácter desconocido o inesperado en el flujo de entrada.
    #[error("unexpected character '{0}' at position {1}")]
    BadChar(char, usize),

    /// Una constante entera se encuentra fuera de rango.
    #[error("invalid number '{0}', valid range is [0, {max}]", max = INT_MAX)]
    IntOverflow(String),
}

/// Clase de un token.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Number,
    Plus,
    Minus,
    Star,
    Slash,
    OpenParen,
    CloseParen,
    Whitespace,
    Invalid,
    EndOfFile,
}

impl Display for TokenKind {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        use TokenKind::*;

        let string = match self {
            Number     => "Number",
            Plus       => "Plus",
            Minus      => "Minus",
            Star       => "Star",
            Slash      => "Slash",
            OpenParen  => "OpenParen",
            CloseParen => "CloseParen",
            Whitespace => "Whitespace",
            Invalid    => "Invalid",
            EndOfFile  => "EndOfFile",
        };

        fmt.write_str(string)
    }
}

/// Objeto resultante del análisis léxico.
///
/// Un token contiene suficiente información para describir completamente
/// a una entidad léxica en la línea fuente. Los tokens son inmutables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    kind: TokenKind,
    position: usize,
    text: String,
    value: Option<i32>,
}

impl Token {
    pub fn new<S>(kind: TokenKind, position: usize, text: S, value: Option<i32>) -> Self
    where
        S: Into<String>,
    {
        Token {
            kind,
            position,
            text: text.into(),
            value,
        }
    }

    /// Token sintetizado por el parser en lugar de uno ausente.
    ///
    /// No tiene lexema, por lo cual su rango es vacío.
    pub fn missing(kind: TokenKind, position: usize) -> Self {
        Token::new(kind, position, "", None)
    }

    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    /// Posición en bytes del inicio del token.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Lexema exacto. Es vacío para [`TokenKind::EndOfFile`].
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Valor de un literal entero, si cupo en el rango válido.
    pub fn value(&self) -> Option<i32> {
        self.value
    }

    pub fn span(&self) -> Span {
        Span::new(self.position, self.text.len())
    }
}

/// Escáner de una línea de texto.
///
/// El lexer avanza carácter por carácter y acumula los diagnósticos que
/// encuentra en el camino. Como iterador, emite [`TokenKind::EndOfFile`]
/// exactamente una vez y luego termina.
pub struct Lexer<'a> {
    text: &'a str,
    position: usize,
    diagnostics: Diagnostics,
    finished: bool,
}

impl<'a> Lexer<'a> {
    /// Crea un lexer posicionado al inicio de la línea.
    pub fn new(text: &'a str) -> Self {
        Lexer {
            text,
            position: 0,
            diagnostics: Diagnostics::default(),
            finished: false,
        }
    }

    /// Escanea una línea completa.
    ///
    /// La secuencia resultante siempre termina en [`TokenKind::EndOfFile`].
    pub fn tokenize(text: &'a str) -> (Vec<Token>, Diagnostics) {
        let mut lexer = Lexer::new(text);
        let tokens: Vec<Token> = lexer.by_ref().collect();

        (tokens, lexer.into_diagnostics())
    }

    pub fn into_diagnostics(self) -> Diagnostics {
        self.diagnostics
    }

    /// Construye el token que inicia en la posición actual.
    ///
    /// Nunca se emite un token vacío, excepto al final de la entrada.
    pub fn next_token(&mut self) -> Token {
        use TokenKind::*;

        let start = self.position;
        let c = match self.current() {
            Some(c) => c,
            None => return Token::new(EndOfFile, start, "", None),
        };

        let kind = if c.is_ascii_digit() {
            self.consume_while(|c| c.is_ascii_digit());
            Number
        } else if c.is_whitespace() {
            self.consume_while(char::is_whitespace);
            Whitespace
        } else {
            // Operadores y puntuación miden un solo carácter, al igual que
            // los caracteres inválidos
            self.position += c.len_utf8();
            match c {
                '+' => Plus,
                '-' => Minus,
                '*' => Star,
                '/' => Slash,
                '(' => OpenParen,
                ')' => CloseParen,
                _ => {
                    let error = LexerError::BadChar(c, start);
                    self.diagnostics
                        .push(Located::at(error, Span::new(start, c.len_utf8())));

                    Invalid
                }
            }
        };

        let source = self.text;
        let text = &source[start..self.position];
        let value = match kind {
            Number => self.integer(text, start),
            _ => None,
        };

        Token::new(kind, start, text, value)
    }

    /// Resuelve el valor de una constante entera.
    fn integer(&mut self, text: &str, start: usize) -> Option<i32> {
        match text.parse::<i32>() {
            Ok(value) => Some(value),
            Err(_) => {
                let error = LexerError::IntOverflow(text.to_owned());
                self.diagnostics
                    .push(Located::at(error, Span::new(start, text.len())));

                None
            }
        }
    }

    fn current(&self) -> Option<char> {
        self.text[self.position..].chars().next()
    }

    fn consume_while<F>(&mut self, condition: F)
    where
        F: Fn(char) -> bool,
    {
        while let Some(c) = self.current() {
            if !condition(c) {
                break;
            }

            self.position += c.len_utf8();
        }
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if self.finished {
            return None;
        }

        let token = self.next_token();
        self.finished = token.kind() == TokenKind::EndOfFile;

        Some(token)
    }
}
