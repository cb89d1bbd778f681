use crate::compiler_frontend::compiler_errors::CharPosition;
use crate::compiler_frontend::string_interning::{StringId, StringTable};
use crate::compiler_frontend::toolchain::syntax::{PrimitiveTag, TextLocation};
use crate::token_log;
use std::iter::Peekable;
use std::path::{Path, PathBuf};
use std::str::Chars;

#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub location: TextLocation,
}

impl Token {
    pub fn new(kind: TokenKind, location: TextLocation) -> Self {
        Self { kind, location }
    }
}

#[derive(Clone, Debug)]
pub struct FileTokens {
    pub tokens: Vec<Token>,
    pub src_path: PathBuf,
    pub index: usize,
}

impl FileTokens {
    pub fn new(src_path: PathBuf, tokens: Vec<Token>) -> FileTokens {
        FileTokens {
            src_path,
            tokens,
            index: 0,
        }
    }

    pub fn current_token_kind(&self) -> &TokenKind {
        // The tokenizer always ends the stream with Eof and advance never moves past it
        &self.tokens[self.index.min(self.tokens.len() - 1)].kind
    }

    pub fn peek_kind(&self, offset: usize) -> &TokenKind {
        let last = self.tokens.len() - 1;
        &self.tokens[(self.index + offset).min(last)].kind
    }

    pub fn current_location(&self) -> TextLocation {
        self.tokens[self.index.min(self.tokens.len() - 1)].location
    }

    /// Location of the token before the current one, for closing spans
    pub fn previous_location(&self) -> TextLocation {
        self.tokens[self.index.saturating_sub(1)].location
    }

    pub fn advance(&mut self) {
        match self.current_token_kind() {
            // Can't advance past End of File
            TokenKind::Eof => {
                token_log!(Red "Parser tried to advance past EOF");
            }

            _ => {
                self.index += 1;
            }
        }
    }

    /// Consume the current token if it matches
    pub fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.current_token_kind() == kind {
            self.advance();
            true
        } else {
            false
        }
    }

    pub fn path(&self) -> &Path {
        &self.src_path
    }
}

pub struct TokenStream<'a> {
    pub chars: Peekable<Chars<'a>>,
    pub position: CharPosition,
    pub start_position: CharPosition,
}

impl<'a> TokenStream<'a> {
    pub fn new(source_code: &'a str) -> Self {
        Self {
            chars: source_code.chars().peekable(),
            position: CharPosition::default(),
            start_position: CharPosition::default(),
        }
    }

    pub fn next(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        if c == '\n' {
            self.position.line_number += 1;
            self.position.char_column = 0;
        } else {
            self.position.char_column += 1;
        }
        Some(c)
    }

    pub fn peek(&mut self) -> Option<&char> {
        self.chars.peek()
    }

    pub fn new_location(&mut self) -> TextLocation {
        let start_pos = self.start_position;
        self.update_start_position();
        TextLocation::new(start_pos, self.position)
    }

    pub fn update_start_position(&mut self) {
        self.start_position = self.position;
    }
}

#[derive(PartialEq, Debug, Clone)]
pub enum TokenKind {
    Eof,

    Identifier(StringId),

    // Values
    IntLiteral(i64),
    LongLiteral(i64),
    FloatLiteral(f64),
    DoubleLiteral(f64),
    CharLiteral(char),
    StringLiteral(StringId),
    BoolLiteral(bool),
    Null,

    // Declarations
    Package,
    Import,
    Class,
    Interface,
    Enum,
    Extends,
    Implements,
    Super,
    Throws,
    Default,

    // Modifiers
    Public,
    Protected,
    Private,
    Static,
    Final,
    Abstract,

    // Statements and expressions
    Return,
    New,
    This,

    Primitive(PrimitiveTag),

    // Structure of Syntax
    OpenCurly,        // {
    CloseCurly,       // }
    OpenParenthesis,  // (
    CloseParenthesis, // )
    OpenBracket,      // [
    CloseBracket,     // ]
    LessThan,         // <
    GreaterThan,      // >
    Comma,
    Dot,
    Semicolon,
    Assign,       // =
    QuestionMark, // ?
    Ampersand,    // &
    At,           // @
    Star,         // *
    Minus,        // -
}

impl TokenKind {
    pub fn from_keyword(word: &str) -> Option<TokenKind> {
        if let Some(tag) = PrimitiveTag::from_keyword(word) {
            return Some(TokenKind::Primitive(tag));
        }

        let kind = match word {
            "package" => TokenKind::Package,
            "import" => TokenKind::Import,
            "class" => TokenKind::Class,
            "interface" => TokenKind::Interface,
            "enum" => TokenKind::Enum,
            "extends" => TokenKind::Extends,
            "implements" => TokenKind::Implements,
            "super" => TokenKind::Super,
            "throws" => TokenKind::Throws,
            "default" => TokenKind::Default,
            "public" => TokenKind::Public,
            "protected" => TokenKind::Protected,
            "private" => TokenKind::Private,
            "static" => TokenKind::Static,
            "final" => TokenKind::Final,
            "abstract" => TokenKind::Abstract,
            "return" => TokenKind::Return,
            "new" => TokenKind::New,
            "this" => TokenKind::This,
            "null" => TokenKind::Null,
            "true" => TokenKind::BoolLiteral(true),
            "false" => TokenKind::BoolLiteral(false),
            _ => return None,
        };

        Some(kind)
    }

    pub fn get_name(&self, string_table: &StringTable) -> String {
        match self {
            TokenKind::Identifier(name) => string_table.resolve(*name).to_string(),
            TokenKind::StringLiteral(value) => string_table.resolve(*value).to_string(),
            _ => format!("{self:?}"),
        }
    }

    pub fn is_modifier(&self) -> bool {
        matches!(
            self,
            TokenKind::Public
                | TokenKind::Protected
                | TokenKind::Private
                | TokenKind::Static
                | TokenKind::Final
                | TokenKind::Abstract
                | TokenKind::Default
        )
    }
}
