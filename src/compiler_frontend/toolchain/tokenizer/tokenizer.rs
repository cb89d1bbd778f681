use crate::compiler_frontend::compiler_errors::CompilerError;
use crate::compiler_frontend::string_interning::StringTable;
use crate::compiler_frontend::toolchain::tokenizer::tokens::{
    FileTokens, Token, TokenKind, TokenStream,
};
use crate::projects::settings;
use crate::{return_syntax_error, token_log};
use std::path::Path;

macro_rules! return_token {
    ($kind:expr, $stream:expr $(,)?) => {
        return Ok(Token::new($kind, $stream.new_location()))
    };
}

pub fn tokenize(
    source_code: &str,
    src_path: &Path,
    string_table: &mut StringTable,
) -> Result<FileTokens, CompilerError> {
    let initial_capacity = source_code.len() / settings::SRC_TO_TOKEN_RATIO;

    let mut tokens: Vec<Token> = Vec::with_capacity(initial_capacity);
    let mut stream = TokenStream::new(source_code);

    loop {
        let token = get_token_kind(&mut stream, src_path, string_table)?;
        token_log!(#token);

        let is_eof = token.kind == TokenKind::Eof;
        tokens.push(token);

        if is_eof {
            break;
        }
    }

    Ok(FileTokens::new(src_path.to_path_buf(), tokens))
}

pub fn get_token_kind(
    stream: &mut TokenStream,
    src_path: &Path,
    string_table: &mut StringTable,
) -> Result<Token, CompilerError> {
    let mut current_char = match stream.next() {
        Some(ch) => ch,
        None => return_token!(TokenKind::Eof, stream),
    };

    // Whitespace and comments
    loop {
        if current_char.is_whitespace() {
            current_char = match stream.next() {
                Some(ch) => ch,
                None => return_token!(TokenKind::Eof, stream),
            };
            continue;
        }

        if current_char == '/' && stream.peek() == Some(&'/') {
            while let Some(&ch) = stream.peek() {
                if ch == '\n' {
                    break;
                }
                stream.next();
            }
            current_char = match stream.next() {
                Some(ch) => ch,
                None => return_token!(TokenKind::Eof, stream),
            };
            continue;
        }

        if current_char == '/' && stream.peek() == Some(&'*') {
            stream.update_start_position();
            stream.next();
            let mut previous = ' ';
            let mut closed = false;
            while let Some(ch) = stream.next() {
                if previous == '*' && ch == '/' {
                    closed = true;
                    break;
                }
                previous = ch;
            }

            if !closed {
                return_syntax_error!(
                    "Unterminated block comment",
                    stream.new_location().to_error_location(src_path),
                    {
                        CompilationStage => "Tokenization",
                        SuggestedInsertion => "*/",
                    }
                )
            }

            current_char = match stream.next() {
                Some(ch) => ch,
                None => return_token!(TokenKind::Eof, stream),
            };
            continue;
        }

        break;
    }

    // To ignore leading whitespace for the next token position.
    // The position has already moved past current_char, so step back one column.
    stream.start_position = stream.position;
    stream.start_position.char_column -= 1;

    if current_char.is_alphabetic() || current_char == '_' || current_char == '$' {
        let mut token_value = String::from(current_char);
        while let Some(&ch) = stream.peek() {
            if !is_identifier_char(ch) {
                break;
            }
            token_value.push(ch);
            stream.next();
        }

        if let Some(keyword) = TokenKind::from_keyword(&token_value) {
            return_token!(keyword, stream);
        }

        let id = string_table.get_or_intern(token_value);
        return_token!(TokenKind::Identifier(id), stream);
    }

    if current_char.is_ascii_digit()
        || (current_char == '.' && stream.peek().is_some_and(|c| c.is_ascii_digit()))
    {
        return tokenize_number(current_char, stream, src_path);
    }

    if current_char == '"' {
        let mut token_value = String::new();
        loop {
            match stream.next() {
                Some('"') => break,
                Some('\\') => token_value.push(read_escape(stream, src_path)?),
                Some('\n') | None => {
                    return_syntax_error!(
                        "Unterminated string literal",
                        stream.new_location().to_error_location(src_path),
                        {
                            CompilationStage => "Tokenization",
                            PrimarySuggestion => "Close the string with '\"' before the end of the line",
                            SuggestedInsertion => "\"",
                        }
                    )
                }
                Some(ch) => token_value.push(ch),
            }
        }

        let id = string_table.get_or_intern(token_value);
        return_token!(TokenKind::StringLiteral(id), stream);
    }

    if current_char == '\'' {
        let value = match stream.next() {
            Some('\\') => read_escape(stream, src_path)?,
            Some(ch) if ch != '\'' && ch != '\n' => ch,
            _ => {
                return_syntax_error!(
                    "Expected a character after the single quote in a char literal",
                    stream.new_location().to_error_location(src_path),
                    {
                        CompilationStage => "Tokenization",
                        PrimarySuggestion => "Character literals must be exactly one character between single quotes",
                        SuggestedReplacement => "'x'",
                    }
                )
            }
        };

        if stream.next() != Some('\'') {
            return_syntax_error!(
                "Unterminated char literal",
                stream.new_location().to_error_location(src_path),
                {
                    CompilationStage => "Tokenization",
                    SuggestedInsertion => "'",
                }
            )
        }

        return_token!(TokenKind::CharLiteral(value), stream);
    }

    let kind = match current_char {
        '{' => TokenKind::OpenCurly,
        '}' => TokenKind::CloseCurly,
        '(' => TokenKind::OpenParenthesis,
        ')' => TokenKind::CloseParenthesis,
        '[' => TokenKind::OpenBracket,
        ']' => TokenKind::CloseBracket,
        // Never combined into shift operators, so nested generics close one '>' at a time
        '<' => TokenKind::LessThan,
        '>' => TokenKind::GreaterThan,
        ',' => TokenKind::Comma,
        '.' => TokenKind::Dot,
        ';' => TokenKind::Semicolon,
        '=' => TokenKind::Assign,
        '?' => TokenKind::QuestionMark,
        '&' => TokenKind::Ampersand,
        '@' => TokenKind::At,
        '*' => TokenKind::Star,
        '-' => TokenKind::Minus,
        _ => {
            return_syntax_error!(
                format!("Unexpected character '{current_char}'"),
                stream.new_location().to_error_location(src_path),
                {
                    CompilationStage => "Tokenization",
                }
            )
        }
    };

    return_token!(kind, stream);
}

fn is_identifier_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_' || ch == '$'
}

fn read_escape(stream: &mut TokenStream, src_path: &Path) -> Result<char, CompilerError> {
    let escaped = match stream.next() {
        Some('n') => '\n',
        Some('t') => '\t',
        Some('r') => '\r',
        Some('b') => '\u{8}',
        Some('f') => '\u{c}',
        Some('s') => ' ',
        Some('\\') => '\\',
        Some('\'') => '\'',
        Some('"') => '"',
        Some('u') => return read_unicode_escape(stream, src_path),
        Some(digit @ '0'..='7') => read_octal_escape(digit, stream),
        other => {
            return_syntax_error!(
                format!("Invalid escape sequence '\\{}'", other.unwrap_or(' ')),
                stream.new_location().to_error_location(src_path),
                {
                    CompilationStage => "Tokenization",
                }
            )
        }
    };
    Ok(escaped)
}

/// `\u` may repeat its 'u' any number of times before the four hex digits.
fn read_unicode_escape(stream: &mut TokenStream, src_path: &Path) -> Result<char, CompilerError> {
    while stream.peek() == Some(&'u') {
        stream.next();
    }

    let mut code = 0u32;
    for _ in 0..4 {
        match stream.next().and_then(|ch| ch.to_digit(16)) {
            Some(digit) => code = code * 16 + digit,
            None => {
                return_syntax_error!(
                    "Unicode escapes need exactly four hex digits",
                    stream.new_location().to_error_location(src_path),
                    {
                        CompilationStage => "Tokenization",
                        PrimarySuggestion => "Write the code unit as '\\u' followed by four hex digits, like '\\u0041'",
                    }
                )
            }
        }
    }

    // Lone surrogates have no char of their own
    Ok(char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER))
}

/// Up to three octal digits, with the largest escape being `\377`
fn read_octal_escape(first_digit: char, stream: &mut TokenStream) -> char {
    let max_digits = if first_digit <= '3' { 3 } else { 2 };
    let mut value = first_digit.to_digit(8).unwrap_or(0);

    for _ in 1..max_digits {
        match stream.peek().and_then(|ch| ch.to_digit(8)) {
            Some(digit) => {
                value = value * 8 + digit;
                stream.next();
            }
            None => break,
        }
    }

    char::from(value as u8)
}

/// Pushes the digits of the given radix that come next, dropping underscores.
/// Returns false when there were none.
fn push_digits(stream: &mut TokenStream, token_value: &mut String, radix: u32) -> bool {
    let mut found = false;
    while let Some(&ch) = stream.peek() {
        if ch == '_' {
            stream.next();
            continue;
        }
        if !ch.is_digit(radix) {
            break;
        }
        token_value.push(ch);
        found = true;
        stream.next();
    }
    found
}

fn tokenize_number(
    first_char: char,
    stream: &mut TokenStream,
    src_path: &Path,
) -> Result<Token, CompilerError> {
    if first_char == '0' {
        let radix = match stream.peek() {
            Some('x') | Some('X') => Some(16),
            Some('b') | Some('B') => Some(2),
            _ => None,
        };
        if let Some(radix) = radix {
            stream.next();
            return tokenize_prefixed_integer(radix, stream, src_path);
        }
    }

    let mut token_value = String::from(first_char);
    let mut is_float = first_char == '.';
    push_digits(stream, &mut token_value, 10);

    // A dot only continues the number when a digit follows, so `1.toString` is not a float
    if !is_float && stream.peek() == Some(&'.') {
        let mut lookahead = stream.chars.clone();
        lookahead.next();
        if lookahead.peek().is_some_and(|c| c.is_ascii_digit()) {
            is_float = true;
            token_value.push('.');
            stream.next();
            push_digits(stream, &mut token_value, 10);
        }
    }

    if matches!(stream.peek(), Some('e') | Some('E')) {
        is_float = true;
        token_value.push('e');
        stream.next();

        if let Some(&sign) = stream.peek()
            && (sign == '+' || sign == '-')
        {
            token_value.push(sign);
            stream.next();
        }

        if !push_digits(stream, &mut token_value, 10) {
            return_syntax_error!(
                format!("Missing digits after the exponent in '{token_value}'"),
                stream.new_location().to_error_location(src_path),
                {
                    CompilationStage => "Tokenization",
                    PrimarySuggestion => "Exponents are written like '1e10' or '1.5e-3'",
                }
            )
        }
    }

    let suffix = stream.peek().copied();
    let kind = match suffix {
        Some('L') | Some('l') if !is_float => {
            stream.next();
            integer_kind(&token_value, decimal_or_octal(&token_value), true)
        }
        Some('f') | Some('F') => {
            stream.next();
            token_value.parse::<f64>().ok().map(TokenKind::FloatLiteral)
        }
        Some('d') | Some('D') => {
            stream.next();
            token_value.parse::<f64>().ok().map(TokenKind::DoubleLiteral)
        }
        // Out of range doubles become infinite rather than failing the whole file
        _ if is_float => token_value.parse::<f64>().ok().map(TokenKind::DoubleLiteral),
        _ => integer_kind(&token_value, decimal_or_octal(&token_value), false),
    };

    match kind {
        Some(kind) => return_token!(kind, stream),
        None => return_syntax_error!(
            format!("Invalid numeric literal '{token_value}'"),
            stream.new_location().to_error_location(src_path),
            {
                CompilationStage => "Tokenization",
            }
        ),
    }
}

/// Hex and binary literals, after their `0x` or `0b` prefix
fn tokenize_prefixed_integer(
    radix: u32,
    stream: &mut TokenStream,
    src_path: &Path,
) -> Result<Token, CompilerError> {
    let mut digits = String::new();
    push_digits(stream, &mut digits, radix);

    let is_long = matches!(stream.peek(), Some('L') | Some('l'));
    if is_long {
        stream.next();
    }

    match integer_kind(&digits, radix, is_long) {
        Some(kind) => return_token!(kind, stream),
        None => {
            let prefix = if radix == 16 { "0x" } else { "0b" };
            return_syntax_error!(
                format!("Invalid numeric literal '{prefix}{digits}'"),
                stream.new_location().to_error_location(src_path),
                {
                    CompilationStage => "Tokenization",
                }
            )
        }
    }
}

/// A leading zero makes an integer octal
fn decimal_or_octal(token_value: &str) -> u32 {
    if token_value.len() > 1 && token_value.starts_with('0') {
        8
    } else {
        10
    }
}

/// Non-decimal literals fill the whole width, so `0xFFFFFFFF` is the int -1.
fn integer_kind(digits: &str, radix: u32, is_long: bool) -> Option<TokenKind> {
    if radix == 10 {
        let value = digits.parse::<i64>().ok()?;
        return Some(match is_long {
            true => TokenKind::LongLiteral(value),
            false => TokenKind::IntLiteral(value),
        });
    }

    let value = u64::from_str_radix(digits, radix).ok()?;
    if is_long {
        return Some(TokenKind::LongLiteral(value as i64));
    }

    let value = u32::try_from(value).ok()?;
    Some(TokenKind::IntLiteral(value as i32 as i64))
}

#[cfg(test)]
#[path = "tests/tokenizer_tests.rs"]
mod tests;
