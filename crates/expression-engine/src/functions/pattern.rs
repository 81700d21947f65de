//! SQL `LIKE` matching: `%` matches any run of characters, `_` exactly one,
//! and `\` escapes the next character.

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Any,
    One,
    Literal(char),
}

fn tokenize(pattern: &str) -> Vec<Token> {
    let mut tokens = Vec::with_capacity(pattern.len());
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        match c {
            '%' => tokens.push(Token::Any),
            '_' => tokens.push(Token::One),
            // a trailing backslash matches itself
            '\\' => tokens.push(Token::Literal(chars.next().unwrap_or('\\'))),
            other => tokens.push(Token::Literal(other)),
        }
    }
    tokens
}

pub fn like(input: &str, pattern: &str, case_insensitive: bool) -> bool {
    let (input, pattern) = if case_insensitive {
        (input.to_lowercase(), pattern.to_lowercase())
    } else {
        (input.to_string(), pattern.to_string())
    };
    let text: Vec<char> = input.chars().collect();
    let tokens = tokenize(&pattern);

    // matches[j] == text[..i] matches tokens[..j]
    let mut matches = vec![false; tokens.len() + 1];
    matches[0] = true;
    for (j, token) in tokens.iter().enumerate() {
        matches[j + 1] = matches[j] && *token == Token::Any;
    }

    for ch in &text {
        let mut next = vec![false; tokens.len() + 1];
        for (j, token) in tokens.iter().enumerate() {
            next[j + 1] = match token {
                Token::Any => next[j] || matches[j + 1],
                Token::One => matches[j],
                Token::Literal(c) => matches[j] && c == ch,
            };
        }
        matches = next;
    }

    matches[tokens.len()]
}
