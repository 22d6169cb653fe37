use crate::error::Result;
use crate::lexer::Lexer;
use crate::types::Token;

/// Iterator over lexer tokens; yields at most one error, then ends.
pub struct Tokens<'a> {
    lexer: Lexer<'a>,
}

impl<'a> Tokens<'a> {
    pub fn new(lexer: Lexer<'a>) -> Self {
        Self { lexer }
    }
}

impl<'a> Iterator for Tokens<'a> {
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        self.lexer.next_token()
    }
}
