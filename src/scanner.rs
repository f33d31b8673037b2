use crate::error::Error;

/// Byte cursor for the geometry literal parser.
pub(crate) struct Scanner<'a> {
    input: &'a [u8],
    position: usize,
}

impl<'a> Scanner<'a> {
    pub fn new(input: &'a str) -> Scanner<'a> {
        Scanner {
            input: input.as_bytes(),
            position: 0,
        }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn error(&self, message: impl Into<String>) -> Error {
        Error::Parse {
            offset: self.position,
            message: message.into(),
        }
    }

    pub fn skip_whitespace(&mut self) {
        while let Some(byte) = self.input.get(self.position) {
            if !byte.is_ascii_whitespace() {
                break;
            }
            self.position += 1;
        }
    }

    /// Next non-whitespace byte, not consumed.
    pub fn peek(&mut self) -> Option<u8> {
        self.skip_whitespace();
        self.input.get(self.position).copied()
    }

    /// Consumes `byte` if it is next.
    pub fn eat(&mut self, byte: u8) -> bool {
        if self.peek() == Some(byte) {
            self.position += 1;
            true
        } else {
            false
        }
    }

    pub fn expect(&mut self, byte: u8) -> Result<(), Error> {
        if self.eat(byte) {
            return Ok(());
        }
        Err(match self.peek() {
            Some(found) => self.error(format!(
                "expected '{}', but got '{}'",
                byte as char, found as char
            )),
            None => self.error(format!("expected '{}', but input ended", byte as char)),
        })
    }

    /// Reads an ASCII identifier (letters, digits, underscores). Empty if none follows.
    pub fn word(&mut self) -> &'a str {
        let input = self.input;
        self.skip_whitespace();
        let start = self.position;
        while let Some(byte) = input.get(self.position) {
            if !(byte.is_ascii_alphanumeric() || *byte == b'_') {
                break;
            }
            self.position += 1;
        }
        // only ASCII was consumed, so this cannot fail
        std::str::from_utf8(&input[start..self.position]).unwrap_or_default()
    }

    pub fn number(&mut self) -> Result<f64, Error> {
        self.skip_whitespace();
        let start = self.position;

        self.consume_while(|b| b == b'-' || b == b'+', 1);
        let digits = self.consume_while(|b| b.is_ascii_digit(), usize::MAX);
        let mut fraction = 0;
        if self.input.get(self.position) == Some(&b'.') {
            self.position += 1;
            fraction = self.consume_while(|b| b.is_ascii_digit(), usize::MAX);
        }
        if digits + fraction == 0 {
            self.position = start;
            return Err(self.error("expected a number"));
        }
        if matches!(self.input.get(self.position), Some(b'e' | b'E')) {
            self.position += 1;
            self.consume_while(|b| b == b'-' || b == b'+', 1);
            if self.consume_while(|b| b.is_ascii_digit(), usize::MAX) == 0 {
                return Err(self.error("expected exponent digits"));
            }
        }

        let text = std::str::from_utf8(&self.input[start..self.position]).unwrap_or_default();
        text.parse::<f64>().map_err(|_| Error::Parse {
            offset: start,
            message: format!("invalid number '{text}'"),
        })
    }

    pub fn expect_end(&mut self) -> Result<(), Error> {
        match self.peek() {
            None => Ok(()),
            Some(byte) => Err(self.error(format!("unexpected trailing '{}'", byte as char))),
        }
    }

    fn consume_while(&mut self, predicate: impl Fn(u8) -> bool, limit: usize) -> usize {
        let mut count = 0;
        while count < limit {
            match self.input.get(self.position) {
                Some(&byte) if predicate(byte) => {
                    self.position += 1;
                    count += 1;
                }
                _ => break,
            }
        }
        count
    }
}
