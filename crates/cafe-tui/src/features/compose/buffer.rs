//! Multi-line edit buffer behind the composer.

use crate::common::text::wrapped_rows;

/// Line storage with a (row, col) cursor in char units.
#[derive(Debug, Clone)]
pub struct ComposeBuffer {
    lines: Vec<String>,
    row: usize,
    col: usize,
}

impl Default for ComposeBuffer {
    fn default() -> Self {
        Self {
            lines: vec![String::new()],
            row: 0,
            col: 0,
        }
    }
}

impl ComposeBuffer {
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn cursor(&self) -> (usize, usize) {
        (self.row, self.col)
    }

    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    pub fn is_blank(&self) -> bool {
        self.lines.iter().all(|line| line.trim().is_empty())
    }

    pub fn first_char(&self) -> Option<char> {
        self.lines.first().and_then(|line| line.chars().next())
    }

    /// Replaces the contents, leaving the cursor at the end.
    pub fn set_text(&mut self, text: &str) {
        self.lines = text.split('\n').map(str::to_string).collect();
        self.row = self.lines.len() - 1;
        self.col = char_len(&self.lines[self.row]);
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn insert_str(&mut self, text: &str) {
        for (idx, part) in text.split('\n').enumerate() {
            if idx > 0 {
                self.insert_newline();
            }
            if part.is_empty() {
                continue;
            }
            let line = &mut self.lines[self.row];
            let at = byte_index(line, self.col);
            line.insert_str(at, part);
            self.col += part.chars().count();
        }
    }

    pub fn insert_char(&mut self, ch: char) {
        if ch == '\n' {
            self.insert_newline();
        } else {
            let mut buf = [0u8; 4];
            self.insert_str(ch.encode_utf8(&mut buf));
        }
    }

    pub fn insert_newline(&mut self) {
        let line = &mut self.lines[self.row];
        let at = byte_index(line, self.col);
        let rest = line.split_off(at);
        self.lines.insert(self.row + 1, rest);
        self.row += 1;
        self.col = 0;
    }

    pub fn backspace(&mut self) {
        if self.col > 0 {
            let line = &mut self.lines[self.row];
            let start = byte_index(line, self.col - 1);
            let end = byte_index(line, self.col);
            line.replace_range(start..end, "");
            self.col -= 1;
        } else if self.row > 0 {
            let current = self.lines.remove(self.row);
            self.row -= 1;
            self.col = char_len(&self.lines[self.row]);
            self.lines[self.row].push_str(&current);
        }
    }

    pub fn delete(&mut self) {
        let len = char_len(&self.lines[self.row]);
        if self.col < len {
            let line = &mut self.lines[self.row];
            let start = byte_index(line, self.col);
            let end = byte_index(line, self.col + 1);
            line.replace_range(start..end, "");
        } else if self.row + 1 < self.lines.len() {
            let next = self.lines.remove(self.row + 1);
            self.lines[self.row].push_str(&next);
        }
    }

    pub fn move_left(&mut self) {
        if self.col > 0 {
            self.col -= 1;
        } else if self.row > 0 {
            self.row -= 1;
            self.col = char_len(&self.lines[self.row]);
        }
    }

    pub fn move_right(&mut self) {
        if self.col < char_len(&self.lines[self.row]) {
            self.col += 1;
        } else if self.row + 1 < self.lines.len() {
            self.row += 1;
            self.col = 0;
        }
    }

    pub fn move_up(&mut self) {
        if self.row > 0 {
            self.row -= 1;
            self.col = self.col.min(char_len(&self.lines[self.row]));
        }
    }

    pub fn move_down(&mut self) {
        if self.row + 1 < self.lines.len() {
            self.row += 1;
            self.col = self.col.min(char_len(&self.lines[self.row]));
        }
    }

    pub fn move_home(&mut self) {
        self.col = 0;
    }

    pub fn move_end(&mut self) {
        self.col = char_len(&self.lines[self.row]);
    }

    /// Removes a leading `/`, keeping the cursor on the same character.
    pub fn strip_leading_slash(&mut self) -> bool {
        if self.first_char() != Some('/') {
            return false;
        }
        self.lines[0].remove(0);
        if self.row == 0 && self.col > 0 {
            self.col -= 1;
        }
        true
    }

    /// Rows needed to show every line wrapped at `width` columns.
    pub fn visual_rows(&self, width: usize) -> usize {
        self.lines
            .iter()
            .map(|line| wrapped_rows(line, width))
            .sum()
    }
}

fn char_len(line: &str) -> usize {
    line.chars().count()
}

fn byte_index(line: &str, col: usize) -> usize {
    line.char_indices()
        .nth(col)
        .map_or(line.len(), |(idx, _)| idx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_newline() {
        let mut buf = ComposeBuffer::default();
        buf.insert_str("hello");
        buf.insert_newline();
        buf.insert_str("world");

        assert_eq!(buf.text(), "hello\nworld");
        assert_eq!(buf.cursor(), (1, 5));
    }

    #[test]
    fn test_backspace_joins_lines() {
        let mut buf = ComposeBuffer::default();
        buf.set_text("ab\ncd");
        buf.move_home();
        buf.backspace();

        assert_eq!(buf.text(), "abcd");
        assert_eq!(buf.cursor(), (0, 2));
    }

    #[test]
    fn test_strip_leading_slash_keeps_cursor_on_text() {
        let mut buf = ComposeBuffer::default();
        buf.set_text("/hello");

        assert!(buf.strip_leading_slash());
        assert_eq!(buf.text(), "hello");
        assert_eq!(buf.cursor(), (0, 5));
        assert!(!buf.strip_leading_slash());
    }

    #[test]
    fn test_multibyte_editing() {
        let mut buf = ComposeBuffer::default();
        buf.insert_str("café");
        buf.move_left();
        buf.delete();
        buf.insert_char('e');

        assert_eq!(buf.text(), "cafe");
    }

    #[test]
    fn test_blank_detection() {
        let mut buf = ComposeBuffer::default();
        buf.insert_str("  \n\t");
        assert!(buf.is_blank());
        buf.insert_char('x');
        assert!(!buf.is_blank());
    }

    #[test]
    fn test_visual_rows_wraps_long_lines() {
        let mut buf = ComposeBuffer::default();
        buf.set_text("0123456789abc\nx");
        assert_eq!(buf.visual_rows(10), 3);
    }
}
