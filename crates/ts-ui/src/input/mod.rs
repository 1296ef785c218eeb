//! Single-line text input

/// Editable text with a character cursor
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextInput {
    content: String,
    /// Cursor position in characters
    cursor: usize,
}

impl TextInput {
    /// Create an empty input
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an input holding `value` with the cursor at the end
    pub fn with_value(value: impl Into<String>) -> Self {
        let mut input = Self::new();
        input.set(value);
        input
    }

    /// Current text
    pub fn value(&self) -> &str {
        &self.content
    }

    /// Cursor position in characters
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Replace the text, moving the cursor to the end
    pub fn set(&mut self, value: impl Into<String>) {
        self.content = value.into();
        self.cursor = self.content.chars().count();
    }

    /// Empty the input
    pub fn clear(&mut self) {
        self.content.clear();
        self.cursor = 0;
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Insert a character at the cursor
    pub fn insert(&mut self, c: char) {
        let byte_pos = self.byte_pos(self.cursor);
        self.content.insert(byte_pos, c);
        self.cursor += 1;
    }

    /// Insert a string at the cursor (paste)
    pub fn insert_str(&mut self, s: &str) {
        for c in s.chars().filter(|c| !c.is_control()) {
            self.insert(c);
        }
    }

    /// Delete the character before the cursor
    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let byte_pos = self.byte_pos(self.cursor);
            self.content.remove(byte_pos);
        }
    }

    /// Delete the character under the cursor
    pub fn delete(&mut self) {
        if self.cursor < self.content.chars().count() {
            let byte_pos = self.byte_pos(self.cursor);
            self.content.remove(byte_pos);
        }
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        if self.cursor < self.content.chars().count() {
            self.cursor += 1;
        }
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.content.chars().count();
    }

    /// Terminal columns before the cursor
    pub fn display_cursor(&self) -> usize {
        self.content
            .chars()
            .take(self.cursor)
            .map(|c| if c.is_ascii() { 1 } else { 2 })
            .sum()
    }

    /// Convert character position to byte position
    fn byte_pos(&self, char_pos: usize) -> usize {
        self.content
            .char_indices()
            .nth(char_pos)
            .map(|(i, _)| i)
            .unwrap_or(self.content.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_insert_and_backspace() {
        let mut input = TextInput::new();
        for c in "Ugx".chars() {
            input.insert(c);
        }
        assert_eq!(input.value(), "Ugx");
        assert_eq!(input.cursor(), 3);

        input.backspace();
        assert_eq!(input.value(), "Ug");
        assert_eq!(input.cursor(), 2);
    }

    #[test]
    fn test_cursor_movement_multibyte() {
        let mut input = TextInput::with_value("héllo");
        assert_eq!(input.cursor(), 5);

        input.move_home();
        input.move_right();
        input.move_right();
        input.insert('X');
        assert_eq!(input.value(), "héXllo");

        input.move_left();
        input.delete();
        assert_eq!(input.value(), "héllo");
    }

    #[test]
    fn test_bounds() {
        let mut input = TextInput::new();
        input.backspace();
        input.move_left();
        input.delete();
        assert_eq!(input.cursor(), 0);

        input.set("ab");
        input.move_right();
        assert_eq!(input.cursor(), 2);
    }

    #[test]
    fn test_paste_skips_control_chars() {
        let mut input = TextInput::new();
        input.insert_str("https://youtu.be/dQw4w9WgXcQ\n");
        assert_eq!(input.value(), "https://youtu.be/dQw4w9WgXcQ");
    }

    #[test]
    fn test_display_cursor_wide_chars() {
        let input = TextInput::with_value("a日本");
        assert_eq!(input.display_cursor(), 5);
    }
}
