use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use crate::keyboard::display::key_display_name;
use crate::keyboard::finger::finger_for_key;
use crate::session::drill::DrillState;
use crate::ui::theme::Theme;

/// The word being typed, its meaning, and the jamo sequence with the cursor.
pub struct WordCard<'a> {
    drill: &'a DrillState,
    /// Show the wrong-key flash.
    flash_error: bool,
    /// A word that was just finished and is still shown during the advance pause.
    finished: Option<&'a str>,
    theme: &'a Theme,
}

impl<'a> WordCard<'a> {
    pub fn new(drill: &'a DrillState, theme: &'a Theme) -> Self {
        Self {
            drill,
            flash_error: false,
            finished: None,
            theme,
        }
    }

    pub fn flash_error(mut self, on: bool) -> Self {
        self.flash_error = on;
        self
    }

    pub fn finished(mut self, word: Option<&'a str>) -> Self {
        self.finished = word;
        self
    }
}

/// "ㄱ  r  (left index)" style hint for the next keystroke.
pub fn next_key_hint(drill: &DrillState) -> Option<String> {
    let jamo = drill.expected_jamo()?;
    let Some(binding) = drill.expected_key() else {
        return Some(format!("{jamo}  (no key on this layout)"));
    };
    let finger = binding
        .chars()
        .next()
        .map(|c| finger_for_key(c).label())
        .unwrap_or_default();
    Some(format!("{jamo}  {}  ({finger})", key_display_name(binding)))
}

impl Widget for WordCard<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let border = if self.flash_error {
            colors.error()
        } else {
            colors.border()
        };
        let block = Block::bordered()
            .border_style(Style::default().fg(border))
            .style(Style::default().bg(colors.bg()));

        if let Some(word) = self.finished {
            let lines = vec![
                Line::from(""),
                Line::from(Span::styled(
                    word.to_string(),
                    Style::default()
                        .fg(colors.success())
                        .add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled("✓", Style::default().fg(colors.success()))),
            ];
            Paragraph::new(lines)
                .block(block)
                .alignment(Alignment::Center)
                .render(area, buf);
            return;
        }

        let Some(word) = self.drill.current_word() else {
            Paragraph::new(Line::from(Span::styled(
                "No words to practice in this curriculum.",
                Style::default().fg(colors.jamo_pending()),
            )))
            .block(block)
            .alignment(Alignment::Center)
            .render(area, buf);
            return;
        };

        let mut jamo_spans: Vec<Span> = Vec::new();
        for (i, jamo) in self.drill.current_jamos.iter().enumerate() {
            let style = if i < self.drill.jamo_index {
                Style::default().fg(colors.jamo_done())
            } else if i == self.drill.jamo_index {
                let bg = if self.flash_error {
                    colors.error()
                } else {
                    colors.cursor_bg()
                };
                Style::default().fg(colors.cursor_fg()).bg(bg)
            } else {
                Style::default().fg(colors.jamo_pending())
            };
            let shown = if *jamo == ' ' { '␣' } else { *jamo };
            jamo_spans.push(Span::styled(shown.to_string(), style));
            jamo_spans.push(Span::raw(" "));
        }

        let mut lines = vec![
            Line::from(""),
            Line::from(Span::styled(
                word.text.clone(),
                Style::default().fg(colors.fg()).add_modifier(Modifier::BOLD),
            )),
        ];
        if !word.translation.is_empty() || !word.category.is_empty() {
            let meaning = match (word.translation.is_empty(), word.category.is_empty()) {
                (false, false) => format!("{} · {}", word.translation, word.category),
                (false, true) => word.translation.clone(),
                _ => word.category.clone(),
            };
            lines.push(Line::from(Span::styled(
                meaning,
                Style::default().fg(colors.jamo_pending()),
            )));
        }
        lines.push(Line::from(""));
        lines.push(Line::from(jamo_spans));
        lines.push(Line::from(""));
        if let Some(hint) = next_key_hint(self.drill) {
            let style = if self.flash_error {
                Style::default().fg(colors.error())
            } else {
                Style::default().fg(colors.next_key())
            };
            lines.push(Line::from(Span::styled(hint, style)));
        }

        Paragraph::new(lines)
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: false })
            .render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::words::Word;

    #[test]
    fn test_next_key_hint() {
        let mut drill = DrillState::start(vec![Word::new("싸다", "cheap", "adj")]);
        assert_eq!(next_key_hint(&drill).as_deref(), Some("ㅆ  Shift+t  (left index)"));
        drill.handle_keystroke("T");
        assert_eq!(next_key_hint(&drill).as_deref(), Some("ㅏ  k  (right middle)"));
    }

    #[test]
    fn test_next_key_hint_space() {
        let mut drill = DrillState::start(vec![Word::new("물 병", "", "")]);
        for key in ["a", "n", "f"] {
            drill.handle_keystroke(key);
        }
        assert_eq!(next_key_hint(&drill).as_deref(), Some("   Space  (thumb)"));
    }

    #[test]
    fn test_no_hint_when_not_ready() {
        let drill = DrillState::start(Vec::new());
        assert!(next_key_hint(&drill).is_none());
    }
}
