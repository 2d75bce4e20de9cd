use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use crate::keyboard::display::key_display_name;
use crate::session::result::DrillResult;
use crate::ui::theme::Theme;

const MISSED_KEYS_SHOWN: usize = 5;

pub struct DrillSummary<'a> {
    result: &'a DrillResult,
    next_curriculum: Option<&'a str>,
    theme: &'a Theme,
}

impl<'a> DrillSummary<'a> {
    pub fn new(result: &'a DrillResult, next_curriculum: Option<&'a str>, theme: &'a Theme) -> Self {
        Self {
            result,
            next_curriculum,
            theme,
        }
    }
}

/// Footer key hints for the completion screen.
pub fn summary_hints(result: &DrillResult, has_next: bool) -> String {
    let mut hints = Vec::new();
    if has_next {
        hints.push("[Enter] Next curriculum");
    }
    if !result.mistake_words.is_empty() {
        hints.push("[m] Retry mistakes");
    }
    hints.push("[r] Restart");
    hints.push("[c] Curriculums");
    hints.push("[q] Quit");
    format!(" {}", hints.join("  "))
}

impl Widget for DrillSummary<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let result = self.result;

        let title = if result.retry {
            " Retry Complete "
        } else {
            " Drill Complete "
        };
        let block = Block::bordered()
            .title(title)
            .border_style(Style::default().fg(colors.accent()))
            .style(Style::default().bg(colors.bg()));

        let heading = if result.mistake_words.is_empty() {
            Span::styled(
                "Every word typed without a mistake!",
                Style::default()
                    .fg(colors.success())
                    .add_modifier(Modifier::BOLD),
            )
        } else {
            Span::styled(
                format!("{} word(s) to review", result.mistake_words.len()),
                Style::default()
                    .fg(colors.error())
                    .add_modifier(Modifier::BOLD),
            )
        };

        let mut lines = vec![
            Line::from(""),
            Line::from(heading),
            Line::from(""),
            Line::from(Span::styled(
                format!(
                    "Accuracy {:.1}%   {}/{} keys   {} words",
                    result.accuracy * 100.0,
                    result.correct_attempts,
                    result.total_attempts,
                    result.words
                ),
                Style::default().fg(colors.fg()),
            )),
            Line::from(Span::styled(
                format!("{:.1}s   {:.0} keys/min", result.elapsed_secs, result.kpm),
                Style::default().fg(colors.fg()),
            )),
        ];

        if !result.mistake_words.is_empty() {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                result.mistake_words.join("  "),
                Style::default().fg(colors.error()),
            )));
        }

        if !result.missed_keys.is_empty() {
            let missed: Vec<String> = result
                .missed_keys
                .iter()
                .take(MISSED_KEYS_SHOWN)
                .map(|m| format!("{} {}×{}", m.jamo, key_display_name(&m.key), m.count))
                .collect();
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                format!("Missed: {}", missed.join("   ")),
                Style::default().fg(colors.jamo_pending()),
            )));
        }

        if let Some(next) = self.next_curriculum {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                format!("Up next: {next}"),
                Style::default().fg(colors.accent()),
            )));
        }

        Paragraph::new(lines)
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::drill::DrillState;
    use crate::words::Word;

    fn result_with_mistake() -> DrillResult {
        let mut drill = DrillState::start(vec![Word::new("짐", "luggage", "noun")]);
        let events: Vec<_> = ["x", "w", "l", "a"]
            .iter()
            .filter_map(|k| drill.handle_keystroke(k))
            .collect();
        DrillResult::from_drill(&drill, &events, Some("travel"))
    }

    #[test]
    fn test_hints_depend_on_outcome() {
        let result = result_with_mistake();
        let hints = summary_hints(&result, false);
        assert!(hints.contains("[m] Retry mistakes"));
        assert!(!hints.contains("Next curriculum"));

        let clean = DrillResult {
            mistake_words: Vec::new(),
            ..result
        };
        let hints = summary_hints(&clean, true);
        assert!(hints.contains("[Enter] Next curriculum"));
        assert!(!hints.contains("Retry"));
    }

    #[test]
    fn test_render_lists_mistakes() {
        let result = result_with_mistake();
        let theme = Theme::default();
        let area = Rect::new(0, 0, 60, 14);
        let mut buf = Buffer::empty(area);
        DrillSummary::new(&result, None, &theme).render(area, &mut buf);

        let text: String = (0..area.height)
            .flat_map(|y| (0..area.width).map(move |x| (x, y)))
            .map(|pos| buf[pos].symbol().to_string())
            .collect();
        assert!(text.contains("Drill Complete"));
        assert!(text.contains("1 word(s) to review"));
        assert!(text.contains("Accuracy 75.0%"));
        assert!(text.contains('짐'));
    }
}
