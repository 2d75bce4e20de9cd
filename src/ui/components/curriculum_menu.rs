use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::words::Curriculum;
use crate::ui::theme::Theme;

pub struct CurriculumMenu<'a> {
    pub items: &'a [Curriculum],
    /// Parallel to `items`: whether the last pass ended clean.
    pub completed: Vec<bool>,
    pub selected: usize,
    pub student: &'a str,
    pub theme: &'a Theme,
}

impl<'a> CurriculumMenu<'a> {
    pub fn new(items: &'a [Curriculum], selected: usize, theme: &'a Theme) -> Self {
        Self {
            items,
            completed: vec![false; items.len()],
            selected,
            student: "",
            theme,
        }
    }

    pub fn completed(mut self, completed: Vec<bool>) -> Self {
        self.completed = completed;
        self
    }

    pub fn student(mut self, student: &'a str) -> Self {
        self.student = student;
        self
    }
}

/// Move a selection cursor through `len` items, wrapping at both ends.
pub fn step(selected: usize, len: usize, forward: bool) -> usize {
    if len == 0 {
        0
    } else if forward {
        (selected + 1) % len
    } else if selected == 0 {
        len - 1
    } else {
        selected - 1
    }
}

impl Widget for CurriculumMenu<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0)])
            .split(inner);

        let greeting = if self.student.is_empty() {
            "Choose a curriculum".to_string()
        } else {
            format!("{}, choose a curriculum", self.student)
        };
        let title_lines = vec![
            Line::from(""),
            Line::from(Span::styled(
                "hankey",
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(greeting, Style::default().fg(colors.fg()))),
        ];
        Paragraph::new(title_lines)
            .alignment(Alignment::Center)
            .render(layout[0], buf);

        if self.items.is_empty() {
            Paragraph::new(Line::from(Span::styled(
                "No curriculums available.",
                Style::default().fg(colors.jamo_pending()),
            )))
            .alignment(Alignment::Center)
            .render(layout[1], buf);
            return;
        }

        // Two rows per item; scroll so the selection stays visible.
        let visible = (layout[1].height / 2).max(1) as usize;
        let first = self.selected.saturating_sub(visible - 1);

        let mut lines: Vec<Line> = Vec::new();
        for (i, item) in self.items.iter().enumerate().skip(first).take(visible) {
            let is_selected = i == self.selected;
            let indicator = if is_selected { ">" } else { " " };
            let done = if self.completed.get(i).copied().unwrap_or(false) {
                " ✓"
            } else {
                ""
            };

            let label_style = Style::default()
                .fg(if is_selected { colors.accent() } else { colors.fg() })
                .add_modifier(if is_selected {
                    Modifier::BOLD
                } else {
                    Modifier::empty()
                });
            lines.push(Line::from(vec![
                Span::styled(format!(" {indicator} {} {}", item.icon, item.name), label_style),
                Span::styled(done, Style::default().fg(colors.success())),
            ]));
            lines.push(Line::from(Span::styled(
                format!("      {}", item.description),
                Style::default().fg(colors.jamo_pending()),
            )));
        }
        Paragraph::new(lines).render(layout[1], buf);
    }
}
