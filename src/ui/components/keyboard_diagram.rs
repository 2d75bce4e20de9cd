use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Widget};

use crate::keyboard::display::SPACE;
use crate::keyboard::finger::{self, Finger, Hand};
use crate::keyboard::layout::KeyboardLayout;
use crate::ui::theme::Theme;

pub struct KeyboardDiagram<'a> {
    pub layout: &'a KeyboardLayout,
    /// Binding of the jamo expected next, e.g. `"R"` or `" "`.
    pub next_binding: Option<&'a str>,
    pub theme: &'a Theme,
}

impl<'a> KeyboardDiagram<'a> {
    pub fn new(layout: &'a KeyboardLayout, next_binding: Option<&'a str>, theme: &'a Theme) -> Self {
        Self {
            layout,
            next_binding,
            theme,
        }
    }
}

pub const HEIGHT: u16 = 6;
const KEY_WIDTH: u16 = 6;
const ROW_OFFSETS: &[u16] = &[0, 2, 4];

fn finger_color(key: char) -> Color {
    let assignment = finger::finger_for_key(key);
    match (assignment.hand, assignment.finger) {
        (Hand::Left, Finger::Pinky) | (Hand::Right, Finger::Pinky) => Color::Rgb(150, 85, 95),
        (Hand::Left, Finger::Ring) | (Hand::Right, Finger::Ring) => Color::Rgb(150, 115, 70),
        (Hand::Left, Finger::Middle) | (Hand::Right, Finger::Middle) => Color::Rgb(95, 130, 70),
        (Hand::Left, Finger::Index) => Color::Rgb(70, 115, 150),
        (Hand::Right, Finger::Index) => Color::Rgb(85, 115, 165),
        (_, Finger::Thumb) => Color::Rgb(100, 100, 100),
    }
}

impl Widget for KeyboardDiagram<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(format!(" {} ", self.layout.name))
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.height < 4 || inner.width < 40 {
            return;
        }

        let next = self.next_binding.and_then(|b| self.layout.position_of(b));
        let highlight = Style::default()
            .fg(colors.cursor_fg())
            .bg(colors.next_key())
            .add_modifier(Modifier::BOLD);

        for (row_idx, row) in self.layout.rows.iter().enumerate() {
            let y = inner.y + row_idx as u16;
            let offset = ROW_OFFSETS.get(row_idx).copied().unwrap_or(0);

            for (col_idx, labeled) in row.iter().enumerate() {
                let x = inner.x + offset + col_idx as u16 * KEY_WIDTH;
                if x + KEY_WIDTH > inner.x + inner.width {
                    break;
                }

                let style = if next == Some((row_idx, col_idx)) {
                    highlight
                } else {
                    Style::default().fg(colors.fg()).bg(finger_color(labeled.key))
                };
                let display = format!(" {}{} ", labeled.key, labeled.jamo);
                buf.set_string(x, y, &display, style);
            }
        }

        // Shift and space live on the bottom line.
        let y = inner.y + 3;
        let shift = self.next_binding.is_some_and(finger::needs_shift);
        let space = self.next_binding == Some(SPACE);
        let idle = Style::default().fg(colors.jamo_pending()).bg(colors.bg());
        buf.set_string(inner.x, y, " Shift ", if shift { highlight } else { idle });
        let space_x = inner.x + ROW_OFFSETS[2] + 2 * KEY_WIDTH;
        if space_x + 3 * KEY_WIDTH <= inner.x + inner.width {
            let bar = format!("{:^width$}", "Space", width = (3 * KEY_WIDTH) as usize);
            buf.set_string(space_x, y, &bar, if space { highlight } else { idle });
        }
    }
}
