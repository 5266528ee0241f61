use tui::buffer::Buffer;
use tui::layout::Rect;
use tui::style::{Color, Style};
use tui::widgets::Widget;

/// Terminal columns the diamond needs: "◇ ◇ ◇" on the wide row.
pub const DIAMOND_WIDTH: u16 = 5;
/// Rows: second base on top, third and first below.
pub const DIAMOND_HEIGHT: u16 = 2;

const OCCUPIED: &str = "◆";
const EMPTY: &str = "◇";

/// Base-runner diamond for the live game row. Second base sits on the top
/// row; third and first sit left and right on the bottom row, matching the
/// view from behind home plate.
#[derive(Debug, Clone, Copy, Default)]
pub struct BaseDiamond {
    pub on_first: bool,
    pub on_second: bool,
    pub on_third: bool,
}

impl BaseDiamond {
    /// Accessible one-line description of the runner state.
    pub fn label(&self) -> String {
        let on: Vec<&str> = [
            (self.on_first, "first"),
            (self.on_second, "second"),
            (self.on_third, "third"),
        ]
        .into_iter()
        .filter_map(|(occupied, name)| occupied.then_some(name))
        .collect();

        match on.as_slice() {
            [] => "Bases empty".to_owned(),
            [only] => format!("Runner on {only}"),
            [a, b] => format!("Runners on {a} and {b}"),
            _ => "Bases loaded".to_owned(),
        }
    }

    fn glyph(occupied: bool) -> (&'static str, Style) {
        if occupied {
            (OCCUPIED, Style::default().fg(Color::Yellow))
        } else {
            (EMPTY, Style::default().fg(Color::DarkGray))
        }
    }
}

impl Widget for BaseDiamond {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < DIAMOND_WIDTH || area.height < DIAMOND_HEIGHT {
            return;
        }

        let (second, second_style) = Self::glyph(self.on_second);
        buf.set_string(area.x + 2, area.y, second, second_style);

        let (third, third_style) = Self::glyph(self.on_third);
        buf.set_string(area.x, area.y + 1, third, third_style);

        let (first, first_style) = Self::glyph(self.on_first);
        buf.set_string(area.x + 4, area.y + 1, first, first_style);
    }
}
