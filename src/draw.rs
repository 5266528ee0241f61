use tui::backend::Backend;
use tui::layout::{Alignment, Constraint, Layout, Rect};
use tui::style::{Color, Modifier, Style};
use tui::text::Line;
use tui::widgets::{Block, BorderType, Borders, Paragraph, Tabs};
use tui::{Frame, Terminal};
use tui_logger::TuiLoggerWidget;

use crate::app::{App, MenuItem};
use crate::components::diamond::{BaseDiamond, DIAMOND_HEIGHT, DIAMOND_WIDTH};
use crate::state::network::{ERROR_CHAR, LoadingState};
use crate::ui::layout::LayoutAreas;
use mlb_api::{AFFILIATE_PREFIX, BASES_PREFIX, OPPONENT_PREFIX, ScheduleTile};

static TABS: &[&str; 1] = &["Schedule"];

/// Rows per tile: two border rows plus three content lines.
const TILE_HEIGHT: u16 = 5;

pub fn draw<B>(terminal: &mut Terminal<B>, app: &mut App, loading: LoadingState)
where
    B: Backend,
{
    let current_size = terminal.size().unwrap_or_default();
    if current_size.width <= 10 || current_size.height <= 10 {
        return;
    }

    let mut layout = LayoutAreas::new(current_size);

    let _ = terminal.draw(|f| {
        layout.update(f.area(), app.settings.full_screen, app.state.show_logs);

        if !app.settings.full_screen {
            draw_tabs(f, layout.tab_bar, app);
        }

        match app.state.active_tab {
            MenuItem::Schedule => draw_schedule(f, layout.main, app),
            MenuItem::Help => draw_placeholder(
                f,
                layout.main,
                "Help: q=quit  h/l=day back/forward  t=today  r=reload  j/k=move  s=live demo  f=fullscreen  \"=logs  Esc=back",
            ),
        }

        if let Some(log_pane) = layout.log_pane {
            draw_log_pane(f, log_pane);
        }

        draw_loading_spinner(f, f.area(), app, loading);
    });
}

pub fn default_border<'a>(color: Color) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(color))
}

fn draw_tabs(f: &mut Frame, tab_bar: [Rect; 2], app: &App) {
    let style = Style::default().fg(Color::White);
    let border_type = BorderType::Rounded;

    let tab_index = match app.state.active_tab {
        MenuItem::Schedule | MenuItem::Help => 0,
    };

    let titles: Vec<Line> = TABS.iter().map(|t| Line::from(*t)).collect();
    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::LEFT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type),
        )
        .highlight_style(Style::default().add_modifier(Modifier::UNDERLINED))
        .select(tab_index)
        .style(style);
    f.render_widget(tabs, tab_bar[0]);

    let help = Paragraph::new("Help: ? ")
        .alignment(Alignment::Right)
        .block(
            Block::default()
                .borders(Borders::RIGHT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type),
        )
        .style(style);
    f.render_widget(help, tab_bar[1]);
}

fn draw_schedule(f: &mut Frame, area: Rect, app: &App) {
    let block = default_border(Color::White).title(" Marlins Farm Schedule ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    if !app.state.schedule.loaded && app.state.last_error.is_none() {
        f.render_widget(
            Paragraph::new("Loading schedule...")
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center),
            inner,
        );
        return;
    }

    let [header, key_legend, notice, content] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Fill(1),
    ])
    .areas(inner);

    let date_label = app.state.schedule.date.format("%A, %B %-d, %Y").to_string();
    f.render_widget(Paragraph::new(date_label), header);
    f.render_widget(
        Paragraph::new("Keys: h/l=day  t=today  j/k=move  r=reload  s=live demo  ?=help  q=quit")
            .style(Style::default().fg(Color::DarkGray)),
        key_legend,
    );

    if let Some(line) = notice_line(app) {
        f.render_widget(
            Paragraph::new(line).style(Style::default().fg(Color::Red)),
            notice,
        );
    }

    let rows = visible_rows(app);
    if rows.is_empty() {
        f.render_widget(
            Paragraph::new("No games found for this date")
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center),
            content,
        );
        return;
    }

    let visible = (content.height / TILE_HEIGHT).max(1) as usize;
    let selected = app.state.schedule.selected_row.min(rows.len() - 1);
    let first = selected.saturating_sub(visible - 1);

    for (slot, (row_idx, row)) in rows.iter().enumerate().skip(first).take(visible).enumerate() {
        let row_area = Rect::new(
            content.x,
            content.y + slot as u16 * TILE_HEIGHT,
            content.width,
            TILE_HEIGHT,
        );
        draw_tile_row(f, row_area, row, row_idx == selected);
    }
}

/// Something went wrong with one of the feeds; a single red line is enough.
fn notice_line(app: &App) -> Option<String> {
    app.state
        .last_error
        .clone()
        .or_else(|| app.state.schedule.venue_error.clone())
        .or_else(|| app.state.demo.error.clone())
}

/// Rows in display order: the live demo tile, when visible and loaded, sits
/// above the schedule tiles.
fn visible_rows(app: &App) -> Vec<TileRow<'_>> {
    let mut rows = Vec::with_capacity(app.state.schedule.tiles.len() + 1);
    if app.state.demo.visible
        && let Some(tile) = app.state.demo.tile.as_ref()
    {
        rows.push(TileRow { tile, is_demo: true });
    }
    rows.extend(
        app.state
            .schedule
            .tiles
            .iter()
            .map(|tile| TileRow { tile, is_demo: false }),
    );
    rows
}

struct TileRow<'a> {
    tile: &'a ScheduleTile,
    is_demo: bool,
}

fn draw_tile_row(f: &mut Frame, area: Rect, row: &TileRow, selected: bool) {
    let tile = row.tile;
    let border_color = if row.is_demo {
        Color::Cyan
    } else if selected {
        Color::Yellow
    } else {
        Color::DarkGray
    };
    let block = default_border(border_color).title(format!(" {} ", tile.level_label));
    let inner = block.inner(area);
    f.render_widget(block, area);
    if inner.width == 0 || inner.height == 0 {
        return;
    }

    let [left, middle, right] = Layout::horizontal([
        Constraint::Percentage(30),
        Constraint::Percentage(40),
        Constraint::Percentage(30),
    ])
    .areas(inner);

    let (affiliate_lines, opponent_lines) = split_detail_lines(tile);

    // Left column: the affiliate.
    let mut left_text = vec![Line::from(score_line(&tile.team_name, tile.affiliate_runs))];
    left_text.extend(affiliate_lines.iter().map(|l| dim_line(l)));
    f.render_widget(Paragraph::new(left_text), left);

    // Middle column: the opponent, or the tile's own status for off days.
    let (token, opponent) = split_matchup(&tile.matchup_label);
    let mut middle_text = Vec::new();
    if opponent.is_empty() {
        middle_text.push(Line::from("—").style(Style::default().fg(Color::DarkGray)));
    } else {
        let prefix = token.map(|t| format!("{t} ")).unwrap_or_default();
        middle_text.push(Line::from(format!(
            "{prefix}{}",
            score_line(&opponent, tile.opponent_runs)
        )));
    }
    middle_text.extend(opponent_lines.iter().map(|l| dim_line(l)));
    f.render_widget(Paragraph::new(middle_text), middle);

    // Right column: status and venue, plus the diamond on the demo row.
    let mut right_text = vec![Line::from(tile.status_label.clone()).style(status_style(tile))];
    if let Some(venue) = tile.venue_text.as_deref() {
        right_text.push(dim_line(venue));
    }
    let diamond = extract_live_bases(tile);
    let text_width = right.width.saturating_sub(if diamond.is_some() {
        DIAMOND_WIDTH + 1
    } else {
        0
    });
    f.render_widget(
        Paragraph::new(right_text),
        Rect::new(right.x, right.y, text_width, right.height),
    );
    if let Some((on_first, on_second, on_third)) = diamond
        && right.width > DIAMOND_WIDTH
        && right.height >= DIAMOND_HEIGHT
    {
        let diamond_area = Rect::new(
            right.x + right.width - DIAMOND_WIDTH,
            right.y,
            DIAMOND_WIDTH,
            DIAMOND_HEIGHT,
        );
        f.render_widget(BaseDiamond { on_first, on_second, on_third }, diamond_area);
    }
}

fn score_line(name: &str, runs: Option<u32>) -> String {
    match runs {
        Some(runs) => format!("{name}  {runs}"),
        None => name.to_owned(),
    }
}

fn dim_line(text: &str) -> Line<'static> {
    Line::from(text.to_owned()).style(Style::default().fg(Color::DarkGray))
}

fn status_style(tile: &ScheduleTile) -> Style {
    if tile.is_final {
        Style::default().fg(Color::Gray)
    } else if tile.status_label == "NO GAME" {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default().fg(Color::Green)
    }
}

// ---------------------------------------------------------------------------
// Tile text routing
// ---------------------------------------------------------------------------

/// Split the matchup label into a display token and the opponent name.
/// "v " becomes "vs." for readability; "@ " stays "@".
fn split_matchup(label: &str) -> (Option<&'static str>, String) {
    if let Some(rest) = label.strip_prefix("@ ") {
        (Some("@"), rest.to_owned())
    } else if let Some(rest) = label.strip_prefix("v ") {
        (Some("vs."), rest.to_owned())
    } else {
        (None, label.to_owned())
    }
}

/// Route a tile's detail lines to the affiliate and opponent columns.
///
/// `AFF:` and `OPP:` prefixes pin a line explicitly. `BASES:` lines carry
/// runner flags for the diamond and never render as text. Pitching lines
/// follow baseball convention: the affiliate's starter on its side, the
/// opponent's (re-labelled from "Opp SP:" to "SP:") on the other; win and
/// save credits go under whichever side won, the loss under the other.
fn split_detail_lines(tile: &ScheduleTile) -> (Vec<String>, Vec<String>) {
    let affiliate_won = tile.is_final
        && matches!((tile.affiliate_runs, tile.opponent_runs), (Some(a), Some(o)) if a > o);
    let opponent_won = tile.is_final
        && matches!((tile.affiliate_runs, tile.opponent_runs), (Some(a), Some(o)) if o > a);

    let mut affiliate = Vec::new();
    let mut opponent = Vec::new();

    for line in &tile.detail_lines {
        if let Some(rest) = line.strip_prefix(AFFILIATE_PREFIX) {
            affiliate.push(rest.trim().to_owned());
        } else if let Some(rest) = line.strip_prefix(OPPONENT_PREFIX) {
            opponent.push(rest.trim().to_owned());
        } else if line.starts_with(BASES_PREFIX) {
            continue;
        } else if let Some(rest) = line.strip_prefix("Opp SP:") {
            opponent.push(format!("SP:{rest}"));
        } else if line.starts_with("SP:") {
            affiliate.push(line.clone());
        } else if line.starts_with("WP:") || line.starts_with("SV:") {
            if opponent_won && !affiliate_won {
                opponent.push(line.clone());
            } else {
                affiliate.push(line.clone());
            }
        } else if line.starts_with("LP:") {
            if affiliate_won {
                opponent.push(line.clone());
            } else if opponent_won {
                affiliate.push(line.clone());
            } else {
                opponent.push(line.clone());
            }
        } else {
            affiliate.push(line.clone());
        }
    }

    (affiliate, opponent)
}

/// Parse the tile's `BASES:first-second-third` line into occupancy flags.
fn extract_live_bases(tile: &ScheduleTile) -> Option<(bool, bool, bool)> {
    let flags = tile
        .detail_lines
        .iter()
        .find_map(|line| line.strip_prefix(BASES_PREFIX))?;
    let mut parts = flags.trim().split('-');
    let mut next = || parts.next().map(|p| p == "1").unwrap_or(false);
    Some((next(), next(), next()))
}

fn draw_placeholder(f: &mut Frame, area: Rect, msg: &str) {
    let block = default_border(Color::DarkGray);
    let inner = block.inner(area);
    f.render_widget(block, area);
    f.render_widget(
        Paragraph::new(msg)
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center),
        inner,
    );
}

fn draw_log_pane(f: &mut Frame, area: Rect) {
    let widget = TuiLoggerWidget::default()
        .block(default_border(Color::DarkGray).title(" Logs "))
        .style_error(Style::default().fg(Color::Red))
        .style_warn(Style::default().fg(Color::Yellow))
        .style_info(Style::default().fg(Color::Gray))
        .style_debug(Style::default().fg(Color::DarkGray));
    f.render_widget(widget, area);
}

fn draw_loading_spinner(f: &mut Frame, area: Rect, app: &App, loading: LoadingState) {
    if !loading.is_loading && loading.spinner_char != ERROR_CHAR {
        return;
    }
    let style = match loading.spinner_char {
        ERROR_CHAR => Style::default().fg(Color::Red),
        _ => Style::default().fg(Color::White),
    };
    let spinner = Paragraph::new(loading.spinner_char.to_string())
        .alignment(Alignment::Right)
        .style(style);
    let area = if app.settings.full_screen {
        Rect::new(area.width.saturating_sub(3), area.height.saturating_sub(2), 1, 1)
    } else {
        Rect::new(area.width.saturating_sub(11), 1, 1, 1)
    };
    f.render_widget(spinner, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tile_with(lines: &[&str]) -> ScheduleTile {
        ScheduleTile {
            detail_lines: lines.iter().map(|l| l.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn matchup_token_maps_home_and_away() {
        assert_eq!(split_matchup("@ Durham Bulls"), (Some("@"), "Durham Bulls".into()));
        assert_eq!(split_matchup("v Mets (NYM)"), (Some("vs."), "Mets (NYM)".into()));
        assert_eq!(split_matchup(""), (None, String::new()));
    }

    #[test]
    fn explicit_prefixes_pin_lines_to_their_column() {
        let tile = tile_with(&["AFF: At Bat: Smith", "OPP: Pitching: Jones", "BASES:0-1-1"]);
        let (aff, opp) = split_detail_lines(&tile);
        assert_eq!(aff, vec!["At Bat: Smith"]);
        assert_eq!(opp, vec!["Pitching: Jones"]);
    }

    #[test]
    fn pitcher_lines_split_between_sides() {
        let tile = tile_with(&["SP: Affiliate Ace", "Opp SP: Visiting Ace"]);
        let (aff, opp) = split_detail_lines(&tile);
        assert_eq!(aff, vec!["SP: Affiliate Ace"]);
        assert_eq!(opp, vec!["SP: Visiting Ace"]);
    }

    #[test]
    fn decision_lines_follow_the_winning_side() {
        let mut tile = tile_with(&["WP: Winner", "SV: Closer", "LP: Loser"]);
        tile.is_final = true;
        tile.affiliate_runs = Some(5);
        tile.opponent_runs = Some(2);
        let (aff, opp) = split_detail_lines(&tile);
        assert_eq!(aff, vec!["WP: Winner", "SV: Closer"]);
        assert_eq!(opp, vec!["LP: Loser"]);

        tile.affiliate_runs = Some(1);
        let (aff, opp) = split_detail_lines(&tile);
        assert_eq!(aff, vec!["LP: Loser"]);
        assert_eq!(opp, vec!["WP: Winner", "SV: Closer"]);
    }

    #[test]
    fn decision_lines_default_to_convention_when_no_winner_is_known() {
        // Not final: credits stay on the affiliate side, the loss opposite.
        let tile = tile_with(&["WP: Winner", "LP: Loser"]);
        let (aff, opp) = split_detail_lines(&tile);
        assert_eq!(aff, vec!["WP: Winner"]);
        assert_eq!(opp, vec!["LP: Loser"]);
    }

    #[test]
    fn bases_line_parses_into_flags_and_never_renders() {
        let tile = tile_with(&["BASES:0-1-1"]);
        assert_eq!(extract_live_bases(&tile), Some((false, true, true)));
        let (aff, opp) = split_detail_lines(&tile);
        assert!(aff.is_empty() && opp.is_empty());

        assert_eq!(extract_live_bases(&tile_with(&["SP: Someone"])), None);
        assert_eq!(extract_live_bases(&tile_with(&["BASES:1"])), Some((true, false, false)));
    }
}
