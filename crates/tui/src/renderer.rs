use std::io::{Stdout, stdout};
use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use folio_core::{PageHost, Portfolio, Stage, VirtualPage};
use folio_protocol::{AssetOutcome, SectionId, TweenFormat, ViewUpdate};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Gauge, List, ListItem, Paragraph, Tabs},
};

/// Page pixels per terminal row.
const ROW_PX: f64 = 20.0;
const HEADER_ROWS: u16 = 3;
const MIN_SECTION_PX: f64 = 600.0;
/// Title, spacer and bottom padding around a section's content.
const SECTION_CHROME_ROWS: u16 = 4;
const BAR_WIDTH: usize = 30;
const FRAME: Duration = Duration::from_millis(16);

fn rows_to_px(rows: u16) -> f64 {
    f64::from(rows) * ROW_PX
}

/// `value` percent of a fixed-width bar.
fn bar(value: f64) -> String {
    let filled = ((value.clamp(0.0, 100.0) / 100.0) * BAR_WIDTH as f64).round() as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled))
}

/// Rows of a section that land inside a body `height` rows tall: the first
/// visible row, the visible row count, and how many rows are cut off above.
fn visible_rows(top_px: f64, bottom_px: f64, height: u16) -> Option<(u16, u16, u16)> {
    let top = (top_px / ROW_PX).floor() as i64;
    let bottom = (bottom_px / ROW_PX).ceil() as i64;
    let first = top.max(0);
    let last = bottom.min(i64::from(height));
    if last <= first {
        return None;
    }
    Some((first as u16, (last - first) as u16, (first - top) as u16))
}

/// Owns the portfolio and the simulated page, and plays the host: warms
/// assets, performs smooth scrolls and forwards scroll events.
pub struct TerminalHost {
    portfolio: Portfolio,
    page: VirtualPage,
    tween_labels: Vec<String>,
}

impl TerminalHost {
    pub fn new(portfolio: Portfolio, body_rows: u16) -> Self {
        let viewport = rows_to_px(body_rows);
        let section_px = viewport.max(MIN_SECTION_PX);
        // Sections with many tweens grow to fit one row per tween.
        let page = VirtualPage::stacked(
            viewport,
            portfolio.sections().iter().map(|s| {
                let rows = portfolio
                    .tweens()
                    .iter()
                    .filter(|t| t.config().watch == s.id)
                    .count() as u16;
                (s.id.clone(), section_px.max(rows_to_px(rows + SECTION_CHROME_ROWS)))
            }),
        );
        // Tween ids follow the plan order: numeric stats, about skills,
        // then every category skill.
        let content = portfolio.content();
        let tween_labels = content
            .stats
            .iter()
            .filter(|s| s.target().is_some())
            .map(|s| s.label.clone())
            .chain(content.skills.iter().map(|s| s.name.clone()))
            .chain(
                content
                    .skill_categories
                    .iter()
                    .flat_map(|c| c.skills.iter().map(|s| s.name.clone())),
            )
            .collect();
        Self {
            portfolio,
            page,
            tween_labels,
        }
    }

    pub fn start(&mut self) {
        self.portfolio.start();
    }

    /// Advance everything to `now_ms` and act on what the core asked for.
    pub fn tick(&mut self, now_ms: u64) {
        self.portfolio.advance_to(now_ms, &self.page);
        for update in self.portfolio.drain_updates() {
            match update {
                ViewUpdate::PreloadAsset { url } => {
                    let outcome = if Path::new(url.trim_start_matches('/')).exists() {
                        AssetOutcome::Loaded
                    } else {
                        AssetOutcome::Failed
                    };
                    self.portfolio.asset_settled(&url, outcome);
                }
                ViewUpdate::ScrollTo { top, smooth: true } => self.page.smooth_scroll_to(top, now_ms),
                ViewUpdate::ScrollTo { top, smooth: false } => {
                    self.page.scroll_to(top);
                    self.portfolio.on_scroll();
                }
                _ => {}
            }
        }
        if self.page.step(now_ms) {
            self.portfolio.on_scroll();
        }
    }

    pub fn resize(&mut self, body_rows: u16) {
        self.page.set_viewport_height(rows_to_px(body_rows));
        self.portfolio.on_scroll();
    }

    /// Manual scrolling. Locked while the menu is open.
    pub fn scroll_by(&mut self, px: f64) {
        if self.portfolio.is_menu_open() {
            return;
        }
        self.page.scroll_by(px);
        self.portfolio.on_scroll();
    }

    pub fn navigate_index(&mut self, index: usize) {
        let id = self.portfolio.sections().get(index).map(|s| s.id.clone());
        if let Some(id) = id {
            self.portfolio.navigate_to(&id, &self.page);
        }
    }

    fn active_index(&self) -> Option<usize> {
        let active = self.portfolio.active_section()?;
        self.portfolio.sections().iter().position(|s| &s.id == active)
    }

    /// Returns false when the user asked to quit.
    pub fn handle_key(&mut self, code: KeyCode) -> bool {
        let page_px = self.page.viewport_height() * 0.9;
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return false,
            KeyCode::Up => self.scroll_by(-ROW_PX * 2.0),
            KeyCode::Down => self.scroll_by(ROW_PX * 2.0),
            KeyCode::PageUp => self.scroll_by(-page_px),
            KeyCode::PageDown => self.scroll_by(page_px),
            KeyCode::Char('m') => {
                self.portfolio.toggle_menu();
            }
            KeyCode::Tab => {
                let len = self.portfolio.sections().len();
                let next = self.active_index().map_or(0, |i| (i + 1) % len);
                self.navigate_index(next);
            }
            KeyCode::Char(c @ '1'..='9') => {
                let index = c as usize - '1' as usize;
                self.navigate_index(index);
            }
            _ => {}
        }
        true
    }

    pub fn portfolio(&self) -> &Portfolio {
        &self.portfolio
    }
}

fn draw_loading(frame: &mut Frame, host: &TerminalHost) {
    let portfolio = host.portfolio();
    let state = portfolio.loading_state();
    let [_, title, gauge, _] = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Fill(1),
    ])
    .areas(frame.area());
    let [_, gauge, _] = Layout::horizontal([
        Constraint::Fill(1),
        Constraint::Length(50),
        Constraint::Fill(1),
    ])
    .areas(gauge);

    let content = portfolio.content();
    let heading = Paragraph::new(vec![
        Line::styled(
            content.name.clone(),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Line::styled(content.title.clone(), Style::default().fg(Color::Gray)),
    ])
    .centered();
    frame.render_widget(heading, title);

    let gauge_widget = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title(format!(" {} ", state.phase_message)))
        .gauge_style(Style::default().fg(Color::Cyan).bg(Color::Black))
        .ratio((state.progress_percent / 100.0).clamp(0.0, 1.0))
        .label(format!("{:.0}%", state.progress_percent));
    frame.render_widget(gauge_widget, gauge);
}

fn draw_header(frame: &mut Frame, host: &TerminalHost, area: Rect) {
    let portfolio = host.portfolio();
    let labels: Vec<String> = portfolio.sections().iter().map(|s| s.label.clone()).collect();
    let chrome = if portfolio.is_scrolled() {
        Style::default().bg(Color::DarkGray)
    } else {
        Style::default()
    };
    let tabs = Tabs::new(labels)
        .block(
            Block::default()
                .borders(Borders::BOTTOM)
                .title(format!(
                    " {} | {:.0}px | ↑↓ scroll | 1-8/Tab jump | m menu | q quit ",
                    portfolio.content().name,
                    portfolio.scroll_spy_state().map_or(0.0, |s| s.scroll_offset_px),
                )),
        )
        .style(chrome)
        .highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .select(host.active_index().unwrap_or(0))
        .divider("|");
    frame.render_widget(tabs, area);
}

fn section_lines(host: &TerminalHost, id: &SectionId, label: &str, active: bool) -> Vec<Line<'static>> {
    let portfolio = host.portfolio();
    let title_style = if active {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
        Style::default().add_modifier(Modifier::BOLD)
    };
    let mut lines = vec![Line::styled(format!("── {label} "), title_style), Line::default()];

    match id.as_str() {
        "home" => {
            let content = portfolio.content();
            lines.push(Line::styled(
                content.name.clone(),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ));
            lines.push(Line::from(content.title.clone()));
            lines.push(Line::default());
            let caret = if portfolio.caret_visible() { "▌" } else { " " };
            lines.push(Line::from(vec![
                Span::raw(portfolio.caption_state().displayed_text),
                Span::styled(caret, Style::default().fg(Color::Cyan)),
            ]));
        }
        _ => {
            let mut watching = portfolio
                .tweens()
                .iter()
                .zip(&host.tween_labels)
                .filter(|(tween, _)| tween.config().watch == *id)
                .peekable();
            if watching.peek().is_none() {
                lines.push(Line::styled(id.anchor(), Style::default().fg(Color::DarkGray)));
            }
            for (tween, label) in watching {
                let display = tween.display();
                let line = match tween.config().format {
                    TweenFormat::Counter { .. } => Line::from(vec![
                        Span::styled(format!("{display:>8} "), Style::default().fg(Color::Cyan)),
                        Span::raw(label.clone()),
                    ]),
                    TweenFormat::Bar => Line::from(vec![
                        Span::raw(format!("{label:<20} ")),
                        Span::styled(bar(tween.value()), Style::default().fg(Color::Cyan)),
                        Span::raw(format!(" {display}")),
                    ]),
                };
                lines.push(line);
            }
        }
    }
    lines
}

fn draw_page(frame: &mut Frame, host: &TerminalHost, body: Rect) {
    let portfolio = host.portfolio();
    let geometry = host.page.geometry();
    let active = portfolio.active_section();
    for section in portfolio.sections() {
        let Some(measured) = geometry.section(&section.id) else {
            continue;
        };
        let Some((first, rows, cut)) = visible_rows(measured.top, measured.bottom, body.height) else {
            continue;
        };
        let area = Rect::new(body.x, body.y + first, body.width, rows);
        let lines = section_lines(host, &section.id, &section.label, active == Some(&section.id));
        frame.render_widget(Paragraph::new(lines).scroll((cut, 0)), area);
    }
}

fn draw_menu(frame: &mut Frame, host: &TerminalHost, body: Rect) {
    let portfolio = host.portfolio();
    let width = 24.min(body.width);
    let height = (portfolio.sections().len() as u16 + 2).min(body.height);
    let area = Rect::new(body.x + body.width - width, body.y, width, height);
    let active = portfolio.active_section();
    let items: Vec<ListItem> = portfolio
        .sections()
        .iter()
        .enumerate()
        .map(|(i, s)| {
            let style = if active == Some(&s.id) {
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            ListItem::new(format!("{} {}", i + 1, s.label)).style(style)
        })
        .collect();
    frame.render_widget(Clear, area);
    frame.render_widget(List::new(items).block(Block::default().borders(Borders::ALL).title(" menu ")), area);
}

fn draw(frame: &mut Frame, host: &TerminalHost) {
    match host.portfolio().stage() {
        Stage::Idle | Stage::Loading => draw_loading(frame, host),
        Stage::Mounted | Stage::TornDown => {
            let [header, body] =
                Layout::vertical([Constraint::Length(HEADER_ROWS), Constraint::Min(0)]).areas(frame.area());
            draw_header(frame, host, header);
            draw_page(frame, host, body);
            if host.portfolio().is_menu_open() {
                draw_menu(frame, host, body);
            }
        }
    }
}

fn run_loop(terminal: &mut Terminal<CrosstermBackend<Stdout>>, host: &mut TerminalHost) -> Result<()> {
    let clock = Instant::now();
    host.start();

    loop {
        let now_ms = u64::try_from(clock.elapsed().as_millis()).unwrap_or(u64::MAX);
        host.tick(now_ms);
        terminal.draw(|frame| draw(frame, host))?;

        if event::poll(FRAME)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if !host.handle_key(key.code) {
                        break;
                    }
                }
                Event::Mouse(mouse) => match mouse.kind {
                    MouseEventKind::ScrollDown => host.scroll_by(ROW_PX * 3.0),
                    MouseEventKind::ScrollUp => host.scroll_by(-ROW_PX * 3.0),
                    _ => {}
                },
                Event::Resize(_, rows) => host.resize(rows.saturating_sub(HEADER_ROWS)),
                _ => {}
            }
        }
    }
    Ok(())
}

pub fn render_tui(portfolio: Portfolio) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let rows = terminal.size()?.height.saturating_sub(HEADER_ROWS);
    let mut host = TerminalHost::new(portfolio, rows);
    let result = run_loop(&mut terminal, &mut host);
    host.portfolio.teardown();

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

#[cfg(test)]
mod tests {
    use folio_core::{OrchestrationConfig, default_content};

    use super::*;

    fn host() -> TerminalHost {
        let content = default_content().expect("embedded content");
        let portfolio = Portfolio::seeded(content, OrchestrationConfig::default(), 7).expect("valid portfolio");
        TerminalHost::new(portfolio, 40)
    }

    #[test]
    fn bar_fills_proportionally() {
        assert_eq!(bar(0.0).chars().filter(|&c| c == '█').count(), 0);
        assert_eq!(bar(50.0).chars().filter(|&c| c == '█').count(), 15);
        assert_eq!(bar(150.0).chars().filter(|&c| c == '█').count(), BAR_WIDTH);
    }

    #[test]
    fn rows_are_clipped_to_the_body() {
        assert_eq!(visible_rows(0.0, 400.0, 30), Some((0, 20, 0)));
        assert_eq!(visible_rows(-100.0, 400.0, 30), Some((0, 20, 5)));
        assert_eq!(visible_rows(500.0, 1_000.0, 30), Some((25, 5, 0)));
        assert_eq!(visible_rows(700.0, 900.0, 30), None);
    }

    #[test]
    fn quit_keys_stop_the_loop() {
        let mut host = host();
        assert!(host.handle_key(KeyCode::Down));
        assert!(!host.handle_key(KeyCode::Char('q')));
        assert!(!host.handle_key(KeyCode::Esc));
    }

    #[test]
    fn open_menu_locks_scrolling() {
        let mut host = host();
        host.handle_key(KeyCode::Char('m'));
        assert!(host.portfolio().is_menu_open());
        host.handle_key(KeyCode::PageDown);
        assert_eq!(host.page.scroll_offset(), 0.0);

        host.handle_key(KeyCode::Char('m'));
        host.handle_key(KeyCode::PageDown);
        assert!(host.page.scroll_offset() > 0.0);
    }

    #[test]
    fn tween_labels_follow_the_plan_order() {
        let host = host();
        assert_eq!(host.tween_labels.len(), host.portfolio().tweens().len());
        assert_eq!(host.tween_labels[0], "Years Experience");
        assert_eq!(host.tween_labels[4], "Generative AI");
        assert_eq!(host.tween_labels[8], "PyTorch");
        assert_eq!(host.tween_labels[39], "VS Code");
    }

    #[test]
    fn skills_section_grows_to_fit_its_bars() {
        let content = default_content().expect("embedded content");
        let portfolio = Portfolio::seeded(content, OrchestrationConfig::default(), 7).expect("valid portfolio");
        // 400 px viewport: sections fall back to the 600 px minimum.
        let host = TerminalHost::new(portfolio, 20);
        let geometry = host.page.geometry();
        let height = |id: &str| {
            geometry
                .section(id)
                .map(|s| s.bottom - s.top)
                .unwrap_or_else(|| unreachable!("{id} is registered"))
        };
        assert_eq!(height("skills"), rows_to_px(32 + SECTION_CHROME_ROWS));
        assert_eq!(height("contact"), MIN_SECTION_PX);
    }
}
