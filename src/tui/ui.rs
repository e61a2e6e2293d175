use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{
        Block, Borders, Cell, Clear, List, ListItem, Paragraph, Row, Table, TableState, Tabs, Wrap,
    },
    Frame,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use super::{App, Popup, Tab};
use crate::calendar::{self, Appointment, CalendarView, MainResource};
use crate::selector::SelectorKind;
use chrono::{Datelike, Local};

const ACCENT: Color = Color::Cyan;
const HEADER_BG: Color = Color::DarkGray;
const SELECTED_BG: Color = Color::Rgb(40, 40, 60);
const DIM: Color = Color::DarkGray;
const GOOD: Color = Color::Green;
const WARN: Color = Color::Yellow;
const BAD: Color = Color::Red;

const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];

// ─── Main render ────────────────────────────────────────────────────────────

pub fn render(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(f.area());

    render_tabs(f, app, chunks[0]);
    render_clock(f, chunks[0]);

    match app.active_tab {
        Tab::Groups | Tab::Teachers => render_schedule(f, app, chunks[1]),
        Tab::Summary => render_summary(f, app, chunks[1]),
    }

    render_status_bar(f, app, chunks[2]);
    render_popup(f, app);
}

// ─── Tab Bar ────────────────────────────────────────────────────────────────

fn render_tabs(f: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = Tab::ALL
        .iter()
        .enumerate()
        .map(|(i, tab)| {
            Line::from(vec![
                Span::styled(format!(" {} ", i + 1), Style::default().fg(DIM)),
                Span::styled(format!("{} ", tab.title()), Style::default().fg(Color::White)),
            ])
        })
        .collect();

    let selected = Tab::ALL
        .iter()
        .position(|t| *t == app.active_tab)
        .unwrap_or(0);

    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::BOTTOM)
                .title(" Schedule ")
                .title_style(Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)),
        )
        .select(selected)
        .highlight_style(
            Style::default()
                .fg(ACCENT)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        );

    f.render_widget(tabs, area);
}

// ─── Clock ──────────────────────────────────────────────────────────────────

fn render_clock(f: &mut Frame, tab_area: Rect) {
    let time_str = format!(" {} ", Local::now().format("%a %b %d  %H:%M:%S"));
    let clock_width = time_str.width() as u16;
    let clock_area = Rect {
        x: tab_area.right().saturating_sub(clock_width),
        y: tab_area.y,
        width: clock_width.min(tab_area.width),
        height: 1,
    };
    f.render_widget(
        Paragraph::new(time_str).style(Style::default().fg(ACCENT)),
        clock_area,
    );
}

// ─── Status Bar ─────────────────────────────────────────────────────────────

fn render_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let kind = app.active_tab.selector();
    let mut spans = vec![Span::raw(" ")];

    if let Some(alert) = app.session.alerts.current(std::time::Instant::now()) {
        spans.push(Span::styled(
            alert.message.clone(),
            Style::default().fg(alert.severity.color()).add_modifier(Modifier::BOLD),
        ));
    } else if app.is_fetching() {
        let frame = SPINNER[(app.frame_count / 2 % SPINNER.len() as u64) as usize];
        spans.push(Span::styled(format!("{frame} Loading schedule…"), Style::default().fg(WARN)));
    } else {
        spans.push(Span::styled("Ready", Style::default().fg(Color::White)));
    }

    if !app.network.online {
        spans.push(Span::styled("  offline", Style::default().fg(BAD)));
    }
    if app.is_cached(kind) {
        spans.push(Span::styled("  cached list", Style::default().fg(WARN)));
    }
    spans.push(Span::styled(
        format!("  {}", app.session.link(kind).as_str()),
        Style::default().fg(ACCENT),
    ));
    spans.push(Span::styled(
        "  q:quit  s:select  m:multi  f:types  /:search  v:view  h/l:period  r:refresh  ",
        Style::default().fg(DIM),
    ));

    let status = Paragraph::new(Line::from(spans)).style(Style::default().bg(HEADER_BG));
    f.render_widget(status, area);
}

// ─── Schedule ───────────────────────────────────────────────────────────────

/// Everything a card needs to pick its color and tag.
struct CardCtx {
    resource: MainResource,
    names: Vec<String>,
    selected: Option<Appointment>,
}

impl CardCtx {
    fn new(app: &App) -> Self {
        let names = app.selected(app.active_tab.selector()).to_vec();
        let resource = calendar::main_resource(names.len(), app.state().groups_split_color);
        Self {
            resource,
            names,
            selected: app.selected_appointment().cloned(),
        }
    }

    fn color(&self, a: &Appointment) -> Color {
        calendar::appointment_color(a, self.resource, &self.names)
    }

    fn is_selected(&self, a: &Appointment) -> bool {
        self.selected.as_ref() == Some(a)
    }
}

fn render_schedule(f: &mut Frame, app: &mut App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(area);
    render_selection(f, app, chunks[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(40)])
        .split(chunks[1]);

    let ctx = CardCtx::new(app);
    match app.cursor.view {
        CalendarView::Month => render_month(f, app, body[0], &ctx),
        CalendarView::Week => render_week(f, app, body[0], &ctx),
        CalendarView::Day => render_day(f, app, body[0], &ctx),
    }
    render_details(f, app, body[1], &ctx);
}

fn render_selection(f: &mut Frame, app: &App, area: Rect) {
    let kind = app.active_tab.selector();
    let state = app.state();
    let multiple = app.is_multiple(kind);
    let selected = app.selected(kind);

    let mut first = vec![Span::styled(
        format!(" {}: ", kind.title(multiple)),
        Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
    )];
    if selected.is_empty() {
        first.push(Span::styled("nothing selected, press s", Style::default().fg(DIM)));
    }
    for (i, key) in selected.iter().enumerate() {
        if i > 0 {
            first.push(Span::styled(", ", Style::default().fg(DIM)));
        }
        let color = if selected.len() > 1 {
            calendar::series_color(selected, key)
        } else {
            Color::White
        };
        first.push(Span::styled(
            app.label_for(kind, key).to_string(),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ));
    }
    if multiple {
        first.push(Span::styled("  [multi]", Style::default().fg(WARN)));
    }

    let mut second = vec![Span::styled(
        format!(" {}  ·  {}", app.cursor.title(), app.cursor.view.label()),
        Style::default().fg(Color::White),
    )];
    if !state.lesson_types.is_empty() {
        let labels: Vec<&str> = state.lesson_types.iter().map(|k| k.short_label()).collect();
        second.push(Span::styled(
            format!("  ·  types: {}", labels.join(", ")),
            Style::default().fg(WARN),
        ));
    }
    if !state.lesson_filter.is_empty() {
        second.push(Span::styled(
            format!("  ·  search: \"{}\"", state.lesson_filter),
            Style::default().fg(WARN),
        ));
    }
    if selected.len() > 1 {
        let colors = match calendar::main_resource(selected.len(), state.groups_split_color) {
            MainResource::Series => "by entity",
            MainResource::LessonType => "by type",
        };
        let grouping = match (state.grouping_groups, state.is_group_by_date) {
            (false, _) => "off",
            (true, true) => "date first",
            (true, false) => "entity first",
        };
        second.push(Span::styled(
            format!("  ·  colors {colors}  ·  grouping {grouping}"),
            Style::default().fg(DIM),
        ));
    }

    let header = Paragraph::new(vec![Line::from(first), Line::from(second)])
        .block(Block::default().borders(Borders::BOTTOM));
    f.render_widget(header, area);
}

fn card_lines(app: &App, a: &Appointment, ctx: &CardCtx, width: usize) -> Vec<Line<'static>> {
    let color = ctx.color(a);
    let bg = if ctx.is_selected(a) { SELECTED_BG } else { Color::Reset };
    let tag = a.series.as_deref().map(|s| app.series_label(s));
    let kinds = a.kinds.labels().join("/");

    let head = format!("{} #{} {}", a.start.format("%H:%M"), a.number, kinds);
    let title = calendar::card_title(a, tag.as_deref());
    let mut lines = vec![
        Line::from(Span::styled(
            truncate(&head, width),
            Style::default().fg(color).bg(bg).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            truncate(&title, width),
            Style::default().fg(Color::White).bg(bg),
        )),
    ];
    if let Some(room) = &a.room {
        lines.push(Line::from(Span::styled(
            truncate(room, width),
            Style::default().fg(DIM).bg(bg),
        )));
    }
    lines
}

fn render_week(f: &mut Frame, app: &App, area: Rect, ctx: &CardCtx) {
    let state = app.state();
    let visible = app.visible();
    let grouping = calendar::grouping_enabled(ctx.names.len(), state.grouping_groups);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", app.cursor.title()))
        .title_style(Style::default().fg(ACCENT));
    let inner = block.inner(area);
    f.render_widget(block, area);

    if grouping && !state.is_group_by_date {
        let bands = calendar::group_by_series(&visible, &ctx.names);
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints(vec![Constraint::Ratio(1, bands.len() as u32); bands.len()])
            .split(inner);
        for ((name, items), band) in bands.iter().zip(rows.iter()) {
            let band_block = Block::default()
                .borders(Borders::TOP)
                .title(format!(" {} ", app.series_label(name)))
                .title_style(Style::default().fg(calendar::series_color(&ctx.names, name)));
            let band_inner = band_block.inner(*band);
            f.render_widget(band_block, *band);
            render_week_columns(f, app, band_inner, items, false, ctx);
        }
    } else {
        render_week_columns(f, app, inner, &visible, grouping, ctx);
    }
}

fn render_week_columns(
    f: &mut Frame,
    app: &App,
    area: Rect,
    list: &[&Appointment],
    split_series: bool,
    ctx: &CardCtx,
) {
    let today = Local::now().date_naive();
    let columns = calendar::layout_week(list, app.cursor.date);
    let areas = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(vec![Constraint::Ratio(1, columns.len() as u32); columns.len()])
        .split(area);

    for (col, col_area) in columns.iter().zip(areas.iter()) {
        let width = col_area.width.saturating_sub(1) as usize;
        let header_style = if col.date == today {
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(WARN).add_modifier(Modifier::BOLD)
        };
        let mut lines = vec![Line::from(Span::styled(
            col.date.format("%a %d.%m").to_string(),
            header_style,
        ))];

        if split_series {
            for (name, items) in calendar::group_by_series(&col.appointments, &ctx.names) {
                if items.is_empty() {
                    continue;
                }
                lines.push(Line::from(Span::styled(
                    truncate(&format!("── {} ──", app.series_label(&name)), width),
                    Style::default().fg(calendar::series_color(&ctx.names, &name)),
                )));
                for a in items {
                    lines.extend(card_lines(app, a, ctx, width));
                }
            }
        } else {
            for a in &col.appointments {
                lines.extend(card_lines(app, a, ctx, width));
            }
        }
        if col.appointments.is_empty() {
            lines.push(Line::from(Span::styled("·", Style::default().fg(DIM))));
        }

        let column = Paragraph::new(lines).block(Block::default().borders(Borders::RIGHT));
        f.render_widget(column, *col_area);
    }
}

fn render_month(f: &mut Frame, app: &App, area: Rect, ctx: &CardCtx) {
    let today = Local::now().date_naive();
    let visible = app.visible();
    let weeks = calendar::layout_month(&visible, app.cursor.date);
    let selected_date = ctx.selected.as_ref().map(|a| a.date());

    let header = Row::new(["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"])
        .style(Style::default().fg(ACCENT).add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = weeks
        .iter()
        .map(|week| {
            let cells: Vec<Cell> = week
                .iter()
                .map(|cell| {
                    let mut day_style = if !cell.in_month {
                        Style::default().fg(DIM)
                    } else if cell.date == today {
                        Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
                    } else {
                        Style::default().fg(Color::White)
                    };
                    if Some(cell.date) == selected_date {
                        day_style = day_style.bg(SELECTED_BG);
                    }
                    let mut lines = vec![Line::from(Span::styled(
                        format!("{:>2}", cell.date.day()),
                        day_style,
                    ))];
                    if cell.count > 0 {
                        let first_color = calendar::appointments_on(&visible, cell.date)
                            .first()
                            .map(|a| ctx.color(a))
                            .unwrap_or(GOOD);
                        let noun = if cell.count == 1 { "lesson" } else { "lessons" };
                        lines.push(Line::from(Span::styled(
                            format!("{} {noun}", cell.count),
                            Style::default().fg(if cell.in_month { first_color } else { DIM }),
                        )));
                    }
                    Cell::from(lines)
                })
                .collect();
            Row::new(cells).height(3)
        })
        .collect();

    let table = Table::new(rows, [Constraint::Ratio(1, 7); 7])
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {} ", app.cursor.title()))
                .title_style(Style::default().fg(ACCENT)),
        );
    f.render_widget(table, area);
}

fn render_day(f: &mut Frame, app: &mut App, area: Rect, ctx: &CardCtx) {
    let title = format!(" {} ", app.cursor.title());
    let grouping = calendar::grouping_enabled(ctx.names.len(), app.state().grouping_groups);

    if grouping {
        let app: &App = app;
        let visible = app.visible();
        let day = calendar::appointments_on(&visible, app.cursor.date);
        let lanes = calendar::group_by_series(&day, &ctx.names);
        let areas = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(vec![Constraint::Ratio(1, lanes.len() as u32); lanes.len()])
            .split(area);
        for ((name, items), lane) in lanes.iter().zip(areas.iter()) {
            let width = lane.width.saturating_sub(2) as usize;
            let mut lines: Vec<Line> = Vec::new();
            for a in items {
                lines.extend(card_lines(app, a, ctx, width));
                lines.push(Line::from(""));
            }
            if items.is_empty() {
                lines.push(Line::from(Span::styled("  No lessons.", Style::default().fg(DIM))));
            }
            let block = Block::default()
                .borders(Borders::ALL)
                .title(format!(" {} ", app.series_label(name)))
                .title_style(Style::default().fg(calendar::series_color(&ctx.names, name)));
            f.render_widget(Paragraph::new(lines).block(block), *lane);
        }
        return;
    }

    let width = area.width.saturating_sub(4) as usize;
    let view: &App = app;
    let mut items: Vec<ListItem<'static>> = view
        .period_appointments()
        .into_iter()
        .map(|a| {
            let mut lines = card_lines(view, a, ctx, width);
            lines[0].spans.insert(
                0,
                Span::styled(
                    format!("{}–{}  ", a.start.format("%H:%M"), a.end.format("%H:%M")),
                    Style::default().fg(DIM),
                ),
            );
            ListItem::new(lines)
        })
        .collect();
    if items.is_empty() {
        items.push(ListItem::new("  No lessons on this day."));
    }

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .title(title)
            .title_style(Style::default().fg(ACCENT)),
    );
    app.agenda_state
        .inner
        .select(Some(app.agenda_state.selected));
    f.render_stateful_widget(list, area, &mut app.agenda_state.inner);
}

fn render_details(f: &mut Frame, app: &App, area: Rect, ctx: &CardCtx) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Lesson ")
        .title_style(Style::default().fg(ACCENT));

    let Some(a) = ctx.selected.as_ref() else {
        let msg = if app.is_fetching() {
            "  Loading…"
        } else {
            "  No lessons in this period."
        };
        f.render_widget(Paragraph::new(msg).block(block), area);
        return;
    };

    let tag = a.series.as_deref().map(|s| app.series_label(s));
    let mut lines = vec![
        Line::from(Span::styled(
            calendar::card_title(a, tag.as_deref()),
            Style::default().fg(ctx.color(a)).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            format!(
                "{}  {}–{}",
                a.start.format("%a %d %b"),
                a.start.format("%H:%M"),
                a.end.format("%H:%M")
            ),
            Style::default().fg(DIM),
        )),
        Line::from(""),
    ];
    for (field, value) in calendar::tooltip(a) {
        lines.push(Line::from(vec![
            Span::styled(format!("{:<10}", field.label()), Style::default().fg(DIM)),
            Span::styled(value, Style::default().fg(Color::White)),
        ]));
    }

    f.render_widget(
        Paragraph::new(lines).wrap(Wrap { trim: true }).block(block),
        area,
    );
}

// ─── Teacher summary ────────────────────────────────────────────────────────

fn render_summary(f: &mut Frame, app: &mut App, area: Rect) {
    let teacher = app
        .state()
        .selected_teachers
        .first()
        .map(|k| app.label_for(SelectorKind::Teachers, k).to_string());

    let header = Row::new(vec!["", "Subject", "Lessons", "Types", "Groups"])
        .style(Style::default().fg(ACCENT).add_modifier(Modifier::BOLD))
        .bottom_margin(1);

    let mut rows: Vec<Row> = Vec::new();
    let mut selected_row = 0usize;
    for (i, subject) in app.subjects.iter().enumerate() {
        let expanded = app.table_state.is_expanded(&subject.lesson_name);
        if i == app.table_state.selected {
            selected_row = rows.len();
        }
        let marker = if expanded { "▾" } else { "▸" };
        rows.push(Row::new(vec![
            Cell::from(marker),
            Cell::from(subject.lesson_name.clone()),
            Cell::from(subject.lesson_count.to_string()),
            Cell::from(subject.lesson_type.labels().join(", "))
                .style(Style::default().fg(subject.lesson_type.color())),
            Cell::from(subject.groups.len().to_string()),
        ]));

        if expanded {
            for group in &subject.groups {
                let counts: Vec<String> = group
                    .counts
                    .iter()
                    .map(|(flags, n)| format!("{}×{n}", flags.labels().join("+")))
                    .collect();
                rows.push(
                    Row::new(vec![
                        Cell::from(""),
                        Cell::from(format!("  {}", group.name)),
                        Cell::from(group.total().to_string()),
                        Cell::from(counts.join(" ")),
                        Cell::from(""),
                    ])
                    .style(Style::default().fg(DIM)),
                );
            }
        }
    }

    let title = match &teacher {
        Some(name) => format!(" {name} ({} subjects) ", app.subjects.len()),
        None => " No teacher selected, press s ".to_string(),
    };
    if rows.is_empty() {
        let msg = if app.is_fetching() { "  Loading…" } else { "  No lessons found." };
        f.render_widget(
            Paragraph::new(msg).block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(title)
                    .title_style(Style::default().fg(ACCENT)),
            ),
            area,
        );
        return;
    }

    let table = Table::new(
        rows,
        [
            Constraint::Length(2),
            Constraint::Percentage(45),
            Constraint::Length(8),
            Constraint::Percentage(30),
            Constraint::Length(7),
        ],
    )
    .header(header)
    .row_highlight_style(Style::default().bg(SELECTED_BG))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(title)
            .title_style(Style::default().fg(ACCENT)),
    );

    let mut state = TableState::default();
    state.select(Some(selected_row));
    f.render_stateful_widget(table, area, &mut state);
}

// ─── Popups ─────────────────────────────────────────────────────────────────

fn render_popup(f: &mut Frame, app: &App) {
    match &app.popup {
        Popup::None => {}
        Popup::Picker(picker) => {
            let area = centered_rect(60, 70, f.area());
            f.render_widget(Clear, area);
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Length(3), Constraint::Min(0)])
                .split(area);

            let multiple = app.is_multiple(picker.kind);
            let input = Paragraph::new(format!(" {}▏", picker.query)).block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!(" Select {} ", picker.kind.title(multiple).to_lowercase()))
                    .title_style(Style::default().fg(ACCENT)),
            );
            f.render_widget(input, chunks[0]);

            let selected = app.selected(picker.kind);
            let entries = app.picker_entries(picker.kind, &picker.query);
            let width = chunks[1].width.saturating_sub(6) as usize;
            let mut items: Vec<ListItem> = entries
                .iter()
                .enumerate()
                .map(|(i, (section, entry))| {
                    let is_cursor = i == picker.list.selected;
                    let chosen = selected.iter().any(|s| *s == entry.key);
                    let check = match (multiple, chosen) {
                        (true, true) => "[x] ",
                        (true, false) => "[ ] ",
                        (false, true) => "● ",
                        (false, false) => "  ",
                    };
                    let bg = if is_cursor { SELECTED_BG } else { Color::Reset };
                    ListItem::new(Line::from(vec![
                        Span::styled(if is_cursor { "> " } else { "  " }, Style::default().fg(ACCENT)),
                        Span::styled(check, Style::default().fg(GOOD).bg(bg)),
                        Span::styled(
                            truncate(&entry.label, width.saturating_sub(section.width() + 3)),
                            Style::default().fg(Color::White).bg(bg),
                        ),
                        Span::styled(format!("  {section}"), Style::default().fg(DIM).bg(bg)),
                    ]))
                })
                .collect();
            if items.is_empty() {
                items.push(ListItem::new("  Nothing matches."));
            }

            let hint = if multiple {
                " ↑/↓ move  Space toggle  Enter/Esc close "
            } else {
                " ↑/↓ move  Enter select  Esc cancel "
            };
            let list = List::new(items).block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!(" {}/{} ", entries.len().min(picker.list.selected + 1), entries.len()))
                    .title_bottom(Line::from(Span::styled(hint, Style::default().fg(DIM)))),
            );
            let mut state = ratatui::widgets::ListState::default();
            state.select(Some(picker.list.selected));
            f.render_stateful_widget(list, chunks[1], &mut state);
        }
        Popup::TypeFilter(list_state) => {
            let area = centered_rect(40, 50, f.area());
            f.render_widget(Clear, area);
            let active = &app.state().lesson_types;
            let mut items: Vec<ListItem> = app
                .filter_kinds()
                .iter()
                .enumerate()
                .map(|(i, kind)| {
                    let is_cursor = i == list_state.selected;
                    let check = if active.contains(kind) { "[x] " } else { "[ ] " };
                    let bg = if is_cursor { SELECTED_BG } else { Color::Reset };
                    ListItem::new(Line::from(vec![
                        Span::styled(if is_cursor { "> " } else { "  " }, Style::default().fg(ACCENT)),
                        Span::styled(check, Style::default().fg(GOOD).bg(bg)),
                        Span::styled(kind.long_label(), Style::default().fg(kind.color()).bg(bg)),
                    ]))
                })
                .collect();
            if items.is_empty() {
                items.push(ListItem::new("  No lessons loaded."));
            }
            let list = List::new(items).block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Lesson types ")
                    .title_style(Style::default().fg(ACCENT))
                    .title_bottom(Line::from(Span::styled(
                        " Space toggle  Enter close ",
                        Style::default().fg(DIM),
                    ))),
            );
            f.render_widget(list, area);
        }
        Popup::TextFilter(input) => {
            let area = centered_rect(50, 20, f.area());
            f.render_widget(Clear, area);
            let body = Paragraph::new(vec![
                Line::from(Span::styled(format!(" {input}▏"), Style::default().fg(Color::White))),
                Line::from(""),
                Line::from(Span::styled(
                    " Matches title, room, teacher or group.  Enter keep  Esc clear",
                    Style::default().fg(DIM),
                )),
            ])
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Search lessons ")
                    .title_style(Style::default().fg(ACCENT)),
            );
            f.render_widget(body, area);
        }
        Popup::BetaNotice => {
            let area = centered_rect(50, 30, f.area());
            f.render_widget(Clear, area);
            let body = Paragraph::new(vec![
                Line::from(Span::styled(
                    "This viewer is an alpha release.",
                    Style::default().fg(WARN).add_modifier(Modifier::BOLD),
                )),
                Line::from(""),
                Line::from("Schedule data may be wrong and the layout may look odd."),
                Line::from(""),
                Line::from(Span::styled("Continue?  y / n", Style::default().fg(ACCENT))),
            ])
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Notice ")
                    .title_style(Style::default().fg(WARN)),
            );
            f.render_widget(body, area);
        }
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

/// Cut `s` to `width` display columns, marking the cut with an ellipsis.
fn truncate(s: &str, width: usize) -> String {
    if s.width() <= width {
        return s.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for ch in s.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_counts_display_columns() {
        assert_eq!(truncate("Лекция", 10), "Лекция");
        assert_eq!(truncate("Математика", 5), "Мате…");
        assert_eq!(truncate("漢字漢字", 5), "漢字…");
    }

    #[test]
    fn centered_rect_stays_inside() {
        let outer = Rect::new(0, 0, 100, 40);
        let inner = centered_rect(50, 50, outer);
        assert_eq!(inner.width, 50);
        assert_eq!(inner.height, 20);
        assert_eq!(inner.x, 25);
    }
}
