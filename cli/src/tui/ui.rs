use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, BorderType, Borders, Paragraph, Row, Table},
    Frame,
};
use storeops_core::format::{format_dollars, format_hours, format_number};

use crate::tui::app::{App, InputMode};

struct Theme {
    primary: Color,
    muted: Color,
    text: Color,
    current: Color,
    new: Color,
    warn: Color,
}

const THEME: Theme = Theme {
    primary: Color::Cyan,
    muted: Color::DarkGray,
    text: Color::White,
    current: Color::Blue,
    new: Color::Green,
    warn: Color::Red,
};

fn rounded(title: &str) -> Block<'_> {
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(THEME.muted))
}

pub fn draw(f: &mut Frame, app: &mut App) {
    let bottom = match app.input_mode {
        InputMode::Normal => 2,
        _ => 3,
    };
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),      // Header
            Constraint::Min(10),        // Content
            Constraint::Length(bottom), // Status + help, or input line
        ])
        .split(f.area());

    draw_header(f, app, main_chunks[0]);

    let content_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(main_chunks[1]);

    draw_inputs(f, app, content_chunks[0]);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(9), // Summary
            Constraint::Min(8),    // Chart
            Constraint::Length(9), // Process table
        ])
        .split(content_chunks[1]);

    draw_summary(f, app, right[0]);
    draw_chart(f, app, right[1]);
    draw_process_table(f, app, right[2]);

    match app.input_mode {
        InputMode::Normal => draw_footer(f, app, main_chunks[2]),
        _ => draw_input(f, app, main_chunks[2]),
    }
}

fn draw_header(f: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![Span::styled(
        "STOREOPS",
        Style::default().fg(THEME.primary).add_modifier(Modifier::BOLD),
    )];
    if let Some(name) = &app.scenario {
        spans.push(Span::styled(format!("  [{}]", name), Style::default().fg(THEME.text)));
    }
    spans.push(Span::styled(
        format!("  editing {} model", app.model),
        Style::default().fg(THEME.muted),
    ));
    if app.state.forecast.is_some() {
        spans.push(Span::styled("  forecast override", Style::default().fg(THEME.warn)));
    }

    let header = Paragraph::new(Line::from(spans))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).border_type(BorderType::Rounded));
    f.render_widget(header, area);
}

fn draw_inputs(f: &mut Frame, app: &mut App, area: Rect) {
    let rows: Vec<Row> = app
        .fields()
        .iter()
        .map(|field| Row::new(vec![Span::raw(app.label(field)), Span::styled(app.value(field), Style::default().fg(THEME.text))]))
        .collect();

    let table = Table::new(rows, [Constraint::Min(24), Constraint::Length(22)])
        .header(Row::new(vec!["Input", "Value"]).style(Style::default().fg(Color::Yellow)))
        .block(rounded(" Inputs "))
        .row_highlight_style(Style::default().bg(THEME.muted).add_modifier(Modifier::BOLD))
        .highlight_symbol(">> ");

    f.render_stateful_widget(table, area, &mut app.table_state);
}

fn draw_summary(f: &mut Frame, app: &App, area: Rect) {
    let t = &app.totals;
    let benefit_color = if t.benefit_hours < 0.0 { THEME.warn } else { THEME.new };
    let line = |label: &str, value: String, color: Color| {
        Line::from(vec![
            Span::styled(format!("{:<24}", label), Style::default().fg(THEME.muted)),
            Span::styled(value, Style::default().fg(color).add_modifier(Modifier::BOLD)),
        ])
    };

    let text = vec![
        line("Current hours / week", format_hours(t.total_current_hours), THEME.current),
        line("New hours / week", format_hours(t.total_new_hours), THEME.new),
        line("Benefit / store / week", format_hours(t.benefit_hours), benefit_color),
        line("Savings / store / week", format_dollars(t.weekly_savings), benefit_color),
        line("Network savings / week", format_dollars(t.network_weekly_savings), THEME.text),
        line("Network savings / year", format_dollars(t.network_annual_savings), THEME.text),
        line(
            "Network hours / year",
            format_number(t.network_annual_hours.round(), 0),
            THEME.text,
        ),
    ];

    f.render_widget(Paragraph::new(text).block(rounded(" Summary ")), area);
}

fn draw_chart(f: &mut Frame, app: &App, area: Rect) {
    let mut bar_data = Vec::new();
    for row in &app.totals.rows {
        bar_data.push((String::new(), row.current_hours.round().max(0.0) as u64, THEME.current));
        bar_data.push((
            row.process.label().chars().take(4).collect::<String>(),
            row.new_hours.round().max(0.0) as u64,
            THEME.new,
        ));
        // Spacer
        bar_data.push((String::new(), 0, Color::Reset));
    }

    let bar_items: Vec<Bar> = bar_data
        .iter()
        .map(|(label, value, color)| {
            Bar::default()
                .label(label.as_str())
                .value(*value)
                .style(Style::default().fg(*color))
                .text_value(if *value > 0 { value.to_string() } else { String::new() })
        })
        .collect();

    let chart = BarChart::default()
        .block(rounded(" Hours by process (current / new) "))
        .bar_width(4)
        .bar_gap(0)
        .data(BarGroup::default().bars(&bar_items));

    f.render_widget(chart, area);
}

fn draw_process_table(f: &mut Frame, app: &App, area: Rect) {
    let rows: Vec<Row> = app
        .totals
        .rows
        .iter()
        .map(|r| {
            let delta = r.delta();
            Row::new(vec![
                Span::raw(r.process.label()),
                Span::styled(format_number(r.current_hours, 1), Style::default().fg(THEME.current)),
                Span::styled(format_number(r.new_hours, 1), Style::default().fg(THEME.new)),
                Span::styled(
                    format_number(delta, 1),
                    Style::default().fg(if delta < 0.0 { THEME.warn } else { THEME.text }),
                ),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Min(20),
            Constraint::Length(10),
            Constraint::Length(10),
            Constraint::Length(10),
        ],
    )
    .header(Row::new(vec!["Process", "Current", "New", "Saved"]).style(Style::default().fg(Color::Yellow)))
    .block(rounded(" Weekly hours "));

    f.render_widget(table, area);
}

fn draw_footer(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1)])
        .split(area);

    if let Some(status) = &app.status {
        f.render_widget(
            Paragraph::new(status.as_str()).style(Style::default().fg(THEME.warn)),
            chunks[0],
        );
    }

    let help = "j/k: Field | h/l +/-: Adjust | Space: Toggle | Tab: Model | u: Unit | :: Overrides | i: Import | s: Save | x: Clear forecast | r: Reset | q: Quit";
    let footer = Paragraph::new(help)
        .style(Style::default().fg(THEME.muted))
        .alignment(Alignment::Center);
    f.render_widget(footer, chunks[1]);
}

fn draw_input(f: &mut Frame, app: &App, area: Rect) {
    let title = match app.input_mode {
        InputMode::Command => " Overrides (key:value ...) ",
        InputMode::Importing => " Forecast file path ",
        InputMode::Saving => " Scenario name ",
        InputMode::Normal => "",
    };
    let input = Paragraph::new(app.input.as_str())
        .style(Style::default().fg(Color::Yellow))
        .block(rounded(title));
    f.render_widget(input, area);

    let x = area.x + app.cursor_position as u16 + 1;
    f.set_cursor_position((x, area.y + 1));
}
