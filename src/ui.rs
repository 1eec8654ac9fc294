pub mod charting;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph, Widget, Wrap},
};

use crate::{
    clock::Clock,
    live::{LiveApp, Screen},
    session::SessionPhase,
    store::PersistentStore,
    time_series::to_coords,
    util::{fmt_hms, fmt_mmss, fmt_number, round_to_tenth},
};

const HORIZONTAL_MARGIN: u16 = 2;
const VERTICAL_MARGIN: u16 = 1;

impl<S: PersistentStore, C: Clock> Widget for &LiveApp<S, C> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match self.screen {
            Screen::Workout => render_workout(self, area, buf),
            Screen::Summary => render_summary(self, area, buf),
        }
    }
}

fn phase_style(phase: SessionPhase) -> Style {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    match phase {
        SessionPhase::Running => bold.fg(Color::Green),
        SessionPhase::Paused => bold.fg(Color::Yellow),
        SessionPhase::Completed => bold.fg(Color::Cyan),
        SessionPhase::Idle | SessionPhase::Selecting => bold.add_modifier(Modifier::DIM),
    }
}

/// Rows for `lines` of content plus the top and bottom border
fn bordered_height(lines: usize) -> u16 {
    u16::try_from(lines).unwrap_or(u16::MAX).saturating_add(2)
}

fn render_workout<S: PersistentStore, C: Clock>(live: &LiveApp<S, C>, area: Rect, buf: &mut Buffer) {
    let session = &live.app.session;
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let dim_style = Style::default().add_modifier(Modifier::DIM);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints([
            Constraint::Length(2), // header
            Constraint::Min(3),    // bank + selected
            Constraint::Length(3), // command line
            Constraint::Length(1), // status
        ])
        .split(area);

    let title = if session.title().trim().is_empty() {
        "Untitled workout"
    } else {
        session.title()
    };
    let rest = if session.is_resting() {
        Span::styled(
            format!("rest {} ●", fmt_mmss(session.rest_secs())),
            Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD),
        )
    } else {
        Span::styled(format!("last rest {}", fmt_mmss(session.last_rest_secs())), dim_style)
    };
    let header = Paragraph::new(vec![
        Line::from(vec![
            Span::styled(title.to_string(), bold_style),
            Span::styled(format!("  {}", session.date()), dim_style),
            Span::styled(
                format!("  {}", live.app.history.profile().initials()),
                dim_style,
            ),
        ]),
        Line::from(vec![
            Span::styled(fmt_hms(session.elapsed()), bold_style),
            Span::raw("  "),
            Span::styled(session.phase().to_string(), phase_style(session.phase())),
            Span::raw("  "),
            rest,
        ]),
    ]);
    header.render(chunks[0], buf);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(chunks[1]);

    let bank_lines = live
        .app
        .history
        .exercise_bank()
        .iter()
        .enumerate()
        .map(|(i, name)| {
            if session.is_selected(name) {
                Line::styled(
                    format!("{:>2} ● {name}", i + 1),
                    Style::default().patch(bold_style).fg(Color::Green),
                )
            } else {
                Line::styled(format!("{:>2}   {name}", i + 1), dim_style)
            }
        })
        .collect::<Vec<_>>();
    let recent = live.app.history.recent(live.recent_limit);
    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),
            Constraint::Length(bordered_height(recent.len())),
        ])
        .split(columns[0]);

    Paragraph::new(bank_lines)
        .block(Block::default().borders(Borders::ALL).title("bank"))
        .render(left[0], buf);

    let recent_lines = recent
        .iter()
        .map(|w| {
            let title = if w.title.is_empty() { "-" } else { w.title.as_str() };
            Line::styled(format!("{} {title} ({})", w.date, w.sets.len()), dim_style)
        })
        .collect::<Vec<_>>();
    Paragraph::new(recent_lines)
        .block(Block::default().borders(Borders::ALL).title("recent"))
        .render(left[1], buf);

    let mut selected_lines = Vec::new();
    for (i, exercise) in session.selected().iter().enumerate() {
        selected_lines.push(Line::styled(format!("{}. {exercise}", i + 1), bold_style));
        for set in session.sets_for(exercise) {
            let rpe = set.rpe.map(fmt_number).unwrap_or_else(|| "-".into());
            let mut text = format!(
                "   {}kg × {}  rpe {rpe}  rest {}",
                fmt_number(set.weight),
                set.reps,
                fmt_mmss(set.rest_sec)
            );
            if !set.note.is_empty() {
                text.push_str("  ");
                text.push_str(&set.note);
            }
            selected_lines.push(Line::raw(text));
        }
    }
    if selected_lines.is_empty() {
        selected_lines.push(Line::styled("select exercises with `x <n>`", dim_style));
    }
    Paragraph::new(selected_lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("today · {} sets", session.sets().len())),
        )
        .wrap(Wrap { trim: false })
        .render(columns[1], buf);

    Paragraph::new(Line::from(vec![
        Span::styled("> ", bold_style),
        Span::raw(live.input.as_str()),
        Span::styled("_", Style::default().add_modifier(Modifier::SLOW_BLINK)),
    ]))
    .block(Block::default().borders(Borders::ALL).title("command"))
    .render(chunks[2], buf);

    render_status(live, chunks[3], buf);
}

fn render_status<S: PersistentStore, C: Clock>(live: &LiveApp<S, C>, area: Rect, buf: &mut Buffer) {
    if let Some(status) = &live.status {
        let style = if status.is_error {
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray).add_modifier(Modifier::ITALIC)
        };
        Paragraph::new(Span::styled(status.text.as_str(), style)).render(area, buf);
    }
}

fn render_summary<S: PersistentStore, C: Clock>(live: &LiveApp<S, C>, area: Rect, buf: &mut Buffer) {
    let summary = live.app.session.summary();
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let italic_style = Style::default().add_modifier(Modifier::ITALIC);
    let magenta_style = Style::default().fg(Color::Magenta);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(2), // stats
            Constraint::Min(1),    // chart
            Constraint::Length(1), // status
            Constraint::Length(1), // legend
        ])
        .split(area);

    let title = if summary.title.is_empty() {
        "Workout".to_string()
    } else {
        summary.title.clone()
    };
    let avg_rpe = summary
        .avg_rpe
        .map(|r| fmt_number(round_to_tenth(r)))
        .unwrap_or_else(|| "-".into());
    Paragraph::new(vec![
        Line::styled(format!("{title} · {}", summary.date), bold_style),
        Line::styled(
            format!(
                "{}   {} sets   avg RPE {avg_rpe}",
                fmt_hms(summary.elapsed),
                summary.total_sets
            ),
            bold_style,
        ),
    ])
    .alignment(Alignment::Center)
    .render(chunks[0], buf);

    let coords = to_coords(&summary.rpe_series);
    let (last_x, highest) = charting::compute_chart_params(&coords);
    let (first_label, last_label) = charting::edge_labels(&summary.rpe_series);
    let datasets = vec![Dataset::default()
        .marker(ratatui::symbols::Marker::Braille)
        .style(magenta_style)
        .graph_type(GraphType::Line)
        .data(&coords)];

    Chart::new(datasets)
        .x_axis(
            Axis::default()
                .title("set")
                .bounds([0.0, last_x])
                .labels(vec![
                    Span::styled(first_label, bold_style),
                    Span::styled(last_label, bold_style),
                ]),
        )
        .y_axis(
            Axis::default()
                .title("rpe")
                .bounds([0.0, highest])
                .labels(vec![
                    Span::styled("0", bold_style),
                    Span::styled(charting::format_label(highest), bold_style),
                ]),
        )
        .render(chunks[1], buf);

    render_status(live, chunks[2], buf);

    Paragraph::new(Span::styled("(enter) save / (esc) back", italic_style)).render(chunks[3], buf);
}
