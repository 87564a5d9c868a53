use crate::api::ApiClient;
use crate::app::{ActiveInput, App, InputMode};
use crate::cache::QueryState;
use crate::models::Todo;
use crate::parser::{DESCRIPTION_MAX, TITLE_MAX};
use crossterm::event::{self, Event as CEvent};
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
    Frame, Terminal,
};
use std::io;
use std::time::Duration;

fn centered_rect_absolute(width: u16, height: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length((r.height.saturating_sub(height)) / 2),
                Constraint::Length(height),
                Constraint::Length((r.height.saturating_sub(height) + 1) / 2),
            ]
            .as_ref(),
        )
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints(
            [
                Constraint::Length((r.width.saturating_sub(width)) / 2),
                Constraint::Length(width),
                Constraint::Length((r.width.saturating_sub(width) + 1) / 2),
            ]
            .as_ref(),
        )
        .split(popup_layout[1])[1]
}

// Badge colors follow the priority scale (1 urgent .. 5 relaxed). Values
// outside the range render like the default priority instead of failing.
fn priority_style(priority: u8) -> Style {
    let color = match priority {
        1 => Color::Red,
        2 => Color::LightRed,
        3 => Color::Yellow,
        4 => Color::Blue,
        5 => Color::Green,
        _ => Color::Yellow,
    };
    Style::default().fg(color).add_modifier(Modifier::BOLD)
}

fn get_legend(input_mode: &InputMode) -> Text<'static> {
    match input_mode {
        InputMode::Normal => Text::from(Line::from(vec![
            Span::styled(" q ", Style::default().fg(Color::Red)),
            Span::raw(": Quit "),
            Span::styled(" j/k ", Style::default().fg(Color::Red)),
            Span::raw(": Move "),
            Span::styled(" Space ", Style::default().fg(Color::Red)),
            Span::raw(": Toggle Done "),
            Span::styled(" a ", Style::default().fg(Color::Red)),
            Span::raw(": Add "),
            Span::styled(" e ", Style::default().fg(Color::Red)),
            Span::raw(": Edit "),
            Span::styled(" d ", Style::default().fg(Color::Red)),
            Span::raw(": Delete "),
            Span::styled(" f ", Style::default().fg(Color::Red)),
            Span::raw(": Filter "),
            Span::styled(" s ", Style::default().fg(Color::Red)),
            Span::raw(": Sort "),
            Span::styled(" / ", Style::default().fg(Color::Red)),
            Span::raw(": Search "),
            Span::styled(" r ", Style::default().fg(Color::Red)),
            Span::raw(": Refresh "),
            Span::styled(" Enter ", Style::default().fg(Color::Red)),
            Span::raw(": Details "),
        ])),
        InputMode::Search => Text::from(Line::from(vec![
            Span::raw("Type to search "),
            Span::styled(" Enter/Esc ", Style::default().fg(Color::Red)),
            Span::raw(": Done "),
            Span::styled(" Backspace ", Style::default().fg(Color::Red)),
            Span::raw(": Delete "),
        ])),
        InputMode::Editing => Text::from(Line::from(vec![
            Span::styled(" Tab ", Style::default().fg(Color::Red)),
            Span::raw(": Next Field "),
            Span::styled(" Left/Right ", Style::default().fg(Color::Red)),
            Span::raw(": Priority "),
            Span::styled(" Enter ", Style::default().fg(Color::Red)),
            Span::raw(": Submit "),
            Span::styled(" Esc ", Style::default().fg(Color::Red)),
            Span::raw(": Cancel "),
        ])),
        InputMode::ConfirmDelete => Text::from(Line::from(vec![
            Span::styled(" y ", Style::default().fg(Color::Red)),
            Span::raw(": Confirm Delete "),
            Span::styled(" any other key ", Style::default().fg(Color::Red)),
            Span::raw(": Cancel "),
        ])),
    }
}

fn draw_filter_bar(f: &mut Frame, app: &App, area: Rect) {
    let label = Style::default().add_modifier(Modifier::BOLD);
    let searching = matches!(app.input_mode, InputMode::Search);
    let search_text = if searching {
        format!("{}_", app.search)
    } else if app.search.is_empty() {
        "-".to_string()
    } else {
        app.search.clone()
    };
    let search_style = if searching {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };

    let line = Line::from(vec![
        Span::styled(" Status: ", label),
        Span::raw(app.status.label()),
        Span::styled("  Sort: ", label),
        Span::raw(app.sort.label()),
        Span::styled("  Search: ", label),
        Span::styled(search_text, search_style),
    ]);
    f.render_widget(Paragraph::new(line), area);
}

fn todo_row(todo: &Todo) -> ListItem<'static> {
    let checkbox = if todo.completed { "[x] " } else { "[ ] " };
    let title_style = if todo.completed {
        Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::CROSSED_OUT)
    } else {
        Style::default()
    };

    let mut lines = vec![Line::from(vec![
        Span::raw(checkbox),
        Span::styled(todo.title.clone(), title_style),
        Span::raw("  "),
        Span::styled(format!("P{}", todo.priority), priority_style(todo.priority)),
        Span::styled(
            format!("  {}", todo.created_at.format("%Y-%m-%d")),
            Style::default().fg(Color::DarkGray),
        ),
    ])];

    if let Some(description) = &todo.description {
        lines.push(Line::from(Span::styled(
            format!("    {description}"),
            Style::default().fg(Color::Gray),
        )));
    }

    ListItem::new(lines)
}

enum ListView {
    Loading,
    Error(String),
    Empty,
    Items(Vec<ListItem<'static>>),
}

fn draw_list(f: &mut Frame, app: &mut App, area: Rect) {
    let key = app.current_key();
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!("Todos ({})", app.status.label()));

    let view = match app.cache.list(&key) {
        QueryState::Idle | QueryState::Loading => ListView::Loading,
        QueryState::Error(msg) => ListView::Error(msg),
        QueryState::Success(todos) if todos.is_empty() => ListView::Empty,
        QueryState::Success(todos) => ListView::Items(todos.iter().map(todo_row).collect()),
    };

    match view {
        ListView::Loading => {
            let paragraph = Paragraph::new("Loading todos...")
                .style(Style::default().fg(Color::DarkGray))
                .block(block);
            f.render_widget(paragraph, area);
        }
        ListView::Error(msg) => {
            let paragraph = Paragraph::new(format!("Error loading todos: {msg}"))
                .style(Style::default().fg(Color::Red))
                .wrap(Wrap { trim: true })
                .block(block);
            f.render_widget(paragraph, area);
        }
        ListView::Empty => {
            let paragraph = Paragraph::new("No todos found. Press 'a' to create one.")
                .style(Style::default().fg(Color::DarkGray))
                .block(block);
            f.render_widget(paragraph, area);
        }
        ListView::Items(items) => {
            let list = List::new(items)
                .block(block)
                .highlight_style(
                    Style::default()
                        .fg(Color::Green)
                        .add_modifier(Modifier::BOLD),
                )
                .highlight_symbol(">> ");
            f.render_stateful_widget(list, area, &mut app.state);
        }
    }
}

fn draw_detail(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title("Details");

    let Some(id) = &app.detail_id else {
        let paragraph = Paragraph::new("Press Enter to view todo details")
            .block(block)
            .wrap(Wrap { trim: true });
        f.render_widget(paragraph, area);
        return;
    };

    let bold = Style::default().add_modifier(Modifier::BOLD);
    let content: Vec<Line<'static>> = match app.cache.detail(id) {
        QueryState::Idle | QueryState::Loading => {
            vec![Line::from(Span::raw("Loading..."))]
        }
        QueryState::Error(msg) => vec![Line::from(Span::styled(
            format!("Error loading details: {msg}"),
            Style::default().fg(Color::Red),
        ))],
        QueryState::Success(todo) => {
            let status = if todo.completed { "Done" } else { "Open" };
            let mut lines = vec![
                Line::from(vec![Span::styled("Title: ", bold), Span::raw(todo.title.clone())]),
                Line::from(vec![Span::styled("Status: ", bold), Span::raw(status)]),
                Line::from(vec![
                    Span::styled("Priority: ", bold),
                    Span::styled(format!("P{}", todo.priority), priority_style(todo.priority)),
                ]),
                Line::from(vec![
                    Span::styled("Created: ", bold),
                    Span::raw(todo.created_at.format("%Y-%m-%d %H:%M").to_string()),
                ]),
                Line::from(vec![
                    Span::styled("Updated: ", bold),
                    Span::raw(todo.updated_at.format("%Y-%m-%d %H:%M").to_string()),
                ]),
                Line::from(Span::styled("Description: ", bold)),
            ];
            match &todo.description {
                Some(description) => lines.push(Line::from(Span::raw(description.clone()))),
                None => lines.push(Line::from(Span::styled(
                    "No description",
                    Style::default().fg(Color::DarkGray),
                ))),
            }
            lines
        }
    };

    let paragraph = Paragraph::new(content)
        .block(block)
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, area);
}

fn field_label(text: String, active: bool) -> Line<'static> {
    let style = if active {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().add_modifier(Modifier::BOLD)
    };
    Line::from(Span::styled(text, style))
}

fn field_value(text: &str, active: bool) -> Line<'static> {
    let value = if active {
        format!("  {text}_")
    } else {
        format!("  {text}")
    };
    Line::from(Span::raw(value))
}

fn priority_row(selected: u8, active: bool) -> Line<'static> {
    let mut spans = vec![Span::raw("  ")];
    for p in 1..=5u8 {
        let style = if p == selected {
            priority_style(p).add_modifier(Modifier::REVERSED)
        } else if active {
            Style::default()
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let text = if p == selected {
            format!("[{p}]")
        } else {
            format!(" {p} ")
        };
        spans.push(Span::styled(text, style));
        spans.push(Span::raw(" "));
    }
    Line::from(spans)
}

fn draw_form(f: &mut Frame, app: &App, size: Rect) {
    let Some(form) = &app.form else {
        return;
    };

    let title = if form.is_edit() { "Edit Todo" } else { "New Todo" };
    let width = size.width.saturating_sub(4).min(70);
    let popup_area = centered_rect_absolute(width, 12, size);

    let mut lines = vec![
        field_label(
            format!("Title {}/{}", form.title.chars().count(), TITLE_MAX),
            app.active_input == ActiveInput::Title,
        ),
        field_value(&form.title, app.active_input == ActiveInput::Title),
        field_label(
            format!(
                "Description {}/{}",
                form.description.chars().count(),
                DESCRIPTION_MAX
            ),
            app.active_input == ActiveInput::Description,
        ),
        field_value(&form.description, app.active_input == ActiveInput::Description),
        field_label(
            "Priority".to_string(),
            app.active_input == ActiveInput::Priority,
        ),
        priority_row(form.priority, app.active_input == ActiveInput::Priority),
    ];

    if let Some(error) = &form.error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            error.clone(),
            Style::default().fg(Color::Red),
        )));
    }

    let popup_block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .style(Style::default().fg(Color::Green));

    let input = Paragraph::new(lines)
        .style(Style::default().fg(Color::White))
        .block(popup_block)
        .wrap(Wrap { trim: false });

    f.render_widget(Clear, popup_area);
    f.render_widget(input, popup_area);
}

fn draw_confirm(f: &mut Frame, size: Rect) {
    let popup_area = centered_rect_absolute(46, 5, size);
    let popup_block = Block::default()
        .title("Confirm")
        .borders(Borders::ALL)
        .style(Style::default().fg(Color::Red));

    let text = Text::from(vec![
        Line::from("Delete this todo?"),
        Line::from("Press 'y' to confirm, any other key to cancel."),
    ]);
    let paragraph = Paragraph::new(text)
        .style(Style::default().fg(Color::White))
        .alignment(Alignment::Center)
        .block(popup_block);

    f.render_widget(Clear, popup_area);
    f.render_widget(paragraph, popup_area);
}

fn draw(f: &mut Frame, app: &mut App) {
    let size = f.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(1),
                Constraint::Length(2),
            ]
            .as_ref(),
        )
        .split(size);

    draw_filter_bar(f, app, chunks[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(65), Constraint::Percentage(35)].as_ref())
        .split(chunks[1]);

    draw_list(f, app, body[0]);
    draw_detail(f, app, body[1]);

    if let Some(message) = &app.message {
        let line = Paragraph::new(Span::styled(
            format!(" {message}"),
            Style::default().fg(Color::Red),
        ));
        f.render_widget(line, chunks[2]);
    }

    let legend = Paragraph::new(get_legend(&app.input_mode))
        .style(Style::default().fg(Color::White))
        .alignment(Alignment::Left)
        .wrap(Wrap { trim: true });
    f.render_widget(legend, chunks[3]);

    match app.input_mode {
        InputMode::Editing => draw_form(f, app, size),
        InputMode::ConfirmDelete => draw_confirm(f, size),
        _ => {}
    }
}

pub async fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    mut app: App,
    api: &ApiClient,
) -> io::Result<()> {
    loop {
        // Draw first so Idle/stale keys show their loading or previous
        // state for the frame during which the fetch runs.
        terminal.draw(|f| draw(f, &mut app))?;

        app.ensure_data(api).await;

        if event::poll(Duration::from_millis(100))? {
            if let CEvent::Key(key) = event::read()? {
                let should_quit = app.handle_input(key, api).await?;
                if should_quit {
                    return Ok(());
                }
            }
        }
    }
}
