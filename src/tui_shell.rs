use std::io::{self, IsTerminal};
use std::sync::OnceLock;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph};

use time::OffsetDateTime;
use time::format_description::FormatItem;

use crate::model::Location;
use crate::options;
use crate::remote::EndpointClient;
use crate::resolve::{CodeOutcome, format_dia};
use crate::session::Session;
use crate::store::ConfigStore;
use crate::validate::{format_quantity, parse_quantity, round_quantity};

mod input;
use input::Input;

pub fn run() -> Result<()> {
    if !io::stdin().is_terminal() || !io::stdout().is_terminal() {
        anyhow::bail!("TUI requires an interactive terminal (TTY)");
    }

    let mut stdout = io::stdout();
    enable_raw_mode().context("enable raw mode")?;
    execute!(stdout, EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;
    terminal.clear().ok();

    let mut app = App::load();
    let res = run_loop(&mut terminal, &mut app);

    disable_raw_mode().ok();
    execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
    terminal.show_cursor().ok();

    res
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Field {
    Code,
    NewEntry,
    Maker,
    Model,
    Dia,
    Location,
    Quantity,
    Pieces,
    Note,
    Submit,
}

impl Field {
    const ORDER: [Field; 10] = [
        Field::Code,
        Field::NewEntry,
        Field::Maker,
        Field::Model,
        Field::Dia,
        Field::Location,
        Field::Quantity,
        Field::Pieces,
        Field::Note,
        Field::Submit,
    ];

    fn label(self) -> &'static str {
        match self {
            Field::Code => "code",
            Field::NewEntry => "new entry",
            Field::Maker => "maker",
            Field::Model => "model",
            Field::Dia => "diameter",
            Field::Location => "location",
            Field::Quantity => "quantity",
            Field::Pieces => "pieces",
            Field::Note => "note",
            Field::Submit => "submit",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum MessageKind {
    Info,
    Success,
    Error,
}

#[derive(Clone, Debug)]
struct Message {
    kind: MessageKind,
    text: String,
}

impl Message {
    fn info(text: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::Info,
            text: text.into(),
        }
    }

    fn success(text: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::Success,
            text: text.into(),
        }
    }

    fn error(text: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::Error,
            text: text.into(),
        }
    }
}

#[derive(Debug)]
struct Picker {
    field: Field,
    items: Vec<String>,
    state: ListState,
}

struct App {
    session: Session,
    endpoint_label: Option<String>,
    fetched_at: Option<OffsetDateTime>,

    field: usize,
    editing: Option<Field>,
    input: Input,
    picker: Option<Picker>,

    message: Option<Message>,
    quit: bool,
}

impl App {
    fn load() -> Self {
        let mut message = None;
        let mut endpoint_label = None;

        let client = match load_client() {
            Ok(Some(c)) => {
                endpoint_label = Some(c.endpoint().url.clone());
                Some(c)
            }
            Ok(None) => None,
            Err(err) => {
                message = Some(Message::error(format!("{:#}", err)));
                None
            }
        };

        let mut app = Self {
            session: Session::new(client),
            endpoint_label,
            fetched_at: None,
            field: 0,
            editing: None,
            input: Input::default(),
            picker: None,
            message,
            quit: false,
        };

        if app.session.has_endpoint() {
            app.refresh_catalog();
        } else if app.message.is_none() {
            app.message = Some(Message::info(
                "no endpoint configured (run `tally endpoint set --url ...`)",
            ));
        }
        app
    }

    fn current_field(&self) -> Field {
        Field::ORDER[self.field.min(Field::ORDER.len() - 1)]
    }

    fn move_up(&mut self) {
        self.field = self.field.saturating_sub(1);
    }

    fn move_down(&mut self) {
        self.field = (self.field + 1).min(Field::ORDER.len() - 1);
    }

    fn field_value(&self, field: Field) -> String {
        let sel = self.session.selection();
        match field {
            Field::Code => sel.code.clone(),
            Field::Maker => sel.maker.clone(),
            Field::Model => sel.model.clone(),
            Field::Dia => sel.dia.clone(),
            Field::Quantity => sel.quantity.clone(),
            Field::Pieces => sel.piece_count.clone(),
            Field::Note => sel.note.clone(),
            Field::NewEntry | Field::Location | Field::Submit => String::new(),
        }
    }

    fn refresh_catalog(&mut self) {
        match self.session.refresh_catalog() {
            Ok(n) => {
                self.fetched_at = Some(OffsetDateTime::now_utc());
                self.message = Some(Message::info(format!("catalog loaded ({} variants)", n)));
            }
            Err(err) => self.message = Some(Message::error(err.to_string())),
        }
    }

    fn activate(&mut self) {
        let field = self.current_field();
        match field {
            Field::Code | Field::Quantity | Field::Pieces | Field::Note => self.start_edit(field),
            Field::Maker | Field::Model | Field::Dia => {
                if self.session.selection().new_mode {
                    self.start_edit(field);
                } else {
                    self.open_picker(field);
                }
            }
            Field::Location => self.open_picker(field),
            Field::NewEntry => self.toggle_new_mode(),
            Field::Submit => self.submit(),
        }
    }

    fn start_edit(&mut self, field: Field) {
        self.input.set(self.field_value(field));
        self.editing = Some(field);
    }

    fn commit_edit(&mut self) {
        let Some(field) = self.editing.take() else {
            return;
        };
        let value = self.input.buf.clone();
        self.input.clear();

        match field {
            Field::Code => {
                if self.session.enter_code(&value) == CodeOutcome::Resolved {
                    self.message = None;
                }
            }
            Field::Maker => self.session.set_maker_text(&value),
            Field::Model => self.session.set_model_text(&value),
            Field::Dia => self.session.set_dia_text(&value),
            Field::Quantity => match parse_quantity(&value) {
                // Normalize to two decimals on commit; junk stays as typed
                // and is caught at submit time.
                Some(n) => self
                    .session
                    .set_quantity(&format_quantity(round_quantity(n))),
                None => self.session.set_quantity(&value),
            },
            Field::Pieces => self.session.set_piece_count(&value),
            Field::Note => self.session.set_note(&value),
            Field::NewEntry | Field::Location | Field::Submit => {}
        }
    }

    fn cancel_edit(&mut self) {
        self.editing = None;
        self.input.clear();
    }

    fn open_picker(&mut self, field: Field) {
        let sel = self.session.selection();
        let items: Vec<String> = match field {
            Field::Maker => options::maker_options(self.session.catalog()),
            Field::Model => options::model_options(self.session.catalog(), &sel.maker),
            Field::Dia => options::dia_options(self.session.catalog(), &sel.maker, &sel.model)
                .into_iter()
                .map(format_dia)
                .collect(),
            Field::Location => Location::ALL.iter().map(|l| l.label().to_string()).collect(),
            _ => return,
        };

        if items.is_empty() {
            self.message = Some(Message::info(match field {
                Field::Maker => "catalog has no makers (r to refresh, or use new entry)",
                Field::Model => "pick a maker first",
                Field::Dia => "pick a maker and a model first",
                _ => "nothing to pick",
            }));
            return;
        }

        let current = match field {
            Field::Location => sel
                .location
                .map(|l| l.label().to_string())
                .unwrap_or_default(),
            _ => self.field_value(field),
        };
        let mut state = ListState::default();
        state.select(Some(items.iter().position(|i| *i == current).unwrap_or(0)));

        self.picker = Some(Picker {
            field,
            items,
            state,
        });
    }

    fn apply_pick(&mut self) {
        let Some(picker) = self.picker.take() else {
            return;
        };
        let Some(i) = picker.state.selected() else {
            return;
        };
        let Some(value) = picker.items.get(i) else {
            return;
        };

        match picker.field {
            Field::Maker => self.session.pick_maker(value),
            Field::Model => self.session.pick_model(value),
            Field::Dia => self.session.pick_dia(value),
            Field::Location => {
                if let Some(loc) = Location::ALL.get(i) {
                    self.session.set_location(*loc);
                }
            }
            _ => {}
        }
    }

    fn toggle_new_mode(&mut self) {
        let on = !self.session.selection().new_mode;
        self.session.set_new_mode(on);
        self.message = Some(Message::info(if on {
            "new entry: type maker, model and diameter by hand"
        } else {
            "catalog entry: maker, model and diameter come from the catalog"
        }));
    }

    fn submit(&mut self) {
        // Affordance is disabled while a submission is in flight.
        if self.session.is_sending() {
            return;
        }
        match self.session.submit() {
            Ok(()) => {
                self.fetched_at = Some(OffsetDateTime::now_utc());
                self.message = Some(Message::success(format!(
                    "recorded ({} variants in catalog)",
                    self.session.catalog().len()
                )));
                self.field = 0;
            }
            Err(err) => self.message = Some(Message::error(err.to_string())),
        }
    }
}

fn load_client() -> Result<Option<EndpointClient>> {
    let store = ConfigStore::open_default()?;
    match store.endpoint()? {
        Some(endpoint) => Ok(Some(EndpointClient::new(endpoint)?)),
        None => Ok(None),
    }
}

fn run_loop(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| draw(f, app)).context("draw")?;
        if app.quit {
            return Ok(());
        }

        if event::poll(Duration::from_millis(50)).context("poll")? {
            match event::read().context("read event")? {
                Event::Key(k) if k.kind == KeyEventKind::Press => handle_key(app, k),
                _ => {}
            }
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.quit = true;
        return;
    }

    if app.picker.is_some() {
        handle_picker_key(app, key);
        return;
    }
    if app.editing.is_some() {
        handle_edit_key(app, key);
        return;
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.quit = true,
        KeyCode::Char('r') => app.refresh_catalog(),
        KeyCode::Char('n') => app.toggle_new_mode(),
        KeyCode::Up | KeyCode::BackTab => app.move_up(),
        KeyCode::Down | KeyCode::Tab => app.move_down(),
        KeyCode::Enter => app.activate(),
        _ => {}
    }
}

fn handle_edit_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.cancel_edit(),
        KeyCode::Enter => app.commit_edit(),
        KeyCode::Left => app.input.move_left(),
        KeyCode::Right => app.input.move_right(),
        KeyCode::Backspace => app.input.backspace(),
        KeyCode::Delete => app.input.delete(),
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => app.input.clear(),
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.input.insert_char(c);
        }
        _ => {}
    }
}

fn handle_picker_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.picker = None;
        }
        KeyCode::Enter => app.apply_pick(),
        KeyCode::Up => {
            if let Some(picker) = app.picker.as_mut() {
                let i = picker.state.selected().unwrap_or(0);
                picker.state.select(Some(i.saturating_sub(1)));
            }
        }
        KeyCode::Down => {
            if let Some(picker) = app.picker.as_mut() {
                let i = picker.state.selected().unwrap_or(0);
                picker
                    .state
                    .select(Some((i + 1).min(picker.items.len().saturating_sub(1))));
            }
        }
        _ => {}
    }
}

fn draw(frame: &mut ratatui::Frame, app: &mut App) {
    let area = frame.area();
    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(Field::ORDER.len() as u16 + 2),
            Constraint::Length(2),
        ])
        .split(area);

    render_header(frame, parts[0], app);
    render_form(frame, parts[1], app);
    render_footer(frame, parts[2], app);

    if app.picker.is_some() {
        render_picker(frame, area, app);
    }
}

fn render_header(frame: &mut ratatui::Frame, area: Rect, app: &App) {
    let endpoint = app.endpoint_label.as_deref().unwrap_or("(not configured)");
    let catalog = if app.session.catalog().is_empty() {
        "catalog: empty".to_string()
    } else {
        match app.fetched_at {
            Some(ts) => format!(
                "catalog: {} variants (fetched {})",
                app.session.catalog().len(),
                fmt_ts(ts)
            ),
            None => format!("catalog: {} variants", app.session.catalog().len()),
        }
    };

    let lines = vec![
        Line::from(Span::styled(
            "tally · stock movement entry",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(vec![
            Span::styled("endpoint: ", Style::default().fg(Color::DarkGray)),
            Span::raw(endpoint.to_string()),
            Span::raw("   "),
            Span::styled(catalog, Style::default().fg(Color::DarkGray)),
        ]),
    ];
    frame.render_widget(Paragraph::new(lines), area);
}

fn render_form(frame: &mut ratatui::Frame, area: Rect, app: &App) {
    let mut rows = Vec::with_capacity(Field::ORDER.len());
    for field in Field::ORDER {
        let label = Span::styled(
            format!("{:<10}", field.label()),
            Style::default().fg(Color::DarkGray),
        );

        let mut spans = vec![label];
        if app.editing == Some(field) {
            spans.extend(editing_spans(&app.input));
        } else {
            spans.extend(value_spans(app, field));
        }
        rows.push(ListItem::new(Line::from(spans)));
    }

    let mut state = ListState::default();
    state.select(Some(app.field.min(Field::ORDER.len() - 1)));

    let list = List::new(rows)
        .block(Block::default().borders(Borders::TOP))
        .highlight_style(Style::default().bg(Color::DarkGray));
    frame.render_stateful_widget(list, area, &mut state);
}

fn value_spans(app: &App, field: Field) -> Vec<Span<'static>> {
    let sel = app.session.selection();
    let dim = Style::default().fg(Color::DarkGray);

    match field {
        Field::NewEntry => {
            let mark = if sel.new_mode { "[x]" } else { "[ ]" };
            vec![
                Span::raw(format!("{} ", mark)),
                Span::styled("register a variant missing from the catalog", dim),
            ]
        }
        Field::Location => match sel.location {
            Some(loc) => vec![Span::raw(loc.label().to_string())],
            None => vec![Span::styled("(pick)", dim)],
        },
        Field::Submit => {
            if app.session.is_sending() {
                vec![Span::styled("sending...", dim)]
            } else {
                vec![Span::styled(
                    "submit",
                    Style::default().add_modifier(Modifier::BOLD),
                )]
            }
        }
        Field::Maker | Field::Model | Field::Dia => {
            let value = app.field_value(field);
            if value.is_empty() {
                let hint = if sel.new_mode { "(type)" } else { "(pick)" };
                vec![Span::styled(hint.to_string(), dim)]
            } else {
                vec![Span::raw(value)]
            }
        }
        _ => vec![Span::raw(app.field_value(field))],
    }
}

fn editing_spans(input: &Input) -> Vec<Span<'static>> {
    let (left, right) = input.buf.split_at(input.cursor);
    let mut spans = vec![Span::raw(left.to_string())];
    let mut chars = right.chars();
    match chars.next() {
        Some(c) => {
            spans.push(Span::styled(
                c.to_string(),
                Style::default().add_modifier(Modifier::REVERSED),
            ));
            spans.push(Span::raw(chars.as_str().to_string()));
        }
        None => spans.push(Span::styled(
            " ",
            Style::default().add_modifier(Modifier::REVERSED),
        )),
    }
    spans
}

fn render_footer(frame: &mut ratatui::Frame, area: Rect, app: &App) {
    let message = match &app.message {
        Some(m) => {
            let style = match m.kind {
                MessageKind::Info => Style::default().fg(Color::Gray),
                MessageKind::Success => Style::default().fg(Color::Green),
                MessageKind::Error => Style::default().fg(Color::Red),
            };
            Line::from(Span::styled(m.text.clone(), style))
        }
        None => Line::from(""),
    };

    let hints = if app.picker.is_some() {
        "up/down pick · enter choose · esc close"
    } else if app.editing.is_some() {
        "enter commit · esc cancel"
    } else {
        "up/down move · enter edit/pick · n new entry · r refresh · q quit"
    };

    let lines = vec![
        message,
        Line::from(Span::styled(hints, Style::default().fg(Color::DarkGray))),
    ];
    frame.render_widget(Paragraph::new(lines), area);
}

fn render_picker(frame: &mut ratatui::Frame, area: Rect, app: &mut App) {
    let Some(picker) = app.picker.as_mut() else {
        return;
    };

    let w = area.width.min(40);
    let h = area.height.min(picker.items.len() as u16 + 2).min(12);
    let rect = Rect {
        x: area.x + (area.width.saturating_sub(w)) / 2,
        y: area.y + (area.height.saturating_sub(h)) / 2,
        width: w,
        height: h,
    };

    let rows: Vec<ListItem> = picker
        .items
        .iter()
        .map(|i| ListItem::new(i.clone()))
        .collect();
    let list = List::new(rows)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(picker.field.label()),
        )
        .highlight_style(Style::default().bg(Color::DarkGray));

    frame.render_widget(Clear, rect);
    frame.render_stateful_widget(list, rect, &mut picker.state);
}

static TS_FMT: OnceLock<Vec<FormatItem<'static>>> = OnceLock::new();

fn ts_fmt() -> &'static [FormatItem<'static>] {
    TS_FMT.get_or_init(|| {
        time::format_description::parse("[hour]:[minute]:[second]").expect("static ts format")
    })
}

fn fmt_ts(ts: OffsetDateTime) -> String {
    ts.format(ts_fmt()).unwrap_or_else(|_| "-".to_string())
}
