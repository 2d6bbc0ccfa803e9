use std::io;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Terminal;

use records_core::{
    BoxRecord, Catalog, DepartmentId, FolderRecord, RecordsAction, SelectionKey, UserAction,
    WorkflowState,
};

use crate::session::Session;

struct TuiGuard;

impl Drop for TuiGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, crossterm::cursor::Show);
    }
}

pub fn run(mut session: Session) -> Result<(), Box<dyn std::error::Error>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, crossterm::cursor::Hide)?;
    let _guard = TuiGuard;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    run_app(&mut terminal, &mut session).map_err(|e| e.into())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pane {
    Departments,
    Boxes,
    Folders,
    Selection,
}

impl Pane {
    const ORDER: [Pane; 4] = [
        Pane::Departments,
        Pane::Boxes,
        Pane::Folders,
        Pane::Selection,
    ];

    fn title(self) -> &'static str {
        match self {
            Self::Departments => "Departments",
            Self::Boxes => "Boxes",
            Self::Folders => "Folders",
            Self::Selection => "Request",
        }
    }

    fn index(self) -> usize {
        Self::ORDER
            .iter()
            .position(|pane| *pane == self)
            .unwrap_or_default()
    }

    fn next(self) -> Self {
        Self::ORDER[(self.index() + 1) % Self::ORDER.len()]
    }

    fn prev(self) -> Self {
        Self::ORDER[(self.index() + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DraftField {
    Name,
    Description,
}

/// Cursor and focus state that never reaches the core.
struct ViewState {
    focus: Pane,
    cursors: [usize; 4],
    draft_field: DraftField,
}

impl ViewState {
    fn new() -> Self {
        Self {
            focus: Pane::Departments,
            cursors: [0; 4],
            draft_field: DraftField::Name,
        }
    }

    fn cursor(&self, pane: Pane) -> usize {
        self.cursors[pane.index()]
    }

    fn move_cursor(&mut self, delta: isize, len: usize) {
        let slot = &mut self.cursors[self.focus.index()];
        if len == 0 {
            *slot = 0;
            return;
        }
        let current = (*slot).min(len - 1) as isize;
        *slot = (current + delta).clamp(0, len as isize - 1) as usize;
    }
}

/// The rows each pane currently shows, derived from core state.
struct PaneRows<'a> {
    departments: Vec<DepartmentId>,
    boxes: Vec<&'a BoxRecord>,
    folders: Vec<&'a FolderRecord>,
    selection: Vec<SelectionKey>,
}

impl<'a> PaneRows<'a> {
    fn collect(session: &'a Session) -> Self {
        let view = session.catalog().view();
        let state = session.state();
        let navigation = state.navigation();
        Self {
            departments: state.department_choices(&view),
            boxes: navigation
                .selected_department
                .map(|department| view.boxes_in_department(department).collect())
                .unwrap_or_default(),
            folders: view.folders_in_box(navigation.selected_box).collect(),
            selection: state.selection().keys().collect(),
        }
    }

    fn len(&self, pane: Pane) -> usize {
        match pane {
            Pane::Departments => self.departments.len(),
            Pane::Boxes => self.boxes.len(),
            Pane::Folders => self.folders.len(),
            Pane::Selection => self.selection.len(),
        }
    }
}

#[derive(Clone, Copy)]
struct UiPalette {
    accent: Color,
    success: Color,
    warning: Color,
    danger: Color,
    muted: Color,
    border: Color,
    selected_bg: Color,
}

const PALETTE: UiPalette = UiPalette {
    accent: Color::Cyan,
    success: Color::Green,
    warning: Color::Yellow,
    danger: Color::Red,
    muted: Color::DarkGray,
    border: Color::Gray,
    selected_bg: Color::Rgb(40, 44, 52),
};

enum KeyHandlerResult {
    Continue(Option<UserAction>),
    Exit,
}

fn handle_browse_keys(
    key: event::KeyEvent,
    session: &Session,
    view: &mut ViewState,
) -> KeyHandlerResult {
    let rows = PaneRows::collect(session);
    let cursor = view.cursor(view.focus);
    let action = match key.code {
        KeyCode::Char('q') => return KeyHandlerResult::Exit,
        KeyCode::Tab | KeyCode::Right => {
            view.focus = view.focus.next();
            None
        }
        KeyCode::BackTab | KeyCode::Left => {
            view.focus = view.focus.prev();
            None
        }
        KeyCode::Up | KeyCode::Char('k') => {
            view.move_cursor(-1, rows.len(view.focus));
            None
        }
        KeyCode::Down | KeyCode::Char('j') => {
            view.move_cursor(1, rows.len(view.focus));
            None
        }
        KeyCode::Enter => match view.focus {
            Pane::Departments => rows
                .departments
                .get(cursor)
                .map(|department| UserAction::SelectDepartment(*department)),
            Pane::Boxes => rows
                .boxes
                .get(cursor)
                .map(|record| UserAction::OpenBox(record.box_id)),
            Pane::Folders | Pane::Selection => None,
        },
        KeyCode::Char(' ') => toggle_under_cursor(session, &rows, view.focus, cursor),
        KeyCode::Backspace | KeyCode::Esc => {
            if session.state().error().is_some() {
                Some(UserAction::DismissError)
            } else {
                Some(UserAction::CloseBox)
            }
        }
        KeyCode::Char('n') => Some(UserAction::OpenFolderCreation),
        KeyCode::Char('s') => Some(UserAction::OpenSubmitConfirmation),
        KeyCode::Char('c') => Some(UserAction::ClearSelection),
        KeyCode::Char('x') => Some(UserAction::DismissError),
        _ => None,
    };
    KeyHandlerResult::Continue(action)
}

fn toggle_under_cursor(
    session: &Session,
    rows: &PaneRows<'_>,
    focus: Pane,
    cursor: usize,
) -> Option<UserAction> {
    let selection = session.state().selection();
    let key = match focus {
        Pane::Boxes => SelectionKey::Box(rows.boxes.get(cursor)?.box_id),
        Pane::Folders => SelectionKey::Folder(rows.folders.get(cursor)?.folder_id),
        Pane::Selection => return rows.selection.get(cursor).copied().map(UserAction::Deselect),
        Pane::Departments => return None,
    };
    if selection.contains(&key) {
        return Some(UserAction::Deselect(key));
    }
    Some(match key {
        SelectionKey::Box(box_id) => UserAction::SelectBox(box_id),
        SelectionKey::Folder(folder_id) => UserAction::SelectFolder(folder_id),
    })
}

fn handle_folder_keys(
    key: event::KeyEvent,
    session: &Session,
    view: &mut ViewState,
) -> KeyHandlerResult {
    let draft = session.state().folder_draft();
    let edit = |field: DraftField, text: String| match field {
        DraftField::Name => UserAction::SetFolderName(text),
        DraftField::Description => UserAction::SetFolderDescription(text),
    };
    let current = match view.draft_field {
        DraftField::Name => draft.name.clone(),
        DraftField::Description => draft.description.clone(),
    };
    let action = match key.code {
        KeyCode::Esc => {
            view.draft_field = DraftField::Name;
            Some(UserAction::CloseOverlay)
        }
        KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
            view.draft_field = match view.draft_field {
                DraftField::Name => DraftField::Description,
                DraftField::Description => DraftField::Name,
            };
            None
        }
        KeyCode::Enter => Some(UserAction::CreateFolder),
        KeyCode::Backspace => {
            let mut text = current;
            text.pop();
            Some(edit(view.draft_field, text))
        }
        KeyCode::Char(c) => {
            let mut text = current;
            text.push(c);
            Some(edit(view.draft_field, text))
        }
        _ => None,
    };
    KeyHandlerResult::Continue(action)
}

fn handle_submit_keys(key: event::KeyEvent, session: &Session) -> KeyHandlerResult {
    let instructions = session.state().delivery().instructions.clone();
    let action = match key.code {
        KeyCode::Esc => Some(UserAction::CloseOverlay),
        KeyCode::Enter => Some(UserAction::ConfirmSubmit),
        KeyCode::Left | KeyCode::Right => Some(UserAction::ToggleRequestType),
        KeyCode::Up | KeyCode::Down => Some(UserAction::TogglePriority),
        KeyCode::Backspace => {
            let mut text = instructions;
            text.pop();
            Some(UserAction::SetInstructions(text))
        }
        KeyCode::Char(c) => {
            let mut text = instructions;
            text.push(c);
            Some(UserAction::SetInstructions(text))
        }
        _ => None,
    };
    KeyHandlerResult::Continue(action)
}

fn handle_key_event(
    key: event::KeyEvent,
    session: &Session,
    view: &mut ViewState,
) -> KeyHandlerResult {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return KeyHandlerResult::Exit;
    }
    match session.state().workflow() {
        WorkflowState::Idle => handle_browse_keys(key, session, view),
        WorkflowState::CreatingFolder => handle_folder_keys(key, session, view),
        WorkflowState::ConfirmingSubmit => handle_submit_keys(key, session),
    }
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, session: &mut Session) -> io::Result<()> {
    let mut view = ViewState::new();
    let mut redraw = true;
    loop {
        if redraw {
            terminal.draw(|f| ui(f, session, &view))?;
            redraw = false;
        }

        if !event::poll(Duration::from_millis(250))? {
            continue;
        }
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                match handle_key_event(key, session, &mut view) {
                    KeyHandlerResult::Exit => return Ok(()),
                    KeyHandlerResult::Continue(Some(action)) => {
                        tracing::debug!(action = action.label(), "key dispatch");
                        session.dispatch(RecordsAction::User(action))?;
                        clamp_cursors(session, &mut view);
                    }
                    KeyHandlerResult::Continue(None) => {}
                }
                redraw = true;
            }
            Event::Resize(_, _) => redraw = true,
            _ => {}
        }
    }
}

fn clamp_cursors(session: &Session, view: &mut ViewState) {
    let rows = PaneRows::collect(session);
    for pane in Pane::ORDER {
        let len = rows.len(pane);
        let slot = &mut view.cursors[pane.index()];
        *slot = (*slot).min(len.saturating_sub(1));
    }
}

fn ui(f: &mut ratatui::Frame, session: &Session, view: &ViewState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(5),
            Constraint::Length(3),
        ])
        .split(f.area());

    render_header(f, chunks[0], session);
    render_panes(f, chunks[1], session, view);
    render_status(f, chunks[2], session);

    match session.state().workflow() {
        WorkflowState::Idle => {}
        WorkflowState::CreatingFolder => render_folder_overlay(f, session, view),
        WorkflowState::ConfirmingSubmit => render_submit_overlay(f, session),
    }
}

fn render_header(f: &mut ratatui::Frame, area: Rect, session: &Session) {
    let state = session.state();
    let name = if state.requester().name.is_empty() {
        "there"
    } else {
        state.requester().name.as_str()
    };
    let line = Line::from(vec![
        Span::styled(
            format!(" Hello, {name}"),
            Style::default()
                .fg(PALETTE.accent)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(
                "  {} selected | {} | submitter: {}",
                state.selection().len(),
                state.workflow().label(),
                session.submitter_label()
            ),
            Style::default().fg(PALETTE.muted),
        ),
    ]);
    f.render_widget(Paragraph::new(line), area);
}

fn render_panes(f: &mut ratatui::Frame, area: Rect, session: &Session, view: &ViewState) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(16),
            Constraint::Percentage(26),
            Constraint::Percentage(28),
            Constraint::Percentage(30),
        ])
        .split(area);

    let rows = PaneRows::collect(session);
    let state = session.state();
    let navigation = state.navigation();
    let selection = state.selection();
    let marker = |key: SelectionKey| if selection.contains(&key) { "[x] " } else { "[ ] " };

    let departments = rows
        .departments
        .iter()
        .map(|department| {
            let open = navigation.selected_department == Some(*department);
            let style = if open {
                Style::default().fg(PALETTE.accent)
            } else {
                Style::default()
            };
            ListItem::new(Span::styled(format!("Department {department}"), style))
        })
        .collect::<Vec<_>>();
    let boxes = rows
        .boxes
        .iter()
        .map(|record| {
            let open = navigation.selected_box == Some(record.box_id);
            let style = if open {
                Style::default().fg(PALETTE.accent)
            } else {
                Style::default()
            };
            ListItem::new(Span::styled(
                format!(
                    "{}{} {}",
                    marker(SelectionKey::Box(record.box_id)),
                    record.box_id,
                    record.location
                ),
                style,
            ))
        })
        .collect::<Vec<_>>();
    let folders = rows
        .folders
        .iter()
        .map(|record| {
            ListItem::new(format!(
                "{}{} {}",
                marker(SelectionKey::Folder(record.folder_id)),
                record.folder_id,
                record.name
            ))
        })
        .collect::<Vec<_>>();
    let cart = selection
        .entries()
        .map(|entry| ListItem::new(entry.label()))
        .collect::<Vec<_>>();

    let panes = [
        (Pane::Departments, departments),
        (Pane::Boxes, boxes),
        (Pane::Folders, folders),
        (Pane::Selection, cart),
    ];
    for (column, (pane, items)) in columns.iter().zip(panes) {
        render_list(f, *column, pane, items, view);
    }
}

fn render_list(
    f: &mut ratatui::Frame,
    area: Rect,
    pane: Pane,
    items: Vec<ListItem<'static>>,
    view: &ViewState,
) {
    let focused = view.focus == pane;
    let border = if focused { PALETTE.accent } else { PALETTE.border };
    let empty = items.is_empty();
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border))
                .title(pane.title()),
        )
        .highlight_style(
            Style::default()
                .bg(PALETTE.selected_bg)
                .add_modifier(Modifier::BOLD),
        );
    let mut list_state = ListState::default();
    if focused && !empty {
        list_state.select(Some(view.cursor(pane)));
    }
    f.render_stateful_widget(list, area, &mut list_state);
}

fn render_status(f: &mut ratatui::Frame, area: Rect, session: &Session) {
    let state = session.state();
    let line = if let Some(err) = state.error() {
        Line::from(Span::styled(
            format!("{} error: {}  (x to dismiss)", err.kind.label(), err.message),
            Style::default().fg(PALETTE.danger),
        ))
    } else if let Some(last) = state.last_batch() {
        Line::from(Span::styled(
            format!(
                "request {} submitted with {} item(s){}",
                last.batch.batch_id,
                last.batch.records.len(),
                last.reference
                    .as_deref()
                    .map(|reference| format!(" as {reference}"))
                    .unwrap_or_default()
            ),
            Style::default().fg(PALETTE.success),
        ))
    } else {
        Line::from(Span::styled(
            "tab move | enter open | space select | n new folder | s submit | c clear | q quit",
            Style::default().fg(PALETTE.muted),
        ))
    };
    let paragraph = Paragraph::new(line)
        .block(Block::default().borders(Borders::TOP))
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, area);
}

fn render_folder_overlay(f: &mut ratatui::Frame, session: &Session, view: &ViewState) {
    let area = centered_rect(60, 40, f.area());
    f.render_widget(Clear, area);
    let state = session.state();
    let draft = state.folder_draft();
    let box_label = state
        .navigation()
        .selected_box
        .map(|box_id| box_id.to_string())
        .unwrap_or_default();
    let field = |label: &str, value: &str, active: bool| {
        let style = if active {
            Style::default().fg(PALETTE.accent)
        } else {
            Style::default()
        };
        Line::from(vec![
            Span::styled(format!("{label:>12}: "), style),
            Span::raw(value.to_string()),
            Span::styled(if active { "_" } else { "" }, style),
        ])
    };
    let mut lines = vec![
        Line::from(format!("New folder in box {box_label}")),
        Line::from(""),
        field("Name", &draft.name, view.draft_field == DraftField::Name),
        field(
            "Description",
            &draft.description,
            view.draft_field == DraftField::Description,
        ),
        Line::from(""),
    ];
    if let Some(err) = state.error() {
        lines.push(Line::from(Span::styled(
            err.message.to_string(),
            Style::default().fg(PALETTE.danger),
        )));
    }
    lines.push(Line::from(Span::styled(
        "tab switch field | enter create | esc cancel",
        Style::default().fg(PALETTE.muted),
    )));
    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Create folder")
                .border_style(Style::default().fg(PALETTE.accent)),
        )
        .wrap(Wrap { trim: false });
    f.render_widget(paragraph, area);
}

fn render_submit_overlay(f: &mut ratatui::Frame, session: &Session) {
    let area = centered_rect(60, 50, f.area());
    f.render_widget(Clear, area);
    let state = session.state();
    let delivery = state.delivery();
    let mut lines = vec![
        Line::from(format!(
            "Submit {} item(s) for delivery",
            state.selection().len()
        )),
        Line::from(""),
        Line::from(format!("Request type: < {} >", delivery.request_type.label())),
        Line::from(format!("    Priority: ^ {} v", delivery.priority.label())),
        Line::from(format!("Instructions: {}_", delivery.instructions)),
        Line::from(""),
    ];
    if let Some(batch) = state.in_flight() {
        lines.push(Line::from(Span::styled(
            format!("submitting request {}...", batch.batch_id),
            Style::default().fg(PALETTE.warning),
        )));
    }
    if let Some(err) = state.error() {
        lines.push(Line::from(Span::styled(
            err.message.to_string(),
            Style::default().fg(PALETTE.danger),
        )));
    }
    lines.push(Line::from(Span::styled(
        "left/right type | up/down priority | enter submit | esc cancel",
        Style::default().fg(PALETTE.muted),
    )));
    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Left)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Confirm request")
                .border_style(Style::default().fg(PALETTE.accent)),
        )
        .wrap(Wrap { trim: false });
    f.render_widget(paragraph, area);
}

fn centered_rect(
    percent_x: u16,
    percent_y: u16,
    r: ratatui::layout::Rect,
) -> ratatui::layout::Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
