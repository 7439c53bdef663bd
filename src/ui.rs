use crate::grid::{Cell, DAY_NAMES};
use crate::model::Note;
use crate::session::{Draft, Editor, Session};
use anyhow::Result;
use chrono::{Datelike, Duration as ChronoDuration, NaiveDate};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::{Alignment, Color, Modifier, Rect, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Terminal;
use std::io::{stdout, Stdout};
use std::time::Duration;

pub fn run(today: NaiveDate) -> Result<()> {
    let mut terminal = setup_terminal()?;
    let mut app = App::new(today);
    let result = app.event_loop(&mut terminal);
    teardown_terminal(&mut terminal)?;
    result
}

struct App {
    session: Session,
    today: NaiveDate,
    note_idx: usize,
    status: String,
    mode: Mode,
}

enum Mode {
    Normal,
    Form(NoteForm),
    ConfirmDelete { note_id: String },
}

struct NoteForm {
    title: FieldValue,
    date: FieldValue,
    field: FormField,
}

#[derive(Copy, Clone, PartialEq, Eq)]
enum FormField {
    Title,
    Date,
}

#[derive(Clone)]
struct FieldValue {
    value: String,
    cursor: usize,
}

impl FieldValue {
    fn new(value: &str) -> Self {
        FieldValue {
            value: value.to_string(),
            cursor: value.len(),
        }
    }

    fn move_left(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.cursor = prev_grapheme(self.cursor, &self.value);
    }

    fn move_right(&mut self) {
        if self.cursor >= self.value.len() {
            return;
        }
        self.cursor = next_grapheme(self.cursor, &self.value);
    }

    fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let prev = prev_grapheme(self.cursor, &self.value);
        self.value.drain(prev..self.cursor);
        self.cursor = prev;
    }

    fn insert_char(&mut self, ch: char) {
        self.value.insert(self.cursor, ch);
        self.cursor += ch.len_utf8();
    }

    fn with_caret(&self) -> String {
        let mut text = self.value.clone();
        text.insert_str(self.cursor, "▌");
        text
    }
}

impl NoteForm {
    fn from_draft(draft: &Draft) -> Self {
        NoteForm {
            title: FieldValue::new(&draft.title),
            date: FieldValue::new(&draft.date),
            field: FormField::Title,
        }
    }

    fn toggle_field(&mut self) {
        self.field = match self.field {
            FormField::Title => FormField::Date,
            FormField::Date => FormField::Title,
        };
    }

    fn active_field_mut(&mut self) -> &mut FieldValue {
        match self.field {
            FormField::Title => &mut self.title,
            FormField::Date => &mut self.date,
        }
    }
}

impl App {
    fn new(today: NaiveDate) -> Self {
        App {
            session: Session::new(today),
            today,
            note_idx: 0,
            status: "Press n to add a note on the selected day".into(),
            mode: Mode::Normal,
        }
    }

    fn event_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        loop {
            terminal.draw(|f| self.draw(f))?;
            if event::poll(Duration::from_millis(200))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key)? {
                        break;
                    }
                }
            }
        }
        Ok(())
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<bool> {
        match self.mode {
            Mode::Normal => self.handle_normal_key(key),
            Mode::Form(_) => self.handle_form_key(key),
            Mode::ConfirmDelete { .. } => self.handle_confirm_key(key),
        }
    }

    fn handle_normal_key(&mut self, key: KeyEvent) -> Result<bool> {
        match key.code {
            KeyCode::Char('q') => return Ok(true),
            KeyCode::Left | KeyCode::Char('h') => self.shift_selection(-1),
            KeyCode::Right | KeyCode::Char('l') => self.shift_selection(1),
            KeyCode::Up | KeyCode::Char('k') => self.shift_selection(-7),
            KeyCode::Down | KeyCode::Char('j') => self.shift_selection(7),
            KeyCode::Char('[') | KeyCode::Char('<') => {
                self.session.change_month(-1);
                self.status = format!("Showing {}", self.session.month_label());
            }
            KeyCode::Char(']') | KeyCode::Char('>') => {
                self.session.change_month(1);
                self.status = format!("Showing {}", self.session.month_label());
            }
            KeyCode::Char('t') => {
                self.session.select_date(self.today);
                self.note_idx = 0;
                self.status = "Jumped to today".into();
            }
            KeyCode::Tab => self.next_note(),
            KeyCode::BackTab => self.prev_note(),
            KeyCode::Char('n') => {
                self.session.open_new();
                self.open_form();
                self.status = "New note (Tab switch field, Enter save, Esc cancel)".into();
            }
            KeyCode::Char('e') => {
                let id = self.selected_note().map(|n| n.id.clone());
                match id {
                    Some(id) => {
                        self.session.open_existing(&id);
                        self.open_form();
                        self.status = format!("Editing {}", id);
                    }
                    None => self.status = "No note selected to edit".into(),
                }
            }
            KeyCode::Char('d') => {
                let id = self.selected_note().map(|n| n.id.clone());
                match id {
                    Some(id) => {
                        self.status = format!("Delete {}? (y to confirm, n/Esc to cancel)", id);
                        self.mode = Mode::ConfirmDelete { note_id: id };
                    }
                    None => self.status = "No note selected to delete".into(),
                }
            }
            _ => {}
        }
        Ok(false)
    }

    fn handle_form_key(&mut self, key: KeyEvent) -> Result<bool> {
        let mut mode = std::mem::replace(&mut self.mode, Mode::Normal);
        let mut close_form = false;
        if let Mode::Form(form) = &mut mode {
            match key.code {
                KeyCode::Esc => {
                    self.session.cancel_edit();
                    self.status = "Canceled".into();
                    close_form = true;
                }
                KeyCode::Tab | KeyCode::BackTab => form.toggle_field(),
                KeyCode::Enter => {
                    let date = form.date.value.clone();
                    self.session.save_edit();
                    self.status = format!("Saved note on {}", date);
                    self.ensure_note_bounds();
                    close_form = true;
                }
                KeyCode::Left => form.active_field_mut().move_left(),
                KeyCode::Right => form.active_field_mut().move_right(),
                KeyCode::Backspace => {
                    form.active_field_mut().backspace();
                    self.session.edit_title(&form.title.value);
                    self.session.edit_date(&form.date.value);
                }
                KeyCode::Char(c) => {
                    if !key
                        .modifiers
                        .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
                    {
                        form.active_field_mut().insert_char(c);
                        self.session.edit_title(&form.title.value);
                        self.session.edit_date(&form.date.value);
                    }
                }
                _ => {}
            }
        }
        self.mode = if close_form { Mode::Normal } else { mode };
        Ok(false)
    }

    fn handle_confirm_key(&mut self, key: KeyEvent) -> Result<bool> {
        let note_id = match &self.mode {
            Mode::ConfirmDelete { note_id } => note_id.clone(),
            _ => return Ok(false),
        };
        match key.code {
            KeyCode::Char('y') | KeyCode::Enter => {
                self.session.delete_note(&note_id);
                self.ensure_note_bounds();
                self.status = format!("Deleted {}", note_id);
                self.mode = Mode::Normal;
            }
            KeyCode::Char('n') | KeyCode::Esc => {
                self.status = "Delete canceled".into();
                self.mode = Mode::Normal;
            }
            _ => {}
        }
        Ok(false)
    }

    fn open_form(&mut self) {
        let draft = match self.session.editor() {
            Editor::Creating(draft) => draft.clone(),
            Editor::Editing { draft, .. } => draft.clone(),
            Editor::Closed => return,
        };
        self.mode = Mode::Form(NoteForm::from_draft(&draft));
    }

    fn shift_selection(&mut self, days: i64) {
        if let Some(next) = self
            .session
            .selected_date()
            .checked_add_signed(ChronoDuration::days(days))
        {
            self.session.select_date(next);
            self.note_idx = 0;
        }
    }

    fn selected_note(&self) -> Option<&Note> {
        let key = self.session.selected_key();
        let notes = self.session.notes().notes_for(&key);
        notes.get(self.note_idx)
    }

    fn next_note(&mut self) {
        let key = self.session.selected_key();
        let len = self.session.notes().notes_for(&key).len();
        if self.note_idx + 1 < len {
            self.note_idx += 1;
        }
    }

    fn prev_note(&mut self) {
        if self.note_idx > 0 {
            self.note_idx -= 1;
        }
    }

    fn ensure_note_bounds(&mut self) {
        let key = self.session.selected_key();
        let len = self.session.notes().notes_for(&key).len();
        self.note_idx = self.note_idx.min(len.saturating_sub(1));
    }

    fn draw(&mut self, f: &mut ratatui::Frame<'_>) {
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(8),
                Constraint::Length(4),
            ])
            .split(f.size());

        self.draw_header(f, layout[0]);

        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(62), Constraint::Percentage(38)])
            .split(layout[1]);
        self.draw_calendar(f, body[0]);
        self.draw_notes(f, body[1]);

        self.draw_footer(f, layout[2]);

        match &self.mode {
            Mode::Form(form) => {
                let title = match self.session.editor() {
                    Editor::Editing { .. } => "Edit Note",
                    _ => "New Note",
                };
                self.draw_form(f, title, form);
            }
            Mode::ConfirmDelete { note_id } => self.draw_confirm(f, note_id),
            Mode::Normal => {}
        }
    }

    fn draw_header(&self, f: &mut ratatui::Frame<'_>, area: Rect) {
        let title = Line::from(vec![
            Span::styled(
                "datebook ",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                self.session.month_label(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw("  •  "),
            Span::styled(
                format!("selected {}", self.session.selected_key()),
                Style::default().fg(Color::Green),
            ),
            Span::raw("  •  "),
            Span::styled(
                format!("{} note(s)", self.session.notes().len()),
                Style::default().fg(Color::Gray),
            ),
        ]);

        let block = Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(Color::DarkGray));
        let paragraph = Paragraph::new(title)
            .alignment(Alignment::Center)
            .block(block);
        f.render_widget(paragraph, area);
    }

    fn draw_calendar(&self, f: &mut ratatui::Frame<'_>, area: Rect) {
        let selected = self.session.selected_date();
        let mut lines = Vec::new();
        let header_spans: Vec<Span<'static>> = DAY_NAMES
            .iter()
            .map(|name| Span::styled(format!("{:^6} ", name), Style::default().fg(Color::Gray)))
            .collect();
        lines.push(Line::from(header_spans));

        for row in self.session.cells() {
            let mut spans = Vec::new();
            for cell in row {
                match cell {
                    Cell::Blank => spans.push(Span::raw("       ")),
                    Cell::Day(date) => {
                        let key = cell.key().unwrap_or_default();
                        let count = self.session.notes().notes_for(&key).len();
                        let text = if count > 0 {
                            format!("{:>2}({:>2})", date.day(), count)
                        } else {
                            format!("{:>2}    ", date.day())
                        };
                        let mut style = Style::default().fg(if count > 0 {
                            Color::LightYellow
                        } else {
                            Color::Gray
                        });
                        if date == selected {
                            style = style
                                .bg(Color::Cyan)
                                .fg(Color::Black)
                                .add_modifier(Modifier::BOLD);
                        } else if date == self.today {
                            style = style.add_modifier(Modifier::UNDERLINED);
                        }
                        spans.push(Span::styled(format!("{:>6}", text), style));
                        spans.push(Span::raw(" "));
                    }
                }
            }
            lines.push(Line::from(spans));
        }

        let block = Block::default()
            .title(Span::styled(
                self.session.month_label(),
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray));
        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(block);
        f.render_widget(paragraph, area);
    }

    fn draw_notes(&self, f: &mut ratatui::Frame<'_>, area: Rect) {
        let key = self.session.selected_key();
        let notes = self.session.notes().notes_for(&key);

        let mut state = ListState::default();
        if !notes.is_empty() {
            state.select(Some(self.note_idx.min(notes.len() - 1)));
        }

        let items = if notes.is_empty() {
            vec![ListItem::new("No notes on this day")]
        } else {
            notes.iter().map(note_item).collect()
        };

        let block = Block::default()
            .title(Span::styled(
                format!("Notes {} ({})", key, notes.len()),
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray));
        let list = List::new(items).block(block).highlight_style(
            Style::default()
                .bg(Color::LightCyan)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
        );
        f.render_stateful_widget(list, area, &mut state);
    }

    fn draw_footer(&self, f: &mut ratatui::Frame<'_>, area: Rect) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(2), Constraint::Length(2)])
            .split(area);

        let help_bar = Paragraph::new(self.footer_help_line())
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::TOP)
                    .border_style(Style::default().fg(Color::DarkGray)),
            );
        f.render_widget(help_bar, rows[0]);

        let bottom = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(rows[1]);

        let status = Paragraph::new(self.status.clone())
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::TOP)
                    .border_style(Style::default().fg(Color::DarkGray)),
            );
        f.render_widget(status, bottom[0]);

        let detail = Paragraph::new(self.detail_line())
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::TOP)
                    .border_style(Style::default().fg(Color::DarkGray))
                    .title("Selected"),
            );
        f.render_widget(detail, bottom[1]);
    }

    fn footer_help_line(&self) -> Line<'static> {
        Line::from(vec![
            Span::styled("←↑↓→ / h j k l", Style::default().fg(Color::LightCyan)),
            Span::raw(" day/week  "),
            Span::styled("[ ]", Style::default().fg(Color::LightCyan)),
            Span::raw(" month  "),
            Span::styled("Tab", Style::default().fg(Color::LightCyan)),
            Span::raw(" note  "),
            Span::styled("t", Style::default().fg(Color::LightGreen)),
            Span::raw(" today  "),
            Span::styled("n", Style::default().fg(Color::LightMagenta)),
            Span::raw(" new  "),
            Span::styled("e", Style::default().fg(Color::LightYellow)),
            Span::raw(" edit  "),
            Span::styled("d", Style::default().fg(Color::LightRed)),
            Span::raw(" delete  "),
            Span::styled("q", Style::default().fg(Color::LightRed)),
            Span::raw(" quit"),
        ])
    }

    fn detail_line(&self) -> Line<'static> {
        match self.selected_note() {
            Some(note) => Line::from(vec![
                Span::styled(
                    note.title.clone(),
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::raw("  "),
                Span::styled(note.date.clone(), Style::default().fg(Color::LightRed)),
                Span::raw("  "),
                Span::styled(
                    format!("[{}]", note.id),
                    Style::default().fg(Color::DarkGray),
                ),
            ]),
            None => Line::from("No note selected"),
        }
    }

    fn draw_form(&self, f: &mut ratatui::Frame<'_>, title: &str, form: &NoteForm) {
        let area = centered_rect(55, 35, f.size());
        let mut fields = Vec::new();
        fields.extend(field_lines(
            "Title",
            &form.title,
            form.field == FormField::Title,
        ));
        fields.extend(field_lines(
            "Date (YYYY-MM-DD)",
            &form.date,
            form.field == FormField::Date,
        ));
        fields.push(Line::from(Span::styled(
            "Enter to save • Esc to cancel • Tab to switch field",
            Style::default().fg(Color::Gray),
        )));
        let dialog = Paragraph::new(fields)
            .block(
                Block::default()
                    .title(Span::styled(
                        title.to_string(),
                        Style::default()
                            .fg(Color::Cyan)
                            .add_modifier(Modifier::BOLD),
                    ))
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Cyan)),
            )
            .wrap(Wrap { trim: true });

        f.render_widget(Clear, area);
        f.render_widget(dialog, area);
    }

    fn draw_confirm(&self, f: &mut ratatui::Frame<'_>, note_id: &str) {
        let area = centered_rect(50, 30, f.size());
        let title = self
            .session
            .notes()
            .find(note_id)
            .map(|n| n.title.clone())
            .unwrap_or_else(|| note_id.to_string());
        let body = vec![
            Line::from(Span::styled(
                format!("Delete \"{}\"?", title),
                Style::default()
                    .fg(Color::LightRed)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from("Press y to confirm, n or Esc to cancel"),
        ];
        let dialog = Paragraph::new(body).alignment(Alignment::Center).block(
            Block::default()
                .title(Span::styled(
                    "Confirm Delete",
                    Style::default()
                        .fg(Color::LightRed)
                        .add_modifier(Modifier::BOLD),
                ))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::LightRed)),
        );
        f.render_widget(Clear, area);
        f.render_widget(dialog, area);
    }
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn teardown_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Percentage((100 - percent_y) / 2),
                Constraint::Percentage(percent_y),
                Constraint::Percentage((100 - percent_y) / 2),
            ]
            .as_ref(),
        )
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints(
            [
                Constraint::Percentage((100 - percent_x) / 2),
                Constraint::Percentage(percent_x),
                Constraint::Percentage((100 - percent_x) / 2),
            ]
            .as_ref(),
        )
        .split(popup_layout[1])[1]
}

fn note_item(note: &Note) -> ListItem<'static> {
    let spans = vec![
        Span::styled(
            format!("[{}]", note.id),
            Style::default().fg(Color::DarkGray),
        ),
        Span::raw(" "),
        Span::styled(
            truncate_text(&note.title, 40),
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ),
    ];
    ListItem::new(Line::from(spans)).style(Style::default().fg(Color::Gray))
}

fn field_lines(label: &str, field: &FieldValue, active: bool) -> Vec<Line<'static>> {
    let label_style = Style::default()
        .fg(Color::Gray)
        .add_modifier(Modifier::BOLD | Modifier::DIM);
    let value_style = Style::default().fg(if active { Color::Cyan } else { Color::White });
    let text = if active {
        field.with_caret()
    } else {
        field.value.clone()
    };
    vec![Line::from(vec![
        Span::styled(format!("{}: ", label), label_style),
        Span::styled(text, value_style),
    ])]
}

fn truncate_text(text: &str, max: usize) -> String {
    if max == 0 {
        return String::new();
    }
    let mut out = String::new();
    for ch in text.chars() {
        if out.chars().count() >= max.saturating_sub(3) {
            out.push_str("...");
            break;
        }
        out.push(ch);
    }
    if out.chars().count() > max {
        out.truncate(max);
    }
    out
}

fn prev_grapheme(cursor: usize, text: &str) -> usize {
    if cursor == 0 {
        return 0;
    }
    let mut prev = 0;
    for (idx, _) in text.char_indices() {
        if idx >= cursor {
            break;
        }
        prev = idx;
    }
    prev
}

fn next_grapheme(cursor: usize, text: &str) -> usize {
    for (idx, ch) in text.char_indices() {
        if idx > cursor {
            return idx;
        }
        if idx == cursor {
            return cursor + ch.len_utf8();
        }
    }
    text.len()
}
