//! ratatui-based interactive interface.
//!
//! Two screens: a login form (only when the backend requires a token) and the
//! main screen with three feature tabs, a bounded-choice form per tab, and a
//! scrollable result pane. Each submission is one blocking backend call; a
//! busy line is drawn before the call starts.

pub mod widgets;

use std::cell::Cell;
use std::ops::RangeInclusive;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use miette::IntoDiagnostic;

use crate::catalog::{Author, Language};
use crate::client::{AuthPolicy, TafsirClient, Transport};
use crate::config::TOP_K_RANGE;
use crate::error::ViewResult;
use crate::reference::ReferenceData;
use crate::render::Block;
use crate::session::Session;
use crate::view::{Submission, ViewController, ViewMode};

/// Shown in the result pane whenever nothing else is.
pub const DISCLAIMER: &str = "Disclaimer: Translations may contain errors or omissions. \
    Reflections are generated by AI and may not represent scholarly or authoritative \
    interpretations. If you notice any inaccuracies or potentially misleading content, \
    please email idrak.dareshani@basirah-ai.com with a brief description or a screenshot.";

const LOGIN_FAILED: &str = "Login failed. Please check your credentials.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Login,
    Main,
}

/// An editable row of a form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Surah,
    Ayah,
    FromAyah,
    ToAyah,
    Author,
    Language,
    Query,
    AuthorFilter,
    SurahFilter,
    TopK,
}

impl Field {
    pub fn label(self) -> &'static str {
        match self {
            Field::Surah => "Surah",
            Field::Ayah => "Ayah",
            Field::FromAyah => "From Ayah",
            Field::ToAyah => "To Ayah",
            Field::Author => "Author",
            Field::Language => "Language",
            Field::Query => "Topic or phrase",
            Field::AuthorFilter => "Filter by Author",
            Field::SurahFilter => "Filter by Surah",
            Field::TopK => "Number of Results",
        }
    }
}

/// Form rows for each mode, top to bottom.
pub fn fields(mode: ViewMode) -> &'static [Field] {
    match mode {
        ViewMode::Tafsir => &[Field::Surah, Field::Ayah, Field::Author, Field::Language],
        ViewMode::Reflection => &[
            Field::Surah,
            Field::FromAyah,
            Field::ToAyah,
            Field::Author,
            Field::Language,
        ],
        ViewMode::TopicSearch => &[
            Field::Query,
            Field::AuthorFilter,
            Field::SurahFilter,
            Field::Language,
            Field::TopK,
        ],
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoginField {
    Username,
    Password,
}

/// Work the event loop must do after a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Submit,
    Login,
}

/// Next item in `items` after `current`, wrapping around.
fn cycle<T: Copy + PartialEq>(items: &[T], current: T, forward: bool) -> T {
    let Some(len) = (!items.is_empty()).then_some(items.len()) else {
        return current;
    };
    let next = match items.iter().position(|&i| i == current) {
        None => 0,
        Some(p) if forward => (p + 1) % len,
        Some(p) => (p + len - 1) % len,
    };
    items[next]
}

/// Step `current` within `range`, wrapping around.
fn step(range: RangeInclusive<u16>, current: u16, forward: bool) -> u16 {
    let (lo, hi) = (*range.start(), *range.end());
    if forward {
        if current >= hi { lo } else { current + 1 }
    } else if current <= lo {
        hi
    } else {
        current - 1
    }
}

/// TUI application state.
pub struct BasirahTui<T: Transport> {
    client: TafsirClient<T>,
    session: Session,
    reference: ReferenceData,
    controller: ViewController,
    screen: Screen,
    username: String,
    password: String,
    login_field: LoginField,
    login_message: Option<String>,
    focus: usize,
    output: Vec<Block>,
    busy: bool,
    scroll_offset: usize,
    result_width: Cell<u16>,
    should_quit: bool,
}

impl<T: Transport> BasirahTui<T> {
    pub fn new(
        client: TafsirClient<T>,
        session: Session,
        reference: ReferenceData,
        controller: ViewController,
    ) -> Self {
        let screen = if client.auth_policy() == AuthPolicy::Required && !session.is_authenticated()
        {
            Screen::Login
        } else {
            Screen::Main
        };
        Self {
            client,
            session,
            reference,
            controller,
            screen,
            username: String::new(),
            password: String::new(),
            login_field: LoginField::Username,
            login_message: None,
            focus: 0,
            output: Vec::new(),
            busy: false,
            scroll_offset: 0,
            result_width: Cell::new(80),
            should_quit: false,
        }
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn controller(&self) -> &ViewController {
        &self.controller
    }

    pub fn output(&self) -> &[Block] {
        &self.output
    }

    pub fn focused_field(&self) -> Field {
        let rows = fields(self.controller.mode());
        rows[self.focus.min(rows.len() - 1)]
    }

    /// Run the TUI event loop.
    pub fn run(&mut self) -> miette::Result<()> {
        let mut terminal = ratatui::init();
        let result = self.event_loop(&mut terminal);
        ratatui::restore();
        result
    }

    fn event_loop(&mut self, terminal: &mut ratatui::DefaultTerminal) -> miette::Result<()> {
        loop {
            terminal
                .draw(|frame| self.draw(frame))
                .into_diagnostic()?;

            if self.should_quit {
                return Ok(());
            }

            if !event::poll(Duration::from_millis(250)).into_diagnostic()? {
                continue;
            }
            let Event::Key(key) = event::read().into_diagnostic()? else {
                continue;
            };
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if let Some(action) = self.handle_key(key.code, key.modifiers) {
                // Draw the busy line before blocking on the network.
                self.busy = true;
                terminal
                    .draw(|frame| self.draw(frame))
                    .into_diagnostic()?;
                self.perform(action);
                self.busy = false;
            }
        }
    }

    fn draw(&self, frame: &mut ratatui::Frame) {
        match self.screen {
            Screen::Login => widgets::render_login(
                frame,
                &widgets::LoginView {
                    username: &self.username,
                    password_len: self.password.chars().count(),
                    password_focused: self.login_field == LoginField::Password,
                    message: self.login_message.as_deref(),
                    busy: self.busy,
                    base_url: self.client.base_url(),
                },
            ),
            Screen::Main => {
                let mode = self.controller.mode();
                let rows: Vec<(Field, String)> = fields(mode)
                    .iter()
                    .map(|&f| (f, self.field_value(f)))
                    .collect();
                let disclaimer = [Block::notice(DISCLAIMER)];
                let output: &[Block] = if self.output.is_empty() {
                    &disclaimer
                } else {
                    &self.output
                };
                let width = widgets::render_main(
                    frame,
                    &widgets::MainView {
                        mode,
                        rows: &rows,
                        focus: self.focus,
                        output,
                        scroll_offset: self.scroll_offset,
                        busy: self.busy,
                        authenticated: self.session.is_authenticated(),
                        base_url: self.client.base_url(),
                    },
                );
                self.result_width.set(width);
            }
        }
    }

    /// Display string of a form row.
    pub fn field_value(&self, field: Field) -> String {
        let c = &self.controller;
        let r = &self.reference;
        match field {
            Field::Surah => match c.mode() {
                ViewMode::Reflection => r.surah_label(c.reflection.surah()),
                _ => r.surah_label(c.tafsir.surah()),
            },
            Field::Ayah => c.tafsir.ayah().to_string(),
            Field::FromAyah => c.reflection.from_ayah().to_string(),
            Field::ToAyah => c.reflection.to_ayah().to_string(),
            Field::Author => match c.mode() {
                ViewMode::Reflection => c.reflection.author.label().to_string(),
                _ => c.tafsir.author.label().to_string(),
            },
            Field::Language => c.language().label().to_string(),
            Field::Query => c.topic.query.clone(),
            Field::AuthorFilter => c
                .topic
                .author
                .map_or_else(|| "All Authors".to_string(), |a| a.label().to_string()),
            Field::SurahFilter => c
                .topic
                .surah()
                .map_or_else(|| "All Surahs".to_string(), |s| r.surah_label(s)),
            Field::TopK => c.topic.top_k().to_string(),
        }
    }

    /// Apply one key press. Returns work that needs a network call.
    pub fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) -> Option<Action> {
        if code == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return None;
        }
        match self.screen {
            Screen::Login => self.handle_login_key(code),
            Screen::Main => self.handle_main_key(code, modifiers),
        }
    }

    fn handle_login_key(&mut self, code: KeyCode) -> Option<Action> {
        let buffer = match self.login_field {
            LoginField::Username => &mut self.username,
            LoginField::Password => &mut self.password,
        };
        match code {
            KeyCode::Enter => return Some(Action::Login),
            KeyCode::Tab | KeyCode::Up | KeyCode::Down => {
                self.login_field = match self.login_field {
                    LoginField::Username => LoginField::Password,
                    LoginField::Password => LoginField::Username,
                };
            }
            KeyCode::Char(c) => buffer.push(c),
            KeyCode::Backspace => {
                buffer.pop();
            }
            KeyCode::Esc => self.should_quit = true,
            _ => {}
        }
        None
    }

    fn handle_main_key(&mut self, code: KeyCode, modifiers: KeyModifiers) -> Option<Action> {
        if code == KeyCode::Char('l') && modifiers.contains(KeyModifiers::CONTROL) {
            self.logout();
            return None;
        }
        match code {
            KeyCode::Enter => return Some(Action::Submit),
            KeyCode::F(1) => self.set_mode(ViewMode::Tafsir),
            KeyCode::F(2) => self.set_mode(ViewMode::Reflection),
            KeyCode::F(3) => self.set_mode(ViewMode::TopicSearch),
            KeyCode::Tab => self.set_mode(self.controller.mode().next()),
            KeyCode::Up => self.focus = self.focus.saturating_sub(1),
            KeyCode::Down => {
                self.focus = (self.focus + 1).min(fields(self.controller.mode()).len() - 1);
            }
            KeyCode::Left | KeyCode::Right => {
                let forward = code == KeyCode::Right;
                if let Err(e) = self.adjust(self.focused_field(), forward) {
                    self.output = vec![Block::error(e.to_string())];
                }
            }
            KeyCode::Char(c) if self.focused_field() == Field::Query => {
                self.controller.topic.query.push(c);
            }
            KeyCode::Backspace if self.focused_field() == Field::Query => {
                self.controller.topic.query.pop();
            }
            KeyCode::PageUp => self.scroll_offset = self.scroll_offset.saturating_sub(10),
            KeyCode::PageDown => {
                let lines = widgets::blocks_to_lines(&self.output);
                let rows = widgets::wrapped_rows(&lines, self.result_width.get());
                self.scroll_offset = (self.scroll_offset + 10).min(rows.saturating_sub(1));
            }
            KeyCode::Esc => self.should_quit = true,
            _ => {}
        }
        None
    }

    fn set_mode(&mut self, mode: ViewMode) {
        self.controller.set_mode(mode);
        self.focus = 0;
    }

    /// Move a bounded-choice field to its previous or next value.
    fn adjust(&mut self, field: Field, forward: bool) -> ViewResult<()> {
        let surahs: Vec<u16> = self
            .reference
            .surahs()
            .entries()
            .iter()
            .map(|e| e.surah_number)
            .collect();
        let reference = &self.reference;
        let c = &mut self.controller;
        let mode = c.mode();

        match field {
            Field::Surah if mode == ViewMode::Reflection => {
                let next = cycle(&surahs, c.reflection.surah(), forward);
                c.reflection.select_surah(reference, next)
            }
            Field::Surah => {
                let next = cycle(&surahs, c.tafsir.surah(), forward);
                c.tafsir.select_surah(reference, next)
            }
            Field::Ayah => {
                let next = step(c.tafsir.ayah_choices(reference), c.tafsir.ayah(), forward);
                c.tafsir.select_ayah(reference, next)
            }
            Field::FromAyah => {
                let r = &mut c.reflection;
                let next = step(r.from_choices(reference), r.from_ayah(), forward);
                r.select_from(reference, next)
            }
            Field::ToAyah => {
                let r = &mut c.reflection;
                let next = step(r.to_choices(reference), r.to_ayah(), forward);
                r.select_to(reference, next)
            }
            Field::Author if mode == ViewMode::Reflection => {
                c.reflection.author = cycle(&Author::ALL, c.reflection.author, forward);
                Ok(())
            }
            Field::Author => {
                c.tafsir.author = cycle(&Author::ALL, c.tafsir.author, forward);
                Ok(())
            }
            Field::Language => {
                let lang = match mode {
                    ViewMode::Tafsir => &mut c.tafsir.language,
                    ViewMode::Reflection => &mut c.reflection.language,
                    ViewMode::TopicSearch => &mut c.topic.language,
                };
                *lang = cycle(&Language::ALL, *lang, forward);
                Ok(())
            }
            Field::AuthorFilter => {
                let choices: Vec<Option<Author>> = std::iter::once(None)
                    .chain(Author::ALL.into_iter().map(Some))
                    .collect();
                c.topic.author = cycle(&choices, c.topic.author, forward);
                Ok(())
            }
            Field::SurahFilter => {
                let choices: Vec<Option<u16>> = std::iter::once(None)
                    .chain(surahs.iter().copied().map(Some))
                    .collect();
                let next = cycle(&choices, c.topic.surah(), forward);
                c.topic.select_surah(reference, next)
            }
            Field::TopK => {
                let next = step(
                    u16::from(*TOP_K_RANGE.start())..=u16::from(*TOP_K_RANGE.end()),
                    u16::from(c.topic.top_k()),
                    forward,
                );
                c.topic.select_top_k(u8::try_from(next).unwrap_or(*TOP_K_RANGE.end()))
            }
            Field::Query => Ok(()),
        }
    }

    /// Execute the blocking part of an action.
    pub fn perform(&mut self, action: Action) {
        match action {
            Action::Login => {
                if self.session.login(&self.client, &self.username, &self.password) {
                    self.screen = Screen::Main;
                    self.login_message = None;
                    self.output = vec![Block::notice("Login successful!")];
                } else {
                    self.login_message = Some(LOGIN_FAILED.to_string());
                }
                self.password.clear();
            }
            Action::Submit => {
                match self
                    .controller
                    .submit(&self.client, &self.session, &self.reference)
                {
                    // An empty search leaves the previous output in place.
                    Submission::Skipped => {}
                    outcome => {
                        self.output = outcome.into_blocks();
                        self.scroll_offset = 0;
                    }
                }
            }
        }
    }

    fn logout(&mut self) {
        self.session.logout();
        self.output.clear();
        self.scroll_offset = 0;
        if self.client.auth_policy() == AuthPolicy::Required {
            self.screen = Screen::Login;
            self.login_field = LoginField::Username;
        }
    }
}

/// Launch the interactive interface.
pub fn launch<T: Transport>(
    client: TafsirClient<T>,
    session: Session,
    reference: ReferenceData,
    controller: ViewController,
) -> miette::Result<()> {
    let mut tui = BasirahTui::new(client, session, reference, controller);
    tui.run()
}
