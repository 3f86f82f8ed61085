use anyhow::Result;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{
    collections::HashSet,
    io,
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::info;

use crate::catalog::{Catalog, Product};
use crate::conversation::{routine_prompt, Conversation, EMPTY_SELECTION_NOTICE};
use crate::filter::{self, Debouncer};
use crate::llm::{ChatClient, ChatError, RequestKind};
use crate::selection::{selection_key, SelectionSet};
use crate::tui::{
    chat::{ChatEvent, ChatHandler},
    message::UiMessage,
    ui::render_ui,
};

/// Which pane receives key presses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Products,
    Selected,
    Search,
    Chat,
}

/// Picker application state. Owned by the UI loop; nothing else mutates it.
pub struct PickerApp {
    catalog: Catalog,
    categories: Vec<String>,
    // 0 is "All", then one slot per category
    category_index: usize,

    search_input: String,
    search_debounce: Debouncer,
    applied_query: String,
    visible: Vec<Product>,
    product_cursor: usize,
    expanded: HashSet<String>,

    selection: SelectionSet,
    selected_cursor: usize,

    conversation: Conversation,
    transcript: Vec<UiMessage>,
    chat_input: String,
    chat: ChatHandler,
    chat_events: UnboundedReceiver<ChatEvent>,
    pending_requests: usize,

    focus: Focus,
    should_quit: bool,
}

impl PickerApp {
    pub fn new(catalog: Catalog, client: Arc<dyn ChatClient>) -> Self {
        let categories = catalog.categories();

        let mut transcript = Vec::new();
        transcript.push(UiMessage::system(format!(
            "{} products loaded. Pick a few and press g for a routine, or c to ask a question.",
            catalog.len()
        )));
        if !client.is_configured() {
            transcript.push(UiMessage::notice(ChatError::MissingApiKey.to_string()));
        }

        let (chat, chat_events) = ChatHandler::new(client);
        let mut app = Self {
            catalog,
            categories,
            category_index: 0,
            search_input: String::new(),
            search_debounce: Debouncer::default(),
            applied_query: String::new(),
            visible: Vec::new(),
            product_cursor: 0,
            expanded: HashSet::new(),
            selection: SelectionSet::new(),
            selected_cursor: 0,
            conversation: Conversation::new(),
            transcript,
            chat_input: String::new(),
            chat,
            chat_events,
            pending_requests: 0,
            focus: Focus::Products,
            should_quit: false,
        };
        app.refilter();
        app
    }

    pub fn visible_products(&self) -> &[Product] {
        &self.visible
    }

    pub fn product_cursor(&self) -> usize {
        self.product_cursor
    }

    pub fn is_expanded(&self, product: &Product) -> bool {
        self.expanded.contains(&selection_key(&product.name))
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    pub fn selected_cursor(&self) -> usize {
        self.selected_cursor
    }

    pub fn transcript(&self) -> &[UiMessage] {
        &self.transcript
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn search_input(&self) -> &str {
        &self.search_input
    }

    pub fn chat_input(&self) -> &str {
        &self.chat_input
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn pending_requests(&self) -> usize {
        self.pending_requests
    }

    pub fn model_name(&self) -> &str {
        self.chat.model_name()
    }

    /// Current category, empty for "All"
    pub fn category(&self) -> &str {
        match self.category_index {
            0 => "",
            i => self.categories.get(i - 1).map(String::as_str).unwrap_or(""),
        }
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Recompute the visible products from the current category and applied query
    fn refilter(&mut self) {
        self.visible = filter::apply(self.catalog.products(), self.category(), &self.applied_query)
            .into_iter()
            .cloned()
            .collect();
        self.product_cursor = self
            .product_cursor
            .min(self.visible.len().saturating_sub(1));
    }

    fn cycle_category(&mut self, forward: bool) {
        let slots = self.categories.len() + 1;
        self.category_index = if forward {
            (self.category_index + 1) % slots
        } else {
            (self.category_index + slots - 1) % slots
        };
        self.product_cursor = 0;
        self.refilter();
    }

    fn edit_search(&mut self, now: Instant) {
        self.search_debounce.touch(now);
    }

    /// Run periodic work: the debounced search
    pub fn tick(&mut self, now: Instant) {
        if self.search_debounce.poll(now) {
            self.apply_search();
        }
    }

    fn apply_search(&mut self) {
        self.applied_query = self.search_input.clone();
        self.product_cursor = 0;
        self.refilter();
    }

    fn highlighted_product(&self) -> Option<&Product> {
        self.visible.get(self.product_cursor)
    }

    fn toggle_highlighted(&mut self) {
        if let Some(product) = self.visible.get(self.product_cursor) {
            let selected = self.selection.toggle(product);
            info!(product = %product.name, selected, "Selection toggled");
        }
        self.clamp_selected_cursor();
    }

    fn clamp_selected_cursor(&mut self) {
        self.selected_cursor = self
            .selected_cursor
            .min(self.selection.len().saturating_sub(1));
    }

    fn toggle_description(&mut self) {
        if let Some(key) = self.highlighted_product().map(|p| selection_key(&p.name)) {
            if !self.expanded.remove(&key) {
                self.expanded.insert(key);
            }
        }
    }

    fn remove_highlighted_selection(&mut self) {
        if let Some(key) = self.selection.key_at(self.selected_cursor).map(str::to_string) {
            self.selection.remove(&key);
            self.clamp_selected_cursor();
        }
    }

    fn clear_selection(&mut self) {
        self.selection.clear();
        self.selected_cursor = 0;
    }

    /// Send the typed follow-up question
    pub fn submit_chat(&mut self) {
        let text = self.chat_input.trim().to_string();
        if text.is_empty() {
            return;
        }
        self.chat_input.clear();

        self.transcript.push(UiMessage::user(text.clone()));
        self.conversation.push_user(text);
        self.send(RequestKind::FollowUp);
    }

    /// Ask for a routine built from the current selection
    pub fn generate_routine(&mut self) {
        let Some(prompt) = routine_prompt(&self.selection) else {
            self.transcript
                .push(UiMessage::notice(EMPTY_SELECTION_NOTICE.to_string()));
            return;
        };

        let names: Vec<&str> = self
            .selection
            .iter()
            .map(|(_, item)| item.name.as_str())
            .collect();
        self.transcript.push(UiMessage::user(format!(
            "Generate a routine with: {}",
            names.join(", ")
        )));
        self.conversation.push_user(prompt);
        self.send(RequestKind::Routine);
    }

    fn send(&mut self, kind: RequestKind) {
        let history = self.conversation.messages().to_vec();
        let request_id = self.chat.spawn(history, kind);
        self.pending_requests += 1;
        info!(request_id, ?kind, turns = self.conversation.len(), "Chat request sent");
    }

    /// Record a finished request in the transcript and, on success, the history
    pub fn apply_chat_event(&mut self, event: ChatEvent) {
        self.pending_requests = self.pending_requests.saturating_sub(1);
        info!(
            request_id = event.request_id,
            kind = ?event.kind,
            ok = event.result.is_ok(),
            "Chat request finished"
        );
        match event.result {
            Ok(reply) => {
                self.conversation.push_assistant(reply.clone());
                self.transcript.push(UiMessage::assistant(reply));
            }
            Err(err) => {
                self.transcript.push(UiMessage::notice(err.to_string()));
            }
        }
    }

    /// Drain every finished request without waiting
    pub fn drain_chat_events(&mut self) {
        while let Ok(event) = self.chat_events.try_recv() {
            self.apply_chat_event(event);
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent, now: Instant) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        match self.focus {
            Focus::Products => match key.code {
                KeyCode::Up | KeyCode::Char('k') => {
                    self.product_cursor = self.product_cursor.saturating_sub(1);
                }
                KeyCode::Down | KeyCode::Char('j') => {
                    if self.product_cursor + 1 < self.visible.len() {
                        self.product_cursor += 1;
                    }
                }
                KeyCode::Char(' ') | KeyCode::Enter => self.toggle_highlighted(),
                KeyCode::Char('i') => self.toggle_description(),
                KeyCode::Char(']') => self.cycle_category(true),
                KeyCode::Char('[') => self.cycle_category(false),
                KeyCode::Char('/') => self.focus = Focus::Search,
                KeyCode::Char('c') => self.focus = Focus::Chat,
                KeyCode::Char('s') | KeyCode::Tab => self.focus = Focus::Selected,
                KeyCode::Char('g') => self.generate_routine(),
                KeyCode::Char('q') => self.should_quit = true,
                _ => {}
            },
            Focus::Selected => match key.code {
                KeyCode::Up | KeyCode::Char('k') => {
                    self.selected_cursor = self.selected_cursor.saturating_sub(1);
                }
                KeyCode::Down | KeyCode::Char('j') => {
                    if self.selected_cursor + 1 < self.selection.len() {
                        self.selected_cursor += 1;
                    }
                }
                KeyCode::Char('d') | KeyCode::Delete | KeyCode::Backspace => {
                    self.remove_highlighted_selection();
                }
                KeyCode::Char('x') => self.clear_selection(),
                KeyCode::Char('g') => self.generate_routine(),
                KeyCode::Esc | KeyCode::Tab | KeyCode::Char('p') => self.focus = Focus::Products,
                KeyCode::Char('q') => self.should_quit = true,
                _ => {}
            },
            Focus::Search => match key.code {
                KeyCode::Char(c) => {
                    self.search_input.push(c);
                    self.edit_search(now);
                }
                KeyCode::Backspace => {
                    self.search_input.pop();
                    self.edit_search(now);
                }
                KeyCode::Enter => {
                    if self.search_debounce.flush() {
                        self.apply_search();
                    }
                    self.focus = Focus::Products;
                }
                KeyCode::Esc => self.focus = Focus::Products,
                _ => {}
            },
            Focus::Chat => match key.code {
                KeyCode::Char(c) => self.chat_input.push(c),
                KeyCode::Backspace => {
                    self.chat_input.pop();
                }
                KeyCode::Enter => self.submit_chat(),
                KeyCode::Esc => self.focus = Focus::Products,
                _ => {}
            },
        }
    }
}

/// Run the picker in the terminal
pub async fn run(catalog: Catalog, client: Arc<dyn ChatClient>) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = PickerApp::new(catalog, client);

    let tick_rate = Duration::from_millis(100);
    let result = run_app(&mut terminal, &mut app, tick_rate).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

/// Main application loop
async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut PickerApp,
    tick_rate: Duration,
) -> Result<()> {
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|f| render_ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);

        // Poll without blocking the runtime so chat tasks keep progressing
        let ready = tokio::task::block_in_place(|| event::poll(timeout))?;
        if ready {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key, Instant::now());
                }
            }
        }

        app.drain_chat_events();
        app.tick(Instant::now());

        if app.should_quit() {
            return Ok(());
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }
    }
}
