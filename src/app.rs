use crate::api::{ApiClient, ApiError};
use crate::cache::{ListKey, QueryCache, QueryState};
use crate::models::{
    CreateTodoInput, SortOption, Todo, TodoStatus, UpdateTodoInput, DEFAULT_PRIORITY,
};
use crate::parser::{
    normalize_description, parse_quick_add, validate_title, DESCRIPTION_MAX, TITLE_MAX,
};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::widgets::ListState;
use std::io;

pub enum InputMode {
    Normal,
    Search,
    Editing,
    ConfirmDelete,
}

#[derive(Copy, Clone, PartialEq)]
pub enum ActiveInput {
    Title,
    Description,
    Priority,
}

impl ActiveInput {
    pub fn next(self) -> Self {
        match self {
            ActiveInput::Title => ActiveInput::Description,
            ActiveInput::Description => ActiveInput::Priority,
            ActiveInput::Priority => ActiveInput::Title,
        }
    }

    pub fn previous(self) -> Self {
        match self {
            ActiveInput::Title => ActiveInput::Priority,
            ActiveInput::Description => ActiveInput::Title,
            ActiveInput::Priority => ActiveInput::Description,
        }
    }
}

/// Draft state for the create/edit popup. One form serves both modes;
/// `editing` decides which mutation submit issues. Constructing a fresh
/// `Form` on every open re-seeds the draft from the edit target.
pub struct Form {
    pub editing: Option<Todo>,
    pub title: String,
    pub description: String,
    pub priority: u8,
    pub error: Option<String>,
}

impl Form {
    pub fn create() -> Self {
        Form {
            editing: None,
            title: String::new(),
            description: String::new(),
            priority: DEFAULT_PRIORITY,
            error: None,
        }
    }

    pub fn edit(todo: Todo) -> Self {
        Form {
            title: todo.title.clone(),
            description: todo.description.clone().unwrap_or_default(),
            priority: todo.priority.clamp(1, 5),
            error: None,
            editing: Some(todo),
        }
    }

    pub fn is_edit(&self) -> bool {
        self.editing.is_some()
    }

    /// Create mode runs the quick-add parser first, so `!N` in the title
    /// sets the priority and is stripped before validation.
    pub fn build_create(&self) -> Result<CreateTodoInput, String> {
        let quick = parse_quick_add(&self.title);
        let title = validate_title(&quick.title)?;
        let description = normalize_description(&self.description)?;
        Ok(CreateTodoInput {
            title,
            description,
            priority: Some(quick.priority.unwrap_or(self.priority)),
        })
    }

    /// Edit mode takes the title literally. An emptied description is
    /// omitted from the payload, leaving the server value unchanged.
    pub fn build_update(&self) -> Result<UpdateTodoInput, String> {
        let title = validate_title(&self.title)?;
        let description = normalize_description(&self.description)?;
        Ok(UpdateTodoInput {
            title: Some(title),
            description: description.map(Some),
            completed: None,
            priority: Some(self.priority),
        })
    }
}

pub struct App {
    pub cache: QueryCache,
    pub status: TodoStatus,
    pub sort: SortOption,
    pub search: String,
    pub state: ListState,
    pub detail_id: Option<String>,
    pub form: Option<Form>,
    pub active_input: ActiveInput,
    pub pending_delete: Option<String>,
    pub input_mode: InputMode,
    pub message: Option<String>,
}

impl App {
    pub fn new() -> App {
        App {
            cache: QueryCache::new(),
            status: TodoStatus::default(),
            sort: SortOption::default(),
            search: String::new(),
            state: ListState::default(),
            detail_id: None,
            form: None,
            active_input: ActiveInput::Title,
            pending_delete: None,
            input_mode: InputMode::Normal,
            message: None,
        }
    }

    pub fn current_key(&self) -> ListKey {
        ListKey {
            status: self.status,
            sort: self.sort,
            search: self.search.clone(),
        }
    }

    /// Todos for the current query key, in server order. Empty while a
    /// first fetch is outstanding or after an error.
    pub fn todos(&self) -> &[Todo] {
        match self.cache.list(&self.current_key()) {
            QueryState::Success(todos) => todos,
            _ => &[],
        }
    }

    pub fn selected_todo(&self) -> Option<&Todo> {
        let todos = self.todos();
        self.state.selected().and_then(|i| todos.get(i))
    }

    /// Fetch whatever the cache reports as missing or stale: the list for
    /// the current key, and the detail view if one is open. Runs between
    /// frames, so at most one fetch per key is ever in flight.
    pub async fn ensure_data(&mut self, api: &ApiClient) {
        let key = self.current_key();
        if self.cache.list_needs_fetch(&key) {
            self.cache.begin_list(key.clone());
            let search = if key.search.is_empty() {
                None
            } else {
                Some(key.search.as_str())
            };
            let result = api
                .list_todos(key.status, key.sort, search)
                .await
                .map_err(|err| err.to_string());
            self.cache.finish_list(&key, result);
            self.clamp_selection();
        }

        if let Some(id) = self.detail_id.clone() {
            if self.cache.detail_needs_fetch(&id) {
                self.cache.begin_detail(id.clone());
                let result = api.get_todo(&id).await.map_err(|err| err.to_string());
                self.cache.finish_detail(&id, result);
            }
        }
    }

    fn clamp_selection(&mut self) {
        let len = self.todos().len();
        let selected = if len == 0 {
            None
        } else {
            Some(self.state.selected().unwrap_or(0).min(len - 1))
        };
        self.state.select(selected);
    }

    pub fn next(&mut self) {
        let len = self.todos().len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) => {
                if i >= len - 1 {
                    0
                } else {
                    i + 1
                }
            }
            None => 0,
        };
        self.state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let len = self.todos().len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) => {
                if i == 0 {
                    len - 1
                } else {
                    i - 1
                }
            }
            None => 0,
        };
        self.state.select(Some(i));
    }

    /// Partial update carrying only `{completed}`, so every other field
    /// is preserved server-side.
    async fn toggle_selected(&mut self, api: &ApiClient) {
        let Some(todo) = self.selected_todo().cloned() else {
            return;
        };
        let input = UpdateTodoInput {
            completed: Some(!todo.completed),
            ..Default::default()
        };
        match api.update_todo(&todo.id, &input).await {
            Ok(_) => {
                self.cache.invalidate_lists();
                self.cache.invalidate_detail(&todo.id);
            }
            Err(err) => self.message = Some(format!("Failed to update todo: {err}")),
        }
    }

    async fn submit_form(&mut self, api: &ApiClient) {
        let Some(form) = self.form.as_ref() else {
            return;
        };
        let editing_id = form.editing.as_ref().map(|todo| todo.id.clone());

        let result: Result<(), String> = match &editing_id {
            Some(id) => match form.build_update() {
                Ok(input) => api
                    .update_todo(id, &input)
                    .await
                    .map(drop)
                    .map_err(|err: ApiError| err.to_string()),
                Err(msg) => Err(msg),
            },
            None => match form.build_create() {
                Ok(input) => api
                    .create_todo(&input)
                    .await
                    .map(drop)
                    .map_err(|err: ApiError| err.to_string()),
                Err(msg) => Err(msg),
            },
        };

        match result {
            Ok(()) => {
                self.cache.invalidate_lists();
                if let Some(id) = editing_id {
                    self.cache.invalidate_detail(&id);
                }
                self.form = None;
                self.input_mode = InputMode::Normal;
            }
            Err(msg) => {
                // draft stays intact so the user can retry or abandon
                if let Some(form) = self.form.as_mut() {
                    form.error = Some(msg);
                }
            }
        }
    }

    async fn confirm_delete(&mut self, api: &ApiClient) {
        let Some(id) = self.pending_delete.take() else {
            self.input_mode = InputMode::Normal;
            return;
        };
        match api.delete_todo(&id).await {
            Ok(()) => {
                self.cache.invalidate_lists();
                self.cache.remove_detail(&id);
                if self.detail_id.as_deref() == Some(id.as_str()) {
                    self.detail_id = None;
                }
            }
            Err(err) => self.message = Some(format!("Failed to delete todo: {err}")),
        }
        self.input_mode = InputMode::Normal;
    }

    pub async fn handle_input(&mut self, key: KeyEvent, api: &ApiClient) -> io::Result<bool> {
        match self.input_mode {
            InputMode::Normal => {
                self.message = None;
                match key.code {
                    KeyCode::Char('q') => return Ok(true),
                    KeyCode::Char('j') | KeyCode::Down => self.next(),
                    KeyCode::Char('k') | KeyCode::Up => self.previous(),
                    KeyCode::Char('f') => {
                        self.status = self.status.next();
                    }
                    KeyCode::Char('s') => {
                        self.sort = self.sort.next();
                    }
                    KeyCode::Char('/') => {
                        self.input_mode = InputMode::Search;
                    }
                    KeyCode::Char('r') => {
                        self.cache.invalidate_lists();
                        if let Some(id) = self.detail_id.clone() {
                            self.cache.invalidate_detail(&id);
                        }
                    }
                    KeyCode::Char('a') => {
                        self.form = Some(Form::create());
                        self.active_input = ActiveInput::Title;
                        self.input_mode = InputMode::Editing;
                    }
                    KeyCode::Char('e') => {
                        if let Some(todo) = self.selected_todo().cloned() {
                            self.form = Some(Form::edit(todo));
                            self.active_input = ActiveInput::Title;
                            self.input_mode = InputMode::Editing;
                        }
                    }
                    KeyCode::Char('d') => {
                        if let Some(todo) = self.selected_todo() {
                            self.pending_delete = Some(todo.id.clone());
                            self.input_mode = InputMode::ConfirmDelete;
                        }
                    }
                    KeyCode::Char(' ') | KeyCode::Char('x') => self.toggle_selected(api).await,
                    KeyCode::Enter => {
                        if let Some(todo) = self.selected_todo() {
                            self.detail_id = Some(todo.id.clone());
                        }
                    }
                    KeyCode::Esc => {
                        self.detail_id = None;
                    }
                    _ => {}
                }
            }

            InputMode::Search => match key.code {
                // every keystroke changes the query key and re-triggers
                // the list read through the cache
                KeyCode::Char(c) => self.search.push(c),
                KeyCode::Backspace => {
                    self.search.pop();
                }
                KeyCode::Enter | KeyCode::Esc => {
                    self.input_mode = InputMode::Normal;
                }
                _ => {}
            },

            InputMode::Editing => match key.code {
                KeyCode::Enter => self.submit_form(api).await,
                KeyCode::Esc => {
                    self.form = None;
                    self.input_mode = InputMode::Normal;
                }
                KeyCode::Tab => self.active_input = self.active_input.next(),
                KeyCode::BackTab => self.active_input = self.active_input.previous(),
                _ => {
                    let active = self.active_input;
                    if let Some(form) = self.form.as_mut() {
                        match active {
                            ActiveInput::Title => match key.code {
                                KeyCode::Char(c) => {
                                    if form.title.chars().count() < TITLE_MAX {
                                        form.title.push(c);
                                    }
                                }
                                KeyCode::Backspace => {
                                    form.title.pop();
                                }
                                _ => {}
                            },
                            ActiveInput::Description => match key.code {
                                KeyCode::Char(c) => {
                                    if form.description.chars().count() < DESCRIPTION_MAX {
                                        form.description.push(c);
                                    }
                                }
                                KeyCode::Backspace => {
                                    form.description.pop();
                                }
                                _ => {}
                            },
                            ActiveInput::Priority => match key.code {
                                KeyCode::Left | KeyCode::Char('h') => {
                                    if form.priority > 1 {
                                        form.priority -= 1;
                                    }
                                }
                                KeyCode::Right | KeyCode::Char('l') => {
                                    if form.priority < 5 {
                                        form.priority += 1;
                                    }
                                }
                                KeyCode::Char(c @ '1'..='5') => {
                                    form.priority = c as u8 - b'0';
                                }
                                _ => {}
                            },
                        }
                    }
                }
            },

            InputMode::ConfirmDelete => match key.code {
                KeyCode::Char('y') | KeyCode::Enter => self.confirm_delete(api).await,
                _ => {
                    // any other key cancels with no network call
                    self.pending_delete = None;
                    self.input_mode = InputMode::Normal;
                }
            },
        }
        Ok(false)
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}
