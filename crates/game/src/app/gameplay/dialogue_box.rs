use engine::{
    text_width_px, Canvas, InputAction, InputSnapshot, Rgba, ScreenRect, TypedKey,
    GLYPH_ADVANCE_PX, GLYPH_HEIGHT_PX,
};

const PADDING: f32 = 22.0;
const BOX_HEIGHT: f32 = 156.0;
const LINE_HEIGHT: f32 = 28.0;
const NAME_ROW_HEIGHT: f32 = 24.0;
const TEXT_TOP_GAP: f32 = 10.0;
const CHARS_PER_SECOND: f32 = 55.0;
pub(crate) const MAX_TYPED_CHARS: usize = 256;

const PANEL_FILL: Rgba = [17, 17, 17, 230];
const PANEL_STROKE: Rgba = [255, 255, 255, 85];
const TEXT_COLOR: Rgba = [255, 255, 255, 255];
const PROMPT_FILL: Rgba = [34, 34, 34, 255];

const PROMPT_MARGIN_X: f32 = 50.0;
const PROMPT_HEIGHT: f32 = 40.0;
const PROMPT_BOTTOM_OFFSET: f32 = 80.0;
const PROMPT_TEXT_INSET: f32 = 10.0;

/// Paged, progressively revealed text panel with an optional free-text prompt.
#[derive(Debug, Clone)]
pub(crate) struct DialogueBox {
    active: bool,
    name: String,
    text: String,
    pages: Vec<String>,
    page_index: usize,
    revealed: f32,
    typing: bool,
    typed: String,
    submitted: Option<String>,
    viewport_width: u32,
}

impl DialogueBox {
    pub(crate) fn new(viewport_width: u32) -> Self {
        Self {
            active: false,
            name: String::new(),
            text: String::new(),
            pages: vec![String::new()],
            page_index: 0,
            revealed: 0.0,
            typing: false,
            typed: String::new(),
            submitted: None,
            viewport_width,
        }
    }

    pub(crate) fn is_active(&self) -> bool {
        self.active
    }

    #[cfg(test)]
    pub(crate) fn is_typing(&self) -> bool {
        self.typing
    }

    #[cfg(test)]
    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    #[cfg(test)]
    pub(crate) fn pages(&self) -> &[String] {
        &self.pages
    }

    #[cfg(test)]
    pub(crate) fn page_index(&self) -> usize {
        self.page_index
    }

    #[cfg(test)]
    pub(crate) fn typed(&self) -> &str {
        &self.typed
    }

    pub(crate) fn revealed_chars(&self) -> usize {
        self.revealed as usize
    }

    pub(crate) fn open(&mut self, name: &str, text: &str) {
        self.active = true;
        self.name = name.to_string();
        self.text = text.to_string();
        self.pages = paginate(text, self.inner_width());
        self.page_index = 0;
        self.revealed = 0.0;
    }

    pub(crate) fn close(&mut self) {
        self.active = false;
    }

    /// Entering capture starts from an empty buffer.
    pub(crate) fn set_typing(&mut self, enabled: bool) {
        self.typing = enabled;
        if enabled {
            self.typed.clear();
        }
    }

    pub(crate) fn take_submitted(&mut self) -> Option<String> {
        self.submitted.take()
    }

    pub(crate) fn set_viewport_width(&mut self, width: u32) {
        if width == 0 || width == self.viewport_width {
            return;
        }
        self.viewport_width = width;
        self.pages = paginate(&self.text, self.inner_width());
        self.page_index = self.page_index.min(self.pages.len() - 1);
        self.revealed = self.revealed.min(self.current_page_len() as f32);
    }

    pub(crate) fn update(&mut self, dt_seconds: f32, input: &InputSnapshot) {
        if self.typing {
            self.capture_typed(input.typed_keys());
            return;
        }
        if !self.active {
            return;
        }

        let page_len = self.current_page_len() as f32;
        self.revealed = (self.revealed + CHARS_PER_SECOND * dt_seconds).min(page_len);

        if !input.was_pressed(InputAction::Confirm) {
            return;
        }
        if !self.is_page_revealed() {
            self.revealed = page_len;
        } else if self.page_index + 1 < self.pages.len() {
            self.page_index += 1;
            self.revealed = 0.0;
        } else {
            self.close();
        }
    }

    fn capture_typed(&mut self, keys: &[TypedKey]) {
        for key in keys {
            match *key {
                TypedKey::Char(ch) => {
                    if !ch.is_control() && self.typed.chars().count() < MAX_TYPED_CHARS {
                        self.typed.push(ch);
                    }
                }
                TypedKey::Backspace => {
                    self.typed.pop();
                }
                TypedKey::Enter => {
                    self.submitted = Some(self.typed.trim().to_string());
                    self.typing = false;
                    break;
                }
            }
        }
    }

    fn inner_width(&self) -> u32 {
        self.viewport_width.saturating_sub((PADDING * 4.0) as u32)
    }

    fn current_page(&self) -> &str {
        self.pages
            .get(self.page_index)
            .map(String::as_str)
            .unwrap_or("")
    }

    fn current_page_len(&self) -> usize {
        self.current_page().chars().count()
    }

    fn is_page_revealed(&self) -> bool {
        self.revealed >= self.current_page_len() as f32
    }

    pub(crate) fn render(&mut self, canvas: &mut dyn Canvas) {
        let (screen_width, screen_height) = canvas.viewport();
        self.set_viewport_width(screen_width);
        let screen_width = screen_width as f32;
        let screen_height = screen_height as f32;

        if self.active {
            self.render_panel(canvas, screen_width, screen_height);
        }
        if self.typing {
            self.render_prompt(canvas, screen_width, screen_height);
        }
    }

    fn render_panel(&self, canvas: &mut dyn Canvas, screen_width: f32, screen_height: f32) {
        let x = PADDING;
        let y = screen_height - BOX_HEIGHT - PADDING;
        let width = screen_width - PADDING * 2.0;
        let panel = ScreenRect::new(x, y, width, BOX_HEIGHT);
        canvas.fill_rect(panel, PANEL_FILL);
        canvas.stroke_rect(panel, PANEL_STROKE);
        canvas.draw_text(x + 14.0, y + 8.0, &self.name, TEXT_COLOR);

        let text_top = y + PADDING + NAME_ROW_HEIGHT + TEXT_TOP_GAP - GLYPH_HEIGHT_PX as f32;
        let mut remaining = self.revealed_chars();
        for (row, line) in self.current_page().split('\n').enumerate() {
            let line_len = line.chars().count();
            let shown: String = line.chars().take(remaining).collect();
            if !shown.is_empty() {
                canvas.draw_text(
                    x + PADDING,
                    text_top + row as f32 * LINE_HEIGHT,
                    &shown,
                    TEXT_COLOR,
                );
            }
            remaining = remaining.saturating_sub(line_len + 1);
        }

        if self.is_page_revealed() {
            let indicator = if self.page_index + 1 < self.pages.len() {
                ">"
            } else {
                "#"
            };
            canvas.draw_text(
                x + width - 24.0,
                y + BOX_HEIGHT - 12.0 - 15.0,
                indicator,
                TEXT_COLOR,
            );
        }
    }

    fn render_prompt(&self, canvas: &mut dyn Canvas, screen_width: f32, screen_height: f32) {
        let panel = ScreenRect::new(
            PROMPT_MARGIN_X,
            screen_height - PROMPT_BOTTOM_OFFSET,
            screen_width - PROMPT_MARGIN_X * 2.0,
            PROMPT_HEIGHT,
        );
        canvas.fill_rect(panel, PROMPT_FILL);
        canvas.stroke_rect(panel, TEXT_COLOR);

        let max_width = (panel.width - PROMPT_TEXT_INSET * 2.0).max(0.0) as u32;
        let prompt = clip_tail(&format!("{}_", self.typed), max_width);
        canvas.draw_text(
            PROMPT_MARGIN_X + PROMPT_TEXT_INSET,
            screen_height - 60.0 - 7.0,
            &prompt,
            TEXT_COLOR,
        );
    }
}

/// Lines per page for the fixed box height.
pub(crate) fn lines_per_page() -> usize {
    let inner_height = BOX_HEIGHT - PADDING * 2.0 - NAME_ROW_HEIGHT;
    ((inner_height / LINE_HEIGHT).floor() as usize).max(1)
}

/// Greedy word wrap. A word wider than `max_width` gets a line of its own.
pub(crate) fn wrap_words(text: &str, max_width: u32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if current.is_empty() {
            current.push_str(word);
            continue;
        }
        let candidate = format!("{current} {word}");
        if text_width_px(&candidate) <= max_width {
            current = candidate;
        } else {
            lines.push(std::mem::replace(&mut current, word.to_string()));
        }
    }
    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

/// Never empty; empty text yields a single empty page.
pub(crate) fn paginate(text: &str, max_width: u32) -> Vec<String> {
    wrap_words(text, max_width)
        .chunks(lines_per_page())
        .map(|chunk| chunk.join("\n"))
        .collect()
}

/// Keeps the end of `text` that fits in `max_width`.
fn clip_tail(text: &str, max_width: u32) -> String {
    let fits = (max_width / GLYPH_ADVANCE_PX) as usize;
    let count = text.chars().count();
    text.chars().skip(count.saturating_sub(fits)).collect()
}
