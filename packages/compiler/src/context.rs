/// Which kind of source to generate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Structural dump for inspection; not re-loadable
    #[default]
    Preview,
    /// Executable PHP with an embedded snapshot
    Persisted,
}

/// Options for code generation
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    pub mode: OutputMode,
    /// Indentation string
    pub indent: String,
    /// Emit render-time page listing for menus with `auto_populate` set
    pub auto_populate_menus: bool,
    /// Page directory, relative to the generated file
    pub pages_dir: String,
    /// Known page slots; only used to show auto menu entries in previews
    pub page_slots: Vec<String>,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            mode: OutputMode::Preview,
            indent: "  ".to_string(),
            auto_populate_menus: true,
            pages_dir: "../pages".to_string(),
            page_slots: Vec::new(),
        }
    }
}

impl GenerateOptions {
    pub fn persisted() -> Self {
        Self {
            mode: OutputMode::Persisted,
            ..Default::default()
        }
    }

    pub fn with_pages_dir(mut self, dir: &str) -> Self {
        self.pages_dir = dir.to_string();
        self
    }

    pub fn with_page_slots(mut self, slots: Vec<String>) -> Self {
        self.page_slots = slots;
        self
    }
}

/// Line buffer with indentation tracking
pub(crate) struct Context {
    indent: String,
    depth: usize,
    buffer: String,
}

impl Context {
    pub(crate) fn new(options: &GenerateOptions) -> Self {
        Self {
            indent: options.indent.clone(),
            depth: 0,
            buffer: String::new(),
        }
    }

    pub(crate) fn add_line(&mut self, text: &str) {
        for _ in 0..self.depth {
            self.buffer.push_str(&self.indent);
        }
        self.buffer.push_str(text);
        self.buffer.push('\n');
    }

    /// Add each line of a multi-line fragment at the current depth
    pub(crate) fn add_lines(&mut self, text: &str) {
        for line in text.lines() {
            self.add_line(line);
        }
    }

    pub(crate) fn indent(&mut self) {
        self.depth += 1;
    }

    pub(crate) fn dedent(&mut self) {
        if self.depth > 0 {
            self.depth -= 1;
        }
    }

    pub(crate) fn get_output(self) -> String {
        self.buffer
    }
}
