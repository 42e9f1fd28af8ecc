/// Collects the human readable trace of a single evaluation.
///
/// When the builder is disabled every method is a no-op; callers building expensive messages
/// should check [`EvalLogBuilder::enabled`] first.
pub struct EvalLogBuilder {
    enabled: bool,
    content: String,
    indent: usize,
}

impl EvalLogBuilder {
    const NEW_LINE_CHAR: char = '\n';
    const INDENT_SEQ: &'static str = "  ";

    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            content: String::new(),
            indent: 0,
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn inc_indent(&mut self) -> &mut Self {
        self.indent += 1;
        self
    }

    pub fn dec_indent(&mut self) -> &mut Self {
        self.indent = self.indent.saturating_sub(1);
        self
    }

    pub fn new_ln(&mut self, message: Option<&str>) -> &mut Self {
        if !self.enabled {
            return self;
        }
        self.content.push(Self::NEW_LINE_CHAR);
        self.content
            .push_str(Self::INDENT_SEQ.repeat(self.indent).as_str());
        if let Some(msg) = message {
            self.content.push_str(msg)
        }
        self
    }

    pub fn append(&mut self, val: &str) -> &mut Self {
        if self.enabled {
            self.content.push_str(val);
        }
        self
    }

    pub fn content(&self) -> &str {
        self.content.as_str()
    }
}
