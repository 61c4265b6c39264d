//! Result panels: the harness's only output channel

use std::fmt;
use std::path::PathBuf;
use std::sync::Mutex;

/// Kind of a result panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelKind {
    Info,
    Success,
    Error,
}

impl PanelKind {
    pub fn class_name(&self) -> &'static str {
        match self {
            PanelKind::Info => "result",
            PanelKind::Success => "result success",
            PanelKind::Error => "result error",
        }
    }
}

impl fmt::Display for PanelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PanelKind::Info => write!(f, "info"),
            PanelKind::Success => write!(f, "success"),
            PanelKind::Error => write!(f, "error"),
        }
    }
}

/// A rendered panel. Each new panel replaces the previous one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultPanel {
    pub kind: PanelKind,
    pub html: String,
}

impl ResultPanel {
    pub fn info(html: impl Into<String>) -> Self {
        Self {
            kind: PanelKind::Info,
            html: html.into(),
        }
    }

    pub fn success(html: impl Into<String>) -> Self {
        Self {
            kind: PanelKind::Success,
            html: html.into(),
        }
    }

    pub fn error(html: impl Into<String>) -> Self {
        Self {
            kind: PanelKind::Error,
            html: html.into(),
        }
    }

    /// The panel as a standalone `<div>`
    pub fn to_html(&self) -> String {
        format!(
            r#"<div id="result" class="{}">{}</div>"#,
            self.kind.class_name(),
            self.html
        )
    }
}

/// Sink that shows result panels
pub trait ResultDisplay: Send + Sync {
    fn show(&self, panel: &ResultPanel);
}

/// Prints panels to stdout
#[derive(Debug, Default)]
pub struct ConsoleDisplay;

impl ResultDisplay for ConsoleDisplay {
    fn show(&self, panel: &ResultPanel) {
        tracing::debug!("Showing {} panel", panel.kind);
        println!("[{}] {}", panel.kind, panel.html);
    }
}

/// Overwrites an HTML file with each panel, so the file holds the last one
#[derive(Debug)]
pub struct HtmlFileDisplay {
    path: PathBuf,
}

impl HtmlFileDisplay {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ResultDisplay for HtmlFileDisplay {
    fn show(&self, panel: &ResultPanel) {
        if let Err(e) = std::fs::write(&self.path, panel.to_html()) {
            tracing::warn!("Failed to write result to {:?}: {}", self.path, e);
        }
    }
}

/// Shows every panel on each of its displays
#[derive(Default)]
pub struct MultiDisplay {
    displays: Vec<Box<dyn ResultDisplay>>,
}

impl MultiDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, display: impl ResultDisplay + 'static) -> Self {
        self.displays.push(Box::new(display));
        self
    }
}

impl ResultDisplay for MultiDisplay {
    fn show(&self, panel: &ResultPanel) {
        for display in &self.displays {
            display.show(panel);
        }
    }
}

/// Keeps every panel it is shown
#[derive(Debug, Default)]
pub struct RecordingDisplay {
    panels: Mutex<Vec<ResultPanel>>,
}

impl RecordingDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn panels(&self) -> Vec<ResultPanel> {
        self.panels
            .lock()
            .map(|panels| panels.clone())
            .unwrap_or_default()
    }

    /// The panel currently on screen
    pub fn last(&self) -> Option<ResultPanel> {
        self.panels().pop()
    }
}

impl ResultDisplay for RecordingDisplay {
    fn show(&self, panel: &ResultPanel) {
        if let Ok(mut panels) = self.panels.lock() {
            panels.push(panel.clone());
        }
    }
}
