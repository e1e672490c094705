//! Prism - Application state and key handling

use std::path::{Path, PathBuf};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::clean::{CleanOp, MissingStrategy};
use crate::export::{export_preview, ExportFormat};
use crate::format::SourceFormat;
use crate::panel::{PanelRequest, PanelResponse, PanelVariant, RemotePanel, Tab};
use crate::upload::UploadSurface;

/// Which widget receives keystrokes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    /// Single-key commands
    Browse,
    /// Editing the file path to load
    FilePath,
    /// Editing the dataset identifier
    DatasetId,
    /// Editing the chat question
    Question,
    /// Editing the chart builder's X column
    VizX,
    /// Editing the chart builder's Y column
    VizY,
}

impl Focus {
    pub fn label(&self) -> &'static str {
        match self {
            Focus::Browse => "BROWSE",
            Focus::FilePath => "FILE",
            Focus::DatasetId => "DATASET ID",
            Focus::Question => "QUESTION",
            Focus::VizX => "X COLUMN",
            Focus::VizY => "Y COLUMN",
        }
    }

    pub fn is_editing(&self) -> bool {
        *self != Focus::Browse
    }
}

/// Main application state
pub struct App {
    /// Upload/preview surface
    pub upload: UploadSurface,
    /// Tabbed backend panel
    pub panel: RemotePanel,
    /// Current input focus
    pub focus: Focus,
    /// File path input field
    pub path_input: String,
    /// Dataset identifier input field
    pub dataset_input: String,
    /// Forces the parser format instead of detecting from the file name
    pub format_override: Option<SourceFormat>,
    /// First visible preview row
    pub scroll: usize,
    /// Number of preview rows that fit on screen
    pub viewport_height: usize,
    /// Last cleaning summary, shown in the Cleaning tab
    pub clean_summary: Option<String>,
    /// Where static-mode exports are written
    pub export_dir: PathBuf,
    /// Whether to show the help popup
    pub show_help: bool,
    /// Whether to show the feature grid popup
    pub show_features: bool,
    /// Whether the app should quit
    pub should_quit: bool,
}

impl App {
    pub fn new(upload: UploadSurface, panel: RemotePanel) -> Self {
        let dataset_input = panel.dataset_id().unwrap_or_default().to_string();
        Self {
            upload,
            panel,
            focus: Focus::Browse,
            path_input: String::new(),
            dataset_input,
            format_override: None,
            scroll: 0,
            viewport_height: 10,
            clean_summary: None,
            export_dir: PathBuf::from("."),
            show_help: false,
            show_features: false,
            should_quit: false,
        }
    }

    pub fn with_export_dir(mut self, dir: PathBuf) -> Self {
        self.export_dir = dir;
        self
    }

    pub fn with_format_override(mut self, format: Option<SourceFormat>) -> Self {
        self.format_override = format;
        self
    }

    /// Load a file into the upload surface, resetting the preview view.
    pub fn open_file(&mut self, path: &str) {
        self.path_input = path.to_string();
        self.upload.select_file(path, self.format_override);
        self.scroll = 0;
        self.clean_summary = None;
    }

    /// Clear the upload and its input field so the same file can be picked
    /// again.
    pub fn clear_upload(&mut self) {
        self.upload.clear();
        self.path_input.clear();
        self.scroll = 0;
        self.clean_summary = None;
    }

    pub fn apply_response(&mut self, response: PanelResponse) -> bool {
        self.panel.apply(response)
    }

    /// Handle one key press. Returns a request when the key triggered a
    /// backend action that the caller must dispatch.
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<PanelRequest> {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return None;
        }

        if self.focus.is_editing() {
            return self.handle_edit_key(key);
        }

        if self.show_help || self.show_features {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('F') | KeyCode::Char('q')) {
                self.show_help = false;
                self.show_features = false;
            }
            return None;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('?') => self.show_help = true,
            KeyCode::Char('F') => self.show_features = true,

            // Upload
            KeyCode::Char('o') => self.focus = Focus::FilePath,
            KeyCode::Char('x') => self.clear_upload(),

            // Dataset identifier
            KeyCode::Char('i') => {
                self.dataset_input = self.panel.dataset_id().unwrap_or_default().to_string();
                self.focus = Focus::DatasetId;
            }

            // Tabs
            KeyCode::Tab => self.panel.select(self.panel.active.next()),
            KeyCode::BackTab => self.panel.select(self.panel.active.prev()),
            KeyCode::Char(c @ '1'..='4') => {
                let idx = c as usize - '1' as usize;
                self.panel.select(Tab::ALL[idx]);
            }

            // Preview navigation
            KeyCode::Char('j') | KeyCode::Down => self.scroll_down(1),
            KeyCode::Char('k') | KeyCode::Up => self.scroll_up(1),
            KeyCode::PageDown => self.scroll_down(self.viewport_height),
            KeyCode::PageUp => self.scroll_up(self.viewport_height),
            KeyCode::Home => self.scroll = 0,
            KeyCode::End => self.scroll = self.max_scroll(),

            _ => return self.handle_tab_key(key),
        }
        None
    }

    fn handle_tab_key(&mut self, key: KeyEvent) -> Option<PanelRequest> {
        match (self.panel.active, key.code) {
            (Tab::Chat, KeyCode::Char('a')) | (Tab::Chat, KeyCode::Enter) => {
                self.focus = Focus::Question;
            }

            (Tab::Visualize, KeyCode::Char('c')) => {
                self.panel.visualize.chart_type = self.panel.visualize.chart_type.next();
            }
            (Tab::Visualize, KeyCode::Char('X')) => self.focus = Focus::VizX,
            (Tab::Visualize, KeyCode::Char('Y')) => self.focus = Focus::VizY,
            (Tab::Visualize, KeyCode::Char('g')) => return self.panel.generate_visualization(),

            (Tab::Clean, KeyCode::Char(c)) => {
                let op = match c {
                    'd' => CleanOp::Missing(MissingStrategy::Drop),
                    'm' => CleanOp::Missing(MissingStrategy::Mean),
                    'n' => CleanOp::Missing(MissingStrategy::Median),
                    'f' => CleanOp::Missing(MissingStrategy::Mode),
                    'u' => CleanOp::RemoveDuplicates,
                    'r' => CleanOp::IqrOutliers,
                    _ => return None,
                };
                self.run_clean(op);
            }

            (Tab::Report, KeyCode::Char('g')) => return self.panel.generate_report(),
            (Tab::Report, KeyCode::Char('e')) => self.export(ExportFormat::Csv),
            (Tab::Report, KeyCode::Char('E')) => self.export(ExportFormat::Json),

            _ => {}
        }
        None
    }

    fn handle_edit_key(&mut self, key: KeyEvent) -> Option<PanelRequest> {
        match key.code {
            KeyCode::Esc => {
                self.focus = Focus::Browse;
                None
            }
            KeyCode::Enter => {
                let focus = self.focus;
                self.focus = Focus::Browse;
                self.submit(focus)
            }
            KeyCode::Backspace => {
                if let Some(buf) = self.input_mut() {
                    buf.pop();
                }
                None
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                if let Some(buf) = self.input_mut() {
                    buf.push(c);
                }
                None
            }
            _ => None,
        }
    }

    fn submit(&mut self, focus: Focus) -> Option<PanelRequest> {
        match focus {
            Focus::FilePath => {
                let path = self.path_input.trim().to_string();
                if !path.is_empty() {
                    self.open_file(&path);
                }
                None
            }
            Focus::DatasetId => {
                self.panel.set_dataset_id(self.dataset_input.clone());
                None
            }
            Focus::Question => self.panel.send_question(),
            Focus::VizX | Focus::VizY | Focus::Browse => None,
        }
    }

    /// Text buffer edited under the current focus
    pub fn input_mut(&mut self) -> Option<&mut String> {
        match self.focus {
            Focus::Browse => None,
            Focus::FilePath => Some(&mut self.path_input),
            Focus::DatasetId => Some(&mut self.dataset_input),
            Focus::Question => Some(&mut self.panel.chat.question),
            Focus::VizX => Some(&mut self.panel.visualize.x),
            Focus::VizY => Some(&mut self.panel.visualize.y),
        }
    }

    fn run_clean(&mut self, op: CleanOp) {
        self.clean_summary = Some(match self.upload.clean(op) {
            Some(report) => report.summary(),
            None => "Load a file before cleaning.".to_string(),
        });
        self.scroll = self.scroll.min(self.max_scroll());
    }

    fn export(&mut self, format: ExportFormat) {
        if self.panel.variant != PanelVariant::Static {
            return;
        }
        let stem = Path::new(self.upload.file_name())
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        let notice = match export_preview(self.upload.preview(), format, &self.export_dir, &stem) {
            Ok(path) => format!("Exported to {}", path.display()),
            Err(e) => e.to_string(),
        };
        self.panel.set_report_notice(notice);
    }

    fn max_scroll(&self) -> usize {
        self.upload
            .preview()
            .rows
            .len()
            .saturating_sub(self.viewport_height)
    }

    /// Scroll the preview down by n rows
    pub fn scroll_down(&mut self, n: usize) {
        self.scroll = (self.scroll + n).min(self.max_scroll());
    }

    /// Scroll the preview up by n rows
    pub fn scroll_up(&mut self, n: usize) {
        self.scroll = self.scroll.saturating_sub(n);
    }

    /// Update how many preview rows fit on screen
    pub fn set_viewport_height(&mut self, height: usize) {
        self.viewport_height = height.max(1);
        self.scroll = self.scroll.min(self.max_scroll());
    }
}
