//! Prism - Remote panel state
//!
//! Four views share one active tab: chat, visualize, clean and report. Each
//! backend action produces a [`PanelRequest`] that the caller dispatches;
//! the matching [`PanelResponse`] comes back later and is applied here.
//!
//! Every slot hands out increasing request tokens. Only the response for
//! the latest token of a slot may change what is shown; stale ones are
//! dropped so that overlapping requests cannot resolve out of order.

use std::fmt;
use std::str::FromStr;

use serde_json::Value;
use tracing::debug;

use crate::api::{ChartType, ChatRequest, VisualizeRequest};
use crate::error::PrismError;

/// Shown instead of chat answers when no dataset identifier is set
pub const CHAT_GUIDANCE: &str = "Please upload and send data to backend first.";
/// Shown by visualize/report when no dataset identifier is set
pub const DATASET_GUIDANCE: &str = "Set a dataset id (press i) to use the backend.";
/// Shown by backend views in the static variant
pub const STATIC_NOTICE: &str = "Backend linkage is off in static mode. Use the report tab to export.";
/// Chat fallback when the backend reply has no answer
pub const NO_ANSWER: &str = "No answer";

/// Panel views
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Chat,
    Visualize,
    Clean,
    Report,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Chat, Tab::Visualize, Tab::Clean, Tab::Report];

    pub fn label(&self) -> &'static str {
        match self {
            Tab::Chat => "AI Chat",
            Tab::Visualize => "Visualizations",
            Tab::Clean => "Cleaning",
            Tab::Report => "Reporting",
        }
    }

    pub fn index(&self) -> usize {
        Tab::ALL.iter().position(|t| t == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Tab::ALL[(self.index() + 1) % Tab::ALL.len()]
    }

    pub fn prev(self) -> Self {
        Tab::ALL[(self.index() + Tab::ALL.len() - 1) % Tab::ALL.len()]
    }
}

/// Capability set of the panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PanelVariant {
    /// Backend-linked: actions are gated on a dataset identifier
    #[default]
    Linked,
    /// No backend calls; reporting only offers local exports
    Static,
}

impl fmt::Display for PanelVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PanelVariant::Linked => f.write_str("linked"),
            PanelVariant::Static => f.write_str("static"),
        }
    }
}

impl FromStr for PanelVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "linked" => Ok(PanelVariant::Linked),
            "static" => Ok(PanelVariant::Static),
            other => Err(format!("unknown panel variant '{}' (expected linked or static)", other)),
        }
    }
}

// ─── Request tokens ─────────────────────────────────────────────────────────

/// Token bookkeeping for one kind of request.
#[derive(Debug, Default, Clone)]
pub struct RequestSlot {
    latest: u64,
    in_flight: bool,
}

impl RequestSlot {
    /// Issue the next token; the slot is loading until it settles.
    pub fn issue(&mut self) -> u64 {
        self.latest += 1;
        self.in_flight = true;
        self.latest
    }

    /// Settle `token`. Returns `false` for stale tokens, which must not
    /// touch visible state.
    pub fn settle(&mut self, token: u64) -> bool {
        if token != self.latest {
            return false;
        }
        self.in_flight = false;
        true
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight
    }

    pub fn latest(&self) -> u64 {
        self.latest
    }
}

// ─── Requests & responses ───────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelRequest {
    Chat { token: u64, request: ChatRequest },
    Visualize { token: u64, request: VisualizeRequest },
    Report { token: u64, dataset_id: String },
}

impl PanelRequest {
    pub fn token(&self) -> u64 {
        match self {
            PanelRequest::Chat { token, .. }
            | PanelRequest::Visualize { token, .. }
            | PanelRequest::Report { token, .. } => *token,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PanelResponse {
    Chat { token: u64, result: Result<String, PrismError> },
    Visualize { token: u64, result: Result<Value, PrismError> },
    Report { token: u64, result: Result<String, PrismError> },
}

// ─── Views ──────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct ChatView {
    pub question: String,
    /// Answer, guidance or error text; `None` shows the example prompts
    pub answer: Option<String>,
    pub slot: RequestSlot,
}

#[derive(Debug, Default)]
pub struct VisualizeView {
    pub chart_type: ChartType,
    pub x: String,
    pub y: String,
    /// Spec to render as pretty JSON; `None` shows the placeholder
    pub spec: Option<Value>,
    pub notice: Option<String>,
    pub slot: RequestSlot,
}

impl VisualizeView {
    pub fn spec_text(&self) -> Option<String> {
        self.spec
            .as_ref()
            .map(|s| serde_json::to_string_pretty(s).unwrap_or_else(|_| s.to_string()))
    }
}

#[derive(Debug, Default)]
pub struct ReportView {
    pub markdown: String,
    pub notice: Option<String>,
    pub slot: RequestSlot,
}

/// The tabbed panel.
#[derive(Debug, Default)]
pub struct RemotePanel {
    pub variant: PanelVariant,
    pub active: Tab,
    dataset_id: Option<String>,
    pub chat: ChatView,
    pub visualize: VisualizeView,
    pub report: ReportView,
}

impl RemotePanel {
    pub fn new(variant: PanelVariant, dataset_id: Option<String>) -> Self {
        let mut panel = Self {
            variant,
            ..Default::default()
        };
        panel.set_dataset_id(dataset_id.unwrap_or_default());
        panel
    }

    pub fn dataset_id(&self) -> Option<&str> {
        self.dataset_id.as_deref()
    }

    /// Blank identifiers clear it.
    pub fn set_dataset_id(&mut self, id: impl Into<String>) {
        let id = id.into().trim().to_string();
        self.dataset_id = if id.is_empty() { None } else { Some(id) };
    }

    pub fn select(&mut self, tab: Tab) {
        self.active = tab;
    }

    /// Send the current question. `None` when nothing should go out: static
    /// variant, missing dataset (guidance shown instead) or blank question.
    pub fn send_question(&mut self) -> Option<PanelRequest> {
        if self.variant == PanelVariant::Static {
            self.chat.answer = Some(STATIC_NOTICE.to_string());
            return None;
        }
        let Some(dataset_id) = self.dataset_id.clone() else {
            self.chat.answer = Some(CHAT_GUIDANCE.to_string());
            return None;
        };
        if self.chat.question.trim().is_empty() {
            return None;
        }

        self.chat.answer = None;
        let token = self.chat.slot.issue();
        Some(PanelRequest::Chat {
            token,
            request: ChatRequest {
                dataset_id,
                question: self.chat.question.clone(),
            },
        })
    }

    pub fn generate_visualization(&mut self) -> Option<PanelRequest> {
        self.visualize.notice = None;
        if self.variant == PanelVariant::Static {
            self.visualize.notice = Some(STATIC_NOTICE.to_string());
            return None;
        }
        let Some(dataset_id) = self.dataset_id.clone() else {
            self.visualize.notice = Some(DATASET_GUIDANCE.to_string());
            return None;
        };

        self.visualize.spec = None;
        let token = self.visualize.slot.issue();
        Some(PanelRequest::Visualize {
            token,
            request: VisualizeRequest {
                dataset_id,
                chart_type: self.visualize.chart_type,
                x: self.visualize.x.clone(),
                y: self.visualize.y.clone(),
            },
        })
    }

    pub fn generate_report(&mut self) -> Option<PanelRequest> {
        self.report.notice = None;
        if self.variant == PanelVariant::Static {
            return None;
        }
        let Some(dataset_id) = self.dataset_id.clone() else {
            self.report.notice = Some(DATASET_GUIDANCE.to_string());
            return None;
        };

        self.report.markdown.clear();
        let token = self.report.slot.issue();
        Some(PanelRequest::Report { token, dataset_id })
    }

    /// Record a one-line outcome in the report view (exports, notices).
    pub fn set_report_notice(&mut self, text: impl Into<String>) {
        self.report.notice = Some(text.into());
    }

    /// Apply a response. Returns `false` when it was stale and ignored.
    pub fn apply(&mut self, response: PanelResponse) -> bool {
        match response {
            PanelResponse::Chat { token, result } => {
                if !self.chat.slot.settle(token) {
                    debug!("Dropping stale chat response {}", token);
                    return false;
                }
                self.chat.answer = Some(match result {
                    Ok(answer) => answer,
                    Err(PrismError::Shape(_)) => NO_ANSWER.to_string(),
                    Err(e) => e.to_string(),
                });
            }
            PanelResponse::Visualize { token, result } => {
                if !self.visualize.slot.settle(token) {
                    debug!("Dropping stale visualize response {}", token);
                    return false;
                }
                self.visualize.spec = match result {
                    Ok(spec) => Some(spec),
                    Err(PrismError::Shape(_)) => None,
                    Err(e) => Some(serde_json::json!({ "error": e.to_string() })),
                };
            }
            PanelResponse::Report { token, result } => {
                if !self.report.slot.settle(token) {
                    debug!("Dropping stale report response {}", token);
                    return false;
                }
                self.report.markdown = match result {
                    Ok(md) => md,
                    Err(PrismError::Shape(_)) => String::new(),
                    Err(e) => e.to_string(),
                };
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn linked(id: Option<&str>) -> RemotePanel {
        RemotePanel::new(PanelVariant::Linked, id.map(str::to_string))
    }

    #[test]
    fn test_chat_without_dataset_shows_guidance() {
        let mut panel = linked(None);
        panel.chat.question = "what sells best?".into();
        assert!(panel.send_question().is_none());
        assert_eq!(panel.chat.answer.as_deref(), Some(CHAT_GUIDANCE));
        assert!(!panel.chat.slot.is_loading());
        assert_eq!(panel.chat.slot.latest(), 0);
    }

    #[test]
    fn test_blank_question_is_noop() {
        let mut panel = linked(Some("ds1"));
        panel.chat.question = "   ".into();
        assert!(panel.send_question().is_none());
        assert!(panel.chat.answer.is_none());
    }

    #[test]
    fn test_chat_round_trip() {
        let mut panel = linked(Some("ds1"));
        panel.chat.question = "top 5?".into();
        let req = panel.send_question().expect("request issued");
        assert_eq!(
            req,
            PanelRequest::Chat {
                token: 1,
                request: ChatRequest {
                    dataset_id: "ds1".into(),
                    question: "top 5?".into()
                }
            }
        );
        assert!(panel.chat.slot.is_loading());

        assert!(panel.apply(PanelResponse::Chat {
            token: 1,
            result: Ok("Widgets".into())
        }));
        assert_eq!(panel.chat.answer.as_deref(), Some("Widgets"));
        assert!(!panel.chat.slot.is_loading());
    }

    #[test]
    fn test_stale_response_never_overwrites_newer() {
        let mut panel = linked(Some("ds1"));
        panel.chat.question = "first".into();
        let first = panel.send_question().expect("first").token();
        panel.chat.question = "second".into();
        let second = panel.send_question().expect("second").token();
        assert!(second > first);

        // Second resolves first, then the older one arrives
        assert!(panel.apply(PanelResponse::Chat {
            token: second,
            result: Ok("answer two".into())
        }));
        assert!(!panel.apply(PanelResponse::Chat {
            token: first,
            result: Ok("answer one".into())
        }));
        assert_eq!(panel.chat.answer.as_deref(), Some("answer two"));
    }

    #[test]
    fn test_stale_response_keeps_loading_state() {
        let mut panel = linked(Some("ds1"));
        let first = panel.generate_report().expect("first").token();
        let _second = panel.generate_report().expect("second");
        assert!(!panel.apply(PanelResponse::Report {
            token: first,
            result: Ok("# old".into())
        }));
        assert!(panel.report.slot.is_loading());
        assert_eq!(panel.report.markdown, "");
    }

    #[test]
    fn test_chat_fallbacks() {
        let mut panel = linked(Some("ds1"));
        panel.chat.question = "q".into();

        let token = panel.send_question().expect("issued").token();
        panel.apply(PanelResponse::Chat {
            token,
            result: Err(PrismError::Shape("answer")),
        });
        assert_eq!(panel.chat.answer.as_deref(), Some(NO_ANSWER));

        let token = panel.send_question().expect("issued").token();
        assert!(panel.chat.answer.is_none());
        panel.apply(PanelResponse::Chat {
            token,
            result: Err(PrismError::Network("Request failed: refused".into())),
        });
        assert_eq!(panel.chat.answer.as_deref(), Some("Request failed: refused"));
    }

    #[test]
    fn test_visualize_results() {
        let mut panel = linked(Some("ds1"));
        panel.visualize.chart_type = ChartType::Area;
        panel.visualize.x = "month".into();
        panel.visualize.y = "sales".into();

        let req = panel.generate_visualization().expect("issued");
        let PanelRequest::Visualize { token, request } = req else {
            panic!("expected a visualize request");
        };
        assert_eq!(request.chart_type, ChartType::Area);
        assert_eq!(request.x, "month");

        panel.apply(PanelResponse::Visualize {
            token,
            result: Ok(json!({"mark": "area"})),
        });
        assert_eq!(panel.visualize.spec_text().as_deref(), Some("{\n  \"mark\": \"area\"\n}"));

        let token = panel.generate_visualization().expect("issued").token();
        panel.apply(PanelResponse::Visualize {
            token,
            result: Err(PrismError::Network("Backend returned 500".into())),
        });
        assert_eq!(panel.visualize.spec, Some(json!({"error": "Backend returned 500"})));
    }

    #[test]
    fn test_visualize_and_report_guard() {
        let mut panel = linked(None);
        assert!(panel.generate_visualization().is_none());
        assert_eq!(panel.visualize.notice.as_deref(), Some(DATASET_GUIDANCE));
        assert!(panel.generate_report().is_none());
        assert_eq!(panel.report.notice.as_deref(), Some(DATASET_GUIDANCE));
    }

    #[test]
    fn test_report_markdown() {
        let mut panel = linked(Some("ds 1"));
        let req = panel.generate_report().expect("issued");
        assert_eq!(
            req,
            PanelRequest::Report {
                token: 1,
                dataset_id: "ds 1".into()
            }
        );
        panel.apply(PanelResponse::Report {
            token: 1,
            result: Ok("# Summary".into()),
        });
        assert_eq!(panel.report.markdown, "# Summary");
    }

    #[test]
    fn test_static_variant_issues_nothing() {
        let mut panel = RemotePanel::new(PanelVariant::Static, Some("ds1".into()));
        panel.chat.question = "q".into();
        assert!(panel.send_question().is_none());
        assert_eq!(panel.chat.answer.as_deref(), Some(STATIC_NOTICE));
        assert!(panel.generate_visualization().is_none());
        assert!(panel.generate_report().is_none());
    }

    #[test]
    fn test_tabs_cycle_and_variant_parse() {
        assert_eq!(Tab::Report.next(), Tab::Chat);
        assert_eq!(Tab::Chat.prev(), Tab::Report);
        assert_eq!("STATIC".parse::<PanelVariant>(), Ok(PanelVariant::Static));
        assert!("hybrid".parse::<PanelVariant>().is_err());

        let mut panel = linked(Some("  "));
        assert_eq!(panel.dataset_id(), None);
        panel.set_dataset_id(" ds9 ");
        assert_eq!(panel.dataset_id(), Some("ds9"));
    }
}
