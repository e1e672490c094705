//! Prism - Static sections (hero, feature grid, footer, chat prompts)

pub const HERO_BADGE: &str = "AI Data Analytics Platform";
pub const HERO_HEADLINE: &str = "Ask in plain language. Get instant insights, charts, and reports.";
pub const HERO_TAGLINE: &str = "Upload your dataset and explore it conversationally. Automatic profiling, smart visuals, and secure code execution powered by LLMs.";

pub const FEATURES_HEADING: &str = "Built for modern data teams";
pub const FEATURES_SUBHEADING: &str = "From upload to insights in minutes. No notebooks, no setup, just answers.";

pub struct Feature {
    pub title: &'static str,
    pub description: &'static str,
}

pub const FEATURES: &[Feature] = &[
    Feature {
        title: "Intelligent Upload",
        description: "CSV, Excel, JSON with auto-profiling, metadata and data quality scoring.",
    },
    Feature {
        title: "Natural Language",
        description: "Ask questions in plain English. Get summaries, code, and tables.",
    },
    Feature {
        title: "Auto Visualizations",
        description: "Instant charts on upload with a custom chart builder for flexibility.",
    },
    Feature {
        title: "Clean & Transform",
        description: "Handle missing values, outliers, and duplicates with one click.",
    },
    Feature {
        title: "Safety First",
        description: "Scoped execution, timeouts, memory limits, and keyword blacklists.",
    },
];

pub const CHAT_EXAMPLES: &[&str] = &[
    "What are the top 5 categories by revenue?",
    "Show a line chart of orders over time.",
    "Are there any outliers in unit price?",
];

pub const CHAT_SUGGESTIONS: &[&str] = &[
    "Summarize missing values by column",
    "Compare average order value by segment",
    "Build a histogram of customer age",
];

/// Chat banner shown while no dataset identifier is set
pub const CHAT_DATASET_BANNER: &str = "Upload and send a dataset to the backend to enable AI chat.";

pub const REPORT_PLACEHOLDER: &str = "Reports include dataset summary, metadata, and auto-generated charts.";
pub const VISUALIZE_PLACEHOLDER: &str = "Visualization preview will appear here";
pub const PREVIEW_PLACEHOLDER: &str = "No data yet. Upload a CSV or JSON to preview.";

pub const FOOTER: &str = "AI Data Analytics Platform · Secure, conversational insights for everyone";
