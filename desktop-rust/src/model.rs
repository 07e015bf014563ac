use chrono::NaiveDate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Upload,
    Analysis,
    History,
}

impl Tab {
    pub const ALL: [Tab; 3] = [Tab::Upload, Tab::Analysis, Tab::History];

    pub fn title(self) -> &'static str {
        match self {
            Tab::Upload => "Upload",
            Tab::Analysis => "Analysis",
            Tab::History => "History",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Warning,
}

/// A message shown in the modal notice window until acknowledged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self { kind: NoticeKind::Info, message: message.into() }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self { kind: NoticeKind::Warning, message: message.into() }
    }

    /// Confirmation after a delete. An id that was already gone still gets one.
    pub fn deleted(id: i64, removed: bool) -> Self {
        if removed {
            Self::info(format!("Deleted entry {id}."))
        } else {
            Self::info(format!("Entry {id} was already deleted."))
        }
    }

    pub fn title(&self) -> &'static str {
        match self.kind {
            NoticeKind::Info => "Info",
            NoticeKind::Warning => "Warning",
        }
    }
}

/// Text buffer behind the date field. Invalid input keeps the last valid date.
#[derive(Debug, Clone)]
pub struct DateInput {
    pub text: String,
}

impl DateInput {
    pub fn new(date: NaiveDate) -> Self {
        Self { text: format_date(date) }
    }

    pub fn set(&mut self, date: NaiveDate) {
        self.text = format_date(date);
    }

    pub fn parsed(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.text.trim(), "%Y-%m-%d").ok()
    }
}

fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
