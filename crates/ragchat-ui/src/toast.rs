use std::time::Duration;

/// How long a toast takes to fade out once its display time is over.
pub const TOAST_FADE: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Info,
    Success,
    Error,
}

impl ToastKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToastKind::Info => "info",
            ToastKind::Success => "success",
            ToastKind::Error => "error",
        }
    }
}

/// A transient notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub id: u64,
    pub kind: ToastKind,
    pub message: String,
}

impl Toast {
    pub fn css_class(&self) -> String {
        format!("toast toast-{}", self.kind.as_str())
    }

    /// DOM id, unique for the page lifetime.
    pub fn element_id(&self) -> String {
        format!("toast-{}", self.id)
    }
}
