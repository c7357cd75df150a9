use std::time::Duration;

use gloo_timers::future::TimeoutFuture;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    Document, Element, HtmlButtonElement, HtmlElement, HtmlInputElement, HtmlTextAreaElement,
};

use ragchat_types::{ExampleCategory, ModuleInfo, SessionSummary, Statistics};
use ragchat_ui::view::{
    entry_html, examples_html, modules_html, sessions_html, stats_html, toast_html,
};
use ragchat_ui::{ConnectionStatus, Indicator, Surface, Toast, TranscriptEntry, TOAST_FADE};

use crate::dom;

const SEND_ICON: &str = "<i class=\"fas fa-paper-plane\"></i>";
const SPINNER_ICON: &str = "<i class=\"fas fa-spinner fa-spin\"></i>";

/// Delay before a freshly inserted toast gets its `show` class.
const TOAST_APPEAR_MS: u32 = 100;

/// Every element the application touches, looked up once at start.
pub struct PageElements {
    pub question_input: HtmlTextAreaElement,
    pub send_btn: HtmlButtonElement,
    pub chat_messages: Element,
    pub welcome_message: HtmlElement,
    pub loading_overlay: Element,
    pub toast_container: Element,
    pub include_sources: HtmlInputElement,
    pub include_conversation: HtmlInputElement,
    pub new_conversation_btn: Element,
    pub stats_btn: Element,
    pub history_btn: Element,
    pub clear_btn: Element,
    pub stats_modal: Element,
    pub stats_content: Element,
    pub history_modal: Element,
    pub history_content: Element,
    pub rag_status: Element,
    pub db_status: Element,
    pub example_questions: Element,
    pub modules: Element,
}

impl PageElements {
    pub fn lookup(document: &Document) -> Result<Self, JsValue> {
        let question_input = dom::get_element_by_id(document, "questionInput")?
            .dyn_into::<HtmlTextAreaElement>()
            .map_err(|_| JsValue::from_str("Element is not HtmlTextAreaElement: questionInput"))?;

        Ok(Self {
            question_input,
            send_btn: dom::get_button_by_id(document, "sendBtn")?,
            chat_messages: dom::get_element_by_id(document, "chatMessages")?,
            welcome_message: dom::get_html_element_by_id(document, "welcomeMessage")?,
            loading_overlay: dom::get_element_by_id(document, "loadingOverlay")?,
            toast_container: dom::get_element_by_id(document, "toastContainer")?,
            include_sources: dom::get_input_by_id(document, "includeSources")?,
            include_conversation: dom::get_input_by_id(document, "includeConversation")?,
            new_conversation_btn: dom::get_element_by_id(document, "newConversationBtn")?,
            stats_btn: dom::get_element_by_id(document, "statsBtn")?,
            history_btn: dom::get_element_by_id(document, "historyBtn")?,
            clear_btn: dom::get_element_by_id(document, "clearBtn")?,
            stats_modal: dom::get_element_by_id(document, "statsModal")?,
            stats_content: dom::get_element_by_id(document, "statsContent")?,
            history_modal: dom::get_element_by_id(document, "historyModal")?,
            history_content: dom::get_element_by_id(document, "historyContent")?,
            rag_status: dom::get_element_by_id(document, "ragStatus")?,
            db_status: dom::get_element_by_id(document, "dbStatus")?,
            example_questions: dom::get_element_by_id(document, "exampleQuestions")?,
            modules: dom::get_element_by_id(document, "Modules")?,
        })
    }
}

/// The chat page as a controller surface.
pub struct DomSurface {
    document: Document,
    elements: PageElements,
    toast_duration: Duration,
}

impl DomSurface {
    pub fn new(document: Document, elements: PageElements, toast_duration: Duration) -> Self {
        Self {
            document,
            elements,
            toast_duration,
        }
    }

    pub fn elements(&self) -> &PageElements {
        &self.elements
    }

    pub fn question(&self) -> String {
        self.elements.question_input.value()
    }

    fn set_indicator(element: &Element, indicator: &Indicator) {
        element.set_text_content(Some(&indicator.label));
        element.set_class_name(indicator.css_class());
    }

    fn append_html(element: &Element, html: &str) {
        if let Err(e) = element.insert_adjacent_html("beforeend", html) {
            log::error!("Failed to insert markup: {:?}", e);
        }
    }
}

fn millis(duration: Duration) -> u32 {
    u32::try_from(duration.as_millis()).unwrap_or(u32::MAX)
}

impl Surface for DomSurface {
    fn set_status(&self, status: &ConnectionStatus) {
        Self::set_indicator(&self.elements.rag_status, &status.assistant);
        Self::set_indicator(&self.elements.db_status, &status.store);
    }

    fn show_examples(&self, categories: &[ExampleCategory]) {
        self.elements
            .example_questions
            .set_inner_html(&examples_html(categories));
    }

    fn show_modules(&self, modules: &[ModuleInfo]) {
        self.elements.modules.set_inner_html(&modules_html(modules));
    }

    fn set_input(&self, text: &str) {
        self.elements.question_input.set_value(text);
        let _ = self.elements.question_input.focus();
    }

    fn clear_input(&self) {
        self.elements.question_input.set_value("");
    }

    fn set_welcome_visible(&self, visible: bool) {
        dom::set_visible(&self.elements.welcome_message, visible);
    }

    fn set_loading(&self, loading: bool) {
        self.elements.send_btn.set_disabled(loading);
        self.elements
            .send_btn
            .set_inner_html(if loading { SPINNER_ICON } else { SEND_ICON });
        dom::set_class(&self.elements.loading_overlay, "show", loading);
    }

    fn append_entry(&self, entry: &TranscriptEntry) {
        Self::append_html(&self.elements.chat_messages, &entry_html(entry));
        dom::scroll_to_bottom(&self.elements.chat_messages);
    }

    fn clear_transcript(&self) {
        self.elements.chat_messages.set_inner_html("");
    }

    fn show_stats(&self, stats: &Statistics) {
        self.elements.stats_content.set_inner_html(&stats_html(stats));
        dom::set_class(&self.elements.stats_modal, "show", true);
    }

    fn show_sessions(&self, sessions: &[SessionSummary]) {
        self.elements
            .history_content
            .set_inner_html(&sessions_html(sessions));
        dom::set_class(&self.elements.history_modal, "show", true);
    }

    fn close_sessions(&self) {
        dom::set_class(&self.elements.history_modal, "show", false);
    }

    fn notify(&self, toast: &Toast) {
        Self::append_html(&self.elements.toast_container, &toast_html(toast));

        let document = self.document.clone();
        let id = toast.element_id();
        let visible_ms = millis(self.toast_duration);
        wasm_bindgen_futures::spawn_local(async move {
            TimeoutFuture::new(TOAST_APPEAR_MS).await;
            if let Some(element) = document.get_element_by_id(&id) {
                dom::set_class(&element, "show", true);
            }
            TimeoutFuture::new(visible_ms).await;
            if let Some(element) = document.get_element_by_id(&id) {
                dom::set_class(&element, "show", false);
                TimeoutFuture::new(millis(TOAST_FADE)).await;
                element.remove();
            }
        });
    }

    fn confirm(&self, prompt: &str) -> bool {
        dom::window()
            .and_then(|window| window.confirm_with_message(prompt))
            .unwrap_or(false)
    }
}
