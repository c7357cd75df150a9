//! Event wiring for the chat page.
//!
//! Sidebar items and session buttons are rendered with `data-*` attributes
//! and handled by one delegated listener per container.

use std::cell::RefCell;
use std::rc::Rc;

use gloo_timers::future::TimeoutFuture;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, Event, KeyboardEvent, MouseEvent};

use ragchat_client::RagClient;
use ragchat_ui::view::{ACTION_DELETE_SESSION, ACTION_LOAD_SESSION};
use ragchat_ui::{Controller, SendOutcome, ToastKind};

use crate::dom;
use crate::fetch::FetchTransport;
use crate::page::DomSurface;
use crate::refresh::RefreshHandle;

pub type WebController = Controller<RagClient<FetchTransport>, DomSurface>;

/// Shared slot so `pagehide` can stop the refresh started after binding.
pub type RefreshSlot = Rc<RefCell<Option<RefreshHandle>>>;

fn spawn_send(app: &Rc<WebController>) {
    let app = app.clone();
    wasm_bindgen_futures::spawn_local(async move {
        let question = app.surface().question();
        if app.send_message(&question).await == SendOutcome::Answered {
            let delay = u32::try_from(app.config().resync_delay.as_millis()).unwrap_or(u32::MAX);
            TimeoutFuture::new(delay).await;
            app.resync_history().await;
        }
    });
}

fn bind_chat_input(app: &Rc<WebController>) -> Result<(), JsValue> {
    let elements = app.surface().elements();

    let handler = app.clone();
    dom::add_click_listener(&elements.send_btn, move || spawn_send(&handler))?;

    let handler = app.clone();
    dom::listen(
        &elements.question_input,
        "keypress",
        move |event: KeyboardEvent| {
            if event.key() == "Enter" && !event.shift_key() {
                event.prevent_default();
                spawn_send(&handler);
            }
        },
    )?;

    let handler = app.clone();
    dom::listen(&elements.include_sources, "change", move |_: Event| {
        let checked = handler.surface().elements().include_sources.checked();
        handler.set_include_sources(checked);
    })?;

    let handler = app.clone();
    dom::listen(&elements.include_conversation, "change", move |_: Event| {
        let checked = handler.surface().elements().include_conversation.checked();
        handler.set_include_conversation(checked);
    })?;

    Ok(())
}

fn bind_header(app: &Rc<WebController>) -> Result<(), JsValue> {
    let elements = app.surface().elements();

    let handler = app.clone();
    dom::add_click_listener(&elements.new_conversation_btn, move || {
        let app = handler.clone();
        wasm_bindgen_futures::spawn_local(async move {
            app.new_conversation().await;
        });
    })?;

    let handler = app.clone();
    dom::add_click_listener(&elements.stats_btn, move || {
        let app = handler.clone();
        wasm_bindgen_futures::spawn_local(async move {
            app.show_statistics().await;
        });
    })?;

    let handler = app.clone();
    dom::add_click_listener(&elements.history_btn, move || {
        let app = handler.clone();
        wasm_bindgen_futures::spawn_local(async move {
            app.show_history().await;
        });
    })?;

    let handler = app.clone();
    dom::add_click_listener(&elements.clear_btn, move || {
        let app = handler.clone();
        wasm_bindgen_futures::spawn_local(async move {
            app.clear_conversation().await;
        });
    })?;

    Ok(())
}

fn elements_matching(document: &Document, selector: &str) -> Result<Vec<Element>, JsValue> {
    let nodes = document.query_selector_all(selector)?;
    Ok((0..nodes.length())
        .filter_map(|i| nodes.item(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect())
}

fn bind_modals(document: &Document) -> Result<(), JsValue> {
    for button in elements_matching(document, ".modal-close")? {
        let target = button.clone();
        dom::add_click_listener(&button, move || {
            if let Ok(Some(modal)) = target.closest(".modal") {
                dom::set_class(&modal, "show", false);
            }
        })?;
    }

    // Clicking the backdrop (the modal element itself) closes it.
    for modal in elements_matching(document, ".modal")? {
        let backdrop = modal.clone();
        dom::listen(&modal, "click", move |event: MouseEvent| {
            let on_backdrop = event
                .target()
                .and_then(|target| target.dyn_into::<Element>().ok())
                .map_or(false, |target| target == backdrop);
            if on_backdrop {
                dom::set_class(&backdrop, "show", false);
            }
        })?;
    }
    Ok(())
}

/// Index stored in `attribute` on the clicked item, if any.
fn clicked_index(event: &MouseEvent, attribute: &str) -> Option<usize> {
    let target = event.target()?;
    dom::closest_with_attribute(&target, attribute)?
        .get_attribute(attribute)?
        .parse()
        .ok()
}

fn bind_sidebar(app: &Rc<WebController>) -> Result<(), JsValue> {
    let elements = app.surface().elements();

    let handler = app.clone();
    dom::listen(&elements.example_questions, "click", move |event: MouseEvent| {
        if let Some(index) = clicked_index(&event, "data-example-index") {
            handler.pick_example(index);
        }
    })?;

    let handler = app.clone();
    dom::listen(&elements.modules, "click", move |event: MouseEvent| {
        if let Some(index) = clicked_index(&event, "data-module-index") {
            handler.pick_module(index);
        }
    })?;

    Ok(())
}

fn bind_session_actions(app: &Rc<WebController>) -> Result<(), JsValue> {
    let handler = app.clone();
    dom::listen(
        &app.surface().elements().history_content,
        "click",
        move |event: MouseEvent| {
            let Some(button) = event
                .target()
                .and_then(|target| dom::closest_with_attribute(&target, "data-action"))
            else {
                return;
            };
            let (Some(action), Some(session_id)) = (
                button.get_attribute("data-action"),
                button.get_attribute("data-session-id"),
            ) else {
                return;
            };

            let app = handler.clone();
            wasm_bindgen_futures::spawn_local(async move {
                match action.as_str() {
                    ACTION_LOAD_SESSION => {
                        app.load_session(&session_id).await;
                    }
                    ACTION_DELETE_SESSION => {
                        app.delete_session(&session_id).await;
                    }
                    other => log::warn!("Unknown session action: {}", other),
                }
            });
        },
    )
}

fn bind_window(app: &Rc<WebController>, refresh: RefreshSlot) -> Result<(), JsValue> {
    let window = dom::window()?;

    let handler = app.clone();
    dom::listen(&window, "error", move |event: web_sys::ErrorEvent| {
        log::error!("Unhandled error: {}", event.message());
        handler.notify(ToastKind::Error, "An unexpected error occurred");
    })?;

    let handler = app.clone();
    dom::listen(
        &window,
        "unhandledrejection",
        move |event: web_sys::PromiseRejectionEvent| {
            log::error!("Unhandled rejection: {:?}", event.reason());
            handler.notify(ToastKind::Error, "Processing error");
        },
    )?;

    dom::listen(&window, "pagehide", move |_: Event| {
        if let Some(mut handle) = refresh.borrow_mut().take() {
            handle.stop();
        }
    })
}

/// Install every page handler.
pub fn bind(document: &Document, app: &Rc<WebController>, refresh: RefreshSlot) -> Result<(), JsValue> {
    bind_chat_input(app)?;
    bind_header(app)?;
    bind_modals(document)?;
    bind_sidebar(app)?;
    bind_session_actions(app)?;
    bind_window(app, refresh)?;
    Ok(())
}
