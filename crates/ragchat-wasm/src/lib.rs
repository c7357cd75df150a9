//! Browser shell of the RAG assistant.
//!
//! Built with `wasm-pack`; `static/index.html` loads the module and calls
//! [`init_app`].

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;

use ragchat_client::{ClientConfig, RagClient};
use ragchat_types::QueryOptions;
use ragchat_ui::Controller;

mod dom;
mod events;
mod fetch;
mod page;
mod refresh;

pub use fetch::FetchTransport;
pub use page::{DomSurface, PageElements};
pub use refresh::RefreshHandle;

/// Initialize the WASM module
/// This sets up panic hooks and logging
#[wasm_bindgen(start)]
pub fn init() {
    // Set panic hook for better error messages
    console_error_panic_hook::set_once();

    // Initialize logging
    wasm_logger::init(wasm_logger::Config::default());

    log::info!("ragchat WASM initialized");
}

/// Client configuration for this page. `<body data-api-base="...">`
/// overrides the API mount point.
fn page_config(document: &web_sys::Document) -> ClientConfig {
    let mut config = ClientConfig::default();
    if let Some(api_base) = document
        .body()
        .and_then(|body| body.get_attribute("data-api-base"))
        .filter(|base| !base.trim().is_empty())
    {
        config.api_base = api_base;
    }
    config
}

/// Look up the page, bind its handlers, load the initial data and start the
/// background resync.
#[wasm_bindgen]
pub async fn init_app() -> Result<(), JsValue> {
    let document = dom::document()?;
    let elements = PageElements::lookup(&document)?;
    let config = page_config(&document);

    let options = QueryOptions {
        include_sources: elements.include_sources.checked(),
        include_conversation: elements.include_conversation.checked(),
    };
    let surface = DomSurface::new(document.clone(), elements, config.toast_duration);
    let app = Rc::new(Controller::new(
        RagClient::new(FetchTransport, config.clone()),
        surface,
        config.clone(),
        options,
    ));

    let refresh: events::RefreshSlot = Rc::new(RefCell::new(None));
    events::bind(&document, &app, refresh.clone())?;

    app.init().await;
    *refresh.borrow_mut() = RefreshHandle::start(app.clone(), config.refresh_interval);

    log::info!("Chat page ready (API at {})", config.api_base);
    Ok(())
}
