/// Content script for Work at a Startup pages
///
/// Finds founder names, adds an "Email founder" button next to each one and
/// runs the lookup-and-compose flow on click. Page watching (mutation
/// observer, popstate listener, debounce timer) is owned by `FounderButtons`;
/// whoever creates it decides when to attach and detach.

use crate::bridge::{self, BridgeRequest, BridgeResponse};
use crate::compose::{OutreachTemplate, first_name};
use crate::config::{
    BUTTON_CLASS, BUTTON_LABEL, BUTTON_MARKER, CHECKMARK_CLASS, CHECKMARK_STYLE, CHECKMARK_TITLE,
    CONTAINER_CLASS, CONTAINER_STYLE, FOUNDER_SELECTOR, SCAN_DEBOUNCE_MS, WEBSITE_SELECTOR,
};
use crate::domain::clean_domain;
use crate::lookup::{LookupKey, LookupResult};
use crate::settings::Settings;
use crate::storage::{ChromeStore, KeyValueStore};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Document, Element, Event, MutationObserver, MutationObserverInit, Node, Window};

const MISSING_KEY_MESSAGE: &str = "Please set your Voila Norbert API key in the extension settings";
const NOT_FOUND_MESSAGE: &str = "Could not find email for this founder";

/// What a finished click should do
#[derive(Debug, Clone, PartialEq)]
pub enum ClickOutcome {
    Compose(String),
    Alert(String),
}

pub fn click_outcome(response: &BridgeResponse) -> ClickOutcome {
    match response {
        BridgeResponse::Error { error } => ClickOutcome::Alert(format!("Error: {}", error)),
        BridgeResponse::Found(LookupResult { email: Some(email), .. }) => {
            ClickOutcome::Compose(email.clone())
        }
        _ => ClickOutcome::Alert(NOT_FOUND_MESSAGE.to_string()),
    }
}

/// A founder shown on the page
#[derive(Debug, Clone, PartialEq)]
struct Founder {
    name: String,
    domain: String,
}

impl Founder {
    fn key(&self) -> LookupKey {
        LookupKey::new(&self.name, &self.domain)
    }
}

fn js_error(e: impl fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn current_window() -> Result<Window, JsValue> {
    web_sys::window().ok_or_else(|| JsValue::from_str("no window"))
}

fn current_document() -> Result<Document, JsValue> {
    current_window()?
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))
}

/// Observer watching for founders to render; cleared once buttons are in place
type WatchedObserver = Rc<RefCell<Option<MutationObserver>>>;

/// Runs a page scan once no new request has arrived for `SCAN_DEBOUNCE_MS`
///
/// A scan that injects at least one button disconnects the page observer.
struct Debouncer {
    pending: Rc<Cell<Option<i32>>>,
    callback: Closure<dyn FnMut()>,
}

impl Debouncer {
    fn new(observer: WatchedObserver) -> Self {
        let pending = Rc::new(Cell::new(None));
        let fired = Rc::clone(&pending);
        let callback = Closure::<dyn FnMut()>::new(move || {
            fired.set(None);
            let observer = Rc::clone(&observer);
            spawn_local(async move {
                match scan_page().await {
                    Ok(0) => {}
                    Ok(injected) => {
                        log::debug!("Injected {} email buttons", injected);
                        if let Some(observer) = observer.borrow().as_ref() {
                            observer.disconnect();
                        }
                    }
                    Err(e) => log::warn!("Founder scan failed: {:?}", e),
                }
            });
        });

        Debouncer { pending, callback }
    }

    fn schedule(&self, window: &Window) {
        self.cancel(window);
        match window.set_timeout_with_callback_and_timeout_and_arguments_0(
            self.callback.as_ref().unchecked_ref(),
            SCAN_DEBOUNCE_MS,
        ) {
            Ok(handle) => self.pending.set(Some(handle)),
            Err(e) => log::warn!("Could not schedule founder scan: {:?}", e),
        }
    }

    fn cancel(&self, window: &Window) {
        if let Some(handle) = self.pending.take() {
            window.clear_timeout_with_handle(handle);
        }
    }
}

type ObserverCallback = Closure<dyn FnMut(js_sys::Array, MutationObserver)>;

/// Handle owning everything the content script hooks into the page
#[wasm_bindgen]
pub struct FounderButtons {
    window: Window,
    scan: Rc<Debouncer>,
    observer: WatchedObserver,
    on_mutation: RefCell<Option<ObserverCallback>>,
    on_popstate: RefCell<Option<Closure<dyn FnMut(Event)>>>,
}

#[wasm_bindgen]
impl FounderButtons {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<FounderButtons, JsValue> {
        let observer = WatchedObserver::default();
        Ok(FounderButtons {
            window: current_window()?,
            scan: Rc::new(Debouncer::new(Rc::clone(&observer))),
            observer,
            on_mutation: RefCell::new(None),
            on_popstate: RefCell::new(None),
        })
    }

    /// Start watching the page and schedule a first scan
    ///
    /// The observer keeps scheduling scans while founders are on the page and
    /// stays connected until a scan has injected a button, so a website link
    /// rendered after the founder list is still picked up.
    /// Attaching twice replaces the previous observer and listener.
    pub fn attach(&self) -> Result<(), JsValue> {
        self.detach();
        let document = current_document()?;

        let scan = Rc::clone(&self.scan);
        let window = self.window.clone();
        let callback = ObserverCallback::new(move |_records: js_sys::Array, _observer: MutationObserver| {
            let has_founders = window
                .document()
                .and_then(|document| document.query_selector(FOUNDER_SELECTOR).ok().flatten())
                .is_some();
            if has_founders {
                scan.schedule(&window);
            }
        });
        let observer = MutationObserver::new(callback.as_ref().unchecked_ref())?;
        if let Some(body) = document.body() {
            let options = MutationObserverInit::new();
            options.set_child_list(true);
            options.set_subtree(true);
            observer.observe_with_options(&body, &options)?;
        }
        *self.observer.borrow_mut() = Some(observer);
        *self.on_mutation.borrow_mut() = Some(callback);

        let scan = Rc::clone(&self.scan);
        let window = self.window.clone();
        let on_popstate = Closure::<dyn FnMut(Event)>::new(move |_event: Event| {
            if let Some(root) = window.document().and_then(|document| document.document_element()) {
                if let Err(e) = remove_buttons(&root) {
                    log::warn!("Could not reset founder buttons: {:?}", e);
                }
            }
            scan.schedule(&window);
        });
        self.window
            .add_event_listener_with_callback("popstate", on_popstate.as_ref().unchecked_ref())?;
        *self.on_popstate.borrow_mut() = Some(on_popstate);

        self.scan.schedule(&self.window);
        log::info!("Email founder buttons attached");
        Ok(())
    }

    /// Stop watching the page; buttons already injected stay
    pub fn detach(&self) {
        if let Some(observer) = self.observer.borrow_mut().take() {
            observer.disconnect();
        }
        self.on_mutation.borrow_mut().take();
        if let Some(listener) = self.on_popstate.borrow_mut().take() {
            if let Err(e) = self
                .window
                .remove_event_listener_with_callback("popstate", listener.as_ref().unchecked_ref())
            {
                log::warn!("Could not remove popstate listener: {:?}", e);
            }
        }
        self.scan.cancel(&self.window);
    }
}

#[cfg(test)]
impl FounderButtons {
    fn scan_pending(&self) -> bool {
        self.scan.pending.get().is_some()
    }

    fn observing(&self) -> bool {
        self.observer.borrow().is_some()
    }
}

impl Drop for FounderButtons {
    fn drop(&mut self) {
        self.detach();
    }
}

/// Remove every injected container and processed marker under `root`
fn remove_buttons(root: &Element) -> Result<(), JsValue> {
    let containers = root.query_selector_all(&format!(".{}", CONTAINER_CLASS))?;
    for i in 0..containers.length() {
        if let Some(container) = containers.get(i).and_then(|n| n.dyn_into::<Element>().ok()) {
            container.remove();
        }
    }

    let marked = root.query_selector_all(&format!("[{}]", BUTTON_MARKER))?;
    for i in 0..marked.length() {
        if let Some(element) = marked.get(i).and_then(|n| n.dyn_into::<Element>().ok()) {
            element.remove_attribute(BUTTON_MARKER)?;
        }
    }
    Ok(())
}

/// Name held in the element's leading text node, if it has one
fn founder_name(element: &Element) -> Option<String> {
    let first = element.first_child()?;
    if first.node_type() != Node::TEXT_NODE {
        return None;
    }

    let name = first.text_content()?.trim().to_string();
    if name.is_empty() { None } else { Some(name) }
}

async fn scan_page() -> Result<usize, JsValue> {
    let document = current_document()?;
    let Some(root) = document.document_element() else {
        return Ok(0);
    };
    scan(&document, &root, &ChromeStore::local()).await
}

/// Add a button to every unmarked founder under `root`
///
/// Returns how many buttons were injected. Without a company website link
/// nothing is marked, so a later scan can still process the founders.
async fn scan<S: KeyValueStore>(document: &Document, root: &Element, cache: &S) -> Result<usize, JsValue> {
    let founders = root.query_selector_all(FOUNDER_SELECTOR)?;
    log::debug!("Found founder elements: {}", founders.length());

    let website = root
        .query_selector(WEBSITE_SELECTOR)?
        .and_then(|link| link.text_content());
    let Some(domain) = website.as_deref().and_then(clean_domain) else {
        log::debug!("Company website not found, skipping email buttons");
        return Ok(0);
    };

    let mut injected = 0;
    for i in 0..founders.length() {
        let Some(element) = founders.get(i).and_then(|n| n.dyn_into::<Element>().ok()) else {
            continue;
        };
        if element.has_attribute(BUTTON_MARKER) {
            continue;
        }
        let Some(name) = founder_name(&element) else {
            continue;
        };

        // Marked before the cache read so an overlapping scan skips it
        element.set_attribute(BUTTON_MARKER, "true")?;

        let founder = Founder {
            name,
            domain: domain.clone(),
        };
        let cached = match cache.get::<LookupResult>(founder.key().as_str()).await {
            Ok(entry) => entry.is_some_and(|result| result.email.is_some()),
            Err(e) => {
                log::warn!("Cache read failed for {}: {}", founder.key(), e);
                false
            }
        };
        log::debug!("Processing founder: {} ({})", founder.name, founder.domain);
        inject_button(document, &element, founder, cached)?;
        injected += 1;
    }
    Ok(injected)
}

fn checkmark(document: &Document) -> Result<Element, JsValue> {
    let mark = document.create_element("span")?;
    mark.set_class_name(CHECKMARK_CLASS);
    mark.set_text_content(Some("✓"));
    mark.set_attribute("title", CHECKMARK_TITLE)?;
    mark.set_attribute("style", CHECKMARK_STYLE)?;
    Ok(mark)
}

fn inject_button(
    document: &Document,
    element: &Element,
    founder: Founder,
    cached: bool,
) -> Result<(), JsValue> {
    let container = document.create_element("span")?;
    container.set_class_name(CONTAINER_CLASS);
    container.set_attribute("style", CONTAINER_STYLE)?;
    if cached {
        let mark = checkmark(document)?;
        container.append_child(&mark)?;
    }

    let button = document.create_element("button")?;
    button.set_class_name(BUTTON_CLASS);
    button.set_text_content(Some(BUTTON_LABEL));
    container.append_child(&button)?;

    let on_click = {
        let container = container.clone();
        let button = button.clone();
        Closure::<dyn FnMut(Event)>::new(move |_event: Event| {
            let founder = founder.clone();
            let container = container.clone();
            let button = button.clone();
            spawn_local(async move {
                if let Err(e) = email_founder(&founder, &container, &button).await {
                    log::error!("Content script error: {:?}", e);
                    let message = e.as_string().unwrap_or_else(|| format!("{:?}", e));
                    if let Ok(window) = current_window() {
                        if let Err(e) = window.alert_with_message(&format!("Error: {}", message)) {
                            log::warn!("Could not show error alert: {:?}", e);
                        }
                    }
                }
            });
        })
    };
    button.add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())?;
    // Lives as long as the button
    on_click.forget();

    element.append_child(&container)?;
    Ok(())
}

async fn email_founder(founder: &Founder, container: &Element, button: &Element) -> Result<(), JsValue> {
    let window = current_window()?;
    let settings = Settings::load(&ChromeStore::sync()).await.map_err(js_error)?;
    let Some(api_key) = settings.api_key() else {
        window.alert_with_message(MISSING_KEY_MESSAGE)?;
        return Ok(());
    };

    let cached = match ChromeStore::local().get::<LookupResult>(founder.key().as_str()).await {
        Ok(entry) => entry.filter(|result| result.email.is_some()),
        Err(e) => {
            log::warn!("Ignoring unreadable cache entry for {}: {}", founder.key(), e);
            None
        }
    };

    let response = match cached {
        Some(result) => BridgeResponse::Found(result),
        None => {
            bridge::send(&BridgeRequest::FindEmail {
                founder_name: founder.name.clone(),
                company_website: founder.domain.clone(),
                api_key: api_key.to_string(),
            })
            .await?
        }
    };

    match click_outcome(&response) {
        ClickOutcome::Alert(message) => window.alert_with_message(&message)?,
        ClickOutcome::Compose(email) => {
            let url = OutreachTemplate::default()
                .compose_url(&email, first_name(&founder.name), &settings.sender_name)
                .map_err(js_error)?;
            window.open_with_url(url.as_str())?;

            if container.query_selector(&format!(".{}", CHECKMARK_CLASS))?.is_none() {
                let document = current_document()?;
                let mark = checkmark(&document)?;
                let before: &Node = button;
                container.insert_before(&mark, Some(before))?;
            }
        }
    }
    Ok(())
}


#[cfg(all(test, target_arch = "wasm32"))]
mod dom_tests {
    use super::*;
    use crate::storage::memory::MemoryStore;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    const FOUNDERS: &str = r#"
        <div class="flex flex-row"><span class="font-medium">Jane Doe</span></div>
        <div class="flex flex-row"><span class="font-medium">John Roe</span></div>
        <div class="flex flex-row"><span class="font-medium"><a href="/jobs">Open roles</a></span></div>
    "#;
    const WEBSITE: &str = r#"<a href="/companies/acme/website">https://acme.com/</a>"#;

    /// Detached company page fragment, isolated from other tests
    fn page(html: &str) -> (Document, Element) {
        let document = current_document().unwrap();
        let root = document.create_element("div").unwrap();
        root.set_inner_html(html);
        (document, root)
    }

    fn count(root: &Element, selector: &str) -> u32 {
        root.query_selector_all(selector).unwrap().length()
    }

    fn containers(root: &Element) -> u32 {
        count(root, &format!(".{}", CONTAINER_CLASS))
    }

    fn markers(root: &Element) -> u32 {
        count(root, &format!("[{}]", BUTTON_MARKER))
    }

    #[wasm_bindgen_test]
    async fn test_scan_adds_one_button_per_founder() {
        let (document, root) = page(&format!("{}{}", FOUNDERS, WEBSITE));

        let injected = scan(&document, &root, &MemoryStore::new()).await.unwrap();

        assert_eq!(injected, 2);
        assert_eq!(containers(&root), 2);
        assert_eq!(markers(&root), 2);
        let button = root.query_selector(&format!(".{}", BUTTON_CLASS)).unwrap().unwrap();
        assert_eq!(button.text_content().as_deref(), Some(BUTTON_LABEL));
    }

    #[wasm_bindgen_test]
    async fn test_rescan_skips_marked_founders() {
        let (document, root) = page(&format!("{}{}", FOUNDERS, WEBSITE));
        let cache = MemoryStore::new();

        scan(&document, &root, &cache).await.unwrap();
        let injected = scan(&document, &root, &cache).await.unwrap();

        assert_eq!(injected, 0);
        assert_eq!(containers(&root), 2);
    }

    #[wasm_bindgen_test]
    async fn test_founders_wait_for_website_link() {
        let (document, root) = page(FOUNDERS);
        let cache = MemoryStore::new();

        let injected = scan(&document, &root, &cache).await.unwrap();
        assert_eq!(injected, 0);
        assert_eq!(markers(&root), 0);

        let link = document.create_element("a").unwrap();
        link.set_attribute("href", "/companies/acme/website").unwrap();
        link.set_text_content(Some("acme.com"));
        root.append_child(&link).unwrap();

        let injected = scan(&document, &root, &cache).await.unwrap();
        assert_eq!(injected, 2);
    }

    #[wasm_bindgen_test]
    async fn test_cached_founder_gets_checkmark() {
        let (document, root) = page(&format!("{}{}", FOUNDERS, WEBSITE));
        let cache = MemoryStore::new();
        let entry = serde_json::json!({"email": "jane@acme.com", "status": "found"});
        cache.set("jane doe_acme.com", &entry).await.unwrap();

        scan(&document, &root, &cache).await.unwrap();

        let jane = root.query_selector(FOUNDER_SELECTOR).unwrap().unwrap();
        let check = format!(".{}", CHECKMARK_CLASS);
        assert!(jane.query_selector(&check).unwrap().is_some());
        assert_eq!(count(&root, &check), 1);
    }

    #[wasm_bindgen_test]
    async fn test_remove_buttons_resets_page() {
        let (document, root) = page(&format!("{}{}", FOUNDERS, WEBSITE));
        let cache = MemoryStore::new();
        scan(&document, &root, &cache).await.unwrap();

        remove_buttons(&root).unwrap();

        assert_eq!(containers(&root), 0);
        assert_eq!(markers(&root), 0);
        let injected = scan(&document, &root, &cache).await.unwrap();
        assert_eq!(injected, 2);
    }

    #[wasm_bindgen_test]
    fn test_founder_name_reads_leading_text() {
        let (_, root) = page(
            r#"<span id="named">  Jane Doe <b>CEO</b></span>
               <span id="linked"><a href="/x">Jane</a></span>
               <span id="blank">   </span>
               <span id="empty"></span>"#,
        );
        let name = |id: &str| {
            let element = root.query_selector(&format!("#{}", id)).unwrap().unwrap();
            founder_name(&element)
        };

        assert_eq!(name("named").as_deref(), Some("Jane Doe"));
        assert_eq!(name("linked"), None);
        assert_eq!(name("blank"), None);
        assert_eq!(name("empty"), None);
    }

    #[wasm_bindgen_test]
    fn test_detach_cancels_pending_scan() {
        let buttons = FounderButtons::new().unwrap();

        buttons.attach().unwrap();
        assert!(buttons.scan_pending());
        assert!(buttons.observing());

        buttons.detach();
        assert!(!buttons.scan_pending());
        assert!(!buttons.observing());
    }
}
