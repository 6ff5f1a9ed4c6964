//! Browser bindings for the forum client: localStorage, HTTP, page effects,
//! image downloads and the OpenPGP.js script.
//!
//! Everything touching `web_sys` lives in `wasm_impl`; native builds get
//! in-memory or failing stand-ins so the UI still compiles for desktop.

use dioxus::prelude::*;
use futures::future::{FutureExt, LocalBoxFuture};
use std::rc::Rc;

use fofou_common::config::ForumConfig;
use fofou_common::draft::FormField;
use fofou_common::error::ForumError;
use fofou_common::post::PostId;
use fofou_common::prefs::PreferenceStore;
use fofou_common::signing::{CryptoLibrary, LibraryLoader};
use fofou_common::submit::{ApiTransport, PageHost};
use fofou_common::token::IdempotencyToken;

pub fn clog(msg: &str) {
    #[cfg(target_family = "wasm")]
    web_sys::console::log_1(&msg.into());
    #[cfg(not(target_family = "wasm"))]
    let _ = msg;
}

/// File chosen in an `<input type="file">`.
#[cfg(target_family = "wasm")]
pub type Attachment = web_sys::File;
#[cfg(not(target_family = "wasm"))]
pub type Attachment = String;

// ─── WASM implementation ─────────────────────────────────────────────────────

#[cfg(target_family = "wasm")]
mod wasm_impl {
    use super::*;
    use std::cell::RefCell;
    use wasm_bindgen::prelude::*;
    use wasm_bindgen::JsCast;
    use wasm_bindgen_futures::JsFuture;

    use fofou_common::draft::FormValue;
    use fofou_common::image::TransferEnd;
    use fofou_common::markup::SLOT_ATTR;
    use fofou_common::viewport::DropdownGeometry;

    fn js_err(context: &str, e: JsValue) -> String {
        format!("{context}: {:?}", e)
    }

    pub fn window() -> Result<web_sys::Window, String> {
        web_sys::window().ok_or_else(|| "No window".to_string())
    }

    pub fn storage() -> Result<web_sys::Storage, String> {
        window()?
            .local_storage()
            .map_err(|e| js_err("localStorage unavailable", e))?
            .ok_or_else(|| "No localStorage".to_string())
    }

    /// Returns the status code and body text.
    pub async fn fetch_text(
        url: &str,
        method: &str,
        body: Option<&web_sys::FormData>,
    ) -> Result<(u16, String), String> {
        let opts = web_sys::RequestInit::new();
        opts.set_method(method);
        opts.set_mode(web_sys::RequestMode::Cors);
        if let Some(form) = body {
            opts.set_body(form.as_ref());
        }

        let request = web_sys::Request::new_with_str_and_init(url, &opts)
            .map_err(|e| js_err("Failed to create request", e))?;

        let resp_value = JsFuture::from(window()?.fetch_with_request(&request))
            .await
            .map_err(|e| js_err("Fetch failed", e))?;

        let resp: web_sys::Response = resp_value
            .dyn_into()
            .map_err(|_| "Response is not a Response object".to_string())?;

        let text = JsFuture::from(resp.text().map_err(|e| js_err("Failed to get text", e))?)
            .await
            .map_err(|e| js_err("Failed to read body", e))?;

        let text_str = text
            .as_string()
            .ok_or_else(|| "Response body is not a string".to_string())?;

        Ok((resp.status(), text_str))
    }

    pub fn form_data(fields: Vec<FormField<Attachment>>) -> Result<web_sys::FormData, String> {
        let form = web_sys::FormData::new().map_err(|e| js_err("FormData", e))?;
        for field in fields {
            let appended = match field.value {
                FormValue::Text(text) => form.append_with_str(field.name, &text),
                FormValue::File(file) => form.append_with_blob(field.name, &file),
            };
            appended.map_err(|e| js_err("FormData append", e))?;
        }
        Ok(form)
    }

    pub fn alert(message: &str) {
        if let Ok(w) = window() {
            let _ = w.alert_with_message(message);
        }
    }

    pub fn navigate(url: &str) {
        if let Ok(w) = window() {
            let _ = w.location().set_href(url);
        }
    }

    pub fn reload() {
        if let Ok(w) = window() {
            let _ = w.location().reload();
        }
    }

    /// `grecaptcha.getResponse()` when the widget is on the page.
    pub fn captcha_token() -> Option<String> {
        let w = window().ok()?;
        let grecaptcha = js_sys::Reflect::get(&w, &"grecaptcha".into()).ok()?;
        if grecaptcha.is_undefined() || grecaptcha.is_null() {
            return None;
        }
        let get_response: js_sys::Function =
            js_sys::Reflect::get(&grecaptcha, &"getResponse".into())
                .ok()?
                .dyn_into()
                .ok()?;
        get_response
            .call0(&grecaptcha)
            .ok()?
            .as_string()
            .filter(|s| !s.is_empty())
    }

    pub fn open_in_new_tab(url: &str) {
        if let Ok(w) = window() {
            let _ = w.open_with_url_and_target(url, "_blank");
        }
    }

    pub fn selected_file(input_id: &str) -> Option<Attachment> {
        let input: web_sys::HtmlInputElement = window()
            .ok()?
            .document()?
            .get_element_by_id(input_id)?
            .dyn_into()
            .ok()?;
        input.files()?.get(0)
    }

    /// Resolved exactly once by whichever event handler fires first.
    type Completion = Rc<RefCell<Option<futures::channel::oneshot::Sender<Result<(), String>>>>>;

    fn complete(slot: &Completion, result: Result<(), String>) {
        if let Some(tx) = slot.borrow_mut().take() {
            let _ = tx.send(result);
        }
    }

    /// Download `url` as an array buffer, reporting progress, and return an
    /// object URL for the bytes.
    pub async fn download_image(
        url: &str,
        mut on_progress: impl FnMut(f64, f64) + 'static,
    ) -> Result<String, String> {
        let xhr = web_sys::XmlHttpRequest::new().map_err(|e| js_err("XHR", e))?;
        xhr.open_with_async("GET", url, true)
            .map_err(|e| js_err("XHR open", e))?;
        xhr.set_response_type(web_sys::XmlHttpRequestResponseType::Arraybuffer);

        let (tx, rx) = futures::channel::oneshot::channel();
        let slot: Completion = Rc::new(RefCell::new(Some(tx)));

        let on_progress_cb = Closure::wrap(Box::new(move |e: web_sys::ProgressEvent| {
            on_progress(e.loaded(), e.total());
        }) as Box<dyn FnMut(web_sys::ProgressEvent)>);
        xhr.set_onprogress(Some(on_progress_cb.as_ref().unchecked_ref()));

        // Any terminal event settles the transfer.
        let mut listeners = Vec::new();
        for end in TransferEnd::ALL {
            let end_slot = slot.clone();
            let cb = Closure::wrap(Box::new(move |_: JsValue| {
                complete(&end_slot, end.result().map_err(|e| e.to_string()));
            }) as Box<dyn FnMut(JsValue)>);
            xhr.add_event_listener_with_callback(end.event_name(), cb.as_ref().unchecked_ref())
                .map_err(|e| js_err("XHR listener", e))?;
            listeners.push((end, cb));
        }

        xhr.send().map_err(|e| js_err("XHR send", e))?;
        let outcome = rx
            .await
            .map_err(|_| "Download abandoned".to_string())
            .and_then(|r| r);

        xhr.set_onprogress(None);
        for (end, cb) in &listeners {
            let _ = xhr
                .remove_event_listener_with_callback(end.event_name(), cb.as_ref().unchecked_ref());
        }
        drop((on_progress_cb, listeners));
        outcome?;

        let status = xhr.status().map_err(|e| js_err("XHR status", e))?;
        if status >= 400 {
            return Err(format!("HTTP {status}"));
        }
        let buffer = xhr.response().map_err(|e| js_err("XHR response", e))?;
        let parts = js_sys::Array::of1(&buffer);
        let blob = web_sys::Blob::new_with_buffer_source_sequence(&parts)
            .map_err(|e| js_err("Blob", e))?;
        web_sys::Url::create_object_url_with_blob(&blob).map_err(|e| js_err("Object URL", e))
    }

    /// `data-slot` of the nearest slotted element around the click target.
    pub fn clicked_slot(evt: &MouseEvent) -> Option<String> {
        let data = evt.data();
        let native = data.downcast::<web_sys::MouseEvent>()?;
        let target: web_sys::Element = native.target()?.dyn_into().ok()?;
        target
            .closest(&format!("[{SLOT_ATTR}]"))
            .ok()??
            .get_attribute(SLOT_ATTR)
    }

    /// Shrink the element so its bottom edge stays `margin` pixels inside the viewport.
    pub fn fit_dropdown(element_id: &str, margin: f64) -> Result<(), String> {
        let w = window()?;
        let document = w.document().ok_or("No document")?;
        let element: web_sys::HtmlElement = document
            .get_element_by_id(element_id)
            .ok_or_else(|| format!("No element #{element_id}"))?
            .dyn_into()
            .map_err(|_| "Not an HTML element".to_string())?;

        let scroll_top = w.scroll_y().map_err(|e| js_err("scrollY", e))?;
        let viewport_height = w
            .inner_height()
            .map_err(|e| js_err("innerHeight", e))?
            .as_f64()
            .unwrap_or(0.0);
        let rect = element.get_bounding_client_rect();
        let geometry = DropdownGeometry {
            height: rect.height(),
            offset_top: rect.top() + scroll_top,
            scroll_top,
            viewport_height,
        };

        if let Some(fit) = geometry.fit(margin) {
            let style = element.style();
            style
                .set_property("height", &format!("{}px", fit.height))
                .map_err(|e| js_err("style", e))?;
            style
                .set_property("overflow-y", "scroll")
                .map_err(|e| js_err("style", e))?;
        }
        Ok(())
    }

    fn global_openpgp() -> Option<JsValue> {
        let w = window().ok()?;
        js_sys::Reflect::get(&w, &"openpgp".into())
            .ok()
            .filter(|v| !v.is_undefined() && !v.is_null())
    }

    /// Inject a `<script>` tag and wait for it to run.
    async fn inject_script(url: &str) -> Result<(), String> {
        let document = window()?.document().ok_or("No document")?;
        let script: web_sys::HtmlScriptElement = document
            .create_element("script")
            .map_err(|e| js_err("createElement", e))?
            .dyn_into()
            .map_err(|_| "Not a script element".to_string())?;
        script.set_src(url);

        let (tx, rx) = futures::channel::oneshot::channel();
        let slot: Completion = Rc::new(RefCell::new(Some(tx)));
        let load_slot = slot.clone();
        let on_load_cb = Closure::wrap(Box::new(move |_: JsValue| {
            complete(&load_slot, Ok(()));
        }) as Box<dyn FnMut(JsValue)>);
        script.set_onload(Some(on_load_cb.as_ref().unchecked_ref()));
        let error_slot = slot.clone();
        let src = url.to_string();
        let on_error_cb = Closure::wrap(Box::new(move |_: JsValue| {
            complete(&error_slot, Err(format!("failed to load {src}")));
        }) as Box<dyn FnMut(JsValue)>);
        script.set_onerror(Some(on_error_cb.as_ref().unchecked_ref()));

        let head = document.head().ok_or("No <head>")?;
        head.append_child(&script)
            .map_err(|e| js_err("appendChild", e))?;

        let outcome = rx
            .await
            .map_err(|_| "Script load abandoned".to_string())
            .and_then(|r| r);
        drop((on_load_cb, on_error_cb));
        outcome
    }

    pub async fn load_openpgp(url: String) -> Result<JsValue, String> {
        if let Some(lib) = global_openpgp() {
            return Ok(lib);
        }
        clog(&format!("[PGP] Loading {url}"));
        inject_script(&url).await?;
        global_openpgp().ok_or_else(|| "openpgp global missing after load".to_string())
    }

    fn get(target: &JsValue, name: &str) -> Result<JsValue, String> {
        js_sys::Reflect::get(target, &name.into()).map_err(|e| js_err(name, e))
    }

    fn call(target: &JsValue, name: &str, args: &[&JsValue]) -> Result<JsValue, String> {
        let func: js_sys::Function = get(target, name)?
            .dyn_into()
            .map_err(|_| format!("{name} is not a function"))?;
        let array = js_sys::Array::new();
        for arg in args {
            array.push(arg);
        }
        func.apply(target, &array).map_err(|e| js_err(name, e))
    }

    async fn settle(value: JsValue) -> Result<JsValue, String> {
        JsFuture::from(js_sys::Promise::resolve(&value))
            .await
            .map_err(|e| js_err("promise rejected", e))
    }

    pub async fn read_armored_key(openpgp: &JsValue, armored: &str) -> Result<JsValue, String> {
        let key_ns = get(openpgp, "key")?;
        let result = settle(call(&key_ns, "readArmored", &[&armored.into()])?).await?;
        let keys: js_sys::Array = get(&result, "keys")?
            .dyn_into()
            .map_err(|_| "keys is not an array".to_string())?;
        let key = keys.get(0);
        if key.is_undefined() {
            return Err("no private key found".to_string());
        }
        Ok(key)
    }

    pub async fn decrypt_key(key: &JsValue, passphrase: &str) -> Result<(), String> {
        settle(call(key, "decrypt", &[&passphrase.into()])?).await?;
        Ok(())
    }

    pub async fn sign_cleartext(openpgp: &JsValue, key: &JsValue, text: &str) -> Result<String, String> {
        let cleartext = get(openpgp, "cleartext")?;
        let message = call(&cleartext, "fromText", &[&text.into()])?;
        let options = js_sys::Object::new();
        js_sys::Reflect::set(&options, &"message".into(), &message)
            .map_err(|e| js_err("options", e))?;
        js_sys::Reflect::set(&options, &"privateKeys".into(), &js_sys::Array::of1(key))
            .map_err(|e| js_err("options", e))?;
        let signed = settle(call(openpgp, "sign", &[&options])?).await?;
        get(&signed, "data")?
            .as_string()
            .ok_or_else(|| "signed data is not a string".to_string())
    }
}

// ─── Preference storage ──────────────────────────────────────────────────────

/// `window.localStorage`, or an in-memory map outside the browser.
#[derive(Clone, Default)]
pub struct LocalStorage {
    #[cfg(not(target_family = "wasm"))]
    memory: fofou_common::prefs::MemoryStore,
}

impl PreferenceStore for LocalStorage {
    fn get(&self, key: &str) -> Result<Option<String>, ForumError> {
        #[cfg(target_family = "wasm")]
        {
            wasm_impl::storage()
                .and_then(|s| s.get_item(key).map_err(|e| format!("{:?}", e)))
                .map_err(ForumError::Storage)
        }
        #[cfg(not(target_family = "wasm"))]
        {
            self.memory.get(key)
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), ForumError> {
        #[cfg(target_family = "wasm")]
        {
            wasm_impl::storage()
                .and_then(|s| s.set_item(key, value).map_err(|e| format!("{:?}", e)))
                .map_err(ForumError::Storage)
        }
        #[cfg(not(target_family = "wasm"))]
        {
            self.memory.set(key, value)
        }
    }
}

// ─── HTTP ────────────────────────────────────────────────────────────────────

/// Multipart `POST` through `fetch`.
#[derive(Clone, Copy, Default)]
pub struct HttpTransport;

impl ApiTransport for HttpTransport {
    type Attachment = Attachment;

    async fn post_form(
        &self,
        url: &str,
        fields: Vec<FormField<Attachment>>,
    ) -> Result<String, ForumError> {
        #[cfg(target_family = "wasm")]
        {
            let form = wasm_impl::form_data(fields).map_err(ForumError::Transport)?;
            // The body is a JSON envelope whatever the status.
            let (_, body) = wasm_impl::fetch_text(url, "POST", Some(&form))
                .await
                .map_err(ForumError::Transport)?;
            Ok(body)
        }
        #[cfg(not(target_family = "wasm"))]
        {
            let _ = (url, fields);
            Err(ForumError::Transport("HTTP only available in WASM".into()))
        }
    }
}

/// `GET /p/{id}?raw=1`: the rendered fragment of one post.
pub async fn fetch_raw_post(config: &ForumConfig, post: PostId) -> Result<String, ForumError> {
    let url = post.raw_url(config);
    #[cfg(target_family = "wasm")]
    {
        let (status, body) = wasm_impl::fetch_text(&url, "GET", None)
            .await
            .map_err(ForumError::Transport)?;
        if status >= 400 {
            return Err(ForumError::Transport(format!("HTTP {status} for {url}")));
        }
        Ok(body)
    }
    #[cfg(not(target_family = "wasm"))]
    {
        Err(ForumError::Transport(format!("cannot fetch {url} outside the browser")))
    }
}

// ─── Page effects ────────────────────────────────────────────────────────────

/// The current page, with the composer's token held in a signal.
#[derive(Clone, Copy)]
pub struct BrowserPage {
    pub token: Signal<IdempotencyToken>,
}

impl PageHost for BrowserPage {
    fn alert(&self, message: &str) {
        #[cfg(target_family = "wasm")]
        wasm_impl::alert(message);
        #[cfg(not(target_family = "wasm"))]
        tracing::warn!("{message}");
    }

    fn navigate(&self, url: &str) {
        #[cfg(target_family = "wasm")]
        wasm_impl::navigate(url);
        #[cfg(not(target_family = "wasm"))]
        tracing::info!("Navigate to {url}");
    }

    fn reload(&self) {
        #[cfg(target_family = "wasm")]
        wasm_impl::reload();
        #[cfg(not(target_family = "wasm"))]
        tracing::info!("Reload");
    }

    fn captcha_token(&self) -> Option<String> {
        #[cfg(target_family = "wasm")]
        {
            wasm_impl::captcha_token()
        }
        #[cfg(not(target_family = "wasm"))]
        {
            None
        }
    }

    fn replace_token(&self, token: IdempotencyToken) {
        let mut slot = self.token;
        slot.set(token);
    }
}

pub fn open_in_new_tab(url: &str) {
    #[cfg(target_family = "wasm")]
    wasm_impl::open_in_new_tab(url);
    #[cfg(not(target_family = "wasm"))]
    tracing::info!("Open {url} in a new tab");
}

pub fn selected_file(input_id: &str) -> Option<Attachment> {
    #[cfg(target_family = "wasm")]
    {
        wasm_impl::selected_file(input_id)
    }
    #[cfg(not(target_family = "wasm"))]
    {
        let _ = input_id;
        None
    }
}

/// Download a full-size image and return a local object URL for it.
pub async fn download_image(
    url: &str,
    on_progress: impl FnMut(f64, f64) + 'static,
) -> Result<String, ForumError> {
    #[cfg(target_family = "wasm")]
    {
        wasm_impl::download_image(url, on_progress)
            .await
            .map_err(ForumError::Transport)
    }
    #[cfg(not(target_family = "wasm"))]
    {
        let _ = on_progress;
        Err(ForumError::Transport(format!("cannot download {url} outside the browser")))
    }
}

/// Slot id of the reference or image a click inside a post body landed on.
pub fn clicked_slot(evt: &MouseEvent) -> Option<String> {
    #[cfg(target_family = "wasm")]
    {
        wasm_impl::clicked_slot(evt)
    }
    #[cfg(not(target_family = "wasm"))]
    {
        let _ = evt;
        None
    }
}

pub fn fit_dropdown(element_id: &str, margin: f64) {
    #[cfg(target_family = "wasm")]
    if let Err(e) = wasm_impl::fit_dropdown(element_id, margin) {
        clog(&format!("[DROPDOWN] {e}"));
    }
    #[cfg(not(target_family = "wasm"))]
    let _ = (element_id, margin);
}

// ─── OpenPGP.js ──────────────────────────────────────────────────────────────

/// Loads `openpgp.min.js` unless `window.openpgp` already exists.
#[derive(Clone)]
pub struct ScriptLoader {
    pub url: String,
}

/// Handle on the global `openpgp` object.
pub struct OpenPgpJs {
    #[cfg(target_family = "wasm")]
    openpgp: wasm_bindgen::JsValue,
}

impl LibraryLoader for ScriptLoader {
    type Library = OpenPgpJs;

    fn load(&self) -> LocalBoxFuture<'static, Result<Rc<OpenPgpJs>, ForumError>> {
        let url = self.url.clone();
        async move {
            #[cfg(target_family = "wasm")]
            {
                let openpgp = wasm_impl::load_openpgp(url)
                    .await
                    .map_err(ForumError::Script)?;
                Ok(Rc::new(OpenPgpJs { openpgp }))
            }
            #[cfg(not(target_family = "wasm"))]
            {
                Err(ForumError::Script(format!("cannot load {url} outside the browser")))
            }
        }
        .boxed_local()
    }
}

#[cfg(target_family = "wasm")]
impl CryptoLibrary for OpenPgpJs {
    type Key = wasm_bindgen::JsValue;

    async fn read_armored_key(&self, armored: &str) -> Result<Self::Key, ForumError> {
        wasm_impl::read_armored_key(&self.openpgp, armored)
            .await
            .map_err(ForumError::Crypto)
    }

    async fn decrypt_key(&self, key: &Self::Key, passphrase: &str) -> Result<(), ForumError> {
        wasm_impl::decrypt_key(key, passphrase)
            .await
            .map_err(ForumError::Crypto)
    }

    async fn sign_cleartext(&self, key: &Self::Key, text: &str) -> Result<String, ForumError> {
        wasm_impl::sign_cleartext(&self.openpgp, key, text)
            .await
            .map_err(ForumError::Crypto)
    }
}

#[cfg(not(target_family = "wasm"))]
impl CryptoLibrary for OpenPgpJs {
    type Key = ();

    async fn read_armored_key(&self, _armored: &str) -> Result<(), ForumError> {
        Err(ForumError::Crypto("OpenPGP only available in WASM".into()))
    }

    async fn decrypt_key(&self, _key: &(), _passphrase: &str) -> Result<(), ForumError> {
        Err(ForumError::Crypto("OpenPGP only available in WASM".into()))
    }

    async fn sign_cleartext(&self, _key: &(), _text: &str) -> Result<String, ForumError> {
        Err(ForumError::Crypto("OpenPGP only available in WASM".into()))
    }
}
