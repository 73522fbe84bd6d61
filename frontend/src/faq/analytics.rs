use log::debug;
use serde::Serialize;
use wasm_bindgen::prelude::*;
use web_sys::window;

use crate::config;

pub const FAQ_EVENT: &str = "faq_interaction";
const FAQ_CATEGORY: &str = "FAQ";
const CONSENT_KEY: &str = "cookieConsent";

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = window, js_name = gtag, catch)]
    fn gtag_event(command: &str, name: &str, params: JsValue) -> Result<(), JsValue>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FaqInteraction {
    Open { question: String },
    Search { query: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventParams {
    pub event_category: String,
    pub event_label: String,
    pub action: String,
}

impl From<&FaqInteraction> for EventParams {
    fn from(interaction: &FaqInteraction) -> Self {
        let (action, label) = match interaction {
            FaqInteraction::Open { question } => ("open", question),
            FaqInteraction::Search { query } => ("search", query),
        };
        Self {
            event_category: FAQ_CATEGORY.to_string(),
            event_label: label.clone(),
            action: action.to_string(),
        }
    }
}

/// Fire-and-forget event sink. Implementations swallow delivery failures.
pub trait AnalyticsSink {
    fn track(&self, name: &str, params: &EventParams);

    fn track_faq(&self, interaction: &FaqInteraction) {
        self.track(FAQ_EVENT, &EventParams::from(interaction));
    }
}

/// Forwards events to the page's Google Analytics `gtag` function once the
/// visitor has accepted cookies.
#[derive(Debug, Clone, Default)]
pub struct GtagSink;

impl GtagSink {
    fn has_consent() -> bool {
        window()
            .and_then(|w| w.local_storage().ok().flatten())
            .and_then(|storage| storage.get_item(CONSENT_KEY).ok().flatten())
            .map(|value| value == "true")
            .unwrap_or(false)
    }
}

impl AnalyticsSink for GtagSink {
    fn track(&self, name: &str, params: &EventParams) {
        if !Self::has_consent() {
            return;
        }
        let Ok(value) = serde_wasm_bindgen::to_value(params) else {
            return;
        };
        // gtag is absent until the analytics script loads.
        let _ = gtag_event("event", name, value);
        if config::analytics_debug() {
            debug!("Analytics: event tracked {} {:?}", name, params);
        }
    }
}
