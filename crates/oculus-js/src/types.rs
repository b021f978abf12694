//! Types exposed to JavaScript via wasm-bindgen.

use oculus_core::{FailurePolicy, OculusConfig, ScanReport};
use serde::{Deserialize, Serialize};
use tsify_next::Tsify;
use wasm_bindgen::prelude::*;

/// Constructor options. Every field is optional.
#[derive(Debug, Clone, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "camelCase")]
pub struct JsOculusConfig {
    #[tsify(optional, type = "\"log\" | \"strict\"")]
    pub failure_policy: Option<FailurePolicy>,
    /// `null` disables the default handler; omitted keeps `"click"`.
    #[tsify(optional, type = "string | null")]
    #[serde(default = "default_handler")]
    pub default_handler: Option<String>,
    #[tsify(optional)]
    pub scan_interval_ms: Option<u32>,
    #[tsify(optional)]
    pub value_poll_ms: Option<u32>,
    #[tsify(optional)]
    pub html_poll_ms: Option<u32>,
    #[tsify(optional)]
    pub link_attribute: Option<String>,
    #[tsify(optional)]
    pub handlers_attribute: Option<String>,
    #[tsify(optional)]
    pub handler_args_attribute: Option<String>,
    #[tsify(optional)]
    pub setup_class: Option<String>,
    #[tsify(optional)]
    pub event_prefix: Option<String>,
}

fn default_handler() -> Option<String> {
    OculusConfig::default().default_handler
}

impl From<JsOculusConfig> for OculusConfig {
    fn from(js: JsOculusConfig) -> Self {
        let defaults = OculusConfig::default();
        OculusConfig {
            failure_policy: js.failure_policy.unwrap_or(defaults.failure_policy),
            default_handler: js.default_handler,
            scan_interval_ms: js.scan_interval_ms.unwrap_or(defaults.scan_interval_ms),
            value_poll_ms: js.value_poll_ms.unwrap_or(defaults.value_poll_ms),
            html_poll_ms: js.html_poll_ms.unwrap_or(defaults.html_poll_ms),
            link_attribute: js.link_attribute.unwrap_or(defaults.link_attribute),
            handlers_attribute: js.handlers_attribute.unwrap_or(defaults.handlers_attribute),
            handler_args_attribute: js
                .handler_args_attribute
                .unwrap_or(defaults.handler_args_attribute),
            setup_class: js.setup_class.unwrap_or(defaults.setup_class),
            event_prefix: js.event_prefix.unwrap_or(defaults.event_prefix),
        }
    }
}

/// Counts from one scan.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "camelCase")]
pub struct JsScanReport {
    pub bound: u32,
    pub unresolved: u32,
    pub failed: u32,
}

impl From<ScanReport> for JsScanReport {
    fn from(report: ScanReport) -> Self {
        let count = |n: usize| u32::try_from(n).unwrap_or(u32::MAX);
        Self {
            bound: count(report.bound),
            unresolved: count(report.unresolved),
            failed: count(report.failed),
        }
    }
}
