//! Dispatcher configuration.

use serde::{Deserialize, Serialize};

use crate::error::OculusError;

/// What the dispatcher does when a handler list names an unknown strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Log the error and keep binding the remaining handlers.
    #[default]
    Log,
    /// Abort the scan and return the error.
    Strict,
}

/// Configuration for a mirroring context.
///
/// Missing fields take their defaults when deserialized, so a partial
/// object such as `{"failurePolicy": "strict"}` is valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OculusConfig {
    pub failure_policy: FailurePolicy,
    /// Strategy for elements without a handler list. `None` binds nothing.
    pub default_handler: Option<String>,
    /// Period of the re-scan for late-inserted elements.
    pub scan_interval_ms: u32,
    /// Period of the canonical value poll in the `value` strategy.
    pub value_poll_ms: u32,
    /// Period of the markup poll in the `html` strategy.
    pub html_poll_ms: u32,
    /// Attribute holding the selector of the canonical element.
    pub link_attribute: String,
    /// Attribute holding the whitespace-separated handler list.
    pub handlers_attribute: String,
    /// Attribute holding arguments for the `html` strategy.
    pub handler_args_attribute: String,
    /// Class added to elements once they are bound.
    pub setup_class: String,
    /// Prefix of emitted notification names.
    pub event_prefix: String,
}

impl Default for OculusConfig {
    fn default() -> Self {
        Self {
            failure_policy: FailurePolicy::Log,
            default_handler: Some("click".to_owned()),
            scan_interval_ms: 50,
            value_poll_ms: 50,
            html_poll_ms: 500,
            link_attribute: "data-oculus-element".to_owned(),
            handlers_attribute: "data-oculus-handlers".to_owned(),
            handler_args_attribute: "data-oculus-handler-args".to_owned(),
            setup_class: "js-oculus-setup".to_owned(),
            event_prefix: "oculus:".to_owned(),
        }
    }
}

impl OculusConfig {
    /// Strict-mode configuration with all other fields at their defaults.
    pub fn strict() -> Self {
        Self {
            failure_policy: FailurePolicy::Strict,
            ..Self::default()
        }
    }

    /// Check intervals and attribute names.
    pub fn validate(&self) -> Result<(), OculusError> {
        for (field, value) in [
            ("scanIntervalMs", self.scan_interval_ms),
            ("valuePollMs", self.value_poll_ms),
            ("htmlPollMs", self.html_poll_ms),
        ] {
            if value == 0 {
                return Err(OculusError::InvalidConfig(format!(
                    "{field} must be greater than zero"
                )));
            }
        }

        for (field, value) in [
            ("linkAttribute", &self.link_attribute),
            ("handlersAttribute", &self.handlers_attribute),
            ("handlerArgsAttribute", &self.handler_args_attribute),
            ("setupClass", &self.setup_class),
        ] {
            if value.is_empty() || value.contains(char::is_whitespace) {
                return Err(OculusError::InvalidConfig(format!(
                    "{field} must be a non-empty name without whitespace, got {value:?}"
                )));
            }
        }

        if matches!(self.default_handler.as_deref(), Some("")) {
            return Err(OculusError::InvalidConfig(
                "defaultHandler must not be empty; use null to disable it".to_owned(),
            ));
        }

        Ok(())
    }

    /// Selector matching every element that declares a link.
    pub fn link_selector(&self) -> String {
        format!("[{}]", self.link_attribute)
    }

    /// Full name of a notification, e.g. `oculus:visibility`.
    pub fn event_name(&self, event: &str) -> String {
        format!("{}{}", self.event_prefix, event)
    }
}
