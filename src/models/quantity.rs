use tracing::debug;

use crate::utils::validation::parse_leading_int;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AmountSettings {
    pub default: u32,
    pub min: u32,
    pub max: u32,
}

impl Default for AmountSettings {
    fn default() -> Self {
        Self {
            default: 1,
            min: 1,
            max: 9,
        }
    }
}

/// Raised by a [`QuantityControl`] whenever it accepts a new value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuantityUpdated {
    pub value: u32,
}

/// A bounded amount picker.
///
/// The stored value is always inside `[min, max]`. Anything else the user
/// types is dropped and the displayed text snaps back to the stored value;
/// there is no error path. Accepted changes are reported by returning a
/// [`QuantityUpdated`] the owner relays upward.
#[derive(Debug, Clone)]
pub struct QuantityControl {
    value: u32,
    input: String,
    settings: AmountSettings,
}

impl QuantityControl {
    pub fn new(settings: AmountSettings) -> Self {
        Self::with_input(settings, "")
    }

    /// Start from the text already present in the bound input, if any.
    pub fn with_input(settings: AmountSettings, input: &str) -> Self {
        let value = settings.default.clamp(settings.min, settings.max);
        let mut control = Self {
            value,
            input: value.to_string(),
            settings,
        };

        if !input.trim().is_empty() {
            control.set_raw(input);
        }
        control
    }

    pub fn value(&self) -> u32 {
        self.value
    }

    /// The text currently shown in the input.
    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn settings(&self) -> AmountSettings {
        self.settings
    }

    /// Handle text typed into the input.
    pub fn set_raw(&mut self, raw: &str) -> Option<QuantityUpdated> {
        match parse_leading_int(raw) {
            Some(value) => self.set_value(value),
            None => {
                debug!("Quantity input '{}' is not a number, keeping {}", raw, self.value);
                self.reset_input();
                None
            }
        }
    }

    pub fn set_value(&mut self, value: i64) -> Option<QuantityUpdated> {
        let in_bounds =
            value >= i64::from(self.settings.min) && value <= i64::from(self.settings.max);

        if in_bounds && value != i64::from(self.value) {
            // in_bounds guarantees the value fits in u32
            self.value = value as u32;
            self.reset_input();
            Some(QuantityUpdated { value: self.value })
        } else {
            if !in_bounds {
                debug!(
                    "Quantity {} is outside [{}, {}], keeping {}",
                    value, self.settings.min, self.settings.max, self.value
                );
            }
            self.reset_input();
            None
        }
    }

    pub fn increment(&mut self) -> Option<QuantityUpdated> {
        self.set_value(i64::from(self.value) + 1)
    }

    pub fn decrement(&mut self) -> Option<QuantityUpdated> {
        self.set_value(i64::from(self.value) - 1)
    }

    fn reset_input(&mut self) {
        self.input = self.value.to_string();
    }
}
