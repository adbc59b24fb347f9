//! Anti-CSRF token checks on HTML forms.

use crate::payloads::CSRF_TOKEN_NAMES;
use crate::types::FormDescriptor;
use scraper::{Html, Selector};

/// Every `<form>` in `html` with its `action`, `method` and the `name` of
/// each `<input>` it contains, in document order.
pub fn extract_forms(html: &str) -> Vec<FormDescriptor> {
    let (form_selector, input_selector) = match (Selector::parse("form"), Selector::parse("input")) {
        (Ok(form), Ok(input)) => (form, input),
        _ => return Vec::new(),
    };

    let document = Html::parse_document(html);

    document
        .select(&form_selector)
        .map(|form| FormDescriptor {
            action: form.value().attr("action").map(str::to_string),
            method: form.value().attr("method").map(str::to_string),
            inputs: form
                .select(&input_selector)
                .filter_map(|input| input.value().attr("name"))
                .map(str::to_string)
                .collect(),
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct CsrfOracle {
    token_names: Vec<String>,
}

impl Default for CsrfOracle {
    fn default() -> Self {
        Self {
            token_names: CSRF_TOKEN_NAMES.iter().map(|name| name.to_string()).collect(),
        }
    }
}

impl CsrfOracle {
    /// Recognise one more token field name besides the built-in ones.
    pub fn with_extra_token(mut self, name: &str) -> Self {
        let name = name.trim();
        if !name.is_empty() && !self.token_names.iter().any(|known| known == name) {
            self.token_names.push(name.to_string());
        }
        self
    }

    pub fn token_names(&self) -> &[String] {
        &self.token_names
    }

    pub fn is_protected(&self, form: &FormDescriptor) -> bool {
        self.token_names.iter().any(|token| form.has_input(token))
    }

    /// The forms carrying none of the recognised token fields.
    pub fn vulnerable_forms(&self, forms: &[FormDescriptor]) -> Vec<FormDescriptor> {
        forms
            .iter()
            .filter(|form| !self.is_protected(form))
            .cloned()
            .collect()
    }
}
