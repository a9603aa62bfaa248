use wasm_bindgen::JsValue;

/// Errors raised while manipulating the page.
#[derive(Debug, thiserror::Error)]
pub enum WebError {
    /// The page has no element to put notification banners in.
    #[error("No {0} element to hold notifications")]
    MissingContainer(&'static str),

    /// A DOM call threw.
    #[error("DOM operation failed: {0}")]
    Dom(String),
}

impl From<JsValue> for WebError {
    fn from(value: JsValue) -> Self {
        WebError::Dom(
            value
                .as_string()
                .unwrap_or_else(|| format!("{value:?}")),
        )
    }
}

pub type WebResult<T> = Result<T, WebError>;
