//! Alert messages shown to users after a form submission.
//!
//! Alerts are HTML fragments that htmx swaps into the `#alert-container`
//! element rendered by [crate::html::base].

use axum::response::{IntoResponse, Response};
use maud::{Markup, html};

/// A dismissible error message.
#[derive(Debug, Clone, PartialEq)]
pub struct Alert {
    pub message: String,
    /// Shown under the message when not empty.
    pub details: String,
}

impl Alert {
    pub fn into_html(self) -> Markup {
        let Alert { message, details } = self;

        html! {
            div
                role="alert"
                class=(ERROR_STYLE)
            {
                div class="flex items-start justify-between gap-4"
                {
                    div
                    {
                        p class="font-semibold" { (message) }

                        @if !details.is_empty() {
                            p class="mt-1 text-sm" { (details) }
                        }
                    }

                    button
                        type="button"
                        aria-label="Dismiss"
                        class="text-lg leading-none"
                        onclick="this.closest('[role=alert]').remove()"
                    {
                        "×"
                    }
                }
            }
        }
    }
}

impl IntoResponse for Alert {
    fn into_response(self) -> Response {
        self.into_html().into_response()
    }
}

const ERROR_STYLE: &str = "p-4 mb-4 rounded-lg border border-red-300 \
    bg-red-50 text-red-800 dark:bg-gray-800 dark:text-red-400 dark:border-red-800";
