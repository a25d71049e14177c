//! Server-rendered welcome page showing the first stored user.

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::metrics::PageMetrics;
use crate::server::PageState;
use crate::users::{StoreError, User, UsersStore};

/// Render the welcome page. Only the username of `user` is shown.
pub fn render_page(user: Option<&User>) -> String {
    let mut html = String::from(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>Welcome</title></head>\n<body>\n<div>\n<h1>Welcome</h1>\n",
    );

    if let Some(user) = user {
        html.push_str("<div>\n<p>Username: ");
        html.push_str(&escape_html(&user.username));
        html.push_str("</p>\n</div>\n");
    }

    html.push_str("<div>\nhi there\n</div>\n</div>\n</body>\n</html>\n");
    html
}

/// Look up the first user and render the page.
pub async fn render(store: &dyn UsersStore) -> Result<String, StoreError> {
    let user = store.find_first().await?;
    Ok(render_page(user.as_ref()))
}

/// GET /
pub async fn user_page(State(state): State<PageState>) -> Response {
    match render(state.store.as_ref()).await {
        Ok(html) => {
            PageMetrics::record_rendered();
            Html(html).into_response()
        }
        Err(e) => {
            PageMetrics::record_failed();
            tracing::error!(error = %e, backend = state.store.backend(), "Failed to load user for page");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html("<!DOCTYPE html>\n<html>\n<body>\n<h1>Something went wrong</h1>\n</body>\n</html>\n"),
            )
                .into_response()
        }
    }
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
