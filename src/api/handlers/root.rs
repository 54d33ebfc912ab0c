//! Root banner.

use axum::response::{Html, IntoResponse};

/// Landing page pointing at the interactive documentation.
pub async fn root() -> impl IntoResponse {
    Html(concat!(
        "<h1>",
        env!("CARGO_PKG_NAME"),
        " ",
        env!("CARGO_PKG_VERSION"),
        "</h1>\n",
        r#"<ul>
    <li><a href="/swagger-ui">Swagger UI</a></li>
    <li><a href="/health">Health</a></li>
</ul>
"#,
    ))
}
