/*
 * Responsibility
 * - OpenAPI document (JSON) と Swagger UI (HTML) の配信
 * - UI は CDN から読み込む (asset は埋め込まない)
 */
use std::sync::LazyLock;

use axum::{
    Json,
    response::{Html, Redirect},
};
use utoipa::OpenApi;

use crate::api::openapi::ApiDoc;

pub const SWAGGER_UI_INDEX: &str = "/swagger-ui/index.html";

static OPENAPI: LazyLock<utoipa::openapi::OpenApi> = LazyLock::new(ApiDoc::openapi);

const SWAGGER_UI_HTML: &str = r##"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <title>API-service document</title>
  <link rel="stylesheet" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css" />
</head>
<body>
  <div id="swagger-ui"></div>
  <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js" crossorigin></script>
  <script>
    window.onload = () => {
      window.ui = SwaggerUIBundle({ url: "/v3/api-docs", dom_id: "#swagger-ui" });
    };
  </script>
</body>
</html>
"##;

pub async fn openapi_json() -> Json<&'static utoipa::openapi::OpenApi> {
    Json(&*OPENAPI)
}

pub async fn swagger_ui() -> Html<&'static str> {
    Html(SWAGGER_UI_HTML)
}

pub async fn swagger_ui_redirect() -> Redirect {
    Redirect::permanent(SWAGGER_UI_INDEX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn swagger_page_is_complete_and_points_at_the_document() {
        let Html(page) = swagger_ui().await;

        assert!(page.contains(r#"url: "/v3/api-docs""#));
        assert!(page.contains(r##"dom_id: "#swagger-ui""##));
        assert!(page.trim_end().ends_with("</html>"));
    }
}
