use axum::response::Html;
use include_dir::{include_dir, Dir};

use crate::error::AppError;

/// Static HTML bundled into the binary at compile time.
static PAGES: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/pages");

fn page(name: &str) -> Result<Html<&'static str>, AppError> {
    PAGES
        .get_file(name)
        .and_then(|f| f.contents_utf8())
        .map(Html)
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("embedded page missing: {name}")))
}

/// `GET /`: landing page; its script calls `/track` once on load.
pub async fn index() -> Result<Html<&'static str>, AppError> {
    page("index.html")
}

/// `GET /admin`: asks for the admin key and renders `/logs`.
pub async fn admin() -> Result<Html<&'static str>, AppError> {
    page("admin.html")
}
