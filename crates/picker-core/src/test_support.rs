//! Fixtures shared by the unit tests.

use axum::Router;

/// Serve `app` on an ephemeral local port for the rest of the test and
/// return its base URL (with trailing slash).
pub(crate) async fn serve_local(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}/", addr)
}
