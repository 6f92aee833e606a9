use tower_lsp::{LspService, Server};

use super::state::SasslineServer;

pub async fn run() {
    // stdout carries the protocol; logs go to stderr.
    tracing_subscriber::fmt().with_writer(std::io::stderr).with_ansi(false).init();

    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let (service, socket) = LspService::new(SasslineServer::new);
    Server::new(stdin, stdout, socket).serve(service).await;
}
