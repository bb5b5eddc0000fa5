mod catalog;
mod cli;
mod error;
mod identity;
mod metadata;
mod recommend;
mod roadmap;
mod server;
mod service;
mod storage;
mod types;

use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use hyper_util::{
    rt::{TokioExecutor, TokioIo},
    server::conn::auto::Builder,
    service::TowerToHyperService,
};
use rmcp::transport::sse_server::SseServer;
use rmcp::transport::streamable_http_server::{
    StreamableHttpService, session::local::LocalSessionManager,
};
use rmcp::{ServiceExt, transport::stdio};
use tokio::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::catalog::TemplateCatalog;
use crate::cli::{Cli, Command, CommandArguments};
use crate::identity::{Anonymous, FixedIdentity, IdentityProvider};
use crate::server::CareerPathServer;
use crate::service::CareerService;
use crate::storage::Storage;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Version => {
            println!("{} {}", metadata::PKG_NAME, metadata::PKG_VERSION);
            Ok(())
        }
        Command::Start(args) => start(args).await,
    }
}

async fn start(args: CommandArguments) -> Result<(), Box<dyn std::error::Error>> {
    args.validate()?;

    let storage_path = args
        .storage_path
        .clone()
        .unwrap_or_else(Storage::default_path);
    let mut storage = Storage::new(storage_path);
    storage.initialize()?;

    let identity: Arc<dyn IdentityProvider> = match &args.user {
        Some(user) => Arc::new(FixedIdentity::new(user.clone())),
        None => Arc::new(Anonymous),
    };
    let service = Arc::new(CareerService::new(
        Arc::new(Mutex::new(storage)),
        identity,
        TemplateCatalog::builtin(),
    ));

    tracing::info!("Starting {} {}", metadata::PKG_NAME, metadata::PKG_VERSION);

    let mut handles = Vec::new();

    // Stdio transport - single instance
    if args.enable_stdio {
        let std_service = CareerPathServer::new(Arc::clone(&service))
            .serve(stdio())
            .await?;
        handles.push(tokio::spawn(async move {
            let _ = std_service.waiting().await;
        }));
    }

    // HTTP streamable transport using rmcp tower StreamableHttpService + hyper_util
    if args.enable_http {
        let factory_service = Arc::clone(&service);
        let http_service = TowerToHyperService::new(StreamableHttpService::new(
            move || Ok(CareerPathServer::new(Arc::clone(&factory_service))),
            LocalSessionManager::default().into(),
            Default::default(),
        ));
        let http_listener = tokio::net::TcpListener::bind(&args.http_addr).await?;
        handles.push(tokio::spawn(async move {
            loop {
                let (stream, _) = match http_listener.accept().await {
                    Ok(conn) => conn,
                    Err(_) => continue,
                };
                let io = TokioIo::new(stream);
                let service = http_service.clone();
                tokio::spawn(async move {
                    let _ = Builder::new(TokioExecutor::default())
                        .serve_connection(io, service)
                        .await;
                });
            }
        }));
    }

    // SSE; the returned guard cancels the listener when dropped
    let mut _sse_guard = None;
    if args.enable_sse {
        let sse_addr: SocketAddr = args.sse_addr.parse()?;
        let sse = SseServer::serve(sse_addr).await?;
        let sse_service = Arc::clone(&service);
        _sse_guard =
            Some(sse.with_service_directly(move || CareerPathServer::new(Arc::clone(&sse_service))));
    }

    if handles.is_empty() {
        // SSE-only deployment: nothing to join, park until killed.
        futures::future::pending::<()>().await;
    }
    for handle in handles {
        let _ = handle.await;
    }

    Ok(())
}
