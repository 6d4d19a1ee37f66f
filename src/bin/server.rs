use std::{
    error::Error,
    net::{IpAddr, SocketAddr},
    path::Path,
};

use axum::{
    Router,
    extract::{MatchedPath, Request},
    http::HeaderName,
    middleware,
};
use axum_server::Handle;
use clap::Parser;
use rusqlite::Connection;
use tower_http::trace::TraceLayer;

#[cfg(debug_assertions)]
use tower_livereload::LiveReloadLayer;

use finance_tracker::{
    AppState, DatabaseArgs, ServerArgs, build_router, get_local_offset, graceful_shutdown,
    init_tracing, logging_middleware,
};

/// The web server for the finance tracker.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[command(flatten)]
    database: DatabaseArgs,

    #[command(flatten)]
    server: ServerArgs,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    init_tracing(Path::new("debug.log"))?;

    let args = Args::parse();

    if get_local_offset(&args.server.timezone).is_none() {
        tracing::error!(
            "Invalid timezone {}, expected a canonical timezone name such as Pacific/Auckland",
            args.server.timezone
        );
        return Err(format!("invalid timezone {}", args.server.timezone).into());
    }

    let owner_header = HeaderName::try_from(args.server.owner_header.as_str())?;
    let host: IpAddr = args.server.host.parse()?;
    let addr = SocketAddr::from((host, args.server.port));

    let db_path = args.database.path()?;
    let connection = Connection::open(&db_path)?;
    tracing::info!("Opened database at {db_path}");

    let state = AppState::new(connection, &args.server.timezone, owner_header.clone())?;

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let router = add_tracing_layer(build_router(state));
    let router = router.layer(middleware::from_fn(logging_middleware));

    #[cfg(debug_assertions)]
    let router = router.layer(LiveReloadLayer::new());

    tracing::info!(
        "HTTP server listening on {addr}, reading users from the {owner_header} header"
    );
    axum_server::bind(addr)
        .handle(handle)
        .serve(router.into_make_service())
        .await?;

    Ok(())
}

fn add_tracing_layer(router: Router) -> Router {
    let tracing_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request| {
            let method = req.method();
            let uri = req.uri();

            let matched_path = req
                .extensions()
                .get::<MatchedPath>()
                .map(|matched_path| matched_path.as_str());

            tracing::debug_span!("request", %method, %uri, matched_path)
        })
        // Errors are logged by the handlers, so skip the default 5xx logging.
        .on_failure(());

    router.layer(tracing_layer)
}
