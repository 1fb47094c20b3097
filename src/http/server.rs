//! HTTP server facade.
//!
//! # Responsibilities
//! - Resolve the served root and build the request pipeline from config
//! - Wrap the pipeline in an Axum Router with tracing, request IDs and timeouts
//! - Bind plain or TLS listeners and shut them down gracefully
//!
//! # Design Decisions
//! - Every request goes to one fallback handler; the pipeline decides the rest
//! - The representation cache lives exactly as long as the server value
//! - Static response headers (config `headers`, CORS) are merged into every
//!   response, including ones ended early by auth or robots

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, HeaderName, HeaderValue, Request, Response};
use axum::Router;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::assets::{FileServer, FileServerConfig};
use crate::config::{ServerConfig, TlsConfig};
use crate::error::ServerError;
use crate::lifecycle::{Shutdown, ShutdownSignal};
use crate::negotiation::{
    ContentNegotiator, DirectoryScanner, MemoryRepresentationCache, QualityNegotiator,
    RepresentationCache,
};
use crate::net::tls::load_tls_config;
use crate::observability::logging::{tracing_log_fn, LogFn};
use crate::pipeline::steps::{
    BasicAuth, CompressionVary, ContentNegotiation, Cors, Proxy, RequestLogger, Robots,
    StaticAssets, TrailingSlash,
};
use crate::pipeline::{Pipeline, Step};
use crate::proxy::ProxyClient;

/// Grace period for in-flight TLS connections after shutdown is triggered.
const TLS_DRAIN_SECS: u64 = 10;

/// A configured static server: root, pipeline and router.
pub struct HttpServer {
    config: ServerConfig,
    root: PathBuf,
    pipeline: Arc<Pipeline>,
    representations: Arc<dyn RepresentationCache>,
    router: Router,
}

impl HttpServer {
    /// Build a server with the default log hook, cache and negotiator.
    pub fn new(config: ServerConfig) -> Result<Self, ServerError> {
        Self::builder(config).build()
    }

    pub fn builder(config: ServerConfig) -> HttpServerBuilder {
        HttpServerBuilder {
            config,
            before: Vec::new(),
            log_fn: None,
            representations: None,
            negotiator: None,
        }
    }

    /// The Axum router serving every request through the pipeline.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn pipeline(&self) -> &Arc<Pipeline> {
        &self.pipeline
    }

    /// The directory being served.
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// The representation cache used by content negotiation.
    pub fn representations(&self) -> &Arc<dyn RepresentationCache> {
        &self.representations
    }

    /// Bind `addr` and serve in a background task.
    pub async fn listen(&self, addr: SocketAddr) -> Result<RunningServer, ServerError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ServerError::Bind { addr, source })?;
        let local_addr = listener.local_addr()?;

        let shutdown = Shutdown::new();
        let signal = shutdown.subscribe();
        let router = self.router();
        let task = tokio::spawn(async move { serve_router(router, listener, signal.wait()).await });

        Ok(RunningServer {
            local_addr,
            shutdown,
            task,
        })
    }

    /// Serve on `listener` until `shutdown` resolves.
    pub async fn serve<F>(&self, listener: TcpListener, shutdown: F) -> Result<(), ServerError>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        serve_router(self.router(), listener, shutdown).await
    }

    /// Serve HTTPS on `addr` until `shutdown` fires.
    pub async fn serve_tls(
        &self,
        addr: SocketAddr,
        tls: &TlsConfig,
        shutdown: ShutdownSignal,
    ) -> Result<(), ServerError> {
        let rustls = load_tls_config(tls).await?;
        let handle = axum_server::Handle::new();

        let drain = handle.clone();
        tokio::spawn(async move {
            shutdown.wait().await;
            drain.graceful_shutdown(Some(Duration::from_secs(TLS_DRAIN_SECS)));
        });

        tracing::info!(address = %addr, root = %self.root.display(), "HTTPS server starting");
        axum_server::bind_rustls(addr, rustls)
            .handle(handle)
            .serve(self.router().into_make_service_with_connect_info::<SocketAddr>())
            .await?;
        tracing::info!("HTTPS server stopped");
        Ok(())
    }
}

impl std::fmt::Debug for HttpServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpServer")
            .field("root", &self.root)
            .field("pipeline", &self.pipeline)
            .finish()
    }
}

async fn serve_router<F>(router: Router, listener: TcpListener, shutdown: F) -> Result<(), ServerError>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr()?;
    tracing::info!(address = %addr, "HTTP server starting");

    let app = router.into_make_service_with_connect_info::<SocketAddr>();
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    tracing::info!(address = %addr, "HTTP server stopped");
    Ok(())
}

/// Fallback handler: every request runs through the pipeline.
async fn dispatch(State(pipeline): State<Arc<Pipeline>>, request: Request<Body>) -> Response<Body> {
    pipeline.run(request).await
}

/// A server started by [`HttpServer::listen`].
#[derive(Debug)]
pub struct RunningServer {
    local_addr: SocketAddr,
    shutdown: Shutdown,
    task: JoinHandle<Result<(), ServerError>>,
}

impl RunningServer {
    /// The bound address (useful when listening on port 0).
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stop accepting, let in-flight requests finish, and wait for the task.
    pub async fn close(self) -> Result<(), ServerError> {
        self.shutdown.trigger();
        self.task.await?
    }
}

/// Configures optional collaborators before building an [`HttpServer`].
pub struct HttpServerBuilder {
    config: ServerConfig,
    before: Vec<Arc<dyn Step>>,
    log_fn: Option<LogFn>,
    representations: Option<Arc<dyn RepresentationCache>>,
    negotiator: Option<Arc<dyn ContentNegotiator>>,
}

impl HttpServerBuilder {
    /// Run `step` ahead of the built-in steps. Steps run in the order added.
    pub fn before<S: Step + 'static>(mut self, step: S) -> Self {
        self.before.push(Arc::new(step));
        self
    }

    /// Hook invoked per request, per upstream failure and per step fault.
    pub fn log_fn(mut self, log_fn: LogFn) -> Self {
        self.log_fn = Some(log_fn);
        self
    }

    pub fn representation_cache(mut self, cache: Arc<dyn RepresentationCache>) -> Self {
        self.representations = Some(cache);
        self
    }

    pub fn negotiator(mut self, negotiator: Arc<dyn ContentNegotiator>) -> Self {
        self.negotiator = Some(negotiator);
        self
    }

    #[allow(deprecated)]
    pub fn build(self) -> Result<HttpServer, ServerError> {
        let config = self.config;
        let root = resolve_root(config.root.as_deref());
        let log_fn = self.log_fn.unwrap_or_else(tracing_log_fn);
        let representations = self.representations.unwrap_or_else(|| {
            Arc::new(MemoryRepresentationCache::new(DirectoryScanner::new(root.clone())))
        });
        let negotiator = self
            .negotiator
            .unwrap_or_else(|| Arc::new(QualityNegotiator));

        let mut base_headers = static_headers(&config)?;

        let mut builder = Pipeline::builder().log_fn(Arc::clone(&log_fn));
        for step in self.before {
            builder = builder.shared_step(step);
        }
        builder = builder.step(RequestLogger::new(Arc::clone(&log_fn)));

        if config.trailing {
            builder = builder.step(TrailingSlash);
        }
        if config.conneg {
            builder = builder.step(ContentNegotiation::new(
                Arc::clone(&representations),
                negotiator,
                config.index_file.clone(),
            ));
        }
        if config.auth_enabled() {
            builder = builder.step(BasicAuth::new(
                config.username.clone(),
                config.password.clone(),
            ));
        }
        if config.cors {
            let cors = Cors::new(config.cors_headers.as_deref())?;
            base_headers.extend(cors.simple_headers());
            builder = builder.step(cors);
        }
        if config.robots.enabled() {
            builder = builder.step(Robots::new(config.robots.custom_text()));
        }
        if config.compression_enabled() {
            builder = builder.step(CompressionVary);
        }

        let file_server = FileServer::new(FileServerConfig {
            root: root.clone(),
            cache_control: config.cache.header_value(),
            show_dir: config.show_dir,
            auto_index: config.auto_index,
            show_dotfiles: config.show_dotfiles,
            default_ext: Some(config.ext.clone()).filter(|ext| !ext.is_empty()),
            gzip: config.gzip,
            brotli: config.brotli,
            content_type: config.content_type.clone(),
        });
        builder = builder.step(StaticAssets::new(Arc::new(file_server), config.proxy.is_some()));

        if let Some(target) = &config.proxy {
            let client = ProxyClient::new(target)?;
            builder = builder.step(Proxy::new(client, Some(Arc::clone(&log_fn))));
        }

        let pipeline = Arc::new(builder.base_headers(base_headers).build());
        tracing::debug!(
            root = %root.display(),
            steps = ?pipeline.step_names(),
            "Pipeline built"
        );

        let router = Router::new()
            .fallback(dispatch)
            .with_state(Arc::clone(&pipeline))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid));

        Ok(HttpServer {
            config,
            root,
            pipeline,
            representations,
            router,
        })
    }
}

/// `configured`, else `./public` when it is a directory, else `./`.
pub fn resolve_root(configured: Option<&Path>) -> PathBuf {
    if let Some(root) = configured {
        return root.to_path_buf();
    }
    let public = PathBuf::from("./public");
    if public.is_dir() {
        public
    } else {
        PathBuf::from("./")
    }
}

fn static_headers(config: &ServerConfig) -> Result<HeaderMap, ServerError> {
    let mut headers = HeaderMap::new();
    for (name, value) in &config.headers {
        let invalid = |reason: String| ServerError::InvalidHeader {
            name: name.clone(),
            reason,
        };
        let header_name =
            HeaderName::from_bytes(name.as_bytes()).map_err(|e| invalid(e.to_string()))?;
        let header_value = HeaderValue::from_str(value).map_err(|e| invalid(e.to_string()))?;
        headers.insert(header_name, header_value);
    }
    Ok(headers)
}
