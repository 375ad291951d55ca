use std::future::IntoFuture;

use axum::Router;
use digit_collector::features::create_app_router;
use digit_collector::features::drawing::{DigitPicker, DrawingStore};
use digit_collector::features::home::PageRenderer;
use digit_collector::openapi::ApiDoc;
use digit_collector::startup::run_startup_checks;
use digit_collector::state::AppState;
use digit_collector::{ShutdownManager, config::AppConfig, cors, request_id};
use tower_http::compression::CompressionLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

fn compression_predicate() -> impl tower_http::compression::predicate::Predicate {
    use tower_http::compression::predicate::{NotForContentType, Predicate, SizeAbove};

    // 明确排除不该压缩的响应：
    // - SSE/流式响应：压缩可能引入缓冲，影响实时性。
    // - 图片与常见二进制下载：本身已压缩，收益极低。
    SizeAbove::default()
        .and(NotForContentType::GRPC)
        .and(NotForContentType::IMAGES)
        .and(NotForContentType::SSE)
        .and(NotForContentType::const_new("application/octet-stream"))
        .and(NotForContentType::const_new("application/zip"))
        .and(NotForContentType::const_new("application/gzip"))
}


#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "digit_collector=info,tower_http=info".into()),
        )
        .init();

    let shutdown_manager = ShutdownManager::new();

    if let Err(e) = AppConfig::init_global() {
        tracing::error!("Config init failed: {}", e);
        std::process::exit(1);
    }
    let config = AppConfig::global();

    if let Err(e) = shutdown_manager.start_signal_handler() {
        tracing::error!("信号处理器启动失败: {}", e);
        std::process::exit(1);
    }

    if let Err(e) = run_startup_checks(config).await {
        tracing::error!("Startup checks failed: {}", e);
        std::process::exit(1);
    }

    let store = match DrawingStore::connect_sqlite(&config.database.sqlite_path, config.database.wal)
        .await
    {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("数据库连接失败: {}", e);
            std::process::exit(1);
        }
    };
    if let Err(e) = store.init_schema().await {
        tracing::error!("数据库初始化失败: {}", e);
        std::process::exit(1);
    }

    let app_state = AppState::new(
        store,
        DigitPicker::new(),
        PageRenderer::new(config.templates_path()),
        config.drawing.effective_leaderboard_limit(),
    );

    let mut app: Router = create_app_router(app_state, config.drawing.max_payload_bytes)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    if let Some(layer) = cors::build_cors_layer(&config.cors) {
        app = app.layer(layer);
    }
    app = app.layer(CompressionLayer::new().compress_when(compression_predicate()));
    // request_id 放在最外层，保证 CORS/压缩之后的响应也带上追踪头
    app = app.layer(axum::middleware::from_fn(
        request_id::request_id_middleware,
    ));

    let addr = config.server_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("Bind address failed {}: {}", addr, e);
            std::process::exit(1);
        });

    tracing::info!("Server: http://{}", addr);
    tracing::info!("Docs: http://{}/docs", addr);
    tracing::info!("Health: http://{}/health", addr);
    tracing::info!("Database: {}", config.database.sqlite_path);

    let shutdown_config = &config.shutdown;
    let shutdown_timeout = shutdown_config.timeout_duration();
    let timeout_watch = shutdown_manager.clone();

    let shutdown_signal = async move {
        let reason = shutdown_manager.wait_for_shutdown().await;
        tracing::info!("接收到退出信号: {:?}，开始优雅退出...", reason);
        tracing::info!("优雅退出超时时间: {}秒", shutdown_config.timeout_secs);
    };

    // 退出信号到达后等待在途请求完成，超过超时时间则不再等待
    let deadline = async move {
        timeout_watch.wait_for_shutdown().await;
        tokio::time::sleep(shutdown_timeout).await;
    };

    let graceful = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .into_future();

    tokio::select! {
        res = graceful => {
            if let Err(e) = res {
                tracing::error!("服务器运行错误: {}", e);
                std::process::exit(1);
            }
            tracing::info!("服务器已优雅关闭");
        }
        _ = deadline => {
            tracing::warn!("优雅退出超时，强制退出");
        }
    }
}
