use pharm_module_matching::service::DictionaryModel;
use pharm_module_matching::{
    api, create_pool, AppConfig, ModuleMatchingService, PgMatchingSource, StorageClient,
    TrailMatcher,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tracing::info;
use tracing_subscriber::fmt::time::ChronoLocal;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 初始化日志 - 使用本地时间格式
    tracing_subscriber::fmt()
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S".to_string()))
        .with_target(true)
        .with_level(true)
        .init();

    // 加载配置
    let config = AppConfig::load()?;
    info!("Starting server with config: {:?}", config);

    // 创建数据库连接池
    let pool = create_pool(&config.database).await?;
    info!("Database pool created");

    let service = Arc::new(ModuleMatchingService::new(
        Arc::new(PgMatchingSource::new(pool)),
        Arc::new(StorageClient::new(&config.storage)?),
        Arc::new(TrailMatcher),
        DictionaryModel::factory(config.model.dictionary_path.clone()),
        config.matching.default_bonus_percent,
    ));

    let app = api::router(service).layer(ServiceBuilder::new());

    // 启动服务器
    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Server listening on {}", addr);
    info!("API Endpoints:");
    info!("  POST /api/module-matching             - fetch, match, upload");
    info!("  POST /api/module-matching/statistics  - statistics for given tables");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
