use std::sync::Arc;

use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};

use common::middleware::auth::{AuthMiddleware, DefaultAuthChecker};
use common::middleware::error_handler;
use common::AppConfig;
use scoring::{LoanExplainer, Predictor};

use crate::middleware::DbAccountVerifier;
use crate::service::admin_service::AdminService;
use crate::service::audit_service::AuditService;
use crate::service::auth_service::AuthService;
use crate::service::dashboard_service::DashboardService;
use crate::service::loan_service::LoanService;

mod handlers;
mod middleware;
mod seed;
mod service;
mod state;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // 嵌入配置文件（编译时加载）
    const DEFAULT_CONFIG: &str = include_str!("../config.toml");
    const PROD_CONFIG: &str = include_str!("../config.production.toml");

    let config = AppConfig::from_file_or_embedded("server/config", DEFAULT_CONFIG, Some(PROD_CONFIG))
        .or_else(|_| AppConfig::from_env())
        .expect("配置加载失败");

    // 初始化日志（使用配置的日志级别）
    std::env::set_var("RUST_LOG", &config.log.level);
    common::init_logger();

    log::info!("启动贷款审批服务...");
    log::info!("配置加载成功 - 数据库: {}", config.database.url);

    // 初始化数据库连接
    let db_config = common::DbConfig::new(
        config.database.url.clone(),
        config.database.max_connections as u64,
    );
    common::init_db(&db_config)
        .await
        .expect("数据库连接池初始化失败");

    // 测试数据库连接
    if let Err(e) = common::test_db_connection().await {
        log::error!("数据库连接测试失败: {}", e);
    }

    let rb = Arc::new(common::get_db().clone());

    // 初始化默认账户与默认权重
    seed::run(rb.as_ref()).await;

    // 评分组件: 模型产物缺失或损坏时自动回退到规则评分
    let predictor = Arc::new(Predictor::from_artifact_path(&config.model.path));
    let explainer = LoanExplainer::new(config.llm.clone());
    if explainer.is_enabled() {
        log::info!("✅ LLM 解释已启用: model={}", config.llm.model);
    } else {
        log::info!("📦 未配置 LLM api_key, 使用模板解释");
    }

    // 组装服务
    let audit_service = Arc::new(AuditService::new(rb.clone()));
    let auth_service = Arc::new(AuthService::new(
        rb.clone(),
        audit_service.clone(),
        config.auth.secret_key.clone(),
        config.auth.token_expire_minutes,
    ));
    let loan_service = Arc::new(LoanService::new(
        rb.clone(),
        predictor.clone(),
        explainer,
        audit_service.clone(),
    ));
    let admin_service = Arc::new(AdminService::new(rb.clone(), audit_service.clone()));
    let dashboard_service = Arc::new(DashboardService::new(rb.clone()));

    // JWT 认证中间件: 登录与健康检查公开, 其余 /api/** 全部要求 Bearer token,
    // 账户状态逐请求查库校验, 停用账户的 token 立即失效
    let auth_middleware = AuthMiddleware::builder()
        .secret(&config.auth.secret_key)
        .auth_checker(Arc::new(
            DefaultAuthChecker::builder()
                .add_match("/api/**")
                .add_exclude("/api/v1/auth/login")
                .add_exclude("/api/v1/health")
                .build(),
        ))
        .verifier(Arc::new(DbAccountVerifier::new(rb.clone())))
        .build();

    let state = state::AppState {
        rb,
        predictor,
        auth_service,
        loan_service,
        admin_service,
        dashboard_service,
        audit_service,
    };
    let state_data = web::Data::new(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    log::info!("🚀 启动 Actix Web 服务器: {}", addr);
    HttpServer::new(move || {
        App::new()
            // 全局中间件配置
            .wrap(Logger::default())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(auth_middleware.clone())
            // 注册 JSON / Query / Path 错误处理器
            .app_data(error_handler::json_config())
            .app_data(error_handler::query_config())
            .app_data(error_handler::path_config())
            // 注册全局数据
            .app_data(state_data.clone())
            // 健康检查
            .service(handlers::health::health)
            // 认证与用户管理
            .service(handlers::auth::login)
            .service(handlers::auth::logout)
            .service(handlers::auth::me)
            .service(handlers::auth::change_password)
            .service(handlers::auth::create_user)
            .service(handlers::auth::list_users)
            .service(handlers::auth::get_user)
            .service(handlers::auth::update_user)
            .service(handlers::auth::delete_user)
            // 贷款评分与复核
            .service(handlers::loans::predict)
            .service(handlers::loans::pending_review)
            .service(handlers::loans::get_application)
            .service(handlers::loans::admin_decision)
            .service(handlers::loans::model_metrics)
            // 后台管理
            .service(handlers::admin::get_feature_weights)
            .service(handlers::admin::update_feature_weight)
            .service(handlers::admin::model_performance)
            .service(handlers::admin::retrain_model)
            .service(handlers::admin::list_loans)
            .service(handlers::admin::get_loan)
            .service(handlers::admin::update_loan_status)
            .service(handlers::admin::audit_logs)
            // 管理看板
            .service(handlers::dashboard::dashboard)
    })
    .bind(&addr)?
    .run()
    .await
}
