mod db;
mod imaging;
mod notify;
mod orders;
mod routes;
mod storage;

use actix_cors::Cors;
use actix_web::{App, HttpServer, web};
use aws_config::BehaviorVersion;
use aws_sdk_dynamodb::Client as DynamoDbClient;
use aws_sdk_s3::Client as S3Client;
use std::env;

use db::marketplace_repository::MarketplaceRepository;
use imaging::classifier::HttpSegmenter;
use notify::notifier::Notifier;
use orders::service::OrderService;
use routes::configure_routes;
use storage::render_store::RenderStore;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    dotenv::dotenv().ok();

    // Initialize AWS configuration
    let aws_config = aws_config::defaults(BehaviorVersion::latest()).load().await;

    // Create AWS clients
    let dynamodb_client = DynamoDbClient::new(&aws_config);
    let s3_client = S3Client::new(&aws_config);

    // Get table names from environment
    let carts_table = env::var("DYNAMODB_CARTS_TABLE").unwrap();
    let orders_table = env::var("DYNAMODB_ORDERS_TABLE").unwrap();
    let order_items_table = env::var("DYNAMODB_ORDER_ITEMS_TABLE").unwrap();
    let earnings_table = env::var("DYNAMODB_EARNINGS_TABLE").unwrap();
    let products_table = env::var("DYNAMODB_PRODUCTS_TABLE").unwrap();
    let s3_bucket = env::var("S3_BUCKET_NAME").unwrap();

    let segmenter_endpoint = env::var("SEGMENTER_ENDPOINT").unwrap();
    let notify_endpoint = env::var("NOTIFY_ENDPOINT").unwrap();

    // Create repository and services
    let repo = MarketplaceRepository::new(
        dynamodb_client,
        carts_table,
        orders_table,
        order_items_table,
        earnings_table,
        products_table,
    );
    let order_service = OrderService::new(repo);
    let render_store = RenderStore::new(s3_client, s3_bucket);
    let segmenter = HttpSegmenter::new(segmenter_endpoint);
    let notifier = Notifier::new(notify_endpoint);

    let port = env::var("PORT").unwrap_or_else(|_| "8081".to_string());
    let bind_address = format!("0.0.0.0:{}", port);

    log::info!("Starting server on {}", bind_address);

    HttpServer::new(move || {
        App::new()
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allowed_methods(vec!["GET", "POST", "OPTIONS"])
                    .allowed_headers(vec![
                        actix_web::http::header::AUTHORIZATION,
                        actix_web::http::header::ACCEPT,
                        actix_web::http::header::CONTENT_TYPE,
                    ])
                    .max_age(3600),
            )
            .app_data(web::Data::new(order_service.clone()))
            .app_data(web::Data::new(render_store.clone()))
            .app_data(web::Data::new(segmenter.clone()))
            .app_data(web::Data::new(notifier.clone()))
            .configure(configure_routes)
    })
    .bind(&bind_address)?
    .run()
    .await
}
