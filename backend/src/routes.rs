use actix_multipart::Multipart;
use actix_web::{Error, HttpResponse, web};
use futures::{StreamExt, TryStreamExt};
use log::{error, info};
use serde::Serialize;
use serde_json::json;
use shared::{CheckoutRequest, ColorOption, FinishOption};
use std::collections::HashMap;
use std::io::Write;
use uuid::Uuid;

use crate::imaging::classifier::HttpSegmenter;
use crate::imaging::{ImagingError, segmentation, transform};
use crate::notify::notifier::Notifier;
use crate::orders::service::{OrderError, OrderService};
use crate::storage::render_store::RenderStore;

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/api/recolor").route(web::post().to(recolor_preview)))
        .service(web::resource("/api/segment").route(web::post().to(segment_preview)))
        .service(web::resource("/api/checkout").route(web::post().to(checkout)))
        .service(web::resource("/api/orders/{order_id}").route(web::get().to(get_order)));
}

/// Pull the `image` file part and any text parts out of a multipart upload.
async fn read_upload(mut payload: Multipart) -> Result<(Vec<u8>, HashMap<String, String>), Error> {
    let mut image_data = Vec::new();
    let mut fields = HashMap::new();

    while let Ok(Some(mut field)) = payload.try_next().await {
        let name = field.name().unwrap_or("").to_string();

        let mut data = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk?;
            data.write_all(&chunk)?;
        }

        if name == "image" {
            image_data = data;
        } else if !name.is_empty() {
            fields.insert(name, String::from_utf8_lossy(&data).into_owned());
        }
    }

    Ok((image_data, fields))
}

async fn recolor_preview(
    payload: Multipart,
    render_store: web::Data<RenderStore>,
) -> Result<HttpResponse, Error> {
    let (image_data, fields) = read_upload(payload).await?;
    if image_data.is_empty() {
        return Ok(HttpResponse::BadRequest().json(ErrorResponse {
            error: "missing image part".into(),
        }));
    }

    // Unknown color/finish names fall through to identity.
    let color = fields
        .get("color")
        .and_then(|s| s.parse::<ColorOption>().ok());
    let finish = fields
        .get("finish")
        .and_then(|s| s.parse::<FinishOption>().ok());

    let png = match transform::recolor_bytes(&image_data, color, finish) {
        Ok(png) => png,
        Err(e) => {
            error!("recolor failed: {e}");
            return Ok(HttpResponse::BadRequest().json(ErrorResponse {
                error: e.to_string(),
            }));
        }
    };

    let hash = RenderStore::source_hash(&image_data);
    let key = RenderStore::recolor_key(
        &hash,
        &color.map_or_else(|| "original".to_string(), |c| c.to_string()),
        &finish.map_or_else(|| "natural".to_string(), |f| f.to_string()),
    );
    let store = render_store.get_ref().clone();
    let upload = png.clone();
    actix_web::rt::spawn(async move {
        if let Err(e) = store.store_render(&upload, &key).await {
            error!("failed to persist render {key}: {e}");
        }
    });

    Ok(HttpResponse::Ok().content_type("image/png").body(png))
}

async fn segment_preview(
    payload: Multipart,
    segmenter: web::Data<HttpSegmenter>,
    render_store: web::Data<RenderStore>,
) -> Result<HttpResponse, Error> {
    let (image_data, _fields) = read_upload(payload).await?;
    if image_data.is_empty() {
        return Ok(HttpResponse::BadRequest().json(ErrorResponse {
            error: "missing image part".into(),
        }));
    }

    let png = match segmentation::furniture_cutout(segmenter.get_ref(), &image_data).await {
        Ok(png) => png,
        Err(e @ ImagingError::Decode(_)) => {
            return Ok(HttpResponse::BadRequest().json(ErrorResponse {
                error: e.to_string(),
            }));
        }
        Err(e @ ImagingError::Classifier(_)) => {
            error!("segmentation failed: {e}");
            return Ok(HttpResponse::BadGateway().json(ErrorResponse {
                error: e.to_string(),
            }));
        }
        Err(e) => {
            error!("segmentation failed: {e}");
            return Ok(HttpResponse::InternalServerError().json(ErrorResponse {
                error: e.to_string(),
            }));
        }
    };

    let key = RenderStore::cutout_key(&RenderStore::source_hash(&image_data));
    let store = render_store.get_ref().clone();
    let upload = png.clone();
    actix_web::rt::spawn(async move {
        if let Err(e) = store.store_render(&upload, &key).await {
            error!("failed to persist cutout {key}: {e}");
        }
    });

    Ok(HttpResponse::Ok().content_type("image/png").body(png))
}

async fn checkout(
    body: web::Json<CheckoutRequest>,
    orders: web::Data<OrderService>,
    notifier: web::Data<Notifier>,
) -> HttpResponse {
    match orders.checkout(body.user_id).await {
        Ok(receipt) => {
            let notifier = notifier.get_ref().clone();
            let order_id = receipt.order_id;
            actix_web::rt::spawn(async move {
                if let Err(e) = notifier.order_created(order_id).await {
                    error!("designer notification for order {order_id} failed: {e}");
                }
            });

            info!("created order {} for user {}", receipt.order_id, body.user_id);
            HttpResponse::Created().json(receipt)
        }
        Err(OrderError::EmptyCart) => HttpResponse::BadRequest().json(ErrorResponse {
            error: "cart is empty".into(),
        }),
        Err(e) => {
            error!("checkout failed for user {}: {e}", body.user_id);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to create order".into(),
            })
        }
    }
}

async fn get_order(orders: web::Data<OrderService>, path: web::Path<String>) -> HttpResponse {
    let order_id = match Uuid::parse_str(&path.into_inner()) {
        Ok(uuid) => uuid,
        Err(_) => return HttpResponse::BadRequest().body("Invalid UUID format"),
    };

    match orders.order_with_lines(order_id).await {
        Ok(Some((order, lines))) => HttpResponse::Ok().json(json!({
            "order": order,
            "lines": lines,
        })),
        Ok(None) => HttpResponse::NotFound().json(ErrorResponse {
            error: "order not found".into(),
        }),
        Err(e) => {
            error!("Error retrieving order {}: {:?}", order_id, e);
            HttpResponse::InternalServerError().body(format!("Error retrieving order: {:?}", e))
        }
    }
}
