use actix::prelude::*;
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod actors;
mod api;
mod domain;
mod geo;
mod location;
mod metrics;

use actors::{
    ConfirmDelivery, ConfirmPickup, GetProgress, GetSystemHealth, HealthMonitorActor, StartPickup,
    StopTracking, TrackingSessionActor,
};
use api::{DeliveryBackend, InMemoryBackend};
use domain::cart::{AddOutcome, CartService, MenuPrice, PortionSize};
use domain::delivery::{DeliveryStatus, OrderDetails, TrackerConfig, VendorLocation};
use geo::Coordinate;
use location::{LocationConfig, LocationSource, SimulatedLocationSource};

/// Straight-line route between two points, `steps` fixes inclusive of both
/// endpoints. Good enough for a simulated GPS trace.
fn route_between(from: Coordinate, to: Coordinate, steps: usize) -> Vec<Coordinate> {
    if steps <= 1 {
        return vec![to];
    }
    (0..steps)
        .map(|i| {
            let t = i as f64 / (steps - 1) as f64;
            Coordinate::new(
                from.latitude + (to.latitude - from.latitude) * t,
                from.longitude + (to.longitude - from.longitude) * t,
            )
        })
        .collect()
}

#[actix::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured logging with environment-based filtering
    // Default to INFO level, can be overridden with RUST_LOG env var
    // Example: RUST_LOG=debug cargo run
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,delivery_fulfillment=debug")),
        )
        .init();

    tracing::info!("🚀 Starting Delivery Fulfillment Demo");

    // === 1. Initialize Prometheus metrics ===
    tracing::info!("Initializing metrics");
    let metrics = Arc::new(metrics::Metrics::new()?);
    tracing::info!(
        "📊 Metrics registry created with {} metrics",
        metrics.registry().gather().len()
    );

    // Start metrics HTTP server in background thread
    let metrics_registry = Arc::new(metrics.registry().clone());
    std::thread::spawn(move || {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            if let Err(e) = metrics::start_metrics_server(metrics_registry, 9090).await {
                tracing::error!("Metrics server error: {}", e);
            }
        });
    });

    // === 2. Seed the in-memory backend (catalog + one ready order) ===
    let backend = Arc::new(InMemoryBackend::new());

    let kitchen = Coordinate::new(6.9271, 79.8612);
    let drop_off = Coordinate::new(6.9350, 79.8800);

    let rice_and_curry = MenuPrice {
        price_id: uuid::Uuid::new_v4(),
        food_id: uuid::Uuid::new_v4(),
        food_name: "Rice & Curry".to_string(),
        size: PortionSize::Large,
        unit_price: 8.5,
        vendor_id: uuid::Uuid::new_v4(),
        vendor_name: "Amma's Kitchen".to_string(),
    };
    let kottu = MenuPrice {
        price_id: uuid::Uuid::new_v4(),
        food_id: uuid::Uuid::new_v4(),
        food_name: "Chicken Kottu".to_string(),
        size: PortionSize::Medium,
        unit_price: 7.0,
        vendor_id: uuid::Uuid::new_v4(),
        vendor_name: "Galle Face Grill".to_string(),
    };
    backend.insert_price(rice_and_curry.clone()).await;
    backend.insert_price(kottu.clone()).await;

    // === 3. Cart scenario: vendor conflict and confirmed switch ===
    tracing::info!("🛒 Building a cart (single-vendor invariant)");
    let customer_id = uuid::Uuid::new_v4();
    let cart = CartService::new(customer_id, backend.clone(), backend.clone())
        .with_metrics(metrics.clone());

    cart.add_item(rice_and_curry.price_id, 2).await?;
    tracing::info!(
        "✅ Added 2x {} from {}",
        rice_and_curry.food_name,
        rice_and_curry.vendor_name
    );

    // Adding from a second vendor does not go through silently
    match cart.add_item(kottu.price_id, 1).await? {
        AddOutcome::Conflict(conflict) => {
            tracing::info!(
                "⚠️  Cart holds items from {}, switching to {} empties it first",
                conflict.current_vendor_name,
                conflict.new_vendor_name
            );
            cart.confirm_vendor_switch(conflict.pending).await?;
            tracing::info!("✅ Switch confirmed, cart now holds 1x {}", kottu.food_name);
        }
        AddOutcome::Added(_) => unreachable!("different vendor must raise a conflict"),
    }

    let subtotal = cart.total().await;
    let delivery_fee = 3.0;

    // === 4. Place the order the cart produced ===
    let order = OrderDetails {
        id: uuid::Uuid::new_v4(),
        order_number: OrderDetails::generate_order_number(),
        customer_id,
        vendor: VendorLocation {
            vendor_id: kottu.vendor_id,
            vendor_name: kottu.vendor_name.clone(),
            kitchen,
            address: "12 Galle Road, Colombo".to_string(),
        },
        delivery_address: "45 Marine Drive, Colombo".to_string(),
        delivery_location: Some(drop_off),
        subtotal,
        delivery_fee,
        total_amount: subtotal + delivery_fee,
        status: DeliveryStatus::Ready,
    };
    backend.insert_order(order.clone()).await;
    tracing::info!(
        "📝 Order {} placed, total {:.2}",
        order.order_number,
        order.total_amount
    );

    // === 5. Agent picks up the session ===
    let agent_start = Coordinate::new(6.9200, 79.8560);
    let mut route = route_between(agent_start, kitchen, 6);
    route.extend(route_between(kitchen, drop_off, 8));

    let source = Arc::new(SimulatedLocationSource::new(
        route,
        LocationConfig {
            fix_timeout: std::time::Duration::from_secs(5),
            watch_interval: std::time::Duration::from_millis(400),
        },
    ));

    let first_fix = source.current_location().await?;
    tracing::info!("📍 Agent located at {}", first_fix);

    let health = HealthMonitorActor::new().start();

    let order = backend.fetch_order(order.id).await?;
    let order_id = order.id;
    let session = TrackingSessionActor::new(
        order,
        backend.clone(),
        source,
        TrackerConfig::default(),
        metrics.clone(),
    )
    .with_health_monitor(health.clone())
    .start();

    // === 6. Drive the delivery through its three transitions ===
    let status = session.send(StartPickup).await??;
    tracing::info!("✅ Transitioned to {}", status);

    tokio::time::sleep(std::time::Duration::from_millis(1500)).await;
    let view = session.send(GetProgress).await?;
    if let Some(snapshot) = view.snapshot {
        tracing::info!(
            "🧭 {:.2} km to the kitchen, {:.0}% of the way, arrival button enabled: {}",
            snapshot.distance_remaining_km,
            snapshot.progress_percent,
            view.can_confirm_arrival()
        );
    }

    tokio::time::sleep(std::time::Duration::from_millis(1500)).await;
    let status = session.send(ConfirmPickup).await??;
    tracing::info!("✅ Transitioned to {}", status);

    tokio::time::sleep(std::time::Duration::from_millis(2500)).await;
    let view = session.send(GetProgress).await?;
    if let Some(snapshot) = view.snapshot {
        tracing::info!(
            "🧭 {:.2} km to the customer, {:.0}% of the way",
            snapshot.distance_remaining_km,
            snapshot.progress_percent
        );
    }

    let status = session
        .send(ConfirmDelivery {
            notes: Some("Handed over at the lobby".to_string()),
        })
        .await??;
    tracing::info!("✅ Transitioned to {}", status);

    if let Some(completion) = backend.completion_for(order_id).await {
        tracing::info!(
            "📦 Completion recorded at {} with {} status changes",
            completion.completion_time,
            completion.status_history.len()
        );
    }

    let system_health = health.send(GetSystemHealth).await?;
    tracing::info!("🏥 System health: {:?}", system_health.overall_status);

    session.send(StopTracking).await?;

    tracing::info!("🎉 Demo complete!");

    Ok(())
}
