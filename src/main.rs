use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use flashdeck::config::Settings;
use flashdeck::srs::Scheduler;
use flashdeck::state::AppState;
use flashdeck::{db, handlers};

#[tokio::main]
async fn main() {
  tracing_subscriber::registry()
    .with(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "flashdeck=debug,tower_http=debug".into()),
    )
    .with(tracing_subscriber::fmt::layer())
    .init();

  let settings = Settings::load().expect("Failed to load configuration");
  let scheduler = Scheduler::new(settings.scheduler.clone()).expect("Invalid scheduler configuration");
  let pool = db::init_db(&settings.database_path).expect("Failed to initialize database");

  let state = AppState::new(pool, scheduler, settings.session_expiry_hours);
  let app = handlers::router(state);

  let bind_addr = settings.bind_addr();
  let listener = tokio::net::TcpListener::bind(&bind_addr)
    .await
    .unwrap_or_else(|_| panic!("Failed to bind to {}", bind_addr));

  tracing::info!("Server running on http://{}", bind_addr);

  axum::serve(listener, app)
    .await
    .expect("Server failed to start");
}
