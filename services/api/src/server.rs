use std::sync::atomic::Ordering;
use std::sync::Arc;

use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use tracing::info;

use campus_match::config::AppConfig;
use campus_match::error::AppError;
use campus_match::social::conversations::{MessageBus, MessagingService};
use campus_match::social::friends::FriendGraphService;
use campus_match::social::matching::MatchScorer;
use campus_match::social::profiles::ProfileService;
use campus_match::telemetry;

use crate::cli::ServeArgs;
use crate::infra::{
    AppState, InMemoryConversationRepository, InMemoryFriendRepository, InMemoryProfileRepository,
};
use crate::routes::api_router;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let profiles = Arc::new(InMemoryProfileRepository::default());
    let friends = Arc::new(InMemoryFriendRepository::default());
    let conversations = Arc::new(InMemoryConversationRepository::default());
    let bus = Arc::new(MessageBus::default());

    let friend_service = Arc::new(FriendGraphService::new(
        friends,
        profiles.clone(),
        MatchScorer::default(),
    ));
    let profile_service = Arc::new(ProfileService::new(profiles.clone()));
    let messaging_service = Arc::new(MessagingService::new(conversations, profiles, bus));

    let app = api_router(friend_service, profile_service, messaging_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "campus-match api ready");

    axum::serve(listener, app).await?;
    Ok(())
}
