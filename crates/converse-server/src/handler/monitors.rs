//! Health monitoring of the storage and inference backends.

use aide::axum::ApiRouter;
use aide::transform::TransformOperation;
use axum::extract::State;
use axum::http::StatusCode;
use converse_core::ServiceHealth;
use converse_inference::InferenceService;
use converse_postgres::PgClient;

use crate::handler::response::{Envelope, MonitorStatus};
use crate::service::ServiceState;

/// Tracing target for monitor operations.
const TRACING_TARGET: &str = "converse_server::handler::monitors";

async fn postgres_health(pg_client: &PgClient) -> ServiceHealth {
    match pg_client.ping().await {
        Ok(elapsed) => ServiceHealth::healthy().with_response_time(elapsed),
        Err(error) => ServiceHealth::unhealthy(error.to_string()),
    }
}

async fn inference_health(inference: &InferenceService) -> ServiceHealth {
    inference
        .health_check()
        .await
        .unwrap_or_else(|error| ServiceHealth::unhealthy(error.to_string()))
}

/// Reports backend health. Responds 503 when any backend is unhealthy.
#[tracing::instrument(skip_all)]
async fn health_status(
    State(pg_client): State<PgClient>,
    State(inference): State<InferenceService>,
) -> (StatusCode, Envelope<MonitorStatus>) {
    let (postgres, inference) =
        futures::join!(postgres_health(&pg_client), inference_health(&inference));
    let status = MonitorStatus::new(postgres, inference);

    let status_code = if status.is_operational() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    tracing::info!(
        target: TRACING_TARGET,
        status = ?status.status,
        status_code = status_code.as_u16(),
        "Health status checked"
    );

    (status_code, Envelope::new(status))
}

fn health_status_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Health status")
        .description(
            "Pings Postgres and the inference engine. The overall status is the worst of the two.",
        )
        .response::<200, Envelope<MonitorStatus>>()
        .response::<503, Envelope<MonitorStatus>>()
}

/// Returns the health monitoring routes.
pub fn routes() -> ApiRouter<ServiceState> {
    use aide::axum::routing::*;

    ApiRouter::new()
        .api_route("/api/health", get_with(health_status, health_status_docs))
        .with_path_items(|item| item.tag("Monitors"))
}

#[cfg(test)]
mod tests {
    use converse_core::ServiceStatus;

    use super::*;
    use crate::handler::test::create_test_server_with_router;

    #[tokio::test]
    async fn unreachable_database_is_unavailable() -> anyhow::Result<()> {
        let server = create_test_server_with_router(routes())?;

        let response = server.get("/api/health").await;
        response.assert_status(StatusCode::SERVICE_UNAVAILABLE);

        let envelope = response.json::<Envelope<MonitorStatus>>();
        assert_eq!(envelope.code, 0);
        assert_eq!(envelope.data.postgres.status, ServiceStatus::Unhealthy);
        assert_eq!(envelope.data.inference.status, ServiceStatus::Healthy);
        assert_eq!(envelope.data.status, ServiceStatus::Unhealthy);

        Ok(())
    }
}
