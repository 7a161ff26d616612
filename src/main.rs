use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use serde_json::Value;
mod dataset;
mod error;
mod handler;
mod pool;
use handler::function_handler;
use pool::{get_worker_count, init_thread_pool};

#[tokio::main]
async fn main() -> Result<(), Error> {
    // required to enable CloudWatch error logging by the runtime
    lambda_runtime::tracing::init_default_subscriber();

    // Cold start work (once per container lifecycle): size the pool, build the table
    let workers = get_worker_count();
    init_thread_pool(workers);
    let table = dataset::employees();
    tracing::info!(workers, rows = table.len(), "cold start complete");

    run(service_fn(move |event: LambdaEvent<Value>| async move {
        function_handler(event.payload, workers).await
    }))
    .await
}
