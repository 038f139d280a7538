// AWS Lambda binary entry point
//
// Build with: cargo build -p dynamo2json-lambda
//
// The lambda_runtime crate provides the tokio runtime, so we use #[tokio::main]

#[tokio::main]
async fn main() -> Result<(), lambda_runtime::Error> {
    dynamo2json_lambda::run().await
}
