// Storage operator construction
//
// OpenDAL gives one writer API across backends. S3 credentials come from
// the ambient AWS chain (IAM role on Lambda, env/profile elsewhere); this
// crate never handles secrets itself.

use dynamo2json_config::ExportConfig;
use opendal::Operator;

const DEFAULT_REGION: &str = "us-east-1";

/// Operator for the configured S3 bucket.
#[cfg(feature = "services-s3")]
pub fn s3_operator(config: &ExportConfig) -> anyhow::Result<Operator> {
    use opendal::services;

    let mut builder = services::S3::default()
        .bucket(&config.bucket)
        .region(config.region.as_deref().unwrap_or(DEFAULT_REGION));

    if let Some(endpoint) = &config.endpoint {
        builder = builder.endpoint(endpoint);
    }

    Ok(Operator::new(builder)?.finish())
}

/// Operator rooted at a local directory, for workstation runs.
#[cfg(feature = "services-fs")]
pub fn fs_operator(root: &str) -> anyhow::Result<Operator> {
    use opendal::services;

    let builder = services::Fs::default().root(root);
    Ok(Operator::new(builder)?.finish())
}
