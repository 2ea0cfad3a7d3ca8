use serde::Deserialize;

/// Message queue configuration shared by every pipeline component.
#[derive(Debug, Deserialize, Clone)]
pub struct MqAppConfig {
    /// Redis connection URL. Default: "redis://localhost:6379".
    #[serde(default = "default_mq_url")]
    pub url: String,
    /// Connection pool size. Default: 5.
    #[serde(default = "default_mq_pool_size")]
    pub pool_size: u8,
    /// Analysis requests (server publishes, analysis worker consumes). Default: "analyse.request".
    #[serde(default = "default_analysis_request_queue")]
    pub analysis_request_queue: String,
    /// Analysis results (analysis worker publishes, server consumes). Default: "analyse.result".
    #[serde(default = "default_analysis_result_queue")]
    pub analysis_result_queue: String,
    /// Average requests (server publishes, average worker consumes). Default: "average.request".
    #[serde(default = "default_average_request_queue")]
    pub average_request_queue: String,
    /// Average results (average worker publishes, server consumes). Default: "average.result".
    #[serde(default = "default_average_result_queue")]
    pub average_result_queue: String,
    /// Upper bound for a single publish before it counts as failed. Default: 5000.
    #[serde(default = "default_publish_timeout_ms")]
    pub publish_timeout_ms: u64,
}

fn default_mq_url() -> String {
    "redis://localhost:6379".into()
}
fn default_mq_pool_size() -> u8 {
    5
}
fn default_analysis_request_queue() -> String {
    "analyse.request".into()
}
fn default_analysis_result_queue() -> String {
    "analyse.result".into()
}
fn default_average_request_queue() -> String {
    "average.request".into()
}
fn default_average_result_queue() -> String {
    "average.result".into()
}
fn default_publish_timeout_ms() -> u64 {
    5000
}

impl Default for MqAppConfig {
    fn default() -> Self {
        Self {
            url: default_mq_url(),
            pool_size: default_mq_pool_size(),
            analysis_request_queue: default_analysis_request_queue(),
            analysis_result_queue: default_analysis_result_queue(),
            average_request_queue: default_average_request_queue(),
            average_result_queue: default_average_result_queue(),
            publish_timeout_ms: default_publish_timeout_ms(),
        }
    }
}
