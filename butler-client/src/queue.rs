//! Queue-related API endpoints

use butler_core::dto::queue::QueueItem;

use crate::JenkinsClient;
use crate::error::Result;

impl JenkinsClient {
    /// Get a queue item by id
    pub async fn queue_item(&self, id: i64) -> Result<QueueItem> {
        let id = id.to_string();
        let url = self.endpoint(["queue", "item", id.as_str(), "api", "json"])?;
        self.get_json(url).await
    }

    /// Cancel a queued task
    ///
    /// # Returns
    /// `true` if Jenkins accepted the cancel request, `false` if the item is gone
    pub async fn cancel(&self, id: i64) -> Result<bool> {
        let id = id.to_string();
        let url = self.endpoint(["queue", "cancelItem"])?;
        match self.post(url, &[("id", id.as_str())]).await {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }
}
