use crate::cache::CacheService;
use crate::models::Hole;

const HOLES_KEY: &str = "holes";

impl CacheService {
    pub async fn get_holes(&self) -> Result<Option<Vec<Hole>>, redis::RedisError> {
        self.get_json(HOLES_KEY).await
    }

    pub async fn save_holes(&self, holes: &[Hole]) -> Result<(), redis::RedisError> {
        self.set_json(HOLES_KEY, holes, self.config.holes_ttl_seconds)
            .await
    }
}
