use crate::cache::CacheService;
use crate::models::{EventId, Seat};
use tracing::debug;

fn seats_key(event_id: EventId) -> String {
    format!("seats:{}", event_id)
}

impl CacheService {
    pub async fn get_seats(&self, event_id: EventId) -> Result<Option<Vec<Seat>>, redis::RedisError> {
        self.get_json(&seats_key(event_id)).await
    }

    pub async fn save_seats(&self, event_id: EventId, seats: &[Seat]) -> Result<(), redis::RedisError> {
        self.set_json(&seats_key(event_id), seats, self.config.seats_ttl_seconds)
            .await
    }

    // Инвалидировать кеш мест
    pub async fn invalidate_seats(&self, event_id: EventId) -> Result<(), redis::RedisError> {
        self.delete(&seats_key(event_id)).await?;
        debug!("Invalidated seats cache for event {}", event_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::seats_key;

    #[test]
    fn seat_keys_are_scoped_per_event() {
        assert_eq!(seats_key(42), "seats:42");
        assert_ne!(seats_key(1), seats_key(11));
    }
}
