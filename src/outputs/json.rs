//! JSON rendering of a [`Listing`].
//!
//! The shape mirrors [`Listing`] directly, with RFC 3339 timestamps:
//!
//! ```text
//! {
//!   "generated_at": "2024-01-06T12:00:00Z",
//!   "total": 3,
//!   "per_source": [ { "source": "BleepingComputer", "count": 1 }, ... ],
//!   "articles": [ { "id": 3, "title": ..., "published_date": ... }, ... ]
//! }
//! ```

use super::Listing;

pub fn render(listing: &Listing) -> Result<String, serde_json::Error> {
    let mut json = serde_json::to_string_pretty(listing)?;
    json.push('\n');
    Ok(json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outputs::tests::{fixed_time, sample_store};
    use serde_json::Value;

    #[tokio::test]
    async fn test_render_shape() {
        let store = sample_store().await;
        let listing = Listing::collect_at(&store, fixed_time()).await.unwrap();
        let value: Value = serde_json::from_str(&render(&listing).unwrap()).unwrap();

        assert_eq!(value["generated_at"], "2024-01-06T12:00:00Z");
        assert_eq!(value["total"], 3);
        assert_eq!(value["per_source"][1]["source"], "Morning Brew");
        assert_eq!(value["articles"][0]["id"], 3);
        assert_eq!(value["articles"][1]["author"], Value::Null);
    }
}
